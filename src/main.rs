//! Glizzy Run entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, KeyboardEvent, TouchEvent};

    use glizzy_run::audio::AudioManager;
    use glizzy_run::persistence::{LocalStorage, Storage};
    use glizzy_run::platform::{FrameClock, MenuCommand, TouchTracker, apply_gesture, apply_key, menu_command};
    use glizzy_run::sim::{Difficulty, GameEvent, GamePhase, TickInput};
    use glizzy_run::{Session, Tuning};

    /// Optional tuning overrides, as JSON
    const TUNING_KEY: &str = "glizzy_run_tuning";

    /// Game instance holding all state
    struct Game {
        session: Session<LocalStorage>,
        clock: FrameClock,
        input: TickInput,
        touch: TouchTracker,
        audio: AudioManager,
    }

    impl Game {
        fn new() -> Self {
            let storage = LocalStorage;
            let tuning = storage
                .get(TUNING_KEY)
                .map(|json| Tuning::from_json_or_default(&json))
                .unwrap_or_default();
            let clock = FrameClock::new(tuning.max_frame_dt);
            let session = Session::new(storage, tuning);
            let mut audio = AudioManager::new();
            audio.apply_settings(&session.ledger.settings);
            Self {
                session,
                clock,
                input: TickInput::default(),
                touch: TouchTracker::new(),
                audio,
            }
        }

        fn phase(&self) -> GamePhase {
            self.session.state.phase()
        }

        fn start(&mut self) {
            self.audio.resume();
            if self.session.start_game() {
                let events = self.session.state.drain_events();
                self.present(&events);
                log::info!("Run started on {}", self.session.ledger.settings.difficulty.as_str());
            }
        }

        /// Title-screen command; starting goes through `start` so audio resumes
        fn menu(&mut self, command: MenuCommand) {
            if command == MenuCommand::Start {
                self.start();
                return;
            }
            self.session.apply_menu_command(command);
            let settings = self.session.ledger.settings.clone();
            self.audio.apply_settings(&settings);
            self.show_menu_stats();
        }

        /// Difficulty, volumes, player level and unlocked levels on the title screen
        fn show_menu_stats(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let ledger = &self.session.ledger;
            let settings = &ledger.settings;
            for difficulty in [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard, Difficulty::Insane] {
                let selected = difficulty == settings.difficulty;
                let id = format!("difficulty-{}", difficulty.as_str());
                set_class(&document, &id, if selected { "btn selected" } else { "btn" });
            }
            set_text(&document, "music-volume", &format!("{:.0}%", settings.music_volume * 100.0));
            set_text(&document, "sfx-volume", &format!("{:.0}%", settings.sfx_volume * 100.0));
            set_class(&document, "muted", if settings.muted { "" } else { "hidden" });
            set_text(&document, "player-level", &ledger.player_level.to_string());
            set_text(&document, "xp-progress", &format!("{:.0}%", ledger.xp_progress() * 100.0));
            set_text(&document, "best-score", &ledger.high_score.to_string());
            for level in 1..=self.session.state.levels.len() as u32 {
                let unlocked = ledger.is_level_unlocked(level);
                let id = format!("level-pip-{}", level);
                set_class(&document, &id, if unlocked { "pip unlocked" } else { "pip" });
            }
        }

        fn restart(&mut self) {
            let events = self.session.return_to_menu();
            self.present(&events);
            self.start();
        }

        fn frame(&mut self, time: f64) {
            let dt = self.clock.advance(time);
            let events = self.session.frame(&self.input, dt);
            // Every intent is a discrete press
            self.input = TickInput::default();
            self.present(&events);
        }

        /// Route drained events to the HUD and audio
        fn present(&self, events: &[GameEvent]) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            for event in events {
                match event {
                    GameEvent::ScoreChanged { distance, progress } => {
                        set_text(&document, "score", &distance.to_string());
                        set_text(&document, "progress", &format!("{:.0}%", progress * 100.0));
                    }
                    GameEvent::LivesChanged(lives) => {
                        set_text(&document, "lives", &"\u{2665}".repeat(*lives as usize))
                    }
                    GameEvent::ComboChanged(combo) => {
                        if *combo > 0 {
                            set_text(&document, "combo", &format!("x{}", combo));
                            set_class(&document, "combo", "hud-item pop");
                        } else {
                            set_class(&document, "combo", "hud-item hidden");
                        }
                    }
                    GameEvent::CoinsChanged(coins) => set_text(&document, "coins", &coins.to_string()),
                    GameEvent::LevelComplete { name, .. } => {
                        set_text(&document, "level-banner", &format!("{} complete!", name));
                    }
                    GameEvent::DialogueShown { speaker, text, .. } => {
                        set_text(&document, "dialogue-speaker", speaker);
                        set_text(&document, "dialogue-text", text);
                        set_class(&document, "dialogue", "");
                    }
                    GameEvent::DialogueCleared => set_class(&document, "dialogue", "hidden"),
                    GameEvent::InteractionPrompt(show) => {
                        set_class(&document, "interact-prompt", if *show { "" } else { "hidden" })
                    }
                    GameEvent::PhaseChanged { to, .. } => {
                        self.show_phase(&document, *to);
                        if *to == GamePhase::Menu {
                            self.show_menu_stats();
                        }
                    }
                    GameEvent::GameOver { reason } => {
                        set_text(&document, "game-over-message", reason.message());
                        set_text(
                            &document,
                            "final-score",
                            &(self.session.state.player.score as u32).to_string(),
                        );
                        set_text(&document, "best-score", &self.session.ledger.high_score.to_string());
                    }
                    GameEvent::LevelUp { level } => {
                        set_text(&document, "player-level", &level.to_string());
                    }
                    GameEvent::Sound(cue) => self.audio.play(cue),
                    GameEvent::Music(cue) => self.audio.music(cue),
                    _ => {}
                }
            }
        }

        fn show_phase(&self, document: &Document, phase: GamePhase) {
            let visible = |id: &str, show: bool| set_class(document, id, if show { "" } else { "hidden" });
            visible("menu", phase == GamePhase::Menu);
            visible("hud", phase.is_gameplay());
            visible("pause-menu", phase == GamePhase::Paused);
            visible("game-over", phase == GamePhase::Ended);
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_class(document: &Document, id: &str, class: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", class);
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);
        log::info!("Glizzy Run starting...");

        let game = Rc::new(RefCell::new(Game::new()));
        if let Some(document) = web_sys::window().and_then(|w| w.document()) {
            game.borrow().show_phase(&document, GamePhase::Menu);
            game.borrow().show_menu_stats();
            set_class(&document, "loading", "hidden");
        }

        setup_input_handlers(game.clone());
        setup_buttons(game.clone());
        setup_auto_pause(game.clone());
        request_animation_frame(game);
        log::info!("Glizzy Run running!");
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };

        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                let key = event.key();
                match g.phase() {
                    GamePhase::Menu => {
                        if let Some(command) = menu_command(&key) {
                            event.prevent_default();
                            g.menu(command);
                        }
                    }
                    GamePhase::Ended if matches!(key.as_str(), "Enter" | " ") => g.restart(),
                    GamePhase::Ended => {}
                    phase => {
                        if key == " " || key.starts_with("Arrow") {
                            event.prevent_default();
                        }
                        let waiting = g.session.state.waiting_for_order;
                        apply_key(&key, phase, waiting, &mut g.input);
                        if matches!(key.as_str(), "m" | "M") {
                            g.session.ledger.settings.toggle_mute();
                            let settings = g.session.ledger.settings.clone();
                            g.audio.apply_settings(&settings);
                            g.session.save();
                        }
                    }
                }
            });
            let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                let Some(t) = event.touches().get(0) else { return };
                let now = js_sys::Date::now();
                game.borrow_mut()
                    .touch
                    .start(t.client_x() as f32, t.client_y() as f32, now);
            });
            let _ = window.add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch end
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                let Some(t) = event.changed_touches().get(0) else { return };
                let now = js_sys::Date::now();
                let mut g = game.borrow_mut();
                let gesture = g.touch.end(t.client_x() as f32, t.client_y() as f32, now);
                let phase = g.phase();
                let waiting = g.session.state.waiting_for_order;
                apply_gesture(gesture, phase, waiting, &mut g.input);
            });
            let _ = window.add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        game.borrow_mut().frame(time);
        request_animation_frame(game);
    }

    fn on_click(document: &Document, id: &str, handler: impl FnMut(web_sys::MouseEvent) + 'static) {
        if let Some(btn) = document.get_element_by_id(id) {
            let closure = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(handler);
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        let g = game.clone();
        on_click(&document, "start-btn", move |_| g.borrow_mut().start());

        let g = game.clone();
        on_click(&document, "restart-btn", move |_| g.borrow_mut().restart());

        for difficulty in [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard, Difficulty::Insane] {
            let g = game.clone();
            let id = format!("difficulty-{}", difficulty.as_str());
            on_click(&document, &id, move |_| {
                g.borrow_mut().menu(MenuCommand::SelectDifficulty(difficulty))
            });
        }

        let g = game.clone();
        on_click(&document, "reset-btn", move |_| g.borrow_mut().menu(MenuCommand::ResetProgress));

        let g = game.clone();
        on_click(&document, "resume-btn", move |_| g.borrow_mut().input.pause = true);

        on_click(&document, "menu-btn", move |_| {
            let mut g = game.borrow_mut();
            let events = g.session.return_to_menu();
            g.present(&events);
        });
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let Some(document) = window.document() else { return };

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    if g.phase() == GamePhase::Gameplay {
                        g.input.pause = true;
                        log::info!("Auto-paused (tab hidden)");
                    }
                } else {
                    // Don't count the hidden time as one huge frame
                    g.clock.reset();
                }
            });
            let _ = document
                .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.phase() == GamePhase::Gameplay {
                    g.input.pause = true;
                    log::info!("Auto-paused (window blur)");
                }
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Glizzy Run (native) starting headless demo run...");
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Plays a scripted run without a browser: skip every cutscene, dodge
/// whatever is coming down the player's lane, and log what happens.
///
/// The first argument picks the difficulty (`easy`, `normal`, `hard`, `insane`).
#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use glizzy_run::persistence::MemoryStorage;
    use glizzy_run::platform::MenuCommand;
    use glizzy_run::sim::{Avoid, Difficulty, GameEvent, GamePhase, GameState, TickInput};
    use glizzy_run::{Session, Tuning};

    const FRAME_DT: f32 = 1.0 / 60.0;
    const MAX_FRAMES: u32 = 60 * 60 * 10;
    /// How far ahead of the player the autopilot reacts
    const LOOKAHEAD: f32 = 8.0;

    pub fn run() {
        let tuning = Tuning {
            spawn_seed: Some(42),
            ..Default::default()
        };
        let mut session = Session::new(MemoryStorage::new(), tuning);

        if let Some(arg) = std::env::args().nth(1) {
            match Difficulty::from_str(&arg) {
                Some(difficulty) => {
                    session.apply_menu_command(MenuCommand::SelectDifficulty(difficulty));
                }
                None => log::warn!("Unknown difficulty '{}', keeping {}", arg, current(&session)),
            }
        }
        session.apply_menu_command(MenuCommand::Start);
        log::info!("Running on {}", current(&session));

        let mut frames = 0;
        while session.state.phase() != GamePhase::Ended && frames < MAX_FRAMES {
            let phase = session.state.phase();
            let mut input = TickInput {
                advance_dialogue: phase == GamePhase::CutscenePlaying && frames % 30 == 0,
                interact: session.state.waiting_for_order,
                ..Default::default()
            };
            if phase == GamePhase::Gameplay {
                dodge(&session.state, &mut input);
            }
            for event in session.frame(&input, FRAME_DT) {
                match event {
                    GameEvent::PhaseChanged { from, to } => log::info!("{:?} -> {:?}", from, to),
                    GameEvent::LevelComplete { name, .. } => log::info!("Cleared {}", name),
                    GameEvent::LivesChanged(lives) => log::info!("Lives: {}", lives),
                    GameEvent::DialogueShown { speaker, text, .. } => log::debug!("{}: {}", speaker, text),
                    GameEvent::LevelUp { level } => log::info!("Player level {}", level),
                    GameEvent::GameOver { reason } => log::info!("{}", reason.message()),
                    _ => {}
                }
            }
            frames += 1;
        }

        let ledger = &session.ledger;
        log::info!(
            "Finished after {} frames: level {} reached, high score {}, xp {} ({:.0}% to next), deaths {}",
            frames,
            session.state.level_index + 1,
            ledger.high_score,
            ledger.player_xp,
            ledger.xp_progress() * 100.0,
            ledger.total_deaths
        );
    }

    fn current<S: glizzy_run::persistence::Storage>(session: &Session<S>) -> &'static str {
        session.ledger.settings.difficulty.as_str()
    }

    /// Jump or slide for the nearest obstacle closing in on the player's lane
    fn dodge(state: &GameState, input: &mut TickInput) {
        let player = &state.player;
        let nearest = state
            .obstacles
            .iter()
            .filter(|o| o.lane == player.target_lane && !o.passed)
            .filter(|o| {
                let gap = player.position.z - o.position.z;
                gap > 0.0 && gap < LOOKAHEAD
            })
            .max_by(|a, b| a.position.z.total_cmp(&b.position.z));

        match nearest.map(|o| o.kind.avoid()) {
            Some(Avoid::Jump) => input.jump = player.grounded,
            Some(Avoid::Slide) => input.slide = !player.sliding,
            None => {}
        }
    }
}
