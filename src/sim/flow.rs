//! Phase transitions and their side effects
//!
//! Each transition clears, resets and repositions everything it owns before
//! returning, so the next tick never sees state from the previous phase.

use glam::Vec3;

use super::dialogue::{DialogueAction, DialogueStep};
use super::events::{GameEvent, MusicCue, MusicTrack, SoundCue};
use super::level::{Difficulty, Npc};
use super::phase::GamePhase;
use super::state::{DragOut, EndReason, GameState, PlayerState, VisualKind};
use crate::consts::*;

impl GameState {
    /// Begin a new run from the menu
    pub fn start_game(&mut self, difficulty: Difficulty, play_count: u32) -> bool {
        if self.phase() != GamePhase::Menu {
            log::debug!("start_game ignored in {:?}", self.phase());
            return false;
        }

        self.difficulty = difficulty;
        self.difficulty_settings = difficulty.settings();
        self.play_count = play_count;
        self.player = PlayerState::new(self.difficulty_settings.starting_lives());
        self.level_index = 0;
        self.waiting_for_order = false;
        self.costco_ending = false;
        self.happy_ending = false;
        self.end_reason = None;
        self.drag = None;
        self.clear_world();

        log::info!(
            "Starting game on {} (play #{})",
            difficulty.as_str(),
            play_count + 1
        );
        self.events.push(GameEvent::LivesChanged(self.player.lives));
        self.events.push(GameEvent::ComboChanged(0));
        self.events.push(GameEvent::CoinsChanged(0));
        self.events.push(GameEvent::ScoreChanged {
            distance: 0,
            progress: 0.0,
        });

        self.begin_level_cutscene()
    }

    /// Stage the current level's opening cutscene
    pub(crate) fn begin_level_cutscene(&mut self) -> bool {
        if !self.set_phase(GamePhase::CutscenePlaying) {
            return false;
        }

        self.clear_world();
        self.spawner.reset();
        self.player.score = 0.0;
        self.player.reset_motion(Vec3::from_array(CUTSCENE_PLAYER_POS));

        let Some(level) = self.level() else {
            log::warn!("No level at index {}", self.level_index);
            return true;
        };
        let lines = self.scripts.story(level.story, self.play_count).to_vec();
        let npc = level.npc;
        log::info!("Level {} cutscene: {}", self.level_index + 1, level.name);

        self.events.push(GameEvent::Music(MusicCue::Cutscene(self.level_index)));
        let step = self.dialogue.load_queue(lines, npc, &mut self.events);
        self.handle_dialogue_step(step);
        true
    }

    /// Manual advance from the player
    pub fn advance_dialogue(&mut self) {
        if self.phase() != GamePhase::CutscenePlaying || self.waiting_for_order {
            log::debug!("advance_dialogue ignored in {:?}", self.phase());
            return;
        }
        let step = self.dialogue.advance(&mut self.events);
        self.handle_dialogue_step(step);
    }

    /// Run the dialogue countdown
    pub(crate) fn tick_dialogue(&mut self, dt_ms: f32) {
        let step = self.dialogue.tick(dt_ms, &mut self.events);
        self.handle_dialogue_step(step);
    }

    fn handle_dialogue_step(&mut self, step: DialogueStep) {
        match step {
            DialogueStep::Shown {
                action: Some(DialogueAction::CallSecurity),
            } => self.begin_drag_out(),
            DialogueStep::Shown { .. } | DialogueStep::Idle => {}
            DialogueStep::Exhausted => {
                if !self.costco_ending {
                    self.start_exit_run();
                } else if self.happy_ending {
                    self.finish_story(EndReason::Victory);
                } else {
                    // Bad order with no security line still gets thrown out
                    self.begin_drag_out();
                }
            }
        }
    }

    /// Dialogue done; the player runs out of the scene
    fn start_exit_run(&mut self) {
        if !self.set_phase(GamePhase::CutsceneExiting) {
            return;
        }
        self.dialogue.clear(&mut self.events);
    }

    pub(crate) fn update_exit_run(&mut self, dt: f32) {
        self.player.position.z -= EXIT_RUN_SPEED * dt;
        if self.player.position.z < EXIT_RUN_END_Z {
            self.enter_gameplay();
        }
    }

    /// Hand control to the player at the start of the track
    fn enter_gameplay(&mut self) {
        if !self.set_phase(GamePhase::Gameplay) {
            return;
        }
        self.clear_world();
        self.spawner.reset();
        self.player.score = 0.0;
        self.player.reset_motion(Vec3::ZERO);
        if let Some(level) = self.level() {
            let track = level.music;
            log::info!("Level {} start: {}", self.level_index + 1, level.name);
            self.events.push(GameEvent::Music(MusicCue::Track(track)));
        }
    }

    /// Pause or resume; ignored outside gameplay
    pub fn toggle_pause(&mut self) {
        match self.phase() {
            GamePhase::Gameplay => {
                if self.set_phase(GamePhase::Paused) {
                    self.events.push(GameEvent::Music(MusicCue::Pause));
                }
            }
            GamePhase::Paused => {
                if self.set_phase(GamePhase::Gameplay) {
                    self.events.push(GameEvent::Music(MusicCue::Resume));
                }
            }
            phase => log::debug!("Pause ignored in {:?}", phase),
        }
    }

    /// Current level finished; move on to the next cutscene or the finale
    pub(crate) fn complete_level(&mut self) {
        if self.phase() != GamePhase::Gameplay {
            return;
        }
        let name = self.level().map(|l| l.name.clone()).unwrap_or_default();
        log::info!("Level {} complete: {}", self.level_index + 1, name);
        self.events.push(GameEvent::LevelComplete {
            index: self.level_index,
            name,
        });
        self.events.push(GameEvent::Sound(SoundCue::LevelComplete));

        if self.is_last_level() {
            self.start_costco_approach();
        } else {
            self.level_index += 1;
            self.begin_level_cutscene();
        }
    }

    fn start_costco_approach(&mut self) {
        if !self.set_phase(GamePhase::CostcoApproach) {
            return;
        }
        self.clear_world();
        self.spawner.reset();
        self.dialogue.clear(&mut self.events);
        self.costco_ending = true;
        self.player.reset_motion(Vec3::new(0.0, 0.0, APPROACH_START_Z));
        self.events.push(GameEvent::Music(MusicCue::Track(MusicTrack::Costco)));
    }

    pub(crate) fn update_approach(&mut self, dt: f32) {
        self.player.position.z -= APPROACH_SPEED * dt;
        if self.player.position.z < APPROACH_DOOR_Z {
            self.enter_counter();
        }
    }

    /// Inside the store, waiting for the player to order
    fn enter_counter(&mut self) {
        if !self.set_phase(GamePhase::CutscenePlaying) {
            return;
        }
        self.player.reset_motion(Vec3::from_array(COUNTER_PLAYER_POS));
        self.waiting_for_order = true;
        self.events.push(GameEvent::InteractionPrompt(true));
    }

    /// Order at the counter
    pub fn interact(&mut self) {
        if self.phase() != GamePhase::CutscenePlaying || !self.waiting_for_order {
            log::debug!("interact ignored in {:?}", self.phase());
            return;
        }
        self.waiting_for_order = false;
        self.events.push(GameEvent::InteractionPrompt(false));

        let coins = self.player.coins;
        let (lines, happy) = self.scripts.counter_script(self.tuning.ending_policy, coins);
        self.happy_ending = happy;
        log::info!(
            "Ordering with {} coins ({:?} policy): {}",
            coins,
            self.tuning.ending_policy,
            if happy { "happy" } else { "bad" }
        );
        self.events.push(GameEvent::Music(MusicCue::Ending { happy }));
        let step = self.dialogue.load_queue(lines, Some(Npc::Cashier), &mut self.events);
        self.handle_dialogue_step(step);
    }

    fn begin_drag_out(&mut self) {
        if !self.set_phase(GamePhase::DraggingOut) {
            return;
        }
        self.dialogue.clear(&mut self.events);

        let guard_ids = [self.next_entity_id(), self.next_entity_id()];
        let p = self.player.position;
        let guards = [
            p - Vec3::new(GUARD_START_DISTANCE, 0.0, 0.0),
            p + Vec3::new(GUARD_START_DISTANCE, 0.0, 0.0),
        ];
        for (id, position) in guard_ids.iter().zip(guards) {
            self.events.push(GameEvent::SpawnVisual {
                id: *id,
                visual: VisualKind::Guard,
                position,
            });
        }
        self.drag = Some(DragOut {
            guard_ids,
            guards,
            grabbed: false,
        });
    }

    pub(crate) fn update_drag_out(&mut self, dt: f32) {
        let Some(drag) = self.drag.as_mut() else {
            return;
        };

        let offsets = [-GUARD_HOLD_OFFSET, GUARD_HOLD_OFFSET];
        if drag.grabbed {
            self.player.position.z += DRAG_SPEED * dt;
        }
        let p = self.player.position;
        let t = (GUARD_APPROACH_RATE * dt).min(1.0);
        for (guard, offset) in drag.guards.iter_mut().zip(offsets) {
            let target = Vec3::new(p.x + offset, 0.0, p.z);
            if drag.grabbed {
                *guard = target;
            } else {
                *guard += (target - *guard) * t;
            }
        }

        if !drag.grabbed && drag.guards.iter().all(|g| (g.x - p.x).abs() < GUARD_GRAB_DISTANCE) {
            drag.grabbed = true;
            self.player.position.y = DRAG_LIFT_HEIGHT;
        }

        if self.player.position.z > DRAG_END_Z {
            self.finish_story(EndReason::Banned);
        }
    }

    /// Finale over, one way or another
    fn finish_story(&mut self, reason: EndReason) {
        if !self.set_phase(GamePhase::Ended) {
            return;
        }
        self.dialogue.clear(&mut self.events);
        if let Some(drag) = self.drag.take() {
            for id in drag.guard_ids {
                self.events.push(GameEvent::RemoveVisual { id });
            }
        }
        log::info!("Story finished: {:?}", reason);
        self.end_reason = Some(reason);
        self.events.push(GameEvent::GameOver { reason });
    }

    /// Lives exhausted
    pub(crate) fn game_over(&mut self) {
        if !self.set_phase(GamePhase::Ended) {
            return;
        }
        log::info!(
            "Game over on level {} at {:.0}",
            self.level_index + 1,
            self.player.score
        );
        let reason = EndReason::OutOfLives;
        self.end_reason = Some(reason);
        self.events.push(GameEvent::Sound(SoundCue::GameOver));
        self.events.push(GameEvent::Music(MusicCue::Stop));
        self.events.push(GameEvent::GameOver { reason });
    }

    /// Back to the title screen
    pub fn return_to_menu(&mut self) -> bool {
        if !self.set_phase(GamePhase::Menu) {
            return false;
        }
        self.clear_world();
        self.dialogue.clear(&mut self.events);
        self.events.push(GameEvent::Music(MusicCue::Track(MusicTrack::Menu)));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::dialogue::DialogueLine;
    use crate::sim::script::ScriptLibrary;
    use crate::tuning::{EndingPolicy, Tuning};

    fn started() -> GameState {
        let mut state = GameState::new(11, Tuning::default());
        assert!(state.start_game(Difficulty::Normal, 0));
        state
    }

    /// Click through dialogue until the phase changes
    fn skip_cutscene(state: &mut GameState) {
        let mut guard = 0;
        while state.phase() == GamePhase::CutscenePlaying && !state.waiting_for_order {
            state.advance_dialogue();
            guard += 1;
            assert!(guard < 100);
        }
    }

    fn run_until(state: &mut GameState, phase: GamePhase) {
        let mut guard = 0;
        while state.phase() != phase {
            match state.phase() {
                GamePhase::CutsceneExiting => state.update_exit_run(0.1),
                GamePhase::CostcoApproach => state.update_approach(0.1),
                GamePhase::DraggingOut => state.update_drag_out(0.1),
                _ => break,
            }
            guard += 1;
            assert!(guard < 1000);
        }
    }

    #[test]
    fn test_start_game_shows_intro() {
        let mut state = started();
        assert_eq!(state.phase(), GamePhase::CutscenePlaying);
        let first = state.dialogue.current_line().cloned();
        assert_eq!(first.map(|l| l.speaker), Some("Chandler".to_string()));
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::PhaseChanged {
            from: GamePhase::Menu,
            to: GamePhase::CutscenePlaying
        }));
    }

    #[test]
    fn test_start_game_only_from_menu() {
        let mut state = started();
        assert!(!state.start_game(Difficulty::Hard, 0));
        assert_eq!(state.difficulty, Difficulty::Normal);
    }

    #[test]
    fn test_cutscene_exit_run_enters_gameplay() {
        let mut state = started();
        skip_cutscene(&mut state);
        assert_eq!(state.phase(), GamePhase::CutsceneExiting);
        assert!(state.dialogue.current_line().is_none());
        run_until(&mut state, GamePhase::Gameplay);
        assert_eq!(state.player.position, Vec3::ZERO);
        assert!(state.drain_events().contains(&GameEvent::Music(MusicCue::Track(MusicTrack::Village))));
    }

    #[test]
    fn test_empty_story_skips_to_exit() {
        let mut state = GameState::new(1, Tuning::default());
        state.scripts = ScriptLibrary::default();
        state.start_game(Difficulty::Normal, 0);
        assert_eq!(state.phase(), GamePhase::CutsceneExiting);
    }

    #[test]
    fn test_pause_only_in_gameplay() {
        let mut state = started();
        state.toggle_pause();
        assert_eq!(state.phase(), GamePhase::CutscenePlaying);

        skip_cutscene(&mut state);
        run_until(&mut state, GamePhase::Gameplay);
        state.toggle_pause();
        assert_eq!(state.phase(), GamePhase::Paused);
        state.toggle_pause();
        assert_eq!(state.phase(), GamePhase::Gameplay);
    }

    #[test]
    fn test_advance_ignored_outside_cutscene() {
        let mut state = started();
        skip_cutscene(&mut state);
        let before = state.phase();
        state.advance_dialogue();
        assert_eq!(state.phase(), before);
    }

    #[test]
    fn test_complete_level_moves_to_next_cutscene() {
        let mut state = started();
        skip_cutscene(&mut state);
        run_until(&mut state, GamePhase::Gameplay);
        state.player.score = 999.0;
        state.complete_level();
        assert_eq!(state.level_index, 1);
        assert_eq!(state.player.score, 0.0);
        assert_eq!(state.phase(), GamePhase::CutscenePlaying);
        assert_eq!(
            state.dialogue.current_line().map(|l| l.speaker.as_str()),
            Some("Chandler")
        );
    }

    fn reach_counter(state: &mut GameState) {
        state.level_index = state.levels.len() - 1;
        state.machine = Default::default();
        state.machine.request(GamePhase::CutscenePlaying);
        state.machine.request(GamePhase::CutsceneExiting);
        state.machine.request(GamePhase::Gameplay);
        state.complete_level();
        assert_eq!(state.phase(), GamePhase::CostcoApproach);
        run_until(state, GamePhase::CutscenePlaying);
        assert!(state.waiting_for_order);
    }

    #[test]
    fn test_happy_finale() {
        let mut state = started();
        state.player.coins = 6;
        reach_counter(&mut state);

        // Dialogue cannot be skipped before ordering
        state.advance_dialogue();
        assert!(state.waiting_for_order);

        state.interact();
        assert!(state.happy_ending);
        skip_cutscene(&mut state);
        assert_eq!(state.phase(), GamePhase::Ended);
        assert_eq!(state.end_reason, Some(EndReason::Victory));
    }

    #[test]
    fn test_broke_finale_drags_player_out() {
        let mut state = started();
        state.player.coins = 2;
        reach_counter(&mut state);
        state.interact();
        assert!(!state.happy_ending);
        skip_cutscene(&mut state);
        assert_eq!(state.phase(), GamePhase::DraggingOut);
        assert!(state.drag.is_some());

        run_until(&mut state, GamePhase::Ended);
        assert_eq!(state.end_reason, Some(EndReason::Banned));
        assert!(state.player.position.z > DRAG_END_Z);
        assert!(state.drag.is_none());
    }

    #[test]
    fn test_tiered_policy_uses_tier_script() {
        let mut state = GameState::new(3, Tuning {
            ending_policy: EndingPolicy::Tiered,
            ..Default::default()
        });
        state.start_game(Difficulty::Normal, 0);
        state.player.coins = 15;
        reach_counter(&mut state);
        state.interact();
        let expected = state.scripts.ending(crate::sim::script::EndingTier::Legend)[0].clone();
        assert_eq!(state.dialogue.current_line(), Some(&expected));
    }

    #[test]
    fn test_security_line_interrupts_script() {
        let mut state = started();
        let mut security = DialogueLine::new("Cashier", "SECURITY!", 1000);
        security.action = Some(DialogueAction::CallSecurity);
        state.scripts.order.insert(
            "bad".to_string(),
            vec![security, DialogueLine::new("Chandler", "never shown", 1000)],
        );
        reach_counter(&mut state);
        state.interact();
        assert_eq!(state.phase(), GamePhase::DraggingOut);
    }

    #[test]
    fn test_return_to_menu_only_when_ended() {
        let mut state = started();
        assert!(!state.return_to_menu());
        state.machine = Default::default();
        state.machine.request(GamePhase::CutscenePlaying);
        state.machine.request(GamePhase::CutsceneExiting);
        state.machine.request(GamePhase::Gameplay);
        state.game_over();
        assert!(state.return_to_menu());
        assert_eq!(state.phase(), GamePhase::Menu);
        assert!(state.start_game(Difficulty::Easy, 1));
        assert_eq!(state.player.lives, 5);
    }
}
