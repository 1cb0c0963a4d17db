//! A play session: simulation + progression + storage
//!
//! The frontend drives a `Session` once per frame. After each tick the
//! session applies the ledger side of the emitted events (XP, deaths,
//! unlocks, achievements) and saves when anything changed.

use crate::persistence::{self, Storage};
use crate::platform::MenuCommand;
use crate::progression::ProgressionLedger;
use crate::sim::{Difficulty, EndReason, EndingTier, GameEvent, GamePhase, GameState, TickInput, tick};
use crate::tuning::Tuning;

/// XP per completed stage, scaled by stage number
pub const STAGE_XP: f32 = 100.0;
/// Distance units per XP point on game over
pub const DISTANCE_PER_XP: f32 = 10.0;

pub struct Session<S: Storage> {
    pub state: GameState,
    pub ledger: ProgressionLedger,
    storage: S,
}

impl<S: Storage> Session<S> {
    /// Load the ledger from `storage` and sit at the menu
    pub fn new(storage: S, tuning: Tuning) -> Self {
        let ledger = persistence::load_ledger(&storage);
        let seed = tuning.spawn_seed.unwrap_or_else(rand::random);
        log::info!("Session created with spawn seed {}", seed);
        Self {
            state: GameState::new(seed, tuning),
            ledger,
            storage,
        }
    }

    /// Start a run on the difficulty saved in settings
    pub fn start_game(&mut self) -> bool {
        let difficulty = self.ledger.settings.difficulty;
        self.start_game_with(difficulty)
    }

    pub fn start_game_with(&mut self, difficulty: Difficulty) -> bool {
        // Variation selection sees the count before this run
        let play_count = self.ledger.games_played;
        if !self.state.start_game(difficulty, play_count) {
            return false;
        }
        self.ledger.record_game_played();
        self.save();
        true
    }

    /// Change the preferred difficulty and persist it
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.ledger.settings.difficulty = difficulty;
        self.save();
    }

    /// Run a title-screen command. Returns true if a run started.
    pub fn apply_menu_command(&mut self, command: MenuCommand) -> bool {
        if self.state.phase() != GamePhase::Menu {
            log::debug!("Menu command {:?} ignored in {:?}", command, self.state.phase());
            return false;
        }
        match command {
            MenuCommand::Start => return self.start_game(),
            MenuCommand::SelectDifficulty(difficulty) => {
                log::info!("Difficulty set to {}", difficulty.as_str());
                self.set_difficulty(difficulty);
                return false;
            }
            MenuCommand::MusicVolume(delta) => {
                let settings = &mut self.ledger.settings;
                settings.set_music_volume(settings.music_volume + delta);
            }
            MenuCommand::SfxVolume(delta) => {
                let settings = &mut self.ledger.settings;
                settings.set_sfx_volume(settings.sfx_volume + delta);
            }
            MenuCommand::ToggleMute => {
                self.ledger.settings.toggle_mute();
            }
            MenuCommand::ResetProgress => {
                self.reset_progress();
                return false;
            }
        }
        self.save();
        false
    }

    /// Advance one frame and return everything that happened
    pub fn frame(&mut self, input: &TickInput, dt: f32) -> Vec<GameEvent> {
        tick(&mut self.state, input, dt);
        self.collect_events()
    }

    /// Leave the end screen
    pub fn return_to_menu(&mut self) -> Vec<GameEvent> {
        self.state.return_to_menu();
        self.collect_events()
    }

    pub fn save(&mut self) -> bool {
        persistence::save_ledger(&mut self.storage, &self.ledger)
    }

    /// Delete the save and start over, keeping settings
    pub fn reset_progress(&mut self) {
        persistence::clear_ledger(&mut self.storage);
        self.ledger.reset();
        self.save();
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn collect_events(&mut self) -> Vec<GameEvent> {
        let mut events = self.state.drain_events();
        let mut extra = Vec::new();
        let mut dirty = false;

        for event in &events {
            match event {
                GameEvent::CollectibleGathered(_) => {
                    self.ledger.record_collectible();
                    dirty = true;
                }
                GameEvent::LevelComplete { index, .. } => {
                    // Unlock the next level (1-based)
                    self.ledger.unlock_level(*index as u32 + 2);
                    let xp = ((*index + 1) as f32 * STAGE_XP * self.xp_multiplier()).floor() as u32;
                    self.grant_xp(xp, &mut extra);
                    dirty = true;
                }
                GameEvent::GameOver { reason } => {
                    self.apply_ending(*reason, &mut extra);
                    dirty = true;
                }
                _ => {}
            }
        }

        if dirty {
            self.save();
        }
        events.extend(extra);
        events
    }

    fn apply_ending(&mut self, reason: EndReason, extra: &mut Vec<GameEvent>) {
        match reason {
            EndReason::OutOfLives => {
                let score = self.state.player.score;
                self.ledger.record_death();
                if self.ledger.record_distance(score as u32) {
                    log::info!("New high score: {}", score as u32);
                }
                let xp = ((score / DISTANCE_PER_XP).floor() * self.xp_multiplier()).floor() as u32;
                self.grant_xp(xp, extra);
            }
            EndReason::Banned | EndReason::Victory => {
                let tier = EndingTier::for_coins(self.state.player.coins);
                self.ledger.award_achievement(&format!("ending_{}", tier.key()));
                if reason == EndReason::Victory {
                    self.ledger.mark_game_beaten();
                }
            }
        }
    }

    fn grant_xp(&mut self, xp: u32, extra: &mut Vec<GameEvent>) {
        if self.ledger.add_xp(xp) {
            extra.push(GameEvent::LevelUp {
                level: self.ledger.player_level,
            });
        }
    }

    fn xp_multiplier(&self) -> f32 {
        self.state.difficulty_settings.xp_multiplier
    }
}
