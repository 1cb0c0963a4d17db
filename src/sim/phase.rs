//! Top-level game phase and the legal transition table

use serde::{Deserialize, Serialize};

/// Current phase of the game; exactly one is active at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, nothing simulated
    #[default]
    Menu,
    /// Dialogue is on screen
    CutscenePlaying,
    /// Player runs out of the cutscene set before control is handed over
    CutsceneExiting,
    /// Final run across the Costco parking lot
    CostcoApproach,
    /// Player has control
    Gameplay,
    /// Gameplay frozen
    Paused,
    /// Security escorts the player out
    DraggingOut,
    /// Run over (out of lives, banned or victorious)
    Ended,
}

impl GamePhase {
    /// Whether `self -> to` is an allowed transition
    pub fn can_transition_to(self, to: GamePhase) -> bool {
        use GamePhase::*;
        matches!(
            (self, to),
            (Menu, CutscenePlaying)
                | (CutscenePlaying, CutsceneExiting)
                | (CutscenePlaying, DraggingOut)
                | (CutscenePlaying, Ended)
                | (CutsceneExiting, Gameplay)
                | (Gameplay, Paused)
                | (Gameplay, CutscenePlaying)
                | (Gameplay, CostcoApproach)
                | (Gameplay, Ended)
                | (Paused, Gameplay)
                | (CostcoApproach, CutscenePlaying)
                | (DraggingOut, Ended)
                | (Ended, Menu)
        )
    }

    /// Player physics, spawning and collisions run
    pub fn is_gameplay(self) -> bool {
        matches!(self, GamePhase::Gameplay | GamePhase::Paused)
    }

    /// Dialogue fields are meaningful
    pub fn is_cutscene(self) -> bool {
        matches!(self, GamePhase::CutscenePlaying | GamePhase::CutsceneExiting)
    }
}

/// Holder of the authoritative phase value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhaseMachine {
    phase: GamePhase,
}

impl PhaseMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Request a transition. Illegal requests leave the phase untouched and
    /// return false.
    pub fn request(&mut self, to: GamePhase) -> bool {
        if !self.phase.can_transition_to(to) {
            log::debug!("Ignoring phase transition {:?} -> {:?}", self.phase, to);
            return false;
        }
        log::info!("Phase {:?} -> {:?}", self.phase, to);
        self.phase = to;
        true
    }
}
