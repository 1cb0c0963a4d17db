//! Semantic events emitted by the simulation
//!
//! The simulation never touches audio, meshes or the DOM. Every observable
//! side effect is pushed onto `GameState::events` and drained by the frontend
//! once per frame.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::dialogue::{DialogueAction, SpeakerAnchor};
use super::phase::GamePhase;
use super::state::{CollectibleKind, EndReason, VisualKind};

/// One-shot sound effect request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundCue {
    Jump,
    Land,
    Slide,
    Hit,
    CollectWater,
    CollectChili,
    CollectCoin,
    Smash,
    NearMiss,
    LevelComplete,
    GameOver,
    /// Free-form tag carried by a dialogue line (e.g. "cash_register")
    Script(String),
}

/// Background music tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MusicTrack {
    Menu,
    Village,
    Desert,
    River,
    Wall,
    Suburbia,
    Costco,
}

/// Music change request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MusicCue {
    Track(MusicTrack),
    /// Cutscene underscore for a level (0-based index)
    Cutscene(usize),
    Ending { happy: bool },
    Pause,
    Resume,
    Stop,
}

/// Visual effect hook (particles, camera, post-processing)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EffectCue {
    Dust(Vec3),
    Smash(Vec3),
    ScreenShake { intensity: f32, duration: f32 },
    DamageFlash,
    InvincibilityStart,
    InvincibilityEnd,
    LifeGained,
}

/// Everything the presentation, audio and persistence layers react to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PhaseChanged { from: GamePhase, to: GamePhase },
    /// Score rounded to a whole distance plus level progress (0..=1)
    ScoreChanged { distance: u32, progress: f32 },
    LivesChanged(u8),
    ComboChanged(u32),
    CoinsChanged(u32),
    /// Bonus points awarded (water at full health, near misses)
    BonusAwarded(u32),
    LevelComplete { index: usize, name: String },
    GameOver { reason: EndReason },
    CollectibleGathered(CollectibleKind),
    DialogueShown {
        speaker: String,
        text: String,
        anchor: SpeakerAnchor,
    },
    DialogueAction(DialogueAction),
    DialogueCleared,
    /// "Press E to order" prompt visibility
    InteractionPrompt(bool),
    Sound(SoundCue),
    Music(MusicCue),
    Effect(EffectCue),
    SpawnVisual {
        id: u32,
        visual: VisualKind,
        position: Vec3,
    },
    RemoveVisual { id: u32 },
    /// Player level increased (emitted by the session after XP is applied)
    LevelUp { level: u32 },
}
