//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Capped frame delta only
//! - Seeded RNG only
//! - Side effects leave as `GameEvent`s, never as direct calls
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod dialogue;
pub mod events;
pub mod flow;
pub mod level;
pub mod phase;
pub mod physics;
pub mod script;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{Aabb, DamageOutcome, apply_pickup, take_damage};
pub use dialogue::{DialogueAction, DialogueLine, DialogueSequencer, DialogueStep, SpeakerAnchor};
pub use events::{EffectCue, GameEvent, MusicCue, MusicTrack, SoundCue};
pub use level::{Difficulty, DifficultySettings, LevelConfig, Npc};
pub use phase::{GamePhase, PhaseMachine};
pub use script::{EndingTier, ScriptLibrary, StoryBeat, can_afford_glizzy, variation_index};
pub use spawn::SpawnScheduler;
pub use state::{
    Avoid, Collectible, CollectibleKind, EndReason, GameState, Obstacle, ObstacleKind, PlayerState, VisualKind,
};
pub use tick::{TickInput, tick};
