//! Glizzy Run - a three-lane endless runner with scripted cutscenes
//!
//! Core modules:
//! - `sim`: Deterministic simulation (phase machine, dialogue, physics, spawning, collisions)
//! - `session`: Glue between the simulation and the progression ledger
//! - `progression`: XP, high score and unlock bookkeeping
//! - `persistence`: Save/load of the progression ledger
//! - `platform`: Frame clock and input-to-intent mapping
//! - `tuning`: Data-driven game balance
//! - `settings`: Volume, mute and difficulty preferences
//! - `audio`: Procedural Web Audio sound effects (WASM only)

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod persistence;
pub mod platform;
pub mod progression;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use progression::ProgressionLedger;
pub use session::Session;
pub use settings::Settings;
pub use tuning::{EndingPolicy, Tuning};

/// Game configuration constants
pub mod consts {
    /// Lane spacing in world units; lanes sit at -LANE_WIDTH, 0, +LANE_WIDTH
    pub const LANE_WIDTH: f32 = 4.0;
    /// Lane change smoothing rate (fraction of remaining distance per second)
    pub const PLAYER_MOVE_SPEED: f32 = 15.0;

    /// Vertical acceleration (units/s²)
    pub const GRAVITY: f32 = -35.0;
    /// Upward velocity applied by each jump
    pub const JUMP_VELOCITY: f32 = 14.0;
    /// Ground jump + one air jump
    pub const MAX_JUMPS: u8 = 2;

    /// Slide length in seconds
    pub const SLIDE_DURATION: f32 = 0.5;

    pub const INITIAL_LIVES: u8 = 3;
    pub const MAX_LIVES: u8 = 5;
    /// Grace period after a hit (seconds)
    pub const DAMAGE_COOLDOWN: f32 = 2.0;
    /// Chili power-up length (seconds)
    pub const INVINCIBILITY_DURATION: f32 = 5.0;

    /// Player collision box
    pub const PLAYER_WIDTH: f32 = 1.5;
    pub const PLAYER_HEIGHT: f32 = 3.5;
    pub const PLAYER_HEIGHT_SLIDING: f32 = 1.5;
    /// Box separation under which a dodged obstacle counts as a near miss
    pub const NEAR_MISS_THRESHOLD: f32 = 2.0;
    /// Collectible pickup distance
    pub const PICKUP_RADIUS: f32 = 1.5;

    /// Obstacles and collectibles enter here...
    pub const OBSTACLE_SPAWN_Z: f32 = -60.0;
    /// ...and leave once they pass the camera
    pub const OBSTACLE_DESPAWN_Z: f32 = 15.0;

    pub const COMBO_NEAR_MISS_POINTS: f32 = 10.0;
    pub const WATER_BONUS_POINTS: f32 = 1000.0;

    /// Costco prices, in cents
    pub const GLIZZY_PRICE: u32 = 150;
    pub const COIN_VALUE: u32 = 25;

    /// Frame delta cap (seconds) so a backgrounded tab doesn't teleport the world
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Cutscene staging
    pub const CUTSCENE_PLAYER_POS: [f32; 3] = [-1.5, 0.0, 5.0];
    pub const EXIT_RUN_SPEED: f32 = 10.0;
    pub const EXIT_RUN_END_Z: f32 = -10.0;

    /// Costco parking lot run
    pub const APPROACH_START_Z: f32 = 10.0;
    pub const APPROACH_SPEED: f32 = 12.0;
    pub const APPROACH_DOOR_Z: f32 = -55.0;
    pub const COUNTER_PLAYER_POS: [f32; 3] = [-2.0, 0.0, -6.0];

    /// Security drag-out
    pub const GUARD_START_DISTANCE: f32 = 6.0;
    pub const GUARD_APPROACH_RATE: f32 = 5.0;
    pub const GUARD_HOLD_OFFSET: f32 = 0.8;
    pub const GUARD_GRAB_DISTANCE: f32 = 1.5;
    pub const DRAG_LIFT_HEIGHT: f32 = 0.5;
    pub const DRAG_SPEED: f32 = 4.0;
    pub const DRAG_END_Z: f32 = 15.0;

    /// Screen shake presets (intensity, seconds)
    pub const SHAKE_MEDIUM: (f32, f32) = (0.3, 0.3);
}

/// World-space x coordinate of a lane (-1, 0, 1)
#[inline]
pub fn lane_x(lane: i8) -> f32 {
    lane as f32 * consts::LANE_WIDTH
}
