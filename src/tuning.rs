//! Data-driven game balance
//!
//! Every field has a default so a partial JSON override works.

use serde::{Deserialize, Serialize};

use crate::consts;

/// How the Costco counter decides between the happy and bad endings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndingPolicy {
    /// Can the player afford $1.50? Plays the happy or bad order script.
    #[default]
    Binary,
    /// Plays one of the seven coin-tier scripts
    Tiered,
}

/// Runtime-tunable values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Largest frame delta the simulation accepts (seconds)
    pub max_frame_dt: f32,
    pub damage_cooldown: f32,
    pub invincibility_duration: f32,
    pub water_bonus_points: u32,
    pub near_miss_points: u32,
    /// Share of collectible spawns that are coins (0..=1)
    pub coin_share: f32,
    pub ending_policy: EndingPolicy,
    /// Fixed spawn seed; random per run when absent
    pub spawn_seed: Option<u64>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            max_frame_dt: consts::MAX_FRAME_DT,
            damage_cooldown: consts::DAMAGE_COOLDOWN,
            invincibility_duration: consts::INVINCIBILITY_DURATION,
            water_bonus_points: consts::WATER_BONUS_POINTS as u32,
            near_miss_points: consts::COMBO_NEAR_MISS_POINTS as u32,
            coin_share: 0.0,
            ending_policy: EndingPolicy::Binary,
            spawn_seed: None,
        }
    }
}

impl Tuning {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut tuning: Self = serde_json::from_str(json)?;
        tuning.coin_share = tuning.coin_share.clamp(0.0, 1.0);
        tuning.max_frame_dt = tuning.max_frame_dt.max(0.0);
        Ok(tuning)
    }

    /// Parse overrides, falling back to defaults on bad input
    pub fn from_json_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::warn!("Ignoring bad tuning overrides: {}", e);
                Self::default()
            }
        }
    }

    /// Clamp a raw frame delta into `0..=max_frame_dt`
    pub fn cap_dt(&self, dt: f32) -> f32 {
        if dt.is_finite() {
            dt.max(0.0).min(self.max_frame_dt)
        } else {
            0.0
        }
    }
}
