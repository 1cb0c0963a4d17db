//! Progression ledger
//!
//! Lifetime stats, XP levels, unlocks and achievements. The simulation never
//! writes here directly; `Session` applies the ledger effects of its events.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::settings::Settings;

/// Cumulative XP needed for levels 1 through 10
pub const DEFAULT_XP_THRESHOLDS: [u32; 10] = [0, 500, 1500, 3000, 5000, 8000, 12000, 17000, 23000, 30000];

/// Monotonic XP-to-level table. Entry `i` is the XP required for level `i + 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XpTable(Vec<u32>);

impl Default for XpTable {
    fn default() -> Self {
        Self(DEFAULT_XP_THRESHOLDS.to_vec())
    }
}

impl XpTable {
    /// Build from thresholds; `None` unless non-empty, starting at 0 and non-decreasing
    pub fn new(thresholds: Vec<u32>) -> Option<Self> {
        if thresholds.first() != Some(&0) || thresholds.windows(2).any(|w| w[1] < w[0]) {
            return None;
        }
        Some(Self(thresholds))
    }

    pub fn max_level(&self) -> u32 {
        self.0.len() as u32
    }

    /// XP at which `level` (1-based) starts
    pub fn threshold(&self, level: u32) -> Option<u32> {
        let index = level.checked_sub(1)?;
        self.0.get(index as usize).copied()
    }
}

/// Persisted player progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionLedger {
    /// Best distance reached in a single level
    pub high_score: u32,
    pub total_deaths: u32,
    pub total_collectibles: u32,
    pub games_played: u32,
    pub game_beaten: bool,
    /// Highest campaign level unlocked (1-based)
    pub levels_unlocked: u32,
    pub achievements: BTreeSet<String>,
    pub player_xp: u32,
    /// 1-based
    pub player_level: u32,
    pub settings: Settings,
    #[serde(skip)]
    xp_table: XpTable,
}

impl Default for ProgressionLedger {
    fn default() -> Self {
        Self {
            high_score: 0,
            total_deaths: 0,
            total_collectibles: 0,
            games_played: 0,
            game_beaten: false,
            levels_unlocked: 1,
            achievements: BTreeSet::new(),
            player_xp: 0,
            player_level: 1,
            settings: Settings::default(),
            xp_table: XpTable::default(),
        }
    }
}

impl ProgressionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in a different XP table, recomputing the level
    pub fn with_xp_table(mut self, table: XpTable) -> Self {
        self.xp_table = table;
        self.player_level = 1;
        self.add_xp(0);
        self
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut ledger: Self = serde_json::from_str(json)?;
        ledger.settings.sanitize();
        ledger.levels_unlocked = ledger.levels_unlocked.max(1);
        ledger.player_level = ledger.player_level.clamp(1, ledger.xp_table.max_level());
        Ok(ledger)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Add XP; returns true if at least one level was gained
    pub fn add_xp(&mut self, amount: u32) -> bool {
        self.player_xp = self.player_xp.saturating_add(amount);
        let mut leveled_up = false;
        while let Some(next) = self.xp_table.threshold(self.player_level + 1) {
            if self.player_xp < next {
                break;
            }
            self.player_level += 1;
            leveled_up = true;
        }
        if leveled_up {
            log::info!("Reached player level {}", self.player_level);
        }
        leveled_up
    }

    /// XP total needed for the next level, `None` at max level
    pub fn xp_for_next_level(&self) -> Option<u32> {
        self.xp_table.threshold(self.player_level + 1)
    }

    /// Progress through the current level (0..=1, 1 at max level)
    pub fn xp_progress(&self) -> f32 {
        let current = self.xp_table.threshold(self.player_level).unwrap_or(0);
        match self.xp_for_next_level() {
            Some(next) if next > current => {
                ((self.player_xp.saturating_sub(current)) as f32 / (next - current) as f32).clamp(0.0, 1.0)
            }
            _ => 1.0,
        }
    }

    /// Returns true on a new high score
    pub fn record_distance(&mut self, distance: u32) -> bool {
        if distance > self.high_score {
            self.high_score = distance;
            true
        } else {
            false
        }
    }

    pub fn record_death(&mut self) {
        self.total_deaths += 1;
    }

    pub fn record_collectible(&mut self) {
        self.total_collectibles += 1;
    }

    pub fn record_game_played(&mut self) {
        self.games_played += 1;
    }

    pub fn mark_game_beaten(&mut self) {
        self.game_beaten = true;
    }

    /// Unlocks never go backwards
    pub fn unlock_level(&mut self, level: u32) {
        if level > self.levels_unlocked {
            log::info!("Unlocked level {}", level);
            self.levels_unlocked = level;
        }
    }

    pub fn is_level_unlocked(&self, level: u32) -> bool {
        level >= 1 && level <= self.levels_unlocked
    }

    /// Returns true if the achievement is new
    pub fn award_achievement(&mut self, id: &str) -> bool {
        let new = self.achievements.insert(id.to_string());
        if new {
            log::info!("Achievement unlocked: {}", id);
        }
        new
    }

    pub fn has_achievement(&self, id: &str) -> bool {
        self.achievements.contains(id)
    }

    /// Wipe progress, keeping settings
    pub fn reset(&mut self) {
        let settings = self.settings.clone();
        let xp_table = self.xp_table.clone();
        *self = Self {
            settings,
            xp_table,
            ..Self::default()
        };
    }
}
