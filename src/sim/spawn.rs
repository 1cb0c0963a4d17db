//! Distance-based spawn scheduling
//!
//! Spawns are keyed on distance travelled, not wall-clock time, so density is
//! the same at any frame rate. All randomness comes from a seeded PCG stream.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::level::LevelConfig;
use super::state::{CollectibleKind, ObstacleKind};

/// Obstacle chosen by the scheduler
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObstacleSpawn {
    pub kind: ObstacleKind,
    pub lane: i8,
    /// Wall height (low walls vary a little)
    pub height: f32,
}

/// Collectible chosen by the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectibleSpawn {
    pub kind: CollectibleKind,
    pub lane: i8,
}

/// Spawns decided for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpawnBatch {
    pub obstacle: Option<ObstacleSpawn>,
    pub collectible: Option<CollectibleSpawn>,
}

#[derive(Debug, Clone)]
pub struct SpawnScheduler {
    rng: Pcg32,
    pub last_obstacle_distance: f32,
    pub last_collectible_distance: f32,
}

impl SpawnScheduler {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            last_obstacle_distance: 0.0,
            last_collectible_distance: 0.0,
        }
    }

    /// Forget spawn history (start of a level)
    pub fn reset(&mut self) {
        self.last_obstacle_distance = 0.0;
        self.last_collectible_distance = 0.0;
    }

    /// Decide what to spawn at `distance` into the level
    pub fn update(
        &mut self,
        distance: f32,
        level: &LevelConfig,
        gap_multiplier: f32,
        coin_share: f32,
    ) -> SpawnBatch {
        let mut batch = SpawnBatch::default();

        let min_gap = level.min_obstacle_gap * gap_multiplier;
        let max_gap = level.max_obstacle_gap * gap_multiplier;
        let gap = min_gap + self.rng.random::<f32>() * (max_gap - min_gap);
        if distance - self.last_obstacle_distance > gap {
            self.last_obstacle_distance = distance;
            batch.obstacle = Some(self.roll_obstacle());
        }

        if distance - self.last_collectible_distance > level.collectible_gap * gap_multiplier {
            self.last_collectible_distance = distance;
            batch.collectible = Some(self.roll_collectible(coin_share));
        }

        batch
    }

    fn roll_lane(&mut self) -> i8 {
        self.rng.random_range(-1..=1)
    }

    fn roll_obstacle(&mut self) -> ObstacleSpawn {
        let lane = self.roll_lane();
        let t: f32 = self.rng.random();
        let kind = if t > 0.65 {
            ObstacleKind::LowWall
        } else if t > 0.35 {
            ObstacleKind::SlideBarrier
        } else {
            ObstacleKind::ConcreteBlock
        };
        let height = match kind {
            ObstacleKind::LowWall => 1.8 + self.rng.random::<f32>() * 0.4,
            ObstacleKind::SlideBarrier => 1.2,
            ObstacleKind::ConcreteBlock => 1.5,
        };
        ObstacleSpawn { kind, lane, height }
    }

    fn roll_collectible(&mut self, coin_share: f32) -> CollectibleSpawn {
        let lane = self.roll_lane();
        let kind = if coin_share > 0.0 && self.rng.random::<f32>() < coin_share {
            CollectibleKind::Coin
        } else if self.rng.random::<f32>() > 0.7 {
            CollectibleKind::Chili
        } else {
            CollectibleKind::Water
        };
        CollectibleSpawn { kind, lane }
    }
}
