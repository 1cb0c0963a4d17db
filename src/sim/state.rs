//! Game state and core simulation types
//!
//! `GameState` is the single owned value the frontend ticks. Every component
//! reads and mutates it through `&mut` borrows within one frame.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::dialogue::DialogueSequencer;
use super::events::GameEvent;
use super::level::{Difficulty, DifficultySettings, LevelConfig};
use super::phase::{GamePhase, PhaseMachine};
use super::script::ScriptLibrary;
use super::spawn::SpawnScheduler;
use crate::consts::*;
use crate::lane_x;
use crate::tuning::Tuning;

/// The runner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    /// Feet position
    pub position: Vec3,
    pub velocity_y: f32,
    pub grounded: bool,
    /// Jumps used since the last landing (0..=MAX_JUMPS)
    pub jump_count: u8,
    pub sliding: bool,
    pub slide_timer: f32,
    pub lives: u8,
    pub invincible: bool,
    pub invincibility_timer: f32,
    /// Grace period left after the last hit
    pub damage_cooldown: f32,
    /// -1, 0 or 1
    pub target_lane: i8,
    /// Distance covered in the current level
    pub score: f32,
    pub combo: u32,
    pub coins: u32,
}

impl PlayerState {
    pub fn new(lives: u8) -> Self {
        Self {
            position: Vec3::ZERO,
            velocity_y: 0.0,
            grounded: true,
            jump_count: 0,
            sliding: false,
            slide_timer: 0.0,
            lives: lives.min(MAX_LIVES),
            invincible: false,
            invincibility_timer: 0.0,
            damage_cooldown: 0.0,
            target_lane: 0,
            score: 0.0,
            combo: 0,
            coins: 0,
        }
    }

    /// Current collider height (shorter while sliding)
    pub fn height(&self) -> f32 {
        if self.sliding {
            PLAYER_HEIGHT_SLIDING
        } else {
            PLAYER_HEIGHT
        }
    }

    /// Bounding box around the player's body
    pub fn aabb(&self) -> Aabb {
        let h = self.height();
        Aabb::from_center_size(
            self.position + Vec3::new(0.0, h / 2.0, 0.0),
            Vec3::new(PLAYER_WIDTH, h, PLAYER_WIDTH),
        )
    }

    /// Put the player back on the ground in the middle lane, dropping any
    /// jump/slide/invincibility in progress
    pub fn reset_motion(&mut self, position: Vec3) {
        self.position = position;
        self.velocity_y = 0.0;
        self.grounded = true;
        self.jump_count = 0;
        self.sliding = false;
        self.slide_timer = 0.0;
        self.invincible = false;
        self.invincibility_timer = 0.0;
        self.damage_cooldown = 0.0;
        self.target_lane = 0;
    }
}

/// How an obstacle must be avoided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Avoid {
    Jump,
    Slide,
}

/// Physical obstacle variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Adobe wall, jump over
    LowWall,
    /// Overhead bar, slide under
    SlideBarrier,
    /// Squat block, jump over
    ConcreteBlock,
}

impl ObstacleKind {
    pub fn avoid(&self) -> Avoid {
        match self {
            ObstacleKind::SlideBarrier => Avoid::Slide,
            ObstacleKind::LowWall | ObstacleKind::ConcreteBlock => Avoid::Jump,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub kind: ObstacleKind,
    pub lane: i8,
    /// Collider center
    pub position: Vec3,
    pub half_extents: Vec3,
    /// Intersected the player at least once (no near-miss credit)
    pub touched: bool,
    /// Already crossed the player's plane
    pub passed: bool,
}

impl Obstacle {
    /// Build an obstacle at the spawn depth. `height` only matters for low walls.
    pub fn new(id: u32, kind: ObstacleKind, lane: i8, height: f32) -> Self {
        let (center_y, size) = match kind {
            ObstacleKind::LowWall => (height / 2.0, Vec3::new(2.5, height, 0.5)),
            ObstacleKind::SlideBarrier => (2.4, Vec3::new(3.5, 1.2, 0.5)),
            ObstacleKind::ConcreteBlock => (0.75, Vec3::new(2.5, 1.5, 0.8)),
        };
        Self {
            id,
            kind,
            lane,
            position: Vec3::new(lane_x(lane), center_y, OBSTACLE_SPAWN_Z),
            half_extents: size / 2.0,
            touched: false,
            passed: false,
        }
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.position, self.half_extents)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectibleKind {
    /// Restores a life, or pays a bonus at full health
    Water,
    /// Temporary invincibility
    Chili,
    /// Pocket change for the Costco counter
    Coin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collectible {
    pub id: u32,
    pub kind: CollectibleKind,
    pub lane: i8,
    pub position: Vec3,
    pub radius: f32,
}

impl Collectible {
    pub fn new(id: u32, kind: CollectibleKind, lane: i8) -> Self {
        Self {
            id,
            kind,
            lane,
            position: Vec3::new(lane_x(lane), 0.0, OBSTACLE_SPAWN_Z),
            radius: PICKUP_RADIUS,
        }
    }
}

/// What the renderer should build for a spawned entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum VisualKind {
    Obstacle { kind: ObstacleKind, height: f32 },
    Collectible(CollectibleKind),
    Guard,
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    OutOfLives,
    /// Escorted out of Costco
    Banned,
    Victory,
}

impl EndReason {
    pub fn message(&self) -> &'static str {
        match self {
            EndReason::OutOfLives => "You ran out of lives!",
            EndReason::Banned => "Banned from Costco!",
            EndReason::Victory => "You got the Freedom Glizzy!",
        }
    }
}

/// Security guards closing in on the player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DragOut {
    pub guard_ids: [u32; 2],
    pub guards: [Vec3; 2],
    pub grabbed: bool,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    pub(crate) machine: PhaseMachine,
    pub player: PlayerState,
    pub levels: Vec<LevelConfig>,
    /// Active level (0-based)
    pub level_index: usize,
    pub difficulty: Difficulty,
    pub difficulty_settings: DifficultySettings,
    pub tuning: Tuning,
    /// Live obstacles in spawn order
    pub obstacles: Vec<Obstacle>,
    /// Live collectibles in spawn order
    pub collectibles: Vec<Collectible>,
    pub spawner: SpawnScheduler,
    pub dialogue: DialogueSequencer,
    pub scripts: ScriptLibrary,
    /// Games played before this run, selects dialogue variations
    pub play_count: u32,
    /// At the Costco counter waiting for the interact intent
    pub waiting_for_order: bool,
    /// The current cutscene belongs to the finale
    pub costco_ending: bool,
    /// The counter script picked the happy branch
    pub happy_ending: bool,
    pub end_reason: Option<EndReason>,
    pub drag: Option<DragOut>,
    /// Events produced since the last drain
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create a state sitting at the menu with the standard campaign
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        Self::with_levels(seed, tuning, LevelConfig::campaign())
    }

    /// Create a state with a custom level table
    pub fn with_levels(seed: u64, tuning: Tuning, levels: Vec<LevelConfig>) -> Self {
        let difficulty = Difficulty::default();
        let difficulty_settings = difficulty.settings();
        Self {
            machine: PhaseMachine::new(),
            player: PlayerState::new(difficulty_settings.starting_lives()),
            levels,
            level_index: 0,
            difficulty,
            difficulty_settings,
            tuning,
            obstacles: Vec::new(),
            collectibles: Vec::new(),
            spawner: SpawnScheduler::new(seed),
            dialogue: DialogueSequencer::new(),
            scripts: ScriptLibrary::embedded(),
            play_count: 0,
            waiting_for_order: false,
            costco_ending: false,
            happy_ending: false,
            end_reason: None,
            drag: None,
            events: Vec::new(),
            next_id: 1,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.machine.phase()
    }

    /// Move to `to` if allowed, emitting `PhaseChanged`
    pub(crate) fn set_phase(&mut self, to: GamePhase) -> bool {
        let from = self.machine.phase();
        if !self.machine.request(to) {
            return false;
        }
        self.events.push(GameEvent::PhaseChanged { from, to });
        true
    }

    /// Active level config
    pub fn level(&self) -> Option<&LevelConfig> {
        self.levels.get(self.level_index)
    }

    pub fn is_last_level(&self) -> bool {
        self.level_index + 1 >= self.levels.len()
    }

    /// Forward speed of the current level after the difficulty multiplier
    pub fn current_speed(&self) -> f32 {
        self.level()
            .map(|l| l.speed * self.difficulty_settings.speed_multiplier)
            .unwrap_or(0.0)
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Drop every live obstacle and collectible, telling the renderer
    pub fn clear_world(&mut self) {
        for obstacle in self.obstacles.drain(..) {
            self.events.push(GameEvent::RemoveVisual { id: obstacle.id });
        }
        for collectible in self.collectibles.drain(..) {
            self.events.push(GameEvent::RemoveVisual { id: collectible.id });
        }
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_at_menu() {
        let state = GameState::new(7, Tuning::default());
        assert_eq!(state.phase(), GamePhase::Menu);
        assert_eq!(state.player.lives, INITIAL_LIVES);
        assert!(state.obstacles.is_empty());
        assert_eq!(state.current_speed(), 16.0);
    }

    #[test]
    fn test_player_box_shrinks_when_sliding() {
        let mut player = PlayerState::new(3);
        let standing = player.aabb();
        player.sliding = true;
        let sliding = player.aabb();
        assert!(sliding.max().y < standing.max().y);
        assert_eq!(sliding.min().y, 0.0);
    }

    #[test]
    fn test_obstacle_colliders() {
        let wall = Obstacle::new(1, ObstacleKind::LowWall, -1, 2.0);
        assert_eq!(wall.position, Vec3::new(-LANE_WIDTH, 1.0, OBSTACLE_SPAWN_Z));
        assert_eq!(wall.aabb().min().y, 0.0);

        // Barrier leaves room to slide underneath but not to run
        let barrier = Obstacle::new(2, ObstacleKind::SlideBarrier, 0, 0.0);
        let bottom = barrier.aabb().min().y;
        assert!(bottom > PLAYER_HEIGHT_SLIDING);
        assert!(bottom < PLAYER_HEIGHT);
        assert_eq!(barrier.kind.avoid(), Avoid::Slide);
    }

    #[test]
    fn test_clear_world_emits_removals() {
        let mut state = GameState::new(7, Tuning::default());
        let id = state.next_entity_id();
        state.obstacles.push(Obstacle::new(id, ObstacleKind::ConcreteBlock, 1, 0.0));
        let id = state.next_entity_id();
        state.collectibles.push(Collectible::new(id, CollectibleKind::Water, 0));
        state.clear_world();
        assert!(state.obstacles.is_empty());
        assert!(state.collectibles.is_empty());
        let removed = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::RemoveVisual { .. }))
            .count();
        assert_eq!(removed, 2);
    }
}
