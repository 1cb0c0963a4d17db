//! Collision detection and scoring
//!
//! Axis-aligned boxes for the player and obstacles, distance checks for
//! collectibles. Live collections are walked back to front so removals never
//! skip an entity.

use glam::Vec3;

use super::events::{EffectCue, GameEvent, SoundCue};
use super::state::{CollectibleKind, GameState, PlayerState};
use crate::consts::*;
use crate::tuning::Tuning;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub center: Vec3,
    pub half_extents: Vec3,
}

impl Aabb {
    pub fn new(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            center,
            half_extents,
        }
    }

    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        Self::new(center, size / 2.0)
    }

    pub fn min(&self) -> Vec3 {
        self.center - self.half_extents
    }

    pub fn max(&self) -> Vec3 {
        self.center + self.half_extents
    }

    /// Overlap test (touching faces count)
    pub fn intersects(&self, other: &Aabb) -> bool {
        let d = (self.center - other.center).abs();
        let r = self.half_extents + other.half_extents;
        d.x <= r.x && d.y <= r.y && d.z <= r.z
    }

    /// Box covering every position this box held while moving `dz` along z
    pub fn swept_z(&self, dz: f32) -> Aabb {
        let mut swept = *self;
        swept.center.z -= dz / 2.0;
        swept.half_extents.z += dz.abs() / 2.0;
        swept
    }

    /// Shortest distance between the two boxes (0 when overlapping)
    pub fn separation(&self, other: &Aabb) -> f32 {
        let d = (self.center - other.center).abs();
        let r = self.half_extents + other.half_extents;
        (d - r).max(Vec3::ZERO).length()
    }
}

/// Result of a damage attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Invincible or still in the grace period
    Ignored,
    Hurt,
    /// Last life lost
    Fatal,
}

/// Apply one hit to the player, honoring invincibility and the cooldown
pub fn take_damage(player: &mut PlayerState, tuning: &Tuning, events: &mut Vec<GameEvent>) -> DamageOutcome {
    if player.invincible || player.damage_cooldown > 0.0 {
        return DamageOutcome::Ignored;
    }

    player.lives = player.lives.saturating_sub(1);
    player.combo = 0;
    player.damage_cooldown = tuning.damage_cooldown;

    let (intensity, duration) = SHAKE_MEDIUM;
    events.push(GameEvent::LivesChanged(player.lives));
    events.push(GameEvent::ComboChanged(0));
    events.push(GameEvent::Sound(SoundCue::Hit));
    events.push(GameEvent::Effect(EffectCue::ScreenShake { intensity, duration }));
    events.push(GameEvent::Effect(EffectCue::DamageFlash));

    if player.lives == 0 {
        DamageOutcome::Fatal
    } else {
        DamageOutcome::Hurt
    }
}

/// Apply a collectible's effect to the player
pub fn apply_pickup(
    player: &mut PlayerState,
    kind: CollectibleKind,
    tuning: &Tuning,
    events: &mut Vec<GameEvent>,
) {
    events.push(GameEvent::CollectibleGathered(kind));
    match kind {
        CollectibleKind::Water => {
            if player.lives < MAX_LIVES {
                player.lives += 1;
                events.push(GameEvent::LivesChanged(player.lives));
                events.push(GameEvent::Effect(EffectCue::LifeGained));
            } else {
                player.score += tuning.water_bonus_points as f32;
                events.push(GameEvent::BonusAwarded(tuning.water_bonus_points));
            }
            events.push(GameEvent::Sound(SoundCue::CollectWater));
        }
        CollectibleKind::Chili => {
            // Restart, never extend
            player.invincible = true;
            player.invincibility_timer = tuning.invincibility_duration;
            events.push(GameEvent::Effect(EffectCue::InvincibilityStart));
            events.push(GameEvent::Sound(SoundCue::CollectChili));
        }
        CollectibleKind::Coin => {
            player.coins += 1;
            events.push(GameEvent::CoinsChanged(player.coins));
            events.push(GameEvent::Sound(SoundCue::CollectCoin));
        }
    }
}

/// Move obstacles by `dz`, resolve hits, near misses and despawns.
///
/// Returns true if the player ran out of lives (the state is already in
/// `Ended` when this returns).
pub fn resolve_obstacles(state: &mut GameState, dz: f32) -> bool {
    let mut i = state.obstacles.len();
    while i > 0 {
        i -= 1;
        state.obstacles[i].position.z += dz;

        let player_box = state.player.aabb();
        let obstacle_box = state.obstacles[i].aabb();

        // Sweep the whole step so a long frame can't tunnel through the player
        if obstacle_box.swept_z(dz).intersects(&player_box) {
            if state.player.invincible {
                let obstacle = state.obstacles.remove(i);
                state.events.push(GameEvent::Effect(EffectCue::Smash(obstacle.position)));
                state.events.push(GameEvent::Sound(SoundCue::Smash));
                state.events.push(GameEvent::RemoveVisual { id: obstacle.id });
                continue;
            }

            state.obstacles[i].touched = true;
            if take_damage(&mut state.player, &state.tuning, &mut state.events) == DamageOutcome::Fatal {
                state.game_over();
                return true;
            }
        }

        let obstacle = &mut state.obstacles[i];
        if !obstacle.passed && obstacle.position.z > state.player.position.z {
            obstacle.passed = true;
            if !obstacle.touched && obstacle_box.separation(&player_box) < NEAR_MISS_THRESHOLD {
                state.player.combo += 1;
                state.player.score += state.tuning.near_miss_points as f32;
                state.events.push(GameEvent::ComboChanged(state.player.combo));
                state.events.push(GameEvent::BonusAwarded(state.tuning.near_miss_points));
                state.events.push(GameEvent::Sound(SoundCue::NearMiss));
            }
        }

        if state.obstacles[i].position.z > OBSTACLE_DESPAWN_Z {
            let obstacle = state.obstacles.remove(i);
            state.events.push(GameEvent::RemoveVisual { id: obstacle.id });
        }
    }
    false
}

/// Move collectibles by `dz`, resolve pickups and despawns
pub fn resolve_collectibles(state: &mut GameState, dz: f32) {
    let mut i = state.collectibles.len();
    while i > 0 {
        i -= 1;
        state.collectibles[i].position.z += dz;

        let collectible = &state.collectibles[i];
        if collectible.position.distance(state.player.position) < collectible.radius {
            let collectible = state.collectibles.remove(i);
            apply_pickup(&mut state.player, collectible.kind, &state.tuning, &mut state.events);
            state.events.push(GameEvent::RemoveVisual { id: collectible.id });
            continue;
        }

        if collectible.position.z > OBSTACLE_DESPAWN_Z {
            let collectible = state.collectibles.remove(i);
            state.events.push(GameEvent::RemoveVisual { id: collectible.id });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::phase::GamePhase;
    use crate::sim::state::{Collectible, Obstacle, ObstacleKind};

    fn gameplay_state() -> GameState {
        let mut state = GameState::new(1, Tuning::default());
        state.machine.request(GamePhase::CutscenePlaying);
        state.machine.request(GamePhase::CutsceneExiting);
        state.machine.request(GamePhase::Gameplay);
        state
    }

    /// An obstacle sitting on the player in the middle lane
    fn obstacle_on_player(state: &mut GameState) {
        let id = state.next_entity_id();
        let mut obstacle = Obstacle::new(id, ObstacleKind::ConcreteBlock, 0, 0.0);
        obstacle.position.z = 0.0;
        state.obstacles.push(obstacle);
    }

    #[test]
    fn test_aabb_intersects() {
        let a = Aabb::from_center_size(Vec3::ZERO, Vec3::splat(2.0));
        let b = Aabb::from_center_size(Vec3::new(1.5, 0.0, 0.0), Vec3::splat(2.0));
        let c = Aabb::from_center_size(Vec3::new(5.0, 0.0, 0.0), Vec3::splat(2.0));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert_eq!(a.separation(&b), 0.0);
        assert!((a.separation(&c) - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_swept_box_covers_the_step() {
        let b = Aabb::from_center_size(Vec3::new(0.0, 0.0, 2.0), Vec3::splat(1.0));
        let swept = b.swept_z(4.0);
        assert_eq!(swept.min().z, -2.5);
        assert_eq!(swept.max().z, 2.5);
        assert_eq!(b.swept_z(0.0), b);
    }

    #[test]
    fn test_long_step_cannot_tunnel_through_player() {
        let mut state = gameplay_state();
        let id = state.next_entity_id();
        let mut wall = Obstacle::new(id, ObstacleKind::LowWall, 0, 2.0);
        wall.position.z = -3.0;
        state.obstacles.push(wall);

        // Level 5 on insane with a 100 ms frame: 48 * 1.5 * 0.1
        let dz = 7.2;
        assert!(!resolve_obstacles(&mut state, dz));
        assert!(state.obstacles[0].position.z > PLAYER_WIDTH);
        assert_eq!(state.player.lives, 2);
        assert!(state.obstacles[0].touched);
    }

    #[test]
    fn test_damage_cooldown_idempotence() {
        let tuning = Tuning::default();
        let mut player = PlayerState::new(3);
        let mut events = Vec::new();
        assert_eq!(take_damage(&mut player, &tuning, &mut events), DamageOutcome::Hurt);
        assert_eq!(take_damage(&mut player, &tuning, &mut events), DamageOutcome::Ignored);
        assert_eq!(player.lives, 2);
    }

    #[test]
    fn test_two_collisions_in_cooldown_cost_one_life() {
        let mut state = gameplay_state();
        obstacle_on_player(&mut state);
        assert!(!resolve_obstacles(&mut state, 0.0));
        assert!(!resolve_obstacles(&mut state, 0.0));
        assert_eq!(state.player.lives, 2);
        assert_eq!(state.obstacles.len(), 1);
    }

    #[test]
    fn test_invincibility_overrides_damage() {
        let mut state = gameplay_state();
        state.player.invincible = true;
        state.player.invincibility_timer = 5.0;
        for _ in 0..3 {
            obstacle_on_player(&mut state);
        }
        assert!(!resolve_obstacles(&mut state, 0.0));
        assert_eq!(state.player.lives, 3);
        assert!(state.obstacles.is_empty());
        let smashes = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::Sound(SoundCue::Smash)))
            .count();
        assert_eq!(smashes, 3);
    }

    #[test]
    fn test_invincibility_ignores_cooldown_state() {
        let mut player = PlayerState::new(2);
        player.invincible = true;
        player.damage_cooldown = 0.0;
        let mut events = Vec::new();
        assert_eq!(take_damage(&mut player, &Tuning::default(), &mut events), DamageOutcome::Ignored);
        assert!(events.is_empty());
    }

    #[test]
    fn test_fatal_hit_ends_game() {
        let mut state = gameplay_state();
        state.player.lives = 1;
        obstacle_on_player(&mut state);
        assert!(resolve_obstacles(&mut state, 0.0));
        assert_eq!(state.phase(), GamePhase::Ended);
    }

    #[test]
    fn test_reverse_iteration_removes_all_passed() {
        let mut state = gameplay_state();
        for lane in [-1, 0, 1, 1] {
            let id = state.next_entity_id();
            let mut obstacle = Obstacle::new(id, ObstacleKind::LowWall, lane, 2.0);
            obstacle.position.z = OBSTACLE_DESPAWN_Z - 0.5;
            state.obstacles.push(obstacle);
        }
        // Lift the player clear so nothing hits
        state.player.position.y = 50.0;
        resolve_obstacles(&mut state, 1.0);
        assert!(state.obstacles.is_empty());
    }

    #[test]
    fn test_near_miss_awards_combo() {
        let mut state = gameplay_state();
        let id = state.next_entity_id();
        let mut obstacle = Obstacle::new(id, ObstacleKind::ConcreteBlock, 1, 0.0);
        obstacle.position.z = -0.5;
        state.obstacles.push(obstacle);
        // Block spans x 2.75..5.25, player edge at 1.25
        state.player.position.x = 0.5;
        resolve_obstacles(&mut state, 1.0);
        assert_eq!(state.player.combo, 1);
        assert_eq!(state.player.score, COMBO_NEAR_MISS_POINTS);

        // Crossing is only counted once
        resolve_obstacles(&mut state, 1.0);
        assert_eq!(state.player.combo, 1);
    }

    #[test]
    fn test_water_pickup_at_cap_grants_bonus() {
        let tuning = Tuning::default();
        let mut player = PlayerState::new(MAX_LIVES);
        let mut events = Vec::new();
        apply_pickup(&mut player, CollectibleKind::Water, &tuning, &mut events);
        assert_eq!(player.lives, MAX_LIVES);
        assert_eq!(player.score, WATER_BONUS_POINTS);
        assert!(events.contains(&GameEvent::BonusAwarded(1000)));
    }

    #[test]
    fn test_water_pickup_below_cap_heals() {
        let mut player = PlayerState::new(2);
        let mut events = Vec::new();
        apply_pickup(&mut player, CollectibleKind::Water, &Tuning::default(), &mut events);
        assert_eq!(player.lives, 3);
        assert_eq!(player.score, 0.0);
    }

    #[test]
    fn test_chili_restarts_timer() {
        let tuning = Tuning::default();
        let mut player = PlayerState::new(3);
        let mut events = Vec::new();
        apply_pickup(&mut player, CollectibleKind::Chili, &tuning, &mut events);
        player.invincibility_timer = 1.0;
        apply_pickup(&mut player, CollectibleKind::Chili, &tuning, &mut events);
        assert!(player.invincible);
        assert_eq!(player.invincibility_timer, INVINCIBILITY_DURATION);
    }

    #[test]
    fn test_collectible_pickup_and_despawn() {
        let mut state = gameplay_state();
        let id = state.next_entity_id();
        let mut coin = Collectible::new(id, CollectibleKind::Coin, 0);
        coin.position.z = -1.0;
        state.collectibles.push(coin);
        let id = state.next_entity_id();
        let mut far = Collectible::new(id, CollectibleKind::Water, 1);
        far.position.z = OBSTACLE_DESPAWN_Z;
        state.collectibles.push(far);

        resolve_collectibles(&mut state, 1.0);
        assert!(state.collectibles.is_empty());
        assert_eq!(state.player.coins, 1);
        assert_eq!(state.player.lives, 3);
    }
}
