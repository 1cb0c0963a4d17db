//! Per-frame simulation tick
//!
//! Routes abstract intents and the frame delta to whatever the current phase
//! runs: dialogue, scripted movement, or the runner itself.

use super::collision::{resolve_collectibles, resolve_obstacles};
use super::events::GameEvent;
use super::phase::GamePhase;
use super::state::{Collectible, GameState, Obstacle, VisualKind};

/// Input intents for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub move_left: bool,
    pub move_right: bool,
    pub jump: bool,
    pub slide: bool,
    /// Pause toggle
    pub pause: bool,
    /// Order at the counter
    pub interact: bool,
    /// Skip to the next dialogue line
    pub advance_dialogue: bool,
    /// Finish the current level immediately (debug/testing)
    pub skip_level: bool,
}

impl TickInput {
    fn has_movement(&self) -> bool {
        self.move_left || self.move_right || self.jump || self.slide
    }
}

/// Advance the game by one frame of `dt` seconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    let dt = state.tuning.cap_dt(dt);

    if input.pause {
        state.toggle_pause();
    }

    match state.phase() {
        GamePhase::Menu | GamePhase::Paused | GamePhase::Ended => {}
        GamePhase::CutscenePlaying => {
            if input.has_movement() {
                log::debug!("Movement ignored during cutscene");
            }
            if input.interact {
                state.interact();
            }
            if input.advance_dialogue {
                state.advance_dialogue();
            }
            if state.phase() == GamePhase::CutscenePlaying {
                state.tick_dialogue(dt * 1000.0);
            }
        }
        GamePhase::CutsceneExiting => state.update_exit_run(dt),
        GamePhase::CostcoApproach => state.update_approach(dt),
        GamePhase::DraggingOut => state.update_drag_out(dt),
        GamePhase::Gameplay => gameplay_tick(state, input, dt),
    }
}

fn gameplay_tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if input.skip_level {
        state.complete_level();
        return;
    }

    if input.move_left {
        state.player.change_lane(-1);
    }
    if input.move_right {
        state.player.change_lane(1);
    }
    if input.jump {
        state.player.jump(&mut state.events);
    }
    if input.slide {
        state.player.slide(&mut state.events);
    }

    let Some(level) = state.level() else {
        return;
    };
    let length = level.length;
    let speed = state.current_speed();

    state.player.score += speed * dt;
    state.events.push(GameEvent::ScoreChanged {
        distance: state.player.score as u32,
        progress: (state.player.score / length).min(1.0),
    });
    if state.player.score >= length {
        state.complete_level();
        return;
    }

    state.player.update(dt, &mut state.events);

    spawn(state);

    let dz = speed * dt;
    if resolve_obstacles(state, dz) {
        return;
    }
    resolve_collectibles(state, dz);
}

/// Ask the scheduler for new entities and add them to the world
fn spawn(state: &mut GameState) {
    let Some(level) = state.levels.get(state.level_index) else {
        return;
    };
    let batch = state.spawner.update(
        state.player.score,
        level,
        state.difficulty_settings.gap_multiplier,
        state.tuning.coin_share,
    );

    if let Some(o) = batch.obstacle {
        let id = state.next_entity_id();
        let obstacle = Obstacle::new(id, o.kind, o.lane, o.height);
        state.events.push(GameEvent::SpawnVisual {
            id,
            visual: VisualKind::Obstacle {
                kind: o.kind,
                height: o.height,
            },
            position: obstacle.position,
        });
        state.obstacles.push(obstacle);
    }

    if let Some(c) = batch.collectible {
        let id = state.next_entity_id();
        let collectible = Collectible::new(id, c.kind, c.lane);
        state.events.push(GameEvent::SpawnVisual {
            id,
            visual: VisualKind::Collectible(c.kind),
            position: collectible.position,
        });
        state.collectibles.push(collectible);
    }
}
