//! Runner physics: jumping, sliding, lane changes and timers

use glam::Vec3;

use super::events::{EffectCue, GameEvent, SoundCue};
use super::state::PlayerState;
use crate::consts::*;
use crate::lane_x;

impl PlayerState {
    /// Jump from the ground, or double-jump while airborne.
    ///
    /// Returns false when the jump budget is spent.
    pub fn jump(&mut self, events: &mut Vec<GameEvent>) -> bool {
        if self.grounded {
            self.velocity_y = JUMP_VELOCITY;
            self.jump_count = 1;
            self.grounded = false;
            events.push(GameEvent::Effect(EffectCue::Dust(self.position)));
            events.push(GameEvent::Sound(SoundCue::Jump));
            true
        } else if self.jump_count < MAX_JUMPS {
            self.velocity_y = JUMP_VELOCITY;
            self.jump_count += 1;
            events.push(GameEvent::Sound(SoundCue::Jump));
            true
        } else {
            false
        }
    }

    /// Start a slide. Only possible on the ground and not mid-slide.
    pub fn slide(&mut self, events: &mut Vec<GameEvent>) -> bool {
        if !self.grounded || self.sliding {
            return false;
        }
        self.sliding = true;
        self.slide_timer = SLIDE_DURATION;
        events.push(GameEvent::Effect(EffectCue::Dust(self.position)));
        events.push(GameEvent::Sound(SoundCue::Slide));
        true
    }

    /// Shift the target lane by `direction`, clamped to the three lanes
    pub fn change_lane(&mut self, direction: i8) {
        self.target_lane = (self.target_lane + direction.signum()).clamp(-1, 1);
    }

    /// Integrate one frame of motion and count down timers
    pub fn update(&mut self, dt: f32, events: &mut Vec<GameEvent>) {
        // Ease toward the target lane
        let target_x = lane_x(self.target_lane);
        self.position.x += (target_x - self.position.x) * PLAYER_MOVE_SPEED * dt;

        self.velocity_y += GRAVITY * dt;
        self.position.y += self.velocity_y * dt;

        if self.position.y <= 0.0 {
            self.position.y = 0.0;
            self.velocity_y = 0.0;
            self.jump_count = 0;
            if !self.grounded {
                self.grounded = true;
                events.push(GameEvent::Sound(SoundCue::Land));
                events.push(GameEvent::Effect(EffectCue::Dust(Vec3::new(
                    self.position.x,
                    0.0,
                    self.position.z,
                ))));
            }
        }

        if self.sliding {
            self.slide_timer -= dt;
            if self.slide_timer <= 0.0 {
                self.slide_timer = 0.0;
                self.sliding = false;
            }
        }

        if self.invincible {
            self.invincibility_timer -= dt;
            if self.invincibility_timer <= 0.0 {
                self.invincibility_timer = 0.0;
                self.invincible = false;
                events.push(GameEvent::Effect(EffectCue::InvincibilityEnd));
            }
        }

        if self.damage_cooldown > 0.0 {
            self.damage_cooldown = (self.damage_cooldown - dt).max(0.0);
        }
    }
}
