//! Game state and core simulation types
//!
//! The controller owns both entities and the collision counter by value.
//! Reset mutates fields in place; nothing is reconstructed after `new`.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::collision::Aabb;
use crate::consts::*;

/// Field size and gameplay tuning, fixed for the lifetime of a game
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tuning {
    /// Play-field size (width, height)
    pub field: Vec2,
    pub paddle_size: Vec2,
    /// Paddle speed in pixels/s
    pub paddle_speed: f32,
    pub object_radius: f32,
    /// Velocity restored on reset
    pub initial_velocity: Vec2,
    /// Speed gained per counter unit on a catch
    pub speed_step: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            field: Vec2::new(FIELD_WIDTH, FIELD_HEIGHT),
            paddle_size: Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
            paddle_speed: PLAYER_VELOCITY,
            object_radius: BALL_RADIUS,
            initial_velocity: Vec2::from(INITIAL_BALL_VELOCITY),
            speed_step: BALL_SPEED_STEP,
        }
    }
}

impl Tuning {
    /// Centered paddle position resting on the bottom edge
    pub fn paddle_home(&self) -> Vec2 {
        Vec2::new(
            self.field.x / 2.0 - self.paddle_size.x / 2.0,
            self.field.y - self.paddle_size.y,
        )
    }

    /// Top-center spawn point of the falling object
    pub fn object_spawn(&self) -> Vec2 {
        Vec2::new(
            self.field.x / 2.0 - self.object_radius,
            self.object_radius,
        )
    }

    /// Rightmost x the paddle may occupy
    pub fn paddle_max_x(&self) -> f32 {
        (self.field.x - self.paddle_size.x).max(0.0)
    }
}

/// The player's basket
#[derive(Debug, Clone, PartialEq)]
pub struct Paddle {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
}

impl Paddle {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            pos: tuning.paddle_home(),
            size: tuning.paddle_size,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_rect(self.pos, self.size)
    }

    /// Move horizontally by `dx`, staying inside `[0, max_x]`
    pub fn shift(&mut self, dx: f32, max_x: f32) {
        self.pos.x = (self.pos.x + dx).clamp(0.0, max_x);
    }

    pub fn center_x(&self) -> f32 {
        self.pos.x + self.size.x / 2.0
    }
}

/// The falling apple
#[derive(Debug, Clone, PartialEq)]
pub struct FallingObject {
    /// Top-left corner of the bounding box
    pub pos: Vec2,
    pub radius: f32,
    pub vel: Vec2,
    /// Spoiled apples reset the game when caught
    pub spoiled: bool,
    /// Held at the spawn point until launched
    pub stuck: bool,
}

impl FallingObject {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            pos: tuning.object_spawn(),
            radius: tuning.object_radius,
            vel: tuning.initial_velocity,
            spoiled: false,
            stuck: true,
        }
    }

    /// Bounding box size (diameter on both axes)
    pub fn size(&self) -> Vec2 {
        Vec2::splat(self.radius * 2.0)
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_rect(self.pos, self.size())
    }

    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(self.radius)
    }

    /// Integrate position and bounce off the side walls
    pub fn advance(&mut self, dt: f32, field_width: f32) {
        if self.stuck {
            return;
        }

        self.pos += self.vel * dt;

        let size = self.radius * 2.0;
        if self.pos.x <= 0.0 {
            self.pos.x = 0.0;
            self.vel.x = self.vel.x.abs();
        } else if self.pos.x + size >= field_width {
            self.pos.x = (field_width - size).max(0.0);
            self.vel.x = -self.vel.x.abs();
        }
    }

    /// Increase speed along the current direction of travel
    pub fn increase_speed(&mut self, amount: f32) {
        let dir = self.vel.normalize_or_zero();
        self.vel += dir * amount;
    }

    /// Reposition without touching velocity or flags
    pub fn teleport(&mut self, pos: Vec2) {
        self.pos = pos;
    }

    /// Back to spawn at the initial velocity, waiting for launch
    pub fn reset(&mut self, pos: Vec2, vel: Vec2) {
        self.pos = pos;
        self.vel = vel;
        self.stuck = true;
    }
}

/// Events emitted by the controller during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// Object released from the spawn point
    Launched,
    /// Good apple caught; counter after the catch
    Caught { collisions: u32 },
    /// Spoiled apple caught, game reset
    SpoiledCaught,
    /// Good apple fell off the field, game reset
    Dropped,
    /// Spoiled apple fell off the field; counter after the miss
    SpoiledDropped { collisions: u32 },
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub tuning: Tuning,
    pub paddle: Paddle,
    pub object: FallingObject,
    /// Collisions since the last reset, starting from the baseline
    collisions: u32,
    /// Highest counter value reached this run
    pub best_streak: u32,
    /// Events produced since the last drain
    pub events: Vec<GameEvent>,
    rng: Pcg32,
}

impl GameState {
    /// Create a new game with the given tuning and seed
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        let mut state = Self {
            seed,
            tuning,
            paddle: Paddle::new(&tuning),
            object: FallingObject::new(&tuning),
            collisions: COLLISION_BASELINE,
            best_streak: COLLISION_BASELINE,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
        };
        state.refresh_spoiled();
        state
    }

    pub fn collisions(&self) -> u32 {
        self.collisions
    }

    /// Bump the counter and keep `spoiled` in step with it
    pub fn increment_collisions(&mut self) -> u32 {
        self.collisions += 1;
        self.best_streak = self.best_streak.max(self.collisions);
        self.refresh_spoiled();
        self.collisions
    }

    /// Recompute `spoiled` from the counter
    pub fn refresh_spoiled(&mut self) {
        self.object.spoiled = self.collisions % SPOIL_PERIOD == 0;
    }

    /// Restore paddle, object and counter to their starting values
    pub fn reset(&mut self) {
        self.paddle.size = self.tuning.paddle_size;
        self.paddle.pos = self.tuning.paddle_home();
        self.object
            .reset(self.tuning.object_spawn(), self.tuning.initial_velocity);
        self.collisions = COLLISION_BASELINE;
        self.refresh_spoiled();
    }

    /// Random position along the top edge, fully inside the field
    pub fn random_top_position(&mut self) -> Vec2 {
        let max_x = (self.tuning.field.x - self.object.size().x).max(0.0);
        let x = if max_x > 0.0 {
            self.rng.random_range(0.0..=max_x)
        } else {
            0.0
        };
        Vec2::new(x, self.tuning.object_radius)
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    #[cfg(test)]
    pub(crate) fn set_collisions(&mut self, value: u32) {
        self.collisions = value;
        self.refresh_spoiled();
    }
}
