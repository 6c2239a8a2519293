//! Fixed timestep simulation tick
//!
//! Input is applied first, then the object advances, collisions are
//! resolved, `spoiled` is recomputed, and finally the off-field check runs.

use super::collision::check_collision;
use super::state::{GameEvent, GameState};
use crate::input::{Key, Keys};

/// Input commands for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Move paddle left while held
    pub left: bool,
    /// Move paddle right while held
    pub right: bool,
    /// Release the object from the spawn point
    pub launch: bool,
}

impl TickInput {
    /// Poll the key-state set once for this frame
    pub fn from_keys(keys: &Keys) -> Self {
        Self {
            left: keys.is_down(Key::Left),
            right: keys.is_down(Key::Right),
            launch: keys.is_down(Key::Launch),
        }
    }
}

/// Apply held keys to the paddle and the launch flag
pub fn process_input(state: &mut GameState, input: &TickInput, dt: f32) {
    let step = state.tuning.paddle_speed * dt;
    let max_x = state.tuning.paddle_max_x();

    if input.left {
        state.paddle.shift(-step, max_x);
    }
    if input.right {
        state.paddle.shift(step, max_x);
    }

    if input.launch && state.object.stuck {
        state.object.stuck = false;
        state.events.push(GameEvent::Launched);
    }
}

/// Advance object, resolve the catch, then handle leaving the field
pub fn update(state: &mut GameState, dt: f32) {
    state.object.advance(dt, state.tuning.field.x);

    let collided = do_collisions(state);

    state.refresh_spoiled();

    if !collided && state.object.pos.y >= state.tuning.field.y {
        if state.object.spoiled {
            let collisions = state.increment_collisions();
            let pos = state.random_top_position();
            state.object.teleport(pos);
            log::info!("Spoiled apple dropped safely (collisions: {})", collisions);
            state.events.push(GameEvent::SpoiledDropped { collisions });
        } else {
            log::info!(
                "Apple dropped at {} collisions, resetting",
                state.collisions()
            );
            state.reset();
            state.events.push(GameEvent::Dropped);
        }
    }
}

/// Paddle/object overlap; returns true if one was resolved
fn do_collisions(state: &mut GameState) -> bool {
    if !check_collision(&state.object.bounds(), &state.paddle.bounds()) {
        return false;
    }

    if state.object.spoiled {
        log::info!(
            "Spoiled apple caught at {} collisions, resetting",
            state.collisions()
        );
        state.reset();
        state.events.push(GameEvent::SpoiledCaught);
    } else {
        let collisions = state.increment_collisions();
        state
            .object
            .increase_speed(state.tuning.speed_step * collisions as f32);
        let pos = state.random_top_position();
        state.object.teleport(pos);
        log::debug!(
            "Caught apple (collisions: {}, speed: {:.1})",
            collisions,
            state.object.vel.length()
        );
        state.events.push(GameEvent::Caught { collisions });
    }

    true
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    process_input(state, input, dt);
    update(state, dt);
}
