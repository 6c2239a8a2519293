//! Idle/demo mode - the computer plays the catch game

use super::state::GameState;
use super::tick::TickInput;

/// Pixels of slack before the paddle bothers to move
const DEAD_ZONE: f32 = 4.0;

/// Produce this frame's input from the current state
///
/// Tracks good apples and dodges spoiled ones, since catching a spoiled
/// apple resets the run.
pub fn autopilot(state: &GameState) -> TickInput {
    let mut input = TickInput {
        launch: state.object.stuck,
        ..Default::default()
    };

    let paddle_x = state.paddle.center_x();
    let object_x = state.object.center().x;
    let delta = object_x - paddle_x;

    if state.object.spoiled {
        // Only dodge when it is actually lined up with the basket
        let reach = state.paddle.size.x / 2.0 + state.object.radius;
        if delta.abs() <= reach {
            let room_left = state.paddle.pos.x;
            let room_right = state.tuning.paddle_max_x() - state.paddle.pos.x;
            // Move away from the apple, or toward the side with more room
            // when pinned against a wall
            if (delta >= 0.0 && room_left > 0.0) || room_right <= 0.0 {
                input.left = true;
            } else {
                input.right = true;
            }
        }
    } else if delta > DEAD_ZONE {
        input.right = true;
    } else if delta < -DEAD_ZONE {
        input.left = true;
    }

    input
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::state::{GameEvent, Tuning};
    use crate::sim::tick::tick;
    use glam::Vec2;

    #[test]
    fn test_launches_when_stuck() {
        let state = GameState::new(Tuning::default(), 3);
        assert!(autopilot(&state).launch);
    }

    #[test]
    fn test_tracks_good_apple() {
        let mut state = GameState::new(Tuning::default(), 3);
        state.object.pos = Vec2::new(700.0, 100.0);
        let input = autopilot(&state);
        assert!(input.right && !input.left);

        state.object.pos = Vec2::new(20.0, 100.0);
        let input = autopilot(&state);
        assert!(input.left && !input.right);
    }

    #[test]
    fn test_dodges_spoiled_apple() {
        let mut state = GameState::new(Tuning::default(), 3);
        state.set_collisions(5);
        state.object.pos = Vec2::new(state.paddle.center_x(), 100.0);
        let input = autopilot(&state);
        assert!(input.left && !input.right);
    }

    #[test]
    fn test_autopilot_catches_apples() {
        let mut state = GameState::new(Tuning::default(), 2024);
        let mut caught = 0;
        for _ in 0..120 * 60 {
            let input = autopilot(&state);
            tick(&mut state, &input, SIM_DT);
            caught += state
                .drain_events()
                .iter()
                .filter(|e| matches!(e, GameEvent::Caught { .. }))
                .count();
        }
        assert!(caught > 0);
    }
}
