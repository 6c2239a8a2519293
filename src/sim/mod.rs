//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod clock;
pub mod collision;
pub mod state;
pub mod tick;
pub mod triangle;

pub use autopilot::autopilot;
pub use clock::FixedStep;
pub use collision::{Aabb, check_collision};
pub use state::{FallingObject, GameEvent, GameState, Paddle, Tuning};
pub use tick::{TickInput, process_input, tick, update};
pub use triangle::{Heading, TriangleMover};
