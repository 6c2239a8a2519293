//! Apple Catch - a falling-object arcade game and a hello-triangle demo
//!
//! Core modules:
//! - `sim`: Deterministic simulation (game loop controller, collisions, triangle mover)
//! - `input`: Key-state set polled once per frame
//! - `resources`: String-keyed texture/shader registry
//! - `renderer`: Sprite drawing contract, procedural textures, WebGPU backend
//! - `settings`: Field size and gameplay tuning

pub mod input;
pub mod renderer;
pub mod resources;
pub mod settings;
pub mod sim;

pub use resources::{ResourceError, ResourceManager};
pub use settings::{Settings, SettingsError};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame we are willing to simulate (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Play-field dimensions
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 600.0;

    /// Paddle (basket) defaults
    pub const PLAYER_WIDTH: f32 = 100.0;
    pub const PLAYER_HEIGHT: f32 = 20.0;
    /// Paddle speed in pixels/s
    pub const PLAYER_VELOCITY: f32 = 500.0;

    /// Falling object (apple) defaults
    pub const BALL_RADIUS: f32 = 12.5;
    /// Slowest velocity, y grows downward
    pub const INITIAL_BALL_VELOCITY: [f32; 2] = [100.0, 150.0];
    /// Speed gained per collision-counter unit on each catch
    pub const BALL_SPEED_STEP: f32 = 10.0;

    /// Every Nth collision cycle spoils the apple
    pub const SPOIL_PERIOD: u32 = 5;
    /// Counter value after a reset
    pub const COLLISION_BASELINE: u32 = 1;
}
