//! Game settings and tuning
//!
//! Stored as JSON: a file named by `APPLE_CATCH_SETTINGS` on native,
//! LocalStorage in the browser. Missing fields take their defaults.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::Tuning;

/// Environment variable pointing at a settings file (native only)
pub const SETTINGS_ENV: &str = "APPLE_CATCH_SETTINGS";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid settings: {0}")]
    InvalidField(String),
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Field ===
    pub field_width: f32,
    pub field_height: f32,

    // === Paddle ===
    pub paddle_width: f32,
    pub paddle_height: f32,
    /// Pixels per second
    pub paddle_speed: f32,

    // === Falling object ===
    pub object_radius: f32,
    /// Starting velocity, y grows downward
    pub initial_velocity: [f32; 2],
    /// Speed gained per collision-counter unit
    pub speed_step: f32,

    // === Run ===
    /// Fixed RNG seed; a time-based seed is used when unset
    pub seed: Option<u64>,
    /// Start with the autopilot playing
    pub idle_mode: bool,
    /// Frames simulated by the native headless runner
    pub headless_frames: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            field_width: FIELD_WIDTH,
            field_height: FIELD_HEIGHT,

            paddle_width: PLAYER_WIDTH,
            paddle_height: PLAYER_HEIGHT,
            paddle_speed: PLAYER_VELOCITY,

            object_radius: BALL_RADIUS,
            initial_velocity: INITIAL_BALL_VELOCITY,
            speed_step: BALL_SPEED_STEP,

            seed: None,
            idle_mode: false,
            headless_frames: 120 * 60,
        }
    }
}

impl Settings {
    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Strict load from a file
    pub fn load_from(path: impl AsRef<std::path::Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Reject fields the game cannot run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        let positive = [
            ("field_width", self.field_width),
            ("field_height", self.field_height),
            ("paddle_width", self.paddle_width),
            ("paddle_height", self.paddle_height),
            ("paddle_speed", self.paddle_speed),
            ("object_radius", self.object_radius),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(SettingsError::InvalidField(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }

        if self.paddle_width > self.field_width || self.paddle_height > self.field_height {
            return Err(SettingsError::InvalidField(
                "paddle does not fit in the field".to_string(),
            ));
        }
        if self.object_radius * 2.0 >= self.field_width
            || self.object_radius * 2.0 >= self.field_height
        {
            return Err(SettingsError::InvalidField(
                "falling object does not fit in the field".to_string(),
            ));
        }
        if !self.speed_step.is_finite() || self.speed_step < 0.0 {
            return Err(SettingsError::InvalidField(
                "speed_step must be zero or positive".to_string(),
            ));
        }
        let vel = Vec2::from(self.initial_velocity);
        if !vel.is_finite() || vel.y <= 0.0 {
            return Err(SettingsError::InvalidField(
                "initial_velocity must point down the field".to_string(),
            ));
        }

        Ok(())
    }

    /// Gameplay tuning for the simulation
    pub fn tuning(&self) -> Tuning {
        Tuning {
            field: Vec2::new(self.field_width, self.field_height),
            paddle_size: Vec2::new(self.paddle_width, self.paddle_height),
            paddle_speed: self.paddle_speed,
            object_radius: self.object_radius,
            initial_velocity: Vec2::from(self.initial_velocity),
            speed_step: self.speed_step,
        }
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "apple_catch_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Load settings from the file named by `APPLE_CATCH_SETTINGS`
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let Ok(path) = std::env::var(SETTINGS_ENV) else {
            log::info!("Using default settings");
            return Self::default();
        };

        match Self::load_from(&path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path);
                settings
            }
            Err(e) => {
                log::warn!("{} ({}), using defaults", e, path);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.tuning(), Tuning::default());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings = Settings::from_json(r#"{ "field_width": 1024.0, "seed": 9 }"#).unwrap();
        assert_eq!(settings.field_width, 1024.0);
        assert_eq!(settings.seed, Some(9));
        assert_eq!(settings.field_height, FIELD_HEIGHT);
        assert_eq!(settings.paddle_speed, PLAYER_VELOCITY);
    }

    #[test]
    fn test_paddle_wider_than_field_rejected() {
        let settings = Settings {
            paddle_width: 900.0,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::InvalidField(_))
        ));
    }

    #[test]
    fn test_upward_velocity_rejected() {
        let settings = Settings {
            initial_velocity: [100.0, -150.0],
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_bad_json_is_parse_error() {
        assert!(matches!(
            Settings::from_json("{ not json"),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            Settings::load_from("/definitely/not/here.json"),
            Err(SettingsError::Io(_))
        ));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_load_falls_back_to_defaults() {
        let path = std::env::temp_dir().join(format!("apple_catch_settings_{}.json", std::process::id()));
        // SAFETY: no other test reads or writes this variable
        unsafe { std::env::set_var(SETTINGS_ENV, &path) };

        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(Settings::load(), Settings::default());

        std::fs::write(&path, r#"{ "paddle_width": 900.0 }"#).unwrap();
        assert_eq!(Settings::load(), Settings::default());

        std::fs::write(&path, r#"{ "seed": 42 }"#).unwrap();
        assert_eq!(Settings::load().seed, Some(42));

        std::fs::remove_file(&path).unwrap();
        assert_eq!(Settings::load(), Settings::default());

        unsafe { std::env::remove_var(SETTINGS_ENV) };
    }
}
