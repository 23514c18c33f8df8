//! Generator configuration and its validation.
//!
//! ```
//! use produngeon_logic::config::{validate_config, GeneratorConfig};
//!
//! let mut config = GeneratorConfig::default();
//! config.min_rooms = 8;
//! config.max_rooms = 12;
//! assert!(validate_config(&config).is_empty());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::modificator::ShapePolarity;

/// Knobs for one generation session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Floor width in cells.
    pub grid_cols: usize,
    /// Floor height in cells.
    pub grid_rows: usize,
    /// Lower bound of the uniform room-count draw.
    pub min_rooms: u32,
    /// Upper bound of the draw, and a hard cap on placed rooms.
    pub max_rooms: u32,
    /// Largest shift the count signal can apply to the drawn target.
    pub variance: f32,
    /// Whether a blueprint may be drawn more than once per session.
    pub allow_repeats: bool,
    pub shape_polarity: ShapePolarity,
    /// Seed for the session's random source.
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            grid_cols: 200,
            grid_rows: 200,
            min_rooms: 5,
            max_rooms: 5,
            variance: 0.0,
            allow_repeats: false,
            shape_polarity: ShapePolarity::VerticalWhenHigh,
            seed: 0,
        }
    }
}

impl GeneratorConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Same config with `min_rooms` and `max_rooms` set.
    pub fn with_rooms(mut self, min_rooms: u32, max_rooms: u32) -> Self {
        self.min_rooms = min_rooms;
        self.max_rooms = max_rooms;
        self
    }

    pub fn with_grid(mut self, cols: usize, rows: usize) -> Self {
        self.grid_cols = cols;
        self.grid_rows = rows;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("floor grid must be at least 1x1, got {cols}x{rows}")]
    EmptyGrid { cols: usize, rows: usize },
    #[error("min_rooms ({min}) is greater than max_rooms ({max})")]
    RoomRangeInverted { min: u32, max: u32 },
    #[error("variance must be a non-negative number, got {0}")]
    InvalidVariance(f32),
}

/// Validate a generator configuration, returning all errors found.
pub fn validate_config(config: &GeneratorConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    if config.grid_cols == 0 || config.grid_rows == 0 {
        errors.push(ConfigError::EmptyGrid {
            cols: config.grid_cols,
            rows: config.grid_rows,
        });
    }
    if config.min_rooms > config.max_rooms {
        errors.push(ConfigError::RoomRangeInverted {
            min: config.min_rooms,
            max: config.max_rooms,
        });
    }
    if !config.variance.is_finite() || config.variance < 0.0 {
        errors.push(ConfigError::InvalidVariance(config.variance));
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(validate_config(&GeneratorConfig::default()).is_empty());
    }

    #[test]
    fn test_reports_every_problem() {
        let config = GeneratorConfig {
            grid_cols: 0,
            min_rooms: 9,
            max_rooms: 3,
            variance: -1.0,
            ..GeneratorConfig::default()
        };
        let errors = validate_config(&config);
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ConfigError::RoomRangeInverted { min: 9, max: 3 }));
    }

    #[test]
    fn test_nan_variance_rejected() {
        let config = GeneratorConfig {
            variance: f32::NAN,
            ..GeneratorConfig::default()
        };
        assert!(matches!(
            validate_config(&config).as_slice(),
            [ConfigError::InvalidVariance(_)]
        ));
    }

    #[test]
    fn test_json_fills_missing_fields_with_defaults() {
        let config = GeneratorConfig::from_json(r#"{ "max_rooms": 20, "allow_repeats": true }"#).unwrap();
        assert_eq!(config.max_rooms, 20);
        assert!(config.allow_repeats);
        assert_eq!(config.grid_cols, 200);
        assert_eq!(config.shape_polarity, ShapePolarity::VerticalWhenHigh);
    }

    #[test]
    fn test_builders() {
        let config = GeneratorConfig::default()
            .with_rooms(2, 4)
            .with_grid(30, 20)
            .with_seed(7);
        assert_eq!((config.min_rooms, config.max_rooms), (2, 4));
        assert_eq!((config.grid_cols, config.grid_rows), (30, 20));
        assert_eq!(config.seed, 7);
    }
}
