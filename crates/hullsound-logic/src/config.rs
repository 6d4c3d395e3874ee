//! Propagation tuning — penalties, thresholds, and range limits.
//!
//! These values are read-only from the solver's point of view. They are
//! usually loaded once from JSON and shared by every query.
//!
//! ```
//! use hullsound_logic::config::{validate_config, PropagationConfig};
//!
//! let config = PropagationConfig::from_json(r#"{ "closed_door_penalty": 500.0 }"#).unwrap();
//! assert_eq!(config.closed_door_penalty, 500.0);
//! assert!(validate_config(&config).is_empty());
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, LoadError};

/// Tuning values for the propagation cost model and search limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropagationConfig {
    /// Cost added for passing a closed door.
    pub closed_door_penalty: f32,
    /// Cost added for crossing between air and water.
    pub water_surface_penalty: f32,
    /// A door whose open state is at or above this is treated as open.
    pub open_door_threshold: f32,
    /// A door-less opening less open than this is a solid wall.
    pub open_wall_threshold: f32,
    /// Whether duct-blocker doors let sound through.
    pub traverse_duct_blocks: bool,
    /// Apply `max_raw_distance` on top of each query's own limit.
    pub max_raw_distance_enabled: bool,
    /// Hard cap on geometric path length, ignoring penalties.
    pub max_raw_distance: f32,
    /// Default number of paths returned per query.
    pub max_paths: usize,
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            closed_door_penalty: 1000.0,
            water_surface_penalty: 2000.0,
            open_door_threshold: 0.5,
            open_wall_threshold: 0.1,
            traverse_duct_blocks: false,
            max_raw_distance_enabled: true,
            max_raw_distance: 3000.0,
            max_paths: 3,
        }
    }
}

impl PropagationConfig {
    /// Parse and validate a JSON config. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let config: PropagationConfig = serde_json::from_str(json)?;
        let errors = validate_config(&config);
        if !errors.is_empty() {
            return Err(LoadError::Invalid(errors));
        }
        Ok(config)
    }

    /// Combine a query's own distance limit with the configured cap.
    ///
    /// A NaN request is returned unchanged so callers can reject it.
    pub fn effective_max_raw_distance(&self, requested: f32) -> f32 {
        if self.max_raw_distance_enabled && !requested.is_nan() {
            requested.min(self.max_raw_distance)
        } else {
            requested
        }
    }
}

/// Validate a propagation config, returning all errors found.
pub fn validate_config(config: &PropagationConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    if !is_penalty(config.closed_door_penalty) {
        errors.push(ConfigError::InvalidDoorPenalty(config.closed_door_penalty));
    }
    if !is_penalty(config.water_surface_penalty) {
        errors.push(ConfigError::InvalidWaterPenalty(config.water_surface_penalty));
    }
    if !is_fraction(config.open_door_threshold) {
        errors.push(ConfigError::InvalidOpenDoorThreshold(
            config.open_door_threshold,
        ));
    }
    if !is_fraction(config.open_wall_threshold) {
        errors.push(ConfigError::InvalidOpenWallThreshold(
            config.open_wall_threshold,
        ));
    }
    // NaN fails the comparison too
    if !(config.max_raw_distance > 0.0) {
        errors.push(ConfigError::InvalidMaxRawDistance(config.max_raw_distance));
    }
    if config.max_paths == 0 {
        errors.push(ConfigError::ZeroMaxPaths);
    }

    errors
}

fn is_penalty(v: f32) -> bool {
    v.is_finite() && v >= 0.0
}

fn is_fraction(v: f32) -> bool {
    (0.0..=1.0).contains(&v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(validate_config(&PropagationConfig::default()).is_empty());
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config = PropagationConfig::from_json(r#"{ "traverse_duct_blocks": true }"#).unwrap();
        assert!(config.traverse_duct_blocks);
        assert_eq!(config.water_surface_penalty, 2000.0);
    }

    #[test]
    fn test_invalid_values_reported() {
        let config = PropagationConfig {
            closed_door_penalty: -1.0,
            open_door_threshold: 1.5,
            max_raw_distance: 0.0,
            max_paths: 0,
            ..Default::default()
        };
        let errors = validate_config(&config);
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ConfigError::ZeroMaxPaths));
    }

    #[test]
    fn test_from_json_rejects_invalid() {
        let err = PropagationConfig::from_json(r#"{ "open_wall_threshold": 2.0 }"#).unwrap_err();
        assert!(matches!(err, LoadError::Invalid(ref e) if e.len() == 1));
        assert!(err.to_string().contains("open wall threshold"));
    }

    #[test]
    fn test_from_json_parse_error() {
        let err = PropagationConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
    }

    #[test]
    fn test_effective_max_raw_distance() {
        let mut config = PropagationConfig::default();
        assert_eq!(config.effective_max_raw_distance(5000.0), 3000.0);
        assert_eq!(config.effective_max_raw_distance(100.0), 100.0);
        config.max_raw_distance_enabled = false;
        assert_eq!(config.effective_max_raw_distance(5000.0), 5000.0);
    }

    #[test]
    fn test_effective_max_raw_distance_keeps_nan() {
        let config = PropagationConfig::default();
        assert!(config.effective_max_raw_distance(f32::NAN).is_nan());
        assert_eq!(config.effective_max_raw_distance(-5.0), -5.0);
    }
}
