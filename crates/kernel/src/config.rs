//! Simulation tunables.
//!
//! Every value is frame-coupled: speeds are world units per frame, intervals
//! are frame counts. Defaults reproduce the shipped game.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading or validating a [`SimConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid tunable `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Fixed horizontal position of the player.
    pub player_x: f32,
    /// Height of the player's center above the ground line at rest.
    pub ground_offset: f32,
    pub gravity: f32,
    pub jump_impulse: f32,
    pub max_jumps: u8,
    pub obstacle_speed_min: f32,
    pub obstacle_speed_max: f32,
    /// Frames that must elapse since the last spawn before another may occur.
    pub min_spawn_interval: u32,
    /// Distance the rightmost obstacle must have travelled from the spawn edge.
    pub min_clearance: f32,
    pub spawn_edge: f32,
    /// Obstacles left of this x are removed.
    pub despawn_cutoff: f32,
    pub contact_radius: f32,
    pub score_per_spawn: u32,
    /// Center height of a short obstacle.
    pub obstacle_base_height: f32,
    /// Extra center height per additional unit of vertical scale.
    pub tall_lift: f32,
    /// Cosmetic obstacle rotation per frame (radians).
    pub obstacle_spin: f32,
    pub ground_scroll_speed: f32,
    /// The ground pattern repeats every this many units.
    pub ground_scroll_wrap: f32,
    pub run_bob_amplitude: f32,
    pub run_bob_frequency: f32,
    pub idle_bob_amplitude: f32,
    pub idle_bob_frequency: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            player_x: -4.0,
            ground_offset: 0.7,
            gravity: 0.013,
            jump_impulse: 0.26,
            max_jumps: 2,
            obstacle_speed_min: 0.15,
            obstacle_speed_max: 0.32,
            min_spawn_interval: 130,
            min_clearance: 12.0,
            spawn_edge: 25.0,
            despawn_cutoff: -15.0,
            contact_radius: 1.1,
            score_per_spawn: 10,
            obstacle_base_height: 0.8,
            tall_lift: 0.6,
            obstacle_spin: 0.02,
            ground_scroll_speed: 0.18,
            ground_scroll_wrap: 2.0,
            run_bob_amplitude: 0.15,
            run_bob_frequency: 15.0,
            idle_bob_amplitude: 0.3,
            idle_bob_frequency: 2.0,
        }
    }
}

impl SimConfig {
    /// Parse a YAML document. Missing fields take their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_yaml_str(&text)?;
        tracing::debug!(path = %path.as_ref().display(), "loaded simulation config");
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
            ConfigError::Invalid {
                field,
                reason: reason.into(),
            }
        }

        if self.gravity <= 0.0 {
            return Err(invalid("gravity", "must be positive"));
        }
        if self.jump_impulse <= 0.0 {
            return Err(invalid("jump_impulse", "must be positive"));
        }
        if self.max_jumps == 0 {
            return Err(invalid("max_jumps", "must allow at least one jump"));
        }
        if self.obstacle_speed_min <= 0.0 || self.obstacle_speed_max < self.obstacle_speed_min {
            return Err(invalid(
                "obstacle_speed_max",
                format!(
                    "range {}..{} must be positive and ordered",
                    self.obstacle_speed_min, self.obstacle_speed_max
                ),
            ));
        }
        if self.contact_radius < 0.0 {
            return Err(invalid("contact_radius", "must not be negative"));
        }
        if self.despawn_cutoff >= self.player_x {
            return Err(invalid("despawn_cutoff", "must lie behind the player"));
        }
        if self.ground_scroll_wrap <= 0.0 {
            return Err(invalid("ground_scroll_wrap", "must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        SimConfig::default().validate().unwrap();
    }

    #[test]
    fn defaults_match_shipped_game() {
        let c = SimConfig::default();
        assert_eq!(c.min_spawn_interval, 130);
        assert_eq!(c.max_jumps, 2);
        assert_eq!(c.score_per_spawn, 10);
        assert_eq!(c.obstacle_speed_min, 0.15);
        assert_eq!(c.obstacle_speed_max, 0.32);
    }

    #[test]
    fn partial_yaml_takes_defaults() {
        let c = SimConfig::from_yaml_str("gravity: 0.02\nmax_jumps: 3\n").unwrap();
        assert_eq!(c.gravity, 0.02);
        assert_eq!(c.max_jumps, 3);
        assert_eq!(c.spawn_edge, SimConfig::default().spawn_edge);
    }

    #[test]
    fn inverted_speed_range_rejected() {
        let err = SimConfig::from_yaml_str("obstacle_speed_min: 0.5\nobstacle_speed_max: 0.1\n")
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "obstacle_speed_max",
                ..
            }
        ));
    }

    #[test]
    fn zero_jumps_rejected() {
        assert!(SimConfig::from_yaml_str("max_jumps: 0\n").is_err());
    }

    #[test]
    fn cutoff_ahead_of_player_rejected() {
        assert!(SimConfig::from_yaml_str("despawn_cutoff: 0.0\n").is_err());
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let err = SimConfig::from_yaml_str("gravity: [not, a, number]").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn yaml_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sim.yaml");
        let mut config = SimConfig::default();
        config.contact_radius = 0.9;
        std::fs::write(&path, config.to_yaml_string().unwrap()).unwrap();
        assert_eq!(SimConfig::load(&path).unwrap(), config);
    }
}
