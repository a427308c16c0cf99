//! Environment settings
//!
//! Everything tunable about an arena lives here. Settings are fixed for the
//! life of an arena; per-episode knobs (counts, spawn range) come from the
//! controller's reset parameters instead.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// Bounding extents of a placed object in the ground plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectShape {
    /// Extent along local x
    pub extent_x: f32,
    /// Extent along local z
    pub extent_z: f32,
    /// Uniform object scale
    pub scale: f32,
}

impl ObjectShape {
    pub const fn new(extent_x: f32, extent_z: f32, scale: f32) -> Self {
        Self {
            extent_x,
            extent_z,
            scale,
        }
    }

    /// Radius of the circle enclosing the larger scaled extent
    pub fn body_radius(&self) -> f32 {
        (self.extent_x * self.scale).max(self.extent_z * self.scale) / 2.0
    }

    /// Which preset shape to use
    pub fn preset(kind: ShapePreset) -> Self {
        match kind {
            ShapePreset::Pig => Self::new(1.0, 1.6, 1.0),
            ShapePreset::Truffle => Self::new(0.5, 0.5, 1.0),
            ShapePreset::Stump => Self::new(1.5, 1.5, 1.0),
        }
    }
}

/// Built-in object shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapePreset {
    Pig,
    Truffle,
    Stump,
}

/// Arena settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Agent ===
    /// Velocity change per forward command
    pub move_speed: f32,
    /// Rotation step factor (degrees per tick is rotate_speed squared)
    pub rotate_speed: f32,
    /// Distance between the two smell sensors
    pub nostril_width: f32,
    /// Linear drag of the kinematic body
    pub drag: f32,

    // === Perception ===
    /// Ray length
    pub ray_distance: f32,
    /// Ray angles in degrees, measured from the agent's right axis
    pub ray_angles: Vec<f32>,

    // === Arena ===
    /// Out-of-bounds threshold on each local axis
    pub boundary_half_extent: f32,
    /// Inner face of the pen walls on each local axis
    pub wall_half_extent: f32,
    /// Area-to-world scale applied to sampled spawn points
    pub area_scale: f32,
    /// Placement attempts for the agent
    pub agent_attempts: u32,
    /// Placement attempts for each truffle and stump
    pub object_attempts: u32,
    /// Footprint inflation factor
    pub footprint_margin: f32,

    // === Shapes ===
    pub pig_shape: ObjectShape,
    pub truffle_shape: ObjectShape,
    pub stump_shape: ObjectShape,

    // === Rewards ===
    pub truffle_reward: f64,
    pub collision_penalty: f64,
    pub time_penalty: f64,
    pub failure_threshold: f64,
    pub out_of_bounds_penalty: f64,

    // === Timing ===
    /// Fixed tick duration
    pub dt: f32,
    /// Outcome feedback duration
    pub feedback_duration: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            move_speed: MOVE_SPEED,
            rotate_speed: ROTATE_SPEED,
            nostril_width: NOSTRIL_WIDTH,
            drag: AGENT_DRAG,

            ray_distance: RAY_DISTANCE,
            ray_angles: vec![RAY_ANGLE],

            boundary_half_extent: BOUNDARY_HALF_EXTENT,
            wall_half_extent: WALL_HALF_EXTENT,
            area_scale: 1.0,
            agent_attempts: AGENT_PLACEMENT_ATTEMPTS,
            object_attempts: OBJECT_PLACEMENT_ATTEMPTS,
            footprint_margin: FOOTPRINT_MARGIN,

            pig_shape: ObjectShape::preset(ShapePreset::Pig),
            truffle_shape: ObjectShape::preset(ShapePreset::Truffle),
            stump_shape: ObjectShape::preset(ShapePreset::Stump),

            truffle_reward: TRUFFLE_REWARD,
            collision_penalty: COLLISION_PENALTY,
            time_penalty: TIME_PENALTY,
            failure_threshold: FAILURE_THRESHOLD,
            out_of_bounds_penalty: OUT_OF_BOUNDS_PENALTY,

            dt: SIM_DT,
            feedback_duration: FEEDBACK_DURATION,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Self = serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        settings.validate()?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Reject settings the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("dt", self.dt),
            ("ray_distance", self.ray_distance),
            ("boundary_half_extent", self.boundary_half_extent),
            ("wall_half_extent", self.wall_half_extent),
            ("area_scale", self.area_scale),
        ];
        for (key, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidSetting {
                    key,
                    reason: format!("must be positive, got {value}"),
                });
            }
        }
        let non_negative = [
            ("drag", self.drag),
            ("feedback_duration", self.feedback_duration),
        ];
        for (key, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::InvalidSetting {
                    key,
                    reason: format!("must be zero or more, got {value}"),
                });
            }
        }
        let shapes = [
            ("pig_shape", self.pig_shape),
            ("truffle_shape", self.truffle_shape),
            ("stump_shape", self.stump_shape),
        ];
        for (key, shape) in shapes {
            let dims = [shape.extent_x, shape.extent_z, shape.scale];
            if !dims.iter().all(|d| d.is_finite() && *d > 0.0) {
                return Err(ConfigError::InvalidSetting {
                    key,
                    reason: format!(
                        "extents and scale must be positive, got {} x {} at scale {}",
                        shape.extent_x, shape.extent_z, shape.scale
                    ),
                });
            }
        }
        if self.footprint_margin < 1.0 {
            return Err(ConfigError::InvalidSetting {
                key: "footprint_margin",
                reason: format!("must be at least 1.0, got {}", self.footprint_margin),
            });
        }
        if self.agent_attempts == 0 {
            return Err(ConfigError::InvalidSetting {
                key: "agent_attempts",
                reason: "the agent needs at least one placement attempt".to_string(),
            });
        }
        if self.ray_angles.is_empty() {
            return Err(ConfigError::InvalidSetting {
                key: "ray_angles",
                reason: "at least one ray is required".to_string(),
            });
        }
        Ok(())
    }

    /// Number of features each ray contributes
    pub fn ray_feature_count(&self) -> usize {
        self.ray_angles.len() * (crate::sim::perception::DETECTABLE_TAGS.len() + 2)
    }

    /// Total observation length
    pub fn observation_size(&self) -> usize {
        self.ray_feature_count() + 4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_observation_size() {
        let settings = Settings::default();
        assert_eq!(settings.ray_feature_count(), 4);
        assert_eq!(settings.observation_size(), 8);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: Settings = serde_json::from_str(r#"{ "move_speed": 2.5 }"#).unwrap();
        assert_eq!(settings.move_speed, 2.5);
        assert_eq!(settings.nostril_width, NOSTRIL_WIDTH);
        assert_eq!(settings.ray_angles, vec![RAY_ANGLE]);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let settings = Settings {
            dt: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidSetting { key: "dt", .. })
        ));

        let settings = Settings {
            ray_angles: Vec::new(),
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_negative_drag_shapes_and_feedback() {
        let settings = Settings {
            drag: -4.0,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidSetting { key: "drag", .. })
        ));

        let settings = Settings {
            feedback_duration: -0.5,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidSetting { key: "feedback_duration", .. })
        ));

        let settings = Settings {
            stump_shape: ObjectShape::new(1.5, -1.5, 1.0),
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidSetting { key: "stump_shape", .. })
        ));

        let settings = Settings {
            pig_shape: ObjectShape::new(1.0, 1.6, 0.0),
            ..Default::default()
        };
        assert!(settings.validate().is_err());

        // Zero drag and instant feedback are allowed
        let settings = Settings {
            drag: 0.0,
            feedback_duration: 0.0,
            ..Default::default()
        };
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_load_missing_file() {
        let err = Settings::load("/nonexistent/truffle-pig-settings.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_body_radius_uses_larger_extent() {
        let shape = ObjectShape::new(1.0, 3.0, 2.0);
        assert!((shape.body_radius() - 3.0).abs() < 1e-6);
    }
}
