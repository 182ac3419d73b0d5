//! Gallery configuration
//!
//! Every field has a default matching the stock gallery, so a config file only
//! needs to name the values it changes.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::types::Result;

/// Camera placement and projection.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Initial camera position
    pub position: Vec3,
    /// Point the camera orbits around and looks at
    pub target: Vec3,
    /// Vertical field of view in degrees
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 8.0, 15.0),
            target: Vec3::new(0.0, 8.0, 0.0),
            fov_y_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

/// Limits for the orbit controls.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitConfig {
    /// Fraction of the remaining motion applied per update (0 = no damping)
    pub damping_factor: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Minimum polar angle from +Y in radians
    pub min_polar_angle: f32,
    /// Maximum polar angle from +Y in radians
    pub max_polar_angle: f32,
    /// Radians of rotation per pixel dragged
    pub rotate_speed: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            damping_factor: 0.05,
            min_distance: 8.0,
            max_distance: 40.0,
            min_polar_angle: 0.2,
            max_polar_angle: std::f32::consts::FRAC_PI_2 + 0.3,
            rotate_speed: 0.005,
        }
    }
}

/// Per-frame animation constants.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Whole-tree yaw added every frame (radians)
    pub auto_rotate_step: f32,
    /// Amplitude of each root's sway
    pub root_sway: f32,
    /// Amplitude of each photo leaf's sway
    pub leaf_sway: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            auto_rotate_step: 0.002,
            root_sway: 0.003,
            leaf_sway: 0.006,
        }
    }
}

/// Photo ingestion settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Longest side of a stored photo, in pixels
    pub max_dimension: u32,
    /// JPEG quality (1-100)
    pub jpeg_quality: u8,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_dimension: 512,
            jpeg_quality: 90,
        }
    }
}

/// Top-level configuration for a [`Gallery`](crate::gallery::Gallery).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    /// Seed for cosmetic jitter and leaf placement. `None` draws from entropy.
    pub seed: Option<u64>,
    pub camera: CameraConfig,
    pub orbit: OrbitConfig,
    pub animation: AnimationConfig,
    pub ingest: IngestConfig,
}

impl GalleryConfig {
    /// Load a config from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parse a config from a JSON string.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Same config with a fixed seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
