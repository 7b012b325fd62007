//! Batch settings shared by every item of a run.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::animation::RotationAxis;
use crate::error::{ConfigError, Result};
use crate::orbit::OrbitSettings;

/// What moves during the shot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotionMode {
    /// The object spins in front of a fixed camera
    #[default]
    Turntable,
    /// The camera circles a still object
    Orbit,
}

impl FromStr for MotionMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "turntable" => Ok(MotionMode::Turntable),
            "orbit" => Ok(MotionMode::Orbit),
            _ => Err(ConfigError::UnknownMode(s.to_string())),
        }
    }
}

impl fmt::Display for MotionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionMode::Turntable => f.write_str("turntable"),
            MotionMode::Orbit => f.write_str("orbit"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Frames per item; frame numbering starts at 1
    pub frames: u32,
    pub fps: u32,
    pub resolution: [u32; 2],
    pub axis: RotationAxis,
    /// Turntable rotation over the whole shot
    pub degrees: f32,
    /// Largest dimension of every object after normalization
    pub target_size: f32,
    pub mode: MotionMode,
    pub orbit: OrbitSettings,
    /// Descend into subdirectories when discovering inputs
    pub recursive: bool,
    /// Matched case-insensitively, without the dot
    pub input_extension: String,
    pub output_extension: String,
    /// Render generated shapes, or only export STL and manifest
    pub render_generated: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            frames: 120,
            fps: 30,
            resolution: [512, 512],
            axis: RotationAxis::Z,
            degrees: 360.0,
            target_size: 2.0,
            mode: MotionMode::Turntable,
            orbit: OrbitSettings::default(),
            recursive: false,
            input_extension: "stl".to_string(),
            output_extension: "mp4".to_string(),
            render_generated: true,
        }
    }
}

impl BatchConfig {
    /// Reject settings that would fail for every item
    pub fn validate(&self) -> Result<()> {
        if self.frames < 2 {
            return Err(ConfigError::TooFewFrames(self.frames).into());
        }
        if self.fps == 0 {
            return Err(ConfigError::InvalidFps.into());
        }
        let [width, height] = self.resolution;
        if width == 0 || height == 0 {
            return Err(ConfigError::InvalidResolution(width, height).into());
        }
        if !self.target_size.is_finite() || self.target_size <= 0.0 {
            return Err(ConfigError::InvalidTargetSize(self.target_size).into());
        }
        if !self.degrees.is_finite() {
            return Err(ConfigError::InvalidDegrees(self.degrees).into());
        }
        if self.mode == MotionMode::Orbit {
            let factor = self.orbit.radius_factor;
            if !factor.is_finite() || factor <= 0.0 {
                return Err(ConfigError::InvalidRadius(factor).into());
            }
            for (field, value) in [
                ("height_factor", self.orbit.height_factor),
                ("tilt_degrees", self.orbit.tilt_degrees),
            ] {
                if !value.is_finite() {
                    return Err(ConfigError::InvalidOrbit { field, value }.into());
                }
            }
        }
        Ok(())
    }

    /// Last frame of the shot
    pub fn frame_end(&self) -> u32 {
        self.frames
    }
}
