//! Orbit rig: the object stays still and the camera travels once around a
//! circular path while tracking the object.
//!
//! The camera position is a pure function of the frame number through
//! [`OrbitRig::offset_fraction`], so any frame can be evaluated in isolation.

use std::f32::consts::TAU;

use nalgebra::{Point3, Rotation3, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::framing::{CameraPose, CameraRig};
use crate::projection::look_at_rotation;

/// Closed circle, optionally tilted about the X axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CirclePath {
    pub center: Point3<f32>,
    pub radius: f32,
    /// Tilt about X in radians
    pub tilt: f32,
}

impl CirclePath {
    /// Point on the circle at `fraction` of a full turn, starting on +X
    pub fn point_at(&self, fraction: f32) -> Point3<f32> {
        let angle = TAU * fraction;
        let local = Vector3::new(self.radius * angle.cos(), self.radius * angle.sin(), 0.0);
        let tilted = Rotation3::from_axis_angle(&Vector3::x_axis(), self.tilt) * local;
        self.center + tilted
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrbitRig {
    /// Lens and clipping come from the auto-framed camera
    pub camera: CameraRig,
    pub target: Point3<f32>,
    pub radius: f32,
    pub height: f32,
    pub tilt: f32,
    pub total_frames: u32,
}

impl OrbitRig {
    /// Tilt the path about X, in degrees
    pub fn with_tilt(mut self, degrees: f32) -> Self {
        self.tilt = degrees.to_radians();
        self
    }

    pub fn path(&self) -> CirclePath {
        CirclePath {
            center: self.target + Vector3::new(0.0, 0.0, self.height),
            radius: self.radius,
            tilt: self.tilt,
        }
    }

    /// Fraction of the path covered at `frame`; 0 at frame 0 and 1 at the
    /// last frame.
    pub fn offset_fraction(&self, frame: f32) -> f32 {
        frame / self.total_frames as f32
    }

    pub fn position_at(&self, frame: f32) -> Point3<f32> {
        self.path().point_at(self.offset_fraction(frame))
    }

    /// Camera pose at `frame`, re-aimed at the target every frame
    pub fn pose_at(&self, frame: f32) -> CameraPose {
        let position = self.position_at(frame);
        CameraPose {
            position,
            rotation: look_at_rotation(&position, &self.target),
        }
    }
}

/// Build an orbit around `target`. The rig keeps `camera`'s lens and clip
/// range; its fixed position is ignored.
pub fn build_orbit(
    camera: &CameraRig,
    target: Point3<f32>,
    radius: f32,
    height: f32,
    total_frames: u32,
) -> Result<OrbitRig> {
    if total_frames < 2 {
        return Err(ConfigError::TooFewFrames(total_frames).into());
    }
    if !radius.is_finite() || radius <= 0.0 {
        return Err(ConfigError::InvalidRadius(radius).into());
    }

    Ok(OrbitRig {
        camera: camera.clone(),
        target,
        radius,
        height,
        tilt: 0.0,
        total_frames,
    })
}

/// Orbit dimensions relative to the canonical size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitSettings {
    pub radius_factor: f32,
    pub height_factor: f32,
    pub tilt_degrees: f32,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            radius_factor: 4.0,
            height_factor: 2.5,
            tilt_degrees: 0.0,
        }
    }
}

impl OrbitSettings {
    pub fn build(
        &self,
        camera: &CameraRig,
        target: Point3<f32>,
        canonical_size: f32,
        total_frames: u32,
    ) -> Result<OrbitRig> {
        let rig = build_orbit(
            camera,
            target,
            canonical_size * self.radius_factor,
            canonical_size * self.height_factor,
            total_frames,
        )?;
        Ok(rig.with_tilt(self.tilt_degrees))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::framing::frame;

    fn rig() -> OrbitRig {
        let framing = frame(2.0);
        OrbitSettings::default()
            .build(&framing.camera, Point3::origin(), 2.0, 120)
            .unwrap()
    }

    #[test]
    fn test_offset_fraction_endpoints() {
        let rig = rig();
        assert_eq!(rig.offset_fraction(0.0), 0.0);
        assert_eq!(rig.offset_fraction(120.0), 1.0);
        assert_eq!(rig.offset_fraction(60.0), 0.5);
    }

    #[test]
    fn test_path_is_closed() {
        let rig = rig();
        let start = rig.position_at(0.0);
        let end = rig.position_at(120.0);
        assert!((start - end).norm() < 1e-4);
        assert!((start - Point3::new(8.0, 0.0, 5.0)).norm() < 1e-5);
    }

    #[test]
    fn test_radius_and_height_hold() {
        let rig = rig();
        for frame in [0.0, 17.0, 45.0, 90.0] {
            let p = rig.position_at(frame);
            assert!((p.z - 5.0).abs() < 1e-4);
            assert!((Vector3::new(p.x, p.y, 0.0).norm() - 8.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_camera_tracks_target() {
        let rig = rig();
        for frame in [0.0, 30.0, 77.0] {
            let pose = rig.pose_at(frame);
            let expected = (rig.target - pose.position).normalize();
            assert!((pose.forward() - expected).norm() < 1e-5);
        }
    }

    #[test]
    fn test_tilted_path_leaves_plane() {
        let rig = rig().with_tilt(15.0);
        let quarter = rig.position_at(30.0);
        assert!(quarter.z > 5.0);
        assert!((rig.position_at(0.0).z - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_rig_keeps_lens() {
        let framing = frame(2.0);
        let rig = rig();
        assert_eq!(rig.camera.lens, framing.camera.lens);
        assert_eq!(rig.camera.clip_end, framing.camera.clip_end);
    }

    #[test]
    fn test_invalid_orbit() {
        let camera = frame(2.0).camera;
        assert!(matches!(
            build_orbit(&camera, Point3::origin(), 8.0, 5.0, 1),
            Err(Error::Config(ConfigError::TooFewFrames(1)))
        ));
        assert!(matches!(
            build_orbit(&camera, Point3::origin(), 0.0, 5.0, 120),
            Err(Error::Config(ConfigError::InvalidRadius(_)))
        ));
    }
}
