/// Turntable rotation keyframes
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Error, Result};
use crate::scene::SceneObject;
use crate::transform::RotationState;

/// First frame of every animation
pub const FIRST_FRAME: u32 = 1;

/// Single axis an object spins around
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RotationAxis {
    X,
    Y,
    #[default]
    Z,
}

impl RotationAxis {
    /// Rotation of `radians` about this axis only
    pub fn rotation(&self, radians: f32) -> RotationState {
        match self {
            RotationAxis::X => RotationState::new(radians, 0.0, 0.0),
            RotationAxis::Y => RotationState::new(0.0, radians, 0.0),
            RotationAxis::Z => RotationState::new(0.0, 0.0, radians),
        }
    }
}

impl FromStr for RotationAxis {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "X" => Ok(RotationAxis::X),
            "Y" => Ok(RotationAxis::Y),
            "Z" => Ok(RotationAxis::Z),
            _ => Err(ConfigError::UnknownAxis(s.to_string())),
        }
    }
}

impl fmt::Display for RotationAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RotationAxis::X => "X",
            RotationAxis::Y => "Y",
            RotationAxis::Z => "Z",
        };
        f.write_str(name)
    }
}

/// How a channel moves from one keyframe to the next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    /// Ease in and out. Host engines insert keys with this by default.
    #[default]
    Bezier,
    /// Constant angular velocity
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    pub frame: u32,
    pub rotation: RotationState,
    pub interpolation: Interpolation,
}

/// Keyframed rotation channel of a turntable shot
#[derive(Debug, Clone, PartialEq)]
pub struct RotationTrack {
    pub axis: RotationAxis,
    pub keyframes: Vec<Keyframe>,
}

impl RotationTrack {
    pub fn new(axis: RotationAxis) -> Self {
        Self {
            axis,
            keyframes: Vec::new(),
        }
    }

    /// Insert or replace the key at `frame`, keeping keys ordered
    pub fn insert(&mut self, frame: u32, rotation: RotationState) {
        let key = Keyframe {
            frame,
            rotation,
            interpolation: Interpolation::default(),
        };
        match self.keyframes.binary_search_by_key(&frame, |k| k.frame) {
            Ok(i) => self.keyframes[i] = key,
            Err(i) => self.keyframes.insert(i, key),
        }
    }

    pub fn set_interpolation(&mut self, interpolation: Interpolation) {
        for key in &mut self.keyframes {
            key.interpolation = interpolation;
        }
    }

    /// Rotation at `frame`, holding the first and last key outside the range
    pub fn evaluate(&self, frame: f32) -> RotationState {
        let (first, last) = match (self.keyframes.first(), self.keyframes.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return RotationState::zero(),
        };
        if frame <= first.frame as f32 {
            return first.rotation;
        }
        if frame >= last.frame as f32 {
            return last.rotation;
        }

        for pair in self.keyframes.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if frame <= b.frame as f32 {
                let t = (frame - a.frame as f32) / (b.frame - a.frame) as f32;
                let t = match a.interpolation {
                    Interpolation::Linear => t,
                    Interpolation::Bezier => t * t * (3.0 - 2.0 * t),
                };
                return a.rotation.lerp(&b.rotation, t);
            }
        }
        last.rotation
    }
}

/// Key a full turn of `degrees` about `axis` from frame 1 to `total_frames`,
/// with linear interpolation so the object spins at constant speed.
///
/// The object must already be in canonical pose, otherwise the rotation pivot
/// is not its visual center.
pub fn animate_rotation(
    object: &SceneObject,
    axis: RotationAxis,
    total_frames: u32,
    degrees: f32,
) -> Result<RotationTrack> {
    if total_frames < 2 {
        return Err(ConfigError::TooFewFrames(total_frames).into());
    }
    if !object.transform.is_identity() {
        return Err(Error::NotCanonical);
    }

    let mut track = RotationTrack::new(axis);
    track.insert(FIRST_FRAME, RotationState::zero());
    track.insert(total_frames, axis.rotation(degrees.to_radians()));
    track.set_interpolation(Interpolation::Linear);

    Ok(track)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Mesh;
    use std::f32::consts::TAU;

    fn canonical_cube() -> SceneObject {
        SceneObject::new("cube", Mesh::cube(2.0))
    }

    #[test]
    fn test_full_turn_about_z() {
        let track = animate_rotation(&canonical_cube(), RotationAxis::Z, 120, 360.0).unwrap();

        assert_eq!(track.keyframes.len(), 2);
        let start = track.keyframes[0];
        let end = track.keyframes[1];

        assert_eq!(start.frame, 1);
        assert_eq!(start.rotation, RotationState::zero());
        assert_eq!(end.frame, 120);
        assert_eq!(end.rotation.x, 0.0);
        assert_eq!(end.rotation.y, 0.0);
        assert!((end.rotation.z - TAU).abs() < 1e-6);

        assert_eq!(start.interpolation, Interpolation::Linear);
        assert_eq!(end.interpolation, Interpolation::Linear);
    }

    #[test]
    fn test_linear_evaluation_has_constant_speed() {
        let track = animate_rotation(&canonical_cube(), RotationAxis::X, 11, 90.0).unwrap();
        let step = track.evaluate(2.0).x - track.evaluate(1.0).x;
        for frame in 2..11 {
            let delta = track.evaluate(frame as f32 + 1.0).x - track.evaluate(frame as f32).x;
            assert!((delta - step).abs() < 1e-5);
        }
        assert!((track.evaluate(6.0).x - 45f32.to_radians()).abs() < 1e-5);
    }

    #[test]
    fn test_evaluate_clamps_outside_range() {
        let track = animate_rotation(&canonical_cube(), RotationAxis::Y, 10, 360.0).unwrap();
        assert_eq!(track.evaluate(0.0), RotationState::zero());
        assert_eq!(track.evaluate(50.0), track.keyframes[1].rotation);
    }

    #[test]
    fn test_single_frame_is_config_error() {
        assert!(matches!(
            animate_rotation(&canonical_cube(), RotationAxis::Z, 1, 360.0),
            Err(Error::Config(ConfigError::TooFewFrames(1)))
        ));
    }

    #[test]
    fn test_requires_canonical_pose() {
        let mut object = canonical_cube();
        object.transform.location.x = 3.0;
        assert!(matches!(
            animate_rotation(&object, RotationAxis::Z, 120, 360.0),
            Err(Error::NotCanonical)
        ));
    }

    #[test]
    fn test_axis_parsing() {
        assert_eq!("z".parse::<RotationAxis>().unwrap(), RotationAxis::Z);
        assert_eq!(" X ".parse::<RotationAxis>().unwrap(), RotationAxis::X);
        assert_eq!(
            "W".parse::<RotationAxis>(),
            Err(ConfigError::UnknownAxis("W".to_string()))
        );
        assert_eq!(RotationAxis::Y.to_string(), "Y");
    }

    #[test]
    fn test_bezier_eases() {
        let mut track = RotationTrack::new(RotationAxis::Z);
        track.insert(1, RotationState::zero());
        track.insert(11, RotationState::new(0.0, 0.0, 1.0));
        // Before forcing linear, the quarter point lags behind
        assert!(track.evaluate(3.5).z < 0.25);
        track.set_interpolation(Interpolation::Linear);
        assert!((track.evaluate(3.5).z - 0.25).abs() < 1e-6);
    }
}
