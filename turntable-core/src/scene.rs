//! Per-item scene context.
//!
//! A [`Scene`] holds everything derived for the object currently being
//! processed: the object itself, its framing and its motion. The batch driver
//! calls [`Scene::clear`] before building the next item so nothing derived for
//! one object survives into the next.

use std::path::{Path, PathBuf};

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::animation::RotationTrack;
use crate::bounds::BoundingBox;
use crate::error::Result;
use crate::framing::{Background, CameraPose, Framing, LightKind, Material};
use crate::geometry::Mesh;
use crate::orbit::OrbitRig;
use crate::transform::{ObjectTransform, RotationState};

/// A named mesh with its object-level transform
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub name: String,
    pub mesh: Mesh,
    pub transform: ObjectTransform,
}

impl SceneObject {
    pub fn new(name: impl Into<String>, mesh: Mesh) -> Self {
        Self {
            name: name.into(),
            mesh,
            transform: ObjectTransform::identity(),
        }
    }

    /// Bounds of the vertices after the object transform
    pub fn world_bounds(&self) -> Result<BoundingBox> {
        if self.transform.is_identity() {
            return self.mesh.bounding_box();
        }
        let matrix = self.transform.matrix();
        let points: Vec<Point3<f32>> = self
            .mesh
            .vertices
            .iter()
            .map(|p| matrix.transform_point(p))
            .collect();
        BoundingBox::from_points(&points)
    }

    /// Bake the transform into the vertices and reset it to identity
    pub fn apply_transform(&mut self) {
        if self.transform.is_identity() {
            return;
        }
        let matrix = self.transform.matrix();
        self.mesh.transform(&matrix);
        self.transform = ObjectTransform::identity();
    }

    /// Copy of the mesh with the object transform baked in
    pub fn world_mesh(&self) -> Mesh {
        let mut mesh = self.mesh.clone();
        if !self.transform.is_identity() {
            mesh.transform(&self.transform.matrix());
        }
        mesh
    }

    /// Identity transform, centered bounds and largest edge equal to
    /// `target_size`, all within `tolerance`.
    pub fn is_canonical(&self, target_size: f32, tolerance: f32) -> bool {
        if !self.transform.is_identity() {
            return false;
        }
        match self.mesh.bounding_box() {
            Ok(bounds) => {
                bounds.center().coords.norm() <= tolerance
                    && (bounds.max_dim() - target_size).abs() <= tolerance
            }
            Err(_) => false,
        }
    }
}

/// How the shot moves over the frame range
#[derive(Debug, Clone, PartialEq)]
pub enum Motion {
    /// Object spins in place in front of a fixed camera
    Turntable(RotationTrack),
    /// Camera travels around a fixed object
    Orbit(OrbitRig),
}

/// Object rotation and camera pose evaluated at one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FramePose {
    pub frame: u32,
    pub object_rotation: RotationState,
    pub camera: CameraPose,
}

/// Everything derived for the item currently being processed
#[derive(Debug, Default)]
pub struct Scene {
    pub object: Option<SceneObject>,
    pub framing: Option<Framing>,
    pub motion: Option<Motion>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the object, rigs and motion of the previous item
    pub fn clear(&mut self) {
        self.object = None;
        self.framing = None;
        self.motion = None;
    }

    pub fn is_empty(&self) -> bool {
        self.object.is_none() && self.framing.is_none() && self.motion.is_none()
    }

    /// Point the camera keeps in view
    pub fn camera_target(&self) -> Option<Point3<f32>> {
        match (&self.motion, &self.framing) {
            (Some(Motion::Orbit(rig)), _) => Some(rig.target),
            (_, Some(framing)) => Some(framing.camera.look_at),
            _ => None,
        }
    }

    /// Evaluate the object rotation and camera pose at `frame`.
    ///
    /// Returns `None` until the scene has been framed.
    pub fn pose_at(&self, frame: u32) -> Option<FramePose> {
        let framing = self.framing.as_ref()?;
        let (object_rotation, camera) = match &self.motion {
            Some(Motion::Turntable(track)) => (track.evaluate(frame as f32), framing.camera.pose()),
            Some(Motion::Orbit(rig)) => (RotationState::zero(), rig.pose_at(frame as f32)),
            None => (RotationState::zero(), framing.camera.pose()),
        };
        Some(FramePose {
            frame,
            object_rotation,
            camera,
        })
    }

    /// Resolve the scene into a self-contained description for an external
    /// renderer. Every frame in `frame_start..=frame_end` is evaluated here so
    /// the consumer never has to interpret motion itself.
    pub fn describe(
        &self,
        mesh_path: &Path,
        output_path: &Path,
        frame_start: u32,
        frame_end: u32,
        resolution: [u32; 2],
        fps: u32,
    ) -> Option<SceneDescription> {
        let object = self.object.as_ref()?;
        let framing = self.framing.as_ref()?;

        let frames = (frame_start..=frame_end)
            .filter_map(|frame| self.pose_at(frame))
            .map(|pose| FrameDescription {
                frame: pose.frame,
                object_rotation: pose.object_rotation.as_array(),
                camera_position: pose.camera.position.coords.into(),
                camera_rotation: RotationState::from_quaternion(&pose.camera.rotation).as_array(),
            })
            .collect();

        let lights = framing
            .lights
            .lights
            .iter()
            .map(|light| LightDescription {
                name: light.name.clone(),
                kind: light.kind,
                position: light.position.coords.into(),
                rotation: light.rotation.as_array(),
                energy: light.energy,
            })
            .collect();

        Some(SceneDescription {
            object_name: object.name.clone(),
            mesh_path: mesh_path.to_path_buf(),
            output_path: output_path.to_path_buf(),
            frame_start,
            frame_end,
            fps,
            resolution,
            camera: CameraDescription {
                lens: framing.camera.lens,
                sensor_width: framing.camera.sensor_width,
                clip_start: framing.camera.clip_start,
                clip_end: framing.camera.clip_end,
            },
            lights,
            background: framing.background,
            material: framing.material,
            frames,
        })
    }
}

/// Serializable, fully resolved scene handed to an external renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    pub object_name: String,
    pub mesh_path: PathBuf,
    pub output_path: PathBuf,
    pub frame_start: u32,
    pub frame_end: u32,
    pub fps: u32,
    pub resolution: [u32; 2],
    pub camera: CameraDescription,
    pub lights: Vec<LightDescription>,
    pub background: Background,
    pub material: Material,
    pub frames: Vec<FrameDescription>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraDescription {
    pub lens: f32,
    pub sensor_width: f32,
    pub clip_start: f32,
    pub clip_end: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightDescription {
    pub name: String,
    pub kind: LightKind,
    pub position: [f32; 3],
    /// XYZ Euler angles in radians
    pub rotation: [f32; 3],
    pub energy: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameDescription {
    pub frame: u32,
    /// XYZ Euler angles in radians
    pub object_rotation: [f32; 3],
    pub camera_position: [f32; 3],
    /// XYZ Euler angles in radians
    pub camera_rotation: [f32; 3],
}
