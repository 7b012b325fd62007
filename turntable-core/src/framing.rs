//! Auto-framing: camera, light rig, background and surface material derived
//! from an object's canonical size.
//!
//! Everything here is a pure function of the input size and a constant
//! [`FramingRecipe`]. Equal inputs give bit-identical rigs.

use nalgebra::{Point3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::projection::{fov_from_lens, look_at_rotation, DEFAULT_SENSOR_WIDTH};
use crate::transform::{RotationState, Transform};

/// Position and orientation of a camera at one instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Point3<f32>,
    pub rotation: UnitQuaternion<f32>,
}

impl CameraPose {
    /// Direction the camera looks along (its local -Z)
    pub fn forward(&self) -> Vector3<f32> {
        self.rotation * -Vector3::z()
    }
}

/// Camera placement and lens derived from the object size
#[derive(Debug, Clone, PartialEq)]
pub struct CameraRig {
    pub distance: f32,
    pub position: Point3<f32>,
    pub look_at: Point3<f32>,
    pub rotation: UnitQuaternion<f32>,
    /// Focal length in millimetres
    pub lens: f32,
    pub sensor_width: f32,
    pub clip_start: f32,
    pub clip_end: f32,
}

impl CameraRig {
    /// Horizontal field of view in radians
    pub fn fov(&self) -> f32 {
        fov_from_lens(self.lens, self.sensor_width)
    }

    pub fn pose(&self) -> CameraPose {
        CameraPose {
            position: self.position,
            rotation: self.rotation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightKind {
    /// Directional light; only its orientation affects shading
    Sun,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub name: String,
    pub kind: LightKind,
    pub position: Point3<f32>,
    pub rotation: RotationState,
    pub energy: f32,
}

impl Light {
    /// Direction the light travels (its local -Z)
    pub fn direction(&self) -> Vector3<f32> {
        Transform::rotate_vector(&self.rotation, &-Vector3::z())
    }
}

/// Ordered set of lights for one object
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LightRig {
    pub lights: Vec<Light>,
}

impl LightRig {
    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    pub fn total_energy(&self) -> f32 {
        self.lights.iter().map(|l| l.energy).sum()
    }
}

/// Flat world color behind the object
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Background {
    pub color: [f32; 4],
    pub strength: f32,
}

/// Single surface recipe applied to every rendered object
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub base_color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
    pub specular: f32,
}

/// One row of the light table. `offset` is in units of the light distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightRecipe {
    pub name: &'static str,
    pub offset: [f32; 3],
    pub rotation_degrees: [f32; 3],
    pub energy: f32,
}

/// Everything the renderer needs besides the mesh and motion
#[derive(Debug, Clone, PartialEq)]
pub struct Framing {
    pub camera: CameraRig,
    pub lights: LightRig,
    pub background: Background,
    pub material: Material,
}

const CANONICAL_LIGHTS: [LightRecipe; 4] = [
    LightRecipe {
        name: "MainLight",
        offset: [1.0, -1.0, 1.0],
        rotation_degrees: [45.0, 0.0, 45.0],
        energy: 10.0,
    },
    LightRecipe {
        name: "FillLight",
        offset: [-1.0, 1.0, 0.5],
        rotation_degrees: [30.0, 0.0, -135.0],
        energy: 8.0,
    },
    LightRecipe {
        name: "TopLight",
        offset: [0.0, 0.0, 2.0],
        rotation_degrees: [0.0, 0.0, 0.0],
        energy: 6.0,
    },
    LightRecipe {
        name: "FrontLight",
        offset: [0.0, -1.0, 0.0],
        rotation_degrees: [90.0, 0.0, 0.0],
        energy: 5.0,
    },
];

/// Tunable constant table behind [`frame`]
#[derive(Debug, Clone, PartialEq)]
pub struct FramingRecipe {
    /// Camera distance as a multiple of the object size
    pub distance_factor: f32,
    /// Horizontal offset of the camera along +X and -Y, as a fraction of the distance
    pub azimuth_factor: f32,
    /// Camera height as a multiple of the object size
    pub elevation_factor: f32,
    pub lens: f32,
    pub sensor_width: f32,
    pub clip_start: f32,
    pub clip_end: f32,
    /// Light distance as a multiple of the object size
    pub light_distance_factor: f32,
    pub lights: Vec<LightRecipe>,
    pub background: Background,
    pub material: Material,
}

impl Default for FramingRecipe {
    fn default() -> Self {
        Self {
            distance_factor: 3.0,
            azimuth_factor: 0.8,
            elevation_factor: 0.2,
            lens: 50.0,
            sensor_width: DEFAULT_SENSOR_WIDTH,
            clip_start: 0.1,
            clip_end: 1000.0,
            light_distance_factor: 4.0,
            lights: CANONICAL_LIGHTS.to_vec(),
            background: Background {
                color: [0.1, 0.3, 0.8, 1.0],
                strength: 1.0,
            },
            material: Material {
                base_color: [0.9, 0.9, 0.9, 1.0],
                metallic: 0.0,
                roughness: 0.6,
                specular: 1.0,
            },
        }
    }
}

impl FramingRecipe {
    /// Derive the camera and light rig for an object of `canonical_size`
    /// centered on the origin.
    pub fn frame(&self, canonical_size: f32) -> Framing {
        let target = Point3::origin();

        let distance = canonical_size * self.distance_factor;
        let position = Point3::new(
            distance * self.azimuth_factor,
            -distance * self.azimuth_factor,
            canonical_size * self.elevation_factor,
        );

        let camera = CameraRig {
            distance,
            position,
            look_at: target,
            rotation: look_at_rotation(&position, &target),
            lens: self.lens,
            sensor_width: self.sensor_width,
            clip_start: self.clip_start,
            clip_end: self.clip_end,
        };

        let light_distance = canonical_size * self.light_distance_factor;
        let lights = self
            .lights
            .iter()
            .map(|recipe| {
                let [ox, oy, oz] = recipe.offset;
                let [rx, ry, rz] = recipe.rotation_degrees;
                Light {
                    name: recipe.name.to_string(),
                    kind: LightKind::Sun,
                    position: Point3::new(
                        ox * light_distance,
                        oy * light_distance,
                        oz * light_distance,
                    ),
                    rotation: RotationState::from_degrees(rx, ry, rz),
                    energy: recipe.energy,
                }
            })
            .collect();

        Framing {
            camera,
            lights: LightRig { lights },
            background: self.background,
            material: self.material,
        }
    }
}

/// Frame an object with the canonical recipe
pub fn frame(canonical_size: f32) -> Framing {
    FramingRecipe::default().frame(canonical_size)
}
