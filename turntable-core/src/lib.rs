/// Turntable Core Library - normalized mesh turntable and orbit pipeline
///
/// This library provides the renderer-independent pipeline: STL codec,
/// bounds measurement, normalization to a canonical pose, auto-framing,
/// rotation and orbit motion, seeded shape generation and the batch driver.

pub mod animation;
pub mod batch;
pub mod bounds;
pub mod config;
pub mod error;
pub mod framing;
pub mod geometry;
pub mod grid;
pub mod manifest;
pub mod normalize;
pub mod orbit;
pub mod projection;
pub mod render;
pub mod scene;
pub mod shapegen;
pub mod stl;
pub mod transform;

// Re-export commonly used types
pub use animation::{animate_rotation, RotationAxis, RotationTrack};
pub use batch::{BatchDriver, BatchReport, ItemFailure, Stage};
pub use bounds::BoundingBox;
pub use config::{BatchConfig, MotionMode};
pub use error::{ConfigError, Error, Result, StlError};
pub use framing::{frame, Framing, FramingRecipe};
pub use geometry::{Face, Mesh, Triangle};
pub use grid::ParameterGrid;
pub use manifest::GenerationManifest;
pub use normalize::{normalize, Normalization};
pub use orbit::{build_orbit, OrbitRig, OrbitSettings};
pub use projection::Camera;
pub use render::{RenderJob, Renderer};
pub use scene::{Motion, Scene, SceneDescription, SceneObject};
pub use shapegen::{GeneratedShape, ShapeGenerator, ShapeParams};
pub use transform::{ObjectTransform, RotationState, Transform};
