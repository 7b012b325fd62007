//! Error types for the turntable pipeline.
//!
//! Per-item failures ([`Error::EmptyMesh`], [`Error::GenerationFailure`],
//! [`Error::RenderFailure`], ...) are caught by the batch driver and turned
//! into a skipped item. [`ConfigError`] is batch-wide and is reported before
//! any item runs.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used across the core crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the pipeline.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Geometry
    // ========================================================================
    /// The mesh has no vertices to measure.
    #[error("mesh has no vertices")]
    EmptyMesh,

    /// All vertices coincide, so there is no extent to scale.
    #[error("mesh bounds are degenerate (max dimension {max_dim})")]
    DegenerateBounds { max_dim: f32 },

    /// A vertex coordinate is NaN or infinite.
    #[error("vertex {index} has a non-finite coordinate")]
    NonFiniteVertex { index: usize },

    /// Animation was requested on an object whose transform is not identity.
    #[error("object is not in canonical pose; normalize it before animating")]
    NotCanonical,

    // ========================================================================
    // Generation & rendering
    // ========================================================================
    #[error("shape generation failed: {0}")]
    GenerationFailure(String),

    #[error("render failed: {0}")]
    RenderFailure(String),

    /// The renderer returned success but nothing was written.
    #[error("renderer produced no output at {0}")]
    MissingRenderOutput(PathBuf),

    // ========================================================================
    // Codec, config, files
    // ========================================================================
    #[error("STL error: {0}")]
    Stl(#[from] StlError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Manifests are written once; an existing file is never replaced.
    #[error("manifest already exists: {0}")]
    ManifestExists(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// STL decoding errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StlError {
    #[error("file too small to be a valid STL ({0} bytes)")]
    TooSmall(usize),

    #[error("unexpected end of file: expected {expected} triangles, data ends at triangle {found}")]
    UnexpectedEof { expected: usize, found: usize },

    #[error("failed to parse binary STL: {0}")]
    Binary(String),

    #[error("failed to parse ASCII STL: {0}")]
    Ascii(String),
}

/// Batch-wide misconfiguration. Fatal at startup.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("total frames must be at least 2, got {0}")]
    TooFewFrames(u32),

    #[error("unknown rotation axis '{0}' (expected X, Y or Z)")]
    UnknownAxis(String),

    #[error("unknown motion mode '{0}' (expected turntable or orbit)")]
    UnknownMode(String),

    #[error("target size must be finite and positive, got {0}")]
    InvalidTargetSize(f32),

    #[error("resolution must be non-zero, got {0}x{1}")]
    InvalidResolution(u32, u32),

    #[error("fps must be non-zero")]
    InvalidFps,

    #[error("orbit radius must be finite and positive, got {0}")]
    InvalidRadius(f32),

    #[error("rotation degrees must be finite, got {0}")]
    InvalidDegrees(f32),

    #[error("orbit {field} must be finite, got {value}")]
    InvalidOrbit { field: &'static str, value: f32 },
}
