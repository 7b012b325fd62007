//! Generation manifest: the JSON record written next to every generated
//! shape, sufficient to regenerate it.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::shapegen::ShapeParams;

/// Suffix appended to an artifact stem to name its manifest
pub const MANIFEST_SUFFIX: &str = "_params.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationManifest {
    pub complexity_level: u32,
    pub random_seed: u64,
    pub num_extrusions: u32,
    pub min_extrude: f32,
    pub max_extrude: f32,
    pub extrusion_range: f32,
    pub min_rotation: f32,
    pub max_rotation: f32,
    pub rotation_range: f32,
    pub scale: [f32; 3],
    pub location: [f32; 3],
}

impl GenerationManifest {
    pub fn from_params(params: &ShapeParams, scale: [f32; 3], location: [f32; 3]) -> Self {
        Self {
            complexity_level: params.complexity_level,
            random_seed: params.seed,
            num_extrusions: params.num_extrusions,
            min_extrude: params.min_extrude,
            max_extrude: params.max_extrude(),
            extrusion_range: params.extrusion_range,
            min_rotation: params.min_rotation,
            max_rotation: params.max_rotation(),
            rotation_range: params.rotation_range,
            scale,
            location,
        }
    }

    /// Generator inputs recorded in this manifest
    pub fn params(&self) -> ShapeParams {
        ShapeParams::from(self)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write to `path`, refusing to replace an existing manifest
    pub fn write_new(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => Error::ManifestExists(path.to_path_buf()),
                _ => Error::Io(e),
            })?;
        file.write_all(json.as_bytes())?;
        file.write_all(b"\n")?;
        Ok(())
    }

    pub fn read(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }
}

impl From<&GenerationManifest> for ShapeParams {
    fn from(manifest: &GenerationManifest) -> Self {
        ShapeParams {
            complexity_level: manifest.complexity_level,
            seed: manifest.random_seed,
            num_extrusions: manifest.num_extrusions,
            min_extrude: manifest.min_extrude,
            extrusion_range: manifest.extrusion_range,
            min_rotation: manifest.min_rotation,
            rotation_range: manifest.rotation_range,
        }
    }
}

/// `<dir>/<stem>_params.json` for an artifact at `<dir>/<stem>.<ext>`
pub fn manifest_path_for(artifact: &Path) -> PathBuf {
    let stem = artifact
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    artifact.with_file_name(format!("{stem}{MANIFEST_SUFFIX}"))
}
