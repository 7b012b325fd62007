//! Seeded procedural shapes.
//!
//! A shape starts as a cube. Each extrusion step picks a face, pushes it out
//! along its normal, twists the new cap about that normal and shrinks it
//! slightly. The random stream is a PCG32 seeded from the parameters, so the
//! same parameters give the same vertices on every platform.

use nalgebra::{Rotation3, Unit, Vector3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use tracing::debug;

use crate::error::{Error, Result};
use crate::geometry::{Face, Mesh};
use crate::manifest::GenerationManifest;
use crate::scene::SceneObject;

/// Smallest extrusion distance used by the parameter sweep
pub const DEFAULT_MIN_EXTRUDE: f32 = 0.1;

/// Inputs of one generated shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeParams {
    /// Running index of the shape within a sweep
    pub complexity_level: u32,
    pub seed: u64,
    pub num_extrusions: u32,
    pub min_extrude: f32,
    pub extrusion_range: f32,
    /// Degrees
    pub min_rotation: f32,
    /// Degrees
    pub rotation_range: f32,
}

impl ShapeParams {
    /// Parameters with the sweep's fixed minimums: extrusions of at least
    /// [`DEFAULT_MIN_EXTRUDE`] and twists starting at zero.
    pub fn new(seed: u64, num_extrusions: u32, extrusion_range: f32, rotation_range: f32) -> Self {
        Self {
            complexity_level: 0,
            seed,
            num_extrusions,
            min_extrude: DEFAULT_MIN_EXTRUDE,
            extrusion_range,
            min_rotation: 0.0,
            rotation_range,
        }
    }

    pub fn with_complexity_level(mut self, level: u32) -> Self {
        self.complexity_level = level;
        self
    }

    pub fn max_extrude(&self) -> f32 {
        self.min_extrude + self.extrusion_range
    }

    pub fn max_rotation(&self) -> f32 {
        self.min_rotation + self.rotation_range
    }

    pub fn validate(&self) -> Result<()> {
        let finite = [
            self.min_extrude,
            self.extrusion_range,
            self.min_rotation,
            self.rotation_range,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !finite || !self.max_extrude().is_finite() || !self.max_rotation().is_finite() {
            return Err(Error::GenerationFailure(
                "non-finite shape parameter".to_string(),
            ));
        }
        if self.min_extrude < 0.0 {
            return Err(Error::GenerationFailure(format!(
                "negative minimum extrusion {}",
                self.min_extrude
            )));
        }
        if self.extrusion_range < 0.0 || self.rotation_range < 0.0 {
            return Err(Error::GenerationFailure(
                "minimum exceeds maximum".to_string(),
            ));
        }
        Ok(())
    }

    /// File stem for the artifacts of this shape
    pub fn artifact_stem(&self) -> String {
        format!(
            "shape_gen_ext{}_extrange{}_rot{}_seed{}",
            self.num_extrusions, self.extrusion_range, self.rotation_range, self.seed
        )
    }
}

/// A generated object together with the record needed to regenerate it
#[derive(Debug, Clone)]
pub struct GeneratedShape {
    pub object: SceneObject,
    pub manifest: GenerationManifest,
}

/// Manifests record the shape parameters and the applied transform only.
/// `base_size` and `taper` are not recorded, so a manifest regenerates the
/// same mesh only with a generator that uses the same values.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeGenerator {
    /// Edge length of the starting cube
    pub base_size: f32,
    /// Uniform object scale applied after generation
    pub object_scale: f32,
    /// Range of the cap shrink factor; kept positive so caps never invert
    pub taper: (f32, f32),
}

impl Default for ShapeGenerator {
    fn default() -> Self {
        Self {
            base_size: 2.0,
            object_scale: 2.0,
            taper: (0.7, 1.0),
        }
    }
}

impl ShapeGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    fn validate(&self) -> Result<()> {
        let (low, high) = self.taper;
        if !(self.base_size.is_finite() && self.base_size > 0.0) {
            return Err(Error::GenerationFailure(format!(
                "invalid base size {}",
                self.base_size
            )));
        }
        if !(low.is_finite() && high.is_finite() && low > 0.0 && low <= high) {
            return Err(Error::GenerationFailure(format!(
                "invalid taper band {low}..={high}"
            )));
        }
        Ok(())
    }

    pub fn generate(&self, params: &ShapeParams) -> Result<GeneratedShape> {
        params.validate()?;
        self.validate()?;

        let mut rng = Pcg32::seed_from_u64(params.seed);
        let mut mesh = Mesh::cube(self.base_size);

        for _ in 0..params.num_extrusions {
            let face_index = rng.random_range(0..mesh.face_count());
            let distance = rng.random_range(params.min_extrude..=params.max_extrude());
            let twist = rng
                .random_range(params.min_rotation..=params.max_rotation())
                .to_radians();
            let taper = rng.random_range(self.taper.0..=self.taper.1);
            extrude_face(&mut mesh, face_index, distance, twist, taper)?;
        }

        if mesh.is_empty() {
            return Err(Error::GenerationFailure("generated mesh is empty".to_string()));
        }

        let scale = [self.object_scale; 3];
        let location = [0.0; 3];

        let mut object = SceneObject::new(params.artifact_stem(), mesh);
        object.transform.scale = Vector3::from(scale);
        object.transform.location = Vector3::from(location);

        debug!(
            name = %object.name,
            vertices = object.mesh.vertex_count(),
            faces = object.mesh.face_count(),
            "Generated shape"
        );

        Ok(GeneratedShape {
            manifest: GenerationManifest::from_params(params, scale, location),
            object,
        })
    }
}

/// Push face `face_index` out along its normal by `distance`, ringing it with
/// one quad per edge. The cap is rotated by `twist` radians about the normal
/// and scaled by `taper` around its centroid.
fn extrude_face(
    mesh: &mut Mesh,
    face_index: usize,
    distance: f32,
    twist: f32,
    taper: f32,
) -> Result<()> {
    let face = mesh.faces[face_index].clone();
    let normal = mesh.face_normal(&face);
    let axis = Unit::try_new(normal, f32::EPSILON).ok_or_else(|| {
        Error::GenerationFailure(format!("face {face_index} has no normal"))
    })?;

    let centroid = mesh.face_centroid(&face);
    let rotation = Rotation3::from_axis_angle(&axis, twist);
    let cap_center = centroid + normal * distance;

    let cap: Vec<u32> = face
        .indices
        .iter()
        .map(|&i| {
            let offset = mesh.vertices[i as usize] - centroid;
            mesh.add_vertex(cap_center + rotation * (offset * taper))
        })
        .collect();

    let count = face.len();
    for i in 0..count {
        let j = (i + 1) % count;
        mesh.add_face(vec![face.indices[i], face.indices[j], cap[j], cap[i]]);
    }
    mesh.faces[face_index] = Face::new(cap);

    Ok(())
}
