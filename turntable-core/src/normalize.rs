//! Canonical pose: recenter and uniformly rescale vertex data, then reset the
//! object transform.
//!
//! The normalization is baked into the vertices rather than kept on the
//! transform, so a later rotation spins the object about its geometric center
//! instead of swinging it around an off-center pivot.

use nalgebra::Vector3;
use tracing::{debug, warn};

use crate::error::{ConfigError, Error, Result};
use crate::scene::SceneObject;
use crate::transform::ObjectTransform;

/// What [`normalize`] did to an object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalization {
    /// Largest bounding dimension after normalization
    pub canonical_size: f32,
    /// Uniform factor applied to the vertices (1.0 when degenerate)
    pub scale_factor: f32,
    /// Translation applied to the vertices before scaling
    pub offset: Vector3<f32>,
    /// All vertices coincided, so scaling was skipped
    pub degenerate: bool,
}

/// Bring `object` into canonical pose with its largest dimension equal to
/// `target_size`, and return the resulting size.
///
/// Order matters: the existing transform is baked first so the bounds are
/// measured in world space, the mesh is recentered, then scaled, then the
/// transform is reset to identity. A mesh whose vertices all coincide cannot
/// be scaled; it is still recentered and `target_size` is reported as a
/// nominal size.
pub fn normalize(object: &mut SceneObject, target_size: f32) -> Result<Normalization> {
    if !target_size.is_finite() || target_size <= 0.0 {
        return Err(ConfigError::InvalidTargetSize(target_size).into());
    }

    object.apply_transform();
    let bounds = object.mesh.bounding_box()?;

    let offset = -bounds.center().coords;
    object.mesh.translate(&offset);

    let (scale_factor, degenerate) = match bounds.scale_factor_to(target_size) {
        Ok(factor) => {
            object.mesh.scale_uniform(factor);
            (factor, false)
        }
        Err(Error::DegenerateBounds { max_dim }) => {
            warn!(
                object = %object.name,
                max_dim,
                "Degenerate bounds, skipping scale and using nominal size"
            );
            (1.0, true)
        }
        Err(e) => return Err(e),
    };

    object.transform = ObjectTransform::identity();

    debug!(
        object = %object.name,
        original_size = bounds.max_dim(),
        scale_factor,
        "Normalized to canonical pose"
    );

    Ok(Normalization {
        canonical_size: target_size,
        scale_factor,
        offset,
        degenerate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Mesh;
    use crate::transform::RotationState;
    use nalgebra::Point3;

    const TOLERANCE: f32 = 1e-4;

    fn lopsided_object() -> SceneObject {
        let mut mesh = Mesh::cube(10.0);
        mesh.vertices[6] = Point3::new(9.0, 7.0, 12.0);
        mesh.translate(&Vector3::new(100.0, 50.0, -30.0));
        let mut object = SceneObject::new("lopsided", mesh);
        object.transform.location = Vector3::new(5.0, 0.0, 0.0);
        object.transform.rotation = RotationState::new(0.0, 0.0, 0.3);
        object.transform.scale = Vector3::new(2.0, 2.0, 2.0);
        object
    }

    #[test]
    fn test_normalize_centers_and_scales() {
        let mut object = lopsided_object();
        let result = normalize(&mut object, 2.0).unwrap();

        assert_eq!(result.canonical_size, 2.0);
        assert!(!result.degenerate);
        assert!(object.transform.is_identity());

        let bounds = object.mesh.bounding_box().unwrap();
        assert!(bounds.center().coords.norm() < TOLERANCE);
        assert!((bounds.max_dim() - 2.0).abs() < TOLERANCE);
        assert!(object.is_canonical(2.0, TOLERANCE));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let mut object = lopsided_object();
        normalize(&mut object, 2.0).unwrap();
        let first = object.mesh.clone();

        let again = normalize(&mut object, 2.0).unwrap();
        assert!((again.scale_factor - 1.0).abs() < TOLERANCE);
        for (a, b) in first.vertices.iter().zip(&object.mesh.vertices) {
            assert!((a - b).norm() < TOLERANCE);
        }
    }

    #[test]
    fn test_normalize_empty_mesh_fails() {
        let mut object = SceneObject::new("empty", Mesh::new());
        assert!(matches!(normalize(&mut object, 2.0), Err(Error::EmptyMesh)));
    }

    #[test]
    fn test_normalize_degenerate_point_cloud() {
        let mut mesh = Mesh::new();
        for _ in 0..3 {
            mesh.add_vertex(Point3::new(4.0, 4.0, 4.0));
        }
        mesh.add_face(vec![0, 1, 2]);
        let mut object = SceneObject::new("point", mesh);

        let result = normalize(&mut object, 2.0).unwrap();
        assert!(result.degenerate);
        assert_eq!(result.canonical_size, 2.0);
        assert_eq!(result.scale_factor, 1.0);
        assert_eq!(object.mesh.vertices[0], Point3::origin());
    }

    #[test]
    fn test_invalid_target_size() {
        let mut object = SceneObject::new("cube", Mesh::cube(1.0));
        assert!(matches!(
            normalize(&mut object, 0.0),
            Err(Error::Config(ConfigError::InvalidTargetSize(_)))
        ));
        assert!(matches!(
            normalize(&mut object, f32::NAN),
            Err(Error::Config(ConfigError::InvalidTargetSize(_)))
        ));
    }
}
