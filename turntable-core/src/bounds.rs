/// Axis-aligned bounding boxes measured from vertex data
use nalgebra::{Point3, Vector3};

use crate::error::{Error, Result};

/// Minimal axis-aligned box containing a set of points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl BoundingBox {
    pub fn new(min: Point3<f32>, max: Point3<f32>) -> Self {
        Self { min, max }
    }

    /// Measure the bounds of `points` in a single pass.
    ///
    /// Fails with [`Error::EmptyMesh`] when there are no points, and with
    /// [`Error::NonFiniteVertex`] when a coordinate is NaN or infinite.
    pub fn from_points(points: &[Point3<f32>]) -> Result<Self> {
        let first = points.first().ok_or(Error::EmptyMesh)?;

        let mut min = *first;
        let mut max = *first;
        for (index, point) in points.iter().enumerate() {
            if !point.coords.iter().all(|c| c.is_finite()) {
                return Err(Error::NonFiniteVertex { index });
            }
            min = min.inf(point);
            max = max.sup(point);
        }

        Ok(Self { min, max })
    }

    pub fn center(&self) -> Point3<f32> {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }

    /// Largest edge length of the box
    pub fn max_dim(&self) -> f32 {
        self.size().max()
    }

    pub fn diagonal(&self) -> f32 {
        self.size().norm()
    }

    /// Uniform factor that maps the largest edge onto `target_size`.
    ///
    /// Returns [`Error::DegenerateBounds`] when the box has no extent.
    pub fn scale_factor_to(&self, target_size: f32) -> Result<f32> {
        let max_dim = self.max_dim();
        if max_dim <= 0.0 {
            return Err(Error::DegenerateBounds { max_dim });
        }
        Ok(target_size / max_dim)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_of_offset_points() {
        let points = vec![
            Point3::new(10.0, -2.0, 3.0),
            Point3::new(14.0, 2.0, 4.0),
            Point3::new(12.0, 0.0, 5.0),
        ];
        let bounds = BoundingBox::from_points(&points).unwrap();
        assert_eq!(bounds.min, Point3::new(10.0, -2.0, 3.0));
        assert_eq!(bounds.max, Point3::new(14.0, 2.0, 5.0));
        assert_eq!(bounds.center(), Point3::new(12.0, 0.0, 4.0));
        assert_eq!(bounds.size(), Vector3::new(4.0, 4.0, 2.0));
        assert_eq!(bounds.max_dim(), 4.0);
        assert!((bounds.diagonal() - 6.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_points_fail() {
        assert!(matches!(
            BoundingBox::from_points(&[]),
            Err(Error::EmptyMesh)
        ));
    }

    #[test]
    fn test_non_finite_point_fails() {
        let points = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(f32::NAN, 1.0, 1.0)];
        assert!(matches!(
            BoundingBox::from_points(&points),
            Err(Error::NonFiniteVertex { index: 1 })
        ));
    }

    #[test]
    fn test_single_point_is_degenerate() {
        let bounds = BoundingBox::from_points(&[Point3::new(1.0, 2.0, 3.0)]).unwrap();
        assert_eq!(bounds.max_dim(), 0.0);
        assert!(matches!(
            bounds.scale_factor_to(2.0),
            Err(Error::DegenerateBounds { .. })
        ));
    }

    #[test]
    fn test_scale_factor() {
        let bounds = BoundingBox::new(Point3::new(-2.0, -1.0, 0.0), Point3::new(2.0, 1.0, 1.0));
        assert_eq!(bounds.scale_factor_to(2.0).unwrap(), 0.5);
    }
}
