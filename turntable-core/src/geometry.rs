/// Geometry primitives: indexed polygon meshes and their triangulation
use std::collections::HashMap;

use nalgebra::{Matrix4, Point3, Vector3};

use crate::bounds::BoundingBox;
use crate::error::Result;

/// A polygon face as an ordered, counter-clockwise loop of vertex indices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Face {
    pub indices: Vec<u32>,
}

impl Face {
    pub fn new(indices: Vec<u32>) -> Self {
        Self { indices }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// A triangle with resolved positions, produced by triangulating a face
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub vertices: [Point3<f32>; 3],
}

impl Triangle {
    pub fn new(v0: Point3<f32>, v1: Point3<f32>, v2: Point3<f32>) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Calculate the face normal from the triangle's vertices.
    /// Zero-area triangles yield a zero vector.
    pub fn calculate_normal(&self) -> Vector3<f32> {
        let v0 = self.vertices[0];
        let v1 = self.vertices[1];
        let v2 = self.vertices[2];

        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        edge1
            .cross(&edge2)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3::zeros)
    }
}

/// An indexed polygon mesh: shared vertex positions plus face loops
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Point3<f32>>,
    pub faces: Vec<Face>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertices: usize, faces: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            faces: Vec::with_capacity(faces),
        }
    }

    /// Append a vertex and return its index
    pub fn add_vertex(&mut self, position: Point3<f32>) -> u32 {
        self.vertices.push(position);
        (self.vertices.len() - 1) as u32
    }

    pub fn add_face(&mut self, indices: Vec<u32>) {
        self.faces.push(Face::new(indices));
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Build an indexed mesh from a triangle soup, welding positions that are
    /// bit-identical into one shared vertex.
    pub fn from_triangles<I>(triangles: I) -> Self
    where
        I: IntoIterator<Item = [Point3<f32>; 3]>,
    {
        let mut mesh = Self::new();
        let mut lookup: HashMap<[u32; 3], u32> = HashMap::new();

        for triangle in triangles {
            let mut face = Vec::with_capacity(3);
            for position in triangle {
                // +0.0 folds -0.0 into 0.0 so both weld together
                let key = [
                    (position.x + 0.0).to_bits(),
                    (position.y + 0.0).to_bits(),
                    (position.z + 0.0).to_bits(),
                ];
                let index = *lookup
                    .entry(key)
                    .or_insert_with(|| mesh.add_vertex(position));
                face.push(index);
            }
            mesh.add_face(face);
        }

        mesh
    }

    /// Fan-triangulate every face
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.faces.iter().flat_map(move |face| {
            let idx = &face.indices;
            (1..idx.len().saturating_sub(1)).map(move |i| {
                Triangle::new(
                    self.vertices[idx[0] as usize],
                    self.vertices[idx[i] as usize],
                    self.vertices[idx[i + 1] as usize],
                )
            })
        })
    }

    pub fn triangle_count(&self) -> usize {
        self.faces
            .iter()
            .map(|face| face.len().saturating_sub(2))
            .sum()
    }

    /// Unit normal of a face (Newell's method, robust for non-planar loops)
    pub fn face_normal(&self, face: &Face) -> Vector3<f32> {
        let mut normal = Vector3::zeros();
        let count = face.indices.len();
        for i in 0..count {
            let cur = self.vertices[face.indices[i] as usize];
            let next = self.vertices[face.indices[(i + 1) % count] as usize];
            normal.x += (cur.y - next.y) * (cur.z + next.z);
            normal.y += (cur.z - next.z) * (cur.x + next.x);
            normal.z += (cur.x - next.x) * (cur.y + next.y);
        }
        normal
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3::zeros)
    }

    /// Average of a face's vertex positions
    pub fn face_centroid(&self, face: &Face) -> Point3<f32> {
        let sum = face
            .indices
            .iter()
            .fold(Vector3::zeros(), |acc, &i| acc + self.vertices[i as usize].coords);
        Point3::from(sum / face.indices.len().max(1) as f32)
    }

    /// Axis-aligned bounds of the vertex positions
    pub fn bounding_box(&self) -> Result<BoundingBox> {
        BoundingBox::from_points(&self.vertices)
    }

    pub fn translate(&mut self, offset: &Vector3<f32>) {
        for vertex in &mut self.vertices {
            vertex.coords += offset;
        }
    }

    pub fn scale_uniform(&mut self, factor: f32) {
        for vertex in &mut self.vertices {
            vertex.coords *= factor;
        }
    }

    /// Bake an affine transform into the vertex positions
    pub fn transform(&mut self, matrix: &Matrix4<f32>) {
        for vertex in &mut self.vertices {
            *vertex = matrix.transform_point(vertex);
        }
    }

    /// Create an axis-aligned cube centered on the origin, one quad per side
    pub fn cube(size: f32) -> Self {
        let half = size / 2.0;
        let mut mesh = Self::with_capacity(8, 6);

        for &(x, y, z) in &[
            (-half, -half, -half),
            (half, -half, -half),
            (half, half, -half),
            (-half, half, -half),
            (-half, -half, half),
            (half, -half, half),
            (half, half, half),
            (-half, half, half),
        ] {
            mesh.add_vertex(Point3::new(x, y, z));
        }

        // Top, bottom, right, left, back, front
        mesh.add_face(vec![4, 5, 6, 7]);
        mesh.add_face(vec![0, 3, 2, 1]);
        mesh.add_face(vec![1, 2, 6, 5]);
        mesh.add_face(vec![0, 4, 7, 3]);
        mesh.add_face(vec![3, 7, 6, 2]);
        mesh.add_face(vec![0, 1, 5, 4]);

        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_counts() {
        let cube = Mesh::cube(2.0);
        assert_eq!(cube.vertex_count(), 8);
        assert_eq!(cube.face_count(), 6);
        assert_eq!(cube.triangle_count(), 12);
        assert_eq!(cube.triangles().count(), 12);
    }

    #[test]
    fn test_cube_normals_point_outward() {
        let cube = Mesh::cube(2.0);
        for face in &cube.faces {
            let normal = cube.face_normal(face);
            let centroid = cube.face_centroid(face);
            assert!((normal.norm() - 1.0).abs() < 1e-6);
            assert!(normal.dot(&centroid.coords) > 0.0);
        }
    }

    #[test]
    fn test_triangle_normal_matches_face() {
        let cube = Mesh::cube(1.0);
        let top = &cube.faces[0];
        let triangle = cube.triangles().next().unwrap();
        assert!((triangle.calculate_normal() - cube.face_normal(top)).norm() < 1e-6);
    }

    #[test]
    fn test_from_triangles_welds_shared_corners() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1.0, 0.0, 0.0);
        let c = Point3::new(1.0, 1.0, 0.0);
        let d = Point3::new(-0.0, 1.0, 0.0);
        let mesh = Mesh::from_triangles(vec![[a, b, c], [a, c, d]]);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.face_count(), 2);
    }

    #[test]
    fn test_translate_and_scale() {
        let mut mesh = Mesh::cube(2.0);
        mesh.translate(&Vector3::new(1.0, 0.0, 0.0));
        mesh.scale_uniform(0.5);
        let bounds = mesh.bounding_box().unwrap();
        assert!((bounds.min.x - 0.0).abs() < 1e-6);
        assert!((bounds.max.x - 1.0).abs() < 1e-6);
        assert!((bounds.max_dim() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_face_normal_is_zero() {
        let mut mesh = Mesh::new();
        let p = mesh.add_vertex(Point3::new(1.0, 1.0, 1.0));
        mesh.add_face(vec![p, p, p]);
        assert_eq!(mesh.face_normal(&mesh.faces[0]), Vector3::zeros());
    }
}
