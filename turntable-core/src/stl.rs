/// STL reader and writer for binary and ASCII formats
use std::fs;
use std::path::Path;

use nalgebra::Point3;
use nom::{
    bytes::complete::{tag, take},
    character::complete::{multispace0, multispace1, not_line_ending},
    multi::{count, many0},
    number::complete::{float, le_f32, le_u32},
    sequence::{preceded, tuple},
    IResult,
};

use crate::error::{Result, StlError};
use crate::geometry::Mesh;

const HEADER_LEN: usize = 80;
const FACET_LEN: usize = 50;

/// Output encoding for [`write_stl_file`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StlFormat {
    #[default]
    Binary,
    Ascii,
}

/// Parse a binary STL file
pub fn parse_binary_stl(data: &[u8]) -> std::result::Result<Mesh, StlError> {
    if data.len() < HEADER_LEN + 4 {
        return Err(StlError::TooSmall(data.len()));
    }

    let triangle_count = u32::from_le_bytes([data[80], data[81], data[82], data[83]]) as usize;
    let available = (data.len() - HEADER_LEN - 4) / FACET_LEN;
    if available < triangle_count {
        return Err(StlError::UnexpectedEof {
            expected: triangle_count,
            found: available,
        });
    }

    match parse_binary_impl(data) {
        Ok((_, triangles)) => Ok(Mesh::from_triangles(triangles)),
        Err(e) => Err(StlError::Binary(format!("{:?}", e))),
    }
}

fn parse_binary_impl(input: &[u8]) -> IResult<&[u8], Vec<[Point3<f32>; 3]>> {
    let (input, _) = take(HEADER_LEN)(input)?;
    let (input, n) = le_u32(input)?;
    count(parse_binary_facet, n as usize)(input)
}

fn parse_binary_facet(input: &[u8]) -> IResult<&[u8], [Point3<f32>; 3]> {
    // Stored normals are ignored; they are recomputed from winding on export
    let (input, _normal) = parse_le_point(input)?;
    let (input, v1) = parse_le_point(input)?;
    let (input, v2) = parse_le_point(input)?;
    let (input, v3) = parse_le_point(input)?;
    // Attribute byte count
    let (input, _) = take(2usize)(input)?;
    Ok((input, [v1, v2, v3]))
}

fn parse_le_point(input: &[u8]) -> IResult<&[u8], Point3<f32>> {
    let (input, (x, y, z)) = tuple((le_f32, le_f32, le_f32))(input)?;
    Ok((input, Point3::new(x, y, z)))
}

/// Parse an ASCII STL file
pub fn parse_ascii_stl(input: &str) -> std::result::Result<Mesh, StlError> {
    match parse_ascii_stl_impl(input) {
        Ok((_, mesh)) => Ok(mesh),
        Err(e) => Err(StlError::Ascii(format!("{:?}", e))),
    }
}

fn parse_ascii_stl_impl(input: &str) -> IResult<&str, Mesh> {
    let (input, _) = preceded(multispace0, tag("solid"))(input)?;
    let (input, _name) = not_line_ending(input)?;
    let (input, triangles) = many0(parse_facet)(input)?;
    let (input, _) = preceded(multispace0, tag("endsolid"))(input)?;
    let (input, _) = not_line_ending(input)?;

    Ok((input, Mesh::from_triangles(triangles)))
}

fn parse_facet(input: &str) -> IResult<&str, [Point3<f32>; 3]> {
    let (input, _) = preceded(multispace0, tag("facet"))(input)?;
    let (input, _) = preceded(multispace1, tag("normal"))(input)?;
    let (input, _normal) = parse_vector3(input)?;
    let (input, _) = preceded(multispace0, tag("outer"))(input)?;
    let (input, _) = preceded(multispace1, tag("loop"))(input)?;
    let (input, v1) = parse_vertex(input)?;
    let (input, v2) = parse_vertex(input)?;
    let (input, v3) = parse_vertex(input)?;
    let (input, _) = preceded(multispace0, tag("endloop"))(input)?;
    let (input, _) = preceded(multispace0, tag("endfacet"))(input)?;

    Ok((input, [v1, v2, v3]))
}

fn parse_vertex(input: &str) -> IResult<&str, Point3<f32>> {
    let (input, _) = preceded(multispace0, tag("vertex"))(input)?;
    let (input, (x, y, z)) = parse_vector3(input)?;
    Ok((input, Point3::new(x, y, z)))
}

fn parse_vector3(input: &str) -> IResult<&str, (f32, f32, f32)> {
    let (input, _) = multispace0(input)?;
    let (input, x) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, y) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, z) = float(input)?;
    Ok((input, (x, y, z)))
}

/// Detect and parse STL file (binary or ASCII)
pub fn parse_stl(data: &[u8]) -> std::result::Result<Mesh, StlError> {
    // Binary files may also start with "solid", so fall back on failure
    let start = data
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(data.len());
    if data[start..].starts_with(b"solid") {
        if let Ok(text) = std::str::from_utf8(data) {
            if let Ok(mesh) = parse_ascii_stl(text) {
                return Ok(mesh);
            }
        }
    }

    parse_binary_stl(data)
}

/// Encode a mesh as binary STL (faces are fan-triangulated)
pub fn write_binary_stl(mesh: &Mesh, name: &str) -> Vec<u8> {
    let triangle_count = mesh.triangle_count();
    let mut out = Vec::with_capacity(HEADER_LEN + 4 + triangle_count * FACET_LEN);

    let mut header = [b' '; HEADER_LEN];
    let label = name.as_bytes();
    let len = label.len().min(HEADER_LEN);
    header[..len].copy_from_slice(&label[..len]);
    out.extend_from_slice(&header);
    out.extend_from_slice(&(triangle_count as u32).to_le_bytes());

    for triangle in mesh.triangles() {
        let normal = triangle.calculate_normal();
        for c in normal.iter() {
            out.extend_from_slice(&c.to_le_bytes());
        }
        for vertex in &triangle.vertices {
            for c in vertex.coords.iter() {
                out.extend_from_slice(&c.to_le_bytes());
            }
        }
        out.extend_from_slice(&0u16.to_le_bytes());
    }

    out
}

/// Encode a mesh as ASCII STL
pub fn write_ascii_stl(mesh: &Mesh, name: &str) -> String {
    let mut out = format!("solid {}\n", name);
    for triangle in mesh.triangles() {
        let n = triangle.calculate_normal();
        out.push_str(&format!("  facet normal {} {} {}\n", n.x, n.y, n.z));
        out.push_str("    outer loop\n");
        for v in &triangle.vertices {
            out.push_str(&format!("      vertex {} {} {}\n", v.x, v.y, v.z));
        }
        out.push_str("    endloop\n");
        out.push_str("  endfacet\n");
    }
    out.push_str(&format!("endsolid {}\n", name));
    out
}

/// Read and decode an STL file from disk
pub fn read_stl_file(path: &Path) -> Result<Mesh> {
    let data = fs::read(path)?;
    Ok(parse_stl(&data)?)
}

/// Write a mesh to disk, naming the solid after the file stem
pub fn write_stl_file(path: &Path, mesh: &Mesh, format: StlFormat) -> Result<()> {
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("mesh");
    match format {
        StlFormat::Binary => fs::write(path, write_binary_stl(mesh, name))?,
        StlFormat::Ascii => fs::write(path, write_ascii_stl(mesh, name))?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_binary_header() {
        let mut data = vec![0u8; 84];
        // Set triangle count to 0
        data[80..84].copy_from_slice(&0u32.to_le_bytes());

        let result = parse_binary_stl(&data);
        assert!(result.is_ok());
        let mesh = result.unwrap();
        assert_eq!(mesh.face_count(), 0);
        assert!(mesh.is_empty());
    }

    #[test]
    fn test_binary_too_small() {
        assert_eq!(parse_binary_stl(&[0u8; 10]), Err(StlError::TooSmall(10)));
    }

    #[test]
    fn test_binary_truncated() {
        let mut data = vec![0u8; 84 + 50];
        data[80..84].copy_from_slice(&2u32.to_le_bytes());
        assert_eq!(
            parse_binary_stl(&data),
            Err(StlError::UnexpectedEof {
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn test_binary_cube_round_trip() {
        let cube = Mesh::cube(2.0);
        let bytes = write_binary_stl(&cube, "cube");
        assert_eq!(bytes.len(), 84 + 12 * 50);

        let parsed = parse_stl(&bytes).unwrap();
        assert_eq!(parsed.face_count(), 12);
        assert_eq!(parsed.vertex_count(), 8);
        assert_eq!(parsed.bounding_box().unwrap(), cube.bounding_box().unwrap());
    }

    #[test]
    fn test_binary_with_solid_header_falls_back() {
        let cube = Mesh::cube(1.0);
        let bytes = write_binary_stl(&cube, "solid cube");
        assert_eq!(&bytes[0..5], b"solid");
        assert_eq!(parse_stl(&bytes).unwrap().face_count(), 12);
    }

    #[test]
    fn test_ascii_named_solid() {
        let text = "solid wedge\n\
            facet normal 0 0 1\n\
              outer loop\n\
                vertex 0 0 0\n\
                vertex 1 0 0\n\
                vertex 0 1 0\n\
              endloop\n\
            endfacet\n\
            endsolid wedge\n";
        let mesh = parse_stl(text.as_bytes()).unwrap();
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.vertex_count(), 3);
    }

    #[test]
    fn test_ascii_with_leading_whitespace() {
        let text = "\n  solid wedge\n\
            facet normal 0 0 1\n\
              outer loop\n\
                vertex 0 0 0\n\
                vertex 1 0 0\n\
                vertex 0 1 0\n\
              endloop\n\
            endfacet\n\
            endsolid wedge\n";
        assert_eq!(parse_stl(text.as_bytes()).unwrap().face_count(), 1);
    }

    #[test]
    fn test_ascii_cube_round_trip() {
        let cube = Mesh::cube(3.5);
        let text = write_ascii_stl(&cube, "cube");
        let parsed = parse_ascii_stl(&text).unwrap();
        assert_eq!(parsed.face_count(), 12);
        assert_eq!(parsed.vertex_count(), 8);
        assert_eq!(parsed.bounding_box().unwrap().max_dim(), 3.5);
    }
}
