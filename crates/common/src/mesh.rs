use glam::{Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// One mesh vertex: homogeneous position (w = 1), normal and texture coordinate.
///
/// `PartialEq` compares every component with `==`, so `0.0` and `-0.0` are
/// equal and two vertices only match when all nine floats match.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub position: Vec4,
    pub normal: Vec3,
    pub uv: Vec2,
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3, uv: Vec2) -> Self {
        Self {
            position: position.extend(1.0),
            normal,
            uv,
        }
    }

    /// Bit pattern usable as a hash key that agrees with `==`.
    ///
    /// Negative zero is folded into positive zero first. NaN components never
    /// compare equal and must be rejected before keying.
    pub fn exact_key(&self) -> [u32; 9] {
        let fold = |v: f32| (v + 0.0).to_bits();
        [
            fold(self.position.x),
            fold(self.position.y),
            fold(self.position.z),
            fold(self.position.w),
            fold(self.normal.x),
            fold(self.normal.y),
            fold(self.normal.z),
            fold(self.uv.x),
            fold(self.uv.y),
        ]
    }
}

/// Errors from mesh validation.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum MeshError {
    #[error("index {index} at position {at} is out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        at: usize,
        index: u32,
        vertex_count: usize,
    },
    #[error("index count {0} is not a multiple of 3")]
    PartialTriangle(usize),
}

/// Indexed triangle list.
///
/// Built once at load time and then only read: uploaded to the GPU and
/// queried for the draw-call index count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimpleMesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl SimpleMesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(vertices: Vec<Vertex>, indices: Vec<u32>) -> Result<Self, MeshError> {
        let mesh = Self { vertices, indices };
        mesh.validate()?;
        Ok(mesh)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of indices, i.e. the count passed to an indexed draw.
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Check that the index list forms whole triangles over existing vertices.
    pub fn validate(&self) -> Result<(), MeshError> {
        if self.indices.len() % 3 != 0 {
            return Err(MeshError::PartialTriangle(self.indices.len()));
        }
        let vertex_count = self.vertices.len();
        match self
            .indices
            .iter()
            .enumerate()
            .find(|(_, i)| **i as usize >= vertex_count)
        {
            Some((at, &index)) => Err(MeshError::IndexOutOfRange {
                at,
                index,
                vertex_count,
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vert(x: f32) -> Vertex {
        Vertex::new(Vec3::new(x, 0.0, 0.0), Vec3::Y, Vec2::ZERO)
    }

    #[test]
    fn new_vertex_has_unit_w() {
        assert_eq!(vert(2.0).position.w, 1.0);
    }

    #[test]
    fn exact_key_matches_equality_for_signed_zero() {
        let a = vert(0.0);
        let b = vert(-0.0);
        assert_eq!(a, b);
        assert_eq!(a.exact_key(), b.exact_key());
    }

    #[test]
    fn exact_key_distinguishes_tiny_differences() {
        let a = vert(1.0);
        let b = vert(1.0 + f32::EPSILON);
        assert_ne!(a, b);
        assert_ne!(a.exact_key(), b.exact_key());
    }

    #[test]
    fn validate_rejects_out_of_range_index() {
        let err = SimpleMesh::from_parts(vec![vert(0.0), vert(1.0)], vec![0, 1, 2]).unwrap_err();
        assert_eq!(
            err,
            MeshError::IndexOutOfRange {
                at: 2,
                index: 2,
                vertex_count: 2
            }
        );
    }

    #[test]
    fn validate_rejects_partial_triangle() {
        let err = SimpleMesh::from_parts(vec![vert(0.0)], vec![0, 0]).unwrap_err();
        assert_eq!(err, MeshError::PartialTriangle(2));
    }

    #[test]
    fn empty_mesh_is_valid() {
        let mesh = SimpleMesh::new();
        assert!(mesh.is_empty());
        assert!(mesh.validate().is_ok());
        assert_eq!(mesh.index_count(), 0);
    }
}
