use gallery_common::{SimpleMesh, Vertex};
use std::collections::HashMap;

/// Builds an indexed mesh, reusing the index of any vertex already emitted.
///
/// Lookups are keyed on [`Vertex::exact_key`], which agrees with exact `==`,
/// so the result is the same as scanning every earlier vertex.
#[derive(Debug, Default)]
pub struct VertexDedup {
    mesh: SimpleMesh,
    lookup: HashMap<[u32; 9], u32>,
    reused: usize,
}

impl VertexDedup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `vertex` to the index list, emitting it only if it is new.
    /// Returns the index that was pushed.
    pub fn push(&mut self, vertex: Vertex) -> u32 {
        let next = self.mesh.vertices.len() as u32;
        let index = *self.lookup.entry(vertex.exact_key()).or_insert(next);
        if index == next {
            self.mesh.vertices.push(vertex);
        } else {
            self.reused += 1;
        }
        self.mesh.indices.push(index);
        index
    }

    /// How many pushes resolved to an existing vertex.
    pub fn reused(&self) -> usize {
        self.reused
    }

    pub fn vertex_count(&self) -> usize {
        self.mesh.vertices.len()
    }

    pub fn finish(self) -> SimpleMesh {
        self.mesh
    }
}
