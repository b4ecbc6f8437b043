//! Shared data model: vertices and indexed triangle meshes.
//!
//! # Invariants
//! - Every index in a [`SimpleMesh`] is smaller than its vertex count.
//! - Vertex equality is exact component-wise float comparison, no epsilon.

mod mesh;

pub use mesh::{MeshError, SimpleMesh, Vertex};
