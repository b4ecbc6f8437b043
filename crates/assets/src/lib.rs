//! Model loading: parses the text model format into a deduplicated indexed mesh.
//!
//! Recognized directives are `v`, `vn`, `vt` and `f`; everything else is
//! skipped. Positions and normals are converted from right-handed to
//! left-handed on read, texture V is flipped, and face winding is reversed.
//!
//! # Invariants
//! - Every emitted index is smaller than the emitted vertex count.
//! - No two emitted vertices compare equal.

mod dedup;
mod obj;

pub use dedup::VertexDedup;
pub use obj::{LoadStats, ModelError, load_obj, load_obj_with_stats, parse_obj, parse_obj_str};

pub fn crate_info() -> &'static str {
    "gallery-assets v0.1.0"
}
