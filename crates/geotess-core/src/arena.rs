//! Dense, generation-checked indices for vertices, edges, and triangles.
//!
//! The source this crate is modeled on leans on object identity and
//! mutable back-references for Vertex/Edge/Triangle. Representing them as
//! records in per-Tessellation slotmap arenas, addressed by `Copy` keys
//! instead of pointers, removes the reference cycles (triangle <-> edge,
//! vertex -> triangle-set <-> triangle -> vertex) while keeping a
//! tessellation trivially movable and serializable.

use slotmap::new_key_type;

new_key_type! {
    pub struct VertexId;
    pub struct EdgeId;
    pub struct TriangleId;
}
