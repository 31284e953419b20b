//! Edge records: the bond between two triangles, shared by reference
//! between both sides.

use slotmap::SlotMap;

use crate::arena::{EdgeId, TriangleId, VertexId};

#[derive(Debug, Clone, Default)]
pub struct EdgeData {
    pub side1: Option<TriangleId>,
    pub side2: Option<TriangleId>,
    pub mid_vertex: Option<VertexId>,
    pub n_divisions: u32,
    pub ancestor: Option<EdgeId>,
    /// Endpoints this edge was first split between, fixed at the moment
    /// its midpoint is created. Triangles on either side may walk the
    /// edge in either direction; `children_towards` uses this pair to
    /// hand back the matching half-edge regardless of which way the
    /// caller names them.
    endpoint_a: Option<VertexId>,
    endpoint_b: Option<VertexId>,
    /// Half-edge from `endpoint_a` to the midpoint.
    child_a: Option<EdgeId>,
    /// Half-edge from the midpoint to `endpoint_b`.
    child_b: Option<EdgeId>,
}

impl EdgeData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_sides(&mut self, t1: TriangleId, t2: TriangleId) {
        self.side1 = Some(t1);
        self.side2 = Some(t2);
    }

    /// Record this edge as incident to `t` in its first free side slot.
    /// Returns the triangle already on the other side, if any.
    pub fn attach_side(&mut self, t: TriangleId) -> Option<TriangleId> {
        if self.side1.is_none() {
            self.side1 = Some(t);
            None
        } else if self.side2.is_none() {
            self.side2 = Some(t);
            self.side1
        } else {
            None
        }
    }

    /// The triangle on the other side of `t`, or `None` if `t` is neither
    /// side of this edge.
    pub fn get_neighbor(&self, t: TriangleId) -> Option<TriangleId> {
        if self.side1 == Some(t) {
            self.side2
        } else if self.side2 == Some(t) {
            self.side1
        } else {
            None
        }
    }

    pub fn set_mid_vertex(&mut self, v: VertexId) {
        self.mid_vertex = Some(v);
    }

    pub fn get_mid_vertex(&self) -> Option<VertexId> {
        self.mid_vertex
    }

    /// First time this is called for a given edge, record `(a, b)` as the
    /// canonical direction and install the two half-edges. Later calls
    /// (from the triangle on the other side, which walks the edge
    /// `b -> a`) return the same pair of ids with `a`/`b` swapped so each
    /// half-edge is shared rather than duplicated.
    pub fn install_children(&mut self, a: VertexId, b: VertexId, child_a: EdgeId, child_b: EdgeId) {
        self.endpoint_a = Some(a);
        self.endpoint_b = Some(b);
        self.child_a = Some(child_a);
        self.child_b = Some(child_b);
    }

    /// Half-edges already installed, oriented so the first returned id
    /// runs from `a` to the midpoint and the second from the midpoint to
    /// `b`. Panics if no midpoint has been created yet, or if `(a, b)` is
    /// not this edge's endpoint pair in either order.
    pub fn children_towards(&self, a: VertexId, b: VertexId) -> (EdgeId, EdgeId) {
        let (ca, cb) = (
            self.child_a.expect("edge has no midpoint yet"),
            self.child_b.expect("edge has no midpoint yet"),
        );
        if self.endpoint_a == Some(a) && self.endpoint_b == Some(b) {
            (ca, cb)
        } else if self.endpoint_a == Some(b) && self.endpoint_b == Some(a) {
            (cb, ca)
        } else {
            panic!("(a, b) does not match this edge's endpoints");
        }
    }
}

/// Increment `edge`'s division count and recurse to its ancestor, so the
/// count at a coarse edge equals the total splits in its descendant
/// subtree.
pub fn inc_n_divisions(edges: &mut SlotMap<EdgeId, EdgeData>, edge: EdgeId) {
    let mut current = Some(edge);
    while let Some(e) = current {
        let ancestor = {
            let data = &mut edges[e];
            data.n_divisions += 1;
            data.ancestor
        };
        current = ancestor;
    }
}
