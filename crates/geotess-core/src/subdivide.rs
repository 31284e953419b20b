//! Triangle subdivision: the full quad split (`divide`) and the
//! conforming transition split (`transition_triangles`) used when fewer
//! than three of a triangle's edges carry a midpoint.
//!
//! Both mutate the owning tessellation's vertex/edge/triangle arenas
//! together (new midpoint vertices, new half-edges, new triangles,
//! neighbor links), so they live as free functions over `Tessellation`
//! rather than as methods on the otherwise-plain `TriangleData` record —
//! the same split drawn elsewhere in this codebase between plain
//! topology records and the mutating operators that act across several
//! of them at once.

use crate::arena::{EdgeId, TriangleId, VertexId};
use crate::edge::EdgeData;
use crate::tessellation::Tessellation;
use crate::triangle::TriangleData;

/// Edge `e` runs conceptually from `a` to `b`. Returns its midpoint and
/// the two half-edges (`a`-to-mid, mid-to-`b`), creating all three the
/// first time either side of the edge asks for them.
fn midpoint_and_children(tess: &mut Tessellation, e: EdgeId, a: VertexId, b: VertexId) -> (VertexId, EdgeId, EdgeId) {
    if let Some(mid) = tess.edges[e].get_mid_vertex() {
        let (ca, cb) = tess.edges[e].children_towards(a, b);
        return (mid, ca, cb);
    }
    let pa = tess.vertices[a].point;
    let pb = tess.vertices[b].point;
    let mid_point = (pa + pb).normalize();
    let mid = tess.vertices.insert(crate::vertex::VertexData::new(mid_point));
    let child_a = tess.edges.insert(EdgeData { ancestor: Some(e), ..EdgeData::new() });
    let child_b = tess.edges.insert(EdgeData { ancestor: Some(e), ..EdgeData::new() });
    tess.edges[e].set_mid_vertex(mid);
    tess.edges[e].install_children(a, b, child_a, child_b);
    crate::edge::inc_n_divisions(&mut tess.edges, e);
    (mid, child_a, child_b)
}

fn new_edge(tess: &mut Tessellation) -> EdgeId {
    tess.edges.insert(EdgeData::new())
}

/// Record `t` as one side of `edge`, wiring up the mutual neighbor link
/// the moment the edge's other side is already known (true for reused
/// half-edges and for a just-split parent edge's two children; brand new
/// edges only gain their second side on a later call).
fn link_edge(tess: &mut Tessellation, edge: EdgeId, t: TriangleId, local_index: usize) {
    tess.triangles[t].edges[local_index] = edge;
    if let Some(other) = tess.edges[edge].attach_side(t) {
        tess.triangles[t].neighbors[local_index] = Some(other);
        let other_index = tess.triangles[other]
            .edges
            .iter()
            .position(|&e| e == edge)
            .expect("shared edge must appear in both incident triangles");
        tess.triangles[other].neighbors[other_index] = Some(t);
    }
}

fn push_triangle(
    tess: &mut Tessellation,
    v: [VertexId; 3],
    edges: [EdgeId; 3],
    ancestor: Option<TriangleId>,
    tess_level: u32,
    edge_level: u32,
) -> TriangleId {
    let id = tess
        .triangles
        .insert(TriangleData::new(v, edges, ancestor, tess_level, edge_level));
    for i in 0..3 {
        link_edge(tess, edges[i], id, i);
    }
    id
}

/// Full quad split: all three edges divide, producing one center child
/// sharing no edge with the parent and three corner children, all at
/// `tess_level + 1` and `edge_level + 1`.
pub fn divide(tess: &mut Tessellation, t: TriangleId, next_level: &mut Vec<TriangleId>) {
    let data = tess.triangles[t].clone();
    let v = data.v;
    let tess_level = data.tess_level + 1;
    let edge_level = data.edge_level + 1;

    // edges[i] connects v[(i+1)%3] and v[(i+2)%3]; mids[i] is its midpoint.
    let mut mids = [VertexId::default(); 3];
    let mut child_towards_next = [EdgeId::default(); 3]; // half of edges[i] adjacent to v[(i+1)%3]
    let mut child_towards_prev = [EdgeId::default(); 3]; // half of edges[i] adjacent to v[(i+2)%3]
    for i in 0..3 {
        let a = v[(i + 1) % 3];
        let b = v[(i + 2) % 3];
        let (m, ca, cb) = midpoint_and_children(tess, data.edges[i], a, b);
        mids[i] = m;
        child_towards_next[i] = ca;
        child_towards_prev[i] = cb;
    }

    let center_edges = [new_edge(tess), new_edge(tess), new_edge(tess)];
    let center = push_triangle(tess, mids, center_edges, None, tess_level, edge_level);

    let mut children = vec![center];
    for j in 0..3 {
        // Corner child at v[j]: corners (v[j], mid of edges[(j+2)%3], mid of edges[(j+1)%3]).
        let corner_v = [v[j], mids[(j + 2) % 3], mids[(j + 1) % 3]];
        // Opposite v[j]: shared with the center child.
        let e0 = tess.triangles[center].edges[j];
        // Opposite mids[(j+2)%3]: half of edges[(j+1)%3] touching v[j].
        // edges[(j+1)%3] connects v[(j+2)%3] and v[j]; v[j] is its "b" (prev) endpoint.
        let e1 = child_towards_prev[(j + 1) % 3];
        // Opposite mids[(j+1)%3]: half of edges[(j+2)%3] touching v[j], its "a" (next) endpoint.
        let e2 = child_towards_next[(j + 2) % 3];
        let child = push_triangle(tess, corner_v, [e0, e1, e2], Some(t), tess_level, edge_level);
        children.push(child);
    }

    tess.triangles[t].descendants = children.clone();
    next_level.extend(children);
}

/// Conforming transition subdivision for a triangle with fewer than three
/// split edges.
pub fn transition_triangles(tess: &mut Tessellation, t: TriangleId, next_level: &mut Vec<TriangleId>) {
    let data = tess.triangles[t].clone();
    let v = data.v;
    let tess_level = data.tess_level + 1;
    let edge_level = data.edge_level;

    let mids: [Option<VertexId>; 3] = [
        tess.edges[data.edges[0]].get_mid_vertex(),
        tess.edges[data.edges[1]].get_mid_vertex(),
        tess.edges[data.edges[2]].get_mid_vertex(),
    ];
    let n = mids.iter().filter(|m| m.is_some()).count();

    let children = match n {
        0 => vec![push_triangle(tess, v, data.edges, Some(t), tess_level, edge_level)],
        1 => split_one_edge(tess, t, &data, &mids, tess_level, edge_level),
        2 => split_two_edges(tess, t, &data, &mids, tess_level, edge_level),
        3 => split_three_edges(tess, t, &data, &mids, tess_level, edge_level),
        _ => unreachable!("n counts at most the 3 edges"),
    };

    tess.triangles[t].descendants = children.clone();
    next_level.extend(children);
}

/// `n=1`: the edge opposite `apex` has a midpoint `m`. Splits into two
/// triangles fanning from `apex` across `m`, sharing a fresh diagonal.
fn split_one_edge(
    tess: &mut Tessellation,
    t: TriangleId,
    data: &TriangleData,
    mids: &[Option<VertexId>; 3],
    tess_level: u32,
    edge_level: u32,
) -> Vec<TriangleId> {
    let v = data.v;
    let apex = mids.iter().position(Option::is_some).unwrap();
    let b = (apex + 1) % 3;
    let c = (apex + 2) % 3;
    let m = mids[apex].unwrap();
    // edges[apex] connects v[b] and v[c]; m splits it into a "towards b"
    // half and a "towards c" half.
    let (half_b, half_c) = tess.edges[data.edges[apex]].children_towards(v[b], v[c]);
    let diag = new_edge(tess);

    // Child touching v[b]: (v[apex], v[b], m). Opposite v[apex]: half_b
    // (v[b]-m). Opposite v[b]: diag (v[apex]-m). Opposite m: edges[c]
    // (v[apex]-v[b], untouched).
    let child_b = push_triangle(tess, [v[apex], v[b], m], [half_b, diag, data.edges[c]], Some(t), tess_level, edge_level);
    // Child touching v[c]: (v[apex], m, v[c]). Opposite v[apex]: half_c
    // (m-v[c]). Opposite m: edges[b] (v[c]-v[apex], untouched). Opposite
    // v[c]: diag (v[apex]-m).
    let child_c = push_triangle(tess, [v[apex], m, v[c]], [half_c, data.edges[b], diag], Some(t), tess_level, edge_level);

    vec![child_b, child_c]
}

/// `n=2`: the edge opposite `i` is the only one without a midpoint.
/// Peels off the corner triangle at `v[i]` then splits the remaining
/// quadrilateral along its shorter diagonal (ties go to the `v[i+1]`
/// side).
fn split_two_edges(
    tess: &mut Tessellation,
    t: TriangleId,
    data: &TriangleData,
    mids: &[Option<VertexId>; 3],
    tess_level: u32,
    edge_level: u32,
) -> Vec<TriangleId> {
    let v = data.v;
    let i = mids.iter().position(Option::is_none).unwrap();
    let j = (i + 1) % 3;
    let k = (i + 2) % 3;
    let mj = mids[j].unwrap(); // midpoint of edges[j], connecting v[k] and v[i]
    let mk = mids[k].unwrap(); // midpoint of edges[k], connecting v[i] and v[j]

    let (mj_k, mj_i) = tess.edges[data.edges[j]].children_towards(v[k], v[i]);
    let (mk_i, mk_j) = tess.edges[data.edges[k]].children_towards(v[i], v[j]);

    // Corner child at v[i]: (v[i], mk, mj). Opposite v[i]: fresh edge
    // shared with the quad split below. Opposite mk: mk_i (v[i]-mk).
    // Opposite mj: mj_i (v[i]-mj).
    let corner_diag = new_edge(tess);
    let corner = push_triangle(tess, [v[i], mk, mj], [corner_diag, mk_i, mj_i], Some(t), tess_level, edge_level);

    // Remaining quad v[j], v[k], mk, mj splits along the shorter
    // diagonal: v[j]-mk or v[k]-mj.
    let pj = tess.vertices[v[j]].point;
    let pk = tess.vertices[v[k]].point;
    let pmj = tess.vertices[mj].point;
    let pmk = tess.vertices[mk].point;
    let diag_j_mk = crate::vector::angle(&pj, &pmk);
    let diag_k_mj = crate::vector::angle(&pk, &pmj);

    let (tri1, tri2) = if diag_j_mk <= diag_k_mj {
        // Diagonal v[j]-mk: (v[j], v[k], mk) opposite edges[i] (the
        // untouched v[j]-v[k] edge), and (v[j], mk, mj) opposite corner_diag.
        let diag = new_edge(tess);
        let tri_a = push_triangle(tess, [v[j], v[k], mk], [mk_j, data.edges[i], diag], Some(t), tess_level, edge_level);
        let tri_b = push_triangle(tess, [v[j], mk, mj], [corner_diag, diag, mj_k], Some(t), tess_level, edge_level);
        (tri_a, tri_b)
    } else {
        // Diagonal v[k]-mj: (v[k], v[j], mj) opposite edges[i], and
        // (v[k], mj, mk) opposite corner_diag.
        let diag = new_edge(tess);
        let tri_a = push_triangle(tess, [v[k], v[j], mj], [mj_k, diag, data.edges[i]], Some(t), tess_level, edge_level);
        let tri_b = push_triangle(tess, [v[k], mj, mk], [corner_diag, mk_j, diag], Some(t), tess_level, edge_level);
        (tri_a, tri_b)
    };

    vec![corner, tri1, tri2]
}

/// `n=3`: all three edges split, identical in shape to [`divide`] but
/// left at the parent's `edge_level` (no full quad split was performed,
/// so the edge-divisions budget does not advance).
fn split_three_edges(
    tess: &mut Tessellation,
    t: TriangleId,
    data: &TriangleData,
    mids: &[Option<VertexId>; 3],
    tess_level: u32,
    edge_level: u32,
) -> Vec<TriangleId> {
    let v = data.v;
    let m = [mids[0].unwrap(), mids[1].unwrap(), mids[2].unwrap()];
    let mut halves_next = [EdgeId::default(); 3];
    let mut halves_prev = [EdgeId::default(); 3];
    for i in 0..3 {
        let a = v[(i + 1) % 3];
        let b = v[(i + 2) % 3];
        let (ca, cb) = tess.edges[data.edges[i]].children_towards(a, b);
        halves_next[i] = ca;
        halves_prev[i] = cb;
    }

    let center_edges = [new_edge(tess), new_edge(tess), new_edge(tess)];
    let center = push_triangle(tess, m, center_edges, None, tess_level, edge_level);

    let mut children = vec![center];
    for j in 0..3 {
        let corner_v = [v[j], m[(j + 2) % 3], m[(j + 1) % 3]];
        let e0 = tess.triangles[center].edges[j];
        let e1 = halves_prev[(j + 1) % 3];
        let e2 = halves_next[(j + 2) % 3];
        let child = push_triangle(tess, corner_v, [e0, e1, e2], Some(t), tess_level, edge_level);
        children.push(child);
    }
    children
}
