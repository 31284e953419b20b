//! Delaunay flipping: an optional per-level pass that swaps a shared
//! edge's diagonal whenever the neighboring triangle's far vertex lies
//! inside the first triangle's circumcircle.
//!
//! Typically a no-op, because the build already produces Delaunay
//! tessellations — this pass exists for the cases (adaptive refinement,
//! primary merge) where it isn't guaranteed. A flipped pair's descendant
//! links are copied from the pre-flip pair without re-verifying that the
//! descendant's center still lies inside the new triangle (see
//! `DESIGN.md`'s Open Question Resolutions).

use std::collections::{HashSet, VecDeque};

use slotmap::SlotMap;
use tracing::{debug, instrument};

use geotess_core::arena::{EdgeId, TriangleId, VertexId};
use geotess_core::edge::EdgeData;
use geotess_core::triangle::{self, TriangleData};
use geotess_core::vector::Vec3;
use geotess_core::vertex::VertexData;

/// Run the flip pass on a single level of a tessellation's own triangle
/// and edge arenas, resolving vertex coordinates and triangle membership
/// against `vertices` — which, once two or more tessellations have been
/// merged, is the *primary*'s vertex arena shared by every member, not
/// the member's own (see `geotess_core::merge::MergedTessellations`).
/// Taking the arenas as separate parameters rather than a whole
/// `&mut Tessellation` is what lets a merged member's topology be flipped
/// against vertices that live in a sibling tessellation. Mutates
/// triangles and edges in place; returns the number of flips performed.
#[instrument(skip(triangles, edges, vertices, levels))]
pub fn flip_level(
    triangles: &mut SlotMap<TriangleId, TriangleData>,
    edges: &mut SlotMap<EdgeId, EdgeData>,
    vertices: &mut SlotMap<VertexId, VertexData>,
    levels: &[Vec<TriangleId>],
    level_idx: usize,
) -> usize {
    let mut queued: HashSet<EdgeId> = HashSet::new();
    let mut pending: VecDeque<EdgeId> = VecDeque::new();
    for &t in &levels[level_idx] {
        for &e in &triangles[t].edges {
            if queued.insert(e) {
                pending.push_back(e);
            }
        }
    }

    let mut flips = 0;
    while let Some(e) = pending.pop_front() {
        queued.remove(&e);
        let (Some(t1), Some(t2)) = (edges[e].side1, edges[e].side2) else {
            continue; // boundary edge; cannot arise on a closed sphere mesh but guard anyway
        };
        if triangles[t1].tess_level as usize != level_idx || triangles[t2].tess_level as usize != level_idx {
            continue; // edge has since been superseded by a finer level
        }

        let Some(i1) = triangles[t1].edges.iter().position(|&x| x == e) else { continue };
        let Some(i2) = triangles[t2].edges.iter().position(|&x| x == e) else { continue };

        let p1 = triangles[t1].v[i1];
        let p2 = triangles[t2].v[i2];
        let a = triangles[t1].v[(i1 + 1) % 3];
        let b = triangles[t1].v[(i1 + 2) % 3];

        let corners1 = corner_points(vertices, triangles, t1);
        let center = triangle::circumcenter(&corners1);
        let dot_p2 = center.dot(&vertices[p2].point);
        let dot_p1 = center.dot(&vertices[p1].point);
        if dot_p2 <= dot_p1 {
            continue; // current diagonal (a-b) is already Delaunay
        }

        let e_p1a = triangles[t1].edges[(i1 + 2) % 3];
        let e_bp1 = triangles[t1].edges[(i1 + 1) % 3];
        let e_p2b = triangles[t2].edges[(i2 + 2) % 3];
        let e_ap2 = triangles[t2].edges[(i2 + 1) % 3];

        flip_quad(triangles, edges, vertices, t1, t2, level_idx, p1, p2, a, b, e_p1a, e_bp1, e_p2b, e_ap2);
        flips += 1;

        for boundary in [e_p1a, e_bp1, e_p2b, e_ap2] {
            if queued.insert(boundary) {
                pending.push_back(boundary);
            }
        }
    }
    debug!(level = level_idx, flips, "delaunay pass complete");
    flips
}

/// Run the flip pass over every level of `triangles`/`edges`, against
/// `vertices` (see [`flip_level`] for why these are separate arenas).
#[instrument(skip(triangles, edges, vertices, levels))]
pub fn flip_all_levels(
    triangles: &mut SlotMap<TriangleId, TriangleData>,
    edges: &mut SlotMap<EdgeId, EdgeData>,
    vertices: &mut SlotMap<VertexId, VertexData>,
    levels: &[Vec<TriangleId>],
) -> usize {
    let mut total = 0;
    for level_idx in 0..levels.len() {
        total += flip_level(triangles, edges, vertices, levels, level_idx);
    }
    total
}

fn corner_points(vertices: &SlotMap<VertexId, VertexData>, triangles: &SlotMap<TriangleId, TriangleData>, t: TriangleId) -> [Vec3; 3] {
    let v = triangles[t].v;
    [vertices[v[0]].point, vertices[v[1]].point, vertices[v[2]].point]
}

#[allow(clippy::too_many_arguments)]
fn flip_quad(
    triangles: &mut SlotMap<TriangleId, TriangleData>,
    edges: &mut SlotMap<EdgeId, EdgeData>,
    vertices: &mut SlotMap<VertexId, VertexData>,
    t1: TriangleId,
    t2: TriangleId,
    level_idx: usize,
    p1: VertexId,
    p2: VertexId,
    a: VertexId,
    b: VertexId,
    e_p1a: EdgeId,
    e_bp1: EdgeId,
    e_p2b: EdgeId,
    e_ap2: EdgeId,
) {
    // e_bp1 moves from t1 to t2; e_ap2 moves from t2 to t1. e_p1a stays on
    // t1, e_p2b stays on t2 — reattach only the two that change owner.
    reattach_owner(triangles, edges, e_bp1, t1, t2);
    reattach_owner(triangles, edges, e_ap2, t2, t1);

    let diag = edges.insert(EdgeData::new());
    edges[diag].set_sides(t1, t2);

    vertices[b].remove_triangle(level_idx, t1);
    vertices[a].remove_triangle(level_idx, t2);
    vertices[p2].add_triangle(level_idx, t1);
    vertices[p1].add_triangle(level_idx, t2);

    triangles[t1].v = [p1, a, p2];
    triangles[t1].edges = [e_ap2, diag, e_p1a];
    triangles[t2].v = [p1, p2, b];
    triangles[t2].edges = [e_p2b, e_bp1, diag];

    for tri in [t1, t2] {
        for k in 0..3 {
            let edge = triangles[tri].edges[k];
            triangles[tri].neighbors[k] = edges[edge].get_neighbor(tri);
        }
    }
    // `ancestor`/`descendants` are left exactly as they were before the
    // flip on both triangle slots — transferred, not recomputed.
}

/// Move ownership of `edge` from `old_owner` to `new_owner` and repoint the
/// edge's other side's neighbor slot at the new owner.
fn reattach_owner(triangles: &mut SlotMap<TriangleId, TriangleData>, edges: &mut SlotMap<EdgeId, EdgeData>, edge: EdgeId, old_owner: TriangleId, new_owner: TriangleId) {
    {
        let data = &mut edges[edge];
        if data.side1 == Some(old_owner) {
            data.side1 = Some(new_owner);
        } else if data.side2 == Some(old_owner) {
            data.side2 = Some(new_owner);
        }
    }
    if let Some(outer) = edges[edge].get_neighbor(new_owner) {
        if let Some(idx) = triangles[outer].edges.iter().position(|&e| e == edge) {
            triangles[outer].neighbors[idx] = Some(new_owner);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geotess_core::config::BuildConfig;
    use geotess_core::seed::{PlatonicSolid, SeedSolid};
    use geotess_core::tessellation::Tessellation;

    #[test]
    fn flip_pass_over_a_fresh_build_is_idempotent() {
        let seed = SeedSolid::catalog(PlatonicSolid::Icosahedron);
        let mut tess = Tessellation::build_fresh(seed, 2, Vec::new(), Default::default(), BuildConfig::default()).unwrap();
        let first = flip_all_levels(&mut tess.triangles, &mut tess.edges, &mut tess.vertices, &tess.levels);
        let second = flip_all_levels(&mut tess.triangles, &mut tess.edges, &mut tess.vertices, &tess.levels);
        assert_eq!(second, 0, "a mesh already Delaunay after one pass should need no further flips, got {first} then {second}");
    }

    #[test]
    fn flip_pass_preserves_triangle_and_vertex_counts() {
        let seed = SeedSolid::catalog(PlatonicSolid::Octahedron);
        let mut tess = Tessellation::build_fresh(seed, 1, Vec::new(), Default::default(), BuildConfig::default()).unwrap();
        let n_tris_before: usize = tess.levels.iter().map(Vec::len).sum();
        let n_verts_before = tess.vertices.len();
        flip_all_levels(&mut tess.triangles, &mut tess.edges, &mut tess.vertices, &tess.levels);
        let n_tris_after: usize = tess.levels.iter().map(Vec::len).sum();
        assert_eq!(n_tris_before, n_tris_after);
        assert_eq!(n_verts_before, tess.vertices.len());
    }

    #[test]
    fn flip_pass_against_a_foreign_vertex_arena_resolves_through_it_not_the_members_own() {
        // Mirrors how `assemble_grid` flips a primary-merge member: the
        // member's own triangles/edges are mutated, but every vertex
        // lookup and membership update goes through a separate arena
        // (here, a second tessellation's) rather than `member.vertices`.
        let seed = SeedSolid::catalog(PlatonicSolid::Octahedron);
        let mut member = Tessellation::build_fresh(seed.clone(), 1, Vec::new(), Default::default(), BuildConfig::default()).unwrap();
        let mut foreign = Tessellation::build_fresh(seed, 1, Vec::new(), Default::default(), BuildConfig::default()).unwrap();

        // Rewrite member's triangle corners onto `foreign`'s vertex ids by
        // coincident location, exactly as `merge_nodes` would.
        let config = BuildConfig::default();
        for level in member.levels.clone() {
            for t in level {
                for corner in member.triangles[t].v.iter_mut() {
                    let point = member.vertices[*corner].point;
                    *corner = foreign.find_vertex(&point, &config).expect("coincident vertex must exist in the foreign arena");
                }
            }
        }

        let n_tris_before: usize = member.levels.iter().map(Vec::len).sum();
        flip_all_levels(&mut member.triangles, &mut member.edges, &mut foreign.vertices, &member.levels);
        let n_tris_after: usize = member.levels.iter().map(Vec::len).sum();
        assert_eq!(n_tris_before, n_tris_after);
        for level in &member.levels {
            for &t in level {
                for &corner in &member.triangles[t].v {
                    assert!(foreign.vertices.contains_key(corner));
                }
            }
        }
    }
}
