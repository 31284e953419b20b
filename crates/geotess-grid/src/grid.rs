//! The grid assembler (C9): flattens one or more finished [`Tessellation`]s
//! into the compact arrays downstream interpolation/modeling/plotting
//! components consume, running an optional Delaunay pass and computing a
//! stable content hash over the result.

use std::collections::HashMap;

use md5::{Digest, Md5};
use slotmap::SlotMap;
use tracing::{info, instrument};

use geotess_core::arena::VertexId;
use geotess_core::config::BuildConfig;
use geotess_core::merge::{merge_nodes, MergedTessellations};
use geotess_core::tessellation::Tessellation;
use geotess_core::vector::Vec3;
use geotess_core::vertex::VertexData;

use crate::delaunay;
use crate::error::{GridError, GridResult};

/// A half-open range `[start, end)` into a flat array.
pub type Range = (u32, u32);

/// The flattened output of one or more tessellations: a shared vertex
/// table, a triangle table indexing into it, per-level ranges into the
/// triangle table, per-tessellation ranges into the level table, and a
/// content hash over all four.
#[derive(Debug, Clone)]
pub struct Grid {
    pub vertices: Vec<Vec3>,
    pub triangles: Vec<[u32; 3]>,
    pub levels: Vec<Range>,
    pub tessellations: Vec<Range>,
    pub content_hash: String,
}

impl Grid {
    pub fn n_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn n_triangles(&self) -> usize {
        self.triangles.len()
    }

    pub fn n_levels(&self) -> usize {
        self.levels.len()
    }

    pub fn n_tessellations(&self) -> usize {
        self.tessellations.len()
    }
}

/// Owns whichever vertex arena triangle corners resolve against: a single
/// input's own arena, or (once two or more inputs are merged) the primary
/// tessellation's arena shared by every member.
enum Source {
    Single(Tessellation),
    Merged(MergedTessellations),
}

impl Source {
    fn vertex_arena(&self) -> &SlotMap<VertexId, VertexData> {
        match self {
            Source::Single(t) => &t.vertices,
            Source::Merged(m) => &m.primary.vertices,
        }
    }

    fn members(&self) -> &[Tessellation] {
        match self {
            Source::Single(t) => std::slice::from_ref(t),
            Source::Merged(m) => &m.members,
        }
    }
}

/// Flatten `inputs` into a [`Grid`]. With exactly one input, its vertices
/// are used directly; with more than one, a [`TessellationPrimary`] merge
/// (`geotess_core::merge::merge_nodes`) is built first so every input
/// shares one vertex table.
#[instrument(skip(inputs))]
pub fn assemble_grid(inputs: Vec<Tessellation>, config: BuildConfig) -> GridResult<Grid> {
    if inputs.is_empty() {
        return Err(GridError::InvalidInput { detail: "assemble_grid requires at least one tessellation".into() });
    }

    let mut source = if inputs.len() == 1 {
        Source::Single(inputs.into_iter().next().unwrap())
    } else {
        Source::Merged(merge_nodes(inputs, config)?)
    };

    // A merged member's triangle corners are only valid against the
    // primary's vertex arena (`Source::vertex_arena`'s own doc comment),
    // so the flip pass must resolve every point/membership lookup through
    // that shared arena rather than the member's own, now-foreign-keyed
    // one — see `delaunay::flip_level`'s doc comment.
    match &mut source {
        Source::Single(t) => {
            for level_idx in 0..t.levels.len() {
                delaunay::flip_level(&mut t.triangles, &mut t.edges, &mut t.vertices, &t.levels, level_idx);
            }
        }
        Source::Merged(m) => {
            for member in &mut m.members {
                for level_idx in 0..member.levels.len() {
                    delaunay::flip_level(&mut member.triangles, &mut member.edges, &mut m.primary.vertices, &member.levels, level_idx);
                }
            }
        }
    }

    let vertices = flatten_vertices(source.vertex_arena());

    let mut triangles = Vec::new();
    let mut levels = Vec::new();
    let mut tessellations = Vec::new();
    let vertex_arena = source.vertex_arena();

    for member in source.members() {
        let level_start = levels.len() as u32;
        for level in &member.levels {
            let tri_start = triangles.len() as u32;
            for &t in level {
                let data = &member.triangles[t];
                triangles.push([
                    vertex_arena[data.v[0]].index as u32,
                    vertex_arena[data.v[1]].index as u32,
                    vertex_arena[data.v[2]].index as u32,
                ]);
            }
            levels.push((tri_start, triangles.len() as u32));
        }
        tessellations.push((level_start, levels.len() as u32));
    }

    let content_hash = content_hash(&tessellations, &levels, &triangles, &vertices);

    let grid = Grid { vertices, triangles, levels, tessellations, content_hash };
    test_grid(&grid)?;
    info!(
        vertices = grid.n_vertices(),
        triangles = grid.n_triangles(),
        levels = grid.n_levels(),
        tessellations = grid.n_tessellations(),
        hash = %grid.content_hash,
        "grid assembled"
    );
    Ok(grid)
}

/// Dense `Vec<Vec3>` ordered by each vertex's `index` field, assigned by
/// `Tessellation::finalize` (or the primary build's finalize, for a merge).
fn flatten_vertices(arena: &SlotMap<VertexId, VertexData>) -> Vec<Vec3> {
    let n = arena.values().map(|d| d.index + 1).max().unwrap_or(0).max(0) as usize;
    let mut out = vec![Vec3::ZERO; n];
    for data in arena.values() {
        out[data.index as usize] = data.point;
    }
    out
}

/// MD5 over `tessellations || levels || triangles || vertices`, each array
/// serialized as little-endian fixed-width fields in table order, as
/// uppercase hex. Byte-identical builds on different hosts must hash
/// identically, so this serialization never touches pointer/arena identity
/// — only the flat, already-canonically-ordered output arrays.
fn content_hash(tessellations: &[Range], levels: &[Range], triangles: &[[u32; 3]], vertices: &[Vec3]) -> String {
    let mut hasher = Md5::new();
    for &(a, b) in tessellations {
        hasher.update(a.to_le_bytes());
        hasher.update(b.to_le_bytes());
    }
    for &(a, b) in levels {
        hasher.update(a.to_le_bytes());
        hasher.update(b.to_le_bytes());
    }
    for tri in triangles {
        for &idx in tri {
            hasher.update(idx.to_le_bytes());
        }
    }
    for v in vertices {
        hasher.update(v.x.to_le_bytes());
        hasher.update(v.y.to_le_bytes());
        hasher.update(v.z.to_le_bytes());
    }
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02X}")).collect()
}

/// Reconstruct the `tess_id`-th tessellation out of an assembled [`Grid`]
/// as a standalone [`Tessellation`] — `geotess_core`'s
/// `Tessellation::from_flat_levels` applied to this tessellation's slice
/// of the grid's vertex and triangle tables. Equivalent to spec's
/// `Tessellation(grid, tessId)` constructor.
pub fn reconstruct_tessellation(grid: &Grid, tess_id: usize, config: BuildConfig) -> GridResult<Tessellation> {
    let &(level_start, level_end) = grid
        .tessellations
        .get(tess_id)
        .ok_or_else(|| GridError::InvalidInput { detail: format!("grid has no tessellation {tess_id}") })?;

    // `grid.vertices` is shared across every tessellation in the grid once
    // two or more have been merged, so this member's triangles may only
    // reference a subset of it. Compact down to just that subset — an
    // orphaned vertex would never get a real index out of `finalize`, and
    // a later `assemble_grid` over the rebuilt tessellation would panic
    // trying to place it.
    let mut remap: HashMap<u32, usize> = HashMap::new();
    let mut vertex_points = Vec::new();
    let levels: Vec<Vec<[usize; 3]>> = grid.levels[level_start as usize..level_end as usize]
        .iter()
        .map(|&(tri_start, tri_end)| {
            grid.triangles[tri_start as usize..tri_end as usize]
                .iter()
                .map(|&tri| {
                    tri.map(|old| {
                        *remap.entry(old).or_insert_with(|| {
                            vertex_points.push(grid.vertices[old as usize]);
                            vertex_points.len() - 1
                        })
                    })
                })
                .collect()
        })
        .collect();

    Tessellation::from_flat_levels(vertex_points, levels, config).map_err(GridError::from)
}

/// Validates the flat invariants a grid must satisfy: every triangle
/// corner indexes a real vertex, level ranges are contiguous and cover the
/// whole triangle table in order, and tessellation ranges likewise cover
/// the whole level table.
fn test_grid(grid: &Grid) -> GridResult<()> {
    for (t_idx, tri) in grid.triangles.iter().enumerate() {
        for &corner in tri {
            if corner as usize >= grid.vertices.len() {
                return Err(GridError::InvalidInput {
                    detail: format!("triangle {t_idx} references vertex {corner}, but the grid only has {} vertices", grid.vertices.len()),
                });
            }
        }
    }

    let mut expected_start = 0u32;
    for (i, &(start, end)) in grid.levels.iter().enumerate() {
        if start != expected_start || end < start {
            return Err(GridError::InvalidInput { detail: format!("level {i} range ({start}, {end}) is not contiguous with the preceding level") });
        }
        expected_start = end;
    }
    if expected_start as usize != grid.triangles.len() {
        return Err(GridError::InvalidInput { detail: "level ranges do not cover the full triangle table".into() });
    }

    let mut expected_level_start = 0u32;
    for (i, &(start, end)) in grid.tessellations.iter().enumerate() {
        if start != expected_level_start || end < start {
            return Err(GridError::InvalidInput { detail: format!("tessellation {i} range ({start}, {end}) is not contiguous with the preceding tessellation") });
        }
        expected_level_start = end;
    }
    if expected_level_start as usize != grid.levels.len() {
        return Err(GridError::InvalidInput { detail: "tessellation ranges do not cover the full level table".into() });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geotess_core::seed::{PlatonicSolid, SeedSolid};

    #[test]
    fn icosahedron_base_zero_yields_twelve_vertices_twenty_triangles_one_level() {
        let config = BuildConfig::default();
        let seed = SeedSolid::catalog(PlatonicSolid::Icosahedron);
        let tess = Tessellation::build_fresh(seed, 0, Vec::new(), Default::default(), config).unwrap();
        let grid = assemble_grid(vec![tess], config).unwrap();
        assert_eq!(grid.n_vertices(), 12);
        assert_eq!(grid.n_triangles(), 20);
        assert_eq!(grid.n_levels(), 1);
        assert_eq!(grid.n_tessellations(), 1);
        assert_eq!(grid.levels[0], (0, 20));
        assert_eq!(grid.tessellations[0], (0, 1));
    }

    #[test]
    fn icosahedron_base_one_yields_forty_two_vertices_eighty_triangles_two_levels() {
        let config = BuildConfig::default();
        let seed = SeedSolid::catalog(PlatonicSolid::Icosahedron);
        let tess = Tessellation::build_fresh(seed, 1, Vec::new(), Default::default(), config).unwrap();
        let grid = assemble_grid(vec![tess], config).unwrap();
        assert_eq!(grid.n_vertices(), 42);
        assert_eq!(grid.n_triangles(), 100); // 20 (level 0, kept as transition parents) + 80 (level 1)
        assert_eq!(grid.n_levels(), 2);
    }

    #[test]
    fn building_the_same_directives_twice_yields_identical_hashes() {
        let config = BuildConfig::default();
        let build = || {
            let seed = SeedSolid::catalog(PlatonicSolid::Icosahedron);
            let tess = Tessellation::build_fresh(seed, 2, Vec::new(), Default::default(), config).unwrap();
            assemble_grid(vec![tess], config).unwrap()
        };
        let a = build();
        let b = build();
        assert_eq!(a.content_hash, b.content_hash);
        assert_eq!(a.vertices.len(), b.vertices.len());
        assert_eq!(a.triangles, b.triangles);
    }

    #[test]
    fn content_hash_is_uppercase_hex_of_md5_length() {
        let config = BuildConfig::default();
        let seed = SeedSolid::catalog(PlatonicSolid::Tetrahedron);
        let tess = Tessellation::build_fresh(seed, 0, Vec::new(), Default::default(), config).unwrap();
        let grid = assemble_grid(vec![tess], config).unwrap();
        assert_eq!(grid.content_hash.len(), 32);
        assert!(grid.content_hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }

    #[test]
    fn reconstructing_a_tessellation_from_its_grid_and_reassembling_matches_the_hash() {
        let config = BuildConfig::default();
        let seed = SeedSolid::catalog(PlatonicSolid::Icosahedron);
        let tess = Tessellation::build_fresh(seed, 1, Vec::new(), Default::default(), config).unwrap();
        let grid = assemble_grid(vec![tess], config).unwrap();

        let rebuilt = reconstruct_tessellation(&grid, 0, config).unwrap();
        let grid2 = assemble_grid(vec![rebuilt], config).unwrap();

        assert_eq!(grid.content_hash, grid2.content_hash);
        assert_eq!(grid.triangles, grid2.triangles);
        assert_eq!(grid.vertices.len(), grid2.vertices.len());
    }

    #[test]
    fn reconstructing_an_out_of_range_tessellation_id_is_rejected() {
        let config = BuildConfig::default();
        let seed = SeedSolid::catalog(PlatonicSolid::Tetrahedron);
        let tess = Tessellation::build_fresh(seed, 0, Vec::new(), Default::default(), config).unwrap();
        let grid = assemble_grid(vec![tess], config).unwrap();
        let err = reconstruct_tessellation(&grid, 1, config);
        assert!(matches!(err, Err(GridError::InvalidInput { .. })));
    }

    #[test]
    fn merging_two_tessellations_shares_one_vertex_table() {
        let config = BuildConfig::default();
        let a = Tessellation::build_fresh(SeedSolid::catalog(PlatonicSolid::Icosahedron), 0, Vec::new(), Default::default(), config).unwrap();
        let b = Tessellation::build_fresh(SeedSolid::catalog(PlatonicSolid::Icosahedron), 1, Vec::new(), Default::default(), config).unwrap();
        let grid = assemble_grid(vec![a, b], config).unwrap();
        assert_eq!(grid.n_tessellations(), 2);
        assert!(grid.n_vertices() >= 42); // at least as many as the finer input
    }

    #[test]
    fn empty_input_is_rejected() {
        let config = BuildConfig::default();
        let err = assemble_grid(Vec::new(), config);
        assert!(matches!(err, Err(GridError::InvalidInput { .. })));
    }
}
