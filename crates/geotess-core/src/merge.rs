//! Primary-tessellation merge (C8): given several tessellations sharing
//! an initial solid, build the coarsest tessellation at least as fine as
//! every input, then rewrite each input's triangles to reference the
//! primary's vertices so the whole collection shares one vertex table.

use slotmap::Key;

use crate::config::BuildConfig;
use crate::error::{CoreError, CoreResult};
use crate::tessellation::Tessellation;

/// The result of a primary-tessellation merge: the primary itself, plus
/// every input tessellation with its triangles' vertex references
/// rewritten to point into the primary's vertex arena.
///
/// After a merge, a triangle in `members[i]` holds `VertexId`s that are
/// only valid against `primary.vertices` — not `members[i].vertices`,
/// which is left untouched (and, once merge completes, unused). This
/// deliberately shares one nominal key type across two distinct arenas;
/// callers must always resolve a merged member's triangle corners
/// through `primary`, never through the member's own vertex table.
pub struct MergedTessellations {
    pub primary: Tessellation,
    pub members: Vec<Tessellation>,
}

/// Build the primary and rewrite every member's triangle corners to
/// reference it. Fails with `VertexNotFound` if a member vertex has no
/// colocated match in the primary, which indicates a bug in the
/// primary-build policy rather than bad input.
pub fn merge_nodes(mut inputs: Vec<Tessellation>, config: BuildConfig) -> CoreResult<MergedTessellations> {
    let primary = Tessellation::build_primary(&inputs, config)?;

    for (tess_index, member) in inputs.iter_mut().enumerate() {
        let locations: Vec<_> = member.vertices.iter().map(|(id, data)| (id, data.point)).collect();
        for (vertex_id, point) in locations {
            let Some(primary_id) = primary.find_vertex(&point, &config) else {
                return Err(CoreError::VertexNotFound { tessellation: tess_index, vertex: vertex_id.data().as_ffi() as usize });
            };
            for level in &member.levels {
                for &t in level {
                    for corner in member.triangles[t].v.iter_mut() {
                        if *corner == vertex_id {
                            *corner = primary_id;
                        }
                    }
                }
            }
        }
    }

    Ok(MergedTessellations { primary, members: inputs })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::{PlatonicSolid, SeedSolid};

    #[test]
    fn merge_of_two_base_level_tessellations_gives_every_vertex_a_primary_match() {
        let config = BuildConfig::default();
        let a = Tessellation::build_fresh(
            SeedSolid::catalog(PlatonicSolid::Icosahedron),
            0,
            Vec::new(),
            Default::default(),
            config,
        )
        .unwrap();
        let b = Tessellation::build_fresh(
            SeedSolid::catalog(PlatonicSolid::Icosahedron),
            1,
            Vec::new(),
            Default::default(),
            config,
        )
        .unwrap();

        let merged = merge_nodes(vec![a, b], config).unwrap();
        assert!(merged.primary.levels.len() >= merged.members.iter().map(|m| m.levels.len()).max().unwrap());
        for member in &merged.members {
            for level in &member.levels {
                for &t in level {
                    for &corner in &member.triangles[t].v {
                        assert!(merged.primary.vertices.contains_key(corner));
                    }
                }
            }
        }
    }
}
