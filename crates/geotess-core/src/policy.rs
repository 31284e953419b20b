//! Refinement policies (C7): the three ways a build decides whether a
//! triangle must divide further.
//!
//! Each variant needs a different slice of borrowed context — a
//! fresh build only needs the tessellation under construction, a refine
//! build needs read access to an existing `Tessellation` it mirrors, and
//! a primary-merge build needs read access to several. A plain enum
//! expresses that difference directly; a `dyn Trait` object would need
//! either a lifetime parameter threaded through every call site or
//! interior-mutability tricks to let `is_divisible` borrow a sibling
//! `Tessellation` while the one being built is also borrowed mutably.

use std::collections::HashMap;

use crate::arena::TriangleId;
use crate::config::BuildConfig;
use crate::tessellation::Tessellation;

pub enum Policy<'a> {
    /// Uniform base refinement plus adaptive refinement toward marked
    /// vertices, polygon-defining points, and explicit points — all
    /// driven by state already on the `Tessellation` being built.
    Fresh,
    /// Mirrors `orig` one extra level deep near a set of marked vertices.
    RefineExisting {
        orig: &'a Tessellation,
        max_edge_level: u32,
        mark_threshold: u32,
        /// Triangles of `orig`, across all its levels, mapped to how many
        /// of the vertices-to-refine they have as a corner. `orig` is a
        /// finished, finalized build, so its own transient mark counters
        /// are always zero by the time a refine build runs against it
        /// (`test_tessellation` enforces that at finalize) — this map is
        /// the policy's own count, independent of that counter.
        marked: HashMap<TriangleId, u32>,
    },
    /// Builds the coarsest common refinement of `inputs`: divisible
    /// wherever any input has already subdivided fully at that location.
    PrimaryMerge { inputs: &'a [Tessellation] },
}

impl<'a> Policy<'a> {
    pub fn fresh() -> Self {
        Policy::Fresh
    }

    /// Construct a refine-existing policy: marks every triangle of `orig`
    /// (on every level) that has one of `refine_at` as a corner, located
    /// via `orig`'s own walking search.
    pub fn refine_existing(
        orig: &'a Tessellation,
        refine_at: &[crate::vector::Vec3],
        max_edge_level: u32,
        mark_threshold: u32,
        config: &BuildConfig,
    ) -> Self {
        let mut marked: HashMap<TriangleId, u32> = HashMap::new();
        for p in refine_at {
            if let Some(vertex) = orig.find_vertex(p, config) {
                for level in &orig.levels {
                    for &t in level {
                        if orig.triangles[t].v.contains(&vertex) {
                            *marked.entry(t).or_insert(0) += 1;
                        }
                    }
                }
            }
        }
        Policy::RefineExisting { orig, max_edge_level, mark_threshold, marked }
    }

    pub fn primary_merge(inputs: &'a [Tessellation]) -> Self {
        Policy::PrimaryMerge { inputs }
    }

    /// Whether triangle `t` of `building` must be subdivided this pass.
    pub fn is_divisible(&self, building: &Tessellation, t: TriangleId) -> bool {
        let data = &building.triangles[t];
        match self {
            Policy::Fresh => {
                if data.tess_level < building.base_tess_level {
                    return true;
                }
                if data.v.iter().any(|&v| building.vertices[v].is_marked()) {
                    return true;
                }
                let corners = building.corner_points(t);
                for (polygon, target_level) in &building.polygons {
                    if *target_level as u32 <= data.tess_level {
                        continue;
                    }
                    if polygon.points().iter().any(|p| crate::triangle::contains(&corners, p, building.config.inside_tolerance)) {
                        return true;
                    }
                }
                for (&target_level, points) in &building.point_map {
                    if target_level <= data.tess_level {
                        continue;
                    }
                    if points.iter().any(|p| crate::triangle::contains(&corners, p, building.config.inside_tolerance)) {
                        return true;
                    }
                }
                false
            }
            Policy::RefineExisting { orig, max_edge_level, mark_threshold, marked } => {
                if data.edge_level >= *max_edge_level {
                    return false;
                }
                let corners = building.corner_points(t);
                let center = crate::triangle::center(&corners);
                match orig.find_triangle_at_level(&center, data.tess_level, &building.config) {
                    Some(found) => {
                        let orig_data = &orig.triangles[found];
                        let fully_split = orig_data.n_descendants() == 4;
                        let heavily_marked = marked.get(&found).copied().unwrap_or(0) >= *mark_threshold;
                        // `orig` and `building` are distinct tessellations with
                        // distinct vertex arenas, so "geometrically equal to
                        // t" must compare corner locations, not `VertexId`s.
                        let orig_corners = orig.corner_points(found);
                        let same_shape = (0..3).all(|i| {
                            crate::vector::coincident(&orig_corners[i], &corners[i], building.config.vertex_coincidence_cos)
                        });
                        fully_split || (heavily_marked && same_shape)
                    }
                    None => false,
                }
            }
            Policy::PrimaryMerge { inputs } => {
                let center = crate::triangle::center(&building.corner_points(t));
                inputs.iter().any(|input| {
                    match input.find_triangle_at_level(&center, data.tess_level, &building.config) {
                        Some(found) => input.triangles[found].n_descendants() == 4,
                        None => false,
                    }
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::{PlatonicSolid, SeedSolid};

    #[test]
    fn fresh_policy_forces_division_below_base_level() {
        let seed = SeedSolid::catalog(PlatonicSolid::Octahedron);
        let tess = Tessellation::from_seed(seed, 2, BuildConfig::default());
        let t0 = tess.levels[0][0];
        let policy = Policy::fresh();
        assert!(policy.is_divisible(&tess, t0));
    }

    #[test]
    fn fresh_policy_does_not_divide_past_base_with_no_marks_or_polygons() {
        let seed = SeedSolid::catalog(PlatonicSolid::Octahedron);
        let tess = Tessellation::from_seed(seed, 0, BuildConfig::default());
        let t0 = tess.levels[0][0];
        let policy = Policy::fresh();
        assert!(!policy.is_divisible(&tess, t0));
    }
}
