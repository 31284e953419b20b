//! Spherical-polygon containment marking (C10).
//!
//! A polygon is an opaque oracle: callers (path/KML/point-list parsers)
//! are out of scope for this crate, so only the interface they must
//! implement lives here.

use rayon::prelude::*;

use crate::arena::VertexId;
use crate::config::BuildConfig;
use crate::vector::Vec3;

/// A region on the unit sphere. Implementations are provided by
/// collaborators outside this crate (polygon/path/KML parsers); this
/// crate only consumes the trait.
pub trait SphericalPolygon: Sync {
    fn contains(&self, u: &Vec3) -> bool;
    fn points(&self) -> &[Vec3];
}

/// A polygon built directly from its boundary points, usable in tests and
/// as a minimal reference implementation (a convex spherical cap or
/// arbitrary point set test double would implement the trait directly).
#[derive(Debug, Clone)]
pub struct SphericalCap {
    pub center: Vec3,
    pub radius_rad: f64,
    pub boundary_samples: Vec<Vec3>,
}

impl SphericalCap {
    pub fn new(center: Vec3, radius_rad: f64) -> Self {
        let n_samples = 32;
        let (u_axis, v_axis) = orthonormal_basis(&center);
        let boundary_samples = (0..n_samples)
            .map(|i| {
                let theta = 2.0 * std::f64::consts::PI * (i as f64) / (n_samples as f64);
                let dir = u_axis * theta.cos() + v_axis * theta.sin();
                (center * radius_rad.cos() + dir * radius_rad.sin()).normalize()
            })
            .collect();
        Self { center, radius_rad, boundary_samples }
    }
}

fn orthonormal_basis(n: &Vec3) -> (Vec3, Vec3) {
    let helper = if n.x.abs() < 0.9 { Vec3::X } else { Vec3::Y };
    let u = helper.cross(n).normalize();
    let v = n.cross(&u);
    (u, v)
}

impl SphericalPolygon for SphericalCap {
    fn contains(&self, u: &Vec3) -> bool {
        crate::vector::angle(&self.center, u) <= self.radius_rad
    }

    fn points(&self) -> &[Vec3] {
        &self.boundary_samples
    }
}

/// Find every vertex among `candidates` that lies inside `polygon`, then
/// hand each one to `apply_mark` on the calling thread.
///
/// Splits into ~1000-vertex batches on a rayon thread pool when
/// `candidates.len() >= config.parallel_batch_threshold` and
/// `config.max_processors >= 2`; otherwise runs sequentially. Each task
/// only *computes* containment — no two tasks touch the same vertex's
/// mark field, and marks are applied on the calling thread afterward, so
/// there is no actual mutable-state contention to synchronize.
///
/// This function has no notion of "already marked" itself — it does not
/// own the vertex records, only the candidate points. A vertex covered by
/// two polygons in the same refinement pass is reported to `apply_mark`
/// twice; `apply_mark` must guard with its own `is_marked()` check (as
/// `Tessellation::populate_nodes` does) so the net effect is one mark per
/// vertex per pass, matching the one `unmark_if_marked()` each vertex gets
/// on the next level transition.
pub fn mark_vertices_in_polygon<F>(
    candidates: &[(VertexId, Vec3)],
    polygon: &dyn SphericalPolygon,
    config: &BuildConfig,
    mut apply_mark: F,
) where
    F: FnMut(VertexId),
{
    let contained: Vec<VertexId> = if candidates.len() >= config.parallel_batch_threshold
        && config.max_processors >= 2
    {
        candidates
            .par_chunks(config.parallel_batch_threshold)
            .flat_map_iter(|batch| {
                batch
                    .iter()
                    .filter(|(_, p)| polygon.contains(p))
                    .map(|(id, _)| *id)
            })
            .collect()
    } else {
        candidates
            .iter()
            .filter(|(_, p)| polygon.contains(p))
            .map(|(id, _)| *id)
            .collect()
    };

    for id in contained {
        apply_mark(id);
    }
}
