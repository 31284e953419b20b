//! The `Tessellation`: a sequence of triangular tilings of the unit
//! sphere, each level finer than the previous, built from a seed solid by
//! repeated subdivision.

use std::collections::{BTreeMap, HashMap, HashSet};

use slotmap::SlotMap;
use tracing::{debug, info, instrument};

use crate::arena::{EdgeId, TriangleId, VertexId};
use crate::config::BuildConfig;
use crate::edge::EdgeData;
use crate::error::{CoreError, CoreResult};
use crate::policy::Policy;
use crate::polygon::SphericalPolygon;
use crate::seed::SeedSolid;
use crate::subdivide;
use crate::triangle::{self, TriangleData};
use crate::vector::Vec3;
use crate::vertex::VertexData;

pub struct Tessellation {
    pub vertices: SlotMap<VertexId, VertexData>,
    pub edges: SlotMap<EdgeId, EdgeData>,
    pub triangles: SlotMap<TriangleId, TriangleData>,
    /// `levels[0]` is the seed solid's faces; each later level is strictly
    /// finer.
    pub levels: Vec<Vec<TriangleId>>,
    pub base_tess_level: u32,
    /// Regions of adaptive refinement, each tagged with the tessellation
    /// level past which it should force further subdivision.
    pub polygons: Vec<(Box<dyn SphericalPolygon>, u32)>,
    /// Explicit refinement points, keyed by target level.
    pub point_map: BTreeMap<u32, Vec<Vec3>>,
    pub initial_solid: Option<SeedSolid>,
    pub config: BuildConfig,
}

impl Tessellation {
    /// Seed level 0 only: one vertex per seed vertex, one triangle per
    /// seed face, neighbors established across shared seed edges. Does
    /// not run the subdivision pipeline.
    pub fn from_seed(seed: SeedSolid, base_tess_level: u32, config: BuildConfig) -> Self {
        let mut vertices: SlotMap<VertexId, VertexData> = SlotMap::with_key();
        let mut edges: SlotMap<EdgeId, EdgeData> = SlotMap::with_key();
        let mut triangles: SlotMap<TriangleId, TriangleData> = SlotMap::with_key();

        let vertex_ids: Vec<VertexId> = seed.vertices.iter().map(|&p| vertices.insert(VertexData::new(p))).collect();

        let mut edge_lookup: HashMap<(VertexId, VertexId), EdgeId> = HashMap::new();
        let mut get_edge = |edges: &mut SlotMap<EdgeId, EdgeData>, p: VertexId, q: VertexId| -> EdgeId {
            if let Some(&e) = edge_lookup.get(&(p, q)) {
                return e;
            }
            if let Some(&e) = edge_lookup.get(&(q, p)) {
                return e;
            }
            let e = edges.insert(EdgeData::new());
            edge_lookup.insert((p, q), e);
            e
        };

        let mut level0 = Vec::with_capacity(seed.faces.len());
        for &[a, b, c] in &seed.faces {
            let v = [vertex_ids[a], vertex_ids[b], vertex_ids[c]];
            let e0 = get_edge(&mut edges, v[1], v[2]);
            let e1 = get_edge(&mut edges, v[2], v[0]);
            let e2 = get_edge(&mut edges, v[0], v[1]);
            let t = triangles.insert(TriangleData::new(v, [e0, e1, e2], None, 0, 0));
            level0.push(t);
        }

        for &t in &level0 {
            for i in 0..3 {
                let edge = triangles[t].edges[i];
                if let Some(other) = edges[edge].attach_side(t) {
                    triangles[t].neighbors[i] = Some(other);
                    let other_index = triangles[other]
                        .edges
                        .iter()
                        .position(|&e| e == edge)
                        .expect("shared seed edge must appear on both incident faces");
                    triangles[other].neighbors[other_index] = Some(t);
                }
            }
            for &v in &triangles[t].v {
                vertices[v].add_triangle(0, t);
            }
        }

        Self {
            vertices,
            edges,
            triangles,
            levels: vec![level0],
            base_tess_level,
            polygons: Vec::new(),
            point_map: BTreeMap::new(),
            initial_solid: Some(seed),
            config,
        }
    }

    /// Build a fresh tessellation: uniform refinement to `base_tess_level`
    /// plus adaptive refinement toward `polygons` and `point_map`.
    #[instrument(skip(seed, polygons, point_map))]
    pub fn build_fresh(
        seed: SeedSolid,
        base_tess_level: u32,
        polygons: Vec<(Box<dyn SphericalPolygon>, u32)>,
        point_map: BTreeMap<u32, Vec<Vec3>>,
        config: BuildConfig,
    ) -> CoreResult<Self> {
        let mut tess = Self::from_seed(seed, base_tess_level, config);
        tess.polygons = polygons;
        tess.point_map = point_map;
        let policy = Policy::fresh();
        tess.run_build(&policy)?;
        info!(levels = tess.levels.len(), "fresh tessellation built");
        Ok(tess)
    }

    /// Build a tessellation mirroring `orig` one extra level deep near
    /// `refine_at`.
    #[instrument(skip(orig, refine_at))]
    pub fn build_refine(
        orig: &Tessellation,
        refine_at: &[Vec3],
        max_edge_level: u32,
        mark_threshold: u32,
        config: BuildConfig,
    ) -> CoreResult<Self> {
        let seed = SeedSolid::from_level0(orig.level0_vertices(), orig.level0_faces());
        let mut tess = Self::from_seed(seed, orig.base_tess_level, config);
        let policy = Policy::refine_existing(orig, refine_at, max_edge_level, mark_threshold, &config);
        tess.run_build(&policy)?;
        Ok(tess)
    }

    /// Build the coarsest common refinement of `inputs`, which must share
    /// the same initial solid.
    #[instrument(skip(inputs))]
    pub fn build_primary(inputs: &[Tessellation], config: BuildConfig) -> CoreResult<Self> {
        let first = inputs
            .first()
            .ok_or_else(|| CoreError::InvalidInput { detail: "primary merge requires at least one input tessellation".into() })?;
        let seed = SeedSolid::from_level0(first.level0_vertices(), first.level0_faces());
        let base = inputs.iter().map(|t| t.base_tess_level).max().unwrap_or(0);
        let mut tess = Self::from_seed(seed, base, config);
        let policy = Policy::primary_merge(inputs);
        tess.run_build(&policy)?;
        Ok(tess)
    }

    /// Reconstruct a tessellation from the flat per-level triangle tables a
    /// grid-producing collaborator already owns (e.g. one tessellation's
    /// slice out of an assembled grid): one vertex per entry of
    /// `vertex_points`, one triangle per entry of `levels[k]` with
    /// `tess_level = edge_level = k`, neighbors rebuilt from shared vertex
    /// pairs within each level, and descendants rebuilt by walking-search
    /// from level `k` into level `k+1`. Equivalent to spec's
    /// `Tessellation(grid, tessId)` constructor.
    #[instrument(skip(vertex_points, levels))]
    pub fn from_flat_levels(vertex_points: Vec<Vec3>, levels: Vec<Vec<[usize; 3]>>, config: BuildConfig) -> CoreResult<Self> {
        if levels.first().map_or(true, Vec::is_empty) {
            return Err(CoreError::InvalidInput {
                detail: "a reconstructed tessellation needs at least one non-empty level".into(),
            });
        }

        let mut vertices: SlotMap<VertexId, VertexData> = SlotMap::with_key();
        let vertex_ids: Vec<VertexId> = vertex_points.into_iter().map(|p| vertices.insert(VertexData::new(p))).collect();

        let mut edges: SlotMap<EdgeId, EdgeData> = SlotMap::with_key();
        let mut triangles: SlotMap<TriangleId, TriangleData> = SlotMap::with_key();
        let mut built_levels: Vec<Vec<TriangleId>> = Vec::with_capacity(levels.len());

        for (level_idx, faces) in levels.iter().enumerate() {
            let tess_level = level_idx as u32;
            let mut edge_lookup: HashMap<(VertexId, VertexId), EdgeId> = HashMap::new();
            let mut get_edge = |edges: &mut SlotMap<EdgeId, EdgeData>, p: VertexId, q: VertexId| -> EdgeId {
                if let Some(&e) = edge_lookup.get(&(p, q)) {
                    return e;
                }
                if let Some(&e) = edge_lookup.get(&(q, p)) {
                    return e;
                }
                let e = edges.insert(EdgeData::new());
                edge_lookup.insert((p, q), e);
                e
            };

            let mut level_triangles = Vec::with_capacity(faces.len());
            for &[a, b, c] in faces {
                let v = [vertex_ids[a], vertex_ids[b], vertex_ids[c]];
                let e0 = get_edge(&mut edges, v[1], v[2]);
                let e1 = get_edge(&mut edges, v[2], v[0]);
                let e2 = get_edge(&mut edges, v[0], v[1]);
                let t = triangles.insert(TriangleData::new(v, [e0, e1, e2], None, tess_level, tess_level));
                level_triangles.push(t);
            }

            for &t in &level_triangles {
                for i in 0..3 {
                    let edge = triangles[t].edges[i];
                    if let Some(other) = edges[edge].attach_side(t) {
                        triangles[t].neighbors[i] = Some(other);
                        let other_index = triangles[other]
                            .edges
                            .iter()
                            .position(|&e| e == edge)
                            .expect("shared edge must appear on both incident faces");
                        triangles[other].neighbors[other_index] = Some(t);
                    }
                }
                for &v in &triangles[t].v {
                    vertices[v].add_triangle(level_idx, t);
                }
            }
            built_levels.push(level_triangles);
        }

        let mut tess = Self {
            vertices,
            edges,
            triangles,
            levels: built_levels,
            base_tess_level: 0,
            polygons: Vec::new(),
            point_map: BTreeMap::new(),
            initial_solid: None,
            config,
        };

        tess.rebuild_descendants_by_walking();
        tess.finalize()?;
        Ok(tess)
    }

    /// Set every non-top triangle's `descendants` by walking-search into
    /// the level above: walk level `k+1` from the previously found child,
    /// set `t`'s descendant to whichever triangle contains `t`'s center,
    /// then recover `nDescendants` by counting how many of that triangle's
    /// neighbors are *also* contained in `t`.
    fn rebuild_descendants_by_walking(&mut self) {
        let top = self.levels.len().saturating_sub(1);
        for k in 0..top {
            let mut cursor = self.levels[k + 1][0];
            let ids: Vec<TriangleId> = self.levels[k].clone();
            for t in ids {
                let center = triangle::center(&self.corner_points(t));
                let found = self.walk_within_level(cursor, &center);
                let mut descendants = vec![found];
                for i in 0..3 {
                    if let Some(n) = self.triangles[found].neighbors[i] {
                        let n_center = triangle::center(&self.corner_points(n));
                        if triangle::contains(&self.corner_points(t), &n_center, self.config.inside_tolerance) {
                            descendants.push(n);
                        }
                    }
                }
                self.triangles[t].descendants = descendants;
                cursor = found;
            }
        }
    }

    /// Step across neighbors within a single level toward `u`, stopping as
    /// soon as no edge's scalar triple product is negative. Used only by
    /// `rebuild_descendants_by_walking`, where (unlike the normal walking
    /// search) there is no level-below triangle yet to descend into.
    fn walk_within_level(&self, start: TriangleId, u: &Vec3) -> TriangleId {
        let mut current = start;
        loop {
            let corners = self.corner_points(current);
            let s = [
                triangle::scalar_triple_product_idx(&corners, 2, 1, u),
                triangle::scalar_triple_product_idx(&corners, 0, 2, u),
                triangle::scalar_triple_product_idx(&corners, 1, 0, u),
            ];
            let data = &self.triangles[current];
            let mut stepped = false;
            for i in 0..3 {
                if s[i] < self.config.inside_tolerance {
                    if let Some(n) = data.neighbors[i] {
                        current = n;
                        stepped = true;
                        break;
                    }
                }
            }
            if !stepped {
                return current;
            }
        }
    }

    pub fn level0_vertices(&self) -> Vec<Vec3> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for &t in &self.levels[0] {
            for &v in &self.triangles[t].v {
                if seen.insert(v) {
                    out.push(self.vertices[v].point);
                }
            }
        }
        out
    }

    pub fn level0_faces(&self) -> Vec<[usize; 3]> {
        let mut index_of: HashMap<VertexId, usize> = HashMap::new();
        let mut next = 0usize;
        let mut faces = Vec::with_capacity(self.levels[0].len());
        for &t in &self.levels[0] {
            let mut face = [0usize; 3];
            for (i, &v) in self.triangles[t].v.iter().enumerate() {
                face[i] = *index_of.entry(v).or_insert_with(|| {
                    let idx = next;
                    next += 1;
                    idx
                });
            }
            faces.push(face);
        }
        faces
    }

    pub fn corner_points(&self, t: TriangleId) -> [Vec3; 3] {
        let v = self.triangles[t].v;
        [self.vertices[v[0]].point, self.vertices[v[1]].point, self.vertices[v[2]].point]
    }

    fn run_build(&mut self, policy: &Policy) -> CoreResult<()> {
        let mut current_level = 0usize;
        loop {
            self.populate_nodes(current_level);
            let mut next_level = Vec::new();
            let ids: Vec<TriangleId> = self.levels[current_level].clone();
            for t in ids {
                if policy.is_divisible(self, t) {
                    subdivide::divide(self, t, &mut next_level);
                }
            }
            if next_level.is_empty() {
                break;
            }
            debug!(level = current_level + 1, count = next_level.len(), "subdivided level");
            self.levels.push(next_level);
            self.unmark_touched(current_level + 1);
            current_level += 1;
        }
        self.conformalize();
        self.fill_in();
        self.finalize()
    }

    /// Mark the subset of vertices on `level` lying inside any polygon
    /// whose target level exceeds it.
    pub fn populate_nodes(&mut self, level: usize) {
        if (level as u32) < self.base_tess_level || self.polygons.is_empty() {
            return;
        }
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();
        for &t in &self.levels[level] {
            for &v in &self.triangles[t].v {
                if seen.insert(v) {
                    candidates.push((v, self.vertices[v].point));
                }
            }
        }
        let config = self.config;
        for (polygon, target_level) in &self.polygons {
            if (*target_level as usize) <= level {
                continue;
            }
            let vertices = &mut self.vertices;
            crate::polygon::mark_vertices_in_polygon(&candidates, polygon.as_ref(), &config, |id| {
                if !vertices[id].is_marked() {
                    vertices[id].mark();
                }
            });
        }
    }

    fn unmark_touched(&mut self, level_idx: usize) {
        let mut seen = HashSet::new();
        for &t in &self.levels[level_idx] {
            for &v in &self.triangles[t].v {
                if seen.insert(v) {
                    self.vertices[v].unmark_if_marked();
                }
            }
        }
    }

    /// Repeat transition splits until every triangle whose edges carry
    /// more subdivision than it has absorbed gains a conforming child.
    fn conformalize(&mut self) {
        loop {
            let mut changed = false;
            let top = self.levels.len().saturating_sub(1);
            for k in 0..top {
                let ids: Vec<TriangleId> = self.levels[k].clone();
                for t in ids {
                    if !self.triangles[t].descendants.is_empty() {
                        continue;
                    }
                    let edges = self.triangles[t].edges;
                    let edge_divisions = [self.edges[edges[0]].n_divisions, self.edges[edges[1]].n_divisions, self.edges[edges[2]].n_divisions];
                    if self.triangles[t].needs_division(edge_divisions) {
                        let mut next = Vec::new();
                        subdivide::transition_triangles(self, t, &mut next);
                        self.levels[k + 1].extend(next);
                        changed = true;
                    }
                }
            }
            if !changed {
                break;
            }
        }
    }

    /// Guarantee every non-top triangle has a descendant by transition-
    /// splitting anything conformalization left untouched.
    fn fill_in(&mut self) {
        let top = self.levels.len().saturating_sub(1);
        for k in 0..top {
            let ids: Vec<TriangleId> = self.levels[k].clone();
            for t in ids {
                if self.triangles[t].descendants.is_empty() {
                    let mut next = Vec::new();
                    subdivide::transition_triangles(self, t, &mut next);
                    self.levels[k + 1].extend(next);
                }
            }
        }
    }

    /// Reindex triangles and vertices from 0 in level/insertion order and
    /// validate the resulting mesh.
    fn finalize(&mut self) -> CoreResult<()> {
        let mut seen = HashSet::new();
        let mut vidx = 0i64;
        for level in &self.levels {
            for &t in level {
                for &v in &self.triangles[t].v {
                    if seen.insert(v) {
                        self.vertices[v].index = vidx;
                        vidx += 1;
                    }
                }
            }
        }
        let mut tidx = 0i64;
        for level in &self.levels {
            for &t in level {
                self.triangles[t].index = tidx;
                tidx += 1;
            }
        }
        self.test_tessellation(0)
    }

    /// Walk from `start` toward `u`, stepping across the edge whose
    /// scalar triple product goes negative, descending into a child once
    /// inside, until either a top-level triangle or `max_level` is
    /// reached.
    pub fn find_triangle_at_level(&self, u: &Vec3, max_level: u32, config: &BuildConfig) -> Option<TriangleId> {
        let mut current = *self.levels.first()?.first()?;
        loop {
            let corners = self.corner_points(current);
            let s = [
                triangle::scalar_triple_product_idx(&corners, 2, 1, u),
                triangle::scalar_triple_product_idx(&corners, 0, 2, u),
                triangle::scalar_triple_product_idx(&corners, 1, 0, u),
            ];
            let data = &self.triangles[current];
            let mut stepped = false;
            for i in 0..3 {
                if s[i] < config.inside_tolerance {
                    if let Some(n) = data.neighbors[i] {
                        current = n;
                        stepped = true;
                        break;
                    }
                }
            }
            if stepped {
                continue;
            }
            if data.tess_level >= max_level {
                return Some(current);
            }
            match data.descendants.first() {
                Some(&child) => current = child,
                None => return Some(current),
            }
        }
    }

    /// Locate the exact vertex `u` coincides with, walking to the
    /// containing top-level (or leaf) triangle and checking whether any
    /// barycentric coefficient is within the coincidence tolerance of 1.
    pub fn find_vertex(&self, u: &Vec3, config: &BuildConfig) -> Option<VertexId> {
        let leaf = self.find_triangle_at_level(u, u32::MAX, config)?;
        let corners = self.corner_points(leaf);
        let raw = [
            triangle::scalar_triple_product_idx(&corners, 2, 1, u),
            triangle::scalar_triple_product_idx(&corners, 0, 2, u),
            triangle::scalar_triple_product_idx(&corners, 1, 0, u),
        ];
        let sum: f64 = raw.iter().sum();
        if sum.abs() < 1e-15 {
            return None;
        }
        let data = &self.triangles[leaf];
        (0..3).map(|i| raw[i] / sum).enumerate().find(|&(_, c)| c > config.vertex_coincidence_coeff).map(|(i, _)| data.v[i])
    }

    /// Validates the invariants every finished tessellation must satisfy:
    /// neighbor symmetry, shared edges, descendant containment, tiling
    /// closure, and that nothing is left marked.
    pub fn test_tessellation(&self, tessellation_index: usize) -> CoreResult<()> {
        for (level_idx, level) in self.levels.iter().enumerate() {
            let mut solid_angle_sum = 0.0;
            for &t in level {
                let data = &self.triangles[t];

                for i in 0..3 {
                    let Some(n) = data.neighbors[i] else {
                        return Err(CoreError::IntegrityViolation {
                            detail: format!("triangle has no neighbor across edge {i}"),
                            tessellation: tessellation_index,
                            level: Some(level_idx),
                            triangle: Some(data.index as usize),
                        });
                    };
                    let n_data = &self.triangles[n];
                    let Some(j) = n_data.get_neighbor_index(t) else {
                        return Err(CoreError::IntegrityViolation {
                            detail: "neighbor does not reciprocate across the shared edge".into(),
                            tessellation: tessellation_index,
                            level: Some(level_idx),
                            triangle: Some(data.index as usize),
                        });
                    };
                    if data.edges[i] != n_data.edges[j] {
                        return Err(CoreError::IntegrityViolation {
                            detail: "neighbors across a shared side do not reference the same edge".into(),
                            tessellation: tessellation_index,
                            level: Some(level_idx),
                            triangle: Some(data.index as usize),
                        });
                    }
                    if data.v[(i + 1) % 3] != n_data.v[(j + 2) % 3] || data.v[(i + 2) % 3] != n_data.v[(j + 1) % 3] {
                        return Err(CoreError::IntegrityViolation {
                            detail: "shared edge's endpoints do not match between the two triangles".into(),
                            tessellation: tessellation_index,
                            level: Some(level_idx),
                            triangle: Some(data.index as usize),
                        });
                    }
                }

                if level_idx + 1 < self.levels.len() {
                    let Some(&descendant) = data.descendants.first() else {
                        return Err(CoreError::IntegrityViolation {
                            detail: "non-top triangle has no descendant".into(),
                            tessellation: tessellation_index,
                            level: Some(level_idx),
                            triangle: Some(data.index as usize),
                        });
                    };
                    let d_data = &self.triangles[descendant];
                    if d_data.tess_level != data.tess_level + 1 {
                        return Err(CoreError::IntegrityViolation {
                            detail: "descendant is not exactly one tessellation level below its ancestor".into(),
                            tessellation: tessellation_index,
                            level: Some(level_idx),
                            triangle: Some(data.index as usize),
                        });
                    }
                    let d_center = triangle::center(&self.corner_points(descendant));
                    if !triangle::contains(&self.corner_points(t), &d_center, self.config.inside_tolerance) {
                        return Err(CoreError::IntegrityViolation {
                            detail: "descendant's center does not lie inside its ancestor".into(),
                            tessellation: tessellation_index,
                            level: Some(level_idx),
                            triangle: Some(data.index as usize),
                        });
                    }
                }

                solid_angle_sum += triangle::solid_angle(&self.corner_points(t));

                if data.is_marked() {
                    return Err(CoreError::IntegrityViolation {
                        detail: "triangle left marked after build".into(),
                        tessellation: tessellation_index,
                        level: Some(level_idx),
                        triangle: Some(data.index as usize),
                    });
                }
            }
            if (solid_angle_sum - 4.0 * std::f64::consts::PI).abs() > 1e-6 {
                return Err(CoreError::IntegrityViolation {
                    detail: format!("level solid angles sum to {solid_angle_sum}, expected 4*pi"),
                    tessellation: tessellation_index,
                    level: Some(level_idx),
                    triangle: None,
                });
            }
        }

        for (_, v) in self.vertices.iter() {
            if v.is_marked() {
                return Err(CoreError::IntegrityViolation {
                    detail: "vertex left marked after build".into(),
                    tessellation: tessellation_index,
                    level: None,
                    triangle: None,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::PlatonicSolid;

    #[test]
    fn icosahedron_base_zero_yields_one_level_twelve_vertices_twenty_triangles() {
        let seed = SeedSolid::catalog(PlatonicSolid::Icosahedron);
        let tess = Tessellation::build_fresh(seed, 0, Vec::new(), BTreeMap::new(), BuildConfig::default()).unwrap();
        assert_eq!(tess.levels.len(), 1);
        assert_eq!(tess.levels[0].len(), 20);
        assert_eq!(tess.vertices.len(), 12);
    }

    #[test]
    fn icosahedron_base_one_yields_two_levels_forty_two_vertices_eighty_triangles() {
        let seed = SeedSolid::catalog(PlatonicSolid::Icosahedron);
        let tess = Tessellation::build_fresh(seed, 1, Vec::new(), BTreeMap::new(), BuildConfig::default()).unwrap();
        assert_eq!(tess.levels.len(), 2);
        assert_eq!(tess.levels[1].len(), 80);
        assert_eq!(tess.vertices.len(), 42);
        for &t in &tess.levels[1] {
            assert_eq!(tess.triangles[t].edge_level, 1);
        }
    }

    #[test]
    fn polygon_refinement_reaches_requested_level_inside_cap_only() {
        let seed = SeedSolid::catalog(PlatonicSolid::Icosahedron);
        let cap = crate::polygon::SphericalCap::new(Vec3::Z, 10f64.to_radians());
        let tess = Tessellation::build_fresh(
            seed,
            0,
            vec![(Box::new(cap) as Box<dyn SphericalPolygon>, 2)],
            BTreeMap::new(),
            BuildConfig::default(),
        )
        .unwrap();
        assert!(tess.levels.len() >= 3);
        for &t in &tess.levels[0] {
            assert!(!tess.triangles[t].descendants.is_empty());
        }
    }

    #[test]
    fn two_overlapping_polygons_do_not_double_mark_their_shared_vertices() {
        // Two caps around Z whose boundaries overlap near the equatorial
        // edge of each: every vertex under both must still end up marked
        // exactly once per pass, or a build never terminates (each leftover
        // mark forces division of every triangle touching that vertex at
        // every later level).
        let seed = SeedSolid::catalog(PlatonicSolid::Icosahedron);
        let cap_a = crate::polygon::SphericalCap::new(Vec3::Z, 30f64.to_radians());
        let cap_b = crate::polygon::SphericalCap::new(Vec3::new(0.3, 0.0, 1.0).normalize(), 25f64.to_radians());
        let tess = Tessellation::build_fresh(
            seed,
            0,
            vec![
                (Box::new(cap_a) as Box<dyn SphericalPolygon>, 2),
                (Box::new(cap_b) as Box<dyn SphericalPolygon>, 2),
            ],
            BTreeMap::new(),
            BuildConfig::default(),
        )
        .unwrap();
        assert!(tess.test_tessellation(0).is_ok());
        for (_, v) in tess.vertices.iter() {
            assert_eq!(v.mark_count(), 0);
        }
    }

    #[test]
    fn find_vertex_locates_a_known_seed_corner() {
        let seed = SeedSolid::catalog(PlatonicSolid::Icosahedron);
        let tess = Tessellation::from_seed(seed, 0, BuildConfig::default());
        let target = tess.vertices[tess.triangles[tess.levels[0][0]].v[0]].point;
        let found = tess.find_vertex(&target, &tess.config);
        assert_eq!(found, Some(tess.triangles[tess.levels[0][0]].v[0]));
    }

    #[test]
    fn reconstructing_from_flat_levels_preserves_topology() {
        let seed = SeedSolid::catalog(PlatonicSolid::Icosahedron);
        let original = Tessellation::build_fresh(seed, 1, Vec::new(), BTreeMap::new(), BuildConfig::default()).unwrap();

        let mut vertex_points = vec![Vec3::ZERO; original.vertices.len()];
        for (_, data) in original.vertices.iter() {
            vertex_points[data.index as usize] = data.point;
        }
        let levels: Vec<Vec<[usize; 3]>> = original
            .levels
            .iter()
            .map(|level| {
                level
                    .iter()
                    .map(|&t| {
                        let v = original.triangles[t].v;
                        [
                            original.vertices[v[0]].index as usize,
                            original.vertices[v[1]].index as usize,
                            original.vertices[v[2]].index as usize,
                        ]
                    })
                    .collect()
            })
            .collect();

        let rebuilt = Tessellation::from_flat_levels(vertex_points, levels, BuildConfig::default()).unwrap();
        assert_eq!(rebuilt.vertices.len(), original.vertices.len());
        assert_eq!(rebuilt.levels.len(), original.levels.len());
        assert_eq!(rebuilt.levels[1].len(), original.levels[1].len());
        rebuilt.test_tessellation(0).unwrap();
        for &t in &rebuilt.levels[0] {
            assert_eq!(rebuilt.triangles[t].descendants.len(), 4, "a fully quad-split level-0 triangle should recover all 4 children");
        }
    }
}
