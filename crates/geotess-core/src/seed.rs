//! Seed Platonic solids: the level-0 vertices and faces a tessellation
//! build starts from.

use crate::vector::{axis_angle_matrix, euler_matrix, euler_rotate, Mat3, Vec3};

/// Which Platonic solid to seed a tessellation from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatonicSolid {
    Tetrahedron,
    Cube,
    Octahedron,
    Icosahedron,
    Dodecahedron,
}

/// The initial vertices and triangular faces a `Tessellation` is built
/// from, before any subdivision. Non-triangular Platonic faces (cube
/// squares, dodecahedron pentagons) are fan-triangulated at construction
/// time so every `SeedSolid` exposes a uniformly triangular level 0.
#[derive(Debug, Clone)]
pub struct SeedSolid {
    pub vertices: Vec<Vec3>,
    /// Triangular faces, clockwise as viewed from outside the sphere.
    pub faces: Vec<[usize; 3]>,
}

impl SeedSolid {
    pub fn new(vertices: Vec<Vec3>, faces: Vec<[usize; 3]>) -> Self {
        let mut solid = Self { vertices, faces };
        solid.fix_winding();
        solid
    }

    pub fn catalog(solid: PlatonicSolid) -> Self {
        match solid {
            PlatonicSolid::Tetrahedron => tetrahedron(),
            PlatonicSolid::Cube => cube(),
            PlatonicSolid::Octahedron => octahedron(),
            PlatonicSolid::Icosahedron => icosahedron(),
            PlatonicSolid::Dodecahedron => dodecahedron(),
        }
    }

    /// Reconstruct a seed solid from an existing grid's level-0 vertices
    /// and triangles, copied verbatim.
    pub fn from_level0(vertices: Vec<Vec3>, faces: Vec<[usize; 3]>) -> Self {
        // Already clockwise-from-outside by construction of the original
        // grid; re-running fix_winding is a (cheap) no-op safety net.
        Self::new(vertices, faces)
    }

    fn fix_winding(&mut self) {
        for face in &mut self.faces {
            let [a, b, c] = *face;
            let va = self.vertices[a];
            let vb = self.vertices[b];
            let vc = self.vertices[c];
            let normal = (vb - va).cross(&(vc - va));
            let center = (va + vb + vc) * (1.0 / 3.0);
            // Clockwise as viewed from outside: cross(v1-v0, v2-v0) points
            // toward the sphere's interior, i.e. away from the center.
            if normal.dot(&center) > 0.0 {
                face.swap(1, 2);
            }
        }
    }

    /// Rotate so `vertices[0]` moves to the given latitude/longitude (in
    /// degrees): the axis/angle between the current and target unit
    /// vectors, applied via Rodrigues' rotation formula. Shares
    /// `rotate_matrix` as its only mutation primitive with `rotate_euler`,
    /// so there remains exactly one place vertices are actually rotated.
    pub fn rotate_latlon(&mut self, lat_deg: f64, lon_deg: f64) {
        let lat = lat_deg.to_radians();
        let lon = lon_deg.to_radians();
        let target = Vec3::new(lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin());
        let current = self.vertices[0];

        let axis = current.cross(&target);
        let axis = match axis.normalized() {
            Some(a) => a,
            None => return, // already coincident or antipodal; no rotation needed
        };
        let ang = crate::vector::angle(&current, &target);
        let m = axis_angle_matrix(&axis, ang);
        self.rotate_matrix(&m);
    }

    pub fn rotate_euler(&mut self, alpha: f64, beta: f64, gamma: f64) {
        let m = euler_matrix(alpha, beta, gamma);
        self.rotate_matrix(&m);
    }

    pub fn rotate_matrix(&mut self, m: &Mat3) {
        for v in &mut self.vertices {
            *v = euler_rotate(v, m);
        }
    }

    /// `acos(v0 . v1) / 2^n_subdivisions` — the edge length in radians
    /// after `n_subdivisions` uniform quad splits of the seed's shortest
    /// defining edge (vertices 0 and 1).
    pub fn edge_length(&self, n_subdivisions: u32) -> f64 {
        let base = crate::vector::angle(&self.vertices[0], &self.vertices[1]);
        base / 2f64.powi(n_subdivisions as i32)
    }
}

fn push_all(vertices: &[[f64; 3]]) -> Vec<Vec3> {
    vertices
        .iter()
        .map(|p| Vec3::new(p[0], p[1], p[2]).normalize())
        .collect()
}

fn tetrahedron() -> SeedSolid {
    let vertices = push_all(&[
        [1.0, 1.0, 1.0],
        [1.0, -1.0, -1.0],
        [-1.0, 1.0, -1.0],
        [-1.0, -1.0, 1.0],
    ]);
    let faces = vec![[0, 1, 2], [0, 3, 1], [0, 2, 3], [1, 3, 2]];
    SeedSolid::new(vertices, faces)
}

fn octahedron() -> SeedSolid {
    let vertices = push_all(&[
        [1.0, 0.0, 0.0],
        [-1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0],
        [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0],
    ]);
    let faces = vec![
        [0, 2, 4],
        [2, 1, 4],
        [1, 3, 4],
        [3, 0, 4],
        [2, 0, 5],
        [1, 2, 5],
        [3, 1, 5],
        [0, 3, 5],
    ];
    SeedSolid::new(vertices, faces)
}

fn cube() -> SeedSolid {
    let vertices = push_all(&[
        [-1.0, -1.0, -1.0],
        [1.0, -1.0, -1.0],
        [1.0, 1.0, -1.0],
        [-1.0, 1.0, -1.0],
        [-1.0, -1.0, 1.0],
        [1.0, -1.0, 1.0],
        [1.0, 1.0, 1.0],
        [-1.0, 1.0, 1.0],
    ]);
    // Each square face split along one diagonal into two triangles.
    let quads = [
        [0, 1, 2, 3], // bottom (z = -1)
        [5, 4, 7, 6], // top (z = +1)
        [4, 0, 3, 7], // left (x = -1)
        [1, 5, 6, 2], // right (x = +1)
        [4, 5, 1, 0], // front (y = -1)
        [3, 2, 6, 7], // back (y = +1)
    ];
    let mut faces = Vec::with_capacity(12);
    for q in quads {
        faces.push([q[0], q[1], q[2]]);
        faces.push([q[0], q[2], q[3]]);
    }
    SeedSolid::new(vertices, faces)
}

fn icosahedron() -> SeedSolid {
    let phi = (1.0 + 5f64.sqrt()) / 2.0;
    let vertices = push_all(&[
        [-1.0, phi, 0.0],
        [1.0, phi, 0.0],
        [-1.0, -phi, 0.0],
        [1.0, -phi, 0.0],
        [0.0, -1.0, phi],
        [0.0, 1.0, phi],
        [0.0, -1.0, -phi],
        [0.0, 1.0, -phi],
        [phi, 0.0, -1.0],
        [phi, 0.0, 1.0],
        [-phi, 0.0, -1.0],
        [-phi, 0.0, 1.0],
    ]);
    let faces = vec![
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ];
    SeedSolid::new(vertices, faces)
}

fn dodecahedron() -> SeedSolid {
    let phi = (1.0 + 5f64.sqrt()) / 2.0;
    let inv_phi = 1.0 / phi;
    // 20 cube-like + golden-rectangle corners of the regular dodecahedron.
    let mut corners = push_all(&[
        [1.0, 1.0, 1.0],
        [1.0, 1.0, -1.0],
        [1.0, -1.0, 1.0],
        [1.0, -1.0, -1.0],
        [-1.0, 1.0, 1.0],
        [-1.0, 1.0, -1.0],
        [-1.0, -1.0, 1.0],
        [-1.0, -1.0, -1.0],
        [0.0, inv_phi, phi],
        [0.0, inv_phi, -phi],
        [0.0, -inv_phi, phi],
        [0.0, -inv_phi, -phi],
        [inv_phi, phi, 0.0],
        [inv_phi, -phi, 0.0],
        [-inv_phi, phi, 0.0],
        [-inv_phi, -phi, 0.0],
        [phi, 0.0, inv_phi],
        [phi, 0.0, -inv_phi],
        [-phi, 0.0, inv_phi],
        [-phi, 0.0, -inv_phi],
    ]);
    // Pentagonal faces as index 5-tuples into `corners`, clockwise from
    // outside (fixed up below regardless).
    let pentagons: [[usize; 5]; 12] = [
        [0, 16, 2, 10, 8],
        [0, 8, 4, 14, 12],
        [0, 12, 1, 17, 16],
        [1, 12, 14, 5, 9],
        [1, 9, 11, 3, 17],
        [2, 16, 17, 3, 13],
        [2, 13, 15, 6, 10],
        [3, 11, 7, 15, 13],
        [4, 8, 10, 6, 18],
        [4, 18, 19, 5, 14],
        [5, 19, 7, 11, 9],
        [6, 15, 7, 19, 18],
    ];
    let mut faces = Vec::with_capacity(60);
    for pentagon in pentagons {
        let pts: Vec<Vec3> = pentagon.iter().map(|&i| corners[i]).collect();
        let center = (pts.iter().fold(Vec3::ZERO, |acc, p| acc + *p) * 0.2).normalize();
        corners.push(center);
        let center_idx = corners.len() - 1;
        for i in 0..5 {
            faces.push([pentagon[i], pentagon[(i + 1) % 5], center_idx]);
        }
    }
    SeedSolid::new(corners, faces)
}
