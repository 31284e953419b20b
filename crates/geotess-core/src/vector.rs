//! Unit-vector primitives used throughout the tessellation engine.
//!
//! Every point handled by this crate lives on the unit sphere, so there is
//! a single vector type rather than a separate point/vector distinction.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Neg, Sub};

/// A vector in 3D Euclidean space, conventionally of unit length when it
/// represents a vertex, center, or other location on the sphere.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0 };
    pub const X: Self = Self { x: 1.0, y: 0.0, z: 0.0 };
    pub const Y: Self = Self { x: 0.0, y: 1.0, z: 0.0 };
    pub const Z: Self = Self { x: 0.0, y: 0.0, z: 1.0 };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Self) -> Self {
        Self {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn length(&self) -> f64 {
        self.length_squared().sqrt()
    }

    pub fn length_squared(&self) -> f64 {
        self.dot(self)
    }

    pub fn normalized(&self) -> Option<Self> {
        let len = self.length();
        if len < 1e-15 {
            None
        } else {
            Some(*self / len)
        }
    }

    /// Normalize, panicking if the vector is near-zero. Used only where the
    /// caller has already established the vector cannot degenerate (e.g.
    /// subdivision midpoints of a non-degenerate triangle).
    pub fn normalize(&self) -> Self {
        self.normalized().expect("cannot normalize a near-zero-length vector")
    }

    pub fn to_array(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    pub fn from_array(arr: [f64; 3]) -> Self {
        Self { x: arr[0], y: arr[1], z: arr[2] }
    }

    /// Scalar triple product: self . (b x c).
    pub fn scalar_triple_product(&self, b: &Self, c: &Self) -> f64 {
        self.dot(&b.cross(c))
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;
    fn mul(self, s: f64) -> Vec3 {
        Vec3::new(self.x * s, self.y * s, self.z * s)
    }
}

impl Div<f64> for Vec3 {
    type Output = Vec3;
    fn div(self, s: f64) -> Vec3 {
        Vec3::new(self.x / s, self.y / s, self.z / s)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

/// Dot of two unit vectors.
pub fn dot(a: &Vec3, b: &Vec3) -> f64 {
    a.dot(b)
}

/// Cross product.
pub fn cross(a: &Vec3, b: &Vec3) -> Vec3 {
    a.cross(b)
}

/// Normalize a vector onto the unit sphere.
pub fn normalize(v: &Vec3) -> Vec3 {
    v.normalize()
}

/// (a x b) . c
pub fn scalar_triple_product(a: &Vec3, b: &Vec3, c: &Vec3) -> f64 {
    a.scalar_triple_product(b, c)
}

/// Geodesic angle between two unit vectors, i.e. great-circle distance on
/// the unit sphere in radians.
pub fn angle(a: &Vec3, b: &Vec3) -> f64 {
    a.dot(b).clamp(-1.0, 1.0).acos()
}

/// A 3x3 rotation matrix, row-major.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat3 {
    pub rows: [[f64; 3]; 3],
}

impl Mat3 {
    pub fn identity() -> Self {
        Self {
            rows: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    pub fn multiply(&self, other: &Mat3) -> Mat3 {
        let mut rows = [[0.0; 3]; 3];
        for i in 0..3 {
            for j in 0..3 {
                let mut acc = 0.0;
                for k in 0..3 {
                    acc += self.rows[i][k] * other.rows[k][j];
                }
                rows[i][j] = acc;
            }
        }
        Mat3 { rows }
    }

    pub fn apply(&self, v: &Vec3) -> Vec3 {
        Vec3::new(
            self.rows[0][0] * v.x + self.rows[0][1] * v.y + self.rows[0][2] * v.z,
            self.rows[1][0] * v.x + self.rows[1][1] * v.y + self.rows[1][2] * v.z,
            self.rows[2][0] * v.x + self.rows[2][1] * v.y + self.rows[2][2] * v.z,
        )
    }
}

/// Z-Y-Z Euler rotation matrix from angles in radians: rotate by `alpha`
/// about Z, then `beta` about the new Y, then `gamma` about the new Z.
/// Used only for seed-solid placement.
pub fn euler_matrix(alpha: f64, beta: f64, gamma: f64) -> Mat3 {
    let rz = |a: f64| Mat3 {
        rows: [
            [a.cos(), -a.sin(), 0.0],
            [a.sin(), a.cos(), 0.0],
            [0.0, 0.0, 1.0],
        ],
    };
    let ry = |a: f64| Mat3 {
        rows: [
            [a.cos(), 0.0, a.sin()],
            [0.0, 1.0, 0.0],
            [-a.sin(), 0.0, a.cos()],
        ],
    };
    rz(alpha).multiply(&ry(beta)).multiply(&rz(gamma))
}

/// Apply an Euler rotation matrix to a vector.
pub fn euler_rotate(v: &Vec3, m: &Mat3) -> Vec3 {
    m.apply(v)
}

/// Rotation matrix for rotating by `angle` radians about the unit axis
/// `axis`, via Rodrigues' rotation formula. Unlike a bare Z-Y-Z Euler
/// triple, this rotates every vector by exactly `angle` about `axis`
/// itself rather than about the Z axis after aligning Z with `axis` —
/// the two only coincide when conjugated by the alignment rotation.
pub fn axis_angle_matrix(axis: &Vec3, angle: f64) -> Mat3 {
    let (x, y, z) = (axis.x, axis.y, axis.z);
    let c = angle.cos();
    let s = angle.sin();
    let t = 1.0 - c;
    Mat3 {
        rows: [
            [t * x * x + c, t * x * y - s * z, t * x * z + s * y],
            [t * x * y + s * z, t * y * y + c, t * y * z - s * x],
            [t * x * z - s * y, t * y * z + s * x, t * z * z + c],
        ],
    }
}

/// Unit-vector circumcenter of three unit vectors: equidistant by
/// great-circle angle from all three corners. Stable even when the three
/// points are nearly collinear (falls back to the arithmetic-mean center,
/// which is well-defined in that degenerate limit).
pub fn circum_center(a: &Vec3, b: &Vec3, c: &Vec3) -> Vec3 {
    let ab = *b - *a;
    let ac = *c - *a;
    let n = ab.cross(&ac);
    match n.normalized() {
        Some(n) => {
            // Orient the circumcenter to the same hemisphere as the
            // triangle's vertices (cross product direction is ambiguous in
            // sign relative to "outside the sphere").
            if n.dot(a) + n.dot(b) + n.dot(c) < 0.0 {
                -n
            } else {
                n
            }
        }
        None => (*a + *b + *c).normalize(),
    }
}

/// Tolerance-aware equality for two locations on the sphere: true iff the
/// great-circle angle between them is below `angle_tol` radians, expressed
/// as a dot-product threshold `dot > cos(angle_tol)`.
pub fn coincident(a: &Vec3, b: &Vec3, cos_tol: f64) -> bool {
    a.dot(b) > cos_tol
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_of_orthogonal_axes_is_zero() {
        assert_eq!(Vec3::X.dot(&Vec3::Y), 0.0);
    }

    #[test]
    fn cross_of_x_and_y_is_z() {
        let c = Vec3::X.cross(&Vec3::Y);
        assert!((c.x - 0.0).abs() < 1e-15);
        assert!((c.y - 0.0).abs() < 1e-15);
        assert!((c.z - 1.0).abs() < 1e-15);
    }

    #[test]
    fn angle_between_identical_vectors_is_zero() {
        assert!(angle(&Vec3::X, &Vec3::X).abs() < 1e-12);
    }

    #[test]
    fn angle_between_opposite_vectors_is_pi() {
        assert!((angle(&Vec3::X, &(-Vec3::X)) - std::f64::consts::PI).abs() < 1e-12);
    }

    #[test]
    fn circum_center_of_octant_triangle_is_equidistant() {
        let cc = circum_center(&Vec3::X, &Vec3::Y, &Vec3::Z);
        let da = angle(&cc, &Vec3::X);
        let db = angle(&cc, &Vec3::Y);
        let dc = angle(&cc, &Vec3::Z);
        assert!((da - db).abs() < 1e-9);
        assert!((db - dc).abs() < 1e-9);
    }

    #[test]
    fn euler_rotation_round_trip_preserves_length() {
        let m = euler_matrix(0.3, 0.7, -0.4);
        let v = Vec3::new(0.6, -0.2, 0.77).normalize();
        let r = euler_rotate(&v, &m);
        assert!((r.length() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn coincident_tolerance_matches_spec_constant() {
        let cos_tol = (1e-7_f64).cos();
        assert!(coincident(&Vec3::X, &Vec3::X, cos_tol));
        let nearly = Vec3::new(1.0, 1e-9, 0.0).normalize();
        assert!(coincident(&Vec3::X, &nearly, cos_tol));
    }

    #[test]
    fn axis_angle_matrix_carries_current_exactly_onto_target() {
        let current = Vec3::new(0.6, -0.2, 0.77).normalize();
        let target = Vec3::new(-0.3, 0.9, 0.1).normalize();
        let axis = current.cross(&target).normalize();
        let ang = angle(&current, &target);
        let m = axis_angle_matrix(&axis, ang);
        let rotated = m.apply(&current);
        assert!((rotated.x - target.x).abs() < 1e-9);
        assert!((rotated.y - target.y).abs() < 1e-9);
        assert!((rotated.z - target.z).abs() < 1e-9);
    }
}
