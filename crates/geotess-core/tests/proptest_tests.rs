//! Property-based tests for tessellation-engine invariants using the
//! `proptest` crate, mirroring the kernel's own `proptest_tests.rs` style:
//! geometric identities over arbitrary inputs, then whole-build invariants
//! (spec.md §8's T-* properties) over arbitrary seed solid / base level
//! combinations.

use proptest::prelude::*;

use geotess_core::config::BuildConfig;
use geotess_core::seed::{PlatonicSolid, SeedSolid};
use geotess_core::tessellation::Tessellation;
use geotess_core::triangle;
use geotess_core::vector::{self, Vec3};

const TOL: f64 = 1e-9;

/// Arbitrary vector components in a moderate range, away from the origin
/// often enough to exercise `normalize` without forcing it every time.
fn arb_vec3() -> impl Strategy<Value = Vec3> {
    (-10.0f64..10.0, -10.0f64..10.0, -10.0f64..10.0).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

/// Arbitrary unit vector via spherical coordinates.
fn arb_unit_vec3() -> impl Strategy<Value = Vec3> {
    (0.0f64..std::f64::consts::PI, 0.0f64..std::f64::consts::TAU).prop_map(|(theta, phi)| {
        Vec3::new(theta.sin() * phi.cos(), theta.sin() * phi.sin(), theta.cos())
    })
}

fn arb_platonic_solid() -> impl Strategy<Value = PlatonicSolid> {
    prop_oneof![
        Just(PlatonicSolid::Tetrahedron),
        Just(PlatonicSolid::Cube),
        Just(PlatonicSolid::Octahedron),
        Just(PlatonicSolid::Icosahedron),
        Just(PlatonicSolid::Dodecahedron),
    ]
}

// ---------------------------------------------------------------------------
// 1. Vector dot product commutativity.
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn vector_dot_commutativity(a in arb_vec3(), b in arb_vec3()) {
        prop_assert!((a.dot(&b) - b.dot(&a)).abs() < TOL);
    }
}

// ---------------------------------------------------------------------------
// 2. Vector cross product anticommutativity: a x b == -(b x a).
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn vector_cross_anticommutativity(a in arb_vec3(), b in arb_vec3()) {
        let ab = a.cross(&b);
        let neg_ba = -b.cross(&a);
        prop_assert!((ab.x - neg_ba.x).abs() < TOL);
        prop_assert!((ab.y - neg_ba.y).abs() < TOL);
        prop_assert!((ab.z - neg_ba.z).abs() < TOL);
    }
}

// ---------------------------------------------------------------------------
// 3. Great-circle angle between two unit vectors is symmetric and in
//    [0, pi].
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn angle_is_symmetric_and_bounded(a in arb_unit_vec3(), b in arb_unit_vec3()) {
        let ab = vector::angle(&a, &b);
        let ba = vector::angle(&b, &a);
        prop_assert!((ab - ba).abs() < TOL);
        prop_assert!(ab >= -TOL && ab <= std::f64::consts::PI + TOL);
    }
}

// ---------------------------------------------------------------------------
// 4. Circumcenter of three unit vectors is equidistant (by great-circle
//    angle) from all three, whenever the three are not near-collinear.
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn circumcenter_is_equidistant_from_non_degenerate_corners(
        a in arb_unit_vec3(),
        b in arb_unit_vec3(),
        c in arb_unit_vec3(),
    ) {
        let area = triangle::solid_angle(&[a, b, c]).abs();
        // Skip near-degenerate (near-collinear or near-antipodal) triples,
        // where the circumcenter is numerically unstable by construction.
        if area > 0.05 {
            let cc = vector::circum_center(&a, &b, &c);
            let da = vector::angle(&cc, &a);
            let db = vector::angle(&cc, &b);
            let dc = vector::angle(&cc, &c);
            prop_assert!((da - db).abs() < 1e-6, "da={da} db={db}");
            prop_assert!((db - dc).abs() < 1e-6, "db={db} dc={dc}");
        }
    }
}

// ---------------------------------------------------------------------------
// 5. Seed edge length halves exactly once per uniform subdivision.
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn seed_edge_length_halves_per_subdivision(solid in arb_platonic_solid(), n in 0u32..8) {
        let seed = SeedSolid::catalog(solid);
        let l_n = seed.edge_length(n);
        let l_n1 = seed.edge_length(n + 1);
        prop_assert!((l_n1 - l_n / 2.0).abs() < 1e-12);
    }
}

// ---------------------------------------------------------------------------
// 6. Whole-build invariants (spec.md §8 T-tiling / T-descendant / T-edge):
//    for any seed solid and base level 0..=2, a fresh build passes its own
//    `test_tessellation` self-test (neighbor symmetry, shared edges,
//    descendant containment, exact sphere coverage, nothing left marked).
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]
    #[test]
    fn fresh_build_satisfies_tessellation_invariants(solid in arb_platonic_solid(), base_level in 0u32..=2) {
        let seed = SeedSolid::catalog(solid);
        let tess = Tessellation::build_fresh(seed, base_level, Vec::new(), Default::default(), BuildConfig::default())
            .expect("a fresh build over a catalog seed must never fail");
        prop_assert!(tess.test_tessellation(0).is_ok());

        // Every non-top-level triangle has a descendant strictly one level
        // above it, whose center it contains.
        let top = tess.levels.len() - 1;
        for (level_idx, level) in tess.levels.iter().enumerate() {
            if level_idx == top {
                continue;
            }
            for &t in level {
                let descendant = *tess.triangles[t].descendants.first().unwrap();
                prop_assert_eq!(tess.triangles[descendant].tess_level, tess.triangles[t].tess_level + 1);
                let center = triangle::center(&tess.corner_points(descendant));
                prop_assert!(triangle::contains(&tess.corner_points(t), &center, tess.config.inside_tolerance));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// 7. A walking search locates every one of its own seed corner vertices
//    exactly, regardless of which seed solid or which corner.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]
    #[test]
    fn find_vertex_locates_every_seed_corner(solid in arb_platonic_solid()) {
        let seed = SeedSolid::catalog(solid);
        let tess = Tessellation::from_seed(seed, 0, BuildConfig::default());
        for (id, data) in tess.vertices.iter() {
            let found = tess.find_vertex(&data.point, &tess.config);
            prop_assert_eq!(found, Some(id));
        }
    }
}
