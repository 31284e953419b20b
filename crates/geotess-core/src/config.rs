//! Numeric constants and concurrency knobs fixed for cross-run compatibility.
//!
//! Mirrors the tolerance-config pattern used elsewhere in this codebase:
//! one small `Copy` struct holding every threshold a build needs, with a
//! `Default` that reproduces the reference constants exactly.

/// Tolerances and concurrency thresholds for a tessellation build.
#[derive(Debug, Clone, Copy)]
pub struct BuildConfig {
    /// Two vertices are the same location iff their dot product exceeds
    /// this value (`cos(1e-7 rad)`).
    pub vertex_coincidence_cos: f64,
    /// A scalar triple product greater than this is "inside or on" a
    /// triangle edge; more negative values are definitively outside.
    pub inside_tolerance: f64,
    /// A walking-search barycentric coefficient above this is treated as
    /// exactly landing on that corner vertex.
    pub vertex_coincidence_coeff: f64,
    /// Minimum vertex-batch size for the polygon-containment helper to
    /// switch from sequential marking to a rayon-parallel batch split.
    pub parallel_batch_threshold: usize,
    /// Available processor budget. Combined with
    /// `parallel_batch_threshold`, gates the rayon path in the
    /// polygon-containment helper (`max_processors >= 2` required).
    pub max_processors: usize,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            vertex_coincidence_cos: (1e-7_f64).cos(),
            inside_tolerance: -1e-15,
            vertex_coincidence_coeff: 0.999999999,
            parallel_batch_threshold: 1000,
            max_processors: 1,
        }
    }
}

impl BuildConfig {
    /// Convert a target edge length in degrees to a tessellation level:
    /// `round(log2(64 / len_deg))`.
    pub fn tess_level_for_edge_length_deg(len_deg: f64) -> u32 {
        (64.0_f64 / len_deg).log2().round().max(0.0) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_spec_constants() {
        let cfg = BuildConfig::default();
        assert!((cfg.vertex_coincidence_cos - (1e-7_f64).cos()).abs() < 1e-18);
        assert_eq!(cfg.inside_tolerance, -1e-15);
        assert_eq!(cfg.vertex_coincidence_coeff, 0.999999999);
    }

    #[test]
    fn tess_level_examples() {
        // 64 degrees -> level 0; 1 degree -> level 6 (2^6 = 64).
        assert_eq!(BuildConfig::tess_level_for_edge_length_deg(64.0), 0);
        assert_eq!(BuildConfig::tess_level_for_edge_length_deg(1.0), 6);
    }
}
