//! Typed failures for the tessellation engine.
//!
//! The build pipeline does not recover from any of these internally — a
//! build that hits one of these aborts and nothing partially built is
//! handed to the caller, per the error-handling policy this crate follows.

use thiserror::Error;

/// Failures surfaced by tessellation construction, refinement, and merge.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A neighbor, edge, or descendant relation failed to satisfy its
    /// invariant during `Tessellation::test_tessellation`. Fatal — either
    /// the implementation has a bug or the input seed was malformed.
    #[error("integrity violation in tessellation {tessellation} (level {level:?}, triangle {triangle:?}): {detail}")]
    IntegrityViolation {
        detail: String,
        tessellation: usize,
        level: Option<usize>,
        triangle: Option<usize>,
    },

    /// A directive was missing or inconsistent (e.g. a policy referenced a
    /// tessellation index out of range, or a base-level count mismatch).
    #[error("invalid input: {detail}")]
    InvalidInput { detail: String },

    /// During `merge_nodes`, a vertex of an input tessellation had no
    /// colocated vertex in the primary tessellation. Indicates a bug in
    /// the merge predicate, not bad input.
    #[error("vertex {vertex} of tessellation {tessellation} has no colocated vertex in the primary")]
    VertexNotFound { tessellation: usize, vertex: usize },
}

pub type CoreResult<T> = Result<T, CoreError>;
