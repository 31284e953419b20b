//! Typed failures surfaced by the grid assembler.

use thiserror::Error;

use geotess_core::CoreError;

/// Failures from flattening one or more tessellations into a [`crate::Grid`].
#[derive(Debug, Error)]
pub enum GridError {
    /// Propagated from the tessellation build/merge pipeline this crate
    /// assembles on top of.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A directive this crate does not implement — named here only so a
    /// downstream collaborator's radial-profile error (profile type outside
    /// {CONSTANT, THIN, SURFACE}) can compose through `GridError` via `?`
    /// rather than being stringified early.
    #[error("not supported: {detail}")]
    NotSupported { detail: String },

    /// `assemble_grid` was handed zero tessellations.
    #[error("invalid input: {detail}")]
    InvalidInput { detail: String },
}

pub type GridResult<T> = Result<T, GridError>;
