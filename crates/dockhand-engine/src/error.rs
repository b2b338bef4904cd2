//! Engine-side failure kinds.
//!
//! These are deliberately coarser than the platform taxonomy: the same
//! `Conflict` means "name taken" during a create and "already stopped"
//! during a stop. The orchestrator owns the per-operation translation.

use thiserror::Error;

/// Failure reported by an [`crate::EngineClient`] implementation.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine endpoint could not be reached at all.
    #[error("engine unreachable: {message}")]
    Unavailable {
        /// Transport-level detail.
        message: String,
    },

    /// The referenced resource does not exist.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Resource kind, e.g. `container` or `image`.
        kind: &'static str,
        /// Identifier that failed to resolve.
        id: String,
    },

    /// The request conflicts with current engine state (duplicate name,
    /// image still referenced, redundant state transition).
    #[error("conflict: {message}")]
    Conflict {
        /// Engine-reported reason.
        message: String,
    },

    /// Any other error the engine API reported.
    #[error("engine API error: {message}")]
    Api {
        /// Engine-reported reason.
        message: String,
    },

    /// Reading or writing an engine-provided stream failed.
    #[error("engine stream error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}

/// Convenience alias for engine facade calls.
pub type EngineResult<T> = std::result::Result<T, EngineError>;
