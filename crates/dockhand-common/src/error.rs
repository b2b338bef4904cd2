//! Platform-level error taxonomy for the Dockhand workspace.
//!
//! Every component above the engine facade propagates these variants only;
//! raw engine failures are translated at the orchestrator boundary. The split
//! between recoverable variants (`CreationFailed`, `ImageInUse`) and fatal
//! ones (`EngineUnavailable`, `ExecutionFailed`) is part of the contract:
//! callers may retry or clean up after the former, never after the latter.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type exposed to the platform layer.
#[derive(Debug, Error)]
pub enum DockhandError {
    /// The caller supplied an unusable container specification.
    #[error("invalid container spec: {message}")]
    InvalidSpec {
        /// Description of the malformed input.
        message: String,
    },

    /// The engine rejected a container creation, typically a name collision.
    /// Recoverable: the caller may rename or remove the conflicting container.
    #[error("creation of container {name} failed: {message}")]
    CreationFailed {
        /// Name of the container that could not be created.
        name: String,
        /// Engine-reported reason.
        message: String,
    },

    /// The engine endpoint could not be reached. Fatal for the operation.
    #[error("container engine unavailable: {message}")]
    EngineUnavailable {
        /// Connectivity failure detail.
        message: String,
    },

    /// No container with the given name is known to the engine.
    #[error("container not found: {name}")]
    ContainerNotFound {
        /// The missing container's name.
        name: String,
    },

    /// A required environment variable is absent from the container.
    /// Permanent for the container's current state; a recreate may supply it.
    #[error("variable {variable} is missing from container {container}")]
    MissingEnvVariable {
        /// Container that was inspected.
        container: String,
        /// Name of the absent variable.
        variable: String,
    },

    /// A started service does not satisfy its own contract, e.g. a module
    /// image shipping without its declared port variable.
    #[error("service misconfigured: {message}")]
    ServiceMisconfigured {
        /// Description of the violated expectation.
        message: String,
    },

    /// A remote command could not be executed or its output could not be
    /// captured. Carries the full exec context for diagnostics.
    #[error("exec failed in container {container} (command: {command}): {message}")]
    ExecutionFailed {
        /// Target container name.
        container: String,
        /// The shell command that was submitted.
        command: String,
        /// Underlying failure detail.
        message: String,
    },

    /// A remote command exceeded its caller-supplied deadline.
    #[error("exec timed out in container {container} (command: {command})")]
    ExecutionTimedOut {
        /// Target container name.
        container: String,
        /// The shell command that was submitted.
        command: String,
    },

    /// An image could not be deleted because containers still reference it.
    /// Recoverable: the caller may remove those containers first.
    #[error("image {image} is in use and cannot be deleted")]
    ImageInUse {
        /// The image reference that was rejected.
        image: String,
    },

    /// A local I/O operation failed (export targets, file transfers).
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

impl DockhandError {
    /// Whether the caller may meaningfully retry or clean up after this error.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::CreationFailed { .. } | Self::ImageInUse { .. } | Self::ContainerNotFound { .. }
        )
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, DockhandError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creation_failed_is_recoverable() {
        let err = DockhandError::CreationFailed {
            name: "web1".into(),
            message: "name already taken".into(),
        };
        assert!(err.is_recoverable());
    }

    #[test]
    fn engine_unavailable_is_fatal() {
        let err = DockhandError::EngineUnavailable {
            message: "connection refused".into(),
        };
        assert!(!err.is_recoverable());
    }

    #[test]
    fn exec_errors_carry_container_and_command() {
        let err = DockhandError::ExecutionFailed {
            container: "db1".into(),
            command: "id".into(),
            message: "stream closed".into(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("db1"));
        assert!(rendered.contains("id"));
    }
}
