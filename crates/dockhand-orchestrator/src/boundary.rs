//! Translation of engine errors into the platform taxonomy.
//!
//! The engine facade reports coarse failure kinds; what they mean depends
//! on the operation. A `Conflict` is a recoverable name collision during a
//! create, an idempotent no-op during a stop, and an in-use rejection
//! during an image delete. Each orchestrator operation goes through the
//! matching translation here so components above only ever see
//! [`DockhandError`] variants.

use dockhand_common::error::DockhandError;
use dockhand_engine::EngineError;

/// Generic fatal translation for calls with no recoverable outcome.
pub(crate) fn fault(err: EngineError) -> DockhandError {
    match err {
        EngineError::Unavailable { message } => DockhandError::EngineUnavailable { message },
        other => DockhandError::EngineUnavailable {
            message: other.to_string(),
        },
    }
}

/// Translation for inspect-backed lookups.
pub(crate) fn inspect_error(name: &str, err: EngineError) -> DockhandError {
    match err {
        EngineError::NotFound { .. } => DockhandError::ContainerNotFound {
            name: name.to_owned(),
        },
        other => fault(other),
    }
}

/// Translation for container creation: a conflict is a recoverable name
/// collision, a missing image is equally recoverable.
pub(crate) fn create_error(name: &str, err: EngineError) -> DockhandError {
    match err {
        EngineError::Conflict { message } => DockhandError::CreationFailed {
            name: name.to_owned(),
            message,
        },
        EngineError::NotFound { kind, id } => DockhandError::CreationFailed {
            name: name.to_owned(),
            message: format!("{kind} not found: {id}"),
        },
        other => fault(other),
    }
}

/// Translation for starting a container.
pub(crate) fn start_error(name: &str, err: EngineError) -> DockhandError {
    match err {
        EngineError::NotFound { .. } => DockhandError::ContainerNotFound {
            name: name.to_owned(),
        },
        other => fault(other),
    }
}

/// Translation for image deletion: a conflict means the image is still
/// referenced by containers.
pub(crate) fn image_delete_error(image: &str, err: EngineError) -> DockhandError {
    match err {
        EngineError::Conflict { .. } => DockhandError::ImageInUse {
            image: image.to_owned(),
        },
        other => fault(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_on_create_is_recoverable() {
        let err = create_error(
            "web1",
            EngineError::Conflict {
                message: "name already in use".into(),
            },
        );
        assert!(matches!(err, DockhandError::CreationFailed { .. }));
        assert!(err.is_recoverable());
    }

    #[test]
    fn conflict_on_image_delete_maps_to_in_use() {
        let err = image_delete_error(
            "cloudunit/tomcat:8",
            EngineError::Conflict {
                message: "image is referenced".into(),
            },
        );
        assert!(matches!(err, DockhandError::ImageInUse { .. }));
    }

    #[test]
    fn unavailable_is_always_fatal() {
        let err = inspect_error(
            "web1",
            EngineError::Unavailable {
                message: "connection refused".into(),
            },
        );
        assert!(matches!(err, DockhandError::EngineUnavailable { .. }));
    }

    #[test]
    fn not_found_on_inspect_names_the_container() {
        let err = inspect_error(
            "web1",
            EngineError::NotFound {
                kind: "container",
                id: "web1".into(),
            },
        );
        assert!(matches!(err, DockhandError::ContainerNotFound { name } if name == "web1"));
    }
}
