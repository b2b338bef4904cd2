//! The engine client contract.

use std::io::Read;

use crate::error::EngineResult;
use crate::record::{ContainerRecord, ExecId, ExecOptions, ImageSummary};
use crate::spec::ContainerSpec;

/// Client facade over the external container engine.
///
/// One implementation wraps one reachable engine endpoint. All calls block
/// on network I/O; implementors must be safe to share across threads since
/// the orchestrator issues calls for distinct containers concurrently.
pub trait EngineClient: Send + Sync {
    /// Creates a container from the given spec, without starting it.
    ///
    /// # Errors
    ///
    /// `Conflict` when a container with the same name already exists.
    fn create_container(&self, spec: &ContainerSpec) -> EngineResult<String>;

    /// Starts a previously created container.
    ///
    /// # Errors
    ///
    /// Returns an error if the container is unknown or cannot be started.
    fn start_container(&self, name: &str) -> EngineResult<()>;

    /// Requests a graceful stop of a running container.
    ///
    /// # Errors
    ///
    /// `Conflict` when the container is not running.
    fn stop_container(&self, name: &str) -> EngineResult<()>;

    /// Kills a running container immediately.
    ///
    /// # Errors
    ///
    /// `Conflict` when the container is not running.
    fn kill_container(&self, name: &str) -> EngineResult<()>;

    /// Removes a container in any stopped state.
    ///
    /// # Errors
    ///
    /// `NotFound` when no such container exists.
    fn remove_container(&self, name: &str) -> EngineResult<()>;

    /// Inspects a container by name or id.
    ///
    /// # Errors
    ///
    /// `NotFound` when no such container exists.
    fn inspect_container(&self, name: &str) -> EngineResult<ContainerRecord>;

    /// Creates an exec instance inside a running container.
    ///
    /// # Errors
    ///
    /// Returns an error if the container is not running.
    fn exec_create(&self, name: &str, cmd: &[String], opts: &ExecOptions) -> EngineResult<ExecId>;

    /// Starts an exec instance, returning its combined output stream.
    /// For detached execs the stream is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the exec instance is unknown.
    fn exec_start(&self, exec_id: &ExecId) -> EngineResult<Box<dyn Read + Send>>;

    /// Lists all containers (any state), returning each one's names.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing cannot be retrieved.
    fn list_containers(&self) -> EngineResult<Vec<Vec<String>>>;

    /// Lists images, optionally filtered by a label key/value pair.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing cannot be retrieved.
    fn list_images(&self, label: Option<(&str, &str)>) -> EngineResult<Vec<ImageSummary>>;

    /// Pulls an image by full `repository:tag` reference.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry transfer fails.
    fn pull_image(&self, reference: &str) -> EngineResult<()>;

    /// Removes an image by reference.
    ///
    /// # Errors
    ///
    /// `Conflict` when containers still reference the image.
    fn remove_image(&self, reference: &str) -> EngineResult<()>;

    /// Provisions a named volume of the given kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend rejects the request.
    fn create_volume(&self, name: &str, kind: &str) -> EngineResult<()>;

    /// Removes a named volume.
    ///
    /// # Errors
    ///
    /// `Conflict` when the volume is still mounted.
    fn remove_volume(&self, name: &str) -> EngineResult<()>;

    /// Copies a local file or directory into a container.
    ///
    /// # Errors
    ///
    /// Returns an error if the transfer fails.
    fn copy_to_container(
        &self,
        local_path: &std::path::Path,
        name: &str,
        dest_path: &str,
    ) -> EngineResult<()>;

    /// Returns a tar stream of the given path inside a container.
    ///
    /// # Errors
    ///
    /// `NotFound` when the container or path does not exist.
    fn archive_container(&self, name: &str, path: &str) -> EngineResult<Box<dyn Read + Send>>;

    /// Returns the container's full filesystem as a byte stream.
    ///
    /// # Errors
    ///
    /// `NotFound` when no such container exists.
    fn export_container(&self, name: &str) -> EngineResult<Box<dyn Read + Send>>;

    /// Returns the container's combined stdout/stderr log.
    ///
    /// # Errors
    ///
    /// Returns an error if logs cannot be retrieved.
    fn container_logs(&self, name: &str) -> EngineResult<String>;
}
