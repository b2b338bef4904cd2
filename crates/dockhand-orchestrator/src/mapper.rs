//! Projection of engine records onto platform domain objects.

use dockhand_common::types::{Module, Server};
use dockhand_engine::ContainerRecord;

/// Maps raw engine container records into platform domain objects.
///
/// Implemented by the platform layer and injected into the orchestrator;
/// the orchestrator only decides *when* to project, never *how*.
pub trait ContainerMapper: Send + Sync {
    /// Projects a container record onto an existing server object.
    fn map_container_to_server(&self, record: &ContainerRecord, server: Server) -> Server;

    /// Projects a container record onto an existing module object,
    /// carrying the application port resolved from the container's
    /// environment.
    fn map_container_to_module(
        &self,
        record: &ContainerRecord,
        module: Module,
        application_port: u16,
    ) -> Module;
}
