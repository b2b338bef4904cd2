//! Lifecycle orchestration of server and module containers.
//!
//! One logical transition per call: the orchestrator normalizes inputs
//! through the spec builder, drives the engine facade, projects results
//! through the injected mapper, and keeps the metadata cache consistent.
//! The engine remains the sole source of truth for container state; no
//! state is tracked here between calls.
//!
//! Transitions for the same container name are serialized through a
//! per-name lock held for the duration of one transition's engine calls;
//! distinct names proceed fully in parallel.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use dockhand_common::config::OrchestratorConfig;
use dockhand_common::constants;
use dockhand_common::error::{DockhandError, Result};
use dockhand_common::types::{ImageRef, Module, Server, User};
use dockhand_engine::{EngineClient, EngineError};

use crate::archive;
use crate::boundary;
use crate::cache::MetadataCache;
use crate::exec::{ExecRequest, RemoteExec};
use crate::locks::NameLocks;
use crate::mapper::ContainerMapper;
use crate::spec;

/// Orchestrates container lifecycle transitions against one engine
/// endpoint.
pub struct Orchestrator {
    engine: Arc<dyn EngineClient>,
    mapper: Arc<dyn ContainerMapper>,
    cache: MetadataCache,
    exec: RemoteExec,
    locks: NameLocks,
    config: OrchestratorConfig,
}

impl Orchestrator {
    /// Creates an orchestrator over the given engine client and mapper.
    #[must_use]
    pub fn new(
        engine: Arc<dyn EngineClient>,
        mapper: Arc<dyn ContainerMapper>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            cache: MetadataCache::new(Arc::clone(&engine)),
            exec: RemoteExec::new(Arc::clone(&engine)),
            engine,
            mapper,
            locks: NameLocks::default(),
            config,
        }
    }

    /// Provisions the container for a server workload without starting it.
    ///
    /// When `create_main_volume` is set, the named persistent volume is
    /// created first; a volume failure aborts the whole operation before
    /// any container exists. A name collision surfaces as the recoverable
    /// `CreationFailed`.
    ///
    /// # Errors
    ///
    /// `InvalidSpec`, `CreationFailed`, or `EngineUnavailable`.
    #[allow(clippy::too_many_arguments)]
    pub fn create_server(
        &self,
        name: &str,
        server: &Server,
        image_path: &str,
        image_subtype: Option<&str>,
        user: &User,
        envs: Vec<String>,
        create_main_volume: bool,
        volumes: Vec<String>,
    ) -> Result<()> {
        self.locks.with_lock(name, || {
            let container_spec = spec::server_spec(
                name,
                image_path,
                image_subtype,
                user,
                envs,
                create_main_volume,
                volumes,
                server.application_server,
                &self.config,
            )?;
            if create_main_volume {
                self.create_runtime_volume(name)?;
            }
            tracing::info!(name = %name, volumes = ?container_spec.volumes, "creating server container");
            let id = self
                .engine
                .create_container(&container_spec)
                .map_err(|e| boundary::create_error(name, e))?;
            self.cache.invalidate(name);
            tracing::info!(name = %name, id = %id, "server container created");
            Ok(())
        })
    }

    /// Provisions the container for a module workload without starting it.
    ///
    /// Port bindings are derived from the module's opened ports only.
    /// Same volume and error semantics as [`Self::create_server`].
    ///
    /// # Errors
    ///
    /// `InvalidSpec`, `CreationFailed`, or `EngineUnavailable`.
    pub fn create_module(
        &self,
        name: &str,
        module: &Module,
        image_path: &str,
        envs: Vec<String>,
        create_main_volume: bool,
        volumes: Vec<String>,
    ) -> Result<()> {
        self.locks.with_lock(name, || {
            let container_spec = spec::module_spec(
                name,
                image_path,
                &module.ports,
                envs,
                create_main_volume,
                volumes,
                &self.config,
            )?;
            if create_main_volume {
                self.create_runtime_volume(name)?;
            }
            tracing::info!(name = %name, ports = ?container_spec.port_bindings, "creating module container");
            let id = self
                .engine
                .create_container(&container_spec)
                .map_err(|e| boundary::create_error(name, e))?;
            self.cache.invalidate(name);
            tracing::info!(name = %name, id = %id, "module container created");
            Ok(())
        })
    }

    /// Starts a server container and returns the re-inspected, mapped
    /// server.
    ///
    /// # Errors
    ///
    /// `ContainerNotFound` or `EngineUnavailable`.
    pub fn start_server(&self, name: &str, server: Server) -> Result<Server> {
        self.locks.with_lock(name, || {
            self.engine
                .start_container(name)
                .map_err(|e| boundary::start_error(name, e))?;
            let record = self
                .engine
                .inspect_container(name)
                .map_err(|e| boundary::inspect_error(name, e))?;
            tracing::info!(name = %name, id = %record.id, "server container started");
            Ok(self.mapper.map_container_to_server(&record, server))
        })
    }

    /// Starts a module container, resolves its application port from the
    /// required `CU_MODULE_PORT` variable, and returns the mapped module.
    ///
    /// A module image shipping without that variable (or with a non-port
    /// value) is `ServiceMisconfigured`; the start is not retried.
    ///
    /// # Errors
    ///
    /// `ContainerNotFound`, `EngineUnavailable`, or `ServiceMisconfigured`.
    pub fn start_module(&self, name: &str, module: Module) -> Result<Module> {
        self.locks.with_lock(name, || {
            self.engine
                .start_container(name)
                .map_err(|e| boundary::start_error(name, e))?;
            let record = self
                .engine
                .inspect_container(name)
                .map_err(|e| boundary::inspect_error(name, e))?;

            let raw_port = match self.cache.env(name, constants::MODULE_PORT_VARIABLE) {
                Ok(value) => value,
                Err(DockhandError::MissingEnvVariable { variable, .. }) => {
                    return Err(DockhandError::ServiceMisconfigured {
                        message: format!("module {name} declares no {variable}"),
                    });
                }
                Err(other) => return Err(other),
            };
            let port = raw_port.parse::<u16>().map_err(|_| {
                DockhandError::ServiceMisconfigured {
                    message: format!(
                        "module {name} declares {}={raw_port}, not a port",
                        constants::MODULE_PORT_VARIABLE
                    ),
                }
            })?;

            tracing::info!(name = %name, id = %record.id, port, "module container started");
            Ok(self.mapper.map_container_to_module(&record, module, port))
        })
    }

    /// Requests a graceful stop. Stopping an already-stopped container is
    /// not an error.
    ///
    /// # Errors
    ///
    /// `EngineUnavailable` on connectivity failure.
    pub fn stop_container(&self, name: &str) -> Result<()> {
        self.locks.with_lock(name, || {
            match self.engine.stop_container(name) {
                Ok(()) => {
                    tracing::info!(name = %name, "container stopped");
                    Ok(())
                }
                Err(EngineError::Conflict { .. } | EngineError::NotFound { .. }) => {
                    tracing::debug!(name = %name, "container already stopped");
                    Ok(())
                }
                Err(other) => Err(boundary::fault(other)),
            }
        })
    }

    /// Kills a server container immediately. Killing an already-stopped
    /// container is not an error.
    ///
    /// # Errors
    ///
    /// `EngineUnavailable` on connectivity failure.
    pub fn kill_server(&self, name: &str) -> Result<()> {
        self.locks.with_lock(name, || {
            match self.engine.kill_container(name) {
                Ok(()) => {
                    tracing::info!(name = %name, "container killed");
                    Ok(())
                }
                Err(EngineError::Conflict { .. } | EngineError::NotFound { .. }) => {
                    tracing::debug!(name = %name, "container already stopped, kill skipped");
                    Ok(())
                }
                Err(other) => Err(boundary::fault(other)),
            }
        })
    }

    /// Removes a container and, when requested, its persistent volume.
    ///
    /// Container removal is authoritative: a volume-removal failure is
    /// logged and swallowed, never rolled back. Removing an already-removed
    /// container succeeds.
    ///
    /// # Errors
    ///
    /// `EngineUnavailable` on connectivity failure.
    pub fn remove_container(&self, name: &str, remove_volume: bool) -> Result<()> {
        self.locks.with_lock(name, || {
            match self.engine.remove_container(name) {
                Ok(()) => tracing::info!(name = %name, "container removed"),
                Err(EngineError::NotFound { .. }) => {
                    tracing::debug!(name = %name, "container already removed");
                }
                Err(other) => return Err(boundary::fault(other)),
            }
            self.cache.invalidate(name);

            if remove_volume {
                if let Err(e) = self.engine.remove_volume(name) {
                    tracing::warn!(name = %name, error = %e, "volume removal failed, container removal stands");
                }
            }
            Ok(())
        })
    }

    /// Whether the container's main process is currently running.
    ///
    /// # Errors
    ///
    /// `ContainerNotFound` or `EngineUnavailable`.
    pub fn is_running(&self, name: &str) -> Result<bool> {
        let record = self
            .engine
            .inspect_container(name)
            .map_err(|e| boundary::inspect_error(name, e))?;
        Ok(record.state.running)
    }

    /// Whether the container has exited. A non-zero exit code logs a
    /// warning about abnormal termination but still reports the container
    /// as stopped.
    ///
    /// # Errors
    ///
    /// `ContainerNotFound` or `EngineUnavailable`.
    pub fn is_stopped_gracefully(&self, name: &str) -> Result<bool> {
        let record = self
            .engine
            .inspect_container(name)
            .map_err(|e| boundary::inspect_error(name, e))?;
        if record.state.exit_code != 0 {
            tracing::warn!(
                name = %name,
                exit_code = record.state.exit_code,
                "container may have been stopped brutally"
            );
        }
        Ok(record.state.status.eq_ignore_ascii_case("exited"))
    }

    /// Whether any container with this name exists in any state.
    ///
    /// # Errors
    ///
    /// `EngineUnavailable` on connectivity failure.
    pub fn exists(&self, name: &str) -> Result<bool> {
        if name.is_empty() {
            return Ok(false);
        }
        // The engine registers names with a leading slash.
        let registered = if name.starts_with('/') {
            name.to_owned()
        } else {
            format!("/{name}")
        };
        let containers = self.engine.list_containers().map_err(boundary::fault)?;
        Ok(containers.iter().any(|names| names.contains(&registered)))
    }

    /// Lists all containers' names. Listing failures are diagnostic, not
    /// lifecycle-critical: they are logged and degrade to an empty result.
    #[must_use]
    pub fn list_containers(&self) -> Vec<Vec<String>> {
        match self.engine.list_containers() {
            Ok(containers) => containers,
            Err(e) => {
                tracing::error!(error = %e, "container listing failed");
                Vec::new()
            }
        }
    }

    /// Returns a container's combined log, or `None` when retrieval fails
    /// (logged and swallowed).
    #[must_use]
    pub fn logs(&self, name: &str) -> Option<String> {
        match self.engine.container_logs(name) {
            Ok(logs) => {
                tracing::debug!(name = %name, bytes = logs.len(), "logs retrieved");
                Some(logs)
            }
            Err(e) => {
                tracing::error!(name = %name, error = %e, "log retrieval failed");
                None
            }
        }
    }

    /// Streams the container's full filesystem into `out`.
    ///
    /// # Errors
    ///
    /// `ContainerNotFound`, `EngineUnavailable`, or `Io` when the sink
    /// fails.
    pub fn export_container(&self, name: &str, out: &mut dyn Write) -> Result<u64> {
        let mut stream = self
            .engine
            .export_container(name)
            .map_err(|e| boundary::inspect_error(name, e))?;
        std::io::copy(&mut stream, out).map_err(|e| DockhandError::Io {
            path: name.into(),
            source: e,
        })
    }

    /// Extracts a single file from the container into `out`, returning its
    /// size in bytes.
    ///
    /// # Errors
    ///
    /// `ContainerNotFound`, `EngineUnavailable`, or `Io` when the path is
    /// absent or the sink fails.
    pub fn file_from_container(&self, name: &str, path: &str, out: &mut dyn Write) -> Result<u64> {
        let stream = self
            .engine
            .archive_container(name, path)
            .map_err(|e| boundary::inspect_error(name, e))?;
        archive::extract_file(stream, path, out)
    }

    /// Copies a local file into the container at `dest_path`.
    ///
    /// # Errors
    ///
    /// `ContainerNotFound` or `EngineUnavailable`.
    pub fn send_file_to_container(
        &self,
        local_path: &Path,
        name: &str,
        dest_path: &str,
    ) -> Result<()> {
        self.engine
            .copy_to_container(local_path, name, dest_path)
            .map_err(|e| boundary::inspect_error(name, e))?;
        tracing::info!(name = %name, dest = %dest_path, "file sent to container");
        Ok(())
    }

    /// Executes a shell command with the automatic single privileged retry
    /// and the configured default deadline.
    ///
    /// # Errors
    ///
    /// `ExecutionFailed` or `ExecutionTimedOut`.
    pub fn exec_command(&self, name: &str, command: &str) -> Result<String> {
        self.exec.run(name, command, self.default_deadline())
    }

    /// Executes a request exactly as specified (privilege, detach,
    /// deadline), bypassing the escalation policy.
    ///
    /// # Errors
    ///
    /// `ExecutionFailed` or `ExecutionTimedOut`.
    pub fn exec_with(&self, request: &ExecRequest) -> Result<String> {
        self.exec.run_as(request)
    }

    /// Persists an environment variable inside the container by running
    /// the platform's add-env script privileged, then invalidates the
    /// container's cached env lookups.
    ///
    /// # Errors
    ///
    /// `ExecutionFailed` or `ExecutionTimedOut`.
    pub fn add_env(&self, name: &str, key: &str, value: &str) -> Result<()> {
        let request = ExecRequest {
            privileged: true,
            deadline: self.default_deadline(),
            ..ExecRequest::new(
                name,
                format!(
                    "CU_KEY={key} CU_VALUE={value} {}",
                    constants::ADD_ENV_SCRIPT
                ),
            )
        };
        let _ = self.exec.run_as(&request)?;
        self.cache.invalidate(name);
        tracing::info!(name = %name, key = %key, "environment variable persisted");
        Ok(())
    }

    /// Resolves a container's engine-assigned id through the cache.
    ///
    /// # Errors
    ///
    /// `ContainerNotFound` or `EngineUnavailable`.
    pub fn container_id(&self, name: &str) -> Result<String> {
        self.cache.container_id(name)
    }

    /// Resolves a container's registered name from its id (uncached; id
    /// lookups are not invalidation-tracked).
    ///
    /// # Errors
    ///
    /// `ContainerNotFound` or `EngineUnavailable`.
    pub fn container_name_from_id(&self, id: &str) -> Result<String> {
        let record = self
            .engine
            .inspect_container(id)
            .map_err(|e| boundary::inspect_error(id, e))?;
        Ok(record.name)
    }

    /// Resolves an environment variable inside a container through the
    /// cache.
    ///
    /// # Errors
    ///
    /// `MissingEnvVariable`, `ContainerNotFound`, or `EngineUnavailable`.
    pub fn env(&self, name: &str, variable: &str) -> Result<String> {
        self.cache.env(name, variable)
    }

    /// Pulls an image; the tag defaults to `latest`.
    ///
    /// # Errors
    ///
    /// `EngineUnavailable` on connectivity or registry failure.
    pub fn pull_image(&self, image: &ImageRef) -> Result<()> {
        let reference = image.reference();
        tracing::info!(image = %reference, "pulling image");
        self.engine.pull_image(&reference).map_err(boundary::fault)
    }

    /// Deletes an image. Deleting an unknown image succeeds; an image
    /// still referenced by containers is the recoverable `ImageInUse`.
    ///
    /// # Errors
    ///
    /// `ImageInUse` or `EngineUnavailable`.
    pub fn delete_image(&self, reference: &str) -> Result<()> {
        match self.engine.remove_image(reference) {
            Ok(()) => {
                tracing::info!(image = %reference, "image deleted");
                Ok(())
            }
            Err(EngineError::NotFound { .. }) => {
                tracing::debug!(image = %reference, "image already absent");
                Ok(())
            }
            Err(other) => Err(boundary::image_delete_error(reference, other)),
        }
    }

    /// Lists the repo tags of all platform application images. Failures
    /// are logged and degrade to an empty result.
    #[must_use]
    pub fn list_images(&self) -> Vec<String> {
        let label = constants::APPLICATION_IMAGE_LABEL;
        match self.engine.list_images(Some(label)) {
            Ok(images) => images.into_iter().flat_map(|i| i.repo_tags).collect(),
            Err(e) => {
                tracing::error!(error = %e, "image listing failed");
                Vec::new()
            }
        }
    }

    fn create_runtime_volume(&self, name: &str) -> Result<()> {
        match self.engine.create_volume(name, constants::RUNTIME_VOLUME_KIND) {
            Ok(()) => {
                tracing::info!(name = %name, "runtime volume created");
                Ok(())
            }
            // Re-provisioning an existing volume keeps create idempotent
            // at the volume level.
            Err(EngineError::Conflict { .. }) => {
                tracing::debug!(name = %name, "runtime volume already present");
                Ok(())
            }
            Err(other) => Err(boundary::fault(other)),
        }
    }

    fn default_deadline(&self) -> Option<Duration> {
        self.config.exec_timeout_secs.map(Duration::from_secs)
    }
}
