//! Domain primitive types shared across the Dockhand workspace.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DockhandError, Result};

/// Lifecycle state of a container as observed through the engine.
///
/// The orchestrator never tracks state on its own; these values are
/// projections of engine inspections at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContainerState {
    /// No container with this name exists yet.
    Uninitialized,
    /// Container has been created but not yet started.
    Created,
    /// Container is actively running.
    Running,
    /// Container was stopped gracefully.
    Stopped,
    /// Container was killed (forced termination).
    Killed,
    /// Container has been removed from the engine.
    Removed,
}

impl fmt::Display for ContainerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "uninitialized"),
            Self::Created => write!(f, "created"),
            Self::Running => write!(f, "running"),
            Self::Stopped => write!(f, "stopped"),
            Self::Killed => write!(f, "killed"),
            Self::Removed => write!(f, "removed"),
        }
    }
}

/// A `repository[:tag]` image reference. The tag defaults to `latest`
/// when rendered for a pull.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageRef {
    /// Repository component, e.g. `cloudunit/tomcat8`.
    pub repository: String,
    /// Optional tag component.
    pub tag: Option<String>,
}

impl ImageRef {
    /// Parses a `repository[:tag]` string.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSpec` if the repository component is empty.
    pub fn parse(reference: &str) -> Result<Self> {
        let (repository, tag) = match reference.rsplit_once(':') {
            // A colon inside a registry host port (e.g. `host:5000/img`)
            // is not a tag separator.
            Some((repo, tag)) if !tag.contains('/') => (repo, Some(tag.to_owned())),
            _ => (reference, None),
        };
        if repository.is_empty() {
            return Err(DockhandError::InvalidSpec {
                message: format!("image reference {reference:?} has no repository"),
            });
        }
        Ok(Self {
            repository: repository.to_owned(),
            tag,
        })
    }

    /// Renders the full reference, defaulting the tag to `latest`.
    #[must_use]
    pub fn reference(&self) -> String {
        let tag = self.tag.as_deref().unwrap_or("latest");
        format!("{}:{tag}", self.repository)
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reference())
    }
}

/// Platform account owning a workload. The login/password pair is forwarded
/// to application-server bootstrap scripts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Platform login.
    pub login: String,
    /// Platform password, passed to the in-container bootstrap.
    pub password: String,
}

/// Primary application workload backed by one container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    /// Platform-assigned name, also the backing container's name.
    pub name: String,
    /// Last observed lifecycle state.
    pub state: ContainerState,
    /// Engine-assigned container id, once known.
    pub container_id: Option<String>,
    /// Image the backing container was created from.
    pub image: String,
    /// Whether this server runs an application-server image and therefore
    /// takes the `run <login> <password>` bootstrap arguments.
    pub application_server: bool,
}

/// A declared port of a module workload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModulePort {
    /// Port inside the container.
    pub container_value: u16,
    /// Host port it maps to when opened.
    pub host_value: u16,
    /// Whether the port is exposed to the host at all.
    pub opened: bool,
}

/// Attached service workload (database, cache, ...) backed by one container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    /// Platform-assigned name, also the backing container's name.
    pub name: String,
    /// Last observed lifecycle state.
    pub state: ContainerState,
    /// Engine-assigned container id, once known.
    pub container_id: Option<String>,
    /// Image the backing container was created from.
    pub image: String,
    /// Declared ports; only `opened` ones are forwarded.
    pub ports: Vec<ModulePort>,
    /// Application port resolved from the container's environment on start.
    pub application_port: Option<u16>,
}
