//! Container specification submitted to the engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Everything the engine needs to create one container.
///
/// Built per request by the orchestrator's spec builder and discarded after
/// submission; never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSpec {
    /// Unique, platform-assigned container name. Never empty.
    pub name: String,
    /// Image reference the container is created from.
    pub image: String,
    /// Optional image subtype selecting a variant inside the image family.
    pub image_subtype: Option<String>,
    /// Ordered `KEY=VALUE` environment entries. Duplicate keys are passed
    /// through as-is; precedence is the engine's concern.
    pub env: Vec<String>,
    /// Volume mounts as `volumeName:mountPath:mode` triples.
    pub volumes: Vec<String>,
    /// Names of containers whose volumes are shared into this one.
    pub volumes_from: Vec<String>,
    /// Launch arguments appended to the image entry point.
    pub args: Vec<String>,
    /// Port bindings keyed `"<containerPort>/<proto>"`, value is the host
    /// port. Ordered map so specs compare and render deterministically.
    pub port_bindings: BTreeMap<String, String>,
    /// Network alias the container attaches under.
    pub network_alias: String,
    /// Domain suffix for the container's hostname.
    pub domain_suffix: String,
}
