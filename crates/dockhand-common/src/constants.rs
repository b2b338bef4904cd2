//! Platform-wide constants.

/// Mount point of the per-container persistent volume.
pub const MAIN_VOLUME_MOUNT: &str = "/opt/cloudunit";

/// Mode of the main persistent volume mount.
pub const MAIN_VOLUME_MODE: &str = "rw";

/// Volume kind passed to the engine when provisioning runtime volumes.
pub const RUNTIME_VOLUME_KIND: &str = "runtime";

/// Environment variable every module image must declare for its
/// application port.
pub const MODULE_PORT_VARIABLE: &str = "CU_MODULE_PORT";

/// Name of the monitoring-agent container whose volumes are shared into
/// workload containers when the agent is deployed.
pub const MONITORING_AGENT_CONTAINER: &str = "cu-monitoring-agents";

/// Network alias workload containers attach to.
pub const DEFAULT_NETWORK_ALIAS: &str = "skynet";

/// In-container script invoked (privileged) to persist an environment
/// variable across restarts.
pub const ADD_ENV_SCRIPT: &str = "/opt/cloudunit/appconf/tools/add-env.sh";

/// Marker in command output that triggers the single privileged retry.
pub const PERMISSION_DENIED_MARKER: &str = "Permission denied";

/// Label selecting platform application images in the engine's image list.
pub const APPLICATION_IMAGE_LABEL: (&str, &str) = ("origin", "application");

/// Bootstrap verb passed to application-server entry points.
pub const APPLICATION_SERVER_BOOT_ARG: &str = "run";
