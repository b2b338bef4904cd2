//! Records returned by the engine facade.
//!
//! Field shapes follow the engine's inspect payloads; the orchestrator's
//! mapper projects them onto platform domain objects.

use serde::{Deserialize, Serialize};

/// Identifier of a created-but-not-yet-started exec instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExecId(pub String);

impl ExecId {
    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Options for creating an exec instance inside a running container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOptions {
    /// Run detached: the engine does not stream output back.
    pub detach: bool,
    /// Attach the command's stdout to the returned stream.
    pub attach_stdout: bool,
    /// Attach the command's stderr to the returned stream.
    pub attach_stderr: bool,
    /// Effective user inside the container; `None` keeps the image default.
    pub user: Option<String>,
}

/// Runtime state section of a container inspection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateRecord {
    /// Whether the container's main process is running.
    pub running: bool,
    /// Engine status string (`created`, `running`, `exited`, ...).
    pub status: String,
    /// Exit code of the main process once it has exited.
    pub exit_code: i64,
}

/// Static configuration section of a container inspection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigRecord {
    /// Declared environment, one `KEY=VALUE` entry per element.
    pub env: Vec<String>,
}

/// Full inspection record for one container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerRecord {
    /// Engine-assigned container id.
    pub id: String,
    /// Container name as registered with the engine.
    pub name: String,
    /// Runtime state.
    pub state: StateRecord,
    /// Static configuration.
    pub config: ConfigRecord,
    /// ISO-8601 creation timestamp.
    pub created_at: String,
}

impl ContainerRecord {
    /// Looks up a declared environment variable by exact key.
    #[must_use]
    pub fn env_value(&self, variable: &str) -> Option<&str> {
        self.config
            .env
            .iter()
            .filter_map(|entry| entry.split_once('='))
            .find(|(key, _)| *key == variable)
            .map(|(_, value)| value)
    }
}

/// Summary entry from an image listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSummary {
    /// All `repository:tag` names pointing at this image.
    pub repo_tags: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with_env(env: &[&str]) -> ContainerRecord {
        ContainerRecord {
            config: ConfigRecord {
                env: env.iter().map(|e| (*e).to_owned()).collect(),
            },
            ..ContainerRecord::default()
        }
    }

    #[test]
    fn env_value_matches_exact_key() {
        let record = record_with_env(&["CU_MODULE_PORT=5432", "PATH=/usr/bin"]);
        assert_eq!(record.env_value("CU_MODULE_PORT"), Some("5432"));
    }

    #[test]
    fn env_value_ignores_prefix_collisions() {
        let record = record_with_env(&["CU_MODULE_PORT_PROTO=tcp", "CU_MODULE_PORT=5432"]);
        assert_eq!(record.env_value("CU_MODULE_PORT"), Some("5432"));
    }

    #[test]
    fn env_value_absent_is_none() {
        let record = record_with_env(&["PATH=/usr/bin"]);
        assert_eq!(record.env_value("CU_MODULE_PORT"), None);
    }

    #[test]
    fn env_value_keeps_equals_in_value() {
        let record = record_with_env(&["JAVA_OPTS=-Da=b"]);
        assert_eq!(record.env_value("JAVA_OPTS"), Some("-Da=b"));
    }
}
