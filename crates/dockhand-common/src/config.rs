//! Orchestrator configuration model.

use serde::{Deserialize, Serialize};

use crate::constants;

/// Process-wide settings injected into every container spec the
/// orchestrator builds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Domain suffix appended to workload hostnames (e.g. `.cloud.example`).
    pub domain_suffix: String,
    /// Outbound proxy propagated into containers as `http_proxy`,
    /// `https_proxy` and `ftp_proxy`. Empty or absent disables injection.
    pub http_proxy: Option<String>,
    /// When true, workload containers mount the monitoring agent's volumes.
    pub monitoring_agent_present: bool,
    /// Network alias containers are attached under.
    pub network_alias: String,
    /// Default deadline for attached remote executions, in seconds.
    /// `None` means no implicit deadline.
    pub exec_timeout_secs: Option<u64>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            domain_suffix: String::new(),
            http_proxy: None,
            monitoring_agent_present: false,
            network_alias: constants::DEFAULT_NETWORK_ALIAS.to_owned(),
            exec_timeout_secs: None,
        }
    }
}

impl OrchestratorConfig {
    /// Returns the proxy value when one is configured and non-empty.
    #[must_use]
    pub fn proxy(&self) -> Option<&str> {
        self.http_proxy.as_deref().filter(|p| !p.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_no_proxy() {
        let config = OrchestratorConfig::default();
        assert!(config.proxy().is_none());
        assert!(!config.monitoring_agent_present);
    }

    #[test]
    fn empty_proxy_string_counts_as_absent() {
        let config = OrchestratorConfig {
            http_proxy: Some(String::new()),
            ..OrchestratorConfig::default()
        };
        assert!(config.proxy().is_none());
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = OrchestratorConfig {
            domain_suffix: ".cu.example".into(),
            http_proxy: Some("http://proxy:3128".into()),
            monitoring_agent_present: true,
            network_alias: "skynet".into(),
            exec_timeout_secs: Some(30),
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: OrchestratorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.proxy(), Some("http://proxy:3128"));
        assert_eq!(back.exec_timeout_secs, Some(30));
    }
}
