//! Deterministic container spec construction.
//!
//! Pure functions with no engine access: merging volumes, injecting proxy
//! variables, deriving port bindings, and validating the result. Volume
//! provisioning itself happens in the lifecycle orchestrator before the
//! spec is submitted.

use dockhand_common::config::OrchestratorConfig;
use dockhand_common::constants;
use dockhand_common::error::{DockhandError, Result};
use dockhand_common::types::{ModulePort, User};
use dockhand_engine::ContainerSpec;

/// Builds the spec for a primary application server container.
///
/// When `include_main_volume` is set, the mandatory persistent mount
/// `<name>:/opt/cloudunit:rw` is merged into the caller's volumes. For
/// application-server images the fixed bootstrap arguments
/// `run <login> <password>` are emitted; this path never carries port
/// bindings.
///
/// # Errors
///
/// `InvalidSpec` on an empty name or a malformed volume triple.
pub fn server_spec(
    name: &str,
    image_path: &str,
    image_subtype: Option<&str>,
    user: &User,
    envs: Vec<String>,
    include_main_volume: bool,
    volumes: Vec<String>,
    application_server: bool,
    config: &OrchestratorConfig,
) -> Result<ContainerSpec> {
    let mut spec = base_spec(name, image_path, envs, include_main_volume, volumes, config)?;
    spec.image_subtype = image_subtype.map(ToOwned::to_owned);
    if application_server {
        spec.args = vec![
            constants::APPLICATION_SERVER_BOOT_ARG.to_owned(),
            user.login.clone(),
            user.password.clone(),
        ];
    }
    Ok(spec)
}

/// Builds the spec for a module (attached service) container.
///
/// Only ports flagged `opened` are forwarded, keyed `"<port>/tcp"`; the
/// others are simply not bound. Module specs never carry bootstrap
/// arguments.
///
/// # Errors
///
/// `InvalidSpec` on an empty name or a malformed volume triple.
pub fn module_spec(
    name: &str,
    image_path: &str,
    ports: &[ModulePort],
    envs: Vec<String>,
    include_main_volume: bool,
    volumes: Vec<String>,
    config: &OrchestratorConfig,
) -> Result<ContainerSpec> {
    let mut spec = base_spec(name, image_path, envs, include_main_volume, volumes, config)?;
    spec.port_bindings = ports
        .iter()
        .filter(|port| port.opened)
        .map(|port| {
            (
                format!("{}/tcp", port.container_value),
                port.host_value.to_string(),
            )
        })
        .collect();
    Ok(spec)
}

fn base_spec(
    name: &str,
    image_path: &str,
    mut envs: Vec<String>,
    include_main_volume: bool,
    mut volumes: Vec<String>,
    config: &OrchestratorConfig,
) -> Result<ContainerSpec> {
    if name.is_empty() {
        return Err(DockhandError::InvalidSpec {
            message: "container name is empty".to_owned(),
        });
    }
    if include_main_volume {
        volumes.push(main_volume_mount(name));
    }
    for volume in &volumes {
        validate_volume(volume)?;
    }

    // Proxy variables are appended, never deduplicated against caller
    // entries of the same key; the engine's precedence applies when both
    // are present.
    if let Some(proxy) = config.proxy() {
        envs.push(format!("http_proxy={proxy}"));
        envs.push(format!("https_proxy={proxy}"));
        envs.push(format!("ftp_proxy={proxy}"));
    }

    let volumes_from = if config.monitoring_agent_present {
        vec![constants::MONITORING_AGENT_CONTAINER.to_owned()]
    } else {
        Vec::new()
    };

    Ok(ContainerSpec {
        name: name.to_owned(),
        image: image_path.to_owned(),
        image_subtype: None,
        env: envs,
        volumes,
        volumes_from,
        args: Vec::new(),
        port_bindings: std::collections::BTreeMap::new(),
        network_alias: config.network_alias.clone(),
        domain_suffix: config.domain_suffix.clone(),
    })
}

/// Renders the mandatory persistent mount triple for a container name.
#[must_use]
pub fn main_volume_mount(name: &str) -> String {
    format!(
        "{name}:{}:{}",
        constants::MAIN_VOLUME_MOUNT,
        constants::MAIN_VOLUME_MODE
    )
}

fn validate_volume(volume: &str) -> Result<()> {
    let parts: Vec<&str> = volume.split(':').collect();
    let valid = matches!(parts.as_slice(),
        [name, mount, mode] if !name.is_empty()
            && mount.starts_with('/')
            && matches!(*mode, "rw" | "ro"));
    if valid {
        Ok(())
    } else {
        Err(DockhandError::InvalidSpec {
            message: format!("malformed volume triple {volume:?}, expected name:/mount/path:rw|ro"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            login: "john".into(),
            password: "secret".into(),
        }
    }

    fn config() -> OrchestratorConfig {
        OrchestratorConfig {
            domain_suffix: ".cu.example".into(),
            ..OrchestratorConfig::default()
        }
    }

    #[test]
    fn server_spec_merges_main_volume_mount() {
        let spec = server_spec(
            "web1",
            "/images/tomcat",
            Some("tomcat8"),
            &user(),
            Vec::new(),
            true,
            vec!["data:/var/data:ro".into()],
            true,
            &config(),
        )
        .unwrap();
        assert!(spec.volumes.contains(&"data:/var/data:ro".to_owned()));
        assert!(spec.volumes.contains(&"web1:/opt/cloudunit:rw".to_owned()));
    }

    #[test]
    fn server_spec_without_main_volume_keeps_caller_volumes_only() {
        let spec = server_spec(
            "web1",
            "/images/tomcat",
            None,
            &user(),
            Vec::new(),
            false,
            vec!["data:/var/data:rw".into()],
            false,
            &config(),
        )
        .unwrap();
        assert_eq!(spec.volumes, vec!["data:/var/data:rw".to_owned()]);
    }

    #[test]
    fn application_server_gets_bootstrap_args() {
        let spec = server_spec(
            "web1",
            "/images/tomcat",
            Some("tomcat8"),
            &user(),
            Vec::new(),
            true,
            Vec::new(),
            true,
            &config(),
        )
        .unwrap();
        assert_eq!(spec.args, vec!["run", "john", "secret"]);
        assert!(spec.port_bindings.is_empty());
    }

    #[test]
    fn plain_server_gets_no_args() {
        let spec = server_spec(
            "web1",
            "/images/static",
            None,
            &user(),
            Vec::new(),
            true,
            Vec::new(),
            false,
            &config(),
        )
        .unwrap();
        assert!(spec.args.is_empty());
    }

    #[test]
    fn module_spec_binds_opened_ports_only() {
        let ports = vec![
            ModulePort {
                container_value: 5432,
                host_value: 15432,
                opened: true,
            },
            ModulePort {
                container_value: 5433,
                host_value: 15433,
                opened: false,
            },
        ];
        let spec = module_spec(
            "db1",
            "/images/postgres",
            &ports,
            Vec::new(),
            true,
            Vec::new(),
            &config(),
        )
        .unwrap();
        assert_eq!(
            spec.port_bindings.get("5432/tcp").map(String::as_str),
            Some("15432")
        );
        assert!(!spec.port_bindings.contains_key("5433/tcp"));
        assert!(spec.args.is_empty());
    }

    #[test]
    fn proxy_injection_appends_without_dedup() {
        let mut config = config();
        config.http_proxy = Some("http://proxy:3128".into());
        let spec = server_spec(
            "web1",
            "/images/tomcat",
            None,
            &user(),
            vec!["http_proxy=http://caller:8080".into()],
            false,
            Vec::new(),
            false,
            &config,
        )
        .unwrap();
        // Caller entry first, injected entries appended; both survive.
        assert_eq!(spec.env[0], "http_proxy=http://caller:8080");
        assert!(spec.env.contains(&"http_proxy=http://proxy:3128".to_owned()));
        assert!(spec.env.contains(&"https_proxy=http://proxy:3128".to_owned()));
        assert!(spec.env.contains(&"ftp_proxy=http://proxy:3128".to_owned()));
    }

    #[test]
    fn no_proxy_injection_when_unset() {
        let spec = server_spec(
            "web1",
            "/images/tomcat",
            None,
            &user(),
            Vec::new(),
            false,
            Vec::new(),
            false,
            &config(),
        )
        .unwrap();
        assert!(spec.env.is_empty());
    }

    #[test]
    fn monitoring_agent_adds_volumes_from() {
        let mut config = config();
        config.monitoring_agent_present = true;
        let spec = server_spec(
            "web1",
            "/images/tomcat",
            None,
            &user(),
            Vec::new(),
            false,
            Vec::new(),
            false,
            &config,
        )
        .unwrap();
        assert_eq!(spec.volumes_from, vec!["cu-monitoring-agents"]);
    }

    #[test]
    fn empty_name_is_rejected() {
        let result = server_spec(
            "",
            "/images/tomcat",
            None,
            &user(),
            Vec::new(),
            false,
            Vec::new(),
            false,
            &config(),
        );
        assert!(matches!(result, Err(DockhandError::InvalidSpec { .. })));
    }

    #[test]
    fn volume_without_mode_is_rejected() {
        let result = server_spec(
            "web1",
            "/images/tomcat",
            None,
            &user(),
            Vec::new(),
            false,
            vec!["data:/var/data".into()],
            false,
            &config(),
        );
        assert!(matches!(result, Err(DockhandError::InvalidSpec { .. })));
    }

    #[test]
    fn volume_with_bad_mode_is_rejected() {
        let result = server_spec(
            "web1",
            "/images/tomcat",
            None,
            &user(),
            Vec::new(),
            false,
            vec!["data:/var/data:rwx".into()],
            false,
            &config(),
        );
        assert!(matches!(result, Err(DockhandError::InvalidSpec { .. })));
    }

    #[test]
    fn spec_carries_network_alias_and_domain() {
        let spec = module_spec(
            "db1",
            "/images/postgres",
            &[],
            Vec::new(),
            false,
            Vec::new(),
            &config(),
        )
        .unwrap();
        assert_eq!(spec.network_alias, "skynet");
        assert_eq!(spec.domain_suffix, ".cu.example");
    }
}
