//! The `docker-compose.extra.yml` override document.

use super::yaml::{self, Mapping, Node};
use crate::engine::{CLI_SERVICE, GATEWAY_SERVICE};
use crate::resolve::ResolvedConfig;

/// Container path of the node user's home directory.
const CONTAINER_HOME: &str = "/home/node";

/// Container path of the gateway configuration directory.
const CONTAINER_CONFIG_DIR: &str = "/home/node/.openclaw";

/// Container path of the agent workspace.
const CONTAINER_WORKSPACE_DIR: &str = "/home/node/.openclaw/workspace";

/// Compose override layering mounts and the container user onto both
/// services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeOverride {
    document: Mapping,
}

impl ComposeOverride {
    /// Build the override for `resolved`.
    #[must_use]
    pub fn from_resolved(resolved: &ResolvedConfig) -> Self {
        let mounts = service_mounts(resolved);

        let mut services = Mapping::new();
        for name in [GATEWAY_SERVICE, CLI_SERVICE] {
            let mut service = Mapping::new();
            if !mounts.is_empty() {
                service.insert(
                    "volumes",
                    Node::Sequence(mounts.iter().cloned().map(Node::Scalar).collect()),
                );
            }
            if let Some(ref user) = resolved.container_user {
                service.insert("user", Node::scalar(user.as_str()));
            }
            if !service.is_empty() {
                services.insert(name, Node::Mapping(service));
            }
        }

        let mut document = Mapping::new();
        if !services.is_empty() {
            document.insert("services", Node::Mapping(services));
        }
        if let Some(volume) = resolved.named_home_volume() {
            let mut volumes = Mapping::new();
            volumes.insert(volume, Node::Mapping(Mapping::new()));
            document.insert("volumes", Node::Mapping(volumes));
        }

        Self { document }
    }

    /// Whether the override changes anything, and so is worth passing to
    /// compose.
    #[must_use]
    pub fn declares_anything(&self) -> bool {
        !self.document.is_empty()
    }

    /// The underlying document.
    #[must_use]
    pub const fn document(&self) -> &Mapping {
        &self.document
    }

    /// Serialise the override as YAML.
    #[must_use]
    pub fn to_yaml(&self) -> String {
        yaml::to_string(&self.document)
    }
}

fn service_mounts(resolved: &ResolvedConfig) -> Vec<String> {
    let options = &resolved.bind_mount_options;
    let mut mounts = Vec::with_capacity(3 + resolved.extra_mounts.len());

    if let Some(ref home) = resolved.home_volume {
        mounts.push(format!("{home}:{CONTAINER_HOME}{options}"));
        mounts.push(format!(
            "{}:{CONTAINER_CONFIG_DIR}{options}",
            resolved.config_dir
        ));
        mounts.push(format!(
            "{}:{CONTAINER_WORKSPACE_DIR}{options}",
            resolved.workspace_dir
        ));
    }
    mounts.extend(resolved.extra_mounts.iter().cloned());
    mounts
}
