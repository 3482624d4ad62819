//! Configuration data types for openclaw-setup.

use std::fmt;
use std::str::FromStr;

use camino::Utf8PathBuf;
use clap::ValueEnum;
use ortho_config::{OrthoConfig, OrthoResult, PostMergeContext, PostMergeHook};
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;

use crate::error::ConfigError;

/// Default image tag built and run by the setup flow.
pub const DEFAULT_IMAGE: &str = "openclaw:local";

/// The container engine that builds and runs the deployment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerEngine {
    /// Docker with the `compose` plugin.
    #[default]
    Docker,
    /// Podman with `podman compose`.
    Podman,
}

impl ContainerEngine {
    /// The executable name, also the value written to `.env`.
    #[must_use]
    pub const fn binary(self) -> &'static str {
        match self {
            Self::Docker => "docker",
            Self::Podman => "podman",
        }
    }

    /// Parse an optional raw engine value.
    ///
    /// Unset and empty (after trimming) values select Docker.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnsupportedEngine` for any value other than
    /// `docker` or `podman` (case-insensitive).
    pub fn from_setting(raw: Option<&str>) -> Result<Self, ConfigError> {
        match raw.map(str::trim).filter(|value| !value.is_empty()) {
            None => Ok(Self::default()),
            Some(value) => value.parse(),
        }
    }
}

impl FromStr for ContainerEngine {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "docker" => Ok(Self::Docker),
            "podman" => Ok(Self::Podman),
            _ => Err(ConfigError::UnsupportedEngine {
                value: value.to_owned(),
            }),
        }
    }
}

impl fmt::Display for ContainerEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary())
    }
}

/// Engine-level overrides that bypass host detection.
///
/// `None` means "detect". `Some("")` is an explicit request for no bind-mount
/// suffix or no user mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Suffix appended to generated bind mounts, such as `:Z`.
    pub bind_mount_options: Option<String>,

    /// Container user as `uid:gid`.
    pub container_user: Option<String>,
}

/// Image build configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Space-separated apt packages baked into the image.
    pub apt_packages: String,
}

/// Additional mounts for the gateway and CLI services.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct MountConfig {
    /// Comma-separated compose volume specs.
    pub extra_mounts: String,

    /// Named volume or host path mounted as the container home directory.
    pub home_volume: String,
}

/// Gateway service settings passed through to compose.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, SmartDefault)]
#[serde(default)]
pub struct GatewayConfig {
    /// Shared secret the CLI uses to authenticate with the gateway.
    pub token: Option<String>,

    /// Host port published for the gateway.
    #[default = 18789]
    pub port: u16,

    /// Host port published for the bridge.
    #[default = 18790]
    pub bridge_port: u16,

    /// Gateway bind mode.
    #[default(String::from("lan"))]
    pub bind: String,
}

/// Host directories shared with the containers.
///
/// Unset directories default to `$HOME/.openclaw` and
/// `$HOME/.openclaw/workspace` during resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding the gateway configuration.
    pub config_dir: Option<Utf8PathBuf>,

    /// Directory holding the agent workspace.
    pub workspace_dir: Option<Utf8PathBuf>,
}

/// Root application configuration.
///
/// Layers merge with increasing precedence: defaults, configuration file,
/// `OPENCLAW_*` environment variables, command-line arguments.
///
/// Configuration files are discovered in this order:
/// 1. Path given with `--config`
/// 2. Path in the `OPENCLAW_SETUP_CONFIG_PATH` environment variable
/// 3. `.openclaw-setup.toml` in the current or home directory
/// 4. `~/.config/openclaw-setup/config.toml`
#[derive(Debug, Clone, Default, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(
    prefix = "OPENCLAW",
    post_merge_hook,
    discovery(
        app_name = "openclaw-setup",
        env_var = "OPENCLAW_SETUP_CONFIG_PATH",
        config_file_name = "config.toml",
        dotfile_name = ".openclaw-setup.toml",
        config_cli_long = "config",
        config_cli_visible = true,
    )
)]
pub struct AppConfig {
    /// Raw container engine selection; parsed during resolution.
    pub container_engine: Option<String>,

    /// Image tag to build and run.
    pub image: Option<String>,

    /// Engine overrides.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub engine: EngineConfig,

    /// Image build configuration.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub build: BuildConfig,

    /// Mount configuration.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub mounts: MountConfig,

    /// Gateway configuration.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub gateway: GatewayConfig,

    /// Host directory configuration.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub paths: PathsConfig,
}

impl AppConfig {
    /// The image tag, falling back to [`DEFAULT_IMAGE`] when unset or empty.
    #[must_use]
    pub fn image_or_default(&self) -> &str {
        self.image
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or(DEFAULT_IMAGE)
    }
}

impl PostMergeHook for AppConfig {
    fn post_merge(&mut self, _ctx: &PostMergeContext) -> OrthoResult<()> {
        // A blank token means "reuse or generate one".
        if self
            .gateway
            .token
            .as_deref()
            .is_some_and(|token| token.trim().is_empty())
        {
            self.gateway.token = None;
        }
        Ok(())
    }
}
