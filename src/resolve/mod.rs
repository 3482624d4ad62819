//! Resolution of merged configuration into the values written to disk.
//!
//! [`resolve`] runs once per invocation. It validates the engine selection,
//! splits list-valued inputs, fills directory defaults from `HOME`, settles
//! the gateway token, and consults the [`HostProbe`] for any engine field
//! the user did not override. The result is immutable.

use camino::Utf8PathBuf;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::{AppConfig, ContainerEngine};
use crate::error::{ConfigError, Result};
use crate::probe::{HostPlatform, HostProbe};

/// Bind-mount suffix relabelling content for `SELinux`.
pub const SELINUX_RELABEL: &str = ":Z";

/// Container user used for rootless Podman, mapped to the host user.
pub const ROOTLESS_USER: &str = "0:0";

/// Host-side inputs that do not come from configuration.
pub struct ResolveContext<'a, P: HostProbe> {
    /// Operating system the setup runs on.
    pub platform: HostPlatform,
    /// Capability probes, consulted only for Podman on Linux.
    pub probe: &'a P,
    /// The invoking user's home directory.
    pub home_dir: Option<Utf8PathBuf>,
    /// Gateway token found in an existing `.env`, if any.
    pub previous_token: Option<String>,
}

/// Fully resolved setup configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Engine that builds and runs the deployment.
    pub container_engine: ContainerEngine,
    /// Image tag.
    pub image: String,
    /// Space-separated apt packages, verbatim.
    pub apt_packages: String,
    /// Extra mount specs, trimmed, empties dropped.
    pub extra_mounts: Vec<String>,
    /// The extra-mounts input as given.
    pub extra_mounts_raw: String,
    /// Home volume name or host path, when set.
    pub home_volume: Option<String>,
    /// The home-volume input as given.
    pub home_volume_raw: String,
    /// Suffix appended to generated bind mounts.
    pub bind_mount_options: String,
    /// Container user as `uid:gid`, when one applies.
    pub container_user: Option<String>,
    /// Whether Podman was detected as rootless.
    pub is_rootless: bool,
    /// Whether `SELinux` was detected as enforcing.
    pub selinux_enforcing: bool,
    /// Gateway host port.
    pub gateway_port: u16,
    /// Bridge host port.
    pub bridge_port: u16,
    /// Gateway bind mode.
    pub gateway_bind: String,
    /// Gateway authentication token.
    pub gateway_token: String,
    /// Host directory mounted as the gateway configuration.
    pub config_dir: Utf8PathBuf,
    /// Host directory mounted as the agent workspace.
    pub workspace_dir: Utf8PathBuf,
}

impl ResolvedConfig {
    /// The home volume when it names a volume rather than a host path.
    #[must_use]
    pub fn named_home_volume(&self) -> Option<&str> {
        self.home_volume
            .as_deref()
            .filter(|volume| !volume.contains('/'))
    }
}

/// Derive the [`ResolvedConfig`] for this invocation.
///
/// # Errors
///
/// Returns `ConfigError::UnsupportedEngine` for an unrecognised engine, and
/// `ConfigError::MissingRequired` when a directory is unset and `HOME` is
/// unknown.
pub fn resolve<P: HostProbe>(
    config: &AppConfig,
    ctx: &ResolveContext<'_, P>,
) -> Result<ResolvedConfig> {
    let container_engine = ContainerEngine::from_setting(config.container_engine.as_deref())?;
    let (config_dir, workspace_dir) = resolve_dirs(config, ctx.home_dir.as_ref())?;

    let detect = container_engine == ContainerEngine::Podman && ctx.platform.is_linux();
    let overrides = &config.engine;

    let is_rootless = detect
        && overrides.container_user.is_none()
        && ctx.probe.podman_rootless().is_enabled("podman rootless");
    let selinux_enforcing = detect
        && overrides.bind_mount_options.is_none()
        && ctx.probe.selinux_enforcing().is_enabled("selinux");

    let bind_mount_options = overrides.bind_mount_options.clone().unwrap_or_else(|| {
        if selinux_enforcing {
            String::from(SELINUX_RELABEL)
        } else {
            String::new()
        }
    });

    let container_user = match overrides.container_user.as_deref() {
        Some(user) => Some(user.to_owned()).filter(|value| !value.is_empty()),
        None if !detect => None,
        None if is_rootless => Some(String::from(ROOTLESS_USER)),
        None => ctx.probe.identity().map(|identity| identity.to_string()),
    };

    debug!(
        engine = %container_engine,
        is_rootless,
        selinux_enforcing,
        bind_mount_options = %bind_mount_options,
        container_user = container_user.as_deref().unwrap_or(""),
        "resolved engine settings"
    );

    let home_volume_raw = config.mounts.home_volume.clone();
    let home_volume = Some(home_volume_raw.trim())
        .filter(|volume| !volume.is_empty())
        .map(str::to_owned);

    Ok(ResolvedConfig {
        container_engine,
        image: config.image_or_default().to_owned(),
        apt_packages: config.build.apt_packages.clone(),
        extra_mounts: split_mounts(&config.mounts.extra_mounts),
        extra_mounts_raw: config.mounts.extra_mounts.clone(),
        home_volume,
        home_volume_raw,
        bind_mount_options,
        container_user,
        is_rootless,
        selinux_enforcing,
        gateway_port: config.gateway.port,
        bridge_port: config.gateway.bridge_port,
        gateway_bind: config.gateway.bind.clone(),
        gateway_token: resolve_token(
            config.gateway.token.as_deref(),
            ctx.previous_token.as_deref(),
        ),
        config_dir,
        workspace_dir,
    })
}

/// Split a comma-separated mount list, trimming entries and dropping empties.
#[must_use]
pub fn split_mounts(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|mount| !mount.is_empty())
        .map(str::to_owned)
        .collect()
}

fn resolve_dirs(
    config: &AppConfig,
    home_dir: Option<&Utf8PathBuf>,
) -> Result<(Utf8PathBuf, Utf8PathBuf)> {
    let non_empty =
        |dir: &Option<Utf8PathBuf>| dir.clone().filter(|path| !path.as_str().is_empty());

    let config_dir = non_empty(&config.paths.config_dir)
        .or_else(|| home_dir.map(|home| home.join(".openclaw")))
        .ok_or_else(|| ConfigError::MissingRequired {
            field: String::from("paths.config_dir (set OPENCLAW_CONFIG_DIR or HOME)"),
        })?;
    let workspace_dir = non_empty(&config.paths.workspace_dir)
        .or_else(|| home_dir.map(|home| home.join(".openclaw").join("workspace")))
        .ok_or_else(|| ConfigError::MissingRequired {
            field: String::from("paths.workspace_dir (set OPENCLAW_WORKSPACE_DIR or HOME)"),
        })?;

    Ok((config_dir, workspace_dir))
}

fn resolve_token(configured: Option<&str>, previous: Option<&str>) -> String {
    let pick = |token: Option<&str>| {
        token
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_owned)
    };

    pick(configured).or_else(|| pick(previous)).unwrap_or_else(|| {
        info!("generating a new gateway token");
        generate_token()
    })
}

/// A fresh 64-character lowercase hex token.
#[must_use]
pub fn generate_token() -> String {
    format!(
        "{}{}",
        Uuid::new_v4().simple(),
        Uuid::new_v4().simple()
    )
}
