//! Configuration system for openclaw-setup.
//!
//! This module provides the configuration structures and CLI definitions.
//! Layer merging is handled by the `ortho_config` crate: CLI flags override
//! `OPENCLAW_*` environment variables, which override a configuration file,
//! which overrides defaults.
//!
//! # Example Configuration
//!
//! ```toml
//! container_engine = "podman"
//! image = "openclaw:local"
//!
//! [engine]
//! bind_mount_options = ":Z"
//!
//! [build]
//! apt_packages = "ffmpeg build-essential"
//!
//! [mounts]
//! extra_mounts = "/srv/models:/models:ro"
//! home_volume = "openclaw-home"
//!
//! [gateway]
//! port = 18789
//! bind = "lan"
//!
//! [paths]
//! config_dir = "/home/user/.openclaw"
//! ```

mod cli;
mod loader;
mod types;

#[cfg(test)]
mod tests;

pub use cli::{Cli, Commands};
pub use loader::{env_var_names, load_config};
pub use types::{
    AppConfig, BuildConfig, ContainerEngine, DEFAULT_IMAGE, EngineConfig, GatewayConfig,
    MountConfig, PathsConfig,
};
