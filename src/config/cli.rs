//! Command-line argument definitions for openclaw-setup.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

use super::ContainerEngine;

/// Command-line interface for openclaw-setup.
#[derive(Debug, Parser)]
#[command(name = "openclaw-setup")]
#[command(
    author,
    version,
    about = "Prepare a local Docker or Podman deployment of the OpenClaw gateway"
)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Directory containing `Dockerfile` and `docker-compose.yml`.
    #[arg(long, global = true, default_value = ".")]
    pub project_dir: Utf8PathBuf,

    /// Path to configuration file.
    #[arg(long, global = true)]
    pub config: Option<Utf8PathBuf>,

    /// Container engine to use.
    #[arg(long, global = true, value_enum)]
    pub engine: Option<ContainerEngine>,

    /// Image tag to build and run.
    #[arg(long, global = true)]
    pub image: Option<String>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Write `.env` and the compose override, build the image, run onboarding
    /// and start the gateway.
    Setup,

    /// Write `.env` and the compose override only.
    Generate,
}
