//! Orchestration API for openclaw-setup commands.
//!
//! This module provides one public orchestration function per command:
//! [`generate`] writes `.env` and the compose override, and [`setup`]
//! additionally builds the image, runs onboarding and starts the gateway.
//! The CLI binary is a thin adapter over these functions.
//!
//! Both functions accept library-owned types (not clap types), reach the
//! host only through the [`CommandRunner`], [`HostProbe`] and
//! `mockable::Env` seams, and never print to stdout or exit the process.

mod generate;
mod setup;

pub use generate::{GeneratedFiles, generate};
pub use setup::{SetupReport, setup};

use camino::Utf8Path;

use crate::config::AppConfig;
use crate::engine::CommandRunner;
use crate::probe::{HostPlatform, HostProbe};

/// Parameters shared by [`generate`] and [`setup`].
///
/// Groups the arguments into a single struct to satisfy the "no more than
/// four parameters" convention.
pub struct SetupParams<'a, R: CommandRunner, P: HostProbe, E: mockable::Env> {
    /// Merged application configuration.
    pub config: &'a AppConfig,
    /// Directory holding `Dockerfile` and `docker-compose.yml`; the generated
    /// files are written here.
    pub project_dir: &'a Utf8Path,
    /// Host operating system.
    pub platform: HostPlatform,
    /// Runner for the engine binary.
    pub runner: &'a R,
    /// Host capability probes.
    pub probe: &'a P,
    /// Environment provider, used for `HOME`.
    pub env: &'a E,
}
