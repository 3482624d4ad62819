//! The full setup flow: generate files, build, onboard, start.

use std::fmt;

use camino::Utf8PathBuf;
use tracing::info;

use super::SetupParams;
use super::generate::generate;
use crate::config::ContainerEngine;
use crate::engine::{BuildRequest, CLI_SERVICE, CommandRunner, EngineCli, GATEWAY_SERVICE};
use crate::error::Result;
use crate::output::{COMPOSE_BASE_NAME, DOCKERFILE_NAME, ProjectDir};
use crate::probe::HostProbe;

/// Summary printed once the gateway is running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupReport {
    /// Host directory holding the gateway configuration.
    pub config_dir: Utf8PathBuf,
    /// Host directory holding the agent workspace.
    pub workspace_dir: Utf8PathBuf,
    /// Token the CLI uses to reach the gateway.
    pub gateway_token: String,
    /// `<engine> compose -f ...` prefix matching the files actually used.
    pub compose_hint: String,
}

impl SetupReport {
    /// Follow-up commands for inspecting and using the deployment.
    #[must_use]
    pub fn follow_up_commands(&self) -> [String; 3] {
        let hint = &self.compose_hint;
        [
            format!("{hint} logs -f {GATEWAY_SERVICE}"),
            format!("{hint} run --rm {CLI_SERVICE} channels login"),
            format!(
                "{hint} exec {GATEWAY_SERVICE} node dist/index.js health --token \"{}\"",
                self.gateway_token
            ),
        ]
    }
}

impl fmt::Display for SetupReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Gateway running.")?;
        writeln!(f, "Config: {}", self.config_dir)?;
        writeln!(f, "Workspace: {}", self.workspace_dir)?;
        writeln!(f, "Token: {}", self.gateway_token)?;
        writeln!(f)?;
        writeln!(f, "Commands:")?;
        for command in self.follow_up_commands() {
            writeln!(f, "  {command}")?;
        }
        Ok(())
    }
}

/// Generate the files, build the image, run onboarding and start the
/// gateway.
///
/// The engine and the project's `Dockerfile` and `docker-compose.yml` are
/// checked before anything is written.
///
/// # Errors
///
/// Returns:
/// - `ConfigError::UnsupportedEngine` for an unrecognised engine.
/// - `EngineError::MissingDependency` if the engine or its `compose`
///   subcommand is unavailable.
/// - `FilesystemError::NotFound` if a project file is missing.
/// - `EngineError::SubprocessFailed` if build or compose exits non-zero.
pub fn setup<R, P, E>(params: &SetupParams<'_, R, P, E>) -> Result<SetupReport>
where
    R: CommandRunner,
    P: HostProbe,
    E: mockable::Env,
{
    let engine = ContainerEngine::from_setting(params.config.container_engine.as_deref())?;
    let cli = EngineCli::new(params.runner, engine);
    cli.ensure_available()?;

    let project = ProjectDir::open(params.project_dir)?;
    project.require(DOCKERFILE_NAME)?;
    project.require(COMPOSE_BASE_NAME)?;

    let generated = generate(params)?;
    let resolved = &generated.resolved;

    cli.build_image(&BuildRequest {
        image: &resolved.image,
        apt_packages: &resolved.apt_packages,
        context: project.root(),
    })?;

    info!("running onboarding");
    cli.onboard(&generated.compose_files)?;

    info!("starting gateway");
    cli.start_gateway(&generated.compose_files)?;

    Ok(SetupReport {
        config_dir: resolved.config_dir.clone(),
        workspace_dir: resolved.workspace_dir.clone(),
        gateway_token: resolved.gateway_token.clone(),
        compose_hint: generated.compose_files.hint(engine),
    })
}
