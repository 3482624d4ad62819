//! Build and compose invocations against the engine binary.

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, info};

use super::runner::{CommandOutput, CommandRunner, Invocation};
use crate::config::ContainerEngine;
use crate::error::{EngineError, Result};

/// Compose service running the long-lived gateway.
pub const GATEWAY_SERVICE: &str = "openclaw-gateway";

/// Compose service used for one-shot CLI commands.
pub const CLI_SERVICE: &str = "openclaw-cli";

/// Build argument carrying the apt package list into the image.
const APT_PACKAGES_BUILD_ARG: &str = "OPENCLAW_DOCKER_APT_PACKAGES";

/// Ordered list of compose files passed with `-f`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposeFiles {
    files: Vec<Utf8PathBuf>,
}

impl ComposeFiles {
    /// Start with the base compose file.
    #[must_use]
    pub fn new(base: impl Into<Utf8PathBuf>) -> Self {
        Self {
            files: vec![base.into()],
        }
    }

    /// Layer an override file on top.
    #[must_use]
    pub fn with_override(mut self, file: impl Into<Utf8PathBuf>) -> Self {
        self.files.push(file.into());
        self
    }

    /// The files in precedence order.
    #[must_use]
    pub fn files(&self) -> &[Utf8PathBuf] {
        &self.files
    }

    fn flags(&self) -> impl Iterator<Item = String> + '_ {
        self.files
            .iter()
            .flat_map(|file| [String::from("-f"), file.to_string()])
    }

    /// Human-readable `<engine> compose -f ...` prefix for follow-up commands.
    #[must_use]
    pub fn hint(&self, engine: ContainerEngine) -> String {
        let mut hint = format!("{} compose", engine.binary());
        for file in &self.files {
            hint.push_str(" -f ");
            hint.push_str(file.as_str());
        }
        hint
    }
}

/// Image build request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest<'a> {
    /// Tag applied to the built image.
    pub image: &'a str,
    /// Space-separated apt packages, passed verbatim as a build argument.
    pub apt_packages: &'a str,
    /// Build context holding the `Dockerfile`.
    pub context: &'a Utf8Path,
}

/// Drives one container engine binary.
pub struct EngineCli<'a, R: CommandRunner> {
    runner: &'a R,
    engine: ContainerEngine,
}

impl<'a, R: CommandRunner> EngineCli<'a, R> {
    /// Create a driver for `engine` using `runner`.
    #[must_use]
    pub const fn new(runner: &'a R, engine: ContainerEngine) -> Self {
        Self { runner, engine }
    }

    /// The engine this driver targets.
    #[must_use]
    pub const fn engine(&self) -> ContainerEngine {
        self.engine
    }

    /// Check the engine binary is installed and has a working `compose`.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::MissingDependency` naming the engine binary, or
    /// `<engine> compose` when `compose version` cannot run successfully.
    pub fn ensure_available(&self) -> Result<()> {
        let binary = self.engine.binary();
        let Some(path) = self.runner.locate(binary) else {
            return Err(EngineError::MissingDependency {
                name: binary.to_owned(),
            }
            .into());
        };
        debug!(engine = binary, path = %path, "located container engine");

        let probe = Invocation::new(binary).args(["compose", "version"]);
        match self.runner.capture(&probe) {
            Ok(output) if output.success() => Ok(()),
            result => {
                debug!(
                    engine = binary,
                    cause = %compose_failure_cause(&result),
                    "compose subcommand unavailable"
                );
                Err(EngineError::MissingDependency {
                    name: format!("{binary} compose"),
                }
                .into())
            }
        }
    }

    /// Build the application image.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::SpawnFailed` or `EngineError::SubprocessFailed`.
    pub fn build_image(&self, request: &BuildRequest<'_>) -> Result<()> {
        let dockerfile = request.context.join("Dockerfile");
        let invocation = Invocation::new(self.engine.binary())
            .arg("build")
            .arg("--build-arg")
            .arg(format!("{APT_PACKAGES_BUILD_ARG}={}", request.apt_packages))
            .arg("-t")
            .arg(request.image)
            .arg("-f")
            .arg(dockerfile.as_str())
            .arg(request.context.as_str());

        info!(image = request.image, "building image");
        self.run_checked(&invocation)
    }

    /// Run the interactive onboarding command in the CLI service.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::SpawnFailed` or `EngineError::SubprocessFailed`.
    pub fn onboard(&self, files: &ComposeFiles) -> Result<()> {
        self.compose(
            files,
            &["run", "--rm", CLI_SERVICE, "onboard", "--no-install-daemon"],
        )
    }

    /// Start the gateway service in the background.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::SpawnFailed` or `EngineError::SubprocessFailed`.
    pub fn start_gateway(&self, files: &ComposeFiles) -> Result<()> {
        self.compose(files, &["up", "-d", GATEWAY_SERVICE])
    }

    fn compose(&self, files: &ComposeFiles, args: &[&str]) -> Result<()> {
        let invocation = Invocation::new(self.engine.binary())
            .arg("compose")
            .args(files.flags())
            .args(args.iter().copied());
        self.run_checked(&invocation)
    }

    fn run_checked(&self, invocation: &Invocation) -> Result<()> {
        debug!(command = %invocation, "running engine command");
        let code = self
            .runner
            .run_attached(invocation)
            .map_err(|e| EngineError::SpawnFailed {
                command: invocation.to_string(),
                message: e.to_string(),
            })?;

        if code == Some(0) {
            Ok(())
        } else {
            Err(EngineError::SubprocessFailed {
                command: invocation.to_string(),
                code,
            }
            .into())
        }
    }
}

/// Why `compose version` did not succeed: the spawn error, or the exit
/// status followed by the trimmed stderr.
fn compose_failure_cause(result: &std::io::Result<CommandOutput>) -> String {
    match result {
        Err(error) => format!("could not run: {error}"),
        Ok(output) => {
            let status = output.code.map_or_else(
                || String::from("killed by signal"),
                |code| format!("exit code {code}"),
            );
            match output.stderr.trim() {
                "" => status,
                stderr => format!("{status}: {stderr}"),
            }
        }
    }
}
