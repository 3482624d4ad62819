//! Shared behavioural-test state for compose generation scenarios.

use std::sync::Arc;

use camino::Utf8PathBuf;
use openclaw_setup::config::AppConfig;
use openclaw_setup::probe::HostPlatform;
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::ScenarioState;
use tempfile::TempDir;

use super::StepResult;

/// Temporary project and home directories used by a scenario.
#[derive(Clone)]
pub struct SandboxProject {
    /// Keeps the temporary directory alive for the full scenario.
    pub(crate) _temp_dir: Arc<TempDir>,

    /// Directory receiving the generated files.
    pub(crate) root: Utf8PathBuf,

    /// Directory exposed as `HOME`.
    pub(crate) home: Utf8PathBuf,
}

impl SandboxProject {
    /// Create empty project and home directories.
    pub(crate) fn new() -> StepResult<Self> {
        let temp_dir = tempfile::tempdir()
            .map_err(|error| format!("failed to create temporary directory: {error}"))?;
        let base = Utf8PathBuf::from_path_buf(temp_dir.path().to_path_buf())
            .map_err(|_| String::from("temporary directory path should be valid UTF-8"))?;

        let root = base.join("project");
        let home = base.join("home");
        for dir in [&root, &home] {
            std::fs::create_dir_all(dir)
                .map_err(|error| format!("failed to create {dir}: {error}"))?;
        }

        Ok(Self {
            _temp_dir: Arc::new(temp_dir),
            root,
            home,
        })
    }

    /// Read a generated file from the project directory.
    pub(crate) fn read(&self, name: &str) -> StepResult<String> {
        std::fs::read_to_string(self.root.join(name))
            .map_err(|error| format!("failed to read {name}: {error}"))
    }
}

/// Contents of both generated files after one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedContents {
    /// The `.env` file.
    pub(crate) env_file: String,
    /// The compose override.
    pub(crate) compose_override: String,
}

/// Outcome observed after generation.
#[derive(Debug, Clone)]
pub enum GenerationOutcome {
    /// Generation succeeded; the second run is present when the scenario
    /// generated twice.
    Generated {
        /// Files after the first run.
        first: GeneratedContents,
        /// Files after the second run.
        second: Option<GeneratedContents>,
    },
    /// Generation failed with the given message.
    Failed(String),
}

/// Shared scenario state for compose generation behavioural tests.
#[derive(Default, ScenarioState)]
pub struct GenerationState {
    /// Sandbox directories.
    pub(crate) project: Slot<SandboxProject>,

    /// Configuration passed to generation.
    pub(crate) config: Slot<AppConfig>,

    /// Host platform seen by detection.
    pub(crate) platform: Slot<HostPlatform>,

    /// Whether the stub probe reports `SELinux` enforcing.
    pub(crate) selinux_enforcing: Slot<bool>,

    /// Whether the stub probe reports rootless Podman.
    pub(crate) podman_rootless: Slot<bool>,

    /// Result of the generation step.
    pub(crate) outcome: Slot<GenerationOutcome>,
}

/// Fixture providing a Linux host with no capabilities detected.
#[fixture]
pub fn generation_state() -> GenerationState {
    let state = GenerationState::default();
    state.config.set(AppConfig::default());
    state.platform.set(HostPlatform::Linux);
    state.selinux_enforcing.set(false);
    state.podman_rootless.set(false);
    state
}
