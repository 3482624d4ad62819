//! Given/when steps for compose generation scenarios.

use std::io;

use camino::Utf8PathBuf;
use mockable::MockEnv;
use openclaw_setup::api::{SetupParams, generate};
use openclaw_setup::config::AppConfig;
use openclaw_setup::engine::{CommandOutput, CommandRunner, Invocation};
use openclaw_setup::probe::{HostIdentity, HostPlatform, HostProbe, ProbeOutcome};
use rstest_bdd_macros::{given, when};

use super::StepResult;
use super::state::{GeneratedContents, GenerationOutcome, GenerationState, SandboxProject};

/// Probe answering from fixed flags, with a fixed `1000:1000` identity.
struct StubProbe {
    selinux_enforcing: bool,
    podman_rootless: bool,
}

impl HostProbe for StubProbe {
    fn selinux_enforcing(&self) -> ProbeOutcome {
        ProbeOutcome::from_flag(self.selinux_enforcing)
    }

    fn podman_rootless(&self) -> ProbeOutcome {
        ProbeOutcome::from_flag(self.podman_rootless)
    }

    fn identity(&self) -> Option<HostIdentity> {
        Some(HostIdentity {
            uid: 1000,
            gid: 1000,
        })
    }
}

/// Runner for generation, which never starts a process.
struct NoProcesses;

impl CommandRunner for NoProcesses {
    fn locate(&self, _program: &str) -> Option<Utf8PathBuf> {
        None
    }

    fn capture(&self, invocation: &Invocation) -> io::Result<CommandOutput> {
        Err(io::Error::other(format!("unexpected process: {invocation}")))
    }

    fn run_attached(&self, invocation: &Invocation) -> io::Result<Option<i32>> {
        Err(io::Error::other(format!("unexpected process: {invocation}")))
    }
}

fn update_config(generation_state: &GenerationState, update: impl FnOnce(&mut AppConfig)) {
    let mut config = generation_state.config.get().unwrap_or_default();
    update(&mut config);
    generation_state.config.set(config);
}

#[given("a sandbox project")]
fn sandbox_project(generation_state: &GenerationState) -> StepResult<()> {
    generation_state.project.set(SandboxProject::new()?);
    Ok(())
}

#[given("the home volume is {volume}")]
fn home_volume_is(generation_state: &GenerationState, volume: String) {
    update_config(generation_state, |config| config.mounts.home_volume = volume);
}

#[given("the extra mounts are {mounts}")]
fn extra_mounts_are(generation_state: &GenerationState, mounts: String) {
    update_config(generation_state, |config| config.mounts.extra_mounts = mounts);
}

#[given("the apt packages are {packages}")]
fn apt_packages_are(generation_state: &GenerationState, packages: String) {
    update_config(generation_state, |config| config.build.apt_packages = packages);
}

#[given("the container engine is {engine}")]
fn container_engine_is(generation_state: &GenerationState, engine: String) {
    update_config(generation_state, |config| {
        config.container_engine = Some(engine);
    });
}

#[given("SELinux is enforcing")]
fn selinux_is_enforcing(generation_state: &GenerationState) {
    generation_state.selinux_enforcing.set(true);
}

#[given("Podman is rootless")]
fn podman_is_rootless(generation_state: &GenerationState) {
    generation_state.podman_rootless.set(true);
}

#[given("the host is not Linux")]
fn host_is_not_linux(generation_state: &GenerationState) {
    generation_state.platform.set(HostPlatform::Other);
}

#[given("the bind mount options are forced empty")]
fn bind_mount_options_forced_empty(generation_state: &GenerationState) {
    update_config(generation_state, |config| {
        config.engine.bind_mount_options = Some(String::new());
    });
}

#[given("a container user override of {user}")]
fn container_user_override(generation_state: &GenerationState, user: String) {
    update_config(generation_state, |config| {
        config.engine.container_user = Some(user);
    });
}

/// Run generation once, returning the file contents or the error message.
fn generate_once(generation_state: &GenerationState) -> StepResult<Result<GeneratedContents, String>> {
    let project = generation_state
        .project
        .get()
        .ok_or_else(|| String::from("sandbox project should be set"))?;
    let config = generation_state.config.get().unwrap_or_default();
    let probe = StubProbe {
        selinux_enforcing: generation_state.selinux_enforcing.get().unwrap_or(false),
        podman_rootless: generation_state.podman_rootless.get().unwrap_or(false),
    };

    let home = project.home.to_string();
    let mut env = MockEnv::new();
    env.expect_string()
        .returning(move |key| (key == "HOME").then(|| home.clone()));

    let params = SetupParams {
        config: &config,
        project_dir: &project.root,
        platform: generation_state
            .platform
            .get()
            .unwrap_or(HostPlatform::Linux),
        runner: &NoProcesses,
        probe: &probe,
        env: &env,
    };

    match generate(&params) {
        Ok(_) => Ok(Ok(GeneratedContents {
            env_file: project.read(".env")?,
            compose_override: project.read("docker-compose.extra.yml")?,
        })),
        Err(error) => Ok(Err(error.to_string())),
    }
}

#[when("the files are generated")]
fn files_are_generated(generation_state: &GenerationState) -> StepResult<()> {
    let outcome = match generate_once(generation_state)? {
        Ok(first) => GenerationOutcome::Generated {
            first,
            second: None,
        },
        Err(message) => GenerationOutcome::Failed(message),
    };
    generation_state.outcome.set(outcome);
    Ok(())
}

#[when("the files are generated twice")]
fn files_are_generated_twice(generation_state: &GenerationState) -> StepResult<()> {
    let first = generate_once(generation_state)??;
    let second = generate_once(generation_state)??;
    generation_state.outcome.set(GenerationOutcome::Generated {
        first,
        second: Some(second),
    });
    Ok(())
}
