//! File generation: resolve the configuration and write `.env` and the
//! compose override.

use camino::Utf8PathBuf;
use tracing::info;

use super::SetupParams;
use crate::engine::{CommandRunner, ComposeFiles};
use crate::error::Result;
use crate::output::{
    COMPOSE_BASE_NAME, COMPOSE_OVERRIDE_NAME, ComposeOverride, ENV_FILE_NAME, EnvFile,
    GATEWAY_TOKEN_KEY, ProjectDir, ensure_host_dir, read_value,
};
use crate::probe::HostProbe;
use crate::resolve::{ResolveContext, ResolvedConfig, resolve};

/// What [`generate`] wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFiles {
    /// The configuration the files were generated from.
    pub resolved: ResolvedConfig,
    /// Compose files to pass with `-f`; the override only when it declares
    /// anything.
    pub compose_files: ComposeFiles,
    /// Path of the written `.env`.
    pub env_path: Utf8PathBuf,
    /// Path of the written compose override.
    pub override_path: Utf8PathBuf,
}

/// Resolve the configuration and write both generated files.
///
/// The config and workspace directories are created when missing. An
/// existing `.env` is upserted, and its gateway token is reused when no
/// token is configured.
///
/// # Errors
///
/// Returns `ConfigError` variants when resolution fails and
/// `FilesystemError` variants when the project directory cannot be read or
/// written.
pub fn generate<R, P, E>(params: &SetupParams<'_, R, P, E>) -> Result<GeneratedFiles>
where
    R: CommandRunner,
    P: HostProbe,
    E: mockable::Env,
{
    let project = ProjectDir::open(params.project_dir)?;
    let existing_env = project.read_optional(ENV_FILE_NAME)?;

    let ctx = ResolveContext {
        platform: params.platform,
        probe: params.probe,
        home_dir: home_dir(params.env),
        previous_token: existing_env
            .as_deref()
            .and_then(|contents| read_value(contents, GATEWAY_TOKEN_KEY)),
    };
    let resolved = resolve(params.config, &ctx)?;

    ensure_host_dir(&resolved.config_dir)?;
    ensure_host_dir(&resolved.workspace_dir)?;

    let env_file = EnvFile::from_resolved(&resolved);
    let env_contents = existing_env.as_deref().map_or_else(
        || env_file.render(),
        |existing| env_file.merge_into(existing),
    );
    project.write_atomic(ENV_FILE_NAME, &env_contents)?;

    let compose_override = ComposeOverride::from_resolved(&resolved);
    project.write_atomic(COMPOSE_OVERRIDE_NAME, &compose_override.to_yaml())?;

    let mut compose_files = ComposeFiles::new(project.path(COMPOSE_BASE_NAME));
    if compose_override.declares_anything() {
        compose_files = compose_files.with_override(project.path(COMPOSE_OVERRIDE_NAME));
    }

    info!(
        project_dir = %project.root(),
        engine = %resolved.container_engine,
        "generated {ENV_FILE_NAME} and {COMPOSE_OVERRIDE_NAME}"
    );

    Ok(GeneratedFiles {
        env_path: project.path(ENV_FILE_NAME),
        override_path: project.path(COMPOSE_OVERRIDE_NAME),
        resolved,
        compose_files,
    })
}

fn home_dir<E: mockable::Env>(env: &E) -> Option<Utf8PathBuf> {
    env.string("HOME")
        .filter(|home| !home.is_empty())
        .map(Utf8PathBuf::from)
}
