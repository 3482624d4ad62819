//! Configuration loading with layered precedence.
//!
//! Precedence, lowest to highest: application defaults, configuration file,
//! `OPENCLAW_*` environment variables, command-line arguments.
//!
//! # Architecture Note: Why Manual Layer Composition?
//!
//! The `OrthoConfig` derive macro can load every layer by itself, but this
//! loader drives `MergeComposer` directly because:
//!
//! 1. **Subcommand separation**: `Cli` owns subcommand dispatch while
//!    `AppConfig` only holds values.
//! 2. **Unset versus empty**: the setup variables are historical shell names
//!    (`OPENCLAW_HOME_VOLUME`, not `OPENCLAW_MOUNTS_HOME_VOLUME`). The table
//!    below maps them explicitly and keeps an empty value distinct from an
//!    unset one, which the override variables depend on.
//! 3. **Testable environment**: variables are read through `mockable::Env`.
//!
//! # Environment Variable Handling
//!
//! String values are always accepted verbatim, including the empty string.
//! Port values must parse as `u16` or loading fails; an empty port value is
//! treated as unset.

use camino::Utf8PathBuf;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use ortho_config::discovery::ConfigDiscovery;
use ortho_config::serde_json::{self, Map, Value};
use ortho_config::{MergeComposer, toml};

use crate::config::{AppConfig, Cli};
use crate::error::{ConfigError, Result};

// ============================================================================
// Environment Variable Specification Table
// ============================================================================

/// The type of value expected from an environment variable.
#[derive(Clone, Copy)]
enum EnvVarType {
    /// String value, kept verbatim (an empty string is a real value).
    String,
    /// TCP port. Invalid values return an error; empty values are skipped.
    Port,
}

/// Specification for a single environment variable mapping.
struct EnvVarSpec {
    /// The environment variable name (e.g., `OPENCLAW_HOME_VOLUME`).
    env_var: &'static str,
    /// The JSON path segments (e.g., `["mounts", "home_volume"]`).
    path: &'static [&'static str],
    /// The expected value type.
    var_type: EnvVarType,
}

/// Table of all environment variables and their JSON paths.
const ENV_VAR_SPECS: &[EnvVarSpec] = &[
    EnvVarSpec {
        env_var: "OPENCLAW_CONTAINER_ENGINE",
        path: &["container_engine"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "OPENCLAW_IMAGE",
        path: &["image"],
        var_type: EnvVarType::String,
    },
    // Engine overrides
    EnvVarSpec {
        env_var: "OPENCLAW_BIND_MOUNT_OPTIONS",
        path: &["engine", "bind_mount_options"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "OPENCLAW_CONTAINER_USER",
        path: &["engine", "container_user"],
        var_type: EnvVarType::String,
    },
    // Build
    EnvVarSpec {
        env_var: "OPENCLAW_DOCKER_APT_PACKAGES",
        path: &["build", "apt_packages"],
        var_type: EnvVarType::String,
    },
    // Mounts
    EnvVarSpec {
        env_var: "OPENCLAW_EXTRA_MOUNTS",
        path: &["mounts", "extra_mounts"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "OPENCLAW_HOME_VOLUME",
        path: &["mounts", "home_volume"],
        var_type: EnvVarType::String,
    },
    // Gateway
    EnvVarSpec {
        env_var: "OPENCLAW_GATEWAY_TOKEN",
        path: &["gateway", "token"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "OPENCLAW_GATEWAY_PORT",
        path: &["gateway", "port"],
        var_type: EnvVarType::Port,
    },
    EnvVarSpec {
        env_var: "OPENCLAW_BRIDGE_PORT",
        path: &["gateway", "bridge_port"],
        var_type: EnvVarType::Port,
    },
    EnvVarSpec {
        env_var: "OPENCLAW_GATEWAY_BIND",
        path: &["gateway", "bind"],
        var_type: EnvVarType::String,
    },
    // Paths
    EnvVarSpec {
        env_var: "OPENCLAW_CONFIG_DIR",
        path: &["paths", "config_dir"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "OPENCLAW_WORKSPACE_DIR",
        path: &["paths", "workspace_dir"],
        var_type: EnvVarType::String,
    },
];

/// Returns the environment variable names recognised by the config loader.
///
/// Tests use this to build isolated environments without a hard-coded list.
#[must_use]
pub fn env_var_names() -> Vec<&'static str> {
    ENV_VAR_SPECS.iter().map(|spec| spec.env_var).collect()
}

/// Load a configuration file and push it to the composer.
fn load_config_file(path: &Utf8PathBuf, composer: &mut MergeComposer) -> Result<()> {
    let current_dir = Utf8PathBuf::from(".");
    let parent = path
        .parent()
        .filter(|dir| !dir.as_str().is_empty())
        .unwrap_or_else(|| current_dir.as_ref());
    let file_name = path.file_name().unwrap_or(path.as_str());

    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|e| {
        ConfigError::ParseError {
            message: format!("failed to open directory {parent}: {e}"),
        }
    })?;

    let content = dir
        .read_to_string(file_name)
        .map_err(|e| ConfigError::ParseError {
            message: format!("failed to read {path}: {e}"),
        })?;

    let value =
        toml::from_str::<serde_json::Value>(&content).map_err(|e| ConfigError::ParseError {
            message: format!("failed to parse {path}: {e}"),
        })?;

    composer.push_file(value, Some(path.clone()));
    Ok(())
}

/// Locate the configuration file, preferring an existing `--config` path.
fn discover_config_file(cli: &Cli) -> Option<Utf8PathBuf> {
    cli.config.clone().filter(|p| p.exists()).or_else(|| {
        let discovery = ConfigDiscovery::builder("openclaw-setup")
            .env_var("OPENCLAW_SETUP_CONFIG_PATH")
            .config_file_name("config.toml")
            .dotfile_name(".openclaw-setup.toml")
            .build();
        discovery
            .candidates()
            .into_iter()
            .filter(|p| p.exists())
            .find_map(|p| Utf8PathBuf::try_from(p).ok())
    })
}

/// Load configuration with full layer precedence.
///
/// # Errors
///
/// Returns `ConfigError` if configuration loading fails due to:
/// - a malformed configuration file
/// - an unparseable port in `OPENCLAW_GATEWAY_PORT` or `OPENCLAW_BRIDGE_PORT`
/// - a layer merge failure
pub fn load_config<E: mockable::Env>(cli: &Cli, env: &E) -> Result<AppConfig> {
    let mut composer = MergeComposer::new();

    let defaults =
        serde_json::to_value(AppConfig::default()).map_err(|e| ConfigError::ParseError {
            message: format!("failed to serialise defaults: {e}"),
        })?;
    composer.push_defaults(defaults);

    if let Some(ref path) = discover_config_file(cli) {
        load_config_file(path, &mut composer)?;
    }

    let env_values = collect_env_vars(env)?;
    if !env_values.is_null() {
        composer.push_environment(env_values);
    }

    let cli_overrides = build_cli_overrides(cli);
    if !cli_overrides.is_null() {
        composer.push_cli(cli_overrides);
    }

    let config =
        AppConfig::merge_from_layers(composer.layers()).map_err(ConfigError::OrthoConfig)?;

    Ok(config)
}

/// Collect the recognised `OPENCLAW_*` variables into a JSON value.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` if a port variable does not parse.
pub(crate) fn collect_env_vars<E: mockable::Env>(env: &E) -> Result<Value> {
    let mut root = Map::new();

    for spec in ENV_VAR_SPECS {
        let Some(raw_value) = env.string(spec.env_var) else {
            continue;
        };

        let json_value = match spec.var_type {
            EnvVarType::String => Value::String(raw_value),
            EnvVarType::Port => {
                let trimmed = raw_value.trim();
                if trimmed.is_empty() {
                    continue;
                }
                match trimmed.parse::<u16>() {
                    Ok(port) => Value::Number(port.into()),
                    Err(_) => {
                        return Err(ConfigError::InvalidValue {
                            field: spec.env_var.to_owned(),
                            reason: format!("expected port number, got '{raw_value}'"),
                        }
                        .into());
                    }
                }
            }
        };

        insert_at_path(&mut root, spec.path, json_value);
    }

    if root.is_empty() {
        Ok(Value::Null)
    } else {
        Ok(Value::Object(root))
    }
}

/// Insert a value at a nested path in a JSON map, creating parents as needed.
fn insert_at_path(root: &mut Map<String, Value>, path: &[&str], value: Value) {
    let Some((&field, parents)) = path.split_last() else {
        return;
    };

    let mut current = root;
    for &segment in parents {
        let entry = current
            .entry(segment.to_owned())
            .or_insert_with(|| Value::Object(Map::new()));
        let Some(obj) = entry.as_object_mut() else {
            return;
        };
        current = obj;
    }

    current.insert(field.to_owned(), value);
}

/// Build a JSON value containing CLI overrides.
fn build_cli_overrides(cli: &Cli) -> Value {
    let mut overrides = Map::new();

    if let Some(engine) = cli.engine {
        overrides.insert(
            "container_engine".to_owned(),
            Value::String(engine.binary().to_owned()),
        );
    }

    if let Some(ref image) = cli.image {
        overrides.insert("image".to_owned(), Value::String(image.clone()));
    }

    if overrides.is_empty() {
        Value::Null
    } else {
        Value::Object(overrides)
    }
}
