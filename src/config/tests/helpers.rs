//! Shared fixtures and helper functions for config tests.

use std::collections::HashMap;
use std::sync::Arc;

use mockable::MockEnv;
use ortho_config::MergeComposer;
use rstest::fixture;

use crate::config::{AppConfig, ContainerEngine};

/// Fixture providing an `AppConfig` parsed from a full TOML example.
#[fixture]
pub fn app_config_from_full_toml() -> AppConfig {
    let toml = r#"
        container_engine = "podman"
        image = "registry.example/openclaw:nightly"

        [engine]
        bind_mount_options = ":z"
        container_user = "1001:1001"

        [build]
        apt_packages = "ffmpeg build-essential"

        [mounts]
        extra_mounts = "/srv/models:/models:ro"
        home_volume = "openclaw-home"

        [gateway]
        token = "file-token"
        port = 28789
        bridge_port = 28790
        bind = "loopback"

        [paths]
        config_dir = "/srv/openclaw/config"
        workspace_dir = "/srv/openclaw/workspace"
    "#;

    toml::from_str(toml).expect("TOML parsing should succeed")
}

/// Fixture providing an `AppConfig` parsed from a minimal TOML example.
#[fixture]
pub fn app_config_from_partial_toml() -> AppConfig {
    let toml = r#"
        [mounts]
        home_volume = "openclaw-home"
    "#;

    toml::from_str(toml).expect("TOML parsing should succeed")
}

/// Helper: Builds a `MockEnv` answering from a fixed variable table.
pub fn mock_env(vars: &[(&str, &str)]) -> MockEnv {
    let table: HashMap<String, String> = vars
        .iter()
        .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
        .collect();
    let mut env = MockEnv::new();
    env.expect_string()
        .returning(move |key| table.get(key).cloned());
    env
}

/// Helper: Creates a `MergeComposer` with defaults layer already pushed.
pub fn create_composer_with_defaults() -> Result<MergeComposer, ortho_config::serde_json::Error> {
    let mut composer = MergeComposer::new();
    let defaults = ortho_config::serde_json::to_value(AppConfig::default())?;
    composer.push_defaults(defaults);
    Ok(composer)
}

/// Helper: Merges layers from a composer into `AppConfig`.
pub fn merge_config(composer: MergeComposer) -> Result<AppConfig, Arc<ortho_config::OrthoError>> {
    AppConfig::merge_from_layers(composer.layers())
}

/// Helper: Asserts that a config has all default values.
pub fn assert_config_has_defaults(config: &AppConfig) {
    assert!(
        config.container_engine.is_none(),
        "container_engine should be None"
    );
    assert_eq!(
        ContainerEngine::from_setting(config.container_engine.as_deref())
            .expect("default engine should parse"),
        ContainerEngine::Docker,
        "engine should default to docker"
    );
    assert_eq!(config.image_or_default(), "openclaw:local");
    assert!(
        config.engine.bind_mount_options.is_none(),
        "bind_mount_options should be None"
    );
    assert!(
        config.engine.container_user.is_none(),
        "container_user should be None"
    );
    assert_eq!(config.build.apt_packages, "");
    assert_eq!(config.mounts.extra_mounts, "");
    assert_eq!(config.mounts.home_volume, "");
    assert_eq!(config.gateway.port, 18789, "gateway.port should be 18789");
    assert_eq!(config.gateway.bridge_port, 18790);
    assert_eq!(config.gateway.bind, "lan");
    assert!(config.paths.config_dir.is_none());
}
