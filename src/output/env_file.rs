//! The `.env` file consumed by compose.
//!
//! Every recognised key is always written, in a fixed order, with its value
//! verbatim and unquoted. Rewriting an existing file replaces recognised
//! keys in place and keeps every other line.

use std::collections::HashSet;

use crate::resolve::ResolvedConfig;

/// Key holding the gateway token.
pub const GATEWAY_TOKEN_KEY: &str = "OPENCLAW_GATEWAY_TOKEN";

/// Recognised keys in the order they are written.
pub const ENV_FILE_KEYS: [&str; 13] = [
    "OPENCLAW_CONTAINER_ENGINE",
    "OPENCLAW_CONFIG_DIR",
    "OPENCLAW_WORKSPACE_DIR",
    "OPENCLAW_GATEWAY_PORT",
    "OPENCLAW_BRIDGE_PORT",
    "OPENCLAW_GATEWAY_BIND",
    GATEWAY_TOKEN_KEY,
    "OPENCLAW_IMAGE",
    "OPENCLAW_EXTRA_MOUNTS",
    "OPENCLAW_HOME_VOLUME",
    "OPENCLAW_DOCKER_APT_PACKAGES",
    "OPENCLAW_BIND_MOUNT_OPTIONS",
    "OPENCLAW_CONTAINER_USER",
];

/// Resolved `.env` contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvFile {
    entries: Vec<(&'static str, String)>,
}

impl EnvFile {
    /// Collect the values written for `resolved`.
    #[must_use]
    pub fn from_resolved(resolved: &ResolvedConfig) -> Self {
        let values = [
            resolved.container_engine.binary().to_owned(),
            resolved.config_dir.to_string(),
            resolved.workspace_dir.to_string(),
            resolved.gateway_port.to_string(),
            resolved.bridge_port.to_string(),
            resolved.gateway_bind.clone(),
            resolved.gateway_token.clone(),
            resolved.image.clone(),
            resolved.extra_mounts_raw.clone(),
            resolved.home_volume_raw.clone(),
            resolved.apt_packages.clone(),
            resolved.bind_mount_options.clone(),
            resolved.container_user.clone().unwrap_or_default(),
        ];

        Self {
            entries: ENV_FILE_KEYS.into_iter().zip(values).collect(),
        }
    }

    /// The value written for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find_map(|(k, v)| (*k == key).then_some(v.as_str()))
    }

    /// A fresh file containing only the recognised keys.
    #[must_use]
    pub fn render(&self) -> String {
        self.merge_into("")
    }

    /// Upsert into `existing`.
    ///
    /// The first line assigning a recognised key is replaced, later
    /// duplicates are dropped, and every other line is kept as is. Keys not
    /// already present are appended in order.
    #[must_use]
    pub fn merge_into(&self, existing: &str) -> String {
        let mut written = HashSet::new();
        let mut out = String::with_capacity(existing.len() + 512);

        for line in existing.lines() {
            match line_key(line).and_then(|key| self.entry(key)) {
                Some((key, value)) => {
                    if written.insert(*key) {
                        push_assignment(&mut out, key, value);
                    }
                }
                None => {
                    out.push_str(line);
                    out.push('\n');
                }
            }
        }

        for (key, value) in &self.entries {
            if !written.contains(key) {
                push_assignment(&mut out, key, value);
            }
        }
        out
    }

    fn entry(&self, key: &str) -> Option<&(&'static str, String)> {
        self.entries.iter().find(|(k, _)| *k == key)
    }
}

/// The last value assigned to `key` in `.env` contents.
#[must_use]
pub fn read_value(contents: &str, key: &str) -> Option<String> {
    contents
        .lines()
        .filter(|line| line_key(line) == Some(key))
        .filter_map(|line| line.split_once('='))
        .map(|(_, value)| value.to_owned())
        .last()
}

fn line_key(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    if trimmed.starts_with('#') {
        return None;
    }
    trimmed
        .split_once('=')
        .map(|(key, _)| key.trim_end())
        .filter(|key| !key.is_empty())
}

fn push_assignment(out: &mut String, key: &str, value: &str) {
    out.push_str(key);
    out.push('=');
    out.push_str(value);
    out.push('\n');
}
