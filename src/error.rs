//! Semantic error types for openclaw-setup.
//!
//! Conditions a caller might inspect or map to an exit code are semantic enums
//! (via `thiserror`). Opaque errors (`eyre::Report`) are reserved for the
//! binary boundary.
//!
//! Host probe failures never appear here: a probe that cannot run degrades to
//! "feature absent" (see [`crate::probe::ProbeOutcome`]).

use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be parsed.
    #[error("failed to parse configuration file: {message}")]
    ParseError {
        /// A description of the parse error.
        message: String,
    },

    /// A required configuration value is missing.
    #[error("missing required configuration: {field}")]
    MissingRequired {
        /// The name of the missing field.
        field: String,
    },

    /// A configuration value failed validation.
    #[error("invalid configuration value for '{field}': {reason}")]
    InvalidValue {
        /// The name of the invalid field.
        field: String,
        /// The reason the value is invalid.
        reason: String,
    },

    /// The requested container engine is neither Docker nor Podman.
    #[error("unsupported container engine '{value}' (expected 'docker' or 'podman')")]
    UnsupportedEngine {
        /// The value supplied by the user.
        value: String,
    },

    /// The `OrthoConfig` library returned an error while merging layers.
    #[error("configuration loading failed: {0}")]
    OrthoConfig(Arc<ortho_config::OrthoError>),
}

/// Errors raised while driving the container engine binary.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A required executable is not installed or not usable.
    #[error("missing dependency: {name}")]
    MissingDependency {
        /// The dependency that could not be found.
        name: String,
    },

    /// The engine process could not be spawned.
    #[error("failed to run '{command}': {message}")]
    SpawnFailed {
        /// The command line that was attempted.
        command: String,
        /// A description of the spawn failure.
        message: String,
    },

    /// The engine process exited unsuccessfully.
    #[error("'{command}' exited with {}", describe_exit(.code))]
    SubprocessFailed {
        /// The command line that failed.
        command: String,
        /// The exit code, or `None` when the process was killed by a signal.
        code: Option<i32>,
    },
}

#[expect(
    clippy::ref_option,
    reason = "thiserror passes display arguments by reference"
)]
fn describe_exit(code: &Option<i32>) -> String {
    code.map_or_else(
        || String::from("a signal"),
        |value| format!("status {value}"),
    )
}

/// Errors that can occur during filesystem operations.
#[derive(Debug, Error)]
pub enum FilesystemError {
    /// A file or directory was not found.
    #[error("path not found: {path}")]
    NotFound {
        /// The path that was not found.
        path: Utf8PathBuf,
    },

    /// An I/O error occurred.
    #[error("I/O error at '{path}': {message}")]
    IoError {
        /// The path where the error occurred.
        path: Utf8PathBuf,
        /// A description of the I/O error.
        message: String,
    },
}

/// Top-level error type for openclaw-setup.
///
/// At the binary boundary these errors are converted to `eyre::Report` for
/// display, and [`SetupError::exit_code`] picks the process exit status.
#[derive(Debug, Error)]
pub enum SetupError {
    /// An error occurred during configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An error occurred while invoking the container engine.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// An error occurred during filesystem operations.
    #[error(transparent)]
    Filesystem(#[from] FilesystemError),
}

impl SetupError {
    /// Process exit code for this error.
    ///
    /// A failed engine subprocess propagates its own exit code unchanged.
    /// Every other failure, including a subprocess killed by a signal, maps
    /// to `1`.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Engine(EngineError::SubprocessFailed {
                code: Some(code), ..
            }) if *code != 0 => *code,
            _ => 1,
        }
    }
}

/// A specialised `Result` type for openclaw-setup operations.
pub type Result<T> = std::result::Result<T, SetupError>;
