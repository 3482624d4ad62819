//! Local Docker or Podman deployment setup for the OpenClaw gateway.
//!
//! `openclaw-setup` prepares a project directory for `compose`: it resolves
//! configuration from defaults, a config file, `OPENCLAW_*` environment
//! variables and command-line flags, probes the host for `SELinux`
//! enforcement and rootless Podman, and writes two files:
//!
//! - `.env`, holding every recognised setting for compose interpolation;
//! - `docker-compose.extra.yml`, a compose override adding home and extra
//!   mounts, bind-mount labels and the container user.
//!
//! The `setup` flow then builds the image, runs onboarding in the CLI
//! service and starts the gateway.
//!
//! # Modules
//!
//! - [`api`]: Orchestration functions used by the binary
//! - [`config`]: Configuration system with layered precedence (CLI > env > file > defaults)
//! - [`engine`]: Container engine invocation through its command-line binary
//! - [`error`]: Semantic error types for the application
//! - [`output`]: Generated files and project directory access
//! - [`probe`]: Host capability probes
//! - [`resolve`]: Resolution of configuration and probes into final values

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod output;
pub mod probe;
pub mod resolve;
