//! Container engine invocation.
//!
//! The engine is always driven through its command-line binary (`docker` or
//! `podman`), never a socket API. The same [`CommandRunner`] seam backs the
//! host probes in [`crate::probe`].

mod compose;
mod runner;

pub use compose::{BuildRequest, CLI_SERVICE, ComposeFiles, EngineCli, GATEWAY_SERVICE};
#[cfg(test)]
pub(crate) use runner::MockCommandRunner;
pub use runner::{CommandOutput, CommandRunner, Invocation, SystemRunner};
