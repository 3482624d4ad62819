//! Host capability probes.
//!
//! Probes answer three questions about the host: is `SELinux` enforcing, is
//! the Podman engine rootless, and which uid/gid is running the setup. Each
//! yes/no answer is a [`ProbeOutcome`]. A probe that cannot run at all is
//! [`ProbeOutcome::Unavailable`], which [`ProbeOutcome::is_enabled`] folds into
//! "absent"; that method is the only place the degradation happens.

use std::fmt;

use tracing::debug;

use crate::engine::{CommandRunner, Invocation};

/// Binary reporting the `SELinux` mode.
const GETENFORCE: &str = "getenforce";

/// `getenforce` output meaning enforcement is active.
const SELINUX_ENFORCING: &str = "Enforcing";

/// Go template extracting Podman's rootless flag from `podman info`.
const PODMAN_ROOTLESS_FORMAT: &str = "{{.Host.Security.Rootless}}";

/// Result of a single capability probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The probe ran and the capability is active.
    Present,
    /// The probe ran and the capability is inactive.
    Absent,
    /// The probe could not give an answer.
    Unavailable {
        /// Why the probe failed.
        reason: String,
    },
}

impl ProbeOutcome {
    /// Map a definite answer to `Present` or `Absent`.
    #[must_use]
    pub const fn from_flag(flag: bool) -> Self {
        if flag { Self::Present } else { Self::Absent }
    }

    /// Collapse the outcome to a flag, treating an unavailable probe as absent.
    #[must_use]
    pub fn is_enabled(&self, capability: &str) -> bool {
        match self {
            Self::Present => true,
            Self::Absent => false,
            Self::Unavailable { reason } => {
                debug!(capability, %reason, "probe unavailable, assuming absent");
                false
            }
        }
    }
}

/// Operating system family, as far as detection cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostPlatform {
    /// Linux, where `SELinux` and rootless Podman detection apply.
    Linux,
    /// Any other host; detection is skipped.
    Other,
}

impl HostPlatform {
    /// The platform this binary was compiled for.
    #[must_use]
    pub const fn current() -> Self {
        if cfg!(target_os = "linux") {
            Self::Linux
        } else {
            Self::Other
        }
    }

    /// Whether host detection applies.
    #[must_use]
    pub const fn is_linux(self) -> bool {
        matches!(self, Self::Linux)
    }
}

/// Numeric identity of the invoking user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostIdentity {
    /// User id.
    pub uid: u32,
    /// Primary group id.
    pub gid: u32,
}

impl HostIdentity {
    /// Identity of the current process.
    #[cfg(unix)]
    #[must_use]
    pub fn current() -> Option<Self> {
        Some(Self {
            uid: nix::unistd::getuid().as_raw(),
            gid: nix::unistd::getgid().as_raw(),
        })
    }

    /// Identity of the current process; unknown on this platform.
    #[cfg(not(unix))]
    #[must_use]
    pub const fn current() -> Option<Self> {
        None
    }
}

impl fmt::Display for HostIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.uid, self.gid)
    }
}

/// Host capability queries used during resolution.
#[cfg_attr(test, mockall::automock)]
pub trait HostProbe {
    /// Whether `SELinux` is in enforcing mode.
    fn selinux_enforcing(&self) -> ProbeOutcome;

    /// Whether the Podman engine runs rootless.
    fn podman_rootless(&self) -> ProbeOutcome;

    /// The invoking user's uid and gid, when known.
    fn identity(&self) -> Option<HostIdentity>;
}

/// [`HostProbe`] that shells out to `getenforce` and `podman info`.
pub struct SystemProbe<'a, R: CommandRunner> {
    runner: &'a R,
}

impl<'a, R: CommandRunner> SystemProbe<'a, R> {
    /// Create a probe running its queries through `runner`.
    #[must_use]
    pub const fn new(runner: &'a R) -> Self {
        Self { runner }
    }

    /// Run `invocation`, returning trimmed stdout on success.
    fn query(&self, invocation: &Invocation) -> Result<String, ProbeOutcome> {
        let output = self
            .runner
            .capture(invocation)
            .map_err(|e| ProbeOutcome::Unavailable {
                reason: format!("failed to run '{invocation}': {e}"),
            })?;

        if !output.success() {
            return Err(ProbeOutcome::Unavailable {
                reason: format!(
                    "'{invocation}' exited unsuccessfully: {}",
                    output.stderr.trim()
                ),
            });
        }

        Ok(output.stdout.trim().to_owned())
    }
}

impl<R: CommandRunner> HostProbe for SystemProbe<'_, R> {
    fn selinux_enforcing(&self) -> ProbeOutcome {
        if self.runner.locate(GETENFORCE).is_none() {
            return ProbeOutcome::Unavailable {
                reason: format!("{GETENFORCE} not found"),
            };
        }

        match self.query(&Invocation::new(GETENFORCE)) {
            Ok(mode) => ProbeOutcome::from_flag(mode == SELINUX_ENFORCING),
            Err(outcome) => outcome,
        }
    }

    fn podman_rootless(&self) -> ProbeOutcome {
        let invocation = Invocation::new("podman")
            .arg("info")
            .arg("--format")
            .arg(PODMAN_ROOTLESS_FORMAT);

        match self.query(&invocation) {
            Ok(answer) => ProbeOutcome::from_flag(is_truthy(&answer)),
            Err(outcome) => outcome,
        }
    }

    fn identity(&self) -> Option<HostIdentity> {
        HostIdentity::current()
    }
}

fn is_truthy(answer: &str) -> bool {
    matches!(
        answer.to_ascii_lowercase().as_str(),
        "true" | "1" | "yes"
    )
}
