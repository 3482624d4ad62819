//! Subprocess seam for the container engine and host tools.
//!
//! Every external process goes through [`CommandRunner`], so the setup flow
//! and host probes can be exercised without Docker, Podman or `getenforce`
//! installed.

use std::fmt;
use std::process::{Command, Stdio};

use camino::Utf8PathBuf;

/// A program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: String,
    args: Vec<String>,
}

impl Invocation {
    /// Start an invocation of `program` with no arguments.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// The program name.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// The arguments, in order.
    #[must_use]
    pub fn arguments(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, or `None` when the process was killed by a signal.
    pub code: Option<i32>,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl CommandOutput {
    /// Whether the process exited with status zero.
    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self.code, Some(0))
    }
}

/// Behaviour required to find and run external programs.
#[cfg_attr(test, mockall::automock)]
pub trait CommandRunner {
    /// Resolve `program` on `PATH`.
    fn locate(&self, program: &str) -> Option<Utf8PathBuf>;

    /// Run to completion with output captured and stdin closed.
    ///
    /// # Errors
    ///
    /// Returns the I/O error raised when the process cannot be spawned.
    fn capture(&self, invocation: &Invocation) -> std::io::Result<CommandOutput>;

    /// Run to completion attached to the caller's terminal.
    ///
    /// Returns the exit code, or `None` when killed by a signal.
    ///
    /// # Errors
    ///
    /// Returns the I/O error raised when the process cannot be spawned.
    fn run_attached(&self, invocation: &Invocation) -> std::io::Result<Option<i32>>;
}

/// [`CommandRunner`] backed by `std::process` and `which`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn locate(&self, program: &str) -> Option<Utf8PathBuf> {
        which::which(program)
            .ok()
            .and_then(|path| Utf8PathBuf::from_path_buf(path).ok())
    }

    fn capture(&self, invocation: &Invocation) -> std::io::Result<CommandOutput> {
        let output = Command::new(invocation.program())
            .args(invocation.arguments())
            .stdin(Stdio::null())
            .output()?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn run_attached(&self, invocation: &Invocation) -> std::io::Result<Option<i32>> {
        let status = Command::new(invocation.program())
            .args(invocation.arguments())
            .status()?;
        Ok(status.code())
    }
}
