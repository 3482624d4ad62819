//! `openclaw-setup` application entry point.
//!
//! This binary prepares a local Docker or Podman deployment of the OpenClaw
//! gateway. It uses `eyre` for opaque error reporting at the application
//! boundary, converting domain-specific errors into human-readable reports,
//! and maps each error to the process exit code.
//!
//! Configuration is loaded with layered precedence via `OrthoConfig`:
//! 1. Application defaults
//! 2. Configuration file (`~/.config/openclaw-setup/config.toml` or path from
//!    `OPENCLAW_SETUP_CONFIG_PATH`)
//! 3. Environment variables (`OPENCLAW_*`)
//! 4. Command-line arguments

use std::process::ExitCode;

use clap::Parser;
use eyre::Report;
use mockable::DefaultEnv;
use openclaw_setup::api::{GeneratedFiles, SetupParams, SetupReport, generate, setup};
use openclaw_setup::config::{Cli, Commands, load_config};
use openclaw_setup::engine::SystemRunner;
use openclaw_setup::error::Result as SetupResult;
use openclaw_setup::probe::{HostPlatform, SystemProbe};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directive.
const LOG_ENV_VAR: &str = "OPENCLAW_SETUP_LOG";

/// Application entry point.
///
/// Failed engine subprocesses propagate their exit code; every other error
/// exits with status 1.
fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let code = u8::try_from(error.exit_code()).unwrap_or(1);
            report_error(&Report::from(error));
            ExitCode::from(code)
        }
    }
}

/// Log to stderr, filtered by `OPENCLAW_SETUP_LOG` (default `info`).
fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Execute the CLI command, returning domain-specific errors.
///
/// Keeps semantic errors inside the run loop so the CLI boundary owns
/// conversion to `eyre::Report`.
fn run(cli: &Cli) -> SetupResult<()> {
    let env = DefaultEnv::new();
    let config = load_config(cli, &env)?;
    let runner = SystemRunner;
    let probe = SystemProbe::new(&runner);

    let params = SetupParams {
        config: &config,
        project_dir: &cli.project_dir,
        platform: HostPlatform::current(),
        runner: &runner,
        probe: &probe,
        env: &env,
    };

    match cli.command {
        Commands::Setup => print_report(&setup(&params)?),
        Commands::Generate => print_generated(&generate(&params)?),
    }
    Ok(())
}

#[expect(clippy::print_stdout, reason = "CLI output is the intended behaviour")]
fn print_report(report: &SetupReport) {
    print!("{report}");
}

#[expect(clippy::print_stdout, reason = "CLI output is the intended behaviour")]
fn print_generated(generated: &GeneratedFiles) {
    println!("Wrote {}", generated.env_path);
    println!("Wrote {}", generated.override_path);
    println!(
        "Compose: {}",
        generated
            .compose_files
            .hint(generated.resolved.container_engine)
    );
}

#[expect(
    clippy::print_stderr,
    reason = "errors are reported on stderr at the CLI boundary"
)]
fn report_error(report: &Report) {
    eprintln!("Error: {report:?}");
}
