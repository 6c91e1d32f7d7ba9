//! mdup CLI - upload markdown documents as Notion pages.
//!
//! `mdup <FILE>` converts the document and creates its pages.
//! `--dry-run` shows the conversion without uploading and
//! `--show-config` prints the effective configuration.

mod commands;
mod error;
mod output;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use commands::UploadArgs;
use error::CliError;
use output::Output;

/// Exit code after Ctrl-C.
const EXIT_INTERRUPTED: u8 = 130;

/// mdup - Markdown to Notion uploader.
#[derive(Parser)]
#[command(name = "mdup", version, about)]
struct Cli {
    #[command(flatten)]
    upload: UploadArgs,

    /// Print the effective configuration and exit.
    #[arg(long)]
    show_config: bool,

    /// Enable verbose output (debug logs).
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn execute(self) -> Result<(), CliError> {
        if self.show_config {
            let settings = self.upload.cli_settings();
            return commands::show_config::execute(self.upload.config.as_deref(), &settings);
        }
        self.upload.execute()
    }
}

/// Run the command on a blocking thread, racing it against Ctrl-C.
///
/// Returns `None` when interrupted.
async fn run_interruptible(cli: Cli) -> Option<Result<(), CliError>> {
    let task = tokio::task::spawn_blocking(move || cli.execute());
    tokio::select! {
        joined = task => Some(joined.unwrap_or_else(|err| Err(CliError::Runtime(err.to_string())))),
        _ = tokio::signal::ctrl_c() => None,
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables DEBUG level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(err) => {
            output.error(&format!("Error: failed to start runtime: {err}"));
            return ExitCode::FAILURE;
        }
    };
    let outcome = runtime.block_on(run_interruptible(cli));
    // An interrupted upload thread is abandoned, not awaited.
    runtime.shutdown_background();

    match outcome {
        Some(Ok(())) => ExitCode::SUCCESS,
        Some(Err(err)) => {
            output.error(&format!("Error: {err}"));
            ExitCode::FAILURE
        }
        None => {
            output.warning("\nInterrupted.");
            ExitCode::from(EXIT_INTERRUPTED)
        }
    }
}
