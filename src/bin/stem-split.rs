//! CLI separation wrapper: split one file and print the stem mapping as a
//! single JSON object on stdout.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use stemserve::{Backend, StemError};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stem-split")]
#[command(about = "Split an audio file into stems with an external separation tool", long_about = None)]
#[command(version)]
struct Cli {
    /// Audio file to separate
    input: PathBuf,

    /// Directory the flattened stems are written to
    output: PathBuf,

    /// Separation tool to invoke
    #[arg(long, value_enum, default_value = "demucs")]
    backend: Backend,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    if !cli.input.exists() {
        return Err(StemError::InputNotFound {
            path: cli.input.clone(),
        }
        .into());
    }

    let separator = cli.backend.separator();
    let stems = separator.separate(&cli.input, &cli.output)?;

    println!("{}", serde_json::to_string(&stems)?);
    Ok(())
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
