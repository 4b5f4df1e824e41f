mod commands;
mod error;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::commands::Commands;
use crate::error::CliError;
use crate::output::Format;

#[derive(Parser)]
#[command(name = "payflow")]
#[command(about = "Run multi-step payment provider transactions", long_about = None)]
struct Cli {
    /// Gateway configuration file
    #[arg(long, short = 'c', global = true, default_value = "payflow.toml")]
    config: PathBuf,

    /// Log every provider call and poll attempt to stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Print the composite outcome as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let format = if cli.json { Format::Json } else { Format::Plain };

    match cli.command.execute(&cli.config, format) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            print_error(&e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_error(error: &CliError) {
    eprintln!("error: {error}");

    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        eprintln!("caused by: {cause}");
        source = std::error::Error::source(cause);
    }
}
