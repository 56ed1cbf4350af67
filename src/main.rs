use std::error::Error;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use bank_ledger::{run, run_async};

/// Replays a bank command script and prints the resulting account balances.
#[derive(Parser)]
#[command(name = "bank-ledger")]
#[command(version, long_about = None)]
struct Cli {
    /// CSV command script
    input: PathBuf,

    /// Display name of the bank
    #[arg(long, default_value = "MyBank")]
    bank_name: String,

    /// Read the script on a separate task
    #[arg(long = "async")]
    use_async: bool,
}

fn main() {
    init_tracing();
    if let Err(err) = run_app(Cli::parse()) {
        eprintln!("Error: {}", err);
        process::exit(1);
    }
}

/// Logs go to stderr so stdout carries only the report.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "bank_ledger=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run_app(cli: Cli) -> Result<(), Box<dyn Error>> {
    if !cli.use_async {
        return run(&cli.bank_name, &cli.input, std::io::stdout());
    }
    let runtime = tokio::runtime::Runtime::new()?;
    runtime
        .block_on(run_async(&cli.bank_name, &cli.input, std::io::stdout()))
        .map_err(|err| err as Box<dyn Error>)
}
