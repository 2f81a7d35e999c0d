//! apcheck CLI entry point.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use apcheck::cli::{self, Cli, Commands, EXIT_ERROR};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Lint(args) => cli::run_lint(args),
        Commands::Rules => cli::run_rules(),
        Commands::Init(args) => cli::run_init(args),
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_ERROR
        }
    };

    std::process::exit(exit_code);
}
