use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use grove::cli::args::{Cli, Commands};
use grove::cli::commands;
use grove::error::GroveError;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("grove=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), GroveError> {
    let cli = Cli::parse();
    let format = cli.output;

    let output = match cli.command {
        Commands::Plant(args) => commands::plant(args, format)?,
        Commands::History(args) => commands::history(&args, format)?,
        Commands::Delete { id } => commands::delete(id, format)?,
        Commands::Clear { force } => commands::clear(force, format)?,
        Commands::Stats(args) => commands::stats(&args, format)?,
        Commands::Config(args) => commands::config(args.command, format)?,
        Commands::Completions { shell } => commands::completions(&shell)?,
    };

    if !output.is_empty() {
        println!("{}", output);
    }
    Ok(())
}
