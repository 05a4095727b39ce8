mod classify;
mod cli;
mod columns;
mod commands;
mod config;
mod electronic;
mod locate;
mod model;
mod patterns;
mod pdftools;
mod pipeline;
mod quality;
mod scanned;
mod segment;
mod structure;
mod util;
mod validate;

use anyhow::Result;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};

fn main() {
    init_tracing();

    if let Err(err) = run() {
        error!(error = %err, "command failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Classify(args) => commands::classify::run(args),
        Commands::Locate(args) => commands::locate::run(args),
        Commands::Extract(args) => commands::extract::run(args),
        Commands::Pipeline(args) => commands::pipeline::run(args),
        Commands::Tools(args) => commands::tools::run(args),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
