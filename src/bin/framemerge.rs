//! Framemerge CLI Binary
//!
//! Command-line interface for resolving frame chains and merging their videos.

use clap::Parser;
use framemerge::logging::init_logging;
use framemerge::tooling::cli::{Cli, CliContext};
use std::process;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let context = match CliContext::new(cli.workspace.clone(), cli.config.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error initializing workspace: {}", e);
            process::exit(1);
        }
    };

    let logging = context.config().logging.clone().with_overrides(
        cli.log_level.clone(),
        cli.log_format.clone(),
        cli.log_output.clone(),
    );
    if let Err(e) = init_logging(
        Some(&logging),
        cli.log_file.clone(),
        Some(context.workspace_root()),
    ) {
        eprintln!("Error initializing logging: {}", e);
        process::exit(1);
    }

    match context.execute(&cli.command).await {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            if !e.is_reported() {
                eprintln!("Error: {}", e);
            }
            process::exit(1);
        }
    }
}
