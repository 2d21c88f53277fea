//! Grove CLI Binary
//!
//! Command-line interface for the ordered forest store.

use anyhow::Context;
use clap::Parser;
use grove::tooling::cli::{Cli, CliContext};
use std::process;

fn run(cli: &Cli) -> anyhow::Result<String> {
    let context = CliContext::from_cli(cli).with_context(|| {
        format!("Error initializing workspace {}", cli.workspace.display())
    })?;
    Ok(context.execute(&cli.command)?)
}

fn main() {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}
