//! Entry point: parses the CLI, initialises tracing, and hands off to the
//! frame pump in `run.rs`.

mod cli;
mod run;
mod settings;
mod telemetry;
mod view;

use anyhow::Result;

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();
    run::run(cli)
}
