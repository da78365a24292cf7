//! `evalsheet`: bulk drafting of student-record evaluations from the terminal.
mod app;
mod cli;
mod effects;
mod render;
mod session;

use anyhow::Result;
use clap::Parser;

use crate::cli::Cli;

const LOG_FILENAME: &str = "evalsheet.log";

fn main() -> Result<()> {
    let cli = Cli::parse();
    engine_logging::initialize(
        cli.log.into(),
        cli.log_level,
        &cli.workdir.join(LOG_FILENAME),
    );

    app::execute(cli)
}
