//! `fasttree`: the CLI surface over `fasttree-core`.

mod cli;
mod commands;
mod logging;
mod memory;

use clap::Parser;
use cli::{Cli, Command};
use eyre::Result;

fn main() -> Result<()> {
  let cli = Cli::parse();
  logging::setup_logger(cli.log_level());

  match &cli.command {
    Command::Run(args) => commands::run::run(args),
    Command::Sample(args) => commands::sample::sample_records(args),
  }
}
