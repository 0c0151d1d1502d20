//! Command-line surface: a `clap::Parser` struct with global verbosity
//! flags and a `run`/`sample` subcommand pair, mirroring the shape of
//! `nextalign_cli.rs`'s top-level args struct, adapted to clap's modern
//! derive API (no `AppSettings`, which older clap-3-era code still
//! carries).

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use fasttree_core::tree::TreeBuilderParams;

#[derive(Debug, Parser)]
#[command(name = "fasttree", author, version, about = "Approximate phylogenetic tree construction from a multiple sequence alignment.")]
pub struct Cli {
  #[command(subcommand)]
  pub command: Command,

  /// Increase verbosity. May be repeated (-v, -vv, -vvv) for more detail.
  #[arg(short = 'v', long = "verbose", global = true, action = clap::ArgAction::Count)]
  pub verbose: u8,

  /// Decrease verbosity. May be repeated (-q, -qq) to suppress more output.
  #[arg(short = 'q', long = "quiet", global = true, action = clap::ArgAction::Count, conflicts_with = "verbose")]
  pub quiet: u8,
}

impl Cli {
  /// Resolves the `-v`/`-q` counts to a `log::LevelFilter`, anchored at
  /// `Info` (one `-v` reaches `Debug`, two reaches `Trace`; one `-q`
  /// lowers to `Warn`, two to `Error`, three or more silences logging).
  pub fn log_level(&self) -> log::LevelFilter {
    use log::LevelFilter::{Debug, Error, Info, Off, Trace, Warn};
    let net = i16::from(self.verbose) - i16::from(self.quiet);
    match net {
      ..=-3 => Off,
      -2 => Error,
      -1 => Warn,
      0 => Info,
      1 => Debug,
      2.. => Trace,
    }
  }
}

#[derive(Debug, Subcommand)]
pub enum Command {
  /// Builds a tree from a FASTA alignment.
  Run(RunArgs),
  /// Samples a subset of sequences from a FASTA file.
  Sample(SampleArgs),
}

/// Which engine builds the tree: the top-hits heuristic (`slowtree`,
/// despite the name — it is the production engine and the default), or one
/// of the two reference benchmarks (`nj`, `random`) kept for comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[clap(rename_all = "kebab-case")]
pub enum Algo {
  Slowtree,
  Nj,
  Random,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[clap(rename_all = "kebab-case")]
pub enum OutputFormat {
  Newick,
  Json,
}

#[derive(Debug, Parser)]
pub struct RunArgs {
  /// Path to a FASTA file with the input alignment (all sequences the same
  /// length).
  pub input_fasta: PathBuf,

  /// Path to write the resulting tree to.
  pub output: PathBuf,

  /// Tree-construction algorithm to use.
  #[arg(long, value_enum, default_value_t = Algo::Slowtree)]
  pub algo: Algo,

  /// Format to serialize the resulting tree in.
  #[arg(long = "output-format", value_enum, default_value_t = OutputFormat::Newick)]
  pub output_format: OutputFormat,

  #[command(flatten)]
  pub params: TreeBuilderParams,
}

#[derive(Debug, Parser)]
pub struct SampleArgs {
  /// Number of sequences to sample.
  #[arg(short = 'n', long)]
  pub n: usize,

  /// Path to the FASTA file to sample from.
  pub input_fasta: PathBuf,

  /// Path to write the sampled records to.
  pub output: PathBuf,
}
