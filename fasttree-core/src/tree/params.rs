//! Configuration layer for the tree-building engine: a `clap::Parser` +
//! `Default` struct, flattened into the CLI's run args.

use crate::alphabet::Alphabet;
use clap::{Parser, ValueEnum};

/// Substitution model selection: `Dna` and `Protein` pin the
/// model; `Auto` sniffs it from the alignment's characters (see
/// [`Alphabet::detect`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[clap(rename_all = "kebab-case")]
pub enum AlphabetChoice {
  Dna,
  Protein,
  Auto,
}

impl AlphabetChoice {
  pub fn resolve<'a>(self, sequences: impl IntoIterator<Item = &'a str>) -> Alphabet {
    match self {
      Self::Dna => Alphabet::Dna,
      Self::Protein => Alphabet::Protein,
      Self::Auto => Alphabet::detect(sequences),
    }
  }
}

/// Knobs for [`crate::tree::TreeBuilder`].
#[derive(Debug, Clone, Parser)]
pub struct TreeBuilderParams {
  /// Multiplier used to compute the top-hits threshold:
  /// `thresh_cp * floor(sqrt(num_sequences))`. Higher is safer but slower.
  #[clap(long, default_value_t = 2)]
  pub thresh_cp: u32,

  /// Interval, in join steps, at which top-hits lists are recomputed from
  /// scratch for every active node. Defaults to `2 * num_sequences` when
  /// omitted.
  #[clap(long)]
  pub refresh_interval: Option<usize>,

  /// Substitution model to interpret the alignment under.
  #[clap(long, value_enum, default_value_t = AlphabetChoice::Auto)]
  pub alphabet: AlphabetChoice,
}

impl Default for TreeBuilderParams {
  fn default() -> Self {
    Self {
      thresh_cp: 2,
      refresh_interval: None,
      alphabet: AlphabetChoice::Auto,
    }
  }
}

impl TreeBuilderParams {
  pub(crate) fn refresh_interval_or_default(&self, num_sequences: usize) -> usize {
    self.refresh_interval.unwrap_or(2 * num_sequences).max(1)
  }
}
