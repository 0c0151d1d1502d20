//! The `run` subcommand: loads a FASTA alignment, builds a tree with the
//! selected engine, and writes it out in Newick or JSON.

use std::time::Instant;

use eyre::{Result, WrapErr};
use log::info;

use fasttree_core::benchmarks::{neighbor_joining, random_joining};
use fasttree_core::io::fasta::read_alignment_file;
use fasttree_core::io::{newick, treejson};
use fasttree_core::tree::TreeBuilder;
use fasttree_core::tree_repr::Tree;

use crate::cli::{Algo, OutputFormat, RunArgs};
use crate::memory::peak_rss_mib;

pub fn run(args: &RunArgs) -> Result<()> {
  let start = Instant::now();

  info!("Loading alignment from '{}'", args.input_fasta.display());
  let alignment = read_alignment_file(&args.input_fasta)?;
  info!("Loaded {} sequences of length {}", alignment.len(), alignment.sequence_length());

  let alphabet = args.params.alphabet.resolve(alignment.sequences());

  let tree = match args.algo {
    Algo::Slowtree => {
      info!("Building tree with the top-hits heuristic engine");
      let builder = TreeBuilder::new(&alignment, &args.params).wrap_err("When initializing the tree builder")?;
      builder.build().wrap_err("When building the tree")?
    }
    Algo::Nj => {
      info!("Building tree with classical neighbor joining");
      neighbor_joining(&alignment, alphabet).wrap_err("When running neighbor joining")?
    }
    Algo::Random => {
      info!("Building tree by random joining");
      let mut rng = rand::thread_rng();
      random_joining(&alignment, &mut rng).wrap_err("When running random joining")?
    }
  };

  write_tree(&tree, args)?;

  let elapsed = start.elapsed();
  info!("Elapsed time: {:.3} s", elapsed.as_secs_f64());
  if let Some(peak_mib) = peak_rss_mib() {
    info!("Peak memory usage: {peak_mib:.2} MiB");
  }

  Ok(())
}

fn write_tree(tree: &Tree, args: &RunArgs) -> Result<()> {
  let rendered = match args.output_format {
    OutputFormat::Newick => newick::to_newick(tree),
    OutputFormat::Json => treejson::to_json(tree).wrap_err("When serializing tree to JSON")?,
  };
  std::fs::write(&args.output, rendered).wrap_err_with(|| format!("When writing tree to '{}'", args.output.display()))
}
