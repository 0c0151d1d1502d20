//! The `sample` subcommand: the `sampler.py` collaborator,
//! reimplemented. Samples `n` distinct records uniformly at random without
//! replacement and writes them out in sampled (not input) order, matching
//! the original's use of Python's `random.sample`.

use eyre::{Result, WrapErr};
use fasttree_core::bail_invalid_argument;
use fasttree_core::io::fasta::{FastaReader, FastaWriter};
use log::info;
use rand::seq::index::sample;

use crate::cli::SampleArgs;

pub fn sample_records(args: &SampleArgs) -> Result<()> {
  if args.n == 0 {
    bail_invalid_argument!("must sample at least 1 sequence, got -n {}", args.n);
  }

  info!("Reading records from '{}'", args.input_fasta.display());
  let mut reader = FastaReader::from_path(&args.input_fasta).wrap_err_with(|| format!("When opening FASTA file '{}'", args.input_fasta.display()))?;
  let records = reader.read_all().wrap_err_with(|| format!("When reading FASTA file '{}'", args.input_fasta.display()))?;

  if args.n > records.len() {
    bail_invalid_argument!("cannot sample {} sequences from a file with {} sequences", args.n, records.len());
  }

  let mut rng = rand::thread_rng();
  let indices = sample(&mut rng, records.len(), args.n);

  let mut writer = FastaWriter::from_path(&args.output).wrap_err_with(|| format!("When creating output file '{}'", args.output.display()))?;
  for i in indices.iter() {
    writer.write_record(&records[i]).wrap_err("When writing a sampled record")?;
  }

  info!("Wrote {} sampled sequences to '{}'", args.n, args.output.display());
  Ok(())
}
