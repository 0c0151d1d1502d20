//! Buffered, multi-line-aware FASTA reading and writing.
//!
//! Mirrors the `nextclade::io::fasta::{FastaReader, FastaRecord,
//! FastaWriter}` shape, adapted to this crate's error type.

use crate::alignment::Alignment;
use crate::bail_invalid_alignment;
use eyre::{Result, WrapErr};
use indexmap::IndexMap;
use std::io::{BufRead, BufReader, BufWriter, Write};

/// Sequences longer than this are wrapped across multiple lines on write,
/// matching the conventional FASTA line width.
pub const FASTA_LINE_WIDTH: usize = 80;

/// One FASTA record: a header (without the leading `>`) and its sequence
/// with all line breaks removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
  pub seq_name: String,
  pub seq: String,
}

/// Streaming reader over a buffered source, yielding one [`FastaRecord`]
/// per `>`-prefixed header and its (possibly multi-line) sequence.
pub struct FastaReader<R: BufRead> {
  reader: R,
  /// The header line for the next record, read ahead by the previous call
  /// to `read_next` (or the initial scan in `new`) so we know where one
  /// record's sequence body ends and the next header begins.
  pending_header: Option<String>,
  line_num: usize,
  exhausted: bool,
}

impl<R: BufRead> FastaReader<R> {
  pub fn new(mut reader: R) -> Result<Self> {
    let mut pending_header = None;
    let mut line_num = 0;
    let mut line = String::new();
    loop {
      line.clear();
      let n = reader.read_line(&mut line)?;
      if n == 0 {
        break;
      }
      line_num += 1;
      let trimmed = line.trim_end_matches(['\n', '\r']);
      if trimmed.is_empty() {
        continue;
      }
      if let Some(header) = trimmed.strip_prefix('>') {
        pending_header = Some(header.to_owned());
      } else {
        bail_invalid_alignment!("FASTA input must start with a '>' header, but line {line_num} is '{trimmed}'");
      }
      break;
    }

    let exhausted = pending_header.is_none();
    Ok(Self {
      reader,
      pending_header,
      line_num,
      exhausted,
    })
  }

  /// Reads the next record, or `None` at end of input.
  pub fn read_next(&mut self) -> Result<Option<FastaRecord>> {
    if self.exhausted {
      return Ok(None);
    }
    let seq_name = self.pending_header.take().expect("exhausted is false, so a pending header must exist");

    let mut seq = String::new();
    let mut line = String::new();
    loop {
      line.clear();
      let n = self.reader.read_line(&mut line)?;
      if n == 0 {
        self.exhausted = true;
        break;
      }
      self.line_num += 1;
      let trimmed = line.trim_end_matches(['\n', '\r']);
      if trimmed.is_empty() {
        continue;
      }
      if let Some(header) = trimmed.strip_prefix('>') {
        self.pending_header = Some(header.to_owned());
        break;
      }
      seq.push_str(trimmed);
    }

    Ok(Some(FastaRecord { seq_name, seq }))
  }

  /// Reads every remaining record.
  pub fn read_all(&mut self) -> Result<Vec<FastaRecord>> {
    let mut records = Vec::new();
    while let Some(record) = self.read_next()? {
      records.push(record);
    }
    Ok(records)
  }
}

impl FastaReader<BufReader<std::fs::File>> {
  pub fn from_path(path: impl AsRef<std::path::Path>) -> Result<Self> {
    let file = std::fs::File::open(path.as_ref())?;
    Self::new(BufReader::new(file))
  }
}

/// Loads a whole FASTA file into a validated [`Alignment`]:
/// the glue collaborator between the FASTA reader and the tree-building
/// engine. Record order is preserved; `Alignment::new` performs the
/// equal-length/non-empty/unique-label validation.
pub fn read_alignment_file(path: impl AsRef<std::path::Path>) -> Result<Alignment> {
  let path = path.as_ref();
  let mut reader = FastaReader::from_path(path).wrap_err_with(|| format!("When opening FASTA file '{}'", path.display()))?;
  let records = reader.read_all().wrap_err_with(|| format!("When reading FASTA file '{}'", path.display()))?;
  let map: IndexMap<String, String> = records.into_iter().map(|r| (r.seq_name, r.seq)).collect();
  Alignment::new(map).wrap_err_with(|| format!("When validating alignment read from '{}'", path.display()))
}

impl<'a> FastaReader<std::io::Cursor<&'a [u8]>> {
  pub fn from_str(s: &'a str) -> Result<Self> {
    Self::new(std::io::Cursor::new(s.as_bytes()))
  }
}

/// Buffered FASTA writer that wraps sequences at [`FASTA_LINE_WIDTH`].
pub struct FastaWriter<W: Write> {
  writer: W,
}

impl<W: Write> FastaWriter<W> {
  pub fn new(writer: W) -> Self {
    Self { writer }
  }

  pub fn write_record(&mut self, record: &FastaRecord) -> Result<()> {
    self.write(&record.seq_name, &record.seq)
  }

  pub fn write(&mut self, seq_name: &str, seq: &str) -> Result<()> {
    writeln!(self.writer, ">{seq_name}")?;
    let chars: Vec<char> = seq.chars().collect();
    for chunk in chars.chunks(FASTA_LINE_WIDTH) {
      let line: String = chunk.iter().collect();
      writeln!(self.writer, "{line}")?;
    }
    Ok(())
  }
}

impl FastaWriter<BufWriter<std::fs::File>> {
  pub fn from_path(path: impl AsRef<std::path::Path>) -> Result<Self> {
    let file = std::fs::File::create(path.as_ref())?;
    Ok(Self::new(BufWriter::new(file)))
  }
}
