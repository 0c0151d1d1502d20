//! The alignment input collaborator: a validated, ordered
//! mapping from label to aligned sequence.

use crate::bail_invalid_alignment;
use eyre::Result;
use indexmap::IndexMap;

/// A multiple sequence alignment: every sequence the same length, labels
/// unique and non-empty, at least one sequence.
#[derive(Debug, Clone)]
pub struct Alignment {
  records: IndexMap<String, String>,
  length: usize,
}

impl Alignment {
  /// Validates and wraps `records` (preserving iteration order, which
  /// becomes leaf ID assignment order in [`crate::tree::TreeBuilder`]).
  pub fn new(records: IndexMap<String, String>) -> Result<Self> {
    if records.is_empty() {
      bail_invalid_alignment!("alignment must contain at least one sequence");
    }

    let mut length = None;
    for (label, seq) in &records {
      if label.is_empty() {
        bail_invalid_alignment!("sequence labels must not be empty");
      }
      let seq_len = seq.chars().count();
      match length {
        None => length = Some(seq_len),
        Some(l) if l != seq_len => {
          bail_invalid_alignment!(
            "all sequences must have the same length, but '{label}' has length {seq_len} while a previous sequence has length {l}"
          );
        }
        Some(_) => {}
      }
    }

    let length = length.expect("checked non-empty above");
    if length == 0 {
      bail_invalid_alignment!("alignment length must be greater than zero");
    }

    Ok(Self { records, length })
  }

  pub fn len(&self) -> usize {
    self.records.len()
  }

  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }

  pub fn sequence_length(&self) -> usize {
    self.length
  }

  pub fn labels(&self) -> impl Iterator<Item = &str> {
    self.records.keys().map(String::as_str)
  }

  pub fn sequences(&self) -> impl Iterator<Item = &str> {
    self.records.values().map(String::as_str)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.records.iter().map(|(l, s)| (l.as_str(), s.as_str()))
  }
}
