//! Error kinds and the `eyre`-based context-propagation macros used
//! throughout the crate: `derive_more::Display` plus `eyre::Report`
//! rather than `thiserror`.

use derive_more::Display;

/// The three user-surfaceable error kinds.
///
/// `NumericOverflow` is deliberately absent: it is not an error,
/// it is the `+inf` return value of [`crate::alphabet::Alphabet::correction`].
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum FastTreeError {
  #[display("invalid alignment: {_0}")]
  InvalidAlignment(String),

  #[display("invalid alphabet: {_0}")]
  InvalidAlphabet(String),

  #[display("invalid argument: {_0}")]
  InvalidArgument(String),
}

impl std::error::Error for FastTreeError {}

/// Builds an ad hoc internal-error `Report`, for invariant violations that
/// indicate a bug rather than bad input ("internal
/// consistency checks ... may abort").
#[macro_export]
macro_rules! make_internal_report {
  ($($arg:tt)*) => {
    eyre::eyre!("Internal error: {}", format!($($arg)*))
  };
}

/// Constructs and returns an `Err(FastTreeError::InvalidAlignment(..))`.
#[macro_export]
macro_rules! bail_invalid_alignment {
  ($($arg:tt)*) => {
    return Err($crate::error::FastTreeError::InvalidAlignment(format!($($arg)*)).into())
  };
}

/// Constructs and returns an `Err(FastTreeError::InvalidAlphabet(..))`.
#[macro_export]
macro_rules! bail_invalid_alphabet {
  ($($arg:tt)*) => {
    return Err($crate::error::FastTreeError::InvalidAlphabet(format!($($arg)*)).into())
  };
}

/// Constructs and returns an `Err(FastTreeError::InvalidArgument(..))`.
#[macro_export]
macro_rules! bail_invalid_argument {
  ($($arg:tt)*) => {
    return Err($crate::error::FastTreeError::InvalidArgument(format!($($arg)*)).into())
  };
}
