//! Approximate phylogenetic tree construction from a pre-aligned set of
//! DNA or protein sequences, in the spirit of the FastTree family of
//! heuristics: profile-based distances, a top-hits candidate cache in
//! place of exhaustive neighbor-joining search, and a variance-weighted
//! join step.

pub mod alignment;
pub mod alphabet;
pub mod benchmarks;
pub mod distance;
pub mod error;
pub mod io;
pub mod node;
pub mod profile;
pub mod tree;
pub mod tree_repr;
pub mod union_find;

pub use alignment::Alignment;
pub use alphabet::Alphabet;
pub use error::FastTreeError;
pub use tree::{AlphabetChoice, TreeBuilder, TreeBuilderParams};
pub use tree_repr::{BranchLength, Tree, TreeNode};
