//! The tree-building engine (C6): top-hits heuristic join loop over a
//! validated [`crate::alignment::Alignment`].

mod builder;
mod params;

pub use builder::TreeBuilder;
pub use params::{AlphabetChoice, TreeBuilderParams};
