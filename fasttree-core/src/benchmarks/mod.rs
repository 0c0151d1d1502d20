//! Reference tree-construction benchmarks, used to sanity
//! check the top-hits heuristic against classical algorithms on small
//! inputs rather than to build production trees.

mod neighbor_joining;
mod random_joining;

pub use neighbor_joining::neighbor_joining;
pub use random_joining::random_joining;
