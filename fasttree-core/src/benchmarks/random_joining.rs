//! Random joining: pick two active nodes uniformly at
//! random and join them, ignoring distance entirely. Branch lengths are
//! left at zero; this driver exists purely as a runtime/structural floor
//! to compare the heuristic builder against, not as a quality benchmark.

use crate::alignment::Alignment;
use crate::tree_repr::{BranchLength, Tree, TreeNode};
use eyre::Result;
use rand::seq::IteratorRandom;
use rand::Rng;

/// Builds a tree from `alignment` by repeatedly joining two uniformly
/// random active nodes, using `rng` for the random choices so tests and
/// callers can get reproducible output with a seeded generator.
pub fn random_joining(alignment: &Alignment, rng: &mut impl Rng) -> Result<Tree> {
  let mut active: Vec<TreeNode> = alignment.labels().map(|label| TreeNode::Leaf { label: label.to_owned() }).collect();

  if active.len() <= 1 {
    return Ok(Tree {
      root: active.pop().expect("alignment validation guarantees at least one sequence"),
    });
  }

  while active.len() > 1 {
    let i = (0..active.len()).choose(rng).expect("active is non-empty");
    let left = active.swap_remove(i);
    let j = (0..active.len()).choose(rng).expect("active has at least one element left");
    let right = active.swap_remove(j);

    active.push(TreeNode::Internal {
      children: [(Box::new(left), BranchLength::Finite(0.0)), (Box::new(right), BranchLength::Finite(0.0))],
    });
  }

  Ok(Tree {
    root: active.pop().expect("loop invariant: exactly one active node remains"),
  })
}
