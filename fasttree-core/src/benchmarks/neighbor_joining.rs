//! Classical neighbor joining: builds the full uncorrected
//! pairwise distance matrix in O(N^2 L), then performs the standard N-2
//! joins using the Q-matrix criterion and limb-length formula, and finally
//! joins the two remaining nodes. O(N^2(N+L)) overall; exists to compare
//! the heuristic top-hits builder's tree quality on small alignments, not
//! to build production trees.

use crate::alignment::Alignment;
use crate::alphabet::Alphabet;
use crate::distance::profile_distance_uncorrected;
use crate::make_internal_report;
use crate::profile::Profile;
use crate::tree_repr::{BranchLength, Tree, TreeNode};
use eyre::Result;
use std::collections::HashMap;

/// Builds a tree from `alignment` via classical neighbor joining.
pub fn neighbor_joining(alignment: &Alignment, alphabet: Alphabet) -> Result<Tree> {
  let labels: Vec<&str> = alignment.labels().collect();
  let n = labels.len();
  debug_assert!(n > 0, "Alignment::new rejects empty alignments");

  if n == 1 {
    return Ok(Tree {
      root: TreeNode::Leaf { label: labels[0].to_owned() },
    });
  }

  let u = alphabet.unsimilarity();
  let profiles: Vec<Profile> = alignment
    .sequences()
    .map(|seq| Profile::from_aligned_string(seq, alphabet))
    .collect::<Result<_>>()?;

  // node id -> (node id -> distance), for the currently active node set.
  let mut distances: HashMap<usize, HashMap<usize, f64>> = HashMap::new();
  for i in 0..n {
    let mut row = HashMap::with_capacity(n);
    for j in 0..n {
      row.insert(j, if i == j { 0.0 } else { profile_distance_uncorrected(&profiles[i], &profiles[j], &u) });
    }
    distances.insert(i, row);
  }

  // child id -> (parent id, branch length), built up as joins happen.
  let mut edges: HashMap<usize, (usize, f64)> = HashMap::new();

  for join in 0..n.saturating_sub(2) {
    let active: usize = n - join;
    let total_distance: HashMap<usize, f64> = distances.iter().map(|(&i, row)| (i, row.values().sum())).collect();

    let mut best: Option<(f64, usize, usize)> = None;
    for (&i, row) in &distances {
      for (&j, &d_ij) in row {
        if i == j {
          continue;
        }
        let q = (active as f64 - 2.0) * d_ij - total_distance[&i] - total_distance[&j];
        if best.is_none_or(|(best_q, _, _)| q < best_q) {
          best = Some((q, i, j));
        }
      }
    }

    let (_, i, j) = best.ok_or_else(|| make_internal_report!("no join candidate found with {active} active nodes"))?;

    let d_ij = distances[&i][&j];
    let delta = (total_distance[&i] - total_distance[&j]) / (active as f64 - 2.0);
    let limb_i = (d_ij + delta) / 2.0;
    let limb_j = (d_ij - delta) / 2.0;

    let new_id = n + join;
    let mut new_row = HashMap::with_capacity(distances.len() - 1);
    new_row.insert(new_id, 0.0);
    for (&k, row) in &distances {
      if k == i || k == j {
        continue;
      }
      let d_k = (row[&i] + row[&j] - d_ij) / 2.0;
      new_row.insert(k, d_k);
    }
    for (k, d_k) in new_row.clone() {
      if k == new_id {
        continue;
      }
      distances.get_mut(&k).expect("k is still active").insert(new_id, d_k);
    }
    distances.retain(|&k, _| k != i && k != j);
    for row in distances.values_mut() {
      row.remove(&i);
      row.remove(&j);
    }
    distances.insert(new_id, new_row);

    edges.insert(i, (new_id, limb_i));
    edges.insert(j, (new_id, limb_j));
  }

  debug_assert_eq!(distances.len(), 2);
  let mut remaining = distances.keys().copied();
  let i = remaining.next().expect("exactly two nodes remain");
  let j = remaining.next().expect("exactly two nodes remain");
  let d_ij = distances[&i][&j];

  let root_id = n + n.saturating_sub(2);
  edges.insert(i, (root_id, d_ij / 2.0));
  edges.insert(j, (root_id, d_ij / 2.0));

  let mut children_of: HashMap<usize, Vec<(usize, f64)>> = HashMap::new();
  for (&child, &(parent, length)) in &edges {
    children_of.entry(parent).or_default().push((child, length));
  }

  Ok(Tree {
    root: build_node(root_id, n, &labels, &children_of),
  })
}

fn build_node(id: usize, n: usize, labels: &[&str], children_of: &HashMap<usize, Vec<(usize, f64)>>) -> TreeNode {
  if id < n {
    return TreeNode::Leaf { label: labels[id].to_owned() };
  }
  let children = &children_of[&id];
  debug_assert_eq!(children.len(), 2, "every internal node has exactly two children");
  let (left_id, left_len) = children[0];
  let (right_id, right_len) = children[1];
  TreeNode::Internal {
    children: [
      (Box::new(build_node(left_id, n, labels, children_of)), BranchLength::Finite(left_len)),
      (Box::new(build_node(right_id, n, labels, children_of)), BranchLength::Finite(right_len)),
    ],
  }
}
