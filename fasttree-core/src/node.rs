//! NodeInfo (C4): wraps a [`Profile`] with the out-distance offset and
//! variance used by the weighted-join step.

use crate::distance::profile_distance_uncorrected;
use crate::profile::Profile;

/// A node's distance-relevant state: its profile, its accumulated
/// up-distance offset, and the variance used to weight its contribution to
/// a future join.
///
/// Leaves start with `up_distance = 0.0`, `variance = 0.0`; internal nodes
/// get both from [`nodeinfo_join`] at the step that created them. Once
/// constructed a `NodeInfo` is never mutated ("created once ...
/// and never mutated").
#[derive(Debug, Clone, PartialEq)]
pub struct NodeInfo {
  pub profile: Profile,
  pub up_distance: f64,
  pub variance: f64,
}

impl NodeInfo {
  pub fn leaf(profile: Profile) -> Self {
    Self {
      profile,
      up_distance: 0.0,
      variance: 0.0,
    }
  }
}

/// The outcome of joining two nodes: the new internal node's
/// `NodeInfo`, plus the two branch lengths leading to its children.
pub struct Join {
  pub node_info: NodeInfo,
  pub left_branch: f64,
  pub right_branch: f64,
}

/// `profile_distance_uncorrected(p1, p2) - n1.up_distance - n2.up_distance`
/// This is the "out-distance-adjusted" measure the join loop
/// minimises.
pub fn nodeinfo_distance(n1: &NodeInfo, n2: &NodeInfo, u: &[Vec<f64>]) -> f64 {
  profile_distance_uncorrected(&n1.profile, &n2.profile, u) - n1.up_distance - n2.up_distance
}

/// Weighted join of two nodes: the variance-weighted split
/// coefficient `alpha`, the derived branch lengths and up-distance, and the
/// new node's profile via [`Profile::weighted_join`].
pub fn nodeinfo_join(n1: &NodeInfo, n2: &NodeInfo, u: &[Vec<f64>], d: Option<f64>) -> Join {
  let d = d.unwrap_or_else(|| nodeinfo_distance(n1, n2, u));
  let v1 = n1.variance;
  let v2 = n2.variance;

  let alpha = if v1 + v2 == 0.0 {
    0.5
  } else {
    (0.5 + (v2 - v1) / (2.0 * (v1 + v2))).clamp(0.0, 1.0)
  };

  let left_branch = alpha * d;
  let right_branch = (1.0 - alpha) * d;

  let up_distance = if d == 0.0 {
    0.0
  } else {
    d / 2.0 + (v1 - v2).abs() / (2.0 * d)
  };

  let variance = alpha.powi(2) * v1 + (1.0 - alpha).powi(2) * v2;

  let profile = Profile::weighted_join(&n1.profile, &n2.profile, alpha, 1.0 - alpha);

  Join {
    node_info: NodeInfo {
      profile,
      up_distance,
      variance,
    },
    left_branch,
    right_branch,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::alphabet::Alphabet;
  use pretty_assertions::assert_eq;

  fn leaf(s: &str) -> NodeInfo {
    NodeInfo::leaf(Profile::from_aligned_string(s, Alphabet::Dna).unwrap())
  }

  #[test]
  fn distance_between_identical_leaves_is_zero() {
    let u = Alphabet::Dna.unsimilarity();
    let n = leaf("ACGT");
    assert_eq!(nodeinfo_distance(&n, &n, &u), 0.0);
  }

  #[test]
  fn join_of_two_leaves_splits_distance_evenly_when_variances_equal() {
    let u = Alphabet::Dna.unsimilarity();
    let n1 = leaf("ACGT");
    let n2 = leaf("TGCA");
    let join = nodeinfo_join(&n1, &n2, &u, None);
    assert_eq!(join.left_branch, join.right_branch);
    assert_eq!(join.left_branch + join.right_branch, 1.0);
    assert_eq!(join.node_info.variance, 0.0);
  }

  #[test]
  fn join_up_distance_is_zero_for_zero_distance_leaves() {
    let u = Alphabet::Dna.unsimilarity();
    let n1 = leaf("ACGT");
    let n2 = leaf("ACGT");
    let join = nodeinfo_join(&n1, &n2, &u, None);
    assert_eq!(join.node_info.up_distance, 0.0);
  }

  #[test]
  fn explicit_distance_overrides_recomputation() {
    let u = Alphabet::Dna.unsimilarity();
    let n1 = leaf("ACGT");
    let n2 = leaf("TGCA");
    let join = nodeinfo_join(&n1, &n2, &u, Some(2.0));
    assert_eq!(join.left_branch + join.right_branch, 2.0);
  }
}
