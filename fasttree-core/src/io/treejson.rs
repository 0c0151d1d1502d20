//! JSON serialisation of the abstract output tree.
//!
//! The tree shape itself (serde derives on plain structs) follows the
//! same pattern as Nextclade's own output-tree JSON shapes: tagged enums
//! for the branch-length special case, `#[serde(rename_all =
//! "camelCase")]` for JSON-facing field names.

use crate::tree_repr::{BranchLength, Tree, TreeNode};
use serde::{Deserialize, Serialize};

/// JSON forbids the `Infinity` literal, so a saturated branch length is
/// represented as a tagged variant instead of a bare float.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum BranchLengthJson {
  Finite { value: f64 },
  Saturated,
}

impl From<BranchLength> for BranchLengthJson {
  fn from(b: BranchLength) -> Self {
    match b {
      BranchLength::Finite(value) => Self::Finite { value },
      BranchLength::Saturated => Self::Saturated,
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TreeNodeJson {
  Leaf {
    label: String,
  },
  Internal {
    children: Vec<TreeNodeChildJson>,
  },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNodeChildJson {
  pub node: TreeNodeJson,
  pub branch_length: BranchLengthJson,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeJson {
  pub root: TreeNodeJson,
}

impl From<&TreeNode> for TreeNodeJson {
  fn from(node: &TreeNode) -> Self {
    match node {
      TreeNode::Leaf { label } => Self::Leaf { label: label.clone() },
      TreeNode::Internal { children } => Self::Internal {
        children: children
          .iter()
          .map(|(child, branch_length)| TreeNodeChildJson {
            node: TreeNodeJson::from(&**child),
            branch_length: BranchLengthJson::from(*branch_length),
          })
          .collect(),
      },
    }
  }
}

impl From<&Tree> for TreeJson {
  fn from(tree: &Tree) -> Self {
    Self { root: TreeNodeJson::from(&tree.root) }
  }
}

/// Serialises `tree` to a pretty-printed JSON string.
pub fn to_json(tree: &Tree) -> eyre::Result<String> {
  let json = TreeJson::from(tree);
  Ok(serde_json::to_string_pretty(&json)?)
}
