//! Newick serialisation of the abstract output tree.
//!
//! Grounded in the general shape of Newick writers in
//! `other_examples/9c7a446c_PathoGenOmics-Lab-distree` and
//! `other_examples/96292739_joklawitter-nexwick`: recursive descent with
//! parent-write-after-children, `name:branch_length` leaf tokens, and a
//! trailing `;`.

use crate::tree_repr::{BranchLength, Tree, TreeNode};
use std::fmt::Write as _;

/// Sentinel written in place of a literal infinity, since Newick has no
/// infinity token and most downstream parsers choke on one. `1e6` is far
/// beyond any realistic corrected substitution distance, so it reads
/// unambiguously as "saturated" to a human inspecting the file.
pub const SATURATED_BRANCH_LENGTH_SENTINEL: f64 = 1e6;

/// Renders `tree` as a Newick string, terminated with `;` and a trailing
/// newline.
pub fn to_newick(tree: &Tree) -> String {
  let mut out = String::new();
  write_node(&tree.root, &mut out);
  out.push(';');
  out.push('\n');
  out
}

fn write_node(node: &TreeNode, out: &mut String) {
  match node {
    TreeNode::Leaf { label } => {
      write!(out, "{}", escape_label(label)).expect("writing to a String never fails");
    }
    TreeNode::Internal { children } => {
      out.push('(');
      for (i, (child, branch_length)) in children.iter().enumerate() {
        if i > 0 {
          out.push(',');
        }
        write_node(child, out);
        write!(out, ":{}", format_branch_length(*branch_length)).expect("writing to a String never fails");
      }
      out.push(')');
    }
  }
}

fn format_branch_length(branch_length: BranchLength) -> String {
  match branch_length {
    BranchLength::Finite(d) => format!("{d}"),
    BranchLength::Saturated => format!("{SATURATED_BRANCH_LENGTH_SENTINEL}"),
  }
}

/// Newick reserves `()[]:;,` and whitespace in unquoted labels; replace
/// them with underscores rather than quoting, matching common FastTree
/// output conventions.
fn escape_label(label: &str) -> String {
  label
    .chars()
    .map(|c| if "()[]:;, \t\n".contains(c) { '_' } else { c })
    .collect()
}
