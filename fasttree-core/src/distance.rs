//! Distance functions (C3): uncorrected and model-corrected profile
//! distance.

use crate::alphabet::Alphabet;
use crate::profile::Profile;

/// Uncorrected profile distance.
///
/// Column `j` contributes `p1[:,j]^T U p2[:,j]`, weighted by the product of
/// the two profiles' ungapped weights at `j`. Returns `0.0` when the two
/// profiles share no non-gap column — there is no evidence to estimate a
/// distance from, so this is treated as "no distance" rather than an
/// error.
pub fn profile_distance_uncorrected(p1: &Profile, p2: &Profile, u: &[Vec<f64>]) -> f64 {
  debug_assert_eq!(p1.len(), p2.len());

  let mut weighted_sum = 0.0_f64;
  let mut weight_total = 0.0_f64;

  for j in 0..p1.len() {
    let w = p1.ungapped[j] * p2.ungapped[j];
    if w == 0.0 {
      continue;
    }
    let d_j = quadratic_form(p1.column(j), u, p2.column(j));
    weighted_sum += d_j * w;
    weight_total += w;
  }

  if weight_total == 0.0 {
    0.0
  } else {
    weighted_sum / weight_total
  }
}

/// `p1^T U p2`, i.e. `sum_{a,b} p1[a] * U[a][b] * p2[b]`.
fn quadratic_form(p1: &[f64], u: &[Vec<f64>], p2: &[f64]) -> f64 {
  let mut total = 0.0_f64;
  for (a, &p1a) in p1.iter().enumerate() {
    if p1a == 0.0 {
      continue;
    }
    let row = &u[a];
    let mut row_dot = 0.0_f64;
    for (b, &p2b) in p2.iter().enumerate() {
      row_dot += row[b] * p2b;
    }
    total += p1a * row_dot;
  }
  total
}

/// Model-corrected profile distance: `correction(profile_distance_uncorrected(..))`.
pub fn profile_distance_corrected(p1: &Profile, p2: &Profile, u: &[Vec<f64>], alphabet: Alphabet) -> f64 {
  alphabet.correction(profile_distance_uncorrected(p1, p2, u))
}

/// Fast path for two full-length leaf sequences with identical column
/// coverage (both from `Profile::from_aligned_string`, no gaps so far
/// introduced by joins): raw distance reduces to `mismatches / length`,
/// permitted as an optimisation.
pub fn leaf_distance_uncorrected_fast(s1: &str, s2: &str) -> f64 {
  debug_assert_eq!(s1.chars().count(), s2.chars().count());
  let len = s1.chars().count();
  if len == 0 {
    return 0.0;
  }
  let mismatches = s1
    .chars()
    .zip(s2.chars())
    .filter(|(a, b)| a.to_ascii_uppercase() != b.to_ascii_uppercase())
    .count();
  mismatches as f64 / len as f64
}
