//! # Empirical
//!
//! $$
//! \hat u_{ij}=\frac{R_{ij}}{n+1}
//! $$
//!
use ndarray::Array1;
use ndarray::Array2;
use ndarray::ArrayView1;
use ndarray::Axis;

use crate::error::BicopError;
use crate::error::Result;

/// Ranks `1..=n` of a sample, ties receive their average rank.
fn average_ranks(x: ArrayView1<f64>) -> Array1<f64> {
  let n = x.len();
  let mut order: Vec<(f64, usize)> = x.iter().enumerate().map(|(i, &v)| (v, i)).collect();
  order.sort_by(|a, b| a.0.total_cmp(&b.0));

  let mut ranks = Array1::<f64>::zeros(n);
  let mut start = 0;
  while start < n {
    let mut end = start + 1;
    while end < n && order[end].0 == order[start].0 {
      end += 1;
    }
    // positions start..end share rank (start + 1 + end) / 2
    let rank = (start + 1 + end) as f64 / 2.0;
    for &(_, i) in &order[start..end] {
      ranks[i] = rank;
    }
    start = end;
  }
  ranks
}

/// Column-wise rank transform to pseudo-observations in (0, 1).
pub fn pseudo_obs(x: &Array2<f64>) -> Result<Array2<f64>> {
  if x.nrows() == 0 {
    return Err(BicopError::InvalidInput("data must have at least one row".into()));
  }
  if x.iter().any(|v| !v.is_finite()) {
    return Err(BicopError::InvalidInput("data contains non-finite values".into()));
  }

  let scale = x.nrows() as f64 + 1.0;
  let mut out = Array2::<f64>::zeros(x.raw_dim());
  for (col, mut target) in x.axis_iter(Axis(1)).zip(out.axis_iter_mut(Axis(1))) {
    target.assign(&(average_ranks(col) / scale));
  }
  Ok(out)
}
