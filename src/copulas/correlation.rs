//! # Correlation
//!
//! $$
//! \tau_b=\frac{n_c-n_d}{\sqrt{(n_0-n_1)(n_0-n_2)}}
//! $$
//!
use std::cmp::Ordering;

use ndarray::Array2;
use ndarray::ArrayView1;

use crate::error::BicopError;
use crate::error::Result;

/// Kendall's tau-b between two samples. Fewer than two observations or a
/// degenerate (all-tied) sample give zero.
pub fn kendall_tau(x: ArrayView1<f64>, y: ArrayView1<f64>) -> Result<f64> {
  if x.len() != y.len() {
    return Err(BicopError::InvalidInput(format!(
      "samples must have equal length, got {} and {}",
      x.len(),
      y.len()
    )));
  }
  if x.len() < 2 {
    return Ok(0.0);
  }

  let (tau, ..) = kendalls::tau_b_with_comparator(&x.to_vec(), &y.to_vec(), |a: &f64, b: &f64| {
    a.partial_cmp(b).unwrap_or(Ordering::Greater)
  })
  .map_err(|e| BicopError::InvalidInput(format!("kendall's tau: {e:?}")))?;

  Ok(if tau.is_finite() { tau } else { 0.0 })
}

/// Kendall's tau between the two columns of an n x 2 sample.
pub fn kendall_tau_cols(data: &Array2<f64>) -> Result<f64> {
  kendall_tau(data.column(0), data.column(1))
}
