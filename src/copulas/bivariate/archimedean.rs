//! # Archimedean
//!
//! $$
//! \tau = 1 + 4\int_0^1 \frac{\varphi(t)}{\varphi'(t)}\,dt
//! $$
//!
//! Kendall's tau from the generator and its numerical inverse, shared by the
//! families without a closed-form tau.
//!
use roots::find_root_brent;
use roots::SimpleConvergency;

use crate::error::BicopError;
use crate::error::Result;

/// Kendall's tau given the generator ratio `φ(t) / φ'(t)` on (0, 1).
pub fn tau_from_generator<F>(ratio: F) -> f64
where
  F: Fn(f64) -> f64,
{
  let integral = quadrature::double_exponential::integrate(
    |t| {
      let r = ratio(t);
      if r.is_finite() {
        r
      } else {
        0.0
      }
    },
    0.0,
    1.0,
    1e-10,
  )
  .integral;
  (1.0 + 4.0 * integral).clamp(-1.0, 1.0)
}

/// Solves `tau_fn(theta) = tau` for theta in `[lower, upper]`.
///
/// `tau_fn` must be increasing. Targets outside the attainable range map to
/// the nearest bound.
pub fn invert_tau<F>(tau: f64, lower: f64, upper: f64, tau_fn: F) -> Result<f64>
where
  F: Fn(f64) -> f64,
{
  let (tau_lo, tau_hi) = (tau_fn(lower), tau_fn(upper));
  if tau <= tau_lo {
    return Ok(lower);
  }
  if tau >= tau_hi {
    return Ok(upper);
  }

  let mut convergency = SimpleConvergency {
    eps: 1e-10,
    max_iter: 200,
  };
  find_root_brent(lower, upper, |theta| tau_fn(theta) - tau, &mut convergency)
    .map_err(|e| BicopError::Numerical(format!("tau inversion failed: {e:?}")))
}

/// `(1 - t)^theta` computed through `ln(1 - t)` for accuracy near zero.
pub(crate) fn pow1m(t: f64, theta: f64) -> f64 {
  (theta * (-t).ln_1p()).exp()
}
