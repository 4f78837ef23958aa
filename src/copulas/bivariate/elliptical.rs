//! Kendall's tau of the elliptical families depends on the correlation only.
use std::f64::consts::FRAC_PI_2;

/// `tau = 2 asin(rho) / pi`.
pub fn rho_to_tau(rho: f64) -> f64 {
  rho.asin() / FRAC_PI_2
}

pub fn tau_to_rho(tau: f64) -> f64 {
  (tau * FRAC_PI_2).sin()
}
