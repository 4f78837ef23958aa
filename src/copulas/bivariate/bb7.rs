//! # BB7
//!
//! $$
//! C(u_1,u_2)=1-\left(1-\left[(1-\bar u_1^\theta)^{-\delta}+(1-\bar u_2^\theta)^{-\delta}-1\right]^{-1/\delta}\right)^{1/\theta}
//! $$
//!
use ndarray::array;
use ndarray::Array1;
use ndarray::Array2;

use super::archimedean::pow1m;
use super::archimedean::tau_from_generator;
use super::BicopFamily;
use crate::error::Result;
use crate::tools::map_rows;
use crate::tools::TRIM_EPS;
use crate::traits::BivariateExt;

#[derive(Debug, Clone)]
pub struct Bb7 {
  pub theta: f64,
  pub delta: f64,
}

impl Default for Bb7 {
  fn default() -> Self {
    Self {
      theta: 1.0,
      delta: 0.01,
    }
  }
}

impl Bb7 {
  pub fn new(theta: f64, delta: f64) -> Self {
    Self { theta, delta }
  }

  // 1 - ū^θ
  fn v(&self, u: f64) -> f64 {
    1.0 - pow1m(u, self.theta)
  }

  // (1 - ū^θ)^{-δ} - 1
  fn y(&self, u: f64) -> f64 {
    (-self.delta * self.v(u).ln()).exp_m1()
  }

  fn k(&self, u: f64) -> f64 {
    self.v(u).powf(-self.delta - 1.0) * pow1m(u, self.theta - 1.0)
  }
}

fn clamp_unit(u: f64) -> f64 {
  u.clamp(TRIM_EPS, 1.0 - TRIM_EPS)
}

impl BivariateExt for Bb7 {
  fn family(&self) -> BicopFamily {
    BicopFamily::Bb7
  }

  fn parameters(&self) -> Array1<f64> {
    array![self.theta, self.delta]
  }

  fn parameters_bounds(&self) -> Array2<f64> {
    array![[1.0, 6.0], [0.01, 25.0]]
  }

  fn store_parameters(&mut self, parameters: &Array1<f64>) {
    self.theta = parameters[0];
    self.delta = parameters[1];
  }

  fn pdf_raw(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
    let (theta, delta) = (self.theta, self.delta);
    Ok(map_rows(u, |u1, u2| {
      let (u1, u2) = (clamp_unit(u1), clamp_unit(u2));
      let s = self.y(u1) + self.y(u2);
      let z = (-s.ln_1p() / delta).exp();
      self.k(u1)
        * self.k(u2)
        * (1.0 - z).powf(1.0 / theta - 2.0)
        * (1.0 + s).powf(-1.0 / delta - 2.0)
        * (theta * (1.0 + delta) - z * (theta * delta + 1.0))
    }))
  }

  fn cdf_raw(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
    let (theta, delta) = (self.theta, self.delta);
    Ok(map_rows(u, |u1, u2| {
      if u1 <= 0.0 || u2 <= 0.0 {
        return 0.0;
      }
      let s = self.y(u1) + self.y(u2);
      let z = (-s.ln_1p() / delta).exp();
      1.0 - (1.0 - z).powf(1.0 / theta)
    }))
  }

  fn hfunc1_raw(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
    let (theta, delta) = (self.theta, self.delta);
    Ok(map_rows(u, |u1, u2| {
      let (u1, u2) = (clamp_unit(u1), clamp_unit(u2));
      let s = self.y(u1) + self.y(u2);
      let z = (-s.ln_1p() / delta).exp();
      (1.0 - z).powf(1.0 / theta - 1.0) * (1.0 + s).powf(-1.0 / delta - 1.0) * self.k(u1)
    }))
  }

  fn parameters_to_tau(&self, parameters: &Array1<f64>) -> Result<f64> {
    let (theta, delta) = (parameters[0], parameters[1]);
    Ok(tau_from_generator(|t| {
      let v = 1.0 - pow1m(t, theta);
      -(v - v.powf(delta + 1.0)) / (delta * theta * pow1m(t, theta - 1.0))
    }))
  }

  /// Starts from the Clayton edge `theta = 1`, which matches `tau` exactly.
  fn tau_to_parameters(&self, tau: f64) -> Result<Array1<f64>> {
    let tau = tau.abs();
    Ok(array![1.0, 2.0 * tau / (1.0 - tau)])
  }

  fn clone_box(&self) -> Box<dyn BivariateExt> {
    Box::new(self.clone())
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;

  use super::*;

  #[test]
  fn matches_reference_values() {
    let bb7 = Bb7::new(2.0, 1.5);
    let u = array![[0.3, 0.65]];
    assert_abs_diff_eq!(bb7.hfunc1_raw(&u).unwrap()[0], 0.8593600, epsilon = 1e-6);
    assert_abs_diff_eq!(bb7.pdf_raw(&u).unwrap()[0], 0.8363334, epsilon = 1e-6);
    assert_abs_diff_eq!(bb7.cdf_raw(&array![[0.3, 1.0]]).unwrap()[0], 0.3, epsilon = 1e-12);
  }

  #[test]
  fn clayton_edge_tau() {
    let bb7 = Bb7::default();
    assert_abs_diff_eq!(bb7.parameters_to_tau(&array![1.0, 2.0]).unwrap(), 0.5, epsilon = 1e-8);
    let p = bb7.get_start_parameters(0.4).unwrap();
    assert_abs_diff_eq!(bb7.parameters_to_tau(&p).unwrap(), 0.4, epsilon = 1e-7);
  }
}
