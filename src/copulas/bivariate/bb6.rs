//! # BB6
//!
//! $$
//! C(u_1,u_2)=1-\left(1-\exp\left(-\left[x_1^\delta+x_2^\delta\right]^{1/\delta}\right)\right)^{1/\theta},\quad x_i=-\ln\left(1-\bar u_i^\theta\right)
//! $$
//!
use ndarray::array;
use ndarray::Array1;
use ndarray::Array2;

use super::archimedean::pow1m;
use super::joe::joe_tau;
use super::BicopFamily;
use crate::error::Result;
use crate::tools::map_rows;
use crate::tools::TRIM_EPS;
use crate::traits::BivariateExt;

#[derive(Debug, Clone)]
pub struct Bb6 {
  pub theta: f64,
  pub delta: f64,
}

impl Default for Bb6 {
  fn default() -> Self {
    Self {
      theta: 1.0,
      delta: 1.0,
    }
  }
}

impl Bb6 {
  pub fn new(theta: f64, delta: f64) -> Self {
    Self { theta, delta }
  }

  fn x(&self, u: f64) -> f64 {
    -(-pow1m(u, self.theta)).ln_1p()
  }

  // x^{δ-1} ū^{θ-1} / (1 - ū^θ)
  fn k(&self, u: f64) -> f64 {
    let ubar_theta = pow1m(u, self.theta);
    self.x(u).powf(self.delta - 1.0) * pow1m(u, self.theta - 1.0) / (1.0 - ubar_theta)
  }
}

fn clamp_unit(u: f64) -> f64 {
  u.clamp(TRIM_EPS, 1.0 - TRIM_EPS)
}

impl BivariateExt for Bb6 {
  fn family(&self) -> BicopFamily {
    BicopFamily::Bb6
  }

  fn parameters(&self) -> Array1<f64> {
    array![self.theta, self.delta]
  }

  fn parameters_bounds(&self) -> Array2<f64> {
    array![[1.0, 6.0], [1.0, 8.0]]
  }

  fn store_parameters(&mut self, parameters: &Array1<f64>) {
    self.theta = parameters[0];
    self.delta = parameters[1];
  }

  fn pdf_raw(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
    let (theta, delta) = (self.theta, self.delta);
    Ok(map_rows(u, |u1, u2| {
      let (u1, u2) = (clamp_unit(u1), clamp_unit(u2));
      let w = (self.x(u1).powf(delta) + self.x(u2).powf(delta)).powf(1.0 / delta);
      let e = (-w).exp();
      self.k(u1)
        * self.k(u2)
        * (1.0 - e).powf(1.0 / theta - 2.0)
        * e
        * w.powf(1.0 - 2.0 * delta)
        * ((theta - e) * w + theta * (delta - 1.0) * (1.0 - e))
    }))
  }

  fn cdf_raw(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
    let (theta, delta) = (self.theta, self.delta);
    Ok(map_rows(u, |u1, u2| {
      let w = (self.x(u1).powf(delta) + self.x(u2).powf(delta)).powf(1.0 / delta);
      1.0 - (1.0 - (-w).exp()).powf(1.0 / theta)
    }))
  }

  fn hfunc1_raw(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
    let (theta, delta) = (self.theta, self.delta);
    Ok(map_rows(u, |u1, u2| {
      let (u1, u2) = (clamp_unit(u1), clamp_unit(u2));
      let w = (self.x(u1).powf(delta) + self.x(u2).powf(delta)).powf(1.0 / delta);
      let e = (-w).exp();
      (1.0 - e).powf(1.0 / theta - 1.0) * e * w.powf(1.0 - delta) * self.k(u1)
    }))
  }

  fn parameters_to_tau(&self, parameters: &Array1<f64>) -> Result<f64> {
    // The generator is a power of the Joe generator.
    let (theta, delta) = (parameters[0], parameters[1]);
    Ok(1.0 + (joe_tau(theta) - 1.0) / delta)
  }

  /// Starts from the Gumbel edge `theta = 1`, which matches `tau` exactly.
  fn tau_to_parameters(&self, tau: f64) -> Result<Array1<f64>> {
    Ok(array![1.0, 1.0 / (1.0 - tau.abs())])
  }

  fn clone_box(&self) -> Box<dyn BivariateExt> {
    Box::new(self.clone())
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use approx::assert_relative_eq;

  use super::*;
  use crate::copulas::bivariate::gumbel::Gumbel;

  #[test]
  fn unit_theta_reduces_to_gumbel() {
    let bb6 = Bb6::new(1.0, 2.0);
    let gumbel = Gumbel::new(2.0);
    let u = array![[0.2, 0.5], [0.7, 0.9]];
    let (a, b) = (bb6.pdf_raw(&u).unwrap(), gumbel.pdf_raw(&u).unwrap());
    for (x, y) in a.iter().zip(b.iter()) {
      assert_relative_eq!(*x, *y, max_relative = 1e-8);
    }
    assert_abs_diff_eq!(
      bb6.parameters_to_tau(&bb6.parameters()).unwrap(),
      0.5,
      epsilon = 1e-8
    );
  }

  #[test]
  fn matches_reference_values() {
    let bb6 = Bb6::new(2.0, 1.5);
    let u = array![[0.3, 0.65]];
    assert_abs_diff_eq!(bb6.hfunc1_raw(&u).unwrap()[0], 0.9192805, epsilon = 1e-6);
    assert_abs_diff_eq!(bb6.pdf_raw(&u).unwrap()[0], 0.6869896, epsilon = 1e-6);
    assert_abs_diff_eq!(bb6.cdf_raw(&array![[0.3, 1.0]]).unwrap()[0], 0.3, epsilon = 1e-12);
  }
}
