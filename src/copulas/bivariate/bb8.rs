//! # BB8
//!
//! $$
//! C(u_1,u_2)=\frac{1}{\delta}\left(1-\left[1-\frac{(1-(1-\delta u_1)^\theta)(1-(1-\delta u_2)^\theta)}{1-(1-\delta)^\theta}\right]^{1/\theta}\right)
//! $$
//!
use ndarray::array;
use ndarray::Array1;
use ndarray::Array2;

use super::archimedean::invert_tau;
use super::archimedean::pow1m;
use super::archimedean::tau_from_generator;
use super::joe::joe_tau;
use super::BicopFamily;
use crate::error::Result;
use crate::tools::map_rows;
use crate::tools::TRIM_EPS;
use crate::traits::BivariateExt;

#[derive(Debug, Clone)]
pub struct Bb8 {
  pub theta: f64,
  pub delta: f64,
}

impl Default for Bb8 {
  fn default() -> Self {
    Self {
      theta: 1.0,
      delta: 1.0,
    }
  }
}

impl Bb8 {
  pub fn new(theta: f64, delta: f64) -> Self {
    Self { theta, delta }
  }

  fn eta(&self) -> f64 {
    1.0 - pow1m(self.delta, self.theta)
  }

  fn x(&self, u: f64) -> f64 {
    1.0 - pow1m(self.delta * u, self.theta)
  }
}

fn clamp_unit(u: f64) -> f64 {
  u.clamp(TRIM_EPS, 1.0 - TRIM_EPS)
}

impl BivariateExt for Bb8 {
  fn family(&self) -> BicopFamily {
    BicopFamily::Bb8
  }

  fn parameters(&self) -> Array1<f64> {
    array![self.theta, self.delta]
  }

  fn parameters_bounds(&self) -> Array2<f64> {
    array![[1.0, 8.0], [1e-4, 1.0]]
  }

  fn store_parameters(&mut self, parameters: &Array1<f64>) {
    self.theta = parameters[0];
    self.delta = parameters[1];
  }

  fn pdf_raw(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
    let (theta, delta) = (self.theta, self.delta);
    let eta = self.eta();
    Ok(map_rows(u, |u1, u2| {
      let (u1, u2) = (clamp_unit(u1), clamp_unit(u2));
      let a = 1.0 - self.x(u1) * self.x(u2) / eta;
      delta / eta
        * pow1m(delta * u1, theta - 1.0)
        * pow1m(delta * u2, theta - 1.0)
        * a.powf(1.0 / theta - 2.0)
        * (theta - 1.0 + a)
    }))
  }

  fn cdf_raw(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
    let (theta, delta) = (self.theta, self.delta);
    let eta = self.eta();
    Ok(map_rows(u, |u1, u2| {
      let a = 1.0 - self.x(u1) * self.x(u2) / eta;
      (1.0 - a.max(0.0).powf(1.0 / theta)) / delta
    }))
  }

  fn hfunc1_raw(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
    let (theta, delta) = (self.theta, self.delta);
    let eta = self.eta();
    Ok(map_rows(u, |u1, u2| {
      let (u1, u2) = (clamp_unit(u1), clamp_unit(u2));
      let x2 = self.x(u2);
      let a = 1.0 - self.x(u1) * x2 / eta;
      a.powf(1.0 / theta - 1.0) * x2 * pow1m(delta * u1, theta - 1.0) / eta
    }))
  }

  fn parameters_to_tau(&self, parameters: &Array1<f64>) -> Result<f64> {
    let (theta, delta) = (parameters[0], parameters[1]);
    let eta = 1.0 - pow1m(delta, theta);
    Ok(tau_from_generator(|t| {
      let y = 1.0 - pow1m(delta * t, theta);
      (y / eta).ln() * y / (theta * delta * pow1m(delta * t, theta - 1.0))
    }))
  }

  /// Starts from the Joe edge `delta = 1`, which matches `tau` exactly.
  fn tau_to_parameters(&self, tau: f64) -> Result<Array1<f64>> {
    Ok(array![invert_tau(tau.abs(), 1.0, 8.0, joe_tau)?, 1.0])
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
  use crate::copulas::bivariate::joe::Joe;

  #[test]
  fn matches_reference_values() {
    let bb8 = Bb8::new(3.0, 0.7);
    let u = array![[0.3, 0.65]];
    assert_abs_diff_eq!(bb8.hfunc1_raw(&u).unwrap()[0], 0.7881597, epsilon = 1e-6);
    assert_abs_diff_eq!(bb8.pdf_raw(&u).unwrap()[0], 0.8897116, epsilon = 1e-6);
    assert_abs_diff_eq!(bb8.cdf_raw(&array![[0.3, 1.0]]).unwrap()[0], 0.3, epsilon = 1e-12);
    assert_abs_diff_eq!(bb8.parameters_to_tau(&bb8.parameters()).unwrap(), 0.2779312, epsilon = 1e-6);
  }

  #[test]
  fn unit_delta_reduces_to_joe() {
    let bb8 = Bb8::new(2.0, 1.0);
    let joe = Joe::new(2.0);
    let u = array![[0.2, 0.5], [0.7, 0.9]];
    let (a, b) = (bb8.pdf_raw(&u).unwrap(), joe.pdf_raw(&u).unwrap());
    for (x, y) in a.iter().zip(b.iter()) {
      assert_relative_eq!(*x, *y, max_relative = 1e-8);
    }
    let p = bb8.get_start_parameters(0.3).unwrap();
    assert_abs_diff_eq!(bb8.parameters_to_tau(&p).unwrap(), 0.3, epsilon = 1e-6);
  }
}
