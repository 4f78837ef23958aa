//! # BB1
//!
//! $$
//! C(u_1,u_2)=\left(1+\left[(u_1^{-\theta}-1)^\delta+(u_2^{-\theta}-1)^\delta\right]^{1/\delta}\right)^{-1/\theta}
//! $$
//!
use ndarray::array;
use ndarray::Array1;
use ndarray::Array2;

use super::BicopFamily;
use crate::error::Result;
use crate::tools::map_rows;
use crate::tools::TRIM_EPS;
use crate::traits::BivariateExt;

/// Second parameter used when seeding from Kendall's tau.
const START_DELTA: f64 = 1.5;

#[derive(Debug, Clone)]
pub struct Bb1 {
  pub theta: f64,
  pub delta: f64,
}

impl Default for Bb1 {
  fn default() -> Self {
    Self {
      theta: TRIM_EPS,
      delta: 1.0,
    }
  }
}

impl Bb1 {
  pub fn new(theta: f64, delta: f64) -> Self {
    Self { theta, delta }
  }

  // `u^{-θ} - 1`
  fn a(&self, u: f64) -> f64 {
    (-self.theta * u.ln()).exp_m1()
  }
}

fn clamp_unit(u: f64) -> f64 {
  u.clamp(TRIM_EPS, 1.0 - TRIM_EPS)
}

impl BivariateExt for Bb1 {
  fn family(&self) -> BicopFamily {
    BicopFamily::Bb1
  }

  fn parameters(&self) -> Array1<f64> {
    array![self.theta, self.delta]
  }

  fn parameters_bounds(&self) -> Array2<f64> {
    array![[1e-10, 7.0], [1.0, 7.0]]
  }

  fn store_parameters(&mut self, parameters: &Array1<f64>) {
    self.theta = parameters[0];
    self.delta = parameters[1];
  }

  fn pdf_raw(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
    let (theta, delta) = (self.theta, self.delta);
    Ok(map_rows(u, |u1, u2| {
      let (u1, u2) = (clamp_unit(u1), clamp_unit(u2));
      let (a1, a2) = (self.a(u1), self.a(u2));
      let s = a1.powf(delta) + a2.powf(delta);
      let w = s.powf(1.0 / delta);
      let k1 = a1.powf(delta - 1.0) * u1.powf(-theta - 1.0);
      let k2 = a2.powf(delta - 1.0) * u2.powf(-theta - 1.0);
      k1 * k2
        * (1.0 + w).powf(-1.0 / theta - 2.0)
        * s.powf(1.0 / delta - 2.0)
        * (theta * (delta - 1.0) + (theta * delta + 1.0) * w)
    }))
  }

  fn cdf_raw(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
    let (theta, delta) = (self.theta, self.delta);
    Ok(map_rows(u, |u1, u2| {
      if u1 <= 0.0 || u2 <= 0.0 {
        return 0.0;
      }
      let w = (self.a(u1).powf(delta) + self.a(u2).powf(delta)).powf(1.0 / delta);
      (-w.ln_1p() / theta).exp()
    }))
  }

  fn hfunc1_raw(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
    let (theta, delta) = (self.theta, self.delta);
    Ok(map_rows(u, |u1, u2| {
      let (u1, u2) = (clamp_unit(u1), clamp_unit(u2));
      let a1 = self.a(u1);
      let s = a1.powf(delta) + self.a(u2).powf(delta);
      let w = s.powf(1.0 / delta);
      (1.0 + w).powf(-1.0 / theta - 1.0)
        * s.powf(1.0 / delta - 1.0)
        * a1.powf(delta - 1.0)
        * u1.powf(-theta - 1.0)
    }))
  }

  fn parameters_to_tau(&self, parameters: &Array1<f64>) -> Result<f64> {
    let (theta, delta) = (parameters[0], parameters[1]);
    Ok(1.0 - 2.0 / (delta * (theta + 2.0)))
  }

  /// Solves for theta with delta held fixed; weak dependence falls back to
  /// the Clayton edge `delta = 1`.
  fn tau_to_parameters(&self, tau: f64) -> Result<Array1<f64>> {
    let tau = tau.abs();
    let theta = 2.0 / (START_DELTA * (1.0 - tau)) - 2.0;
    if theta > 0.0 {
      Ok(array![theta, START_DELTA])
    } else {
      Ok(array![2.0 * tau / (1.0 - tau), 1.0])
    }
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
  use crate::copulas::bivariate::clayton::Clayton;

  #[test]
  fn unit_delta_reduces_to_clayton() {
    let bb1 = Bb1::new(2.0, 1.0);
    let clayton = Clayton::new(2.0);
    let u = array![[0.2, 0.5], [0.7, 0.9]];
    let (a, b) = (bb1.pdf_raw(&u).unwrap(), clayton.pdf_raw(&u).unwrap());
    for (x, y) in a.iter().zip(b.iter()) {
      assert_relative_eq!(*x, *y, max_relative = 1e-10);
    }
    let (a, b) = (bb1.hfunc1_raw(&u).unwrap(), clayton.hfunc1_raw(&u).unwrap());
    for (x, y) in a.iter().zip(b.iter()) {
      assert_relative_eq!(*x, *y, max_relative = 1e-10);
    }
  }

  #[test]
  fn hfunc_and_density_are_derivatives() {
    let bb1 = Bb1::new(1.3, 1.7);
    let (u1, u2) = (0.3, 0.65);
    assert_abs_diff_eq!(bb1.hfunc1_raw(&array![[u1, u2]]).unwrap()[0], 0.92612, epsilon = 1e-5);
    assert_abs_diff_eq!(bb1.pdf_raw(&array![[u1, u2]]).unwrap()[0], 0.5478584, epsilon = 1e-6);
    assert_abs_diff_eq!(bb1.cdf_raw(&array![[u1, 1.0]]).unwrap()[0], u1, epsilon = 1e-12);
  }

  #[test]
  fn start_parameters_reproduce_tau() {
    let bb1 = Bb1::default();
    for tau in [0.1, 0.5, 0.8] {
      let p = bb1.get_start_parameters(tau).unwrap();
      assert_abs_diff_eq!(bb1.parameters_to_tau(&p).unwrap(), tau, epsilon = 1e-10);
    }
  }
}
