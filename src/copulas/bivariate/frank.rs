//! # Frank
//!
//! $$
//! C(u_1,u_2)=-\frac{1}{\theta}\ln\left(1+\frac{(e^{-\theta u_1}-1)(e^{-\theta u_2}-1)}{e^{-\theta}-1}\right)
//! $$
//!
use ndarray::array;
use ndarray::Array1;
use ndarray::Array2;
use quadrature::double_exponential;

use super::archimedean::invert_tau;
use super::BicopFamily;
use crate::copulas::controls::InversionConfig;
use crate::error::Result;
use crate::tools::map_rows;
use crate::traits::BivariateExt;

/// Below this magnitude the formulas are replaced by independence.
const THETA_EPS: f64 = 1e-10;

#[derive(Debug, Clone, Default)]
pub struct Frank {
  pub theta: f64,
}

impl Frank {
  pub fn new(theta: f64) -> Self {
    Self { theta }
  }

  fn g(&self, z: f64) -> f64 {
    (-self.theta * z).exp_m1()
  }

  fn is_independence(&self) -> bool {
    self.theta.abs() < THETA_EPS
  }
}

/// Debye function of the first kind, `D1(x) = x^{-1} ∫_0^x t / (e^t - 1) dt`, for `x > 0`.
fn debye1(x: f64) -> f64 {
  let integrand = |t: f64| if t == 0.0 { 1.0 } else { t / t.exp_m1() };
  double_exponential::integrate(integrand, 0.0, x, 1e-12).integral / x
}

fn theta_to_tau(theta: f64) -> f64 {
  if theta.abs() < THETA_EPS {
    return 0.0;
  }
  let t = theta.abs();
  let tau = 1.0 - 4.0 / t * (1.0 - debye1(t));
  tau * theta.signum()
}

impl BivariateExt for Frank {
  fn family(&self) -> BicopFamily {
    BicopFamily::Frank
  }

  fn parameters(&self) -> Array1<f64> {
    array![self.theta]
  }

  fn parameters_bounds(&self) -> Array2<f64> {
    array![[-35.0, 35.0]]
  }

  fn store_parameters(&mut self, parameters: &Array1<f64>) {
    self.theta = parameters[0];
  }

  fn pdf_raw(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
    if self.is_independence() {
      return Ok(Array1::ones(u.nrows()));
    }
    let theta = self.theta;
    let g1 = self.g(1.0);
    Ok(map_rows(u, |u1, u2| {
      let den = g1 + self.g(u1) * self.g(u2);
      -theta * g1 * (-theta * (u1 + u2)).exp() / (den * den)
    }))
  }

  fn cdf_raw(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
    if self.is_independence() {
      return Ok(&u.column(0) * &u.column(1));
    }
    let theta = self.theta;
    let g1 = self.g(1.0);
    Ok(map_rows(u, |u1, u2| {
      -(self.g(u1) * self.g(u2) / g1).ln_1p() / theta
    }))
  }

  fn hfunc1_raw(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
    if self.is_independence() {
      return Ok(u.column(1).to_owned());
    }
    let theta = self.theta;
    let g1 = self.g(1.0);
    Ok(map_rows(u, |u1, u2| {
      let g_u2 = self.g(u2);
      (-theta * u1).exp() * g_u2 / (g1 + self.g(u1) * g_u2)
    }))
  }

  fn hinv1_raw(&self, u: &Array2<f64>, _inversion: &InversionConfig) -> Result<Array1<f64>> {
    if self.is_independence() {
      return Ok(u.column(1).to_owned());
    }
    let theta = self.theta;
    let g1 = self.g(1.0);
    Ok(map_rows(u, |u1, w| {
      -(w * g1 / ((-theta * u1).exp() - w * self.g(u1))).ln_1p() / theta
    }))
  }

  fn parameters_to_tau(&self, parameters: &Array1<f64>) -> Result<f64> {
    Ok(theta_to_tau(parameters[0]))
  }

  fn tau_to_parameters(&self, tau: f64) -> Result<Array1<f64>> {
    let theta = invert_tau(tau.abs(), 0.0, 35.0, theta_to_tau)?;
    Ok(array![theta * tau.signum()])
  }

  fn clone_box(&self) -> Box<dyn BivariateExt> {
    Box::new(self.clone())
  }
}
