//! # Clayton
//!
//! $$
//! C(u_1,u_2)=\left(u_1^{-\theta}+u_2^{-\theta}-1\right)^{-1/\theta}
//! $$
//!
use ndarray::array;
use ndarray::Array1;
use ndarray::Array2;

use super::BicopFamily;
use crate::copulas::controls::InversionConfig;
use crate::error::Result;
use crate::tools::map_rows;
use crate::tools::TRIM_EPS;
use crate::traits::BivariateExt;

#[derive(Debug, Clone)]
pub struct Clayton {
  pub theta: f64,
}

impl Default for Clayton {
  fn default() -> Self {
    Self { theta: TRIM_EPS }
  }
}

impl Clayton {
  pub fn new(theta: f64) -> Self {
    Self { theta }
  }
}

// `u^{-θ} - 1`, accurate for tiny θ.
fn a(u: f64, theta: f64) -> f64 {
  (-theta * u.clamp(TRIM_EPS, 1.0).ln()).exp_m1()
}

impl BivariateExt for Clayton {
  fn family(&self) -> BicopFamily {
    BicopFamily::Clayton
  }

  fn parameters(&self) -> Array1<f64> {
    array![self.theta]
  }

  fn parameters_bounds(&self) -> Array2<f64> {
    array![[1e-10, 28.0]]
  }

  fn store_parameters(&mut self, parameters: &Array1<f64>) {
    self.theta = parameters[0];
  }

  fn pdf_raw(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
    Ok(self.log_pdf_raw(u)?.exp())
  }

  fn log_pdf_raw(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
    let theta = self.theta;
    Ok(map_rows(u, |u1, u2| {
      let (u1, u2) = (u1.clamp(TRIM_EPS, 1.0), u2.clamp(TRIM_EPS, 1.0));
      let s = a(u1, theta) + a(u2, theta);
      theta.ln_1p() - (1.0 + theta) * (u1.ln() + u2.ln()) - (2.0 + 1.0 / theta) * s.ln_1p()
    }))
  }

  fn cdf_raw(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
    let theta = self.theta;
    Ok(map_rows(u, |u1, u2| {
      if u1 <= 0.0 || u2 <= 0.0 {
        return 0.0;
      }
      (-(a(u1, theta) + a(u2, theta)).ln_1p() / theta).exp()
    }))
  }

  fn hfunc1_raw(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
    let theta = self.theta;
    Ok(map_rows(u, |u1, u2| {
      let u1 = u1.clamp(TRIM_EPS, 1.0);
      let s = a(u1, theta) + a(u2, theta);
      (-(1.0 + theta) * u1.ln() - (1.0 + 1.0 / theta) * s.ln_1p()).exp()
    }))
  }

  fn hinv1_raw(&self, u: &Array2<f64>, _inversion: &InversionConfig) -> Result<Array1<f64>> {
    let theta = self.theta;
    Ok(map_rows(u, |u1, w| {
      let (u1, w) = (u1.clamp(TRIM_EPS, 1.0), w.clamp(TRIM_EPS, 1.0));
      // (w u1^{θ+1})^{-θ/(θ+1)} - 1
      let b = (-theta / (theta + 1.0) * (w.ln() + (theta + 1.0) * u1.ln())).exp_m1();
      (-(b - a(u1, theta)).ln_1p() / theta).exp()
    }))
  }

  fn parameters_to_tau(&self, parameters: &Array1<f64>) -> Result<f64> {
    let theta = parameters[0];
    Ok(theta / (theta + 2.0))
  }

  fn tau_to_parameters(&self, tau: f64) -> Result<Array1<f64>> {
    let tau = tau.abs();
    Ok(array![2.0 * tau / (1.0 - tau)])
  }

  fn clone_box(&self) -> Box<dyn BivariateExt> {
    Box::new(self.clone())
  }
}
