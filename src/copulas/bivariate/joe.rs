//! # Joe
//!
//! $$
//! C(u_1,u_2)=1-\left(\bar u_1^\theta+\bar u_2^\theta-\bar u_1^\theta\bar u_2^\theta\right)^{1/\theta},\quad \bar u=1-u
//! $$
//!
use ndarray::array;
use ndarray::Array1;
use ndarray::Array2;

use super::archimedean::invert_tau;
use super::archimedean::pow1m;
use super::archimedean::tau_from_generator;
use super::BicopFamily;
use crate::error::Result;
use crate::tools::map_rows;
use crate::tools::TRIM_EPS;
use crate::traits::BivariateExt;

#[derive(Debug, Clone)]
pub struct Joe {
  pub theta: f64,
}

impl Default for Joe {
  fn default() -> Self {
    Self { theta: 1.0 }
  }
}

impl Joe {
  pub fn new(theta: f64) -> Self {
    Self { theta }
  }
}

pub(crate) fn joe_tau(theta: f64) -> f64 {
  tau_from_generator(|t| {
    let x = pow1m(t, theta);
    (-x).ln_1p() * (1.0 - x) / (theta * pow1m(t, theta - 1.0))
  })
}

impl BivariateExt for Joe {
  fn family(&self) -> BicopFamily {
    BicopFamily::Joe
  }

  fn parameters(&self) -> Array1<f64> {
    array![self.theta]
  }

  fn parameters_bounds(&self) -> Array2<f64> {
    array![[1.0, 30.0]]
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
      let (u1, u2) = (
        u1.clamp(TRIM_EPS, 1.0 - TRIM_EPS),
        u2.clamp(TRIM_EPS, 1.0 - TRIM_EPS),
      );
      let (a, b) = (pow1m(u1, theta), pow1m(u2, theta));
      let s = a + b - a * b;
      (1.0 / theta - 2.0) * s.ln()
        + (theta - 1.0) * ((-u1).ln_1p() + (-u2).ln_1p())
        + (theta - 1.0 + s).ln()
    }))
  }

  fn cdf_raw(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
    let theta = self.theta;
    Ok(map_rows(u, |u1, u2| {
      let (a, b) = (pow1m(u1, theta), pow1m(u2, theta));
      1.0 - (a + b - a * b).powf(1.0 / theta)
    }))
  }

  fn hfunc1_raw(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
    let theta = self.theta;
    Ok(map_rows(u, |u1, u2| {
      let (u1, u2) = (
        u1.clamp(TRIM_EPS, 1.0 - TRIM_EPS),
        u2.clamp(TRIM_EPS, 1.0 - TRIM_EPS),
      );
      let (a, b) = (pow1m(u1, theta), pow1m(u2, theta));
      let s = a + b - a * b;
      s.powf(1.0 / theta - 1.0) * pow1m(u1, theta - 1.0) * (1.0 - b)
    }))
  }

  fn parameters_to_tau(&self, parameters: &Array1<f64>) -> Result<f64> {
    Ok(joe_tau(parameters[0]))
  }

  fn tau_to_parameters(&self, tau: f64) -> Result<Array1<f64>> {
    Ok(array![invert_tau(tau.abs(), 1.0, 30.0, joe_tau)?])
  }

  fn clone_box(&self) -> Box<dyn BivariateExt> {
    Box::new(self.clone())
  }
}
