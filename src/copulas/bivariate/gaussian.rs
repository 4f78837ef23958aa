//! # Gaussian
//!
//! $$
//! c(u_1,u_2)=\frac{1}{\sqrt{1-\rho^2}}\exp\left(-\frac{\rho^2(x^2+y^2)-2\rho xy}{2(1-\rho^2)}\right),\quad x=\Phi^{-1}(u_1),\ y=\Phi^{-1}(u_2)
//! $$
//!
use std::f64::consts::PI;

use ndarray::array;
use ndarray::Array1;
use ndarray::Array2;

use super::elliptical;
use super::BicopFamily;
use crate::copulas::controls::InversionConfig;
use crate::error::Result;
use crate::tools::map_rows;
use crate::tools::pnorm;
use crate::tools::qnorm;
use crate::traits::BivariateExt;

#[derive(Debug, Clone, Default)]
pub struct Gaussian {
  pub rho: f64,
}

impl Gaussian {
  pub fn new(rho: f64) -> Self {
    Self { rho }
  }

  /// Bivariate standard normal distribution function through Plackett's
  /// identity, integrating the density over the correlation.
  fn pnorm2(x: f64, y: f64, rho: f64) -> f64 {
    if rho == 0.0 {
      return pnorm(x) * pnorm(y);
    }
    let integrand = |r: f64| {
      let s = 1.0 - r * r;
      (-(x * x - 2.0 * r * x * y + y * y) / (2.0 * s)).exp() / s.sqrt()
    };
    let integral = if rho > 0.0 {
      quadrature::double_exponential::integrate(integrand, 0.0, rho, 1e-12).integral
    } else {
      -quadrature::double_exponential::integrate(integrand, rho, 0.0, 1e-12).integral
    };
    (pnorm(x) * pnorm(y) + integral / (2.0 * PI)).clamp(0.0, 1.0)
  }
}

impl BivariateExt for Gaussian {
  fn family(&self) -> BicopFamily {
    BicopFamily::Gaussian
  }

  fn parameters(&self) -> Array1<f64> {
    array![self.rho]
  }

  fn parameters_bounds(&self) -> Array2<f64> {
    array![[-1.0, 1.0]]
  }

  fn store_parameters(&mut self, parameters: &Array1<f64>) {
    self.rho = parameters[0];
  }

  fn pdf_raw(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
    let rho = self.rho;
    let s = 1.0 - rho * rho;
    Ok(map_rows(u, |u1, u2| {
      let (x, y) = (qnorm(u1), qnorm(u2));
      (-(rho * rho * (x * x + y * y) - 2.0 * rho * x * y) / (2.0 * s)).exp() / s.sqrt()
    }))
  }

  fn cdf_raw(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
    let rho = self.rho;
    Ok(map_rows(u, |u1, u2| Self::pnorm2(qnorm(u1), qnorm(u2), rho)))
  }

  fn hfunc1_raw(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
    let rho = self.rho;
    let s = (1.0 - rho * rho).sqrt();
    Ok(map_rows(u, |u1, u2| {
      if u1 == 0.0 || u2 == 0.0 {
        return 0.0;
      }
      let num = qnorm(u2) - rho * qnorm(u1);
      let h = num / s;
      if h.is_finite() {
        pnorm(h)
      } else if num < 0.0 {
        0.0
      } else {
        1.0
      }
    }))
  }

  fn hinv1_raw(&self, u: &Array2<f64>, _inversion: &InversionConfig) -> Result<Array1<f64>> {
    let rho = self.rho;
    let s = (1.0 - rho * rho).sqrt();
    Ok(map_rows(u, |u1, u2| pnorm(qnorm(u2) * s + rho * qnorm(u1))))
  }

  fn parameters_to_tau(&self, parameters: &Array1<f64>) -> Result<f64> {
    Ok(elliptical::rho_to_tau(parameters[0]))
  }

  fn tau_to_parameters(&self, tau: f64) -> Result<Array1<f64>> {
    Ok(array![elliptical::tau_to_rho(tau)])
  }

  fn clone_box(&self) -> Box<dyn BivariateExt> {
    Box::new(self.clone())
  }
}
