//! # Student
//!
//! $$
//! c(u_1,u_2)=\frac{\Gamma\left(\frac{\nu+2}{2}\right)\Gamma\left(\frac{\nu}{2}\right)}{\Gamma\left(\frac{\nu+1}{2}\right)^2\sqrt{1-\rho^2}}
//! \frac{\left(1+\frac{x^2+y^2-2\rho xy}{\nu(1-\rho^2)}\right)^{-\frac{\nu+2}{2}}}{\left(\left(1+\frac{x^2}{\nu}\right)\left(1+\frac{y^2}{\nu}\right)\right)^{-\frac{\nu+1}{2}}}
//! $$
//!
use ndarray::array;
use ndarray::Array1;
use ndarray::Array2;
use statrs::distribution::ContinuousCDF;
use statrs::distribution::StudentsT;
use statrs::function::gamma::ln_gamma;

use super::elliptical;
use super::BicopFamily;
use crate::copulas::controls::InversionConfig;
use crate::error::BicopError;
use crate::error::Result;
use crate::tools::map_rows;
use crate::tools::TRIM_EPS;
use crate::traits::BivariateExt;

/// Degrees of freedom used to seed the likelihood search.
const START_NU: f64 = 5.0;

#[derive(Debug, Clone)]
pub struct Student {
  pub rho: f64,
  pub nu: f64,
}

impl Default for Student {
  fn default() -> Self {
    Self { rho: 0.0, nu: 50.0 }
  }
}

fn t_dist(nu: f64) -> Result<StudentsT> {
  StudentsT::new(0.0, 1.0, nu).map_err(|e| BicopError::Numerical(e.to_string()))
}

fn clamp_unit(x: f64) -> f64 {
  x.clamp(TRIM_EPS, 1.0 - TRIM_EPS)
}

impl Student {
  pub fn new(rho: f64, nu: f64) -> Self {
    Self { rho, nu }
  }

  fn hfunc1_scalar(t_nu: &StudentsT, t_nu1: &StudentsT, rho: f64, nu: f64, u1: f64, u2: f64) -> f64 {
    let x = t_nu.inverse_cdf(clamp_unit(u1));
    let y = t_nu.inverse_cdf(clamp_unit(u2));
    let scale = ((nu + x * x) * (1.0 - rho * rho) / (nu + 1.0)).sqrt();
    t_nu1.cdf((y - rho * x) / scale)
  }
}

impl BivariateExt for Student {
  fn family(&self) -> BicopFamily {
    BicopFamily::Student
  }

  fn parameters(&self) -> Array1<f64> {
    array![self.rho, self.nu]
  }

  fn parameters_bounds(&self) -> Array2<f64> {
    array![[-1.0, 1.0], [2.0, 50.0]]
  }

  fn store_parameters(&mut self, parameters: &Array1<f64>) {
    self.rho = parameters[0];
    self.nu = parameters[1];
  }

  fn pdf_raw(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
    Ok(self.log_pdf_raw(u)?.exp())
  }

  fn log_pdf_raw(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
    let (rho, nu) = (self.rho, self.nu);
    let t_nu = t_dist(nu)?;
    let s = 1.0 - rho * rho;
    let norm = ln_gamma((nu + 2.0) / 2.0) + ln_gamma(nu / 2.0)
      - 2.0 * ln_gamma((nu + 1.0) / 2.0)
      - 0.5 * s.ln();

    Ok(map_rows(u, |u1, u2| {
      let x = t_nu.inverse_cdf(clamp_unit(u1));
      let y = t_nu.inverse_cdf(clamp_unit(u2));
      let q = (x * x + y * y - 2.0 * rho * x * y) / (nu * s);
      norm - (nu + 2.0) / 2.0 * q.ln_1p()
        + (nu + 1.0) / 2.0 * ((x * x / nu).ln_1p() + (y * y / nu).ln_1p())
    }))
  }

  /// `C(u1, u2) = ∫_0^{u2} h2(u1, s) ds`, evaluated by double-exponential quadrature.
  fn cdf_raw(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
    let (rho, nu) = (self.rho, self.nu);
    let t_nu = t_dist(nu)?;
    let t_nu1 = t_dist(nu + 1.0)?;

    Ok(map_rows(u, |u1, u2| {
      if u1 <= 0.0 || u2 <= 0.0 {
        return 0.0;
      }
      let h2 = |s: f64| Self::hfunc1_scalar(&t_nu, &t_nu1, rho, nu, s, u1);
      quadrature::double_exponential::integrate(h2, 0.0, u2.min(1.0), 1e-10)
        .integral
        .clamp(0.0, u1.min(u2))
    }))
  }

  fn hfunc1_raw(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
    let (rho, nu) = (self.rho, self.nu);
    let t_nu = t_dist(nu)?;
    let t_nu1 = t_dist(nu + 1.0)?;
    Ok(map_rows(u, |u1, u2| {
      Self::hfunc1_scalar(&t_nu, &t_nu1, rho, nu, u1, u2)
    }))
  }

  fn hinv1_raw(&self, u: &Array2<f64>, _inversion: &InversionConfig) -> Result<Array1<f64>> {
    let (rho, nu) = (self.rho, self.nu);
    let t_nu = t_dist(nu)?;
    let t_nu1 = t_dist(nu + 1.0)?;
    Ok(map_rows(u, |u1, u2| {
      let x = t_nu.inverse_cdf(clamp_unit(u1));
      let q = t_nu1.inverse_cdf(clamp_unit(u2));
      let scale = ((nu + x * x) * (1.0 - rho * rho) / (nu + 1.0)).sqrt();
      t_nu.cdf(q * scale + rho * x)
    }))
  }

  fn parameters_to_tau(&self, parameters: &Array1<f64>) -> Result<f64> {
    Ok(elliptical::rho_to_tau(parameters[0]))
  }

  fn tau_to_parameters(&self, tau: f64) -> Result<Array1<f64>> {
    Ok(array![elliptical::tau_to_rho(tau), self.nu])
  }

  fn get_start_parameters(&self, tau: f64) -> Result<Array1<f64>> {
    Ok(array![elliptical::tau_to_rho(tau), START_NU])
  }

  fn clone_box(&self) -> Box<dyn BivariateExt> {
    Box::new(self.clone())
  }
}
