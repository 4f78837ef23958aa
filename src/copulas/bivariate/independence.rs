use ndarray::Array1;
use ndarray::Array2;

use super::BicopFamily;
use crate::copulas::controls::InversionConfig;
use crate::error::Result;
use crate::traits::BivariateExt;

/// Product copula `C(u1, u2) = u1 u2`, no parameters.
#[derive(Debug, Clone, Default)]
pub struct Independence;

impl Independence {
  pub fn new() -> Self {
    Self
  }
}

impl BivariateExt for Independence {
  fn family(&self) -> BicopFamily {
    BicopFamily::Indep
  }

  fn parameters(&self) -> Array1<f64> {
    Array1::zeros(0)
  }

  fn parameters_bounds(&self) -> Array2<f64> {
    Array2::zeros((0, 2))
  }

  fn store_parameters(&mut self, _parameters: &Array1<f64>) {}

  fn pdf_raw(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
    Ok(Array1::ones(u.nrows()))
  }

  fn cdf_raw(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
    Ok(&u.column(0) * &u.column(1))
  }

  fn hfunc1_raw(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
    Ok(u.column(1).to_owned())
  }

  fn hfunc2_raw(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
    Ok(u.column(0).to_owned())
  }

  fn hinv1_raw(&self, u: &Array2<f64>, _inversion: &InversionConfig) -> Result<Array1<f64>> {
    Ok(u.column(1).to_owned())
  }

  fn hinv2_raw(&self, u: &Array2<f64>, _inversion: &InversionConfig) -> Result<Array1<f64>> {
    Ok(u.column(0).to_owned())
  }

  fn parameters_to_tau(&self, _parameters: &Array1<f64>) -> Result<f64> {
    Ok(0.0)
  }

  fn tau_to_parameters(&self, _tau: f64) -> Result<Array1<f64>> {
    Ok(Array1::zeros(0))
  }

  fn clone_box(&self) -> Box<dyn BivariateExt> {
    Box::new(self.clone())
  }
}
