//! # Traits
//!
//! $$
//! h_1(u_1,u_2)=\frac{\partial C(u_1,u_2)}{\partial u_1},\qquad h_2(u_1,u_2)=\frac{\partial C(u_1,u_2)}{\partial u_2}
//! $$
//!
use std::fmt::Debug;

use ndarray::Array1;
use ndarray::Array2;

use crate::copulas::bivariate::BicopFamily;
use crate::copulas::controls::InversionConfig;
use crate::error::BicopError;
use crate::error::Result;
use crate::tools::cbind;
use crate::tools::clip_to_bounds;
use crate::tools::invert_f;
use crate::tools::swap_cols;

/// Formulas of one copula family on the canonical (unrotated) unit square.
///
/// Every `_raw` method works row-wise on an n x 2 matrix `u` and assumes the
/// parameters stored in the family are valid. Rotations, input validation and
/// boundary limits are handled by [`crate::copulas::bivariate::AbstractBicop`].
pub trait BivariateExt: Debug + Send + Sync {
  fn family(&self) -> BicopFamily;

  fn parameters(&self) -> Array1<f64>;

  /// k x 2 matrix of inclusive lower/upper bounds, one row per parameter.
  fn parameters_bounds(&self) -> Array2<f64>;

  /// Stores a parameter vector that already passed [`BivariateExt::check_parameters`].
  fn store_parameters(&mut self, parameters: &Array1<f64>);

  /// Number of parameters, or effective degrees of freedom for kernel estimators.
  fn npars(&self) -> f64 {
    self.parameters().len() as f64
  }

  fn check_parameters(&self, parameters: &Array1<f64>) -> Result<()> {
    let bounds = self.parameters_bounds();
    if parameters.len() != bounds.nrows() {
      return Err(BicopError::InvalidParameters(format!(
        "the {} family takes {} parameter(s), got {}",
        self.family(),
        bounds.nrows(),
        parameters.len()
      )));
    }

    for (j, &p) in parameters.iter().enumerate() {
      let (lower, upper) = (bounds[[j, 0]], bounds[[j, 1]]);
      if !(lower <= p && p <= upper) {
        return Err(BicopError::InvalidParameters(format!(
          "parameter {} of the {} family must be in [{}, {}], got {}",
          j,
          self.family(),
          lower,
          upper,
          p
        )));
      }
    }

    Ok(())
  }

  fn pdf_raw(&self, u: &Array2<f64>) -> Result<Array1<f64>>;

  fn log_pdf_raw(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
    Ok(self.pdf_raw(u)?.ln())
  }

  fn cdf_raw(&self, u: &Array2<f64>) -> Result<Array1<f64>>;

  /// `P(U2 <= u2 | U1 = u1)`.
  fn hfunc1_raw(&self, u: &Array2<f64>) -> Result<Array1<f64>>;

  /// `P(U1 <= u1 | U2 = u2)`.
  fn hfunc2_raw(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
    self.hfunc1_raw(&swap_cols(u))
  }

  /// Inverse of `hfunc1_raw(u1, .)` evaluated at level `u2`.
  fn hinv1_raw(&self, u: &Array2<f64>, inversion: &InversionConfig) -> Result<Array1<f64>> {
    let u1 = u.column(0);
    let level = u.column(1).to_owned();
    invert_f(
      &level,
      |v| self.hfunc1_raw(&cbind(u1, v.view())),
      inversion,
    )
  }

  /// Inverse of `hfunc2_raw(., u2)` evaluated at level `u1`.
  fn hinv2_raw(&self, u: &Array2<f64>, inversion: &InversionConfig) -> Result<Array1<f64>> {
    self.hinv1_raw(&swap_cols(u), inversion)
  }

  fn parameters_to_tau(&self, parameters: &Array1<f64>) -> Result<f64>;

  /// Approximate inverse of [`BivariateExt::parameters_to_tau`], used to seed fitting.
  fn tau_to_parameters(&self, tau: f64) -> Result<Array1<f64>>;

  fn get_start_parameters(&self, tau: f64) -> Result<Array1<f64>> {
    let start = self.tau_to_parameters(tau)?;
    Ok(clip_to_bounds(&start, &self.parameters_bounds()))
  }

  /// Exchanges the roles of the two variables. Exchangeable families have nothing to do.
  fn flip(&mut self) {}

  /// Fits a nonparametric estimator directly from the data.
  fn fit_nonparametric(&mut self, _data: &Array2<f64>, _mult: f64) -> Result<()> {
    Err(BicopError::MethodNotSupported {
      family: self.family().to_string(),
      method: "nonparametric".into(),
    })
  }

  fn clone_box(&self) -> Box<dyn BivariateExt>;
}

impl Clone for Box<dyn BivariateExt> {
  fn clone(&self) -> Self {
    self.clone_box()
  }
}
