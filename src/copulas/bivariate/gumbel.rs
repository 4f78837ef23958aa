//! # Gumbel
//!
//! $$
//! C(u_1,u_2)=\exp\left(-\left[(-\ln u_1)^\theta+(-\ln u_2)^\theta\right]^{1/\theta}\right)
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

#[derive(Debug, Clone)]
pub struct Gumbel {
  pub theta: f64,
}

impl Default for Gumbel {
  fn default() -> Self {
    Self { theta: 1.0 }
  }
}

impl Gumbel {
  pub fn new(theta: f64) -> Self {
    Self { theta }
  }
}

impl BivariateExt for Gumbel {
  fn family(&self) -> BicopFamily {
    BicopFamily::Gumbel
  }

  fn parameters(&self) -> Array1<f64> {
    array![self.theta]
  }

  fn parameters_bounds(&self) -> Array2<f64> {
    array![[1.0, 50.0]]
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
      let (l1, l2) = (-u1.ln(), -u2.ln());
      let tmp = l1.powf(theta) + l2.powf(theta);
      let ln_tmp = tmp.ln();
      -(ln_tmp / theta).exp() + l1 + l2 + (-2.0 + 2.0 / theta) * ln_tmp
        + (theta - 1.0) * (l1.ln() + l2.ln())
        + ((theta - 1.0) * (-ln_tmp / theta).exp()).ln_1p()
    }))
  }

  fn cdf_raw(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
    let theta = self.theta;
    Ok(map_rows(u, |u1, u2| {
      let h = (-u1.ln()).powf(theta) + (-u2.ln()).powf(theta);
      (-h.powf(1.0 / theta)).exp()
    }))
  }

  fn hfunc1_raw(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
    let theta = self.theta;
    Ok(map_rows(u, |u1, u2| {
      let (u1, u2) = (
        u1.clamp(TRIM_EPS, 1.0 - TRIM_EPS),
        u2.clamp(TRIM_EPS, 1.0 - TRIM_EPS),
      );
      let l1 = -u1.ln();
      let t1 = l1.powf(theta);
      let t2 = (-u2.ln()).powf(theta);
      let p1 = (-(t1 + t2).powf(1.0 / theta)).exp();
      let p2 = (t1 + t2).powf(-1.0 + 1.0 / theta);
      let p3 = l1.powf(theta - 1.0);
      p1 * p2 * p3 / u1
    }))
  }

  fn parameters_to_tau(&self, parameters: &Array1<f64>) -> Result<f64> {
    Ok(1.0 - 1.0 / parameters[0])
  }

  fn tau_to_parameters(&self, tau: f64) -> Result<Array1<f64>> {
    Ok(array![1.0 / (1.0 - tau.abs())])
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
  use crate::copulas::controls::InversionConfig;
  use crate::tools::cbind;

  #[test]
  fn density_matches_reference_formula() {
    let theta: f64 = 2.5;
    let gumbel = Gumbel::new(theta);
    let (u, v): (f64, f64) = (0.35, 0.8);
    let tmp = (-u.ln()).powf(theta) + (-v.ln()).powf(theta);
    let cdf = (-tmp.powf(1.0 / theta)).exp();
    let expected = cdf / (u * v)
      * tmp.powf(-2.0 + 2.0 / theta)
      * (u.ln() * v.ln()).powf(theta - 1.0)
      * (1.0 + (theta - 1.0) * tmp.powf(-1.0 / theta));

    let x = array![[u, v]];
    assert_relative_eq!(gumbel.cdf_raw(&x).unwrap()[0], cdf, max_relative = 1e-12);
    assert_relative_eq!(gumbel.pdf_raw(&x).unwrap()[0], expected, max_relative = 1e-10);
  }

  #[test]
  fn numeric_inverse_recovers_level() {
    let gumbel = Gumbel::new(3.0);
    let u = array![[0.1, 0.25], [0.5, 0.5], [0.85, 0.9]];
    let v = gumbel.hinv1_raw(&u, &InversionConfig::default()).unwrap();
    let back = gumbel.hfunc1_raw(&cbind(u.column(0), v.view())).unwrap();
    for (b, w) in back.iter().zip(u.column(1)) {
      assert_abs_diff_eq!(*b, *w, epsilon = 1e-7);
    }
  }

  #[test]
  fn theta_one_is_independence() {
    let gumbel = Gumbel::default();
    let u = array![[0.3, 0.6]];
    assert_abs_diff_eq!(gumbel.pdf_raw(&u).unwrap()[0], 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(gumbel.hfunc1_raw(&u).unwrap()[0], 0.6, epsilon = 1e-12);
  }

  #[test]
  fn tau_round_trip() {
    let gumbel = Gumbel::default();
    let tau = gumbel.parameters_to_tau(&array![2.0]).unwrap();
    assert_abs_diff_eq!(tau, 0.5, epsilon = 1e-15);
    assert_abs_diff_eq!(gumbel.tau_to_parameters(-tau).unwrap()[0], 2.0, epsilon = 1e-12);
  }
}
