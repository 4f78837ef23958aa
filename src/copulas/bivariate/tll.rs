//! # Transformation local-constant kernel estimator
//!
//! $$
//! \hat c(u_1,u_2)=\frac{\hat f\left(\Phi^{-1}(u_1),\Phi^{-1}(u_2)\right)}{\phi\left(\Phi^{-1}(u_1)\right)\phi\left(\Phi^{-1}(u_2)\right)},\qquad
//! \hat f(z)=\frac{1}{n}\sum_{i=1}^n \phi_B(z-z_i)
//! $$
//!
//! The density is tabulated on a fixed grid and interpolated bilinearly;
//! h-functions and the distribution function integrate the interpolant.
//!
use std::f64::consts::PI;
use std::iter::once;

use ndarray::Array1;
use ndarray::Array2;
use ndarray::Axis;
use ndarray::Zip;
use ndarray_stats::CorrelationExt;

use super::BicopFamily;
use crate::copulas::controls::InversionConfig;
use crate::error::BicopError;
use crate::error::Result;
use crate::tools::cbind;
use crate::tools::dnorm;
use crate::tools::invert_f;
use crate::tools::map_rows;
use crate::tools::pnorm;
use crate::tools::qnorm;
use crate::traits::BivariateExt;

const GRID_SIZE: usize = 30;
const GRID_BOUND: f64 = 3.25;
/// Midpoints per axis when integrating Kendall's tau.
const TAU_POINTS: usize = 50;

#[derive(Debug, Clone)]
pub struct Tll {
  /// Grid points on the copula scale, increasing.
  pub grid: Array1<f64>,
  /// Density at `(grid[i], grid[j])`.
  pub values: Array2<f64>,
  /// Trace of the smoother matrix.
  pub edf: f64,
}

impl Default for Tll {
  fn default() -> Self {
    Self {
      grid: Array1::linspace(-GRID_BOUND, GRID_BOUND, GRID_SIZE).mapv(pnorm),
      values: Array2::ones((GRID_SIZE, GRID_SIZE)),
      edf: 0.0,
    }
  }
}

/// Bivariate Gaussian kernel with covariance `b`.
struct Kernel {
  inv: [[f64; 2]; 2],
  norm: f64,
}

impl Kernel {
  fn new(b: &Array2<f64>) -> Option<Self> {
    let det = b[[0, 0]] * b[[1, 1]] - b[[0, 1]] * b[[1, 0]];
    if !(det.is_finite() && det > 0.0) {
      return None;
    }
    Some(Self {
      inv: [
        [b[[1, 1]] / det, -b[[0, 1]] / det],
        [-b[[1, 0]] / det, b[[0, 0]] / det],
      ],
      norm: 1.0 / (2.0 * PI * det.sqrt()),
    })
  }

  fn eval(&self, dx: f64, dy: f64) -> f64 {
    let q = dx * (self.inv[0][0] * dx + self.inv[0][1] * dy)
      + dy * (self.inv[1][0] * dx + self.inv[1][1] * dy);
    self.norm * (-0.5 * q).exp()
  }
}

impl Tll {
  pub fn new() -> Self {
    Self::default()
  }

  /// Cell index `i` with `grid[i] <= x < grid[i + 1]` and the weight of `grid[i + 1]`.
  fn locate(&self, x: f64) -> (usize, f64) {
    let last = self.grid.len() - 1;
    if x <= self.grid[0] {
      return (0, 0.0);
    }
    if x >= self.grid[last] {
      return (last - 1, 1.0);
    }
    let i = self.grid.iter().take_while(|&&p| p <= x).count() - 1;
    let w = (x - self.grid[i]) / (self.grid[i + 1] - self.grid[i]);
    (i, w)
  }

  fn interp(&self, u1: f64, u2: f64) -> f64 {
    let (i, wx) = self.locate(u1);
    let (j, wy) = self.locate(u2);
    let v = &self.values;
    (1.0 - wx) * ((1.0 - wy) * v[[i, j]] + wy * v[[i, j + 1]])
      + wx * ((1.0 - wy) * v[[i + 1, j]] + wy * v[[i + 1, j + 1]])
  }

  /// `∫_0^upper c / ∫_0^1 c` along one axis, with the other coordinate held at `fixed`.
  fn conditional(&self, fixed: f64, upper: f64, along_second: bool) -> f64 {
    let c = |s: f64| {
      if along_second {
        self.interp(fixed, s)
      } else {
        self.interp(s, fixed)
      }
    };

    let (mut total, mut partial) = (0.0, 0.0);
    let (mut prev_t, mut prev_c) = (0.0, c(0.0));
    for &t in self.grid.iter().chain(once(&1.0)) {
      let ct = c(t);
      let segment = 0.5 * (ct + prev_c) * (t - prev_t);
      total += segment;
      if t <= upper {
        partial += segment;
      } else if prev_t < upper {
        partial += 0.5 * (prev_c + c(upper)) * (upper - prev_t);
      }
      prev_t = t;
      prev_c = ct;
    }

    if total > 0.0 {
      (partial / total).clamp(0.0, 1.0)
    } else {
      upper
    }
  }

  fn hfunc1_scalar(&self, u1: f64, u2: f64) -> f64 {
    self.conditional(u1, u2, true)
  }

  fn hfunc2_scalar(&self, u1: f64, u2: f64) -> f64 {
    self.conditional(u2, u1, false)
  }

  fn cdf_scalar(&self, u1: f64, u2: f64) -> f64 {
    if u1 <= 0.0 || u2 <= 0.0 {
      return 0.0;
    }
    let (mut acc, mut prev_t, mut prev_h) = (0.0, 0.0, self.hfunc1_scalar(0.0, u2));
    for &t in self.grid.iter().filter(|&&g| g < u1).chain(once(&u1)) {
      let ht = self.hfunc1_scalar(t, u2);
      acc += 0.5 * (ht + prev_h) * (t - prev_t);
      prev_t = t;
      prev_h = ht;
    }
    acc.clamp(0.0, u1.min(u2))
  }
}

impl BivariateExt for Tll {
  fn family(&self) -> BicopFamily {
    BicopFamily::Tll
  }

  fn parameters(&self) -> Array1<f64> {
    Array1::zeros(0)
  }

  fn parameters_bounds(&self) -> Array2<f64> {
    Array2::zeros((0, 2))
  }

  fn store_parameters(&mut self, _parameters: &Array1<f64>) {}

  fn npars(&self) -> f64 {
    self.edf
  }

  fn pdf_raw(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
    Ok(map_rows(u, |u1, u2| self.interp(u1, u2)))
  }

  fn cdf_raw(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
    Ok(map_rows(u, |u1, u2| self.cdf_scalar(u1, u2)))
  }

  fn hfunc1_raw(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
    Ok(map_rows(u, |u1, u2| self.hfunc1_scalar(u1, u2)))
  }

  fn hfunc2_raw(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
    Ok(map_rows(u, |u1, u2| self.hfunc2_scalar(u1, u2)))
  }

  fn hinv2_raw(&self, u: &Array2<f64>, inversion: &InversionConfig) -> Result<Array1<f64>> {
    let u2 = u.column(1);
    let level = u.column(0).to_owned();
    invert_f(&level, |v| self.hfunc2_raw(&cbind(v.view(), u2)), inversion)
  }

  /// `tau = 1 - 4 ∬ h1 h2`, midpoint rule.
  fn parameters_to_tau(&self, _parameters: &Array1<f64>) -> Result<f64> {
    let m = TAU_POINTS as f64;
    let mut acc = 0.0;
    for i in 0..TAU_POINTS {
      let u1 = (i as f64 + 0.5) / m;
      for j in 0..TAU_POINTS {
        let u2 = (j as f64 + 0.5) / m;
        acc += self.hfunc1_scalar(u1, u2) * self.hfunc2_scalar(u1, u2);
      }
    }
    Ok((1.0 - 4.0 * acc / (m * m)).clamp(-1.0, 1.0))
  }

  fn tau_to_parameters(&self, _tau: f64) -> Result<Array1<f64>> {
    Ok(Array1::zeros(0))
  }

  fn flip(&mut self) {
    self.values = self.values.t().to_owned();
  }

  fn fit_nonparametric(&mut self, data: &Array2<f64>, mult: f64) -> Result<()> {
    if !(mult.is_finite() && mult > 0.0) {
      return Err(BicopError::InvalidInput(format!(
        "bandwidth multiplier must be positive, got {mult}"
      )));
    }

    let n = data.nrows();
    let z = data.mapv(qnorm);
    let scale = mult * (n as f64).powf(-1.0 / 3.0);
    let sigma = if n > 2 {
      z.t().cov(1.0).unwrap_or_else(|_| Array2::eye(2))
    } else {
      Array2::eye(2)
    };
    let kernel = Kernel::new(&(&sigma * scale))
      .or_else(|| Kernel::new(&(Array2::<f64>::eye(2) * scale)))
      .ok_or_else(|| BicopError::FittingFailed("degenerate kernel bandwidth".into()))?;

    let density = |x: f64, y: f64| {
      z.axis_iter(Axis(0))
        .map(|zi| kernel.eval(x - zi[0], y - zi[1]))
        .sum::<f64>()
        / n as f64
    };

    let zg = self.grid.mapv(qnorm);
    let mut values = Array2::<f64>::zeros((GRID_SIZE, GRID_SIZE));
    Zip::indexed(&mut values).par_for_each(|(i, j), v| {
      *v = density(zg[i], zg[j]) / (dnorm(zg[i]) * dnorm(zg[j]));
    });

    let self_weight = kernel.eval(0.0, 0.0);
    let edf = z
      .axis_iter(Axis(0))
      .map(|zi| self_weight / (n as f64 * density(zi[0], zi[1])))
      .sum::<f64>();

    tracing::debug!(n, edf, "fitted kernel estimator");
    self.values = values;
    self.edf = edf;
    Ok(())
  }

  fn clone_box(&self) -> Box<dyn BivariateExt> {
    Box::new(self.clone())
  }
}
