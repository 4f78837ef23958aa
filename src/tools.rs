//! # Tools
//!
//! $$
//! x_m^{(k+1)}=\tfrac12\left(x_l^{(k)}+x_h^{(k)}\right),\qquad f\left(x_m^{(K)}\right)\approx x
//! $$
//!
//! Array helpers shared by the copula families: bisection inversion, column
//! swaps and reflections, trimming, standard normal helpers and the
//! whitespace-delimited matrix reader used by the test fixtures.
//!
use std::f64::consts::PI;
use std::f64::consts::SQRT_2;
use std::fs;
use std::path::Path;

use ndarray::Array1;
use ndarray::Array2;
use ndarray::ArrayView1;
use ndarray::Zip;
use statrs::function::erf::erfc;
use statrs::function::erf::erfc_inv;

use crate::copulas::controls::InversionConfig;
use crate::error::BicopError;
use crate::error::Result;

/// Lower/upper trimming level applied before evaluating densities.
pub const TRIM_EPS: f64 = 1e-10;

/// Numerical inversion of a vectorized, increasing function by bisection.
///
/// Every element keeps its own bracket `[xl, xh]`, initialised to
/// `[config.lb, config.ub]`. After `config.n_iter` halvings the last midpoint is
/// returned, so the accuracy is `(ub - lb) * 2^-n_iter` whenever `f` is
/// increasing on the bracket. Nothing is checked: a non-monotone `f` silently
/// yields a meaningless result.
pub fn invert_f<F, E>(
  x: &Array1<f64>,
  mut f: F,
  config: &InversionConfig,
) -> std::result::Result<Array1<f64>, E>
where
  F: FnMut(&Array1<f64>) -> std::result::Result<Array1<f64>, E>,
{
  let n = x.len();
  let mut xl = Array1::from_elem(n, config.lb);
  let mut xh = Array1::from_elem(n, config.ub);
  let mut xm = x.clone();

  for _ in 0..config.n_iter {
    xm = (&xl + &xh) / 2.0;
    let fm = f(&xm)? - x;

    Zip::from(&mut xl)
      .and(&mut xh)
      .and(&xm)
      .and(&fm)
      .for_each(|lo, hi, &mid, &r| {
        if r < 0.0 {
          *lo = mid;
        } else {
          *hi = mid;
        }
      });
  }

  Ok(xm)
}

/// Exchanges the two columns of an n x 2 matrix.
pub fn swap_cols(u: &Array2<f64>) -> Array2<f64> {
  let mut out = u.clone();
  out.column_mut(0).assign(&u.column(1));
  out.column_mut(1).assign(&u.column(0));
  out
}

/// Evaluates a scalar formula on every row `(u1, u2)` of an n x 2 matrix.
pub fn map_rows<F>(u: &Array2<f64>, f: F) -> Array1<f64>
where
  F: Fn(f64, f64) -> f64,
{
  u.rows().into_iter().map(|row| f(row[0], row[1])).collect()
}

/// Builds an n x 2 matrix from two columns of equal length.
pub fn cbind(first: ArrayView1<f64>, second: ArrayView1<f64>) -> Array2<f64> {
  Array2::from_shape_fn((first.len(), 2), |(i, j)| {
    if j == 0 {
      first[i]
    } else {
      second[i]
    }
  })
}

/// Replaces the selected columns by `1 - u`.
pub fn reflect_cols(u: &Array2<f64>, first: bool, second: bool) -> Array2<f64> {
  let mut out = u.clone();
  if first {
    out.column_mut(0).mapv_inplace(|v| 1.0 - v);
  }
  if second {
    out.column_mut(1).mapv_inplace(|v| 1.0 - v);
  }
  out
}

/// Clamps every entry into `[TRIM_EPS, 1 - TRIM_EPS]`.
pub fn trim(u: &Array2<f64>) -> Array2<f64> {
  u.mapv(|v| v.clamp(TRIM_EPS, 1.0 - TRIM_EPS))
}

/// Clamps every entry of a parameter vector into the rows of a k x 2 bounds matrix.
pub fn clip_to_bounds(parameters: &Array1<f64>, bounds: &Array2<f64>) -> Array1<f64> {
  Array1::from_iter(
    parameters
      .iter()
      .enumerate()
      .map(|(j, &p)| p.clamp(bounds[[j, 0]], bounds[[j, 1]])),
  )
}

/// Standard normal distribution function.
pub fn pnorm(x: f64) -> f64 {
  0.5 * erfc(-x / SQRT_2)
}

/// Standard normal quantile function; returns `-inf`/`inf` at 0 and 1.
pub fn qnorm(p: f64) -> f64 {
  -SQRT_2 * erfc_inv(2.0 * p)
}

/// Standard normal density.
pub fn dnorm(x: f64) -> f64 {
  (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// Validates an evaluation matrix: two columns, at least one row, entries in `[0, 1]`.
pub fn check_u(u: &Array2<f64>) -> Result<()> {
  if u.ncols() != 2 {
    return Err(BicopError::InvalidInput(format!(
      "u must have two columns, got {}",
      u.ncols()
    )));
  }
  if u.nrows() == 0 {
    return Err(BicopError::InvalidInput("u must have at least one row".into()));
  }
  if u.iter().any(|v| !(0.0..=1.0).contains(v)) {
    return Err(BicopError::InvalidInput(
      "all entries of u must lie in [0, 1]".into(),
    ));
  }
  Ok(())
}

/// Validates a sample of pseudo-observations: like [`check_u`] but on the open square.
pub fn check_data(data: &Array2<f64>) -> Result<()> {
  check_u(data)?;
  if data.iter().any(|&v| v <= 0.0 || v >= 1.0) {
    return Err(BicopError::InvalidInput(
      "pseudo-observations must lie in the open interval (0, 1)".into(),
    ));
  }
  Ok(())
}

/// Sets entries to the limits of a conditional distribution function where the
/// free coordinate sits exactly on the boundary, then clamps into `[0, 1]`.
pub fn boundary_limits(h: Array1<f64>, free: ArrayView1<f64>) -> Array1<f64> {
  let mut h = h;
  Zip::from(&mut h).and(&free).for_each(|h, &v| {
    if v == 0.0 {
      *h = 0.0;
    } else if v == 1.0 {
      *h = 1.0;
    } else if *h == f64::INFINITY {
      *h = 1.0;
    } else if *h == f64::NEG_INFINITY {
      *h = 0.0;
    } else {
      *h = h.clamp(0.0, 1.0);
    }
  });
  h
}

/// Reads a whitespace-delimited text matrix, one row per line.
///
/// Blank lines are skipped. Every non-blank line must carry the same number of
/// columns.
pub fn read_matxd<P: AsRef<Path>>(path: P) -> Result<Array2<f64>> {
  let content = fs::read_to_string(path)?;
  let mut values = Vec::new();
  let mut rows = 0;
  let mut cols = 0;

  for (line_no, line) in content.lines().enumerate() {
    let row = line
      .split_whitespace()
      .map(|token| {
        token.parse::<f64>().map_err(|_| {
          BicopError::InvalidInput(format!(
            "line {}: cannot parse '{}' as a number",
            line_no + 1,
            token
          ))
        })
      })
      .collect::<Result<Vec<f64>>>()?;

    if row.is_empty() {
      continue;
    }
    if cols == 0 {
      cols = row.len();
    } else if row.len() != cols {
      return Err(BicopError::InvalidInput(format!(
        "line {}: expected {} columns, found {}",
        line_no + 1,
        cols,
        row.len()
      )));
    }

    values.extend(row);
    rows += 1;
  }

  Array2::from_shape_vec((rows, cols), values)
    .map_err(|e| BicopError::InvalidInput(e.to_string()))
}
