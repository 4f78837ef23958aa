//! # Controls
//!
//! $$
//! \mathrm{AIC}=-2\ell+2k,\qquad \mathrm{BIC}=-2\ell+k\ln n
//! $$
//!
//! Explicit configuration values threaded through fitting, selection and the
//! numerical inversion of h-functions.
//!
use std::fmt;
use std::str::FromStr;

use crate::error::BicopError;

/// Estimation method for parametric families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FitMethod {
  /// Maximum likelihood over the parameter box.
  Mle,
  /// Inversion of Kendall's tau.
  Itau,
}

impl FromStr for FitMethod {
  type Err = BicopError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "mle" => Ok(FitMethod::Mle),
      "itau" => Ok(FitMethod::Itau),
      other => Err(BicopError::InvalidInput(format!(
        "unknown fit method '{other}', expected 'mle' or 'itau'"
      ))),
    }
  }
}

impl fmt::Display for FitMethod {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      FitMethod::Mle => write!(f, "mle"),
      FitMethod::Itau => write!(f, "itau"),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionCriterion {
  Bic,
  Aic,
}

impl FromStr for SelectionCriterion {
  type Err = BicopError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "bic" => Ok(SelectionCriterion::Bic),
      "aic" => Ok(SelectionCriterion::Aic),
      other => Err(BicopError::InvalidInput(format!(
        "unknown selection criterion '{other}', expected 'bic' or 'aic'"
      ))),
    }
  }
}

impl fmt::Display for SelectionCriterion {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SelectionCriterion::Bic => write!(f, "bic"),
      SelectionCriterion::Aic => write!(f, "aic"),
    }
  }
}

/// Bracket and iteration count for the bisection inversion of h-functions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InversionConfig {
  pub lb: f64,
  pub ub: f64,
  /// 35 halvings give an accuracy of about 3e-11 on the unit interval.
  pub n_iter: usize,
}

impl Default for InversionConfig {
  fn default() -> Self {
    Self {
      lb: 1e-20,
      ub: 1.0 - 1e-20,
      n_iter: 35,
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FitControls {
  pub method: FitMethod,
  pub selection_criterion: SelectionCriterion,
  /// Only try rotations whose sign class matches the empirical Kendall's tau.
  pub preselect_rotations: bool,
  /// Fit selection candidates on the rayon thread pool.
  pub parallel: bool,
  /// Iteration cap for the Nelder-Mead search.
  pub max_iters: u64,
  /// Bandwidth multiplier of the nonparametric kernel estimator.
  pub nonparametric_mult: f64,
  pub inversion: InversionConfig,
}

impl Default for FitControls {
  fn default() -> Self {
    Self {
      method: FitMethod::Mle,
      selection_criterion: SelectionCriterion::Bic,
      preselect_rotations: false,
      parallel: true,
      max_iters: 500,
      nonparametric_mult: 1.0,
      inversion: InversionConfig::default(),
    }
  }
}

impl FitControls {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_method(mut self, method: FitMethod) -> Self {
    self.method = method;
    self
  }

  pub fn with_selection_criterion(mut self, criterion: SelectionCriterion) -> Self {
    self.selection_criterion = criterion;
    self
  }

  pub fn with_preselect_rotations(mut self, preselect: bool) -> Self {
    self.preselect_rotations = preselect;
    self
  }

  pub fn with_parallel(mut self, parallel: bool) -> Self {
    self.parallel = parallel;
    self
  }

  pub fn with_max_iters(mut self, max_iters: u64) -> Self {
    self.max_iters = max_iters;
    self
  }

  pub fn with_nonparametric_mult(mut self, mult: f64) -> Self {
    self.nonparametric_mult = mult;
    self
  }

  pub fn with_inversion(mut self, inversion: InversionConfig) -> Self {
    self.inversion = inversion;
    self
  }
}
