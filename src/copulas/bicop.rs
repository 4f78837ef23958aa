//! # Bicop
//!
//! $$
//! \mathrm{BIC}=-2\ell+k\ln n,\qquad \mathrm{AIC}=-2\ell+2k
//! $$
//!
//! User-facing bivariate copula that owns one [`AbstractBicop`] and can replace
//! it by the best candidate of a family set.
//!
use std::fmt;

use ndarray::Array1;
use ndarray::Array2;
use rayon::prelude::*;
use tracing::debug;
use tracing::warn;

use crate::copulas::bivariate::AbstractBicop;
use crate::copulas::bivariate::BicopFamily;
use crate::copulas::bivariate::Rotation;
use crate::copulas::controls::FitControls;
use crate::copulas::controls::SelectionCriterion;
use crate::copulas::correlation::kendall_tau_cols;
use crate::error::BicopError;
use crate::error::Result;
use crate::tools::check_data;

#[derive(Debug, Clone)]
pub struct Bicop {
  bicop: AbstractBicop,
}

impl Default for Bicop {
  fn default() -> Self {
    Self::new()
  }
}

impl Bicop {
  /// Independence copula.
  pub fn new() -> Self {
    Self {
      bicop: AbstractBicop::independence(),
    }
  }

  pub fn create(
    family: BicopFamily,
    parameters: Option<&Array1<f64>>,
    rotation: i32,
  ) -> Result<Self> {
    Ok(Self {
      bicop: AbstractBicop::create(family, parameters, rotation)?,
    })
  }

  /// Selects the best model for `data` among `family_set`.
  pub fn from_data(
    data: &Array2<f64>,
    family_set: &[BicopFamily],
    controls: &FitControls,
  ) -> Result<Self> {
    let mut bicop = Self::new();
    bicop.select(data, family_set, controls)?;
    Ok(bicop)
  }

  pub fn family(&self) -> BicopFamily {
    self.bicop.family()
  }

  pub fn rotation(&self) -> Rotation {
    self.bicop.rotation()
  }

  pub fn parameters(&self) -> Array1<f64> {
    self.bicop.parameters()
  }

  pub fn parameters_bounds(&self) -> Array2<f64> {
    self.bicop.parameters_bounds()
  }

  pub fn set_parameters(&mut self, parameters: &Array1<f64>) -> Result<()> {
    self.bicop.set_parameters(parameters)
  }

  pub fn set_rotation(&mut self, rotation: i32) -> Result<()> {
    self.bicop.set_rotation(rotation)
  }

  pub fn npars(&self) -> f64 {
    self.bicop.npars()
  }

  pub fn pdf(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
    self.bicop.pdf(u)
  }

  pub fn cdf(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
    self.bicop.cdf(u)
  }

  pub fn hfunc1(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
    self.bicop.hfunc1(u)
  }

  pub fn hfunc2(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
    self.bicop.hfunc2(u)
  }

  pub fn hinv1(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
    self.bicop.hinv1(u)
  }

  pub fn hinv2(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
    self.bicop.hinv2(u)
  }

  pub fn loglik(&self, u: &Array2<f64>) -> Result<f64> {
    self.bicop.loglik(u)
  }

  pub fn aic(&self, u: &Array2<f64>) -> Result<f64> {
    self.bicop.aic(u)
  }

  pub fn bic(&self, u: &Array2<f64>) -> Result<f64> {
    self.bicop.bic(u)
  }

  pub fn tau(&self) -> Result<f64> {
    self.bicop.tau()
  }

  pub fn parameters_to_tau(&self, parameters: &Array1<f64>) -> Result<f64> {
    self.bicop.parameters_to_tau(parameters)
  }

  pub fn tau_to_parameters(&self, tau: f64) -> Result<Array1<f64>> {
    self.bicop.tau_to_parameters(tau)
  }

  pub fn flip(&mut self) {
    self.bicop.flip();
  }

  pub fn simulate(&self, n: usize, seed: u64) -> Result<Array2<f64>> {
    self.bicop.simulate(n, seed)
  }

  /// Fits the current family and rotation to `data`.
  pub fn fit(&mut self, data: &Array2<f64>, controls: &FitControls) -> Result<()> {
    self.bicop.fit(data, controls)
  }

  /// Fits every (family, rotation) candidate and keeps the one with the lowest
  /// information criterion. Ties go to the earliest candidate in search order.
  pub fn select(
    &mut self,
    data: &Array2<f64>,
    family_set: &[BicopFamily],
    controls: &FitControls,
  ) -> Result<()> {
    if family_set.is_empty() {
      return Err(BicopError::EmptyCandidateSet);
    }
    check_data(data)?;

    let tau = if controls.preselect_rotations {
      Some(kendall_tau_cols(data)?)
    } else {
      None
    };
    let candidates = candidates(family_set, tau);
    debug!(
      candidates = candidates.len(),
      criterion = %controls.selection_criterion,
      "selecting bivariate copula"
    );

    let fit_one = |&(family, rotation): &(BicopFamily, Rotation)| -> (f64, Option<AbstractBicop>) {
      match score_candidate(family, rotation, data, controls) {
        Ok((score, bicop)) if score.is_finite() => (score, Some(bicop)),
        Ok((score, _)) => {
          warn!(%family, %rotation, score, "candidate score is not finite");
          (f64::INFINITY, None)
        }
        Err(e) => {
          warn!(%family, %rotation, error = %e, "candidate fit failed");
          (f64::INFINITY, None)
        }
      }
    };

    let scored: Vec<(f64, Option<AbstractBicop>)> = if controls.parallel {
      candidates.par_iter().map(fit_one).collect()
    } else {
      candidates.iter().map(fit_one).collect()
    };

    let mut best: Option<(f64, AbstractBicop)> = None;
    for (score, bicop) in scored {
      let Some(bicop) = bicop else { continue };
      if best.as_ref().map_or(true, |(b, _)| improves(score, *b)) {
        best = Some((score, bicop));
      }
    }

    let (score, winner) = best.ok_or_else(|| {
      BicopError::FittingFailed("no candidate produced a finite score".into())
    })?;
    debug!(%winner, score, "selected bivariate copula");
    self.bicop = winner;
    Ok(())
  }
}

/// Relative gap below which two scores count as tied.
const TIE_TOLERANCE: f64 = 1e-9;

/// Whether `score` beats `best` by more than rounding noise. Radially symmetric
/// families fit the same model at 0 and 90 degrees with mirrored parameters.
fn improves(score: f64, best: f64) -> bool {
  score < best - TIE_TOLERANCE * best.abs().max(1.0)
}

/// Search order: families in first-occurrence order, then ascending rotation.
/// Independence is always appended as the fallback.
fn candidates(family_set: &[BicopFamily], tau: Option<f64>) -> Vec<(BicopFamily, Rotation)> {
  let mut families: Vec<BicopFamily> = Vec::with_capacity(family_set.len() + 1);
  for &family in family_set {
    if !families.contains(&family) {
      families.push(family);
    }
  }
  if !families.contains(&BicopFamily::Indep) {
    families.push(BicopFamily::Indep);
  }

  families
    .into_iter()
    .flat_map(|family| {
      family
        .candidate_rotations()
        .into_iter()
        .filter(move |rotation| keep_rotation(family, *rotation, tau))
        .map(move |rotation| (family, rotation))
    })
    .collect()
}

/// Drops rotations whose sign of dependence disagrees with the empirical tau.
fn keep_rotation(family: BicopFamily, rotation: Rotation, tau: Option<f64>) -> bool {
  match tau {
    None => true,
    Some(tau) if tau == 0.0 => true,
    Some(_) if matches!(family, BicopFamily::Indep | BicopFamily::Tll) => true,
    Some(tau) => rotation.is_negative() == (tau < 0.0),
  }
}

fn score_candidate(
  family: BicopFamily,
  rotation: Rotation,
  data: &Array2<f64>,
  controls: &FitControls,
) -> Result<(f64, AbstractBicop)> {
  let mut bicop = AbstractBicop::create(family, None, rotation.degrees())?;
  bicop.set_inversion(controls.inversion);
  bicop.fit(data, controls)?;
  let score = match controls.selection_criterion {
    SelectionCriterion::Bic => bicop.bic(data)?,
    SelectionCriterion::Aic => bicop.aic(data)?,
  };
  debug!(%family, %rotation, score, "candidate fitted");
  Ok((score, bicop))
}

impl fmt::Display for Bicop {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.bicop)
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use ndarray::array;
  use tracing_test::traced_test;

  use super::*;
  use crate::copulas::controls::FitMethod;

  #[test]
  fn default_is_independence() {
    let bicop = Bicop::new();
    assert_eq!(bicop.family(), BicopFamily::Indep);
    assert_eq!(bicop.rotation(), Rotation::R0);
    assert_eq!(bicop.npars(), 0.0);
  }

  #[test]
  fn candidates_follow_search_order() {
    let found = candidates(
      &[BicopFamily::Frank, BicopFamily::Clayton, BicopFamily::Frank],
      None,
    );
    assert_eq!(
      found,
      vec![
        (BicopFamily::Frank, Rotation::R0),
        (BicopFamily::Frank, Rotation::R90),
        (BicopFamily::Clayton, Rotation::R0),
        (BicopFamily::Clayton, Rotation::R90),
        (BicopFamily::Clayton, Rotation::R180),
        (BicopFamily::Clayton, Rotation::R270),
        (BicopFamily::Indep, Rotation::R0),
      ]
    );
  }

  #[test]
  fn preselection_keeps_matching_sign() {
    let found = candidates(&[BicopFamily::Gumbel, BicopFamily::Tll], Some(-0.4));
    assert_eq!(
      found,
      vec![
        (BicopFamily::Gumbel, Rotation::R90),
        (BicopFamily::Gumbel, Rotation::R270),
        (BicopFamily::Tll, Rotation::R0),
        (BicopFamily::Indep, Rotation::R0),
      ]
    );
  }

  #[test]
  fn scores_within_rounding_are_ties() {
    assert!(!improves(-671.354_611_025_898_7, -671.354_611_025_897_8));
    assert!(!improves(3.0, 3.0));
    assert!(improves(-672.0, -671.0));
    assert!(improves(-1e-3, 0.0));
  }

  #[test]
  fn mirrored_frank_fit_keeps_rotation_zero() {
    for rotation in [0, 180] {
      let truth = Bicop::create(BicopFamily::Frank, Some(&array![6.0]), rotation).unwrap();
      let data = truth.simulate(1000, 7).unwrap();
      let bicop = Bicop::from_data(&data, &[BicopFamily::Frank], &FitControls::default()).unwrap();
      assert_eq!(bicop.family(), BicopFamily::Frank);
      assert_eq!(bicop.rotation(), Rotation::R0);
      assert!(bicop.parameters()[0] > 0.0, "{bicop}");
    }
  }

  #[test]
  fn empty_family_set_is_rejected() {
    let mut bicop = Bicop::new();
    let data = array![[0.2, 0.3], [0.6, 0.7]];
    assert!(matches!(
      bicop.select(&data, &[], &FitControls::default()),
      Err(BicopError::EmptyCandidateSet)
    ));
  }

  #[test]
  #[traced_test]
  fn selects_rotated_clayton() {
    let truth = Bicop::create(BicopFamily::Clayton, Some(&array![4.0]), 270).unwrap();
    let data = truth.simulate(600, 11).unwrap();
    let mut bicop = Bicop::new();
    bicop
      .select(
        &data,
        &BicopFamily::one_par(),
        &FitControls::default().with_parallel(false),
      )
      .unwrap();
    assert_eq!(bicop.family(), BicopFamily::Clayton);
    assert_eq!(bicop.rotation(), Rotation::R270);
    assert!(logs_contain("selected bivariate copula"));
  }

  #[test]
  #[traced_test]
  fn failed_candidates_fall_back_to_independence() {
    let truth = Bicop::create(BicopFamily::Gaussian, Some(&array![0.6]), 0).unwrap();
    let data = truth.simulate(200, 5).unwrap();
    let controls = FitControls::default()
      .with_method(FitMethod::Itau)
      .with_parallel(false);
    let mut bicop = Bicop::create(BicopFamily::Frank, Some(&array![3.0]), 0).unwrap();
    bicop.select(&data, &BicopFamily::bb(), &controls).unwrap();
    assert_eq!(bicop.family(), BicopFamily::Indep);
    assert!(logs_contain("candidate fit failed"));
  }

  #[test]
  fn sequential_and_parallel_selection_agree() {
    let truth = Bicop::create(BicopFamily::Joe, Some(&array![2.5]), 180).unwrap();
    let data = truth.simulate(300, 21).unwrap();
    let set = [BicopFamily::Joe, BicopFamily::Gumbel, BicopFamily::Clayton];
    let parallel = Bicop::from_data(&data, &set, &FitControls::default()).unwrap();
    let sequential =
      Bicop::from_data(&data, &set, &FitControls::default().with_parallel(false)).unwrap();
    assert_eq!(parallel.family(), sequential.family());
    assert_eq!(parallel.rotation(), sequential.rotation());
    assert_abs_diff_eq!(parallel.parameters()[0], sequential.parameters()[0], epsilon = 1e-12);
  }

  #[test]
  fn aic_criterion_is_used() {
    let truth = Bicop::create(BicopFamily::Frank, Some(&array![-6.0]), 0).unwrap();
    let data = truth.simulate(400, 8).unwrap();
    let controls = FitControls::default().with_selection_criterion(SelectionCriterion::Aic);
    let bicop = Bicop::from_data(&data, &[BicopFamily::Frank], &controls).unwrap();
    assert_eq!(bicop.family(), BicopFamily::Frank);
    assert!(bicop.aic(&data).unwrap() < 0.0);
  }
}
