//! # Bivariate
//!
//! $$
//! c_{90}(u_1,u_2)=c(1-u_1,u_2),\quad c_{180}(u_1,u_2)=c(1-u_1,1-u_2),\quad c_{270}(u_1,u_2)=c(u_1,1-u_2)
//! $$
//!
//! A copula family, its parameters and one of four rotations. The family
//! formulas only ever see the canonical orientation; this module reflects the
//! inputs and transforms the outputs.
//!
use std::fmt;
use std::str::FromStr;

use argmin::core::CostFunction;
use argmin::core::Executor;
use argmin::solver::neldermead::NelderMead;
use ndarray::Array1;
use ndarray::Array2;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::Uniform;

use crate::copulas::controls::FitControls;
use crate::copulas::controls::FitMethod;
use crate::copulas::controls::InversionConfig;
use crate::copulas::correlation::kendall_tau_cols;
use crate::error::BicopError;
use crate::error::Result;
use crate::tools::boundary_limits;
use crate::tools::cbind;
use crate::tools::check_data;
use crate::tools::check_u;
use crate::tools::reflect_cols;
use crate::tools::trim;
use crate::traits::BivariateExt;

pub mod archimedean;
pub mod bb1;
pub mod bb6;
pub mod bb7;
pub mod bb8;
pub mod clayton;
pub mod elliptical;
pub mod frank;
pub mod gaussian;
pub mod gumbel;
pub mod independence;
pub mod joe;
pub mod student;
pub mod tll;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BicopFamily {
  Indep,
  Gaussian,
  Student,
  Clayton,
  Gumbel,
  Frank,
  Joe,
  Bb1,
  Bb6,
  Bb7,
  Bb8,
  /// Transformation local-constant kernel estimator.
  Tll,
}

impl BicopFamily {
  pub fn all() -> Vec<Self> {
    use BicopFamily::*;
    vec![
      Indep, Gaussian, Student, Clayton, Gumbel, Frank, Joe, Bb1, Bb6, Bb7, Bb8, Tll,
    ]
  }

  pub fn parametric() -> Vec<Self> {
    use BicopFamily::*;
    vec![
      Gaussian, Student, Clayton, Gumbel, Frank, Joe, Bb1, Bb6, Bb7, Bb8,
    ]
  }

  pub fn nonparametric() -> Vec<Self> {
    vec![BicopFamily::Indep, BicopFamily::Tll]
  }

  pub fn one_par() -> Vec<Self> {
    use BicopFamily::*;
    vec![Gaussian, Clayton, Gumbel, Frank, Joe]
  }

  pub fn two_par() -> Vec<Self> {
    use BicopFamily::*;
    vec![Student, Bb1, Bb6, Bb7, Bb8]
  }

  pub fn elliptical() -> Vec<Self> {
    vec![BicopFamily::Gaussian, BicopFamily::Student]
  }

  pub fn archimedean() -> Vec<Self> {
    use BicopFamily::*;
    vec![Clayton, Gumbel, Frank, Joe, Bb1, Bb6, Bb7, Bb8]
  }

  pub fn bb() -> Vec<Self> {
    use BicopFamily::*;
    vec![Bb1, Bb6, Bb7, Bb8]
  }

  /// Families whose parameters can be recovered from Kendall's tau.
  pub fn itau() -> Vec<Self> {
    use BicopFamily::*;
    vec![Indep, Gaussian, Student, Clayton, Gumbel, Frank, Joe]
  }

  /// Radially symmetric or nonparametric families. Selection never tries 180 or 270 for them.
  pub fn rotationless() -> Vec<Self> {
    use BicopFamily::*;
    vec![Indep, Gaussian, Student, Frank, Tll]
  }

  /// Exchangeable families whose flip is carried by the rotation alone.
  pub fn flip_by_rotation() -> Vec<Self> {
    use BicopFamily::*;
    vec![Clayton, Gumbel, Joe, Bb1, Bb6, Bb7, Bb8]
  }

  pub fn name(&self) -> &'static str {
    match self {
      BicopFamily::Indep => "indep",
      BicopFamily::Gaussian => "gaussian",
      BicopFamily::Student => "student",
      BicopFamily::Clayton => "clayton",
      BicopFamily::Gumbel => "gumbel",
      BicopFamily::Frank => "frank",
      BicopFamily::Joe => "joe",
      BicopFamily::Bb1 => "bb1",
      BicopFamily::Bb6 => "bb6",
      BicopFamily::Bb7 => "bb7",
      BicopFamily::Bb8 => "bb8",
      BicopFamily::Tll => "tll",
    }
  }

  /// Rotations tried by family selection.
  pub fn candidate_rotations(&self) -> Vec<Rotation> {
    if BicopFamily::nonparametric().contains(self) {
      vec![Rotation::R0]
    } else if BicopFamily::rotationless().contains(self) {
      vec![Rotation::R0, Rotation::R90]
    } else {
      Rotation::all().to_vec()
    }
  }

  pub(crate) fn instantiate(&self) -> Box<dyn BivariateExt> {
    match self {
      BicopFamily::Indep => Box::new(independence::Independence::new()),
      BicopFamily::Gaussian => Box::<gaussian::Gaussian>::default(),
      BicopFamily::Student => Box::<student::Student>::default(),
      BicopFamily::Clayton => Box::<clayton::Clayton>::default(),
      BicopFamily::Gumbel => Box::<gumbel::Gumbel>::default(),
      BicopFamily::Frank => Box::<frank::Frank>::default(),
      BicopFamily::Joe => Box::<joe::Joe>::default(),
      BicopFamily::Bb1 => Box::<bb1::Bb1>::default(),
      BicopFamily::Bb6 => Box::<bb6::Bb6>::default(),
      BicopFamily::Bb7 => Box::<bb7::Bb7>::default(),
      BicopFamily::Bb8 => Box::<bb8::Bb8>::default(),
      BicopFamily::Tll => Box::new(tll::Tll::new()),
    }
  }
}

impl fmt::Display for BicopFamily {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.name())
  }
}

impl FromStr for BicopFamily {
  type Err = BicopError;

  fn from_str(s: &str) -> Result<Self> {
    let lower = s.to_ascii_lowercase();
    match lower.as_str() {
      "indep" | "independence" => Ok(BicopFamily::Indep),
      "tll" => Ok(BicopFamily::Tll),
      other => BicopFamily::all()
        .into_iter()
        .find(|family| family.name() == other)
        .ok_or_else(|| BicopError::UnsupportedFamily(s.to_string())),
    }
  }
}

/// Classic numeric family codes 0-10.
impl TryFrom<i32> for BicopFamily {
  type Error = BicopError;

  fn try_from(code: i32) -> Result<Self> {
    use BicopFamily::*;
    let families = [
      Indep, Gaussian, Student, Clayton, Gumbel, Frank, Joe, Bb1, Bb6, Bb7, Bb8,
    ];
    usize::try_from(code)
      .ok()
      .and_then(|i| families.get(i).copied())
      .ok_or_else(|| BicopError::UnsupportedFamily(format!("code {code}")))
  }
}

/// Counter-clockwise rotation of the copula density.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
  #[default]
  R0,
  R90,
  R180,
  R270,
}

impl Rotation {
  pub fn all() -> [Rotation; 4] {
    [Rotation::R0, Rotation::R90, Rotation::R180, Rotation::R270]
  }

  pub fn degrees(&self) -> i32 {
    match self {
      Rotation::R0 => 0,
      Rotation::R90 => 90,
      Rotation::R180 => 180,
      Rotation::R270 => 270,
    }
  }

  /// Rotation after exchanging the two variables.
  pub fn flipped(&self) -> Rotation {
    match self {
      Rotation::R90 => Rotation::R270,
      Rotation::R270 => Rotation::R90,
      other => *other,
    }
  }

  /// 90 and 270 turn positive into negative dependence.
  pub fn is_negative(&self) -> bool {
    matches!(self, Rotation::R90 | Rotation::R270)
  }

  // (reflect first column, reflect second column)
  fn reflections(&self) -> (bool, bool) {
    match self {
      Rotation::R0 => (false, false),
      Rotation::R90 => (true, false),
      Rotation::R180 => (true, true),
      Rotation::R270 => (false, true),
    }
  }
}

impl TryFrom<i32> for Rotation {
  type Error = BicopError;

  fn try_from(degrees: i32) -> Result<Self> {
    match degrees {
      0 => Ok(Rotation::R0),
      90 => Ok(Rotation::R90),
      180 => Ok(Rotation::R180),
      270 => Ok(Rotation::R270),
      other => Err(BicopError::InvalidRotation(other)),
    }
  }
}

impl fmt::Display for Rotation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.degrees())
  }
}

/// A family, its parameters and a rotation.
#[derive(Debug, Clone)]
pub struct AbstractBicop {
  raw: Box<dyn BivariateExt>,
  rotation: Rotation,
  inversion: InversionConfig,
}

/// Negative log-likelihood over a logistic reparameterisation of the bounds box.
struct NegLogLik {
  raw: Box<dyn BivariateExt>,
  data: Array2<f64>,
  box_map: BoxMap,
}

/// Maps the free coordinates of an unconstrained vector into the bounds box.
#[derive(Debug, Clone)]
struct BoxMap {
  base: Array1<f64>,
  free: Vec<usize>,
  bounds: Array2<f64>,
}

/// Logits are clamped so the mapped parameter stays strictly inside its bounds.
const MAX_LOGIT: f64 = 30.0;

/// Relative distance kept between the starting point and the bounds.
const START_MARGIN: f64 = 1e-3;

fn to_unbounded(p: f64, lower: f64, upper: f64) -> f64 {
  let width = upper - lower;
  let p = p.clamp(lower + START_MARGIN * width, upper - START_MARGIN * width);
  let s = (p - lower) / width;
  (s / (1.0 - s)).ln().clamp(-MAX_LOGIT, MAX_LOGIT)
}

fn to_bounded(z: f64, lower: f64, upper: f64) -> f64 {
  let z = z.clamp(-MAX_LOGIT, MAX_LOGIT);
  lower + (upper - lower) / (1.0 + (-z).exp())
}

impl BoxMap {
  fn unbounded(&self) -> Vec<f64> {
    self
      .free
      .iter()
      .map(|&j| to_unbounded(self.base[j], self.bounds[[j, 0]], self.bounds[[j, 1]]))
      .collect()
  }

  fn parameters(&self, z: &[f64]) -> Array1<f64> {
    let mut p = self.base.clone();
    for (&j, &zj) in self.free.iter().zip(z) {
      p[j] = to_bounded(zj, self.bounds[[j, 0]], self.bounds[[j, 1]]);
    }
    p
  }
}

impl CostFunction for NegLogLik {
  type Param = Vec<f64>;
  type Output = f64;

  fn cost(&self, z: &Self::Param) -> std::result::Result<Self::Output, argmin::core::Error> {
    let mut family = self.raw.clone_box();
    family.store_parameters(&self.box_map.parameters(z));
    let ll = match family.log_pdf_raw(&self.data) {
      Ok(values) => values.sum(),
      Err(_) => return Ok(f64::INFINITY),
    };
    Ok(if ll.is_finite() { -ll } else { f64::INFINITY })
  }
}

impl AbstractBicop {
  pub fn independence() -> Self {
    Self {
      raw: BicopFamily::Indep.instantiate(),
      rotation: Rotation::R0,
      inversion: InversionConfig::default(),
    }
  }

  /// Builds a validated copula. `parameters = None` keeps the family defaults.
  pub fn create(
    family: BicopFamily,
    parameters: Option<&Array1<f64>>,
    rotation: i32,
  ) -> Result<Self> {
    let mut bicop = Self {
      raw: family.instantiate(),
      rotation: Rotation::try_from(rotation)?,
      inversion: InversionConfig::default(),
    };
    if let Some(p) = parameters {
      bicop.set_parameters(p)?;
    }
    Ok(bicop)
  }

  pub fn family(&self) -> BicopFamily {
    self.raw.family()
  }

  pub fn rotation(&self) -> Rotation {
    self.rotation
  }

  pub fn parameters(&self) -> Array1<f64> {
    self.raw.parameters()
  }

  pub fn parameters_bounds(&self) -> Array2<f64> {
    self.raw.parameters_bounds()
  }

  pub fn set_inversion(&mut self, inversion: InversionConfig) {
    self.inversion = inversion;
  }

  pub fn set_parameters(&mut self, parameters: &Array1<f64>) -> Result<()> {
    self.raw.check_parameters(parameters)?;
    self.raw.store_parameters(parameters);
    Ok(())
  }

  pub fn set_rotation(&mut self, rotation: i32) -> Result<()> {
    self.rotation = Rotation::try_from(rotation)?;
    Ok(())
  }

  /// Number of parameters, or effective degrees of freedom for the kernel estimator.
  pub fn npars(&self) -> f64 {
    self.raw.npars()
  }

  /// Maps a sample on the rotated scale to the canonical scale of the family.
  fn to_canonical(&self, u: &Array2<f64>) -> Array2<f64> {
    let (first, second) = self.rotation.reflections();
    reflect_cols(u, first, second)
  }

  pub fn pdf(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
    check_u(u)?;
    self.raw.pdf_raw(&self.to_canonical(&trim(u)))
  }

  pub fn cdf(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
    check_u(u)?;
    let u = trim(u);
    let c = self.raw.cdf_raw(&self.to_canonical(&u))?;
    let (u1, u2) = (u.column(0), u.column(1));
    let out = match self.rotation {
      Rotation::R0 => c,
      Rotation::R90 => &u2 - &c,
      Rotation::R180 => &u1 + &u2 - 1.0 + &c,
      Rotation::R270 => &u1 - &c,
    };
    Ok(out.mapv(|v| v.clamp(0.0, 1.0)))
  }

  pub fn hfunc1(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
    check_u(u)?;
    let h = self.raw.hfunc1_raw(&self.to_canonical(u))?;
    let h = match self.rotation {
      Rotation::R0 | Rotation::R90 => h,
      Rotation::R180 | Rotation::R270 => 1.0 - h,
    };
    Ok(boundary_limits(h, u.column(1)))
  }

  pub fn hfunc2(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
    check_u(u)?;
    let h = self.raw.hfunc2_raw(&self.to_canonical(u))?;
    let h = match self.rotation {
      Rotation::R0 | Rotation::R270 => h,
      Rotation::R90 | Rotation::R180 => 1.0 - h,
    };
    Ok(boundary_limits(h, u.column(0)))
  }

  pub fn hinv1(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
    check_u(u)?;
    let v = self.raw.hinv1_raw(&self.to_canonical(u), &self.inversion)?;
    let v = match self.rotation {
      Rotation::R0 | Rotation::R90 => v,
      Rotation::R180 | Rotation::R270 => 1.0 - v,
    };
    Ok(boundary_limits(v, u.column(1)))
  }

  pub fn hinv2(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
    check_u(u)?;
    let v = self.raw.hinv2_raw(&self.to_canonical(u), &self.inversion)?;
    let v = match self.rotation {
      Rotation::R0 | Rotation::R270 => v,
      Rotation::R90 | Rotation::R180 => 1.0 - v,
    };
    Ok(boundary_limits(v, u.column(0)))
  }

  /// Kendall's tau of the rotated copula.
  pub fn tau(&self) -> Result<f64> {
    let tau = self.raw.parameters_to_tau(&self.raw.parameters())?;
    Ok(if self.rotation.is_negative() { -tau } else { tau })
  }

  pub fn parameters_to_tau(&self, parameters: &Array1<f64>) -> Result<f64> {
    self.raw.check_parameters(parameters)?;
    let tau = self.raw.parameters_to_tau(parameters)?;
    Ok(if self.rotation.is_negative() { -tau } else { tau })
  }

  /// Parameters matching a Kendall's tau on the rotated scale.
  pub fn tau_to_parameters(&self, tau: f64) -> Result<Array1<f64>> {
    let tau = if self.rotation.is_negative() { -tau } else { tau };
    let p = self.raw.tau_to_parameters(tau)?;
    Ok(crate::tools::clip_to_bounds(&p, &self.raw.parameters_bounds()))
  }

  /// Exchanges the roles of the two variables.
  pub fn flip(&mut self) {
    self.rotation = self.rotation.flipped();
    if !BicopFamily::flip_by_rotation().contains(&self.family()) {
      self.raw.flip();
    }
  }

  pub fn loglik(&self, u: &Array2<f64>) -> Result<f64> {
    Ok(self.pdf(u)?.ln().sum())
  }

  pub fn aic(&self, u: &Array2<f64>) -> Result<f64> {
    Ok(-2.0 * self.loglik(u)? + 2.0 * self.npars())
  }

  pub fn bic(&self, u: &Array2<f64>) -> Result<f64> {
    let n = u.nrows() as f64;
    Ok(-2.0 * self.loglik(u)? + self.npars() * n.ln())
  }

  /// Draws `n` samples by inverting the first h-function at uniform levels.
  pub fn simulate(&self, n: usize, seed: u64) -> Result<Array2<f64>> {
    if n == 0 {
      return Err(BicopError::InvalidInput("cannot simulate zero samples".into()));
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let w = trim(&Array2::random_using((n, 2), Uniform::new(0.0, 1.0), &mut rng));
    let u2 = self.hinv1(&w)?;
    Ok(trim(&cbind(w.column(0), u2.view())))
  }

  /// Fits the parameters to pseudo-observations on the open unit square.
  pub fn fit(&mut self, data: &Array2<f64>, controls: &FitControls) -> Result<()> {
    check_data(data)?;
    let family = self.family();
    let canonical = self.to_canonical(data);

    match family {
      BicopFamily::Indep => Ok(()),
      BicopFamily::Tll => self
        .raw
        .fit_nonparametric(&canonical, controls.nonparametric_mult),
      _ => {
        let tau = kendall_tau_cols(&canonical)?;
        let k = self.raw.parameters().len();
        match controls.method {
          FitMethod::Mle => {
            let start = self.raw.get_start_parameters(tau)?;
            self.maximize_likelihood(&canonical, start, (0..k).collect(), controls)
          }
          FitMethod::Itau => {
            if !BicopFamily::itau().contains(&family) {
              return Err(BicopError::MethodNotSupported {
                family: family.to_string(),
                method: controls.method.to_string(),
              });
            }
            if family == BicopFamily::Student {
              // correlation from tau, degrees of freedom by profile likelihood
              let start = self.raw.get_start_parameters(tau)?;
              self.maximize_likelihood(&canonical, start, vec![1], controls)
            } else {
              let p = self.raw.tau_to_parameters(tau)?;
              self.set_parameters(&crate::tools::clip_to_bounds(&p, &self.raw.parameters_bounds()))
            }
          }
        }
      }
    }
  }

  fn maximize_likelihood(
    &mut self,
    canonical: &Array2<f64>,
    start: Array1<f64>,
    free: Vec<usize>,
    controls: &FitControls,
  ) -> Result<()> {
    let bounds = self.raw.parameters_bounds();
    let box_map = BoxMap {
      base: crate::tools::clip_to_bounds(&start, &bounds),
      free,
      bounds,
    };
    let z0 = box_map.unbounded();

    let cost = NegLogLik {
      raw: self.raw.clone_box(),
      data: canonical.clone(),
      box_map: box_map.clone(),
    };
    let start_cost = cost.cost(&z0).unwrap_or(f64::INFINITY);

    let mut simplex = Vec::with_capacity(z0.len() + 1);
    simplex.push(z0.clone());
    for i in 0..z0.len() {
      let mut point = z0.clone();
      point[i] += if point[i] > 0.0 { -1.0 } else { 1.0 };
      simplex.push(point);
    }

    let solver = NelderMead::new(simplex)
      .with_sd_tolerance(1e-8)
      .map_err(|e| BicopError::FittingFailed(e.to_string()))?;
    let res = Executor::new(cost, solver)
      .configure(|state| state.max_iters(controls.max_iters))
      .run()
      .map_err(|e| BicopError::FittingFailed(e.to_string()))?;

    let best_cost = res.state.best_cost;
    tracing::trace!(
      family = %self.family(),
      iterations = res.state.iter,
      start_cost,
      best_cost,
      "likelihood search finished"
    );

    if !best_cost.is_finite() && !start_cost.is_finite() {
      return Err(BicopError::FittingFailed(format!(
        "the {} likelihood is not finite on the data",
        self.family()
      )));
    }

    let z = match res.state.best_param {
      Some(best) if best_cost <= start_cost => best,
      _ => z0,
    };
    self.set_parameters(&box_map.parameters(&z))
  }
}

impl fmt::Display for AbstractBicop {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let parameters = self
      .parameters()
      .iter()
      .map(|p| format!("{p:.4}"))
      .collect::<Vec<_>>()
      .join(", ");
    write!(
      f,
      "Bicop(family = {}, rotation = {}, parameters = [{}])",
      self.family(),
      self.rotation,
      parameters
    )
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use ndarray::array;

  use super::*;
  use crate::tools::swap_cols;

  fn grid() -> Array2<f64> {
    array![
      [0.1, 0.2],
      [0.3, 0.9],
      [0.5, 0.5],
      [0.75, 0.35],
      [0.95, 0.6],
      [0.02, 0.98]
    ]
  }

  fn parametric_examples() -> Vec<(BicopFamily, Array1<f64>)> {
    vec![
      (BicopFamily::Gaussian, array![0.5]),
      (BicopFamily::Student, array![0.4, 6.0]),
      (BicopFamily::Clayton, array![2.0]),
      (BicopFamily::Gumbel, array![1.8]),
      (BicopFamily::Frank, array![4.0]),
      (BicopFamily::Joe, array![2.0]),
      (BicopFamily::Bb1, array![0.8, 1.6]),
      (BicopFamily::Bb6, array![1.5, 1.5]),
      (BicopFamily::Bb7, array![1.5, 1.2]),
      (BicopFamily::Bb8, array![3.0, 0.7]),
    ]
  }

  #[test]
  fn family_names_and_codes() {
    assert_eq!("Gumbel".parse::<BicopFamily>().unwrap(), BicopFamily::Gumbel);
    assert_eq!("independence".parse::<BicopFamily>().unwrap(), BicopFamily::Indep);
    assert_eq!(BicopFamily::try_from(6).unwrap(), BicopFamily::Joe);
    assert_eq!(BicopFamily::try_from(10).unwrap(), BicopFamily::Bb8);
    assert!(matches!(
      BicopFamily::try_from(1001),
      Err(BicopError::UnsupportedFamily(_))
    ));
    assert!(matches!(
      "tawn".parse::<BicopFamily>(),
      Err(BicopError::UnsupportedFamily(_))
    ));
    for family in BicopFamily::all() {
      assert_eq!(family.name().parse::<BicopFamily>().unwrap(), family);
    }
  }

  #[test]
  fn family_sets_are_consistent() {
    let all = BicopFamily::all();
    assert_eq!(BicopFamily::parametric().len() + BicopFamily::nonparametric().len(), all.len());
    for family in BicopFamily::one_par() {
      assert_eq!(family.instantiate().parameters().len(), 1);
    }
    for family in BicopFamily::two_par() {
      assert_eq!(family.instantiate().parameters().len(), 2);
    }
    for family in BicopFamily::bb() {
      assert!(!BicopFamily::itau().contains(&family));
      assert!(BicopFamily::archimedean().contains(&family));
    }
    for family in BicopFamily::elliptical() {
      assert_eq!(family.candidate_rotations(), vec![Rotation::R0, Rotation::R90]);
    }
    for family in BicopFamily::flip_by_rotation() {
      assert!(!BicopFamily::rotationless().contains(&family));
      assert_eq!(family.candidate_rotations(), Rotation::all().to_vec());
    }
    assert_eq!(BicopFamily::Tll.candidate_rotations(), vec![Rotation::R0]);
  }

  #[test]
  fn flip_exchanges_the_variables() {
    let u = grid();
    let mut skewed = AbstractBicop::create(BicopFamily::Clayton, Some(&array![2.0]), 0)
      .unwrap()
      .simulate(300, 13)
      .unwrap();
    // skew the sample so the kernel estimate is not exchangeable
    skewed.column_mut(1).mapv_inplace(|v| v * v);
    let mut tll = AbstractBicop::create(BicopFamily::Tll, None, 0).unwrap();
    tll.fit(&skewed, &FitControls::default()).unwrap();

    let mut cases: Vec<AbstractBicop> = parametric_examples()
      .into_iter()
      .map(|(family, p)| AbstractBicop::create(family, Some(&p), 0).unwrap())
      .collect();
    cases.push(tll);

    for base in cases {
      for rotation in [0, 90, 180, 270] {
        let mut bicop = base.clone();
        bicop.set_rotation(rotation).unwrap();
        let mut flipped = bicop.clone();
        flipped.flip();
        let a = bicop.pdf(&u).unwrap();
        let b = flipped.pdf(&swap_cols(&u)).unwrap();
        for i in 0..u.nrows() {
          assert_abs_diff_eq!(a[i], b[i], epsilon = 1e-10);
        }
      }
    }
  }

  #[derive(Debug, Clone)]
  struct Degenerate;

  impl BivariateExt for Degenerate {
    fn family(&self) -> BicopFamily {
      BicopFamily::Gaussian
    }

    fn parameters(&self) -> Array1<f64> {
      array![0.0]
    }

    fn parameters_bounds(&self) -> Array2<f64> {
      array![[-1.0, 1.0]]
    }

    fn store_parameters(&mut self, _parameters: &Array1<f64>) {}

    fn pdf_raw(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
      Ok(Array1::zeros(u.nrows()))
    }

    fn cdf_raw(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
      Ok(Array1::zeros(u.nrows()))
    }

    fn hfunc1_raw(&self, u: &Array2<f64>) -> Result<Array1<f64>> {
      Ok(u.column(1).to_owned())
    }

    fn parameters_to_tau(&self, _parameters: &Array1<f64>) -> Result<f64> {
      Ok(0.0)
    }

    fn tau_to_parameters(&self, _tau: f64) -> Result<Array1<f64>> {
      Ok(array![0.0])
    }

    fn clone_box(&self) -> Box<dyn BivariateExt> {
      Box::new(self.clone())
    }
  }

  #[test]
  fn mle_fails_when_likelihood_is_never_finite() {
    let mut bicop = AbstractBicop {
      raw: Box::new(Degenerate),
      rotation: Rotation::R0,
      inversion: InversionConfig::default(),
    };
    let data = array![[0.2, 0.3], [0.5, 0.6], [0.8, 0.7]];
    let controls = FitControls::default().with_max_iters(20);
    assert!(matches!(
      bicop.fit(&data, &controls),
      Err(BicopError::FittingFailed(_))
    ));
  }

  #[test]
  fn creates_right_copula() {
    let bicop = AbstractBicop::create(BicopFamily::Gaussian, Some(&array![0.0]), 90).unwrap();
    assert_eq!(bicop.family(), BicopFamily::Gaussian);
    assert_eq!(bicop.rotation(), Rotation::R90);
    assert_eq!(bicop.parameters(), array![0.0]);
  }

  #[test]
  fn catches_wrong_parameter_size() {
    let cases: [(i32, usize); 7] = [(0, 1), (1, 0), (2, 1), (3, 2), (4, 0), (5, 2), (6, 0)];
    for (code, len) in cases {
      let family = BicopFamily::try_from(code).unwrap();
      let p = Array1::zeros(len);
      assert!(
        matches!(
          AbstractBicop::create(family, Some(&p), 0),
          Err(BicopError::InvalidParameters(_))
        ),
        "family {family} with {len} parameters"
      );
    }
  }

  #[test]
  fn rejects_out_of_bounds_and_bad_rotation() {
    let mut bicop = AbstractBicop::create(BicopFamily::Gaussian, None, 0).unwrap();
    assert!(matches!(
      bicop.set_parameters(&array![1.5]),
      Err(BicopError::InvalidParameters(_))
    ));
    assert!(matches!(
      bicop.set_parameters(&array![f64::NAN]),
      Err(BicopError::InvalidParameters(_))
    ));
    assert!(matches!(bicop.set_rotation(45), Err(BicopError::InvalidRotation(45))));
    assert_eq!(bicop.rotation(), Rotation::R0);
  }

  #[test]
  fn rejects_malformed_evaluation_input() {
    let bicop = AbstractBicop::create(BicopFamily::Clayton, Some(&array![2.0]), 0).unwrap();
    assert!(bicop.pdf(&Array2::zeros((3, 3))).is_err());
    assert!(bicop.hfunc1(&array![[0.5, 1.5]]).is_err());
    assert!(bicop.cdf(&Array2::zeros((0, 2))).is_err());
    assert!(bicop.hinv2(&array![[f64::NAN, 0.5]]).is_err());
  }

  #[test]
  fn hfunc2_is_hfunc1_of_swapped_input() {
    let u = grid();
    for (family, p) in parametric_examples() {
      for rotation in [0, 180] {
        let bicop = AbstractBicop::create(family, Some(&p), rotation).unwrap();
        let h2 = bicop.hfunc2(&u).unwrap();
        let h1 = bicop.hfunc1(&swap_cols(&u)).unwrap();
        let g2 = bicop.hinv2(&u).unwrap();
        let g1 = bicop.hinv1(&swap_cols(&u)).unwrap();
        for i in 0..u.nrows() {
          assert_abs_diff_eq!(h2[i], h1[i], epsilon = 1e-12);
          assert_abs_diff_eq!(g2[i], g1[i], epsilon = 1e-12);
        }
      }
      for rotation in [90, 270] {
        let bicop = AbstractBicop::create(family, Some(&p), rotation).unwrap();
        let mut flipped = bicop.clone();
        flipped.flip();
        let h2 = bicop.hfunc2(&u).unwrap();
        let h1 = flipped.hfunc1(&swap_cols(&u)).unwrap();
        for i in 0..u.nrows() {
          assert_abs_diff_eq!(h2[i], h1[i], epsilon = 1e-12);
        }
      }
    }
  }

  #[test]
  fn inverse_hfunctions_invert_every_rotation() {
    let u = grid();
    for (family, p) in parametric_examples() {
      for rotation in [0, 90, 180, 270] {
        let bicop = AbstractBicop::create(family, Some(&p), rotation).unwrap();
        let v = bicop.hinv1(&u).unwrap();
        let back = bicop.hfunc1(&cbind(u.column(0), v.view())).unwrap();
        let w = bicop.hinv2(&u).unwrap();
        let back2 = bicop.hfunc2(&cbind(w.view(), u.column(1))).unwrap();
        for i in 0..u.nrows() {
          assert_abs_diff_eq!(back[i], u[[i, 1]], epsilon = 1e-6);
          assert_abs_diff_eq!(back2[i], u[[i, 0]], epsilon = 1e-6);
        }
      }
    }
  }

  #[test]
  fn rotated_cdf_matches_reflection_identities() {
    let bicop = AbstractBicop::create(BicopFamily::Clayton, Some(&array![3.0]), 0).unwrap();
    let u = array![[0.3, 0.6]];
    let c = |v: Array2<f64>| bicop.cdf(&v).unwrap()[0];
    for (rotation, expected) in [
      (90, 0.6 - c(array![[0.7, 0.6]])),
      (180, 0.3 + 0.6 - 1.0 + c(array![[0.7, 0.4]])),
      (270, 0.3 - c(array![[0.3, 0.4]])),
    ] {
      let rotated = AbstractBicop::create(BicopFamily::Clayton, Some(&array![3.0]), rotation).unwrap();
      assert_abs_diff_eq!(rotated.cdf(&u).unwrap()[0], expected, epsilon = 1e-12);
    }
  }

  #[test]
  fn boundary_values_of_hfunctions() {
    let bicop = AbstractBicop::create(BicopFamily::Gumbel, Some(&array![2.0]), 270).unwrap();
    let h1 = bicop.hfunc1(&array![[0.4, 0.0], [0.4, 1.0]]).unwrap();
    assert_eq!(h1, array![0.0, 1.0]);
    let h2 = bicop.hinv2(&array![[0.0, 0.3], [1.0, 0.3]]).unwrap();
    assert_eq!(h2, array![0.0, 1.0]);
  }

  #[test]
  fn tau_carries_rotation_sign() {
    let bicop = AbstractBicop::create(BicopFamily::Gumbel, Some(&array![2.0]), 90).unwrap();
    assert_abs_diff_eq!(bicop.tau().unwrap(), -0.5, epsilon = 1e-12);
    assert_abs_diff_eq!(bicop.tau_to_parameters(-0.5).unwrap()[0], 2.0, epsilon = 1e-12);
  }

  #[test]
  fn tau_round_trip_for_invertible_families() {
    let cases = [
      (BicopFamily::Gaussian, array![0.6]),
      (BicopFamily::Student, array![-0.3, 4.0]),
      (BicopFamily::Clayton, array![1.7]),
      (BicopFamily::Gumbel, array![3.2]),
      (BicopFamily::Frank, array![-6.0]),
      (BicopFamily::Joe, array![2.4]),
    ];
    for (family, p) in cases {
      let bicop = AbstractBicop::create(family, Some(&p), 0).unwrap();
      let tau = bicop.parameters_to_tau(&p).unwrap();
      let back = bicop.tau_to_parameters(tau).unwrap();
      assert_abs_diff_eq!(back[0], p[0], epsilon = 1e-3);
    }
  }

  #[test]
  fn independence_scores_zero() {
    let bicop = AbstractBicop::create(BicopFamily::Indep, None, 0).unwrap();
    let u = grid();
    assert_eq!(bicop.pdf(&u).unwrap(), Array1::ones(u.nrows()));
    assert_eq!(bicop.loglik(&u).unwrap(), 0.0);
    assert_eq!(bicop.aic(&u).unwrap(), 0.0);
    assert_eq!(bicop.bic(&u).unwrap(), 0.0);
  }

  #[test]
  fn mle_recovers_clayton_parameter() {
    let truth = AbstractBicop::create(BicopFamily::Clayton, Some(&array![3.0]), 180).unwrap();
    let data = truth.simulate(1500, 42).unwrap();
    let mut fitted = AbstractBicop::create(BicopFamily::Clayton, None, 180).unwrap();
    fitted.fit(&data, &FitControls::default()).unwrap();
    assert_abs_diff_eq!(fitted.parameters()[0], 3.0, epsilon = 0.4);
    assert!(fitted.loglik(&data).unwrap() >= truth.loglik(&data).unwrap() - 1e-3);
  }

  #[test]
  fn itau_matches_empirical_tau() {
    let truth = AbstractBicop::create(BicopFamily::Frank, Some(&array![-5.0]), 0).unwrap();
    let data = truth.simulate(800, 3).unwrap();
    let mut fitted = AbstractBicop::create(BicopFamily::Frank, None, 0).unwrap();
    let controls = FitControls::default().with_method(FitMethod::Itau);
    fitted.fit(&data, &controls).unwrap();
    let empirical = kendall_tau_cols(&data).unwrap();
    assert_abs_diff_eq!(fitted.tau().unwrap(), empirical, epsilon = 1e-6);

    let mut bb1 = AbstractBicop::create(BicopFamily::Bb1, None, 0).unwrap();
    assert!(matches!(
      bb1.fit(&data, &controls),
      Err(BicopError::MethodNotSupported { .. })
    ));
  }

  #[test]
  fn fit_rejects_boundary_data() {
    let mut bicop = AbstractBicop::create(BicopFamily::Gaussian, None, 0).unwrap();
    assert!(matches!(
      bicop.fit(&array![[0.0, 0.5], [0.3, 0.2]], &FitControls::default()),
      Err(BicopError::InvalidInput(_))
    ));
  }

  #[test]
  fn display_lists_family_rotation_and_parameters() {
    let bicop = AbstractBicop::create(BicopFamily::Bb1, Some(&array![0.5, 2.0]), 270).unwrap();
    assert_eq!(
      bicop.to_string(),
      "Bicop(family = bb1, rotation = 270, parameters = [0.5000, 2.0000])"
    );
  }
}
