//! # bicopula
//!
//! $$
//! F_{X_1,X_2}(x_1,x_2)=C\left(F_1(x_1),F_2(x_2)\right)
//! $$
//!
//! Bivariate copula families with rotations, conditional distributions
//! (h-functions) and their inverses, maximum-likelihood fitting and
//! family/rotation selection by information criteria.
//!
pub mod copulas;
pub mod error;
pub mod tools;
pub mod traits;

pub use copulas::bicop::Bicop;
pub use copulas::bivariate::AbstractBicop;
pub use copulas::bivariate::BicopFamily;
pub use copulas::bivariate::Rotation;
pub use copulas::controls::FitControls;
pub use copulas::controls::FitMethod;
pub use copulas::controls::InversionConfig;
pub use copulas::controls::SelectionCriterion;
pub use error::BicopError;
pub use error::Result;
