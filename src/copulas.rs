//! # Copulas
//!
//! $$
//! F(x_1,x_2)=C\big(F_1(x_1),F_2(x_2)\big)
//! $$
//!
pub mod bicop;
pub mod bivariate;
pub mod controls;
pub mod correlation;
pub mod empirical;
