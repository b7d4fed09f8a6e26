//! Solver backends implementing [`crate::LpSolver`].

#[cfg(feature = "highs")]
pub mod highs;

#[cfg(feature = "highs")]
pub use self::highs::HighsSolver;
