//! Damped Gauss-Newton (Levenberg-Marquardt) fitting of scalar model functions.
//!
//! The crate is split in three layers:
//!
//! - [`gauss_jordan`]: dense linear solves with partial pivoting, also used for inversion
//! - [`models`]: the [`ModelFunction`] trait and a few stock models
//! - [`solver`]: the [`LevenbergMarquardt`] engine itself
//!
//! Every call to [`LevenbergMarquardt::solve`] allocates its own working matrices, so one solver
//! value can be shared by any number of threads.
//!
//! # Example
//!
//! ```rust
//! use mars_lm::{LevenbergMarquardt, LmOptions, models::LinearModel};
//!
//! let x: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64]).collect();
//! let y: Vec<f64> = (0..10).map(|i| 2.0 + 0.5 * i as f64).collect();
//!
//! let mut p = vec![0.0, 0.0];
//! let solver = LevenbergMarquardt::new(LmOptions::default());
//! let fit = solver.solve(&LinearModel, &x, &y, None, &mut p, &[true, true]).unwrap();
//!
//! assert!((p[0] - 2.0).abs() < 1e-6);
//! assert!((p[1] - 0.5).abs() < 1e-6);
//! assert!(fit.chi_squared < 1e-9);
//! ```

pub mod errors;
pub mod gauss_jordan;
pub mod models;
pub mod solver;

// re-exports
pub use self::errors::LmError;
pub use self::gauss_jordan::{Matrix, gauss_jordan, invert};
pub use self::models::ModelFunction;
pub use self::solver::{FitResult, LevenbergMarquardt, LmOptions, fit_linear_lm};
