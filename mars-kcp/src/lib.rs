//! Kinetic change point (KCP) search.
//!
//! Splits a noisy molecule trace into statistically distinct segments, each fitted by a straight
//! line, or by a flat level when step analysis is on. The crate provides:
//!
//! - [`ChangePointSearch`]: the recursive split search over one trace
//! - [`fit_line`] / [`fit_mean`]: the closed-form weighted fits every candidate range is scored with
//! - [`calc_sigma`]: a noise estimate from a flat background stretch
//! - [`run_change_point_batch`]: the search over many molecules of a [`mars_core::MoleculeArchive`]
//!
//! # Example
//!
//! ```rust
//! use mars_kcp::ChangePointSearch;
//!
//! let x: Vec<f64> = (0..20).map(|i| i as f64).collect();
//! let y: Vec<f64> = x.iter().map(|t| if *t < 10.0 { 1.0 } else { 3.0 }).collect();
//!
//! let search = ChangePointSearch::new(0.1, 0.99, true).unwrap();
//! let segments = search.generate_segments(&x, &y, 0, x.len()).unwrap();
//! assert_eq!(segments.len(), 2);
//! assert_eq!(segments[1].x1, 10.0);
//! ```

pub mod batch;
pub mod errors;
pub mod kcp;
pub mod regression;

// re-exports
pub use self::batch::{BatchReport, KcpOptions, run_change_point_batch};
pub use self::errors::KcpError;
pub use self::kcp::{ChangePointSearch, calc_sigma, calc_sigma_by_x};
pub use self::regression::{LineFit, fit_line, fit_mean};
