//! Core data models shared by the mars analysis crates.
//!
//! This crate holds the pieces every other mars crate agrees on:
//!
//! - [`Segment`]: one piecewise-linear fit region of a molecule trace, as produced by the
//!   change-point search and consumed by the distribution builders
//! - [`Gaussian`]: a normal density used as a weighting kernel for rate distributions
//! - [`MoleculeArchive`]: the narrow contract to whatever stores per-molecule traces and
//!   segment tables, with [`InMemoryArchive`] as the bundled implementation
//!
//! # Example
//!
//! ```rust
//! use mars_core::models::{Gaussian, Segment};
//!
//! let kernel = Gaussian::new(0.0, 1.0);
//! assert!((kernel.value(0.0) - 0.398_942_280_4).abs() < 1e-9);
//!
//! let segment = Segment::nan();
//! assert!(!segment.is_valid());
//! ```

pub mod archive;
pub mod errors;
pub mod models;
pub mod utils;

// re-exports
pub use self::archive::{InMemoryArchive, MoleculeArchive};
pub use self::errors::MarsCoreError;
pub use self::models::{Gaussian, Molecule, Segment};
