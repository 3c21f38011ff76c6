//! Population distributions of segment rates, run durations and processivity.
//!
//! [`SegmentDistributionBuilder`] reads one segment table from each molecule of a
//! [`mars_core::MoleculeArchive`] and bins either the segment slopes (rates) or the runs of
//! consecutive segments inside a slope filter (durations, processivity). Any build can be repeated
//! over bootstrap resamples of segments or of whole molecules to get per-bin error estimates.
//!
//! The result is a [`DistributionTable`]: bin centers followed by `Probability`,
//! `Probability Density` and, when bootstrapping, the bootstrap mean and standard deviation of both.

pub mod bootstrap;
pub mod builder;
pub mod errors;
pub mod models;
pub mod runs;

// re-exports
pub use self::builder::{DistributionKind, SegmentDistributionBuilder};
pub use self::errors::SegmentDistributionError;
pub use self::models::{BootstrapMode, DistributionOptions, DistributionTable};
pub use self::runs::SlopeFilter;
