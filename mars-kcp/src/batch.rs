//! Change point search over a population of molecules.
//!
//! For every molecule the runner resolves the analysis region and the noise level from the
//! archive, runs the search and writes the segment table back. Molecules are processed in
//! parallel; each worker owns its own search state and only touches its own molecule.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use mars_core::MoleculeArchive;
use mars_core::models::segment_table_name;

use crate::errors::KcpError;
use crate::kcp::{ChangePointSearch, calc_sigma_by_x};

///
/// Settings for a batch change point run.
///
/// Region bounds are x values. An explicit bound wins over the per-molecule parameter named by
/// `start_parameter`/`end_parameter`; with neither, the trace is used from its first or up to its
/// last sample.
///
/// # Example
/// ```toml
/// x_column = "T"
/// y_column = "Position"
/// confidence_level = 0.99
/// step_analysis = false
/// bg_start_parameter = "bg_start"
/// bg_end_parameter = "bg_end"
/// start_parameter = "start"
/// end_parameter = "end"
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct KcpOptions {
    pub x_column: String,
    pub y_column: String,
    /// Noise level shared by every molecule. When unset, sigma comes from each molecule's
    /// background region.
    pub sigma: Option<f64>,
    pub bg_start_parameter: String,
    pub bg_end_parameter: String,
    pub start: Option<f64>,
    pub end: Option<f64>,
    pub start_parameter: Option<String>,
    pub end_parameter: Option<String>,
    /// Suffix for the segment table name, `"<x> vs <y> - <region>"`.
    pub region_name: Option<String>,
    /// Overrides the generated segment table name.
    pub table_name: Option<String>,
    pub confidence_level: f64,
    pub step_analysis: bool,
}

impl Default for KcpOptions {
    fn default() -> Self {
        Self {
            x_column: "T".to_string(),
            y_column: "Position".to_string(),
            sigma: None,
            bg_start_parameter: "bg_start".to_string(),
            bg_end_parameter: "bg_end".to_string(),
            start: None,
            end: None,
            start_parameter: None,
            end_parameter: None,
            region_name: None,
            table_name: None,
            confidence_level: 0.99,
            step_analysis: false,
        }
    }
}

impl KcpOptions {
    pub fn from_file(path: &Path) -> Result<Self, KcpError> {
        let content = std::fs::read_to_string(path)?;
        let options: Self = toml::from_str(&content)?;
        Ok(options)
    }

    /// Name of the segment table the batch writes.
    pub fn segment_table(&self) -> String {
        match &self.table_name {
            Some(name) => name.clone(),
            None => segment_table_name(
                &self.x_column,
                &self.y_column,
                self.region_name.as_deref(),
            ),
        }
    }
}

/// Outcome of a batch run in which no molecule failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchReport {
    /// Molecules that received a segment table.
    pub processed: usize,
    /// Molecules left untouched because no noise level could be resolved.
    pub skipped: usize,
}

enum Outcome {
    Written,
    Skipped,
}

///
/// Run the change point search for every molecule in `uids` and store the segment tables.
///
/// Workers run on a dedicated pool of `threads` threads. A failing molecule does not stop the
/// others; when any failed, the error names how many and carries the first failure, while tables
/// written for the other molecules stay in the archive.
///
/// # Arguments
/// - archive: source of traces and destination of segment tables
/// - uids: molecules to analyze
/// - options: region, noise and search settings
/// - threads: size of the worker pool
/// - progress: draw a progress bar on stderr
///
pub fn run_change_point_batch<A: MoleculeArchive + ?Sized>(
    archive: &A,
    uids: &[String],
    options: &KcpOptions,
    threads: usize,
    progress: bool,
) -> Result<BatchReport, KcpError> {
    // shared settings are checked once, before any molecule is touched
    if let Some(sigma) = options.sigma {
        ChangePointSearch::new(sigma, options.confidence_level, options.step_analysis)?;
    } else if !(options.confidence_level > 0.0 && options.confidence_level < 1.0) {
        return Err(KcpError::InvalidConfidenceLevel(options.confidence_level));
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()?;

    let table = options.segment_table();
    info!(
        "Searching change points in {} molecules, writing '{}'",
        uids.len(),
        table
    );

    let bar = if progress {
        let bar = ProgressBar::new(uids.len() as u64);
        if let Ok(style) =
            ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
        {
            bar.set_style(style);
        }
        bar.set_message("Molecules");
        bar
    } else {
        ProgressBar::hidden()
    };
    let done = AtomicUsize::new(0);

    let outcomes: Vec<Result<Outcome, KcpError>> = pool.install(|| {
        uids.par_iter()
            .map(|uid| {
                let outcome = analyze_molecule(archive, uid, options, &table);
                done.fetch_add(1, Ordering::Relaxed);
                bar.inc(1);
                outcome
            })
            .collect()
    });
    bar.finish_and_clear();

    let mut report = BatchReport::default();
    let mut failed = 0;
    let mut first = None;
    for (uid, outcome) in uids.iter().zip(outcomes) {
        match outcome {
            Ok(Outcome::Written) => report.processed += 1,
            Ok(Outcome::Skipped) => report.skipped += 1,
            Err(e) => {
                warn!("Change point search failed for {}: {}", uid, e);
                failed += 1;
                if first.is_none() {
                    first = Some(e);
                }
            }
        }
    }

    if let Some(first) = first {
        return Err(KcpError::BatchFailed {
            failed,
            total: done.load(Ordering::Relaxed),
            first: Box::new(first),
        });
    }

    info!(
        "Change point search finished: {} written, {} skipped",
        report.processed, report.skipped
    );
    Ok(report)
}

fn analyze_molecule<A: MoleculeArchive + ?Sized>(
    archive: &A,
    uid: &str,
    options: &KcpOptions,
    table: &str,
) -> Result<Outcome, KcpError> {
    let x = archive.column(uid, &options.x_column)?;
    let y = archive.column(uid, &options.y_column)?;
    if x.len() != y.len() {
        return Err(KcpError::MismatchedLengths(x.len(), y.len()));
    }

    let sigma = match options.sigma {
        Some(sigma) => sigma,
        None => {
            let bg_start = archive.parameter(uid, &options.bg_start_parameter);
            let bg_end = archive.parameter(uid, &options.bg_end_parameter);
            match (bg_start, bg_end) {
                (Some(bg_start), Some(bg_end)) => calc_sigma_by_x(&x, &y, bg_start, bg_end)?,
                _ => {
                    debug!("No background region for {}, skipping", uid);
                    return Ok(Outcome::Skipped);
                }
            }
        }
    };

    let start = options.start.or_else(|| {
        options
            .start_parameter
            .as_deref()
            .and_then(|name| archive.parameter(uid, name))
    });
    let end = options.end.or_else(|| {
        options
            .end_parameter
            .as_deref()
            .and_then(|name| archive.parameter(uid, name))
    });
    let (offset, length) = region_indices(&x, start, end);

    let search = ChangePointSearch::new(sigma, options.confidence_level, options.step_analysis)?;
    let segments = search.generate_segments(&x, &y, offset, length)?;
    debug!("{}: {} segments", uid, segments.len());
    archive.put_segments(uid, table, segments)?;
    Ok(Outcome::Written)
}

///
/// Offset and length of the samples with `start <= x <= end`.
///
/// `x` is non-decreasing, so the region is one contiguous run. A missing bound is open.
///
pub fn region_indices(x: &[f64], start: Option<f64>, end: Option<f64>) -> (usize, usize) {
    let offset = match start {
        Some(start) => x.partition_point(|v| *v < start),
        None => 0,
    };
    let stop = match end {
        Some(end) => x.partition_point(|v| *v <= end),
        None => x.len(),
    };
    (offset, stop.saturating_sub(offset))
}
