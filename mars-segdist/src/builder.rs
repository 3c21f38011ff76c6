//! Population distributions built from many molecules' segment tables.

use std::fmt;
use std::str::FromStr;

use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use rand::Rng;

use mars_core::MoleculeArchive;
use mars_core::models::Gaussian;

use crate::bootstrap::{mean_and_std, resample, run_cycles};
use crate::errors::SegmentDistributionError;
use crate::models::{
    BOOTSTRAP_PROBABILITY_COLUMN, BOOTSTRAP_PROBABILITY_DENSITY_COLUMN,
    BOOTSTRAP_PROBABILITY_DENSITY_STD_COLUMN, BOOTSTRAP_PROBABILITY_STD_COLUMN, Binning,
    BootstrapMode, DURATION_COLUMN, DistributionOptions, DistributionTable, OCCURRENCES_COLUMN,
    PROBABILITY_COLUMN, PROBABILITY_DENSITY_COLUMN, PROCESSIVITY_COLUMN, RATE_COLUMN,
};
use crate::runs::{
    Observation, SlopeFilter, duration_observations, processivity_by_molecule,
    processivity_by_region, rate_observations,
};

/// Sub-intervals per bin when integrating a rate kernel.
pub const GAUSSIAN_STEPS_PER_BIN: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistributionKind {
    /// Duration-weighted sum of Gaussian kernels centred on each slope.
    RateGaussian,
    /// Duration-weighted histogram of slopes.
    RateHistogram,
    /// Histogram of run extents.
    Duration,
    /// Histogram of the distance each molecule covers over all its runs.
    ProcessivityByMolecule,
    /// Histogram of the distance covered by each run.
    ProcessivityByRegion,
}

impl DistributionKind {
    pub fn value_column(&self) -> &'static str {
        match self {
            DistributionKind::RateGaussian | DistributionKind::RateHistogram => RATE_COLUMN,
            DistributionKind::Duration => DURATION_COLUMN,
            DistributionKind::ProcessivityByMolecule | DistributionKind::ProcessivityByRegion => {
                PROCESSIVITY_COLUMN
            }
        }
    }

    fn counts_occurrences(&self) -> bool {
        !matches!(
            self,
            DistributionKind::RateGaussian | DistributionKind::RateHistogram
        )
    }
}

impl fmt::Display for DistributionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DistributionKind::RateGaussian => "rate-gaussian",
            DistributionKind::RateHistogram => "rate-histogram",
            DistributionKind::Duration => "duration",
            DistributionKind::ProcessivityByMolecule => "processivity-molecule",
            DistributionKind::ProcessivityByRegion => "processivity-region",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for DistributionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rate-gaussian" => Ok(DistributionKind::RateGaussian),
            "rate-histogram" => Ok(DistributionKind::RateHistogram),
            "duration" => Ok(DistributionKind::Duration),
            "processivity-molecule" => Ok(DistributionKind::ProcessivityByMolecule),
            "processivity-region" => Ok(DistributionKind::ProcessivityByRegion),
            _ => Err(format!("Unknown distribution kind: {}", s)),
        }
    }
}

/// Observations of one build, with each one's pre-binned contribution.
struct Population {
    contributions: Vec<Vec<(usize, f64)>>,
    /// Observations that add weight to at least one bin.
    binned: Vec<usize>,
    /// Binned observations of each molecule that has any.
    by_molecule: Vec<Vec<usize>>,
}

impl Population {
    fn sum<I: IntoIterator<Item = usize>>(&self, bins: usize, observations: I) -> Vec<f64> {
        let mut totals = vec![0.0; bins];
        for index in observations {
            for (bin, weight) in &self.contributions[index] {
                totals[*bin] += weight;
            }
        }
        totals
    }
}

///
/// Builds rate, duration and processivity distributions from the segment tables of a set of
/// molecules.
///
/// Segments with NaN fields never count. When a slope filter is set only segments with a slope
/// inside it count, for every kind of build.
///
/// # Example
///
/// ```rust
/// use mars_core::models::{Molecule, Segment};
/// use mars_core::InMemoryArchive;
/// use mars_segdist::SegmentDistributionBuilder;
///
/// let archive = InMemoryArchive::from_molecules(vec![Molecule::new("a").with_segments(
///     "T vs Position",
///     vec![Segment::new(0.0, 0.0, 10.0, 5.5, 0.0, 0.1, 0.55, 0.05)],
/// )]);
///
/// let uids = vec!["a".to_string()];
/// let table = SegmentDistributionBuilder::new(&archive, uids, "T vs Position", 0.0, 1.0, 10)
///     .unwrap()
///     .build_rate_histogram()
///     .unwrap();
/// assert_eq!(table.column("Probability").unwrap()[5], 1.0);
/// ```
pub struct SegmentDistributionBuilder<'a, A: MoleculeArchive + ?Sized> {
    archive: &'a A,
    uids: Vec<String>,
    table: String,
    binning: Binning,
    filter: Option<SlopeFilter>,
    bootstrap: BootstrapMode,
    seed: Option<u64>,
    threads: usize,
    progress: bool,
}

impl<'a, A: MoleculeArchive + ?Sized> SegmentDistributionBuilder<'a, A> {
    ///
    /// Create a builder over `[start, end)` split into `bins` equal bins.
    ///
    /// # Arguments
    /// - archive: where the segment tables are read from
    /// - uids: molecules to include; those without the table are skipped
    /// - table_name: segment table to read from each molecule
    /// - start: lower edge of the first bin
    /// - end: upper edge of the last bin
    /// - bins: number of bins
    ///
    pub fn new(
        archive: &'a A,
        uids: Vec<String>,
        table_name: &str,
        start: f64,
        end: f64,
        bins: usize,
    ) -> Result<Self, SegmentDistributionError> {
        Ok(SegmentDistributionBuilder {
            archive,
            uids,
            table: table_name.to_string(),
            binning: Binning::new(start, end, bins)?,
            filter: None,
            bootstrap: BootstrapMode::None,
            seed: None,
            threads: 1,
            progress: false,
        })
    }

    pub fn from_options(
        archive: &'a A,
        uids: Vec<String>,
        table_name: &str,
        options: &DistributionOptions,
    ) -> Result<Self, SegmentDistributionError> {
        let mut builder = Self::new(
            archive,
            uids,
            table_name,
            options.start,
            options.end,
            options.bins,
        )?;
        builder.bootstrap = options.bootstrap;
        builder.seed = options.seed;
        builder.threads = options.threads.max(1);
        // a filter with one bound set is open on the other side
        if options.filter_start.is_some() || options.filter_stop.is_some() {
            builder.set_filter(
                options.filter_start.unwrap_or(f64::NEG_INFINITY),
                options.filter_stop.unwrap_or(f64::INFINITY),
            )?;
        }
        Ok(builder)
    }

    /// Only count segments with `start <= B <= stop`.
    pub fn set_filter(&mut self, start: f64, stop: f64) -> Result<(), SegmentDistributionError> {
        if start.is_nan() || stop.is_nan() || start > stop {
            return Err(SegmentDistributionError::InvalidFilter(start, stop));
        }
        self.filter = Some(SlopeFilter { start, stop });
        Ok(())
    }

    pub fn clear_filter(&mut self) {
        self.filter = None;
    }

    pub fn bootstrap_segments(mut self, cycles: usize) -> Self {
        self.bootstrap = BootstrapMode::Segments(cycles);
        self
    }

    pub fn bootstrap_molecules(mut self, cycles: usize) -> Self {
        self.bootstrap = BootstrapMode::Molecules(cycles);
        self
    }

    pub fn no_bootstrap(mut self) -> Self {
        self.bootstrap = BootstrapMode::None;
        self
    }

    pub fn set_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn set_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    pub fn set_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn binning(&self) -> &Binning {
        &self.binning
    }

    pub fn build_rate_gaussian(&self) -> Result<DistributionTable, SegmentDistributionError> {
        self.build(DistributionKind::RateGaussian)
    }

    pub fn build_rate_histogram(&self) -> Result<DistributionTable, SegmentDistributionError> {
        self.build(DistributionKind::RateHistogram)
    }

    pub fn build_duration_histogram(&self) -> Result<DistributionTable, SegmentDistributionError> {
        self.build(DistributionKind::Duration)
    }

    pub fn build_processivity_by_molecule_histogram(
        &self,
    ) -> Result<DistributionTable, SegmentDistributionError> {
        self.build(DistributionKind::ProcessivityByMolecule)
    }

    pub fn build_processivity_by_region_histogram(
        &self,
    ) -> Result<DistributionTable, SegmentDistributionError> {
        self.build(DistributionKind::ProcessivityByRegion)
    }

    ///
    /// Build one distribution table.
    ///
    /// Probabilities are normalized over the bins, so observations outside `[start, end)` do
    /// not count. With no observation at all the probabilities come out as NaN.
    ///
    /// Bootstrap cycles resample only observations (or molecules) that add weight to some bin.
    ///
    pub fn build(&self, kind: DistributionKind) -> Result<DistributionTable, SegmentDistributionError> {
        if let Some(cycles) = self.bootstrap.cycles().filter(|cycles| *cycles < 2) {
            return Err(SegmentDistributionError::InvalidBootstrapCycles(cycles));
        }

        let population = self.collect(kind);
        info!(
            "Building {} distribution from {} observations in {} molecules",
            kind,
            population.contributions.len(),
            population.by_molecule.len()
        );

        let bins = self.binning.bins;
        let width = self.binning.width();
        let totals = population.sum(bins, 0..population.contributions.len());
        let probability = normalize(&totals);
        let density: Vec<f64> = probability.iter().map(|p| p / width).collect();

        let mut table = DistributionTable::new(kind.value_column(), self.binning.centers());
        if kind.counts_occurrences() {
            table.push_column(OCCURRENCES_COLUMN, totals);
        }
        table.push_column(PROBABILITY_COLUMN, probability);
        table.push_column(PROBABILITY_DENSITY_COLUMN, density);

        if let Some(cycles) = self.bootstrap.cycles() {
            let samples = self.bootstrap_cycles(&population, cycles)?;
            let densities: Vec<Vec<f64>> = samples
                .iter()
                .map(|p| p.iter().map(|v| v / width).collect())
                .collect();
            let (probability_mean, probability_std) = mean_and_std(&samples);
            let (density_mean, density_std) = mean_and_std(&densities);
            table.push_column(BOOTSTRAP_PROBABILITY_COLUMN, probability_mean);
            table.push_column(BOOTSTRAP_PROBABILITY_STD_COLUMN, probability_std);
            table.push_column(BOOTSTRAP_PROBABILITY_DENSITY_COLUMN, density_mean);
            table.push_column(BOOTSTRAP_PROBABILITY_DENSITY_STD_COLUMN, density_std);
        }

        Ok(table)
    }

    /// Read every molecule's segment table and pre-bin its observations.
    fn collect(&self, kind: DistributionKind) -> Population {
        let filter = self.filter.as_ref();
        let mut observations: Vec<Observation> = Vec::new();
        let mut by_molecule: Vec<Vec<usize>> = Vec::new();

        for uid in &self.uids {
            let Some(segments) = self.archive.segments(uid, &self.table) else {
                debug!("{} has no table '{}', skipping", uid, self.table);
                continue;
            };
            let molecule = by_molecule.len();
            let found = match kind {
                DistributionKind::RateGaussian | DistributionKind::RateHistogram => {
                    rate_observations(molecule, &segments, filter)
                }
                DistributionKind::Duration => duration_observations(molecule, &segments, filter),
                DistributionKind::ProcessivityByMolecule => {
                    processivity_by_molecule(molecule, &segments, filter)
                }
                DistributionKind::ProcessivityByRegion => {
                    processivity_by_region(molecule, &segments, filter)
                }
            };
            let first = observations.len();
            by_molecule.push((first..first + found.len()).collect());
            observations.extend(found);
        }

        let contributions: Vec<Vec<(usize, f64)>> = observations
            .iter()
            .map(|observation| self.contribution(kind, observation))
            .collect();

        // bootstrap cycles draw only from what lands in the bins, so no cycle can come out empty
        // while the full population is not
        let adds_weight = |i: &usize| contributions[*i].iter().any(|(_, w)| *w > 0.0);
        let binned: Vec<usize> = (0..contributions.len()).filter(adds_weight).collect();
        let by_molecule: Vec<Vec<usize>> = by_molecule
            .into_iter()
            .map(|indices| indices.into_iter().filter(adds_weight).collect::<Vec<_>>())
            .filter(|indices| !indices.is_empty())
            .collect();

        Population {
            contributions,
            binned,
            by_molecule,
        }
    }

    /// Bins an observation adds weight to.
    fn contribution(&self, kind: DistributionKind, observation: &Observation) -> Vec<(usize, f64)> {
        match kind {
            DistributionKind::RateGaussian => {
                // a zero-width kernel has no density; flat segments from step fits land here
                if !(observation.sigma > 0.0 && observation.sigma.is_finite()) {
                    return Vec::new();
                }
                let kernel =
                    Gaussian::new(observation.value, observation.sigma).with_duration(observation.weight);
                (0..self.binning.bins)
                    .filter_map(|bin| {
                        let area = kernel.integrate(
                            self.binning.edge(bin),
                            self.binning.edge(bin + 1),
                            GAUSSIAN_STEPS_PER_BIN,
                        );
                        (area > 0.0).then_some((bin, kernel.duration * area))
                    })
                    .collect()
            }
            _ => self
                .binning
                .index(observation.value)
                .map(|bin| vec![(bin, observation.weight)])
                .unwrap_or_default(),
        }
    }

    fn bootstrap_cycles(
        &self,
        population: &Population,
        cycles: usize,
    ) -> Result<Vec<Vec<f64>>, SegmentDistributionError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .build()?;
        let base_seed = self.seed.unwrap_or_else(|| rand::rng().random());
        debug!("Bootstrapping {} cycles with base seed {}", cycles, base_seed);

        let bar = if self.progress {
            let bar = ProgressBar::new(cycles as u64);
            if let Ok(style) = ProgressStyle::with_template(
                "[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}",
            ) {
                bar.set_style(style);
            }
            bar.set_message("Bootstrap cycles");
            bar
        } else {
            ProgressBar::hidden()
        };

        let bins = self.binning.bins;
        let mode = self.bootstrap;
        let samples = run_cycles(&pool, cycles, base_seed, &bar, |rng| {
            let totals = match mode {
                BootstrapMode::Molecules(_) => {
                    let molecules = resample(rng, population.by_molecule.len());
                    population.sum(
                        bins,
                        molecules
                            .into_iter()
                            .flat_map(|m| population.by_molecule[m].iter().copied()),
                    )
                }
                _ => population.sum(
                    bins,
                    resample(rng, population.binned.len())
                        .into_iter()
                        .map(|i| population.binned[i]),
                ),
            };
            normalize(&totals)
        });
        bar.finish_and_clear();
        Ok(samples)
    }
}

fn normalize(totals: &[f64]) -> Vec<f64> {
    let sum: f64 = totals.iter().sum();
    totals.iter().map(|t| t / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use mars_core::InMemoryArchive;
    use mars_core::models::{Molecule, Segment};
    use pretty_assertions::assert_eq;
    use rstest::*;

    const TABLE: &str = "T vs Position";

    fn segment(x1: f64, x2: f64, b: f64, b_sigma: f64) -> Segment {
        Segment::new(x1, 0.0, x2, b * (x2 - x1), 0.0, 0.1, b, b_sigma)
    }

    #[fixture]
    fn archive() -> InMemoryArchive {
        InMemoryArchive::from_molecules(vec![
            Molecule::new("a").with_segments(
                TABLE,
                vec![
                    segment(0.0, 4.0, 0.0, 0.05),
                    segment(4.0, 10.0, 1.0, 0.1),
                    segment(10.0, 12.0, 0.0, 0.05),
                ],
            ),
            Molecule::new("b").with_segments(
                TABLE,
                vec![
                    segment(0.0, 2.0, 2.0, 0.2),
                    segment(2.0, 8.0, 0.0, 0.05),
                    Segment::nan(),
                ],
            ),
            Molecule::new("c"),
        ])
    }

    fn uids() -> Vec<String> {
        vec!["a".to_string(), "b".to_string(), "c".to_string()]
    }

    fn sum(values: &[f64]) -> f64 {
        values.iter().sum()
    }

    #[rstest]
    fn test_rate_histogram(archive: InMemoryArchive) {
        let table = SegmentDistributionBuilder::new(&archive, uids(), TABLE, -0.5, 2.5, 3)
            .unwrap()
            .build_rate_histogram()
            .unwrap();
        assert_eq!(
            table.column_names(),
            vec!["Rate", "Probability", "Probability Density"]
        );
        assert_eq!(table.column("Rate").unwrap(), &[0.0, 1.0, 2.0]);
        // durations: slope 0 -> 4 + 2 + 6, slope 1 -> 6, slope 2 -> 2
        assert_eq!(table.column("Probability").unwrap(), &[0.6, 0.3, 0.1]);
        assert_eq!(table.column("Probability Density").unwrap(), &[0.6, 0.3, 0.1]);
    }

    #[rstest]
    fn test_rate_gaussian_sums_to_one(archive: InMemoryArchive) {
        let builder =
            SegmentDistributionBuilder::new(&archive, uids(), TABLE, -0.95, 3.05, 40).unwrap();
        let table = builder.build_rate_gaussian().unwrap();
        let probability = table.column("Probability").unwrap();
        assert!((sum(probability) - 1.0).abs() < 1e-12);
        // densities integrate to one as well
        let width = builder.binning().width();
        assert!((sum(table.column("Probability Density").unwrap()) * width - 1.0).abs() < 1e-9);
        // the largest share of time is spent at slope 0
        let peak = probability
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        assert!(table.column("Rate").unwrap()[peak].abs() < 1e-9);
    }

    #[rstest]
    fn test_filter_applies_to_rates(archive: InMemoryArchive) {
        let mut builder =
            SegmentDistributionBuilder::new(&archive, uids(), TABLE, -0.5, 2.5, 3).unwrap();
        builder.set_filter(0.5, 3.0).unwrap();
        let table = builder.build_rate_histogram().unwrap();
        assert_eq!(table.column("Probability").unwrap(), &[0.0, 0.75, 0.25]);
        assert!(builder.set_filter(2.0, 1.0).is_err());
    }

    #[rstest]
    fn test_duration_histogram(archive: InMemoryArchive) {
        let mut builder =
            SegmentDistributionBuilder::new(&archive, uids(), TABLE, 0.0, 10.0, 5).unwrap();
        builder.set_filter(0.5, 3.0).unwrap();
        let table = builder.build_duration_histogram().unwrap();
        assert_eq!(
            table.column_names(),
            vec!["Duration", "Occurrences", "Probability", "Probability Density"]
        );
        // one run of 6 in a, one run of 2 in b
        assert_eq!(table.column("Occurrences").unwrap(), &[0.0, 1.0, 0.0, 1.0, 0.0]);
        assert_eq!(table.column("Probability").unwrap(), &[0.0, 0.5, 0.0, 0.5, 0.0]);
        assert_eq!(
            table.column("Probability Density").unwrap(),
            &[0.0, 0.25, 0.0, 0.25, 0.0]
        );
    }

    #[rstest]
    fn test_processivity_histograms(archive: InMemoryArchive) {
        let mut builder =
            SegmentDistributionBuilder::new(&archive, uids(), TABLE, 0.0, 8.0, 4).unwrap();
        builder.set_filter(0.5, 3.0).unwrap();

        let by_region = builder.build_processivity_by_region_histogram().unwrap();
        assert_eq!(by_region.value_column(), "Processivity");
        // a covers 6, b covers 4
        assert_eq!(by_region.column("Occurrences").unwrap(), &[0.0, 0.0, 1.0, 1.0]);

        let by_molecule = builder.build_processivity_by_molecule_histogram().unwrap();
        assert_eq!(by_molecule.column("Occurrences").unwrap(), &[0.0, 0.0, 1.0, 1.0]);
    }

    #[rstest]
    fn test_empty_population_gives_nan(archive: InMemoryArchive) {
        let table = SegmentDistributionBuilder::new(&archive, vec!["c".to_string()], TABLE, 0.0, 1.0, 2)
            .unwrap()
            .build_rate_histogram()
            .unwrap();
        assert!(table.column("Probability").unwrap().iter().all(|v| v.is_nan()));
    }

    #[rstest]
    #[case(BootstrapMode::Segments(0))]
    #[case(BootstrapMode::Molecules(1))]
    fn test_bootstrap_needs_two_cycles(archive: InMemoryArchive, #[case] mode: BootstrapMode) {
        let builder = SegmentDistributionBuilder::new(&archive, uids(), TABLE, 0.0, 1.0, 2).unwrap();
        let builder = match mode {
            BootstrapMode::Segments(n) => builder.bootstrap_segments(n),
            BootstrapMode::Molecules(n) => builder.bootstrap_molecules(n),
            BootstrapMode::None => builder.no_bootstrap(),
        };
        assert!(matches!(
            builder.build_rate_histogram(),
            Err(SegmentDistributionError::InvalidBootstrapCycles(_))
        ));
    }

    #[rstest]
    fn test_bootstrap_columns(archive: InMemoryArchive) {
        let table = SegmentDistributionBuilder::new(&archive, uids(), TABLE, -1.0, 3.0, 20)
            .unwrap()
            .bootstrap_segments(50)
            .set_seed(11)
            .set_threads(4)
            .build_rate_gaussian()
            .unwrap();
        assert_eq!(table.columns.len(), 7);
        let std = table.column("Bootstrap Probability STD").unwrap();
        assert!(std.iter().all(|v| *v >= 0.0));
        assert!(std.iter().any(|v| *v > 0.0));
        let mean = table.column("Bootstrap Probability").unwrap();
        assert!((sum(mean) - 1.0).abs() < 1e-9);
    }

    #[rstest]
    fn test_seeded_bootstrap_is_reproducible(archive: InMemoryArchive) {
        let build = |threads: usize| {
            SegmentDistributionBuilder::new(&archive, uids(), TABLE, -0.5, 2.5, 3)
                .unwrap()
                .bootstrap_molecules(20)
                .set_seed(3)
                .set_threads(threads)
                .build_rate_histogram()
                .unwrap()
        };
        assert_eq!(build(1), build(4));
    }

    #[rstest]
    fn test_degenerate_bootstrap_has_zero_std() {
        let archive = InMemoryArchive::from_molecules(vec![Molecule::new("only").with_segments(
            TABLE,
            vec![segment(0.0, 3.0, 0.7, 0.2)],
        )]);
        let uids = vec!["only".to_string()];
        for builder in [
            SegmentDistributionBuilder::new(&archive, uids.clone(), TABLE, 0.0, 2.0, 8)
                .unwrap()
                .bootstrap_segments(10),
            SegmentDistributionBuilder::new(&archive, uids.clone(), TABLE, 0.0, 2.0, 8)
                .unwrap()
                .bootstrap_molecules(10),
        ] {
            let table = builder.build_rate_gaussian().unwrap();
            assert!(
                table
                    .column("Bootstrap Probability STD")
                    .unwrap()
                    .iter()
                    .all(|v| *v == 0.0)
            );
            assert!(
                table
                    .column("Bootstrap Probability Density STD")
                    .unwrap()
                    .iter()
                    .all(|v| *v == 0.0)
            );
            assert_eq!(
                table.column("Bootstrap Probability").unwrap(),
                table.column("Probability").unwrap()
            );
        }
    }

    #[rstest]
    #[case(BootstrapMode::Molecules(50))]
    #[case(BootstrapMode::Segments(50))]
    fn test_bootstrap_ignores_what_misses_the_bins(#[case] mode: BootstrapMode) {
        // "b" only holds the empty-region sentinel, the slope 5 segment of "a" lies past the bins
        let archive = InMemoryArchive::from_molecules(vec![
            Molecule::new("a").with_segments(
                TABLE,
                vec![segment(0.0, 3.0, 1.0, 0.1), segment(3.0, 4.0, 5.0, 0.1)],
            ),
            Molecule::new("b").with_segments(TABLE, vec![Segment::nan()]),
        ]);
        let uids = vec!["a".to_string(), "b".to_string()];
        let builder = SegmentDistributionBuilder::new(&archive, uids, TABLE, 0.0, 2.0, 4).unwrap();
        let builder = match mode {
            BootstrapMode::Segments(n) => builder.bootstrap_segments(n),
            BootstrapMode::Molecules(n) => builder.bootstrap_molecules(n),
            BootstrapMode::None => builder.no_bootstrap(),
        };
        let table = builder.set_seed(1).build_rate_histogram().unwrap();

        assert_eq!(table.column("Probability").unwrap(), &[0.0, 0.0, 1.0, 0.0]);
        assert_eq!(
            table.column("Bootstrap Probability").unwrap(),
            &[0.0, 0.0, 1.0, 0.0]
        );
        assert_eq!(
            table.column("Bootstrap Probability STD").unwrap(),
            &[0.0, 0.0, 0.0, 0.0]
        );
        assert_eq!(
            table.column("Bootstrap Probability Density STD").unwrap(),
            &[0.0, 0.0, 0.0, 0.0]
        );
    }

    #[rstest]
    fn test_kind_names_round_trip() {
        for kind in [
            DistributionKind::RateGaussian,
            DistributionKind::RateHistogram,
            DistributionKind::Duration,
            DistributionKind::ProcessivityByMolecule,
            DistributionKind::ProcessivityByRegion,
        ] {
            assert_eq!(kind.to_string().parse::<DistributionKind>(), Ok(kind));
        }
        assert!("speed".parse::<DistributionKind>().is_err());
    }
}
