//! Turning segment tables into the observations that get binned.
//!
//! Rate builds bin individual segments. Duration and processivity builds bin "run" events: maximal
//! stretches of consecutive segments of one molecule that pass the slope filter and touch each
//! other end to start.

use mars_core::models::Segment;

/// Inclusive slope range a segment must fall in to count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlopeFilter {
    pub start: f64,
    pub stop: f64,
}

impl SlopeFilter {
    pub fn accepts(&self, slope: f64) -> bool {
        slope >= self.start && slope <= self.stop
    }
}

/// A segment or run event, tagged with the molecule it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    /// Position in the builder's molecule list.
    pub molecule: usize,
    pub value: f64,
    /// Width of the Gaussian kernel, for rate observations.
    pub sigma: f64,
    pub weight: f64,
}

fn qualifies(segment: &Segment, filter: Option<&SlopeFilter>) -> bool {
    segment.is_valid() && filter.is_none_or(|f| f.accepts(segment.b))
}

///
/// One observation per qualifying segment: its slope, slope error and duration.
///
pub fn rate_observations(
    molecule: usize,
    segments: &[Segment],
    filter: Option<&SlopeFilter>,
) -> Vec<Observation> {
    segments
        .iter()
        .filter(|s| qualifies(s, filter))
        .map(|s| Observation {
            molecule,
            value: s.b,
            sigma: s.b_sigma,
            weight: s.duration(),
        })
        .collect()
}

///
/// Runs of consecutive qualifying segments, as `[first, last]` index pairs.
///
/// A run ends where a segment fails the filter or where two neighbours do not share an endpoint.
///
pub fn find_runs(segments: &[Segment], filter: Option<&SlopeFilter>) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut current: Option<(usize, usize)> = None;

    for (i, segment) in segments.iter().enumerate() {
        if !qualifies(segment, filter) {
            if let Some(run) = current.take() {
                runs.push(run);
            }
            continue;
        }
        current = match current {
            Some((first, last)) if segments[last].x2 == segment.x1 => Some((first, i)),
            Some(run) => {
                runs.push(run);
                Some((i, i))
            }
            None => Some((i, i)),
        };
    }
    if let Some(run) = current {
        runs.push(run);
    }
    runs
}

///
/// One observation per run, valued by its extent `x2(last) - x1(first)`.
///
pub fn duration_observations(
    molecule: usize,
    segments: &[Segment],
    filter: Option<&SlopeFilter>,
) -> Vec<Observation> {
    find_runs(segments, filter)
        .into_iter()
        .map(|(first, last)| Observation {
            molecule,
            value: segments[last].x2 - segments[first].x1,
            sigma: f64::NAN,
            weight: 1.0,
        })
        .collect()
}

fn run_processivity(segments: &[Segment]) -> f64 {
    segments.iter().map(|s| s.b * s.duration()).sum()
}

///
/// One observation per run, valued by the distance covered, `Σ B·(x2 - x1)`.
///
pub fn processivity_by_region(
    molecule: usize,
    segments: &[Segment],
    filter: Option<&SlopeFilter>,
) -> Vec<Observation> {
    find_runs(segments, filter)
        .into_iter()
        .map(|(first, last)| Observation {
            molecule,
            value: run_processivity(&segments[first..=last]),
            sigma: f64::NAN,
            weight: 1.0,
        })
        .collect()
}

///
/// At most one observation per molecule: the processivity of all its runs together.
///
pub fn processivity_by_molecule(
    molecule: usize,
    segments: &[Segment],
    filter: Option<&SlopeFilter>,
) -> Vec<Observation> {
    let runs = find_runs(segments, filter);
    if runs.is_empty() {
        return Vec::new();
    }
    let total = runs
        .iter()
        .map(|(first, last)| run_processivity(&segments[*first..=*last]))
        .sum();
    vec![Observation {
        molecule,
        value: total,
        sigma: f64::NAN,
        weight: 1.0,
    }]
}
