//! Bootstrap resampling of distribution builds.
//!
//! Cycles are independent: cycle `i` draws from its own generator seeded with `base_seed + i`, so
//! a seeded run gives the same table no matter how the cycles are scheduled.

use std::sync::atomic::{AtomicUsize, Ordering};

use indicatif::ProgressBar;
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::ThreadPool;
use rayon::prelude::*;

///
/// `n` indices drawn uniformly from `0..n` with replacement.
///
pub fn resample<R: Rng + ?Sized>(rng: &mut R, n: usize) -> Vec<usize> {
    if n == 0 {
        return Vec::new();
    }
    (0..n).map(|_| rng.random_range(0..n)).collect()
}

///
/// Run `cycle` `cycles` times on `pool`, each call with its own seeded generator.
///
/// Results come back in cycle order.
///
pub fn run_cycles<F>(
    pool: &ThreadPool,
    cycles: usize,
    base_seed: u64,
    bar: &ProgressBar,
    cycle: F,
) -> Vec<Vec<f64>>
where
    F: Fn(&mut StdRng) -> Vec<f64> + Sync,
{
    let done = AtomicUsize::new(0);
    let results = pool.install(|| {
        (0..cycles)
            .into_par_iter()
            .map(|i| {
                let mut rng = StdRng::seed_from_u64(base_seed.wrapping_add(i as u64));
                let result = cycle(&mut rng);
                done.fetch_add(1, Ordering::Relaxed);
                bar.inc(1);
                result
            })
            .collect()
    });
    debug!("Finished {} bootstrap cycles", done.load(Ordering::Relaxed));
    results
}

///
/// Per-bin mean and sample standard deviation `sqrt(Σ(x - mean)² / (N - 1))` over cycles.
///
/// The mean is accumulated relative to the first cycle, so identical cycles give a standard
/// deviation of exactly zero.
///
pub fn mean_and_std(samples: &[Vec<f64>]) -> (Vec<f64>, Vec<f64>) {
    let Some(first) = samples.first() else {
        return (Vec::new(), Vec::new());
    };
    let n = samples.len() as f64;
    let bins = first.len();

    let mut mean = vec![0.0; bins];
    let mut std = vec![0.0; bins];
    for bin in 0..bins {
        let reference = first[bin];
        let shift: f64 = samples.iter().map(|s| s[bin] - reference).sum::<f64>() / n;
        let m = reference + shift;
        let squares: f64 = samples.iter().map(|s| (s[bin] - m) * (s[bin] - m)).sum();
        mean[bin] = m;
        std[bin] = (squares / (n - 1.0)).sqrt();
    }
    (mean, std)
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_resample_is_in_range() {
        let mut rng = StdRng::seed_from_u64(1);
        let indices = resample(&mut rng, 7);
        assert_eq!(indices.len(), 7);
        assert!(indices.iter().all(|i| *i < 7));
        assert!(resample(&mut rng, 0).is_empty());
    }

    #[rstest]
    fn test_mean_and_std() {
        let samples = vec![vec![1.0, 0.1], vec![3.0, 0.1], vec![5.0, 0.1]];
        let (mean, std) = mean_and_std(&samples);
        assert_eq!(mean, vec![3.0, 0.1]);
        assert_eq!(std[0], 2.0);
        assert_eq!(std[1], 0.0);
    }

    #[rstest]
    fn test_cycles_are_reproducible() {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(3)
            .build()
            .unwrap();
        let bar = ProgressBar::hidden();
        let draw = |rng: &mut StdRng| vec![rng.random_range(0.0..1.0), rng.random_range(0.0..1.0)];

        let first = run_cycles(&pool, 16, 99, &bar, draw);
        let second = run_cycles(&pool, 16, 99, &bar, draw);
        assert_eq!(first, second);
        assert_eq!(first.len(), 16);
        assert_ne!(first[0], first[1]);
    }
}
