//! Distribution builds over the fixture segment tables.

use mars_core::{InMemoryArchive, MoleculeArchive};
use mars_segdist::{
    BootstrapMode, DistributionKind, DistributionOptions, DistributionTable,
    SegmentDistributionBuilder,
};

use pretty_assertions::assert_eq;
use rstest::*;

const TABLE: &str = "T vs Position";

#[fixture]
fn path_to_segments() -> &'static str {
    "tests/data/segments.json"
}

#[fixture]
fn archive(path_to_segments: &str) -> InMemoryArchive {
    InMemoryArchive::from_json_file(path_to_segments).unwrap()
}

#[rstest]
#[case(DistributionKind::RateGaussian)]
#[case(DistributionKind::RateHistogram)]
fn test_rate_probabilities_sum_to_one(archive: InMemoryArchive, #[case] kind: DistributionKind) {
    let uids = archive.molecule_uids();
    let table = SegmentDistributionBuilder::new(&archive, uids, TABLE, -1.0, 4.0, 50)
        .unwrap()
        .build(kind)
        .unwrap();
    assert_eq!(table.len(), 50);
    let total: f64 = table.column("Probability").unwrap().iter().sum();
    assert!((total - 1.0).abs() < 1e-9);
}

#[rstest]
fn test_runs_of_moving_segments(archive: InMemoryArchive) {
    let uids = archive.molecule_uids();
    let mut builder = SegmentDistributionBuilder::new(&archive, uids, TABLE, 0.0, 80.0, 8).unwrap();
    builder.set_filter(0.5, 5.0).unwrap();

    let durations = builder.build_duration_histogram().unwrap();
    assert_eq!(
        durations.column("Occurrences").unwrap(),
        &[0.0, 0.0, 3.0, 0.0, 0.0, 0.0, 0.0, 0.0]
    );

    let processivity = builder.build_processivity_by_region_histogram().unwrap();
    assert_eq!(
        processivity.column("Occurrences").unwrap(),
        &[0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0]
    );
}

#[rstest]
fn test_bootstrap_from_toml_options(archive: InMemoryArchive) {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("segdist.toml");
    std::fs::write(
        &config,
        "start = -1.0\nend = 4.0\nbins = 25\nfilter_start = 0.5\nseed = 5\nthreads = 2\n\n[bootstrap]\nmode = \"molecules\"\ncycles = 30\n",
    )
    .unwrap();
    let options = DistributionOptions::from_file(&config).unwrap();
    assert_eq!(options.bootstrap, BootstrapMode::Molecules(30));

    let uids = archive.molecule_uids();
    let builder = SegmentDistributionBuilder::from_options(&archive, uids, TABLE, &options).unwrap();
    let table = builder.build_rate_histogram().unwrap();
    assert_eq!(
        table.column_names(),
        vec![
            "Rate",
            "Probability",
            "Probability Density",
            "Bootstrap Probability",
            "Bootstrap Probability STD",
            "Bootstrap Probability Density",
            "Bootstrap Probability Density STD",
        ]
    );
    assert!(
        table
            .column("Bootstrap Probability Density STD")
            .unwrap()
            .iter()
            .all(|v| *v >= 0.0)
    );

    let path = dir.path().join("table.json");
    table.to_json_file(&path).unwrap();
    let reloaded: DistributionTable =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(reloaded, table);
}
