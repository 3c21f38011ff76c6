//! Change point search over the fixture archive, and agreement of the closed-form fit with the
//! generic Levenberg-Marquardt engine.

use mars_core::models::is_contiguous;
use mars_core::{InMemoryArchive, MoleculeArchive};
use mars_kcp::{ChangePointSearch, KcpError, KcpOptions, fit_line, run_change_point_batch};
use mars_lm::fit_linear_lm;

use pretty_assertions::assert_eq;
use rstest::*;

#[fixture]
fn path_to_archive() -> &'static str {
    "tests/data/archive.json"
}

#[fixture]
fn archive(path_to_archive: &str) -> InMemoryArchive {
    InMemoryArchive::from_json_file(path_to_archive).unwrap()
}

#[rstest]
fn test_background_sigma_batch(archive: InMemoryArchive) {
    let options = KcpOptions {
        step_analysis: true,
        start_parameter: Some("start".to_string()),
        end_parameter: Some("end".to_string()),
        ..KcpOptions::default()
    };
    let uids = archive.molecule_uids();

    // 2b7c has no background region and is skipped; 9e33 has only NaN in its background
    let err = run_change_point_batch(&archive, &uids, &options, 2, false).unwrap_err();
    match err {
        KcpError::BatchFailed { failed, total, .. } => assert_eq!((failed, total), (1, 3)),
        other => panic!("unexpected error: {}", other),
    }
    assert!(archive.segments("2b7c", "T vs Position").is_none());

    let segments = archive.segments("0f1a", "T vs Position").unwrap();
    assert_eq!(segments.len(), 2);
    assert!(is_contiguous(&segments));
    assert_eq!(
        segments.iter().map(|s| (s.x1, s.x2)).collect::<Vec<_>>(),
        vec![(10.0, 30.0), (30.0, 49.0)]
    );
    assert!((segments[0].a - 5.0).abs() < 1e-9);
    assert!((segments[1].a - 9.0).abs() < 1e-9);
}

#[rstest]
fn test_global_sigma_finds_kink(archive: InMemoryArchive) {
    let options = KcpOptions {
        sigma: Some(0.05),
        region_name: Some("all".to_string()),
        ..KcpOptions::default()
    };
    let uids = vec!["2b7c".to_string(), "9e33".to_string()];
    let report = run_change_point_batch(&archive, &uids, &options, 2, false).unwrap();
    assert_eq!(report.processed, 2);

    let segments = archive.segments("2b7c", "T vs Position - all").unwrap();
    assert!(segments.len() >= 2);
    assert!(is_contiguous(&segments));
    assert_eq!(segments[0].x1, 0.0);
    assert_eq!(segments.last().unwrap().x2, 49.0);
    assert!(
        segments
            .iter()
            .skip(1)
            .any(|s| (24.0..=26.0).contains(&s.x1))
    );
    assert!((segments[0].b - 0.5).abs() < 0.05);
    assert!((segments.last().unwrap().b - 2.0).abs() < 0.05);

    // all-NaN trace gets the sentinel
    let sentinel = archive.segments("9e33", "T vs Position - all").unwrap();
    assert_eq!(sentinel.len(), 1);
    assert!(!sentinel[0].is_valid());
}

#[rstest]
fn test_written_archive_round_trips(archive: InMemoryArchive) {
    let options = KcpOptions {
        sigma: Some(0.2),
        step_analysis: true,
        ..KcpOptions::default()
    };
    let uids = vec!["0f1a".to_string()];
    run_change_point_batch(&archive, &uids, &options, 1, false).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.json");
    archive.to_json_file(&path).unwrap();
    let reloaded = InMemoryArchive::from_json_file(&path).unwrap();
    assert_eq!(
        reloaded.segments("0f1a", "T vs Position"),
        archive.segments("0f1a", "T vs Position")
    );
}

#[rstest]
fn test_closed_form_agrees_with_levenberg_marquardt() {
    let x: Vec<f64> = (0..60).map(|i| i as f64 * 0.25).collect();
    let y: Vec<f64> = x
        .iter()
        .enumerate()
        .map(|(i, t)| 1.5 + 0.75 * t + [0.3, -0.1, -0.2, 0.05][i % 4])
        .collect();

    let lm = fit_linear_lm(&x, &y, None).unwrap();
    let residual_sigma = (lm.chi_squared / (x.len() as f64 - 2.0)).sqrt();
    let closed = fit_line(&x, &y, residual_sigma).unwrap();

    assert!((closed.a - lm.parameters[0]).abs() < 1e-6);
    assert!((closed.b - lm.parameters[1]).abs() < 1e-6);

    // with sigma set to the residual scatter both report the same standard errors
    let sd = lm.standard_deviations.unwrap();
    assert!((closed.a_sigma - sd[0]).abs() < 1e-6);
    assert!((closed.b_sigma - sd[1]).abs() < 1e-6);
}

#[rstest]
fn test_shared_search_across_threads() {
    let search = ChangePointSearch::new(0.1, 0.99, true).unwrap();
    let traces: Vec<(Vec<f64>, Vec<f64>)> = (1..5)
        .map(|k| {
            let x: Vec<f64> = (0..40).map(|i| i as f64).collect();
            let y = x
                .iter()
                .map(|t| if *t < (k * 8) as f64 { 0.0 } else { k as f64 })
                .collect();
            (x, y)
        })
        .collect();

    std::thread::scope(|scope| {
        for (k, (x, y)) in traces.iter().enumerate() {
            let search = &search;
            scope.spawn(move || {
                let segments = search.generate_segments(x, y, 0, x.len()).unwrap();
                assert_eq!(segments.len(), 2);
                assert_eq!(segments[1].x1, ((k + 1) * 8) as f64);
            });
        }
    });
}
