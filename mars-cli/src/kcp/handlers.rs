use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;
use log::info;

use mars_core::{InMemoryArchive, MoleculeArchive};
use mars_kcp::{KcpOptions, run_change_point_batch};

///
/// Resolve the search settings: the `--config` file (or defaults), then every flag that was given.
///
pub fn kcp_options(matches: &ArgMatches) -> Result<KcpOptions> {
    let mut options = match matches.get_one::<String>("config") {
        Some(config) => KcpOptions::from_file(Path::new(config))
            .with_context(|| format!("Could not read settings from {}", config))?,
        None => KcpOptions::default(),
    };

    if let Some(x) = matches.get_one::<String>("x") {
        options.x_column = x.clone();
    }
    if let Some(y) = matches.get_one::<String>("y") {
        options.y_column = y.clone();
    }
    if let Some(sigma) = matches.get_one::<f64>("sigma") {
        options.sigma = Some(*sigma);
    }
    if let Some(bg_start) = matches.get_one::<String>("bg-start") {
        options.bg_start_parameter = bg_start.clone();
        options.sigma = None;
    }
    if let Some(bg_end) = matches.get_one::<String>("bg-end") {
        options.bg_end_parameter = bg_end.clone();
        options.sigma = None;
    }

    if let Some(start) = matches.get_one::<f64>("start") {
        options.start = Some(*start);
    }
    if let Some(end) = matches.get_one::<f64>("end") {
        options.end = Some(*end);
    }
    if let Some(parameter) = matches.get_one::<String>("start-parameter") {
        options.start_parameter = Some(parameter.clone());
        options.start = None;
    }
    if let Some(parameter) = matches.get_one::<String>("end-parameter") {
        options.end_parameter = Some(parameter.clone());
        options.end = None;
    }

    if let Some(region) = matches.get_one::<String>("region") {
        options.region_name = Some(region.clone());
    }
    if let Some(table) = matches.get_one::<String>("table") {
        options.table_name = Some(table.clone());
    }
    if let Some(confidence) = matches.get_one::<f64>("confidence") {
        options.confidence_level = *confidence;
    }
    if matches.get_flag("step") {
        options.step_analysis = true;
    }

    Ok(options)
}

pub fn run_kcp(matches: &ArgMatches) -> Result<()> {
    let archive_path = matches
        .get_one::<String>("archive")
        .context("A path to an archive is required.")?;
    let output = matches
        .get_one::<String>("output")
        .unwrap_or(archive_path);
    let threads = *matches.get_one::<usize>("threads").unwrap_or(&1);
    let progress = !matches.get_flag("no-progress");

    let options = kcp_options(matches)?;

    let archive = InMemoryArchive::from_json_file(archive_path)
        .with_context(|| format!("Could not load archive {}", archive_path))?;
    let uids = archive.molecule_uids();

    let result = run_change_point_batch(&archive, &uids, &options, threads, progress);

    // tables from molecules that succeeded are kept even when others failed
    archive
        .to_json_file(output)
        .with_context(|| format!("Could not write archive {}", output))?;

    let report = result.context("Change point search did not complete")?;
    info!(
        "Wrote '{}' for {} molecules ({} skipped) to {}",
        options.segment_table(),
        report.processed,
        report.skipped,
        output
    );

    Ok(())
}
