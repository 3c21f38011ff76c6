use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;
use log::info;

use mars_core::{InMemoryArchive, MoleculeArchive};
use mars_segdist::{
    BootstrapMode, DistributionKind, DistributionOptions, DistributionTable,
    SegmentDistributionBuilder,
};

use super::cli::DEFAULT_BOOTSTRAP_CYCLES;

///
/// Resolve the build settings: the `--config` file (or defaults), then every flag that was given.
///
pub fn distribution_options(matches: &ArgMatches) -> Result<DistributionOptions> {
    let mut options = match matches.get_one::<String>("config") {
        Some(config) => DistributionOptions::from_file(Path::new(config))
            .with_context(|| format!("Could not read settings from {}", config))?,
        None => DistributionOptions::default(),
    };

    if let Some(start) = matches.get_one::<f64>("start") {
        options.start = *start;
    }
    if let Some(end) = matches.get_one::<f64>("end") {
        options.end = *end;
    }
    if let Some(bins) = matches.get_one::<usize>("bins") {
        options.bins = *bins;
    }
    if let Some(start) = matches.get_one::<f64>("filter-start") {
        options.filter_start = Some(*start);
    }
    if let Some(stop) = matches.get_one::<f64>("filter-stop") {
        options.filter_stop = Some(*stop);
    }

    if let Some(mode) = matches.get_one::<String>("bootstrap") {
        let cycles = matches
            .get_one::<usize>("cycles")
            .copied()
            .or(options.bootstrap.cycles())
            .unwrap_or(DEFAULT_BOOTSTRAP_CYCLES);
        options.bootstrap = match mode.as_str() {
            "segments" => BootstrapMode::Segments(cycles),
            "molecules" => BootstrapMode::Molecules(cycles),
            _ => {
                return Err(anyhow::anyhow!(
                    "Invalid bootstrap mode: {}. Valid options are 'segments' or 'molecules'",
                    mode
                ));
            }
        };
    }
    if let Some(seed) = matches.get_one::<u64>("seed") {
        options.seed = Some(*seed);
    }
    if let Some(threads) = matches.get_one::<usize>("threads") {
        options.threads = *threads;
    }

    Ok(options)
}

fn write_tsv<W: Write>(table: &DistributionTable, out: &mut W) -> io::Result<()> {
    writeln!(out, "{}", table.column_names().join("\t"))?;
    for i in 0..table.len() {
        if let Some(row) = table.row(i) {
            let fields: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            writeln!(out, "{}", fields.join("\t"))?;
        }
    }
    out.flush()
}

pub fn run_segdist(matches: &ArgMatches) -> Result<()> {
    let archive_path = matches
        .get_one::<String>("archive")
        .context("A path to an archive is required.")?;
    let table_name = matches
        .get_one::<String>("table")
        .context("A segment table name is required.")?;
    let kind: DistributionKind = matches
        .get_one::<String>("kind")
        .context("A distribution kind is required.")?
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    let progress = !matches.get_flag("no-progress");

    let options = distribution_options(matches)?;

    let archive = InMemoryArchive::from_json_file(archive_path)
        .with_context(|| format!("Could not load archive {}", archive_path))?;
    let uids = archive.molecule_uids();

    let table = SegmentDistributionBuilder::from_options(&archive, uids, table_name, &options)?
        .set_progress(progress)
        .build(kind)?;

    match matches.get_one::<String>("output") {
        Some(output) => {
            table
                .to_json_file(output)
                .with_context(|| format!("Could not write table {}", output))?;
            info!("Wrote {} distribution with {} bins to {}", kind, table.len(), output);
        }
        None => {
            let stdout = io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            write_tsv(&table, &mut writer)?;
        }
    }

    Ok(())
}
