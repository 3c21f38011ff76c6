use clap::{ArgAction, Command, arg, value_parser};

pub const SEGDIST_CMD: &str = "segdist";

/// Bootstrap cycles used when `--bootstrap` is given without `--cycles`.
pub const DEFAULT_BOOTSTRAP_CYCLES: usize = 100;

pub fn create_segdist_cli() -> Command {
    Command::new(SEGDIST_CMD)
        .author("Mars developers")
        .about("Build a rate, duration or processivity distribution from segment tables.")
        .arg_required_else_help(true)
        .arg(arg!(--archive <archive> "Molecule archive in JSON format").required(true))
        .arg(arg!(--table <name> "Segment table to read from each molecule").required(true))
        .arg(
            arg!(--kind <kind> "Which distribution to build")
                .value_parser([
                    "rate-gaussian",
                    "rate-histogram",
                    "duration",
                    "processivity-molecule",
                    "processivity-region",
                ])
                .required(true),
        )
        .arg(arg!(--start <start> "Lower edge of the first bin").value_parser(value_parser!(f64)))
        .arg(arg!(--end <end> "Upper edge of the last bin").value_parser(value_parser!(f64)))
        .arg(arg!(--bins <bins> "Number of bins").value_parser(value_parser!(usize)))
        .arg(
            arg!(--"filter-start" <slope> "Only count segments with a slope of at least this")
                .value_parser(value_parser!(f64)),
        )
        .arg(
            arg!(--"filter-stop" <slope> "Only count segments with a slope of at most this")
                .value_parser(value_parser!(f64)),
        )
        .arg(
            arg!(--bootstrap <mode> "Resample segments or whole molecules")
                .value_parser(["segments", "molecules"]),
        )
        .arg(
            arg!(--cycles <cycles> "Number of bootstrap cycles")
                .value_parser(value_parser!(usize))
                .requires("bootstrap"),
        )
        .arg(arg!(--seed <seed> "Seed for bootstrap resampling").value_parser(value_parser!(u64)))
        .arg(arg!(--threads <threads> "Number of worker threads").value_parser(value_parser!(usize)))
        .arg(arg!(--config <config> "TOML file with build settings; flags take precedence"))
        .arg(arg!(--output <output> "Write the table as JSON here instead of printing it"))
        .arg(arg!(--"no-progress" "Do not draw a progress bar").action(ArgAction::SetTrue))
}
