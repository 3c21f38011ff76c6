use clap::{ArgAction, Command, arg, value_parser};

pub const KCP_CMD: &str = "kcp";

pub fn create_kcp_cli() -> Command {
    Command::new(KCP_CMD)
        .author("Mars developers")
        .about("Split every molecule trace of an archive into linear (or flat) segments.")
        .arg_required_else_help(true)
        .arg(arg!(--archive <archive> "Molecule archive in JSON format").required(true))
        .arg(arg!(--x <column> "Column used as x (default T)"))
        .arg(arg!(--y <column> "Column used as y (default Position)"))
        .arg(
            arg!(--sigma <sigma> "Noise level shared by all molecules")
                .value_parser(value_parser!(f64))
                .conflicts_with_all(["bg-start", "bg-end"]),
        )
        .arg(arg!(--"bg-start" <parameter> "Molecule parameter holding the background start"))
        .arg(arg!(--"bg-end" <parameter> "Molecule parameter holding the background end"))
        .arg(
            arg!(--start <x> "Analyze from this x value")
                .value_parser(value_parser!(f64))
                .conflicts_with("start-parameter"),
        )
        .arg(
            arg!(--end <x> "Analyze up to this x value")
                .value_parser(value_parser!(f64))
                .conflicts_with("end-parameter"),
        )
        .arg(arg!(--"start-parameter" <parameter> "Molecule parameter holding the region start"))
        .arg(arg!(--"end-parameter" <parameter> "Molecule parameter holding the region end"))
        .arg(arg!(--region <name> "Region name appended to the segment table name"))
        .arg(
            arg!(--confidence <level> "Confidence level a split must reach (default 0.99)")
                .value_parser(value_parser!(f64)),
        )
        .arg(arg!(--step "Fit flat levels instead of sloped lines").action(ArgAction::SetTrue))
        .arg(
            arg!(--threads <threads> "Number of worker threads")
                .value_parser(value_parser!(usize))
                .default_value("1"),
        )
        .arg(arg!(--table <name> "Segment table name, overriding the generated one"))
        .arg(arg!(--config <config> "TOML file with search settings; flags take precedence"))
        .arg(arg!(--output <output> "Where to write the archive (default: overwrite --archive)"))
        .arg(arg!(--"no-progress" "Do not draw a progress bar").action(ArgAction::SetTrue))
}
