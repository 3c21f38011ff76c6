mod kcp;
mod lmfit;
mod segdist;

use anyhow::Result;
use clap::{ArgAction, Command, arg};
use env_logger::Env;

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const PKG_NAME: &str = "mars";
    pub const BIN_NAME: &str = "mars";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .author("Mars developers")
        .about("Change point search, segment distributions and curve fitting for single-molecule traces.")
        .subcommand_required(true)
        .arg(
            arg!(-v --verbose "Log at debug level")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(kcp::cli::create_kcp_cli())
        .subcommand(segdist::cli::create_segdist_cli())
        .subcommand(lmfit::cli::create_lmfit_cli())
}

fn main() -> Result<()> {
    let app = build_parser();
    let matches = app.get_matches();

    // RUST_LOG still wins over the flag
    let level = if matches.get_flag("verbose") {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    match matches.subcommand() {
        //
        // CHANGE POINTS
        //
        Some((kcp::cli::KCP_CMD, matches)) => {
            kcp::handlers::run_kcp(matches)?;
        }

        //
        // SEGMENT DISTRIBUTIONS
        //
        Some((segdist::cli::SEGDIST_CMD, matches)) => {
            segdist::handlers::run_segdist(matches)?;
        }

        //
        // CURVE FITTING
        //
        Some((lmfit::cli::LMFIT_CMD, matches)) => {
            lmfit::handlers::run_lmfit(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}
