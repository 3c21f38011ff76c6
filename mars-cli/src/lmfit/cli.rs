use clap::{Command, arg, value_parser};

pub const LMFIT_CMD: &str = "lmfit";

pub fn create_lmfit_cli() -> Command {
    Command::new(LMFIT_CMD)
        .author("Mars developers")
        .about("Fit a model function to x/y data with Levenberg-Marquardt.")
        .arg_required_else_help(true)
        .arg(arg!(--data <data> "JSON file with x, y and optional sigma arrays").required(true))
        .arg(
            arg!(--model <model> "Model to fit")
                .value_parser(["linear", "gaussian-peak", "exponential"])
                .required(true),
        )
        .arg(
            arg!(--p0 <values> "Initial parameters, comma separated")
                .value_parser(value_parser!(f64))
                .value_delimiter(',')
                .allow_negative_numbers(true)
                .required(true),
        )
        .arg(
            arg!(--precision <precision> "Stop once chi-squared improves by less than this")
                .value_parser(value_parser!(f64)),
        )
        .arg(
            arg!(--"max-iterations" <n> "Iteration budget")
                .value_parser(value_parser!(usize)),
        )
}
