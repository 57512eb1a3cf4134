use clap::{Arg, ArgAction, Command, arg, value_parser};

pub const PREDICT_CMD: &str = "predict";
pub const DEFAULT_MAX_COVERAGE: &str = "250";

pub fn create_predict_cli() -> Command {
    Command::new(PREDICT_CMD)
        .about("Predict the coverage distribution of each stratum at a target read pileup.")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("REPORT")
                .action(ArgAction::Append)
                .help("Gathered coverage report, one per sample"),
        )
        .arg(
            arg!(--pileup <PILEUP>)
                .required(true)
                .value_parser(value_parser!(i64))
                .help("Target number of read bases per stratum"),
        )
        .arg(
            Arg::new("max-coverage")
                .long("max-coverage")
                .value_name("COVERAGE")
                .value_parser(value_parser!(usize))
                .default_value(DEFAULT_MAX_COVERAGE)
                .help("Highest coverage given its own probability"),
        )
        .arg(
            Arg::new("no-average")
                .long("no-average")
                .action(ArgAction::SetTrue)
                .help("Skip the prediction averaged across samples"),
        )
        .arg(
            arg!(-o --output <OUTPUT>)
                .required(true)
                .help("Path of the predictions report"),
        )
}
