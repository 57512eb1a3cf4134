use clap::{Arg, ArgAction, Command, arg};

pub const GATHER_CMD: &str = "gather";

pub fn create_gather_cli() -> Command {
    Command::new(GATHER_CMD)
        .about("Merge coverage reports from many shards into one report with derived statistics.")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("REPORT")
                .action(ArgAction::Append)
                .help("Coverage report to merge, may be given more than once"),
        )
        .arg(
            arg!(-o --output <OUTPUT>)
                .required(true)
                .help("Path of the merged report, gzip-compressed when it ends in .gz"),
        )
}
