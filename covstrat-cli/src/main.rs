mod gather;
mod predict;

use anyhow::Result;
use clap::Command;
use tracing_subscriber::EnvFilter;

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const PKG_NAME: &str = "covstrat";
    pub const BIN_NAME: &str = "covstrat";
    pub const LOG_ENV: &str = "COVSTRAT_LOG";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .about("Gather stratified coverage reports and predict coverage at a new sequencing yield.")
        .subcommand_required(true)
        .subcommand(gather::cli::create_gather_cli())
        .subcommand(predict::cli::create_predict_cli())
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(consts::LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    // log records from the library crates are forwarded through tracing-log
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    init_logging();

    let app = build_parser();
    let matches = app.get_matches();

    match matches.subcommand() {
        //
        // GATHER
        //
        Some((gather::cli::GATHER_CMD, matches)) => {
            gather::handlers::run_gather(matches)?;
        }

        //
        // PREDICT
        //
        Some((predict::cli::PREDICT_CMD, matches)) => {
            predict::handlers::run_predict(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_parser_is_consistent() {
        build_parser().debug_assert();
    }

    #[rstest]
    #[case(&["covstrat", "gather", "-i", "a.txt", "-i", "b.txt", "-o", "out.txt"], 2)]
    #[case(&["covstrat", "gather", "-o", "out.txt"], 0)]
    fn test_gather_inputs(#[case] args: &[&str], #[case] expected: usize) {
        let matches = build_parser().try_get_matches_from(args).unwrap();
        let (name, matches) = matches.subcommand().unwrap();
        assert_eq!(name, gather::cli::GATHER_CMD);
        let inputs = matches
            .get_many::<String>("input")
            .map(|values| values.count())
            .unwrap_or_default();
        assert_eq!(inputs, expected);
    }

    #[rstest]
    fn test_predict_defaults() {
        let matches = build_parser()
            .try_get_matches_from([
                "covstrat", "predict", "-i", "a.txt", "--pileup", "1000", "-o", "p.txt",
            ])
            .unwrap();
        let (_, matches) = matches.subcommand().unwrap();
        assert_eq!(matches.get_one::<i64>("pileup"), Some(&1000));
        assert_eq!(matches.get_one::<usize>("max-coverage"), Some(&250));
        assert!(!matches.get_flag("no-average"));
    }

    #[rstest]
    fn test_predict_requires_pileup() {
        let result =
            build_parser().try_get_matches_from(["covstrat", "predict", "-i", "a.txt", "-o", "p.txt"]);
        assert!(result.is_err());
    }
}
