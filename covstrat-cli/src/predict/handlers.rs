use anyhow::{Context, Result};
use clap::ArgMatches;
use indicatif::{ProgressBar, ProgressStyle};

use covstrat_core::Predictor;

use super::cli::DEFAULT_MAX_COVERAGE;

pub fn run_predict(matches: &ArgMatches) -> Result<()> {
    let inputs: Vec<&String> = matches
        .get_many::<String>("input")
        .map(|values| values.collect())
        .unwrap_or_default();

    let pileup = *matches
        .get_one::<i64>("pileup")
        .context("A target pileup is required.")?;
    let max_coverage = match matches.get_one::<usize>("max-coverage") {
        Some(max_coverage) => *max_coverage,
        None => DEFAULT_MAX_COVERAGE.parse()?,
    };
    let include_average = !matches.get_flag("no-average");

    let output = matches
        .get_one::<String>("output")
        .context("An output path is required.")?;

    if inputs.is_empty() {
        log::info!("No inputs specified.");
        return Ok(());
    }

    let mut predictor = Predictor::new(pileup, max_coverage);

    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}")?
            .progress_chars("##-"),
    );
    for input in inputs {
        pb.set_message(input.clone());
        predictor
            .add_report_file(input)
            .with_context(|| format!("Failed to predict coverage for {}", input))?;
        pb.inc(1);
    }
    pb.finish_with_message("Predictions done");

    predictor
        .write(output, include_average)
        .with_context(|| format!("Failed to write predictions to {}", output))?;

    log::info!(
        "Wrote predictions for {} samples to {}",
        predictor.samples().len(),
        output
    );
    Ok(())
}
