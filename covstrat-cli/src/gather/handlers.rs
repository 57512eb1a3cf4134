use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ArgMatches;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use covstrat_core::CoverageAggregator;

pub fn run_gather(matches: &ArgMatches) -> Result<()> {
    let inputs: Vec<PathBuf> = matches
        .get_many::<String>("input")
        .map(|values| values.map(PathBuf::from).collect())
        .unwrap_or_default();

    let output = matches
        .get_one::<String>("output")
        .context("An output path is required.")?;

    if inputs.is_empty() {
        log::info!("No inputs specified.");
        return Ok(());
    }

    let merged = gather_reports(&inputs)?;
    merged
        .write(output)
        .with_context(|| format!("Failed to write merged report to {}", output))?;

    log::info!("Wrote {} merged from {} reports", output, inputs.len());
    Ok(())
}

///
/// Load every report in parallel, merge them pairwise and derive the statistics
/// of the result.
///
pub fn gather_reports(inputs: &[PathBuf]) -> Result<CoverageAggregator> {
    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}")?
            .progress_chars("##-"),
    );
    pb.set_message("Loading reports");

    let merged = inputs
        .par_iter()
        .map(|path| {
            let aggregator = CoverageAggregator::read(path)
                .with_context(|| format!("Failed to load report {}", path.display()));
            pb.inc(1);
            aggregator
        })
        .try_reduce_with(|mut left, right| {
            left.merge(&right).context("Failed to merge reports")?;
            Ok(left)
        });
    pb.finish_with_message("Reports loaded");

    let mut merged = match merged {
        Some(merged) => merged?,
        None => anyhow::bail!("No reports to gather"),
    };
    merged.derive_statistics()?;
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;
    use tempfile::tempdir;

    use covstrat_core::{Column, ColumnFormat, StratificationKey, Value};

    fn shard(coverage: u32) -> CoverageAggregator {
        let reference = vec![Column::new("gc_content", ColumnFormat::Float(Some(1)))];
        let read = vec![Column::new("read_group", ColumnFormat::Text)];
        let mut aggregator = CoverageAggregator::new(&reference, &read).unwrap();
        let key = StratificationKey::from(vec![Value::Float(40.0)]);
        for _ in 0..4 {
            aggregator.increment_reference(&key).unwrap();
        }
        aggregator
            .increment_read_coverage(&key.with("rg1"), coverage)
            .unwrap();
        aggregator
    }

    #[rstest]
    fn test_gather_merges_all_shards() {
        let dir = tempdir().unwrap();
        let inputs: Vec<PathBuf> = (1..=3)
            .map(|i| {
                let path = dir.path().join(format!("shard{}.txt", i));
                shard(i).write(&path).unwrap();
                path
            })
            .collect();

        let merged = gather_reports(&inputs).unwrap();
        assert!(merged.is_derived());
        let stats = merged.group_statistics().unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].reference_count, 12);
        assert_eq!(stats[0].pileup, 6);
    }

    #[rstest]
    fn test_gather_reports_missing_input() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.txt");
        let Err(err) = gather_reports(&[missing]) else {
            panic!("a missing report must not load");
        };
        assert!(err.to_string().contains("missing.txt"));
    }
}
