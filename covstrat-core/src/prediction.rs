//! Projection of derived coverage statistics onto a different sequencing yield.
//!
//! For every reference + read group the coverage distribution is re-fitted as a
//! Poisson distribution whose mean is the group average scaled by
//! `target_pileup / group_pileup`. Mass beyond the coverage cutoff is reported as
//! a residual.

use std::path::Path;

use fxhash::FxHashMap;

use crate::aggregator::{CoverageAggregator, GroupStatistics};
use crate::consts::{
    AVERAGE_INPUT, COVERAGE_COLUMN, INPUT_COLUMN, ORIGINAL_AVERAGE_COLUMN,
    ORIGINAL_PILEUP_COLUMN, PREDICTED_AVERAGE_COLUMN, PREDICTED_PILEUP_COLUMN,
    PREDICTION_SUMMARY_TABLE, PREDICTIONS_TABLE, PROBABILITY_COLUMN, REFERENCE_COUNT_COLUMN,
    RESIDUAL_COLUMN, SCALE_COLUMN,
};
use crate::errors::{CovStratError, Result};
use crate::key::StratificationKey;
use crate::report::Report;
use crate::table::{Column, ColumnFormat, ReportTable};
use crate::utils::{poisson_probability, safe_divide};

const PROBABILITY_FORMAT: ColumnFormat = ColumnFormat::Float(Some(8));

#[derive(Debug, Clone, PartialEq)]
pub struct CoveragePrediction {
    reference_count: i64,
    predicted_pileup: i64,
    predicted_average: f64,
    original_pileup: i64,
    original_average: f64,
    scale: f64,
    probabilities: Vec<f64>,
    residual: f64,
}

fn residual_of(probabilities: &[f64]) -> f64 {
    (1.0 - probabilities.iter().sum::<f64>()).max(0.0)
}

impl CoveragePrediction {
    pub fn new(
        reference_count: i64,
        predicted_pileup: i64,
        original_pileup: i64,
        probabilities: Vec<f64>,
    ) -> Self {
        let residual = residual_of(&probabilities);
        CoveragePrediction {
            reference_count,
            predicted_pileup,
            predicted_average: safe_divide(predicted_pileup as f64, reference_count as f64),
            original_pileup,
            original_average: safe_divide(original_pileup as f64, reference_count as f64),
            scale: safe_divide(predicted_pileup as f64, original_pileup as f64),
            probabilities,
            residual,
        }
    }

    ///
    /// Re-fit one group's coverage distribution at `target_pileup`.
    ///
    /// The probability vector covers coverages `0..max_coverage`.
    ///
    pub fn fit(stats: &GroupStatistics, target_pileup: i64, max_coverage: usize) -> Self {
        let scale = safe_divide(target_pileup as f64, stats.pileup as f64);
        let mean = scale * stats.average;
        let probabilities = (0..max_coverage as u64)
            .map(|coverage| poisson_probability(mean, coverage))
            .collect();
        CoveragePrediction::new(stats.reference_count, target_pileup, stats.pileup, probabilities)
    }

    pub fn reference_count(&self) -> i64 {
        self.reference_count
    }

    pub fn predicted_pileup(&self) -> i64 {
        self.predicted_pileup
    }

    pub fn predicted_average(&self) -> f64 {
        self.predicted_average
    }

    pub fn original_pileup(&self) -> i64 {
        self.original_pileup
    }

    pub fn original_average(&self) -> f64 {
        self.original_average
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn max_coverage(&self) -> usize {
        self.probabilities.len()
    }

    pub fn probability(&self, coverage: usize) -> Option<f64> {
        self.probabilities.get(coverage).copied()
    }

    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// Probability mass at or above `max_coverage`.
    pub fn residual(&self) -> f64 {
        self.residual
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupPrediction {
    pub key: StratificationKey,
    pub prediction: CoveragePrediction,
}

/// Predictions for every group of one input.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplePrediction {
    pub input: String,
    pub groups: Vec<GroupPrediction>,
}

/// Predict every group of a derived aggregator at `target_pileup`.
pub fn predict_coverage(
    aggregator: &CoverageAggregator,
    target_pileup: i64,
    max_coverage: usize,
) -> Result<Vec<GroupPrediction>> {
    Ok(aggregator
        .group_statistics()?
        .iter()
        .map(|stats| GroupPrediction {
            key: stats.key.clone(),
            prediction: CoveragePrediction::fit(stats, target_pileup, max_coverage),
        })
        .collect())
}

///
/// Collects per sample predictions at one target yield and writes them, optionally
/// along with their average across samples.
///
#[derive(Debug)]
pub struct Predictor {
    target_pileup: i64,
    max_coverage: usize,
    group_columns: Option<Vec<Column>>,
    samples: Vec<SamplePrediction>,
}

impl Predictor {
    pub fn new(target_pileup: i64, max_coverage: usize) -> Self {
        Predictor {
            target_pileup,
            max_coverage,
            group_columns: None,
            samples: Vec::new(),
        }
    }

    pub fn samples(&self) -> &[SamplePrediction] {
        &self.samples
    }

    pub fn max_coverage(&self) -> usize {
        self.max_coverage
    }

    /// Record the prediction of one derived aggregator under the label `input`.
    pub fn add_sample(&mut self, input: &str, aggregator: &CoverageAggregator) -> Result<()> {
        let columns = aggregator.group_columns();
        if let Some(expected) = &self.group_columns {
            if expected.as_slice() != columns {
                let describe = |cols: &[Column]| {
                    cols.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(", ")
                };
                return Err(CovStratError::SchemaMismatch {
                    table: PREDICTIONS_TABLE.to_string(),
                    detail: format!(
                        "{}: expected groups [{}], found [{}]",
                        input,
                        describe(expected),
                        describe(columns)
                    ),
                });
            }
        } else {
            self.group_columns = Some(columns.to_vec());
        }

        let groups = predict_coverage(aggregator, self.target_pileup, self.max_coverage)?;
        log::debug!("Predicted {} groups for {}", groups.len(), input);
        self.samples.push(SamplePrediction {
            input: input.to_string(),
            groups,
        });
        Ok(())
    }

    /// Read a coverage report, derive its statistics and record its prediction.
    pub fn add_report_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut aggregator = CoverageAggregator::read(path)?;
        aggregator.derive_statistics()?;
        let input = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.add_sample(&input, &aggregator)
    }

    ///
    /// Average the recorded predictions per group.
    ///
    /// A group is averaged over the samples that contain it. Probability vectors,
    /// original pileups, original averages and scales are averaged; the reference
    /// count and predicted values come from the first sample holding the group.
    ///
    pub fn average_across_samples(&self) -> SamplePrediction {
        let mut order: Vec<&StratificationKey> = Vec::new();
        let mut members: FxHashMap<&StratificationKey, Vec<&CoveragePrediction>> =
            FxHashMap::default();
        for sample in &self.samples {
            for group in &sample.groups {
                members
                    .entry(&group.key)
                    .or_insert_with(|| {
                        order.push(&group.key);
                        Vec::new()
                    })
                    .push(&group.prediction);
            }
        }

        let groups = order
            .into_iter()
            .filter_map(|key| {
                let predictions = members.get(key)?;
                let first = predictions.first()?;
                let n = predictions.len() as f64;
                let mean = |f: &dyn Fn(&CoveragePrediction) -> f64| {
                    predictions.iter().map(|p| f(*p)).sum::<f64>() / n
                };

                let probabilities: Vec<f64> = (0..self.max_coverage)
                    .map(|coverage| {
                        mean(&|p: &CoveragePrediction| p.probability(coverage).unwrap_or(0.0))
                    })
                    .collect();
                let residual = residual_of(&probabilities);
                Some(GroupPrediction {
                    key: key.clone(),
                    prediction: CoveragePrediction {
                        reference_count: first.reference_count,
                        predicted_pileup: first.predicted_pileup,
                        predicted_average: first.predicted_average,
                        original_pileup: mean(&|p: &CoveragePrediction| {
                            p.original_pileup as f64
                        })
                        .round() as i64,
                        original_average: mean(&|p: &CoveragePrediction| p.original_average),
                        scale: mean(&|p: &CoveragePrediction| p.scale),
                        probabilities,
                        residual,
                    },
                })
            })
            .collect();

        SamplePrediction {
            input: AVERAGE_INPUT.to_string(),
            groups,
        }
    }

    fn prediction_tables(&self) -> (ReportTable, ReportTable) {
        let group_columns = self.group_columns.clone().unwrap_or_default();

        let mut predictions = ReportTable::new(PREDICTIONS_TABLE, PREDICTIONS_TABLE);
        let mut summary = ReportTable::new(PREDICTION_SUMMARY_TABLE, PREDICTION_SUMMARY_TABLE);
        for table in [&mut predictions, &mut summary] {
            table.add_column(INPUT_COLUMN, ColumnFormat::Text);
            for column in &group_columns {
                table.add_column(column.name.clone(), column.format);
            }
        }
        predictions.add_column(COVERAGE_COLUMN, ColumnFormat::Integer);
        predictions.add_column(PROBABILITY_COLUMN, PROBABILITY_FORMAT);

        summary.add_column(REFERENCE_COUNT_COLUMN, ColumnFormat::Integer);
        summary.add_column(PREDICTED_PILEUP_COLUMN, ColumnFormat::Integer);
        summary.add_column(PREDICTED_AVERAGE_COLUMN, PROBABILITY_FORMAT);
        summary.add_column(ORIGINAL_PILEUP_COLUMN, ColumnFormat::Integer);
        summary.add_column(ORIGINAL_AVERAGE_COLUMN, PROBABILITY_FORMAT);
        summary.add_column(SCALE_COLUMN, PROBABILITY_FORMAT);
        summary.add_column(RESIDUAL_COLUMN, PROBABILITY_FORMAT);

        (predictions, summary)
    }

    fn add_sample_rows(
        &self,
        sample: &SamplePrediction,
        predictions: &mut ReportTable,
        summary: &mut ReportTable,
    ) {
        for group in &sample.groups {
            let prediction = &group.prediction;
            let mut buckets: Vec<(usize, f64)> =
                prediction.probabilities().iter().copied().enumerate().collect();
            buckets.push((self.max_coverage, prediction.residual()));

            for (coverage, probability) in buckets {
                let row = predictions.add_row();
                predictions.set(row, 0, sample.input.as_str());
                for (i, value) in group.key.iter().enumerate() {
                    predictions.set(row, i + 1, value.clone());
                }
                let column = group.key.len() + 1;
                predictions.set(row, column, coverage as i64);
                predictions.set(row, column + 1, probability);
            }

            let row = summary.add_row();
            summary.set(row, 0, sample.input.as_str());
            for (i, value) in group.key.iter().enumerate() {
                summary.set(row, i + 1, value.clone());
            }
            let column = group.key.len() + 1;
            summary.set(row, column, prediction.reference_count());
            summary.set(row, column + 1, prediction.predicted_pileup());
            summary.set(row, column + 2, prediction.predicted_average());
            summary.set(row, column + 3, prediction.original_pileup());
            summary.set(row, column + 4, prediction.original_average());
            summary.set(row, column + 5, prediction.scale());
            summary.set(row, column + 6, prediction.residual());
        }
    }

    /// The `Predictions` and `PredictionSummary` tables of every recorded sample.
    pub fn to_report(&self, include_average: bool) -> Report {
        let (mut predictions, mut summary) = self.prediction_tables();
        for sample in &self.samples {
            self.add_sample_rows(sample, &mut predictions, &mut summary);
        }
        if include_average && !self.samples.is_empty() {
            let average = self.average_across_samples();
            self.add_sample_rows(&average, &mut predictions, &mut summary);
        }

        let mut report = Report::new();
        report.add_table(predictions);
        report.add_table(summary);
        report
    }

    pub fn write<P: AsRef<Path>>(&self, path: P, include_average: bool) -> Result<()> {
        self.to_report(include_average).write(path)
    }
}
