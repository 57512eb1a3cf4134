//! Stratified coverage counts and the statistics derived from them.
//!
//! A [`CoverageAggregator`] owns three tables:
//!
//! * `ReferenceCounts`: how many reference positions fall in each reference group,
//! * `ReadCounts`: for each reference + read group and coverage bucket, how many
//!   positions had that coverage, together with the observed probability and the
//!   Poisson fit of the bucket,
//! * `ReadAverages`: one row per reference + read group holding the total pile,
//!   median, average, variance and dispersion of the coverage.
//!
//! Counts are accumulated with the `increment_*` and `add_*` methods or merged from
//! other aggregators. Statistics are computed by [`CoverageAggregator::derive_statistics`]
//! and go stale as soon as counts change.

use std::path::Path;

use fxhash::FxHashMap;

use crate::consts::{
    AVERAGE_COLUMN, COUNT_COLUMN, COVERAGE_COLUMN, DISPERSION_COLUMN, EXPECTED_COLUMN,
    MEDIAN_COLUMN, POISSON_COLUMN, PROBABILITY_COLUMN, READ_AVERAGES_TABLE, READ_COUNTS_TABLE,
    REFERENCE_COUNTS_TABLE, VARIANCE_COLUMN,
};
use crate::errors::{CovStratError, Result};
use crate::index::IndexedTable;
use crate::key::{StratificationKey, Value};
use crate::report::Report;
use crate::table::{Column, ColumnFormat, ReportTable};
use crate::utils::{poisson_probability, safe_divide};

const PROBABILITY_FORMAT: ColumnFormat = ColumnFormat::Float(Some(8));

/// Derived coverage statistics of one reference + read group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupStatistics {
    pub key: StratificationKey,
    pub reference_count: i64,
    /// Sum of `coverage * count` over the group's buckets.
    pub pileup: i64,
    pub median: i64,
    pub average: f64,
    pub variance: f64,
    pub dispersion: f64,
}

/// One coverage bucket of a group, as stored in `ReadCounts`.
#[derive(Debug, Clone, Copy)]
struct Bucket {
    row: usize,
    coverage: i64,
    count: i64,
}

pub struct CoverageAggregator {
    reference_arity: usize,
    group_arity: usize,
    reference_counts: IndexedTable,
    read_counts: IndexedTable,
    read_averages: IndexedTable,
    derived: bool,
}

fn stratified_table(name: &str, columns: &[&[Column]]) -> ReportTable {
    let mut table = ReportTable::new(name, name);
    for column in columns.iter().flat_map(|c| c.iter()) {
        table.add_column(column.name.clone(), column.format);
    }
    table
}

impl CoverageAggregator {
    ///
    /// Create an empty aggregator.
    ///
    /// `reference_columns` are the columns of the stratifiers evaluated once per
    /// reference position (reference and feature stratifiers), `read_columns`
    /// those evaluated per read.
    ///
    pub fn new(reference_columns: &[Column], read_columns: &[Column]) -> Result<Self> {
        let mut reference_counts = stratified_table(REFERENCE_COUNTS_TABLE, &[reference_columns]);
        reference_counts.add_column(COUNT_COLUMN, ColumnFormat::Integer);

        let mut read_counts =
            stratified_table(READ_COUNTS_TABLE, &[reference_columns, read_columns]);
        read_counts.add_column(COVERAGE_COLUMN, ColumnFormat::Integer);
        read_counts.add_column(COUNT_COLUMN, ColumnFormat::Integer);
        read_counts.add_column(EXPECTED_COLUMN, ColumnFormat::Integer);
        read_counts.add_column(PROBABILITY_COLUMN, PROBABILITY_FORMAT);
        read_counts.add_column(POISSON_COLUMN, PROBABILITY_FORMAT);

        let mut read_averages =
            stratified_table(READ_AVERAGES_TABLE, &[reference_columns, read_columns]);
        read_averages.add_column(COUNT_COLUMN, ColumnFormat::Integer);
        read_averages.add_column(MEDIAN_COLUMN, ColumnFormat::Integer);
        read_averages.add_column(AVERAGE_COLUMN, PROBABILITY_FORMAT);
        read_averages.add_column(VARIANCE_COLUMN, PROBABILITY_FORMAT);
        read_averages.add_column(DISPERSION_COLUMN, PROBABILITY_FORMAT);

        CoverageAggregator::from_tables(read_counts, read_averages, reference_counts)
    }

    fn from_tables(
        read_counts: ReportTable,
        read_averages: ReportTable,
        reference_counts: ReportTable,
    ) -> Result<Self> {
        let reference_arity = reference_counts.require_column(COUNT_COLUMN)?;
        let group_arity = read_counts.require_column(COVERAGE_COLUMN)?;
        read_averages.require_column(COUNT_COLUMN)?;

        let reference_columns = &reference_counts.columns()[..reference_arity];
        if read_counts.columns().len() < reference_arity
            || &read_counts.columns()[..reference_arity] != reference_columns
        {
            return Err(CovStratError::SchemaMismatch {
                table: READ_COUNTS_TABLE.to_string(),
                detail: format!(
                    "reference columns of {} are not a prefix of the read count columns",
                    REFERENCE_COUNTS_TABLE
                ),
            });
        }

        Ok(CoverageAggregator {
            reference_arity,
            group_arity,
            reference_counts: IndexedTable::keyed_before(reference_counts, COUNT_COLUMN)?,
            read_counts: IndexedTable::keyed_before(read_counts, COUNT_COLUMN)?,
            read_averages: IndexedTable::keyed_before(read_averages, COUNT_COLUMN)?,
            derived: false,
        })
    }

    ///
    /// Rebuild an aggregator from a written report.
    ///
    /// The tables are recreated from the report's headers and the counts of
    /// `ReferenceCounts` and `ReadCounts` are added back through fresh indexes.
    /// Statistics must be derived again before they are used.
    ///
    pub fn from_report(report: &Report) -> Result<Self> {
        let table = |name: &str| {
            report
                .table(name)
                .ok_or_else(|| CovStratError::MissingTable(name.to_string()))
        };
        let read_counts = table(READ_COUNTS_TABLE)?;
        let read_averages = table(READ_AVERAGES_TABLE)?;
        let reference_counts = table(REFERENCE_COUNTS_TABLE)?;

        let mut aggregator = CoverageAggregator::from_tables(
            read_counts.header_copy(),
            read_averages.header_copy(),
            reference_counts.header_copy(),
        )?;
        aggregator.combine_counts(reference_counts, read_counts)?;
        aggregator.derived = false;
        Ok(aggregator)
    }

    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Reading coverage report {}", path.display());
        CoverageAggregator::from_report(&Report::read(path)?)
    }

    pub fn to_report(&self) -> Report {
        let mut report = Report::new();
        report.add_table(self.read_counts.table().clone());
        report.add_table(self.read_averages.table().clone());
        report.add_table(self.reference_counts.table().clone());
        report
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        log::debug!("Writing coverage report {}", path.display());
        self.to_report().write(path)
    }

    pub fn reference_counts(&self) -> &ReportTable {
        self.reference_counts.table()
    }

    pub fn read_counts(&self) -> &ReportTable {
        self.read_counts.table()
    }

    pub fn read_averages(&self) -> &ReportTable {
        self.read_averages.table()
    }

    /// Number of reference (and feature) key columns.
    pub fn reference_arity(&self) -> usize {
        self.reference_arity
    }

    /// Number of key columns of a reference + read group, excluding coverage.
    pub fn group_arity(&self) -> usize {
        self.group_arity
    }

    /// Columns identifying a reference + read group.
    pub fn group_columns(&self) -> &[Column] {
        &self.read_averages.table().columns()[..self.group_arity]
    }

    pub fn is_derived(&self) -> bool {
        self.derived
    }

    pub fn increment_reference(&mut self, key: &StratificationKey) -> Result<()> {
        self.add_reference_count(key, 1)
    }

    /// Counts one position of the group `key` observed at `coverage`.
    pub fn increment_read_coverage(&mut self, key: &StratificationKey, coverage: u32) -> Result<()> {
        self.add_read_coverage_count(key, coverage as i64, 1)
    }

    pub fn add_reference_count(&mut self, key: &StratificationKey, count: i64) -> Result<()> {
        let column = self.reference_arity;
        self.reference_counts.increment(key, column, count)?;
        self.derived = false;
        Ok(())
    }

    pub fn add_read_coverage_count(
        &mut self,
        key: &StratificationKey,
        coverage: i64,
        count: i64,
    ) -> Result<()> {
        let column = self.group_arity + 1;
        self.read_counts.increment(&key.with(coverage), column, count)?;
        self.derived = false;
        Ok(())
    }

    ///
    /// Add every count of `other` into this aggregator.
    ///
    /// Both count tables must have exactly the same schema. Statistics are not
    /// merged; derive them again afterwards.
    ///
    pub fn merge(&mut self, other: &CoverageAggregator) -> Result<()> {
        self.combine_counts(other.reference_counts(), other.read_counts())?;
        log::debug!(
            "Merged {} reference rows and {} read count rows",
            other.reference_counts().row_count(),
            other.read_counts().row_count()
        );
        Ok(())
    }

    fn combine_counts(&mut self, reference_counts: &ReportTable, read_counts: &ReportTable) -> Result<()> {
        self.reference_counts
            .table()
            .check_same_format(reference_counts)?;
        self.read_counts.table().check_same_format(read_counts)?;

        for row in 0..reference_counts.row_count() {
            let key = reference_counts.row_key(row, self.reference_arity)?;
            let count = reference_counts.get_count(row, self.reference_arity)?;
            self.add_reference_count(&key, count)?;
        }

        let count_column = self.group_arity + 1;
        for row in 0..read_counts.row_count() {
            let key = read_counts.row_key(row, count_column)?;
            let count = read_counts.get_count(row, count_column)?;
            self.read_counts.increment(&key, count_column, count)?;
        }
        self.derived = false;
        Ok(())
    }

    /// Coverage buckets of every group, keyed by group, highest coverage first.
    fn group_buckets(&self) -> Result<Vec<(StratificationKey, Vec<Bucket>)>> {
        let table = self.read_counts.table();
        let mut groups: FxHashMap<StratificationKey, Vec<Bucket>> = FxHashMap::default();
        for row in 0..table.row_count() {
            let group = table.row_key(row, self.group_arity)?;
            let bucket = Bucket {
                row,
                coverage: table.get_i64(row, self.group_arity)?,
                count: table.get_count(row, self.group_arity + 1)?,
            };
            groups.entry(group).or_default().push(bucket);
        }

        let mut groups: Vec<(StratificationKey, Vec<Bucket>)> = groups.into_iter().collect();
        groups.sort_by(|a, b| a.0.cmp(&b.0));
        for (_, buckets) in &mut groups {
            buckets.sort_by(|a, b| b.coverage.cmp(&a.coverage));
        }
        Ok(groups)
    }

    fn reference_totals(&self) -> Result<FxHashMap<StratificationKey, i64>> {
        let table = self.reference_counts.table();
        let mut totals = FxHashMap::default();
        for row in 0..table.row_count() {
            let key = table.row_key(row, self.reference_arity)?;
            *totals.entry(key).or_insert(0) += table.get_count(row, self.reference_arity)?;
        }
        Ok(totals)
    }

    ///
    /// Compute the per bucket probabilities and the per group statistics.
    ///
    /// For every group the zero coverage bucket is set to the reference positions
    /// not accounted for by any non-zero bucket, so that the bucket counts of a
    /// group always sum to its reference count. `ReadAverages` is rebuilt from
    /// scratch; running this twice without new counts changes nothing.
    ///
    pub fn derive_statistics(&mut self) -> Result<()> {
        let reference_totals = self.reference_totals()?;
        let groups = self.group_buckets()?;
        let mut read_averages = self.read_averages.cleared()?;

        let coverage_column = self.group_arity;
        let count_column = coverage_column + 1;
        let expected_column = coverage_column + 2;
        let probability_column = coverage_column + 3;
        let poisson_column = coverage_column + 4;

        for (group, mut buckets) in groups {
            let reference_key = group.prefix(self.reference_arity);
            let reference_count = match reference_totals.get(&reference_key) {
                Some(count) => *count,
                None => {
                    log::warn!("No reference count for group {}", group);
                    0
                }
            };

            let mut total_pile: i64 = 0;
            let mut read_base_count: i64 = 0;
            for bucket in buckets.iter().filter(|b| b.coverage != 0) {
                total_pile += bucket.count * bucket.coverage;
                read_base_count += bucket.count;
            }
            let average = safe_divide(total_pile as f64, reference_count as f64);

            // zero bucket absorbs every reference position without reads
            let zero_count = reference_count - read_base_count;
            let has_zero_row = buckets.last().is_some_and(|b| b.coverage == 0);
            if has_zero_row {
                if let Some(zero) = buckets.last_mut() {
                    zero.count = zero_count;
                }
            } else if zero_count != 0 {
                let row = self.read_counts.find_or_create_row(&group.with(0i64))?;
                buckets.push(Bucket {
                    row,
                    coverage: 0,
                    count: zero_count,
                });
            }

            let mut squared_deviation = 0.0;
            let mut median_counter = reference_count;
            let mut median = None;
            for bucket in &buckets {
                let probability = safe_divide(bucket.count as f64, reference_count as f64);
                let poisson = poisson_probability(average, bucket.coverage.max(0) as u64);
                let expected = (poisson * reference_count as f64) as i64;

                self.read_counts.set(bucket.row, count_column, bucket.count);
                self.read_counts.set(bucket.row, expected_column, expected);
                self.read_counts.set(bucket.row, probability_column, probability);
                self.read_counts.set(bucket.row, poisson_column, poisson);

                squared_deviation += bucket.count as f64 * (bucket.coverage as f64 - average).powi(2);

                median_counter -= bucket.count;
                if median.is_none() && median_counter <= reference_count / 2 {
                    median = Some(bucket.coverage);
                }
            }

            let variance = safe_divide(squared_deviation, reference_count as f64);
            let dispersion = safe_divide(variance, average);

            let row = read_averages.find_or_create_row(&group)?;
            let column = self.group_arity;
            read_averages.set(row, column, total_pile);
            read_averages.set(row, column + 1, median.unwrap_or(0));
            read_averages.set(row, column + 2, average);
            read_averages.set(row, column + 3, variance);
            read_averages.set(row, column + 4, dispersion);
        }

        log::debug!(
            "Derived statistics for {} groups",
            read_averages.table().row_count()
        );
        self.read_averages = read_averages;
        self.derived = true;
        Ok(())
    }

    /// The derived statistics of every group, in `ReadAverages` row order.
    pub fn group_statistics(&self) -> Result<Vec<GroupStatistics>> {
        if !self.derived {
            return Err(CovStratError::NotDerived);
        }
        let reference_totals = self.reference_totals()?;
        let table = self.read_averages.table();
        let column = self.group_arity;

        (0..table.row_count())
            .map(|row| {
                let key = table.row_key(row, self.group_arity)?;
                let reference_count = reference_totals
                    .get(&key.prefix(self.reference_arity))
                    .copied()
                    .unwrap_or(0);
                Ok(GroupStatistics {
                    reference_count,
                    pileup: table.get_i64(row, column)?,
                    median: table.get_i64(row, column + 1)?,
                    average: table.get_f64(row, column + 2)?,
                    variance: table.get_f64(row, column + 3)?,
                    dispersion: table.get_f64(row, column + 4)?,
                    key,
                })
            })
            .collect()
    }

    /// Probability and count of one coverage bucket, mostly for inspection.
    pub fn bucket(&self, group: &StratificationKey, coverage: i64) -> Option<(i64, f64)> {
        let row = self.read_counts.find_row(&group.with(coverage))?;
        let table = self.read_counts.table();
        let count = table.get_count(row, self.group_arity + 1).ok()?;
        let probability = table
            .get(row, self.group_arity + 3)
            .and_then(Value::as_f64)
            .unwrap_or(0.0);
        Some((count, probability))
    }
}
