//! Per position adapter between a genome traversal and a coverage aggregator.

use fxhash::{FxHashMap, FxHashSet};

use covstrat_core::{ColumnFormat, CoverageAggregator, ReportTable, StratificationKey};

use crate::config::{CollectorConfig, StratificationConfig};
use crate::consts::DEPTH_HISTOGRAM_TABLE;
use crate::errors::Result;
use crate::models::Locus;
use crate::panel::StratifierPanel;

///
/// Feeds one locus at a time into a [`CoverageAggregator`].
///
/// For every position with a defined reference base the collector
///
/// 1. counts the position once under its reference key,
/// 2. groups the pileup reads passing the base quality filter by their read key
///    and counts the position once per group at the group's (capped) read count,
/// 3. records the number of distinct read names, capped, in the depth histogram.
///
pub struct CoverageCollector {
    panel: StratifierPanel,
    aggregator: CoverageAggregator,
    min_base_quality: u8,
    coverage_cap: u32,
    depth_histogram: Vec<u64>,
    skipped: u64,
}

impl CoverageCollector {
    pub fn new(panel: StratifierPanel, settings: &CollectorConfig) -> Result<Self> {
        let aggregator = panel.aggregator()?;
        Ok(CoverageCollector {
            panel,
            aggregator,
            min_base_quality: settings.min_base_quality,
            coverage_cap: settings.coverage_cap,
            depth_histogram: vec![0; settings.coverage_cap as usize + 1],
            skipped: 0,
        })
    }

    pub fn from_config(config: &StratificationConfig) -> Result<Self> {
        config.validate()?;
        CoverageCollector::new(StratifierPanel::from_config(config), &config.collector)
    }

    pub fn panel(&self) -> &StratifierPanel {
        &self.panel
    }

    pub fn aggregator(&self) -> &CoverageAggregator {
        &self.aggregator
    }

    /// Positions skipped because their reference base was undefined.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    pub fn apply(&mut self, locus: &Locus) -> Result<()> {
        if locus.reference.center_base().eq_ignore_ascii_case(&b'N') {
            self.skipped += 1;
            return Ok(());
        }

        let passing = locus
            .pileup
            .iter()
            .filter(|element| element.base_quality >= self.min_base_quality);

        let reference_key = self.panel.reference_key(locus.reference, locus.features);

        let mut read_names: FxHashSet<&str> = FxHashSet::default();
        let mut groups: Vec<StratificationKey> = Vec::new();
        let mut group_counts: FxHashMap<StratificationKey, u32> = FxHashMap::default();
        for element in passing {
            read_names.insert(element.read.name.as_str());
            let key = self.panel.read_key(&reference_key, &element.read);
            let count = group_counts.entry(key).or_insert_with_key(|key| {
                groups.push(key.clone());
                0
            });
            *count += 1;
        }

        for key in &groups {
            let count = group_counts.get(key).copied().unwrap_or_default();
            self.aggregator
                .increment_read_coverage(key, count.min(self.coverage_cap))?;
        }
        self.aggregator.increment_reference(&reference_key)?;

        let depth = (read_names.len() as u32).min(self.coverage_cap);
        self.depth_histogram[depth as usize] += 1;

        log::trace!(
            "{}:{} depth {} in {} read groups",
            locus.contig,
            locus.position,
            depth,
            groups.len()
        );
        Ok(())
    }

    /// Number of positions per distinct read depth, index is the depth.
    pub fn depth_histogram(&self) -> &[u64] {
        &self.depth_histogram
    }

    /// The depth histogram as a `coverage`/`count` table, empty depths omitted.
    pub fn histogram_table(&self) -> ReportTable {
        let mut table = ReportTable::new(DEPTH_HISTOGRAM_TABLE, DEPTH_HISTOGRAM_TABLE);
        table.add_column("coverage", ColumnFormat::Integer);
        table.add_column("count", ColumnFormat::Integer);
        for (depth, count) in self.depth_histogram.iter().enumerate() {
            if *count > 0 {
                let row = table.add_row();
                table.set(row, 0, depth as i64);
                table.set(row, 1, *count);
            }
        }
        table
    }

    /// Derive statistics and hand over the aggregator.
    pub fn finish(mut self) -> Result<CoverageAggregator> {
        self.aggregator.derive_statistics()?;
        log::info!(
            "Collected {} reference rows, skipped {} undefined positions",
            self.aggregator.reference_counts().row_count(),
            self.skipped
        );
        Ok(self.aggregator)
    }
}
