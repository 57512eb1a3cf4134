use covstrat_core::{
    BaseWindow, Column, CoverageAggregator, StratificationKey, StratifierList, Windowed,
};

use crate::config::StratificationConfig;
use crate::errors::Result;
use crate::models::{AlignedRead, Feature, ReferenceWindow};
use crate::stratifiers::{
    GcContentStratifier, InsertSizeStratifier, MappabilityStratifier, PriorCoverageStratifier,
    ReadGroupStratifier, RegionLabelStratifier, SplitReadGroupStratifier,
    StrandOrientationStratifier,
};

///
/// The configured stratifiers, grouped by the input they evaluate.
///
/// Reference and feature values form the reference key of a position; read values
/// are appended to it per read.
///
#[derive(Debug, Default)]
pub struct StratifierPanel {
    pub reference: StratifierList<[u8]>,
    pub features: StratifierList<[Feature]>,
    pub reads: StratifierList<AlignedRead>,
}

impl StratifierPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &StratificationConfig) -> Self {
        let mut panel = StratifierPanel::new();

        panel.reference.push(Windowed::new(
            GcContentStratifier::new(config.gc.bin),
            BaseWindow::new(config.gc.leading, config.gc.trailing),
        ));

        panel.features.push(MappabilityStratifier::new(
            config.mappability.track.clone(),
            config.mappability.bin,
        ));
        if let Some(track) = &config.region.track {
            panel.features.push(RegionLabelStratifier::with_default(
                track.clone(),
                true,
                config.region.default_label.clone(),
            ));
        }
        if let Some(track) = &config.prior_coverage.track {
            panel.features.push(PriorCoverageStratifier::new(
                track.clone(),
                config.prior_coverage.bin,
                config.prior_coverage.max,
            ));
        }

        let read_group = ReadGroupStratifier::new(config.read_group.flatten);
        if config.read_group.splits > 0 {
            panel.reads.push(SplitReadGroupStratifier::new(
                read_group,
                config.read_group.splits,
                config.read_group.seed,
            ));
        } else {
            panel.reads.push(read_group);
        }
        panel.reads.push(InsertSizeStratifier::new(
            config.insert_size.bin,
            config.insert_size.max,
        ));
        if config.strand.enabled {
            panel.reads.push(StrandOrientationStratifier::new(true));
        }

        panel
    }

    /// Columns of the reference key: reference stratifiers, then feature stratifiers.
    pub fn reference_columns(&self) -> Vec<Column> {
        let mut columns = self.reference.columns();
        columns.extend(self.features.columns());
        columns
    }

    pub fn read_columns(&self) -> Vec<Column> {
        self.reads.columns()
    }

    /// An empty aggregator with this panel's columns.
    pub fn aggregator(&self) -> Result<CoverageAggregator> {
        Ok(CoverageAggregator::new(
            &self.reference_columns(),
            &self.read_columns(),
        )?)
    }

    /// Reference context the traversal must provide around each position.
    pub fn reference_window(&self) -> BaseWindow {
        self.reference.window()
    }

    pub fn reference_key(
        &self,
        reference: &ReferenceWindow,
        features: &[Feature],
    ) -> StratificationKey {
        let mut key =
            StratificationKey::with_capacity(self.reference.len() + self.features.len());
        for stratifier in self.reference.iter() {
            let bases = reference.slice(stratifier.window().unwrap_or_default());
            key.append(stratifier.stratify(bases));
        }
        self.features.stratify_into(features, &mut key);
        key
    }

    /// The reference key extended with the read stratifier values of `read`.
    pub fn read_key(&self, reference_key: &StratificationKey, read: &AlignedRead) -> StratificationKey {
        let mut key = reference_key.clone();
        self.reads.stratify_into(read, &mut key);
        key
    }
}
