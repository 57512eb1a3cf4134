//! # Stratified sequencing coverage aggregation.
//!
//! This crate accumulates per-position coverage observations into count tables
//! keyed by an arbitrary set of stratification dimensions (GC content, read group,
//! fragment length bucket, ...), derives per group statistics from them (median,
//! average, variance, dispersion and a Poisson fit), merges partial results from
//! independently processed shards and projects the fitted distributions onto a
//! different sequencing yield.
//!
//! # Example
//!
//! ```
//! use covstrat_core::{Column, ColumnFormat, CoverageAggregator, StratificationKey};
//!
//! let reference = vec![Column::new("gc_content", ColumnFormat::Float(Some(1)))];
//! let read = vec![Column::new("read_group", ColumnFormat::Text)];
//! let mut aggregator = CoverageAggregator::new(&reference, &read).unwrap();
//!
//! let mut key = StratificationKey::new();
//! key.append(40.0);
//! aggregator.increment_reference(&key).unwrap();
//! aggregator.increment_read_coverage(&key.with("rg1"), 12).unwrap();
//!
//! aggregator.derive_statistics().unwrap();
//! let stats = aggregator.group_statistics().unwrap();
//! assert_eq!(stats[0].median, 12);
//! ```
//!
pub mod aggregator;
pub mod consts;
pub mod errors;
pub mod index;
pub mod key;
pub mod prediction;
pub mod report;
pub mod stratifier;
pub mod table;
pub mod utils;

// re-exports
pub use aggregator::{CoverageAggregator, GroupStatistics};
pub use errors::{CovStratError, Result};
pub use index::{IndexedTable, RowIndex, SingleRowIndex, TrieRowIndex};
pub use key::{StratificationKey, Value};
pub use prediction::{CoveragePrediction, GroupPrediction, Predictor, SamplePrediction, predict_coverage};
pub use report::Report;
pub use stratifier::{
    BaseWindow, Stratifier, StratifierList, Windowed, bin_float, bin_float_capped, bin_integer,
    bin_integer_capped,
};
pub use table::{Column, ColumnFormat, ReportTable};
