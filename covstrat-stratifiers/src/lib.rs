//! Concrete stratifiers and the locus collector for covstrat.
//!
//! This crate provides the stratification dimensions used on whole genome
//! sequencing data and the glue that turns a genome traversal into counts:
//!
//! - Reference stratifiers: GC content of a window around the position
//! - Feature stratifiers: mappability score, region label and prior coverage
//! - Read stratifiers: read group (optionally split at random), insert size and
//!   strand orientation
//! - [`StratifierPanel`], built from a TOML [`StratificationConfig`]
//! - [`CoverageCollector`], which evaluates a panel at every locus and feeds a
//!   coverage aggregator
//!
//! # Example
//!
//! ```
//! use covstrat_stratifiers::{CoverageCollector, Locus, ReferenceWindow, StratificationConfig};
//!
//! let config = StratificationConfig::default();
//! let mut collector = CoverageCollector::from_config(&config).unwrap();
//!
//! let contig = b"ACGTTGCAACGT";
//! let window = collector.panel().reference_window();
//! let reference = ReferenceWindow::from_contig(contig, 4, window).unwrap();
//! let locus = Locus { contig: "chr1", position: 4, reference: &reference, features: &[], pileup: &[] };
//! collector.apply(&locus).unwrap();
//!
//! let aggregator = collector.finish().unwrap();
//! assert_eq!(aggregator.reference_counts().row_count(), 1);
//! ```
pub mod collector;
pub mod config;
pub mod consts;
pub mod errors;
pub mod models;
pub mod panel;
pub mod stratifiers;

// re-exports
pub use collector::CoverageCollector;
pub use config::StratificationConfig;
pub use errors::{Result, StratifierError};
pub use models::{AlignedRead, Feature, Locus, PileupElement, ReferenceWindow};
pub use panel::StratifierPanel;
