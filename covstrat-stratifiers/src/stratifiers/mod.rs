//! Concrete stratifiers.
//!
//! Reference stratifiers evaluate the reference bases of their window, feature
//! stratifiers the annotations overlapping the position and read stratifiers
//! each aligned read of the pileup.

pub mod gc;
pub mod insert_size;
pub mod mappability;
pub mod prior_coverage;
pub mod read_group;
pub mod region_label;
pub mod strand;

pub use gc::GcContentStratifier;
pub use insert_size::InsertSizeStratifier;
pub use mappability::MappabilityStratifier;
pub use prior_coverage::PriorCoverageStratifier;
pub use read_group::{ReadGroupStratifier, SplitReadGroupStratifier};
pub use region_label::RegionLabelStratifier;
pub use strand::StrandOrientationStratifier;

use crate::models::Feature;

/// The first feature of `track`, if any overlaps the position.
pub(crate) fn first_of_track<'a>(features: &'a [Feature], track: &str) -> Option<&'a Feature> {
    features.iter().find(|f| f.track == track)
}
