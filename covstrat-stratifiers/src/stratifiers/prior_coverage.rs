use covstrat_core::{ColumnFormat, Stratifier, Value, bin_integer_capped};

use super::first_of_track;
use crate::consts::PRIOR_COVERAGE_COLUMN;
use crate::models::Feature;

///
/// Depth previously observed at the site (the `DP` of the first variant record of
/// a track), binned and capped.
///
#[derive(Debug, Clone)]
pub struct PriorCoverageStratifier {
    track: String,
    bin: i64,
    max: i64,
}

impl PriorCoverageStratifier {
    pub fn new<S: Into<String>>(track: S, bin: i64, max: i64) -> Self {
        PriorCoverageStratifier {
            track: track.into(),
            bin,
            max,
        }
    }
}

impl Stratifier<[Feature]> for PriorCoverageStratifier {
    fn column_name(&self) -> &str {
        PRIOR_COVERAGE_COLUMN
    }

    fn column_format(&self) -> ColumnFormat {
        ColumnFormat::Integer
    }

    fn evaluate(&self, features: &[Feature]) -> Value {
        match first_of_track(features, &self.track).and_then(|f| f.depth) {
            Some(depth) => Value::Int(bin_integer_capped(depth, self.bin, self.max)),
            None => Value::Unknown,
        }
    }

    fn is_enabled(&self) -> bool {
        self.bin > 0 && self.max > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case(Some(37), Value::Int(30))]
    #[case(Some(512), Value::Int(100))]
    #[case(None, Value::Unknown)]
    fn test_prior_coverage(#[case] depth: Option<i64>, #[case] expected: Value) {
        let stratifier = PriorCoverageStratifier::new("prior", 10, 100);
        let mut feature = Feature::new("prior");
        feature.depth = depth;
        assert_eq!(stratifier.stratify(&[feature][..]), expected);
    }

    #[rstest]
    fn test_prior_coverage_disabled_without_cap() {
        let stratifier = PriorCoverageStratifier::new("prior", 10, 0);
        let features = vec![Feature::new("prior").with_depth(40)];
        assert_eq!(stratifier.stratify(features.as_slice()), Value::Disabled);
    }
}
