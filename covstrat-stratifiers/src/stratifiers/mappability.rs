use covstrat_core::{ColumnFormat, Stratifier, Value, bin_integer};

use super::first_of_track;
use crate::consts::MAPPABILITY_COLUMN;
use crate::models::Feature;

///
/// Mappability score of the first feature of a track, as a binned percentage.
///
/// Positions without a feature, or whose feature has no score, are `unknown`.
///
#[derive(Debug, Clone)]
pub struct MappabilityStratifier {
    track: String,
    bin: i64,
}

impl MappabilityStratifier {
    pub fn new<S: Into<String>>(track: S, bin: i64) -> Self {
        MappabilityStratifier {
            track: track.into(),
            bin,
        }
    }
}

impl Stratifier<[Feature]> for MappabilityStratifier {
    fn column_name(&self) -> &str {
        MAPPABILITY_COLUMN
    }

    fn column_format(&self) -> ColumnFormat {
        ColumnFormat::Integer
    }

    fn evaluate(&self, features: &[Feature]) -> Value {
        match first_of_track(features, &self.track).and_then(|f| f.score) {
            Some(score) if !score.is_nan() => {
                let pct = (100.0 * score as f64).floor() as i64;
                Value::Int(bin_integer(pct, self.bin))
            }
            _ => Value::Unknown,
        }
    }

    fn is_enabled(&self) -> bool {
        self.bin > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case(vec![Feature::new("mappability").with_score(0.87)], Value::Int(80))]
    #[case(vec![Feature::new("mappability").with_score(1.0)], Value::Int(100))]
    #[case(vec![Feature::new("mappability").with_score(f32::NAN)], Value::Unknown)]
    #[case(vec![Feature::new("mappability")], Value::Unknown)]
    #[case(vec![Feature::new("other").with_score(0.5)], Value::Unknown)]
    #[case(vec![], Value::Unknown)]
    fn test_mappability(#[case] features: Vec<Feature>, #[case] expected: Value) {
        let stratifier = MappabilityStratifier::new("mappability", 20);
        assert_eq!(stratifier.stratify(features.as_slice()), expected);
    }

    #[rstest]
    fn test_first_feature_wins() {
        let features = vec![
            Feature::new("mappability").with_score(0.15),
            Feature::new("mappability").with_score(0.95),
        ];
        let stratifier = MappabilityStratifier::new("mappability", 20);
        assert_eq!(stratifier.stratify(features.as_slice()), Value::Int(0));
    }
}
