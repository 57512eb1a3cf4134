use covstrat_core::{ColumnFormat, Stratifier, Value};

use super::first_of_track;
use crate::consts::{DEFAULT_REGION_LABEL, REGION_COLUMN};
use crate::models::Feature;

/// Name of the first region of a track covering the position.
#[derive(Debug, Clone)]
pub struct RegionLabelStratifier {
    track: String,
    default_label: String,
    enabled: bool,
}

impl RegionLabelStratifier {
    pub fn new<S: Into<String>>(track: S, enabled: bool) -> Self {
        RegionLabelStratifier::with_default(track, enabled, DEFAULT_REGION_LABEL)
    }

    /// Label positions outside every region with `default_label`.
    pub fn with_default<S: Into<String>, D: Into<String>>(
        track: S,
        enabled: bool,
        default_label: D,
    ) -> Self {
        RegionLabelStratifier {
            track: track.into(),
            default_label: default_label.into(),
            enabled,
        }
    }
}

impl Stratifier<[Feature]> for RegionLabelStratifier {
    fn column_name(&self) -> &str {
        REGION_COLUMN
    }

    fn column_format(&self) -> ColumnFormat {
        ColumnFormat::Text
    }

    fn evaluate(&self, features: &[Feature]) -> Value {
        match first_of_track(features, &self.track) {
            None => Value::from(self.default_label.as_str()),
            Some(feature) => match &feature.name {
                Some(name) => Value::from(name.as_str()),
                None => Value::Unknown,
            },
        }
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_region_label() {
        let stratifier = RegionLabelStratifier::new("targets", true);
        let features = vec![
            Feature::new("mappability").with_score(0.5),
            Feature::new("targets").with_name("exon_12"),
        ];
        assert_eq!(stratifier.stratify(features.as_slice()), Value::from("exon_12"));
        assert_eq!(stratifier.stratify(&features[..1]), Value::from("default"));
    }

    #[rstest]
    fn test_region_label_disabled() {
        let stratifier = RegionLabelStratifier::with_default("targets", false, "offtarget");
        let features = vec![Feature::new("targets").with_name("exon_12")];
        assert_eq!(stratifier.stratify(features.as_slice()), Value::Disabled);
    }
}
