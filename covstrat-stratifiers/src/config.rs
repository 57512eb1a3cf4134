//! Stratification settings, read from TOML.
//!
//! Every section and field is optional and falls back to the defaults below:
//!
//! ```toml
//! [gc]
//! bin = 2.0
//! leading = 50
//! trailing = 250
//!
//! [mappability]
//! track = "mappability"
//! bin = 20
//!
//! [region]
//! track = "targets"
//!
//! [prior_coverage]
//! track = "prior"
//! bin = 10
//! max = 100
//!
//! [read_group]
//! flatten = false
//! splits = 0
//! seed = 0
//!
//! [insert_size]
//! bin = 100
//! max = 600
//!
//! [strand]
//! enabled = false
//!
//! [collector]
//! min_base_quality = 20
//! coverage_cap = 250
//! ```
use std::fs::read_to_string;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use covstrat_core::consts::DEFAULT_COVERAGE_CAP;

use crate::consts::{
    DEFAULT_GC_BIN, DEFAULT_GC_LEADING, DEFAULT_GC_TRAILING, DEFAULT_INSERT_SIZE_BIN,
    DEFAULT_INSERT_SIZE_MAX, DEFAULT_MAPPABILITY_BIN, DEFAULT_MAPPABILITY_TRACK,
    DEFAULT_MIN_BASE_QUALITY, DEFAULT_REGION_LABEL,
};
use crate::errors::{Result, StratifierError};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GcConfig {
    /// Bin size in percent. Zero disables the stratifier.
    pub bin: f64,
    pub leading: u32,
    pub trailing: u32,
}

impl Default for GcConfig {
    fn default() -> Self {
        GcConfig {
            bin: DEFAULT_GC_BIN,
            leading: DEFAULT_GC_LEADING,
            trailing: DEFAULT_GC_TRAILING,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct MappabilityConfig {
    pub track: String,
    pub bin: i64,
}

impl Default for MappabilityConfig {
    fn default() -> Self {
        MappabilityConfig {
            track: DEFAULT_MAPPABILITY_TRACK.to_string(),
            bin: DEFAULT_MAPPABILITY_BIN,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RegionConfig {
    /// Track holding the labelled regions. No track, no region column.
    pub track: Option<String>,
    pub default_label: String,
}

impl Default for RegionConfig {
    fn default() -> Self {
        RegionConfig {
            track: None,
            default_label: DEFAULT_REGION_LABEL.to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PriorCoverageConfig {
    pub track: Option<String>,
    pub bin: i64,
    pub max: i64,
}

impl Default for PriorCoverageConfig {
    fn default() -> Self {
        PriorCoverageConfig {
            track: None,
            bin: 10,
            max: DEFAULT_COVERAGE_CAP as i64,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ReadGroupConfig {
    pub flatten: bool,
    /// Number of random pseudo read groups per read group, zero for none.
    pub splits: u32,
    pub seed: u64,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct InsertSizeConfig {
    pub bin: i64,
    pub max: i64,
}

impl Default for InsertSizeConfig {
    fn default() -> Self {
        InsertSizeConfig {
            bin: DEFAULT_INSERT_SIZE_BIN,
            max: DEFAULT_INSERT_SIZE_MAX,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct StrandConfig {
    pub enabled: bool,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CollectorConfig {
    /// Pileup bases below this quality are ignored.
    pub min_base_quality: u8,
    pub coverage_cap: u32,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        CollectorConfig {
            min_base_quality: DEFAULT_MIN_BASE_QUALITY,
            coverage_cap: DEFAULT_COVERAGE_CAP,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct StratificationConfig {
    pub gc: GcConfig,
    pub mappability: MappabilityConfig,
    pub region: RegionConfig,
    pub prior_coverage: PriorCoverageConfig,
    pub read_group: ReadGroupConfig,
    pub insert_size: InsertSizeConfig,
    pub strand: StrandConfig,
    pub collector: CollectorConfig,
}

impl StratificationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.collector.coverage_cap == 0 {
            return Err(StratifierError::InvalidConfig(
                "collector.coverage_cap must be positive".to_string(),
            ));
        }
        if !self.gc.bin.is_finite() {
            return Err(StratifierError::InvalidConfig(
                "gc.bin must be a finite number".to_string(),
            ));
        }
        if self.read_group.splits > 26 {
            return Err(StratifierError::InvalidConfig(format!(
                "read_group.splits must be at most 26, got {}",
                self.read_group.splits
            )));
        }
        Ok(())
    }
}

impl FromStr for StratificationConfig {
    type Err = StratifierError;

    fn from_str(s: &str) -> Result<Self> {
        let config: StratificationConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}

impl TryFrom<&Path> for StratificationConfig {
    type Error = StratifierError;

    fn try_from(path: &Path) -> Result<Self> {
        let toml_str = read_to_string(path)?;
        toml_str.parse()
    }
}
