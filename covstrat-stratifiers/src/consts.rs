pub const GC_CONTENT_COLUMN: &str = "gc_content";
pub const MAPPABILITY_COLUMN: &str = "mappability";
pub const REGION_COLUMN: &str = "region";
pub const PRIOR_COVERAGE_COLUMN: &str = "pcov";
pub const READ_GROUP_COLUMN: &str = "read_group";
pub const INSERT_LENGTH_COLUMN: &str = "insert_length";
pub const STRAND_COLUMN: &str = "strand";

pub const DEPTH_HISTOGRAM_TABLE: &str = "DepthHistogram";

/// Label of positions outside every region of the region track.
pub const DEFAULT_REGION_LABEL: &str = "default";

pub const DEFAULT_GC_BIN: f64 = 2.0;
pub const DEFAULT_GC_LEADING: u32 = 50;
pub const DEFAULT_GC_TRAILING: u32 = 250;
pub const DEFAULT_MAPPABILITY_TRACK: &str = "mappability";
pub const DEFAULT_MAPPABILITY_BIN: i64 = 20;
pub const DEFAULT_INSERT_SIZE_BIN: i64 = 100;
pub const DEFAULT_INSERT_SIZE_MAX: i64 = 600;
pub const DEFAULT_MIN_BASE_QUALITY: u8 = 20;
