pub const READ_COUNTS_TABLE: &str = "ReadCounts";
pub const READ_AVERAGES_TABLE: &str = "ReadAverages";
pub const REFERENCE_COUNTS_TABLE: &str = "ReferenceCounts";
pub const PREDICTIONS_TABLE: &str = "Predictions";
pub const PREDICTION_SUMMARY_TABLE: &str = "PredictionSummary";

pub const COVERAGE_COLUMN: &str = "coverage";
pub const COUNT_COLUMN: &str = "count";
pub const PROBABILITY_COLUMN: &str = "probability";
pub const EXPECTED_COLUMN: &str = "expected";
pub const POISSON_COLUMN: &str = "poisson";
pub const AVERAGE_COLUMN: &str = "average";
pub const MEDIAN_COLUMN: &str = "median";
pub const VARIANCE_COLUMN: &str = "variance";
pub const DISPERSION_COLUMN: &str = "dispersion";

pub const INPUT_COLUMN: &str = "input";
pub const REFERENCE_COUNT_COLUMN: &str = "reference_count";
pub const PREDICTED_PILEUP_COLUMN: &str = "predicted_pileup";
pub const PREDICTED_AVERAGE_COLUMN: &str = "predicted_average";
pub const ORIGINAL_PILEUP_COLUMN: &str = "original_pileup";
pub const ORIGINAL_AVERAGE_COLUMN: &str = "original_average";
pub const SCALE_COLUMN: &str = "scale";
pub const RESIDUAL_COLUMN: &str = "residual";

/// Input label used for the prediction averaged across all samples.
pub const AVERAGE_INPUT: &str = "-average-";

pub const DISABLED_LABEL: &str = "disabled";
pub const UNKNOWN_LABEL: &str = "unknown";
pub const NULL_CELL: &str = "null";

/// Reads beyond this depth at one position are counted in the cap bucket.
pub const DEFAULT_COVERAGE_CAP: u32 = 250;

pub const REPORT_HEADER: &str = "#:covstrat.report.v1";
pub const TABLE_HEADER: &str = "#:table";
pub const FORMATS_HEADER: &str = "#:formats";
