use covstrat_core::{ColumnFormat, Stratifier, Value};

use crate::consts::STRAND_COLUMN;
use crate::models::AlignedRead;

/// Strand and mate of each read: `F1`, `F2`, `R1` or `R2`.
#[derive(Debug, Clone)]
pub struct StrandOrientationStratifier {
    enabled: bool,
}

impl StrandOrientationStratifier {
    pub fn new(enabled: bool) -> Self {
        StrandOrientationStratifier { enabled }
    }
}

impl Stratifier<AlignedRead> for StrandOrientationStratifier {
    fn column_name(&self) -> &str {
        STRAND_COLUMN
    }

    fn column_format(&self) -> ColumnFormat {
        ColumnFormat::Text
    }

    fn evaluate(&self, read: &AlignedRead) -> Value {
        let label = match (read.reverse_strand, read.first_of_pair) {
            (false, true) => "F1",
            (false, false) => "F2",
            (true, true) => "R1",
            (true, false) => "R2",
        };
        Value::from(label)
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}
