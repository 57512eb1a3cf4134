use covstrat_core::{ColumnFormat, Stratifier, Value, bin_integer_capped};

use crate::consts::INSERT_LENGTH_COLUMN;
use crate::models::AlignedRead;

/// Absolute fragment length of each read, binned and capped.
#[derive(Debug, Clone)]
pub struct InsertSizeStratifier {
    bin: i64,
    max: i64,
}

impl InsertSizeStratifier {
    pub fn new(bin: i64, max: i64) -> Self {
        InsertSizeStratifier { bin, max }
    }
}

impl Stratifier<AlignedRead> for InsertSizeStratifier {
    fn column_name(&self) -> &str {
        INSERT_LENGTH_COLUMN
    }

    fn column_format(&self) -> ColumnFormat {
        ColumnFormat::Integer
    }

    fn evaluate(&self, read: &AlignedRead) -> Value {
        Value::Int(bin_integer_capped(read.fragment_length.abs(), self.bin, self.max))
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
    #[case(0, 0)]
    #[case(349, 300)]
    #[case(-349, 300)]
    #[case(5000, 600)]
    fn test_insert_size(#[case] fragment_length: i64, #[case] expected: i64) {
        let read = AlignedRead {
            fragment_length,
            ..Default::default()
        };
        let stratifier = InsertSizeStratifier::new(100, 600);
        assert_eq!(stratifier.stratify(&read), Value::Int(expected));
    }
}
