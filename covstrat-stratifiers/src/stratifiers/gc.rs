use covstrat_core::{ColumnFormat, Stratifier, Value, bin_float};

use crate::consts::GC_CONTENT_COLUMN;

///
/// Percentage of G and C among the A, C, G and T bases of the window, binned.
///
/// Windows without any A, C, G or T bases are `unknown`. A bin size of zero or
/// less disables the stratifier.
///
#[derive(Debug, Clone)]
pub struct GcContentStratifier {
    bin: f64,
}

impl GcContentStratifier {
    pub fn new(bin: f64) -> Self {
        GcContentStratifier { bin }
    }

    /// Enough decimals to print every bin boundary, at least one.
    fn precision(&self) -> usize {
        let mut precision = 1;
        while precision < 6 {
            let scaled = self.bin * 10f64.powi(precision as i32);
            if (scaled - scaled.round()).abs() < 1e-9 {
                break;
            }
            precision += 1;
        }
        precision
    }
}

impl Stratifier<[u8]> for GcContentStratifier {
    fn column_name(&self) -> &str {
        GC_CONTENT_COLUMN
    }

    fn column_format(&self) -> ColumnFormat {
        ColumnFormat::Float(Some(self.precision()))
    }

    fn evaluate(&self, bases: &[u8]) -> Value {
        let mut at = 0u32;
        let mut gc = 0u32;
        for base in bases {
            match base.to_ascii_uppercase() {
                b'A' | b'T' => at += 1,
                b'G' | b'C' => gc += 1,
                _ => {}
            }
        }
        if at + gc == 0 {
            return Value::Unknown;
        }
        let pct = 100.0 * gc as f64 / (at + gc) as f64;
        Value::Float(bin_float(pct, self.bin))
    }

    fn is_enabled(&self) -> bool {
        self.bin > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case(b"GGCCATAT".as_slice(), Value::Float(50.0))]
    #[case(b"GCCA".as_slice(), Value::Float(74.0))]
    #[case(b"gcnnat".as_slice(), Value::Float(50.0))]
    #[case(b"NNNN".as_slice(), Value::Unknown)]
    fn test_gc_content(#[case] bases: &[u8], #[case] expected: Value) {
        let stratifier = GcContentStratifier::new(2.0);
        assert_eq!(stratifier.stratify(bases), expected);
    }

    #[rstest]
    fn test_gc_disabled_and_format() {
        assert_eq!(GcContentStratifier::new(0.0).stratify(b"GC".as_slice()), Value::Disabled);
        assert_eq!(
            GcContentStratifier::new(2.0).column_format(),
            ColumnFormat::Float(Some(1))
        );
        assert_eq!(
            GcContentStratifier::new(0.25).column_format(),
            ColumnFormat::Float(Some(2))
        );
    }
}
