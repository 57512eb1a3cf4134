use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use covstrat_core::{ColumnFormat, Stratifier, Value};

use crate::consts::READ_GROUP_COLUMN;
use crate::models::AlignedRead;

/// The read group of each read. Flattening collapses all read groups into one.
#[derive(Debug, Clone)]
pub struct ReadGroupStratifier {
    flatten: bool,
}

impl ReadGroupStratifier {
    pub fn new(flatten: bool) -> Self {
        ReadGroupStratifier { flatten }
    }
}

impl Stratifier<AlignedRead> for ReadGroupStratifier {
    fn column_name(&self) -> &str {
        READ_GROUP_COLUMN
    }

    fn column_format(&self) -> ColumnFormat {
        ColumnFormat::Text
    }

    fn evaluate(&self, read: &AlignedRead) -> Value {
        match &read.read_group {
            Some(read_group) => Value::from(read_group.as_str()),
            None => Value::Unknown,
        }
    }

    fn is_enabled(&self) -> bool {
        !self.flatten
    }
}

///
/// Splits every read group into `splits` pseudo read groups by prefixing a random
/// letter, `A-rg1`, `B-rg1`, ... Used to check that coverage statistics are
/// stable when a sample is divided at random.
///
/// The generator is seeded explicitly so runs are reproducible.
///
#[derive(Debug)]
pub struct SplitReadGroupStratifier {
    inner: ReadGroupStratifier,
    splits: u32,
    rng: Mutex<StdRng>,
}

impl SplitReadGroupStratifier {
    pub fn new(inner: ReadGroupStratifier, splits: u32, seed: u64) -> Self {
        SplitReadGroupStratifier {
            inner,
            splits,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn next_split(&self) -> u32 {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.random_range(0..self.splits)
    }
}

impl Stratifier<AlignedRead> for SplitReadGroupStratifier {
    fn column_name(&self) -> &str {
        self.inner.column_name()
    }

    fn column_format(&self) -> ColumnFormat {
        self.inner.column_format()
    }

    fn evaluate(&self, read: &AlignedRead) -> Value {
        let read_group = self.inner.evaluate(read);
        if self.splits == 0 {
            return read_group;
        }
        let prefix = char::from_u32(u32::from(b'A') + self.next_split()).unwrap_or('?');
        Value::from(format!("{}-{}", prefix, read_group))
    }

    fn is_enabled(&self) -> bool {
        self.inner.is_enabled()
    }
}
