//! Keyed row lookup for report tables.
//!
//! Rows are addressed by the values of their leading key columns. Lookup walks
//! one index level per key position, so finding or creating a row costs O(key
//! arity) regardless of how many rows the table holds.

use fxhash::FxHashMap;

use crate::errors::{CovStratError, Result};
use crate::key::{StratificationKey, Value};
use crate::table::ReportTable;

pub trait RowIndex: Send + Sync {
    ///
    /// Returns the row whose key columns hold `key`. If no such row exists a new
    /// row is added to `table`, its key cells are filled in and the row is cached.
    ///
    fn find_or_create_row(&mut self, table: &mut ReportTable, key: &[Value]) -> Result<usize>;

    /// The row holding `key`, without adding one. Keys of the wrong arity match nothing.
    fn find_row(&self, key: &[Value]) -> Option<usize>;

    /// Number of leading columns forming the key.
    fn key_arity(&self) -> usize;
}

fn check_arity(table: &ReportTable, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(CovStratError::KeyArity {
            table: table.name().to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}

/// Index over a table without key columns: it holds at most one row.
#[derive(Debug, Default)]
pub struct SingleRowIndex {
    row: Option<usize>,
}

impl SingleRowIndex {
    pub fn new(table: &ReportTable) -> Result<Self> {
        match table.row_count() {
            0 => Ok(SingleRowIndex { row: None }),
            1 => Ok(SingleRowIndex { row: Some(0) }),
            rows => Err(CovStratError::SingleRowTable {
                table: table.name().to_string(),
                rows,
            }),
        }
    }
}

impl RowIndex for SingleRowIndex {
    fn find_or_create_row(&mut self, table: &mut ReportTable, key: &[Value]) -> Result<usize> {
        check_arity(table, 0, key.len())?;
        Ok(*self.row.get_or_insert_with(|| table.add_row()))
    }

    fn find_row(&self, key: &[Value]) -> Option<usize> {
        if key.is_empty() {
            self.row
        } else {
            None
        }
    }

    fn key_arity(&self) -> usize {
        0
    }
}

///
/// Trie of hash maps stored in an arena. Node `0` is the root; every node at
/// depth `d < arity - 1` maps a key value to the handle of a child node, and the
/// nodes at the last level map a key value to a row index.
///
#[derive(Debug)]
pub struct TrieRowIndex {
    key_arity: usize,
    nodes: Vec<FxHashMap<Value, usize>>,
}

impl TrieRowIndex {
    /// Index every existing row of `table` on its first `key_arity` columns.
    pub fn new(table: &ReportTable, key_arity: usize) -> Result<Self> {
        if key_arity == 0 || key_arity > table.column_count() {
            return Err(CovStratError::KeyArity {
                table: table.name().to_string(),
                expected: table.column_count(),
                actual: key_arity,
            });
        }
        let mut index = TrieRowIndex {
            key_arity,
            nodes: vec![FxHashMap::default()],
        };
        for row in 0..table.row_count() {
            let key = table.row_key(row, key_arity)?;
            let leaf = index.leaf_for(key.values());
            // a duplicate key keeps the first row
            index.nodes[leaf]
                .entry(key.values()[key_arity - 1].clone())
                .or_insert(row);
        }
        Ok(index)
    }

    /// Walks, and creates, the inner levels for `key` and returns the leaf handle.
    fn leaf_for(&mut self, key: &[Value]) -> usize {
        let mut node = 0;
        for value in &key[..self.key_arity - 1] {
            node = match self.nodes[node].get(value) {
                Some(&child) => child,
                None => {
                    let child = self.nodes.len();
                    self.nodes.push(FxHashMap::default());
                    self.nodes[node].insert(value.clone(), child);
                    child
                }
            };
        }
        node
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

impl RowIndex for TrieRowIndex {
    fn find_or_create_row(&mut self, table: &mut ReportTable, key: &[Value]) -> Result<usize> {
        check_arity(table, self.key_arity, key.len())?;
        let leaf = self.leaf_for(key);
        let last = &key[self.key_arity - 1];
        if let Some(&row) = self.nodes[leaf].get(last) {
            return Ok(row);
        }
        let row = table.add_row();
        for (column, value) in key.iter().enumerate() {
            table.set(row, column, value.clone());
        }
        self.nodes[leaf].insert(last.clone(), row);
        Ok(row)
    }

    fn find_row(&self, key: &[Value]) -> Option<usize> {
        if key.len() != self.key_arity {
            return None;
        }
        let mut node = 0;
        for value in &key[..self.key_arity - 1] {
            node = *self.nodes[node].get(value)?;
        }
        self.nodes[node].get(&key[self.key_arity - 1]).copied()
    }

    fn key_arity(&self) -> usize {
        self.key_arity
    }
}

/// Builds the index matching `key_arity`: single row for zero, trie otherwise.
pub fn build_index(table: &ReportTable, key_arity: usize) -> Result<Box<dyn RowIndex>> {
    if key_arity == 0 {
        Ok(Box::new(SingleRowIndex::new(table)?))
    } else {
        Ok(Box::new(TrieRowIndex::new(table, key_arity)?))
    }
}

///
/// A report table together with the index over its key columns.
///
pub struct IndexedTable {
    table: ReportTable,
    index: Box<dyn RowIndex>,
}

impl IndexedTable {
    pub fn new(table: ReportTable, key_arity: usize) -> Result<Self> {
        let index = build_index(&table, key_arity)?;
        Ok(IndexedTable { table, index })
    }

    /// Index a table on the columns before `column`, typically the `count` column.
    pub fn keyed_before(table: ReportTable, column: &str) -> Result<Self> {
        let key_arity = table.require_column(column)?;
        IndexedTable::new(table, key_arity)
    }

    pub fn table(&self) -> &ReportTable {
        &self.table
    }

    pub fn into_table(self) -> ReportTable {
        self.table
    }

    pub fn key_arity(&self) -> usize {
        self.index.key_arity()
    }

    pub fn find_or_create_row(&mut self, key: &StratificationKey) -> Result<usize> {
        self.index.find_or_create_row(&mut self.table, key.values())
    }

    pub fn find_row(&self, key: &StratificationKey) -> Option<usize> {
        self.index.find_row(key.values())
    }

    pub fn set<V: Into<Value>>(&mut self, row: usize, column: usize, value: V) {
        self.table.set(row, column, value);
    }

    /// Adds `amount` to an integer column of the row for `key`, creating the row.
    pub fn increment(&mut self, key: &StratificationKey, column: usize, amount: i64) -> Result<()> {
        let row = self.find_or_create_row(key)?;
        let current = self.table.get_count(row, column)?;
        self.table.set(row, column, current + amount);
        Ok(())
    }

    /// A fresh table with the same header and key arity, dropping all rows.
    pub fn cleared(&self) -> Result<Self> {
        IndexedTable::new(self.table.header_copy(), self.key_arity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    use crate::table::ColumnFormat;

    #[fixture]
    fn table() -> ReportTable {
        let mut table = ReportTable::new("ReadCounts", "ReadCounts");
        table.add_column("gc_content", ColumnFormat::Float(Some(1)));
        table.add_column("read_group", ColumnFormat::Text);
        table.add_column("coverage", ColumnFormat::Integer);
        table.add_column("count", ColumnFormat::Integer);
        table
    }

    fn key(gc: f64, rg: &str, coverage: i64) -> StratificationKey {
        StratificationKey::from(vec![Value::Float(gc), Value::from(rg), Value::Int(coverage)])
    }

    #[rstest]
    fn test_find_or_create_is_stable(table: ReportTable) {
        let mut indexed = IndexedTable::keyed_before(table, "count").unwrap();
        let a = indexed.find_or_create_row(&key(40.0, "rg1", 3)).unwrap();
        let b = indexed.find_or_create_row(&key(40.0, "rg1", 4)).unwrap();
        let c = indexed.find_or_create_row(&key(40.0, "rg1", 3)).unwrap();

        assert_eq!(a, 0);
        assert_eq!(b, 1);
        assert_eq!(c, a);
        assert_eq!(indexed.table().row_count(), 2);
        assert_eq!(indexed.table().get(1, 2), Some(&Value::Int(4)));
    }

    #[rstest]
    fn test_find_row_does_not_create(table: ReportTable) {
        let mut indexed = IndexedTable::keyed_before(table, "count").unwrap();
        let row = indexed.find_or_create_row(&key(40.0, "rg1", 3)).unwrap();

        assert_eq!(indexed.find_row(&key(40.0, "rg1", 3)), Some(row));
        assert_eq!(indexed.find_row(&key(40.0, "rg2", 3)), None);
        assert_eq!(indexed.find_row(&key(42.0, "rg1", 3)), None);
        assert_eq!(indexed.find_row(&StratificationKey::from(vec![Value::Float(40.0)])), None);
        assert_eq!(indexed.table().row_count(), 1);
    }

    #[rstest]
    fn test_index_existing_rows(table: ReportTable) {
        let mut table = table;
        let row = table.add_row();
        table.set(row, 0, 42.0);
        table.set(row, 1, "rg2");
        table.set(row, 2, 7i64);
        table.set(row, 3, 11i64);

        let mut indexed = IndexedTable::keyed_before(table, "count").unwrap();
        assert_eq!(indexed.find_or_create_row(&key(42.0, "rg2", 7)).unwrap(), 0);
        indexed.increment(&key(42.0, "rg2", 7), 3, 1).unwrap();
        assert_eq!(indexed.table().get(0, 3), Some(&Value::Int(12)));
    }

    #[rstest]
    fn test_key_arity_error_names_table(table: ReportTable) {
        let mut indexed = IndexedTable::keyed_before(table, "count").unwrap();
        let short = StratificationKey::from(vec![Value::Float(40.0)]);
        let err = indexed.find_or_create_row(&short).unwrap_err();
        assert!(matches!(
            err,
            CovStratError::KeyArity { ref table, expected: 3, actual: 1 } if table == "ReadCounts"
        ));
    }

    #[rstest]
    fn test_empty_key_cells_cannot_be_indexed(table: ReportTable) {
        let mut table = table;
        table.add_row();
        assert!(IndexedTable::keyed_before(table, "count").is_err());
    }

    #[rstest]
    fn test_single_row_index() {
        let mut table = ReportTable::new("Totals", "Totals");
        table.add_column("count", ColumnFormat::Integer);
        let mut indexed = IndexedTable::keyed_before(table, "count").unwrap();

        let empty = StratificationKey::new();
        indexed.increment(&empty, 0, 2).unwrap();
        indexed.increment(&empty, 0, 3).unwrap();
        assert_eq!(indexed.table().row_count(), 1);
        assert_eq!(indexed.table().get(0, 0), Some(&Value::Int(5)));

        let mut crowded = indexed.table().header_copy();
        crowded.add_row();
        crowded.add_row();
        assert!(matches!(
            SingleRowIndex::new(&crowded),
            Err(CovStratError::SingleRowTable { rows: 2, .. })
        ));
    }

    #[rstest]
    fn test_trie_shares_prefix_nodes(table: ReportTable) {
        let mut table = table;
        let mut index = TrieRowIndex::new(&table, 3).unwrap();
        for coverage in 0..10 {
            index
                .find_or_create_row(&mut table, key(40.0, "rg1", coverage).values())
                .unwrap();
        }
        // root, gc level and read group level
        assert_eq!(index.node_count(), 3);
        assert_eq!(table.row_count(), 10);
    }
}
