use std::io;
use thiserror::Error;

/// Error type for covstrat-core operations.
#[derive(Error, Debug)]
pub enum CovStratError {
    /// A key did not match the arity of the table it indexes.
    #[error("Key must be length {expected} for indexing in {table}, instead got {actual}")]
    KeyArity {
        table: String,
        expected: usize,
        actual: usize,
    },

    /// Two tables that must share a schema do not.
    #[error("Tables are not the same format: {table}: {detail}")]
    SchemaMismatch { table: String, detail: String },

    #[error("Report is missing table: {0}")]
    MissingTable(String),

    #[error("Table {table} is missing column: {column}")]
    MissingColumn { table: String, column: String },

    #[error("Table {table} has {rows} rows and cannot be indexed as a single row table")]
    SingleRowTable { table: String, rows: usize },

    /// A cell needed for a key or a count was empty or of the wrong type.
    #[error("Invalid cell in table {table} at row {row}, column {column}")]
    InvalidCell {
        table: String,
        row: usize,
        column: String,
    },

    #[error("Malformed report at line {line}: {reason}")]
    MalformedReport { line: usize, reason: String },

    #[error("Invalid column format: {0}")]
    InvalidColumnFormat(String),

    /// Statistics were requested before `derive_statistics` ran on the current counts.
    #[error("Aggregate statistics have not been derived for the current counts")]
    NotDerived,

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Result type alias for covstrat-core operations.
pub type Result<T> = std::result::Result<T, CovStratError>;
