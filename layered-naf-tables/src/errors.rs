//! Error types for table conversion.
//!
//! Anything that reaches a [`TableError`] aborts the conversion of the
//! current file. Recoverable conditions are reported as
//! [`Diagnostic`](crate::Diagnostic)s instead.

use thiserror::Error;

/// Errors that can occur while converting documents into tables.
#[derive(Debug, Error)]
pub enum TableError {
    /// The input document could not be loaded.
    #[error(transparent)]
    Naf(#[from] layered_naf::NafError),

    /// Reading or writing a file failed.
    #[error("i/o error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The delimited-file encoder or decoder failed.
    #[error("delimited file error on {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    /// No header can be derived from an empty record sequence.
    #[error("refusing to write {path}: no records")]
    EmptyTable { path: String },

    /// A record does not have the table's columns.
    #[error("record {index} has fields [{found}], expected [{expected}]")]
    HeterogeneousRecord {
        index: usize,
        expected: String,
        found: String,
    },

    /// Two inputs of one batch would write the same output files.
    #[error("{first} and {second} share the file stem `{stem}`, outputs would collide")]
    SharedStem {
        stem: String,
        first: String,
        second: String,
    },

    /// The configuration file is unreadable or invalid.
    #[error("invalid configuration {path}: {message}")]
    Config { path: String, message: String },
}

/// Result type for table operations.
pub type TableResult<T> = Result<T, TableError>;
