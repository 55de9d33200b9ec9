//! Error types for loading NAF documents.

use thiserror::Error;

/// Errors that can occur while reading a NAF document.
#[derive(Debug, Error)]
pub enum NafError {
    /// The document could not be read from disk.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The XML itself is malformed.
    #[error("malformed XML at byte {position}: {source}")]
    Xml {
        position: usize,
        #[source]
        source: quick_xml::Error,
    },

    /// An element is missing an attribute the model requires.
    #[error("<{element}> is missing required attribute `{attribute}`")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    /// An attribute is present but its value cannot be used.
    #[error("<{element} {attribute}=\"{value}\"> is not valid: {reason}")]
    InvalidAttribute {
        element: &'static str,
        attribute: &'static str,
        value: String,
        reason: String,
    },

    /// A span points at an identifier the document does not define.
    #[error("{owner} references unknown {layer} id `{target}`")]
    DanglingReference {
        owner: String,
        layer: &'static str,
        target: String,
    },
}

/// Result type for NAF operations.
pub type NafResult<T> = Result<T, NafError>;
