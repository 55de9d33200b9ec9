//! Warnings collected during conversion.
//!
//! Conditions that do not stop a conversion are returned to the caller as
//! values, so tests and batch drivers can inspect them. Each one is also
//! logged when recorded.

use std::fmt;

/// A recoverable condition met while building a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A term spans more than one token; its row is omitted.
    MultiTokenTerm { term_id: String, token_ids: Vec<String> },
    /// A term spans no token; its row is omitted.
    EmptyTermSpan { term_id: String },
    /// Token offsets went backwards between consecutive terms.
    NonMonotonicOffset {
        term_id: String,
        offset: usize,
        previous: usize,
    },
    /// An entity references a term that has no row in the table.
    UntaggableTerm { entity_id: String, term_id: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MultiTokenTerm { term_id, token_ids } => write!(
                f,
                "term {} spans {} tokens ({}); multiword terms are not supported, row skipped",
                term_id,
                token_ids.len(),
                token_ids.join(",")
            ),
            Diagnostic::EmptyTermSpan { term_id } => {
                write!(f, "term {} spans no tokens, row skipped", term_id)
            }
            Diagnostic::NonMonotonicOffset {
                term_id,
                offset,
                previous,
            } => write!(
                f,
                "term {} starts at offset {} after offset {}; terms are not in surface order",
                term_id, offset, previous
            ),
            Diagnostic::UntaggableTerm { entity_id, term_id } => write!(
                f,
                "entity {} references term {} which has no row, tag dropped",
                entity_id, term_id
            ),
        }
    }
}

/// Ordered collection of [`Diagnostic`]s for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and log it.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        tracing::warn!("{}", diagnostic);
        self.entries.push(diagnostic);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// A conversion result together with the diagnostics it produced.
#[derive(Debug, Clone)]
pub struct Converted<T> {
    pub value: T,
    pub diagnostics: Diagnostics,
}

impl<T> Converted<T> {
    pub fn new(value: T, diagnostics: Diagnostics) -> Self {
        Self { value, diagnostics }
    }
}
