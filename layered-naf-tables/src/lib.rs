#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! Flatten NAF annotation layers into delimited tables.
//!
//! Two pipelines read any [`AnnotationSource`](layered_naf::AnnotationSource):
//!
//! - the CoNLL pipeline projects one row per term, optionally with lemma,
//!   part-of-speech, morphology, offset and a BIO entity column;
//! - the extraction pipeline emits one row per entity reference and one row
//!   per opinion.
//!
//! ## Modules
//!
//! - [`conll`] - Term projection and BIO entity tagging
//! - [`extract`] - Entity and opinion tables
//! - [`record`] - Ordered row records, homogeneous and keyed tables
//! - [`writer`] - Atomic delimited-file output and read-back
//! - [`batch`] - Directory-level conversion
//! - [`config`] - Field selection and TOML formatting settings
//! - [`diagnostics`] - Recoverable conditions reported as values
//! - [`errors`] - Error types for conversion

pub mod batch;
pub mod config;
pub mod conll;
pub mod diagnostics;
pub mod errors;
pub mod extract;
pub mod record;
pub mod writer;

pub use batch::{convert_conll_dir, extract_dir, input_files, BatchReport, FileReport};
pub use config::{ConllOptions, ConversionConfig, ExtractOptions};
pub use conll::{normalize_term_id, project_terms, tag_entities, to_conll, OUTSIDE_TAG};
pub use diagnostics::{Converted, Diagnostic, Diagnostics};
pub use errors::{TableError, TableResult};
pub use extract::{extract_entities, extract_opinions, ENTITY_COLUMNS, OPINION_COLUMNS};
pub use record::{KeyedTable, Record, Table};
pub use writer::{read_records, write_records, write_records_to};
