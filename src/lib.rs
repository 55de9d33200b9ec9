#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! Read-only model of NAF (NLP Annotation Format) documents.
//!
//! A NAF document stacks annotation layers over its tokens: terms span
//! tokens, entity references and opinion parts span terms. This crate loads
//! those layers into memory and exposes them through [`AnnotationSource`].
//!
//! ## Modules
//!
//! - [`model`] - Tokens, terms, spans, entities and opinions
//! - [`document`] - The loaded document and the query trait
//! - [`display`] - Sentence rendering with underlined annotation spans
//! - [`errors`] - Error types for loading
//!
//! ## Example
//!
//! ```
//! use layered_naf::{AnnotationSource, NafDocument, Span};
//!
//! let xml = r#"<NAF xml:lang="en">
//!   <text><wf id="w1" sent="1" offset="0">Hello</wf></text>
//!   <terms><term id="t1" lemma="hello"><span><target id="w1"/></span></term></terms>
//! </NAF>"#;
//!
//! let doc: NafDocument = xml.parse().unwrap();
//! assert_eq!(doc.surface_text(&Span::new(["t1"])), "Hello");
//! ```

pub mod display;
pub mod document;
pub mod errors;
pub mod model;
mod reader;

pub use display::DocumentDisplay;
pub use document::{AnnotationSource, DocumentInfo, NafDocument, NafDocumentBuilder};
pub use errors::{NafError, NafResult};
pub use model::{Entity, Opinion, OpinionExpression, OpinionRole, Span, Term, Token};
