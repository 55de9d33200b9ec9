//! In-memory NAF document and the query interface the converters use.
//!
//! Converters never touch XML. They take any [`AnnotationSource`], and
//! [`NafDocument`] is the implementation produced by the loader (or built
//! directly in tests via [`NafDocument::builder`]).

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{NafError, NafResult};
use crate::model::{Entity, Opinion, Span, Term, Token};

/// Read access to the annotation layers of one document.
pub trait AnnotationSource {
    /// Tokens in document order.
    fn tokens(&self) -> &[Token];

    /// Terms in document order.
    fn terms(&self) -> &[Term];

    fn entities(&self) -> &[Entity];

    fn opinions(&self) -> &[Opinion];

    fn token(&self, id: &str) -> Option<&Token>;

    fn term(&self, id: &str) -> Option<&Term>;

    /// Tokens covered by a single term, in span order.
    ///
    /// Unknown token ids are skipped.
    fn term_tokens(&self, term: &Term) -> Vec<&Token> {
        term.span.ids().filter_map(|id| self.token(id)).collect()
    }

    /// Tokens covered by a span of term ids, in span order.
    ///
    /// Unknown term ids are skipped.
    fn resolve(&self, term_span: &Span) -> Vec<&Token> {
        term_span
            .ids()
            .filter_map(|id| self.term(id))
            .flat_map(|term| self.term_tokens(term))
            .collect()
    }

    /// Surface text of a span of term ids: token texts joined by a single
    /// space, trimmed.
    fn surface_text(&self, term_span: &Span) -> String {
        self.resolve(term_span)
            .iter()
            .map(|token| token.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string()
    }
}

/// Document-level metadata from the root element and header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInfo {
    /// `xml:lang` of the root element.
    pub language: Option<String>,
    /// NAF `version` attribute.
    pub version: Option<String>,
    /// `publicId` from `nafHeader/public`.
    pub public_id: Option<String>,
}

/// A fully loaded NAF document.
#[derive(Clone, Serialize)]
pub struct NafDocument {
    info: DocumentInfo,
    tokens: Vec<Token>,
    terms: Vec<Term>,
    entities: Vec<Entity>,
    opinions: Vec<Opinion>,
    #[serde(skip)]
    token_index: HashMap<String, usize>,
    #[serde(skip)]
    term_index: HashMap<String, usize>,
}

impl std::fmt::Debug for NafDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NafDocument")
            .field("language", &self.info.language)
            .field("token_count", &self.tokens.len())
            .field("term_count", &self.terms.len())
            .field("entity_count", &self.entities.len())
            .field("opinion_count", &self.opinions.len())
            .finish()
    }
}

impl NafDocument {
    pub fn builder() -> NafDocumentBuilder {
        NafDocumentBuilder::default()
    }

    /// Load a document from a file on disk.
    pub fn from_path(path: &Path) -> NafResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| NafError::Io {
            path: path.display().to_string(),
            source,
        })?;
        crate::reader::parse_document(&content)
    }

    pub fn info(&self) -> &DocumentInfo {
        &self.info
    }

    /// Group tokens by sentence, keeping first-seen sentence order.
    ///
    /// Tokens without a sentence attribute form their own group under `None`.
    pub fn sentences(&self) -> Vec<(Option<&str>, Vec<&Token>)> {
        let mut groups: Vec<(Option<&str>, Vec<&Token>)> = Vec::new();
        for token in &self.tokens {
            let sent = token.sent.as_deref();
            match groups.iter_mut().find(|(key, _)| *key == sent) {
                Some((_, tokens)) => tokens.push(token),
                None => groups.push((sent, vec![token])),
            }
        }
        groups
    }

    /// Check that every span points at an id of the layer below it.
    fn validate_references(&self) -> NafResult<()> {
        for term in &self.terms {
            for target in term.span.ids() {
                if !self.token_index.contains_key(target) {
                    return Err(NafError::DanglingReference {
                        owner: format!("term {}", term.id),
                        layer: "token",
                        target: target.to_string(),
                    });
                }
            }
        }

        let entity_spans = self.entities.iter().flat_map(|entity| {
            entity
                .references
                .iter()
                .map(move |span| (format!("entity {}", entity.id), span))
        });
        let opinion_spans = self.opinions.iter().flat_map(|opinion| {
            let owner = format!("opinion {}", opinion.id);
            opinion
                .holder
                .iter()
                .map(|holder| &holder.span)
                .chain(opinion.target.iter().map(|target| &target.span))
                .chain(opinion.expression.iter().map(|expression| &expression.span))
                .map(move |span| (owner.clone(), span))
        });

        for (owner, span) in entity_spans.chain(opinion_spans) {
            for target in span.ids() {
                if !self.term_index.contains_key(target) {
                    return Err(NafError::DanglingReference {
                        owner,
                        layer: "term",
                        target: target.to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}

impl std::str::FromStr for NafDocument {
    type Err = NafError;

    fn from_str(xml: &str) -> NafResult<Self> {
        crate::reader::parse_document(xml)
    }
}

impl AnnotationSource for NafDocument {
    fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    fn terms(&self) -> &[Term] {
        &self.terms
    }

    fn entities(&self) -> &[Entity] {
        &self.entities
    }

    fn opinions(&self) -> &[Opinion] {
        &self.opinions
    }

    fn token(&self, id: &str) -> Option<&Token> {
        self.token_index.get(id).map(|&idx| &self.tokens[idx])
    }

    fn term(&self, id: &str) -> Option<&Term> {
        self.term_index.get(id).map(|&idx| &self.terms[idx])
    }
}

/// Assembles a [`NafDocument`] layer by layer.
#[derive(Debug, Default)]
pub struct NafDocumentBuilder {
    info: DocumentInfo,
    tokens: Vec<Token>,
    terms: Vec<Term>,
    entities: Vec<Entity>,
    opinions: Vec<Opinion>,
}

impl NafDocumentBuilder {
    pub fn info(mut self, info: DocumentInfo) -> Self {
        self.info = info;
        self
    }

    pub fn token(mut self, token: Token) -> Self {
        self.tokens.push(token);
        self
    }

    pub fn term(mut self, term: Term) -> Self {
        self.terms.push(term);
        self
    }

    pub fn entity(mut self, entity: Entity) -> Self {
        self.entities.push(entity);
        self
    }

    pub fn opinion(mut self, opinion: Opinion) -> Self {
        self.opinions.push(opinion);
        self
    }

    pub(crate) fn push_token(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub(crate) fn push_term(&mut self, term: Term) {
        self.terms.push(term);
    }

    pub(crate) fn push_entity(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    pub(crate) fn push_opinion(&mut self, opinion: Opinion) {
        self.opinions.push(opinion);
    }

    pub(crate) fn info_mut(&mut self) -> &mut DocumentInfo {
        &mut self.info
    }

    /// Index the layers and check cross-layer references.
    ///
    /// When an id occurs twice, lookups resolve to the last occurrence.
    pub fn build(self) -> NafResult<NafDocument> {
        let token_index = self
            .tokens
            .iter()
            .enumerate()
            .map(|(idx, token)| (token.id.clone(), idx))
            .collect();
        let term_index = self
            .terms
            .iter()
            .enumerate()
            .map(|(idx, term)| (term.id.clone(), idx))
            .collect();

        let document = NafDocument {
            info: self.info,
            tokens: self.tokens,
            terms: self.terms,
            entities: self.entities,
            opinions: self.opinions,
            token_index,
            term_index,
        };
        document.validate_references()?;
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_word_document() -> NafDocument {
        NafDocument::builder()
            .token(Token::new("w1", "New").with_sent("1").with_offset(0))
            .token(Token::new("w2", "York").with_sent("1").with_offset(4))
            .token(Token::new("w3", "!").with_sent("2").with_offset(8))
            .term(Term::new("t1", Span::new(["w1", "w2"])))
            .term(Term::new("t2", Span::new(["w3"])))
            .entity(Entity::new("e1", "LOCATION").with_reference(Span::new(["t1"])))
            .build()
            .unwrap()
    }

    #[test]
    fn test_resolve_term_span() {
        let doc = two_word_document();
        let tokens = doc.resolve(&Span::new(["t1", "t2"]));
        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["New", "York", "!"]);
        assert_eq!(doc.surface_text(&Span::new(["t1"])), "New York");
    }

    #[test]
    fn test_surface_text_trims() {
        let doc = NafDocument::builder()
            .token(Token::new("w1", " padded "))
            .term(Term::new("t1", Span::new(["w1"])))
            .build()
            .unwrap();
        assert_eq!(doc.surface_text(&Span::new(["t1"])), "padded");
    }

    #[test]
    fn test_sentences_grouping() {
        let doc = two_word_document();
        let sentences = doc.sentences();
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0].0, Some("1"));
        assert_eq!(sentences[0].1.len(), 2);
        assert_eq!(sentences[1].0, Some("2"));
    }

    #[test]
    fn test_dangling_term_reference() {
        let err = NafDocument::builder()
            .token(Token::new("w1", "cat"))
            .term(Term::new("t1", Span::new(["w1"])))
            .entity(Entity::new("e1", "ANIMAL").with_reference(Span::new(["t9"])))
            .build()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "entity e1 references unknown term id `t9`"
        );
    }

    #[test]
    fn test_dangling_token_reference() {
        let err = NafDocument::builder()
            .term(Term::new("t1", Span::new(["w7"])))
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            NafError::DanglingReference { layer: "token", .. }
        ));
    }
}
