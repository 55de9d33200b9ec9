//! Streaming NAF/KAF reader.
//!
//! Only the layers the converters need are read: `text`, `terms`,
//! `entities` and `opinions`, plus the root language and version. Anything
//! else is skipped. KAF id attributes (`wid`, `tid`, `eid`, `oid`) are
//! accepted wherever NAF uses `id`.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::document::{AnnotationSource, NafDocument, NafDocumentBuilder};
use crate::errors::{NafError, NafResult};
use crate::model::{Entity, Opinion, OpinionExpression, OpinionRole, Span, Term, Token};

/// Parse a complete NAF document from XML text.
pub(crate) fn parse_document(xml: &str) -> NafResult<NafDocument> {
    let mut reader = Reader::from_str(xml);
    let mut state = ReaderState::default();

    loop {
        let position = reader.buffer_position();
        let event = reader
            .read_event()
            .map_err(|source| NafError::Xml { position, source })?;

        match event {
            Event::Start(start) => {
                let attrs = Attrs::read(&start, position)?;
                state.open(&local_name(&start), attrs)?;
            }
            Event::Empty(start) => {
                let name = local_name(&start);
                let attrs = Attrs::read(&start, position)?;
                state.open(&name, attrs)?;
                state.close(&name);
            }
            Event::End(end) => {
                let name = String::from_utf8_lossy(end.local_name().as_ref()).into_owned();
                state.close(&name);
            }
            Event::Text(text) if state.collects_text() => {
                let text = text
                    .unescape()
                    .map_err(|source| NafError::Xml { position, source })?;
                state.text.push_str(&text);
            }
            Event::CData(data) if state.collects_text() => {
                state.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let document = state.builder.build()?;
    tracing::debug!(
        tokens = document.tokens().len(),
        terms = document.terms().len(),
        entities = document.entities().len(),
        opinions = document.opinions().len(),
        "parsed NAF layers"
    );
    Ok(document)
}

fn local_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.local_name().as_ref()).into_owned()
}

/// Attributes of one element, unescaped.
struct Attrs(Vec<(String, String)>);

impl Attrs {
    fn read(start: &BytesStart<'_>, position: usize) -> NafResult<Self> {
        let mut pairs = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|err| NafError::Xml {
                position,
                source: quick_xml::Error::InvalidAttr(err),
            })?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|source| NafError::Xml { position, source })?;
            pairs.push((key, value.into_owned()));
        }
        Ok(Self(pairs))
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn owned(&self, key: &str) -> Option<String> {
        self.get(key).map(str::to_string)
    }

    /// First present key among `keys`, or a missing-attribute error naming
    /// the first one.
    fn require(&self, element: &'static str, keys: &[&'static str]) -> NafResult<String> {
        keys.iter()
            .find_map(|key| self.owned(key))
            .ok_or(NafError::MissingAttribute {
                element,
                attribute: keys[0],
            })
    }

    fn number(&self, element: &'static str, key: &'static str) -> NafResult<Option<usize>> {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => raw
                .trim()
                .parse()
                .map(Some)
                .map_err(|err: std::num::ParseIntError| NafError::InvalidAttribute {
                    element,
                    attribute: key,
                    value: raw.to_string(),
                    reason: err.to_string(),
                }),
        }
    }
}

/// Which object the span currently being read belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpanOwner {
    Term,
    EntityReference,
    Holder,
    Target,
    Expression,
}

#[derive(Default)]
struct ReaderState {
    builder: NafDocumentBuilder,
    stack: Vec<String>,
    token: Option<Token>,
    text: String,
    term: Option<Term>,
    entity: Option<Entity>,
    opinion: Option<Opinion>,
    span: Option<(SpanOwner, Vec<String>)>,
}

impl ReaderState {
    fn collects_text(&self) -> bool {
        self.token.is_some()
    }

    fn parent(&self) -> Option<&str> {
        self.stack.last().map(String::as_str)
    }

    fn open(&mut self, name: &str, attrs: Attrs) -> NafResult<()> {
        match name {
            "NAF" | "KAF" if self.stack.is_empty() => {
                let info = self.builder.info_mut();
                info.language = attrs.owned("xml:lang");
                info.version = attrs.owned("version");
            }
            "public" if self.parent() == Some("nafHeader") => {
                self.builder.info_mut().public_id = attrs.owned("publicId");
            }
            "wf" if self.parent() == Some("text") => {
                let mut token = Token::new(attrs.require("wf", &["id", "wid"])?, "");
                token.sent = attrs.owned("sent");
                token.para = attrs.owned("para");
                token.offset = attrs.number("wf", "offset")?;
                token.length = attrs.number("wf", "length")?;
                self.token = Some(token);
                self.text.clear();
            }
            "term" if self.parent() == Some("terms") => {
                let mut term = Term::new(attrs.require("term", &["id", "tid"])?, Span::default());
                term.lemma = attrs.owned("lemma");
                term.pos = attrs.owned("pos");
                term.morphofeat = attrs.owned("morphofeat");
                self.term = Some(term);
            }
            "entity" if self.parent() == Some("entities") => {
                self.entity = Some(Entity::new(
                    attrs.require("entity", &["id", "eid"])?,
                    attrs.require("entity", &["type"])?,
                ));
            }
            "opinion" if self.parent() == Some("opinions") => {
                self.opinion = Some(Opinion::new(attrs.require("opinion", &["id", "oid"])?));
            }
            "opinion_holder" | "opinion_target" | "opinion_expression"
                if self.parent() == Some("opinion") =>
            {
                if let Some(opinion) = self.opinion.as_mut() {
                    match name {
                        "opinion_holder" => opinion.holder = Some(OpinionRole::default()),
                        "opinion_target" => opinion.target = Some(OpinionRole::default()),
                        _ => {
                            opinion.expression = Some(OpinionExpression {
                                polarity: attrs.owned("polarity"),
                                strength: attrs.owned("strength"),
                                span: Span::default(),
                            })
                        }
                    }
                }
            }
            "span" => {
                let owner = match self.parent() {
                    Some("term") if self.term.is_some() => Some(SpanOwner::Term),
                    Some("references") if self.entity.is_some() => {
                        Some(SpanOwner::EntityReference)
                    }
                    Some("opinion_holder") if self.opinion.is_some() => Some(SpanOwner::Holder),
                    Some("opinion_target") if self.opinion.is_some() => Some(SpanOwner::Target),
                    Some("opinion_expression") if self.opinion.is_some() => {
                        Some(SpanOwner::Expression)
                    }
                    _ => None,
                };
                self.span = owner.map(|owner| (owner, Vec::new()));
            }
            "target" if self.parent() == Some("span") => {
                if let Some((_, targets)) = self.span.as_mut() {
                    targets.push(attrs.require("target", &["id"])?);
                }
            }
            _ => {}
        }

        self.stack.push(name.to_string());
        Ok(())
    }

    fn close(&mut self, name: &str) {
        self.stack.pop();

        match name {
            "wf" => {
                if let Some(mut token) = self.token.take() {
                    token.text = std::mem::take(&mut self.text);
                    self.builder.push_token(token);
                }
            }
            "span" => {
                if let Some((owner, targets)) = self.span.take() {
                    self.attach_span(owner, Span { targets });
                }
            }
            "term" => {
                if let Some(term) = self.term.take() {
                    self.builder.push_term(term);
                }
            }
            "entity" => {
                if let Some(entity) = self.entity.take() {
                    self.builder.push_entity(entity);
                }
            }
            "opinion" => {
                if let Some(opinion) = self.opinion.take() {
                    self.builder.push_opinion(opinion);
                }
            }
            _ => {}
        }
    }

    fn attach_span(&mut self, owner: SpanOwner, span: Span) {
        match owner {
            SpanOwner::Term => {
                if let Some(term) = self.term.as_mut() {
                    term.span = span;
                }
            }
            SpanOwner::EntityReference => {
                if let Some(entity) = self.entity.as_mut() {
                    entity.references.push(span);
                }
            }
            SpanOwner::Holder | SpanOwner::Target | SpanOwner::Expression => {
                let Some(opinion) = self.opinion.as_mut() else {
                    return;
                };
                match owner {
                    SpanOwner::Holder => {
                        if let Some(holder) = opinion.holder.as_mut() {
                            holder.span = span;
                        }
                    }
                    SpanOwner::Target => {
                        if let Some(target) = opinion.target.as_mut() {
                            target.span = span;
                        }
                    }
                    _ => {
                        if let Some(expression) = opinion.expression.as_mut() {
                            expression.span = span;
                        }
                    }
                }
            }
        }
    }
}
