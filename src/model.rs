//! Core types for the annotation layers of a NAF document.
//!
//! Layers reference each other through [`Span`]s of identifiers: a term
//! spans token ids, an entity reference or opinion part spans term ids.

use serde::{Deserialize, Serialize};

/// Ordered list of identifiers pointing into a lower layer.
///
/// A span never owns what it references. The ids may be contiguous or not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub targets: Vec<String>,
}

impl Span {
    pub fn new<I, S>(targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            targets: targets.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.targets.iter().map(String::as_str)
    }

    /// Comma-joined ids, the form used in the extracted tables.
    pub fn joined(&self) -> String {
        self.targets.join(",")
    }
}

/// Atomic surface unit from the `text` layer (`<wf>`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub id: String,
    pub text: String,
    /// Sentence number as written in the document.
    pub sent: Option<String>,
    pub para: Option<String>,
    /// Character offset into the raw text.
    pub offset: Option<usize>,
    pub length: Option<usize>,
}

impl Token {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            sent: None,
            para: None,
            offset: None,
            length: None,
        }
    }

    pub fn with_sent(mut self, sent: impl Into<String>) -> Self {
        self.sent = Some(sent.into());
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_length(mut self, length: usize) -> Self {
        self.length = Some(length);
        self
    }
}

/// A term from the `terms` layer, spanning one or more tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub id: String,
    pub lemma: Option<String>,
    pub pos: Option<String>,
    pub morphofeat: Option<String>,
    /// Token ids.
    pub span: Span,
}

impl Term {
    pub fn new(id: impl Into<String>, span: Span) -> Self {
        Self {
            id: id.into(),
            lemma: None,
            pos: None,
            morphofeat: None,
            span,
        }
    }

    pub fn with_lemma(mut self, lemma: impl Into<String>) -> Self {
        self.lemma = Some(lemma.into());
        self
    }

    pub fn with_pos(mut self, pos: impl Into<String>) -> Self {
        self.pos = Some(pos.into());
        self
    }

    pub fn with_morphofeat(mut self, morphofeat: impl Into<String>) -> Self {
        self.morphofeat = Some(morphofeat.into());
        self
    }
}

/// A typed entity with one or more mention references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    /// Category such as `PERSON` or `LOCATION`.
    pub entity_type: String,
    /// Each reference is a span of term ids, in document order.
    pub references: Vec<Span>,
}

impl Entity {
    pub fn new(id: impl Into<String>, entity_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            entity_type: entity_type.into(),
            references: Vec::new(),
        }
    }

    pub fn with_reference(mut self, span: Span) -> Self {
        self.references.push(span);
        self
    }
}

/// Holder or target of an opinion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpinionRole {
    /// Term ids.
    pub span: Span,
}

/// The evaluative expression of an opinion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpinionExpression {
    pub polarity: Option<String>,
    pub strength: Option<String>,
    /// Term ids.
    pub span: Span,
}

/// An opinion triple. Every part may be absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opinion {
    pub id: String,
    pub holder: Option<OpinionRole>,
    pub target: Option<OpinionRole>,
    pub expression: Option<OpinionExpression>,
}

impl Opinion {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            holder: None,
            target: None,
            expression: None,
        }
    }

    pub fn with_holder(mut self, span: Span) -> Self {
        self.holder = Some(OpinionRole { span });
        self
    }

    pub fn with_target(mut self, span: Span) -> Self {
        self.target = Some(OpinionRole { span });
        self
    }

    pub fn with_expression(
        mut self,
        polarity: Option<&str>,
        strength: Option<&str>,
        span: Span,
    ) -> Self {
        self.expression = Some(OpinionExpression {
            polarity: polarity.map(str::to_string),
            strength: strength.map(str::to_string),
            span,
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_joined() {
        let span = Span::new(["t1", "t2", "t4"]);
        assert_eq!(span.len(), 3);
        assert_eq!(span.joined(), "t1,t2,t4");
        assert_eq!(Span::default().joined(), "");
    }

    #[test]
    fn test_opinion_builder() {
        let opinion = Opinion::new("o1").with_expression(
            Some("positive"),
            None,
            Span::new(["t2"]),
        );
        assert!(opinion.holder.is_none());
        let expression = opinion.expression.unwrap();
        assert_eq!(expression.polarity.as_deref(), Some("positive"));
        assert_eq!(expression.strength, None);
    }
}
