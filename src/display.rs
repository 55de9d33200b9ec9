//! Text rendering of a document's sentences with annotation spans
//! underlined beneath the tokens.

use std::collections::{HashMap, HashSet};
use std::fmt::Write;

use unicode_width::UnicodeWidthStr;

use crate::document::{AnnotationSource, NafDocument};
use crate::model::Span;

/// Inclusive token positions within one sentence.
type TokenRange = (usize, usize);

/// Convert a zero-based index to a base-26 label: A, B, ..., Z, AA, AB, ..., AZ, BA, ...
/// Similar to Excel column naming.
fn index_to_base26_label(mut n: usize) -> String {
    let mut result = String::new();
    loop {
        let remainder = n % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    result
}

/// A link from an opinion expression to its holder or target.
struct RoleLink {
    role: &'static str,
    glyph: Option<&'static str>,
    sentence: usize,
    range: TokenRange,
}

/// Internal representation of an included span for display.
struct IncludedSpan {
    sentence: usize,
    range: TokenRange,
    label: String,
    links: Vec<RoleLink>,
}

// 0,    1,    2,     - token positions in the sentence
// The  cat  purrs
//      ╰─╯[A] ANIMAL(e1)
//      ╰─╯[A] Target(o1)
//           ╰───╯Expression(o1, positive, average)
//             └─target─>[A]
pub struct DocumentDisplay<'a> {
    document: &'a NafDocument,
    /// token id -> (sentence index, position within sentence)
    positions: HashMap<&'a str, (usize, usize)>,
    include_spans: Vec<IncludedSpan>,
}

impl<'a> std::fmt::Display for DocumentDisplay<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const SPACE_PADDING: usize = 2;

        for (sentence_idx, (_, tokens)) in self.document.sentences().iter().enumerate() {
            if sentence_idx > 0 {
                f.write_str("\n\n")?;
            }

            let mut token_idx_to_start_display_char_idx = Vec::new();
            let mut token_idx_to_end_display_char_idx = Vec::new();
            let mut opening_line = String::new();
            for (position, token) in tokens.iter().enumerate() {
                if position > 0 {
                    opening_line.extend(std::iter::repeat(' ').take(SPACE_PADDING));
                }
                token_idx_to_start_display_char_idx.push(UnicodeWidthStr::width(&*opening_line));
                opening_line.push_str(&token.text);
                token_idx_to_end_display_char_idx.push(UnicodeWidthStr::width(&*opening_line));
            }
            f.write_str(&opening_line)?;

            let span_labels = self.build_span_labels(sentence_idx);

            for span in self
                .include_spans
                .iter()
                .filter(|span| span.sentence == sentence_idx)
            {
                f.write_char('\n')?;

                let start_char_idx = token_idx_to_start_display_char_idx[span.range.0];
                for _ in 0..start_char_idx {
                    f.write_char(' ')?;
                }

                f.write_char('╰')?;

                let end_char_idx = token_idx_to_end_display_char_idx[span.range.1];
                let char_len = end_char_idx - start_char_idx;
                for _ in (start_char_idx + 1)..end_char_idx.saturating_sub(1) {
                    f.write_char('─')?;
                }

                if char_len > 1 {
                    f.write_char('╯')?;
                }

                if let Some(label) = span_labels.get(&(span.sentence, span.range)) {
                    write!(f, "{} ", label)?;
                }

                f.write_str(&span.label)?;

                for link in &span.links {
                    f.write_char('\n')?;

                    let arrow_indent = start_char_idx + 2;
                    for _ in 0..arrow_indent {
                        f.write_char(' ')?;
                    }

                    let target_str = match span_labels.get(&(link.sentence, link.range)) {
                        Some(target_label) => target_label.clone(),
                        None => format!("[{}:{}..{}]", link.sentence, link.range.0, link.range.1),
                    };

                    write!(
                        f,
                        "└─{}{}─>{}",
                        link.glyph.unwrap_or(""),
                        link.role,
                        target_str
                    )?;
                }
            }
        }

        Ok(())
    }
}

impl<'a> DocumentDisplay<'a> {
    pub fn new(document: &'a NafDocument) -> Self {
        let positions = document
            .sentences()
            .into_iter()
            .enumerate()
            .flat_map(|(sentence_idx, (_, tokens))| {
                tokens
                    .into_iter()
                    .enumerate()
                    .map(move |(position, token)| (token.id.as_str(), (sentence_idx, position)))
            })
            .collect();

        DocumentDisplay {
            document,
            positions,
            include_spans: Vec::new(),
        }
    }

    /// Locate a span of term ids as (sentence, first..=last token position).
    ///
    /// Discontinuous spans are drawn from their first to their last token.
    /// Spans crossing sentences are anchored in the sentence of their first
    /// token and clipped to its end.
    fn locate(&self, term_span: &Span) -> Option<(usize, TokenRange)> {
        let mut located = self
            .document
            .resolve(term_span)
            .into_iter()
            .filter_map(|token| self.positions.get(token.id.as_str()).copied());

        let (sentence, first) = located.next()?;
        let (mut start, mut end) = (first, first);
        for (other_sentence, position) in located {
            if other_sentence == sentence {
                start = start.min(position);
                end = end.max(position);
            }
        }
        Some((sentence, (start, end)))
    }

    /// Build a map from included ranges to labels like "[A]", "[B]", etc.
    /// Only ranges that are targets of links get labels.
    fn build_span_labels(&self, sentence: usize) -> HashMap<(usize, TokenRange), String> {
        let included_ranges: HashSet<(usize, TokenRange)> = self
            .include_spans
            .iter()
            .map(|span| (span.sentence, span.range))
            .collect();

        let mut target_ranges: Vec<TokenRange> = self
            .include_spans
            .iter()
            .flat_map(|span| &span.links)
            .filter(|link| link.sentence == sentence)
            .map(|link| link.range)
            .filter(|range| included_ranges.contains(&(sentence, *range)))
            .collect();

        target_ranges.sort();
        target_ranges.dedup();

        target_ranges
            .into_iter()
            .enumerate()
            .map(|(i, range)| {
                let label = format!("[{}]", index_to_base26_label(i));
                ((sentence, range), label)
            })
            .collect()
    }

    /// Include one underline per entity reference.
    pub fn include_entities(&mut self) {
        let document = self.document;
        for entity in document.entities() {
            for reference in &entity.references {
                if let Some((sentence, range)) = self.locate(reference) {
                    self.include_spans.push(IncludedSpan {
                        sentence,
                        range,
                        label: format!("{}({})", entity.entity_type, entity.id),
                        links: Vec::new(),
                    });
                }
            }
        }
    }

    /// Include opinion holders, targets and expressions, with arrows from
    /// each expression to its holder and target.
    pub fn include_opinions(&mut self) {
        let document = self.document;
        for opinion in document.opinions() {
            let holder = opinion
                .holder
                .as_ref()
                .and_then(|holder| self.locate(&holder.span));
            let target = opinion
                .target
                .as_ref()
                .and_then(|target| self.locate(&target.span));

            if let Some((sentence, range)) = holder {
                self.include_spans.push(IncludedSpan {
                    sentence,
                    range,
                    label: format!("Holder({})", opinion.id),
                    links: Vec::new(),
                });
            }
            if let Some((sentence, range)) = target {
                self.include_spans.push(IncludedSpan {
                    sentence,
                    range,
                    label: format!("Target({})", opinion.id),
                    links: Vec::new(),
                });
            }

            let Some(expression) = opinion.expression.as_ref() else {
                continue;
            };
            let Some((sentence, range)) = self.locate(&expression.span) else {
                continue;
            };

            let mut links = Vec::new();
            if let Some((sentence, range)) = holder {
                links.push(RoleLink {
                    role: "holder",
                    glyph: Some("@"),
                    sentence,
                    range,
                });
            }
            if let Some((sentence, range)) = target {
                links.push(RoleLink {
                    role: "target",
                    glyph: None,
                    sentence,
                    range,
                });
            }

            let mut label = format!("Expression({}", opinion.id);
            for attr in [&expression.polarity, &expression.strength]
                .into_iter()
                .flatten()
            {
                let _ = write!(label, ", {}", attr);
            }
            label.push(')');

            self.include_spans.push(IncludedSpan {
                sentence,
                range,
                label,
                links,
            });
        }
    }

    /// Takes self
    pub fn with_entities(mut self) -> Self {
        self.include_entities();
        self
    }

    /// Takes self
    pub fn with_opinions(mut self) -> Self {
        self.include_opinions();
        self
    }
}
