//! CoNLL projection: one row per term, with optional BIO entity tags.
//!
//! Terms are the pivot between layers, so the table is built from the term
//! layer. Each row is keyed by the term id with its prefix stripped
//! (`t12` becomes `12`), and entity tagging looks rows up by the same key.

use layered_naf::AnnotationSource;

use crate::config::{ConllOptions, ConversionConfig};
use crate::diagnostics::{Converted, Diagnostic, Diagnostics};
use crate::record::{KeyedTable, Record};

/// Tag given to rows outside every entity.
pub const OUTSIDE_TAG: &str = "O";

/// Row key for a term id: the id with every leading `prefix` removed.
pub fn normalize_term_id<'a>(term_id: &'a str, prefix: &str) -> &'a str {
    if prefix.is_empty() {
        return term_id;
    }
    term_id.trim_start_matches(prefix)
}

/// Build one row per single-token term.
///
/// Terms spanning zero or several tokens are skipped with a diagnostic.
/// Offsets that go backwards are reported but the row is kept.
pub fn project_terms<S: AnnotationSource>(
    source: &S,
    options: &ConllOptions,
    config: &ConversionConfig,
    diagnostics: &mut Diagnostics,
) -> KeyedTable {
    let mut table = KeyedTable::new();
    let mut previous_offset: Option<usize> = None;

    for term in source.terms() {
        let tokens = source.term_tokens(term);
        let token = match tokens.as_slice() {
            [token] => *token,
            [] => {
                diagnostics.push(Diagnostic::EmptyTermSpan {
                    term_id: term.id.clone(),
                });
                continue;
            }
            _ => {
                diagnostics.push(Diagnostic::MultiTokenTerm {
                    term_id: term.id.clone(),
                    token_ids: tokens.iter().map(|t| t.id.clone()).collect(),
                });
                continue;
            }
        };

        if let Some(offset) = token.offset {
            if let Some(previous) = previous_offset.filter(|&previous| offset < previous) {
                diagnostics.push(Diagnostic::NonMonotonicOffset {
                    term_id: term.id.clone(),
                    offset,
                    previous,
                });
            }
            previous_offset = Some(offset);
        }

        let key = normalize_term_id(&term.id, &config.term_prefix);
        let mut row = Record::new()
            .with("id", key)
            .with("sent_id", token.sent.clone().unwrap_or_default())
            .with("token", token.text.as_str());
        if options.lemmas {
            row.set("lemma", term.lemma.clone().unwrap_or_default());
        }
        if options.pos {
            row.set("pos", term.pos.clone().unwrap_or_default());
        }
        if options.morph {
            row.set("morph", term.morphofeat.clone().unwrap_or_default());
        }
        if options.offsets {
            row.set(
                "offset",
                token.offset.map(|o| o.to_string()).unwrap_or_default(),
            );
        }

        table.insert(key, row);
    }

    table
}

/// Add a `nerc` BIO column to the rows of `table`.
///
/// The first term of each entity reference gets `B-{type}`, later terms
/// `I-{type}`. Entities are applied in document order, so where two
/// entities overlap the later one wins. Rows outside every entity get
/// [`OUTSIDE_TAG`].
pub fn tag_entities<S: AnnotationSource>(
    source: &S,
    table: &mut KeyedTable,
    config: &ConversionConfig,
    diagnostics: &mut Diagnostics,
) {
    for entity in source.entities() {
        for reference in &entity.references {
            for (position, term_id) in reference.ids().enumerate() {
                let key = normalize_term_id(term_id, &config.term_prefix);
                let Some(row) = table.get_mut(key) else {
                    diagnostics.push(Diagnostic::UntaggableTerm {
                        entity_id: entity.id.clone(),
                        term_id: term_id.to_string(),
                    });
                    continue;
                };

                let tag = if position == 0 {
                    format!("B-{}", entity.entity_type)
                } else {
                    format!("I-{}", entity.entity_type)
                };
                if let Some(previous) = row.get("nerc") {
                    tracing::debug!(term_id, previous, tag = %tag, "overlapping entity tag replaced");
                }
                row.set("nerc", tag);
            }
        }
    }

    table.fill_missing("nerc", OUTSIDE_TAG);
}

/// Run the projector and, when requested, the entity tagger.
pub fn to_conll<S: AnnotationSource>(
    source: &S,
    options: &ConllOptions,
    config: &ConversionConfig,
) -> Converted<KeyedTable> {
    let mut diagnostics = Diagnostics::new();
    let mut table = project_terms(source, options, config, &mut diagnostics);
    if options.entities {
        tag_entities(source, &mut table, config, &mut diagnostics);
    }
    Converted::new(table, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use layered_naf::{Entity, NafDocument, Span, Term, Token};

    fn rows(table: &KeyedTable) -> Vec<Vec<&str>> {
        table
            .records()
            .iter()
            .map(|r| r.values().collect())
            .collect()
    }

    fn the_cat() -> NafDocument {
        NafDocument::builder()
            .token(Token::new("w1", "The").with_sent("1").with_offset(0))
            .token(Token::new("w2", "cat").with_sent("1").with_offset(4))
            .term(Term::new("t1", Span::new(["w1"])).with_lemma("the").with_pos("DET"))
            .term(Term::new("t2", Span::new(["w2"])).with_lemma("cat").with_pos("NOUN"))
            .entity(Entity::new("e1", "ANIMAL").with_reference(Span::new(["t2"])))
            .build()
            .unwrap()
    }

    #[test]
    fn test_normalize_term_id() {
        assert_eq!(normalize_term_id("t12", "t"), "12");
        assert_eq!(normalize_term_id("tt3", "t"), "3");
        assert_eq!(normalize_term_id("term_4", "term_"), "4");
        assert_eq!(normalize_term_id("x1", "t"), "x1");
        assert_eq!(normalize_term_id("t1", ""), "t1");
    }

    #[test]
    fn test_the_cat_example() {
        let options = ConllOptions {
            entities: true,
            ..Default::default()
        };
        let converted = to_conll(&the_cat(), &options, &ConversionConfig::default());

        assert!(converted.diagnostics.is_empty());
        assert_eq!(
            rows(&converted.value),
            vec![vec!["1", "1", "The", "O"], vec!["2", "1", "cat", "B-ANIMAL"]]
        );
    }

    #[test]
    fn test_optional_columns_order() {
        let options = ConllOptions {
            lemmas: true,
            pos: true,
            morph: true,
            offsets: true,
            entities: false,
        };
        let converted = to_conll(&the_cat(), &options, &ConversionConfig::default());
        let first = &converted.value.records()[0];

        assert_eq!(
            first.keys().collect::<Vec<_>>(),
            vec!["id", "sent_id", "token", "lemma", "pos", "morph", "offset"]
        );
        // morphofeat is absent on the term
        assert_eq!(first.get("morph"), Some(""));
        assert_eq!(converted.value.records()[1].get("offset"), Some("4"));
    }

    #[test]
    fn test_multi_token_term_skipped() {
        let doc = NafDocument::builder()
            .token(Token::new("w1", "New").with_offset(0))
            .token(Token::new("w2", "York").with_offset(4))
            .token(Token::new("w3", "rocks").with_offset(9))
            .term(Term::new("t1", Span::new(["w1", "w2"])))
            .term(Term::new("t2", Span::new(["w3"])))
            .entity(Entity::new("e1", "LOC").with_reference(Span::new(["t1"])))
            .build()
            .unwrap();
        let options = ConllOptions {
            entities: true,
            ..Default::default()
        };
        let converted = to_conll(&doc, &options, &ConversionConfig::default());

        assert_eq!(rows(&converted.value), vec![vec!["2", "", "rocks", "O"]]);
        assert_eq!(
            converted.diagnostics.into_vec(),
            vec![
                Diagnostic::MultiTokenTerm {
                    term_id: "t1".into(),
                    token_ids: vec!["w1".into(), "w2".into()],
                },
                Diagnostic::UntaggableTerm {
                    entity_id: "e1".into(),
                    term_id: "t1".into(),
                },
            ]
        );
    }

    #[test]
    fn test_empty_term_span_skipped() {
        let doc = NafDocument::builder()
            .token(Token::new("w1", "x"))
            .term(Term::new("t1", Span::default()))
            .build()
            .unwrap();
        let converted = to_conll(&doc, &ConllOptions::default(), &ConversionConfig::default());
        assert!(converted.value.is_empty());
        assert_eq!(
            converted.diagnostics.into_vec(),
            vec![Diagnostic::EmptyTermSpan { term_id: "t1".into() }]
        );
    }

    #[test]
    fn test_non_monotonic_offsets_reported_and_kept() {
        let doc = NafDocument::builder()
            .token(Token::new("w1", "b").with_offset(2))
            .token(Token::new("w2", "a").with_offset(0))
            .term(Term::new("t1", Span::new(["w1"])))
            .term(Term::new("t2", Span::new(["w2"])))
            .build()
            .unwrap();
        let converted = to_conll(&doc, &ConllOptions::default(), &ConversionConfig::default());

        assert_eq!(converted.value.len(), 2);
        assert_eq!(
            converted.diagnostics.into_vec(),
            vec![Diagnostic::NonMonotonicOffset {
                term_id: "t2".into(),
                offset: 0,
                previous: 2,
            }]
        );
    }

    #[test]
    fn test_bio_tags_and_overlap() {
        let doc = NafDocument::builder()
            .token(Token::new("w1", "Bank"))
            .token(Token::new("w2", "of"))
            .token(Token::new("w3", "America"))
            .term(Term::new("t1", Span::new(["w1"])))
            .term(Term::new("t2", Span::new(["w2"])))
            .term(Term::new("t3", Span::new(["w3"])))
            .entity(
                Entity::new("e1", "ORG").with_reference(Span::new(["t1", "t2", "t3"])),
            )
            .entity(Entity::new("e2", "LOC").with_reference(Span::new(["t3"])))
            .build()
            .unwrap();
        let options = ConllOptions {
            entities: true,
            ..Default::default()
        };
        let converted = to_conll(&doc, &options, &ConversionConfig::default());

        let tags: Vec<_> = converted
            .value
            .records()
            .iter()
            .map(|r| r.get("nerc").unwrap())
            .collect();
        assert_eq!(tags, vec!["B-ORG", "I-ORG", "B-LOC"]);
    }

    #[test]
    fn test_every_row_tagged() {
        let options = ConllOptions {
            entities: true,
            ..Default::default()
        };
        let converted = to_conll(&the_cat(), &options, &ConversionConfig::default());
        for record in converted.value.records() {
            let tag = record.get("nerc").unwrap();
            assert!(tag == OUTSIDE_TAG || tag.starts_with("B-") || tag.starts_with("I-"));
        }
    }
}
