//! Entity and opinion tables.

use layered_naf::{AnnotationSource, Span};

use crate::config::ConversionConfig;
use crate::errors::TableResult;
use crate::record::{Record, Table};

pub const ENTITY_COLUMNS: [&str; 4] = ["id", "type", "term_ids", "surface_string"];

pub const OPINION_COLUMNS: [&str; 9] = [
    "id",
    "polarity",
    "strength",
    "e_term_ids",
    "expression",
    "h_term_ids",
    "holder",
    "t_term_ids",
    "target",
];

/// One record per entity reference.
///
/// An entity mentioned three times yields three records sharing its id.
pub fn extract_entities<S: AnnotationSource>(source: &S) -> TableResult<Table> {
    let mut table = Table::new();
    for entity in source.entities() {
        for reference in &entity.references {
            let record = Record::new()
                .with("id", entity.id.as_str())
                .with("type", entity.entity_type.as_str())
                .with("term_ids", reference.joined())
                .with("surface_string", source.surface_text(reference));
            table.push(record)?;
        }
    }
    Ok(table)
}

/// One record per opinion.
///
/// Every field of an absent expression, holder or target holds the
/// configured placeholder.
pub fn extract_opinions<S: AnnotationSource>(
    source: &S,
    config: &ConversionConfig,
) -> TableResult<Table> {
    let placeholder = config.placeholder.as_str();
    let mut table = Table::new();

    for opinion in source.opinions() {
        let mut record = Record::new().with("id", opinion.id.as_str());

        match &opinion.expression {
            Some(expression) => {
                record.set("polarity", expression.polarity.clone().unwrap_or_default());
                record.set("strength", expression.strength.clone().unwrap_or_default());
                set_span_fields(&mut record, source, "e_term_ids", "expression", &expression.span);
            }
            None => {
                for key in ["polarity", "strength", "e_term_ids", "expression"] {
                    record.set(key, placeholder);
                }
            }
        }

        let roles = [
            ("h_term_ids", "holder", opinion.holder.as_ref()),
            ("t_term_ids", "target", opinion.target.as_ref()),
        ];
        for (ids_key, text_key, role) in roles {
            match role {
                Some(role) => set_span_fields(&mut record, source, ids_key, text_key, &role.span),
                None => {
                    record.set(ids_key, placeholder);
                    record.set(text_key, placeholder);
                }
            }
        }

        table.push(record)?;
    }

    Ok(table)
}

fn set_span_fields<S: AnnotationSource>(
    record: &mut Record,
    source: &S,
    ids_key: &str,
    text_key: &str,
    span: &Span,
) {
    record.set(ids_key, span.joined());
    record.set(text_key, source.surface_text(span));
}

#[cfg(test)]
mod tests {
    use super::*;
    use layered_naf::{Entity, NafDocument, Opinion, Term, Token};

    fn document() -> NafDocument {
        NafDocument::builder()
            .token(Token::new("w1", "The").with_sent("1"))
            .token(Token::new("w2", "cat").with_sent("1"))
            .token(Token::new("w3", "loves").with_sent("1"))
            .token(Token::new("w4", "Tom").with_sent("1"))
            .token(Token::new("w5", "Cat").with_sent("1"))
            .term(Term::new("t1", Span::new(["w1"])))
            .term(Term::new("t2", Span::new(["w2"])))
            .term(Term::new("t3", Span::new(["w3"])))
            .term(Term::new("t4", Span::new(["w4", "w5"])))
            .entity(
                Entity::new("e1", "ANIMAL")
                    .with_reference(Span::new(["t1", "t2"]))
                    .with_reference(Span::new(["t2"])),
            )
            .entity(Entity::new("e2", "PERSON").with_reference(Span::new(["t4"])))
            .opinion(Opinion::new("o1").with_expression(
                Some("positive"),
                Some("average"),
                Span::new(["t2"]),
            ))
            .opinion(
                Opinion::new("o2")
                    .with_holder(Span::new(["t1", "t2"]))
                    .with_target(Span::new(["t4"]))
                    .with_expression(Some("positive"), None, Span::new(["t3"])),
            )
            .opinion(Opinion::new("o3"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_one_record_per_reference() {
        let table = extract_entities(&document()).unwrap();
        let rows: Vec<Vec<&str>> = table
            .records()
            .iter()
            .map(|r| r.values().collect())
            .collect();

        assert_eq!(table.columns(), ENTITY_COLUMNS.map(String::from).as_slice());
        assert_eq!(
            rows,
            vec![
                vec!["e1", "ANIMAL", "t1,t2", "The cat"],
                vec!["e1", "ANIMAL", "t2", "cat"],
                // multiword term: every token of the term is used
                vec!["e2", "PERSON", "t4", "Tom Cat"],
            ]
        );
    }

    #[test]
    fn test_expression_only_opinion() {
        let table = extract_opinions(&document(), &ConversionConfig::default()).unwrap();
        let o1 = &table.records()[0];

        assert_eq!(o1.get("polarity"), Some("positive"));
        assert_eq!(o1.get("strength"), Some("average"));
        assert_eq!(o1.get("e_term_ids"), Some("t2"));
        assert_eq!(o1.get("expression"), Some("cat"));
        assert_eq!(o1.get("h_term_ids"), Some("-"));
        assert_eq!(o1.get("holder"), Some("-"));
        assert_eq!(o1.get("t_term_ids"), Some("-"));
        assert_eq!(o1.get("target"), Some("-"));
    }

    #[test]
    fn test_full_and_empty_opinions() {
        let table = extract_opinions(&document(), &ConversionConfig::default()).unwrap();
        assert_eq!(table.columns(), OPINION_COLUMNS.map(String::from).as_slice());

        let values: Vec<Vec<&str>> = table
            .records()
            .iter()
            .skip(1)
            .map(|r| r.values().collect())
            .collect();
        assert_eq!(
            values,
            vec![
                vec!["o2", "positive", "", "t3", "loves", "t1,t2", "The cat", "t4", "Tom Cat"],
                vec!["o3", "-", "-", "-", "-", "-", "-", "-", "-"],
            ]
        );
    }

    #[test]
    fn test_custom_placeholder() {
        let config = ConversionConfig {
            placeholder: "NA".into(),
            ..Default::default()
        };
        let table = extract_opinions(&document(), &config).unwrap();
        assert_eq!(table.records()[2].get("holder"), Some("NA"));
    }

    #[test]
    fn test_no_entities() {
        let doc = NafDocument::builder().build().unwrap();
        assert!(extract_entities(&doc).unwrap().is_empty());
        assert!(extract_opinions(&doc, &ConversionConfig::default())
            .unwrap()
            .is_empty());
    }
}
