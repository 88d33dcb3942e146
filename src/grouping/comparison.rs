use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use super::normalizer::BaseItemDictionary;
use crate::models::{BaseItemKey, ComparisonRow, ExtractedRecord, SourceId};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ComparisonError {
    #[error("record {name:?} from source {found} passed as source {expected}")]
    SourceMismatch {
        expected: SourceId,
        found: SourceId,
        name: String,
    },
}

/// Group two sources' records side by side under their base items.
///
/// Groups are sorted by key with "Ungrouped" last. Within a group the i-th
/// record of each source share a row, in each source's own order.
pub fn group_records<'a>(
    a: &'a [ExtractedRecord],
    b: &'a [ExtractedRecord],
    dict: &BaseItemDictionary,
) -> Result<Vec<ComparisonRow<'a>>, ComparisonError> {
    check_source(a, SourceId::SourceA)?;
    check_source(b, SourceId::SourceB)?;

    let by_key_a = bucket(a, dict);
    let by_key_b = bucket(b, dict);

    let keys: BTreeSet<&BaseItemKey> = by_key_a.keys().chain(by_key_b.keys()).collect();
    let (ungrouped, grouped): (Vec<&BaseItemKey>, Vec<&BaseItemKey>) =
        keys.into_iter().partition(|k| k.is_ungrouped());

    let mut rows = Vec::new();
    for key in grouped.into_iter().chain(ungrouped) {
        let side_a = by_key_a.get(key).map(Vec::as_slice).unwrap_or(&[]);
        let side_b = by_key_b.get(key).map(Vec::as_slice).unwrap_or(&[]);

        rows.push(ComparisonRow::GroupHeader { label: key.clone() });
        let height = side_a.len().max(side_b.len()).max(1);
        for i in 0..height {
            rows.push(ComparisonRow::Item {
                a: side_a.get(i).copied(),
                b: side_b.get(i).copied(),
            });
        }
    }
    Ok(rows)
}

fn check_source(records: &[ExtractedRecord], expected: SourceId) -> Result<(), ComparisonError> {
    match records.iter().find(|r| r.source != expected) {
        Some(r) => Err(ComparisonError::SourceMismatch {
            expected,
            found: r.source,
            name: r.name.clone(),
        }),
        None => Ok(()),
    }
}

fn bucket<'a>(
    records: &'a [ExtractedRecord],
    dict: &BaseItemDictionary,
) -> BTreeMap<BaseItemKey, Vec<&'a ExtractedRecord>> {
    let mut map: BTreeMap<BaseItemKey, Vec<&'a ExtractedRecord>> = BTreeMap::new();
    for record in records {
        map.entry(dict.normalize(&record.name)).or_default().push(record);
    }
    map
}

/// Row counts of a grouped comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ComparisonSummary {
    pub groups: usize,
    pub items: usize,
}

pub fn summarize(rows: &[ComparisonRow<'_>]) -> ComparisonSummary {
    let groups = rows.iter().filter(|r| r.is_header()).count();
    ComparisonSummary {
        groups,
        items: rows.len() - groups,
    }
}

/// Keep rows whose group label or either name contains `term`
/// (case-insensitive). A blank term keeps everything.
pub fn filter_rows<'a>(rows: &[ComparisonRow<'a>], term: &str) -> Vec<ComparisonRow<'a>> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return rows.to_vec();
    }
    let hit = |s: &str| s.to_lowercase().contains(&term);
    rows.iter()
        .filter(|row| match row {
            ComparisonRow::GroupHeader { label } => hit(label.as_str()),
            ComparisonRow::Item { a, b } => {
                a.is_some_and(|r| hit(&r.name)) || b.is_some_and(|r| hit(&r.name))
            }
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PriceTier;

    fn record(name: &str, source: SourceId) -> ExtractedRecord {
        ExtractedRecord {
            name: name.to_string(),
            price_tiers: vec![PriceTier::base("40", Some("kg")).unwrap()],
            unit: "N/A".to_string(),
            source,
        }
    }

    fn a(name: &str) -> ExtractedRecord {
        record(name, SourceId::SourceA)
    }

    fn b(name: &str) -> ExtractedRecord {
        record(name, SourceId::SourceB)
    }

    fn names(row: &ComparisonRow<'_>) -> (Option<String>, Option<String>) {
        match row {
            ComparisonRow::Item { a, b } => (a.map(|r| r.name.clone()), b.map(|r| r.name.clone())),
            ComparisonRow::GroupHeader { .. } => panic!("expected item row"),
        }
    }

    fn label(row: &ComparisonRow<'_>) -> String {
        match row {
            ComparisonRow::GroupHeader { label } => label.to_string(),
            ComparisonRow::Item { .. } => panic!("expected header row"),
        }
    }

    #[test]
    fn test_one_sided_group() {
        let dict = BaseItemDictionary::default();
        let recs_a = vec![a("Carrot Ooty"), a("Tomato Hybrid")];
        let recs_b = vec![b("Carrot Local")];
        let rows = group_records(&recs_a, &recs_b, &dict).unwrap();

        assert_eq!(rows.len(), 4);
        assert_eq!(label(&rows[0]), "Carrot");
        assert_eq!(names(&rows[1]), (Some("Carrot Ooty".into()), Some("Carrot Local".into())));
        assert_eq!(label(&rows[2]), "Tomato");
        assert_eq!(names(&rows[3]), (Some("Tomato Hybrid".into()), None));
        assert!(rows[3].to_columns()[4..].iter().all(|c| c.is_empty()));
    }

    #[test]
    fn test_empty_inputs_produce_no_rows() {
        let dict = BaseItemDictionary::default();
        let rows = group_records(&[], &[], &dict).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_pairing_keeps_source_order() {
        let dict = BaseItemDictionary::default();
        let recs_a = vec![a("Onion Red Nashik"), a("Onion White"), a("Onion Sambar")];
        let recs_b = vec![b("Onion Big"), b("Onion Small")];
        let rows = group_records(&recs_a, &recs_b, &dict).unwrap();

        assert_eq!(rows.len(), 4);
        assert_eq!(names(&rows[1]), (Some("Onion Red Nashik".into()), Some("Onion Big".into())));
        assert_eq!(names(&rows[2]), (Some("Onion White".into()), Some("Onion Small".into())));
        assert_eq!(names(&rows[3]), (Some("Onion Sambar".into()), None));
    }

    #[test]
    fn test_ungrouped_sorts_last() {
        let dict = BaseItemDictionary::default();
        let recs_a = vec![a("Big Pack"), a("Zucchini Green"), a("Apple Shimla")];
        let recs_b = vec![b("Basmati Rice"), b("Fresh Pack")];
        let rows = group_records(&recs_a, &recs_b, &dict).unwrap();

        let labels: Vec<String> = rows.iter().filter(|r| r.is_header()).map(label).collect();
        assert_eq!(labels, vec!["Apple", "Basmati", "Zucchini", "Ungrouped"]);

        let last_header = rows.iter().rposition(|r| r.is_header()).unwrap();
        assert_eq!(names(&rows[last_header + 1]), (Some("Big Pack".into()), Some("Fresh Pack".into())));
    }

    #[test]
    fn test_every_record_lands_in_exactly_one_row() {
        let dict = BaseItemDictionary::default();
        let recs_a = vec![a("Carrot Ooty"), a("Carrot Ooty"), a("Mango Alphonso"), a("Big Pack")];
        let recs_b = vec![b("Mango Totapuri"), b("Garlic Peeled"), b("Carrot Local")];
        let rows = group_records(&recs_a, &recs_b, &dict).unwrap();

        let mut seen_a = 0;
        let mut seen_b = 0;
        for row in &rows {
            if let ComparisonRow::Item { a, b } = row {
                seen_a += a.is_some() as usize;
                seen_b += b.is_some() as usize;
            }
        }
        assert_eq!(seen_a, recs_a.len());
        assert_eq!(seen_b, recs_b.len());

        let summary = summarize(&rows);
        assert_eq!(summary.groups, 4);
        assert_eq!(summary.items, rows.len() - 4);
    }

    #[test]
    fn test_source_mismatch_is_rejected() {
        let dict = BaseItemDictionary::default();
        let recs_a = vec![b("Carrot Local")];
        let err = group_records(&recs_a, &[], &dict).unwrap_err();
        assert_eq!(
            err,
            ComparisonError::SourceMismatch {
                expected: SourceId::SourceA,
                found: SourceId::SourceB,
                name: "Carrot Local".to_string(),
            }
        );
    }

    #[test]
    fn test_filter_rows() {
        let dict = BaseItemDictionary::default();
        let recs_a = vec![a("Carrot Ooty"), a("Tomato Hybrid")];
        let recs_b = vec![b("Carrot Local")];
        let rows = group_records(&recs_a, &recs_b, &dict).unwrap();

        let hits = filter_rows(&rows, "ooty");
        assert_eq!(hits.len(), 1);
        assert_eq!(names(&hits[0]).0.as_deref(), Some("Carrot Ooty"));

        let hits = filter_rows(&rows, "TOMATO");
        assert_eq!(hits.len(), 2);
        assert!(hits[0].is_header());

        assert_eq!(filter_rows(&rows, "  ").len(), rows.len());
    }
}
