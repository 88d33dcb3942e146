//! Record deduplication within one source's extraction pass.

use std::collections::HashSet;

use crate::models::ExtractedRecord;

/// Drop records whose `(name, composed price)` pair was already seen.
/// Stable; the comparison is exact, so case or spacing differences survive.
pub fn dedup_records(records: Vec<ExtractedRecord>) -> Vec<ExtractedRecord> {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut unique = Vec::with_capacity(records.len());

    for record in records {
        let key = (record.name.clone(), record.composed_price());
        if seen.insert(key) {
            unique.push(record);
        }
    }

    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PriceTier, SourceId};

    fn record(name: &str, amount: &str) -> ExtractedRecord {
        ExtractedRecord {
            name: name.to_string(),
            price_tiers: vec![PriceTier::fallback(amount).unwrap()],
            unit: "N/A".to_string(),
            source: SourceId::SourceB,
        }
    }

    #[test]
    fn test_identical_records_collapse() {
        let out = dedup_records(vec![record("Onion", "30"), record("Onion", "30")]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].composed_price(), "₹30");
    }

    #[test]
    fn test_first_occurrence_wins_and_order_is_kept() {
        let mut later = record("Carrot Ooty", "40");
        later.unit = "1 kg".to_string();
        let out = dedup_records(vec![
            record("Carrot Ooty", "40"),
            record("Beans French", "60"),
            later,
            record("Carrot Ooty", "42"),
        ]);
        let keys: Vec<(String, String)> = out
            .iter()
            .map(|r| (r.name.clone(), r.composed_price()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("Carrot Ooty".to_string(), "₹40".to_string()),
                ("Beans French".to_string(), "₹60".to_string()),
                ("Carrot Ooty".to_string(), "₹42".to_string()),
            ]
        );
        assert_eq!(out[0].unit, "N/A");
    }

    #[test]
    fn test_case_and_spacing_are_distinct() {
        let out = dedup_records(vec![
            record("Onion Red", "30"),
            record("onion red", "30"),
            record("Onion  Red", "30"),
        ]);
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_no_duplicate_keys_survive() {
        let names = ["Okra Local", "Okra Local", "Okra Hybrid", "Okra Local", "Okra Hybrid"];
        let amounts = ["20", "20", "20", "25", "20"];
        let input: Vec<ExtractedRecord> = names
            .iter()
            .zip(amounts.iter())
            .map(|(n, a)| record(n, a))
            .collect();
        let out = dedup_records(input);
        let keys: HashSet<(String, String)> = out
            .iter()
            .map(|r| (r.name.clone(), r.composed_price()))
            .collect();
        assert_eq!(keys.len(), out.len());
        assert_eq!(out.len(), 3);
    }
}
