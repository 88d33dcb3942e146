//! Field extraction: one product container in, one record (or nothing) out.
//!
//! Names come from a cascade of strategies tried in order. Prices are read
//! from the container's flattened text: bulk tiers first, then the base price,
//! then a bare fallback amount.

use scraper::ElementRef;
use tracing::trace;

use super::cleaner::{clean_name, validate_name};
use crate::config::{BasePricePosition, ExtractionConfig};
use crate::document::{self, char_len, has_letter};
use crate::models::{ExtractedRecord, PriceTier, SourceId, UNIT_UNKNOWN};
use crate::patterns;

/// Tags inspected by the first name strategy, in priority order.
const NAME_TAGS: [&str; 9] = ["h1", "h2", "h3", "h4", "h5", "h6", "p", "span", "div"];

/// Button labels that are never product names.
const BUTTON_WORDS: [&str; 4] = ["add", "added", "view", "buy"];

pub type NameStrategy = fn(ElementRef<'_>) -> Option<String>;

/// Name strategies in the order they are tried.
pub const NAME_STRATEGIES: [(&str, NameStrategy); 4] = [
    ("tagged element", name_from_tagged_elements),
    ("line before price", name_from_line_before_price),
    ("longest fragment", name_from_longest_fragment),
    ("first fragment", name_from_first_fragment),
];

/// Build a record from one container, or `None` when no usable name or
/// price can be read from it.
pub fn extract_record(
    el: ElementRef<'_>,
    source: SourceId,
    cfg: &ExtractionConfig,
) -> Option<ExtractedRecord> {
    let text = document::flat_text(el);

    let raw_name = NAME_STRATEGIES.iter().find_map(|(label, strategy)| {
        let name = strategy(el)?;
        trace!("name via {}: {:?}", label, name);
        Some(name)
    });
    let tiers = extract_price_tiers(&text, cfg);

    let Some(raw_name) = raw_name else {
        trace!("no name in {:?}", preview(&text));
        return None;
    };
    if tiers.is_empty() {
        trace!("no price for {:?}", raw_name);
        return None;
    }

    let unit = extract_unit(&raw_name, &text);
    let name = clean_name(&raw_name);
    if let Err(reason) = validate_name(&name) {
        trace!("rejected {:?}: {}", name, reason);
        return None;
    }

    Some(ExtractedRecord {
        name,
        price_tiers: tiers,
        unit,
        source,
    })
}

// ── Name strategies ───────────────────────────────────────────────────────────

/// First heading/paragraph/inline element with a name-shaped text.
pub fn name_from_tagged_elements(el: ElementRef<'_>) -> Option<String> {
    let descendants = document::descendant_elements(el);
    NAME_TAGS.iter().find_map(|tag| {
        descendants
            .iter()
            .filter(|d| d.value().name() == *tag)
            .map(|d| document::stripped_text(*d))
            .find(|text| {
                let len = char_len(text);
                5 < len
                    && len < 100
                    && !patterns::starts_with_currency(text)
                    && !patterns::starts_with_short_quantity(text)
                    && !BUTTON_WORDS.contains(&text.to_lowercase().as_str())
                    && has_letter(text)
            })
    })
}

/// The nearest name-like line above a line carrying a price.
pub fn name_from_line_before_price(el: ElementRef<'_>) -> Option<String> {
    let text = document::flat_text(el);
    let lines: Vec<&str> = text
        .split('\n')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| patterns::has_amount(line))
        .find_map(|(i, _)| {
            lines[..i].iter().rev().find(|line| {
                let len = char_len(line);
                5 < len
                    && len < 100
                    && !line.starts_with(|c: char| c.is_ascii_digit())
                    && has_letter(line)
            })
        })
        .map(|line| line.to_string())
}

/// Longest price-free text fragment that does not open with a quantity.
pub fn name_from_longest_fragment(el: ElementRef<'_>) -> Option<String> {
    let mut best: Option<&str> = None;
    for fragment in el.text().map(str::trim) {
        let len = char_len(fragment);
        let usable = 10 < len
            && len < 100
            && !patterns::has_amount(fragment)
            && !patterns::starts_with_quantity_unit(fragment)
            && has_letter(fragment);
        if usable && best.is_none_or(|b| char_len(b) < len) {
            best = Some(fragment);
        }
    }
    best.map(str::to_string)
}

/// Any fragment with a few letters that is not a bare quantity or price.
pub fn name_from_first_fragment(el: ElementRef<'_>) -> Option<String> {
    document::stripped_strings(el).into_iter().find(|text| {
        !patterns::starts_with_any_quantity(text)
            && !patterns::starts_with_currency(text)
            && char_len(text) > 4
            && has_letter(text)
    })
}

// ── Prices ────────────────────────────────────────────────────────────────────

/// Bulk tiers (largest minimum quantity first), then the base price, then a
/// bare amount if neither was found.
pub fn extract_price_tiers(text: &str, cfg: &ExtractionConfig) -> Vec<PriceTier> {
    let mut tiers: Vec<PriceTier> = patterns::find_bulk_tiers(text)
        .into_iter()
        .filter_map(|m| PriceTier::bulk(m.amount, m.min_quantity, m.unit))
        .collect();
    tiers.sort_by(|a, b| b.min_quantity.cmp(&a.min_quantity));

    let amounts = patterns::find_amounts(text);
    let base = match cfg.base_price_position {
        BasePricePosition::Last => amounts.last(),
        BasePricePosition::First => amounts.first(),
    };
    if let Some(m) = base {
        let context = patterns::char_window(text, m.start, m.end, cfg.unit_window);
        let unit = patterns::find_base_unit(context);
        tiers.extend(PriceTier::base(m.amount, unit.as_deref()));
    }

    if tiers.is_empty() {
        tiers.extend(amounts.first().and_then(|m| PriceTier::fallback(m.amount)));
    }
    tiers
}

// ── Unit ──────────────────────────────────────────────────────────────────────

/// Quantity embedded in the name, else the first unit expression in the text.
pub fn extract_unit(raw_name: &str, text: &str) -> String {
    patterns::quantity_in_name(raw_name)
        .or_else(|| patterns::find_unit(text))
        .unwrap_or_else(|| UNIT_UNKNOWN.to_string())
}

fn preview(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ").chars().take(60).collect()
}
