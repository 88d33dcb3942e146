//! Shared currency, bulk-tier and unit patterns.
//!
//! Every heuristic in the extractor reads text through these patterns, so a
//! layout change on a source site usually means touching this file only.

use lazy_static::lazy_static;
use regex::Regex;

/// Currency symbol every amount is anchored on.
pub const CURRENCY_SYMBOL: &str = "₹";

/// Amount digits, thousands groups allowed: "45", "45.50", "1,250".
const AMOUNT_DIGITS: &str = r"\d+(?:,\d+)*(?:\.\d+)?";

lazy_static! {
    /// "₹ 45" / "₹45.50" / "₹1,250": group 1 is the amount digits.
    pub static ref CURRENCY_AMOUNT: Regex = Regex::new(&format!(r"₹\s*({})", AMOUNT_DIGITS)).unwrap();

    static ref LEADING_CURRENCY: Regex = Regex::new(r"^₹").unwrap();

    // ── Bulk tiers ───────────────────────────────────────────────────────────
    // "₹45/pc for 10 pcs+" → (45, 10)
    static ref BULK_PIECE_SHORT: Regex =
        Regex::new(&format!(r"(?i)₹\s*({})\s*/\s*pc\s+for\s+(\d+)\s*pcs?\+", AMOUNT_DIGITS)).unwrap();
    static ref BULK_KILOGRAM: Regex =
        Regex::new(&format!(r"(?i)₹\s*({})\s*/\s*kg\s+for\s+(\d+)\s*kgs?\+", AMOUNT_DIGITS)).unwrap();
    static ref BULK_GRAM: Regex =
        Regex::new(&format!(r"(?i)₹\s*({})\s*/\s*gm\s+for\s+(\d+)\s*gms?\+", AMOUNT_DIGITS)).unwrap();
    static ref BULK_PIECE_LONG: Regex =
        Regex::new(&format!(r"(?i)₹\s*({})\s*/\s*piece\s+for\s+(\d+)\s*pieces?\+", AMOUNT_DIGITS)).unwrap();

    // ── Quantity / unit expressions ──────────────────────────────────────────
    static ref LEADING_QTY_SHORT: Regex = Regex::new(r"(?i)^\d+\s*(kg|gm|pc)").unwrap();
    static ref LEADING_QTY_UNIT: Regex =
        Regex::new(r"(?i)^\d+(\.\d+)?\s*(kg|gm|g|pc|piece)").unwrap();
    static ref LEADING_QTY_ANY: Regex = Regex::new(r"(?i)^\d+(\.\d+)?\s*(kg|gm|g|pc)").unwrap();

    /// Quantity embedded in a product name, e.g. "Carrot Ooty 1 kg".
    static ref NAME_QUANTITY: Regex =
        Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(kg|gm|g|pc|piece|pieces)").unwrap();

    /// Scanned in order against the container text; group 1 is the unit.
    static ref UNIT_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)(\d+\s*(?:kg|kgs|kilogram))").unwrap(),
        Regex::new(r"(?i)(\d+\s*(?:g|gm|gram|gms))").unwrap(),
        Regex::new(r"(?i)(\d+\s*(?:pc|pcs|piece|pieces))").unwrap(),
        Regex::new(r"(?i)(\d+\s*(?:ltr|litre|liter|ml))").unwrap(),
        Regex::new(r"(?i)(per\s+(?:kg|pc|piece|unit))").unwrap(),
        Regex::new(r"(?i)(\d+\s*(?:dozen))").unwrap(),
        Regex::new(r"(?i)(\d+\.?\d*\s*(?:kg|gm|g|pc))").unwrap(),
    ];

    static ref BASE_UNIT_SLASH: Regex = Regex::new(r"(?i)/(kg|pc|gm|piece)").unwrap();
    static ref BASE_UNIT_SPACED: Regex = Regex::new(r"(?i)\s(kg|pc|gm|piece)\s").unwrap();

    // ── Name rejection ───────────────────────────────────────────────────────
    static ref ONLY_QUANTITY: Regex =
        Regex::new(r"(?i)^[\d.\s]+(kg|gm|g|pc|piece|pieces|pack|packs)$").unwrap();
    static ref STARTS_WITH_QUANTITY: Regex =
        Regex::new(r"(?i)^\d+(\.\d+)?\s*(kg|gm|g|pc|pack)").unwrap();
    static ref PACK_ONLY: Regex = Regex::new(r"(?i)^(pack|packs|\d+\s*pack)$").unwrap();
}

/// Unit classes that appear in bulk-tier phrases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkUnit {
    Piece,
    Kilogram,
    Gram,
}

impl BulkUnit {
    /// Label used after the slash: "₹45/pc".
    pub fn label(self) -> &'static str {
        match self {
            BulkUnit::Piece => "pc",
            BulkUnit::Kilogram => "kg",
            BulkUnit::Gram => "gm",
        }
    }

    /// Label used after the quantity: "for 10pcs+".
    pub fn plural(self) -> &'static str {
        match self {
            BulkUnit::Piece => "pcs",
            BulkUnit::Kilogram => "kg",
            BulkUnit::Gram => "gm",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_lowercase().as_str() {
            "pc" | "pcs" | "piece" | "pieces" => Some(BulkUnit::Piece),
            "kg" | "kgs" => Some(BulkUnit::Kilogram),
            "gm" | "gms" => Some(BulkUnit::Gram),
            _ => None,
        }
    }
}

/// One currency amount found in a text, with its byte span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountMatch<'t> {
    pub amount: &'t str,
    pub start: usize,
    pub end: usize,
}

/// One bulk-tier phrase: amount per unit when buying at least `min_quantity`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkMatch<'t> {
    pub unit: BulkUnit,
    pub amount: &'t str,
    pub min_quantity: &'t str,
}

pub fn has_amount(text: &str) -> bool {
    CURRENCY_AMOUNT.is_match(text)
}

pub fn starts_with_currency(text: &str) -> bool {
    LEADING_CURRENCY.is_match(text)
}

/// All currency amounts in text order.
pub fn find_amounts(text: &str) -> Vec<AmountMatch<'_>> {
    CURRENCY_AMOUNT
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let amount = caps.get(1)?;
            Some(AmountMatch {
                amount: amount.as_str(),
                start: whole.start(),
                end: whole.end(),
            })
        })
        .collect()
}

/// Bulk-tier phrases, grouped by pattern (piece, kilogram, gram, long-form
/// piece) and in text order within each pattern.
pub fn find_bulk_tiers(text: &str) -> Vec<BulkMatch<'_>> {
    let patterns: [(&Regex, BulkUnit); 4] = [
        (&BULK_PIECE_SHORT, BulkUnit::Piece),
        (&BULK_KILOGRAM, BulkUnit::Kilogram),
        (&BULK_GRAM, BulkUnit::Gram),
        (&BULK_PIECE_LONG, BulkUnit::Piece),
    ];

    let mut found = Vec::new();
    for (re, unit) in patterns {
        for caps in re.captures_iter(text) {
            if let (Some(amount), Some(qty)) = (caps.get(1), caps.get(2)) {
                found.push(BulkMatch {
                    unit,
                    amount: amount.as_str(),
                    min_quantity: qty.as_str(),
                });
            }
        }
    }
    found
}

/// Name-strategy guard: "2kg ...", "10 pc ...".
pub fn starts_with_short_quantity(text: &str) -> bool {
    LEADING_QTY_SHORT.is_match(text)
}

/// Text-fragment guard: "0.5 kg", "6 piece ...".
pub fn starts_with_quantity_unit(text: &str) -> bool {
    LEADING_QTY_UNIT.is_match(text)
}

pub fn starts_with_any_quantity(text: &str) -> bool {
    LEADING_QTY_ANY.is_match(text)
}

/// "Carrot Ooty 1kg" → "1 kg"
pub fn quantity_in_name(name: &str) -> Option<String> {
    let caps = NAME_QUANTITY.captures(name)?;
    Some(format!("{} {}", caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}

/// First unit expression in the text, trying each unit class in order.
pub fn find_unit(text: &str) -> Option<String> {
    UNIT_PATTERNS.iter().find_map(|re| {
        re.captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
    })
}

/// Unit label near a base price: "/kg" first, then a free-standing " kg ".
pub fn find_base_unit(context: &str) -> Option<String> {
    [&*BASE_UNIT_SLASH, &*BASE_UNIT_SPACED].iter().find_map(|re| {
        re.captures(context)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    })
}

/// "0.5 kg", "2 pack" — nothing but a quantity.
pub fn is_quantity_only(name: &str) -> bool {
    ONLY_QUANTITY.is_match(name)
}

pub fn starts_with_quantity(name: &str) -> bool {
    STARTS_WITH_QUANTITY.is_match(name)
}

pub fn is_pack_only(name: &str) -> bool {
    PACK_ONLY.is_match(name)
}

/// Slice of `text` reaching `radius` characters either side of the byte span
/// `[start, end)`.
pub fn char_window(text: &str, start: usize, end: usize, radius: usize) -> &str {
    let from = text[..start]
        .char_indices()
        .rev()
        .nth(radius.saturating_sub(1))
        .map(|(i, _)| i)
        .unwrap_or(0);
    let from = if radius == 0 { start } else { from };
    let to = text[end..]
        .char_indices()
        .nth(radius)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());
    &text[from..to]
}
