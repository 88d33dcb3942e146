use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::patterns::{BulkUnit, CURRENCY_SYMBOL};

// ── Source ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceId {
    SourceA,
    SourceB,
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceId::SourceA => write!(f, "A"),
            SourceId::SourceB => write!(f, "B"),
        }
    }
}

// ── Price tier ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TierKind {
    /// "₹45/pc for 10pcs+"
    Bulk,
    /// "Base: ₹55/pc"
    Base,
    /// "₹55" — used only when nothing else was found
    Fallback,
}

/// Amount per unit when buying at least `min_quantity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceTier {
    pub amount: Decimal,
    /// Amount digits as printed on the page ("045", "1,250").
    pub written: String,
    pub min_quantity: u32,
    pub unit_label: String,
    pub kind: TierKind,
}

impl PriceTier {
    /// Returns `None` unless `amount > 0` and `min_quantity >= 1`. Amounts
    /// beyond `Decimal` precision are rejected the same way.
    pub fn new(amount: &str, min_quantity: u32, unit_label: &str, kind: TierKind) -> Option<Self> {
        let written = amount.trim();
        let value = Decimal::from_str(&written.replace(',', "")).ok()?;
        if value <= Decimal::ZERO || min_quantity == 0 {
            return None;
        }
        Some(Self {
            amount: value,
            written: written.to_string(),
            min_quantity,
            unit_label: unit_label.to_string(),
            kind,
        })
    }

    pub fn bulk(amount: &str, min_quantity: &str, unit: BulkUnit) -> Option<Self> {
        let qty: u32 = min_quantity.parse().ok()?;
        Self::new(amount, qty, unit.label(), TierKind::Bulk)
    }

    pub fn base(amount: &str, unit_label: Option<&str>) -> Option<Self> {
        Self::new(amount, 1, unit_label.unwrap_or(""), TierKind::Base)
    }

    pub fn fallback(amount: &str) -> Option<Self> {
        Self::new(amount, 1, "", TierKind::Fallback)
    }
}

impl fmt::Display for PriceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TierKind::Bulk => {
                let plural = BulkUnit::from_label(&self.unit_label)
                    .map(BulkUnit::plural)
                    .unwrap_or(self.unit_label.as_str());
                write!(
                    f,
                    "{}{}/{} for {}{}+",
                    CURRENCY_SYMBOL, self.written, self.unit_label, self.min_quantity, plural
                )
            }
            TierKind::Base if self.unit_label.is_empty() => {
                write!(f, "Base: {}{}", CURRENCY_SYMBOL, self.written)
            }
            TierKind::Base => {
                write!(f, "Base: {}{}/{}", CURRENCY_SYMBOL, self.written, self.unit_label)
            }
            TierKind::Fallback => write!(f, "{}{}", CURRENCY_SYMBOL, self.written),
        }
    }
}

// ── Extracted record ──────────────────────────────────────────────────────────

/// Unit placeholder when nothing was recognised.
pub const UNIT_UNKNOWN: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    pub name: String,
    pub price_tiers: Vec<PriceTier>, // never empty
    pub unit: String,
    pub source: SourceId,
}

impl ExtractedRecord {
    /// Display strings of every tier joined with " | ".
    pub fn composed_price(&self) -> String {
        self.price_tiers
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

// ── Base item key ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BaseItemKey(String);

impl BaseItemKey {
    pub const UNGROUPED: &'static str = "Ungrouped";

    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn ungrouped() -> Self {
        Self(Self::UNGROUPED.to_string())
    }

    pub fn is_ungrouped(&self) -> bool {
        self.0 == Self::UNGROUPED
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BaseItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Comparison rows ───────────────────────────────────────────────────────────

/// One row of the grouped comparison. Rows borrow the per-source records.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "row", rename_all = "snake_case")]
pub enum ComparisonRow<'a> {
    GroupHeader {
        label: BaseItemKey,
    },
    Item {
        a: Option<&'a ExtractedRecord>,
        b: Option<&'a ExtractedRecord>,
    },
}

impl<'a> ComparisonRow<'a> {
    pub fn is_header(&self) -> bool {
        matches!(self, ComparisonRow::GroupHeader { .. })
    }

    /// Seven flat columns: group, then name/price/unit for each source.
    /// Header rows only fill the group column.
    pub fn to_columns(&self) -> [String; 7] {
        match self {
            ComparisonRow::GroupHeader { label } => [
                label.to_string(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
            ],
            ComparisonRow::Item { a, b } => {
                let [an, ap, au] = record_columns(*a);
                let [bn, bp, bu] = record_columns(*b);
                [String::new(), an, ap, au, bn, bp, bu]
            }
        }
    }
}

fn record_columns(record: Option<&ExtractedRecord>) -> [String; 3] {
    match record {
        Some(r) => [r.name.clone(), r.composed_price(), r.unit.clone()],
        None => [String::new(), String::new(), String::new()],
    }
}
