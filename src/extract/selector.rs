//! Candidate selection: which sub-trees of a listing page are products.
//!
//! Pages carry no reliable schema, so every query in the profile is tried and
//! the widest match wins. When that still yields too few containers, two
//! text-driven passes add anything that looks like a priced block.

use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::config::{ExtractionConfig, SourceConfig};
use crate::document::{self, BLOCK_TAGS};
use crate::patterns;

/// Compiled container queries plus the floor that triggers the fallbacks.
pub struct SelectorProfile {
    queries: Vec<(String, Selector)>,
    min_candidates: usize,
}

impl SelectorProfile {
    /// Queries that fail to parse are dropped with a warning.
    pub fn new(queries: &[String], min_candidates: usize) -> Self {
        let queries = queries
            .iter()
            .filter_map(|q| match Selector::parse(q) {
                Ok(sel) => Some((q.clone(), sel)),
                Err(e) => {
                    warn!("Skipping selector '{}': {}", q, e);
                    None
                }
            })
            .collect();
        Self {
            queries,
            min_candidates,
        }
    }

    pub fn from_source(source: &SourceConfig) -> Self {
        Self::new(&source.selectors, source.min_candidates)
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }
}

/// Product containers found in `doc`, deduplicated by text signature.
pub fn select_candidates<'a>(
    doc: &'a Html,
    profile: &SelectorProfile,
    cfg: &ExtractionConfig,
) -> Vec<ElementRef<'a>> {
    let mut candidates = widest_query_match(doc, profile);

    if candidates.len() < profile.min_candidates {
        let before = candidates.len();
        add_priced_blocks(doc, cfg, &mut candidates);
        debug!("Block scan added {} candidates", candidates.len() - before);
    }

    if candidates.len() < profile.min_candidates {
        let before = candidates.len();
        add_price_ancestors(doc, cfg, &mut candidates);
        debug!("Ancestor walk added {} candidates", candidates.len() - before);
    }

    dedup_by_signature(candidates, cfg.signature_len)
}

/// Greedy widest match: a later query replaces the current set only when it
/// matches strictly more elements.
fn widest_query_match<'a>(doc: &'a Html, profile: &SelectorProfile) -> Vec<ElementRef<'a>> {
    let mut best: Vec<ElementRef<'a>> = Vec::new();
    for (query, sel) in &profile.queries {
        let found: Vec<ElementRef<'a>> = doc.select(sel).collect();
        debug!("'{}' matched {}", query, found.len());
        if found.len() > best.len() {
            best = found;
        }
    }
    best
}

/// Contains an amount and has a plausible single-product text length.
fn looks_like_product(text: &str, cfg: &ExtractionConfig) -> bool {
    let len = document::char_len(text);
    cfg.min_text_len < len && len < cfg.max_text_len && patterns::has_amount(text)
}

fn add_priced_blocks<'a>(
    doc: &'a Html,
    cfg: &ExtractionConfig,
    candidates: &mut Vec<ElementRef<'a>>,
) {
    let mut present: HashSet<_> = candidates.iter().map(|el| el.id()).collect();
    for el in document::elements_by_tag(doc, &BLOCK_TAGS) {
        if looks_like_product(&document::flat_text(el), cfg) && present.insert(el.id()) {
            candidates.push(el);
        }
    }
}

fn add_price_ancestors<'a>(
    doc: &'a Html,
    cfg: &ExtractionConfig,
    candidates: &mut Vec<ElementRef<'a>>,
) {
    let mut present: HashSet<_> = candidates.iter().map(|el| el.id()).collect();
    for (text, parent) in document::text_nodes(doc) {
        if !patterns::has_amount(text) {
            continue;
        }
        let hit = document::self_and_ancestors(parent, cfg.ancestor_levels)
            .into_iter()
            .find(|el| {
                !present.contains(&el.id()) && looks_like_product(&document::flat_text(*el), cfg)
            });
        if let Some(el) = hit {
            present.insert(el.id());
            candidates.push(el);
        }
    }
}

/// Stable dedup on the first `signature_len` characters of each container's
/// text. Structurally distinct but textually identical nodes collapse.
fn dedup_by_signature(candidates: Vec<ElementRef<'_>>, signature_len: usize) -> Vec<ElementRef<'_>> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|el| {
            let signature: String = el.text().flat_map(str::chars).take(signature_len).collect();
            seen.insert(signature)
        })
        .collect()
}
