pub mod cleaner;
pub mod fields;
pub mod selector;

use scraper::Html;
use tracing::debug;

use crate::config::ExtractionConfig;
use crate::models::{ExtractedRecord, SourceId};

use self::fields::extract_record;
use self::selector::{select_candidates, SelectorProfile};

/// What one page yielded. Records are not yet deduplicated.
#[derive(Debug, Default)]
pub struct PageExtraction {
    pub candidates: usize,
    pub records: Vec<ExtractedRecord>,
}

/// Parse one saved listing page and pull every record out of it.
///
/// Containers that yield nothing are skipped silently; a page without any
/// product simply produces an empty record list.
pub fn extract_page(
    html: &str,
    source: SourceId,
    profile: &SelectorProfile,
    cfg: &ExtractionConfig,
) -> PageExtraction {
    let doc = Html::parse_document(html);
    let candidates = select_candidates(&doc, profile, cfg);

    let records: Vec<ExtractedRecord> = candidates
        .iter()
        .filter_map(|el| extract_record(*el, source, cfg))
        .collect();

    debug!(
        "source {}: {} candidates → {} records",
        source,
        candidates.len(),
        records.len()
    );

    PageExtraction {
        candidates: candidates.len(),
        records,
    }
}
