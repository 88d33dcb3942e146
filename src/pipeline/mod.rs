//! Pipeline orchestrator: ties loader → extract → dedup → grouping together.
//!
//! Each source is run independently. Pages are parsed on the blocking pool,
//! at most `pipeline.concurrency` at a time, and their records are
//! concatenated back in page order before the per-source dedup pass.

use crate::config::{AppConfig, ExtractionConfig};
use crate::dedup::dedup_records;
use crate::extract::selector::SelectorProfile;
use crate::extract::{extract_page, PageExtraction};
use crate::grouping::{group_records, BaseItemDictionary, ComparisonError};
use crate::loader::PageSource;
use crate::models::{ComparisonRow, ExtractedRecord, SourceId};
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

pub struct Pipeline {
    config: AppConfig,
}

impl Pipeline {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Run both sources and keep their records for grouping.
    pub async fn run(
        &self,
        source_a: Arc<dyn PageSource>,
        source_b: Arc<dyn PageSource>,
    ) -> Result<ComparisonReport> {
        let a = self.run_source(SourceId::SourceA, source_a).await?;
        let b = self.run_source(SourceId::SourceB, source_b).await?;
        Ok(ComparisonReport { a, b })
    }

    /// Load, extract and dedup one source.
    pub async fn run_source(&self, id: SourceId, source: Arc<dyn PageSource>) -> Result<SourceRun> {
        let label = source.label().to_string();
        info!("=== Source {} ({}) ===", id, label);

        let pages = source
            .fetch_pages()
            .await
            .with_context(|| format!("Loading pages for {}", label))?;

        let profile = Arc::new(SelectorProfile::from_source(self.config.source(id)));
        debug!("{}: {} pages, {} container queries", label, pages.len(), profile.len());
        let cfg: Arc<ExtractionConfig> = Arc::new(self.config.extraction.clone());
        let sem = Arc::new(Semaphore::new(self.config.pipeline.concurrency.max(1)));

        let mut handles = Vec::with_capacity(pages.len());
        for page in pages {
            let origin = page.origin.clone();
            let profile = Arc::clone(&profile);
            let cfg = Arc::clone(&cfg);
            let sem = Arc::clone(&sem);

            let handle = tokio::spawn(async move {
                let _permit = sem.acquire().await?;
                let extraction = tokio::task::spawn_blocking(move || {
                    extract_page(&page.html, id, &profile, &cfg)
                })
                .await?;
                Ok::<PageExtraction, anyhow::Error>(extraction)
            });

            handles.push((origin, handle));
        }

        let mut stats = SourceStats {
            pages: handles.len(),
            ..SourceStats::default()
        };
        let mut records = Vec::new();

        for (origin, handle) in handles {
            match handle.await {
                Ok(Ok(page)) => {
                    info!("{}: {} candidates, {} records", origin, page.candidates, page.records.len());
                    stats.candidates += page.candidates;
                    stats.extracted += page.records.len();
                    records.extend(page.records);
                }
                Ok(Err(e)) => {
                    warn!("{}: {:#}", origin, e);
                    stats.failed_pages += 1;
                }
                Err(e) => {
                    error!("Task panic for {}: {}", origin, e);
                    stats.failed_pages += 1;
                }
            }
        }

        let records = dedup_records(records);
        stats.duplicates_dropped = stats.extracted - records.len();
        stats.records = records.len();

        if stats.candidates == 0 {
            warn!("{}: no product containers found", label);
        }
        info!(
            "=== {}: {} pages | {} candidates | {} extracted | {} duplicates | {} records ===",
            label, stats.pages, stats.candidates, stats.extracted, stats.duplicates_dropped, stats.records,
        );

        Ok(SourceRun { label, records, stats })
    }
}

/// Counters for one source's run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceStats {
    pub pages: usize,
    pub failed_pages: usize,
    pub candidates: usize,
    pub extracted: usize,
    pub duplicates_dropped: usize,
    pub records: usize,
}

#[derive(Debug)]
pub struct SourceRun {
    pub label: String,
    pub records: Vec<ExtractedRecord>,
    pub stats: SourceStats,
}

/// Both sources' deduplicated records, ready to be grouped.
#[derive(Debug)]
pub struct ComparisonReport {
    pub a: SourceRun,
    pub b: SourceRun,
}

impl ComparisonReport {
    pub fn rows(&self, dict: &BaseItemDictionary) -> Result<Vec<ComparisonRow<'_>>, ComparisonError> {
        group_records(&self.a.records, &self.b.records, dict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouping::summarize;
    use crate::loader::{LoadError, PageSnapshot, SnapshotSource};
    use async_trait::async_trait;
    use tempfile::TempDir;

    struct FixedPages(Vec<PageSnapshot>);

    #[async_trait]
    impl PageSource for FixedPages {
        fn label(&self) -> &str {
            "fixed"
        }

        async fn fetch_pages(&self) -> Result<Vec<PageSnapshot>, LoadError> {
            Ok(self.0.clone())
        }
    }

    fn card(class: &str, name: &str, price: &str) -> String {
        format!(r#"<div class="{}"><h3>{}</h3><span>{}</span></div>"#, class, name, price)
    }

    fn page(cards: &[String]) -> String {
        format!("<html><body><main>{}</main></body></html>", cards.concat())
    }

    fn test_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.source_mut(SourceId::SourceA).min_candidates = 1;
        config.source_mut(SourceId::SourceB).min_candidates = 1;
        config.pipeline.concurrency = 2;
        config
    }

    #[test]
    fn test_multi_page_source_dedups_across_pages() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("page_01.html"),
            page(&[
                card("ProductCard", "Fresh Cauliflower (Big)", "₹45/pc for 10 pcs+ Base: ₹55/pc"),
                card("ProductCard", "Onion Nashik Red", "₹30/kg"),
            ]),
        )
        .unwrap();
        std::fs::write(
            dir.path().join("page_02.html"),
            page(&[
                card("ProductCard", "Onion Nashik Red", "₹30/kg"),
                card("ProductCard", "Carrot Ooty", "₹40/kg"),
            ]),
        )
        .unwrap();

        let source_b = FixedPages(vec![PageSnapshot {
            origin: "mandi".to_string(),
            html: page(&[
                card("product-tile", "Onion Big Bulb", "₹28/kg"),
                card("product-tile", "Carrot Local", "₹35/kg"),
            ]),
        }]);

        let pipeline = Pipeline::new(test_config());
        let report = tokio_test::block_on(pipeline.run(
            Arc::new(SnapshotSource::new("Hyperpure", dir.path())),
            Arc::new(source_b),
        ))
        .unwrap();

        assert_eq!(
            report.a.stats,
            SourceStats {
                pages: 2,
                failed_pages: 0,
                candidates: 4,
                extracted: 4,
                duplicates_dropped: 1,
                records: 3,
            }
        );
        let names: Vec<&str> = report.a.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Fresh Cauliflower (Big)", "Onion Nashik Red", "Carrot Ooty"]);
        assert_eq!(report.b.stats.records, 2);
        assert!(report.b.records.iter().all(|r| r.source == SourceId::SourceB));

        let rows = report.rows(&BaseItemDictionary::default()).unwrap();
        let summary = summarize(&rows);
        assert_eq!(summary.groups, 3);
        assert_eq!(summary.items, 3);
    }

    #[test]
    fn test_empty_source_yields_no_records() {
        let pipeline = Pipeline::new(test_config());
        let run = tokio_test::block_on(
            pipeline.run_source(SourceId::SourceB, Arc::new(FixedPages(vec![]))),
        )
        .unwrap();
        assert_eq!(run.stats, SourceStats::default());
        assert!(run.records.is_empty());
    }

    #[test]
    fn test_missing_input_fails_the_source() {
        let pipeline = Pipeline::new(test_config());
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing-input");
        let result = tokio_test::block_on(pipeline.run_source(
            SourceId::SourceA,
            Arc::new(SnapshotSource::new("Hyperpure", missing)),
        ));
        assert!(result.is_err());
    }
}
