use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

use crate::models::SourceId;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

/// Each source's settings are layered field by field over that source's own
/// defaults, so `PRICEX__SOURCES__A__INPUT` alone is a valid override.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(from = "SourcesOverlay")]
pub struct SourcesConfig {
    pub a: SourceConfig,
    pub b: SourceConfig,
}

/// One listing source: where its saved pages live and how to find products.
#[derive(Debug, Clone, Serialize)]
pub struct SourceConfig {
    pub label: String,

    /// Directory of page snapshots, or a single page.
    #[serde(default)]
    pub input: Option<PathBuf>,

    /// CSS queries tried for product containers; the widest result wins.
    pub selectors: Vec<String>,

    /// Below this many containers the text-based fallbacks kick in.
    pub min_candidates: usize,
}

#[derive(Debug, Default, Deserialize)]
struct SourcesOverlay {
    #[serde(default)]
    a: SourceOverlay,
    #[serde(default)]
    b: SourceOverlay,
}

#[derive(Debug, Default, Deserialize)]
struct SourceOverlay {
    label: Option<String>,
    input: Option<PathBuf>,
    selectors: Option<Vec<String>>,
    min_candidates: Option<usize>,
}

impl SourceOverlay {
    fn over(self, base: SourceConfig) -> SourceConfig {
        SourceConfig {
            label: self.label.unwrap_or(base.label),
            input: self.input.or(base.input),
            selectors: self.selectors.unwrap_or(base.selectors),
            min_candidates: self.min_candidates.unwrap_or(base.min_candidates),
        }
    }
}

impl From<SourcesOverlay> for SourcesConfig {
    fn from(overlay: SourcesOverlay) -> Self {
        Self {
            a: overlay.a.over(default_source_a()),
            b: overlay.b.over(default_source_b()),
        }
    }
}

/// Where the base price sits relative to the bulk tiers on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BasePricePosition {
    /// Summary price is printed after the tier list.
    Last,
    First,
}

/// Thresholds shared by candidate selection and field extraction.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractionConfig {
    /// Ancestors inspected upward from a price-bearing text node.
    #[serde(default = "default_ancestor_levels")]
    pub ancestor_levels: usize,

    /// Exclusive lower bound on a fallback container's text length.
    #[serde(default = "default_min_text_len")]
    pub min_text_len: usize,

    /// Exclusive upper bound on a fallback container's text length.
    #[serde(default = "default_max_text_len")]
    pub max_text_len: usize,

    /// Leading characters compared when collapsing duplicate containers.
    #[serde(default = "default_signature_len")]
    pub signature_len: usize,

    #[serde(default = "default_base_price_position")]
    pub base_price_position: BasePricePosition,

    /// Characters searched either side of the base price for its unit.
    #[serde(default = "default_unit_window")]
    pub unit_window: usize,
}

/// Pipeline configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExportConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Append `_YYYYmmdd_HHMMSS` to exported file names.
    #[serde(default = "default_true")]
    pub timestamped: bool,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_source_a() -> SourceConfig {
    SourceConfig {
        label: "Hyperpure".to_string(),
        input: None,
        selectors: [
            r#"div[class*="ProductCard"]"#,
            r#"div[class*="product-card"]"#,
            r#"div[class*="ProductTile"]"#,
            r#"div[class*="productCard"]"#,
            r#"div[class*="Card"]"#,
            r#"div[data-testid*="product"]"#,
            r#"article[class*="product"]"#,
            "article",
            r#"div[class*="card"]"#,
            r#"div[class*="item"]"#,
            r#"[data-qa*="product"]"#,
            r#"[class*="product-item"]"#,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
        min_candidates: 20,
    }
}
fn default_source_b() -> SourceConfig {
    SourceConfig {
        label: "Wholesale Mandi".to_string(),
        input: None,
        selectors: [
            r#"div[class*="product"]"#,
            r#"div[class*="item"]"#,
            "article",
            r#"div[class*="card"]"#,
            ".product-card",
            ".item-card",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
        min_candidates: 5,
    }
}
fn default_ancestor_levels() -> usize {
    5
}
fn default_min_text_len() -> usize {
    20
}
fn default_max_text_len() -> usize {
    600
}
fn default_signature_len() -> usize {
    100
}
fn default_base_price_position() -> BasePricePosition {
    BasePricePosition::Last
}
fn default_unit_window() -> usize {
    50
}
fn default_concurrency() -> usize {
    3
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}
fn default_true() -> bool {
    true
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            a: default_source_a(),
            b: default_source_b(),
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            ancestor_levels: default_ancestor_levels(),
            min_text_len: default_min_text_len(),
            max_text_len: default_max_text_len(),
            signature_len: default_signature_len(),
            base_price_position: default_base_price_position(),
            unit_window: default_unit_window(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            timestamped: true,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sources: SourcesConfig::default(),
            extraction: ExtractionConfig::default(),
            pipeline: PipelineConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("PRICEX").separator("__"))
            .build()?;

        let app_cfg: AppConfig = cfg.try_deserialize().unwrap_or_else(|e| {
            warn!("Invalid configuration ({}), using defaults", e);
            AppConfig::default()
        });
        Ok(app_cfg)
    }

    pub fn source(&self, id: SourceId) -> &SourceConfig {
        match id {
            SourceId::SourceA => &self.sources.a,
            SourceId::SourceB => &self.sources.b,
        }
    }

    pub fn source_mut(&mut self, id: SourceId) -> &mut SourceConfig {
        match id {
            SourceId::SourceA => &mut self.sources.a,
            SourceId::SourceB => &mut self.sources.b,
        }
    }
}
