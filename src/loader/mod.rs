//! Page snapshot loading.
//!
//! Acquiring pages (navigation, lazy loading, pagination) happens outside this
//! crate; what arrives here is one saved HTML file per listing page.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("input {0:?} does not exist")]
    Missing(PathBuf),

    #[error("failed to read {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One fully loaded listing page.
#[derive(Debug, Clone)]
pub struct PageSnapshot {
    pub origin: String,
    pub html: String,
}

// ── Source trait ──────────────────────────────────────────────────────────────

/// Swappable provider of listing pages for one source.
#[async_trait]
pub trait PageSource: Send + Sync {
    fn label(&self) -> &str;
    async fn fetch_pages(&self) -> Result<Vec<PageSnapshot>, LoadError>;
}

/// Pages saved on disk: a single file, or every `.html`/`.htm` file of a
/// directory in file-name order (so `page_01.html`, `page_02.html`, … keep
/// their pagination order). Pages that cannot be read are skipped.
pub struct SnapshotSource {
    label: String,
    input: PathBuf,
}

impl SnapshotSource {
    pub fn new(label: impl Into<String>, input: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            input: input.into(),
        }
    }
}

#[async_trait]
impl PageSource for SnapshotSource {
    fn label(&self) -> &str {
        &self.label
    }

    async fn fetch_pages(&self) -> Result<Vec<PageSnapshot>, LoadError> {
        let paths = discover_pages(&self.input)?;
        if paths.is_empty() {
            warn!("{}: no HTML pages under {:?}", self.label, self.input);
        }

        let mut pages = Vec::with_capacity(paths.len());
        for path in paths {
            debug!("{}: loading {:?}", self.label, path);
            match tokio::fs::read_to_string(&path).await {
                Ok(html) => pages.push(PageSnapshot {
                    origin: path.display().to_string(),
                    html,
                }),
                Err(e) => warn!("{}: skipping unreadable page {:?}: {}", self.label, path, e),
            }
        }

        info!("{}: {} pages loaded", self.label, pages.len());
        Ok(pages)
    }
}

fn is_html(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"))
        .unwrap_or(false)
}

/// HTML files at `input`, sorted by file name.
pub fn discover_pages(input: &Path) -> Result<Vec<PathBuf>, LoadError> {
    if !input.exists() {
        return Err(LoadError::Missing(input.to_path_buf()));
    }
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }

    let io_err = |source| LoadError::Io {
        path: input.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in std::fs::read_dir(input).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file() && is_html(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
