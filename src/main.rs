mod config;
mod dedup;
mod document;
mod export;
mod extract;
mod grouping;
mod loader;
mod models;
mod patterns;
mod pipeline;
mod utils;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::AppConfig;
use crate::export::{export_comparison, export_records, ExportFormat};
use crate::grouping::{filter_rows, summarize, BaseItemDictionary};
use crate::loader::{PageSource, SnapshotSource};
use crate::models::{ComparisonRow, SourceId};
use crate::pipeline::{Pipeline, SourceRun};

#[derive(Parser)]
#[command(name = "pricex", about = "Wholesale produce price extraction and comparison", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Extract both sources and write the grouped comparison table
    Compare {
        /// Saved pages of source A (directory or single file)
        #[arg(long)]
        a: Option<PathBuf>,

        /// Saved pages of source B (directory or single file)
        #[arg(long)]
        b: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value = "csv")]
        format: ExportFormat,

        /// Output directory (default: export.output_dir)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Print the rows whose group or product name contains this term
        /// (the exported file always holds the full table)
        #[arg(short, long)]
        search: Option<String>,

        /// Also write each source's records to their own CSV
        #[arg(long)]
        records: bool,
    },

    /// Extract a single source and print its records
    Extract {
        path: PathBuf,

        #[arg(short, long, value_enum, default_value = "a")]
        source: SourceArg,
    },

    /// Print the base item each product name groups under
    Normalize {
        #[arg(required = true)]
        names: Vec<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SourceArg {
    A,
    B,
}

impl From<SourceArg> for SourceId {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::A => SourceId::SourceA,
            SourceArg::B => SourceId::SourceB,
        }
    }
}

fn snapshot_source(config: &AppConfig, id: SourceId) -> Result<Arc<dyn PageSource>> {
    let source = config.source(id);
    let input = source.input.clone().with_context(|| {
        format!(
            "No pages configured for source {} ({}): pass --{} or set sources.{}.input",
            id,
            source.label,
            id.to_string().to_lowercase(),
            id.to_string().to_lowercase(),
        )
    })?;
    Ok(Arc::new(SnapshotSource::new(source.label.clone(), input)))
}

fn print_source(run: &SourceRun) {
    println!("{} ({} records)", run.label, utils::fmt_count(run.records.len()));
    for record in &run.records {
        println!("  {:<40} {:<48} {}", record.name, record.composed_price(), record.unit);
    }
}

/// Grouped rows as an indented table; the full table only goes to the export.
fn print_rows(rows: &[ComparisonRow<'_>]) {
    for row in rows {
        let [group, a_name, a_price, _, b_name, b_price, _] = row.to_columns();
        if row.is_header() {
            println!("{}", group);
        } else {
            println!("  {:<36} {:<28} | {:<36} {}", a_name, a_price, b_name, b_price);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "pricex=info,warn",
        1 => "pricex=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::new(filter))
        .init();

    let mut config = AppConfig::load()?;

    match cli.command {
        Command::Compare {
            a,
            b,
            format,
            out,
            search,
            records,
        } => {
            let _t = utils::Timer::start("Price comparison");
            if let Some(path) = a {
                config.sources.a.input = Some(path);
            }
            if let Some(path) = b {
                config.sources.b.input = Some(path);
            }
            if let Some(dir) = out {
                config.export.output_dir = dir;
            }

            let source_a = snapshot_source(&config, SourceId::SourceA)?;
            let source_b = snapshot_source(&config, SourceId::SourceB)?;
            let report = Pipeline::new(config.clone()).run(source_a, source_b).await?;

            let dict = BaseItemDictionary::default();
            debug!("Grouping with {} dictionary terms", dict.len());
            let rows = report.rows(&dict)?;
            let summary = summarize(&rows);

            let (label_a, label_b) = (report.a.label.as_str(), report.b.label.as_str());
            let path = export_comparison(&config.export, format, &rows, label_a, label_b)?;
            let record_paths = if records {
                vec![
                    export_records(&config.export, label_a, &report.a.records)?,
                    export_records(&config.export, label_b, &report.b.records)?,
                ]
            } else {
                Vec::new()
            };

            println!("─────────────────────────────────");
            println!("  PriceX · Comparison Summary");
            println!("─────────────────────────────────");
            for run in [&report.a, &report.b] {
                println!(
                    "  {:<16}: {} records ({} pages, {} duplicates dropped)",
                    run.label,
                    utils::fmt_count(run.stats.records),
                    run.stats.pages,
                    run.stats.duplicates_dropped,
                );
            }
            println!("  {:<16}: {}", "Groups", utils::fmt_count(summary.groups));
            println!("  {:<16}: {}", "Item rows", utils::fmt_count(summary.items));
            println!("  {:<16}: {}", "Comparison", path.display());
            for p in &record_paths {
                println!("  {:<16}: {}", "Records", p.display());
            }
            println!("─────────────────────────────────");

            if let Some(term) = search.as_deref() {
                let matches = filter_rows(&rows, term);
                info!("Search {:?}: {} of {} rows match", term, matches.len(), rows.len());
                print_rows(&matches);
            }
        }

        Command::Extract { path, source } => {
            let id = SourceId::from(source);
            let _t = utils::Timer::start(format!("Extraction of source {}", id));
            config.source_mut(id).input = Some(path);

            let page_source = snapshot_source(&config, id)?;
            let run = Pipeline::new(config).run_source(id, page_source).await?;
            print_source(&run);
        }

        Command::Normalize { names } => {
            let dict = BaseItemDictionary::default();
            for name in &names {
                println!("{:<40} → {}", name, dict.normalize(name));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExportConfig;
    use crate::models::{ExtractedRecord, PriceTier};

    fn record(name: &str, source: SourceId) -> ExtractedRecord {
        ExtractedRecord {
            name: name.to_string(),
            price_tiers: vec![PriceTier::base("40", Some("kg")).unwrap()],
            unit: "N/A".to_string(),
            source,
        }
    }

    #[test]
    fn test_search_leaves_exported_table_whole() {
        let recs_a = vec![record("Carrot Ooty", SourceId::SourceA), record("Tomato Hybrid", SourceId::SourceA)];
        let recs_b = vec![record("Carrot Local", SourceId::SourceB)];
        let rows = grouping::group_records(&recs_a, &recs_b, &BaseItemDictionary::default()).unwrap();

        let matches = filter_rows(&rows, "tomato");
        assert_eq!(matches.len(), 2);

        let dir = tempfile::tempdir().unwrap();
        let cfg = ExportConfig {
            output_dir: dir.path().to_path_buf(),
            timestamped: false,
        };
        let path = export_comparison(&cfg, ExportFormat::Csv, &rows, "Hyperpure", "Wholesale Mandi").unwrap();
        let written = std::fs::read_to_string(path).unwrap();
        // Header line plus every grouped row.
        assert_eq!(written.lines().count(), 1 + rows.len());
        assert!(written.contains("Carrot Ooty"));
    }
}
