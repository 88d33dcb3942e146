//! Comparison and per-source exports (CSV / JSON).

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::ExportConfig;
use crate::models::{ComparisonRow, ExtractedRecord};

/// Spreadsheet applications need it to read the ₹ sign as UTF-8.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

/// "Wholesale Mandi" → "WholesaleMandi"
fn column_prefix(label: &str) -> String {
    label.split_whitespace().collect()
}

pub fn comparison_headers(label_a: &str, label_b: &str) -> [String; 7] {
    let a = column_prefix(label_a);
    let b = column_prefix(label_b);
    [
        "Group".to_string(),
        format!("{}_Name", a),
        format!("{}_Price", a),
        format!("{}_Unit", a),
        format!("{}_Name", b),
        format!("{}_Price", b),
        format!("{}_Unit", b),
    ]
}

/// Rows in table order, one CSV line each, behind a UTF-8 BOM.
pub fn write_comparison_csv<W: Write>(
    mut out: W,
    rows: &[ComparisonRow<'_>],
    label_a: &str,
    label_b: &str,
) -> Result<()> {
    out.write_all(UTF8_BOM)?;
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(comparison_headers(label_a, label_b))?;
    for row in rows {
        writer.write_record(row.to_columns())?;
    }
    writer.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct ComparisonDocument<'r, 'a> {
    source_a: &'r str,
    source_b: &'r str,
    rows: &'r [ComparisonRow<'a>],
}

pub fn write_comparison_json<W: Write>(
    out: W,
    rows: &[ComparisonRow<'_>],
    label_a: &str,
    label_b: &str,
) -> Result<()> {
    let doc = ComparisonDocument {
        source_a: label_a,
        source_b: label_b,
        rows,
    };
    serde_json::to_writer_pretty(out, &doc)?;
    Ok(())
}

/// One source's records as `Name, Price, Unit`.
pub fn write_records_csv<W: Write>(mut out: W, records: &[ExtractedRecord]) -> Result<()> {
    out.write_all(UTF8_BOM)?;
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["Name", "Price", "Unit"])?;
    for record in records {
        let price = record.composed_price();
        writer.write_record([record.name.as_str(), price.as_str(), record.unit.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

/// `<dir>/<stem>[_YYYYmmdd_HHMMSS].<ext>`
pub fn output_path(dir: &Path, stem: &str, ext: &str, stamp: Option<NaiveDateTime>) -> PathBuf {
    let name = match stamp {
        Some(ts) => format!("{}_{}.{}", stem, ts.format("%Y%m%d_%H%M%S"), ext),
        None => format!("{}.{}", stem, ext),
    };
    dir.join(name)
}

fn create(cfg: &ExportConfig, stem: &str, ext: &str) -> Result<(PathBuf, BufWriter<File>)> {
    std::fs::create_dir_all(&cfg.output_dir)
        .with_context(|| format!("Creating {:?}", cfg.output_dir))?;
    let stamp = cfg.timestamped.then(|| Local::now().naive_local());
    let path = output_path(&cfg.output_dir, stem, ext, stamp);
    let file = File::create(&path).with_context(|| format!("Creating {:?}", path))?;
    Ok((path, BufWriter::new(file)))
}

/// Write the grouped table under `export.output_dir`.
pub fn export_comparison(
    cfg: &ExportConfig,
    format: ExportFormat,
    rows: &[ComparisonRow<'_>],
    label_a: &str,
    label_b: &str,
) -> Result<PathBuf> {
    let (path, out) = create(cfg, "price_comparison", format.extension())?;
    match format {
        ExportFormat::Csv => write_comparison_csv(out, rows, label_a, label_b),
        ExportFormat::Json => write_comparison_json(out, rows, label_a, label_b),
    }
    .with_context(|| format!("Writing {:?}", path))?;
    info!("Wrote {} rows to {:?}", rows.len(), path);
    Ok(path)
}

/// Write one source's records as `<label>_products[_timestamp].csv`.
pub fn export_records(cfg: &ExportConfig, label: &str, records: &[ExtractedRecord]) -> Result<PathBuf> {
    let stem = format!("{}_products", label.split_whitespace().collect::<Vec<_>>().join("_").to_lowercase());
    let (path, out) = create(cfg, &stem, "csv")?;
    write_records_csv(out, records).with_context(|| format!("Writing {:?}", path))?;
    info!("Wrote {} records to {:?}", records.len(), path);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BaseItemKey, PriceTier, SourceId};
    use chrono::NaiveDate;

    fn onion(source: SourceId, amount: &str) -> ExtractedRecord {
        ExtractedRecord {
            name: "Onion, Nashik".to_string(),
            price_tiers: vec![PriceTier::base(amount, Some("kg")).unwrap()],
            unit: "1 kg".to_string(),
            source,
        }
    }

    #[test]
    fn test_comparison_csv_layout() {
        let a = onion(SourceId::SourceA, "30");
        let rows = vec![
            ComparisonRow::GroupHeader {
                label: BaseItemKey::new("Onion"),
            },
            ComparisonRow::Item { a: Some(&a), b: None },
        ];

        let mut buf = Vec::new();
        write_comparison_csv(&mut buf, &rows, "Hyperpure", "Wholesale Mandi").unwrap();

        assert!(buf.starts_with(UTF8_BOM));
        let text = String::from_utf8(buf[UTF8_BOM.len()..].to_vec()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Group,Hyperpure_Name,Hyperpure_Price,Hyperpure_Unit,WholesaleMandi_Name,WholesaleMandi_Price,WholesaleMandi_Unit",
                "Onion,,,,,,",
                r#","Onion, Nashik",Base: ₹30/kg,1 kg,,,"#,
            ]
        );
    }

    #[test]
    fn test_comparison_json_is_tagged() {
        let b = onion(SourceId::SourceB, "28");
        let rows = vec![
            ComparisonRow::GroupHeader {
                label: BaseItemKey::new("Onion"),
            },
            ComparisonRow::Item { a: None, b: Some(&b) },
        ];

        let mut buf = Vec::new();
        write_comparison_json(&mut buf, &rows, "Hyperpure", "Wholesale Mandi").unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(value["source_b"], "Wholesale Mandi");
        assert_eq!(value["rows"][0]["row"], "group_header");
        assert_eq!(value["rows"][0]["label"], "Onion");
        assert_eq!(value["rows"][1]["row"], "item");
        assert!(value["rows"][1]["a"].is_null());
        assert_eq!(value["rows"][1]["b"]["name"], "Onion, Nashik");
    }

    #[test]
    fn test_records_csv() {
        let mut buf = Vec::new();
        write_records_csv(&mut buf, &[onion(SourceId::SourceA, "30")]).unwrap();
        let text = String::from_utf8(buf[UTF8_BOM.len()..].to_vec()).unwrap();
        assert_eq!(text, "Name,Price,Unit\n\"Onion, Nashik\",Base: ₹30/kg,1 kg\n");
    }

    #[test]
    fn test_output_path() {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(7, 5, 1)
            .unwrap();
        let dir = Path::new("output");
        assert_eq!(
            output_path(dir, "price_comparison", "csv", Some(ts)),
            dir.join("price_comparison_20240309_070501.csv")
        );
        assert_eq!(output_path(dir, "price_comparison", "json", None), dir.join("price_comparison.json"));
    }

    #[test]
    fn test_export_records_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("output");
        let cfg = ExportConfig {
            output_dir: out.clone(),
            timestamped: false,
        };
        let path = export_records(&cfg, "Wholesale Mandi", &[onion(SourceId::SourceB, "28")]).unwrap();
        assert_eq!(path, out.join("wholesale_mandi_products.csv"));
        assert!(std::fs::read(&path).unwrap().starts_with(UTF8_BOM));
    }
}
