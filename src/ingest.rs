//! Sales export ingestion
//!
//! Reads a POS sales CSV export into raw rows. Exports arrive in two dialects
//! (semicolon or comma delimited), sometimes with a UTF-8 BOM and an
//! `IMTString(n):` transport prefix glued to the header line; both are
//! stripped before parsing. Malformed rows are skipped with a warning, never
//! fatal.

use crate::models::RawSaleRow;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Load and parse a sales CSV export file.
pub fn load_sales_csv(path: &Path) -> Result<Vec<RawSaleRow>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read sales export: {}", path.display()))?;
    let rows = parse_sales_text(&text)?;
    debug!(path = %path.display(), rows = rows.len(), "Parsed sales export");
    Ok(rows)
}

/// Parse sales export text into raw rows.
pub fn parse_sales_text(text: &str) -> Result<Vec<RawSaleRow>> {
    let cleaned = clean_export_text(text);
    if cleaned.trim().is_empty() {
        return Ok(Vec::new());
    }

    let delimiter = detect_delimiter(cleaned);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(cleaned.as_bytes());

    let mut rows = Vec::new();
    for (index, result) in reader.deserialize::<RawSaleRow>().enumerate() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => warn!(row = index + 1, error = %e, "Skipping malformed CSV row"),
        }
    }

    Ok(rows)
}

/// Strip the UTF-8 BOM and the `IMTString(n):` transport prefix.
fn clean_export_text(text: &str) -> &str {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text).trim_start();

    if let Some(rest) = text.strip_prefix("IMTString(") {
        if let Some(close) = rest.find("):") {
            if !rest[..close].is_empty() && rest[..close].bytes().all(|b| b.is_ascii_digit()) {
                return rest[close + 2..].trim_start();
            }
        }
    }

    text
}

/// Detect the delimiter from the header line: whichever of `;` and `,`
/// appears more often wins, defaulting to `,`.
fn detect_delimiter(text: &str) -> u8 {
    let first_line = text.lines().next().unwrap_or("");
    let semicolons = first_line.matches(';').count();
    let commas = first_line.matches(',').count();
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}
