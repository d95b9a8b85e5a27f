//! Progress report rendering
//!
//! A report is rebuilt from a [`StatsSnapshot`] at every checkpoint and
//! replaces the previous file at the same path.

mod html;
mod text;

use std::fmt::Display;
use std::path::PathBuf;

use crate::enumerate::StatsSnapshot;
use crate::error::{ComboForgeError, Result};
use crate::types::ReportFormat;

/// Trait for anything that consumes statistics snapshots
pub trait Reporter: Send {
    /// Publish one snapshot, replacing whatever was published before
    fn publish(&self, snapshot: &StatsSnapshot) -> Result<()>;

    /// Where the report ends up, for console output
    fn location(&self) -> String;
}

/// Reporter that renders to a file in the configured format
pub struct FileReporter {
    path: PathBuf,
    format: ReportFormat,
}

impl FileReporter {
    pub fn new(path: impl Into<PathBuf>, format: ReportFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }
}

impl Reporter for FileReporter {
    fn publish(&self, snapshot: &StatsSnapshot) -> Result<()> {
        let body = render(self.format, snapshot)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ComboForgeError::io_at(e, parent))?;
        }
        std::fs::write(&self.path, body).map_err(|e| ComboForgeError::io_at(e, &self.path))?;

        tracing::debug!(
            path = %self.path.display(),
            format = %self.format,
            written = snapshot.totals.written,
            "Report updated"
        );
        Ok(())
    }

    fn location(&self) -> String {
        std::path::absolute(&self.path)
            .unwrap_or_else(|_| self.path.clone())
            .display()
            .to_string()
    }
}

/// Render a snapshot to a string in the given format
pub fn render(format: ReportFormat, snapshot: &StatsSnapshot) -> Result<String> {
    match format {
        ReportFormat::Txt => Ok(text::render(snapshot)),
        ReportFormat::Html => Ok(html::render(snapshot)),
        ReportFormat::Json => Ok(serde_json::to_string_pretty(snapshot)?),
    }
}

/// Integer with thousands separators: 1234567 -> "1,234,567"
pub fn group_digits(value: impl Display) -> String {
    let digits = value.to_string();
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits.as_str()),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{}{}", sign, grouped)
}

/// Byte count in the largest unit that keeps the value under 1024
pub fn human_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", value, UNITS[unit])
}

/// One row of the per-length table, already formatted
struct LengthRow {
    length: usize,
    possible: String,
    existing: String,
    written: String,
    failed: String,
    percent: f64,
}

/// Rows for every length in the configured range, reached or not
fn length_rows(snapshot: &StatsSnapshot) -> Vec<LengthRow> {
    (snapshot.run.min_len..=snapshot.run.max_len)
        .map(|length| {
            let stats = snapshot.length_or_default(length);
            LengthRow {
                length,
                possible: group_digits(&stats.possible),
                existing: group_digits(stats.existing),
                written: group_digits(stats.written),
                failed: group_digits(stats.failed),
                percent: stats.percent_complete(),
            }
        })
        .collect()
}
