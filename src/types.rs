//! Core types and structures for combo-forge

use std::path::{Path, PathBuf};

use crate::enumerate::Charset;
use crate::error::Result;
use crate::validation_error;

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReportFormat {
    #[default]
    Html,
    Txt,
    Json,
}

impl ReportFormat {
    /// File extension used for the default report path
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Html => "html",
            ReportFormat::Txt => "txt",
            ReportFormat::Json => "json",
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Order in which candidates of one length are visited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumerationMode {
    /// Lexicographic, last position advances fastest
    #[default]
    Ordered,
    /// Fresh random permutation of the charset per position and length
    Shuffled,
}

impl std::fmt::Display for EnumerationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnumerationMode::Ordered => write!(f, "ordered"),
            EnumerationMode::Shuffled => write!(f, "shuffled"),
        }
    }
}

/// Configuration for one generation run
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub output: PathBuf,
    pub min_len: usize,
    pub max_len: usize,
    /// Durable sync every N writes across the whole run
    pub flush_every: u64,
    pub mode: EnumerationMode,
    pub charset: Charset,
    /// Explicit report path, derived from `output` when absent
    pub report: Option<PathBuf>,
    pub report_format: ReportFormat,
    /// Report refresh every N writes within the current length
    pub report_every: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from("codes.txt"),
            min_len: 1,
            max_len: 30,
            flush_every: 1000,
            mode: EnumerationMode::Ordered,
            charset: Charset::default(),
            report: None,
            report_format: ReportFormat::Html,
            report_every: 2000,
        }
    }
}

impl GenerationConfig {
    /// Check bounds and intervals. Touches no files.
    pub fn validate(&self) -> Result<()> {
        if self.min_len < 1 {
            return Err(validation_error!("min length must be at least 1, got {}", self.min_len));
        }
        if self.max_len < self.min_len {
            return Err(validation_error!(
                "min length ({}) must not exceed max length ({})",
                self.min_len,
                self.max_len
            ));
        }
        if self.flush_every == 0 {
            return Err(validation_error!("flush interval must be at least 1"));
        }
        if self.report_every == 0 {
            return Err(validation_error!("report interval must be at least 1"));
        }
        if self.charset.is_empty() {
            return Err(validation_error!("charset must contain at least one symbol"));
        }
        Ok(())
    }

    /// Where the report goes: the explicit path, or `<output>.report.<ext>`
    pub fn report_path(&self) -> PathBuf {
        match &self.report {
            Some(path) => path.clone(),
            None => default_report_path(&self.output, self.report_format),
        }
    }
}

fn default_report_path(output: &Path, format: ReportFormat) -> PathBuf {
    let mut name = output
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "codes".into());
    name.push(format!(".report.{}", format.extension()));
    output.with_file_name(name)
}
