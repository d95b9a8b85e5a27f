//! Combo Forge - resumable exhaustive string enumeration
//!
//! Walks every string over a fixed charset for a range of lengths, appends the
//! ones missing from an output file and keeps a progress report up to date.
//! Re-running against the same file picks up where the last run stopped.

pub mod enumerate;
pub mod error;
pub mod report;
pub mod types;

// Re-export commonly used types
pub use error::{ComboForgeError, Result};
pub use types::{EnumerationMode, GenerationConfig, ReportFormat};

// Re-export main functionality
pub use enumerate::{Charset, Enumerator, ProgressEvent, RunOutcome, RunSummary, StopSignal};
pub use report::{FileReporter, Reporter};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library
pub fn init() -> Result<()> {
    // Load .env file if it exists
    dotenv::dotenv().ok();
    Ok(())
}
