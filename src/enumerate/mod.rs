//! Exhaustive enumeration module - walk every string of every length in range
//!
//! Each length is handled independently: scan the output file for what is
//! already there, walk the full Cartesian product, append what is missing.

mod engine;
mod generator;
mod scanner;
mod sink;
mod stats;

pub use engine::{Enumerator, ProgressEvent, RunOutcome, RunSummary, StopSignal};
pub use generator::SequenceGenerator;
pub use scanner::scan_existing;
pub use sink::AppendSink;
pub use stats::{GlobalStats, PerLengthStats, RunInfo, Statistics, StatsSnapshot};

use num_bigint::BigUint;
use std::collections::HashSet;

use crate::error::Result;
use crate::validation_error;

const UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWER: &str = "abcdefghijklmnopqrstuvwxyz";
/// Zero is left out unless explicitly requested
const DIGITS_NO_ZERO: &str = "123456789";
const DIGITS: &str = "0123456789";
const PUNCTUATION: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// Ordered set of symbols candidates are built from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Charset {
    symbols: Vec<char>,
}

impl Default for Charset {
    fn default() -> Self {
        Self::standard(false)
    }
}

impl Charset {
    /// Upper, lower, digits and ASCII punctuation, in that order
    pub fn standard(include_zero: bool) -> Self {
        let digits = if include_zero { DIGITS } else { DIGITS_NO_ZERO };
        Self {
            symbols: [UPPER, LOWER, digits, PUNCTUATION]
                .iter()
                .flat_map(|part| part.chars())
                .collect(),
        }
    }

    /// Build a charset from a custom symbol string, keeping the given order
    pub fn custom(symbols: &str) -> Result<Self> {
        if symbols.is_empty() {
            return Err(validation_error!("charset must contain at least one symbol"));
        }

        let mut seen = HashSet::new();
        for symbol in symbols.chars() {
            // the output is one candidate per line, so line breaks can never round-trip
            if symbol.is_control() {
                return Err(validation_error!("charset contains control character {:?}", symbol));
            }
            if !seen.insert(symbol) {
                return Err(validation_error!("charset contains duplicate symbol '{}'", symbol));
            }
        }

        Ok(Self {
            symbols: symbols.chars().collect(),
        })
    }

    pub fn chars(&self) -> &[char] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// C^length, which outgrows u64 quickly with the standard charset
    pub fn total_combinations(&self, length: usize) -> BigUint {
        let exponent = u32::try_from(length).unwrap_or(u32::MAX);
        BigUint::from(self.symbols.len()).pow(exponent)
    }
}
