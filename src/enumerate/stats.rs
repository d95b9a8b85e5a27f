//! Run statistics and the snapshots handed to reporters

use chrono::{DateTime, Local};
use num_bigint::BigUint;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Counters for one length
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PerLengthStats {
    /// C^L, fixed when the length is scanned
    #[serde(serialize_with = "as_decimal")]
    pub possible: BigUint,
    /// Distinct entries in the file, including the ones written this run
    pub existing: u64,
    /// New entries written this run
    pub written: u64,
    /// Candidates skipped because they were already present
    pub failed: u64,
}

impl PerLengthStats {
    pub fn new(possible: BigUint, existing: u64) -> Self {
        Self {
            possible,
            existing,
            written: 0,
            failed: 0,
        }
    }

    pub fn attempts(&self) -> u64 {
        self.written + self.failed
    }

    /// existing / possible as a percentage, 0 when nothing is possible
    pub fn percent_complete(&self) -> f64 {
        if self.possible == BigUint::from(0u32) {
            return 0.0;
        }
        // millionths keep two decimals exact without converting the big count to f64
        let scaled = BigUint::from(self.existing) * 1_000_000u32 / &self.possible;
        u64::try_from(&scaled).map_or(100.0, |ppm| ppm as f64 / 10_000.0)
    }

    pub fn is_complete(&self) -> bool {
        BigUint::from(self.existing) >= self.possible
    }
}

/// Sums across every length processed in this run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GlobalStats {
    pub attempts: u64,
    pub written: u64,
    pub failed: u64,
}

/// Run metadata carried into every snapshot
#[derive(Debug, Clone, Serialize)]
pub struct RunInfo {
    pub output: PathBuf,
    pub charset_size: usize,
    pub min_len: usize,
    pub max_len: usize,
    pub started_at: DateTime<Local>,
    /// Filled in at snapshot time
    pub elapsed: Duration,
    /// Filled in at snapshot time
    pub file_size: u64,
}

impl RunInfo {
    pub fn new(output: PathBuf, charset_size: usize, min_len: usize, max_len: usize) -> Self {
        Self {
            output,
            charset_size,
            min_len,
            max_len,
            started_at: Local::now(),
            elapsed: Duration::ZERO,
            file_size: 0,
        }
    }
}

/// Immutable copy of the statistics at one point in time
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub run: RunInfo,
    pub totals: GlobalStats,
    pub per_length: BTreeMap<usize, PerLengthStats>,
}

impl StatsSnapshot {
    /// Lines written per second, 0 before any time has passed
    pub fn write_rate(&self) -> f64 {
        rate(self.totals.written, self.run.elapsed)
    }

    /// Stats for `length`, zeroed when the length was never reached
    pub fn length_or_default(&self, length: usize) -> PerLengthStats {
        self.per_length
            .get(&length)
            .cloned()
            .unwrap_or_else(|| PerLengthStats::new(BigUint::from(0u32), 0))
    }
}

/// Mutable bookkeeping owned by the enumerator
pub struct Statistics {
    run: RunInfo,
    clock: Instant,
    totals: GlobalStats,
    per_length: BTreeMap<usize, PerLengthStats>,
}

impl Statistics {
    pub fn new(run: RunInfo) -> Self {
        Self {
            run,
            clock: Instant::now(),
            totals: GlobalStats::default(),
            per_length: BTreeMap::new(),
        }
    }

    /// Start tracking a length after its scan
    pub fn begin_length(&mut self, length: usize, possible: BigUint, existing: u64) {
        self.per_length.insert(length, PerLengthStats::new(possible, existing));
    }

    /// A candidate that was already in the file
    pub fn record_duplicate(&mut self, length: usize) {
        self.totals.attempts += 1;
        self.totals.failed += 1;
        if let Some(stats) = self.per_length.get_mut(&length) {
            stats.failed += 1;
        }
    }

    /// A candidate that was appended to the file
    pub fn record_written(&mut self, length: usize) {
        self.totals.attempts += 1;
        self.totals.written += 1;
        if let Some(stats) = self.per_length.get_mut(&length) {
            stats.written += 1;
            stats.existing += 1;
        }
    }

    pub fn global(&self) -> GlobalStats {
        self.totals
    }

    pub fn length(&self, length: usize) -> Option<&PerLengthStats> {
        self.per_length.get(&length)
    }

    pub fn elapsed(&self) -> Duration {
        self.clock.elapsed()
    }

    pub fn write_rate(&self) -> f64 {
        rate(self.totals.written, self.elapsed())
    }

    /// Deep copy of everything, stamped with elapsed time and the output size
    pub fn snapshot(&self, file_size: u64) -> StatsSnapshot {
        let mut run = self.run.clone();
        run.elapsed = self.elapsed();
        run.file_size = file_size;
        StatsSnapshot {
            run,
            totals: self.totals,
            per_length: self.per_length.clone(),
        }
    }
}

fn rate(written: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        written as f64 / secs
    } else {
        0.0
    }
}

fn as_decimal<S: Serializer>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> Statistics {
        Statistics::new(RunInfo::new(PathBuf::from("codes.txt"), 2, 1, 3))
    }

    #[test]
    fn test_conservation() {
        let mut stats = stats();
        stats.begin_length(2, BigUint::from(4u32), 1);
        stats.record_duplicate(2);
        stats.record_written(2);
        stats.record_written(2);

        let global = stats.global();
        assert_eq!(global.attempts, global.written + global.failed);
        assert_eq!(global.attempts, 3);

        let len2 = stats.length(2).unwrap();
        assert_eq!(len2.attempts(), 3);
        assert_eq!(len2.existing, 3);
        assert_eq!(len2.written, 2);
        assert_eq!(len2.failed, 1);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut stats = stats();
        stats.begin_length(1, BigUint::from(2u32), 0);
        stats.record_written(1);

        let snapshot = stats.snapshot(42);
        stats.record_written(1);

        assert_eq!(snapshot.totals.written, 1);
        assert_eq!(snapshot.per_length[&1].written, 1);
        assert_eq!(snapshot.run.file_size, 42);
        assert_eq!(stats.global().written, 2);
    }

    #[test]
    fn test_percent_complete() {
        let half = PerLengthStats::new(BigUint::from(4u32), 2);
        assert_eq!(half.percent_complete(), 50.0);
        assert!(!half.is_complete());

        let nothing = PerLengthStats::new(BigUint::from(0u32), 0);
        assert_eq!(nothing.percent_complete(), 0.0);

        let huge = PerLengthStats::new(BigUint::from(93u32).pow(30), 1_000);
        assert_eq!(huge.percent_complete(), 0.0);
    }

    #[test]
    fn test_rate_guards_zero_elapsed() {
        assert_eq!(rate(10, Duration::ZERO), 0.0);
        assert_eq!(rate(10, Duration::from_secs(2)), 5.0);
    }

    #[test]
    fn test_missing_length_defaults_to_zero() {
        let snapshot = stats().snapshot(0);
        let empty = snapshot.length_or_default(3);
        assert_eq!(empty.existing, 0);
        assert_eq!(empty.possible, BigUint::from(0u32));
    }

    #[test]
    fn test_snapshot_serializes_big_counts_as_strings() {
        let mut stats = stats();
        stats.begin_length(1, BigUint::from(93u32).pow(30), 0);
        let json = serde_json::to_value(stats.snapshot(0)).unwrap();
        let possible = &json["per_length"]["1"]["possible"];
        assert!(possible.is_string());
        assert_eq!(possible.as_str().unwrap(), BigUint::from(93u32).pow(30).to_string());
    }
}
