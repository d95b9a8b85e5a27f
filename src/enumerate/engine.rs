//! Enumerator - walk every length in range and append what is missing

use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use num_bigint::BigUint;

use super::generator::SequenceGenerator;
use super::scanner::scan_existing;
use super::sink::AppendSink;
use super::stats::{PerLengthStats, RunInfo, Statistics, StatsSnapshot};
use crate::error::Result;
use crate::report::Reporter;
use crate::types::{EnumerationMode, GenerationConfig};

/// Attempts between two `Tick` events
const TICK_EVERY: u64 = 16_384;

/// Cooperative stop flag shared with whoever listens for interrupts
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the enumerator to stop at the next candidate
    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every length in range was walked to the end
    Completed,
    /// The stop signal was observed before the end
    Interrupted,
}

/// Progress notifications, in the order they happen
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// About to scan the output file for one length
    Scanning { length: usize },
    /// Scan done, enumeration of the length begins
    LengthStarted {
        length: usize,
        existing: u64,
        possible: BigUint,
    },
    /// Periodic liveness update, emitted whether or not anything was written
    Tick {
        length: usize,
        attempts: u64,
        written: u64,
    },
    /// Durable sync point reached
    Checkpoint {
        length: usize,
        written: u64,
        failed: u64,
        rate: f64,
    },
    /// All candidates of a length were visited
    LengthFinished {
        length: usize,
        stats: PerLengthStats,
        duration: Duration,
    },
}

/// Result of a run, cleanup included
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    pub snapshot: StatsSnapshot,
    pub report_location: String,
}

/// Drives the scan, generate, dedup and append loop
pub struct Enumerator {
    config: GenerationConfig,
    reporter: Box<dyn Reporter>,
    stop: StopSignal,
    stats: Statistics,
}

impl Enumerator {
    /// Create an enumerator; fails on invalid settings before touching any file
    pub fn new(config: GenerationConfig, reporter: Box<dyn Reporter>, stop: StopSignal) -> Result<Self> {
        config.validate()?;

        let run = RunInfo::new(
            std::path::absolute(&config.output).unwrap_or_else(|_| config.output.clone()),
            config.charset.len(),
            config.min_len,
            config.max_len,
        );

        Ok(Self {
            config,
            reporter,
            stop,
            stats: Statistics::new(run),
        })
    }

    /// Run every length in range.
    ///
    /// The output is synced and closed and a final report is published on
    /// every exit path. When the walk itself fails, cleanup failures are only
    /// logged so the original error reaches the caller.
    pub fn run<F>(mut self, mut on_progress: F) -> Result<RunSummary>
    where
        F: FnMut(&ProgressEvent),
    {
        let mut sink = AppendSink::open(&self.config.output)?;

        let walked = self.walk_lengths(&mut sink, &mut on_progress);
        let closed = sink.close();
        let snapshot = self.snapshot();
        let reported = self.reporter.publish(&snapshot);

        match walked {
            Ok(outcome) => {
                closed?;
                reported?;
                tracing::info!(
                    outcome = ?outcome,
                    written = snapshot.totals.written,
                    failed = snapshot.totals.failed,
                    "Enumeration finished"
                );
                Ok(RunSummary {
                    outcome,
                    snapshot,
                    report_location: self.reporter.location(),
                })
            }
            Err(e) => {
                if let Err(close_err) = closed {
                    tracing::warn!(error = %close_err, "Failed to close output after error");
                }
                if let Err(report_err) = reported {
                    tracing::warn!(error = %report_err, "Failed to write final report after error");
                }
                Err(e)
            }
        }
    }

    fn walk_lengths(
        &mut self,
        sink: &mut AppendSink,
        on_progress: &mut dyn FnMut(&ProgressEvent),
    ) -> Result<RunOutcome> {
        for length in self.config.min_len..=self.config.max_len {
            if self.stop.is_triggered() {
                return Ok(RunOutcome::Interrupted);
            }
            if self.walk_length(length, sink, on_progress)? == RunOutcome::Interrupted {
                return Ok(RunOutcome::Interrupted);
            }
        }
        Ok(RunOutcome::Completed)
    }

    fn walk_length(
        &mut self,
        length: usize,
        sink: &mut AppendSink,
        on_progress: &mut dyn FnMut(&ProgressEvent),
    ) -> Result<RunOutcome> {
        on_progress(&ProgressEvent::Scanning { length });
        let mut existing: HashSet<String> = match scan_existing(&self.config.output, length, &self.stop)? {
            Some(existing) => existing,
            None => return Ok(RunOutcome::Interrupted),
        };
        let possible = self.config.charset.total_combinations(length);
        self.stats.begin_length(length, possible.clone(), existing.len() as u64);

        on_progress(&ProgressEvent::LengthStarted {
            length,
            existing: existing.len() as u64,
            possible,
        });

        let generator = match self.config.mode {
            EnumerationMode::Ordered => SequenceGenerator::ordered(&self.config.charset, length),
            EnumerationMode::Shuffled => {
                SequenceGenerator::shuffled(&self.config.charset, length, &mut rand::thread_rng())
            }
        };

        let flush_every = self.config.flush_every;
        let report_every = self.config.report_every;
        let started = Instant::now();
        let mut attempts = 0u64;
        let mut written_since_report = 0u64;

        for candidate in generator {
            if self.stop.is_triggered() {
                tracing::debug!(length, attempts, "Stop requested mid-length");
                return Ok(RunOutcome::Interrupted);
            }
            attempts += 1;

            if existing.contains(&candidate) {
                self.stats.record_duplicate(length);
            } else {
                sink.append(&candidate)?;
                existing.insert(candidate);
                self.stats.record_written(length);
                written_since_report += 1;

                let totals = self.stats.global();
                if totals.written % flush_every == 0 {
                    sink.sync()?;
                    on_progress(&ProgressEvent::Checkpoint {
                        length,
                        written: totals.written,
                        failed: totals.failed,
                        rate: self.stats.write_rate(),
                    });
                }

                if written_since_report >= report_every {
                    written_since_report = 0;
                    self.publish()?;
                }
            }

            if attempts % TICK_EVERY == 0 {
                on_progress(&ProgressEvent::Tick {
                    length,
                    attempts,
                    written: self.stats.global().written,
                });
            }
        }

        if sink.pending() > 0 {
            sink.sync()?;
        }

        let stats = self.stats.length(length).cloned().unwrap_or_else(|| {
            PerLengthStats::new(self.config.charset.total_combinations(length), existing.len() as u64)
        });
        tracing::debug!(
            length,
            written = stats.written,
            failed = stats.failed,
            existing = stats.existing,
            "Length finished"
        );
        on_progress(&ProgressEvent::LengthFinished {
            length,
            stats,
            duration: started.elapsed(),
        });

        // the last length is covered by the final report in `run`
        if length < self.config.max_len {
            self.publish()?;
        }
        Ok(RunOutcome::Completed)
    }

    fn snapshot(&self) -> StatsSnapshot {
        self.stats.snapshot(file_size(&self.config.output))
    }

    fn publish(&self) -> Result<()> {
        self.reporter.publish(&self.snapshot())
    }
}

fn file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}
