//! Combo Forge - resumable exhaustive string enumeration
//!
//! Enumerates every combination of the charset for lengths min..=max, appends
//! the new ones to the output file and only moves to the next length once the
//! current one is exhausted.

use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use combo_forge::{
    report::group_digits, Charset, EnumerationMode, Enumerator, FileReporter, GenerationConfig,
    ProgressEvent, ReportFormat, Reporter, Result, RunOutcome, RunSummary, StopSignal,
};

/// Exit code for a forced quit, as a shell reports SIGINT
const EXIT_INTERRUPTED: i32 = 130;

#[derive(Parser, Debug)]
#[command(name = "combo-forge")]
#[command(about = "Enumerate every charset combination of length min..=max into a file, resuming where it left off")]
#[command(version)]
struct Cli {
    /// Output file
    #[arg(short, long, env = "COMBO_FORGE_OUTPUT", default_value = "codes.txt")]
    output: PathBuf,

    /// Minimum length
    #[arg(long = "min", env = "COMBO_FORGE_MIN", default_value_t = 1)]
    min_len: usize,

    /// Maximum length
    #[arg(long = "max", env = "COMBO_FORGE_MAX", default_value_t = 30)]
    max_len: usize,

    /// Sync to disk every N new lines
    #[arg(long, env = "COMBO_FORGE_FLUSH_EVERY", default_value_t = 1000)]
    flush_every: u64,

    /// Shuffle the charset per position (random-looking order, still exhaustive)
    #[arg(long)]
    shuffle: bool,

    /// Report file (default: <output>.report.<format>)
    #[arg(long, env = "COMBO_FORGE_REPORT")]
    report: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, env = "COMBO_FORGE_REPORT_FORMAT", default_value_t = ReportFormat::Html)]
    report_format: ReportFormat,

    /// Refresh the report every N new lines within a length
    #[arg(long, env = "COMBO_FORGE_REPORT_EVERY", default_value_t = 2000)]
    report_every: u64,

    /// Custom symbols to enumerate, in order (replaces the built-in charset)
    #[arg(long, env = "COMBO_FORGE_CHARSET")]
    charset: Option<String>,

    /// Use digits 0-9 instead of 1-9 in the built-in charset
    #[arg(long, conflicts_with = "charset")]
    include_zero: bool,

    /// Hide the live spinner
    #[arg(long)]
    no_progress: bool,
}

impl Cli {
    fn into_config(self) -> Result<GenerationConfig> {
        let charset = match &self.charset {
            Some(symbols) => Charset::custom(symbols)?,
            None => Charset::standard(self.include_zero),
        };

        let config = GenerationConfig {
            output: self.output,
            min_len: self.min_len,
            max_len: self.max_len,
            flush_every: self.flush_every,
            mode: if self.shuffle {
                EnumerationMode::Shuffled
            } else {
                EnumerationMode::Ordered
            },
            charset,
            report: self.report,
            report_format: self.report_format,
            report_every: self.report_every,
        };
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the library
    if let Err(e) = combo_forge::init() {
        eprintln!("❌ Failed to initialize: {}", e);
        process::exit(1);
    }
    init_tracing();

    let cli = Cli::parse();
    let show_progress = !cli.no_progress;

    let config = match cli.into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e.user_message());
            process::exit(1);
        }
    };

    if let Err(e) = run_generation(config, show_progress).await {
        eprintln!("{}", e.user_message());
        process::exit(1);
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

/// Main generation workflow
async fn run_generation(config: GenerationConfig, show_progress: bool) -> Result<()> {
    let stop = StopSignal::new();
    let reporter = FileReporter::new(config.report_path(), config.report_format);
    let report_location = reporter.location();

    print_banner(&config, &report_location);

    let enumerator = Enumerator::new(config, Box::new(reporter), stop.clone())?;

    // First Ctrl+C flips the flag and the enumerator winds down on its own,
    // a second one leaves immediately
    let watcher = stop.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        watcher.trigger();
        eprintln!("\n⏳ Stopping after the current step, press Ctrl+C again to quit now");
        if tokio::signal::ctrl_c().await.is_ok() {
            process::exit(EXIT_INTERRUPTED);
        }
    });

    let summary = tokio::task::spawn_blocking(move || {
        let mut console = Console::new(show_progress);
        let result = enumerator.run(|event| console.handle(event));
        console.finish();
        result
    })
    .await??;

    print_summary(&summary);
    Ok(())
}

fn print_banner(config: &GenerationConfig, report_location: &str) {
    let output = std::path::absolute(&config.output).unwrap_or_else(|_| config.output.clone());
    println!("📂 Output: {}", output.display());
    println!(
        "🔤 Charset size: {} ; Length range: {}..{} ({})",
        config.charset.len(),
        config.min_len,
        config.max_len,
        config.mode
    );
    println!("📝 Report: {} ({})", report_location, config.report_format);
}

fn print_summary(summary: &RunSummary) {
    match summary.outcome {
        RunOutcome::Completed => println!("🎉 All lengths in range completed."),
        RunOutcome::Interrupted => println!("\n🛑 Stopped by user (Ctrl+C)."),
    }

    let totals = &summary.snapshot.totals;
    println!(
        "📈 Summary: success: {} | failed: {} | attempts: {} | rate: {:.1}/s | report: {}",
        group_digits(totals.written),
        group_digits(totals.failed),
        group_digits(totals.attempts),
        summary.snapshot.write_rate(),
        summary.report_location
    );
}

/// Console side of the progress events: plain lines plus a live spinner
struct Console {
    show_progress: bool,
    bar: ProgressBar,
}

impl Console {
    fn new(show_progress: bool) -> Self {
        Self {
            show_progress,
            bar: ProgressBar::hidden(),
        }
    }

    /// Drop whatever spinner is still on screen
    fn finish(&mut self) {
        self.bar.finish_and_clear();
        self.bar = ProgressBar::hidden();
    }

    fn line(&self, text: String) {
        self.bar.suspend(|| println!("{}", text));
    }

    fn handle(&mut self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Scanning { length } => {
                self.line(format!("🔍 Scanning output for length {} ...", length));
            }
            ProgressEvent::LengthStarted {
                length,
                existing,
                possible,
            } => {
                self.line(format!(
                    "📦 Already present (len={}): {} of {}",
                    length,
                    group_digits(existing),
                    group_digits(possible)
                ));
                if self.show_progress {
                    self.bar = spinner(*length);
                }
            }
            ProgressEvent::Tick {
                length,
                attempts,
                written,
            } => {
                self.bar.set_message(format!(
                    "len={} | attempts: {} | written: {}",
                    length,
                    group_digits(attempts),
                    group_digits(written)
                ));
            }
            ProgressEvent::Checkpoint {
                length,
                written,
                failed,
                rate,
            } => {
                self.line(format!(
                    "[{}] len={} | written: {} | failed: {} | rate: {:.1}/s",
                    chrono::Local::now().format("%H:%M:%S"),
                    length,
                    group_digits(written),
                    group_digits(failed),
                    rate
                ));
            }
            ProgressEvent::LengthFinished {
                length,
                stats,
                duration,
            } => {
                self.finish();
                self.line(format!(
                    "✅ [len={}] new: {} | dupes: {} | total: {}/{} | took: {:.1}s",
                    length,
                    group_digits(stats.written),
                    group_digits(stats.failed),
                    group_digits(stats.existing),
                    group_digits(&stats.possible),
                    duration.as_secs_f64()
                ));
            }
        }
    }
}

fn spinner(length: usize) -> ProgressBar {
    let style = ProgressStyle::with_template("{spinner:.cyan} [{elapsed_precise}] {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    let bar = ProgressBar::new_spinner().with_style(style);
    bar.set_message(format!("len={} | starting", length));
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}
