//! CLI binary for jobcard-capture.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `CaptureConfig`, lays out the run directory and prints results.
//!
//! `main` is synchronous: the export goes through `reqwest::blocking`, which
//! must not be created or dropped inside a Tokio runtime.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use jobcard_capture::layout::TIMESTAMP_FORMAT;
use jobcard_capture::{
    capture_blocking, probe_access, run_layout, CaptureConfig, CaptureProgressCallback,
    HttpSession, Orientation, OutputFormat, ProgressCallback,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a spinner while exporting, then a page bar
/// with one log line per saved or skipped page.
struct CliProgressCallback {
    bar: ProgressBar,
    started: Instant,
    skipped: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Exporting");
        bar.set_message("Requesting PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            started: Instant::now(),
            skipped: AtomicUsize::new(0),
        })
    }

    /// Switch to the full progress-bar style once the page count is known.
    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Rendering");
    }
}

impl CaptureProgressCallback for CliProgressCallback {
    fn on_export_attempt(&self, attempt: usize, total: usize, label: &str) {
        self.bar
            .set_message(format!("{label} (attempt {attempt}/{total})"));
    }

    fn on_export_fallback(&self, label: &str, status: u16) {
        self.bar.println(format!(
            "  {} {}  {}",
            yellow("↻"),
            label,
            dim(&format!("HTTP {status}, trying next layout")),
        ));
    }

    fn on_export_complete(&self, label: &str, bytes: usize) {
        self.bar.println(format!(
            "{} {}  {}",
            cyan("◆"),
            bold(&format!("Exported as {label}")),
            dim(&format!("{} KiB", bytes / 1024)),
        ));
    }

    fn on_document_opened(&self, page_count: usize) {
        self.activate_bar(page_count);
    }

    fn on_page_skipped(&self, page_index: usize) {
        self.skipped.fetch_add(1, Ordering::SeqCst);
        self.bar.println(format!(
            "  {} Page {:>3}  {}",
            dim("·"),
            page_index + 1,
            dim("blank, skipped"),
        ));
        self.bar.inc(1);
    }

    fn on_page_saved(&self, sequence: usize, page_index: usize, path: &Path) {
        self.bar.println(format!(
            "  {} Page {:>3}  #{:<3} {}",
            green("✓"),
            page_index + 1,
            sequence,
            dim(&path.display().to_string()),
        ));
        self.bar.inc(1);
    }

    fn on_composite_saved(&self, path: &Path) {
        self.bar.println(format!(
            "  {} Composite  {}",
            green("✓"),
            dim(&path.display().to_string()),
        ));
    }

    fn on_capture_complete(&self, page_count: usize, retained: usize) {
        self.bar.finish_and_clear();
        let skipped = self.skipped.load(Ordering::SeqCst);
        eprintln!(
            "{} {}/{} pages kept  ({} blank)  {}",
            if retained == 0 { yellow("⚠") } else { green("✔") },
            bold(&retained.to_string()),
            page_count,
            skipped,
            dim(&format!("{:.1}s", self.started.elapsed().as_secs_f64())),
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Capture one tab into ./job-cards/<timestamp>/site-a/
  jobcard --url 'https://docs.google.com/spreadsheets/d/1AbC_d-9/edit#gid=42' --project site-a

  # PNG, portrait, no width cap
  jobcard --url '…' --project site-a --format png --portrait --max-width 0

  # Several sheets of one batch side by side
  TS=$(date +%Y%m%d_%H%M%S)
  jobcard --url "$URL_A" --project site-a --timestamp "$TS"
  jobcard --url "$URL_B" --project site-b --timestamp "$TS"

  # Check that the sheet is exportable with the current credentials
  jobcard --url '…' --project site-a --check-access

  # JSON summary for scripts
  jobcard --url '…' --project site-a --json > result.json

OUTPUT LAYOUT:
  <output>/<timestamp>/<project>/<YYYYMMDD>_<project>_job-card_001.jpg
  <output>/<timestamp>/<project>/<YYYYMMDD>_<project>_job-card_merged.jpg

ENVIRONMENT VARIABLES:
  JOBCARD_BEARER_TOKEN    OAuth access token for private sheets
  PDFIUM_LIB_PATH         Path to libpdfium (file or directory)
  RUST_LOG                Override the log filter
"#;

/// Capture a spreadsheet tab as trimmed job-card images.
#[derive(Parser, Debug)]
#[command(
    name = "jobcard",
    version,
    about = "Capture a spreadsheet tab as trimmed job-card images",
    long_about = "Export a shared spreadsheet tab to PDF, render every page, drop blank pages, \
crop the rest to their content and write them as numbered images plus one stacked composite.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Spreadsheet share URL (the tab is taken from `gid=`, default 0).
    #[arg(long, env = "JOBCARD_URL")]
    url: String,

    /// Project name; used for the output sub-directory and the file prefix.
    #[arg(long, env = "JOBCARD_PROJECT")]
    project: String,

    /// Root output directory.
    #[arg(short, long, env = "JOBCARD_OUTPUT", default_value = "job-cards")]
    output: PathBuf,

    /// Run timestamp (YYYYMMDD_HHMMSS). Defaults to the current local time.
    #[arg(long, env = "JOBCARD_TIMESTAMP")]
    timestamp: Option<String>,

    /// Rendering DPI (72–600).
    #[arg(long, env = "JOBCARD_DPI", default_value_t = 150,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// Artifact format: png or jpg.
    #[arg(long, env = "JOBCARD_FORMAT", default_value = "jpg")]
    format: OutputFormat,

    /// Export in portrait orientation instead of landscape.
    #[arg(long, env = "JOBCARD_PORTRAIT")]
    portrait: bool,

    /// Maximum image width in pixels; 0 disables the cap.
    #[arg(long, env = "JOBCARD_MAX_WIDTH", default_value_t = 1600)]
    max_width: u32,

    /// Do not write the stacked composite.
    #[arg(long, env = "JOBCARD_NO_MERGE")]
    no_merge: bool,

    /// OAuth access token sent as `Authorization: Bearer`.
    #[arg(long, env = "JOBCARD_BEARER_TOKEN", hide_env_values = true)]
    bearer_token: Option<String>,

    /// Only check that the sheet can be exported; write nothing.
    #[arg(long)]
    check_access: bool,

    /// Print the result as JSON on stdout.
    #[arg(long, env = "JOBCARD_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "JOBCARD_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "JOBCARD_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "JOBCARD_QUIET")]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.check_access;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Run layout ───────────────────────────────────────────────────────
    let timestamp = cli
        .timestamp
        .clone()
        .unwrap_or_else(|| chrono::Local::now().format(TIMESTAMP_FORMAT).to_string());
    let layout =
        run_layout(&cli.output, &timestamp, &cli.project).context("Invalid output layout")?;

    // ── Build config and session ─────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn CaptureProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, &layout.prefix, progress_cb)?;

    let mut session = HttpSession::new(&config).context("Failed to set up HTTP session")?;
    if let Some(ref token) = cli.bearer_token {
        session = session.with_bearer_token(token.clone());
    }

    // ── Access check only ────────────────────────────────────────────────
    if cli.check_access {
        let ok = probe_access(&session, &cli.url, &config).context("Access check failed")?;
        if cli.json {
            println!("{}", serde_json::json!({ "url": cli.url, "accessible": ok }));
        } else if !cli.quiet {
            if ok {
                eprintln!("{} sheet is exportable", green("✔"));
            } else {
                eprintln!("{} sheet did not export as PDF", red("✘"));
            }
        }
        if !ok {
            std::process::exit(2);
        }
        return Ok(());
    }

    // ── Run capture ──────────────────────────────────────────────────────
    let bundle = capture_blocking(&cli.url, &session, &layout.output_dir, &config)
        .context("Capture failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&bundle).context("Failed to serialise output")?;
        println!("{json}");
    } else {
        for path in &bundle.saved_paths {
            println!("{}", path.display());
        }
        if !cli.quiet && !show_progress {
            eprintln!(
                "Kept {}/{} pages → {}",
                bundle.retained_count(),
                bundle.original_page_count,
                bold(&layout.output_dir.display().to_string()),
            );
        }
    }

    Ok(())
}

/// Map CLI args to `CaptureConfig`.
fn build_config(
    cli: &Cli,
    prefix: &str,
    progress: Option<ProgressCallback>,
) -> Result<CaptureConfig> {
    let orientation = if cli.portrait {
        Orientation::Portrait
    } else {
        Orientation::Landscape
    };
    let max_width = (cli.max_width > 0).then_some(cli.max_width);

    let mut builder = CaptureConfig::builder()
        .dpi(cli.dpi)
        .format(cli.format)
        .max_width(max_width)
        .prefix(prefix)
        .orientation(orientation)
        .merge(!cli.no_merge);

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
