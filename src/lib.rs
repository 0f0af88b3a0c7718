//! # jobcard-capture
//!
//! Turn a shared spreadsheet tab into clean job-card images.
//!
//! Given a share link, the crate exports the tab as PDF, renders each page,
//! drops pages that are effectively empty, crops the rest to their content,
//! caps their width, and writes them as numbered PNG/JPEG files plus one
//! tall composite that stacks them all. The output is sized for posting to
//! a chat channel.
//!
//! ## Pipeline Overview
//!
//! ```text
//! share URL
//!  │
//!  ├─ 1. Resolve  spreadsheet id + tab gid
//!  ├─ 2. Export   A3 fit-to-width → A3 normal → A3 fit-to-page
//!  ├─ 3. Render   pdfium, one page at a time
//!  ├─ 4. Filter   drop pages with < 50 px of ink either way
//!  ├─ 5. Trim     crop to the non-white bounding box
//!  ├─ 6. Scale    cap width, keep aspect ratio
//!  ├─ 7. Write    {prefix}_001.jpg, {prefix}_002.jpg, …
//!  └─ 8. Compose  {prefix}_merged.jpg
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use jobcard_capture::{capture_blocking, CaptureConfig, HttpSession};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CaptureConfig::default();
//!     let session = HttpSession::new(&config)?;
//!     let bundle = capture_blocking(
//!         "https://docs.google.com/spreadsheets/d/1AbC_d-9/edit#gid=42",
//!         &session,
//!         Path::new("out/site-a"),
//!         &config,
//!     )?;
//!     for path in &bundle.saved_paths {
//!         println!("{}", path.display());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `jobcard` binary (clap + anyhow + tracing-subscriber + indicatif + chrono) |
//!
//! ## PDFium
//!
//! Rendering needs a pdfium shared library at runtime; see [`engine`] for
//! the lookup order.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod capture;
pub mod config;
pub mod engine;
pub mod error;
pub mod layout;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use capture::{capture, capture_blocking, process_pages, render_document};
pub use config::{CaptureConfig, CaptureConfigBuilder, Orientation, OutputFormat};
pub use error::{ErrorCategory, JobCardError};
pub use layout::{run_layout, RunLayout};
pub use output::{JobCardBundle, RetainedPage};
pub use pipeline::export::{probe_access, ExportSession, HttpSession};
pub use pipeline::resolve::SheetReference;
pub use progress::{CaptureProgressCallback, NoopProgressCallback, ProgressCallback};
