//! Progress-callback trait for export and page events.
//!
//! Inject an [`Arc<dyn CaptureProgressCallback>`] via
//! [`crate::config::CaptureConfigBuilder::progress_callback`] to observe a run
//! as it moves down the export ladder and through the pages. The library
//! never prints; the CLI turns these events into a progress bar, and a bot
//! could forward them to a chat channel instead.
//!
//! # Example
//!
//! ```rust
//! use jobcard_capture::{CaptureConfig, CaptureProgressCallback};
//! use std::path::Path;
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     saved: AtomicUsize,
//! }
//!
//! impl CaptureProgressCallback for CountingCallback {
//!     fn on_page_saved(&self, sequence: usize, page_index: usize, path: &Path) {
//!         self.saved.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("#{sequence} (page {}) → {}", page_index + 1, path.display());
//!     }
//! }
//!
//! let config = CaptureConfig::builder()
//!     .progress_callback(Arc::new(CountingCallback { saved: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use std::path::Path;
use std::sync::Arc;

/// Called by the capture pipeline at each observable step.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. A run is sequential, so calls never overlap within
/// one run, but the trait is `Send + Sync` because the async entry point
/// executes the run on Tokio's blocking pool.
pub trait CaptureProgressCallback: Send + Sync {
    /// Called before each export request is sent.
    ///
    /// # Arguments
    /// * `attempt`: 1-indexed position in the ladder
    /// * `total`: ladder length
    /// * `label`: human-readable layout, e.g. `"A3 fit-to-width"`
    fn on_export_attempt(&self, attempt: usize, total: usize, label: &str) {
        let _ = (attempt, total, label);
    }

    /// Called when an attempt failed with a retryable status and the next
    /// layout will be tried.
    fn on_export_fallback(&self, label: &str, status: u16) {
        let _ = (label, status);
    }

    /// Called once the export returned a PDF.
    fn on_export_complete(&self, label: &str, bytes: usize) {
        let _ = (label, bytes);
    }

    /// Called once the PDF is open, before any page is rendered.
    fn on_document_opened(&self, page_count: usize) {
        let _ = page_count;
    }

    /// Called when a page is judged blank and dropped.
    ///
    /// `page_index` is 0-based in the original document.
    fn on_page_skipped(&self, page_index: usize) {
        let _ = page_index;
    }

    /// Called after a retained page is written.
    fn on_page_saved(&self, sequence: usize, page_index: usize, path: &Path) {
        let _ = (sequence, page_index, path);
    }

    /// Called after the stacked composite is written.
    fn on_composite_saved(&self, path: &Path) {
        let _ = path;
    }

    /// Called once at the end of a successful run.
    ///
    /// # Arguments
    /// * `page_count`: pages in the exported document
    /// * `retained`: pages that produced an artifact
    fn on_capture_complete(&self, page_count: usize, retained: usize) {
        let _ = (page_count, retained);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl CaptureProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::CaptureConfig`].
pub type ProgressCallback = Arc<dyn CaptureProgressCallback>;
