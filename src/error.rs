//! Error types for the jobcard-capture library.
//!
//! Every failure is fatal to the run: there is no partial-success mode as
//! blank pages are a heuristic outcome, not an error. What callers do need is
//! to tell failures apart by remedy, so each [`JobCardError`] maps onto an
//! [`ErrorCategory`]:
//!
//! * [`ErrorCategory::Source`]: could not reach or authenticate to the
//!   spreadsheet export (network, sharing, credentials).
//! * [`ErrorCategory::Document`]: the export arrived but could not be read
//!   (corrupt PDF, missing pdfium library).
//! * [`ErrorCategory::Output`]: the images could not be encoded or written.
//! * [`ErrorCategory::Input`]: the caller passed a bad URL or configuration.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the jobcard-capture library.
#[derive(Debug, Error)]
pub enum JobCardError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The URL does not contain a `/spreadsheets/d/{id}` segment.
    #[error("Invalid spreadsheet URL '{url}'\nExpected a share link containing /spreadsheets/d/<id>/.")]
    InvalidReference { url: String },

    /// Builder or path-component validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Source errors ─────────────────────────────────────────────────────
    /// The export endpoint returned an error status that ends the ladder.
    #[error("Export failed with HTTP {status} on attempt '{attempt}'")]
    ExportFailure { attempt: String, status: u16 },

    /// The export endpoint answered with an HTML page instead of a PDF.
    #[error(
        "Got '{content_type}' instead of a PDF on attempt '{attempt}'.\n\
Credentials may be invalid or the sheet is not shared with this account."
    )]
    AuthenticationFailure {
        attempt: String,
        content_type: String,
    },

    /// The HTTP request never produced a response (DNS, connect, timeout).
    #[error("Could not reach '{url}': {reason}\nCheck your internet connection.")]
    Transport { url: String, reason: String },

    // ── Document errors ───────────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Download a build from https://github.com/bblanchon/pdfium-binaries and either\n\
  • place libpdfium next to the binary, or\n\
  • set PDFIUM_LIB_PATH=/path/to/libpdfium.\n"
    )]
    PdfiumBindingFailed(String),

    /// The exported bytes could not be opened as a PDF.
    #[error("Exported document is not a readable PDF: {detail}")]
    CorruptPdf { detail: String },

    /// pdfium returned an error for a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Encoding or decoding an image artifact failed.
    #[error("Image processing failed for '{path}': {source}")]
    ImageFailed {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Could not create the output directory or write an artifact.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Which remedy a [`JobCardError`] calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ErrorCategory {
    /// Bad URL or configuration supplied by the caller.
    Input,
    /// Could not reach or authenticate to the spreadsheet export.
    Source,
    /// The exported document could not be read or rendered.
    Document,
    /// The images could not be encoded or written to disk.
    Output,
    /// Bug or runtime failure inside the library.
    Internal,
}

impl JobCardError {
    /// Classify this error by the remedy it implies.
    pub fn category(&self) -> ErrorCategory {
        match self {
            JobCardError::InvalidReference { .. } | JobCardError::InvalidConfig(_) => {
                ErrorCategory::Input
            }
            JobCardError::ExportFailure { .. }
            | JobCardError::AuthenticationFailure { .. }
            | JobCardError::Transport { .. } => ErrorCategory::Source,
            JobCardError::PdfiumBindingFailed(_)
            | JobCardError::CorruptPdf { .. }
            | JobCardError::RasterisationFailed { .. } => ErrorCategory::Document,
            JobCardError::ImageFailed { .. } | JobCardError::OutputWriteFailed { .. } => {
                ErrorCategory::Output
            }
            JobCardError::Internal(_) => ErrorCategory::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_failure_display() {
        let e = JobCardError::ExportFailure {
            attempt: "A3 normal".into(),
            status: 404,
        };
        let msg = e.to_string();
        assert!(msg.contains("404"), "got: {msg}");
        assert!(msg.contains("A3 normal"), "got: {msg}");
    }

    #[test]
    fn auth_failure_mentions_sharing() {
        let e = JobCardError::AuthenticationFailure {
            attempt: "A3 fit-to-width".into(),
            content_type: "text/html; charset=utf-8".into(),
        };
        assert!(e.to_string().contains("not shared"));
    }

    #[test]
    fn categories_separate_remedies() {
        let source = JobCardError::Transport {
            url: "https://example.com".into(),
            reason: "connection refused".into(),
        };
        let document = JobCardError::CorruptPdf {
            detail: "bad xref".into(),
        };
        let output = JobCardError::OutputWriteFailed {
            path: PathBuf::from("/ro/page_001.jpg"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert_eq!(source.category(), ErrorCategory::Source);
        assert_eq!(document.category(), ErrorCategory::Document);
        assert_eq!(output.category(), ErrorCategory::Output);
        assert_eq!(
            JobCardError::InvalidReference { url: "x".into() }.category(),
            ErrorCategory::Input
        );
    }
}
