//! Export retrieval: walk the layout ladder until the service returns a PDF.
//!
//! ## Why a ladder?
//!
//! The export endpoint fails with HTTP 500 for some sheets under some page
//! setups (very wide ranges with fit-to-width are the usual culprit) while
//! happily printing the same sheet under another. Instead of guessing up
//! front, we try a short, fixed list of layouts in order and stop at the
//! first PDF. Only 500 moves down the ladder: any other error status, and an
//! HTML body on any status, ends the run at once.

use crate::config::{CaptureConfig, ExportScale, PaperSize};
use crate::error::JobCardError;
use crate::pipeline::request::ExportRequest;
use crate::pipeline::resolve::SheetReference;
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use tracing::{debug, info, warn};

/// One layout the export is tried with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportAttempt {
    pub scale: ExportScale,
    pub paper_size: PaperSize,
    pub label: &'static str,
}

/// The layouts tried, in order.
pub const EXPORT_LADDER: &[ExportAttempt] = &[
    ExportAttempt {
        scale: ExportScale::FitToWidth,
        paper_size: PaperSize::A3,
        label: "A3 fit-to-width",
    },
    ExportAttempt {
        scale: ExportScale::Normal,
        paper_size: PaperSize::A3,
        label: "A3 normal",
    },
    ExportAttempt {
        scale: ExportScale::FitToPage,
        paper_size: PaperSize::A3,
        label: "A3 fit-to-page",
    },
];

/// Status that moves the ladder to its next attempt.
pub const RETRYABLE_STATUS: u16 = 500;

/// A fully-read HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl ExportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// True when the server sent a web page (login wall, permission page)
    /// rather than a document.
    pub fn is_markup(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("text/html"))
    }

    pub fn is_pdf(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("application/pdf"))
    }
}

/// An HTTP client able to fetch export URLs.
///
/// The caller owns authentication: implement this for whatever session
/// carries the credentials, or use [`HttpSession`].
pub trait ExportSession: Send + Sync {
    /// Issue a blocking GET and read the whole response.
    ///
    /// Error statuses are returned as `Ok`; `Err` is for requests that never
    /// produced a response.
    fn get(&self, url: &Url) -> Result<ExportResponse, JobCardError>;
}

/// [`ExportSession`] over a blocking `reqwest` client.
///
/// `reqwest::blocking` runs its own runtime internally; build and drop this
/// outside async contexts (or inside `spawn_blocking`).
#[derive(Debug, Clone)]
pub struct HttpSession {
    client: reqwest::blocking::Client,
    bearer_token: Option<String>,
}

impl HttpSession {
    /// Anonymous session (works for sheets shared as "anyone with the link")
    /// with the connect/read timeouts from `config`.
    pub fn new(config: &CaptureConfig) -> Result<Self, JobCardError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("jobcard-capture/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(config.connect_timeout())
            .timeout(config.read_timeout())
            .build()
            .map_err(|e| JobCardError::Internal(format!("HTTP client: {e}")))?;
        Ok(Self::from_client(client))
    }

    /// Wrap a client the caller already configured.
    pub fn from_client(client: reqwest::blocking::Client) -> Self {
        Self {
            client,
            bearer_token: None,
        }
    }

    /// Send `Authorization: Bearer {token}` with every request.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }
}

impl ExportSession for HttpSession {
    fn get(&self, url: &Url) -> Result<ExportResponse, JobCardError> {
        let transport = |e: reqwest::Error| JobCardError::Transport {
            url: redact(url),
            reason: if e.is_timeout() {
                format!("timed out ({e})")
            } else {
                e.to_string()
            },
        };

        let mut request = self.client.get(url.clone());
        if let Some(ref token) = self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().map_err(transport)?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().map_err(transport)?.to_vec();

        Ok(ExportResponse {
            status,
            content_type,
            body,
        })
    }
}

/// The winning export.
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    pub bytes: Vec<u8>,
    pub attempt: ExportAttempt,
}

/// Try each attempt of `ladder` in order and return the first PDF.
///
/// # Errors
/// - [`JobCardError::AuthenticationFailure`]: any response with an HTML
///   content type, whatever its status.
/// - [`JobCardError::ExportFailure`]: a 500 on the last attempt, or any
///   other error status on any attempt.
/// - [`JobCardError::Transport`]: from the session, not retried.
pub fn retrieve(
    session: &dyn ExportSession,
    sheet: &SheetReference,
    ladder: &[ExportAttempt],
    config: &CaptureConfig,
) -> Result<ExportedDocument, JobCardError> {
    let total = ladder.len();

    for (i, attempt) in ladder.iter().enumerate() {
        let is_last = i + 1 == total;
        if let Some(ref cb) = config.progress_callback {
            cb.on_export_attempt(i + 1, total, attempt.label);
        }

        let url = ExportRequest::new(sheet, config.orientation, attempt.scale, attempt.paper_size)
            .url(&config.export_base_url)?;
        debug!("Export attempt {}/{} ({}): {}", i + 1, total, attempt.label, redact(&url));

        let response = session.get(&url)?;

        if response.is_markup() {
            return Err(JobCardError::AuthenticationFailure {
                attempt: attempt.label.to_string(),
                content_type: response.content_type.unwrap_or_default(),
            });
        }

        if response.is_success() {
            info!(
                "Exported {} ({} bytes, {})",
                sheet,
                response.body.len(),
                attempt.label
            );
            if let Some(ref cb) = config.progress_callback {
                cb.on_export_complete(attempt.label, response.body.len());
            }
            return Ok(ExportedDocument {
                bytes: response.body,
                attempt: *attempt,
            });
        }

        if response.status == RETRYABLE_STATUS && !is_last {
            warn!(
                "{} failed (HTTP {}), trying next layout",
                attempt.label, response.status
            );
            if let Some(ref cb) = config.progress_callback {
                cb.on_export_fallback(attempt.label, response.status);
            }
            continue;
        }

        return Err(JobCardError::ExportFailure {
            attempt: attempt.label.to_string(),
            status: response.status,
        });
    }

    Err(JobCardError::InvalidConfig("export ladder is empty".into()))
}

/// Check whether `session` can export the sheet behind `url`.
///
/// Sends one fit-to-page A3 request and reports whether a PDF came back.
/// Useful for validating credentials before a batch run; no ladder, no
/// retries.
pub fn probe_access(
    session: &dyn ExportSession,
    url: &str,
    config: &CaptureConfig,
) -> Result<bool, JobCardError> {
    let sheet = SheetReference::parse(url)?;
    let export_url = ExportRequest::new(
        &sheet,
        config.orientation,
        ExportScale::FitToPage,
        PaperSize::A3,
    )
    .url(&config.export_base_url)?;

    let response = session.get(&export_url)?;
    debug!(
        "Access probe for {}: HTTP {} ({:?})",
        sheet, response.status, response.content_type
    );
    Ok(response.is_pdf())
}

/// URL without its query string, for logs and error messages.
fn redact(url: &Url) -> String {
    let mut u = url.clone();
    u.set_query(None);
    u.to_string()
}
