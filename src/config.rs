//! Configuration types for a job-card capture run.
//!
//! Every knob lives in [`CaptureConfig`], built via its
//! [`CaptureConfigBuilder`]. One struct per run makes it easy to log the
//! settings that produced a given set of images and to reuse them across a
//! batch of sheets.

use crate::error::JobCardError;
use crate::layout::validate_component;
use crate::pipeline::request::DEFAULT_EXPORT_BASE_URL;
use crate::progress::ProgressCallback;
use crate::pipeline::trim::MIN_CONTENT_PX;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Configuration for one spreadsheet-to-images run.
///
/// Built via [`CaptureConfig::builder()`] or using
/// [`CaptureConfig::default()`].
///
/// # Example
/// ```rust
/// use jobcard_capture::{CaptureConfig, OutputFormat};
///
/// let config = CaptureConfig::builder()
///     .dpi(200)
///     .format(OutputFormat::Png)
///     .max_width(Some(1200))
///     .prefix("20261019_site-a_job-card")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct CaptureConfig {
    /// Rendering DPI for each PDF page. Range: 72–600. Default: 150.
    ///
    /// Pages are rendered at `dpi / 72` magnification, so 150 DPI on an A3
    /// landscape sheet gives roughly 2480 × 1754 px before trimming.
    pub dpi: u32,

    /// Image format of every artifact. Default: [`OutputFormat::Jpg`].
    pub format: OutputFormat,

    /// Maximum artifact width in pixels; `None` keeps the rendered width.
    /// Default: 1600.
    ///
    /// Applied to each page after trimming and again to the composite.
    pub max_width: Option<u32>,

    /// Filename prefix: pages are written as `{prefix}_001.{ext}`.
    /// Default: `"page"`.
    pub prefix: String,

    /// Page orientation requested from the export endpoint. Default: landscape.
    pub orientation: Orientation,

    /// Stack the retained pages into `{prefix}_merged.{ext}` when at least
    /// two pages survive the blank filter. Default: true.
    pub merge: bool,

    /// Smallest content width or height, in device pixels, for a page to
    /// count as non-blank. Default: [`MIN_CONTENT_PX`].
    pub min_content_px: u32,

    /// TCP connect timeout for each export request in seconds. Default: 30.
    pub connect_timeout_secs: u64,

    /// Whole-response read timeout for each export request in seconds. Default: 60.
    pub read_timeout_secs: u64,

    /// Base URL of the spreadsheet service; `/{id}/export` is appended.
    pub export_base_url: String,

    /// Optional observer for export and page events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            dpi: 150,
            format: OutputFormat::default(),
            max_width: Some(1600),
            prefix: "page".to_string(),
            orientation: Orientation::default(),
            merge: true,
            min_content_px: MIN_CONTENT_PX,
            connect_timeout_secs: 30,
            read_timeout_secs: 60,
            export_base_url: DEFAULT_EXPORT_BASE_URL.to_string(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for CaptureConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureConfig")
            .field("dpi", &self.dpi)
            .field("format", &self.format)
            .field("max_width", &self.max_width)
            .field("prefix", &self.prefix)
            .field("orientation", &self.orientation)
            .field("merge", &self.merge)
            .field("min_content_px", &self.min_content_px)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("read_timeout_secs", &self.read_timeout_secs)
            .field("export_base_url", &self.export_base_url)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn CaptureProgressCallback>"),
            )
            .finish()
    }
}

impl CaptureConfig {
    /// Create a new builder for `CaptureConfig`.
    pub fn builder() -> CaptureConfigBuilder {
        CaptureConfigBuilder {
            config: Self::default(),
        }
    }

    /// Connect timeout as a [`Duration`].
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Read timeout as a [`Duration`].
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }
}

/// Builder for [`CaptureConfig`].
#[derive(Debug)]
pub struct CaptureConfigBuilder {
    config: CaptureConfig,
}

impl CaptureConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 600);
        self
    }

    pub fn format(mut self, format: OutputFormat) -> Self {
        self.config.format = format;
        self
    }

    pub fn max_width(mut self, px: Option<u32>) -> Self {
        self.config.max_width = px;
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.prefix = prefix.into();
        self
    }

    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.config.orientation = orientation;
        self
    }

    pub fn merge(mut self, v: bool) -> Self {
        self.config.merge = v;
        self
    }

    pub fn min_content_px(mut self, px: u32) -> Self {
        self.config.min_content_px = px;
        self
    }

    pub fn connect_timeout_secs(mut self, secs: u64) -> Self {
        self.config.connect_timeout_secs = secs;
        self
    }

    pub fn read_timeout_secs(mut self, secs: u64) -> Self {
        self.config.read_timeout_secs = secs;
        self
    }

    pub fn export_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.export_base_url = url.into();
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<CaptureConfig, JobCardError> {
        let c = &self.config;
        if c.dpi < 72 || c.dpi > 600 {
            return Err(JobCardError::InvalidConfig(format!(
                "DPI must be 72–600, got {}",
                c.dpi
            )));
        }
        if c.max_width == Some(0) {
            return Err(JobCardError::InvalidConfig(
                "Max width must be ≥ 1 (use None for unbounded)".into(),
            ));
        }
        validate_component(&c.prefix, "prefix")?;
        if c.connect_timeout_secs == 0 || c.read_timeout_secs == 0 {
            return Err(JobCardError::InvalidConfig(
                "Timeouts must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Artifact image format.
///
/// JPEG is the default because job cards are mostly forwarded through chat
/// apps that recompress anyway; PNG is there for archival copies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossless PNG at the best compression level.
    Png,
    /// JPEG at a fixed quality of 85. (default)
    #[default]
    Jpg,
}

impl OutputFormat {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpg => "jpg",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = JobCardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpg" => Ok(OutputFormat::Jpg),
            other => Err(JobCardError::InvalidConfig(format!(
                "format must be 'png' or 'jpg', got '{other}'"
            ))),
        }
    }
}

/// Page orientation of the exported PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Orientation {
    Portrait,
    /// Wide sheets are the common case for job cards. (default)
    #[default]
    Landscape,
}

impl Orientation {
    pub fn is_portrait(self) -> bool {
        matches!(self, Orientation::Portrait)
    }
}

/// Print scaling requested from the export endpoint.
///
/// The discriminants are the endpoint's `scale` codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportScale {
    /// Normal (100%).
    Normal = 1,
    FitToWidth = 2,
    FitToHeight = 3,
    FitToPage = 4,
}

impl ExportScale {
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Paper size requested from the export endpoint.
///
/// The discriminants are the endpoint's `size` codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperSize {
    Letter = 0,
    Tabloid = 1,
    Legal = 2,
    A3 = 6,
    A4 = 7,
}

impl PaperSize {
    pub fn code(self) -> u8 {
        self as u8
    }
}
