//! Capture entry points: share URL in, job-card images out.
//!
//! [`capture_blocking`] is the whole pipeline on the calling thread;
//! [`capture`] runs the same thing on Tokio's blocking pool for async
//! callers (a chat bot, a web hook). [`render_document`] and
//! [`process_pages`] expose the offline half for PDFs the caller already
//! has.

use crate::config::CaptureConfig;
use crate::engine;
use crate::error::JobCardError;
use crate::output::JobCardBundle;
use crate::pipeline::export::{self, ExportSession, EXPORT_LADDER};
use crate::pipeline::render::{PageRasterizer, RasterPage};
use crate::pipeline::resolve::SheetReference;
use crate::pipeline::trim::{self, PageContent};
use crate::pipeline::write::ArtifactWriter;
use crate::pipeline::{compose, scale};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Export the sheet behind `url` and write its job-card images to
/// `output_dir`.
///
/// # Arguments
/// * `url`: spreadsheet share link
/// * `session`: authenticated HTTP session used for the export
/// * `output_dir`: created if absent; owned by this run
/// * `config`: capture configuration
///
/// # Errors
/// Fails fast on a bad URL (no network call), on a terminal export error,
/// on an unreadable PDF, or on a write failure. Files written before the
/// failure are left on disk.
pub fn capture_blocking(
    url: &str,
    session: &dyn ExportSession,
    output_dir: &Path,
    config: &CaptureConfig,
) -> Result<JobCardBundle, JobCardError> {
    let total_start = Instant::now();
    info!("Starting capture: {}", url);

    // ── Step 1: Resolve the sheet ────────────────────────────────────────
    let sheet = SheetReference::parse(url)?;
    debug!(
        "Spreadsheet {} / gid {}",
        sheet.spreadsheet_id, sheet.gid
    );

    // ── Step 2: Export via the ladder ────────────────────────────────────
    let exported = export::retrieve(session, &sheet, EXPORT_LADDER, config)?;

    // ── Step 3: Rasterise, filter, trim, scale, write ────────────────────
    let mut bundle = render_document(&exported.bytes, output_dir, config)?;
    bundle.export_label = Some(exported.attempt.label.to_string());

    info!(
        "Capture complete: {} files from {} pages in {}ms",
        bundle.saved_paths.len(),
        bundle.original_page_count,
        total_start.elapsed().as_millis()
    );
    Ok(bundle)
}

/// Async wrapper around [`capture_blocking`].
///
/// The export GET and pdfium rendering both block, so the run is moved to
/// `spawn_blocking` rather than stalling a runtime worker.
pub async fn capture(
    url: impl Into<String>,
    session: Arc<dyn ExportSession>,
    output_dir: impl Into<PathBuf>,
    config: &CaptureConfig,
) -> Result<JobCardBundle, JobCardError> {
    let url = url.into();
    let output_dir = output_dir.into();
    let config = config.clone();

    tokio::task::spawn_blocking(move || {
        capture_blocking(&url, session.as_ref(), &output_dir, &config)
    })
    .await
    .map_err(|e| JobCardError::Internal(format!("Capture task panicked: {}", e)))?
}

/// Turn PDF bytes into job-card images, without any network access.
///
/// Concurrent calls are serialised on the pdfium library; see
/// [`engine::with_pdfium`].
pub fn render_document(
    pdf_bytes: &[u8],
    output_dir: &Path,
    config: &CaptureConfig,
) -> Result<JobCardBundle, JobCardError> {
    let render_start = Instant::now();
    let bundle = engine::with_pdfium(|pdfium| {
        let pages = PageRasterizer::open(pdfium, pdf_bytes, config.dpi)?;

        if let Some(ref cb) = config.progress_callback {
            cb.on_document_opened(pages.page_count());
        }

        process_pages(pages, output_dir, config)
    })?;
    debug!(
        "Rendered and wrote {} pages in {}ms",
        bundle.original_page_count,
        render_start.elapsed().as_millis()
    );
    Ok(bundle)
}

/// Filter, trim, scale and write a stream of rendered pages, then stack the
/// survivors into the composite.
///
/// Each page is written (and dropped) before the next one is pulled from
/// `pages`. `original_page_count` in the result is the number of pages
/// consumed.
pub fn process_pages<I>(
    pages: I,
    output_dir: &Path,
    config: &CaptureConfig,
) -> Result<JobCardBundle, JobCardError>
where
    I: IntoIterator<Item = Result<RasterPage, JobCardError>>,
{
    let mut writer = ArtifactWriter::create(output_dir, config.prefix.as_str(), config.format)?;
    let mut page_count = 0;

    for page in pages {
        let page = page?;
        page_count += 1;

        match trim::classify(&page.image, config.min_content_px) {
            PageContent::Blank => {
                info!("Page {} is blank, skipping", page.index + 1);
                if let Some(ref cb) = config.progress_callback {
                    cb.on_page_skipped(page.index);
                }
            }
            PageContent::Content(bbox) => {
                let image = scale::rescale(trim::trim(page.image, bbox), config.max_width);
                let retained = writer.write_page(page.index, image)?;
                info!(
                    "Saved page {} as #{}: {}",
                    retained.page_index + 1,
                    retained.sequence,
                    retained.path.display()
                );
                if let Some(ref cb) = config.progress_callback {
                    cb.on_page_saved(retained.sequence, retained.page_index, &retained.path);
                }
            }
        }
    }

    let mut saved_paths = writer.page_paths().to_vec();
    let retained = saved_paths.len();

    let composite = if config.merge && retained > 1 {
        let merged = scale::rescale(compose::compose_files(&saved_paths)?, config.max_width);
        let path = writer.write_composite(&merged)?;
        info!("Saved composite: {}", path.display());
        if let Some(ref cb) = config.progress_callback {
            cb.on_composite_saved(&path);
        }
        saved_paths.push(path.clone());
        Some(path)
    } else {
        None
    };

    if let Some(ref cb) = config.progress_callback {
        cb.on_capture_complete(page_count, retained);
    }

    Ok(JobCardBundle {
        original_page_count: page_count,
        saved_paths,
        composite,
        export_label: None,
    })
}
