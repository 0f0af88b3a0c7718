//! PDF rasterisation: render each page of the export to an RGB image.
//!
//! Pages are rendered lazily, one per [`Iterator::next`] call, so the
//! caller can write or discard each raster before the next one is
//! allocated. A wide A3 sheet at 150 DPI is about 2480 × 1754 px (13 MB as
//! RGB), so holding every page of a long export at once adds up quickly.

use crate::error::JobCardError;
use image::RgbImage;
use pdfium_render::prelude::*;
use tracing::{debug, info};

/// pdfium's native resolution: one PDF point per pixel at scale 1.0.
pub const POINTS_PER_INCH: f32 = 72.0;

/// Readers accept junk before the `%PDF` marker as long as it appears
/// within this many bytes.
pub const HEADER_SEARCH_WINDOW: usize = 1024;

/// Position of the `%PDF` marker, if at most [`HEADER_SEARCH_WINDOW`] bytes
/// precede it.
pub fn header_offset(bytes: &[u8]) -> Option<usize> {
    let window = &bytes[..bytes.len().min(HEADER_SEARCH_WINDOW + 4)];
    window.windows(4).position(|w| w == b"%PDF")
}

/// One rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterPage {
    /// 0-based position in the original document.
    pub index: usize,
    pub image: RgbImage,
}

impl RasterPage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Lazy, single-pass iterator over the rendered pages of a PDF.
///
/// Yields pages in document order. Stops after the first render error.
pub struct PageRasterizer<'a> {
    document: PdfDocument<'a>,
    render_config: PdfRenderConfig,
    page_count: usize,
    next: usize,
}

impl<'a> PageRasterizer<'a> {
    /// Open `bytes` as a PDF and prepare to render at `dpi`.
    pub fn open(pdfium: &'a Pdfium, bytes: &'a [u8], dpi: u32) -> Result<Self, JobCardError> {
        if header_offset(bytes).is_none() {
            let head: Vec<u8> = bytes.iter().take(4).copied().collect();
            return Err(JobCardError::CorruptPdf {
                detail: format!(
                    "no %PDF header in the first {HEADER_SEARCH_WINDOW} bytes, first bytes: {head:?}"
                ),
            });
        }

        let document = pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(|e| JobCardError::CorruptPdf {
                detail: format!("{:?}", e),
            })?;

        let page_count = document.pages().len() as usize;
        info!("PDF loaded: {} pages", page_count);

        let render_config =
            PdfRenderConfig::new().scale_page_by_factor(dpi as f32 / POINTS_PER_INCH);

        Ok(Self {
            document,
            render_config,
            page_count,
            next: 0,
        })
    }

    /// Total pages in the document, blank or not.
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    fn render(&self, idx: usize) -> Result<RasterPage, JobCardError> {
        let page = self
            .document
            .pages()
            .get(idx as u16)
            .map_err(|e| JobCardError::RasterisationFailed {
                page: idx + 1,
                detail: format!("{:?}", e),
            })?;

        let bitmap = page.render_with_config(&self.render_config).map_err(|e| {
            JobCardError::RasterisationFailed {
                page: idx + 1,
                detail: format!("{:?}", e),
            }
        })?;

        // Drop alpha: the bitmap is cleared to opaque white before drawing.
        let image = bitmap.as_image().into_rgb8();
        debug!(
            "Rendered page {} → {}x{} px",
            idx + 1,
            image.width(),
            image.height()
        );

        Ok(RasterPage { index: idx, image })
    }
}

impl Iterator for PageRasterizer<'_> {
    type Item = Result<RasterPage, JobCardError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.page_count {
            return None;
        }
        let idx = self.next;
        self.next += 1;

        let result = self.render(idx);
        if result.is_err() {
            self.next = self.page_count;
        }
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.page_count - self.next;
        (remaining, Some(remaining))
    }
}
