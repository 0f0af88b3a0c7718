//! Blank-page detection and whitespace trimming.
//!
//! Both stages share one measurement: the bounding box of every pixel that
//! is not pure white. A page with no such pixel, or whose box is thinner
//! than [`MIN_CONTENT_PX`] in either direction, is blank (stray hairlines and
//! cell-border specks are common on exported trailing pages). Otherwise the
//! same box is the crop rectangle, so the difference is computed once per
//! page.
//!
//! This is a threshold heuristic; a page holding only a tiny stamp will be
//! dropped and a page with a faint full-width rule will be kept.

use image::{imageops, Rgb, RgbImage};
use serde::{Deserialize, Serialize};

/// Default smallest content extent, in device pixels, for a non-blank page.
pub const MIN_CONTENT_PX: u32 = 50;

/// Background colour the exporter paints pages with.
pub const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// Smallest rectangle enclosing all non-background pixels.
///
/// Half-open: `max_x`/`max_y` are one past the last content column/row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBoundingBox {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl ContentBoundingBox {
    pub fn width(&self) -> u32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> u32 {
        self.max_y - self.min_y
    }

    fn covers(&self, img: &RgbImage) -> bool {
        self.min_x == 0 && self.min_y == 0 && self.max_x == img.width() && self.max_y == img.height()
    }
}

/// Outcome of the blank-page filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageContent {
    Blank,
    Content(ContentBoundingBox),
}

/// Bounding box of all pixels differing from [`BACKGROUND`], if any.
pub fn content_bbox(img: &RgbImage) -> Option<ContentBoundingBox> {
    let mut bbox: Option<ContentBoundingBox> = None;

    for (y, row) in img.rows().enumerate() {
        let y = y as u32;
        for (x, px) in row.enumerate() {
            if *px == BACKGROUND {
                continue;
            }
            let x = x as u32;
            bbox = Some(match bbox {
                None => ContentBoundingBox {
                    min_x: x,
                    min_y: y,
                    max_x: x + 1,
                    max_y: y + 1,
                },
                Some(b) => ContentBoundingBox {
                    min_x: b.min_x.min(x),
                    min_y: b.min_y,
                    max_x: b.max_x.max(x + 1),
                    max_y: y + 1,
                },
            });
        }
    }

    bbox
}

/// Classify a page as blank or content-bearing.
pub fn classify(img: &RgbImage, min_content_px: u32) -> PageContent {
    match content_bbox(img) {
        Some(b) if b.width() >= min_content_px && b.height() >= min_content_px => {
            PageContent::Content(b)
        }
        _ => PageContent::Blank,
    }
}

/// Crop `img` to `bbox`. Returns `img` untouched when the box is the full
/// extent.
pub fn trim(img: RgbImage, bbox: ContentBoundingBox) -> RgbImage {
    if bbox.covers(&img) {
        return img;
    }
    imageops::crop_imm(&img, bbox.min_x, bbox.min_y, bbox.width(), bbox.height()).to_image()
}

/// Measure and crop in one step; an all-background image is returned as is.
pub fn trim_whitespace(img: RgbImage) -> RgbImage {
    match content_bbox(&img) {
        Some(bbox) => trim(img, bbox),
        None => img,
    }
}
