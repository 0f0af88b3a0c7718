//! Aspect-preserving downscaling to a maximum width.

use image::imageops::{self, FilterType};
use image::RgbImage;
use tracing::debug;

/// Shrink `img` so its width is at most `max_width`, keeping the aspect
/// ratio. Never upscales; `None` leaves the image as is.
///
/// The new height is `floor(height * max_width / width)`, at least 1.
pub fn rescale(img: RgbImage, max_width: Option<u32>) -> RgbImage {
    let Some(max_width) = max_width else {
        return img;
    };
    let (w, h) = img.dimensions();
    if max_width == 0 || w <= max_width {
        return img;
    }

    let (nw, nh) = scaled_size(w, h, max_width);
    debug!("Rescaling {}x{} → {}x{}", w, h, nw, nh);
    imageops::resize(&img, nw, nh, FilterType::Lanczos3)
}

/// Target size for a `w`×`h` image capped at `max_width` (assumes `w > max_width`).
fn scaled_size(w: u32, h: u32, max_width: u32) -> (u32, u32) {
    let nh = (u64::from(h) * u64::from(max_width) / u64::from(w)).max(1);
    (max_width, nh as u32)
}
