//! Vertical composition of retained pages into one tall image.
//!
//! Chat apps show a single tall image better than a gallery of pages, so
//! the retained pages are stacked top to bottom, left-aligned, on a white
//! canvas as wide as the widest page.

use crate::error::JobCardError;
use crate::pipeline::trim::BACKGROUND;
use image::{imageops, RgbImage};
use std::path::PathBuf;
use tracing::debug;

/// Canvas size for stacking images of the given sizes:
/// `(max width, sum of heights)`.
pub fn canvas_size(sizes: impl IntoIterator<Item = (u32, u32)>) -> (u32, u32) {
    sizes
        .into_iter()
        .fold((0, 0), |(w, h), (iw, ih)| (w.max(iw), h.saturating_add(ih)))
}

/// Stack in-memory images in order.
pub fn compose(images: &[RgbImage]) -> RgbImage {
    let (width, height) = canvas_size(images.iter().map(RgbImage::dimensions));
    let mut canvas = RgbImage::from_pixel(width, height, BACKGROUND);

    let mut y: i64 = 0;
    for img in images {
        imageops::replace(&mut canvas, img, 0, y);
        y += i64::from(img.height());
    }

    debug!("Composed {} images → {}x{}", images.len(), width, height);
    canvas
}

/// Stack images stored on disk, in order.
///
/// Dimensions are read from the file headers first, then each image is
/// decoded and pasted one at a time.
pub fn compose_files(paths: &[PathBuf]) -> Result<RgbImage, JobCardError> {
    let sizes = paths
        .iter()
        .map(|p| {
            image::image_dimensions(p).map_err(|e| JobCardError::ImageFailed {
                path: p.clone(),
                source: e,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let (width, height) = canvas_size(sizes.iter().copied());
    let mut canvas = RgbImage::from_pixel(width, height, BACKGROUND);

    let mut y: i64 = 0;
    for (path, (_, h)) in paths.iter().zip(&sizes) {
        let img = image::open(path)
            .map_err(|e| JobCardError::ImageFailed {
                path: path.clone(),
                source: e,
            })?
            .into_rgb8();
        imageops::replace(&mut canvas, &img, 0, y);
        y += i64::from(*h);
    }

    debug!("Composed {} files → {}x{}", paths.len(), width, height);
    Ok(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    const RED: Rgb<u8> = Rgb([200, 0, 0]);
    const BLUE: Rgb<u8> = Rgb([0, 0, 200]);

    #[test]
    fn canvas_is_max_width_by_sum_height() {
        assert_eq!(canvas_size([(100, 20), (300, 50), (50, 5)]), (300, 75));
        assert_eq!(canvas_size(std::iter::empty()), (0, 0));
    }

    #[test]
    fn pages_are_stacked_left_aligned_on_white() {
        let a = RgbImage::from_pixel(100, 20, RED);
        let b = RgbImage::from_pixel(40, 10, BLUE);
        let out = compose(&[a, b]);

        assert_eq!(out.dimensions(), (100, 30));
        assert_eq!(*out.get_pixel(99, 19), RED);
        assert_eq!(*out.get_pixel(0, 20), BLUE);
        assert_eq!(*out.get_pixel(39, 29), BLUE);
        // Right of the narrower page is background.
        assert_eq!(*out.get_pixel(40, 25), BACKGROUND);
    }

    #[test]
    fn compose_files_matches_in_memory() {
        let dir = tempfile::tempdir().unwrap();
        let a = RgbImage::from_pixel(30, 12, RED);
        let b = RgbImage::from_pixel(50, 8, BLUE);
        let pa = dir.path().join("a.png");
        let pb = dir.path().join("b.png");
        a.save(&pa).unwrap();
        b.save(&pb).unwrap();

        let from_files = compose_files(&[pa, pb]).unwrap();
        assert_eq!(from_files, compose(&[a, b]));
    }

    #[test]
    fn missing_file_is_image_error() {
        let err = compose_files(&[PathBuf::from("/definitely/not/here.png")]).unwrap_err();
        assert!(matches!(err, JobCardError::ImageFailed { .. }));
    }
}
