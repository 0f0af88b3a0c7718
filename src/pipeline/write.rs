//! Artifact persistence with deterministic, gap-free file names.
//!
//! Pages are written as `{prefix}_001.{ext}`, `{prefix}_002.{ext}`, … in the
//! order they are handed in; the composite is `{prefix}_merged.{ext}`. The
//! sequence counter lives in the writer, and one writer serves one run, so
//! numbering always restarts at 1 and blank pages never leave a gap.

use crate::config::OutputFormat;
use crate::error::JobCardError;
use crate::output::RetainedPage;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder, RgbImage};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// JPEG quality used for every `.jpg` artifact.
pub const JPEG_QUALITY: u8 = 85;

/// Writes the artifacts of one run into one directory.
#[derive(Debug)]
pub struct ArtifactWriter {
    dir: PathBuf,
    prefix: String,
    format: OutputFormat,
    next_sequence: usize,
    page_paths: Vec<PathBuf>,
}

impl ArtifactWriter {
    /// Create `dir` (and parents) if needed.
    pub fn create(
        dir: impl Into<PathBuf>,
        prefix: impl Into<String>,
        format: OutputFormat,
    ) -> Result<Self, JobCardError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| JobCardError::OutputWriteFailed {
            path: dir.clone(),
            source: e,
        })?;
        Ok(Self {
            dir,
            prefix: prefix.into(),
            format,
            next_sequence: 1,
            page_paths: Vec::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the page with 1-based `sequence`.
    pub fn page_path(&self, sequence: usize) -> PathBuf {
        self.dir.join(format!(
            "{}_{:03}.{}",
            self.prefix,
            sequence,
            self.format.extension()
        ))
    }

    pub fn composite_path(&self) -> PathBuf {
        self.dir
            .join(format!("{}_merged.{}", self.prefix, self.format.extension()))
    }

    /// Write the next retained page and assign it the next sequence number.
    pub fn write_page(
        &mut self,
        page_index: usize,
        image: RgbImage,
    ) -> Result<RetainedPage, JobCardError> {
        let sequence = self.next_sequence;
        let path = self.page_path(sequence);
        encode(&image, &path, self.format)?;

        self.next_sequence += 1;
        self.page_paths.push(path.clone());
        Ok(RetainedPage {
            sequence,
            page_index,
            image,
            path,
        })
    }

    /// Write the stacked composite.
    pub fn write_composite(&self, image: &RgbImage) -> Result<PathBuf, JobCardError> {
        let path = self.composite_path();
        encode(image, &path, self.format)?;
        Ok(path)
    }

    /// Paths of the pages written so far, in sequence order.
    pub fn page_paths(&self) -> &[PathBuf] {
        &self.page_paths
    }
}

/// Encode `image` to `path` in `format`.
pub fn encode(image: &RgbImage, path: &Path, format: OutputFormat) -> Result<(), JobCardError> {
    let write_err = |e: std::io::Error| JobCardError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };
    let image_err = |e: image::ImageError| JobCardError::ImageFailed {
        path: path.to_path_buf(),
        source: e,
    };

    let mut out = BufWriter::new(File::create(path).map_err(write_err)?);
    let (w, h) = image.dimensions();

    match format {
        OutputFormat::Png => PngEncoder::new_with_quality(
            &mut out,
            CompressionType::Best,
            FilterType::Adaptive,
        )
        .write_image(image.as_raw(), w, h, ExtendedColorType::Rgb8)
        .map_err(image_err)?,
        OutputFormat::Jpg => JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY)
            .write_image(image.as_raw(), w, h, ExtendedColorType::Rgb8)
            .map_err(image_err)?,
    }

    out.flush().map_err(write_err)?;
    debug!("Saved {} ({}x{})", path.display(), w, h);
    Ok(())
}
