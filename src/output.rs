//! Result types returned by a capture run.

use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A page that passed the blank filter and was written to disk.
///
/// Returned by [`crate::pipeline::write::ArtifactWriter::write_page`] and
/// normally dropped right after, so only one page image is alive at a time.
#[derive(Debug, Clone)]
pub struct RetainedPage {
    /// 1-based position among retained pages (blank pages skip no numbers).
    pub sequence: usize,
    /// 0-based position in the original document.
    pub page_index: usize,
    pub image: RgbImage,
    pub path: PathBuf,
}

/// Everything one run produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobCardBundle {
    /// Pages in the exported PDF, including blank ones.
    pub original_page_count: usize,
    /// Retained-page paths in original order, then the composite if any.
    pub saved_paths: Vec<PathBuf>,
    /// The composite, also the last entry of `saved_paths`.
    pub composite: Option<PathBuf>,
    /// Ladder layout that produced the PDF; `None` when rendering bytes the
    /// caller supplied.
    pub export_label: Option<String>,
}

impl JobCardBundle {
    /// Number of pages that produced an artifact.
    pub fn retained_count(&self) -> usize {
        self.saved_paths
            .len()
            .saturating_sub(usize::from(self.composite.is_some()))
    }

    /// Retained-page paths, without the composite.
    pub fn page_paths(&self) -> &[PathBuf] {
        &self.saved_paths[..self.retained_count()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retained_count_excludes_composite() {
        let b = JobCardBundle {
            original_page_count: 4,
            saved_paths: vec!["p_001.jpg".into(), "p_002.jpg".into(), "p_merged.jpg".into()],
            composite: Some("p_merged.jpg".into()),
            export_label: Some("A3 normal".into()),
        };
        assert_eq!(b.retained_count(), 2);
        assert_eq!(b.page_paths().len(), 2);
    }

    #[test]
    fn inconsistent_deserialised_bundle_does_not_underflow() {
        let b: JobCardBundle = serde_json::from_str(
            r#"{"original_page_count":0,"saved_paths":[],"composite":"x_merged.jpg","export_label":null}"#,
        )
        .unwrap();
        assert_eq!(b.retained_count(), 0);
        assert!(b.page_paths().is_empty());
    }

    #[test]
    fn bundle_serialises_to_json() {
        let b = JobCardBundle {
            original_page_count: 1,
            saved_paths: vec!["p_001.png".into()],
            composite: None,
            export_label: None,
        };
        let json = serde_json::to_string(&b).unwrap();
        assert!(json.contains("\"original_page_count\":1"));
        let back: JobCardBundle = serde_json::from_str(&json).unwrap();
        assert_eq!(back, b);
    }
}
