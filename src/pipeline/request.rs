//! Export request construction.
//!
//! The export endpoint prints a sheet to PDF with whatever page setup the
//! query string asks for. Job cards need edge-to-edge content, so every
//! request forces zero margins and turns off all print decorations; only
//! the scale and paper size vary between ladder attempts.

use crate::config::{ExportScale, Orientation, PaperSize};
use crate::error::JobCardError;
use crate::pipeline::resolve::SheetReference;
use reqwest::Url;

/// Spreadsheet service root; `/{id}/export` is appended per request.
pub const DEFAULT_EXPORT_BASE_URL: &str = "https://docs.google.com/spreadsheets/d";

/// Everything that varies between export requests for one sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub spreadsheet_id: String,
    pub gid: String,
    pub orientation: Orientation,
    pub scale: ExportScale,
    pub paper_size: PaperSize,
}

impl ExportRequest {
    pub fn new(
        sheet: &SheetReference,
        orientation: Orientation,
        scale: ExportScale,
        paper_size: PaperSize,
    ) -> Self {
        Self {
            spreadsheet_id: sheet.spreadsheet_id.clone(),
            gid: sheet.gid.clone(),
            orientation,
            scale,
            paper_size,
        }
    }

    /// Query parameters in the order the endpoint documents them.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let flag = |v: bool| if v { "true" } else { "false" }.to_string();
        vec![
            ("format", "pdf".to_string()),
            ("gid", self.gid.clone()),
            ("size", self.paper_size.code().to_string()),
            ("portrait", flag(self.orientation.is_portrait())),
            ("scale", self.scale.code().to_string()),
            ("fitw", flag(true)),
            ("sheetnames", flag(false)),
            ("printtitle", flag(false)),
            ("pagenumbers", flag(false)),
            ("gridlines", flag(false)),
            ("fzr", flag(false)),
            ("fzc", flag(false)),
            ("top_margin", "0".to_string()),
            ("bottom_margin", "0".to_string()),
            ("left_margin", "0".to_string()),
            ("right_margin", "0".to_string()),
        ]
    }

    /// Full export URL under `base_url`.
    pub fn url(&self, base_url: &str) -> Result<Url, JobCardError> {
        let endpoint = format!(
            "{}/{}/export",
            base_url.trim_end_matches('/'),
            self.spreadsheet_id
        );
        Url::parse_with_params(&endpoint, self.query_pairs()).map_err(|e| {
            JobCardError::InvalidConfig(format!("export base URL '{base_url}' is invalid: {e}"))
        })
    }
}
