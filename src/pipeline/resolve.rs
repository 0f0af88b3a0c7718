//! Share-URL resolution: pull the spreadsheet id and tab id out of a link.
//!
//! Share links come in several shapes (`/edit#gid=…`, `/edit?gid=…`,
//! `/view`, `/htmlview`), but every one carries the id as the path segment
//! after `/spreadsheets/d/`. The tab is optional; a link without `gid` points
//! at the first tab, whose id is always `0`.

use crate::error::JobCardError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

static SPREADSHEET_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/spreadsheets/d/([a-zA-Z0-9_-]+)").unwrap());

static GID: Lazy<Regex> = Lazy::new(|| Regex::new(r"[#?&]gid=(\d+)").unwrap());

/// Tab id used when the URL names no `gid`.
pub const DEFAULT_GID: &str = "0";

/// A resolved (spreadsheet, tab) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetReference {
    pub spreadsheet_id: String,
    pub gid: String,
}

impl SheetReference {
    /// Resolve a share URL.
    ///
    /// # Errors
    /// [`JobCardError::InvalidReference`] when no `/spreadsheets/d/{id}`
    /// segment is present.
    pub fn parse(url: &str) -> Result<Self, JobCardError> {
        let spreadsheet_id = SPREADSHEET_ID
            .captures(url)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| JobCardError::InvalidReference {
                url: url.to_string(),
            })?;

        let gid = GID
            .captures(url)
            .and_then(|c| c.get(1))
            .map_or_else(|| DEFAULT_GID.to_string(), |m| m.as_str().to_string());

        Ok(Self {
            spreadsheet_id,
            gid,
        })
    }
}

impl fmt::Display for SheetReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#gid={}", self.spreadsheet_id, self.gid)
    }
}
