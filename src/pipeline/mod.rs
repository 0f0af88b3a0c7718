//! Pipeline stages for sheet-to-job-card capture.
//!
//! Each submodule implements one step and is testable on its own; only
//! [`export`] touches the network and only [`render`] touches pdfium.
//!
//! ## Data Flow
//!
//! ```text
//! resolve ──▶ request ──▶ export ──▶ render ──▶ trim ──▶ scale ──▶ write ──▶ compose
//! (share URL) (query)    (ladder)   (pdfium)  (blank)  (width)   (files)   (stack)
//! ```
//!
//! 1. [`resolve`]: pull the spreadsheet id and tab gid out of a share link
//! 2. [`request`]: build the PDF export URL for one layout
//! 3. [`export`]: walk the layout ladder until the service returns a PDF
//! 4. [`render`]: rasterise pages lazily, one at a time
//! 5. [`trim`]: drop near-empty pages, crop the rest to their ink
//! 6. [`scale`]: cap the width, keeping the aspect ratio
//! 7. [`write`]: persist pages with gap-free sequence numbers
//! 8. [`compose`]: stack the written pages into one tall image

pub mod compose;
pub mod export;
pub mod render;
pub mod request;
pub mod resolve;
pub mod scale;
pub mod trim;
pub mod write;
