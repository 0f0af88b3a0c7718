//! Integration tests for the capture pipeline that need neither pdfium nor
//! the network.
//!
//! Pages are synthetic rasters fed straight into `process_pages`; exports go
//! through a scripted in-memory `ExportSession`.
//!
//! Run with:
//!   cargo test --test pipeline

use image::{Rgb, RgbImage};
use jobcard_capture::pipeline::export::{retrieve, ExportResponse, EXPORT_LADDER};
use jobcard_capture::pipeline::render::RasterPage;
use jobcard_capture::{
    capture, capture_blocking, process_pages, run_layout, CaptureConfig, CaptureProgressCallback,
    ErrorCategory, ExportSession, JobCardError, OutputFormat, SheetReference,
};
use reqwest::Url;
use std::path::Path;
use std::sync::{Arc, Mutex};

// ── Test helpers ─────────────────────────────────────────────────────────────

const INK: Rgb<u8> = Rgb([20, 20, 20]);

/// Route library logs to the test harness (`--nocapture` shows them).
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("jobcard_capture=debug")
        .with_test_writer()
        .try_init();
}

fn white(w: u32, h: u32) -> RgbImage {
    RgbImage::from_pixel(w, h, Rgb([255, 255, 255]))
}

/// White page with an inked block at `(x, y)` of size `bw`×`bh`.
fn page_with_block(w: u32, h: u32, x: u32, y: u32, bw: u32, bh: u32) -> RgbImage {
    let mut img = white(w, h);
    for py in y..y + bh {
        for px in x..x + bw {
            img.put_pixel(px, py, INK);
        }
    }
    img
}

fn stream(images: Vec<RgbImage>) -> impl Iterator<Item = Result<RasterPage, JobCardError>> {
    images
        .into_iter()
        .enumerate()
        .map(|(index, image)| Ok(RasterPage { index, image }))
}

fn png_config() -> CaptureConfig {
    CaptureConfig::builder()
        .format(OutputFormat::Png)
        .max_width(None)
        .build()
        .unwrap()
}

/// Replays canned responses in order and records every requested URL.
struct ScriptedSession {
    responses: Mutex<Vec<ExportResponse>>,
    requested: Mutex<Vec<Url>>,
}

impl ScriptedSession {
    fn new(script: Vec<ExportResponse>) -> Self {
        let mut responses = script;
        responses.reverse();
        Self {
            responses: Mutex::new(responses),
            requested: Mutex::new(Vec::new()),
        }
    }

    fn status(status: u16, content_type: &str) -> ExportResponse {
        ExportResponse {
            status,
            content_type: Some(content_type.to_string()),
            body: b"<html>nope</html>".to_vec(),
        }
    }

    fn request_count(&self) -> usize {
        self.requested.lock().unwrap().len()
    }
}

impl ExportSession for ScriptedSession {
    fn get(&self, url: &Url) -> Result<ExportResponse, JobCardError> {
        self.requested.lock().unwrap().push(url.clone());
        self.responses
            .lock()
            .unwrap()
            .pop()
            .ok_or_else(|| JobCardError::Internal("script exhausted".into()))
    }
}

/// Records every callback as a short string.
#[derive(Default)]
struct EventLog(Mutex<Vec<String>>);

impl EventLog {
    fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
    fn push(&self, s: String) {
        self.0.lock().unwrap().push(s);
    }
}

impl CaptureProgressCallback for EventLog {
    fn on_export_attempt(&self, attempt: usize, total: usize, label: &str) {
        self.push(format!("attempt {attempt}/{total} {label}"));
    }
    fn on_export_fallback(&self, label: &str, status: u16) {
        self.push(format!("fallback {label} {status}"));
    }
    fn on_export_complete(&self, label: &str, _bytes: usize) {
        self.push(format!("exported {label}"));
    }
    fn on_page_skipped(&self, page_index: usize) {
        self.push(format!("skip {page_index}"));
    }
    fn on_page_saved(&self, sequence: usize, page_index: usize, _path: &Path) {
        self.push(format!("save {sequence}<-{page_index}"));
    }
    fn on_composite_saved(&self, _path: &Path) {
        self.push("composite".into());
    }
    fn on_capture_complete(&self, page_count: usize, retained: usize) {
        self.push(format!("done {retained}/{page_count}"));
    }
}

// ── Page processing ──────────────────────────────────────────────────────────

#[test]
fn blank_pages_are_dropped_and_numbering_stays_contiguous() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let pages = vec![
        page_with_block(400, 300, 20, 30, 200, 100),
        white(400, 300),
        page_with_block(400, 300, 0, 0, 120, 80),
        white(400, 300),
        page_with_block(400, 300, 100, 100, 60, 150),
    ];

    let bundle = process_pages(stream(pages), dir.path(), &png_config()).unwrap();

    assert_eq!(bundle.original_page_count, 5);
    assert_eq!(bundle.retained_count(), 3);
    let names: Vec<String> = bundle
        .saved_paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        ["page_001.png", "page_002.png", "page_003.png", "page_merged.png"]
    );
    assert!(!dir.path().join("page_004.png").exists());
}

#[test]
fn retained_pages_are_trimmed_to_their_ink() {
    let dir = tempfile::tempdir().unwrap();
    let pages = vec![page_with_block(500, 400, 37, 91, 210, 64)];

    let bundle = process_pages(stream(pages), dir.path(), &png_config()).unwrap();

    let saved = image::open(&bundle.saved_paths[0]).unwrap().into_rgb8();
    assert_eq!(saved.dimensions(), (210, 64));
    assert!(saved.pixels().all(|p| *p == INK));
}

#[test]
fn composite_stacks_trimmed_pages() {
    let dir = tempfile::tempdir().unwrap();
    let pages = vec![
        page_with_block(600, 400, 10, 10, 300, 100),
        page_with_block(600, 400, 50, 50, 120, 70),
    ];

    let bundle = process_pages(stream(pages), dir.path(), &png_config()).unwrap();

    let composite = bundle.composite.as_ref().unwrap();
    assert_eq!(image::image_dimensions(composite).unwrap(), (300, 170));
    let merged = image::open(composite).unwrap().into_rgb8();
    // Right of the narrower second page is white canvas.
    assert_eq!(*merged.get_pixel(200, 150), Rgb([255, 255, 255]));
    assert_eq!(*merged.get_pixel(50, 150), INK);
}

#[test]
fn single_retained_page_gets_no_composite() {
    let dir = tempfile::tempdir().unwrap();
    let pages = vec![white(300, 300), page_with_block(300, 300, 10, 10, 80, 80)];

    let bundle = process_pages(stream(pages), dir.path(), &png_config()).unwrap();

    assert_eq!(bundle.saved_paths.len(), 1);
    assert!(bundle.composite.is_none());
    assert!(!dir.path().join("page_merged.png").exists());
}

#[test]
fn pages_under_the_content_threshold_count_as_blank() {
    let dir = tempfile::tempdir().unwrap();
    let pages = vec![
        // 49 px tall: below the threshold.
        page_with_block(400, 400, 0, 0, 300, 49),
        // Exactly 50 × 50: kept.
        page_with_block(400, 400, 0, 0, 50, 50),
    ];

    let bundle = process_pages(stream(pages), dir.path(), &png_config()).unwrap();

    assert_eq!(bundle.retained_count(), 1);
    assert_eq!(
        image::image_dimensions(&bundle.saved_paths[0]).unwrap(),
        (50, 50)
    );
}

#[test]
fn width_cap_applies_to_pages_and_composite() {
    let dir = tempfile::tempdir().unwrap();
    let config = CaptureConfig::builder()
        .format(OutputFormat::Png)
        .max_width(Some(200))
        .build()
        .unwrap();
    let pages = vec![
        page_with_block(1000, 500, 0, 0, 800, 400),
        page_with_block(1000, 500, 0, 0, 100, 100),
    ];

    let bundle = process_pages(stream(pages), dir.path(), &config).unwrap();

    let dims: Vec<(u32, u32)> = bundle
        .saved_paths
        .iter()
        .map(|p| image::image_dimensions(p).unwrap())
        .collect();
    // 800×400 → 200×100; 100×100 untouched; composite 200×200 stays.
    assert_eq!(dims, [(200, 100), (100, 100), (200, 200)]);
}

#[test]
fn jpeg_artifacts_use_jpg_extension() {
    let dir = tempfile::tempdir().unwrap();
    let config = CaptureConfig::builder().prefix("card").build().unwrap();
    let pages = vec![
        page_with_block(200, 200, 0, 0, 100, 100),
        page_with_block(200, 200, 0, 0, 100, 100),
    ];

    let bundle = process_pages(stream(pages), dir.path(), &config).unwrap();

    assert_eq!(bundle.saved_paths[0], dir.path().join("card_001.jpg"));
    assert_eq!(bundle.composite, Some(dir.path().join("card_merged.jpg")));
}

#[test]
fn progress_events_follow_page_order() {
    let dir = tempfile::tempdir().unwrap();
    let log = Arc::new(EventLog::default());
    let config = CaptureConfig::builder()
        .format(OutputFormat::Png)
        .progress_callback(log.clone())
        .build()
        .unwrap();
    let pages = vec![
        white(200, 200),
        page_with_block(200, 200, 0, 0, 100, 100),
        page_with_block(200, 200, 0, 0, 100, 100),
    ];

    process_pages(stream(pages), dir.path(), &config).unwrap();

    assert_eq!(
        log.events(),
        ["skip 0", "save 1<-1", "save 2<-2", "composite", "done 2/3"]
    );
}

#[test]
fn run_layout_prefix_flows_into_file_names() {
    let root = tempfile::tempdir().unwrap();
    let layout = run_layout(root.path(), "20261019_143005", "site-a").unwrap();
    let config = CaptureConfig::builder()
        .format(OutputFormat::Png)
        .prefix(layout.prefix.clone())
        .build()
        .unwrap();

    let bundle = process_pages(
        stream(vec![page_with_block(100, 100, 0, 0, 60, 60)]),
        &layout.output_dir,
        &config,
    )
    .unwrap();

    assert_eq!(
        bundle.saved_paths[0],
        root.path()
            .join("20261019_143005")
            .join("site-a")
            .join("20261019_site-a_job-card_001.png")
    );
}

// ── Export ladder ────────────────────────────────────────────────────────────

#[test]
fn ladder_falls_back_on_500_and_reports_each_step() {
    init_tracing();
    let log = Arc::new(EventLog::default());
    let config = CaptureConfig::builder()
        .progress_callback(log.clone())
        .build()
        .unwrap();
    let session = ScriptedSession::new(vec![
        ScriptedSession::status(500, "text/plain"),
        ExportResponse {
            status: 200,
            content_type: Some("application/pdf".into()),
            body: b"%PDF-1.7".to_vec(),
        },
    ]);
    let sheet = SheetReference::parse("https://docs.google.com/spreadsheets/d/XYZ/edit#gid=9")
        .unwrap();

    let doc = retrieve(&session, &sheet, EXPORT_LADDER, &config).unwrap();

    assert_eq!(doc.attempt.label, "A3 normal");
    assert_eq!(doc.bytes, b"%PDF-1.7");
    assert_eq!(
        log.events(),
        [
            "attempt 1/3 A3 fit-to-width",
            "fallback A3 fit-to-width 500",
            "attempt 2/3 A3 normal",
            "exported A3 normal",
        ]
    );
}

#[test]
fn export_failure_stops_before_rendering() {
    let root = tempfile::tempdir().unwrap();
    let out = root.path().join("run");
    let session = ScriptedSession::new(vec![ScriptedSession::status(404, "text/plain")]);

    let err = capture_blocking(
        "https://docs.google.com/spreadsheets/d/XYZ/edit",
        &session,
        &out,
        &CaptureConfig::default(),
    )
    .unwrap_err();

    assert!(matches!(err, JobCardError::ExportFailure { status: 404, .. }));
    assert_eq!(err.category(), ErrorCategory::Source);
    assert_eq!(session.request_count(), 1);
    assert!(!out.exists());
}

#[test]
fn sign_in_page_is_an_authentication_failure() {
    let root = tempfile::tempdir().unwrap();
    let session = ScriptedSession::new(vec![ScriptedSession::status(
        200,
        "text/html; charset=utf-8",
    )]);

    let err = capture_blocking(
        "https://docs.google.com/spreadsheets/d/XYZ/edit#gid=3",
        &session,
        root.path(),
        &CaptureConfig::default(),
    )
    .unwrap_err();

    assert!(matches!(err, JobCardError::AuthenticationFailure { .. }));
    assert_eq!(session.request_count(), 1);
}

#[test]
fn three_500s_exhaust_the_ladder() {
    let session = ScriptedSession::new(vec![
        ScriptedSession::status(500, "text/plain"),
        ScriptedSession::status(500, "text/plain"),
        ScriptedSession::status(500, "text/plain"),
    ]);
    let sheet = SheetReference::parse("https://docs.google.com/spreadsheets/d/XYZ").unwrap();

    let err = retrieve(&session, &sheet, EXPORT_LADDER, &CaptureConfig::default()).unwrap_err();

    assert!(matches!(err, JobCardError::ExportFailure { status: 500, .. }));
    assert_eq!(session.request_count(), 3);
}

// ── Async wrapper ────────────────────────────────────────────────────────────

#[tokio::test]
async fn async_capture_rejects_bad_url_without_requests() {
    let root = tempfile::tempdir().unwrap();
    let session = Arc::new(ScriptedSession::new(Vec::new()));

    let err = capture(
        "https://example.com/spreadsheet",
        session.clone(),
        root.path(),
        &CaptureConfig::default(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, JobCardError::InvalidReference { .. }));
    assert_eq!(err.category(), ErrorCategory::Input);
    assert_eq!(session.request_count(), 0);
}

#[tokio::test]
async fn async_capture_surfaces_export_errors() {
    let root = tempfile::tempdir().unwrap();
    let session = Arc::new(ScriptedSession::new(vec![ScriptedSession::status(
        403,
        "text/plain",
    )]));

    let err = capture(
        "https://docs.google.com/spreadsheets/d/XYZ/edit",
        session,
        root.path().join("out"),
        &CaptureConfig::default(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, JobCardError::ExportFailure { status: 403, .. }));
}

#[test]
fn callbacks_are_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<EventLog>();
    assert_send_sync::<ScriptedSession>();
    assert_send_sync::<CaptureConfig>();
}
