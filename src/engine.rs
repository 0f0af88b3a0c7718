//! pdfium binding.
//!
//! `pdfium-render` is only a binding layer; the pdfium shared library itself
//! has to be found at runtime. Lookup order:
//!
//! 1. `PDFIUM_LIB_PATH`: a library file, or a directory containing the
//!    platform library (`libpdfium.so`, `libpdfium.dylib`, `pdfium.dll`).
//! 2. The current working directory.
//! 3. The system library search path.
//!
//! pdfium keeps library state per process: every `Pdfium` initialises it and
//! tears it down again on drop. [`with_pdfium`] therefore holds a
//! process-wide lock from bind to drop, so overlapping runs render one after
//! the other instead of destroying the library under each other.

use crate::error::JobCardError;
use pdfium_render::prelude::*;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::debug;

/// Environment variable naming an explicit pdfium library or directory.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Held for the whole lifetime of every bound `Pdfium`.
static PDFIUM_LOCK: Mutex<()> = Mutex::new(());

/// Bind pdfium and run `f` with it while no other run holds the library.
///
/// The binding is dropped before the lock is released.
pub fn with_pdfium<T>(
    f: impl FnOnce(&Pdfium) -> Result<T, JobCardError>,
) -> Result<T, JobCardError> {
    // A panic in another run leaves no state behind the guard.
    let _guard = PDFIUM_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let pdfium = bind_pdfium()?;
    let result = f(&pdfium);
    drop(pdfium);
    result
}

/// Bind to a pdfium library, trying each location in turn.
///
/// Only called under [`PDFIUM_LOCK`] by [`with_pdfium`].
fn bind_pdfium() -> Result<Pdfium, JobCardError> {
    if let Ok(value) = std::env::var(PDFIUM_LIB_PATH_ENV) {
        if !value.is_empty() {
            let path = PathBuf::from(&value);
            let lib = if path.is_dir() {
                Pdfium::pdfium_platform_library_name_at_path(&path)
            } else {
                path
            };
            debug!("Binding pdfium from {}", lib.display());
            return Pdfium::bind_to_library(&lib)
                .map(Pdfium::new)
                .map_err(|e| {
                    JobCardError::PdfiumBindingFailed(format!(
                        "{PDFIUM_LIB_PATH_ENV}='{}': {e:?}",
                        lib.display()
                    ))
                });
        }
    }

    Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| Pdfium::bind_to_system_library())
        .map(Pdfium::new)
        .map_err(|e| JobCardError::PdfiumBindingFailed(format!("{e:?}")))
}
