//! Reading a clear-sky library from disk.
//!
//! A library directory holds a `manifest.json` with three parallel columns and
//! one image file per entry:
//!
//! ```json
//! {
//!   "times": ["2019-06-13T12:00:00"],
//!   "sun_centers": [[32, 24]],
//!   "images": ["0000.png"]
//! }
//! ```
//!
//! Image paths are relative to the directory.

use crate::{
    detection::{CloudDetector, Detection},
    error::Error,
    frame::{FRAME_SIZE, SunCenter},
    image::SkyImage,
    library::ClearSkyLibrary,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Mutex, OnceLock},
};

/// Name of the manifest file inside a library directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Environment variable overriding [`DEFAULT_LIBRARY_DIR`].
pub const LIBRARY_DIR_VAR: &str = "SKYCOVER_LIBRARY_DIR";

pub const DEFAULT_LIBRARY_DIR: &str = "data/clear_sky_library";

static SHARED: OnceLock<ClearSkyLibrary> = OnceLock::new();
static SHARED_INIT: Mutex<()> = Mutex::new(());

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub times: Vec<NaiveDateTime>,
    pub sun_centers: Vec<(i64, i64)>,
    pub images: Vec<PathBuf>,
}

/// Loads the library stored in `dir`.
pub fn load_library(dir: impl AsRef<Path>) -> Result<ClearSkyLibrary, Error> {
    let dir = dir.as_ref();
    let manifest: Manifest = serde_json::from_slice(&fs::read(dir.join(MANIFEST_FILE))?)?;

    let images = manifest
        .images
        .iter()
        .map(|path| load_image(dir.join(path)))
        .collect::<Result<Vec<_>, _>>()?;

    let library = ClearSkyLibrary::from_columns(
        manifest.times,
        images,
        manifest
            .sun_centers
            .into_iter()
            .map(SunCenter::from)
            .collect(),
    )?;

    log::info!(
        "loaded {} clear-sky entries from {}",
        library.len(),
        dir.display()
    );
    Ok(library)
}

/// Decodes an image file into a [`SkyImage`].
pub fn load_image(path: impl AsRef<Path>) -> Result<SkyImage, Error> {
    let rgb = ::image::open(path)?.into_rgb8();
    let (width, height) = rgb.dimensions();
    SkyImage::from_bytes(width as usize, height as usize, rgb.as_raw())
}

/// Writes `library` into `dir` as a manifest plus one PNG per entry.
pub fn save_library(library: &ClearSkyLibrary, dir: impl AsRef<Path>) -> Result<(), Error> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let mut manifest = Manifest {
        times: Vec::with_capacity(library.len()),
        sun_centers: Vec::with_capacity(library.len()),
        images: Vec::with_capacity(library.len()),
    };

    for (index, entry) in library.entries().iter().enumerate() {
        let name = PathBuf::from(format!("{index:04}.png"));
        ::image::save_buffer(
            dir.join(&name),
            &entry.image().to_bytes(),
            FRAME_SIZE as u32,
            FRAME_SIZE as u32,
            ::image::ExtendedColorType::Rgb8,
        )?;

        manifest.times.push(entry.time());
        manifest
            .sun_centers
            .push((entry.sun_center().row(), entry.sun_center().col()));
        manifest.images.push(name);
    }

    fs::write(
        dir.join(MANIFEST_FILE),
        serde_json::to_vec_pretty(&manifest)?,
    )?;
    Ok(())
}

/// Directory of the shared library, from [`LIBRARY_DIR_VAR`] if set.
pub fn default_library_dir() -> PathBuf {
    std::env::var_os(LIBRARY_DIR_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LIBRARY_DIR))
}

/// Returns the process-wide library, loading it from
/// [`default_library_dir`] on first use.
///
/// A successful load happens at most once. A failed load is reported and
/// retried on the next call.
pub fn shared_library() -> Result<&'static ClearSkyLibrary, Error> {
    if let Some(library) = SHARED.get() {
        return Ok(library);
    }

    let _guard = SHARED_INIT
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(library) = SHARED.get() {
        return Ok(library);
    }

    let library = load_library(default_library_dir())?;
    Ok(SHARED.get_or_init(|| library))
}

/// Classifies `image` with the default detector against the shared library.
pub fn cloud_detection_shared(time: NaiveDateTime, image: &SkyImage) -> Result<Detection, Error> {
    Ok(CloudDetector::default().detect(time, image, shared_library()?))
}
