use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("expected a 64x64 RGB image but got {width}x{height} with {len} bytes")]
    InvalidShape { width: usize, height: usize, len: usize },
    #[error("clear-sky library has no entries")]
    EmptyLibrary,
    #[error(
        "clear-sky library columns differ in length: {times} times, {images} images, {sun_centers} sun centers"
    )]
    MismatchedLibrary {
        times: usize,
        images: usize,
        sun_centers: usize,
    },
    #[error("clear-sky entry {index} has sun center ({row}, {col}) outside [-{limit}, {limit}]")]
    SunCenterOutOfRange {
        index: usize,
        row: i64,
        col: i64,
        limit: i64,
    },
    #[error("expected latitude in range [-90, 90] but got: {0}")]
    InvalidLatitude(f64),
    #[error("expected longitude in range [-180, 180] but got: {0}")]
    InvalidLongitude(f64),
    #[cfg(feature = "loader")]
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[cfg(feature = "loader")]
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[cfg(feature = "loader")]
    #[error(transparent)]
    Image(#[from] ::image::ImageError),
}
