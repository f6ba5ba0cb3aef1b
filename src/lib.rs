//! Cloud cover estimation for ground-based sky images.
//!
//! Each 64x64 sky image is compared against the clear-sky reference whose sun
//! position is closest to the sun position at the image's timestamp. Pixels
//! whose normalized red-blue ratio departs from the reference are cloud; the
//! resulting coarse cover then selects the rule that produces the final mask.
//!
//! ```no_run
//! use skycover::prelude::*;
//! # fn run(time: chrono::NaiveDateTime, bytes: &[u8], library: &ClearSkyLibrary) -> Result<(), skycover::error::Error> {
//! let image = SkyImage::from_bytes(64, 64, bytes)?;
//! let detection = cloud_detection(time, &image, library);
//! println!("cloud cover {:.3}", detection.cloud_fraction());
//! # Ok(())
//! # }
//! ```

#[allow(missing_docs)]
pub mod error;

pub mod config;
pub mod detection;
pub mod frame;
pub mod image;
pub mod library;
#[cfg(feature = "loader")]
pub mod loader;
pub mod site;
pub mod solar;
pub mod time;

pub mod prelude {
    pub use crate::{
        config::DetectorConfig,
        detection::{CloudDetector, Detection, Thresholds, Tier, cloud_detection},
        frame::{Mask, PixelCoordinate, SunCenter},
        image::SkyImage,
        library::{ClearSkyEntry, ClearSkyLibrary},
        site::Site,
        solar::{SolarAngles, SunPosition, solar_angle, sun_position},
    };
}
