use crate::{error::Error, frame::SunCenter, image::SkyImage};
use chrono::NaiveDateTime;

/// Largest absolute row or column accepted for a reference sun center.
///
/// Squared distances between centers in this range fit comfortably in `i64`.
pub const MAX_SUN_CENTER_OFFSET: i64 = 1 << 20;

/// One cloud-free reference image and where the sun was in it.
#[derive(Clone, Debug, PartialEq)]
pub struct ClearSkyEntry {
    time: NaiveDateTime,
    image: SkyImage,
    sun_center: SunCenter,
}

impl ClearSkyEntry {
    pub fn new(time: NaiveDateTime, image: SkyImage, sun_center: SunCenter) -> Self {
        Self {
            time,
            image,
            sun_center,
        }
    }

    pub fn time(&self) -> NaiveDateTime {
        self.time
    }

    pub fn image(&self) -> &SkyImage {
        &self.image
    }

    pub fn sun_center(&self) -> SunCenter {
        self.sun_center
    }
}

/// A read-only collection of clear-sky reference images.
///
/// Always holds at least one entry, so a closest match always exists.
#[derive(Clone, Debug, PartialEq)]
pub struct ClearSkyLibrary {
    entries: Vec<ClearSkyEntry>,
}

impl ClearSkyLibrary {
    /// Returns an error if `entries` is empty or a sun center lies more than
    /// [`MAX_SUN_CENTER_OFFSET`] pixels from the frame corner along either axis.
    pub fn new(entries: Vec<ClearSkyEntry>) -> Result<Self, Error> {
        if entries.is_empty() {
            return Err(Error::EmptyLibrary);
        }

        let out_of_range = entries.iter().enumerate().find(|(_, entry)| {
            entry.sun_center.row().unsigned_abs() > MAX_SUN_CENTER_OFFSET as u64
                || entry.sun_center.col().unsigned_abs() > MAX_SUN_CENTER_OFFSET as u64
        });
        if let Some((index, entry)) = out_of_range {
            return Err(Error::SunCenterOutOfRange {
                index,
                row: entry.sun_center.row(),
                col: entry.sun_center.col(),
                limit: MAX_SUN_CENTER_OFFSET,
            });
        }

        Ok(Self { entries })
    }

    /// Builds a library from three parallel columns where index `i` of each
    /// column describes the same reference image.
    pub fn from_columns(
        times: Vec<NaiveDateTime>,
        images: Vec<SkyImage>,
        sun_centers: Vec<SunCenter>,
    ) -> Result<Self, Error> {
        if times.len() != images.len() || times.len() != sun_centers.len() {
            return Err(Error::MismatchedLibrary {
                times: times.len(),
                images: images.len(),
                sun_centers: sun_centers.len(),
            });
        }

        Self::new(
            times
                .into_iter()
                .zip(images)
                .zip(sun_centers)
                .map(|((time, image), sun_center)| ClearSkyEntry::new(time, image, sun_center))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[ClearSkyEntry] {
        self.entries.as_slice()
    }

    /// Returns the index of the entry whose sun center is nearest `sun`.
    ///
    /// Ties go to the earliest entry.
    pub fn closest_index(&self, sun: SunCenter) -> usize {
        let mut best = 0;
        let mut best_distance = self.entries[0].sun_center.distance(&sun);
        for (index, entry) in self.entries.iter().enumerate().skip(1) {
            let distance = entry.sun_center.distance(&sun);
            if distance < best_distance {
                best = index;
                best_distance = distance;
            }
        }

        log::trace!("matched clear-sky entry {best} at distance {best_distance:.3}");
        best
    }

    /// Returns the entry whose sun center is nearest `sun`.
    pub fn closest(&self, sun: SunCenter) -> &ClearSkyEntry {
        &self.entries[self.closest_index(sun)]
    }
}
