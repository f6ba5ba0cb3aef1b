use crate::{error::Error, time::TimeCorrection};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use uom::si::{angle::degree, f64::Angle};

/// Location of the sky camera and the civil time it reports.
///
/// All angles are stored in degrees, west longitudes are negative.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Site {
    latitude: f64,
    longitude: f64,

    /// Central meridian of the time zone the camera clock runs on.
    meridian: f64,

    /// Whether camera timestamps follow US daylight saving time.
    #[cfg_attr(feature = "serde", serde(default = "default_daylight_saving"))]
    daylight_saving: bool,
}

#[cfg(feature = "serde")]
fn default_daylight_saving() -> bool {
    true
}

impl Site {
    /// Creates a new `Site` observing daylight saving time.
    ///
    /// Returns an error if `latitude` is not between -90 and 90 or if either
    /// longitude is not between -180 and 180.
    pub fn new(latitude: f64, longitude: f64, meridian: f64) -> Result<Self, Error> {
        Self {
            latitude,
            longitude,
            meridian,
            daylight_saving: true,
        }
        .validate()
    }

    /// The sky imager on the Stanford campus, on Pacific time.
    pub fn stanford() -> Self {
        Self {
            latitude: 37.424107,
            longitude: -122.174199,
            meridian: -120.0,
            daylight_saving: true,
        }
    }

    pub fn with_daylight_saving(mut self, daylight_saving: bool) -> Self {
        self.daylight_saving = daylight_saving;
        self
    }

    /// Checks the ranges of a `Site` that did not come through [`Site::new`],
    /// e.g. one read from a config file.
    pub fn validate(self) -> Result<Self, Error> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(Error::InvalidLatitude(self.latitude));
        }

        for longitude in [self.longitude, self.meridian] {
            if !(-180.0..=180.0).contains(&longitude) {
                return Err(Error::InvalidLongitude(longitude));
            }
        }

        Ok(self)
    }

    pub fn latitude(&self) -> Angle {
        Angle::new::<degree>(self.latitude)
    }

    pub fn longitude(&self) -> Angle {
        Angle::new::<degree>(self.longitude)
    }

    pub fn meridian(&self) -> Angle {
        Angle::new::<degree>(self.meridian)
    }

    pub fn daylight_saving(&self) -> bool {
        self.daylight_saving
    }

    /// Offset between the site's local solar time and the time zone's clock.
    pub fn time_correction(&self) -> TimeCorrection {
        TimeCorrection::from_longitudes(self.longitude, self.meridian)
    }
}

impl Default for Site {
    fn default() -> Self {
        Self::stanford()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(91.0, 0.0, 0.0)]
    #[case(-90.5, 0.0, 0.0)]
    #[case(0.0, 181.0, 0.0)]
    #[case(0.0, 0.0, -200.0)]
    #[case(f64::NAN, 0.0, 0.0)]
    fn invalid_site(#[case] latitude: f64, #[case] longitude: f64, #[case] meridian: f64) {
        assert!(Site::new(latitude, longitude, meridian).is_err());
    }

    #[test]
    fn default_is_stanford() {
        let site = Site::default();
        assert_eq!(site, Site::new(37.424107, -122.174199, -120.0).unwrap());
        assert!(site.daylight_saving());
        assert_eq!(site.latitude().get::<degree>(), 37.424107);
    }
}
