//! Cloud detection against a clear-sky library.
//!
//! A single global threshold on the NRBR difference misclassifies scenes whose
//! ratio range shifts with cloud cover, so detection runs in two passes: a
//! coarse difference threshold estimates cover, and the estimate picks the rule
//! that produces the final mask.

use crate::{
    config::DetectorConfig,
    frame::{Channel, FIELD_OF_VIEW_AREA, Mask, PixelCoordinate, SunCenter, field_of_view},
    image::SkyImage,
    library::ClearSkyLibrary,
    solar::{SunPosition, sun_position},
};
use chrono::NaiveDateTime;
use rayon::prelude::*;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Threshold parameters for the classification passes.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Thresholds {
    /// Minimum NRBR difference from the clear-sky reference marking cloud in
    /// the coarse pass.
    pub difference: f64,

    /// Coarse cover at which the partial cover rule takes over.
    pub partial_cover: f64,

    /// Coarse cover at which the overcast rule takes over.
    pub overcast_cover: f64,

    /// Maximum NRBR of a cloud pixel under the partial and overcast rules.
    pub ratio: f64,

    /// Radius in pixels around the sun ignored by the partial cover rule.
    pub sun_exclusion_radius: i64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            difference: 0.175,
            partial_cover: 0.045,
            overcast_cover: 0.35,
            ratio: 0.05,
            sun_exclusion_radius: 7,
        }
    }
}

/// The rule that produced a cloud mask.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Tier {
    /// Light cover. The coarse difference mask is final.
    Coarse,

    /// Partial cover. Pixels with a low NRBR are cloud, except around the sun
    /// where glare pulls the ratio down.
    Partial,

    /// Heavy cover. Every pixel with a low NRBR is cloud.
    Overcast,
}

impl Tier {
    /// Picks the rule for a coarse cloud fraction.
    pub fn select(coarse_fraction: f64, thresholds: &Thresholds) -> Self {
        if coarse_fraction >= thresholds.overcast_cover {
            Tier::Overcast
        } else if coarse_fraction >= thresholds.partial_cover {
            Tier::Partial
        } else {
            Tier::Coarse
        }
    }
}

/// Fraction of the field of view marked in `mask`.
///
/// Zero when no field of view pixel is marked.
pub fn cloud_fraction(mask: &Mask) -> f64 {
    match mask.count_within(field_of_view()) {
        0 => 0.0,
        count => count as f64 / FIELD_OF_VIEW_AREA as f64,
    }
}

/// Returns true if `pixel` is at least `radius` away from the sun.
fn outside_glare(pixel: PixelCoordinate, sun: SunCenter, radius: i64) -> bool {
    SunCenter::from(pixel).distance_squared(&sun) >= radius.pow(2)
}

/// Result of classifying one sky image.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    cloud_fraction: f64,
    coarse_fraction: f64,
    tier: Tier,
    cloud_mask: Mask,
    sun: SunPosition,
}

impl Detection {
    /// Fraction of the field of view covered by cloud, on the range 0 to 1.
    pub fn cloud_fraction(&self) -> f64 {
        self.cloud_fraction
    }

    /// Cloud fraction estimated by the coarse pass alone.
    pub fn coarse_fraction(&self) -> f64 {
        self.coarse_fraction
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn cloud_mask(&self) -> &Mask {
        &self.cloud_mask
    }

    pub fn sun(&self) -> &SunPosition {
        &self.sun
    }

    /// The cloud mask as RGB bytes with cloud in the green channel.
    pub fn cloud_mask_bytes(&self) -> Vec<u8> {
        self.cloud_mask.rgb_bytes(Channel::Green)
    }

    /// The sun mask as RGB bytes with the sun disk in the red channel.
    pub fn sun_mask_bytes(&self) -> Vec<u8> {
        self.sun.mask_bytes()
    }
}

/// Classifies sky images as cloud or clear using a clear-sky library.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CloudDetector {
    config: DetectorConfig,
}

impl CloudDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Classifies `image` taken at `time` against the closest reference in
    /// `library`.
    pub fn detect(
        &self,
        time: NaiveDateTime,
        image: &SkyImage,
        library: &ClearSkyLibrary,
    ) -> Detection {
        let thresholds = &self.config.thresholds;
        let fov = field_of_view();
        let sun = sun_position(time, &self.config.site);
        let reference = library.closest(sun.center());

        let nrbr = image.nrbr();
        let difference = nrbr.abs_diff(&reference.image().nrbr());

        let coarse_mask =
            Mask::from_fn(|px| fov.get(px) && difference.get(px) >= thresholds.difference);
        let coarse_fraction = cloud_fraction(&coarse_mask);

        let tier = Tier::select(coarse_fraction, thresholds);
        log::debug!("coarse cloud fraction {coarse_fraction:.4} selects {tier:?}");

        let cloud_mask = match tier {
            Tier::Coarse => coarse_mask,
            Tier::Partial => Mask::from_fn(|px| {
                fov.get(px)
                    && outside_glare(px, sun.center(), thresholds.sun_exclusion_radius)
                    && nrbr.get(px) <= thresholds.ratio
            }),
            Tier::Overcast => Mask::from_fn(|px| fov.get(px) && nrbr.get(px) <= thresholds.ratio),
        };

        Detection {
            cloud_fraction: cloud_fraction(&cloud_mask),
            coarse_fraction,
            tier,
            cloud_mask,
            sun,
        }
    }

    /// Classifies a batch of timestamped images in parallel.
    ///
    /// Results are in the same order as `frames`.
    pub fn par_detect(
        &self,
        frames: &[(NaiveDateTime, SkyImage)],
        library: &ClearSkyLibrary,
    ) -> Vec<Detection> {
        frames
            .par_iter()
            .map(|(time, image)| self.detect(*time, image, library))
            .collect()
    }
}

/// Classifies `image` taken at `time` with the default site and thresholds.
pub fn cloud_detection(
    time: NaiveDateTime,
    image: &SkyImage,
    library: &ClearSkyLibrary,
) -> Detection {
    CloudDetector::default().detect(time, image, library)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, Tier::Coarse)]
    #[case(0.0449, Tier::Coarse)]
    #[case(0.045, Tier::Partial)]
    #[case(0.3499, Tier::Partial)]
    #[case(0.35, Tier::Overcast)]
    #[case(1.0, Tier::Overcast)]
    #[case(f64::NAN, Tier::Coarse)]
    fn tier_bands(#[case] fraction: f64, #[case] tier: Tier) {
        assert_eq!(Tier::select(fraction, &Thresholds::default()), tier);
    }

    #[test]
    fn empty_mask_has_zero_fraction() {
        assert_eq!(cloud_fraction(&Mask::empty()), 0.0);
    }

    #[test]
    fn fraction_ignores_pixels_outside_field_of_view() {
        let corner = Mask::from_fn(|px| px.row() > 60 && px.col() > 60);
        assert_eq!(cloud_fraction(&corner), 0.0);

        let full = Mask::from_fn(|_| true);
        assert_eq!(cloud_fraction(&full), 2629.0 / 2642.0);
    }

    #[rstest]
    #[case(32, 31, true)]
    #[case(32, 30, false)]
    #[case(37, 28, false)]
    #[case(39, 24, true)]
    #[case(0, 0, true)]
    fn glare_boundary(#[case] row: usize, #[case] col: usize, #[case] outside: bool) {
        let sun = SunCenter::new(32, 24);
        assert_eq!(outside_glare(PixelCoordinate::new(row, col), sun, 7), outside);
    }
}
