use crate::{
    frame::{Channel, FRAME_ORIGIN, FRAME_RADIUS, Mask, NORTH_OFFSET_DEG, SunCenter},
    site::Site,
    time::SolarClock,
};
use chrono::NaiveDateTime;
use std::f64::consts::PI;
use uom::si::{
    angle::{degree, radian},
    f64::Angle,
};

/// Radius in pixels of the disk marked by a sun mask.
pub const SUN_MASK_RADIUS: i64 = 2;

const SECONDS_PER_DAY: f64 = 86400.0;
const AXIAL_TILT_DEG: f64 = 23.44;

/// Position of the sun's center seen by an observer on the ground.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolarAngles {
    /// Measured clockwise from north.
    azimuth: Angle,

    /// Measured between the zenith and the sun's center.
    zenith: Angle,
}

impl SolarAngles {
    pub fn azimuth(&self) -> Angle {
        self.azimuth
    }

    pub fn zenith(&self) -> Angle {
        self.zenith
    }
}

/// Computes the solar azimuth and zenith angle at `site` for a camera
/// timestamp `time`.
///
/// The hour angle and declination are the simple textbook forms:
/// ```text
/// alpha = 2 pi (t - 43200) / 86400
/// delta = 23.44 sin(360 / 365.25 (doy - 80))
/// cos(chi) = sin(delta) sin(phi) + cos(delta) cos(phi) cos(alpha)
/// tan(xi) = sin(alpha) / (sin(phi) cos(alpha) - cos(phi) tan(delta))
/// ```
pub fn solar_angle(time: NaiveDateTime, site: &Site) -> SolarAngles {
    let clock = SolarClock::new(time, site);
    let latitude = site.latitude().get::<radian>();

    let hour_angle = 2. * PI * (clock.time_of_day() as f64 - SECONDS_PER_DAY / 2.) / SECONDS_PER_DAY;
    let declination = (AXIAL_TILT_DEG
        * ((360. / 365.25) * (clock.day_of_year() as f64 - 80.))
            .to_radians()
            .sin())
    .to_radians();

    let zenith = zenith_angle(latitude, declination, hour_angle);
    let tan_azimuth = hour_angle.sin()
        / (latitude.sin() * hour_angle.cos() - latitude.cos() * declination.tan());

    SolarAngles {
        azimuth: Angle::new::<radian>(resolve_azimuth(hour_angle, tan_azimuth)),
        zenith: Angle::new::<radian>(zenith),
    }
}

/// Solar zenith in radians.
///
/// Rounding can push the cosine just past one when the sun is overhead.
fn zenith_angle(latitude: f64, declination: f64, hour_angle: f64) -> f64 {
    (declination.sin() * latitude.sin() + declination.cos() * latitude.cos() * hour_angle.cos())
        .clamp(-1., 1.)
        .acos()
}

/// Picks the azimuth branch of `atan(tan_azimuth)` from the signs of the hour
/// angle and the tangent.
fn resolve_azimuth(hour_angle: f64, tan_azimuth: f64) -> f64 {
    let base = tan_azimuth.atan();
    if hour_angle > 0. && tan_azimuth > 0. {
        PI + base
    } else if hour_angle > 0. && tan_azimuth < 0. {
        2. * PI + base
    } else if hour_angle < 0. && tan_azimuth > 0. {
        base
    } else {
        PI + base
    }
}

/// Where the sun lands in the sky frame.
#[derive(Clone, Debug, PartialEq)]
pub struct SunPosition {
    center: SunCenter,
    mask: Mask,
}

impl SunPosition {
    /// Creates a `SunPosition` marking the disk of radius [`SUN_MASK_RADIUS`]
    /// around `center`.
    pub fn from_center(center: SunCenter) -> Self {
        Self {
            center,
            mask: Mask::disk(center, SUN_MASK_RADIUS),
        }
    }

    pub fn center(&self) -> SunCenter {
        self.center
    }

    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    /// The sun mask as RGB bytes with the disk in the red channel.
    pub fn mask_bytes(&self) -> Vec<u8> {
        self.mask.rgb_bytes(Channel::Red)
    }
}

/// Projects the sun at `time` into the sky frame.
///
/// The zenith angle maps linearly onto the distance from the frame origin,
/// reaching the frame radius at the horizon. The azimuth is rotated by the
/// offset between sky-frame north and geographic north.
pub fn sun_position(time: NaiveDateTime, site: &Site) -> SunPosition {
    let angles = solar_angle(time, site);
    let rho = angles.zenith().get::<degree>() / 90. * FRAME_RADIUS as f64;
    let theta = (angles.azimuth().get::<degree>() - NORTH_OFFSET_DEG + 90.).to_radians();

    let row = FRAME_ORIGIN.row() as f64 - rho * theta.sin();
    let col = FRAME_ORIGIN.col() as f64 + rho * theta.cos();

    SunPosition::from_center(SunCenter::new(
        row.round_ties_even() as i64,
        col.round_ties_even() as i64,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
    use quickcheck::quickcheck;
    use rstest::rstest;

    fn at(month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2019, month, day)
            .and_then(|date| date.and_hms_opt(hour, minute, 0))
            .expect("valid timestamp")
    }

    #[rstest]
    #[case(1.0, 1.0, PI + 1f64.atan())]
    #[case(1.0, -1.0, 2. * PI - 1f64.atan())]
    #[case(-1.0, 1.0, 1f64.atan())]
    #[case(-1.0, -1.0, PI - 1f64.atan())]
    #[case(-1.0, 0.0, PI)]
    #[case(0.0, 0.0, PI)]
    fn azimuth_quadrants(#[case] hour_angle: f64, #[case] tan: f64, #[case] expected: f64) {
        assert_abs_diff_eq!(resolve_azimuth(hour_angle, tan), expected, epsilon = 1e-12);
    }

    #[test]
    fn overhead_sun_has_zero_zenith() {
        // sin^2 + cos^2 exceeds one for some of these latitudes.
        for step in 0..=2344 {
            let latitude = (step as f64 / 100.).to_radians();
            let zenith = zenith_angle(latitude, latitude, 0.);
            assert!(zenith.is_finite(), "NaN zenith at step {step}");
            assert_abs_diff_eq!(zenith, 0., epsilon = 1e-7);
        }
        assert_abs_diff_eq!(zenith_angle(0.5, 0.5 + PI, 0.), PI, epsilon = 1e-7);
    }

    #[rstest]
    #[case(at(6, 13, 9, 30), 90.71250820326553, 48.557533573193574)]
    #[case(at(6, 13, 12, 0), 129.03298488847082, 20.437176865260756)]
    #[case(at(1, 15, 12, 0), 177.6252467700597, 58.539337860678565)]
    #[case(at(12, 21, 14, 0), 207.90053159583854, 66.25480957643272)]
    fn stanford_angles(#[case] time: NaiveDateTime, #[case] azimuth: f64, #[case] zenith: f64) {
        let angles = solar_angle(time, &Site::stanford());
        assert_abs_diff_eq!(angles.azimuth().get::<degree>(), azimuth, epsilon = 1e-9);
        assert_abs_diff_eq!(angles.zenith().get::<degree>(), zenith, epsilon = 1e-9);
    }

    /// Near the solstice the equation of time is small, so the approximate
    /// formulas should agree closely with the full solar position algorithm.
    #[rstest]
    #[case(at(6, 13, 9, 30))]
    #[case(at(6, 13, 15, 45))]
    fn agrees_with_spa(#[case] local: NaiveDateTime) {
        let site = Site::stanford();
        // Pacific daylight time.
        let utc: DateTime<Utc> = (local + TimeDelta::hours(7)).and_utc();
        let reference = spa::solar_position::<spa::StdFloatOps>(
            utc,
            site.latitude().get::<degree>(),
            site.longitude().get::<degree>(),
        )
        .unwrap();

        let angles = solar_angle(local, &site);
        assert_abs_diff_eq!(
            angles.azimuth().get::<degree>(),
            reference.azimuth,
            epsilon = 0.5
        );
        assert_abs_diff_eq!(
            angles.zenith().get::<degree>(),
            reference.zenith_angle,
            epsilon = 0.5
        );
    }

    #[test]
    fn sun_track_over_a_summer_day() {
        let site = Site::stanford();
        let track = [(7, 0), (9, 30), (12, 0), (13, 15), (18, 0), (23, 0)]
            .into_iter()
            .map(|(hour, minute)| {
                let center = sun_position(at(6, 13, hour, minute), &site).center();
                format!("{hour:02}:{minute:02} row={} col={}", center.row(), center.col())
            })
            .collect::<Vec<_>>()
            .join("\n");

        insta::assert_snapshot!(track, @r"
        07:00 row=15 col=9
        09:30 row=25 col=15
        12:00 row=32 col=24
        13:15 row=34 col=29
        18:00 row=31 col=50
        23:00 row=4 col=56
        ");
    }

    #[test]
    fn sun_mask_marks_disk() {
        let position = sun_position(at(6, 13, 12, 0), &Site::stanford());
        assert_eq!(position.center(), SunCenter::new(32, 24));
        assert_eq!(position.mask().count(), 13);

        let bytes = position.mask_bytes();
        let red = (32 * 64 + 24) * 3;
        assert_eq!(&bytes[red..red + 3], &[255, 0, 0]);
    }

    quickcheck! {
        fn sun_mask_never_leaves_frame(day: u16, minute: u16) -> bool {
            let time = NaiveDate::from_yo_opt(2019, u32::from(day % 365) + 1)
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .expect("valid day of year")
                + TimeDelta::minutes(i64::from(minute % 1440));
            let position = sun_position(time, &Site::stanford());
            let center = position.center();

            position.mask().count() <= 13
                && position
                    .mask()
                    .marked()
                    .all(|px| SunCenter::from(px).distance_squared(&center) <= 4)
        }
    }
}
