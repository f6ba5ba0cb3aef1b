//! Calendar arithmetic turning a camera timestamp into the day of year and
//! solar time of day used by the solar angle formulas.

use crate::site::Site;
use chrono::{Datelike, NaiveDate, NaiveDateTime, TimeDelta, Timelike, Weekday};
use std::ops::Range;

const SECONDS_PER_HOUR: i64 = 3600;

/// Offset between a site's local time and the clock of its time zone meridian.
///
/// The earth turns one degree every four minutes, so a site west of its
/// meridian sees the sun late by `4 * |longitude - meridian|` minutes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeCorrection {
    minutes: i64,
    seconds: i64,
}

impl TimeCorrection {
    pub fn from_longitudes(longitude: f64, meridian: f64) -> Self {
        let offset = (60.0 / 15.0 * (longitude - meridian)).abs();
        let minutes = offset.trunc();
        let seconds = ((offset - minutes) * 60.0).trunc();

        Self {
            minutes: minutes as i64,
            seconds: seconds as i64,
        }
    }

    pub fn minutes(&self) -> i64 {
        self.minutes
    }

    pub fn seconds(&self) -> i64 {
        self.seconds
    }

    pub fn as_delta(&self) -> TimeDelta {
        TimeDelta::minutes(self.minutes) + TimeDelta::seconds(self.seconds)
    }
}

/// Day of year and corrected time of day for one timestamp.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SolarClock {
    /// Gregorian day of year starting at 1.
    day_of_year: u32,

    /// Seconds since local midnight after the longitude and daylight saving
    /// corrections. Negative within the first minutes of a day.
    time_of_day: i64,
}

impl SolarClock {
    /// Builds the clock for `time` taken at `site`.
    ///
    /// The seconds of `time` are dropped before the longitude correction is
    /// applied. The date itself is never shifted, even when the correction
    /// borrows across midnight.
    ///
    /// NOTE: The daylight saving adjustment is decided per day, so it is wrong
    /// during the first hour of each transition day.
    pub fn new(time: NaiveDateTime, site: &Site) -> Self {
        let day_of_year = time.ordinal();
        let mut time_of_day = i64::from(time.hour()) * SECONDS_PER_HOUR
            + i64::from(time.minute()) * 60
            - site.time_correction().as_delta().num_seconds();

        if site.daylight_saving()
            && daylight_saving_window(time.year())
                .is_some_and(|window| window.contains(&day_of_year))
        {
            time_of_day -= SECONDS_PER_HOUR;
        }

        Self {
            day_of_year,
            time_of_day,
        }
    }

    pub fn day_of_year(&self) -> u32 {
        self.day_of_year
    }

    pub fn time_of_day(&self) -> i64 {
        self.time_of_day
    }
}

/// Returns the days of `year` on which clocks run on daylight saving time,
/// from the second Sunday of March up to but excluding the first Sunday of
/// November.
pub fn daylight_saving_window(year: i32) -> Option<Range<u32>> {
    let start = NaiveDate::from_weekday_of_month_opt(year, 3, Weekday::Sun, 2)?;
    let end = NaiveDate::from_weekday_of_month_opt(year, 11, Weekday::Sun, 1)?;
    Some(start.ordinal()..end.ordinal())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(hour, minute, 0))
            .expect("valid timestamp")
    }

    #[test]
    fn stanford_correction() {
        let correction = Site::stanford().time_correction();
        assert_eq!(correction.minutes(), 8);
        assert_eq!(correction.seconds(), 41);
        assert_eq!(correction.as_delta().num_seconds(), 521);
    }

    #[test]
    fn correction_ignores_direction() {
        assert_eq!(
            TimeCorrection::from_longitudes(-118.0, -120.0),
            TimeCorrection::from_longitudes(-122.0, -120.0)
        );
    }

    #[rstest]
    #[case(2019, 3, 1, 60)]
    #[case(2020, 3, 1, 61)]
    #[case(1900, 3, 1, 60)]
    #[case(2000, 3, 1, 61)]
    #[case(2019, 12, 31, 365)]
    #[case(2020, 12, 31, 366)]
    #[case(2019, 1, 1, 1)]
    fn gregorian_day_of_year(
        #[case] year: i32,
        #[case] month: u32,
        #[case] day: u32,
        #[case] expected: u32,
    ) {
        let clock = SolarClock::new(at(year, month, day, 12, 0), &Site::stanford());
        assert_eq!(clock.day_of_year(), expected);
    }

    #[rstest]
    #[case(2019, 69, 307)]
    #[case(2020, 68, 306)]
    #[case(2024, 70, 308)]
    fn window_bounds(#[case] year: i32, #[case] start: u32, #[case] end: u32) {
        assert_eq!(daylight_saving_window(year), Some(start..end));
    }

    #[rstest]
    // Second Sunday of March against the Saturday before.
    #[case(at(2019, 3, 10, 0, 0), at(2019, 3, 9, 0, 0))]
    #[case(at(2024, 3, 10, 0, 0), at(2024, 3, 9, 0, 0))]
    // Saturday before the first Sunday of November against that Sunday.
    #[case(at(2019, 11, 2, 0, 0), at(2019, 11, 3, 0, 0))]
    #[case(at(2020, 10, 31, 0, 0), at(2020, 11, 1, 0, 0))]
    fn daylight_saving_shift(#[case] inside: NaiveDateTime, #[case] outside: NaiveDateTime) {
        let site = Site::stanford();
        let inside = SolarClock::new(inside, &site);
        let outside = SolarClock::new(outside, &site);
        assert_eq!(outside.time_of_day() - inside.time_of_day(), 3600);
    }

    #[test]
    fn midnight_borrows_without_changing_date() {
        let clock = SolarClock::new(at(2019, 3, 9, 0, 0), &Site::stanford());
        assert_eq!(clock.day_of_year(), 68);
        assert_eq!(clock.time_of_day(), -521);
    }

    #[rstest]
    #[case(at(2019, 6, 13, 12, 5), 39379)]
    #[case(at(2019, 6, 13, 12, 8), 39559)]
    #[case(at(2019, 6, 13, 12, 9), 39619)]
    #[case(at(2019, 1, 15, 7, 0), 24679)]
    fn borrows_minutes_across_the_hour(#[case] time: NaiveDateTime, #[case] expected: i64) {
        let clock = SolarClock::new(time, &Site::stanford());
        assert_eq!(clock.time_of_day(), expected);
    }

    #[test]
    fn seconds_are_dropped() {
        let site = Site::stanford();
        let whole = SolarClock::new(at(2019, 6, 13, 12, 0), &site);
        let late = SolarClock::new(
            at(2019, 6, 13, 12, 0) + TimeDelta::seconds(59),
            &site,
        );
        assert_eq!(whole, late);
        assert_eq!(whole.time_of_day(), 39079);
    }

    #[test]
    fn daylight_saving_can_be_disabled() {
        let site = Site::stanford().with_daylight_saving(false);
        let clock = SolarClock::new(at(2019, 6, 13, 12, 0), &site);
        assert_eq!(clock.time_of_day(), 42679);
    }
}
