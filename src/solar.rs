//! Sunrise & sunset instants (U.S. Naval Observatory approximation)
//!
//! Civil sunrise/sunset: the sun's centre 50′ below the horizon, i.e. a zenith
//! angle of 90.8333°, which folds in refraction and the solar radius.
//! Accuracy: a minute or two at mid latitudes, worse close to the polar circles.
//!
//! The result for a calendar date is always midnight UTC of *that* date plus
//! the computed UT hour. West of Greenwich the sunset can therefore land before
//! the sunrise of the same date; callers that need ordering handle it.
//!
//! Polar day/night has no real hour angle. [`sunrise_utc`] and [`sunset_utc`]
//! clamp the hour-angle cosine into [-1, 1] so they always return an instant;
//! [`sun_times`] reports [`SunTimes::AllDay`] / [`SunTimes::AllNight`] instead.

use crate::GeoCoordinate;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};

/// Zenith angle of civil sunrise/sunset, degrees.
const ZENITH_DEG: f64 = 90.8333;

/// Sunrise/sunset pair for one calendar date, or the polar case.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SunTimes {
    /// The sun crosses the horizon twice.
    Regular {
        sunrise: DateTime<Utc>,
        sunset: DateTime<Utc>,
    },
    /// Midnight sun: the sun never sets.
    AllDay,
    /// Polar night: the sun never rises.
    AllNight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Event {
    Rise,
    Set,
}

/// Intermediate result of one sunrise or sunset evaluation.
#[derive(Debug, Clone, Copy)]
struct Solution {
    /// Unclamped cosine of the local hour angle. Outside [-1, 1] means polar.
    cos_h: f64,
    /// UT hour of the event in [0, 24), computed with the clamped cosine.
    ut_hours: f64,
}

/// UTC instant of sunrise on `date` at `coord`.
pub fn sunrise_utc(coord: GeoCoordinate, date: NaiveDate) -> DateTime<Utc> {
    to_instant(date, solve(coord, date, Event::Rise).ut_hours)
}

/// UTC instant of sunset on `date` at `coord`.
pub fn sunset_utc(coord: GeoCoordinate, date: NaiveDate) -> DateTime<Utc> {
    to_instant(date, solve(coord, date, Event::Set).ut_hours)
}

/// Sunrise and sunset for `date`, distinguishing polar day and polar night.
pub fn sun_times(coord: GeoCoordinate, date: NaiveDate) -> SunTimes {
    let rise = solve(coord, date, Event::Rise);
    let set = solve(coord, date, Event::Set);

    // cos H > 1: the sun stays below the horizon; < -1: it stays above.
    if rise.cos_h > 1.0 || set.cos_h > 1.0 {
        tracing::debug!(%date, lat = coord.latitude, "polar night, no sunrise");
        return SunTimes::AllNight;
    }
    if rise.cos_h < -1.0 || set.cos_h < -1.0 {
        tracing::debug!(%date, lat = coord.latitude, "polar day, no sunset");
        return SunTimes::AllDay;
    }

    SunTimes::Regular {
        sunrise: to_instant(date, rise.ut_hours),
        sunset: to_instant(date, set.ut_hours),
    }
}

/// Sunrise for the current calendar day in `tz`.
pub fn sunrise_today<Tz: TimeZone>(coord: GeoCoordinate, tz: &Tz) -> DateTime<Utc> {
    sunrise_utc(coord, Utc::now().with_timezone(tz).date_naive())
}

/// Sunset for the current calendar day in `tz`.
pub fn sunset_today<Tz: TimeZone>(coord: GeoCoordinate, tz: &Tz) -> DateTime<Utc> {
    sunset_utc(coord, Utc::now().with_timezone(tz).date_naive())
}

fn solve(coord: GeoCoordinate, date: NaiveDate, event: Event) -> Solution {
    // ---------- 1. Day of year and longitude hour --------------------------------
    let day_of_year = date.ordinal() as f64;
    let lng_hour = coord.longitude / 15.0;

    // ---------- 2. Approximate time of the event ---------------------------------
    let base_hour = match event {
        Event::Rise => 6.0,
        Event::Set => 18.0,
    };
    let t = day_of_year + (base_hour - lng_hour) / 24.0;

    // ---------- 3. Mean anomaly & true longitude ---------------------------------
    let m = 0.9856 * t - 3.289;
    let l = wrap(
        m + 1.916 * sin_deg(m) + 0.020 * sin_deg(2.0 * m) + 282.634,
        360.0,
    );

    // ---------- 4. Right ascension, moved into L's quadrant, in hours ------------
    let mut ra = wrap(atan_deg(0.91764 * tan_deg(l)), 360.0);
    ra += 90.0 * (l / 90.0).floor() - 90.0 * (ra / 90.0).floor();
    ra /= 15.0;

    // ---------- 5. Declination ---------------------------------------------------
    let sin_dec = 0.39782 * sin_deg(l);
    let cos_dec = cos_deg(asin_deg(sin_dec));

    // ---------- 6. Local hour angle ----------------------------------------------
    let cos_h = (cos_deg(ZENITH_DEG) - sin_dec * sin_deg(coord.latitude))
        / (cos_dec * cos_deg(coord.latitude));
    let h_deg = acos_deg(cos_h.clamp(-1.0, 1.0));
    let h = match event {
        Event::Rise => 360.0 - h_deg,
        Event::Set => h_deg,
    } / 15.0;

    // ---------- 7. Local mean time → UT ------------------------------------------
    let local_mean = wrap(h + ra - 0.06571 * t - 6.622, 24.0);
    let ut_hours = wrap(local_mean - lng_hour, 24.0);

    Solution { cos_h, ut_hours }
}

/// Midnight UTC of `date` plus `ut_hours`, truncated to whole milliseconds.
fn to_instant(date: NaiveDate, ut_hours: f64) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN).and_utc();
    // NaN (degenerate coordinates) casts to 0 and yields midnight, as does an
    // instant past the end of the representable range.
    midnight
        .checked_add_signed(Duration::milliseconds((ut_hours * 3_600_000.0) as i64))
        .unwrap_or(midnight)
}

/// Remainder in [0, modulus), also for negative operands.
fn wrap(value: f64, modulus: f64) -> f64 {
    value.rem_euclid(modulus)
}

fn sin_deg(deg: f64) -> f64 {
    deg.to_radians().sin()
}

fn cos_deg(deg: f64) -> f64 {
    deg.to_radians().cos()
}

fn tan_deg(deg: f64) -> f64 {
    deg.to_radians().tan()
}

fn atan_deg(x: f64) -> f64 {
    x.atan().to_degrees()
}

fn asin_deg(x: f64) -> f64 {
    x.asin().to_degrees()
}

fn acos_deg(x: f64) -> f64 {
    x.acos().to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    const VILNIUS: GeoCoordinate = GeoCoordinate {
        latitude: 54.6872,
        longitude: 25.2797,
    };
    const TROMSO: GeoCoordinate = GeoCoordinate {
        latitude: 69.6492,
        longitude: 18.9553,
    };
    const NEW_YORK: GeoCoordinate = GeoCoordinate {
        latitude: 40.7128,
        longitude: -74.006,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn assert_within_minutes(actual: DateTime<Utc>, expected: DateTime<Utc>, minutes: i64) {
        let diff = (actual - expected).num_seconds().abs();
        assert!(
            diff <= minutes * 60,
            "{actual} differs from {expected} by {diff}s (limit {minutes} min)"
        );
    }

    #[test]
    fn test_vilnius_summer_solstice() {
        // Published: sunrise 04:42 EEST, sunset 22:00 EEST
        let d = date(2024, 6, 21);
        assert_within_minutes(sunrise_utc(VILNIUS, d), utc(2024, 6, 21, 1, 42), 3);
        assert_within_minutes(sunset_utc(VILNIUS, d), utc(2024, 6, 21, 19, 0), 3);
    }

    #[test]
    fn test_vilnius_winter_solstice() {
        // Published: sunrise 08:39 EET, sunset 15:55 EET
        let d = date(2024, 12, 21);
        assert_within_minutes(sunrise_utc(VILNIUS, d), utc(2024, 12, 21, 6, 39), 5);
        assert_within_minutes(sunset_utc(VILNIUS, d), utc(2024, 12, 21, 13, 55), 5);
    }

    #[test]
    fn test_result_stays_on_requested_date() {
        let d = date(2024, 3, 20);
        assert_eq!(sunrise_utc(VILNIUS, d).date_naive(), d);
        assert_eq!(sunset_utc(VILNIUS, d).date_naive(), d);
    }

    #[test]
    fn test_sunrise_before_sunset_mid_latitude() {
        let mut d = date(2024, 1, 1);
        while d.year() == 2024 {
            let rise = sunrise_utc(VILNIUS, d);
            let set = sunset_utc(VILNIUS, d);
            assert!(rise < set, "{d}: sunrise {rise} should precede sunset {set}");
            d = d.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_no_date_rolling_west_of_greenwich() {
        // New York sunset (~20:31 EDT) is 00:31 UTC on the next day, but stays
        // on the requested date, so it precedes the sunrise instant.
        let d = date(2024, 6, 21);
        let rise = sunrise_utc(NEW_YORK, d);
        let set = sunset_utc(NEW_YORK, d);
        assert_within_minutes(rise, utc(2024, 6, 21, 9, 25), 3);
        assert_within_minutes(set, utc(2024, 6, 21, 0, 31), 3);
        assert!(set < rise);
    }

    #[test]
    fn test_regular_sun_times_match_single_events() {
        let d = date(2024, 6, 21);
        match sun_times(VILNIUS, d) {
            SunTimes::Regular { sunrise, sunset } => {
                assert_eq!(sunrise, sunrise_utc(VILNIUS, d));
                assert_eq!(sunset, sunset_utc(VILNIUS, d));
            }
            other => panic!("expected a regular day, got {other:?}"),
        }
    }

    #[test]
    fn test_polar_night_is_classified_and_clamped() {
        let d = date(2024, 12, 21);
        assert_eq!(sun_times(TROMSO, d), SunTimes::AllNight);

        // Clamped: both events collapse onto solar noon (~10:42 UTC).
        let rise = sunrise_utc(TROMSO, d);
        let set = sunset_utc(TROMSO, d);
        assert_within_minutes(rise, utc(2024, 12, 21, 10, 42), 2);
        assert_within_minutes(set, utc(2024, 12, 21, 10, 42), 2);
        assert!(rise <= set);
    }

    #[test]
    fn test_polar_day_is_classified_and_clamped() {
        let d = date(2024, 6, 21);
        assert_eq!(sun_times(TROMSO, d), SunTimes::AllDay);

        // Clamped: both events collapse onto solar midnight (~22:46 UTC).
        let rise = sunrise_utc(TROMSO, d);
        let set = sunset_utc(TROMSO, d);
        assert_within_minutes(rise, utc(2024, 6, 21, 22, 46), 2);
        assert_within_minutes(set, utc(2024, 6, 21, 22, 46), 2);
    }

    #[test]
    fn test_degenerate_coordinates_do_not_panic() {
        let d = date(2024, 6, 21);
        let nan = GeoCoordinate::new(f64::NAN, f64::NAN);
        assert_eq!(sunrise_utc(nan, d), utc(2024, 6, 21, 0, 0));
        let _ = sun_times(GeoCoordinate::new(123.0, 500.0), d);
        let _ = sunset_utc(GeoCoordinate::new(90.0, -180.0), d);
    }

    #[test]
    fn test_calendar_limits_do_not_panic() {
        for d in [NaiveDate::MAX, NaiveDate::MIN] {
            assert_eq!(sunrise_utc(VILNIUS, d).date_naive(), d);
            assert_eq!(sunset_utc(VILNIUS, d).date_naive(), d);
            let _ = sun_times(TROMSO, d);
        }
        // NaN hours on the last representable day fall back to its midnight
        let nan = GeoCoordinate::new(f64::NAN, f64::NAN);
        assert_eq!(
            sunrise_utc(nan, NaiveDate::MAX),
            NaiveDate::MAX.and_time(NaiveTime::MIN).and_utc()
        );
    }

    #[test]
    fn test_wrap_handles_negative_operands() {
        assert_eq!(wrap(-30.0, 360.0), 330.0);
        assert_eq!(wrap(390.0, 360.0), 30.0);
        assert_eq!(wrap(-1.5, 24.0), 22.5);
        assert_eq!(wrap(0.0, 24.0), 0.0);
    }

    #[test]
    fn test_millisecond_precision() {
        let rise = sunrise_utc(VILNIUS, date(2024, 6, 21));
        assert_eq!(rise.nanosecond() % 1_000_000, 0);
    }

    #[test]
    fn test_today_wrappers_use_local_date() {
        // Retry once in case the test straddles midnight
        for _ in 0..2 {
            let today = Utc::now().date_naive();
            let rise = sunrise_today(VILNIUS, &Utc);
            let set = sunset_today(VILNIUS, &Utc);
            if Utc::now().date_naive() == today {
                assert_eq!(rise, sunrise_utc(VILNIUS, today));
                assert_eq!(set, sunset_utc(VILNIUS, today));
                return;
            }
        }
    }
}
