//! # Day Markers & Night Detection
//!
//! Timeline overlays derived from the sun: a line at local midnight and local
//! noon of every charted day, and a shaded band from the previous evening's
//! sunset to the morning's sunrise.
//!
//! [`crate::solar`] places every event on the UTC date it was asked for. Away
//! from Greenwich that can be a day off (New York's sunset falls after UTC
//! midnight, Sydney's sunrise before it), so here each event is moved by a
//! whole day when that brings it closer to the local noon of its date.

use crate::peaks::DayKey;
use crate::solar::{self, SunTimes};
use crate::GeoCoordinate;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::Serialize;

/// Shaded night interval on the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NightBand {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Overlays for one local calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayMarkers {
    pub date: NaiveDate,
    pub midnight: DateTime<Utc>,
    pub noon: DateTime<Utc>,
    /// Previous sunset → this sunrise; `None` under the midnight sun.
    pub night: Option<NightBand>,
}

/// Sunrise and sunset of a local calendar day, on the right UTC day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalSunEvents {
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
}

/// UTC instant of a local wall-clock time. Inside a DST gap the time an hour
/// later is used.
fn local_instant<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}

fn local_noon<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    local_instant(tz, date.and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN)))
}

/// Shift `event` by -1, 0 or +1 day, whichever lands nearest `noon`.
fn anchor(event: DateTime<Utc>, noon: DateTime<Utc>) -> DateTime<Utc> {
    [event - Duration::days(1), event, event + Duration::days(1)]
        .into_iter()
        .min_by_key(|candidate| (*candidate - noon).num_seconds().abs())
        .unwrap_or(event)
}

/// Sunrise/sunset of `date` in `tz`. Polar days give the clamped instants.
pub fn local_sun_events<Tz: TimeZone>(
    coord: GeoCoordinate,
    date: NaiveDate,
    tz: &Tz,
) -> LocalSunEvents {
    let noon = local_noon(date, tz);
    LocalSunEvents {
        sunrise: anchor(solar::sunrise_utc(coord, date), noon),
        sunset: anchor(solar::sunset_utc(coord, date), noon),
    }
}

/// Whether `instant` lies before sunrise or after sunset of its local day.
///
/// Under the midnight sun it is never night; during polar night always.
pub fn is_night<Tz: TimeZone>(instant: DateTime<Utc>, coord: GeoCoordinate, tz: &Tz) -> bool {
    let date = DayKey::of(&instant, tz).date();
    match solar::sun_times(coord, date) {
        SunTimes::AllDay => false,
        SunTimes::AllNight => true,
        SunTimes::Regular { .. } => {
            let events = local_sun_events(coord, date, tz);
            instant < events.sunrise || instant > events.sunset
        }
    }
}

/// Midnight, noon and night band for one local day.
pub fn day_markers<Tz: TimeZone>(date: NaiveDate, coord: GeoCoordinate, tz: &Tz) -> DayMarkers {
    let midnight = local_instant(tz, date.and_time(NaiveTime::MIN));
    let noon = local_noon(date, tz);

    let night = match solar::sun_times(coord, date) {
        SunTimes::AllDay => None,
        _ => {
            let previous = date.pred_opt().unwrap_or(date);
            Some(NightBand {
                start: local_sun_events(coord, previous, tz).sunset,
                end: local_sun_events(coord, date, tz).sunrise,
            })
        }
    };

    DayMarkers {
        date,
        midnight,
        noon,
        night,
    }
}

/// Markers for every local day the timestamps touch, plus the day after the
/// last one so the trailing night is shaded too.
pub fn timeline_markers<Tz, I>(timestamps: I, coord: GeoCoordinate, tz: &Tz) -> Vec<DayMarkers>
where
    Tz: TimeZone,
    I: IntoIterator<Item = DateTime<Utc>>,
{
    let mut markers = Vec::new();
    let mut previous: Option<DayKey> = None;

    for ts in timestamps {
        let key = DayKey::of(&ts, tz);
        if previous != Some(key) {
            markers.push(day_markers(key.date(), coord, tz));
        }
        previous = Some(key);
    }

    if let Some(next) = previous.and_then(|key| key.date().succ_opt()) {
        markers.push(day_markers(next, coord, tz));
    }

    markers
}
