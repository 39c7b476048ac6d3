//! # Chart Data Assembly
//!
//! Collects everything a renderer needs from one [`ForecastDocument`]:
//! metric series, wind samples grouped by direction, temperature peak flags,
//! day/night markers and condition icon markers. Styling is left to the
//! renderer.
//!
//! Condition markers sit at level 1. When two entries are closer than the
//! stagger window (hourly data), odd entries move up to level 2 so neighbouring
//! icons don't overlap.

use crate::conditions::ConditionIcon;
use crate::forecast::{ForecastDocument, Metric};
use crate::markers::{self, DayMarkers};
use crate::peaks::{self, DayKey};
use crate::{ExtremaFlags, GeoCoordinate, Sample, TimeSeries};
use chrono::{DateTime, Duration, TimeZone, Timelike, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Tunables for [`ChartData::build`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartOptions {
    /// Minimum swing for a temperature reversal to get a label
    pub peak_threshold: f64,
    /// Entries at most this far apart get staggered condition icons
    pub stagger_window: Duration,
}

impl Default for ChartOptions {
    fn default() -> Self {
        ChartOptions {
            peak_threshold: 1.0,
            stagger_window: Duration::hours(1),
        }
    }
}

/// One weather icon on the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConditionMarker {
    pub timestamp: DateTime<Utc>,
    pub icon: ConditionIcon,
    /// Vertical slot, 1 or 2
    pub level: u8,
}

/// Everything needed to draw the chart panels.
#[derive(Debug, Clone, Serialize)]
pub struct ChartData {
    pub place_name: Option<String>,
    pub coordinates: GeoCoordinate,
    pub updated_at: DateTime<Utc>,
    pub now: DateTime<Utc>,
    pub temperature: TimeSeries,
    pub temperature_peaks: ExtremaFlags,
    pub wind: TimeSeries,
    pub wind_gust: TimeSeries,
    /// Wind speed samples keyed by direction in whole degrees
    pub wind_arrows: BTreeMap<i32, TimeSeries>,
    pub precipitation: TimeSeries,
    pub cloud_cover: TimeSeries,
    pub humidity: TimeSeries,
    pub pressure: TimeSeries,
    pub day_markers: Vec<DayMarkers>,
    pub conditions: Vec<ConditionMarker>,
    /// Icon for the first entry after `now`, else the last entry
    pub current_condition: Option<ConditionIcon>,
    /// First and last entry timestamps
    pub range: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

impl ChartData {
    pub fn build<Tz: TimeZone>(
        doc: &ForecastDocument,
        tz: &Tz,
        options: ChartOptions,
        now: DateTime<Utc>,
    ) -> ChartData {
        let coord = doc.place.coordinates;
        let entries = &doc.forecast_timestamps;

        let temperature = doc.series(Metric::Temperature);
        let temperature_peaks = peaks::detect_peaks(&temperature, options.peak_threshold, tz);

        let mut wind_arrows: BTreeMap<i32, TimeSeries> = BTreeMap::new();
        for entry in entries {
            if let (Some(direction), Some(speed)) = (entry.wind_direction, entry.wind_speed) {
                wind_arrows
                    .entry(direction.round() as i32)
                    .or_default()
                    .push(Sample::new(entry.forecast_time_utc, speed));
            }
        }

        let mut conditions = Vec::new();
        let mut current_condition = None;
        let mut previous: Option<DateTime<Utc>> = None;
        for (i, entry) in entries.iter().enumerate() {
            let ts = entry.forecast_time_utc;
            if let Some(code) = entry.condition_code {
                let icon = ConditionIcon::for_time(code, markers::is_night(ts, coord, tz));
                let stagger = previous.is_some_and(|prev| ts - prev <= options.stagger_window);
                let level = if stagger { 1 + (i % 2) as u8 } else { 1 };
                conditions.push(ConditionMarker {
                    timestamp: ts,
                    icon,
                    level,
                });

                if current_condition.is_none() && (ts > now || i == entries.len() - 1) {
                    current_condition = Some(icon);
                }
            }
            previous = Some(ts);
        }

        let day_markers =
            markers::timeline_markers(entries.iter().map(|e| e.forecast_time_utc), coord, tz);

        let range = entries
            .first()
            .zip(entries.last())
            .map(|(first, last)| (first.forecast_time_utc, last.forecast_time_utc));

        tracing::info!(
            entries = entries.len(),
            peaks = temperature_peaks.iter().filter(|f| **f == 1).count(),
            days = day_markers.len(),
            "assembled chart data"
        );

        ChartData {
            place_name: doc.place.name.clone(),
            coordinates: coord,
            updated_at: doc.forecast_creation_time_utc,
            now,
            temperature,
            temperature_peaks,
            wind: doc.series(Metric::WindSpeed),
            wind_gust: doc.series(Metric::WindGust),
            wind_arrows,
            precipitation: doc.series(Metric::Precipitation),
            cloud_cover: doc.series(Metric::CloudCover),
            humidity: doc.series(Metric::Humidity),
            pressure: doc.series(Metric::Pressure),
            day_markers,
            conditions,
            current_condition,
            range,
        }
    }

    /// Temperature samples flagged as peaks or troughs.
    pub fn labelled_temperatures(&self) -> impl Iterator<Item = &Sample> {
        self.temperature
            .iter()
            .zip(&self.temperature_peaks)
            .filter(|(_, flag)| **flag == 1)
            .map(|(sample, _)| sample)
    }

    /// Number of local calendar days the temperature series spans.
    pub fn temperature_days<Tz: TimeZone>(&self, tz: &Tz) -> usize {
        let mut keys: Vec<DayKey> = self
            .temperature
            .iter()
            .map(|s| DayKey::of(&s.timestamp, tz))
            .collect();
        keys.dedup();
        keys.len()
    }
}

/// Estimated time of the next forecast run: three hours after `updated_at`,
/// rounded to the nearest full hour of local time in `tz`.
pub fn next_update<Tz: TimeZone>(updated_at: DateTime<Utc>, tz: &Tz) -> DateTime<Utc> {
    let local = updated_at.with_timezone(tz);
    let round_up = if local.minute() >= 30 { 1 } else { 0 };
    let shifted = local + Duration::hours(3 + round_up);
    shifted
        .with_minute(0)
        .and_then(|dt| dt.with_second(0))
        .and_then(|dt| dt.with_nanosecond(0))
        .unwrap_or(shifted)
        .with_timezone(&Utc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditions::ConditionCode;
    use crate::forecast::{ForecastEntry, Place};
    use chrono_tz::Asia::{Kathmandu, Kolkata};
    use chrono_tz::Europe::Vilnius;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn entry(ts: DateTime<Utc>, temp: f64, code: ConditionCode) -> ForecastEntry {
        ForecastEntry {
            forecast_time_utc: ts,
            air_temperature: Some(temp),
            wind_speed: Some(3.0),
            wind_gust: Some(6.0),
            wind_direction: Some(180.0),
            cloud_cover: Some(20.0),
            sea_level_pressure: Some(1013.0),
            relative_humidity: Some(70.0),
            total_precipitation: Some(0.0),
            condition_code: Some(code),
        }
    }

    fn build(doc: &ForecastDocument, now: DateTime<Utc>) -> ChartData {
        ChartData::build(doc, &Vilnius, ChartOptions::default(), now)
    }

    /// Hourly entries from 18:00Z on 2024-06-21 (21:00 in Vilnius)
    fn document(temps: &[f64]) -> ForecastDocument {
        let start = utc(2024, 6, 21, 18, 0);
        ForecastDocument {
            place: Place {
                code: Some("vilnius".into()),
                name: Some("Vilnius".into()),
                coordinates: GeoCoordinate::new(54.6872, 25.2797),
            },
            forecast_creation_time_utc: utc(2024, 6, 21, 17, 40),
            forecast_timestamps: temps
                .iter()
                .enumerate()
                .map(|(i, t)| {
                    entry(start + Duration::hours(i as i64), *t, ConditionCode::Clear)
                })
                .collect(),
        }
    }

    #[test]
    fn test_build_series_and_peaks() {
        let doc = document(&[18.0, 16.0, 14.0, 15.0, 13.0, 12.0]);
        let chart = build(&doc, utc(2024, 6, 21, 19, 30));

        assert_eq!(chart.temperature.len(), 6);
        assert_eq!(chart.temperature_peaks.len(), 6);
        assert_eq!(chart.wind.len(), 6);
        assert_eq!(chart.wind_arrows[&180].len(), 6);
        assert_eq!(
            chart.range,
            Some((utc(2024, 6, 21, 18, 0), utc(2024, 6, 21, 23, 0)))
        );
        // Local days: 21st (21:00-23:00) and 22nd (00:00-02:00)
        assert_eq!(chart.temperature_days(&Vilnius), 2);
        // Each local day contributes at least its min and max
        assert!(chart.labelled_temperatures().count() >= 3);
    }

    #[test]
    fn test_condition_icon_is_day_variant_before_sunset() {
        let doc = document(&[18.0, 17.0]);
        let chart = build(&doc, utc(2024, 6, 21, 0, 0));

        // 18:00Z is before the ~19:00Z sunset
        assert!(!chart.conditions[0].icon.night);
        assert_eq!(chart.conditions[0].icon.name(), "clear");
    }

    #[test]
    fn test_night_variant_late_evening() {
        let doc = document(&[18.0, 17.0, 16.0, 15.0]);
        let chart = build(&doc, utc(2024, 6, 21, 0, 0));
        // 21:00Z = 00:00 local on the 22nd, before the 01:42Z sunrise
        assert_eq!(chart.conditions[3].icon.name(), "clear-night");
    }

    #[test]
    fn test_hourly_conditions_are_staggered() {
        let doc = document(&[1.0, 2.0, 3.0, 4.0]);
        let chart = build(&doc, utc(2024, 6, 21, 0, 0));
        let levels: Vec<u8> = chart.conditions.iter().map(|c| c.level).collect();
        assert_eq!(levels, vec![1, 2, 1, 2]);
    }

    #[test]
    fn test_sparse_conditions_are_not_staggered() {
        let mut doc = document(&[1.0, 2.0, 3.0]);
        for (i, e) in doc.forecast_timestamps.iter_mut().enumerate() {
            e.forecast_time_utc = utc(2024, 6, 21, 0, 0) + Duration::hours(3 * i as i64);
        }
        let chart = build(&doc, utc(2024, 6, 21, 0, 0));
        assert!(chart.conditions.iter().all(|c| c.level == 1));
    }

    #[test]
    fn test_current_condition_is_first_after_now() {
        let mut doc = document(&[1.0, 2.0, 3.0]);
        doc.forecast_timestamps[2].condition_code = Some(ConditionCode::Rain);
        let chart = build(&doc, utc(2024, 6, 21, 19, 30));
        assert_eq!(chart.current_condition.map(|c| c.code), Some(ConditionCode::Rain));
    }

    #[test]
    fn test_current_condition_falls_back_to_last_entry() {
        let mut doc = document(&[1.0, 2.0]);
        doc.forecast_timestamps[1].condition_code = Some(ConditionCode::Fog);
        let chart = build(&doc, utc(2030, 1, 1, 0, 0));
        assert_eq!(chart.current_condition.map(|c| c.code), Some(ConditionCode::Fog));
    }

    #[test]
    fn test_day_markers_cover_trailing_day() {
        let doc = document(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let chart = build(&doc, utc(2024, 6, 21, 0, 0));
        // 21st, 22nd, plus the 23rd after the last sample
        assert_eq!(chart.day_markers.len(), 3);
    }

    #[test]
    fn test_empty_document() {
        let doc = document(&[]);
        let chart = build(&doc, utc(2024, 6, 21, 0, 0));
        assert!(chart.temperature_peaks.is_empty());
        assert!(chart.day_markers.is_empty());
        assert!(chart.range.is_none());
        assert!(chart.current_condition.is_none());
    }

    #[test]
    fn test_next_update_estimate() {
        assert_eq!(next_update(utc(2024, 6, 21, 9, 10), &Utc), utc(2024, 6, 21, 12, 0));
        assert_eq!(next_update(utc(2024, 6, 21, 9, 40), &Utc), utc(2024, 6, 21, 13, 0));
        assert_eq!(next_update(utc(2024, 6, 21, 22, 45), &Utc), utc(2024, 6, 22, 2, 0));
        // Whole-hour zones agree with UTC
        assert_eq!(next_update(utc(2024, 6, 21, 9, 10), &Vilnius), utc(2024, 6, 21, 12, 0));
    }

    #[test]
    fn test_next_update_lands_on_local_full_hour() {
        // 09:10Z is 14:40 IST: three hours on, rounded up, gives 18:00 IST
        let next = next_update(utc(2024, 6, 21, 9, 10), &Kolkata);
        assert_eq!(next, utc(2024, 6, 21, 12, 30));
        assert_eq!(next.with_timezone(&Kolkata).format("%H:%M").to_string(), "18:00");

        // 09:50Z is 15:20 IST: no round-up, 18:00 IST again
        assert_eq!(next_update(utc(2024, 6, 21, 9, 50), &Kolkata), utc(2024, 6, 21, 12, 30));

        // Kathmandu runs at +05:45
        let next = next_update(utc(2024, 6, 21, 9, 10), &Kathmandu);
        assert_eq!(next.with_timezone(&Kathmandu).minute(), 0);
    }
}
