//! # Forecast & Observation Documents
//!
//! This module reads the JSON documents the chart is built from. Two shapes are
//! understood:
//!
//! ### Forecast document
//! ```json
//! {
//!   "place": { "code": "vilnius", "name": "Vilnius",
//!              "coordinates": { "latitude": 54.68, "longitude": 25.28 } },
//!   "forecastCreationTimeUtc": "2024-06-21 09:00:00",
//!   "forecastTimestamps": [
//!     { "forecastTimeUtc": "2024-06-21 10:00:00", "airTemperature": 18.4,
//!       "windSpeed": 3, "windGust": 7, "windDirection": 250, "cloudCover": 40,
//!       "seaLevelPressure": 1012, "relativeHumidity": 61,
//!       "totalPrecipitation": 0, "conditionCode": "partly-cloudy" }
//!   ]
//! }
//! ```
//!
//! ### Observation document
//! Same entries keyed `observationTimeUtc` / `precipitation` under
//! `observations`, with the place under `station`. Stations publish one
//! document per day; [`merge_observations`] concatenates them and
//! [`observations_to_forecast`] converts the result into the forecast shape, so
//! everything downstream handles a single type.
//!
//! ## Data Processing Pipeline
//! 1. **Read**: file or string
//! 2. **Parse**: serde with `YYYY-MM-DD HH:MM:SS` UTC timestamps
//! 3. **Convert**: observations → forecast shape (if needed)
//! 4. **Extract**: per-metric [`TimeSeries`] via [`Metric`]
//!
//! All errors propagate through [`ForecastError`].

use crate::conditions::{self, ConditionCode};
use crate::{GeoCoordinate, Sample, TimeSeries};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fs, io, path::Path};
use thiserror::Error;

/// Errors that can occur while loading forecast or observation documents.
#[derive(Error, Debug)]
pub enum ForecastError {
    /// Reading the document failed (missing file, permissions)
    #[error("document IO: {0}")]
    Io(#[from] io::Error),

    /// The document is not valid JSON or misses required fields
    #[error("malformed document: {0}")]
    Json(#[from] serde_json::Error),

    /// Observation documents were given but none of them holds an observation
    #[error("no observations to chart")]
    NoObservations,
}

/// Serde adapter for the `YYYY-MM-DD HH:MM:SS` UTC timestamps of the documents.
pub mod utc_timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(d: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(raw.trim(), FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(|e| D::Error::custom(format!("bad timestamp {raw:?}: {e}")))
    }
}

/// Forecast place or observation station.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Place {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub coordinates: GeoCoordinate,
}

/// One forecast step. Missing metrics are `None`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastEntry {
    #[serde(with = "utc_timestamp")]
    pub forecast_time_utc: DateTime<Utc>,
    pub air_temperature: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_gust: Option<f64>,
    pub wind_direction: Option<f64>,
    pub cloud_cover: Option<f64>,
    pub sea_level_pressure: Option<f64>,
    pub relative_humidity: Option<f64>,
    pub total_precipitation: Option<f64>,
    #[serde(default, deserialize_with = "conditions::deserialize_lenient")]
    pub condition_code: Option<ConditionCode>,
}

/// A complete forecast for one place.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastDocument {
    pub place: Place,
    #[serde(with = "utc_timestamp")]
    pub forecast_creation_time_utc: DateTime<Utc>,
    pub forecast_timestamps: Vec<ForecastEntry>,
}

/// One station observation.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    #[serde(with = "utc_timestamp")]
    pub observation_time_utc: DateTime<Utc>,
    pub air_temperature: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_gust: Option<f64>,
    pub wind_direction: Option<f64>,
    pub cloud_cover: Option<f64>,
    pub sea_level_pressure: Option<f64>,
    pub relative_humidity: Option<f64>,
    pub precipitation: Option<f64>,
    #[serde(default, deserialize_with = "conditions::deserialize_lenient")]
    pub condition_code: Option<ConditionCode>,
}

/// Observations of one station, usually a single day.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ObservationDocument {
    pub station: Place,
    pub observations: Vec<Observation>,
}

/// Chartable metrics of a forecast entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Temperature,
    WindSpeed,
    WindGust,
    Precipitation,
    CloudCover,
    Humidity,
    Pressure,
}

impl Metric {
    pub fn value(self, entry: &ForecastEntry) -> Option<f64> {
        match self {
            Metric::Temperature => entry.air_temperature,
            Metric::WindSpeed => entry.wind_speed,
            Metric::WindGust => entry.wind_gust,
            Metric::Precipitation => entry.total_precipitation,
            Metric::CloudCover => entry.cloud_cover,
            Metric::Humidity => entry.relative_humidity,
            Metric::Pressure => entry.sea_level_pressure,
        }
    }
}

impl ForecastDocument {
    pub fn from_json(json: &str) -> Result<Self, ForecastError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ForecastError> {
        let data = fs::read(path)?;
        Ok(serde_json::from_slice(&data)?)
    }

    /// Samples of `metric`, skipping entries where it is missing.
    pub fn series(&self, metric: Metric) -> TimeSeries {
        self.forecast_timestamps
            .iter()
            .filter_map(|entry| {
                metric
                    .value(entry)
                    .map(|value| Sample::new(entry.forecast_time_utc, value))
            })
            .collect()
    }
}

impl ObservationDocument {
    pub fn from_json(json: &str) -> Result<Self, ForecastError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ForecastError> {
        let data = fs::read(path)?;
        Ok(serde_json::from_slice(&data)?)
    }
}

/// Concatenate per-day observation documents, keeping the first station.
pub fn merge_observations<I>(documents: I) -> Result<ObservationDocument, ForecastError>
where
    I: IntoIterator<Item = ObservationDocument>,
{
    let mut documents = documents.into_iter();
    let mut merged = documents.next().ok_or(ForecastError::NoObservations)?;
    for doc in documents {
        merged.observations.extend(doc.observations);
    }
    tracing::debug!(count = merged.observations.len(), "merged observations");
    Ok(merged)
}

/// Reshape observations into a forecast document.
///
/// The station becomes the place and the last observation time becomes the
/// creation time.
pub fn observations_to_forecast(
    doc: ObservationDocument,
) -> Result<ForecastDocument, ForecastError> {
    let last = doc
        .observations
        .last()
        .ok_or(ForecastError::NoObservations)?
        .observation_time_utc;

    let forecast_timestamps = doc
        .observations
        .into_iter()
        .map(|o| ForecastEntry {
            forecast_time_utc: o.observation_time_utc,
            air_temperature: o.air_temperature,
            wind_speed: o.wind_speed,
            wind_gust: o.wind_gust,
            wind_direction: o.wind_direction,
            cloud_cover: o.cloud_cover,
            sea_level_pressure: o.sea_level_pressure,
            relative_humidity: o.relative_humidity,
            total_precipitation: o.precipitation,
            condition_code: o.condition_code,
        })
        .collect();

    Ok(ForecastDocument {
        place: doc.station,
        forecast_creation_time_utc: last,
        forecast_timestamps,
    })
}
