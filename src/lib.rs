//! # Forecast Chart Core Library
//!
//! This library turns weather forecast and observation documents into the data a
//! multi-panel chart needs: metric series, day/night shading bands, sunrise and
//! sunset overlays, condition icon markers and peak/trough labels on the
//! temperature series.
//!
//! ## Design Philosophy
//!
//! ### Pure Core
//! The two algorithmic pieces are pure functions of their inputs:
//! - [`solar`]: USNO approximate sunrise/sunset instants for a date and coordinate
//! - [`peaks`]: oscillation and day-boundary extrema over a temperature series
//!
//! Neither reads the clock. Wherever "now" or "today" matters it is passed in,
//! and thin wrappers at the edges supply the real clock.
//!
//! ### Data Flow
//! 1. **Load**: Parse a forecast document, or several observation documents
//!    converted into the forecast shape ([`forecast`])
//! 2. **Assemble**: Build series, markers and peak flags ([`chart`])
//! 3. **Report**: Print a text table for the terminal ([`renderer`])
//!
//! ## Core Types
//!
//! - [`Sample`]: one value at one UTC instant
//! - [`TimeSeries`]: ascending sequence of samples (ordering is assumed, not checked)
//! - [`ExtremaFlags`]: `0`/`1` per sample, index-aligned with the series
//! - [`GeoCoordinate`]: latitude/longitude in degrees

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Module declarations
pub mod chart;
pub mod conditions;
pub mod config;
pub mod forecast;
pub mod markers;
pub mod peaks;
pub mod renderer;
pub mod solar;

/// A single measurement at a specific UTC instant.
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use forecast_chart_lib::Sample;
///
/// let noon = Sample::new(Utc.with_ymd_and_hms(2024, 6, 21, 12, 0, 0).unwrap(), 21.5);
/// assert_eq!(noon.value, 21.5);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Instant of the measurement
    pub timestamp: DateTime<Utc>,
    /// Measured or forecast value (units depend on the metric)
    pub value: f64,
}

impl Sample {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Sample { timestamp, value }
    }
}

/// Samples in ascending timestamp order.
pub type TimeSeries = Vec<Sample>;

/// One flag per sample: `1` marks an extremum, `0` everything else.
pub type ExtremaFlags = Vec<u8>;

/// Geographic position in degrees.
///
/// No range validation is done. Coordinates outside the Earth's range give
/// degenerate (but non-panicking) solar results.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    /// Degrees north of the equator (negative for south)
    pub latitude: f64,
    /// Degrees east of Greenwich (negative for west)
    pub longitude: f64,
}

impl GeoCoordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        GeoCoordinate {
            latitude,
            longitude,
        }
    }
}
