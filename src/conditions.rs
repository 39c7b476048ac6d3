//! # Weather Conditions & Wind Labels
//!
//! Condition codes as they appear in forecast documents, their human-readable
//! labels, and the icon names used for chart markers. Three codes have a
//! separate night icon (`<code>-night`), picked when the sample falls between
//! sunset and sunrise.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Weather condition code (kebab-case on the wire, e.g. `"light-rain"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConditionCode {
    Clear,
    PartlyCloudy,
    VariableCloudiness,
    CloudyWithSunnyIntervals,
    Cloudy,
    Thunder,
    IsolatedThunderstorms,
    Thunderstorms,
    HeavyRainWithThunderstorms,
    LightRain,
    Rain,
    HeavyRain,
    RainShowers,
    LightRainAtTimes,
    RainAtTimes,
    LightSleet,
    Sleet,
    SleetAtTimes,
    SleetShowers,
    FreezingRain,
    Hail,
    LightSnow,
    Snow,
    HeavySnow,
    SnowShowers,
    SnowAtTimes,
    LightSnowAtTimes,
    Snowstorm,
    Mist,
    Fog,
    Squall,
}

impl ConditionCode {
    /// Every code, in the order the chart legend lists them.
    pub const ALL: [ConditionCode; 31] = [
        ConditionCode::Clear,
        ConditionCode::PartlyCloudy,
        ConditionCode::VariableCloudiness,
        ConditionCode::CloudyWithSunnyIntervals,
        ConditionCode::Cloudy,
        ConditionCode::Thunder,
        ConditionCode::IsolatedThunderstorms,
        ConditionCode::Thunderstorms,
        ConditionCode::HeavyRainWithThunderstorms,
        ConditionCode::LightRain,
        ConditionCode::Rain,
        ConditionCode::HeavyRain,
        ConditionCode::RainShowers,
        ConditionCode::LightRainAtTimes,
        ConditionCode::RainAtTimes,
        ConditionCode::LightSleet,
        ConditionCode::Sleet,
        ConditionCode::SleetAtTimes,
        ConditionCode::SleetShowers,
        ConditionCode::FreezingRain,
        ConditionCode::Hail,
        ConditionCode::LightSnow,
        ConditionCode::Snow,
        ConditionCode::HeavySnow,
        ConditionCode::SnowShowers,
        ConditionCode::SnowAtTimes,
        ConditionCode::LightSnowAtTimes,
        ConditionCode::Snowstorm,
        ConditionCode::Mist,
        ConditionCode::Fog,
        ConditionCode::Squall,
    ];

    /// Wire name of the code.
    pub fn as_str(self) -> &'static str {
        match self {
            ConditionCode::Clear => "clear",
            ConditionCode::PartlyCloudy => "partly-cloudy",
            ConditionCode::VariableCloudiness => "variable-cloudiness",
            ConditionCode::CloudyWithSunnyIntervals => "cloudy-with-sunny-intervals",
            ConditionCode::Cloudy => "cloudy",
            ConditionCode::Thunder => "thunder",
            ConditionCode::IsolatedThunderstorms => "isolated-thunderstorms",
            ConditionCode::Thunderstorms => "thunderstorms",
            ConditionCode::HeavyRainWithThunderstorms => "heavy-rain-with-thunderstorms",
            ConditionCode::LightRain => "light-rain",
            ConditionCode::Rain => "rain",
            ConditionCode::HeavyRain => "heavy-rain",
            ConditionCode::RainShowers => "rain-showers",
            ConditionCode::LightRainAtTimes => "light-rain-at-times",
            ConditionCode::RainAtTimes => "rain-at-times",
            ConditionCode::LightSleet => "light-sleet",
            ConditionCode::Sleet => "sleet",
            ConditionCode::SleetAtTimes => "sleet-at-times",
            ConditionCode::SleetShowers => "sleet-showers",
            ConditionCode::FreezingRain => "freezing-rain",
            ConditionCode::Hail => "hail",
            ConditionCode::LightSnow => "light-snow",
            ConditionCode::Snow => "snow",
            ConditionCode::HeavySnow => "heavy-snow",
            ConditionCode::SnowShowers => "snow-showers",
            ConditionCode::SnowAtTimes => "snow-at-times",
            ConditionCode::LightSnowAtTimes => "light-snow-at-times",
            ConditionCode::Snowstorm => "snowstorm",
            ConditionCode::Mist => "mist",
            ConditionCode::Fog => "fog",
            ConditionCode::Squall => "squall",
        }
    }

    /// Legend label.
    pub fn label(self) -> &'static str {
        match self {
            ConditionCode::Clear => "Clear",
            ConditionCode::PartlyCloudy => "Partly cloudy",
            ConditionCode::VariableCloudiness => "Variable cloudiness",
            ConditionCode::CloudyWithSunnyIntervals => "Cloudy with sunny intervals",
            ConditionCode::Cloudy => "Cloudy",
            ConditionCode::Thunder => "Thunder",
            ConditionCode::IsolatedThunderstorms => "Isolated thunderstorms",
            ConditionCode::Thunderstorms => "Thunderstorms",
            ConditionCode::HeavyRainWithThunderstorms => "Heavy rain with thunderstorms",
            ConditionCode::LightRain => "Light rain",
            ConditionCode::Rain => "Rain",
            ConditionCode::HeavyRain => "Heavy rain",
            ConditionCode::RainShowers => "Rain showers",
            ConditionCode::LightRainAtTimes => "Light rain at times",
            ConditionCode::RainAtTimes => "Rain at times",
            ConditionCode::LightSleet => "Light sleet",
            ConditionCode::Sleet => "Sleet",
            ConditionCode::SleetAtTimes => "Sleet at times",
            ConditionCode::SleetShowers => "Sleet showers",
            ConditionCode::FreezingRain => "Freezing rain",
            ConditionCode::Hail => "Hail",
            ConditionCode::LightSnow => "Light snow",
            ConditionCode::Snow => "Snow",
            ConditionCode::HeavySnow => "Heavy snow",
            ConditionCode::SnowShowers => "Snow showers",
            ConditionCode::SnowAtTimes => "Snow at times",
            ConditionCode::LightSnowAtTimes => "Light snow at times",
            ConditionCode::Snowstorm => "Snowstorm",
            ConditionCode::Mist => "Mist",
            ConditionCode::Fog => "Fog",
            ConditionCode::Squall => "Squall",
        }
    }

    /// Whether a separate night icon exists for this code.
    pub fn has_night_variant(self) -> bool {
        matches!(
            self,
            ConditionCode::Clear
                | ConditionCode::PartlyCloudy
                | ConditionCode::CloudyWithSunnyIntervals
        )
    }
}

impl fmt::Display for ConditionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A condition code outside the known set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown condition code: {0}")]
pub struct UnknownCondition(pub String);

impl FromStr for ConditionCode {
    type Err = UnknownCondition;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConditionCode::ALL
            .into_iter()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| UnknownCondition(s.to_string()))
    }
}

/// Icon shown for a condition marker: day variant, or `-night` where one exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ConditionIcon {
    pub code: ConditionCode,
    pub night: bool,
}

impl ConditionIcon {
    /// Picks the night variant only when `is_night` and the code has one.
    pub fn for_time(code: ConditionCode, is_night: bool) -> Self {
        ConditionIcon {
            code,
            night: is_night && code.has_night_variant(),
        }
    }

    /// Icon file stem, e.g. `clear-night`.
    pub fn name(&self) -> String {
        if self.night {
            format!("{}-night", self.code)
        } else {
            self.code.to_string()
        }
    }
}

/// Serde helper: unknown or missing condition codes become `None`.
pub fn deserialize_lenient<'de, D>(d: D) -> Result<Option<ConditionCode>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(d)?;
    Ok(raw.and_then(|s| match s.parse() {
        Ok(code) => Some(code),
        Err(e) => {
            tracing::warn!("{e}");
            None
        }
    }))
}

/// Eight-point compass label with the angle, e.g. `"NE, 45°"`.
///
/// The sector is chosen on the angle wrapped into [0, 360); the printed angle
/// is the input as given.
pub fn compass(degrees: f64) -> String {
    let a = degrees.rem_euclid(360.0);
    let label = match a {
        a if (23.0..68.0).contains(&a) => "NE",
        a if (68.0..113.0).contains(&a) => "E",
        a if (113.0..158.0).contains(&a) => "SE",
        a if (158.0..203.0).contains(&a) => "S",
        a if (203.0..248.0).contains(&a) => "SW",
        a if (248.0..293.0).contains(&a) => "W",
        a if (293.0..338.0).contains(&a) => "NW",
        _ => "N",
    };
    format!("{label}, {degrees}°")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_roundtrip_through_from_str() {
        for code in ConditionCode::ALL {
            assert_eq!(code.as_str().parse::<ConditionCode>(), Ok(code));
        }
    }

    #[test]
    fn test_serde_names_match_wire_names() {
        for code in ConditionCode::ALL {
            let json = serde_json::to_string(&code).unwrap();
            assert_eq!(json, format!("\"{}\"", code.as_str()));
        }
    }

    #[test]
    fn test_unknown_code() {
        assert!("drizzle-of-frogs".parse::<ConditionCode>().is_err());
    }

    #[test]
    fn test_night_variants() {
        let night: Vec<_> = ConditionCode::ALL
            .into_iter()
            .filter(|c| c.has_night_variant())
            .collect();
        assert_eq!(
            night,
            vec![
                ConditionCode::Clear,
                ConditionCode::PartlyCloudy,
                ConditionCode::CloudyWithSunnyIntervals
            ]
        );
    }

    #[test]
    fn test_icon_names() {
        let clear_night = ConditionIcon::for_time(ConditionCode::Clear, true);
        let clear_day = ConditionIcon::for_time(ConditionCode::Clear, false);
        // No night icon for rain
        let rain_night = ConditionIcon::for_time(ConditionCode::Rain, true);

        assert_eq!(clear_night.name(), "clear-night");
        assert_eq!(clear_day.name(), "clear");
        assert_eq!(rain_night.name(), "rain");
        assert!(!rain_night.night);
    }

    #[test]
    fn test_compass_sectors() {
        assert_eq!(compass(0.0), "N, 0°");
        assert_eq!(compass(22.0), "N, 22°");
        assert_eq!(compass(45.0), "NE, 45°");
        assert_eq!(compass(90.0), "E, 90°");
        assert_eq!(compass(180.0), "S, 180°");
        assert_eq!(compass(270.0), "W, 270°");
        assert_eq!(compass(337.0), "NW, 337°");
        assert_eq!(compass(338.0), "N, 338°");
    }

    #[test]
    fn test_compass_wraps_out_of_range() {
        assert_eq!(compass(360.0), "N, 360°");
        assert_eq!(compass(-90.0), "W, -90°");
    }
}
