//! # Text Report Rendering
//!
//! Prints assembled [`ChartData`] as a terminal table, one row per temperature
//! sample, grouped under a header per local calendar day with that day's night
//! band. Samples flagged by the peak detector show their value in brackets,
//! the way the chart draws a value label next to them.

use crate::chart::{next_update, ChartData};
use crate::conditions::compass;
use crate::markers::DayMarkers;
use crate::peaks::DayKey;
use crate::Sample;
use chrono::{DateTime, TimeZone, Utc};
use std::fmt::Display;
use std::io::{self, Write};

/// Value of an ordered series at exactly `ts`
fn value_at(series: &[Sample], ts: DateTime<Utc>) -> Option<f64> {
    series
        .binary_search_by(|s| s.timestamp.cmp(&ts))
        .ok()
        .map(|i| series[i].value)
}

fn format_optional(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.1}"))
}

/// Temperature cell: flagged samples get a bracketed label
fn format_temperature(value: f64, flagged: bool) -> String {
    if flagged {
        format!("[{value:.1}]")
    } else {
        format!(" {value:.1} ")
    }
}

fn day_header<Tz>(markers: Option<&DayMarkers>, key: DayKey, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let date = key.date().format("%a %Y-%m-%d");
    match markers.and_then(|m| m.night) {
        Some(night) => format!(
            "=== {date} === night {} → {}",
            night.start.with_timezone(tz).format("%H:%M"),
            night.end.with_timezone(tz).format("%H:%M"),
        ),
        None => format!("=== {date} === midnight sun"),
    }
}

/// Write the report for `chart` to `out`, with times shown in `tz`.
pub fn render_report<W, Tz>(out: &mut W, chart: &ChartData, tz: &Tz) -> io::Result<()>
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let place = chart.place_name.as_deref().unwrap_or("Unknown place");
    writeln!(
        out,
        "{place} ({:.4}, {:.4}), updated {}, next ~{}",
        chart.coordinates.latitude,
        chart.coordinates.longitude,
        chart.updated_at.with_timezone(tz).format("%m-%d %H:%M"),
        next_update(chart.updated_at, tz).with_timezone(tz).format("%H:%M"),
    )?;
    if let Some(icon) = chart.current_condition {
        writeln!(out, "Now: {} ({})", icon.code.label(), icon.name())?;
    }

    let mut previous: Option<DayKey> = None;
    for (sample, flag) in chart.temperature.iter().zip(&chart.temperature_peaks) {
        let key = DayKey::of(&sample.timestamp, tz);
        if previous != Some(key) {
            let markers = chart.day_markers.iter().find(|m| m.date == key.date());
            writeln!(out)?;
            writeln!(out, "{}", day_header(markers, key, tz))?;
            writeln!(
                out,
                "{:<6} {:>8} {:>6} {:<12} {:>6} {:>6}  condition",
                "time", "temp", "wind", "direction", "gust", "precip"
            )?;
        }
        previous = Some(key);

        let ts = sample.timestamp;
        let direction = chart
            .wind_arrows
            .iter()
            .find(|(_, series)| value_at(series, ts).is_some())
            .map(|(deg, _)| compass(*deg as f64))
            .unwrap_or_else(|| "-".to_string());
        let condition = chart
            .conditions
            .iter()
            .find(|c| c.timestamp == ts)
            .map(|c| {
                if c.icon.night {
                    format!("{} (night)", c.icon.code.label())
                } else {
                    c.icon.code.label().to_string()
                }
            })
            .unwrap_or_default();

        writeln!(
            out,
            "{:<6} {:>8} {:>6} {:<12} {:>6} {:>6}  {}",
            ts.with_timezone(tz).format("%H:%M").to_string(),
            format_temperature(sample.value, *flag == 1),
            format_optional(value_at(&chart.wind, ts)),
            direction,
            format_optional(value_at(&chart.wind_gust, ts)),
            format_optional(value_at(&chart.precipitation, ts)),
            condition,
        )?;
    }

    writeln!(out)?;
    writeln!(
        out,
        "{} labelled temperatures over {} day(s)",
        chart.labelled_temperatures().count(),
        chart.temperature_days(tz)
    )?;
    Ok(())
}

/// Render the report to the terminal.
pub fn draw_ascii<Tz>(chart: &ChartData, tz: &Tz) -> io::Result<()>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let stdout = io::stdout();
    let mut out = stdout.lock();
    render_report(&mut out, chart, tz)
}
