//! # Forecast Chart Application Entry Point
//!
//! Loads a forecast document (or a set of daily observation documents), assembles
//! the chart data in the configured time zone and prints it as a text report.
//!
//! ```text
//! forecast-chart [--config PATH] [--observations] [FILE...]
//! ```
//!
//! Files given on the command line replace the configured source paths.
//! Logging goes to stderr and is controlled with `RUST_LOG` (default `info`).


use anyhow::Context;
use chrono::Utc;
use forecast_chart_lib::chart::ChartData;
use forecast_chart_lib::config::{Config, SourceMode};
use forecast_chart_lib::forecast::{self, ForecastDocument, ObservationDocument};
use forecast_chart_lib::renderer::draw_ascii;
use std::env;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Command line options.
#[derive(Debug, Default, PartialEq)]
struct Args {
    config: Option<PathBuf>,
    observations: bool,
    files: Vec<PathBuf>,
}

fn parse_args<I>(args: I) -> anyhow::Result<Args>
where
    I: IntoIterator<Item = String>,
{
    let mut parsed = Args::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args.next().context("--config needs a path")?;
                parsed.config = Some(PathBuf::from(path));
            }
            "--observations" => parsed.observations = true,
            flag if flag.starts_with("--") => anyhow::bail!("unknown option {flag}"),
            file => parsed.files.push(PathBuf::from(file)),
        }
    }
    Ok(parsed)
}

/// Read the document(s) named by `args`, falling back to the configured source.
fn load_document(args: &Args, config: &Config) -> anyhow::Result<ForecastDocument> {
    let paths = if args.files.is_empty() {
        &config.source.paths
    } else {
        &args.files
    };
    let observations = args.observations || config.source.mode == SourceMode::Observations;

    if !observations {
        let path = paths.first().context("no forecast document given")?;
        tracing::info!(path = %path.display(), "loading forecast");
        return ForecastDocument::load(path)
            .with_context(|| format!("loading forecast {}", path.display()));
    }

    let documents = paths
        .iter()
        .map(|path| {
            tracing::info!(path = %path.display(), "loading observations");
            ObservationDocument::load(path)
                .with_context(|| format!("loading observations {}", path.display()))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    let merged = forecast::merge_observations(documents)?;
    Ok(forecast::observations_to_forecast(merged)?)
}

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let args = parse_args(env::args().skip(1))?;
    let config = match &args.config {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    };
    let tz = config.chart.tz()?;

    let doc = load_document(&args, &config)?;
    let options = config.chart.options()?;
    let chart = ChartData::build(&doc, &tz, options, Utc::now());
    draw_ascii(&chart, &tz).context("writing report")?;
    Ok(())
}
