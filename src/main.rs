//! # Astro-Calendar CLI
//!
//! Loads run configuration, fetches (or falls back to an analytic model
//! for) per-minute ephemeris samples over the configured window, runs the
//! detection pipeline, and writes the resulting events to stdout.

use std::env;
use std::io;
use std::sync::atomic::AtomicBool;

use chrono::{DateTime, Duration, Utc};

use astro_calendar_lib::config::DriverConfig;
use astro_calendar_lib::driver::{self, RunWindow};
use astro_calendar_lib::ephemeris::{self, MapEphemerisView};
use astro_calendar_lib::sink::{EventSink, LineSink};

fn minute_range(start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<DateTime<Utc>> {
    let mut minutes = Vec::new();
    let mut at = start;
    while at <= end {
        minutes.push(at);
        at += Duration::minutes(1);
    }
    minutes
}

/// Fetches ephemeris coverage for `[fetch_start, fetch_end]`, falling back
/// to the Sun/Moon-only analytic model on fetch failure (§1, §7:
/// `FetchFailure` is fatal for the run only when no cache and no fallback
/// cover the range — here the fallback always covers Sun/Moon, so the run
/// degrades rather than aborts).
async fn load_ephemeris(
    config: &DriverConfig,
    fetch_start: DateTime<Utc>,
    fetch_end: DateTime<Utc>,
) -> MapEphemerisView {
    match ephemeris::provider::fetch_range(&config.provider, &config.bodies, fetch_start, fetch_end).await {
        Ok(view) => view,
        Err(e) => {
            eprintln!("Ephemeris fetch failed: {}", e);
            eprintln!("Falling back to offline analytic model (Sun/Moon only)");
            ephemeris::fallback::approximate(&minute_range(fetch_start, fetch_end))
        }
    }
}

fn main() -> anyhow::Result<()> {
    let config_path = env::args().nth(1).unwrap_or_else(|| "astro-calendar.toml".to_string());
    let config = DriverConfig::load_from_path(&config_path);

    if !config.has_valid_timezone() {
        eprintln!("Warning: empty timezone in config; defaulting display to UTC");
    }

    // The driver needs one minute of padding on either side of the
    // configured window so the first and last minutes still get a
    // complete (previous, current, next) triple (§4.4).
    let fetch_start = config.start - Duration::minutes(1);
    let fetch_end = config.end + Duration::minutes(1);

    let rt = tokio::runtime::Runtime::new()?;
    let ephemeris_view = rt.block_on(load_ephemeris(&config, fetch_start, fetch_end));

    let window = RunWindow {
        start: config.start,
        end: config.end,
    };
    let cancel = AtomicBool::new(false);
    let result = driver::run(&ephemeris_view, &config.bodies, window, &cancel);

    eprintln!(
        "Detected {} point events and {} interval events ({} minutes with no Sun sample)",
        result.points.len(),
        result.intervals.len(),
        result.missing_sample_minutes,
    );

    let stdout = io::stdout();
    let mut sink = LineSink::new(stdout.lock());
    for point in result.points {
        sink.emit(point.into())?;
    }
    for interval in result.intervals {
        sink.emit(interval.into())?;
    }

    Ok(())
}
