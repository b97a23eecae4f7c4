//! Network-backed ephemeris provider: HTTP fetch plus a JSON file cache.
//!
//! The cache-first, fetch-on-stale strategy and the file-mtime TTL check
//! are the same shape as the tide-series fetcher this crate grew out of:
//! check the cache, return immediately if it is still fresh, otherwise go
//! to the network and write back what came down. The difference here is
//! that a missing network result is not automatically fatal — the caller
//! decides whether to fall back (§1).

use std::{fs, io, time::SystemTime};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EphemerisError, EphemerisSample, MapEphemerisView};
use crate::catalog::{Body, CATALOG_ORDER};

/// Configuration for the provider adapter (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    pub cache_path: String,
    pub cache_ttl_secs: u64,
    pub retry_attempts: u32,
    pub retry_backoff_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://ephemeris.example.invalid/api/positions".to_string(),
            cache_path: "/tmp/astro_calendar_ephemeris_cache.json".to_string(),
            cache_ttl_secs: 1800,
            retry_attempts: 3,
            retry_backoff_ms: 500,
            request_timeout_secs: 15,
        }
    }
}

/// One record as returned by the remote ephemeris API.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireSample {
    body: String,
    timestamp: DateTime<Utc>,
    longitude_deg: f64,
    #[serde(default)]
    latitude_deg: f64,
    #[serde(default = "default_distance")]
    distance: f64,
    #[serde(default)]
    illum_frac: Option<f64>,
    #[serde(default)]
    altitude_deg: Option<f64>,
    #[serde(default)]
    azimuth_deg: Option<f64>,
    #[serde(default)]
    diameter_deg: Option<f64>,
}

fn default_distance() -> f64 {
    1.0
}

#[derive(Debug, Serialize, Deserialize)]
struct WireResponse {
    positions: Vec<WireSample>,
}

/// What gets persisted to the cache file: the requested range plus the
/// samples that covered it, so a later run can tell whether the cache
/// actually answers its query before trusting it.
#[derive(Debug, Serialize, Deserialize)]
struct CacheFile {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    entries: Vec<(String, DateTime<Utc>, EphemerisSample)>,
}

fn body_from_wire_name(name: &str) -> Option<Body> {
    CATALOG_ORDER
        .iter()
        .copied()
        .find(|b| b.title().eq_ignore_ascii_case(name) || format!("{:?}", b).eq_ignore_ascii_case(name))
}

fn view_from_entries(entries: &[(String, DateTime<Utc>, EphemerisSample)]) -> MapEphemerisView {
    let mut view = MapEphemerisView::new();
    for (name, at, sample) in entries {
        if let Some(body) = body_from_wire_name(name) {
            view.insert(body, *at, *sample);
        }
    }
    view
}

/// Fetches ephemeris samples for `bodies` between `start` and `end`,
/// preferring a fresh cache over the network (§1, §6).
pub async fn fetch_range(
    config: &ProviderConfig,
    bodies: &[Body],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<MapEphemerisView, EphemerisError> {
    if let Ok(view) = load_cache(config, start, end) {
        return Ok(view);
    }

    let view = fetch_remote(config, bodies, start, end).await?;
    let _ = save_cache(config, start, end, &view);
    Ok(view)
}

async fn fetch_remote(
    config: &ProviderConfig,
    bodies: &[Body],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<MapEphemerisView, EphemerisError> {
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
        .build()
        .map_err(|e| EphemerisError::FetchFailure {
            reason: e.to_string(),
        })?;

    let body_names: Vec<&str> = bodies.iter().map(|b| b.title()).collect();

    let mut last_error = String::from("no attempts made");
    for attempt in 0..config.retry_attempts.max(1) {
        let result = client
            .get(&config.base_url)
            .query(&[
                ("start", start.to_rfc3339()),
                ("end", end.to_rfc3339()),
                ("bodies", body_names.join(",")),
            ])
            .send()
            .await;

        match result {
            Ok(response) => match response.json::<WireResponse>().await {
                Ok(wire) => {
                    let entries: Vec<_> = wire
                        .positions
                        .into_iter()
                        .map(|p| {
                            (
                                p.body,
                                p.timestamp,
                                EphemerisSample {
                                    longitude_deg: p.longitude_deg,
                                    latitude_deg: p.latitude_deg,
                                    distance: p.distance,
                                    illum_frac: p.illum_frac,
                                    altitude_deg: p.altitude_deg,
                                    azimuth_deg: p.azimuth_deg,
                                    diameter_deg: p.diameter_deg,
                                },
                            )
                        })
                        .collect();
                    if entries.is_empty() {
                        last_error = "empty response".to_string();
                    } else {
                        return Ok(view_from_entries(&entries));
                    }
                }
                Err(e) => last_error = format!("parse error: {e}"),
            },
            Err(e) => last_error = format!("request error: {e}"),
        }

        if attempt + 1 < config.retry_attempts.max(1) {
            tokio::time::sleep(std::time::Duration::from_millis(
                config.retry_backoff_ms * 2u64.pow(attempt),
            ))
            .await;
        }
    }

    Err(EphemerisError::FetchFailure {
        reason: last_error,
    })
}

fn load_cache(
    config: &ProviderConfig,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<MapEphemerisView, io::Error> {
    let meta = fs::metadata(&config.cache_path)?;
    let age = SystemTime::now()
        .duration_since(meta.modified()?)
        .map_err(|_| io::Error::other("time error"))?
        .as_secs();

    if age > config.cache_ttl_secs {
        return Err(io::Error::other("stale"));
    }

    let data = fs::read(&config.cache_path)?;
    let cache: CacheFile = serde_json::from_slice(&data)?;

    if cache.start > start || cache.end < end {
        return Err(io::Error::other("cache does not cover requested range"));
    }

    Ok(view_from_entries(&cache.entries))
}

fn save_cache(
    config: &ProviderConfig,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    view: &MapEphemerisView,
) -> Result<(), io::Error> {
    let entries: Vec<(String, DateTime<Utc>, EphemerisSample)> = view
        .iter()
        .map(|(body, at, sample)| (body.title().to_string(), at, sample))
        .collect();
    let cache = CacheFile {
        start,
        end,
        entries,
    };
    let data = serde_json::to_vec(&cache)?;
    fs::write(&config.cache_path, data)?;
    Ok(())
}
