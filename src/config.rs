//! Driver configuration (§6), loaded from a TOML file the same way the
//! teacher crate this grew out of loads its own config: `load_from_path`
//! falls back to `Default::default()` with a logged warning on a missing
//! or invalid file, never a hard failure at startup.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ephemeris::provider::ProviderConfig;

/// Observer coordinates (§6): longitude is east-positive degrees. Feeds
/// only the ephemeris provider's request parameters — the core never
/// branches on these directly.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Coordinates {
    pub longitude_deg: f64,
    pub latitude_deg: f64,
}

impl Default for Coordinates {
    /// Greenwich, for a deterministic default when no station is
    /// configured.
    fn default() -> Self {
        Self {
            longitude_deg: 0.0,
            latitude_deg: 51.4769,
        }
    }
}

/// The run window and observer parameters a single invocation of the
/// driver consumes (§6). `timezone` is validated only for non-emptiness
/// (§9 Open Question: it is cosmetic — log lines and output file names
/// only, never detection math) — this crate does not depend on
/// `chrono-tz` to parse it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DriverConfig {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub coordinates: Coordinates,
    pub timezone: String,
    pub bodies: Vec<crate::catalog::Body>,
    pub provider: ProviderConfig,
}

impl Default for DriverConfig {
    fn default() -> Self {
        let start = Utc::now()
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc();
        Self {
            start,
            end: start + chrono::Duration::days(7),
            coordinates: Coordinates::default(),
            timezone: "UTC".to_string(),
            bodies: crate::catalog::CATALOG_ORDER.to_vec(),
            provider: ProviderConfig::default(),
        }
    }
}

impl DriverConfig {
    /// Loads configuration from `path`. Falls back to
    /// `Default::default()`, with a logged warning, if the file is absent
    /// or fails to parse — the same non-fatal-startup contract the
    /// teacher's `Config::load_from_path` uses.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str::<DriverConfig>(&contents) {
                Ok(config) => {
                    println!(
                        "Loaded configuration: window {} to {}, timezone {}",
                        config.start, config.end, config.timezone
                    );
                    config
                }
                Err(e) => {
                    eprintln!("Warning: invalid config file format: {}", e);
                    eprintln!("Using default configuration (7-day window from today, Greenwich)");
                    Self::default()
                }
            },
            Err(_) => {
                eprintln!("Info: no config file found, using default configuration");
                Self::default()
            }
        }
    }

    /// True if `timezone` is non-empty; the only validation this cosmetic
    /// field gets (§9).
    pub fn has_valid_timezone(&self) -> bool {
        !self.timezone.trim().is_empty()
    }
}
