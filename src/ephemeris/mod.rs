//! Ephemeris data access (§4.3): a trait every detector programs against,
//! plus the two implementations that can satisfy it — a network-backed
//! provider with a JSON cache, and a low-precision analytic fallback for
//! when the network is unavailable.
//!
//! Detectors never know which implementation they're reading from. They
//! take `&dyn EphemerisView`, ask for one `(Body, minute)` sample at a
//! time, and treat a missing sample as recoverable (§7): skip that body at
//! that minute rather than aborting the run.

pub mod fallback;
pub mod provider;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::catalog::Body;

/// One body's instantaneous geocentric position (and, where meaningful,
/// illumination, distance, and angular size) at a single minute.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EphemerisSample {
    pub longitude_deg: f64,
    pub latitude_deg: f64,
    /// Geocentric distance, in AU for heliocentric-family bodies and Earth
    /// radii for the Moon — only meaningful for [`Body::is_apsis_eligible`]
    /// bodies, and only compared against other samples of the same body, so
    /// the unit does not need to be uniform across bodies.
    pub distance: f64,
    /// Illuminated fraction in `[0, 1]`, present only for
    /// [`Body::is_illumination_eligible`] bodies.
    pub illum_frac: Option<f64>,
    /// Topocentric altitude above the observer's horizon, in degrees.
    /// Present only for `Body::DAILY_CYCLE_ELIGIBLE` bodies (Sun, Moon),
    /// and only meaningful relative to the observer coordinates the
    /// sample was computed for.
    pub altitude_deg: Option<f64>,
    /// Topocentric azimuth, degrees clockwise from north. Present only
    /// alongside `altitude_deg`; the core never computes against it
    /// directly (no detector in §4.7 keys off azimuth) but it is part of
    /// the ephemeris view's contracted surface (§4.3) and carried through
    /// for sink-layer display.
    pub azimuth_deg: Option<f64>,
    /// Apparent angular diameter, in degrees. Present only for
    /// [`Body::is_diameter_eligible`] bodies (Sun, Moon); the eclipse
    /// detector's combined-semidiameter test (§4.7) is the only consumer.
    pub diameter_deg: Option<f64>,
}

impl Default for EphemerisSample {
    fn default() -> Self {
        Self {
            longitude_deg: 0.0,
            latitude_deg: 0.0,
            distance: 0.0,
            illum_frac: None,
            altitude_deg: None,
            azimuth_deg: None,
            diameter_deg: None,
        }
    }
}

/// Observer location (§9: a cosmetic/request-parameter concept, not a
/// full location model). Longitude is east-positive degrees.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
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

/// Ephemeris lookup failures (§7).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EphemerisError {
    /// No sample for this body at this minute. Recoverable: the calling
    /// detector skips this body at this minute and continues.
    #[error("no ephemeris sample for {body:?} at {at}")]
    MissingSample { body: Body, at: DateTime<Utc> },

    /// The sample exists but the requested field is not populated for this
    /// body (e.g. illumination on a body outside
    /// [`Body::is_illumination_eligible`]). Recoverable in the same way as
    /// `MissingSample`.
    #[error("ephemeris field {field} missing for {body:?} at {at}")]
    MissingField {
        body: Body,
        at: DateTime<Utc>,
        field: &'static str,
    },

    /// The provider adapter could not reach or parse the remote source and
    /// no usable cache exists. Fatal for bodies the fallback model does not
    /// cover (everything except Sun and Moon, per §1).
    #[error("ephemeris fetch failed: {reason}")]
    FetchFailure { reason: String },

    /// The cache file exists but does not cover the requested time range.
    #[error("ephemeris cache incomplete for requested range")]
    CacheIncomplete,
}

/// What every detector programs against: a minute-addressable table of
/// body positions, regardless of how it was populated.
///
/// The seven named operations of §4.3 are default methods over `sample`:
/// every one fails with a field-identifying error if the underlying sample
/// is missing, or if the sample exists but leaves that particular field
/// unset.
pub trait EphemerisView {
    fn sample(&self, body: Body, at: DateTime<Utc>) -> Result<EphemerisSample, EphemerisError>;

    fn longitude(&self, body: Body, at: DateTime<Utc>) -> Result<f64, EphemerisError> {
        Ok(self.sample(body, at)?.longitude_deg)
    }

    fn latitude(&self, body: Body, at: DateTime<Utc>) -> Result<f64, EphemerisError> {
        Ok(self.sample(body, at)?.latitude_deg)
    }

    fn azimuth(&self, body: Body, at: DateTime<Utc>) -> Result<f64, EphemerisError> {
        self.sample(body, at)?.azimuth_deg.ok_or(EphemerisError::MissingField {
            body,
            at,
            field: "azimuth",
        })
    }

    fn elevation(&self, body: Body, at: DateTime<Utc>) -> Result<f64, EphemerisError> {
        self.sample(body, at)?.altitude_deg.ok_or(EphemerisError::MissingField {
            body,
            at,
            field: "elevation",
        })
    }

    fn illumination(&self, body: Body, at: DateTime<Utc>) -> Result<f64, EphemerisError> {
        self.sample(body, at)?.illum_frac.ok_or(EphemerisError::MissingField {
            body,
            at,
            field: "illumination",
        })
    }

    fn distance(&self, body: Body, at: DateTime<Utc>) -> Result<f64, EphemerisError> {
        Ok(self.sample(body, at)?.distance)
    }

    fn diameter(&self, body: Body, at: DateTime<Utc>) -> Result<f64, EphemerisError> {
        self.sample(body, at)?.diameter_deg.ok_or(EphemerisError::MissingField {
            body,
            at,
            field: "diameter",
        })
    }
}

/// An `EphemerisView` backed by a plain in-memory table, built once per run
/// from either the provider adapter or the fallback model. No interior
/// mutability: the table is complete before detection starts.
#[derive(Debug, Clone, Default)]
pub struct MapEphemerisView {
    samples: HashMap<(Body, DateTime<Utc>), EphemerisSample>,
}

impl MapEphemerisView {
    pub fn new() -> Self {
        Self {
            samples: HashMap::new(),
        }
    }

    pub fn insert(&mut self, body: Body, at: DateTime<Utc>, sample: EphemerisSample) {
        self.samples.insert((body, at), sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Merges another view's samples in, overwriting on key collision.
    /// Used to layer fallback Sun/Moon samples under provider gaps, or vice
    /// versa, without detectors needing to know two sources exist.
    pub fn merge(&mut self, other: MapEphemerisView) {
        self.samples.extend(other.samples);
    }

    /// Iterates every `(body, minute, sample)` entry, for cache
    /// serialization.
    pub fn iter(&self) -> impl Iterator<Item = (Body, DateTime<Utc>, EphemerisSample)> + '_ {
        self.samples
            .iter()
            .map(|(&(body, at), &sample)| (body, at, sample))
    }
}

impl EphemerisView for MapEphemerisView {
    fn sample(&self, body: Body, at: DateTime<Utc>) -> Result<EphemerisSample, EphemerisError> {
        self.samples
            .get(&(body, at))
            .copied()
            .ok_or(EphemerisError::MissingSample { body, at })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample(longitude_deg: f64) -> EphemerisSample {
        EphemerisSample {
            longitude_deg,
            distance: 1.0,
            ..Default::default()
        }
    }

    #[test]
    fn missing_sample_is_recoverable_not_panicking() {
        let view = MapEphemerisView::new();
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let err = view.sample(Body::Mars, at).unwrap_err();
        assert!(matches!(err, EphemerisError::MissingSample { .. }));
    }

    #[test]
    fn field_accessor_fails_when_field_unset_but_sample_present() {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut view = MapEphemerisView::new();
        view.insert(Body::Jupiter, at, sample(10.0));

        let err = view.illumination(Body::Jupiter, at).unwrap_err();
        assert!(matches!(
            err,
            EphemerisError::MissingField { field: "illumination", .. }
        ));
        assert_eq!(view.longitude(Body::Jupiter, at).unwrap(), 10.0);
    }

    #[test]
    fn merge_overwrites_on_collision() {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut base = MapEphemerisView::new();
        base.insert(Body::Sun, at, sample(10.0));

        let mut overlay = MapEphemerisView::new();
        overlay.insert(Body::Sun, at, sample(20.0));

        base.merge(overlay);
        assert_eq!(base.sample(Body::Sun, at).unwrap().longitude_deg, 20.0);
    }
}
