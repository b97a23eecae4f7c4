//! Low-precision analytic fallback for when the network provider is
//! unreachable and no cache is usable (§1).
//!
//! Only the Sun and the Moon get a fallback model. Every other catalog body
//! has no compact closed-form low-precision series worth carrying here, so
//! a provider outage that also misses cache leaves them absent from the
//! ephemeris view — the next detector stage sees `MissingSample` and skips
//! them for that minute (§7), same as any other gap.
//!
//! The lunar model is Schaefer's 1985/1994 routine (Sky & Telescope BASIC
//! "MOONFX.BAS"), accurate to within a few degrees — ample for a minute-
//! resolution event detector that is already working from whole-degree
//! orbs. The solar model is the standard low-precision series (mean
//! longitude plus the equation of center, good to about a tenth of a
//! degree), paired here because the event detectors need Sun alongside
//! Moon for lunar phase, eclipses, and the Sun/Moon daily cycles.

use core::f64::consts::PI;

use chrono::{DateTime, Datelike, Timelike, Utc};

use super::{EphemerisSample, MapEphemerisView};
use crate::catalog::Body;
use crate::math::normalize_degrees;

/// Everything Schaefer's 1994 routine computes for a given date.
#[derive(Debug, Clone, Copy, PartialEq)]
struct LunarEphemeris {
    illum_frac: f64,
    distance_er: f64,
    lon_deg: f64,
    lat_deg: f64,
}

/// Schaefer's low-precision lunar ephemeris for a proleptic-Gregorian
/// year/month/day, where `day` may carry a fractional part (UTC noon =
/// `.5`).
fn schaefer_moon(year: i32, month: u32, day: f64) -> LunarEphemeris {
    let (mut y, mut m) = (year, month as i32);
    if m < 3 {
        y -= 1;
        m += 12;
    }
    m += 1;

    let days = (365.25 * y as f64).floor() + (30.6 * m as f64).floor() + day - 694_039.09;

    let mut jd_norm = days / 29.530_588_2;
    jd_norm -= jd_norm.floor();

    let age_days = jd_norm * 29.530_588_2;
    let illum_frac = (1.0 - (age_days - 14.765_294_1).abs() / 14.765_294_1).clamp(0.0, 1.0);

    fn frac(mut v: f64) -> f64 {
        v -= v.floor();
        if v < 0.0 {
            v + 1.0
        } else {
            v
        }
    }

    let dp = frac((days + 245_1550.1 - 245_1562.2) / 27.554_549_88) * 2.0 * PI;
    let distance_er = 60.4
        - 3.3 * (dp).cos()
        - 0.6 * ((2.0 * jd_norm * 2.0 * PI) - dp).cos()
        - 0.5 * (2.0 * jd_norm * 2.0 * PI).cos();

    let np = frac((days + 245_1550.1 - 245_1565.2) / 27.212_220_817) * 2.0 * PI;
    let lat_deg = 5.1 * np.sin();

    let rp = frac((days + 245_1550.1 - 245_1555.8) / 27.321_582_241);
    let lon_deg = normalize_degrees(
        360.0 * rp
            + 6.3 * (dp).sin()
            + 1.3 * ((2.0 * jd_norm * 2.0 * PI) - dp).sin()
            + 0.7 * (2.0 * jd_norm * 2.0 * PI).sin(),
    );

    LunarEphemeris {
        illum_frac,
        distance_er,
        lon_deg,
        lat_deg,
    }
}

/// Low-precision solar ecliptic longitude and Earth-Sun distance (AU), via
/// mean longitude plus the equation of center. Ecliptic latitude is taken
/// as exactly zero, the Sun's latitude by construction of the ecliptic
/// frame.
fn low_precision_sun(at: DateTime<Utc>) -> (f64, f64) {
    let j2000 = DateTime::parse_from_rfc3339("2000-01-01T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc);
    let n = (at - j2000).num_seconds() as f64 / 86_400.0;

    let mean_longitude = normalize_degrees(280.460 + 0.985_647_4 * n);
    let mean_anomaly_deg = normalize_degrees(357.528 + 0.985_600_3 * n);
    let g = mean_anomaly_deg.to_radians();

    let lambda = normalize_degrees(mean_longitude + 1.915 * g.sin() + 0.020 * (2.0 * g).sin());
    let distance_au = 1.000_14 - 0.016_71 * g.cos() - 0.000_14 * (2.0 * g).cos();

    (lambda, distance_au)
}

fn day_of_month_with_fraction(at: DateTime<Utc>) -> f64 {
    at.day() as f64
        + (at.hour() as f64 * 3600.0 + at.minute() as f64 * 60.0 + at.second() as f64) / 86_400.0
}

/// Mean apparent angular diameter of the Sun as seen from Earth, in
/// degrees (the fallback model does not vary this with the Earth-Sun
/// distance, unlike the provider's real ephemeris).
const SUN_MEAN_DIAMETER_DEG: f64 = 0.533;

/// Mean apparent angular diameter of the Moon as seen from Earth, in
/// degrees.
const MOON_MEAN_DIAMETER_DEG: f64 = 0.518;

/// Builds a fallback ephemeris view for the Sun and Moon across every
/// minute in `minutes`. Bodies other than Sun/Moon are simply absent.
pub fn approximate(minutes: &[DateTime<Utc>]) -> MapEphemerisView {
    let mut view = MapEphemerisView::new();

    for &at in minutes {
        let (sun_lon, sun_distance) = low_precision_sun(at);
        view.insert(
            Body::Sun,
            at,
            EphemerisSample {
                longitude_deg: sun_lon,
                distance: sun_distance,
                diameter_deg: Some(SUN_MEAN_DIAMETER_DEG),
                ..Default::default()
            },
        );

        let day = day_of_month_with_fraction(at);
        let moon = schaefer_moon(at.year(), at.month(), day);
        view.insert(
            Body::Moon,
            at,
            EphemerisSample {
                longitude_deg: moon.lon_deg,
                latitude_deg: moon.lat_deg,
                distance: moon.distance_er,
                illum_frac: Some(moon.illum_frac),
                diameter_deg: Some(MOON_MEAN_DIAMETER_DEG),
                ..Default::default()
            },
        );
    }

    view
}
