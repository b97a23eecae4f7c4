//! Monthly lunar phase (§4.7): new/full moon from illumination extrema,
//! first/last quarter from the half-illumination crossing.
//!
//! New moon and full moon reuse the discriminator's symmetric ("bouncing")
//! shape: illumination can never go below 0 or above 1, so each extremum
//! behaves exactly like the conjunction/opposition boundary case in
//! `discriminator::classify_symmetric` — distance-from-target decreases to
//! a minimum and increases again, rather than crossing through zero. The
//! quarters sit at an interior target (0.5) that illumination genuinely
//! crosses from both directions, so they use `classify_signed` instead,
//! with the crossing direction (waxing vs waning) distinguishing first
//! quarter from last.

use chrono::{DateTime, Utc};

use crate::catalog::{AspectPhase, Body};
use crate::discriminator::{classify_signed, classify_symmetric};
use crate::ephemeris::EphemerisView;
use crate::events::{EventKind, LunarPhaseName, PointEvent};
use crate::math::Window3;

/// Tolerance around full/new (illumination 0 or 1) for the extrema tests.
/// Not named in the catalog; the spec leaves the orb unspecified for
/// lunar phase, so a value an order of magnitude tighter than the
/// quarter orb is used here (see DESIGN.md).
const EXTREMUM_ORB: f64 = 0.02;

/// Tolerance around the half-illuminated quarters.
const QUARTER_ORB: f64 = 0.05;

fn illumination_window(
    ephemeris: &dyn EphemerisView,
    previous: DateTime<Utc>,
    current: DateTime<Utc>,
    next: DateTime<Utc>,
) -> Option<Window3> {
    let p = ephemeris.illumination(Body::Moon, previous).ok()?;
    let c = ephemeris.illumination(Body::Moon, current).ok()?;
    let n = ephemeris.illumination(Body::Moon, next).ok()?;
    Some(Window3::new(p, c, n))
}

fn build_event(phase_name: LunarPhaseName, phase: AspectPhase, at: DateTime<Utc>) -> PointEvent {
    let kind = EventKind::LunarPhase { phase_name, phase };
    let bodies = vec![Body::Moon];
    let description = format!("Moon {} {}", phase.title(), phase_name.title());
    let summary = format!("{} {}", phase.marker(), description);
    PointEvent {
        timestamp: at,
        categories: PointEvent::standard_categories(&kind, &bodies),
        kind,
        bodies,
        summary,
        description,
    }
}

pub fn detect(
    ephemeris: &dyn EphemerisView,
    bodies: &[Body],
    previous: DateTime<Utc>,
    current: DateTime<Utc>,
    next: DateTime<Utc>,
) -> Vec<PointEvent> {
    if !bodies.contains(&Body::Moon) {
        return Vec::new();
    }
    let Some(illum) = illumination_window(ephemeris, previous, current, next) else {
        return Vec::new();
    };

    let mut events = Vec::new();

    let new_moon_window = Window3::new(illum.previous, illum.current, illum.next);
    if let Some(phase) = classify_symmetric(new_moon_window, EXTREMUM_ORB) {
        events.push(build_event(LunarPhaseName::NewMoon, phase, current));
    }

    let full_moon_window = Window3::new(1.0 - illum.previous, 1.0 - illum.current, 1.0 - illum.next);
    if let Some(phase) = classify_symmetric(full_moon_window, EXTREMUM_ORB) {
        events.push(build_event(LunarPhaseName::FullMoon, phase, current));
    }

    let quarter_deviation = Window3::new(
        illum.previous - 0.5,
        illum.current - 0.5,
        illum.next - 0.5,
    );
    if let Some(phase) = classify_signed(quarter_deviation, QUARTER_ORB) {
        let waxing = illum.next >= illum.previous;
        let phase_name = if waxing {
            LunarPhaseName::FirstQuarter
        } else {
            LunarPhaseName::LastQuarter
        };
        events.push(build_event(phase_name, phase, current));
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephemeris::{EphemerisSample, MapEphemerisView};
    use chrono::TimeZone;

    fn at(minute: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::minutes(minute)
    }

    fn sample_with_illum(illum: f64) -> EphemerisSample {
        EphemerisSample {
            illum_frac: Some(illum),
            ..Default::default()
        }
    }

    #[test]
    fn detects_full_moon_at_illumination_peak() {
        let mut eph = MapEphemerisView::new();
        for (minute, illum) in [(0, 0.97), (1, 0.995), (2, 0.98)] {
            eph.insert(Body::Moon, at(minute), sample_with_illum(illum));
        }
        let events = detect(&eph, &[Body::Moon], at(0), at(1), at(2));
        assert!(events.iter().any(|e| matches!(
            &e.kind,
            EventKind::LunarPhase {
                phase_name: LunarPhaseName::FullMoon,
                phase: AspectPhase::Exact,
            }
        )));
    }

    #[test]
    fn detects_new_moon_at_illumination_trough() {
        let mut eph = MapEphemerisView::new();
        for (minute, illum) in [(0, 0.015), (1, 0.002), (2, 0.01)] {
            eph.insert(Body::Moon, at(minute), sample_with_illum(illum));
        }
        let events = detect(&eph, &[Body::Moon], at(0), at(1), at(2));
        assert!(events.iter().any(|e| matches!(
            &e.kind,
            EventKind::LunarPhase {
                phase_name: LunarPhaseName::NewMoon,
                phase: AspectPhase::Exact,
            }
        )));
    }

    #[test]
    fn waxing_crossing_is_first_quarter() {
        let mut eph = MapEphemerisView::new();
        for (minute, illum) in [(0, 0.4), (1, 0.49), (2, 0.58)] {
            eph.insert(Body::Moon, at(minute), sample_with_illum(illum));
        }
        let events = detect(&eph, &[Body::Moon], at(0), at(1), at(2));
        assert!(events.iter().any(|e| matches!(
            &e.kind,
            EventKind::LunarPhase {
                phase_name: LunarPhaseName::FirstQuarter,
                ..
            }
        )));
    }

    #[test]
    fn waning_crossing_is_last_quarter() {
        let mut eph = MapEphemerisView::new();
        for (minute, illum) in [(0, 0.58), (1, 0.49), (2, 0.4)] {
            eph.insert(Body::Moon, at(minute), sample_with_illum(illum));
        }
        let events = detect(&eph, &[Body::Moon], at(0), at(1), at(2));
        assert!(events.iter().any(|e| matches!(
            &e.kind,
            EventKind::LunarPhase {
                phase_name: LunarPhaseName::LastQuarter,
                ..
            }
        )));
    }

    #[test]
    fn bodies_without_moon_yield_no_events() {
        let eph = MapEphemerisView::new();
        let events = detect(&eph, &[Body::Sun], at(0), at(1), at(2));
        assert!(events.is_empty());
    }
}
