//! Daily solar/lunar horizon cycle (§4.7): rise, set, zenith, nadir from
//! the elevation stream.
//!
//! Rise/set use the Sun's apparent radius (16 arcmin) as the horizon
//! threshold for *both* Sun and Moon — the source this spec was distilled
//! from does the same despite the Moon's own mean radius being slightly
//! smaller (~15 arcmin); §9's open question preserves that value as-is
//! rather than introducing a per-body radius no one asked for.

use chrono::{DateTime, Utc};

use crate::catalog::{Body, DAILY_CYCLE_ELIGIBLE};
use crate::ephemeris::EphemerisView;
use crate::events::{DailyCycleEvent, EventKind, PointEvent};
use crate::math::Window3;

/// Horizon threshold shared by Sun and Moon, in degrees (16 arcminutes).
const HORIZON_RADIUS_DEG: f64 = 16.0 / 60.0;

fn build_event(body: Body, event: DailyCycleEvent, at: DateTime<Utc>) -> PointEvent {
    let kind = EventKind::DailyCycle { body, event };
    let bodies = vec![body];
    let description = format!("{} {}", body.title(), event.title());
    let marker = match event {
        DailyCycleEvent::Rise => "\u{25B6}",  // ▶
        DailyCycleEvent::Set => "\u{25C0}",   // ◀
        DailyCycleEvent::Zenith | DailyCycleEvent::Nadir => "\u{1F3AF}", // 🎯
    };
    let summary = format!("{} {}", marker, description);
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
    let mut events = Vec::new();

    for &body in bodies {
        if !DAILY_CYCLE_ELIGIBLE.contains(&body) {
            continue;
        }

        let (Ok(elev_prev), Ok(elev_cur), Ok(elev_next)) = (
            ephemeris.elevation(body, previous),
            ephemeris.elevation(body, current),
            ephemeris.elevation(body, next),
        ) else {
            continue;
        };

        if elev_prev < -HORIZON_RADIUS_DEG && elev_cur >= -HORIZON_RADIUS_DEG {
            events.push(build_event(body, DailyCycleEvent::Rise, current));
        } else if elev_prev > -HORIZON_RADIUS_DEG && elev_cur <= -HORIZON_RADIUS_DEG {
            events.push(build_event(body, DailyCycleEvent::Set, current));
        }

        let window = Window3::new(elev_prev, elev_cur, elev_next);
        if window.is_maximum() {
            events.push(build_event(body, DailyCycleEvent::Zenith, current));
        } else if window.is_minimum() {
            events.push(build_event(body, DailyCycleEvent::Nadir, current));
        }
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

    fn sample_with_elevation(elev: f64) -> EphemerisSample {
        EphemerisSample {
            altitude_deg: Some(elev),
            ..Default::default()
        }
    }

    #[test]
    fn detects_rise_when_elevation_crosses_the_horizon_radius() {
        let mut eph = MapEphemerisView::new();
        for (minute, elev) in [(0, -0.5), (1, 0.1), (2, 0.5)] {
            eph.insert(Body::Sun, at(minute), sample_with_elevation(elev));
        }
        let events = detect(&eph, &[Body::Sun], at(0), at(1), at(2));
        assert!(events
            .iter()
            .any(|e| matches!(&e.kind, EventKind::DailyCycle { event: DailyCycleEvent::Rise, .. })));
    }

    #[test]
    fn detects_zenith_as_a_strict_local_maximum() {
        let mut eph = MapEphemerisView::new();
        for (minute, elev) in [(0, 60.0), (1, 61.0), (2, 60.5)] {
            eph.insert(Body::Moon, at(minute), sample_with_elevation(elev));
        }
        let events = detect(&eph, &[Body::Moon], at(0), at(1), at(2));
        assert!(events
            .iter()
            .any(|e| matches!(&e.kind, EventKind::DailyCycle { event: DailyCycleEvent::Zenith, .. })));
    }

    #[test]
    fn non_cycle_eligible_bodies_are_ignored() {
        let mut eph = MapEphemerisView::new();
        for minute in 0..3 {
            eph.insert(Body::Mars, at(minute), sample_with_elevation(10.0));
        }
        let events = detect(&eph, &[Body::Mars], at(0), at(1), at(2));
        assert!(events.is_empty());
    }
}
