//! Pairwise aspect detection (§4.5): for every body pair and every minute,
//! find the one aspect (if any) whose orb currently contains that pair's
//! angular separation, and classify its phase.
//!
//! The scalar fed to the discriminator is the same for every aspect:
//! `shortest_arc(lon_a, lon_b) - aspect.angle_degrees()`. For every aspect
//! except conjunction this is a signed deviation that crosses zero as the
//! pair's separation passes through the exact angle. For conjunction,
//! whose target angle is zero and whose separation can never go negative,
//! it is identically the unsigned separation itself — which is exactly the
//! quantity `discriminator::classify_symmetric` expects. One formula, two
//! interpretations, dispatched by `Aspect::is_symmetric_about_zero`.

use chrono::{DateTime, Utc};

use crate::catalog::{canonical_pair, Aspect, AspectPhase, Body, FAMILY_ORDER};
use crate::discriminator::classify;
use crate::ephemeris::EphemerisView;
use crate::events::{EventKind, PointEvent};
use crate::math::{combinations, shortest_arc, Window3};

struct LongitudeWindow {
    previous: f64,
    current: f64,
    next: f64,
}

fn sample_longitudes(
    ephemeris: &dyn EphemerisView,
    body: Body,
    previous: DateTime<Utc>,
    current: DateTime<Utc>,
    next: DateTime<Utc>,
) -> Option<LongitudeWindow> {
    let previous = ephemeris.sample(body, previous).ok()?.longitude_deg;
    let current = ephemeris.sample(body, current).ok()?.longitude_deg;
    let next = ephemeris.sample(body, next).ok()?.longitude_deg;
    Some(LongitudeWindow {
        previous,
        current,
        next,
    })
}

/// Builds the scalar window the discriminator classifies.
///
/// For every aspect this starts as `shortest_arc(a, b) - target`. Interior
/// aspects (target strictly between 0 and 180) use that value signed, since
/// the separation can cross the target from either side. Conjunction and
/// opposition sit at the boundaries of `shortest_arc`'s `[0, 180]` range, so
/// their raw deviation can only ever be non-negative (conjunction) or
/// non-positive (opposition) — it bounces rather than crosses. Taking the
/// absolute value folds both boundary cases into the same "distance from
/// target, bouncing at a minimum" shape that `classify_symmetric` expects.
fn deviation_window(a: &LongitudeWindow, b: &LongitudeWindow, aspect: Aspect) -> Window3 {
    let target = aspect.angle_degrees();
    let raw = Window3::new(
        shortest_arc(a.previous, b.previous) - target,
        shortest_arc(a.current, b.current) - target,
        shortest_arc(a.next, b.next) - target,
    );
    if aspect.is_symmetric_about_zero() {
        Window3::new(raw.previous.abs(), raw.current.abs(), raw.next.abs())
    } else {
        raw
    }
}

fn build_event(a: Body, b: Body, aspect: Aspect, phase: AspectPhase, at: DateTime<Utc>) -> PointEvent {
    let kind = EventKind::Aspect {
        pair: (a, b),
        aspect,
        phase,
    };
    let bodies = vec![a, b];
    let description = format!("{} {} {} {}", a.title(), phase.title(), aspect.title(), b.title());
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

/// Detects every in-orb aspect among `bodies` at `current`, using
/// `previous`/`next` to classify each hit's phase.
pub fn detect_aspects(
    ephemeris: &dyn EphemerisView,
    bodies: &[Body],
    previous: DateTime<Utc>,
    current: DateTime<Utc>,
    next: DateTime<Utc>,
) -> Vec<PointEvent> {
    let mut events = Vec::new();

    for pair_idx in combinations(bodies.len(), 2) {
        let (a, b) = canonical_pair(bodies[pair_idx[0]], bodies[pair_idx[1]]);

        let (window_a, window_b) = match (
            sample_longitudes(ephemeris, a, previous, current, next),
            sample_longitudes(ephemeris, b, previous, current, next),
        ) {
            (Some(wa), Some(wb)) => (wa, wb),
            _ => continue,
        };

        'families: for kind in FAMILY_ORDER {
            for &aspect in Aspect::in_kind(kind) {
                let window = deviation_window(&window_a, &window_b, aspect);
                if let Some(phase) = classify(window, aspect.orb_degrees(), aspect.is_symmetric_about_zero()) {
                    events.push(build_event(a, b, aspect, phase, current));
                    break 'families;
                }
            }
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephemeris::{EphemerisSample, MapEphemerisView};
    use chrono::TimeZone;

    fn sample(longitude_deg: f64) -> EphemerisSample {
        EphemerisSample {
            longitude_deg,
            distance: 1.0,
            ..Default::default()
        }
    }

    fn at(minute: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::minutes(minute)
    }

    #[test]
    fn detects_exact_opposition_at_zero_crossing() {
        let mut eph = MapEphemerisView::new();
        // Sun fixed at 0; Moon's separation from Sun passes through 180
        // across the window: 179 -> 180 -> 181.
        for (minute, moon_lon) in [(0, 179.0), (1, 180.0), (2, 181.0)] {
            eph.insert(Body::Sun, at(minute), sample(0.0));
            eph.insert(Body::Moon, at(minute), sample(moon_lon));
        }

        let events = detect_aspects(&eph, &[Body::Sun, Body::Moon], at(0), at(1), at(2));
        assert_eq!(events.len(), 1);
        match &events[0].kind {
            EventKind::Aspect { aspect, phase, .. } => {
                assert_eq!(*aspect, Aspect::Opposite);
                assert_eq!(*phase, AspectPhase::Exact);
            }
            _ => panic!("expected an aspect event"),
        }
    }

    #[test]
    fn detects_conjunction_bouncing_at_local_minimum() {
        let mut eph = MapEphemerisView::new();
        for (minute, moon_lon) in [(0, 2.0), (1, 0.5), (2, 1.5)] {
            eph.insert(Body::Sun, at(minute), sample(0.0));
            eph.insert(Body::Moon, at(minute), sample(moon_lon));
        }

        let events = detect_aspects(&eph, &[Body::Sun, Body::Moon], at(0), at(1), at(2));
        assert_eq!(events.len(), 1);
        match &events[0].kind {
            EventKind::Aspect { aspect, phase, .. } => {
                assert_eq!(*aspect, Aspect::Conjunct);
                assert_eq!(*phase, AspectPhase::Exact);
            }
            _ => panic!("expected a conjunction event"),
        }
    }

    #[test]
    fn missing_sample_skips_pair_without_panicking() {
        let eph = MapEphemerisView::new();
        let events = detect_aspects(&eph, &[Body::Sun, Body::Moon], at(0), at(1), at(2));
        assert!(events.is_empty());
    }

    #[test]
    fn out_of_orb_pair_produces_no_event() {
        let mut eph = MapEphemerisView::new();
        for minute in 0..3 {
            eph.insert(Body::Sun, at(minute), sample(0.0));
            eph.insert(Body::Mars, at(minute), sample(20.0));
        }
        let events = detect_aspects(&eph, &[Body::Sun, Body::Mars], at(0), at(1), at(2));
        assert!(events.is_empty());
    }
}
