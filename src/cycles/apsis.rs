//! Apsides (§4.7): local extrema of geocentric distance. Heliocentric
//! naming (perihelion/aphelion) for every eligible body except the Moon,
//! which gets its own geocentric names (perigee/apogee) via
//! `ApsisEvent::for_body`.
//!
//! Distance extrema are a direct application of `Window3::is_maximum`/
//! `is_minimum` — no target/orb is involved, unlike every other detector
//! in this crate, since an apsis is defined purely by the shape of the
//! distance curve rather than proximity to a fixed value.

use chrono::{DateTime, Utc};

use crate::catalog::Body;
use crate::ephemeris::EphemerisView;
use crate::events::{ApsisEvent, EventKind, PointEvent};
use crate::math::Window3;

fn build_event(body: Body, event: ApsisEvent, at: DateTime<Utc>) -> PointEvent {
    let kind = EventKind::Apsis { body, event };
    let bodies = vec![body];
    let description = format!("{} {}", body.title(), event.title());
    PointEvent {
        timestamp: at,
        categories: PointEvent::standard_categories(&kind, &bodies),
        kind,
        bodies,
        summary: format!("\u{1F3AF} {}", description),
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
        if !body.is_apsis_eligible() {
            continue;
        }

        let (Ok(d_prev), Ok(d_cur), Ok(d_next)) = (
            ephemeris.distance(body, previous),
            ephemeris.distance(body, current),
            ephemeris.distance(body, next),
        ) else {
            continue;
        };

        let window = Window3::new(d_prev, d_cur, d_next);
        if window.is_minimum() {
            events.push(build_event(body, ApsisEvent::for_body(body, true), current));
        } else if window.is_maximum() {
            events.push(build_event(body, ApsisEvent::for_body(body, false), current));
        }
    }

    events
}
