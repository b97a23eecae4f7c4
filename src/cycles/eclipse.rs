//! Solar/lunar eclipses (§4.7): Sun-Moon longitude alignment plus a
//! latitude-and-diameter test. Geocentric alignment only — no umbral/
//! penumbral classification, no observer-path geometry (§1 Non-goals).
//!
//! Both eclipse kinds reduce to the same symmetric-bounce discriminator
//! the conjunction/opposition aspects use: solar eclipse tracks how close
//! the Sun-Moon separation is to 0 degrees, lunar eclipse tracks how
//! close it is to 180. `AspectPhase::as_event_phase` relabels the
//! resulting forming/exact/dissolving into the beginning/maximum/ending
//! vocabulary eclipses use at the sink boundary.

use chrono::{DateTime, Utc};

use crate::catalog::Body;
use crate::discriminator::classify_symmetric;
use crate::ephemeris::EphemerisView;
use crate::events::{EclipseKind, EventKind, PointEvent};
use crate::math::{shortest_arc, Window3};

struct Samples {
    separation: Window3,
    combined_diameter: f64,
    latitude_offset: f64,
}

fn gather(
    ephemeris: &dyn EphemerisView,
    previous: DateTime<Utc>,
    current: DateTime<Utc>,
    next: DateTime<Utc>,
) -> Option<Samples> {
    let sep_at = |at: DateTime<Utc>| -> Option<f64> {
        Some(shortest_arc(
            ephemeris.longitude(Body::Sun, at).ok()?,
            ephemeris.longitude(Body::Moon, at).ok()?,
        ))
    };

    let separation = Window3::new(sep_at(previous)?, sep_at(current)?, sep_at(next)?);

    let combined_diameter = ephemeris.diameter(Body::Sun, current).ok()? + ephemeris.diameter(Body::Moon, current).ok()?;

    let latitude_offset = (ephemeris.latitude(Body::Moon, current).ok()? - ephemeris.latitude(Body::Sun, current).ok()?).abs();

    Some(Samples {
        separation,
        combined_diameter,
        latitude_offset,
    })
}

fn build_event(kind: EclipseKind, phase: crate::catalog::EventPhase, at: DateTime<Utc>) -> PointEvent {
    let event_kind = EventKind::Eclipse { kind, phase };
    let bodies = vec![Body::Sun, Body::Moon];
    let description = format!("{} {}", kind.title(), phase.title());
    let summary = format!("{} {}", phase.marker(), description);
    PointEvent {
        timestamp: at,
        categories: PointEvent::standard_categories(&event_kind, &bodies),
        kind: event_kind,
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
    if !bodies.contains(&Body::Sun) || !bodies.contains(&Body::Moon) {
        return Vec::new();
    }
    let Some(samples) = gather(ephemeris, previous, current, next) else {
        return Vec::new();
    };

    let mut events = Vec::new();

    if samples.latitude_offset < samples.combined_diameter {
        if let Some(phase) = classify_symmetric(samples.separation, samples.combined_diameter) {
            events.push(build_event(EclipseKind::Solar, phase.as_event_phase(), current));
        }
    }

    let opposition_deviation = Window3::new(
        180.0 - samples.separation.previous,
        180.0 - samples.separation.current,
        180.0 - samples.separation.next,
    );
    if samples.latitude_offset < samples.combined_diameter {
        if let Some(phase) = classify_symmetric(opposition_deviation, samples.combined_diameter) {
            events.push(build_event(EclipseKind::Lunar, phase.as_event_phase(), current));
        }
    }

    events
}
