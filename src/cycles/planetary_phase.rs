//! Mercury/Venus/Mars phase events (§4.7): inferior/superior conjunction,
//! greatest elongation, heliacal rise/set, greatest brightness — all
//! derived from elongation from the Sun, illumination, and distance.
//!
//! Elongation here is the *signed* longitude difference (planet minus
//! Sun), normalized to `(-180, 180]` via `normalize_for_comparison`:
//! positive is east of the Sun (an evening object), negative is west (a
//! morning object). Conjunction, elongation extrema, and the heliacal
//! threshold crossing are each just another instance of the three-sample
//! discriminator, reused with a different target/orb per event.

use chrono::{DateTime, Utc};

use crate::catalog::{Body, PLANETARY_PHASE_ELIGIBLE};
use crate::discriminator::classify_symmetric;
use crate::ephemeris::EphemerisView;
use crate::events::{EventKind, PlanetaryPhaseEvent, PointEvent, SolarElongationSide};
use crate::math::{normalize_for_comparison, Window3};

/// Civil-twilight elongation threshold for heliacal rise/set, in degrees.
const HELIACAL_THRESHOLD_DEG: f64 = 6.0;

/// Tolerance for the conjunction/greatest-elongation extremum tests.
const EXTREMUM_ORB_DEG: f64 = 1.0;

struct PhaseWindow {
    elongation: Window3,
    distance: Window3,
    brightness: Window3,
}

fn side_of(elongation_deg: f64) -> SolarElongationSide {
    if elongation_deg >= 0.0 {
        SolarElongationSide::Eastern
    } else {
        SolarElongationSide::Western
    }
}

fn sample_window(
    ephemeris: &dyn EphemerisView,
    body: Body,
    previous: DateTime<Utc>,
    current: DateTime<Utc>,
    next: DateTime<Utc>,
) -> Option<PhaseWindow> {
    let sun_lon = |at| ephemeris.longitude(Body::Sun, at).ok();
    let body_lon = |at| ephemeris.longitude(body, at).ok();

    let elongation_at = |at: DateTime<Utc>| -> Option<f64> {
        let sun = sun_lon(at)?;
        let planet = body_lon(at)?;
        Some(normalize_for_comparison(planet, sun) - sun)
    };

    let elongation = Window3::new(
        elongation_at(previous)?,
        elongation_at(current)?,
        elongation_at(next)?,
    );

    let distance = Window3::new(
        ephemeris.distance(body, previous).ok()?,
        ephemeris.distance(body, current).ok()?,
        ephemeris.distance(body, next).ok()?,
    );

    let brightness_at = |at: DateTime<Utc>| -> Option<f64> {
        let illum = ephemeris.illumination(body, at).ok()?;
        let distance = ephemeris.distance(body, at).ok()?;
        if distance <= 0.0 {
            return None;
        }
        Some(illum / (distance * distance))
    };

    let brightness = Window3::new(
        brightness_at(previous)?,
        brightness_at(current)?,
        brightness_at(next)?,
    );

    Some(PhaseWindow {
        elongation,
        distance,
        brightness,
    })
}

fn build_event(body: Body, event: PlanetaryPhaseEvent, at: DateTime<Utc>) -> PointEvent {
    let kind = EventKind::PlanetaryPhase { body, event };
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
        if !PLANETARY_PHASE_ELIGIBLE.contains(&body) {
            continue;
        }
        let Some(window) = sample_window(ephemeris, body, previous, current, next) else {
            continue;
        };

        // Conjunction: elongation magnitude bounces off zero. Whether it's
        // inferior or superior is read off the concurrent distance trend:
        // a simultaneous distance minimum puts the planet between Earth
        // and the Sun (inferior); a simultaneous maximum puts it beyond
        // the Sun (superior).
        let magnitude = Window3::new(
            window.elongation.previous.abs(),
            window.elongation.current.abs(),
            window.elongation.next.abs(),
        );
        if classify_symmetric(magnitude, EXTREMUM_ORB_DEG) == Some(crate::catalog::AspectPhase::Exact) {
            if window.distance.is_minimum() {
                events.push(build_event(body, PlanetaryPhaseEvent::InferiorConjunction, current));
            } else if window.distance.is_maximum() {
                events.push(build_event(body, PlanetaryPhaseEvent::SuperiorConjunction, current));
            }
        }

        if window.elongation.is_maximum() {
            events.push(build_event(
                body,
                PlanetaryPhaseEvent::GreatestElongation(SolarElongationSide::Eastern),
                current,
            ));
        } else if window.elongation.is_minimum() {
            events.push(build_event(
                body,
                PlanetaryPhaseEvent::GreatestElongation(SolarElongationSide::Western),
                current,
            ));
        }

        let was_visible = window.elongation.previous.abs() > HELIACAL_THRESHOLD_DEG;
        let now_visible = window.elongation.current.abs() > HELIACAL_THRESHOLD_DEG;
        let side = side_of(window.elongation.current);
        if !was_visible && now_visible {
            events.push(build_event(body, PlanetaryPhaseEvent::MorningRise(side), current));
        } else if was_visible && !now_visible {
            events.push(build_event(body, PlanetaryPhaseEvent::MorningSet(side), current));
        }

        if window.brightness.is_maximum() {
            events.push(build_event(
                body,
                PlanetaryPhaseEvent::GreatestBrightness(side),
                current,
            ));
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

    fn insert(
        eph: &mut MapEphemerisView,
        body: Body,
        minute: i64,
        lon: f64,
        distance: f64,
        illum: f64,
    ) {
        eph.insert(
            body,
            at(minute),
            EphemerisSample {
                longitude_deg: lon,
                distance,
                illum_frac: Some(illum),
                ..Default::default()
            },
        );
    }

    #[test]
    fn detects_inferior_conjunction_at_minimum_distance_and_elongation() {
        let mut eph = MapEphemerisView::new();
        for minute in 0..3 {
            insert(&mut eph, Body::Sun, minute, 0.0, 1.0, 0.0);
        }
        insert(&mut eph, Body::Venus, 0, 1.0, 0.30, 0.05);
        insert(&mut eph, Body::Venus, 1, 0.1, 0.28, 0.02);
        insert(&mut eph, Body::Venus, 2, -0.5, 0.29, 0.03);

        let events = detect(&eph, &[Body::Sun, Body::Venus], at(0), at(1), at(2));
        assert!(events.iter().any(|e| matches!(
            &e.kind,
            EventKind::PlanetaryPhase {
                event: PlanetaryPhaseEvent::InferiorConjunction,
                ..
            }
        )));
    }

    #[test]
    fn detects_greatest_eastern_elongation() {
        let mut eph = MapEphemerisView::new();
        for minute in 0..3 {
            insert(&mut eph, Body::Sun, minute, 0.0, 1.0, 0.0);
        }
        insert(&mut eph, Body::Mercury, 0, 20.0, 0.9, 0.5);
        insert(&mut eph, Body::Mercury, 1, 22.0, 0.9, 0.5);
        insert(&mut eph, Body::Mercury, 2, 21.0, 0.9, 0.5);

        let events = detect(&eph, &[Body::Sun, Body::Mercury], at(0), at(1), at(2));
        assert!(events.iter().any(|e| matches!(
            &e.kind,
            EventKind::PlanetaryPhase {
                event: PlanetaryPhaseEvent::GreatestElongation(SolarElongationSide::Eastern),
                ..
            }
        )));
    }

    #[test]
    fn ineligible_bodies_are_ignored() {
        let mut eph = MapEphemerisView::new();
        for minute in 0..3 {
            insert(&mut eph, Body::Jupiter, minute, 10.0, 5.0, 0.9);
        }
        let events = detect(&eph, &[Body::Jupiter], at(0), at(1), at(2));
        assert!(events.is_empty());
    }
}
