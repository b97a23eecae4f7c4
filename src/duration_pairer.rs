//! The duration pairer (§4.8): the final pass over the accumulated point
//! events, folding `forming`/`dissolving` pairs sharing an equivalence key
//! into `IntervalEvent`s. Everything that doesn't pair — `exact` points,
//! the cycle/phase families with no forming/dissolving notion, and any
//! `forming` left without a later `dissolving` when the run window ends
//! mid-orb — passes through unchanged as a point event.
//!
//! Only four event families carry the forming/exact/dissolving (or its
//! beginning/maximum/ending relabeling for eclipses) vocabulary this stage
//! understands: aspects, patterns, lunar phases, and eclipses. Daily
//! cycles, planetary phases, and apsides are single discrete occurrences
//! with no polarity, so they are never candidates for pairing.

use std::collections::HashMap;

use crate::catalog::{AspectPhase, Body, EventPhase, Pattern};
use crate::events::{EclipseKind, EventKind, IntervalEvent, LunarPhaseName, PointEvent};

/// The equivalence key a `forming` event must share with a later
/// `dissolving` event to be pairable (§4.8).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum PairingKey {
    Aspect {
        pair: (Body, Body),
        aspect: crate::catalog::Aspect,
    },
    Pattern {
        pattern: Pattern,
        bodies: Vec<Body>,
    },
    LunarPhase {
        phase_name: LunarPhaseName,
    },
    Eclipse {
        kind: EclipseKind,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Polarity {
    Forming,
    Dissolving,
}

fn polarity_of_aspect_phase(phase: AspectPhase) -> Option<Polarity> {
    match phase {
        AspectPhase::Forming => Some(Polarity::Forming),
        AspectPhase::Dissolving => Some(Polarity::Dissolving),
        AspectPhase::Exact => None,
    }
}

fn polarity_of_event_phase(phase: EventPhase) -> Option<Polarity> {
    match phase {
        EventPhase::Beginning => Some(Polarity::Forming),
        EventPhase::Ending => Some(Polarity::Dissolving),
        EventPhase::Maximum => None,
    }
}

/// The pairable key and polarity for an event, or `None` if this event's
/// family has no forming/dissolving notion (daily cycles, planetary
/// phases, apsides) or is an `exact`/`maximum` point that stays a point
/// regardless.
fn pairing_key(event: &PointEvent) -> Option<(PairingKey, Polarity)> {
    match &event.kind {
        EventKind::Aspect { pair, aspect, phase } => {
            polarity_of_aspect_phase(*phase).map(|p| {
                (
                    PairingKey::Aspect {
                        pair: *pair,
                        aspect: *aspect,
                    },
                    p,
                )
            })
        }
        EventKind::Pattern { pattern, phase } => polarity_of_aspect_phase(*phase).map(|p| {
            (
                PairingKey::Pattern {
                    pattern: *pattern,
                    bodies: event.bodies.clone(),
                },
                p,
            )
        }),
        EventKind::LunarPhase { phase_name, phase } => {
            polarity_of_aspect_phase(*phase).map(|p| (PairingKey::LunarPhase { phase_name: *phase_name }, p))
        }
        EventKind::Eclipse { kind, phase } => {
            polarity_of_event_phase(*phase).map(|p| (PairingKey::Eclipse { kind: *kind }, p))
        }
        EventKind::DailyCycle { .. } | EventKind::PlanetaryPhase { .. } | EventKind::Apsis { .. } => None,
    }
}

/// Strips the phase modifier from an event's description/summary, for the
/// interval event's own summary (§4.8: "a summary that omits the phase
/// modifier").
fn interval_description(event: &PointEvent) -> String {
    match &event.kind {
        EventKind::Aspect { pair, aspect, .. } => {
            format!("{} {} {}", pair.0.title(), aspect.title(), pair.1.title())
        }
        EventKind::Pattern { pattern, .. } => {
            let names: Vec<&str> = event.bodies.iter().map(|b| b.title()).collect();
            format!("{} ({})", pattern.title(), names.join(", "))
        }
        EventKind::LunarPhase { phase_name, .. } => format!("Moon {}", phase_name.title()),
        EventKind::Eclipse { kind, .. } => kind.title().to_string(),
        _ => event.description.clone(),
    }
}

/// Folds `forming`/`dissolving` point events sharing an equivalence key
/// into intervals (§4.8), returning the interval events plus whatever
/// point events were not consumed by pairing (including every `exact`/
/// `maximum` point and every cycle-family point, which were never
/// candidates).
pub fn pair_durations(points: Vec<PointEvent>) -> (Vec<IntervalEvent>, Vec<PointEvent>) {
    let mut formings: HashMap<PairingKey, Vec<PointEvent>> = HashMap::new();
    let mut dissolvings: HashMap<PairingKey, Vec<PointEvent>> = HashMap::new();
    let mut unpairable: Vec<PointEvent> = Vec::new();

    for event in points {
        match pairing_key(&event) {
            Some((key, Polarity::Forming)) => formings.entry(key).or_default().push(event),
            Some((key, Polarity::Dissolving)) => dissolvings.entry(key).or_default().push(event),
            None => unpairable.push(event),
        }
    }

    let mut intervals = Vec::new();
    let mut leftover_points = Vec::new();

    let mut keys: Vec<PairingKey> = formings.keys().cloned().collect();
    for key in dissolvings.keys() {
        if !formings.contains_key(key) {
            keys.push(key.clone());
        }
    }

    for key in keys {
        let mut forming_events = formings.remove(&key).unwrap_or_default();
        let mut dissolving_events = dissolvings.remove(&key).unwrap_or_default();
        forming_events.sort_by_key(|e| e.timestamp);
        dissolving_events.sort_by_key(|e| e.timestamp);

        let pair_count = forming_events.len().min(dissolving_events.len());
        for i in 0..pair_count {
            let forming = &forming_events[i];
            let dissolving = &dissolving_events[i];
            if dissolving.timestamp > forming.timestamp {
                let description = interval_description(forming);
                intervals.push(IntervalEvent {
                    start: forming.timestamp,
                    end: dissolving.timestamp,
                    kind: forming.kind.clone(),
                    bodies: forming.bodies.clone(),
                    summary: description.clone(),
                    description,
                    categories: forming.categories.clone(),
                });
            } else {
                leftover_points.push(forming.clone());
                leftover_points.push(dissolving.clone());
            }
        }
        leftover_points.extend(forming_events.into_iter().skip(pair_count));
        leftover_points.extend(dissolving_events.into_iter().skip(pair_count));
    }

    leftover_points.extend(unpairable);
    (intervals, leftover_points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Aspect, Body};
    use chrono::{DateTime, TimeZone, Utc};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, hour, minute, 0).unwrap()
    }

    fn aspect_point(phase: AspectPhase, at: DateTime<Utc>) -> PointEvent {
        let kind = EventKind::Aspect {
            pair: (Body::Sun, Body::Mercury),
            aspect: Aspect::Conjunct,
            phase,
        };
        let bodies = vec![Body::Sun, Body::Mercury];
        PointEvent {
            timestamp: at,
            categories: PointEvent::standard_categories(&kind, &bodies),
            kind,
            bodies,
            summary: "placeholder".to_string(),
            description: "placeholder".to_string(),
        }
    }

    #[test]
    fn pairs_two_forming_dissolving_runs_in_order() {
        let points = vec![
            aspect_point(AspectPhase::Forming, at(10, 0)),
            aspect_point(AspectPhase::Dissolving, at(14, 0)),
            aspect_point(AspectPhase::Forming, at(20, 0)),
            aspect_point(AspectPhase::Dissolving, at(23, 0)),
        ];
        let (intervals, leftover) = pair_durations(points);
        assert_eq!(intervals.len(), 2);
        assert_eq!(intervals[0].start, at(10, 0));
        assert_eq!(intervals[0].end, at(14, 0));
        assert_eq!(intervals[1].start, at(20, 0));
        assert_eq!(intervals[1].end, at(23, 0));
        assert!(leftover.is_empty());
    }

    #[test]
    fn unmatched_forming_at_run_end_remains_a_point() {
        let points = vec![
            aspect_point(AspectPhase::Forming, at(10, 0)),
            aspect_point(AspectPhase::Dissolving, at(14, 0)),
            aspect_point(AspectPhase::Forming, at(20, 0)),
        ];
        let (intervals, leftover) = pair_durations(points);
        assert_eq!(intervals.len(), 1);
        assert_eq!(leftover.len(), 1);
        assert_eq!(leftover[0].timestamp, at(20, 0));
    }

    #[test]
    fn exact_points_are_never_consumed_by_pairing() {
        let points = vec![
            aspect_point(AspectPhase::Forming, at(10, 0)),
            aspect_point(AspectPhase::Exact, at(12, 0)),
            aspect_point(AspectPhase::Dissolving, at(14, 0)),
        ];
        let (intervals, leftover) = pair_durations(points);
        assert_eq!(intervals.len(), 1);
        assert_eq!(leftover.len(), 1);
        assert_eq!(leftover[0].timestamp, at(12, 0));
    }

    #[test]
    fn cycle_family_points_pass_through_untouched() {
        let kind = EventKind::DailyCycle {
            body: Body::Sun,
            event: crate::events::DailyCycleEvent::Rise,
        };
        let bodies = vec![Body::Sun];
        let event = PointEvent {
            timestamp: at(6, 0),
            categories: PointEvent::standard_categories(&kind, &bodies),
            kind,
            bodies,
            summary: "rise".to_string(),
            description: "rise".to_string(),
        };
        let (intervals, leftover) = pair_durations(vec![event]);
        assert!(intervals.is_empty());
        assert_eq!(leftover.len(), 1);
    }
}
