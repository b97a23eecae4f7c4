//! The event data model (§3): immutable records produced by detectors,
//! folded into intervals by the duration pairer, and handed to the sink.
//! Nothing here is ever mutated after construction — detectors build a
//! `PointEvent`, hand it to the accumulator by value, and that's the end of
//! its lifecycle until the pairer either leaves it alone or consumes a
//! `forming`/`dissolving` pair to produce an `IntervalEvent`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{Aspect, AspectPhase, Body, EventPhase, Pattern};

/// Daily solar/lunar horizon-cycle events (§4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DailyCycleEvent {
    Rise,
    Set,
    Zenith,
    Nadir,
}

impl DailyCycleEvent {
    pub fn title(self) -> &'static str {
        match self {
            DailyCycleEvent::Rise => "rise",
            DailyCycleEvent::Set => "set",
            DailyCycleEvent::Zenith => "zenith",
            DailyCycleEvent::Nadir => "nadir",
        }
    }
}

/// Monthly lunar phase names, keyed to illumination extrema and the
/// half-illuminated quarters (§4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LunarPhaseName {
    NewMoon,
    FirstQuarter,
    FullMoon,
    LastQuarter,
}

impl LunarPhaseName {
    pub fn title(self) -> &'static str {
        match self {
            LunarPhaseName::NewMoon => "new moon",
            LunarPhaseName::FirstQuarter => "first quarter",
            LunarPhaseName::FullMoon => "full moon",
            LunarPhaseName::LastQuarter => "last quarter",
        }
    }
}

/// East/west tag relative to the Sun, used by planetary phase events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SolarElongationSide {
    Eastern,
    Western,
}

impl SolarElongationSide {
    pub fn title(self) -> &'static str {
        match self {
            SolarElongationSide::Eastern => "eastern",
            SolarElongationSide::Western => "western",
        }
    }
}

/// Mercury/Venus/Mars phase events (§4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlanetaryPhaseEvent {
    InferiorConjunction,
    SuperiorConjunction,
    GreatestElongation(SolarElongationSide),
    MorningRise(SolarElongationSide),
    MorningSet(SolarElongationSide),
    GreatestBrightness(SolarElongationSide),
}

impl PlanetaryPhaseEvent {
    pub fn title(self) -> &'static str {
        match self {
            PlanetaryPhaseEvent::InferiorConjunction => "inferior conjunction",
            PlanetaryPhaseEvent::SuperiorConjunction => "superior conjunction",
            PlanetaryPhaseEvent::GreatestElongation(_) => "greatest elongation",
            PlanetaryPhaseEvent::MorningRise(_) => "heliacal rise",
            PlanetaryPhaseEvent::MorningSet(_) => "heliacal set",
            PlanetaryPhaseEvent::GreatestBrightness(_) => "greatest brightness",
        }
    }
}

/// Solar/lunar eclipse kind (§4.7). No umbral/penumbral classification and
/// no observer-path geometry — geometric alignment only (§1 Non-goals).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EclipseKind {
    Solar,
    Lunar,
}

impl EclipseKind {
    pub fn title(self) -> &'static str {
        match self {
            EclipseKind::Solar => "solar eclipse",
            EclipseKind::Lunar => "lunar eclipse",
        }
    }
}

/// Apsis (distance extremum) kind. Heliocentric names for everything
/// except the Moon, which uses its own geocentric names (§4.7, GLOSSARY).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApsisEvent {
    Perihelion,
    Aphelion,
    Perigee,
    Apogee,
}

impl ApsisEvent {
    pub fn title(self) -> &'static str {
        match self {
            ApsisEvent::Perihelion => "perihelion",
            ApsisEvent::Aphelion => "aphelion",
            ApsisEvent::Perigee => "perigee",
            ApsisEvent::Apogee => "apogee",
        }
    }

    /// The Moon is tracked geocentrically (perigee/apogee); every other
    /// body in this catalog uses the heliocentric names.
    pub fn for_body(body: Body, is_minimum: bool) -> Self {
        if body == Body::Moon {
            if is_minimum {
                ApsisEvent::Perigee
            } else {
                ApsisEvent::Apogee
            }
        } else if is_minimum {
            ApsisEvent::Perihelion
        } else {
            ApsisEvent::Aphelion
        }
    }
}

/// What kind of phenomenon a [`PointEvent`] records, with just enough
/// payload to reconstruct its equivalence key for the duration pairer
/// (§4.8) without re-deriving it from the summary string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    Aspect {
        pair: (Body, Body),
        aspect: Aspect,
        phase: AspectPhase,
    },
    Pattern {
        pattern: Pattern,
        phase: AspectPhase,
    },
    DailyCycle {
        body: Body,
        event: DailyCycleEvent,
    },
    LunarPhase {
        phase_name: LunarPhaseName,
        phase: AspectPhase,
    },
    PlanetaryPhase {
        body: Body,
        event: PlanetaryPhaseEvent,
    },
    Eclipse {
        kind: EclipseKind,
        phase: EventPhase,
    },
    Apsis {
        body: Body,
        event: ApsisEvent,
    },
}

impl EventKind {
    /// The family name used in categories and in the duration pairer's
    /// per-family equivalence-key grouping (§4.8).
    pub fn family(&self) -> &'static str {
        match self {
            EventKind::Aspect { .. } => "aspect",
            EventKind::Pattern { .. } => "pattern",
            EventKind::DailyCycle { .. } => "daily-cycle",
            EventKind::LunarPhase { .. } => "lunar-phase",
            EventKind::PlanetaryPhase { .. } => "planetary-phase",
            EventKind::Eclipse { .. } => "eclipse",
            EventKind::Apsis { .. } => "apsis",
        }
    }
}

/// An immutable astronomical/astrological event. Point events have
/// `start == end`; interval events (produced only by the duration pairer)
/// have `start < end`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointEvent {
    pub timestamp: DateTime<Utc>,
    pub kind: EventKind,
    pub bodies: Vec<Body>,
    pub summary: String,
    pub description: String,
    pub categories: Vec<String>,
}

/// An event with a duration, produced only by the duration pairer (§4.8)
/// by folding a `forming` point event with its matching `dissolving` point
/// event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalEvent {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub kind: EventKind,
    pub bodies: Vec<Body>,
    pub summary: String,
    pub description: String,
    pub categories: Vec<String>,
}

impl PointEvent {
    /// Builds the standard category tag set: family name, bodies in title
    /// case, aspect/pattern/phase names (§6).
    pub fn standard_categories(kind: &EventKind, bodies: &[Body]) -> Vec<String> {
        let mut categories = vec![kind.family().to_string()];
        for body in bodies {
            categories.push(body.title().to_string());
        }
        match kind {
            EventKind::Aspect { aspect, phase, .. } => {
                categories.push(aspect.title().to_string());
                categories.push(phase.title().to_string());
            }
            EventKind::Pattern { pattern, phase } => {
                categories.push(pattern.title().to_string());
                categories.push(phase.title().to_string());
            }
            EventKind::DailyCycle { event, .. } => categories.push(event.title().to_string()),
            EventKind::LunarPhase { phase_name, phase } => {
                categories.push(phase_name.title().to_string());
                categories.push(phase.title().to_string());
            }
            EventKind::PlanetaryPhase { event, .. } => categories.push(event.title().to_string()),
            EventKind::Eclipse { kind, phase } => {
                categories.push(kind.title().to_string());
                categories.push(phase.title().to_string());
            }
            EventKind::Apsis { event, .. } => categories.push(event.title().to_string()),
        }
        categories
    }
}

/// What actually reaches the event sink (§6): point and interval events
/// flattened to the same `start`/`end`/`summary`/`description`/`categories`
/// shape, `start == end` for what was a point event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmittedEvent {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub summary: String,
    pub description: String,
    pub categories: Vec<String>,
}

impl From<PointEvent> for EmittedEvent {
    fn from(event: PointEvent) -> Self {
        EmittedEvent {
            start: event.timestamp,
            end: event.timestamp,
            summary: event.summary,
            description: event.description,
            categories: event.categories,
        }
    }
}

impl From<IntervalEvent> for EmittedEvent {
    fn from(event: IntervalEvent) -> Self {
        EmittedEvent {
            start: event.start,
            end: event.end,
            summary: event.summary,
            description: event.description,
            categories: event.categories,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apsis_event_uses_geocentric_names_for_moon() {
        assert_eq!(ApsisEvent::for_body(Body::Moon, true), ApsisEvent::Perigee);
        assert_eq!(ApsisEvent::for_body(Body::Moon, false), ApsisEvent::Apogee);
        assert_eq!(
            ApsisEvent::for_body(Body::Mars, true),
            ApsisEvent::Perihelion
        );
        assert_eq!(ApsisEvent::for_body(Body::Mars, false), ApsisEvent::Aphelion);
    }

    #[test]
    fn standard_categories_include_family_and_bodies() {
        let kind = EventKind::Aspect {
            pair: (Body::Sun, Body::Moon),
            aspect: Aspect::Conjunct,
            phase: AspectPhase::Exact,
        };
        let categories = PointEvent::standard_categories(&kind, &[Body::Sun, Body::Moon]);
        assert!(categories.contains(&"aspect".to_string()));
        assert!(categories.contains(&"Sun".to_string()));
        assert!(categories.contains(&"Moon".to_string()));
        assert!(categories.contains(&"conjunct".to_string()));
        assert!(categories.contains(&"exact".to_string()));
    }
}
