//! Cycle detectors (§4.7): the daily solar/lunar horizon cycle, the
//! monthly lunar phase, Mercury/Venus/Mars phase events, eclipses, and
//! apsides. Each submodule is self-contained and reduces to the same
//! three-sample discriminator (`crate::discriminator`) the aspect detector
//! uses — only the input stream and the target/orb differ.

mod apsis;
mod daily;
mod eclipse;
mod lunar_phase;
mod planetary_phase;

use chrono::{DateTime, Utc};

use crate::catalog::Body;
use crate::ephemeris::EphemerisView;
use crate::events::PointEvent;

/// Runs every cycle detector over `bodies` for the `(previous, current,
/// next)` window, returning whatever point events fire at `current`.
pub fn detect_cycle_events(
    ephemeris: &dyn EphemerisView,
    bodies: &[Body],
    previous: DateTime<Utc>,
    current: DateTime<Utc>,
    next: DateTime<Utc>,
) -> Vec<PointEvent> {
    let mut events = Vec::new();
    events.extend(daily::detect(ephemeris, bodies, previous, current, next));
    events.extend(lunar_phase::detect(ephemeris, bodies, previous, current, next));
    events.extend(planetary_phase::detect(ephemeris, bodies, previous, current, next));
    events.extend(eclipse::detect(ephemeris, bodies, previous, current, next));
    events.extend(apsis::detect(ephemeris, bodies, previous, current, next));
    events
}
