//! The driver loop (§2, §5): advances minute by minute across the
//! configured window, materializes each minute's `(previous, current,
//! next)` ephemeris window, and runs every detector against it.
//!
//! Single-threaded and purely sequential with respect to detection: each
//! minute's computation depends only on three adjacent samples and the
//! read-only catalog tables, so there is no shared mutable state to guard
//! (§5). The only suspension points in the whole pipeline are at the
//! ephemeris adapter boundary, already crossed by the time `run` is
//! called — the loop itself never awaits anything. Cancellation is a
//! plain `Arc<AtomicBool>` (or any `&AtomicBool`) checked once per minute;
//! in-flight per-minute work always finishes before the run returns.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Duration, Utc};

use crate::aspect_detector::detect_aspects;
use crate::catalog::Body;
use crate::cycles::detect_cycle_events;
use crate::duration_pairer::pair_durations;
use crate::ephemeris::EphemerisView;
use crate::events::{IntervalEvent, PointEvent};
use crate::pattern_engine::detect_patterns;

/// The run-scoped configuration the driver consumes (§6). `coordinates`
/// and `timezone` are threaded through only as far as the ephemeris
/// adapter and the sink boundary — no detector in this crate branches on
/// either (§6: "timezone is cosmetic ... and must not affect detection").
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Everything the driver accumulated over the run: point events that
/// survived the duration pairer unconsumed, the intervals it produced,
/// and a count of per-minute missing-sample skips (§7) for the caller to
/// log or surface.
#[derive(Debug, Clone, Default)]
pub struct DetectionRun {
    pub points: Vec<PointEvent>,
    pub intervals: Vec<IntervalEvent>,
    pub missing_sample_minutes: usize,
}

/// Runs the full detection pipeline over `[window.start, window.end]`
/// inclusive, at one-minute resolution. `ephemeris` must already cover one
/// minute before `window.start` and one minute after `window.end`, so the
/// first and last minutes of the window still get a complete
/// `(previous, current, next)` triple.
///
/// `cancel`, if set before a minute boundary, stops the loop after the
/// in-flight minute completes; the run still returns whatever events were
/// accumulated so far, paired as usual.
pub fn run(ephemeris: &dyn EphemerisView, bodies: &[Body], window: RunWindow, cancel: &AtomicBool) -> DetectionRun {
    let mut points = Vec::new();
    let mut missing_sample_minutes = 0usize;

    let mut current = window.start;
    while current <= window.end {
        if cancel.load(Ordering::Relaxed) {
            break;
        }

        let previous = current - Duration::minutes(1);
        let next = current + Duration::minutes(1);

        let before = points.len();
        points.extend(detect_aspects(ephemeris, bodies, previous, current, next));
        points.extend(detect_patterns(ephemeris, bodies, previous, current, next));
        points.extend(detect_cycle_events(ephemeris, bodies, previous, current, next));
        if points.len() == before && !bodies.is_empty() {
            // A minute in which every detector came back empty is not on
            // its own evidence of a missing sample (most minutes have no
            // active phenomenon); the per-detector calls above already
            // skip silently on `MissingSample`. This counter instead
            // tracks minutes where the *anchor* body (Sun) itself has no
            // sample, the cheapest proxy for "this minute's ephemeris
            // data is absent" without threading error values back out of
            // every detector call.
            if ephemeris.longitude(Body::Sun, current).is_err() {
                missing_sample_minutes += 1;
            }
        }

        current += Duration::minutes(1);
    }

    points.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

    let (intervals, leftover_points) = pair_durations(points);
    let mut intervals = intervals;
    intervals.sort_by(|a, b| a.start.cmp(&b.start));
    let mut points = leftover_points;
    points.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

    DetectionRun {
        points,
        intervals,
        missing_sample_minutes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CATALOG_ORDER;
    use crate::ephemeris::{EphemerisSample, MapEphemerisView};
    use chrono::TimeZone;

    fn minutes(start: DateTime<Utc>, count: i64) -> Vec<DateTime<Utc>> {
        (0..count).map(|m| start + Duration::minutes(m)).collect()
    }

    #[test]
    fn run_over_a_steady_window_emits_no_events_for_widely_separated_bodies() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let window = RunWindow {
            start,
            end: start + Duration::minutes(4),
        };
        let mut eph = MapEphemerisView::new();
        for at in minutes(start - Duration::minutes(1), 7) {
            eph.insert(
                Body::Sun,
                at,
                EphemerisSample {
                    longitude_deg: 0.0,
                    distance: 1.0,
                    ..Default::default()
                },
            );
            eph.insert(
                Body::Mars,
                at,
                EphemerisSample {
                    longitude_deg: 50.0,
                    distance: 1.5,
                    ..Default::default()
                },
            );
        }
        let cancel = AtomicBool::new(false);
        let result = run(&eph, &[Body::Sun, Body::Mars], window, &cancel);
        assert!(result.points.is_empty());
        assert!(result.intervals.is_empty());
        assert_eq!(result.missing_sample_minutes, 0);
    }

    #[test]
    fn run_pairs_a_forming_dissolving_conjunction_into_one_interval() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let window = RunWindow {
            start,
            end: start + Duration::minutes(3),
        };
        let mut eph = MapEphemerisView::new();
        // Sun fixed; Moon sweeps through conjunction orb (8 degrees) and
        // back out across minutes -1..=4.
        let moon_lons = [20.0, 9.0, 4.0, 0.5, 5.0, 12.0];
        for (i, at) in minutes(start - Duration::minutes(1), 6).into_iter().enumerate() {
            eph.insert(
                Body::Sun,
                at,
                EphemerisSample {
                    longitude_deg: 0.0,
                    distance: 1.0,
                    ..Default::default()
                },
            );
            eph.insert(
                Body::Moon,
                at,
                EphemerisSample {
                    longitude_deg: moon_lons[i],
                    distance: 1.0,
                    ..Default::default()
                },
            );
        }
        let cancel = AtomicBool::new(false);
        let result = run(&eph, &[Body::Sun, Body::Moon], window, &cancel);
        assert!(!result.intervals.is_empty());
    }

    #[test]
    fn cancellation_stops_the_loop_before_the_window_ends() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let window = RunWindow {
            start,
            end: start + Duration::minutes(100),
        };
        let eph = MapEphemerisView::new();
        let cancel = AtomicBool::new(true);
        let result = run(&eph, &CATALOG_ORDER, window, &cancel);
        assert!(result.points.is_empty());
    }
}
