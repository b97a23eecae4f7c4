//! Composite chart-pattern detection (§4.6).
//!
//! Every fixed-skeleton pattern (everything but Stellium) is matched the
//! same way: take a candidate body tuple, try every role-to-body labeling
//! consistent with the skeleton's symmetry, and accept the tightest
//! labeling whose required edges are all simultaneously in orb *at this
//! minute, on the raw longitudes* — not by reusing a cached, already
//! phase-classified edge set, since a pattern edge can be in orb without
//! having been the aspect the per-pair detector "won" that minute for
//! (§4.6: "evaluated geometrically on the raw longitudes"). One search
//! loop over `catalog::PATTERN_SKELETONS` replaces what would otherwise be
//! a hand-written detector per pattern.
//!
//! Phase assignment does not reuse the aspect detector's
//! forming/exact/dissolving discriminator either: a pattern's phase comes
//! from its own tightness functional — the sum of absolute deviations from
//! each required edge's ideal angle, evaluated on the *same* labeling at
//! `previous`/`current`/`next` — going to a local minimum at `exact`,
//! while `forming`/`dissolving` are existence transitions (the pattern's
//! required edges are not all in orb at the neighbor minute, but are at
//! `current`).
//!
//! Stellium has no fixed skeleton or body count: it is any connected
//! component of size >= 4 in the conjunction-only subgraph that also
//! passes a clique test (every pair, not just the spanning edges, must be
//! a conjunction), found by plain breadth-first search rather than the
//! role-assignment matcher.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::catalog::{canonical_pair, Aspect, AspectPhase, Body, Pattern, PatternSkeleton, PATTERN_SKELETONS};
use crate::ephemeris::EphemerisView;
use crate::events::{EventKind, PointEvent};
use crate::math::{combinations, normalize_for_comparison, shortest_arc};

/// Every candidate body's longitude at one minute, gathered once so
/// existence/tightness checks across many candidate tuples and labelings
/// don't repeatedly hit the ephemeris view.
struct LongitudeSnapshot(HashMap<Body, f64>);

impl LongitudeSnapshot {
    fn build(ephemeris: &dyn EphemerisView, bodies: &[Body], at: DateTime<Utc>) -> Self {
        let mut map = HashMap::new();
        for &body in bodies {
            if let Ok(sample) = ephemeris.sample(body, at) {
                map.insert(body, sample.longitude_deg);
            }
        }
        Self(map)
    }

    fn get(&self, body: Body) -> Option<f64> {
        self.0.get(&body).copied()
    }
}

/// Unsigned deviation of the pair's separation from `aspect`'s exact
/// angle, in degrees.
fn deviation(lon_a: f64, lon_b: f64, aspect: Aspect) -> f64 {
    (shortest_arc(lon_a, lon_b) - aspect.angle_degrees()).abs()
}

/// Whether every required edge of `skeleton` is in orb for `assignment`
/// (a role-indexed body tuple) at `snapshot`, and — for Hourglass — that
/// the forbidden aspect is absent from every pair in the tuple, not just
/// the ones named in `required_edges`.
fn existence(skeleton: &PatternSkeleton, assignment: &[Body], snapshot: &LongitudeSnapshot) -> bool {
    for &(role_a, role_b, aspect) in skeleton.required_edges {
        let (Some(a), Some(b)) = (snapshot.get(assignment[role_a]), snapshot.get(assignment[role_b])) else {
            return false;
        };
        if deviation(a, b, aspect) > aspect.orb_degrees() {
            return false;
        }
    }
    if let Some(forbidden) = skeleton.forbidden_among_all {
        for i in 0..assignment.len() {
            for j in (i + 1)..assignment.len() {
                if let (Some(a), Some(b)) = (snapshot.get(assignment[i]), snapshot.get(assignment[j])) {
                    if deviation(a, b, forbidden) <= forbidden.orb_degrees() {
                        return false;
                    }
                }
            }
        }
    }
    true
}

/// The tightness functional for a fixed-skeleton pattern: sum of absolute
/// deviations from each required edge's ideal angle. `None` if a body in
/// `assignment` has no sample at `snapshot`.
fn tightness(skeleton: &PatternSkeleton, assignment: &[Body], snapshot: &LongitudeSnapshot) -> Option<f64> {
    let mut total = 0.0;
    for &(role_a, role_b, aspect) in skeleton.required_edges {
        let a = snapshot.get(assignment[role_a])?;
        let b = snapshot.get(assignment[role_b])?;
        total += deviation(a, b, aspect);
    }
    Some(total)
}

/// `exact` iff tightness is a local minimum at `current`; else `forming`
/// iff the pattern didn't exist at the previous minute but does now;
/// else `dissolving` iff it exists now but not at the next minute; else
/// no event. Precedence mirrors the aspect discriminator: exact > forming
/// > dissolving (§4.4, extended to patterns by §4.6).
fn classify_pattern_phase(
    t_prev: Option<f64>,
    t_cur: f64,
    t_next: Option<f64>,
    exists_prev: bool,
    exists_next: bool,
) -> Option<AspectPhase> {
    if let (Some(p), Some(n)) = (t_prev, t_next) {
        if t_cur < p && t_cur < n {
            return Some(AspectPhase::Exact);
        }
    }
    if !exists_prev {
        return Some(AspectPhase::Forming);
    }
    if !exists_next {
        return Some(AspectPhase::Dissolving);
    }
    None
}

fn permutations(role_count: usize, candidates: &[Body]) -> Vec<Vec<Body>> {
    let mut result = Vec::new();
    let mut used = vec![false; candidates.len()];
    let mut current = Vec::with_capacity(role_count);
    permute_recurse(role_count, candidates, &mut used, &mut current, &mut result);
    result
}

fn permute_recurse(
    role_count: usize,
    candidates: &[Body],
    used: &mut [bool],
    current: &mut Vec<Body>,
    result: &mut Vec<Vec<Body>>,
) {
    if current.len() == role_count {
        result.push(current.clone());
        return;
    }
    for i in 0..candidates.len() {
        if used[i] {
            continue;
        }
        used[i] = true;
        current.push(candidates[i]);
        permute_recurse(role_count, candidates, used, current, result);
        current.pop();
        used[i] = false;
    }
}

/// Bodies worth trying as role-fillers for `skeleton`: anything that sits
/// within orb of *any* of the skeleton's required (or forbidden) aspects
/// with at least one other body, at `current`. Pruning only — the
/// exhaustive `existence` test is still the final word, so a pool that is
/// too generous costs time, never correctness.
fn candidate_pool(skeleton: &PatternSkeleton, bodies: &[Body], snapshot: &LongitudeSnapshot) -> Vec<Body> {
    let mut relevant_aspects: Vec<Aspect> = skeleton.required_edges.iter().map(|&(_, _, a)| a).collect();
    relevant_aspects.extend(skeleton.forbidden_among_all);
    relevant_aspects.sort_by_key(|a| a.title());
    relevant_aspects.dedup();

    let mut pool: HashSet<Body> = HashSet::new();
    for pair_idx in combinations(bodies.len(), 2) {
        let (a, b) = (bodies[pair_idx[0]], bodies[pair_idx[1]]);
        let (Some(lon_a), Some(lon_b)) = (snapshot.get(a), snapshot.get(b)) else {
            continue;
        };
        if relevant_aspects
            .iter()
            .any(|&aspect| deviation(lon_a, lon_b, aspect) <= aspect.orb_degrees())
        {
            pool.insert(a);
            pool.insert(b);
        }
    }
    let mut pool: Vec<Body> = pool.into_iter().collect();
    pool.sort_by_key(|b| b.index());
    pool
}

fn build_pattern_event(pattern: Pattern, bodies: Vec<Body>, phase: AspectPhase, at: DateTime<Utc>) -> PointEvent {
    let kind = EventKind::Pattern { pattern, phase };
    let names: Vec<&str> = bodies.iter().map(|b| b.title()).collect();
    let description = format!("{} ({})", pattern.title(), names.join(", "));
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

/// Detects every fixed-skeleton pattern and every Stellium among `bodies`
/// active at `current`.
pub fn detect_patterns(
    ephemeris: &dyn EphemerisView,
    bodies: &[Body],
    previous: DateTime<Utc>,
    current: DateTime<Utc>,
    next: DateTime<Utc>,
) -> Vec<PointEvent> {
    let snap_prev = LongitudeSnapshot::build(ephemeris, bodies, previous);
    let snap_cur = LongitudeSnapshot::build(ephemeris, bodies, current);
    let snap_next = LongitudeSnapshot::build(ephemeris, bodies, next);

    let mut events = Vec::new();
    let mut seen: HashSet<(Pattern, Vec<Body>)> = HashSet::new();

    for skeleton in PATTERN_SKELETONS.iter() {
        if bodies.len() < skeleton.role_count {
            continue;
        }
        let pool = candidate_pool(skeleton, bodies, &snap_cur);
        if pool.len() < skeleton.role_count {
            continue;
        }

        for combo_idx in combinations(pool.len(), skeleton.role_count) {
            let combo: Vec<Body> = combo_idx.iter().map(|&i| pool[i]).collect();

            // Every labeling consistent with the skeleton's symmetry is
            // tried; the tightest one that satisfies existence at
            // `current` is the one the pattern instance is tracked under.
            let mut best: Option<(Vec<Body>, f64)> = None;
            for assignment in permutations(skeleton.role_count, &combo) {
                if !existence(skeleton, &assignment, &snap_cur) {
                    continue;
                }
                if let Some(t) = tightness(skeleton, &assignment, &snap_cur) {
                    let is_better = match &best {
                        Some((_, best_t)) => t < *best_t,
                        None => true,
                    };
                    if is_better {
                        best = Some((assignment, t));
                    }
                }
            }
            let Some((assignment, t_cur)) = best else {
                continue;
            };

            let mut canonical_bodies = assignment.clone();
            canonical_bodies.sort_by_key(|b| b.index());
            let key = (skeleton.pattern, canonical_bodies.clone());
            if !seen.insert(key) {
                continue;
            }

            let exists_prev = existence(skeleton, &assignment, &snap_prev);
            let exists_next = existence(skeleton, &assignment, &snap_next);
            let t_prev = tightness(skeleton, &assignment, &snap_prev);
            let t_next = tightness(skeleton, &assignment, &snap_next);

            if let Some(phase) = classify_pattern_phase(t_prev, t_cur, t_next, exists_prev, exists_next) {
                events.push(build_pattern_event(skeleton.pattern, canonical_bodies, phase, current));
            }
        }
    }

    events.extend(detect_stellia(bodies, &snap_prev, &snap_cur, &snap_next, current));

    events
}

fn is_clique(snapshot: &LongitudeSnapshot, members: &[Body]) -> bool {
    for i in 0..members.len() {
        for j in (i + 1)..members.len() {
            match (snapshot.get(members[i]), snapshot.get(members[j])) {
                (Some(a), Some(b)) if deviation(a, b, Aspect::Conjunct) <= Aspect::Conjunct.orb_degrees() => {}
                _ => return false,
            }
        }
    }
    true
}

fn conjunction_adjacency(snapshot: &LongitudeSnapshot, bodies: &[Body]) -> HashMap<Body, Vec<Body>> {
    let mut adjacency: HashMap<Body, Vec<Body>> = HashMap::new();
    for pair_idx in combinations(bodies.len(), 2) {
        let (a, b) = canonical_pair(bodies[pair_idx[0]], bodies[pair_idx[1]]);
        if let (Some(lon_a), Some(lon_b)) = (snapshot.get(a), snapshot.get(b)) {
            if deviation(lon_a, lon_b, Aspect::Conjunct) <= Aspect::Conjunct.orb_degrees() {
                adjacency.entry(a).or_default().push(b);
                adjacency.entry(b).or_default().push(a);
            }
        }
    }
    adjacency
}

/// Wrap-aware spread (max minus min) of a cluster's longitudes: everything
/// is renormalized within 180 degrees of the first member before taking
/// the extremes, so a cluster straddling 0/360 degrees doesn't read as a
/// near-360-degree spread.
fn angular_spread(snapshot: &LongitudeSnapshot, members: &[Body]) -> Option<f64> {
    let first = snapshot.get(members[0])?;
    let mut max = first;
    let mut min = first;
    for &body in &members[1..] {
        let lon = normalize_for_comparison(snapshot.get(body)?, first);
        max = max.max(lon);
        min = min.min(lon);
    }
    Some(max - min)
}

/// Finds connected components of size >= 4 in the conjunction-only
/// subgraph at `current` that also pass the all-pairs clique test, each
/// one a Stellium instance tracked by its exact member set across
/// `previous`/`next` for phase assignment.
fn detect_stellia(
    bodies: &[Body],
    snap_prev: &LongitudeSnapshot,
    snap_cur: &LongitudeSnapshot,
    snap_next: &LongitudeSnapshot,
    at: DateTime<Utc>,
) -> Vec<PointEvent> {
    let adjacency = conjunction_adjacency(snap_cur, bodies);
    let mut ordered: Vec<Body> = bodies.to_vec();
    ordered.sort_by_key(|b| b.index());

    let mut visited: HashSet<Body> = HashSet::new();
    let mut events = Vec::new();

    for &start in &ordered {
        if visited.contains(&start) || !adjacency.contains_key(&start) {
            continue;
        }

        let mut component = vec![start];
        let mut queue = vec![start];
        let mut in_component: HashSet<Body> = HashSet::new();
        in_component.insert(start);

        while let Some(node) = queue.pop() {
            if let Some(neighbors) = adjacency.get(&node) {
                for &neighbor in neighbors {
                    if in_component.insert(neighbor) {
                        component.push(neighbor);
                        queue.push(neighbor);
                    }
                }
            }
        }
        visited.extend(component.iter().copied());

        if component.len() < 4 || !is_clique(snap_cur, &component) {
            continue;
        }
        component.sort_by_key(|b| b.index());

        let Some(t_cur) = angular_spread(snap_cur, &component) else {
            continue;
        };
        let t_prev = angular_spread(snap_prev, &component);
        let t_next = angular_spread(snap_next, &component);
        let exists_prev = is_clique(snap_prev, &component) && t_prev.is_some();
        let exists_next = is_clique(snap_next, &component) && t_next.is_some();

        if let Some(phase) = classify_pattern_phase(t_prev, t_cur, t_next, exists_prev, exists_next) {
            events.push(build_pattern_event(Pattern::Stellium, component, phase, at));
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
    fn detects_grand_cross_forming_from_four_exact_edges() {
        let mut eph = MapEphemerisView::new();
        // Sun 0, Moon 90, Mars 180, Venus 270 at t and t+1: a perfect grand
        // cross. At t-1, Moon sits at 88 (still a square to Sun within the
        // 6-degree orb, but the pattern is defined by *simultaneous*
        // edges: the Moon/Mars pairing at 88/180 is a 92-degree separation,
        // still within square's orb, so existence actually holds at t-1
        // too in this construction — use 80 instead, outside the square
        // orb against Mars (100 separation), to force "forming" at t.
        let longitudes_steady = [(Body::Sun, 0.0), (Body::Mars, 180.0), (Body::Venus, 270.0)];
        for minute in 0..3 {
            for &(body, lon) in &longitudes_steady {
                eph.insert(body, at(minute), sample(lon));
            }
        }
        eph.insert(Body::Moon, at(0), sample(80.0));
        eph.insert(Body::Moon, at(1), sample(90.0));
        eph.insert(Body::Moon, at(2), sample(90.0));

        let bodies = [Body::Sun, Body::Moon, Body::Mars, Body::Venus];
        let events = detect_patterns(&eph, &bodies, at(0), at(1), at(2));
        assert!(events.iter().any(|e| matches!(
            &e.kind,
            EventKind::Pattern {
                pattern: Pattern::GrandCross,
                phase: AspectPhase::Forming,
            }
        )));
    }

    #[test]
    fn detects_stellium_forming_as_the_last_body_enters_orb() {
        let mut eph = MapEphemerisView::new();
        let steady = [(Body::Sun, 10.0), (Body::Mercury, 11.0), (Body::Venus, 9.0)];
        for minute in 0..3 {
            for &(body, lon) in &steady {
                eph.insert(body, at(minute), sample(lon));
            }
        }
        // Mars starts outside the clique (20 degrees from Sun, past the
        // 8-degree conjunction orb) and moves to 12 by `current`, so the
        // four-body clique exists at `current` and `next` but not
        // `previous`.
        eph.insert(Body::Mars, at(0), sample(20.0));
        eph.insert(Body::Mars, at(1), sample(12.0));
        eph.insert(Body::Mars, at(2), sample(12.0));

        let bodies = [Body::Sun, Body::Mercury, Body::Venus, Body::Mars];
        let events = detect_patterns(&eph, &bodies, at(0), at(1), at(2));
        assert!(events.iter().any(|e| matches!(
            &e.kind,
            EventKind::Pattern {
                pattern: Pattern::Stellium,
                phase: AspectPhase::Forming,
            }
        )));
    }

    #[test]
    fn non_clique_conjunction_chain_is_not_a_stellium() {
        // Sun-Moon, Moon-Mars, Mars-Venus are each within the 8-degree
        // conjunction orb, but Sun-Mars (14 degrees) and Sun-Venus (21
        // degrees) are not: the component is connected but not a clique,
        // so it must not fire.
        let mut eph = MapEphemerisView::new();
        let longitudes = [
            (Body::Sun, 0.0),
            (Body::Moon, 7.0),
            (Body::Mars, 14.0),
            (Body::Venus, 21.0),
        ];
        for minute in 0..3 {
            for &(body, lon) in &longitudes {
                eph.insert(body, at(minute), sample(lon));
            }
        }
        let bodies = [Body::Sun, Body::Moon, Body::Mars, Body::Venus];
        let events = detect_patterns(&eph, &bodies, at(0), at(1), at(2));
        assert!(!events
            .iter()
            .any(|e| matches!(&e.kind, EventKind::Pattern { pattern: Pattern::Stellium, .. })));
    }

    #[test]
    fn no_active_aspects_yields_no_patterns() {
        let mut eph = MapEphemerisView::new();
        let longitudes = [
            (Body::Sun, 0.0),
            (Body::Moon, 13.0),
            (Body::Mars, 50.0),
            (Body::Venus, 190.0),
        ];
        for minute in 0..3 {
            for &(body, lon) in &longitudes {
                eph.insert(body, at(minute), sample(lon));
            }
        }
        let bodies = [Body::Sun, Body::Moon, Body::Mars, Body::Venus];
        let events = detect_patterns(&eph, &bodies, at(0), at(1), at(2));
        assert!(events.is_empty());
    }

    #[test]
    fn grand_cross_with_stable_window_yields_no_event() {
        // The pattern holds at all three minutes: no forming/dissolving
        // transition, and tightness is flat, so no exact either.
        let mut eph = MapEphemerisView::new();
        let longitudes = [
            (Body::Sun, 0.0),
            (Body::Moon, 90.0),
            (Body::Mars, 180.0),
            (Body::Venus, 270.0),
        ];
        for minute in 0..3 {
            for &(body, lon) in &longitudes {
                eph.insert(body, at(minute), sample(lon));
            }
        }
        let bodies = [Body::Sun, Body::Moon, Body::Mars, Body::Venus];
        let events = detect_patterns(&eph, &bodies, at(0), at(1), at(2));
        assert!(events.is_empty());
    }
}
