//! The three-sample discriminator (§4.4): the one routine every aspect and
//! pattern detector calls to turn a `(previous, current, next)` window of
//! a scalar deviation into a phase, or `None` if the window is out of orb
//! the whole way through.
//!
//! Two shapes exist because conjunction and opposition behave differently
//! from every interior aspect. Interior aspects (target strictly between 0
//! and 180 degrees) have a *signed* deviation from their exact angle: as
//! the relative motion of two bodies carries their separation through the
//! target, the deviation crosses zero, and "exact" is that zero-crossing.
//! Conjunction and opposition sit at the boundary of the separation
//! metric's `[0, 180]` range, so their deviation can never cross zero from
//! both sides — it decreases toward a minimum and then increases again,
//! "bouncing" rather than crossing. Exactness there is a local minimum of
//! the unsigned distance from target, not a sign change.
//! `Aspect::is_symmetric_about_zero` tells the caller which shape applies.

use crate::catalog::AspectPhase;
use crate::math::Window3;

/// Classifies a window of *signed* deviation from an aspect's exact angle
/// (for every aspect except conjunction). `orb_degrees` is the aspect's
/// orb tolerance; `deviation` values outside `[-orb, orb]` place `current`
/// out of orb.
///
/// Precedence is exact > forming > dissolving: a window that both crosses
/// zero and is shrinking is reported as exact, never forming.
pub fn classify_signed(window: Window3, orb_degrees: f64) -> Option<AspectPhase> {
    let in_orb = |x: f64| x.abs() <= orb_degrees;

    let crosses_zero = window.previous == 0.0
        || window.current == 0.0
        || window.next == 0.0
        || window.previous.signum() != window.next.signum();

    if in_orb(window.current) && crosses_zero {
        return Some(AspectPhase::Exact);
    }

    if !in_orb(window.previous) && in_orb(window.current) {
        return Some(AspectPhase::Forming);
    }

    if in_orb(window.current) && !in_orb(window.next) {
        return Some(AspectPhase::Dissolving);
    }

    None
}

/// Classifies a window of *unsigned* separation from conjunction (0
/// degrees), where exactness is a local minimum rather than a sign change.
pub fn classify_symmetric(window: Window3, orb_degrees: f64) -> Option<AspectPhase> {
    let in_orb = |x: f64| x <= orb_degrees;

    if in_orb(window.current) && window.is_minimum() {
        return Some(AspectPhase::Exact);
    }

    if !in_orb(window.previous) && in_orb(window.current) {
        return Some(AspectPhase::Forming);
    }

    if in_orb(window.current) && !in_orb(window.next) {
        return Some(AspectPhase::Dissolving);
    }

    None
}

/// Dispatches to the signed or symmetric discriminator based on whether
/// `symmetric` is set (i.e. `aspect.is_symmetric_about_zero()`).
pub fn classify(window: Window3, orb_degrees: f64, symmetric: bool) -> Option<AspectPhase> {
    if symmetric {
        classify_symmetric(window, orb_degrees)
    } else {
        classify_signed(window, orb_degrees)
    }
}
