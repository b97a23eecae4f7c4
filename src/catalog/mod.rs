//! Compile-time catalog tables: bodies, aspects, patterns, and phases.
//!
//! Everything in this module is frozen at compile time (`const`/`match`
//! tables, never a runtime-built map), per §4.2: lookups are total over
//! their declared domains, so an aspect or body outside the declared domain
//! is a compile error rather than a missing-entry bug.

pub mod aspect;
pub mod body;
pub mod pattern;
pub mod phase;

pub use aspect::{Aspect, AspectKind, FAMILY_ORDER, MAJOR_ASPECTS, MINOR_ASPECTS, SPECIALTY_ASPECTS};
pub use body::{canonical_pair, Body, CATALOG_ORDER};
pub use pattern::{Pattern, PatternSkeleton, RoleEdge, PATTERN_SKELETONS};
pub use phase::{AspectPhase, EventPhase};

use thiserror::Error;

/// Catalog lookup failures. Both variants are fatal for the call that
/// triggered them (§7): they indicate a configuration or catalog-integrity
/// bug, not a transient data problem.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("unknown body in catalog lookup: {0:?}")]
    UnknownBody(Body),

    #[error("no catalog aspect satisfies separation {separation_degrees} for bodies {body1:?}/{body2:?}")]
    InvalidAspect {
        body1: Body,
        body2: Body,
        separation_degrees: f64,
    },
}
