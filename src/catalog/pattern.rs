//! Composite chart-pattern skeletons, as data.
//!
//! Per the spec's own design note (§9): "pattern skeletons as data ... is
//! the recommended refactor of the large body of per-pattern detection
//! code; it collapses hundreds of nearly-identical conditionals into a
//! uniform matcher." Each pattern is a fixed number of *roles*, a set of
//! required `(role_a, role_b, Aspect)` edges between them, and — for
//! Hourglass only — a forbidden aspect that must be absent from every pair.
//! The matcher in `pattern_engine` tries every assignment of a candidate
//! body tuple to roles and accepts the first that satisfies every
//! constraint; that one search loop replaces what would otherwise be one
//! hand-written detector per pattern.
//!
//! Stellium is not a fixed skeleton (it has no bound on body count) and is
//! handled separately by `pattern_engine`'s connected-component search.
//!
//! Hammer is named in the spec's pattern table as "vendor-defined (not in
//! hot path)" with no edge skeleton given anywhere in the specification.
//! Inventing one here would mean fabricating astrology with no grounding,
//! so it is intentionally not represented as a `Pattern` variant (see
//! DESIGN.md).

use super::aspect::Aspect;

/// A composite multi-body chart pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Pattern {
    TSquare,
    GrandTrine,
    Yod,
    GrandCross,
    Kite,
    MysticRectangle,
    Cradle,
    Boomerang,
    Butterfly,
    Hourglass,
    Pentagram,
    Hexagram,
    /// Not a fixed skeleton: any connected clique of >= 4 bodies all
    /// mutually in conjunction (§4.6).
    Stellium,
}

impl Pattern {
    pub fn title(self) -> &'static str {
        match self {
            Pattern::TSquare => "T-square",
            Pattern::GrandTrine => "Grand trine",
            Pattern::Yod => "Yod",
            Pattern::GrandCross => "Grand cross",
            Pattern::Kite => "Kite",
            Pattern::MysticRectangle => "Mystic rectangle",
            Pattern::Cradle => "Cradle",
            Pattern::Boomerang => "Boomerang",
            Pattern::Butterfly => "Butterfly",
            Pattern::Hourglass => "Hourglass",
            Pattern::Pentagram => "Pentagram",
            Pattern::Hexagram => "Hexagram",
            Pattern::Stellium => "Stellium",
        }
    }

    /// Minimum number of bodies required (exact, except Stellium which is a
    /// lower bound).
    pub fn body_count(self) -> usize {
        match self {
            Pattern::TSquare | Pattern::GrandTrine | Pattern::Yod => 3,
            Pattern::GrandCross
            | Pattern::Kite
            | Pattern::MysticRectangle
            | Pattern::Cradle
            | Pattern::Boomerang
            | Pattern::Butterfly
            | Pattern::Hourglass => 4,
            Pattern::Pentagram => 5,
            Pattern::Hexagram => 6,
            Pattern::Stellium => 4,
        }
    }

    /// The fixed-skeleton definition for this pattern, or `None` for
    /// `Stellium`, which has no fixed body count or edge skeleton.
    pub fn skeleton(self) -> Option<&'static PatternSkeleton> {
        PATTERN_SKELETONS.iter().find(|s| s.pattern == self)
    }
}

/// A required edge between two pattern roles (indices into the candidate
/// body tuple once a labeling has been chosen).
pub type RoleEdge = (usize, usize, Aspect);

/// A fixed-skeleton pattern definition: roles, required edges between them,
/// and (for Hourglass) a forbidden aspect.
#[derive(Debug, Clone, Copy)]
pub struct PatternSkeleton {
    pub pattern: Pattern,
    pub role_count: usize,
    pub required_edges: &'static [RoleEdge],
    /// If set, this aspect must be absent between *every* pair of roles,
    /// not just the ones named in `required_edges`.
    pub forbidden_among_all: Option<Aspect>,
}

use Aspect::*;

const T_SQUARE_EDGES: [RoleEdge; 3] = [(0, 1, Square), (0, 2, Square), (1, 2, Opposite)];
const GRAND_TRINE_EDGES: [RoleEdge; 3] = [(0, 1, Trine), (0, 2, Trine), (1, 2, Trine)];
const YOD_EDGES: [RoleEdge; 3] = [(0, 1, Quincunx), (0, 2, Quincunx), (1, 2, Sextile)];
const GRAND_CROSS_EDGES: [RoleEdge; 6] = [
    (0, 1, Square),
    (1, 2, Square),
    (2, 3, Square),
    (3, 0, Square),
    (0, 2, Opposite),
    (1, 3, Opposite),
];
const KITE_EDGES: [RoleEdge; 6] = [
    (0, 1, Trine),
    (0, 2, Trine),
    (1, 2, Trine),
    (0, 3, Opposite),
    (1, 3, Sextile),
    (2, 3, Sextile),
];
const MYSTIC_RECTANGLE_EDGES: [RoleEdge; 6] = [
    (0, 2, Opposite),
    (1, 3, Opposite),
    (0, 1, Sextile),
    (1, 2, Sextile),
    (2, 3, Sextile),
    (3, 0, Sextile),
];
const CRADLE_EDGES: [RoleEdge; 4] = [
    (0, 1, Sextile),
    (1, 2, Trine),
    (2, 3, Sextile),
    (3, 0, Trine),
];
const BOOMERANG_EDGES: [RoleEdge; 4] = [
    (0, 1, Quincunx),
    (0, 2, Quincunx),
    (1, 2, Sextile),
    (0, 3, Opposite),
];
const BUTTERFLY_EDGES: [RoleEdge; 6] = [
    (0, 1, Trine),
    (2, 3, Trine),
    (0, 2, Square),
    (1, 3, Square),
    (0, 3, Sextile),
    (1, 2, Sextile),
];
const HOURGLASS_EDGES: [RoleEdge; 2] = [(0, 2, Opposite), (1, 3, Opposite)];
const PENTAGRAM_EDGES: [RoleEdge; 5] = [
    (0, 2, Quintile),
    (2, 4, Quintile),
    (4, 1, Quintile),
    (1, 3, Quintile),
    (3, 0, Quintile),
];
const HEXAGRAM_EDGES: [RoleEdge; 12] = [
    (0, 2, Trine),
    (2, 4, Trine),
    (4, 0, Trine),
    (1, 3, Trine),
    (3, 5, Trine),
    (5, 1, Trine),
    (0, 1, Sextile),
    (1, 2, Sextile),
    (2, 3, Sextile),
    (3, 4, Sextile),
    (4, 5, Sextile),
    (5, 0, Sextile),
];

/// All fixed-skeleton patterns. `Stellium` is not here; see
/// `pattern_engine::detect_stellium`.
pub const PATTERN_SKELETONS: [PatternSkeleton; 12] = [
    PatternSkeleton {
        pattern: Pattern::TSquare,
        role_count: 3,
        required_edges: &T_SQUARE_EDGES,
        forbidden_among_all: None,
    },
    PatternSkeleton {
        pattern: Pattern::GrandTrine,
        role_count: 3,
        required_edges: &GRAND_TRINE_EDGES,
        forbidden_among_all: None,
    },
    PatternSkeleton {
        pattern: Pattern::Yod,
        role_count: 3,
        required_edges: &YOD_EDGES,
        forbidden_among_all: None,
    },
    PatternSkeleton {
        pattern: Pattern::GrandCross,
        role_count: 4,
        required_edges: &GRAND_CROSS_EDGES,
        forbidden_among_all: None,
    },
    PatternSkeleton {
        pattern: Pattern::Kite,
        role_count: 4,
        required_edges: &KITE_EDGES,
        forbidden_among_all: None,
    },
    PatternSkeleton {
        pattern: Pattern::MysticRectangle,
        role_count: 4,
        required_edges: &MYSTIC_RECTANGLE_EDGES,
        forbidden_among_all: None,
    },
    PatternSkeleton {
        pattern: Pattern::Cradle,
        role_count: 4,
        required_edges: &CRADLE_EDGES,
        forbidden_among_all: None,
    },
    PatternSkeleton {
        pattern: Pattern::Boomerang,
        role_count: 4,
        required_edges: &BOOMERANG_EDGES,
        forbidden_among_all: None,
    },
    PatternSkeleton {
        pattern: Pattern::Butterfly,
        role_count: 4,
        required_edges: &BUTTERFLY_EDGES,
        forbidden_among_all: None,
    },
    PatternSkeleton {
        pattern: Pattern::Hourglass,
        role_count: 4,
        required_edges: &HOURGLASS_EDGES,
        forbidden_among_all: Some(Sextile),
    },
    PatternSkeleton {
        pattern: Pattern::Pentagram,
        role_count: 5,
        required_edges: &PENTAGRAM_EDGES,
        forbidden_among_all: None,
    },
    PatternSkeleton {
        pattern: Pattern::Hexagram,
        role_count: 6,
        required_edges: &HEXAGRAM_EDGES,
        forbidden_among_all: None,
    },
];

impl PartialEq for PatternSkeleton {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_non_stellium_pattern_has_a_skeleton() {
        for pattern in [
            Pattern::TSquare,
            Pattern::GrandTrine,
            Pattern::Yod,
            Pattern::GrandCross,
            Pattern::Kite,
            Pattern::MysticRectangle,
            Pattern::Cradle,
            Pattern::Boomerang,
            Pattern::Butterfly,
            Pattern::Hourglass,
            Pattern::Pentagram,
            Pattern::Hexagram,
        ] {
            let skeleton = pattern.skeleton().expect("fixed skeleton");
            assert_eq!(skeleton.role_count, pattern.body_count());
        }
        assert!(Pattern::Stellium.skeleton().is_none());
    }

    #[test]
    fn skeleton_role_indices_are_in_range() {
        for skeleton in PATTERN_SKELETONS.iter() {
            for &(a, b, _) in skeleton.required_edges {
                assert!(a < skeleton.role_count);
                assert!(b < skeleton.role_count);
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn hourglass_forbids_sextile() {
        let hourglass = Pattern::Hourglass.skeleton().unwrap();
        assert_eq!(hourglass.forbidden_among_all, Some(Aspect::Sextile));
    }
}
