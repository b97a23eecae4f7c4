//! Phase vocabularies shared by every detector.

/// Phase of an aspect's (or pattern's) life within orb: entering, crossing
/// the exact angle, leaving. Precedence when more than one condition
/// applies at a single sample is exact > forming > dissolving (§4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum AspectPhase {
    Forming,
    Exact,
    Dissolving,
}

impl AspectPhase {
    /// Summary glyph prefix used at the sink boundary (§6).
    pub fn marker(self) -> &'static str {
        match self {
            AspectPhase::Forming => "\u{2192}",   // →
            AspectPhase::Exact => "\u{1F3AF}",    // 🎯
            AspectPhase::Dissolving => "\u{2190}", // ←
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            AspectPhase::Forming => "forming",
            AspectPhase::Exact => "exact",
            AspectPhase::Dissolving => "dissolving",
        }
    }

    /// Maps the aspect vocabulary onto the bounded-cycle one: the eclipse
    /// detector reuses the forming/exact/dissolving discriminator but
    /// reports in beginning/maximum/ending terms (§4.7).
    pub fn as_event_phase(self) -> EventPhase {
        match self {
            AspectPhase::Forming => EventPhase::Beginning,
            AspectPhase::Exact => EventPhase::Maximum,
            AspectPhase::Dissolving => EventPhase::Ending,
        }
    }
}

/// Phase of a bounded cycle event: beginning, maximum (or culmination/
/// extremum), ending. Used by eclipses and the daily/monthly cycle
/// detectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum EventPhase {
    Beginning,
    Maximum,
    Ending,
}

impl EventPhase {
    pub fn marker(self) -> &'static str {
        match self {
            EventPhase::Beginning => "\u{25B6}", // ▶
            EventPhase::Maximum => "\u{1F3AF}",  // 🎯
            EventPhase::Ending => "\u{25C0}",    // ◀
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            EventPhase::Beginning => "beginning",
            EventPhase::Maximum => "maximum",
            EventPhase::Ending => "ending",
        }
    }
}
