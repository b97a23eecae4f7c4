//! # Astro-Calendar Event Engine
//!
//! A minute-resolution detector for astronomical and astrological
//! phenomena: aspects between bodies, composite chart patterns, eclipses,
//! lunar/solar phases, and daily rise/zenith/set/nadir cycles, together
//! with their forming/exact/dissolving (or beginning/maximum/ending)
//! phase transitions.
//!
//! ## Shape of the crate
//!
//! - [`catalog`] — the fixed compile-time tables: bodies, aspects, chart
//!   patterns, phase vocabularies.
//! - [`math`] — angle arithmetic on the circle, shared by every detector.
//! - [`discriminator`] — the three-sample primitive every aspect/cycle/
//!   pattern detector reduces to.
//! - [`ephemeris`] — the read-only position view detectors program
//!   against, plus the network provider and analytic fallback that can
//!   satisfy it.
//! - [`aspect_detector`], [`pattern_engine`], [`cycles`] — the detectors
//!   themselves.
//! - [`events`] — the immutable event data model.
//! - [`duration_pairer`] — folds point events into intervals.
//! - [`driver`] — the minute-by-minute loop that ties the above together.
//! - [`config`] — run configuration, loaded from TOML.
//! - [`sink`] — the produced-event interface and a minimal line sink.
//!
//! Detection is single-threaded and purely sequential: each minute's
//! computation depends only on three adjacent ephemeris samples and the
//! read-only catalog tables (§5 of the governing spec). Everything here
//! treats a missing ephemeris sample as a per-minute, per-body skip, never
//! a crash.

pub mod aspect_detector;
pub mod catalog;
pub mod config;
pub mod cycles;
pub mod discriminator;
pub mod driver;
pub mod duration_pairer;
pub mod ephemeris;
pub mod events;
pub mod math;
pub mod pattern_engine;
pub mod sink;
