//! The event sink boundary (§6): a trait every consumer of this crate's
//! detection output implements, plus a minimal line-oriented text sink
//! used by the CLI binary. Full iCalendar emission is out of scope (§1
//! Non-goals) — this module exists only to the depth needed to
//! demonstrate the produced-interface contract end to end.

use std::io::Write;

use thiserror::Error;

use crate::events::EmittedEvent;

/// Sink-side failures. Always fatal for the write that triggered them —
/// there is no recoverable-per-event notion at this boundary.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("event sink write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// What every event consumer implements: a linear, write-only stream of
/// emitted events, one at a time, in the order the driver hands them over
/// (nondecreasing timestamp, per §5).
pub trait EventSink {
    fn emit(&mut self, event: EmittedEvent) -> Result<(), SinkError>;
}

/// A plain line-oriented sink: one line per event, `start/end ISO-8601
/// timestamps, then the summary`. Used by the CLI binary's stdout/file
/// output; not a substitute for the iCalendar serializer named as an
/// external collaborator in §1.
pub struct LineSink<W: Write> {
    writer: W,
}

impl<W: Write> LineSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> EventSink for LineSink<W> {
    fn emit(&mut self, event: EmittedEvent) -> Result<(), SinkError> {
        writeln!(
            self.writer,
            "{}\t{}\t{}\t{}",
            event.start.to_rfc3339(),
            event.end.to_rfc3339(),
            event.summary,
            event.description,
        )?;
        Ok(())
    }
}
