// Copyright (c) 2023 Mike Tsao. All rights reserved.

use std::fmt::{self, Display, Formatter};

/// Operational error kinds that never propagate across a worker or
/// scheduler boundary as a `Result`; they are constructed, logged with
/// `log::debug!`, and discarded. Startup failures (missing or
/// unavailable MIDI ports) are fatal instead, and are reported by the
/// `midi-interface` crate as `anyhow::Error` rather than through this
/// enum.
#[derive(Clone, Debug, PartialEq)]
pub enum EngineError {
    /// A host-transport connection was lost or never came up; the
    /// transport demotes itself to [crate::transport::ClockSource::Internal].
    HostTransportUnavailable,
    /// The back-end's output queue reported more pending events than it
    /// could hold; the overflowed batch is dropped and the next echo
    /// cycle re-synchronises via the catch-up step in `SeqWorker`.
    OverflowedQueue,
    /// A recalibration reading was rejected as implausible (zero or
    /// slower than the current tempo would allow).
    ImplausibleTempo,
    /// A record-mode write targeted a step outside the pattern; it was
    /// clipped to the valid range instead of failing.
    RecordRangeViolation,
    /// A mouse-normalised mutator input outside `[0,1]` was clipped.
    Clipped(&'static str),
}
impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::HostTransportUnavailable => write!(f, "host transport unavailable"),
            Self::OverflowedQueue => write!(f, "back-end output queue overflowed"),
            Self::ImplausibleTempo => write!(f, "rejected implausible tempo recalibration"),
            Self::RecordRangeViolation => write!(f, "record step out of range, clipped"),
            Self::Clipped(field) => write!(f, "{field} input clipped to valid range"),
        }
    }
}
impl std::error::Error for EngineError {}
