// Copyright (c) 2023 Mike Tsao. All rights reserved.

#![warn(missing_docs)]

//! Timing and scheduling engine for a MIDI arpeggiator/LFO/step-sequencer
//! rack: nanosecond-to-tick conversion, three interchangeable clock
//! sources, an echo-based look-ahead scheduler, and the monophonic
//! step-sequencer worker.

/// The capability contract the scheduler needs from a MIDI back-end.
pub mod backend;
/// Overridable engine constants.
pub mod config;
/// Operational error kinds.
pub mod error;
/// Observer signals (`EngineEvent`) posted from the run loop.
pub mod events;
/// MIDI primitives: channels, notes, General MIDI program tables, and the
/// classified event type the rest of the crate schedules against.
pub mod midi;
/// Owns the ordered per-family worker lists and their per-module
/// scheduling state.
pub mod registry;
/// Classifies incoming events and dispatches them to workers by channel.
pub mod router;
/// The single-threaded run loop: input classification, echo-driven
/// scheduling, and re-arming.
pub mod scheduler;
/// The monophonic step-sequencer worker.
pub mod seq_worker;
/// Opaque session (de)serialisation over a [registry::ModuleRegistry].
pub mod session;
/// Bidirectional nanosecond-tick conversion.
pub mod tick_clock;
/// Derives the current tick from whichever clock source is active.
pub mod transport;
/// External interface to the LFO and Arp module families.
pub mod worker;

/// Recommended imports for easy onboarding.
pub mod prelude {
    pub use crate::backend::{MidiBackend, QueuedEvent, RemoveCondition};
    pub use crate::config::EngineConfig;
    pub use crate::error::EngineError;
    pub use crate::events::{EngineEvent, EventBus};
    pub use crate::midi::prelude::*;
    pub use crate::registry::{ModuleHandle, ModuleRegistry};
    pub use crate::router::MidiRouter;
    pub use crate::scheduler::Scheduler;
    pub use crate::seq_worker::{Sample, SeqBehavior, SeqPattern, SeqWorker};
    pub use crate::session::SessionSnapshot;
    pub use crate::tick_clock::{TickClock, PPQN};
    pub use crate::transport::{ClockSource, TransportController};
    pub use crate::worker::{ArpNote, ArpWorker, Frame, LfoWorker};
}
