// Copyright (c) 2023 Mike Tsao. All rights reserved.

//! The capability contract the scheduler needs from a MIDI back-end. The
//! concrete `midir`-backed implementation and the in-memory test double
//! live in the `arpio-midi-interface` crate; they're declared here rather
//! than there so the scheduler can depend on the trait without the core
//! crate depending back on its own downstream implementer.

use crate::midi::{MidiChannel, MidiEventKind};

/// One event queued for real-time release by a [MidiBackend].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QueuedEvent {
    pub kind: MidiEventKind,
    pub channel: MidiChannel,
    pub port: u8,
    /// Absolute release time, in nanoseconds on the back-end's own clock.
    pub release_at_ns: i64,
}

/// Condition used to select which queued events a `remove_events` call
/// drops. Matches the "ignore note-off" flush used when stopping the
/// queue: everything pending is dropped except events that would turn a
/// note off, which are instead released immediately.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RemoveCondition {
    All,
    AllExceptNoteOff,
}

/// Duplex MIDI client: one input port, up to
/// [MidiBackend::MAX_OUTPUT_PORTS] output ports, a release-by-real-time
/// priority queue, self-directed echo scheduling, and direct (non-queued)
/// send for unmatched-event forwarding.
pub trait MidiBackend: Send {
    const MAX_OUTPUT_PORTS: u8 = 20;

    /// Enqueues an event for release at `release_at_ns`.
    fn schedule_event(&mut self, event: QueuedEvent) -> anyhow::Result<()>;

    /// Sends an echo event back to this backend's own input port, to be
    /// delivered (and reclassified by the scheduler as `Echo { infotag }`)
    /// at `release_at_ns`.
    fn schedule_echo(&mut self, infotag: u8, release_at_ns: i64) -> anyhow::Result<()>;

    /// Sends an event immediately, bypassing the release queue. Used for
    /// unmatched-event forwarding.
    fn send_direct(&mut self, kind: MidiEventKind, channel: MidiChannel, port: u8) -> anyhow::Result<()>;

    /// Drops (or releases, per `condition`) every event still pending in
    /// the output queue.
    fn remove_events(&mut self, condition: RemoveCondition);

    /// Non-blocking poll for the next input event, if any arrived.
    fn poll_input(&mut self) -> Option<(MidiEventKind, MidiChannel)>;

    /// Current reading of this back-end's own monotonic clock, in
    /// nanoseconds since some arbitrary epoch fixed at construction. The
    /// transport anchors [ClockSource::Internal](crate::transport::ClockSource::Internal)
    /// tick derivation to this clock rather than the scheduler's own, since
    /// only the back-end knows which clock its `release_at_ns` timestamps
    /// are measured against.
    fn now_ns(&self) -> i64;

    /// Backend-specific upkeep called once per run-loop iteration, e.g.
    /// releasing queued events whose real time has arrived. A no-op for
    /// back-ends (like the in-memory fake) that need no periodic work.
    fn maintain(&mut self) {}
}
