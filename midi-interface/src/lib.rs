// Copyright (c) 2023 Mike Tsao. All rights reserved.

#![warn(missing_docs)]

//! Concrete [MidiBackend] implementations: a `midir`-backed duplex client
//! for real hardware/software ports, and an in-memory fake for tests.
//!
//! Grounded on `imbolc-core/src/midi/mod.rs`'s connect/poll/parse shape,
//! generalized from a single input-only manager to the duplex,
//! multi-output-port, release-queue contract `arpio-core`'s scheduler
//! requires.

use anyhow::{anyhow, Context};
use arpio_core::backend::{MidiBackend, QueuedEvent, RemoveCondition};
use arpio_core::error::EngineError;
use arpio_core::midi::{MidiChannel, MidiEventKind};
use crossbeam_channel::{Receiver, Sender};
use midir::{MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};
use std::collections::BinaryHeap;
use std::time::Instant;

mod parse;
pub use parse::parse_live_event;

/// Upper bound on pending release-queue entries before a scheduled event is
/// dropped as an overflow rather than queued indefinitely.
const MAX_QUEUED_RELEASES: usize = 4096;

/// A single port name/index pair as reported by `midir`.
#[derive(Clone, Debug, PartialEq)]
pub struct PortInfo {
    pub index: usize,
    pub name: String,
}

/// Lists the currently visible input ports for the given client name.
pub fn list_input_ports(client_name: &str) -> anyhow::Result<Vec<PortInfo>> {
    let midi_in = MidiInput::new(client_name).context("failed to open MIDI input client")?;
    Ok(midi_in
        .ports()
        .iter()
        .enumerate()
        .filter_map(|(index, port)| {
            midi_in
                .port_name(port)
                .ok()
                .map(|name| PortInfo { index, name })
        })
        .collect())
}

/// An event ordered for release-by-real-time in [MidirBackend]'s output
/// queue. Reverse-ordered so the earliest `release_at_ns` sorts to the top
/// of a max-heap [BinaryHeap].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct PendingRelease {
    release_at_ns: std::cmp::Reverse<i64>,
    is_note_off: bool,
    port: u8,
    note: u8,
    channel: u8,
    velocity: u8,
}

/// `midir`-backed duplex client: one input connection, up to
/// [MidiBackend::MAX_OUTPUT_PORTS] output connections, and a release queue
/// serviced by polling wall-clock time against each pending event's
/// `release_at_ns`.
pub struct MidirBackend {
    _input: MidiInputConnection<()>,
    outputs: Vec<MidiOutputConnection>,
    input_rx: Receiver<(MidiEventKind, MidiChannel)>,
    echo_tx: Sender<(MidiEventKind, MidiChannel)>,
    echo_rx: Receiver<(MidiEventKind, MidiChannel)>,
    queue: BinaryHeap<PendingRelease>,
    anchor: Instant,
}
impl MidirBackend {
    /// `max_ports` overrides [MidiBackend::MAX_OUTPUT_PORTS] for this
    /// connection, so callers can tighten or loosen the cap via
    /// `EngineConfig` without touching the trait's compiled-in default.
    pub fn connect(
        client_name: &str,
        input_port_index: usize,
        output_port_indices: &[usize],
        max_ports: u8,
    ) -> anyhow::Result<Self> {
        if output_port_indices.len() > max_ports as usize {
            return Err(anyhow!(
                "requested {} output ports, max is {}",
                output_port_indices.len(),
                max_ports
            ));
        }

        let midi_in = MidiInput::new(client_name).context("failed to open MIDI input client")?;
        let in_ports = midi_in.ports();
        let in_port = in_ports
            .get(input_port_index)
            .ok_or_else(|| anyhow!("no input port at index {input_port_index}"))?;

        let (tx, rx) = crossbeam_channel::unbounded();
        let connection = midi_in
            .connect(
                in_port,
                "arpio-input",
                move |_timestamp, message, _| {
                    if let Some((kind, channel)) = parse::parse_live_event(message) {
                        let _ = tx.send((kind, channel));
                    }
                },
                (),
            )
            .map_err(|e| anyhow!("failed to connect MIDI input: {e}"))?;

        let midi_out = MidiOutput::new(client_name).context("failed to open MIDI output client")?;
        let out_ports = midi_out.ports();
        let mut outputs = Vec::with_capacity(output_port_indices.len());
        for &index in output_port_indices {
            let midi_out = MidiOutput::new(client_name).context("failed to open MIDI output client")?;
            let port = out_ports
                .get(index)
                .ok_or_else(|| anyhow!("no output port at index {index}"))?;
            let conn = midi_out
                .connect(port, "arpio-output")
                .map_err(|e| anyhow!("failed to connect MIDI output {index}: {e}"))?;
            outputs.push(conn);
        }

        let (echo_tx, echo_rx) = crossbeam_channel::unbounded();

        Ok(Self {
            _input: connection,
            outputs,
            input_rx: rx,
            echo_tx,
            echo_rx,
            queue: BinaryHeap::new(),
            anchor: Instant::now(),
        })
    }

    /// Releases every pending event whose `release_at_ns` has passed.
    /// Call this from the driver's poll loop.
    pub fn pump_releases(&mut self) {
        let now = self.now_ns();
        while let Some(top) = self.queue.peek() {
            if top.release_at_ns.0 > now {
                break;
            }
            let ev = self.queue.pop().unwrap();
            let status = if ev.is_note_off { 0x80 } else { 0x90 } | (ev.channel & 0x0F);
            let bytes = [status, ev.note, ev.velocity];
            if let Some(out) = self.outputs.get_mut(ev.port as usize) {
                if let Err(err) = out.send(&bytes) {
                    log::warn!("failed to release queued event: {err}");
                }
            }
        }
    }
}
impl MidiBackend for MidirBackend {
    fn schedule_event(&mut self, event: QueuedEvent) -> anyhow::Result<()> {
        let (is_note_off, note, velocity) = match event.kind {
            MidiEventKind::NoteOn { note, velocity } => (false, note, velocity),
            MidiEventKind::NoteOff { note } => (true, note, 0),
            MidiEventKind::Controller { param, value } => {
                if let Some(out) = self.outputs.get_mut(event.port as usize) {
                    let status = 0xB0 | (u8::from(event.channel) & 0x0F);
                    out.send(&[status, param, value])
                        .map_err(|e| anyhow!("failed to send controller event: {e}"))?;
                }
                return Ok(());
            }
            _ => return Ok(()),
        };
        if self.queue.len() >= MAX_QUEUED_RELEASES {
            log::debug!("{}", EngineError::OverflowedQueue);
            return Ok(());
        }
        self.queue.push(PendingRelease {
            release_at_ns: std::cmp::Reverse(event.release_at_ns),
            is_note_off,
            port: event.port,
            note,
            channel: event.channel.into(),
            velocity,
        });
        Ok(())
    }

    fn schedule_echo(&mut self, infotag: u8, release_at_ns: i64) -> anyhow::Result<()> {
        let tx = self.echo_tx.clone();
        let now = self.now_ns();
        let delay_ns = (release_at_ns - now).max(0);
        // A real driver would arm a timer; tests exercise FakeBackend's
        // synchronous variant instead of sleeping in-process here.
        std::thread::Builder::new()
            .name("arpio-echo".into())
            .spawn(move || {
                std::thread::sleep(std::time::Duration::from_nanos(delay_ns as u64));
                let _ = tx.send((MidiEventKind::Echo { infotag }, MidiChannel::default()));
            })
            .map_err(|e| anyhow!("failed to arm echo timer: {e}"))?;
        Ok(())
    }

    fn send_direct(&mut self, kind: MidiEventKind, channel: MidiChannel, port: u8) -> anyhow::Result<()> {
        let Some(out) = self.outputs.get_mut(port as usize) else {
            return Err(anyhow!("no output port {port}"));
        };
        let bytes = match kind {
            MidiEventKind::NoteOn { note, velocity } => {
                [0x90 | (u8::from(channel) & 0x0F), note, velocity]
            }
            MidiEventKind::NoteOff { note } => [0x80 | (u8::from(channel) & 0x0F), note, 0],
            MidiEventKind::Controller { param, value } => {
                [0xB0 | (u8::from(channel) & 0x0F), param, value]
            }
            _ => return Ok(()),
        };
        out.send(&bytes).map_err(|e| anyhow!("failed to send direct event: {e}"))
    }

    fn remove_events(&mut self, condition: RemoveCondition) {
        match condition {
            RemoveCondition::All => self.queue.clear(),
            RemoveCondition::AllExceptNoteOff => {
                let now = self.now_ns();
                let kept: Vec<_> = self
                    .queue
                    .drain()
                    .filter(|ev| {
                        if ev.is_note_off {
                            let status = 0x80 | (ev.channel & 0x0F);
                            if let Some(out) = self.outputs.get_mut(ev.port as usize) {
                                let _ = out.send(&[status, ev.note, 0]);
                            }
                            false
                        } else {
                            now < ev.release_at_ns.0
                        }
                    })
                    .collect();
                self.queue.extend(kept);
            }
        }
    }

    fn poll_input(&mut self) -> Option<(MidiEventKind, MidiChannel)> {
        if let Ok(echoed) = self.echo_rx.try_recv() {
            return Some(echoed);
        }
        self.input_rx.try_recv().ok()
    }

    fn maintain(&mut self) {
        self.pump_releases();
    }

    fn now_ns(&self) -> i64 {
        self.anchor.elapsed().as_nanos() as i64
    }
}

/// In-memory test double: records every scheduled/sent/removed event and
/// lets a test inject input/echo events without a real port.
#[derive(Default)]
pub struct FakeBackend {
    pub scheduled: Vec<QueuedEvent>,
    pub direct_sent: Vec<(MidiEventKind, MidiChannel, u8)>,
    pub echoes: Vec<(u8, i64)>,
    pub removals: Vec<RemoveCondition>,
    injected_input: std::collections::VecDeque<(MidiEventKind, MidiChannel)>,
    clock_ns: std::cell::Cell<i64>,
}
impl FakeBackend {
    pub fn inject_input(&mut self, kind: MidiEventKind, channel: MidiChannel) {
        self.injected_input.push_back((kind, channel));
    }
}
impl MidiBackend for FakeBackend {
    fn schedule_event(&mut self, event: QueuedEvent) -> anyhow::Result<()> {
        self.scheduled.push(event);
        Ok(())
    }

    fn schedule_echo(&mut self, infotag: u8, release_at_ns: i64) -> anyhow::Result<()> {
        self.echoes.push((infotag, release_at_ns));
        Ok(())
    }

    fn send_direct(&mut self, kind: MidiEventKind, channel: MidiChannel, port: u8) -> anyhow::Result<()> {
        self.direct_sent.push((kind, channel, port));
        Ok(())
    }

    fn remove_events(&mut self, condition: RemoveCondition) {
        self.removals.push(condition);
    }

    fn poll_input(&mut self) -> Option<(MidiEventKind, MidiChannel)> {
        self.injected_input.pop_front()
    }

    fn now_ns(&self) -> i64 {
        let t = self.clock_ns.get();
        self.clock_ns.set(t + 1_000_000);
        t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arpio_core::midi::MidiEventKind;

    #[test]
    fn fake_backend_records_scheduled_events() {
        let mut backend = FakeBackend::default();
        backend
            .schedule_event(QueuedEvent {
                kind: MidiEventKind::NoteOn {
                    note: 60,
                    velocity: 100,
                },
                channel: MidiChannel::default(),
                port: 0,
                release_at_ns: 1000,
            })
            .unwrap();
        assert_eq!(backend.scheduled.len(), 1);
    }

    #[test]
    fn fake_backend_replays_injected_input_fifo() {
        let mut backend = FakeBackend::default();
        backend.inject_input(MidiEventKind::NoteOn { note: 60, velocity: 100 }, MidiChannel::default());
        backend.inject_input(MidiEventKind::NoteOff { note: 60 }, MidiChannel::default());
        assert!(matches!(
            backend.poll_input(),
            Some((MidiEventKind::NoteOn { .. }, _))
        ));
        assert!(matches!(
            backend.poll_input(),
            Some((MidiEventKind::NoteOff { .. }, _))
        ));
        assert!(backend.poll_input().is_none());
    }

    #[test]
    fn fake_backend_records_remove_condition() {
        let mut backend = FakeBackend::default();
        backend.remove_events(RemoveCondition::AllExceptNoteOff);
        assert_eq!(backend.removals, vec![RemoveCondition::AllExceptNoteOff]);
    }
}
