// Copyright (c) 2023 Mike Tsao. All rights reserved.

//! Derives the current integer tick from whichever of the three clock
//! sources is active. Grounded on `seqdriver.cpp`'s `resetTicks` and the
//! per-source `tick` derivation it performs each `handleEcho`.

use crate::error::EngineError;
use crate::registry::ModuleRegistry;
use crate::tick_clock::{TickClock, PPQN};

/// Standard MIDI clock rate: 24 pulses per quarter note.
pub const MIDICLK_PPQ: u32 = 24;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HostPosition {
    pub frame: i64,
    pub frame_rate: f64,
    pub bpm: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum ClockSource {
    #[default]
    Internal,
    MidiClock,
    HostTransport,
}

/// Owns the active [ClockSource] and whatever per-source bookkeeping it
/// needs to derive the current tick: the internal anchor instant, the
/// running MIDI-clock pulse count, and the host-transport bar-alignment
/// offset.
#[derive(Debug)]
pub struct TransportController {
    source: ClockSource,
    clock: TickClock,
    anchor_ns: f64,
    midi_tick_count: i64,
    midiclk_ppq: u32,
    jack_offset_tick: i64,
    running: bool,
}
impl Default for TransportController {
    fn default() -> Self {
        Self {
            source: ClockSource::default(),
            clock: TickClock::default(),
            anchor_ns: 0.0,
            midi_tick_count: 0,
            midiclk_ppq: MIDICLK_PPQ,
            jack_offset_tick: 0,
            running: false,
        }
    }
}
impl TransportController {
    pub fn new_with_tempo(tempo_bpm: f64) -> Self {
        Self {
            clock: TickClock::new_with_tempo(tempo_bpm),
            ..Self::default()
        }
    }

    /// Overrides the MIDI-clock pulses-per-quarter-note rate used by
    /// [TransportController::midi_clock_tick], e.g. from `EngineConfig`.
    pub fn set_midiclk_ppq(&mut self, ppq: u32) {
        self.midiclk_ppq = ppq;
    }

    pub fn source(&self) -> ClockSource {
        self.source
    }

    pub fn clock(&self) -> &TickClock {
        &self.clock
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Switches the active clock source, stopping the queue and resetting
    /// every worker's per-module tick. The caller re-arms an echo at `t=0`
    /// on the next `handle_echo` call.
    pub fn set_source(&mut self, source: ClockSource, registry: &mut ModuleRegistry) {
        self.source = source;
        self.reset_ticks(registry);
    }

    pub fn set_transport_status(&mut self, running: bool) {
        self.running = running;
    }

    /// Anchors [ClockSource::Internal] tick derivation to `now_ns`, a real
    /// reading of the back-end's clock. Called when the queue starts so
    /// that `tick_from_wall_time` measures elapsed time from the moment
    /// playback began rather than from an arbitrary zero.
    pub fn arm_internal_anchor(&mut self, now_ns: i64) {
        self.anchor_ns = now_ns as f64;
    }

    /// Internal-mode tick derivation from a wall-clock reading.
    pub fn tick_from_wall_time(&self, wall_time_ns: f64) -> i64 {
        self.clock.ns_to_ticks(wall_time_ns - self.anchor_ns)
    }

    /// Advances the MIDI-clock pulse counter on a `Clock` message and
    /// returns the derived tick.
    pub fn advance_midi_clock(&mut self) -> i64 {
        self.midi_tick_count += 1;
        self.midi_clock_tick()
    }

    /// Reads the tick derived from the current MIDI-clock pulse count,
    /// without advancing it.
    pub fn midi_clock_tick(&self) -> i64 {
        self.midi_tick_count * PPQN as i64 / self.midiclk_ppq as i64
    }

    /// Host-transport tick derivation. Adopts the host's reported tempo if
    /// it's plausible (`bpm > 0`), then derives the tick from the host's
    /// frame position, subtracting the bar-alignment offset established by
    /// the last `reset_ticks`.
    pub fn tick_from_host_position(&mut self, pos: HostPosition) -> i64 {
        if pos.bpm > 0.0 {
            self.clock.set_tempo(pos.bpm);
        }
        if pos.frame_rate <= 0.0 {
            log::debug!("{}", EngineError::HostTransportUnavailable);
            return -1;
        }
        let ticks = pos.frame as f64 * PPQN as f64 / pos.frame_rate * self.clock.tempo() / 60.0;
        ticks.round() as i64 - self.jack_offset_tick
    }

    /// Zeroes every per-module and family tick, clears pending arp note
    /// buffers, resets all `SeqWorker` cursors to 0, and — for
    /// [ClockSource::HostTransport] only — recomputes `jack_offset_tick`
    /// from the given current host position so a restart preserves bar
    /// alignment.
    pub fn reset_ticks(&mut self, registry: &mut ModuleRegistry) {
        self.running = false;
        self.midi_tick_count = 0;
        registry.reset_all_ticks();
        if !matches!(self.source, ClockSource::HostTransport) {
            self.jack_offset_tick = 0;
        }
    }

    /// Recomputes `jack_offset_tick` from the host's current reported
    /// position, called only when [ClockSource::HostTransport] is active.
    pub fn realign_to_host(&mut self, pos: HostPosition) {
        if !matches!(self.source, ClockSource::HostTransport) || pos.frame_rate <= 0.0 {
            return;
        }
        self.jack_offset_tick =
            (pos.frame as f64 * PPQN as f64 / pos.frame_rate * self.clock.tempo() / 60.0).round() as i64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_tick_tracks_elapsed_wall_time() {
        let mut t = TransportController::new_with_tempo(120.0);
        t.anchor_ns = 0.0;
        let ns = t.clock().ticks_to_ns(192);
        assert_eq!(t.tick_from_wall_time(ns), 192);
    }

    #[test]
    fn midi_clock_derives_ppqn_ticks_from_pulses() {
        let mut t = TransportController::default();
        for _ in 0..MIDICLK_PPQ {
            t.advance_midi_clock();
        }
        assert_eq!(t.advance_midi_clock() - PPQN as i64 / MIDICLK_PPQ as i64, PPQN as i64);
    }

    #[test]
    fn host_position_with_zero_frame_rate_is_implausible() {
        let mut t = TransportController::default();
        let tick = t.tick_from_host_position(HostPosition {
            frame: 100,
            frame_rate: 0.0,
            bpm: 120.0,
        });
        assert_eq!(tick, -1);
    }

    #[test]
    fn reset_ticks_zeroes_registry_and_stops_queue() {
        let mut t = TransportController::default();
        t.set_transport_status(true);
        let mut registry = ModuleRegistry::default();
        t.reset_ticks(&mut registry);
        assert!(!t.is_running());
        assert_eq!(registry.seq_min_next_tick(), 0);
    }

    #[test]
    fn set_source_resets_ticks() {
        let mut t = TransportController::default();
        t.set_transport_status(true);
        let mut registry = ModuleRegistry::default();
        t.set_source(ClockSource::MidiClock, &mut registry);
        assert_eq!(t.source(), ClockSource::MidiClock);
        assert!(!t.is_running());
    }
}
