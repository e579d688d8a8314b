// Copyright (c) 2023 Mike Tsao. All rights reserved.

//! The single-threaded run loop: classifies input events, and on each echo
//! cycle queries every due module, schedules its output, and re-arms the
//! next echo at the minimum next-due tick across all families. Grounded on
//! `seqdriver.cpp`'s `run`/`handleEvent`/`handleEcho`/`requestEchoAt`.

use crate::backend::{MidiBackend, QueuedEvent, RemoveCondition};
use crate::config::EngineConfig;
use crate::events::{EngineEvent, EventBus};
use crate::midi::{MidiChannel, MidiEventKind};
use crate::registry::ModuleRegistry;
use crate::router::MidiRouter;
use crate::tick_clock::PPQN;
use crate::transport::{ClockSource, TransportController};
use crossbeam_channel::Receiver;

/// Look-ahead window: a module is serviced once its due tick comes within
/// this many ticks of the current tick, absorbing dispatch latency.
pub const LOOKAHEAD_TICKS: i64 = 8;

/// Arp modules schedule their first event this many ticks after the
/// current tick, rather than relying on the look-ahead window.
pub const ARP_SCHED_DELAY_TICKS: i64 = 2;

/// `infotag` value meaning "ordinary echo, service every due module".
pub const INFOTAG_NORMAL: u8 = 0;
/// `infotag` value meaning "service only the module that requested a
/// keyboard-triggered restart".
pub const INFOTAG_KBD_TRIGGER: u8 = 2;

pub struct Scheduler<B: MidiBackend> {
    pub registry: ModuleRegistry,
    pub router: MidiRouter,
    pub transport: TransportController,
    backend: B,
    events: EventBus,
    last_sched_tick: i64,
    forward_port: u8,
    lookahead_ticks: i64,
    arp_sched_delay_ticks: i64,
    midi_controllable: bool,
}
impl<B: MidiBackend> Scheduler<B> {
    /// Builds a scheduler with `config`'s overridable look-ahead/delay/
    /// controllability fields. `registry`/`router`/`transport`/`backend`
    /// are still assembled by the caller, matching the teacher's
    /// constructor-injection style.
    pub fn new(
        registry: ModuleRegistry,
        router: MidiRouter,
        transport: TransportController,
        backend: B,
        config: &EngineConfig,
    ) -> Self {
        Self {
            registry,
            router,
            transport,
            backend,
            events: EventBus::default(),
            last_sched_tick: -1,
            forward_port: 0,
            lookahead_ticks: config.lookahead_ticks,
            arp_sched_delay_ticks: config.sched_delay_ticks,
            midi_controllable: config.midi_controllable,
        }
    }

    /// Registers a new [EngineEvent] observer. Subscribers must tolerate
    /// events arriving on whatever thread drives [Scheduler::step].
    pub fn subscribe(&mut self) -> Receiver<EngineEvent> {
        self.events.subscribe()
    }

    /// Classifies and handles one input event.
    pub fn handle_input(&mut self, kind: MidiEventKind, channel: MidiChannel) {
        match kind {
            MidiEventKind::Clock => {
                if matches!(self.transport.source(), ClockSource::MidiClock) {
                    let tick = self.transport.advance_midi_clock();
                    let due = tick + self.lookahead_ticks >= self.registry.seq_min_next_tick()
                        || tick + self.lookahead_ticks >= self.registry.lfo_min_next_tick();
                    if due {
                        self.handle_echo(INFOTAG_NORMAL);
                    }
                }
            }
            MidiEventKind::Echo { infotag } => self.handle_echo(infotag),
            MidiEventKind::Start => {
                if matches!(self.transport.source(), ClockSource::MidiClock) {
                    self.transport.set_transport_status(true);
                }
            }
            MidiEventKind::Stop => {
                if matches!(self.transport.source(), ClockSource::MidiClock) {
                    self.set_transport_status(false);
                }
            }
            MidiEventKind::NoteOn { .. } | MidiEventKind::NoteOff { .. } | MidiEventKind::Controller { .. } => {
                self.events.emit(EngineEvent::Midi { kind, channel });
                let event = crate::midi::MidiEvent::new(kind, channel, std::time::Instant::now());
                let consumed = self.router.route(&mut self.registry, event);
                match kind {
                    MidiEventKind::NoteOn { note, velocity } => {
                        self.events.emit(EngineEvent::Note { note, velocity });
                    }
                    MidiEventKind::NoteOff { note } => {
                        self.events.emit(EngineEvent::Note { note, velocity: 0 });
                    }
                    MidiEventKind::Controller { param, value } => {
                        if !consumed && self.midi_controllable {
                            self.events.emit(EngineEvent::Control {
                                cc: param,
                                channel,
                                value,
                            });
                        }
                    }
                    _ => {}
                }
                if self.router.should_forward(consumed) {
                    if let Err(err) = self.backend.send_direct(kind, channel, self.forward_port) {
                        log::warn!("failed to forward unmatched event: {err}");
                    }
                }
            }
        }
    }

    /// Stopping the queue flushes pending note-off-preserving output and
    /// halts scheduling without tearing down the run loop's thread.
    pub fn set_transport_status(&mut self, running: bool) {
        if running {
            self.transport.arm_internal_anchor(self.backend.now_ns());
        }
        self.transport.set_transport_status(running);
        if !running {
            self.backend.remove_events(RemoveCondition::AllExceptNoteOff);
        }
        self.events.emit(EngineEvent::TransportShutdown(!running));
    }

    fn current_tick(&mut self) -> i64 {
        match self.transport.source() {
            ClockSource::Internal => {
                let now_ns = self.backend.now_ns() as f64;
                self.transport.tick_from_wall_time(now_ns)
            }
            ClockSource::MidiClock => self.transport.midi_clock_tick(),
            ClockSource::HostTransport => -1,
        }
    }

    /// Services every due module across all three families, then re-arms
    /// the next echo at the minimum next-due tick.
    pub fn handle_echo(&mut self, infotag: u8) {
        let tick = self.current_tick();
        if tick < 0 {
            return;
        }

        if infotag != INFOTAG_KBD_TRIGGER {
            self.service_seq_family(tick);
        } else {
            self.service_seq_kbd_trigger(tick);
        }
        self.service_lfo_family(tick);
        self.service_arp_family(tick);

        self.registry.recompute_seq_min();
        self.registry.recompute_lfo_min();
        self.registry.recompute_arp_min();
        let min_tick = [
            self.registry.seq_min_next_tick(),
            self.registry.lfo_min_next_tick(),
            self.registry.arp_min_next_tick(),
        ]
        .into_iter()
        .min()
        .unwrap_or(tick);
        self.request_echo_at(min_tick, INFOTAG_NORMAL);
    }

    fn service_seq_family(&mut self, tick: i64) {
        let lookahead = self.lookahead_ticks;
        for index in 0..self.registry.seq_workers().len() {
            let due = self
                .registry
                .seq_timing(index)
                .map(|t| tick + lookahead >= t.next_tick)
                .unwrap_or(true);
            if !due {
                continue;
            }
            self.emit_seq_step(index, tick);
        }
    }

    fn service_seq_kbd_trigger(&mut self, tick: i64) {
        for index in 0..self.registry.seq_workers().len() {
            let wants = self
                .registry
                .seq_worker_mut(index)
                .map(|w| w.wants_kbd_trigger())
                .unwrap_or(false);
            if wants {
                self.emit_seq_step(index, tick);
            }
        }
    }

    fn emit_seq_step(&mut self, index: usize, tick: i64) {
        let Some(worker) = self.registry.seq_worker_mut(index) else {
            return;
        };
        let frame = (PPQN / worker.pattern().res) as i64;
        let sample = worker.get_next_note(tick);
        if !sample.muted {
            let event = QueuedEvent {
                kind: MidiEventKind::NoteOn {
                    note: sample.value.clamp(0, 127) as u8,
                    velocity: 100,
                },
                channel: MidiChannel::default(),
                port: 0,
                release_at_ns: self.transport.clock().ticks_to_ns(sample.tick) as i64,
            };
            if let Err(err) = self.backend.schedule_event(event) {
                log::warn!("failed to schedule seq event: {err}");
            }
        }
        self.registry.set_seq_next_tick(index, sample.tick + frame);
        let step_index = self
            .registry
            .seq_worker_mut(index)
            .map(|w| w.current_index())
            .unwrap_or(0);
        self.events.emit(EngineEvent::NextStep { index: step_index });
    }

    fn service_lfo_family(&mut self, tick: i64) {
        let lookahead = self.lookahead_ticks;
        for index in 0..self.registry.lfo_count() {
            let due = self
                .registry
                .lfo_timing(index)
                .map(|t| tick + lookahead >= t.next_tick)
                .unwrap_or(true);
            if !due {
                continue;
            }
            let Some(worker) = self.registry.lfo_worker_mut(index) else {
                continue;
            };
            let frame = worker.get_next_frame(tick);
            for sample in &frame.samples {
                if sample.muted || sample.value < 0 {
                    continue;
                }
                let event = QueuedEvent {
                    kind: MidiEventKind::Controller {
                        param: 1,
                        value: sample.value.clamp(0, 127) as u8,
                    },
                    channel: MidiChannel::default(),
                    port: 0,
                    release_at_ns: self.transport.clock().ticks_to_ns(sample.tick) as i64,
                };
                if let Err(err) = self.backend.schedule_event(event) {
                    log::warn!("failed to schedule lfo event: {err}");
                }
            }
            let next = tick + frame.frame_ticks.max(1);
            let quantised = (next / frame.frame_ticks.max(1)) * frame.frame_ticks.max(1);
            self.registry.set_lfo_next_tick(index, quantised);
        }
    }

    fn service_arp_family(&mut self, tick: i64) {
        let lookahead = self.lookahead_ticks;
        for index in 0..self.registry.arp_count() {
            let due = self
                .registry
                .arp_timing(index)
                .map(|t| tick + lookahead >= t.next_tick)
                .unwrap_or(true);
            if !due {
                continue;
            }
            let Some(worker) = self.registry.arp_worker_mut(index) else {
                continue;
            };
            let Some(note) = worker.prepare_current_note(tick) else {
                continue;
            };
            let event = QueuedEvent {
                kind: if note.note_on {
                    MidiEventKind::NoteOn {
                        note: note.note,
                        velocity: note.velocity,
                    }
                } else {
                    MidiEventKind::NoteOff { note: note.note }
                },
                channel: MidiChannel::default(),
                port: 0,
                release_at_ns: self.transport.clock().ticks_to_ns(note.tick) as i64,
            };
            if let Err(err) = self.backend.schedule_event(event) {
                log::warn!("failed to schedule arp event: {err}");
            }
            self.registry
                .set_arp_next_tick(index, tick + self.arp_sched_delay_ticks);
        }
    }

    /// One run-loop iteration: lets the back-end do its periodic upkeep,
    /// then drains and handles at most one pending input event. The
    /// caller is expected to call this from a polling loop with a short
    /// sleep between iterations.
    pub fn step(&mut self) {
        self.backend.maintain();
        if let Some((kind, channel)) = self.backend.poll_input() {
            self.handle_input(kind, channel);
        }
    }

    /// De-duplicates against the last scheduled echo tick, then enqueues a
    /// self-directed echo. Returns `false` (and schedules nothing) when
    /// `t == last_sched_tick && t != 0`.
    pub fn request_echo_at(&mut self, t: i64, infotag: u8) -> bool {
        if t == self.last_sched_tick && t != 0 {
            return false;
        }
        self.last_sched_tick = t;
        let release_at_ns = self.transport.clock().ticks_to_ns(t) as i64;
        if let Err(err) = self.backend.schedule_echo(infotag, release_at_ns) {
            log::warn!("failed to arm echo: {err}");
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MidiBackend, QueuedEvent, RemoveCondition};
    use crate::router::MidiRouter;
    use crate::seq_worker::{SeqBehavior, SeqPattern, SeqWorker};
    use crate::transport::TransportController;

    #[derive(Default)]
    struct FakeBackend {
        scheduled: Vec<QueuedEvent>,
        echoes: Vec<(u8, i64)>,
        removed: Vec<RemoveCondition>,
        clock_ns: std::cell::Cell<i64>,
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
        fn send_direct(&mut self, _kind: MidiEventKind, _channel: MidiChannel, _port: u8) -> anyhow::Result<()> {
            Ok(())
        }
        fn remove_events(&mut self, condition: RemoveCondition) {
            self.removed.push(condition);
        }
        fn poll_input(&mut self) -> Option<(MidiEventKind, MidiChannel)> {
            None
        }
        fn now_ns(&self) -> i64 {
            let t = self.clock_ns.get();
            self.clock_ns.set(t + 1_000_000);
            t
        }
    }

    fn scheduler_with_one_seq() -> Scheduler<FakeBackend> {
        let mut registry = ModuleRegistry::default();
        registry.add_seq(SeqWorker::new_with(
            SeqPattern::new_with(4, 1),
            SeqBehavior::default(),
        ));
        Scheduler::new(
            registry,
            MidiRouter::default(),
            TransportController::default(),
            FakeBackend::default(),
            &EngineConfig::default(),
        )
    }

    #[test]
    fn request_echo_at_deduplicates_repeated_tick() {
        let mut s = scheduler_with_one_seq();
        assert!(s.request_echo_at(100, INFOTAG_NORMAL));
        assert!(!s.request_echo_at(100, INFOTAG_NORMAL));
        assert!(s.request_echo_at(200, INFOTAG_NORMAL));
    }

    #[test]
    fn request_echo_at_zero_is_never_deduplicated() {
        let mut s = scheduler_with_one_seq();
        assert!(s.request_echo_at(0, INFOTAG_NORMAL));
        assert!(s.request_echo_at(0, INFOTAG_NORMAL));
    }

    #[test]
    fn handle_echo_services_due_seq_modules_and_rearms() {
        let mut s = scheduler_with_one_seq();
        s.handle_echo(INFOTAG_NORMAL);
        assert_eq!(s.backend.scheduled.len(), 1);
        assert_eq!(s.backend.echoes.len(), 1);
    }

    #[test]
    fn seq_next_tick_advances_monotonically_across_echoes() {
        let mut s = scheduler_with_one_seq();
        let mut prev = -1;
        for _ in 0..6 {
            s.handle_echo(INFOTAG_NORMAL);
            let next = s.registry.seq_timing(0).unwrap().next_tick;
            assert!(next > prev, "next_tick must strictly advance");
            prev = next;
        }
    }

    #[test]
    fn set_transport_status_false_flushes_backend_queue() {
        let mut s = scheduler_with_one_seq();
        s.set_transport_status(true);
        s.set_transport_status(false);
        assert_eq!(s.backend.removed, vec![RemoveCondition::AllExceptNoteOff]);
    }
}
