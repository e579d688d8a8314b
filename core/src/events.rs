// Copyright (c) 2023 Mike Tsao. All rights reserved.

//! Observer signals fired from the scheduler thread. Replaces the source's
//! object-signal framework (`midi_event`/`control_event`/`note_event`/
//! `next_step`/`transport_shutdown`) with a `crossbeam_channel`-posted enum,
//! following the teacher's `CrossbeamChannel<T>` inbox/outbox convention.

use crate::midi::{MidiChannel, MidiEventKind};
use crossbeam_channel::{Receiver, Sender};

/// One observer-visible signal from the run loop. Subscribers must tolerate
/// these arriving on the scheduler thread.
#[derive(Clone, Debug, PartialEq)]
pub enum EngineEvent {
    /// A raw MIDI event was dispatched (matched or forwarded).
    Midi { kind: MidiEventKind, channel: MidiChannel },
    /// A controller (CC) value changed on a module.
    Control { cc: u8, channel: MidiChannel, value: u8 },
    /// A note was emitted by a module.
    Note { note: u8, velocity: u8 },
    /// A `SeqWorker`'s play cursor advanced to `index`.
    NextStep { index: usize },
    /// The run loop's transport was started (`true`) or stopped (`false`).
    TransportShutdown(bool),
}

/// Fan-out broadcaster for [EngineEvent]: any number of observers can
/// [EventBus::subscribe], and a disconnected receiver is dropped silently on
/// the next [EventBus::emit] rather than poisoning the others.
#[derive(Default)]
pub struct EventBus {
    observers: Vec<Sender<EngineEvent>>,
}
impl EventBus {
    /// Registers a new observer and returns its receiving end.
    pub fn subscribe(&mut self) -> Receiver<EngineEvent> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.observers.push(tx);
        rx
    }

    /// Posts `event` to every live observer, dropping any whose receiver has
    /// been disconnected.
    pub fn emit(&mut self, event: EngineEvent) {
        self.observers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Number of currently subscribed observers.
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_to_all_subscribers() {
        let mut bus = EventBus::default();
        let a = bus.subscribe();
        let b = bus.subscribe();
        bus.emit(EngineEvent::NextStep { index: 3 });
        assert_eq!(a.try_recv().unwrap(), EngineEvent::NextStep { index: 3 });
        assert_eq!(b.try_recv().unwrap(), EngineEvent::NextStep { index: 3 });
    }

    #[test]
    fn drops_disconnected_observers() {
        let mut bus = EventBus::default();
        {
            let _rx = bus.subscribe();
        }
        bus.subscribe();
        assert_eq!(bus.observer_count(), 2);
        bus.emit(EngineEvent::TransportShutdown(false));
        assert_eq!(bus.observer_count(), 1);
    }
}
