// Copyright (c) 2023 Mike Tsao. All rights reserved.

//! Classifies incoming [MidiEvent]s and dispatches them to every worker in
//! the registry whose channel filter and event-type predicate accept them.
//! Grounded on `seqdriver.cpp`'s `handleEvent` and, for the dispatch-by-
//! predicate shape, `sowbug-groove/src/mini/midi_router.rs`'s `MidiRouter`.

use crate::midi::{MidiChannel, MidiEvent, MidiEventKind};
use crate::registry::ModuleRegistry;

/// What to do with an event that no worker in the registry consumed.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum UnmatchedPolicy {
    #[default]
    Drop,
    Forward,
}

/// Routes input events to Seq (and, via the registry, Arp/LFO) workers by
/// channel filter, and applies the unmatched-event forwarding policy.
///
/// Unlike the teacher's `MidiRouter`, this router dispatches by predicate
/// (`want_event`) against a small, fixed set of module families rather than
/// an open `Uid -> receivers` map, since every worker kind here is known at
/// compile time.
#[derive(Debug, Default)]
pub struct MidiRouter {
    pub unmatched_policy: UnmatchedPolicy,
}
impl MidiRouter {
    pub fn new_with(unmatched_policy: UnmatchedPolicy) -> Self {
        Self { unmatched_policy }
    }

    /// Dispatches one input event to every Seq worker whose `want_event`
    /// accepts it. Returns `true` if at least one worker consumed it.
    ///
    /// Controller and note forwarding to LFO/Arp workers is not modeled
    /// here since those families are interface-only (SPEC_FULL.md §2); a
    /// full driver wires their note-on/off/sustain/controller inputs
    /// directly from this same classification step.
    pub fn route(&self, registry: &mut ModuleRegistry, event: MidiEvent) -> bool {
        let mut consumed = false;
        for worker in registry.seq_workers_mut() {
            if worker.want_event(&event.kind, event.channel) {
                consumed = true;
                match event.kind {
                    MidiEventKind::NoteOn { note, velocity } => {
                        worker.handle_note(note, velocity);
                    }
                    MidiEventKind::NoteOff { note } => {
                        worker.handle_note(note, 0);
                    }
                    MidiEventKind::Controller { .. } => {}
                    _ => {}
                }
            }
        }
        if !consumed {
            log::warn!("event on channel {} matched no worker", event.channel);
        }
        consumed
    }

    /// Returns `true` if the event should be retransmitted on the
    /// configured forward-out port, per `forwardUnmatched`.
    pub fn should_forward(&self, consumed: bool) -> bool {
        !consumed && self.unmatched_policy == UnmatchedPolicy::Forward
    }

    /// Extracts the `MidiChannel` a raw event should be filtered by; the
    /// clock/transport event kinds carry no channel semantics and always
    /// pass every worker's filter (workers never gate on channel for them).
    pub fn is_channel_gated(kind: &MidiEventKind) -> bool {
        matches!(
            kind,
            MidiEventKind::NoteOn { .. } | MidiEventKind::NoteOff { .. } | MidiEventKind::Controller { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::MidiEventKind;
    use crate::seq_worker::{SeqBehavior, SeqPattern, SeqWorker};
    use std::time::Instant;

    fn note_on_event(channel: u8, note: u8) -> MidiEvent {
        MidiEvent::new(
            MidiEventKind::NoteOn { note, velocity: 100 },
            MidiChannel::from(channel),
            Instant::now(),
        )
    }

    #[test]
    fn routes_only_to_matching_channel() {
        let mut registry = ModuleRegistry::default();
        let mut behavior_ch1 = SeqBehavior::default();
        behavior_ch1.channel_in = MidiChannel::from(1u8);
        registry.add_seq(SeqWorker::new_with(SeqPattern::default(), behavior_ch1));

        let router = MidiRouter::default();
        let consumed = router.route(&mut registry, note_on_event(1, 60));
        assert!(consumed);

        let consumed = router.route(&mut registry, note_on_event(2, 60));
        assert!(!consumed);
    }

    #[test]
    fn unmatched_forward_policy_gates_retransmission() {
        let router_drop = MidiRouter::new_with(UnmatchedPolicy::Drop);
        assert!(!router_drop.should_forward(false));

        let router_fwd = MidiRouter::new_with(UnmatchedPolicy::Forward);
        assert!(router_fwd.should_forward(false));
        assert!(!router_fwd.should_forward(true));
    }

    #[test]
    fn clock_and_echo_kinds_are_not_channel_gated() {
        assert!(!MidiRouter::is_channel_gated(&MidiEventKind::Clock));
        assert!(!MidiRouter::is_channel_gated(&MidiEventKind::Echo { infotag: 0 }));
        assert!(MidiRouter::is_channel_gated(&MidiEventKind::NoteOn {
            note: 60,
            velocity: 1
        }));
    }
}
