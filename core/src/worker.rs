// Copyright (c) 2023 Mike Tsao. All rights reserved.

//! The LFO and Arp module families are external collaborators: their
//! pattern language and internal state are out of scope, but the scheduler
//! still has to drive them each echo cycle. These traits pin down exactly
//! the interface [crate::scheduler::Scheduler] and [crate::registry::ModuleRegistry]
//! need, mirroring how `SeqWorker::get_next_note` is consumed.

use crate::seq_worker::Sample;

/// A frame of controller-change samples produced for one echo cycle. `-1`
/// in `value` terminates the frame early (see SPEC_FULL.md's Sample type).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    pub samples: Vec<Sample>,
    pub frame_ticks: i64,
}

/// External interface to an LFO module: produce the next frame of CC
/// samples for the current cursor position.
pub trait LfoWorker: Send {
    fn get_next_frame(&mut self, tick: i64) -> Frame;

    /// Resets the module's internal cursor to the start of its waveform.
    /// Called by `reset_ticks`.
    fn reset_frame_pointer(&mut self);
}

/// A single scheduled note-on or note-off emitted by an arpeggiator pattern.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArpNote {
    pub note: u8,
    pub velocity: u8,
    pub note_on: bool,
    pub tick: i64,
}

/// External interface to an Arp module: consumes held-note state from the
/// router and produces the next scheduled note event.
pub trait ArpWorker: Send {
    fn note_on(&mut self, note: u8, velocity: u8);
    fn note_off(&mut self, note: u8);
    fn sustain(&mut self, on: bool);

    fn prepare_current_note(&mut self, tick: i64) -> Option<ArpNote>;

    /// Folds any still-pending note-off events into immediate releases and
    /// clears the held-note buffer. Called by `reset_ticks` and by queue
    /// cancellation.
    fn fold_release_ticks(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SilentLfo;
    impl LfoWorker for SilentLfo {
        fn get_next_frame(&mut self, _tick: i64) -> Frame {
            Frame::default()
        }
        fn reset_frame_pointer(&mut self) {}
    }

    struct SilentArp;
    impl ArpWorker for SilentArp {
        fn note_on(&mut self, _note: u8, _velocity: u8) {}
        fn note_off(&mut self, _note: u8) {}
        fn sustain(&mut self, _on: bool) {}
        fn prepare_current_note(&mut self, _tick: i64) -> Option<ArpNote> {
            None
        }
        fn fold_release_ticks(&mut self) {}
    }

    #[test]
    fn trait_objects_are_object_safe() {
        let mut lfo: Box<dyn LfoWorker> = Box::new(SilentLfo);
        assert_eq!(lfo.get_next_frame(0), Frame::default());
        let mut arp: Box<dyn ArpWorker> = Box::new(SilentArp);
        assert_eq!(arp.prepare_current_note(0), None);
    }
}
