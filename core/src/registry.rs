// Copyright (c) 2023 Mike Tsao. All rights reserved.

//! Owns the ordered per-family worker lists and their per-module scheduling
//! state. Grounded on `seqdriver.cpp`'s `nextArpTick`/`nextLfoTick`/
//! `nextSeqTick` arrays, reshaped into an owning collection that hands out
//! stable indices instead of passing raw pointer lists between driver and UI
//! (see SPEC_FULL.md §9, "Shared worker lists → owning registry").

use crate::seq_worker::SeqWorker;
use std::fmt;

/// A stable handle into one of [ModuleRegistry]'s family lists. Indices are
/// visible to the outside (load/save order) and are preserved across
/// mutation of other modules in the same family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ModuleHandle {
    family: Family,
    index: usize,
}
impl fmt::Display for ModuleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}#{}", self.family, self.index)
    }
}

/// The three module families the scheduler services each echo cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Family {
    Lfo,
    Seq,
    Arp,
}

/// Per-module scheduling bookkeeping kept alongside each worker: the tick at
/// which it's next due, independent of the worker's own internal state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ModuleTiming {
    pub next_tick: i64,
}

struct FamilySlots<W> {
    workers: Vec<W>,
    timing: Vec<ModuleTiming>,
    min_next_tick: i64,
}
impl<W> Default for FamilySlots<W> {
    fn default() -> Self {
        Self {
            workers: Vec::new(),
            timing: Vec::new(),
            min_next_tick: 0,
        }
    }
}
impl<W> FamilySlots<W> {
    fn push(&mut self, worker: W) -> usize {
        self.workers.push(worker);
        self.timing.push(ModuleTiming::default());
        self.workers.len() - 1
    }

    fn reset_ticks(&mut self) {
        for t in &mut self.timing {
            t.next_tick = 0;
        }
        self.min_next_tick = 0;
    }

    fn recompute_min(&mut self) {
        self.min_next_tick = self.timing.iter().map(|t| t.next_tick).min().unwrap_or(0);
    }
}

/// Holds the ordered worker lists for the LFO, Seq, and Arp families, plus
/// each module's next-tick bookkeeping. The Seq family is fully typed
/// ([SeqWorker]); LFO and Arp are external collaborators and are represented
/// here only as trait objects implementing [crate::worker::ExternalWorker],
/// since only their interface to the scheduler is in scope.
#[derive(Default)]
pub struct ModuleRegistry {
    seq: FamilySlots<SeqWorker>,
    lfo: FamilySlots<Box<dyn crate::worker::LfoWorker>>,
    arp: FamilySlots<Box<dyn crate::worker::ArpWorker>>,
}
impl ModuleRegistry {
    pub fn add_seq(&mut self, worker: SeqWorker) -> ModuleHandle {
        let index = self.seq.push(worker);
        ModuleHandle {
            family: Family::Seq,
            index,
        }
    }

    pub fn add_lfo(&mut self, worker: Box<dyn crate::worker::LfoWorker>) -> ModuleHandle {
        let index = self.lfo.push(worker);
        ModuleHandle {
            family: Family::Lfo,
            index,
        }
    }

    pub fn add_arp(&mut self, worker: Box<dyn crate::worker::ArpWorker>) -> ModuleHandle {
        let index = self.arp.push(worker);
        ModuleHandle {
            family: Family::Arp,
            index,
        }
    }

    pub fn seq_workers(&self) -> &[SeqWorker] {
        &self.seq.workers
    }

    pub fn seq_workers_mut(&mut self) -> &mut [SeqWorker] {
        &mut self.seq.workers
    }

    pub fn seq_worker_mut(&mut self, index: usize) -> Option<&mut SeqWorker> {
        self.seq.workers.get_mut(index)
    }

    /// Replaces the entire Seq family with `workers`, resetting every
    /// replaced module's scheduling bookkeeping to zero. Used to restore a
    /// [crate::session::SessionSnapshot].
    pub fn replace_seq_workers(&mut self, workers: Vec<SeqWorker>) {
        let len = workers.len();
        self.seq.workers = workers;
        self.seq.timing = vec![ModuleTiming::default(); len];
        self.seq.min_next_tick = 0;
    }

    pub fn seq_timing(&self, index: usize) -> Option<ModuleTiming> {
        self.seq.timing.get(index).copied()
    }

    pub fn set_seq_next_tick(&mut self, index: usize, next_tick: i64) {
        if let Some(t) = self.seq.timing.get_mut(index) {
            t.next_tick = next_tick;
        }
    }

    pub fn seq_min_next_tick(&self) -> i64 {
        self.seq.min_next_tick
    }

    pub fn recompute_seq_min(&mut self) {
        self.seq.recompute_min();
    }

    pub fn lfo_count(&self) -> usize {
        self.lfo.workers.len()
    }

    pub fn arp_count(&self) -> usize {
        self.arp.workers.len()
    }

    pub fn lfo_timing(&self, index: usize) -> Option<ModuleTiming> {
        self.lfo.timing.get(index).copied()
    }

    pub fn set_lfo_next_tick(&mut self, index: usize, next_tick: i64) {
        if let Some(t) = self.lfo.timing.get_mut(index) {
            t.next_tick = next_tick;
        }
    }

    pub fn lfo_min_next_tick(&self) -> i64 {
        self.lfo.min_next_tick
    }

    pub fn recompute_lfo_min(&mut self) {
        self.lfo.recompute_min();
    }

    pub fn lfo_worker_mut(&mut self, index: usize) -> Option<&mut Box<dyn crate::worker::LfoWorker>> {
        self.lfo.workers.get_mut(index)
    }

    pub fn arp_timing(&self, index: usize) -> Option<ModuleTiming> {
        self.arp.timing.get(index).copied()
    }

    pub fn set_arp_next_tick(&mut self, index: usize, next_tick: i64) {
        if let Some(t) = self.arp.timing.get_mut(index) {
            t.next_tick = next_tick;
        }
    }

    pub fn arp_min_next_tick(&self) -> i64 {
        self.arp.min_next_tick
    }

    pub fn recompute_arp_min(&mut self) {
        self.arp.recompute_min();
    }

    pub fn arp_worker_mut(&mut self, index: usize) -> Option<&mut Box<dyn crate::worker::ArpWorker>> {
        self.arp.workers.get_mut(index)
    }

    /// Zeroes every per-module and family tick across all three families.
    /// Called by [crate::transport::TransportController::reset_ticks].
    pub fn reset_all_ticks(&mut self) {
        self.seq.reset_ticks();
        self.lfo.reset_ticks();
        self.arp.reset_ticks();
        for w in &mut self.seq.workers {
            w.set_current_index(0);
        }
        for w in &mut self.arp.workers {
            w.fold_release_ticks();
        }
        for w in &mut self.lfo.workers {
            w.reset_frame_pointer();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seq_worker::{SeqBehavior, SeqPattern, SeqWorker};

    #[test]
    fn handles_hand_out_stable_indices() {
        let mut registry = ModuleRegistry::default();
        let h0 = registry.add_seq(SeqWorker::new_with(
            SeqPattern::default(),
            SeqBehavior::default(),
        ));
        let h1 = registry.add_seq(SeqWorker::new_with(
            SeqPattern::default(),
            SeqBehavior::default(),
        ));
        assert_ne!(h0, h1);
        assert_eq!(registry.seq_workers().len(), 2);
    }

    #[test]
    fn reset_all_ticks_zeroes_family_minimums() {
        let mut registry = ModuleRegistry::default();
        registry.add_seq(SeqWorker::new_with(
            SeqPattern::default(),
            SeqBehavior::default(),
        ));
        registry.set_seq_next_tick(0, 480);
        registry.recompute_seq_min();
        assert_eq!(registry.seq_min_next_tick(), 480);
        registry.reset_all_ticks();
        registry.recompute_seq_min();
        assert_eq!(registry.seq_min_next_tick(), 0);
    }
}
