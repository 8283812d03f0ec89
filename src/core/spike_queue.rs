//! Time-ordered spike event queue.
//!
//! Decouples "who fired" from "when the effect lands downstream": an event
//! recorded at tick `t` is delivered during integration at tick `t + 1`.

#[cfg(feature = "std")]
use std::collections::BinaryHeap;

#[cfg(not(feature = "std"))]
use alloc::collections::BinaryHeap;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use core::cmp::{Ordering, Reverse};

use crate::types::{NeuronId, Tick, INVALID_NEURON};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpikeEvent {
    pub neuron: NeuronId,
    pub tick: Tick,
}

impl SpikeEvent {
    pub fn new(neuron: NeuronId, tick: Tick) -> Self {
        Self { neuron, tick }
    }
}

impl Default for SpikeEvent {
    fn default() -> Self {
        Self {
            neuron: INVALID_NEURON,
            tick: 0,
        }
    }
}

impl Ord for SpikeEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        // Earliest tick first; neuron id keeps same-tick order deterministic.
        self.tick
            .cmp(&other.tick)
            .then_with(|| self.neuron.cmp(&other.neuron))
    }
}

impl PartialOrd for SpikeEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Min-priority queue of spike events keyed by tick.
#[derive(Debug, Clone, Default)]
pub struct SpikeQueue {
    heap: BinaryHeap<Reverse<SpikeEvent>>,
}

impl SpikeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn push(&mut self, neuron: NeuronId, tick: Tick) {
        self.heap.push(Reverse(SpikeEvent::new(neuron, tick)));
    }

    /// True if the earliest pending event belongs to `tick`.
    pub fn has_spikes_for(&self, tick: Tick) -> bool {
        self.peek_tick() == Some(tick)
    }

    /// Pop every event scheduled for `tick` into `out`, returning how many
    /// were appended. Events older than `tick` are popped and discarded; the
    /// returned count excludes them.
    pub fn drain_tick(&mut self, tick: Tick, out: &mut Vec<NeuronId>) -> usize {
        let mut delivered = 0;
        while let Some(Reverse(ev)) = self.heap.peek().copied() {
            if ev.tick > tick {
                break;
            }
            self.heap.pop();
            if ev.tick == tick {
                out.push(ev.neuron);
                delivered += 1;
            }
        }
        delivered
    }

    /// Pop the earliest event's neuron.
    pub fn pop(&mut self) -> Option<NeuronId> {
        self.heap.pop().map(|Reverse(ev)| ev.neuron)
    }

    /// Tick of the earliest pending event.
    pub fn peek_tick(&self) -> Option<Tick> {
        self.heap.peek().map(|Reverse(ev)| ev.tick)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Drop every pending event.
    pub fn clear(&mut self) {
        self.heap.clear();
    }
}
