//! Per-neuron bit flags.
//!
//! `NeuronBitset` backs the refractory cache (recomputed once per tick so the
//! integration phase can test a destination in O(1) without touching the
//! neuron itself). `FiredSet` adds an ordered id list on top, for the
//! this-tick / last-tick firing records.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use crate::neuron::Neuron;
use crate::types::{NeuronId, Tick};

const WORD_BITS: usize = 64;

#[inline]
fn words_for(bits: usize) -> usize {
    bits.div_ceil(WORD_BITS)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NeuronBitset {
    words: Vec<u64>,
}

impl NeuronBitset {
    pub fn with_len(bits: usize) -> Self {
        Self {
            words: vec![0; words_for(bits)],
        }
    }

    /// Ensure at least `bits` bits are addressable. Never shrinks.
    pub fn grow_to(&mut self, bits: usize) {
        let need = words_for(bits);
        if self.words.len() < need {
            self.words.resize(need, 0);
        }
    }

    /// Number of addressable bits (a multiple of 64).
    pub fn capacity(&self) -> usize {
        self.words.len() * WORD_BITS
    }

    #[inline]
    pub fn contains(&self, id: NeuronId) -> bool {
        let i = id as usize;
        self.words
            .get(i / WORD_BITS)
            .is_some_and(|w| w & (1u64 << (i % WORD_BITS)) != 0)
    }

    /// Set a bit; returns true if it was previously clear. Ids beyond the
    /// capacity grow the set.
    #[inline]
    pub fn insert(&mut self, id: NeuronId) -> bool {
        let i = id as usize;
        self.grow_to(i + 1);
        let word = &mut self.words[i / WORD_BITS];
        let mask = 1u64 << (i % WORD_BITS);
        let was_clear = *word & mask == 0;
        *word |= mask;
        was_clear
    }

    pub fn clear(&mut self) {
        self.words.fill(0);
    }

    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Rebuild from scratch: bit `i` is set iff `neurons[i]` is refractory at `tick`.
    pub fn recompute_refractory(&mut self, neurons: &[Neuron], tick: Tick) {
        self.grow_to(neurons.len());
        for (word_idx, chunk) in neurons.chunks(WORD_BITS).enumerate() {
            let mut word = 0u64;
            for (bit, n) in chunk.iter().enumerate() {
                if n.is_refractory(tick) {
                    word |= 1u64 << bit;
                }
            }
            self.words[word_idx] = word;
        }
        for w in &mut self.words[words_for(neurons.len())..] {
            *w = 0;
        }
    }
}

/// Set of neurons that fired in one tick.
///
/// Membership is an O(1) bit test; iteration follows insertion order so the
/// plasticity pass walks neurons deterministically.
#[derive(Debug, Clone, Default)]
pub struct FiredSet {
    bits: NeuronBitset,
    order: Vec<NeuronId>,
}

impl FiredSet {
    pub fn with_capacity(neurons: usize) -> Self {
        Self {
            bits: NeuronBitset::with_len(neurons),
            order: Vec::new(),
        }
    }

    #[inline]
    pub fn contains(&self, id: NeuronId) -> bool {
        self.bits.contains(id)
    }

    /// Insert `id`; duplicates are ignored.
    #[inline]
    pub fn insert(&mut self, id: NeuronId) {
        if self.bits.insert(id) {
            self.order.push(id);
        }
    }

    /// Clear in O(fired) rather than O(population).
    pub fn clear(&mut self) {
        for &id in &self.order {
            let i = id as usize;
            self.bits.words[i / WORD_BITS] = 0;
        }
        self.order.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = NeuronId> + '_ {
        self.order.iter().copied()
    }

    pub fn as_slice(&self) -> &[NeuronId] {
        &self.order
    }
}
