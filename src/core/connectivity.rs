//! Two-tier synapse storage.
//!
//! Every neuron owns a block `[synapse_offset, synapse_offset + synapse_count)`
//! in the primary array. A block stays open only while it is the last thing
//! in the array; once anything else is appended, later synapses for that
//! source go to an overflow list keyed by source id. Both tiers together make
//! up a neuron's outgoing connectivity.

#[cfg(feature = "std")]
use std::collections::HashMap;

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(not(feature = "std"))]
use hashbrown::HashMap;

use crate::neuron::Neuron;
use crate::synapse::Synapse;
use crate::types::{NeuronId, Weight};

/// Where a new synapse ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Primary,
    Overflow,
}

#[derive(Debug, Clone, Default)]
pub struct SynapseStore {
    primary: Vec<Synapse>,
    overflow: HashMap<NeuronId, Vec<Synapse>>,
    overflow_len: usize,
}

impl SynapseStore {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            primary: Vec::with_capacity(capacity),
            overflow: HashMap::new(),
            overflow_len: 0,
        }
    }

    /// Append an outgoing synapse for `source_id`, whose neuron is `source`.
    pub fn connect(&mut self, source_id: NeuronId, source: &mut Neuron, synapse: Synapse) -> Tier {
        let block_end = source.synapse_offset as usize + source.synapse_count as usize;
        let open = source.synapse_count == 0 || block_end == self.primary.len();
        if open {
            if source.synapse_count == 0 {
                source.synapse_offset = self.primary.len() as u32;
            }
            self.primary.push(synapse);
            source.synapse_count += 1;
            Tier::Primary
        } else {
            self.overflow.entry(source_id).or_default().push(synapse);
            self.overflow_len += 1;
            Tier::Overflow
        }
    }

    #[inline]
    fn block<'a>(&'a self, source: &Neuron) -> &'a [Synapse] {
        let start = source.synapse_offset as usize;
        &self.primary[start..start + source.synapse_count as usize]
    }

    /// Contiguous synapses first, then overflow ones, each in insertion order.
    pub fn outgoing<'a>(
        &'a self,
        source_id: NeuronId,
        source: &Neuron,
    ) -> impl Iterator<Item = &'a Synapse> + 'a {
        let tail = self
            .overflow
            .get(&source_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[]);
        self.block(source).iter().chain(tail.iter())
    }

    /// Apply `f` to every outgoing synapse of one source, both tiers.
    pub fn for_each_outgoing_mut<F>(&mut self, source_id: NeuronId, source: &Neuron, mut f: F)
    where
        F: FnMut(&mut Synapse),
    {
        let start = source.synapse_offset as usize;
        let end = start + source.synapse_count as usize;
        for syn in &mut self.primary[start..end] {
            f(syn);
        }
        if let Some(extra) = self.overflow.get_mut(&source_id) {
            for syn in extra {
                f(syn);
            }
        }
    }

    /// Apply `f` to every synapse in the store.
    pub fn for_each_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut Synapse),
    {
        for syn in &mut self.primary {
            f(syn);
        }
        for list in self.overflow.values_mut() {
            for syn in list {
                f(syn);
            }
        }
    }

    /// Weight of the first `source -> target` synapse, or 0 if none.
    pub fn weight(&self, source_id: NeuronId, source: &Neuron, target: NeuronId) -> Weight {
        self.outgoing(source_id, source)
            .find(|s| s.target == target)
            .map_or(0, |s| s.weight)
    }

    pub fn outgoing_count(&self, source_id: NeuronId, source: &Neuron) -> usize {
        source.synapse_count as usize + self.overflow.get(&source_id).map_or(0, Vec::len)
    }

    /// Total synapses across both tiers.
    #[inline]
    pub fn len(&self) -> usize {
        self.primary.len() + self.overflow_len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn overflow_len(&self) -> usize {
        self.overflow_len
    }

    /// The contiguous tier.
    pub fn primary(&self) -> &[Synapse] {
        &self.primary
    }
}
