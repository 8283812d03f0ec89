//! Per-tick phase kernels.
//!
//! These are free functions over slices so the same code runs on the whole
//! neuron array or on one worker's chunk. Neuromodulator state comes in by
//! reference; nothing here reads global state.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::bitset::{FiredSet, NeuronBitset};
use crate::connectivity::SynapseStore;
use crate::neuromod::Neuromodulators;
use crate::neuron::Neuron;
use crate::prng::Prng;
use crate::razor::Candidate;
use crate::types::{Charge, NeuronId, Tick, CHARGE_MIN};

/// Leak every non-refractory neuron in `neurons` by its own leak plus the
/// serotonin bonus.
pub fn leak_slice(neurons: &mut [Neuron], tick: Tick, chemicals: &Neuromodulators) {
    let extra = chemicals.extra_leak();
    for n in neurons {
        if !n.is_refractory(tick) {
            n.apply_leak(extra);
        }
    }
}

/// Deliver the spikes of the previous tick along every outgoing synapse.
///
/// Destinations flagged in `refractory` ignore the input. A target's inputs
/// are summed before the charge floor is applied, so the result does not
/// depend on delivery order. Returns the number of synaptic deliveries made.
pub fn integrate(
    spikes: &[NeuronId],
    neurons: &mut [Neuron],
    synapses: &SynapseStore,
    refractory: &NeuronBitset,
) -> usize {
    let count = neurons.len();
    let mut deliveries = 0;
    let mut inhibited = false;
    for &pre_id in spikes {
        let Some(pre) = neurons.get(pre_id as usize).copied() else {
            continue;
        };
        for syn in synapses.outgoing(pre_id, &pre) {
            let target = syn.target;
            if (target as usize) < count && !refractory.contains(target) {
                let n = &mut neurons[target as usize];
                n.charge = n.charge.saturating_add(syn.weight as Charge);
                inhibited |= syn.weight < 0;
                deliveries += 1;
            }
        }
    }
    if inhibited {
        for n in neurons.iter_mut() {
            n.charge = n.charge.max(CHARGE_MIN);
        }
    }
    deliveries
}

/// Inputs to the firing decision that are fixed for one tick.
#[derive(Debug, Clone, Copy)]
pub struct FiringContext {
    pub tick: Tick,
    /// Subtracted from every base threshold (arousal gain).
    pub threshold_reduction: Charge,
    /// Half-width of the per-neuron threshold noise; 0 disables it.
    pub noise_amplitude: Charge,
    pub noise_seed: u64,
}

impl FiringContext {
    pub fn new(tick: Tick, chemicals: &Neuromodulators, noise_seed: u64) -> Self {
        Self {
            tick,
            threshold_reduction: chemicals.threshold_reduction(),
            noise_amplitude: chemicals.exploration_amplitude(),
            noise_seed,
        }
    }

    /// `max(1, threshold - reduction + noise)`.
    #[inline]
    pub fn effective_threshold(&self, neuron: &Neuron, id: NeuronId) -> Charge {
        let mut threshold = neuron.threshold.saturating_sub(self.threshold_reduction);
        if self.noise_amplitude > 0 {
            let mut rng = Prng::for_neuron(self.noise_seed, self.tick, id);
            threshold = threshold.saturating_add(rng.gen_symmetric_i32(self.noise_amplitude));
        }
        threshold.max(1)
    }
}

/// Append every non-refractory neuron of `neurons` whose charge meets its
/// effective threshold. `first_id` is the id of `neurons[0]`.
pub fn collect_candidates(
    neurons: &[Neuron],
    first_id: NeuronId,
    ctx: &FiringContext,
    out: &mut Vec<Candidate>,
) {
    for (offset, n) in neurons.iter().enumerate() {
        if n.is_refractory(ctx.tick) {
            continue;
        }
        let id = first_id + offset as NeuronId;
        if n.charge >= ctx.effective_threshold(n, id) {
            out.push(Candidate {
                charge: n.charge,
                neuron: id,
            });
        }
    }
}

/// Spike-timing plasticity over the two most recent firing sets.
///
/// - Potentiation: a neuron that fired last tick whose target fired this tick.
///   Operant mode arms the eligibility trace instead of moving the weight.
/// - Depression (immediate mode only): a neuron firing this tick whose target
///   fired last tick.
///
/// The caller is responsible for the learning gate. Returns the number of
/// synapses visited with a matching partner.
pub fn apply_plasticity(
    neurons: &[Neuron],
    synapses: &mut SynapseStore,
    fired_this_tick: &FiredSet,
    fired_last_tick: &FiredSet,
    operant: bool,
    chemicals: &Neuromodulators,
) -> usize {
    let gain = chemicals.learning_scale();
    let mut touched = 0;

    for pre_id in fired_last_tick.iter() {
        let Some(pre) = neurons.get(pre_id as usize) else {
            continue;
        };
        synapses.for_each_outgoing_mut(pre_id, pre, |syn| {
            if !syn.plastic || !fired_this_tick.contains(syn.target) {
                return;
            }
            let Some(post) = neurons.get(syn.target as usize) else {
                return;
            };
            if operant {
                syn.mark_eligible(pre.last_fired, post.last_fired);
            } else {
                syn.update_weight(pre.last_fired, post.last_fired, gain);
            }
            touched += 1;
        });
    }

    if operant {
        return touched;
    }

    for pre_id in fired_this_tick.iter() {
        let Some(pre) = neurons.get(pre_id as usize) else {
            continue;
        };
        synapses.for_each_outgoing_mut(pre_id, pre, |syn| {
            if !syn.plastic || !fired_last_tick.contains(syn.target) {
                return;
            }
            let Some(post) = neurons.get(syn.target as usize) else {
                return;
            };
            // Only post-before-pre pairs depress here.
            if post.last_fired < pre.last_fired {
                syn.update_weight(pre.last_fired, post.last_fired, gain);
                touched += 1;
            }
        });
    }

    touched
}
