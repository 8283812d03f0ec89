//! The tick-driven network.
//!
//! One [`Network::step`] runs every phase synchronously, in this order:
//!
//! 1. rotate firing sets, recompute the refractory bitset
//! 2. leak (data-parallel above the size threshold)
//! 3. integrate the previous tick's spikes (sequential)
//! 4. collect candidates (data-parallel), apply the Razor, fire winners
//! 5. plasticity, then eligibility decay in operant mode
//! 6. neuromodulator homeostasis, then the arousal interrupt
//!
//! Out-of-range neuron ids are ignored by stimulation and query calls.
//! Only [`Network::connect_neurons`] reports them.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use tracing::{debug, trace, warn};

use crate::bitset::{FiredSet, NeuronBitset};
use crate::config::{ExecutionTier, NetworkConfig};
use crate::connectivity::{SynapseStore, Tier};
use crate::dynamics::{self, FiringContext};
use crate::error::{NetworkError, Result};
use crate::fanout::Fanout;
use crate::neuromod::{Channel, Neuromodulators, POST_PANIC_LEVEL};
use crate::neuron::{Neuron, NeuronParams};
use crate::razor::{self, Candidate};
use crate::spike_queue::SpikeQueue;
use crate::synapse::Synapse;
use crate::types::{clamp_weight, Charge, NeuronId, Tick, Weight};

/// Default dopamine surge for [`Network::reward_signal`].
pub const REWARD_SIGNAL_AMOUNT: i32 = 50;
/// Default norepinephrine surge for [`Network::surprise_signal`].
pub const SURPRISE_SIGNAL_AMOUNT: i32 = 50;
/// Default serotonin surge for [`Network::calm_signal`].
pub const CALM_SIGNAL_AMOUNT: i32 = 10;

/// Reward signals in operant mode flood traces with `amount / 10`.
const REWARD_FLOOD_DIVISOR: i32 = 10;

/// Network statistics for monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Diagnostics {
    pub tick: Tick,
    pub neuron_count: usize,
    /// Synapses across both storage tiers.
    pub synapse_count: usize,
    pub overflow_synapse_count: usize,
    /// Events waiting in the spike queue.
    pub pending_spikes: usize,
    /// Neurons over threshold on the last tick, before the Razor.
    pub last_candidate_count: usize,
    /// Neurons that actually fired on the last tick.
    pub last_spike_count: usize,
    /// Neurons inside their refractory window as of the last tick.
    pub refractory_count: usize,
    pub chemicals: Neuromodulators,
    pub execution_tier: ExecutionTier,
}

/// The spiking network: neurons, synapses, spike queue and neuromodulators.
#[derive(Debug)]
pub struct Network {
    cfg: NetworkConfig,
    current_tick: Tick,

    neurons: Vec<Neuron>,
    synapses: SynapseStore,
    spike_queue: SpikeQueue,
    fired_this_tick: FiredSet,
    fired_last_tick: FiredSet,
    refractory: NeuronBitset,
    chemicals: Neuromodulators,

    last_candidate_count: usize,
    last_spike_count: usize,

    fanout: Fanout,
    // Per-tick scratch, reused.
    candidates: Vec<Candidate>,
    delivered: Vec<NeuronId>,
}

impl Default for Network {
    fn default() -> Self {
        let cfg = NetworkConfig::default();
        let fanout = Fanout::shared(&cfg);
        Self::assemble(cfg, fanout)
    }
}

impl Network {
    /// Build an empty network. Fails if `cfg` is invalid or its private
    /// worker pool cannot be created.
    pub fn new(cfg: NetworkConfig) -> Result<Self> {
        cfg.validate()?;
        let fanout = Fanout::new(&cfg)?;
        let net = Self::assemble(cfg, fanout);
        debug!(
            neuron_capacity = cfg.neuron_capacity,
            synapse_capacity = cfg.synapse_capacity,
            tier = ?net.fanout.effective_tier(),
            worker_threads = ?cfg.worker_threads,
            "network created"
        );
        Ok(net)
    }

    fn assemble(cfg: NetworkConfig, fanout: Fanout) -> Self {
        Self {
            cfg,
            current_tick: 0,
            neurons: Vec::with_capacity(cfg.neuron_capacity),
            synapses: SynapseStore::with_capacity(cfg.synapse_capacity),
            spike_queue: SpikeQueue::with_capacity(cfg.max_spikes_per_tick),
            fired_this_tick: FiredSet::with_capacity(cfg.neuron_capacity),
            fired_last_tick: FiredSet::with_capacity(cfg.neuron_capacity),
            refractory: NeuronBitset::with_len(cfg.neuron_capacity),
            chemicals: Neuromodulators::default(),
            last_candidate_count: 0,
            last_spike_count: 0,
            fanout,
            candidates: Vec::new(),
            delivered: Vec::new(),
        }
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.cfg
    }

    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Append a neuron; returns its id.
    pub fn add_neuron(&mut self, threshold: Charge, leak: Charge, refractory: i32) -> NeuronId {
        self.push_neuron(Neuron::new(threshold, leak, refractory))
    }

    /// Append a neuron with an explicit parameter set.
    pub fn add_neuron_with(&mut self, params: NeuronParams) -> NeuronId {
        self.push_neuron(Neuron::with_params(params))
    }

    /// Append a neuron using the configured default parameters.
    pub fn add_default_neuron(&mut self) -> NeuronId {
        self.add_neuron_with(self.cfg.default_neuron)
    }

    fn push_neuron(&mut self, neuron: Neuron) -> NeuronId {
        let id = self.neurons.len() as NeuronId;
        self.neurons.push(neuron);
        self.refractory.grow_to(self.neurons.len());
        id
    }

    /// Add a synapse `from -> to`. The weight is clamped to `[-16, 16]`.
    ///
    /// Returns the storage tier it landed in: the source's contiguous block
    /// while that block is still the most recent one, the overflow store
    /// otherwise.
    pub fn connect_neurons(
        &mut self,
        from: NeuronId,
        to: NeuronId,
        weight: i32,
        plastic: bool,
    ) -> Result<Tier> {
        self.check_id(to)?;
        self.check_id(from)?;
        let synapse = Synapse::new(to, clamp_weight(weight), plastic);
        let source = &mut self.neurons[from as usize];
        let tier = self.synapses.connect(from, source, synapse);
        if tier == Tier::Overflow {
            trace!(from, to, "synapse stored in overflow tier");
        }
        Ok(tier)
    }

    fn check_id(&self, id: NeuronId) -> Result<()> {
        if (id as usize) < self.neurons.len() {
            Ok(())
        } else {
            Err(NetworkError::UnknownNeuron {
                id,
                count: self.neurons.len(),
            })
        }
    }

    // ------------------------------------------------------------------
    // Stimulation
    // ------------------------------------------------------------------

    /// Record `id` as firing at the current tick, bypassing its threshold.
    /// The spike propagates on the next tick.
    pub fn inject_spike(&mut self, id: NeuronId) {
        let tick = self.current_tick;
        let Some(neuron) = self.neurons.get_mut(id as usize) else {
            return;
        };
        neuron.last_fired = tick;
        self.spike_queue.push(id, tick);
        self.fired_this_tick.insert(id);
    }

    /// Add signed charge to a neuron. The result is floored at zero.
    pub fn inject_charge(&mut self, id: NeuronId, amount: Charge) {
        if let Some(neuron) = self.neurons.get_mut(id as usize) {
            neuron.add_charge(amount);
        }
    }

    /// Dopamine surge; in operant mode also converts outstanding traces
    /// with `amount / 10`.
    pub fn reward_signal(&mut self, amount: i32) {
        self.chemicals.spike_dopamine(amount);
        if self.is_operant_mode() {
            self.inject_reward(amount / REWARD_FLOOD_DIVISOR);
        }
    }

    pub fn surprise_signal(&mut self, amount: i32) {
        self.chemicals.spike_norepinephrine(amount);
    }

    pub fn calm_signal(&mut self, amount: i32) {
        self.chemicals.spike_serotonin(amount);
    }

    /// Apply `amount` to every armed eligibility trace in both tiers.
    ///
    /// No-op while plasticity is off or dopamine is under the learning gate;
    /// traces survive in that case. Returns the number of traces consumed.
    pub fn inject_reward(&mut self, amount: i32) -> usize {
        if !self.cfg.plasticity_enabled || !self.chemicals.learning_allowed() {
            return 0;
        }
        let mut consumed = 0;
        self.synapses.for_each_mut(|syn| {
            if syn.apply_reward(amount) {
                consumed += 1;
            }
        });
        trace!(amount, consumed, "reward applied");
        consumed
    }

    // ------------------------------------------------------------------
    // Simulation
    // ------------------------------------------------------------------

    /// Advance one tick.
    pub fn step(&mut self) {
        let tick = self.current_tick;

        core::mem::swap(&mut self.fired_this_tick, &mut self.fired_last_tick);
        self.fired_this_tick.clear();
        self.refractory.recompute_refractory(&self.neurons, tick);

        self.fanout.leak(&mut self.neurons, tick, &self.chemicals);
        self.integrate_phase(tick);
        self.fire_phase(tick);

        if self.cfg.plasticity_enabled && self.chemicals.learning_allowed() {
            dynamics::apply_plasticity(
                &self.neurons,
                &mut self.synapses,
                &self.fired_this_tick,
                &self.fired_last_tick,
                self.cfg.operant_mode,
                &self.chemicals,
            );
        }
        if self.cfg.operant_mode {
            self.synapses.for_each_mut(Synapse::decay_eligibility);
        }

        self.chemicals.decay();
        if self.chemicals.is_panic() {
            warn!(
                tick,
                norepinephrine = self.chemicals.norepinephrine,
                "arousal interrupt, resetting activity"
            );
            self.panic_reset();
        }

        trace!(
            tick,
            candidates = self.last_candidate_count,
            spikes = self.last_spike_count,
            "tick complete"
        );
        self.current_tick += 1;
    }

    /// Advance `ticks` ticks.
    pub fn run(&mut self, ticks: usize) {
        for _ in 0..ticks {
            self.step();
        }
    }

    fn integrate_phase(&mut self, tick: Tick) {
        self.delivered.clear();
        let queued = self.spike_queue.len();
        let delivered = self.spike_queue.drain_tick(tick - 1, &mut self.delivered);
        let discarded = queued - self.spike_queue.len() - delivered;
        if discarded > 0 {
            debug!(tick, discarded, "discarded stale spike events");
        }
        dynamics::integrate(
            &self.delivered,
            &mut self.neurons,
            &self.synapses,
            &self.refractory,
        );
    }

    fn fire_phase(&mut self, tick: Tick) {
        let ctx = FiringContext::new(tick, &self.chemicals, self.cfg.noise_seed);
        self.candidates.clear();
        self.fanout
            .collect_candidates(&self.neurons, &ctx, &mut self.candidates);
        self.last_candidate_count = self.candidates.len();

        let budget = self
            .cfg
            .razor_enabled
            .then_some(self.cfg.max_spikes_per_tick);
        if razor::select_top_k(&mut self.candidates, budget) {
            debug!(
                tick,
                candidates = self.last_candidate_count,
                budget = self.cfg.max_spikes_per_tick,
                "razor clipped firing"
            );
        }

        for c in &self.candidates {
            self.neurons[c.neuron as usize].fire(tick);
            self.spike_queue.push(c.neuron, tick);
            self.fired_this_tick.insert(c.neuron);
        }
        self.last_spike_count = self.candidates.len();
    }

    /// Arousal interrupt: drop all charge and in-flight activity and set
    /// norepinephrine to 70. Weights and traces are untouched.
    pub fn panic_reset(&mut self) {
        for n in &mut self.neurons {
            n.charge = 0;
        }
        self.spike_queue.clear();
        self.fired_this_tick.clear();
        self.fired_last_tick.clear();
        self.chemicals
            .set(Channel::Norepinephrine, POST_PANIC_LEVEL as i32);
    }

    /// Clear working state for a new trial. Connectivity and weights are
    /// kept; neuromodulators are left as they are.
    pub fn reset(&mut self) {
        self.current_tick = 0;
        self.fired_this_tick.clear();
        self.fired_last_tick.clear();
        self.spike_queue.clear();
        self.refractory.clear();
        for n in &mut self.neurons {
            n.reset();
        }
        self.last_candidate_count = 0;
        self.last_spike_count = 0;
    }

    // ------------------------------------------------------------------
    // Modes
    // ------------------------------------------------------------------

    pub fn set_plasticity_enabled(&mut self, enabled: bool) {
        self.cfg.plasticity_enabled = enabled;
    }

    pub fn is_plasticity_enabled(&self) -> bool {
        self.cfg.plasticity_enabled
    }

    pub fn set_operant_mode(&mut self, enabled: bool) {
        self.cfg.operant_mode = enabled;
    }

    pub fn is_operant_mode(&self) -> bool {
        self.cfg.operant_mode
    }

    pub fn set_razor_enabled(&mut self, enabled: bool) {
        self.cfg.razor_enabled = enabled;
    }

    pub fn is_razor_enabled(&self) -> bool {
        self.cfg.razor_enabled
    }

    pub fn set_max_spikes_per_tick(&mut self, k: usize) {
        self.cfg.max_spikes_per_tick = k;
    }

    pub fn max_spikes_per_tick(&self) -> usize {
        self.cfg.max_spikes_per_tick
    }

    /// Request an execution tier. `Parallel` only takes effect with the
    /// `parallel` feature, and only above `parallel_threshold` neurons.
    pub fn set_execution_tier(&mut self, tier: ExecutionTier) {
        self.cfg.execution_tier = tier;
        self.fanout.set_tier(tier);
    }

    pub fn effective_execution_tier(&self) -> ExecutionTier {
        self.fanout.effective_tier()
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn current_tick(&self) -> Tick {
        self.current_tick
    }

    pub fn neuron_count(&self) -> usize {
        self.neurons.len()
    }

    /// Synapses in both tiers.
    pub fn synapse_count(&self) -> usize {
        self.synapses.len()
    }

    pub fn overflow_synapse_count(&self) -> usize {
        self.synapses.overflow_len()
    }

    pub fn neuron(&self, id: NeuronId) -> Option<&Neuron> {
        self.neurons.get(id as usize)
    }

    /// Outgoing synapse count of `id` across both tiers; 0 if unknown.
    pub fn neuron_synapse_count(&self, id: NeuronId) -> usize {
        self.neurons
            .get(id as usize)
            .map_or(0, |n| self.synapses.outgoing_count(id, n))
    }

    /// Outgoing synapses of `id`: contiguous block first, then overflow.
    pub fn outgoing_synapses(&self, id: NeuronId) -> impl Iterator<Item = &Synapse> + '_ {
        self.neurons
            .get(id as usize)
            .into_iter()
            .flat_map(move |n| self.synapses.outgoing(id, n))
    }

    /// True if `id` fired (or was injected) on the most recent tick.
    pub fn did_fire(&self, id: NeuronId) -> bool {
        self.fired_this_tick.contains(id)
    }

    /// Ids that fired on the most recent tick, injections first.
    pub fn fired_neurons(&self) -> &[NeuronId] {
        self.fired_this_tick.as_slice()
    }

    /// Charge of `id`; 0 if unknown.
    pub fn charge(&self, id: NeuronId) -> Charge {
        self.neurons.get(id as usize).map_or(0, |n| n.charge)
    }

    /// Weight of the first `source -> target` synapse in either tier; 0 if
    /// there is none.
    pub fn synapse_weight(&self, source: NeuronId, target: NeuronId) -> Weight {
        self.neurons
            .get(source as usize)
            .map_or(0, |n| self.synapses.weight(source, n, target))
    }

    pub fn last_candidate_count(&self) -> usize {
        self.last_candidate_count
    }

    pub fn last_spike_count(&self) -> usize {
        self.last_spike_count
    }

    pub fn pending_spikes(&self) -> usize {
        self.spike_queue.len()
    }

    pub fn chemicals(&self) -> &Neuromodulators {
        &self.chemicals
    }

    pub fn chemicals_mut(&mut self) -> &mut Neuromodulators {
        &mut self.chemicals
    }

    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics {
            tick: self.current_tick,
            neuron_count: self.neurons.len(),
            synapse_count: self.synapses.len(),
            overflow_synapse_count: self.synapses.overflow_len(),
            pending_spikes: self.spike_queue.len(),
            last_candidate_count: self.last_candidate_count,
            last_spike_count: self.last_spike_count,
            refractory_count: self.refractory.count_ones(),
            chemicals: self.chemicals,
            execution_tier: self.fanout.effective_tier(),
        }
    }
}
