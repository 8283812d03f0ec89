#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::types::{Charge, Tick, CHARGE_MIN, DEFAULT_LEAK, DEFAULT_REFRACTORY, DEFAULT_THRESHOLD};

/// Construction parameters for a single neuron.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NeuronParams {
    pub threshold: Charge,
    pub leak: Charge,
    pub refractory: i32,
}

impl Default for NeuronParams {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            leak: DEFAULT_LEAK,
            refractory: DEFAULT_REFRACTORY,
        }
    }
}

impl NeuronParams {
    pub fn new(threshold: Charge, leak: Charge, refractory: i32) -> Self {
        Self {
            threshold,
            leak,
            refractory,
        }
    }

    /// Large-scale cortical physics (threshold 100, leak 2, refractory 5).
    pub fn cortical() -> Self {
        Self::new(100, 2, 5)
    }
}

/// Leaky integrate-and-fire unit.
///
/// `synapse_offset..synapse_offset + synapse_count` is this neuron's block in
/// the primary synapse array. Synapses added after the block was closed live
/// in the overflow tier (see [`crate::connectivity::SynapseStore`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Neuron {
    /// Membrane potential. Never negative.
    pub charge: Charge,
    /// Amount the charge decays per tick.
    pub leak: Charge,
    pub threshold: Charge,
    pub last_fired: Tick,
    /// Ticks after firing during which the neuron neither leaks nor fires.
    pub refractory: i32,
    pub synapse_offset: u32,
    pub synapse_count: u32,
}

impl Default for Neuron {
    fn default() -> Self {
        Self::with_params(NeuronParams::default())
    }
}

impl Neuron {
    pub fn new(threshold: Charge, leak: Charge, refractory: i32) -> Self {
        Self {
            charge: CHARGE_MIN,
            leak,
            threshold,
            // Far enough in the past that the neuron may fire on tick 0.
            last_fired: never_fired(refractory),
            refractory,
            synapse_offset: 0,
            synapse_count: 0,
        }
    }

    pub fn with_params(params: NeuronParams) -> Self {
        Self::new(params.threshold, params.leak, params.refractory)
    }

    #[inline]
    pub fn is_refractory(&self, tick: Tick) -> bool {
        tick - self.last_fired <= self.refractory as Tick
    }

    /// `charge = max(0, charge - leak - extra)`.
    #[inline]
    pub fn apply_leak(&mut self, extra: Charge) {
        self.charge = self
            .charge
            .saturating_sub(self.leak)
            .saturating_sub(extra)
            .max(CHARGE_MIN);
    }

    /// Add signed charge; the result is floored at zero.
    #[inline]
    pub fn add_charge(&mut self, amount: Charge) {
        self.charge = self.charge.saturating_add(amount).max(CHARGE_MIN);
    }

    #[inline]
    pub fn fire(&mut self, tick: Tick) {
        self.charge = CHARGE_MIN;
        self.last_fired = tick;
    }

    /// Clear working state. Connectivity (offset/count) is kept.
    #[inline]
    pub fn reset(&mut self) {
        self.charge = CHARGE_MIN;
        self.last_fired = never_fired(self.refractory);
    }
}

#[inline]
fn never_fired(refractory: i32) -> Tick {
    -(refractory as Tick) - 1
}
