//! Scalar types and kernel-wide constants.
//!
//! All arithmetic in the kernel is integer-only. Weights are stored as `i8`
//! but only the range `[WEIGHT_MIN, WEIGHT_MAX]` is ever used.

/// Index of a neuron in the network's flat neuron array.
pub type NeuronId = u32;

/// Discrete simulation time. Signed so "never fired" can sit before tick 0.
pub type Tick = i64;

/// Membrane potential.
pub type Charge = i32;

/// Synaptic weight (effective range: -16 to +16).
pub type Weight = i8;

pub const WEIGHT_MIN: Weight = -16;
pub const WEIGHT_MAX: Weight = 16;

/// Charge never drops below this value.
pub const CHARGE_MIN: Charge = 0;

/// Sentinel for "no neuron".
pub const INVALID_NEURON: NeuronId = NeuronId::MAX;

pub const DEFAULT_THRESHOLD: Charge = 10;
pub const DEFAULT_LEAK: Charge = 1;
pub const DEFAULT_REFRACTORY: i32 = 5;

/// STDP timing window in ticks.
pub const STDP_WINDOW: Tick = 20;

/// Clamp a wide intermediate value back into the weight range.
#[inline]
pub fn clamp_weight(w: i32) -> Weight {
    w.clamp(WEIGHT_MIN as i32, WEIGHT_MAX as i32) as Weight
}
