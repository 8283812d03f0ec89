//! Synapse storage unit and the two plasticity rules.
//!
//! - Immediate (Pavlovian) STDP: the weight moves as soon as a pre/post
//!   coincidence is seen.
//! - Deferred (operant): a causal coincidence only marks the synapse as
//!   eligible; a later reward converts the decaying trace into a weight change.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::types::{clamp_weight, NeuronId, Tick, Weight, INVALID_NEURON, STDP_WINDOW};

/// Trace value set by a causal coincidence.
pub const ELIGIBILITY_MAX: i8 = 100;
/// Trace decrement per tick.
pub const ELIGIBILITY_DECAY: i8 = 1;
/// Divisor applied to `trace * reward`.
pub const REWARD_SCALE_FACTOR: i32 = 50;
/// Largest single weight change a reward may apply.
pub const REWARD_DELTA_LIMIT: i32 = 16;

/// Dopamine level at which immediate STDP runs at its nominal magnitude.
const LEARNING_GAIN_BASELINE: i32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Synapse {
    pub target: NeuronId,
    pub weight: Weight,
    pub plastic: bool,
    /// 0..=100. Non-zero only in operant mode.
    pub eligibility: i8,
}

impl Default for Synapse {
    fn default() -> Self {
        Self {
            target: INVALID_NEURON,
            weight: 0,
            plastic: true,
            eligibility: 0,
        }
    }
}

impl Synapse {
    pub fn new(target: NeuronId, weight: Weight, plastic: bool) -> Self {
        Self {
            target,
            weight: clamp_weight(weight as i32),
            plastic,
            eligibility: 0,
        }
    }

    /// Immediate STDP update for `delta_t = post - pre`.
    ///
    /// The nominal delta is scaled by `dopamine / 50`; a non-zero nominal
    /// delta always moves the weight at least one step in its direction.
    /// Returns true if the weight changed.
    pub fn update_weight(&mut self, pre_fired: Tick, post_fired: Tick, dopamine: u8) -> bool {
        if !self.plastic {
            return false;
        }
        let nominal = stdp_delta(post_fired - pre_fired) as i32;
        if nominal == 0 {
            return false;
        }
        let mut scaled = nominal * dopamine as i32 / LEARNING_GAIN_BASELINE;
        if scaled == 0 {
            scaled = nominal.signum();
        }
        let before = self.weight;
        self.weight = clamp_weight(self.weight as i32 + scaled);
        self.weight != before
    }

    /// Operant mode: a causal pairing inside the window arms the trace.
    pub fn mark_eligible(&mut self, pre_fired: Tick, post_fired: Tick) {
        if !self.plastic {
            return;
        }
        let dt = post_fired - pre_fired;
        if dt > 0 && dt <= STDP_WINDOW {
            self.eligibility = ELIGIBILITY_MAX;
        }
    }

    #[inline]
    pub fn decay_eligibility(&mut self) {
        if self.eligibility > 0 {
            self.eligibility = (self.eligibility - ELIGIBILITY_DECAY).max(0);
        }
    }

    /// Convert the outstanding trace into a weight change and clear it.
    ///
    /// `weight += clamp(trace * amount / 50, -16, 16)`. Returns true if a trace
    /// was consumed.
    pub fn apply_reward(&mut self, amount: i32) -> bool {
        if !self.plastic || self.eligibility <= 0 {
            return false;
        }
        let delta = (self.eligibility as i32).saturating_mul(amount) / REWARD_SCALE_FACTOR;
        let delta = delta.clamp(-REWARD_DELTA_LIMIT, REWARD_DELTA_LIMIT);
        self.weight = clamp_weight(self.weight as i32 + delta);
        self.eligibility = 0;
        true
    }
}

/// Nominal STDP weight change for `delta_t = t_post - t_pre`.
///
/// `sign(dt) * round(2 * (W - |dt|) / W)` for `0 < |dt| <= W`, else 0.
/// Rounding is half-up, done in integers.
pub fn stdp_delta(delta_t: Tick) -> Weight {
    if delta_t == 0 {
        return 0;
    }
    let abs = delta_t.abs();
    if abs > STDP_WINDOW {
        return 0;
    }
    // round(2(W-a)/W) == (4(W-a) + W) / 2W
    let magnitude = (4 * (STDP_WINDOW - abs) + STDP_WINDOW) / (2 * STDP_WINDOW);
    let magnitude = magnitude as Weight;
    if delta_t > 0 {
        magnitude
    } else {
        -magnitude
    }
}
