//! Four-channel neuromodulator state.
//!
//! | Channel          | Role                   | Baseline |
//! |------------------|------------------------|----------|
//! | `Dopamine`       | learning gate          | 50       |
//! | `Norepinephrine` | arousal / threshold gain | 30     |
//! | `Serotonin`      | stability (extra leak) | 50       |
//! | `Acetylcholine`  | attention gate         | 50       |
//!
//! Every channel lives in `0..=100` and drifts one step per tick toward its
//! baseline. The state belongs to one `Network` and is handed to the tick
//! phases by reference.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::types::Charge;

pub const CHANNEL_MIN: u8 = 0;
pub const CHANNEL_MAX: u8 = 100;

pub const DOPAMINE_BASELINE: u8 = 50;
pub const NOREPINEPHRINE_BASELINE: u8 = 30;
pub const SEROTONIN_BASELINE: u8 = 50;
pub const ACETYLCHOLINE_BASELINE: u8 = 50;

/// Below this dopamine level no plasticity runs.
pub const LEARNING_GATE_MIN: u8 = 10;
/// Arousal at or above this level triggers the interrupt.
pub const PANIC_LEVEL: u8 = 95;
/// Arousal level the interrupt leaves behind.
pub const POST_PANIC_LEVEL: u8 = 70;
/// Arousal above this level adds exploration noise to thresholds.
pub const EXPLORATION_ONSET: u8 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Channel {
    Dopamine,
    Norepinephrine,
    Serotonin,
    Acetylcholine,
}

impl Channel {
    pub const ALL: [Channel; 4] = [
        Channel::Dopamine,
        Channel::Norepinephrine,
        Channel::Serotonin,
        Channel::Acetylcholine,
    ];

    pub fn baseline(self) -> u8 {
        match self {
            Channel::Dopamine => DOPAMINE_BASELINE,
            Channel::Norepinephrine => NOREPINEPHRINE_BASELINE,
            Channel::Serotonin => SEROTONIN_BASELINE,
            Channel::Acetylcholine => ACETYLCHOLINE_BASELINE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Neuromodulators {
    pub dopamine: u8,
    pub norepinephrine: u8,
    pub serotonin: u8,
    pub acetylcholine: u8,
}

impl Default for Neuromodulators {
    /// Baseline "awake and calm" state.
    fn default() -> Self {
        Self {
            dopamine: DOPAMINE_BASELINE,
            norepinephrine: NOREPINEPHRINE_BASELINE,
            serotonin: SEROTONIN_BASELINE,
            acetylcholine: ACETYLCHOLINE_BASELINE,
        }
    }
}

impl Neuromodulators {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(&self, channel: Channel) -> u8 {
        match channel {
            Channel::Dopamine => self.dopamine,
            Channel::Norepinephrine => self.norepinephrine,
            Channel::Serotonin => self.serotonin,
            Channel::Acetylcholine => self.acetylcholine,
        }
    }

    fn slot(&mut self, channel: Channel) -> &mut u8 {
        match channel {
            Channel::Dopamine => &mut self.dopamine,
            Channel::Norepinephrine => &mut self.norepinephrine,
            Channel::Serotonin => &mut self.serotonin,
            Channel::Acetylcholine => &mut self.acetylcholine,
        }
    }

    /// Set a channel directly (clamped to `0..=100`).
    pub fn set(&mut self, channel: Channel, level: i32) {
        *self.slot(channel) = clamp_level(level);
    }

    /// Add a signed amount to a channel and re-clamp.
    pub fn spike(&mut self, channel: Channel, amount: i32) {
        let slot = self.slot(channel);
        *slot = clamp_level(*slot as i32 + amount);
    }

    pub fn spike_dopamine(&mut self, amount: i32) {
        self.spike(Channel::Dopamine, amount);
    }

    pub fn spike_norepinephrine(&mut self, amount: i32) {
        self.spike(Channel::Norepinephrine, amount);
    }

    pub fn spike_serotonin(&mut self, amount: i32) {
        self.spike(Channel::Serotonin, amount);
    }

    pub fn spike_acetylcholine(&mut self, amount: i32) {
        self.spike(Channel::Acetylcholine, amount);
    }

    /// One homeostatic step: every channel moves one unit toward its baseline.
    pub fn decay(&mut self) {
        for channel in Channel::ALL {
            let baseline = channel.baseline();
            let slot = self.slot(channel);
            if *slot > baseline {
                *slot -= 1;
            } else if *slot < baseline {
                *slot += 1;
            }
        }
    }

    /// Amount subtracted from every base threshold (`NE / 5`).
    #[inline]
    pub fn threshold_reduction(&self) -> Charge {
        self.norepinephrine as Charge / 5
    }

    /// Half-width of the threshold noise band (`(NE - 60) / 4`, 0 at or below 60).
    #[inline]
    pub fn exploration_amplitude(&self) -> Charge {
        if self.norepinephrine > EXPLORATION_ONSET {
            (self.norepinephrine - EXPLORATION_ONSET) as Charge / 4
        } else {
            0
        }
    }

    /// Additional leak applied on top of each neuron's own (`5-HT / 10`).
    #[inline]
    pub fn extra_leak(&self) -> Charge {
        self.serotonin as Charge / 10
    }

    #[inline]
    pub fn learning_allowed(&self) -> bool {
        self.dopamine >= LEARNING_GATE_MIN
    }

    /// Dopamine level that scales immediate STDP (50 = nominal magnitude).
    #[inline]
    pub fn learning_scale(&self) -> u8 {
        self.dopamine
    }

    #[inline]
    pub fn is_panic(&self) -> bool {
        self.norepinephrine >= PANIC_LEVEL
    }

    /// Sensory charge an attention-gated front end should inject per active
    /// input (`5 + ACh / 10`, i.e. 5..=15).
    #[inline]
    pub fn attention_charge(&self) -> Charge {
        5 + self.acetylcholine as Charge / 10
    }
}

#[inline]
fn clamp_level(level: i32) -> u8 {
    level.clamp(CHANNEL_MIN as i32, CHANNEL_MAX as i32) as u8
}
