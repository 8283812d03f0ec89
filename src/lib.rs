//! # bpagi
//!
//! An integer spiking-network kernel.
//!
//! Neurons integrate signed integer charge, fire past a threshold, and stay
//! refractory for a few ticks. Spikes travel with a strict one-tick delay
//! through a min-ordered event queue, plastic synapses learn by
//! spike-timing (immediately or through eligibility traces and reward), and
//! four global neuromodulator channels gate learning, arousal, leak and
//! attention. A k-winner-take-all budget ("Razor") bounds how many neurons
//! may fire per tick.
//!
//! ## Quick Start
//!
//! ```
//! use bpagi::prelude::*;
//!
//! let mut net = Network::new(NetworkConfig::default())?;
//! let a = net.add_neuron(3, 0, 2);
//! let b = net.add_neuron(5, 0, 2);
//! net.connect_neurons(a, b, 5, true)?;
//!
//! net.inject_spike(a);
//! net.run(2); // one tick to schedule, one to deliver
//! assert!(net.did_fire(b));
//!
//! net.reward_signal(REWARD_SIGNAL_AMOUNT);
//! # Ok::<(), bpagi::NetworkError>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Standard library support
//! - `serde` (default): Serialization of state and JSON config loading
//! - `parallel`: Fan the leak and candidate phases out over rayon workers
//!
//! ## no_std Support
//!
//! Disable default features for `no_std` environments:
//! ```toml
//! bpagi = { version = "0.1", default-features = false }
//! ```
//!
//! ## Modules
//!
//! - [`network`]: The tick loop and public operations
//! - [`neuron`], [`synapse`]: Per-element state and update rules
//! - [`connectivity`]: Two-tier synapse storage
//! - [`spike_queue`]: Time-ordered spike events
//! - [`neuromod`]: Dopamine, norepinephrine, serotonin, acetylcholine
//! - [`razor`]: Top-k firing budget
//! - [`config`]: Sizing, modes and execution tier

// no_std support
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

#[path = "core/types.rs"]
pub mod types;

#[path = "core/error.rs"]
pub mod error;

#[path = "core/prng.rs"]
pub mod prng;

#[path = "core/neuron.rs"]
pub mod neuron;

#[path = "core/synapse.rs"]
pub mod synapse;

#[path = "core/neuromod.rs"]
pub mod neuromod;

#[path = "core/spike_queue.rs"]
pub mod spike_queue;

#[path = "core/bitset.rs"]
pub mod bitset;

#[path = "core/connectivity.rs"]
pub mod connectivity;

#[path = "core/razor.rs"]
pub mod razor;

#[path = "core/dynamics.rs"]
pub mod dynamics;

#[path = "core/config.rs"]
pub mod config;

#[path = "core/fanout.rs"]
pub mod fanout;

#[path = "core/network.rs"]
pub mod network;

pub use error::{ConfigError, NetworkError, Result};

/// Prelude module for convenient imports.
///
/// ```
/// use bpagi::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{ExecutionTier, NetworkConfig};
    pub use crate::connectivity::Tier;
    pub use crate::error::{ConfigError, NetworkError};
    pub use crate::network::{
        Diagnostics, Network, CALM_SIGNAL_AMOUNT, REWARD_SIGNAL_AMOUNT, SURPRISE_SIGNAL_AMOUNT,
    };
    pub use crate::neuromod::{Channel, Neuromodulators};
    pub use crate::neuron::{Neuron, NeuronParams};
    pub use crate::synapse::Synapse;
    pub use crate::types::{Charge, NeuronId, Tick, Weight, WEIGHT_MAX, WEIGHT_MIN};
}
