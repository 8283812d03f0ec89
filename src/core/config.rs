#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::neuron::NeuronParams;

/// Execution tier for the data-parallel tick phases.
///
/// - `Scalar`: single-threaded (works everywhere)
/// - `Parallel`: leak and candidate collection fan out over rayon workers
///   once the population reaches `parallel_threshold` (requires `parallel`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ExecutionTier {
    #[default]
    Scalar,
    Parallel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NetworkConfig {
    /// Reservation hint for the neuron array.
    pub neuron_capacity: usize,
    /// Reservation hint for the primary synapse array.
    pub synapse_capacity: usize,

    /// k-WTA firing budget ("Razor").
    pub razor_enabled: bool,
    pub max_spikes_per_tick: usize,

    pub plasticity_enabled: bool,
    /// true: eligibility traces + reward. false: immediate STDP.
    pub operant_mode: bool,

    pub execution_tier: ExecutionTier,
    /// Populations smaller than this always run single-threaded.
    pub parallel_threshold: usize,
    /// Neurons per work item in the parallel phases.
    pub parallel_chunk: usize,
    /// `Some(n)`: run parallel phases on a private pool of exactly `n`
    /// threads. `None`: use the global rayon pool.
    pub worker_threads: Option<usize>,

    /// Seed for the arousal-driven threshold noise.
    pub noise_seed: u64,

    /// Parameters for [`Network::add_default_neuron`](crate::network::Network::add_default_neuron).
    pub default_neuron: NeuronParams,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            neuron_capacity: 0,
            synapse_capacity: 0,
            razor_enabled: true,
            max_spikes_per_tick: 5000,
            plasticity_enabled: true,
            operant_mode: false,
            execution_tier: default_tier(),
            parallel_threshold: 100_000,
            parallel_chunk: 4096,
            worker_threads: None,
            noise_seed: 1,
            default_neuron: NeuronParams::default(),
        }
    }
}

#[cfg(feature = "parallel")]
fn default_tier() -> ExecutionTier {
    ExecutionTier::Parallel
}

#[cfg(not(feature = "parallel"))]
fn default_tier() -> ExecutionTier {
    ExecutionTier::Scalar
}

impl NetworkConfig {
    /// ~1M neurons, 100M synapses, 1000 spikes per tick.
    pub fn honeybee() -> Self {
        Self::scaled(1_000_000, 100_000_000, 1000)
    }

    /// ~5M neurons, 500M synapses, 5000 spikes per tick.
    pub fn dragonfly() -> Self {
        Self::scaled(5_000_000, 500_000_000, 5000)
    }

    /// Small and fast: 10k neurons, 100k synapses, 100 spikes per tick.
    pub fn test_scale() -> Self {
        Self::scaled(10_000, 100_000, 100)
    }

    fn scaled(neurons: usize, synapses: usize, max_spikes: usize) -> Self {
        Self {
            neuron_capacity: neurons,
            synapse_capacity: synapses,
            max_spikes_per_tick: max_spikes,
            default_neuron: NeuronParams::cortical(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.parallel_chunk == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        if self.parallel_threshold == 0 {
            return Err(ConfigError::ZeroParallelThreshold);
        }
        if self.worker_threads == Some(0) {
            return Err(ConfigError::ZeroWorkerThreads);
        }
        let p = &self.default_neuron;
        if p.threshold < 1 {
            return Err(ConfigError::InvalidNeuronParams { field: "threshold" });
        }
        if p.leak < 0 {
            return Err(ConfigError::InvalidNeuronParams { field: "leak" });
        }
        if p.refractory < 0 {
            return Err(ConfigError::InvalidNeuronParams {
                field: "refractory",
            });
        }
        Ok(())
    }

    /// Parse a JSON config; absent fields take their defaults.
    #[cfg(feature = "serde")]
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn with_capacity(mut self, neurons: usize, synapses: usize) -> Self {
        self.neuron_capacity = neurons;
        self.synapse_capacity = synapses;
        self
    }

    pub fn with_razor(mut self, enabled: bool, max_spikes_per_tick: usize) -> Self {
        self.razor_enabled = enabled;
        self.max_spikes_per_tick = max_spikes_per_tick;
        self
    }

    pub fn with_operant_mode(mut self, enabled: bool) -> Self {
        self.operant_mode = enabled;
        self
    }

    pub fn with_execution_tier(mut self, tier: ExecutionTier) -> Self {
        self.execution_tier = tier;
        self
    }

    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = Some(threads);
        self
    }

    pub fn with_parallel_threshold(mut self, neurons: usize) -> Self {
        self.parallel_threshold = neurons;
        self
    }

    pub fn with_noise_seed(mut self, seed: u64) -> Self {
        self.noise_seed = seed;
        self
    }
}
