use thiserror::Error;

use crate::types::NeuronId;

/// Invalid [`NetworkConfig`](crate::config::NetworkConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("parallel_chunk must be > 0")]
    ZeroChunkSize,

    #[error("worker_threads must be > 0 when set")]
    ZeroWorkerThreads,

    #[error("parallel_threshold must be > 0")]
    ZeroParallelThreshold,

    #[error("default_neuron.{field} is out of range")]
    InvalidNeuronParams { field: &'static str },

    #[cfg(feature = "serde")]
    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("neuron {id} does not exist (network has {count})")]
    UnknownNeuron { id: NeuronId, count: usize },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[cfg(feature = "parallel")]
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = core::result::Result<T, NetworkError>;
