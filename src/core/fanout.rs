//! Data-parallel execution of the per-neuron tick phases.
//!
//! Leak and candidate collection touch each neuron independently. Above the
//! configured population threshold they are split into fixed-size chunks and
//! run on rayon workers; partial candidate lists are merged back in chunk
//! order, so results are identical to the scalar path.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::{ExecutionTier, NetworkConfig};
use crate::dynamics::{self, FiringContext};
use crate::error::Result;
use crate::neuromod::Neuromodulators;
use crate::neuron::Neuron;
use crate::razor::Candidate;
use crate::types::Tick;
#[cfg(feature = "parallel")]
use crate::types::NeuronId;

#[derive(Debug)]
pub struct Fanout {
    tier: ExecutionTier,
    threshold: usize,
    chunk: usize,
    #[cfg(feature = "parallel")]
    pool: Option<rayon::ThreadPool>,
}

impl Fanout {
    pub fn new(cfg: &NetworkConfig) -> Result<Self> {
        Ok(Self {
            tier: cfg.execution_tier,
            threshold: cfg.parallel_threshold,
            chunk: cfg.parallel_chunk.max(1),
            #[cfg(feature = "parallel")]
            pool: build_pool(cfg.worker_threads)?,
        })
    }

    /// Same tier settings as [`Fanout::new`] but always on the global rayon
    /// pool, so it cannot fail.
    pub fn shared(cfg: &NetworkConfig) -> Self {
        Self {
            tier: cfg.execution_tier,
            threshold: cfg.parallel_threshold,
            chunk: cfg.parallel_chunk.max(1),
            #[cfg(feature = "parallel")]
            pool: None,
        }
    }

    /// Scalar-only executor; never spawns threads.
    pub fn scalar() -> Self {
        Self {
            tier: ExecutionTier::Scalar,
            threshold: usize::MAX,
            chunk: 4096,
            #[cfg(feature = "parallel")]
            pool: None,
        }
    }

    pub fn tier(&self) -> ExecutionTier {
        self.tier
    }

    pub fn set_tier(&mut self, tier: ExecutionTier) {
        self.tier = tier;
    }

    /// The tier actually used; `Parallel` degrades to `Scalar` without the
    /// `parallel` feature.
    pub fn effective_tier(&self) -> ExecutionTier {
        match self.tier {
            #[cfg(feature = "parallel")]
            ExecutionTier::Parallel => ExecutionTier::Parallel,
            _ => ExecutionTier::Scalar,
        }
    }

    /// True if a population of `neurons` would run on workers.
    pub fn is_parallel_for(&self, neurons: usize) -> bool {
        self.effective_tier() == ExecutionTier::Parallel && neurons >= self.threshold
    }

    pub fn leak(&self, neurons: &mut [Neuron], tick: Tick, chemicals: &Neuromodulators) {
        if self.is_parallel_for(neurons.len()) {
            self.leak_parallel(neurons, tick, chemicals);
        } else {
            dynamics::leak_slice(neurons, tick, chemicals);
        }
    }

    /// Append this tick's firing candidates to `out`, in ascending id order.
    pub fn collect_candidates(
        &self,
        neurons: &[Neuron],
        ctx: &FiringContext,
        out: &mut Vec<Candidate>,
    ) {
        if self.is_parallel_for(neurons.len()) {
            self.collect_parallel(neurons, ctx, out);
        } else {
            dynamics::collect_candidates(neurons, 0, ctx, out);
        }
    }

    #[cfg(feature = "parallel")]
    fn install<R, F>(&self, op: F) -> R
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }

    #[cfg(feature = "parallel")]
    fn leak_parallel(&self, neurons: &mut [Neuron], tick: Tick, chemicals: &Neuromodulators) {
        let chunk = self.chunk;
        self.install(|| {
            neurons
                .par_chunks_mut(chunk)
                .for_each(|slice| dynamics::leak_slice(slice, tick, chemicals));
        });
    }

    #[cfg(not(feature = "parallel"))]
    fn leak_parallel(&self, neurons: &mut [Neuron], tick: Tick, chemicals: &Neuromodulators) {
        dynamics::leak_slice(neurons, tick, chemicals);
    }

    #[cfg(feature = "parallel")]
    fn collect_parallel(&self, neurons: &[Neuron], ctx: &FiringContext, out: &mut Vec<Candidate>) {
        let chunk = self.chunk;
        let parts: Vec<Vec<Candidate>> = self.install(|| {
            neurons
                .par_chunks(chunk)
                .enumerate()
                .map(|(i, slice)| {
                    let mut local = Vec::new();
                    dynamics::collect_candidates(slice, (i * chunk) as NeuronId, ctx, &mut local);
                    local
                })
                .collect()
        });
        out.reserve(parts.iter().map(Vec::len).sum());
        for part in parts {
            out.extend(part);
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn collect_parallel(&self, neurons: &[Neuron], ctx: &FiringContext, out: &mut Vec<Candidate>) {
        dynamics::collect_candidates(neurons, 0, ctx, out);
    }
}

impl Default for Fanout {
    fn default() -> Self {
        Self::scalar()
    }
}

#[cfg(feature = "parallel")]
fn build_pool(threads: Option<usize>) -> Result<Option<rayon::ThreadPool>> {
    let Some(n) = threads else {
        return Ok(None);
    };
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(n)
        .thread_name(|i| format!("bpagi-worker-{i}"))
        .build()?;
    tracing::debug!(threads = n, "built private worker pool");
    Ok(Some(pool))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "parallel")]
    fn population(n: usize) -> Vec<Neuron> {
        (0..n)
            .map(|i| {
                let mut neuron = Neuron::new(20 + (i % 7) as i32, 1, 2);
                neuron.charge = (i * 31 % 60) as i32;
                if i % 11 == 0 {
                    neuron.last_fired = 9;
                }
                neuron
            })
            .collect()
    }

    #[test]
    fn scalar_tier_never_goes_parallel() {
        let fan = Fanout::scalar();
        assert!(!fan.is_parallel_for(10_000_000));
        assert_eq!(fan.effective_tier(), ExecutionTier::Scalar);
    }

    #[cfg(not(feature = "parallel"))]
    #[test]
    fn parallel_request_degrades_without_feature() {
        let cfg = NetworkConfig::default().with_execution_tier(ExecutionTier::Parallel);
        let fan = Fanout::new(&cfg).unwrap();
        assert_eq!(fan.tier(), ExecutionTier::Parallel);
        assert_eq!(fan.effective_tier(), ExecutionTier::Scalar);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_matches_scalar() {
        use crate::neuromod::Channel;

        let cfg = NetworkConfig {
            execution_tier: ExecutionTier::Parallel,
            parallel_threshold: 1,
            parallel_chunk: 64,
            worker_threads: Some(3),
            ..Default::default()
        };
        let par = Fanout::new(&cfg).unwrap();
        let seq = Fanout::scalar();
        assert!(par.is_parallel_for(1000));

        let mut chem = Neuromodulators::default();
        chem.set(Channel::Norepinephrine, 84);

        let mut a = population(1000);
        let mut b = a.clone();
        par.leak(&mut a, 10, &chem);
        seq.leak(&mut b, 10, &chem);
        assert_eq!(a, b);

        let ctx = FiringContext::new(10, &chem, 42);
        let mut ca = Vec::new();
        let mut cb = Vec::new();
        par.collect_candidates(&a, &ctx, &mut ca);
        seq.collect_candidates(&b, &ctx, &mut cb);
        assert!(!ca.is_empty());
        assert_eq!(ca, cb);
    }
}
