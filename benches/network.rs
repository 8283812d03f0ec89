//! Criterion benchmarks for the spiking network.
//!
//! Run with:
//!   cargo bench
//!   cargo bench --features parallel
//!
//! Results are saved to target/criterion/

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use bpagi::config::{ExecutionTier, NetworkConfig};
use bpagi::network::Network;
use bpagi::prng::Prng;

/// Random sparse network with `fanout` synapses per neuron, about one in
/// five inhibitory.
fn make_network(neurons: usize, fanout: usize, tier: ExecutionTier, seed: u64) -> Network {
    let cfg = NetworkConfig::default()
        .with_capacity(neurons, neurons * fanout)
        .with_razor(true, (neurons / 100).max(1))
        .with_execution_tier(tier)
        .with_parallel_threshold(neurons.min(100_000));
    let mut net = Network::new(cfg).unwrap();
    let mut rng = Prng::new(seed);

    for _ in 0..neurons {
        net.add_neuron(20, 1, 3);
    }
    for from in 0..neurons {
        for _ in 0..fanout {
            let to = rng.gen_range_usize(0, neurons);
            let weight = if rng.gen_range_usize(0, 5) == 0 { -8 } else { 6 };
            net.connect_neurons(from as u32, to as u32, weight, true)
                .unwrap();
        }
    }
    net
}

fn drive(net: &mut Network, rng: &mut Prng, inputs: usize) {
    let n = net.neuron_count();
    for _ in 0..inputs {
        net.inject_charge(rng.gen_range_usize(0, n) as u32, 30);
    }
}

/// Benchmark step() with varying network sizes.
fn bench_step_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("step_size");

    for size in [1_000, 10_000, 100_000].iter() {
        group.throughput(Throughput::Elements(*size as u64));

        group.bench_with_input(BenchmarkId::new("scalar", size), size, |b, &size| {
            let mut net = make_network(size, 16, ExecutionTier::Scalar, 42);
            let mut rng = Prng::new(7);

            b.iter(|| {
                drive(&mut net, &mut rng, size / 50);
                net.step();
                black_box(net.last_spike_count())
            });
        });
    }

    group.finish();
}

/// Benchmark step() comparing execution tiers at a fixed size.
fn bench_step_tiers(c: &mut Criterion) {
    let mut group = c.benchmark_group("step_tier");

    let size = 200_000;
    group.throughput(Throughput::Elements(size as u64));
    group.sample_size(20);

    for (name, tier) in [
        ("scalar_200k", ExecutionTier::Scalar),
        // Falls back to scalar if the feature is not enabled.
        ("parallel_200k", ExecutionTier::Parallel),
    ] {
        group.bench_function(name, |b| {
            let mut net = make_network(size, 8, tier, 42);
            let mut rng = Prng::new(7);

            b.iter(|| {
                drive(&mut net, &mut rng, size / 50);
                net.step();
                black_box(net.diagnostics().last_candidate_count)
            });
        });
    }

    group.finish();
}

/// Benchmark operant learning: trace bookkeeping plus periodic reward.
fn bench_operant(c: &mut Criterion) {
    let mut group = c.benchmark_group("operant");

    for size in [1_000, 10_000].iter() {
        group.throughput(Throughput::Elements((*size * 16) as u64));

        group.bench_with_input(BenchmarkId::new("reward", size), size, |b, &size| {
            let mut net = make_network(size, 16, ExecutionTier::Scalar, 42);
            net.set_operant_mode(true);
            let mut rng = Prng::new(7);

            // Warm up: get some activity going.
            for _ in 0..50 {
                drive(&mut net, &mut rng, size / 50);
                net.step();
            }

            b.iter(|| {
                drive(&mut net, &mut rng, size / 50);
                net.step();
                net.reward_signal(20);
                black_box(net.synapse_count())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_step_sizes, bench_step_tiers, bench_operant);
criterion_main!(benches);
