//! End-to-end behaviour of the network through its public operations.

use bpagi::prelude::*;
use bpagi::neuromod::{NOREPINEPHRINE_BASELINE, POST_PANIC_LEVEL};

fn scalar_network() -> Network {
    Network::new(NetworkConfig::default().with_execution_tier(ExecutionTier::Scalar))
        .expect("default config is valid")
}

/// Outgoing weights of `id`, both tiers.
fn weights_of(net: &Network, id: NeuronId) -> Vec<Weight> {
    net.outgoing_synapses(id).map(|s| s.weight).collect()
}

fn eligibility(net: &Network, from: NeuronId) -> i8 {
    net.outgoing_synapses(from)
        .next()
        .map(|s| s.eligibility)
        .unwrap_or_default()
}

#[test]
fn spike_propagates_with_one_tick_delay() {
    let mut net = scalar_network();
    let a = net.add_neuron(3, 0, 2);
    let b = net.add_neuron(5, 0, 2);
    net.connect_neurons(a, b, 5, false).unwrap();

    net.inject_spike(a);
    net.step();
    assert_eq!(net.charge(b), 0);
    assert!(!net.did_fire(b));

    net.step();
    assert!(net.did_fire(b));
    assert_eq!(net.charge(b), 0, "firing resets charge");
}

#[test]
fn delivered_charge_is_visible_before_threshold() {
    let mut net = scalar_network();
    let a = net.add_neuron(3, 0, 2);
    let b = net.add_neuron(500, 0, 2);
    net.connect_neurons(a, b, 5, false).unwrap();

    net.inject_spike(a);
    net.run(2);
    assert_eq!(net.charge(b), 5);
    assert!(!net.did_fire(b));
}

#[test]
fn razor_fires_exactly_the_top_k_of_ten_thousand() {
    let mut net = Network::new(NetworkConfig::test_scale()).unwrap();
    assert_eq!(net.max_spikes_per_tick(), 100);

    for i in 0..10_000 {
        let id = net.add_neuron(10, 1, 5);
        net.inject_charge(id, 100 + i);
    }
    net.step();

    assert_eq!(net.last_candidate_count(), 10_000);
    assert_eq!(net.last_spike_count(), 100);
    let expected: Vec<NeuronId> = (9_900..10_000).collect();
    assert_eq!(net.fired_neurons(), expected.as_slice());

    // Losers keep their (leaked) charge.
    assert_eq!(net.charge(0), 100 - 1 - 5);
    assert_eq!(net.charge(9_999), 0);
}

#[test]
fn razor_ties_are_deterministic() {
    let mut net = scalar_network();
    net.set_max_spikes_per_tick(4);
    for _ in 0..20 {
        let id = net.add_neuron(10, 0, 5);
        net.inject_charge(id, 50);
    }
    net.step();
    assert_eq!(net.fired_neurons(), &[0, 1, 2, 3]);
}

#[cfg(feature = "parallel")]
#[test]
fn parallel_tier_matches_scalar_tier() {
    fn build(tier: ExecutionTier) -> Network {
        let cfg = NetworkConfig::default()
            .with_execution_tier(tier)
            .with_parallel_threshold(512)
            .with_worker_threads(4)
            .with_razor(true, 300);
        let mut net = Network::new(cfg).unwrap();
        for i in 0..5_000u32 {
            let id = net.add_neuron(40 + (i % 13) as i32, 1, 3);
            net.inject_charge(id, ((i * 7919) % 97) as i32);
        }
        for i in 0..5_000u32 {
            net.connect_neurons(i, (i * 31 + 7) % 5_000, 9, true).unwrap();
        }
        // High arousal: threshold noise is active.
        net.chemicals_mut().set(Channel::Norepinephrine, 88);
        net
    }

    let mut par = build(ExecutionTier::Parallel);
    let mut seq = build(ExecutionTier::Scalar);
    assert_eq!(par.effective_execution_tier(), ExecutionTier::Parallel);

    for _ in 0..6 {
        par.step();
        seq.step();
        assert_eq!(par.fired_neurons(), seq.fired_neurons());
        assert_eq!(par.last_candidate_count(), seq.last_candidate_count());
    }
    for id in 0..5_000 {
        assert_eq!(par.charge(id), seq.charge(id));
        assert_eq!(weights_of(&par, id), weights_of(&seq, id));
    }
}

#[test]
fn causal_pairing_strengthens_and_anti_causal_weakens() {
    let mut net = scalar_network();
    let a = net.add_neuron(1, 0, 0);
    let b = net.add_neuron(1, 0, 0);
    net.connect_neurons(a, b, 0, true).unwrap();

    // a at t, b at t+1
    net.inject_charge(a, 20);
    net.step();
    net.inject_charge(b, 20);
    net.step();
    assert_eq!(net.synapse_weight(a, b), 2);

    net.run(3);

    // b at t, a at t+1
    net.inject_charge(b, 20);
    net.step();
    net.inject_charge(a, 20);
    net.step();
    assert_eq!(net.synapse_weight(a, b), 0);
}

#[test]
fn learning_is_gated_by_dopamine_and_mode_switch() {
    let mut net = scalar_network();
    let a = net.add_neuron(1, 0, 0);
    let b = net.add_neuron(1, 0, 0);
    net.connect_neurons(a, b, 3, true).unwrap();
    // Each trial ends with a quiet tick so no anti-causal pair forms.

    net.chemicals_mut().set(Channel::Dopamine, 0);
    net.inject_charge(a, 20);
    net.run(3);
    assert_eq!(net.synapse_weight(a, b), 3);

    net.chemicals_mut().set(Channel::Dopamine, 50);
    net.set_plasticity_enabled(false);
    net.inject_charge(a, 20);
    net.run(3);
    assert_eq!(net.synapse_weight(a, b), 3);

    net.set_plasticity_enabled(true);
    net.inject_charge(a, 20);
    net.run(3);
    assert_eq!(net.synapse_weight(a, b), 5);
}

#[test]
fn eligibility_trace_lifecycle() {
    let mut net = scalar_network();
    net.set_operant_mode(true);
    let a = net.add_neuron(1, 0, 0);
    let b = net.add_neuron(1, 0, 0);
    net.connect_neurons(a, b, 0, true).unwrap();

    net.inject_charge(a, 20);
    net.step();
    net.inject_charge(b, 20);
    net.step();
    // Armed at 100, then one tick of decay.
    assert_eq!(eligibility(&net, a), 99);
    assert_eq!(net.synapse_weight(a, b), 0);

    net.step();
    assert_eq!(eligibility(&net, a), 98);
    net.step();
    assert_eq!(eligibility(&net, a), 97);

    assert_eq!(net.inject_reward(50), 1);
    assert_eq!(net.synapse_weight(a, b), 16);
    assert_eq!(eligibility(&net, a), 0);

    assert_eq!(net.inject_reward(50), 0);
    assert_eq!(net.synapse_weight(a, b), 16);
}

#[test]
fn reward_signal_floods_traces_in_operant_mode() {
    let mut net = scalar_network();
    net.set_operant_mode(true);
    let a = net.add_neuron(1, 0, 0);
    let b = net.add_neuron(1, 0, 0);
    net.connect_neurons(a, b, 0, true).unwrap();

    net.inject_charge(a, 20);
    net.step();
    net.inject_charge(b, 20);
    net.step();
    assert_eq!(eligibility(&net, a), 99);

    net.reward_signal(REWARD_SIGNAL_AMOUNT);
    assert_eq!(net.chemicals().dopamine, 100);
    // 99 * (50 / 10) / 50
    assert_eq!(net.synapse_weight(a, b), 9);
    assert_eq!(eligibility(&net, a), 0);
}

#[test]
fn reward_signal_outside_operant_mode_only_moves_dopamine() {
    let mut net = scalar_network();
    net.reward_signal(30);
    assert_eq!(net.chemicals().dopamine, 80);
    net.calm_signal(CALM_SIGNAL_AMOUNT);
    assert_eq!(net.chemicals().serotonin, 60);
}

#[test]
fn surprise_overload_triggers_panic_reset() {
    let mut net = scalar_network();
    let a = net.add_neuron(10_000, 0, 2);
    let b = net.add_neuron(1, 0, 2);
    net.connect_neurons(b, a, 1, false).unwrap();
    net.inject_charge(a, 500);
    net.inject_spike(b);

    net.surprise_signal(SURPRISE_SIGNAL_AMOUNT);
    assert_eq!(net.chemicals().norepinephrine, NOREPINEPHRINE_BASELINE + 50);
    net.surprise_signal(SURPRISE_SIGNAL_AMOUNT);
    assert_eq!(net.chemicals().norepinephrine, 100);

    net.step();
    assert_eq!(net.chemicals().norepinephrine, POST_PANIC_LEVEL);
    assert_eq!(net.charge(a), 0);
    assert_eq!(net.pending_spikes(), 0);
    assert!(net.fired_neurons().is_empty());

    // 70 is below the interrupt level; decay resumes normally.
    net.step();
    assert_eq!(net.chemicals().norepinephrine, POST_PANIC_LEVEL - 1);
}

#[test]
fn panic_check_runs_after_homeostatic_decay() {
    fn arousal_after_one_tick(level: i32) -> (u8, Charge) {
        let mut net = scalar_network();
        let a = net.add_neuron(10_000, 0, 2);
        net.inject_charge(a, 500);
        net.chemicals_mut().set(Channel::Norepinephrine, level);
        net.step();
        (net.chemicals().norepinephrine, net.charge(a))
    }

    // 95 decays to 94 first and stays below the interrupt level.
    assert_eq!(arousal_after_one_tick(95), (94, 500 - 5));
    // 96 decays to 95 and trips it.
    assert_eq!(arousal_after_one_tick(96), (POST_PANIC_LEVEL, 0));
}

#[test]
fn neuromodulators_return_to_baseline() {
    let mut net = scalar_network();
    net.chemicals_mut().set(Channel::Dopamine, 40);
    net.chemicals_mut().set(Channel::Acetylcholine, 58);
    net.run(10);
    assert_eq!(net.chemicals().dopamine, 50);
    assert_eq!(net.chemicals().acetylcholine, 50);
    assert_eq!(*net.chemicals(), Neuromodulators::default());
}

#[test]
fn reset_between_trials_keeps_structure() {
    let mut net = scalar_network();
    let a = net.add_neuron(1, 0, 0);
    let b = net.add_neuron(1, 0, 0);
    net.connect_neurons(a, b, 4, true).unwrap();

    for _ in 0..3 {
        net.inject_charge(a, 20);
        net.run(3);
    }
    let learned = net.synapse_weight(a, b);
    assert_eq!(learned, 10);

    net.inject_charge(b, 42);
    net.inject_spike(a);
    net.reset();

    assert_eq!(net.current_tick(), 0);
    assert_eq!(net.charge(b), 0);
    assert_eq!(net.pending_spikes(), 0);
    assert!(!net.did_fire(a));
    assert_eq!(net.synapse_weight(a, b), learned);
    assert_eq!(net.synapse_count(), 1);

    // The learned connection still drives b after the reset.
    net.inject_charge(a, 20);
    net.run(2);
    assert!(net.did_fire(b));
}

#[test]
fn overflow_synapses_take_part_in_propagation() {
    let mut net = scalar_network();
    let a = net.add_neuron(1, 0, 2);
    let b = net.add_neuron(500, 0, 2);
    let c = net.add_neuron(500, 0, 2);
    let d = net.add_neuron(1, 0, 2);

    assert_eq!(net.connect_neurons(a, b, 2, false).unwrap(), Tier::Primary);
    assert_eq!(net.connect_neurons(c, b, 2, false).unwrap(), Tier::Primary);
    assert_eq!(net.connect_neurons(a, d, 7, false).unwrap(), Tier::Overflow);
    assert_eq!(net.connect_neurons(a, c, 3, false).unwrap(), Tier::Overflow);

    assert_eq!(net.synapse_count(), 4);
    assert_eq!(net.overflow_synapse_count(), 2);
    assert_eq!(net.neuron_synapse_count(a), 3);
    assert_eq!(weights_of(&net, a), vec![2, 7, 3]);

    net.inject_spike(a);
    net.run(2);
    assert!(net.did_fire(d));
    assert_eq!(net.charge(b), 2);
    assert_eq!(net.charge(c), 3);
}

#[test]
fn inhibition_floors_charge_at_zero() {
    let mut net = scalar_network();
    let a = net.add_neuron(1, 0, 2);
    let b = net.add_neuron(500, 0, 2);
    net.connect_neurons(a, b, -16, false).unwrap();
    net.inject_charge(b, 10);
    net.inject_spike(a);
    net.run(2);
    assert_eq!(net.charge(b), 0);

    net.inject_charge(b, -1_000);
    assert_eq!(net.charge(b), 0);
}

#[test]
fn diagnostics_track_activity() {
    let mut net = scalar_network();
    let a = net.add_neuron(1, 0, 3);
    let b = net.add_neuron(1, 0, 3);
    net.connect_neurons(a, b, 6, true).unwrap();
    net.inject_charge(a, 20);
    net.step();

    let d = net.diagnostics();
    assert_eq!(d.tick, 1);
    assert_eq!(d.neuron_count, 2);
    assert_eq!(d.synapse_count, 1);
    assert_eq!(d.overflow_synapse_count, 0);
    assert_eq!(d.last_candidate_count, 1);
    assert_eq!(d.last_spike_count, 1);
    assert_eq!(d.pending_spikes, 1);
    assert_eq!(d.chemicals, *net.chemicals());
}
