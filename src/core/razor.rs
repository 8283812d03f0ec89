//! k-winner-take-all firing budget ("the Razor").
//!
//! Firing is a competition: every neuron over its effective threshold is a
//! candidate, and when there are more candidates than the per-tick budget
//! only the `k` most charged survive. Losers keep their charge and may win
//! on a later tick.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use core::cmp::Ordering;

use crate::types::{Charge, NeuronId};

/// A neuron that reached its effective threshold this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub charge: Charge,
    pub neuron: NeuronId,
}

/// Strongest first; equal charge goes to the lower id.
#[inline]
fn rank(a: &Candidate, b: &Candidate) -> Ordering {
    b.charge
        .cmp(&a.charge)
        .then_with(|| a.neuron.cmp(&b.neuron))
}

/// Cut `candidates` down to the top `budget` by charge.
///
/// Uses a partial selection (O(n) average), not a full sort. Survivors are
/// left in ascending id order. `None` disables the budget. Returns true if
/// any candidate was dropped.
pub fn select_top_k(candidates: &mut Vec<Candidate>, budget: Option<usize>) -> bool {
    let Some(k) = budget else {
        return false;
    };
    if candidates.len() <= k {
        return false;
    }
    candidates.select_nth_unstable_by(k, rank);
    candidates.truncate(k);
    candidates.sort_unstable_by_key(|c| c.neuron);
    true
}
