//! Deterministic per-agent and model-level RNG wrappers.
//!
//! # Determinism strategy
//!
//! Each agent gets its own independent `SmallRng` seeded by:
//!
//!   seed = model_seed XOR (agent_id * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive agent IDs uniformly across the seed space.
//! This means:
//!
//! - An agent's movement draws and Bernoulli trials depend only on the model
//!   seed and its own ID — never on the activation order the scheduler
//!   happened to produce that tick.
//! - Model-level operations (activation-order shuffles, initial placement,
//!   initial infection sampling) come from a separate `SimRng` stream, so
//!   they cannot perturb any agent's personal stream.
//! - A batch runner derives one independent `SimRng` per instance via
//!   [`SimRng::child`], keeping repetitions uncorrelated.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::AgentId;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

// ── AgentRng ──────────────────────────────────────────────────────────────────

/// Per-agent deterministic RNG.
///
/// Create one per agent at model construction; store in an [`AgentRngs`]
/// alongside the other per-agent arrays.
pub struct AgentRng(SmallRng);

impl AgentRng {
    /// Seed deterministically from the model's seed and an agent ID.
    pub fn new(model_seed: u64, agent: AgentId) -> Self {
        let seed = model_seed ^ (agent.0 as u64).wrapping_mul(MIXING_CONSTANT);
        AgentRng(SmallRng::seed_from_u64(seed))
    }

    /// Expose the inner `SmallRng` for use with `rand` distribution types.
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// One Bernoulli trial: `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Choose a random element from a slice.  `None` if the slice is empty.
    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.0)
    }
}

// ── AgentRngs ─────────────────────────────────────────────────────────────────

/// Dense per-agent RNG state, indexed by `AgentId`.
///
/// Kept separate from the model's other per-agent arrays so a model can hold
/// `&mut AgentRngs` and `&` views of its own state simultaneously.
pub struct AgentRngs {
    inner: Vec<AgentRng>,
}

impl AgentRngs {
    /// Allocate and seed `count` per-agent RNGs from `model_seed`.
    pub fn new(count: usize, model_seed: u64) -> Self {
        let inner = (0..count as u32)
            .map(|i| AgentRng::new(model_seed, AgentId(i)))
            .collect();
        Self { inner }
    }

    /// Mutable reference to one agent's RNG.
    #[inline]
    pub fn get_mut(&mut self, agent: AgentId) -> &mut AgentRng {
        &mut self.inner[agent.index()]
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

// ── SimRng ────────────────────────────────────────────────────────────────────

/// Model-level RNG for global operations: the scheduler's per-tick activation
/// permutation, initial agent placement, and initial-condition sampling.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Derive a child `SimRng` with a different seed offset — used by the
    /// batch runner to seed each instance deterministically from the base
    /// seed without the instances sharing a stream.
    pub fn child(&mut self, offset: u64) -> SimRng {
        let child_seed: u64 = self.0.r#gen::<u64>() ^ offset.wrapping_mul(MIXING_CONSTANT);
        SimRng(SmallRng::seed_from_u64(child_seed))
    }

    /// Draw a fresh seed for a subordinate RNG family (e.g. a model's
    /// [`AgentRngs`]), keeping it decorrelated from this stream.
    pub fn derive_seed(&mut self) -> u64 {
        self.0.r#gen::<u64>().wrapping_mul(MIXING_CONSTANT)
    }

    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// Shuffle a mutable slice in-place (Fisher-Yates).
    #[inline]
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.0);
    }

    /// Sample `amount` distinct indices from `0..length` (without
    /// replacement), in random order.
    pub fn sample_indices(&mut self, length: usize, amount: usize) -> Vec<usize> {
        use rand::seq::index::sample;
        sample(&mut self.0, length, amount).into_vec()
    }
}
