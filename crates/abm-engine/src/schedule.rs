//! `RandomActivation` — the per-tick agent activation order.
//!
//! # Contract
//!
//! Every tick, each agent in the roster is activated exactly once, in a
//! fresh uniform permutation computed at the start of that tick.  No
//! ordering state persists between ticks: two consecutive ticks draw two
//! independent permutations from the model's `SimRng`.
//!
//! Agents added to the roster *during* a tick (after the permutation was
//! snapshotted) are not visited until the next tick.  Neither shipped model
//! grows its population mid-run, but the scheduler supports it structurally:
//! [`add`][RandomActivation::add] may be called at any time.

use abm_core::{AgentId, SimRng};

/// Roster of schedulable agents with random-order activation.
///
/// IDs are allocated densely from zero, so they double as indices into the
/// model's per-agent arrays.
#[derive(Default)]
pub struct RandomActivation {
    roster: Vec<AgentId>,
}

impl RandomActivation {
    pub fn new() -> Self {
        Self::default()
    }

    /// A roster pre-populated with agents `0..n`.
    pub fn with_population(n: usize) -> Self {
        Self {
            roster: (0..n as u32).map(AgentId).collect(),
        }
    }

    /// Add one agent, returning its freshly allocated ID.
    pub fn add(&mut self) -> AgentId {
        let id = AgentId(self.roster.len() as u32);
        self.roster.push(id);
        id
    }

    pub fn len(&self) -> usize {
        self.roster.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roster.is_empty()
    }

    /// The roster in ID order (not activation order).
    pub fn agents(&self) -> &[AgentId] {
        &self.roster
    }

    /// Snapshot the roster and return a fresh uniform permutation of it.
    ///
    /// Call exactly once at the start of each tick, then activate the agents
    /// in the returned order.  Additions made while iterating do not appear
    /// in an already-returned order.
    pub fn tick_order(&self, rng: &mut SimRng) -> Vec<AgentId> {
        let mut order = self.roster.clone();
        rng.shuffle(&mut order);
        order
    }
}
