//! The trait seams between the engine and concrete models.
//!
//! A model composes a grid, a scheduler, immutable parameters, and dense
//! per-agent state; these traits are the only view the driver, the data
//! collector, and the batch runner have of it.

use abm_core::{AbmResult, AgentId, Tick};

use crate::{EngineResult, Value};

// ── Model ─────────────────────────────────────────────────────────────────────

/// A steppable simulation instance.
pub trait Model {
    /// Advance the entire population exactly one tick: activate every agent
    /// once in a fresh random order, applying the model's local interaction
    /// rule.  The tick counter advances on success.
    fn step(&mut self) -> EngineResult<()>;

    /// The current tick (0 immediately after construction).
    fn tick(&self) -> Tick;
}

// ── Observe ───────────────────────────────────────────────────────────────────

/// Per-tick observables, consumed by [`DataCollector`][crate::DataCollector].
///
/// `MODEL_COLUMNS` / `AGENT_COLUMNS` name the columns a model contributes;
/// the collector prefixes them with `step` (and `agent_id` for agent rows).
/// Models without per-agent observables keep the default empty
/// `AGENT_COLUMNS`.
pub trait Observe {
    /// Column names of [`model_row`][Self::model_row], in order.
    const MODEL_COLUMNS: &'static [&'static str];

    /// Column names of each agent row, in order.
    const AGENT_COLUMNS: &'static [&'static str] = &[];

    /// One row of model-level aggregates for the current tick.
    fn model_row(&self) -> Vec<Value>;

    /// One row per agent with its current observable state, in `AgentId`
    /// order.  Default: no agent-level tracking.
    fn agent_rows(&self) -> Vec<(AgentId, Vec<Value>)> {
        Vec::new()
    }
}

// ── Parameterized ─────────────────────────────────────────────────────────────

/// Construction from a named-parameter configuration record.
///
/// This is the schema the batch runner programs against: it assigns swept
/// values by name via [`apply_param`][Self::apply_param] (unknown names are
/// an error, surfaced before any instance runs) and then calls
/// [`build`][Self::build] with a per-instance seed.
pub trait Parameterized: Sized {
    /// The immutable configuration record.  Constructed once before a run,
    /// never mutated during it.
    type Params: Clone + Send + Sync;

    /// Set one named parameter.
    ///
    /// Returns [`AbmError::UnknownParameter`][abm_core::AbmError] if `name`
    /// is not part of this model's schema, or
    /// [`AbmError::Config`][abm_core::AbmError] if `value` has the wrong
    /// type for it.  Domain validation happens later, in `build`.
    fn apply_param(params: &mut Self::Params, name: &str, value: &Value) -> AbmResult<()>;

    /// Validate `params` and construct a ready-to-step instance.
    fn build(params: &Self::Params, seed: u64) -> EngineResult<Self>;
}
