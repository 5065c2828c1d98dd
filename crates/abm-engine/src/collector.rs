//! `DataCollector` — append-only recording of per-tick observables.

use abm_core::Tick;

use crate::model::Observe;
use crate::table::{DataTable, Value};

/// Records model-level aggregates and (optionally) agent-level rows at each
/// collected tick.
///
/// The collector exclusively owns its tables; rows are appended in step
/// order and never rewritten.  [`model_table`][Self::model_table] /
/// [`agent_table`][Self::agent_table] are the sole interface downstream
/// analysis consumes.
pub struct DataCollector {
    model:  DataTable,
    agents: Option<DataTable>,
}

impl DataCollector {
    /// A collector recording model-level rows only.
    pub fn new<M: Observe>() -> Self {
        Self::for_model::<M>(false)
    }

    /// A collector for model `M`, with or without agent-level tracking.
    pub fn for_model<M: Observe>(track_agents: bool) -> Self {
        let model_columns =
            std::iter::once("step").chain(M::MODEL_COLUMNS.iter().copied());
        let agents = track_agents.then(|| {
            DataTable::new(
                ["step", "agent_id"]
                    .into_iter()
                    .chain(M::AGENT_COLUMNS.iter().copied()),
            )
        });
        Self {
            model: DataTable::new(model_columns),
            agents,
        }
    }

    /// `true` if agent-level rows are being recorded.
    pub fn tracks_agents(&self) -> bool {
        self.agents.is_some()
    }

    /// Snapshot `model` at `tick`: one model-level row, plus one row per
    /// agent when agent tracking is enabled.
    ///
    /// Call once per collected tick, after all agents have been updated.
    pub fn collect<M: Observe>(&mut self, tick: Tick, model: &M) {
        let mut row = Vec::with_capacity(1 + M::MODEL_COLUMNS.len());
        row.push(Value::from(tick.0));
        row.extend(model.model_row());
        self.model.push_row(row);

        if let Some(table) = self.agents.as_mut() {
            for (agent, values) in model.agent_rows() {
                let mut row = Vec::with_capacity(2 + M::AGENT_COLUMNS.len());
                row.push(Value::from(tick.0));
                row.push(Value::from(agent.0));
                row.extend(values);
                table.push_row(row);
            }
        }
    }

    pub fn model_table(&self) -> &DataTable {
        &self.model
    }

    pub fn agent_table(&self) -> Option<&DataTable> {
        self.agents.as_ref()
    }

    /// Consume the collector, yielding its tables.
    pub fn into_tables(self) -> (DataTable, Option<DataTable>) {
        (self.model, self.agents)
    }
}
