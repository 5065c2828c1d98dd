//! `run_batch` — expand, execute, and concatenate.

use abm_core::{AbmError, RunId, SimRng};
use abm_engine::{
    CancelToken, DataCollector, DataTable, EngineError, Model, Observe, Parameterized, Value,
    run_for,
};

use crate::error::{BatchError, BatchResult, InstanceFailure};
use crate::spec::{BatchSpec, Combination};

// ── BatchConfig ───────────────────────────────────────────────────────────────

/// Execution knobs shared by every instance of a batch.
#[derive(Clone, Debug)]
pub struct BatchConfig {
    /// Independent repetitions per parameter combination.
    pub iterations: u32,
    /// Ticks per instance.
    pub max_steps: u64,
    /// Collect observables every N ticks (step 0 is always collected).
    pub collection_period: u64,
    /// Base seed; every instance derives its own independent stream.
    pub seed: u64,
    /// Also record per-agent rows.
    pub track_agents: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            iterations:        1,
            max_steps:         100,
            collection_period: 1,
            seed:              0,
            track_agents:      false,
        }
    }
}

impl BatchConfig {
    fn validate(&self) -> BatchResult<()> {
        if self.iterations == 0 {
            return Err(BatchError::Config("iterations must be positive".into()));
        }
        if self.max_steps == 0 {
            return Err(BatchError::Config("max_steps must be positive".into()));
        }
        if self.collection_period == 0 {
            return Err(BatchError::Config("collection_period must be positive".into()));
        }
        Ok(())
    }
}

// ── BatchOutput ───────────────────────────────────────────────────────────────

/// Everything a finished batch produced.
///
/// Leading columns of both tables are `run_id` followed by one column per
/// swept parameter, then the per-instance columns (`step`, …).
#[derive(Debug)]
pub struct BatchOutput {
    pub model_table: DataTable,
    pub agent_table: Option<DataTable>,
    /// Number of parameter combinations that were enumerated.
    pub combinations: usize,
    /// Instances that ran to completion and contributed rows.
    pub completed: usize,
    /// Contained per-instance failures (no rows from these).
    pub failures: Vec<InstanceFailure>,
    /// `true` if the cancel token stopped at least one instance early.
    pub cancelled: bool,
}

// ── Instance execution ────────────────────────────────────────────────────────

enum InstanceOutcome {
    Completed {
        model_rows: Vec<Vec<Value>>,
        agent_rows: Option<Vec<Vec<Value>>>,
    },
    Cancelled,
    Failed(EngineError),
}

fn run_instance<M>(
    params: &M::Params,
    seed:   u64,
    config: &BatchConfig,
    cancel: &CancelToken,
) -> InstanceOutcome
where
    M: Model + Observe + Parameterized,
{
    let mut model = match M::build(params, seed) {
        Ok(m) => m,
        Err(e) => return InstanceOutcome::Failed(e),
    };
    let mut collector = DataCollector::for_model::<M>(config.track_agents);
    match run_for(
        &mut model,
        config.max_steps,
        config.collection_period,
        &mut collector,
        cancel,
    ) {
        Err(e) => InstanceOutcome::Failed(e),
        Ok(false) => InstanceOutcome::Cancelled,
        Ok(true) => {
            let (model_table, agent_table) = collector.into_tables();
            InstanceOutcome::Completed {
                model_rows: model_table.into_rows(),
                agent_rows: agent_table.map(DataTable::into_rows),
            }
        }
    }
}

// ── run_batch ─────────────────────────────────────────────────────────────────

/// Expand `spec` against `base` parameters and run the full batch.
///
/// Every declared name is checked against `M`'s schema *before* any
/// instance runs; an unrecognized name (or ill-typed value) fails the whole
/// call with [`BatchError::InvalidParameterSpec`].
///
/// Each (combination × iteration) instance is fully isolated — fresh model,
/// grid, scheduler, collector, and RNG stream — and tagged with a unique
/// [`RunId`].  Instance failures are contained (see
/// [`BatchOutput::failures`]); cancellation discards the partial instance
/// rather than emitting truncated rows.  With the `parallel` feature the
/// instances run on the Rayon pool; output row order is by run ID either
/// way.
pub fn run_batch<M>(
    base:   &M::Params,
    spec:   &BatchSpec,
    config: &BatchConfig,
    cancel: &CancelToken,
) -> BatchResult<BatchOutput>
where
    M: Model + Observe + Parameterized,
{
    config.validate()?;

    // ── Expand and resolve parameters up front ────────────────────────────
    let combos = spec.combinations();
    let resolved: Vec<M::Params> = combos
        .iter()
        .map(|combo| resolve_params::<M>(base, combo))
        .collect::<BatchResult<_>>()?;

    let iterations = config.iterations as usize;
    let instance_count = combos.len() * iterations;
    log::info!(
        "batch: {} combinations × {} iterations = {} instances",
        combos.len(),
        iterations,
        instance_count,
    );

    // Per-instance seeds drawn sequentially so the parallel path sees the
    // exact same assignment as the sequential one.
    let mut root = SimRng::new(config.seed);
    let seeds: Vec<u64> = (0..instance_count).map(|_| root.derive_seed()).collect();

    // ── Execute ───────────────────────────────────────────────────────────
    let run_job = |job: usize| {
        let combo = job / iterations;
        run_instance::<M>(&resolved[combo], seeds[job], config, cancel)
    };

    #[cfg(not(feature = "parallel"))]
    let outcomes: Vec<InstanceOutcome> = (0..instance_count).map(run_job).collect();

    #[cfg(feature = "parallel")]
    let outcomes: Vec<InstanceOutcome> = {
        use rayon::prelude::*;
        (0..instance_count).into_par_iter().map(run_job).collect()
    };

    // ── Concatenate in run-ID order ───────────────────────────────────────
    let swept_names = spec.swept_names();
    let mut model_table = DataTable::new(
        ["run_id"]
            .into_iter()
            .chain(swept_names.iter().copied())
            .chain(["step"])
            .chain(M::MODEL_COLUMNS.iter().copied()),
    );
    let mut agent_table = config.track_agents.then(|| {
        DataTable::new(
            ["run_id"]
                .into_iter()
                .chain(swept_names.iter().copied())
                .chain(["step", "agent_id"])
                .chain(M::AGENT_COLUMNS.iter().copied()),
        )
    });

    let mut completed = 0;
    let mut cancelled = false;
    let mut failures = Vec::new();

    for (job, outcome) in outcomes.into_iter().enumerate() {
        let run = RunId(job as u32);
        let combo = &combos[job / iterations];
        match outcome {
            InstanceOutcome::Completed { model_rows, agent_rows } => {
                completed += 1;
                for row in model_rows {
                    model_table.push_row(tag_row(run, &combo.swept, row));
                }
                if let (Some(table), Some(rows)) = (agent_table.as_mut(), agent_rows) {
                    for row in rows {
                        table.push_row(tag_row(run, &combo.swept, row));
                    }
                }
            }
            InstanceOutcome::Cancelled => cancelled = true,
            InstanceOutcome::Failed(error) => {
                log::warn!(
                    "batch instance {run} (combination {}, iteration {}) failed: {error}",
                    combo.index,
                    job % iterations,
                );
                failures.push(InstanceFailure {
                    run,
                    combination: combo.index,
                    iteration: (job % iterations) as u32,
                    error,
                });
            }
        }
    }

    Ok(BatchOutput {
        model_table,
        agent_table,
        combinations: combos.len(),
        completed,
        failures,
        cancelled,
    })
}

/// Apply one combination's assignments to a clone of the base parameters.
///
/// Any unknown name or ill-typed value becomes `InvalidParameterSpec` —
/// this runs for every combination before a single instance starts.
fn resolve_params<M: Parameterized>(
    base:  &M::Params,
    combo: &Combination,
) -> BatchResult<M::Params> {
    let mut params = base.clone();
    for (name, value) in &combo.assignments {
        M::apply_param(&mut params, name, value).map_err(|e| match e {
            AbmError::UnknownParameter(name) => BatchError::InvalidParameterSpec {
                reason: format!("unknown parameter: {name}"),
            },
            other => BatchError::InvalidParameterSpec { reason: other.to_string() },
        })?;
    }
    Ok(params)
}

/// Prefix an instance row with its run ID and swept parameter values.
fn tag_row(run: RunId, swept: &[Value], row: Vec<Value>) -> Vec<Value> {
    let mut tagged = Vec::with_capacity(1 + swept.len() + row.len());
    tagged.push(Value::from(run.0));
    tagged.extend(swept.iter().cloned());
    tagged.extend(row);
    tagged
}
