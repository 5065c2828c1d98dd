//! The tick-loop driver and cooperative cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use abm_core::AbmError;

use crate::collector::DataCollector;
use crate::model::{Model, Observe};
use crate::{EngineError, EngineResult};

// ── CancelToken ───────────────────────────────────────────────────────────────

/// Shared cooperative stop signal.
///
/// Cloned freely; all clones observe the same flag.  The driver and the
/// batch runner check it *between* ticks only — a tick in flight always
/// completes, so cancelled instances can be discarded whole rather than
/// leaving truncated rows behind.
#[derive(Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.  Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

// ── run_for ───────────────────────────────────────────────────────────────────

/// Drive `model` for `max_steps` ticks, collecting observables into
/// `collector`.
///
/// Collection happens at the model's current tick before any stepping
/// (step 0 — the initial condition) and thereafter at every tick divisible
/// by `collection_period`.  With `collection_period == 1` every tick is
/// recorded.
///
/// Returns `Ok(true)` when all `max_steps` ticks ran, `Ok(false)` when the
/// cancel token stopped the run early (the collector then holds whatever
/// was recorded so far; batch callers discard it).
pub fn run_for<M: Model + Observe>(
    model:             &mut M,
    max_steps:         u64,
    collection_period: u64,
    collector:         &mut DataCollector,
    cancel:            &CancelToken,
) -> EngineResult<bool> {
    if collection_period == 0 {
        return Err(EngineError::Core(AbmError::Config(
            "collection_period must be positive".into(),
        )));
    }

    collector.collect(model.tick(), model);

    for _ in 0..max_steps {
        if cancel.is_cancelled() {
            return Ok(false);
        }
        model.step()?;
        if model.tick().0 % collection_period == 0 {
            collector.collect(model.tick(), model);
        }
    }
    Ok(true)
}
