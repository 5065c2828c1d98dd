//! `abm-engine` — the model-agnostic half of the `rust_abm` framework.
//!
//! A concrete model (see `abm-models`) owns its grid, parameters, and
//! per-agent state; this crate supplies everything around it:
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`schedule`]  | `RandomActivation` — fresh activation permutation per tick |
//! | [`model`]     | `Model`, `Observe`, `Parameterized` trait seams           |
//! | [`table`]     | `Value` scalars and append-only `DataTable`s              |
//! | [`collector`] | `DataCollector` — per-tick model/agent snapshots          |
//! | [`driver`]    | `run_for` tick loop, `CancelToken`                        |
//! | [`error`]     | `EngineError`, `EngineResult`                             |
//!
//! # Execution contract
//!
//! One tick fully completes (every agent activated exactly once, data
//! collected) before the next begins.  Within an instance everything is
//! strictly sequential; nothing in a tick suspends or yields.  Cancellation
//! is cooperative and only observed between ticks.

pub mod collector;
pub mod driver;
pub mod error;
pub mod model;
pub mod schedule;
pub mod table;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use collector::DataCollector;
pub use driver::{CancelToken, run_for};
pub use error::{EngineError, EngineResult};
pub use model::{Model, Observe, Parameterized};
pub use schedule::RandomActivation;
pub use table::{DataTable, Value};
