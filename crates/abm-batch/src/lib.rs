//! `abm-batch` — parameter sweeps over `rust_abm` models.
//!
//! A [`BatchSpec`] names each model parameter as either a fixed value or a
//! list of candidates; [`run_batch`] expands the Cartesian product of the
//! lists, runs N fully independent repetitions of every combination, and
//! concatenates all collected rows into one table keyed by `run_id` and the
//! swept parameter values.
//!
//! | Module   | Contents                                        |
//! |----------|-------------------------------------------------|
//! | [`spec`] | `BatchSpec`, `SweepValue`, `Combination`        |
//! | [`runner`] | `BatchConfig`, `run_batch`, `BatchOutput`     |
//! | [`error`] | `BatchError`, `InstanceFailure`                |
//!
//! # Isolation and failure containment
//!
//! Every (combination × iteration) instance gets its own model, grid,
//! scheduler, collector, and RNG stream — nothing is shared, which is what
//! makes the loop embarrassingly parallel (enable the `parallel` feature).
//! An instance that fails contributes no rows; its failure is recorded and
//! every other instance proceeds.  Cancellation is cooperative and
//! tick-aligned: a cancelled instance's partial rows are discarded whole.

pub mod error;
pub mod runner;
pub mod spec;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{BatchError, BatchResult, InstanceFailure};
pub use runner::{BatchConfig, BatchOutput, run_batch};
pub use spec::{BatchSpec, Combination, SweepValue};
