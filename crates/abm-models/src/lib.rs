//! `abm-models` — the two shipped lattice models for the `rust_abm`
//! framework.
//!
//! | Module      | Contents                                               |
//! |-------------|--------------------------------------------------------|
//! | [`sir`]     | SIR epidemic diffusion with contact-ledger tracking    |
//! | [`opinion`] | Bounded-confidence opinion averaging                   |
//!
//! Both models follow the same shape: an immutable, validated parameter
//! record; dense per-agent state arrays indexed by `AgentId`; a grid and a
//! random-activation scheduler; and implementations of the engine's
//! `Model` / `Observe` / `Parameterized` seams so the driver and the batch
//! runner can treat them uniformly.

pub mod opinion;
pub mod sir;

mod convert;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use opinion::{OPINION_MAX, OPINION_MIN, OpinionModel, OpinionParams};
pub use sir::{HealthState, SirModel, SirParams};
