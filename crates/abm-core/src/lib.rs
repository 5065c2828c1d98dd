//! `abm-core` — foundational types for the `rust_abm` lattice simulation
//! framework.
//!
//! This crate is a dependency of every other `abm-*` crate.  It intentionally
//! has no `abm-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module     | Contents                                          |
//! |------------|---------------------------------------------------|
//! | [`ids`]    | `AgentId`, `RunId`                                |
//! | [`time`]   | `Tick`                                            |
//! | [`rng`]    | `AgentRng` / `AgentRngs` (per-agent), `SimRng`    |
//! | [`error`]  | `AbmError`, `AbmResult`                           |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                              |
//! |---------|-----------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types. |

pub mod error;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{AbmError, AbmResult};
pub use ids::{AgentId, RunId};
pub use rng::{AgentRng, AgentRngs, SimRng};
pub use time::Tick;
