//! `abm-space` — the spatial substrate for the `rust_abm` framework.
//!
//! A discrete `width × height` lattice of cells, each holding zero or more
//! agents.  Models use it for three things:
//!
//! - **Placement**: register each agent in exactly one cell
//!   ([`Grid::place`] — out-of-range coordinates are a hard error, never
//!   silently clamped).
//! - **Neighbor queries**: who is in (or near) a cell
//!   ([`Grid::occupants`], [`Grid::neighbors`]).
//! - **Movement sampling**: a uniform draw over the cells an agent can step
//!   to ([`Grid::step_target`]), deterministic given a seeded RNG.
//!
//! | Module    | Contents                                      |
//! |-----------|-----------------------------------------------|
//! | [`coord`] | `Cell`, `Neighborhood`, `EdgeMode`            |
//! | [`grid`]  | `Grid` — occupancy, queries, movement         |
//! | [`error`] | `SpaceError`, `SpaceResult`                   |

pub mod coord;
pub mod error;
pub mod grid;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use coord::{Cell, EdgeMode, Neighborhood};
pub use error::{SpaceError, SpaceResult};
pub use grid::Grid;
