//! The multi-occupancy lattice.
//!
//! # Storage
//!
//! Occupancy is a dense row-major `Vec<Vec<AgentId>>` (one bucket per cell)
//! plus an `FxHashMap<AgentId, Cell>` reverse index.  The pair maintains the
//! occupancy invariant: every placed agent appears in its recorded cell's
//! bucket and in no other bucket.  Multi-occupancy across agents is allowed;
//! an agent never occupies two cells.
//!
//! # Determinism
//!
//! All sampling methods take the caller's RNG, so a seeded model gets
//! reproducible placement and movement.  Bucket iteration order is insertion
//! order, which is itself deterministic under a fixed seed.

use rand::Rng;
use rand::rngs::SmallRng;
use rustc_hash::{FxHashMap, FxHashSet};

use abm_core::AgentId;

use crate::{Cell, EdgeMode, Neighborhood, SpaceError, SpaceResult};

/// A `width × height` lattice of agent buckets.
pub struct Grid {
    width:        u32,
    height:       u32,
    edge_mode:    EdgeMode,
    neighborhood: Neighborhood,
    /// Row-major occupant buckets; index = `y * width + x`.
    cells:     Vec<Vec<AgentId>>,
    /// Reverse index: where each placed agent currently is.
    locations: FxHashMap<AgentId, Cell>,
}

impl Grid {
    /// Create an empty bounded grid with Moore neighborhoods.
    ///
    /// Both dimensions must be positive.
    pub fn new(width: u32, height: u32) -> SpaceResult<Self> {
        if width == 0 || height == 0 {
            return Err(SpaceError::ZeroDimension { width, height });
        }
        Ok(Self {
            width,
            height,
            edge_mode:    EdgeMode::default(),
            neighborhood: Neighborhood::default(),
            cells:     vec![Vec::new(); (width as usize) * (height as usize)],
            locations: FxHashMap::default(),
        })
    }

    /// Set the boundary behavior (bounded vs. toroidal).
    pub fn with_edge_mode(mut self, mode: EdgeMode) -> Self {
        self.edge_mode = mode;
        self
    }

    /// Set the neighbor-query connectivity.
    pub fn with_neighborhood(mut self, neighborhood: Neighborhood) -> Self {
        self.neighborhood = neighborhood;
        self
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn edge_mode(&self) -> EdgeMode {
        self.edge_mode
    }

    #[inline]
    pub fn neighborhood(&self) -> Neighborhood {
        self.neighborhood
    }

    /// Number of placed agents.
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// `true` if `cell` lies inside the lattice.
    #[inline]
    pub fn contains(&self, cell: Cell) -> bool {
        cell.x < self.width && cell.y < self.height
    }

    #[inline]
    fn index(&self, cell: Cell) -> usize {
        (cell.y as usize) * (self.width as usize) + (cell.x as usize)
    }

    fn check(&self, cell: Cell) -> SpaceResult<()> {
        if self.contains(cell) {
            Ok(())
        } else {
            Err(SpaceError::OutOfBounds {
                x:      cell.x,
                y:      cell.y,
                width:  self.width,
                height: self.height,
            })
        }
    }

    // ── Placement ─────────────────────────────────────────────────────────

    /// Register `agent` in `cell`, removing any prior registration for it.
    ///
    /// Fails with [`SpaceError::OutOfBounds`] if `cell` lies outside
    /// `[0, width) × [0, height)` — an out-of-range placement is a bug in
    /// the movement rule, never something to clamp.
    pub fn place(&mut self, agent: AgentId, cell: Cell) -> SpaceResult<()> {
        self.check(cell)?;
        if let Some(prev) = self.locations.insert(agent, cell) {
            let idx = self.index(prev);
            self.cells[idx].retain(|&a| a != agent);
        }
        let idx = self.index(cell);
        self.cells[idx].push(agent);
        Ok(())
    }

    /// Unregister `agent`, returning the cell it occupied (if any).
    pub fn remove(&mut self, agent: AgentId) -> Option<Cell> {
        let cell = self.locations.remove(&agent)?;
        let idx = self.index(cell);
        self.cells[idx].retain(|&a| a != agent);
        Some(cell)
    }

    /// The cell `agent` currently occupies, or `None` if it is not placed.
    #[inline]
    pub fn position(&self, agent: AgentId) -> Option<Cell> {
        self.locations.get(&agent).copied()
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// All agents registered in exactly `cell`, in insertion order.
    pub fn occupants(&self, cell: Cell) -> SpaceResult<&[AgentId]> {
        self.check(cell)?;
        Ok(&self.cells[self.index(cell)])
    }

    /// All agents within the configured neighborhood distance `radius` of
    /// `center`, including any occupants of `center` itself — callers filter
    /// out the asking agent.  Empty if no one is nearby.
    ///
    /// Under [`EdgeMode::Wrap`] the window wraps around the torus; cells are
    /// never visited twice even when the window spans the whole grid.
    pub fn neighbors(&self, center: Cell, radius: u32) -> SpaceResult<Vec<AgentId>> {
        self.check(center)?;
        let r = radius as i64;
        let mut found = Vec::new();
        let mut seen: FxHashSet<usize> = FxHashSet::default();
        for dy in -r..=r {
            for dx in -r..=r {
                if self.neighborhood == Neighborhood::VonNeumann && dx.abs() + dy.abs() > r {
                    continue;
                }
                let Some(cell) = self.offset(center, dx, dy) else {
                    continue;
                };
                let idx = self.index(cell);
                if seen.insert(idx) {
                    found.extend_from_slice(&self.cells[idx]);
                }
            }
        }
        Ok(found)
    }

    /// Resolve `center + (dx, dy)` under the configured edge mode.
    fn offset(&self, center: Cell, dx: i64, dy: i64) -> Option<Cell> {
        let (x, y) = (center.x as i64 + dx, center.y as i64 + dy);
        match self.edge_mode {
            EdgeMode::Clamp => {
                if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
                    None
                } else {
                    Some(Cell::new(x as u32, y as u32))
                }
            }
            EdgeMode::Wrap => Some(Cell::new(
                x.rem_euclid(self.width as i64) as u32,
                y.rem_euclid(self.height as i64) as u32,
            )),
        }
    }

    // ── Sampling ──────────────────────────────────────────────────────────

    /// A uniformly sampled cell, for initial placement.
    pub fn random_cell(&self, rng: &mut SmallRng) -> Cell {
        Cell::new(rng.gen_range(0..self.width), rng.gen_range(0..self.height))
    }

    /// A uniform draw over the cells reachable from `from` in one move of at
    /// most `max_step` Chebyshev distance.
    ///
    /// Under [`EdgeMode::Clamp`] the window is intersected with the lattice,
    /// so every valid target is equally likely and no sampled coordinate is
    /// ever clamped after the fact.  Under [`EdgeMode::Wrap`] the window
    /// wraps; a window at least as wide as the grid degenerates to a uniform
    /// draw over the full axis.  `max_step == 0` returns `from`.
    pub fn step_target(&self, from: Cell, max_step: u32, rng: &mut SmallRng) -> SpaceResult<Cell> {
        self.check(from)?;
        if max_step == 0 {
            return Ok(from);
        }
        let x = self.axis_target(from.x, max_step, self.width, rng);
        let y = self.axis_target(from.y, max_step, self.height, rng);
        Ok(Cell::new(x, y))
    }

    fn axis_target(&self, pos: u32, step: u32, len: u32, rng: &mut SmallRng) -> u32 {
        match self.edge_mode {
            EdgeMode::Clamp => {
                let lo = pos.saturating_sub(step);
                let hi = ((pos as u64 + step as u64).min(len as u64 - 1)) as u32;
                rng.gen_range(lo..=hi)
            }
            EdgeMode::Wrap => {
                if 2 * step as u64 + 1 >= len as u64 {
                    rng.gen_range(0..len)
                } else {
                    let offset = rng.gen_range(-(step as i64)..=step as i64);
                    (pos as i64 + offset).rem_euclid(len as i64) as u32
                }
            }
        }
    }
}
