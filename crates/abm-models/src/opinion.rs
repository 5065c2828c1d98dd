//! Bounded-confidence opinion dynamics on the lattice.
//!
//! # Interaction rule
//!
//! Each activated agent moves, then picks one co-located peer uniformly at
//! random (no peer → no update this tick).  If the two opinions differ by
//! less than `epsilon`, both move toward their mean by the convergence rate
//! μ: `a += μ(b − a)`, `b += μ(a − b)`.  μ = 0.5 (the default) is the exact
//! midpoint.  At distance ≥ epsilon both opinions stay unchanged.
//!
//! This single rule produces three qualitatively distinct long-run regimes:
//! fragmentation into many clusters (small epsilon), polarization into few
//! (moderate epsilon), and consensus (epsilon ≥ 2 — opinions live in
//! [-1, 1], so every encounter is within range and averages).
//!
//! Opinions never leave the closed interval `[OPINION_MIN, OPINION_MAX]`:
//! every update is a convex combination of two in-range values, so no
//! clamping exists.

use abm_core::{AbmError, AbmResult, AgentId, AgentRngs, SimRng, Tick};
use abm_engine::{EngineResult, Model, Observe, Parameterized, RandomActivation, Value};
use abm_space::{EdgeMode, Grid, Neighborhood};

use crate::convert::{f64_param, u32_param, usize_param};

/// Lower bound of the opinion space.
pub const OPINION_MIN: f64 = -1.0;
/// Upper bound of the opinion space.
pub const OPINION_MAX: f64 = 1.0;

// ── OpinionParams ─────────────────────────────────────────────────────────────

/// Immutable configuration for a bounded-confidence run.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OpinionParams {
    pub population: usize,
    pub width:  u32,
    pub height: u32,
    /// Confidence threshold: opinions at distance ≥ epsilon ignore each
    /// other.  In [0, 2] — the diameter of the opinion space.
    pub epsilon: f64,
    /// Fraction of the opinion gap each partner closes, in (0, 0.5].
    /// 0.5 is the strict midpoint.
    pub convergence_rate: f64,
    /// Maximum Chebyshev distance of one move.
    pub max_step_size: u32,
    pub edge_mode:    EdgeMode,
    pub neighborhood: Neighborhood,
}

impl Default for OpinionParams {
    fn default() -> Self {
        Self {
            population:       100,
            width:            10,
            height:           10,
            epsilon:          0.3,
            convergence_rate: 0.5,
            max_step_size:    1,
            edge_mode:        EdgeMode::default(),
            neighborhood:     Neighborhood::default(),
        }
    }
}

impl OpinionParams {
    /// Reject any value outside its domain.
    pub fn validate(&self) -> AbmResult<()> {
        if self.population == 0 {
            return Err(AbmError::Config("population must be positive".into()));
        }
        if self.width == 0 || self.height == 0 {
            return Err(AbmError::Config(format!(
                "grid dimensions must be positive, got {}×{}",
                self.width, self.height
            )));
        }
        if !(0.0..=2.0).contains(&self.epsilon) || self.epsilon.is_nan() {
            return Err(AbmError::Config(format!(
                "epsilon must lie in [0, 2], got {}",
                self.epsilon
            )));
        }
        if !(self.convergence_rate > 0.0 && self.convergence_rate <= 0.5) {
            return Err(AbmError::Config(format!(
                "convergence_rate must lie in (0, 0.5], got {}",
                self.convergence_rate
            )));
        }
        Ok(())
    }
}

// ── OpinionModel ──────────────────────────────────────────────────────────────

/// One bounded-confidence simulation instance.
pub struct OpinionModel {
    params:   OpinionParams,
    tick:     Tick,
    grid:     Grid,
    schedule: RandomActivation,
    rng:      SimRng,
    rngs:     AgentRngs,

    /// Per-agent scalar opinion, indexed by `AgentId`.  Always in
    /// `[OPINION_MIN, OPINION_MAX]`.
    opinions: Vec<f64>,
}

impl OpinionModel {
    /// Validate `params`, place the population uniformly at random, and
    /// draw each agent's initial opinion uniformly from the opinion space.
    pub fn new(params: OpinionParams, seed: u64) -> EngineResult<Self> {
        params.validate()?;

        let mut rng = SimRng::new(seed);
        let mut rngs = AgentRngs::new(params.population, rng.derive_seed());
        let mut grid = Grid::new(params.width, params.height)?
            .with_edge_mode(params.edge_mode)
            .with_neighborhood(params.neighborhood);

        let schedule = RandomActivation::with_population(params.population);
        let mut opinions = Vec::with_capacity(params.population);
        for &agent in schedule.agents() {
            let cell = grid.random_cell(rng.inner());
            grid.place(agent, cell)?;
            opinions.push(rngs.get_mut(agent).gen_range(OPINION_MIN..=OPINION_MAX));
        }

        Ok(Self {
            tick: Tick::ZERO,
            grid,
            schedule,
            rngs,
            opinions,
            params,
            rng,
        })
    }

    fn activate(&mut self, agent: AgentId) -> EngineResult<()> {
        // 1. Move.
        let from = self
            .grid
            .position(agent)
            .ok_or(AbmError::AgentNotFound(agent))?;
        let dest = self.grid.step_target(
            from,
            self.params.max_step_size,
            self.rngs.get_mut(agent).inner(),
        )?;
        self.grid.place(agent, dest)?;

        // 2. Pick one co-located peer uniformly at random.
        let peers: Vec<AgentId> = self
            .grid
            .occupants(dest)?
            .iter()
            .copied()
            .filter(|&p| p != agent)
            .collect();
        let Some(&peer) = self.rngs.get_mut(agent).choose(&peers) else {
            return Ok(()); // alone in the cell: no update this tick
        };

        // 3. Average when within the confidence threshold.
        let a = self.opinions[agent.index()];
        let b = self.opinions[peer.index()];
        if (a - b).abs() < self.params.epsilon {
            let rate = self.params.convergence_rate;
            self.opinions[agent.index()] = a + rate * (b - a);
            self.opinions[peer.index()] = b + rate * (a - b);
        }
        Ok(())
    }

    // ── Observables ───────────────────────────────────────────────────────

    pub fn params(&self) -> &OpinionParams {
        &self.params
    }

    pub fn opinions(&self) -> &[f64] {
        &self.opinions
    }

    pub fn mean_opinion(&self) -> f64 {
        self.opinions.iter().sum::<f64>() / self.opinions.len() as f64
    }

    /// Distance between the most extreme opinions.
    pub fn spread(&self) -> f64 {
        let (min, max) = self.min_max();
        max - min
    }

    fn min_max(&self) -> (f64, f64) {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &o in &self.opinions {
            min = min.min(o);
            max = max.max(o);
        }
        (min, max)
    }

    /// Number of opinion clusters: sort the opinions and split wherever two
    /// adjacent values differ by more than `gap`.
    pub fn opinion_clusters(&self, gap: f64) -> usize {
        if self.opinions.is_empty() {
            return 0;
        }
        let mut sorted = self.opinions.clone();
        sorted.sort_by(f64::total_cmp);
        1 + sorted.windows(2).filter(|w| w[1] - w[0] > gap).count()
    }
}

impl Model for OpinionModel {
    fn step(&mut self) -> EngineResult<()> {
        for agent in self.schedule.tick_order(&mut self.rng) {
            self.activate(agent)?;
        }
        self.tick.advance();
        Ok(())
    }

    fn tick(&self) -> Tick {
        self.tick
    }
}

impl Observe for OpinionModel {
    const MODEL_COLUMNS: &'static [&'static str] =
        &["mean_opinion", "min_opinion", "max_opinion"];
    const AGENT_COLUMNS: &'static [&'static str] = &["opinion"];

    fn model_row(&self) -> Vec<Value> {
        let (min, max) = self.min_max();
        vec![
            Value::from(self.mean_opinion()),
            Value::from(min),
            Value::from(max),
        ]
    }

    fn agent_rows(&self) -> Vec<(AgentId, Vec<Value>)> {
        self.opinions
            .iter()
            .enumerate()
            .map(|(i, &o)| (AgentId(i as u32), vec![Value::from(o)]))
            .collect()
    }
}

impl Parameterized for OpinionModel {
    type Params = OpinionParams;

    fn apply_param(params: &mut OpinionParams, name: &str, value: &Value) -> AbmResult<()> {
        match name {
            "population" => params.population = usize_param(name, value)?,
            "width" => params.width = u32_param(name, value)?,
            "height" => params.height = u32_param(name, value)?,
            "epsilon" => params.epsilon = f64_param(name, value)?,
            "convergence_rate" => params.convergence_rate = f64_param(name, value)?,
            "max_step_size" => params.max_step_size = u32_param(name, value)?,
            _ => return Err(AbmError::UnknownParameter(name.into())),
        }
        Ok(())
    }

    fn build(params: &OpinionParams, seed: u64) -> EngineResult<Self> {
        OpinionModel::new(params.clone(), seed)
    }
}
