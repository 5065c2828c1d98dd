//! SIR epidemic diffusion on the lattice.
//!
//! # State machine
//!
//! Susceptible --(co-located Infected contact, Bernoulli(infection_rate))-->
//! Infected --(ticks since infection ≥ personal recovery threshold)-->
//! Recovered (terminal).
//!
//! Transitions are strictly monotone; nothing moves an agent backward.
//!
//! # Per-activation algorithm
//!
//! 1. **Move**: uniform draw over the cells within `max_step_size`
//!    Chebyshev distance (respecting the grid's edge mode); re-place on the
//!    grid.
//! 2. **Contacts**: every other agent in the destination cell gets a
//!    symmetric ledger increment (undirected weighted contact).  If the
//!    acting agent entered the tick Susceptible, one Bernoulli trial per
//!    Infected contact; the first success infects it and draws its personal
//!    recovery threshold from the inclusive `recovery_time_range`.
//! 3. **Progression**: an agent that entered the tick Infected increments
//!    its infection counter and recovers on reaching its threshold.  An
//!    agent infected earlier in the same activation does not also progress,
//!    so a threshold of `k ≥ 1` recovers exactly `k` ticks after infection
//!    (a threshold of 0 behaves like 1: the check runs at the first
//!    progression after infection).

use rustc_hash::FxHashMap;

use abm_core::{AbmError, AbmResult, AgentId, AgentRngs, SimRng, Tick};
use abm_engine::{EngineResult, Model, Observe, Parameterized, RandomActivation, Value};
use abm_space::{EdgeMode, Grid, Neighborhood};

use crate::convert::{f64_param, u32_param, usize_param};

// ── HealthState ───────────────────────────────────────────────────────────────

/// Compartment of one agent in the SIR state machine.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HealthState {
    Susceptible,
    Infected,
    Recovered,
}

impl HealthState {
    pub fn as_str(self) -> &'static str {
        match self {
            HealthState::Susceptible => "susceptible",
            HealthState::Infected => "infected",
            HealthState::Recovered => "recovered",
        }
    }
}

// ── SirParams ─────────────────────────────────────────────────────────────────

/// Immutable configuration for an SIR run.  Constructed once, validated at
/// model construction, never mutated during the run.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SirParams {
    /// Number of agents.
    pub population: usize,
    pub width:  u32,
    pub height: u32,
    /// Per-contact transmission probability, in [0, 1].
    pub infection_rate: f64,
    /// Inclusive bounds for the personal recovery threshold, in ticks.
    pub recovery_time_range: (u32, u32),
    /// Agents set Infected at construction, sampled without replacement.
    pub n_initial_infections: usize,
    /// Maximum Chebyshev distance of one move.
    pub max_step_size: u32,
    pub edge_mode:    EdgeMode,
    pub neighborhood: Neighborhood,
}

impl Default for SirParams {
    fn default() -> Self {
        Self {
            population:           100,
            width:                10,
            height:               10,
            infection_rate:       0.1,
            recovery_time_range:  (3, 8),
            n_initial_infections: 1,
            max_step_size:        1,
            edge_mode:            EdgeMode::default(),
            neighborhood:         Neighborhood::default(),
        }
    }
}

impl SirParams {
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
        if !(0.0..=1.0).contains(&self.infection_rate) || self.infection_rate.is_nan() {
            return Err(AbmError::Config(format!(
                "infection_rate must lie in [0, 1], got {}",
                self.infection_rate
            )));
        }
        let (lo, hi) = self.recovery_time_range;
        if lo > hi {
            return Err(AbmError::Config(format!(
                "recovery_time_range must be ordered, got [{lo}, {hi}]"
            )));
        }
        if self.n_initial_infections > self.population {
            return Err(AbmError::Config(format!(
                "n_initial_infections ({}) exceeds population ({})",
                self.n_initial_infections, self.population
            )));
        }
        Ok(())
    }
}

// ── SirModel ──────────────────────────────────────────────────────────────────

/// One SIR simulation instance: grid, scheduler, and dense per-agent state.
pub struct SirModel {
    params:   SirParams,
    tick:     Tick,
    grid:     Grid,
    schedule: RandomActivation,
    rng:      SimRng,
    rngs:     AgentRngs,

    // Per-agent state, indexed by `AgentId`.
    health:          Vec<HealthState>,
    since_infection: Vec<u64>,
    /// Personal recovery threshold; meaningful only while Infected.
    recovery_at: Vec<u32>,
    /// Cumulative contact counts, peer → count.  Symmetric across pairs.
    ledgers: Vec<FxHashMap<AgentId, u32>>,
}

impl SirModel {
    /// Validate `params`, place the population uniformly at random, and
    /// infect `n_initial_infections` distinct agents.
    ///
    /// `n_initial_infections == 0` yields a model that is stable at
    /// all-Susceptible forever — valid, not an error.
    pub fn new(params: SirParams, seed: u64) -> EngineResult<Self> {
        params.validate()?;

        let mut rng = SimRng::new(seed);
        let rngs = AgentRngs::new(params.population, rng.derive_seed());
        let mut grid = Grid::new(params.width, params.height)?
            .with_edge_mode(params.edge_mode)
            .with_neighborhood(params.neighborhood);

        let schedule = RandomActivation::with_population(params.population);
        for &agent in schedule.agents() {
            let cell = grid.random_cell(rng.inner());
            grid.place(agent, cell)?;
        }

        let n = params.population;
        let mut model = Self {
            tick: Tick::ZERO,
            grid,
            schedule,
            rngs,
            health: vec![HealthState::Susceptible; n],
            since_infection: vec![0; n],
            recovery_at: vec![0; n],
            ledgers: vec![FxHashMap::default(); n],
            params,
            rng,
        };

        for idx in model.rng.sample_indices(n, model.params.n_initial_infections) {
            let agent = AgentId(idx as u32);
            let threshold = model.draw_threshold(agent);
            model.infect(agent, threshold);
        }
        Ok(model)
    }

    /// Personal recovery threshold, drawn from the agent's own stream at the
    /// moment of infection.
    fn draw_threshold(&mut self, agent: AgentId) -> u32 {
        let (lo, hi) = self.params.recovery_time_range;
        if lo == hi {
            lo
        } else {
            self.rngs.get_mut(agent).gen_range(lo..=hi)
        }
    }

    /// Transition to Infected with the given personal threshold, resetting
    /// the infection counter.
    fn infect(&mut self, agent: AgentId, threshold: u32) {
        let i = agent.index();
        self.health[i] = HealthState::Infected;
        self.since_infection[i] = 0;
        self.recovery_at[i] = threshold;
    }

    fn activate(&mut self, agent: AgentId) -> EngineResult<()> {
        let entered_as = self.health[agent.index()];

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

        // 2. Contact resolution at the destination cell.
        let peers: Vec<AgentId> = self
            .grid
            .occupants(dest)?
            .iter()
            .copied()
            .filter(|&p| p != agent)
            .collect();

        for &peer in &peers {
            *self.ledgers[agent.index()].entry(peer).or_insert(0) += 1;
            *self.ledgers[peer.index()].entry(agent).or_insert(0) += 1;
        }

        if entered_as == HealthState::Susceptible {
            for &peer in &peers {
                if self.health[peer.index()] != HealthState::Infected {
                    continue;
                }
                if self
                    .rngs
                    .get_mut(agent)
                    .gen_bool(self.params.infection_rate)
                {
                    let threshold = self.draw_threshold(agent);
                    self.infect(agent, threshold);
                    break; // first success wins; remaining trials moot
                }
            }
        }

        // 3. Progression — only for agents that entered the tick Infected.
        if entered_as == HealthState::Infected {
            let i = agent.index();
            self.since_infection[i] += 1;
            if self.since_infection[i] >= self.recovery_at[i] as u64 {
                self.health[i] = HealthState::Recovered;
            }
        }
        Ok(())
    }

    // ── Observables ───────────────────────────────────────────────────────

    pub fn params(&self) -> &SirParams {
        &self.params
    }

    /// (susceptible, infected, recovered) counts.
    pub fn counts(&self) -> (usize, usize, usize) {
        let mut s = 0;
        let mut i = 0;
        let mut r = 0;
        for h in &self.health {
            match h {
                HealthState::Susceptible => s += 1,
                HealthState::Infected => i += 1,
                HealthState::Recovered => r += 1,
            }
        }
        (s, i, r)
    }

    pub fn health_states(&self) -> &[HealthState] {
        &self.health
    }

    /// One agent's cumulative contact counts, peer → count.
    pub fn contact_ledger(&self, agent: AgentId) -> &FxHashMap<AgentId, u32> {
        &self.ledgers[agent.index()]
    }

    /// The undirected weighted contact graph: each interacting pair once,
    /// `(a, b, count)` with `a < b`, in deterministic order.
    pub fn contact_edges(&self) -> Vec<(AgentId, AgentId, u32)> {
        let mut edges = Vec::new();
        for (i, ledger) in self.ledgers.iter().enumerate() {
            let a = AgentId(i as u32);
            let mut peers: Vec<_> = ledger.iter().filter(|(p, _)| **p > a).collect();
            peers.sort_by_key(|(p, _)| **p);
            edges.extend(peers.into_iter().map(|(&b, &count)| (a, b, count)));
        }
        edges
    }
}

impl Model for SirModel {
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

impl Observe for SirModel {
    const MODEL_COLUMNS: &'static [&'static str] =
        &["susceptible_count", "infected_count", "recovered_count"];
    const AGENT_COLUMNS: &'static [&'static str] = &["health", "since_infection"];

    fn model_row(&self) -> Vec<Value> {
        let (s, i, r) = self.counts();
        vec![Value::from(s), Value::from(i), Value::from(r)]
    }

    fn agent_rows(&self) -> Vec<(AgentId, Vec<Value>)> {
        self.health
            .iter()
            .enumerate()
            .map(|(i, h)| {
                (
                    AgentId(i as u32),
                    vec![
                        Value::from(h.as_str()),
                        Value::from(self.since_infection[i]),
                    ],
                )
            })
            .collect()
    }
}

impl Parameterized for SirModel {
    type Params = SirParams;

    fn apply_param(params: &mut SirParams, name: &str, value: &Value) -> AbmResult<()> {
        match name {
            "population" => params.population = usize_param(name, value)?,
            "width" => params.width = u32_param(name, value)?,
            "height" => params.height = u32_param(name, value)?,
            "infection_rate" => params.infection_rate = f64_param(name, value)?,
            "recovery_time_min" => params.recovery_time_range.0 = u32_param(name, value)?,
            "recovery_time_max" => params.recovery_time_range.1 = u32_param(name, value)?,
            "n_initial_infections" => params.n_initial_infections = usize_param(name, value)?,
            "max_step_size" => params.max_step_size = u32_param(name, value)?,
            _ => return Err(AbmError::UnknownParameter(name.into())),
        }
        Ok(())
    }

    fn build(params: &SirParams, seed: u64) -> EngineResult<Self> {
        SirModel::new(params.clone(), seed)
    }
}
