//! Model behavior tests: SIR state machine, contact ledgers, and the
//! bounded-confidence regimes.

use abm_core::AgentId;
use abm_engine::{Model, Observe, Parameterized, Value};
use abm_space::EdgeMode;

use crate::{HealthState, OpinionModel, OpinionParams, SirModel, SirParams};

// ── SIR: construction and validation ──────────────────────────────────────────

#[cfg(test)]
mod sir_validation {
    use super::*;

    #[test]
    fn default_params_are_valid() {
        assert!(SirParams::default().validate().is_ok());
    }

    #[test]
    fn rejects_out_of_domain_values() {
        let bad = [
            SirParams { population: 0, ..SirParams::default() },
            SirParams { width: 0, ..SirParams::default() },
            SirParams { infection_rate: 1.5, ..SirParams::default() },
            SirParams { infection_rate: -0.1, ..SirParams::default() },
            SirParams { infection_rate: f64::NAN, ..SirParams::default() },
            SirParams { recovery_time_range: (5, 2), ..SirParams::default() },
            SirParams { n_initial_infections: 101, ..SirParams::default() },
        ];
        for params in bad {
            assert!(params.validate().is_err(), "accepted: {params:?}");
            assert!(SirModel::new(params, 1).is_err());
        }
    }

    #[test]
    fn initial_counts_match_configuration() {
        let params = SirParams {
            population: 30,
            n_initial_infections: 4,
            ..SirParams::default()
        };
        let model = SirModel::new(params, 7).unwrap();
        assert_eq!(model.counts(), (26, 4, 0));
        assert_eq!(model.tick().0, 0);
    }

    #[test]
    fn unknown_parameter_rejected() {
        let mut params = SirParams::default();
        let err = SirModel::apply_param(&mut params, "virulence", &Value::from(0.5)).unwrap_err();
        assert!(matches!(err, abm_core::AbmError::UnknownParameter(ref n) if n == "virulence"));
    }

    #[test]
    fn wrong_parameter_type_rejected() {
        let mut params = SirParams::default();
        assert!(SirModel::apply_param(&mut params, "population", &Value::from("many")).is_err());
        // Ints coerce into float parameters.
        SirModel::apply_param(&mut params, "infection_rate", &Value::Int(1)).unwrap();
        assert_eq!(params.infection_rate, 1.0);
    }

    #[test]
    fn build_applies_domain_validation() {
        let mut params = SirParams::default();
        SirModel::apply_param(&mut params, "infection_rate", &Value::from(7.0)).unwrap();
        assert!(SirModel::build(&params, 1).is_err());
    }
}

// ── SIR: dynamics ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod sir_dynamics {
    use super::*;

    fn rank(h: HealthState) -> u8 {
        match h {
            HealthState::Susceptible => 0,
            HealthState::Infected => 1,
            HealthState::Recovered => 2,
        }
    }

    #[test]
    fn no_initial_infections_is_stable_forever() {
        let params = SirParams {
            population: 20,
            width: 4,
            height: 4,
            infection_rate: 0.9,
            n_initial_infections: 0,
            ..SirParams::default()
        };
        let mut model = SirModel::new(params, 3).unwrap();
        for _ in 0..30 {
            model.step().unwrap();
            assert_eq!(model.counts(), (20, 0, 0));
        }
    }

    #[test]
    fn zero_rate_never_exceeds_initial_infections() {
        let params = SirParams {
            population: 25,
            width: 3,
            height: 3,
            infection_rate: 0.0,
            recovery_time_range: (1000, 1000),
            n_initial_infections: 3,
            max_step_size: 2,
            ..SirParams::default()
        };
        let mut model = SirModel::new(params, 11).unwrap();
        for _ in 0..20 {
            model.step().unwrap();
            let (_, infected, recovered) = model.counts();
            assert_eq!(infected + recovered, 3);
        }
    }

    #[test]
    fn full_mixing_rate_one_infects_everyone_in_one_tick() {
        // A 1×1 grid keeps the whole population co-located, so with
        // infection_rate 1 every susceptible is infected at its first
        // activation — no stochastic slack.
        let params = SirParams {
            population: 10,
            width: 1,
            height: 1,
            infection_rate: 1.0,
            recovery_time_range: (100, 100),
            n_initial_infections: 1,
            max_step_size: 1,
            ..SirParams::default()
        };
        let mut model = SirModel::new(params, 5).unwrap();
        model.step().unwrap();
        assert_eq!(model.counts(), (0, 10, 0));
    }

    #[test]
    fn health_transitions_are_monotone() {
        let params = SirParams {
            population: 20,
            width: 6,
            height: 6,
            infection_rate: 0.6,
            recovery_time_range: (2, 4),
            n_initial_infections: 2,
            max_step_size: 2,
            ..SirParams::default()
        };
        let mut model = SirModel::new(params, 17).unwrap();
        let mut prev: Vec<u8> = model.health_states().iter().map(|&h| rank(h)).collect();
        for _ in 0..40 {
            model.step().unwrap();
            let now: Vec<u8> = model.health_states().iter().map(|&h| rank(h)).collect();
            for (agent, (&p, &n)) in prev.iter().zip(&now).enumerate() {
                assert!(n >= p, "agent {agent} moved backward: {p} -> {n}");
            }
            prev = now;
        }
    }

    #[test]
    fn fixed_recovery_scenario() {
        // N=10, 5×5 grid, rate 1, recovery range [2, 2], one seed infection,
        // step size 5: patient zero recovers at exactly tick 2, counts stay
        // consistent, and no transition ever reverses.
        let params = SirParams {
            population: 10,
            width: 5,
            height: 5,
            infection_rate: 1.0,
            recovery_time_range: (2, 2),
            n_initial_infections: 1,
            max_step_size: 5,
            ..SirParams::default()
        };
        let mut model = SirModel::new(params, 23).unwrap();

        assert_eq!(model.counts(), (9, 1, 0), "exactly one infected at step 0");
        let patient_zero = model
            .health_states()
            .iter()
            .position(|&h| h == HealthState::Infected)
            .map(|i| AgentId(i as u32))
            .unwrap();

        model.step().unwrap();
        assert_eq!(
            model.health_states()[patient_zero.index()],
            HealthState::Infected,
            "threshold 2: still infected at tick 1"
        );
        model.step().unwrap();
        assert_eq!(
            model.health_states()[patient_zero.index()],
            HealthState::Recovered,
            "threshold 2: recovered at exactly tick 2"
        );

        for _ in 2..10 {
            model.step().unwrap();
            let (s, i, r) = model.counts();
            assert_eq!(s + i + r, 10);
            assert_eq!(
                model.health_states()[patient_zero.index()],
                HealthState::Recovered,
                "recovery is terminal"
            );
        }
    }

    #[test]
    fn mid_run_infection_recovers_after_exact_threshold() {
        // Fully mixed 1×1 grid: every susceptible is infected at tick 1 and,
        // with a fixed threshold of 3, recovers at tick 1 + 3 = 4.
        let params = SirParams {
            population: 6,
            width: 1,
            height: 1,
            infection_rate: 1.0,
            recovery_time_range: (3, 3),
            n_initial_infections: 1,
            ..SirParams::default()
        };
        let mut model = SirModel::new(params, 2).unwrap();
        let patient_zero = model
            .health_states()
            .iter()
            .position(|&h| h == HealthState::Infected)
            .unwrap();

        model.step().unwrap();
        assert_eq!(model.counts(), (0, 6, 0));
        // Patient zero (infected at tick 0) recovers at tick 3; the rest
        // (infected at tick 1) at tick 4.
        model.step().unwrap(); // tick 2
        assert_eq!(model.counts().2, 0);
        model.step().unwrap(); // tick 3
        assert_eq!(model.counts(), (0, 5, 1));
        assert_eq!(model.health_states()[patient_zero], HealthState::Recovered);
        model.step().unwrap(); // tick 4
        assert_eq!(model.counts(), (0, 0, 6));
    }

    #[test]
    fn same_seed_reproduces_the_run() {
        let params = SirParams {
            population: 15,
            width: 4,
            height: 4,
            infection_rate: 0.4,
            recovery_time_range: (2, 5),
            n_initial_infections: 2,
            max_step_size: 2,
            ..SirParams::default()
        };
        let mut a = SirModel::new(params.clone(), 31).unwrap();
        let mut b = SirModel::new(params, 31).unwrap();
        for _ in 0..20 {
            a.step().unwrap();
            b.step().unwrap();
            assert_eq!(a.counts(), b.counts());
            assert_eq!(a.health_states(), b.health_states());
        }
    }

    #[test]
    fn torus_movement_runs_clean() {
        let params = SirParams {
            population: 12,
            width: 4,
            height: 4,
            infection_rate: 0.5,
            edge_mode: EdgeMode::Wrap,
            max_step_size: 3,
            ..SirParams::default()
        };
        let mut model = SirModel::new(params, 41).unwrap();
        for _ in 0..15 {
            model.step().unwrap();
        }
        let (s, i, r) = model.counts();
        assert_eq!(s + i + r, 12);
    }
}

// ── SIR: interaction ledger ───────────────────────────────────────────────────

#[cfg(test)]
mod sir_ledger {
    use super::*;

    #[test]
    fn ledger_is_symmetric() {
        let params = SirParams {
            population: 15,
            width: 4,
            height: 4,
            infection_rate: 0.3,
            max_step_size: 2,
            ..SirParams::default()
        };
        let mut model = SirModel::new(params, 13).unwrap();
        for _ in 0..25 {
            model.step().unwrap();
        }
        for i in 0..15u32 {
            let a = AgentId(i);
            for (&b, &count) in model.contact_ledger(a) {
                assert_eq!(
                    model.contact_ledger(b).get(&a),
                    Some(&count),
                    "asymmetric pair ({a}, {b})"
                );
            }
        }
    }

    #[test]
    fn shared_cell_pair_counts_are_exact() {
        // Three agents pinned to a 1×1 grid: each activation contacts both
        // peers, so every ordered pair gains 2 per tick (once from each
        // side's activation).
        let params = SirParams {
            population: 3,
            width: 1,
            height: 1,
            infection_rate: 0.0,
            n_initial_infections: 0,
            ..SirParams::default()
        };
        let mut model = SirModel::new(params, 19).unwrap();
        for _ in 0..4 {
            model.step().unwrap();
        }
        for i in 0..3u32 {
            for j in 0..3u32 {
                if i == j {
                    continue;
                }
                assert_eq!(
                    model.contact_ledger(AgentId(i)).get(&AgentId(j)),
                    Some(&8),
                    "pair ({i}, {j})"
                );
            }
        }
    }

    #[test]
    fn contact_edges_deduplicate_pairs() {
        let params = SirParams {
            population: 3,
            width: 1,
            height: 1,
            infection_rate: 0.0,
            n_initial_infections: 0,
            ..SirParams::default()
        };
        let mut model = SirModel::new(params, 19).unwrap();
        model.step().unwrap();
        let edges = model.contact_edges();
        assert_eq!(
            edges,
            vec![
                (AgentId(0), AgentId(1), 2),
                (AgentId(0), AgentId(2), 2),
                (AgentId(1), AgentId(2), 2),
            ]
        );
    }
}

// ── SIR: observables ──────────────────────────────────────────────────────────

#[cfg(test)]
mod sir_observe {
    use super::*;

    #[test]
    fn model_row_matches_counts() {
        let model = SirModel::new(
            SirParams { population: 12, n_initial_infections: 3, ..SirParams::default() },
            1,
        )
        .unwrap();
        assert_eq!(
            SirModel::MODEL_COLUMNS,
            ["susceptible_count", "infected_count", "recovered_count"]
        );
        assert_eq!(
            model.model_row(),
            vec![Value::Int(9), Value::Int(3), Value::Int(0)]
        );
    }

    #[test]
    fn agent_rows_cover_population_in_id_order() {
        let model = SirModel::new(
            SirParams { population: 5, n_initial_infections: 1, ..SirParams::default() },
            1,
        )
        .unwrap();
        let rows = model.agent_rows();
        assert_eq!(rows.len(), 5);
        for (i, (agent, values)) in rows.iter().enumerate() {
            assert_eq!(*agent, AgentId(i as u32));
            assert!(matches!(values[0], Value::Text(_)));
            assert_eq!(values[1], Value::Int(0));
        }
    }
}

// ── Bounded confidence ────────────────────────────────────────────────────────

#[cfg(test)]
mod opinion_tests {
    use super::*;

    /// Whole population co-located for maximal interaction pressure.
    fn crowded(population: usize, epsilon: f64) -> OpinionParams {
        OpinionParams {
            population,
            width: 1,
            height: 1,
            epsilon,
            ..OpinionParams::default()
        }
    }

    #[test]
    fn rejects_out_of_domain_values() {
        let bad = [
            OpinionParams { population: 0, ..OpinionParams::default() },
            OpinionParams { height: 0, ..OpinionParams::default() },
            OpinionParams { epsilon: -0.1, ..OpinionParams::default() },
            OpinionParams { epsilon: 2.5, ..OpinionParams::default() },
            OpinionParams { epsilon: f64::NAN, ..OpinionParams::default() },
            OpinionParams { convergence_rate: 0.0, ..OpinionParams::default() },
            OpinionParams { convergence_rate: 0.7, ..OpinionParams::default() },
        ];
        for params in bad {
            assert!(params.validate().is_err(), "accepted: {params:?}");
        }
    }

    #[test]
    fn initial_opinions_lie_in_bounds() {
        let model = OpinionModel::new(crowded(50, 1.0), 3).unwrap();
        assert!(model.opinions().iter().all(|o| (-1.0..=1.0).contains(o)));
    }

    #[test]
    fn epsilon_zero_freezes_all_opinions() {
        let mut model = OpinionModel::new(crowded(10, 0.0), 7).unwrap();
        let initial = model.opinions().to_vec();
        for _ in 0..30 {
            model.step().unwrap();
            assert_eq!(model.opinions(), initial.as_slice());
        }
    }

    #[test]
    fn epsilon_two_reaches_consensus() {
        // Opinion distance is always < 2, so every encounter averages;
        // with the whole population sharing one cell, the spread contracts
        // every tick and 200 ticks flatten it completely.
        let mut model = OpinionModel::new(crowded(10, 2.0), 9).unwrap();
        assert!(model.spread() > 0.1, "uniform draw starts spread out");
        for _ in 0..200 {
            model.step().unwrap();
        }
        assert!(model.spread() < 1e-3, "spread {} after 200 ticks", model.spread());
        assert_eq!(model.opinion_clusters(0.01), 1);
    }

    #[test]
    fn pair_meets_at_the_midpoint() {
        let mut model = OpinionModel::new(crowded(2, 2.0), 5).unwrap();
        let a0 = model.opinions()[0];
        let b0 = model.opinions()[1];
        let mean = (a0 + b0) / 2.0;
        model.step().unwrap();
        assert!((model.opinions()[0] - mean).abs() < 1e-12);
        assert!((model.opinions()[1] - mean).abs() < 1e-12);
    }

    #[test]
    fn partial_convergence_rate_halves_the_gap_per_encounter() {
        let params = OpinionParams {
            convergence_rate: 0.25,
            ..crowded(2, 2.0)
        };
        let mut model = OpinionModel::new(params, 5).unwrap();
        let gap0 = (model.opinions()[0] - model.opinions()[1]).abs();
        let mean0 = model.mean_opinion();
        model.step().unwrap();
        // Two activations per tick, each closing the gap by 1 − 2μ = 0.5.
        let gap1 = (model.opinions()[0] - model.opinions()[1]).abs();
        assert!((gap1 - 0.25 * gap0).abs() < 1e-12, "gap {gap0} -> {gap1}");
        assert!((model.mean_opinion() - mean0).abs() < 1e-12, "mean preserved");
    }

    #[test]
    fn opinions_never_leave_bounds() {
        let params = OpinionParams {
            population: 30,
            width: 5,
            height: 5,
            epsilon: 1.0,
            max_step_size: 2,
            ..OpinionParams::default()
        };
        let mut model = OpinionModel::new(params, 29).unwrap();
        for _ in 0..100 {
            model.step().unwrap();
            assert!(model.opinions().iter().all(|o| (-1.0..=1.0).contains(o)));
        }
    }

    #[test]
    fn lone_agent_never_updates() {
        let params = OpinionParams {
            population: 1,
            width: 3,
            height: 3,
            epsilon: 2.0,
            ..OpinionParams::default()
        };
        let mut model = OpinionModel::new(params, 1).unwrap();
        let initial = model.opinions()[0];
        for _ in 0..10 {
            model.step().unwrap();
        }
        assert_eq!(model.opinions()[0], initial);
    }

    #[test]
    fn small_epsilon_fragments_instead_of_converging() {
        // With epsilon 0.1 over an initial spread of ~2, separated opinion
        // groups can never bridge the confidence gap: the run must end in
        // several clusters, not consensus.
        let mut model = OpinionModel::new(crowded(50, 0.1), 37).unwrap();
        for _ in 0..300 {
            model.step().unwrap();
        }
        assert!(model.spread() > 0.15, "spread {}", model.spread());
        assert!(
            model.opinion_clusters(0.1) >= 2,
            "clusters {}",
            model.opinion_clusters(0.1)
        );
    }

    #[test]
    fn consensus_also_emerges_under_spatial_mixing() {
        let params = OpinionParams {
            population: 20,
            width: 5,
            height: 5,
            epsilon: 2.0,
            max_step_size: 5,
            ..OpinionParams::default()
        };
        let mut model = OpinionModel::new(params, 43).unwrap();
        for _ in 0..500 {
            model.step().unwrap();
        }
        assert!(model.spread() < 0.05, "spread {}", model.spread());
    }

    #[test]
    fn same_seed_reproduces_the_run() {
        let mut a = OpinionModel::new(crowded(12, 0.5), 51).unwrap();
        let mut b = OpinionModel::new(crowded(12, 0.5), 51).unwrap();
        for _ in 0..20 {
            a.step().unwrap();
            b.step().unwrap();
            assert_eq!(a.opinions(), b.opinions());
        }
    }

    #[test]
    fn observe_rows_expose_per_agent_opinions() {
        let model = OpinionModel::new(crowded(4, 0.5), 3).unwrap();
        assert_eq!(OpinionModel::AGENT_COLUMNS, ["opinion"]);
        let rows = model.agent_rows();
        assert_eq!(rows.len(), 4);
        for (i, (agent, values)) in rows.iter().enumerate() {
            assert_eq!(*agent, AgentId(i as u32));
            assert_eq!(values[0].as_float(), Some(model.opinions()[i]));
        }
    }

    #[test]
    fn unknown_parameter_rejected() {
        let mut params = OpinionParams::default();
        assert!(matches!(
            OpinionModel::apply_param(&mut params, "stubbornness", &Value::from(0.1)),
            Err(abm_core::AbmError::UnknownParameter(_))
        ));
        OpinionModel::apply_param(&mut params, "epsilon", &Value::Int(1)).unwrap();
        assert_eq!(params.epsilon, 1.0);
    }
}
