//! Integration tests running both safety game solvers on small
//! specifications with known realizability.
use std::rc::Rc;

use acacia_antichain::PartialOrder;
use acacia_automaton::{
    Player,
    alphabet::Alphabet,
    cobuchi::{CoBuchiAutomaton, CoBuchiAutomatonBuilder},
    label::{Guard, GuardLiteral},
    preprocessing::{BoundedStates, Preprocessor, SurelyLosingStates},
    turn_based::{TurnBasedAutomaton, builder::TurnBasedAutomatonBuilder},
    weights::Weights,
};
use acacia_solver::{BackwardSolver, CfInfo, ForwardSolver, SafetyGame};
use rand::{Rng, SeedableRng, rngs::StdRng};

fn lit(prop: &str, positive: bool) -> Guard {
    Guard::new(vec![vec![GuardLiteral::new(prop, positive)]])
}

/// Accepting initial state, left for good after one step
fn visit_once() -> CoBuchiAutomaton {
    CoBuchiAutomatonBuilder::new("visit_once")
        .with_state("init", true)
        .unwrap()
        .with_state("safe", false)
        .unwrap()
        .with_initial_state("init")
        .unwrap()
        .with_edge("init", Guard::tautology(), "safe")
        .unwrap()
        .with_edge("safe", Guard::tautology(), "safe")
        .unwrap()
        .build()
        .unwrap()
}

/// Every run visits the accepting state forever
fn accepting_loop() -> CoBuchiAutomaton {
    CoBuchiAutomatonBuilder::new("accepting_loop")
        .with_state("init", true)
        .unwrap()
        .with_initial_state("init")
        .unwrap()
        .with_edge("init", Guard::tautology(), "init")
        .unwrap()
        .build()
        .unwrap()
}

/// Negation of `G (r -> X g)`
fn request_grant() -> CoBuchiAutomaton {
    CoBuchiAutomatonBuilder::new("request_grant")
        .with_state("init", false)
        .unwrap()
        .with_state("requested", false)
        .unwrap()
        .with_state("bad", true)
        .unwrap()
        .with_initial_state("init")
        .unwrap()
        .with_edge("init", Guard::tautology(), "init")
        .unwrap()
        .with_edge("init", lit("r", true), "requested")
        .unwrap()
        .with_edge("requested", lit("g", false), "bad")
        .unwrap()
        .with_edge("bad", Guard::tautology(), "bad")
        .unwrap()
        .build()
        .unwrap()
}

/// The system has to predict the next input: `g` now iff `r` next
fn prediction() -> CoBuchiAutomaton {
    CoBuchiAutomatonBuilder::new("prediction")
        .with_state("init", false)
        .unwrap()
        .with_state("granted", false)
        .unwrap()
        .with_state("not_granted", false)
        .unwrap()
        .with_state("bad", true)
        .unwrap()
        .with_initial_state("init")
        .unwrap()
        .with_edge("init", lit("g", true), "granted")
        .unwrap()
        .with_edge("init", lit("g", false), "not_granted")
        .unwrap()
        .with_edge("granted", lit("r", false), "bad")
        .unwrap()
        .with_edge("not_granted", lit("r", true), "bad")
        .unwrap()
        .with_edge("bad", Guard::tautology(), "bad")
        .unwrap()
        .build()
        .unwrap()
}

fn safe() -> CoBuchiAutomaton {
    CoBuchiAutomatonBuilder::new("safe")
        .with_state("init", false)
        .unwrap()
        .with_initial_state("init")
        .unwrap()
        .with_edge("init", Guard::tautology(), "init")
        .unwrap()
        .build()
        .unwrap()
}

/// Accepting initial state; `!r && g` leads to a safe sink, every other
/// move is left undefined
fn escape_after_visit() -> CoBuchiAutomaton {
    CoBuchiAutomatonBuilder::new("escape_after_visit")
        .with_state("init", true)
        .unwrap()
        .with_state("sink", false)
        .unwrap()
        .with_initial_state("init")
        .unwrap()
        .with_edge(
            "init",
            Guard::new(vec![vec![
                GuardLiteral::new("r", false),
                GuardLiteral::new("g", true),
            ]]),
            "sink",
        )
        .unwrap()
        .with_edge("sink", Guard::tautology(), "sink")
        .unwrap()
        .build()
        .unwrap()
}

/// Small co-Büchi automaton over `r` and `g`, usually incomplete
fn random_automaton(rng: &mut StdRng, name: &str) -> CoBuchiAutomaton {
    let n_states = rng.gen_range(1..=3);
    let mut builder = CoBuchiAutomatonBuilder::new(name);
    for q in 0..n_states {
        builder = builder
            .with_state(format!("q{q}"), rng.gen_bool(0.4))
            .unwrap();
    }
    builder = builder.with_initial_state("q0").unwrap();

    for q in 0..n_states {
        for _ in 0..rng.gen_range(0..=2) {
            let target = rng.gen_range(0..n_states);
            let mut conj = Vec::new();
            for p in ["r", "g"] {
                if rng.gen_bool(0.5) {
                    conj.push(GuardLiteral::new(p, rng.gen_bool(0.5)));
                }
            }
            builder = builder
                .with_edge(&format!("q{q}"), Guard::new(vec![conj]), &format!("q{target}"))
                .unwrap();
        }
    }
    builder.build().unwrap()
}

fn turn_based(cobuchi: CoBuchiAutomaton, starting_player: Player) -> TurnBasedAutomaton {
    TurnBasedAutomatonBuilder::new(Alphabet::new(["r"], ["g"]).unwrap(), starting_player)
        .with_automaton(cobuchi)
        .unwrap()
        .build()
        .unwrap()
}

fn all_specs() -> Vec<(CoBuchiAutomaton, bool)> {
    vec![
        (safe(), true),
        (request_grant(), true),
        (prediction(), false),
        (accepting_loop(), false),
    ]
}

fn solve_backward(aut: TurnBasedAutomaton, k: usize, critical: bool) -> SafetyGame {
    let info = Rc::new(CfInfo::new(Rc::new(aut), k));
    let start = SafetyGame::start(info.clone(), &[]);
    let (game, _) = BackwardSolver::new(info)
        .with_critical_signals(critical)
        .solve(&start);
    game
}

fn solve_forward(aut: TurnBasedAutomaton, k: usize) -> SafetyGame {
    let info = Rc::new(CfInfo::new(Rc::new(aut), k));
    let start = SafetyGame::start(info.clone(), &[]);
    let (game, _) = ForwardSolver::new(info, &[]).solve(&start);
    game
}

mod backward {
    use super::*;

    #[test]
    fn test_visit_once_needs_one_visit() {
        let game = solve_backward(turn_based(visit_once(), Player::System), 0, false);
        assert!(!game.has_winning_strategy());

        let game = solve_backward(turn_based(visit_once(), Player::System), 1, false);
        assert!(game.has_winning_strategy());
        assert_eq!(game.positions_o().len(), 1);
    }

    #[test]
    fn test_accepting_loop_is_never_realizable() {
        for player in [Player::Environment, Player::System] {
            for k in 0..4 {
                let game = solve_backward(turn_based(accepting_loop(), player), k, false);
                assert!(!game.has_winning_strategy(), "realizable for K = {k}");
            }
        }
    }

    #[test]
    fn test_known_realizability() {
        for (cobuchi, realizable) in all_specs() {
            for player in [Player::Environment, Player::System] {
                for k in 0..3 {
                    let game = solve_backward(turn_based(cobuchi.clone(), player), k, false);
                    assert_eq!(
                        game.has_winning_strategy(),
                        realizable,
                        "'{}' with {player} starting, K = {k}",
                        cobuchi.name()
                    );
                }
            }
        }
    }

    #[test]
    fn test_critical_signals_do_not_change_the_answer() {
        for (cobuchi, _) in all_specs() {
            for player in [Player::Environment, Player::System] {
                for k in 0..3 {
                    let with = solve_backward(turn_based(cobuchi.clone(), player), k, true);
                    let without = solve_backward(turn_based(cobuchi.clone(), player), k, false);
                    assert_eq!(
                        with.has_winning_strategy(),
                        without.has_winning_strategy(),
                        "'{}' with {player} starting, K = {k}",
                        cobuchi.name()
                    );
                }
            }
        }
    }

    #[test]
    fn test_solving_is_deterministic() {
        let aut = Rc::new(turn_based(request_grant(), Player::Environment));
        let info = Rc::new(CfInfo::new(aut, 2));
        let start = SafetyGame::start(info.clone(), &[]);

        let (g1, r1) = BackwardSolver::new(info.clone()).solve(&start);
        let (g2, r2) = BackwardSolver::new(info).solve(&start);

        assert!(g1.positions_o().equivalent(g2.positions_o()));
        assert!(g1.positions_i().equivalent(g2.positions_i()));
        assert_eq!(r1.iterations, r2.iterations);
        assert_eq!(r1.max_size_starting, r2.max_size_starting);
    }

    #[test]
    fn test_fixpoint_is_below_start() {
        for (cobuchi, _) in all_specs() {
            let aut = Rc::new(turn_based(cobuchi, Player::Environment));
            let info = Rc::new(CfInfo::new(aut, 1));
            let start = SafetyGame::start(info.clone(), &[]);
            let (game, _) = BackwardSolver::new(info).solve(&start);

            assert!(game.positions_o().covered_by(start.positions_o()));
            assert!(game.positions_i().covered_by(start.positions_i()));
        }
    }

    #[test]
    fn test_pre_is_monotone() {
        let aut = Rc::new(turn_based(request_grant(), Player::Environment));
        let info = Rc::new(CfInfo::new(aut, 1));
        let start = SafetyGame::start(info.clone(), &[]);
        let mut solver = BackwardSolver::new(info.clone());
        let (game, _) = solver.solve(&start);

        let small = solver.pre_i(game.positions_o());
        let large = solver.pre_i(start.positions_o());
        assert!(small.covered_by(&large));

        let small = solver.pre_o(game.positions_i(), start.positions_o());
        let large = solver.pre_o(start.positions_i(), start.positions_o());
        assert!(small.covered_by(&large));
    }
}

mod forward {
    use super::*;

    #[test]
    fn test_visit_once_needs_one_visit() {
        let game = solve_forward(turn_based(visit_once(), Player::System), 0);
        assert!(!game.has_winning_strategy());
        assert!(game.positions_o().is_empty());

        let game = solve_forward(turn_based(visit_once(), Player::System), 1);
        assert!(game.has_winning_strategy());
    }

    #[test]
    fn test_agrees_with_backward() {
        for (cobuchi, _) in all_specs() {
            for player in [Player::Environment, Player::System] {
                for k in 0..3 {
                    let forward = solve_forward(turn_based(cobuchi.clone(), player), k);
                    let backward = solve_backward(turn_based(cobuchi.clone(), player), k, true);
                    assert_eq!(
                        forward.has_winning_strategy(),
                        backward.has_winning_strategy(),
                        "'{}' with {player} starting, K = {k}",
                        cobuchi.name()
                    );
                }
            }
        }
    }

    #[test]
    fn test_system_positions_above_k_are_losing() {
        let game = solve_forward(turn_based(escape_after_visit(), Player::Environment), 0);
        assert!(!game.has_winning_strategy());
        assert!(
            !solve_backward(turn_based(escape_after_visit(), Player::Environment), 0, false)
                .has_winning_strategy()
        );

        let game = solve_forward(turn_based(escape_after_visit(), Player::Environment), 1);
        assert!(game.has_winning_strategy());
    }

    #[test]
    fn test_winning_positions_are_winning_for_backward() {
        let aut = Rc::new(turn_based(request_grant(), Player::Environment));
        let info = Rc::new(CfInfo::new(aut, 1));
        let start = SafetyGame::start(info.clone(), &[]);

        let (forward, report) = ForwardSolver::new(info.clone(), &[]).solve(&start);
        let (backward, _) = BackwardSolver::new(info).solve(&start);

        assert!(report.passed >= forward.positions_o().len());
        assert!(forward.positions_o().covered_by(backward.positions_o()));
    }
}

mod preprocessing {
    use super::*;

    #[test]
    fn test_removing_surely_losing_states_keeps_the_answer() {
        for (cobuchi, _) in all_specs() {
            for player in [Player::Environment, Player::System] {
                for k in 0..3 {
                    let aut = turn_based(cobuchi.clone(), player);
                    let mut reduced = aut.clone();
                    SurelyLosingStates::new(k).remove_losing_states(&mut reduced);

                    let expected = solve_backward(aut, k, false).has_winning_strategy();
                    let game = solve_backward(reduced, k, false);
                    assert_eq!(
                        game.has_winning_strategy(),
                        expected,
                        "'{}' with {player} starting, K = {k}",
                        cobuchi.name()
                    );
                }
            }
        }
    }
}

mod credits {
    use super::*;

    fn weighted(output_weights: Vec<Vec<i32>>) -> TurnBasedAutomaton {
        let alphabet = Alphabet::new(["r"], ["g"]).unwrap();
        TurnBasedAutomatonBuilder::new(alphabet, Player::System)
            .with_weights(Weights::new(1, vec![vec![0], vec![0]], output_weights))
            .unwrap()
            .with_automaton(safe())
            .unwrap()
            .build()
            .unwrap()
    }

    fn solve(aut: TurnBasedAutomaton, caps: &[i32]) -> SafetyGame {
        let info = Rc::new(CfInfo::new(Rc::new(aut), 0));
        let start = SafetyGame::start(info.clone(), caps);
        BackwardSolver::new(info).solve(&start).0
    }

    #[test]
    fn test_system_keeps_credit_by_granting() {
        let game = solve(weighted(vec![vec![-1], vec![1]]), &[2]);
        assert!(game.has_winning_strategy());
    }

    #[test]
    fn test_credit_runs_out() {
        let game = solve(weighted(vec![vec![-1], vec![-1]]), &[2]);
        assert!(!game.has_winning_strategy());
        assert!(game.positions_o().is_empty());
    }

    #[test]
    fn test_initial_tuple_has_full_credit() {
        let game = solve(weighted(vec![vec![-1], vec![1]]), &[3]);
        let p = game.positions_o().iter().next().unwrap();
        assert_eq!(p.credits().caps(), &[3]);
        assert!(p.credits().values().iter().all(|c| *c <= 3));
        assert!(p.is_smaller_or_equal(p));
    }
}

mod differential {
    use super::*;

    const SEED: u64 = 0x5eed_ac;
    const N_CASES: usize = 150;

    fn verdict(aut: &TurnBasedAutomaton, k: usize) -> bool {
        solve_backward(aut.clone(), k, false).has_winning_strategy()
    }

    #[test]
    fn test_solvers_and_optimizations_agree() {
        let mut rng = StdRng::seed_from_u64(SEED);

        for case in 0..N_CASES {
            let cobuchi = random_automaton(&mut rng, "random");
            for player in [Player::Environment, Player::System] {
                let aut = turn_based(cobuchi.clone(), player);
                for k in 0..3 {
                    let expected = verdict(&aut, k);
                    let context = format!("case {case}, {player} starting, K = {k}: {cobuchi:?}");

                    let critical = solve_backward(aut.clone(), k, true);
                    assert_eq!(critical.has_winning_strategy(), expected, "critical, {context}");

                    let forward = solve_forward(aut.clone(), k);
                    assert_eq!(forward.has_winning_strategy(), expected, "forward, {context}");

                    let mut reduced = aut.clone();
                    SurelyLosingStates::new(k).remove_losing_states(&mut reduced);
                    assert_eq!(verdict(&reduced, k), expected, "opt2, {context}");
                }
            }
        }
    }

    #[test]
    fn test_bounded_states_shift_k_by_at_most_the_accepting_states() {
        let mut rng = StdRng::seed_from_u64(SEED + 1);

        for case in 0..N_CASES {
            let cobuchi = random_automaton(&mut rng, "random");
            let mut bounded = cobuchi.clone();
            BoundedStates::new().process(&mut bounded);
            let shift = cobuchi.n_accepting() + 1;

            for player in [Player::Environment, Player::System] {
                let plain = turn_based(cobuchi.clone(), player);
                let opt1 = turn_based(bounded.clone(), player);
                for k in 0..3 {
                    let context = format!("case {case}, {player} starting, K = {k}: {cobuchi:?}");
                    if verdict(&plain, k) {
                        assert!(verdict(&opt1, k), "lost by opt1, {context}");
                    }
                    if verdict(&opt1, k) {
                        assert!(verdict(&plain, k + shift), "gained by opt1, {context}");
                    }
                }
            }
        }
    }
}
