//! Preprocessing for automata
//!
//! The goal of the preprocessing is to shrink the automata before the safety
//! game is solved, or to give the counting functions less to track.
//!
//! The following preprocessors are implemented:
//! - [BoundedStates]: Marks states of a co-Büchi automaton that can only be
//!   reached after a bounded number of visits to accepting states.
//! - [SurelyLosingStates]: Removes states of a turn-based automaton from which
//!   the environment can force more than `K` visits to accepting states.

use std::collections::VecDeque;

use log::{debug, info};

use crate::{
    Player,
    cobuchi::CoBuchiAutomaton,
    label::Label,
    turn_based::{Transition, TurnBasedAutomaton, TurnBasedState},
};

/// Trait for preprocessing automata
///
/// This trait is implemented by types that can process an automaton of type
/// `A` to simplify it for further analysis.
pub trait Preprocessor<A> {
    /// Process the automaton and attempt to simplify it
    fn process(&self, automaton: &mut A);
}

/// Preprocessor that detects bounded states of a co-Büchi automaton
///
/// For every state, it computes an upper bound on the number of accepting
/// states a run can visit before reaching it, saturated at the number of
/// accepting states plus one. A state whose bound stays below the saturation
/// value cannot lie behind a cycle through an accepting state, so its counter
/// never needs to be tracked beyond 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundedStates {}

impl BoundedStates {
    /// Create a new instance of the `BoundedStates` preprocessor
    pub fn new() -> Self {
        Self {}
    }

    /// Compute the saturated visit counters of all states
    fn compute_counters(&self, aut: &CoBuchiAutomaton) -> Vec<usize> {
        let cap = aut.n_accepting() + 1;
        let mut counters = vec![0; aut.states().len()];
        if aut.states()[aut.initial()].is_accepting() {
            counters[aut.initial()] = 1;
        }

        let mut changed = true;
        while changed {
            changed = false;
            let prev = counters.clone();

            for e in aut.edges() {
                let inc = usize::from(aut.states()[e.from()].is_accepting());
                let val = cap.min(prev[e.from()] + inc);
                if val > counters[e.to()] {
                    counters[e.to()] = val;
                    changed = true;
                }
            }
        }

        counters
    }
}

impl Preprocessor<CoBuchiAutomaton> for BoundedStates {
    fn process(&self, aut: &mut CoBuchiAutomaton) {
        let cap = aut.n_accepting() + 1;
        let counters = self.compute_counters(aut);

        let mut n_bounded = 0;
        for (q, c) in counters.into_iter().enumerate() {
            let unbounded = c >= cap;
            if !unbounded {
                debug!("State {} of '{}' is bounded", aut.states()[q].name(), aut.name());
                n_bounded += 1;
            }
            aut.set_unbounded(q, unbounded);
        }

        info!(
            "Preprocessor 'BoundedStates' on '{}' marked {} of {} states as bounded",
            aut.name(),
            n_bounded,
            aut.states().len()
        );
    }
}

/// Preprocessor that removes surely losing states of a turn-based automaton
///
/// A state is surely losing for bound `K` if the environment can force every
/// run from it to visit more than `K` accepting states. Such states, and the
/// states that become unreachable without them, are removed. Transitions into
/// a removed state are redirected into a pair of trash states that loop
/// forever through an accepting state, so reaching them is still losing.
#[derive(Debug, Clone, Copy)]
pub struct SurelyLosingStates {
    k: usize,
}

impl SurelyLosingStates {
    /// Create a new instance of the `SurelyLosingStates` preprocessor for
    /// bound `k`
    pub fn new(k: usize) -> Self {
        Self { k }
    }

    /// Compute for every state the least number of accepting visits the
    /// system can guarantee, saturated at `k + 1`
    pub fn compute_counters(&self, aut: &TurnBasedAutomaton) -> Vec<usize> {
        let cap = self.k + 1;
        let acc = |q: usize| usize::from(aut.state(q).is_accepting());

        let mut counters = (0..aut.len()).map(acc).collect::<Vec<_>>();
        loop {
            let next = (0..aut.len())
                .map(|q| {
                    let a = acc(q);
                    let state = aut.state(q);
                    match state.player() {
                        Player::System if state.is_complete() => aut
                            .alphabet()
                            .valuations(Player::System)
                            .map(|sigma| {
                                aut.succ(q, sigma)
                                    .map(|s| counters[s] + a)
                                    .fold(a, usize::max)
                            })
                            .min()
                            .unwrap_or(a)
                            .min(cap),
                        Player::System => counters[q],
                        Player::Environment => aut
                            .all_succ(q)
                            .map(|s| counters[s] + a)
                            .fold(a, usize::max)
                            .min(cap),
                    }
                })
                .collect::<Vec<_>>();

            if next == counters {
                return counters;
            }
            counters = next;
        }
    }

    /// States reachable from the initial state without passing through a
    /// losing state
    fn reachable_states(&self, aut: &TurnBasedAutomaton, losing: &[bool]) -> Vec<bool> {
        let mut reached = vec![false; aut.len()];
        if losing[aut.initial()] {
            return reached;
        }

        let mut queue = VecDeque::from([aut.initial()]);
        reached[aut.initial()] = true;
        while let Some(q) = queue.pop_front() {
            for s in aut.all_succ(q) {
                if !losing[s] && !reached[s] {
                    reached[s] = true;
                    queue.push_back(s);
                }
            }
        }

        reached
    }

    /// Remove the surely losing states
    ///
    /// Returns the number of states that were removed. If no state is losing
    /// for the bound, the automaton is left untouched.
    pub fn remove_losing_states(&self, aut: &mut TurnBasedAutomaton) -> usize {
        let counters = self.compute_counters(aut);
        let losing = counters
            .iter()
            .map(|c| *c == self.k + 1)
            .collect::<Vec<_>>();
        if !losing.iter().any(|l| *l) {
            debug!(
                "Preprocessor 'SurelyLosingStates' did not find states to remove for K = {}",
                self.k
            );
            return 0;
        }

        let keep = self.reachable_states(aut, &losing);
        let n_kept = keep.iter().filter(|k| **k).count();
        let n_states = aut.len();

        let start = aut.starting_player();
        let new_len = n_kept + 2;
        let trash_of = |player: Player| if player == start { 0 } else { new_len - 1 };

        let mut index = vec![None; n_states];
        let mut states = Vec::with_capacity(new_len);
        states.push(TurnBasedState::new_trash(start, false));
        for q in (0..n_states).filter(|q| keep[*q]) {
            index[q] = Some(states.len());
            let s = aut.state(q);
            states.push(TurnBasedState::new(s.player(), s.is_accepting(), s.is_unbounded()));
        }
        states.push(TurnBasedState::new_trash(start.other(), true));

        let mut transitions = aut
            .transitions()
            .iter()
            .filter_map(|t| {
                let from = index[t.from()]?;
                let to = index[t.to()].unwrap_or_else(|| trash_of(aut.state(t.to()).player()));
                Some(Transition::new(from, to, t.label().clone()))
            })
            .collect::<Vec<_>>();

        let n_props = |p: Player| aut.alphabet().propositions(p).len();
        transitions.push(Transition::new(
            0,
            new_len - 1,
            Label::tautology(n_props(start)),
        ));
        transitions.push(Transition::new(
            new_len - 1,
            0,
            Label::tautology(n_props(start.other())),
        ));

        let initial = index[aut.initial()].unwrap_or(0);

        *aut = TurnBasedAutomaton::assemble(
            aut.name().to_string(),
            states,
            transitions,
            initial,
            start,
            aut.alphabet().clone(),
            aut.weights().clone(),
            aut.n_accepting(),
        );

        let n_removed = n_states - n_kept;
        info!(
            "Preprocessor 'SurelyLosingStates' on '{}' removed {} of {} states: Removed states are losing for K = {} or became unreachable.",
            aut.name(),
            n_removed,
            n_states,
            self.k
        );
        n_removed
    }
}

impl Preprocessor<TurnBasedAutomaton> for SurelyLosingStates {
    fn process(&self, aut: &mut TurnBasedAutomaton) {
        self.remove_losing_states(aut);
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        Player,
        alphabet::Alphabet,
        cobuchi::{CoBuchiAutomaton, CoBuchiAutomatonBuilder},
        label::{Guard, GuardLiteral},
        preprocessing::{BoundedStates, Preprocessor, SurelyLosingStates},
        turn_based::{TurnBasedAutomaton, builder::TurnBasedAutomatonBuilder},
    };

    /// init --1--> init, init --r--> acc, acc --1--> sink, sink --1--> sink
    fn acyclic_accepting() -> CoBuchiAutomaton {
        CoBuchiAutomatonBuilder::new("once")
            .with_state("init", false)
            .unwrap()
            .with_state("acc", true)
            .unwrap()
            .with_state("sink", false)
            .unwrap()
            .with_initial_state("init")
            .unwrap()
            .with_edge("init", Guard::tautology(), "init")
            .unwrap()
            .with_edge("init", Guard::new(vec![vec![GuardLiteral::new("r", true)]]), "acc")
            .unwrap()
            .with_edge("acc", Guard::tautology(), "sink")
            .unwrap()
            .with_edge("sink", Guard::tautology(), "sink")
            .unwrap()
            .build()
            .unwrap()
    }

    /// init --!g--> acc, init --g--> init, acc --1--> acc
    fn eventually_losing() -> CoBuchiAutomaton {
        CoBuchiAutomatonBuilder::new("lose")
            .with_state("init", false)
            .unwrap()
            .with_state("acc", true)
            .unwrap()
            .with_initial_state("init")
            .unwrap()
            .with_edge("init", Guard::new(vec![vec![GuardLiteral::new("g", false)]]), "acc")
            .unwrap()
            .with_edge("init", Guard::new(vec![vec![GuardLiteral::new("g", true)]]), "init")
            .unwrap()
            .with_edge("acc", Guard::tautology(), "acc")
            .unwrap()
            .build()
            .unwrap()
    }

    fn tbucw(aut: CoBuchiAutomaton, start: Player) -> TurnBasedAutomaton {
        let alphabet = Alphabet::new(["r"], ["g"]).unwrap();
        TurnBasedAutomatonBuilder::new(alphabet, start)
            .with_automaton(aut)
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn test_bounded_states_acyclic() {
        let mut aut = acyclic_accepting();
        BoundedStates::new().process(&mut aut);

        // a single accepting visit can never be exceeded
        assert!(aut.states().iter().all(|s| !s.is_unbounded()));
    }

    #[test]
    fn test_bounded_states_cycle() {
        let mut aut = eventually_losing();
        BoundedStates::new().process(&mut aut);

        assert!(!aut.states()[0].is_unbounded());
        assert!(aut.states()[1].is_unbounded());
    }

    #[test]
    fn test_bounded_flags_reach_turn_based_automaton() {
        let mut aut = eventually_losing();
        BoundedStates::new().process(&mut aut);
        let tbucw = tbucw(aut, Player::Environment);

        assert!(!tbucw.state(0).is_unbounded());
        assert!(tbucw.state(1).is_unbounded());
        assert_eq!(tbucw.n_bounded_states(), 2);
    }

    #[test]
    fn test_counters_of_losing_sink() {
        let aut = tbucw(eventually_losing(), Player::Environment);
        let counters = SurelyLosingStates::new(2).compute_counters(&aut);

        // the accepting sink and its turn state are losing
        assert_eq!(counters[1], 3);
        assert_eq!(counters[aut.len() - 1], 3);
        // the system can stay in init by playing g
        assert_eq!(counters[0], 0);
    }

    #[test]
    fn test_remove_losing_states() {
        let mut aut = tbucw(eventually_losing(), Player::Environment);
        let n_before = aut.len();

        let removed = SurelyLosingStates::new(1).remove_losing_states(&mut aut);

        assert_eq!(removed, 2);
        assert_eq!(aut.len(), n_before - 2 + 2);
        assert!(aut.state(0).is_trash());
        assert_eq!(aut.state(0).player(), Player::Environment);
        assert!(!aut.state(0).is_accepting());
        let last = aut.len() - 1;
        assert!(aut.state(last).is_trash());
        assert_eq!(aut.state(last).player(), Player::System);
        assert!(aut.state(last).is_accepting());

        // the initial state is kept and shifted behind the trash state
        assert_eq!(aut.initial(), 1);
        assert_eq!(aut.start_index_other(), 2);

        // playing !g now leads into the trash of the environment
        let turn = aut.succ(1, 0).next().unwrap();
        assert_eq!(aut.succ(turn, 0).collect::<Vec<_>>(), vec![0]);
        assert_eq!(aut.succ(turn, 1).collect::<Vec<_>>(), vec![1]);
        assert!(aut.states().iter().all(|s| s.is_complete()));
    }

    #[test]
    fn test_remove_nothing_if_not_losing() {
        let mut aut = tbucw(acyclic_accepting(), Player::System);
        let before = aut.clone();

        assert_eq!(SurelyLosingStates::new(1).remove_losing_states(&mut aut), 0);
        assert_eq!(aut, before);
    }

    #[test]
    fn test_removed_initial_state() {
        // the environment can play r right away and then loop through acc
        let mut aut = tbucw(acyclic_accepting(), Player::Environment);
        let n_before = aut.len();

        let removed = SurelyLosingStates::new(0).remove_losing_states(&mut aut);

        assert_eq!(removed, n_before);
        assert_eq!(aut.len(), 2);
        assert_eq!(aut.initial(), 0);
        assert!(aut.state(0).is_trash());
        assert!(aut.state(1).is_trash());
        assert_eq!(aut.succ(0, 0).collect::<Vec<_>>(), vec![1]);
        assert_eq!(aut.succ(1, 1).collect::<Vec<_>>(), vec![0]);
    }
}
