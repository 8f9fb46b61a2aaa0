//! Construction of a [`TurnBasedAutomaton`] from co-Büchi automata
//!
//! Every conjunction of a guard on an edge `q -> q'` is split into the part
//! over the propositions of the starting player and the part over the
//! propositions of the other player. The first part labels a transition from
//! `q` to a fresh turn state, the second part a transition from the turn
//! state to `q'`. Turn states of the same source whose starting-player labels
//! coincide are fused, so the branching of a state is bounded by the number
//! of its distinct labels.
//!
//! When several automata are combined, a common initial state is added that
//! copies the outgoing transitions of every automaton's initial state.

use std::fmt;

use log::{debug, info};

use super::{Transition, TurnBasedAutomaton, TurnBasedState};
use crate::{
    Player,
    alphabet::Alphabet,
    cobuchi::CoBuchiAutomaton,
    label::{Guard, Label, LabelError},
    weights::Weights,
};

/// Builder for [`TurnBasedAutomaton`]
///
/// # Example
///
/// ```
/// use acacia_automaton::Player;
/// use acacia_automaton::alphabet::Alphabet;
/// use acacia_automaton::cobuchi::CoBuchiAutomatonBuilder;
/// use acacia_automaton::label::Guard;
/// use acacia_automaton::turn_based::builder::TurnBasedAutomatonBuilder;
///
/// let cobuchi = CoBuchiAutomatonBuilder::new("safe")
///     .with_state("init", false).unwrap()
///     .with_initial_state("init").unwrap()
///     .with_edge("init", Guard::tautology(), "init").unwrap()
///     .build().unwrap();
///
/// let alphabet = Alphabet::new(["r"], ["g"]).unwrap();
/// let tbucw = TurnBasedAutomatonBuilder::new(alphabet, Player::Environment)
///     .with_automaton(cobuchi).unwrap()
///     .build().unwrap();
///
/// assert_eq!(tbucw.len(), 2);
/// assert_eq!(tbucw.start_index_other(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct TurnBasedAutomatonBuilder {
    alphabet: Alphabet,
    starting_player: Player,
    weights: Option<Weights>,
    automata: Vec<CoBuchiAutomaton>,
}

impl TurnBasedAutomatonBuilder {
    /// Create a builder for an automaton over `alphabet` in which
    /// `starting_player` moves first
    pub fn new(alphabet: Alphabet, starting_player: Player) -> Self {
        Self {
            alphabet,
            starting_player,
            weights: None,
            automata: Vec::new(),
        }
    }

    /// Attach weight vectors for every valuation
    pub fn with_weights(mut self, weights: Weights) -> Result<Self, AutomatonBuildError> {
        for player in [Player::Environment, Player::System] {
            let n_sigma = self.alphabet.sigma_size(player);
            if weights.n_valuations(player) != n_sigma {
                return Err(AutomatonBuildError::WeightsMismatch {
                    player,
                    expected: n_sigma,
                    found: weights.n_valuations(player),
                });
            }
        }
        self.weights = Some(weights);
        Ok(self)
    }

    /// Add a co-Büchi automaton
    ///
    /// All propositions of its guards must belong to the alphabet.
    pub fn with_automaton(mut self, automaton: CoBuchiAutomaton) -> Result<Self, AutomatonBuildError> {
        for e in automaton.edges() {
            e.guard().check_propositions(&self.alphabet)?;
        }
        self.automata.push(automaton);
        Ok(self)
    }

    /// Add several co-Büchi automata
    pub fn with_automata(
        self,
        automata: impl IntoIterator<Item = CoBuchiAutomaton>,
    ) -> Result<Self, AutomatonBuildError> {
        automata
            .into_iter()
            .try_fold(self, |builder, aut| builder.with_automaton(aut))
    }

    /// Build the turn-based automaton
    pub fn build(self) -> Result<TurnBasedAutomaton, AutomatonBuildError> {
        if self.automata.is_empty() {
            return Err(AutomatonBuildError::NoAutomaton);
        }

        let start = self.starting_player;
        let other = start.other();
        let shared_initial = self.automata.len() > 1;

        let mut states = Vec::new();
        if shared_initial {
            states.push(TurnBasedState::new(start, false, true));
        }
        for aut in self.automata.iter() {
            states.extend(
                aut.states()
                    .iter()
                    .map(|s| TurnBasedState::new(start, false, s.is_unbounded())),
            );
        }
        let n_original = states.len();

        let mut turn_states = Vec::new();
        let mut transitions = Vec::new();
        let mut initial = 0;
        let mut offset = usize::from(shared_initial);

        for aut in self.automata.iter() {
            if !shared_initial {
                initial = offset + aut.initial();
            }

            for (local, s) in aut.states().iter().enumerate() {
                let source = offset + local;
                let copy_to_shared = shared_initial && local == aut.initial();
                let mut fused: Vec<(Label, usize)> = Vec::new();

                for edge in aut.outgoing(local) {
                    let target = offset + edge.to();

                    for conj in edge.guard().conjunctions() {
                        let start_label = Label::from_disjuncts([Guard::project_conjunction(
                            conj,
                            &self.alphabet,
                            start,
                        )?]);
                        let other_label = Label::from_disjuncts([Guard::project_conjunction(
                            conj,
                            &self.alphabet,
                            other,
                        )?]);

                        if let Some((_, turn)) =
                            fused.iter().find(|(l, _)| l.same_disjuncts(&start_label))
                        {
                            transitions.push(Transition::new(*turn, target, other_label));
                            continue;
                        }

                        let turn = n_original + turn_states.len();
                        // bounded states keep a counter of 0, so they never count
                        // as accepting
                        turn_states.push(TurnBasedState::new(
                            other,
                            s.is_accepting() && s.is_unbounded(),
                            s.is_unbounded(),
                        ));
                        transitions.push(Transition::new(source, turn, start_label.clone()));
                        if copy_to_shared {
                            transitions.push(Transition::new(0, turn, start_label.clone()));
                        }
                        transitions.push(Transition::new(turn, target, other_label));
                        fused.push((start_label, turn));
                    }
                }
            }

            offset += aut.states().len();
        }
        states.extend(turn_states);

        let name = self
            .automata
            .iter()
            .map(|a| a.name())
            .collect::<Vec<_>>()
            .join("&");
        let n_accepting = self.automata.iter().map(|a| a.n_accepting()).sum();
        let weights = self
            .weights
            .unwrap_or_else(|| Weights::zero(&self.alphabet));

        let tbucw = TurnBasedAutomaton::assemble(
            name,
            states,
            transitions,
            initial,
            start,
            self.alphabet,
            weights,
            n_accepting,
        );

        info!(
            "Built turn-based automaton '{}': {} states ({} turn states), {} transitions",
            tbucw.name(),
            tbucw.len(),
            tbucw.n_turn_states(),
            tbucw.transitions().len()
        );
        debug!("{tbucw}");

        Ok(tbucw)
    }
}

/// Errors that can occur when building a turn-based automaton
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutomatonBuildError {
    /// No co-Büchi automaton was added
    NoAutomaton,
    /// A guard refers to a proposition outside of the alphabet
    Label(LabelError),
    /// The weight vectors do not match the alphabet
    WeightsMismatch {
        /// Player whose weights are malformed
        player: Player,
        /// Number of valuations of the player
        expected: usize,
        /// Number of weight vectors given
        found: usize,
    },
}

impl From<LabelError> for AutomatonBuildError {
    fn from(value: LabelError) -> Self {
        AutomatonBuildError::Label(value)
    }
}

impl std::error::Error for AutomatonBuildError {}

impl fmt::Display for AutomatonBuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AutomatonBuildError::NoAutomaton => {
                write!(f, "Cannot build a turn-based automaton without any automaton")
            }
            AutomatonBuildError::Label(err) => write!(f, "Malformed label: {err}"),
            AutomatonBuildError::WeightsMismatch {
                player,
                expected,
                found,
            } => write!(
                f,
                "Expected {expected} weight vectors for player {player}, found {found}"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        Player,
        alphabet::Alphabet,
        cobuchi::{CoBuchiAutomaton, CoBuchiAutomatonBuilder},
        label::{Guard, GuardLiteral, LabelError},
        preprocessing::{BoundedStates, Preprocessor},
        turn_based::builder::{AutomatonBuildError, TurnBasedAutomatonBuilder},
        weights::Weights,
    };

    fn lit(p: &str, positive: bool) -> GuardLiteral {
        GuardLiteral::new(p, positive)
    }

    /// init --(r && g) || (r && !g)--> acc, init --(!r)--> init, acc --1--> acc
    fn request_automaton() -> CoBuchiAutomaton {
        CoBuchiAutomatonBuilder::new("req")
            .with_state("init", false)
            .unwrap()
            .with_state("acc", true)
            .unwrap()
            .with_initial_state("init")
            .unwrap()
            .with_edge(
                "init",
                Guard::new(vec![
                    vec![lit("r", true), lit("g", true)],
                    vec![lit("r", true), lit("g", false)],
                ]),
                "acc",
            )
            .unwrap()
            .with_edge("init", Guard::new(vec![vec![lit("r", false)]]), "init")
            .unwrap()
            .with_edge("acc", Guard::tautology(), "acc")
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn test_turn_states_and_fusion() {
        let alphabet = Alphabet::new(["r"], ["g"]).unwrap();
        let aut = TurnBasedAutomatonBuilder::new(alphabet, Player::Environment)
            .with_automaton(request_automaton())
            .unwrap()
            .build()
            .unwrap();

        // two conjunctions with input part `r` are fused into one turn state
        assert_eq!(aut.len(), 2 + 3);
        assert_eq!(aut.start_index_other(), 2);
        assert_eq!(aut.initial(), 0);

        for q in 0..2 {
            assert_eq!(aut.state(q).player(), Player::Environment);
            assert!(!aut.state(q).is_accepting());
        }
        // turn states inherit the acceptance of their source
        assert!(!aut.state(2).is_accepting());
        assert!(!aut.state(3).is_accepting());
        assert!(aut.state(4).is_accepting());
        assert!(aut.states()[2..].iter().all(|s| s.player() == Player::System));

        // r from init leads to the fused turn state with two outgoing transitions
        assert_eq!(aut.succ(0, 1).collect::<Vec<_>>(), vec![2]);
        assert_eq!(aut.state(2).outgoing().len(), 2);
        assert_eq!(aut.succ(2, 0).collect::<Vec<_>>(), vec![1]);
        assert_eq!(aut.succ(2, 1).collect::<Vec<_>>(), vec![1]);
        assert_eq!(aut.succ(0, 0).collect::<Vec<_>>(), vec![3]);
        assert_eq!(aut.succ(3, 1).collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn test_bounded_turn_states_are_not_accepting() {
        // accepting initial state, left for good after one step
        let mut visit_once = CoBuchiAutomatonBuilder::new("once")
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
            .unwrap();
        let alphabet = Alphabet::new(["r"], ["g"]).unwrap();

        let aut = TurnBasedAutomatonBuilder::new(alphabet.clone(), Player::Environment)
            .with_automaton(visit_once.clone())
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(aut.n_accepting_states(), 1);

        BoundedStates::new().process(&mut visit_once);
        let aut = TurnBasedAutomatonBuilder::new(alphabet, Player::Environment)
            .with_automaton(visit_once)
            .unwrap()
            .build()
            .unwrap();
        // init and its turn state are bounded, safe is reached after the
        // only accepting visit
        assert_eq!(aut.n_bounded_states(), 2);
        assert_eq!(aut.n_accepting_states(), 0);
    }

    #[test]
    fn test_incoming_is_inverse_of_outgoing() {
        let alphabet = Alphabet::new(["r"], ["g"]).unwrap();
        let aut = TurnBasedAutomatonBuilder::new(alphabet, Player::System)
            .with_automaton(request_automaton())
            .unwrap()
            .build()
            .unwrap();

        for (i, t) in aut.transitions().iter().enumerate() {
            assert!(aut.state(t.from()).outgoing().contains(&i));
            assert!(aut.state(t.to()).incoming().contains(&i));
        }
        let n_out: usize = aut.states().iter().map(|s| s.outgoing().len()).sum();
        let n_in: usize = aut.states().iter().map(|s| s.incoming().len()).sum();
        assert_eq!(n_out, aut.transitions().len());
        assert_eq!(n_in, aut.transitions().len());
    }

    #[test]
    fn test_completeness_flags() {
        let alphabet = Alphabet::new(["r"], ["g"]).unwrap();
        let aut = TurnBasedAutomatonBuilder::new(alphabet, Player::Environment)
            .with_automaton(request_automaton())
            .unwrap()
            .build()
            .unwrap();

        // init has a transition for r and one for !r
        assert!(aut.state(0).is_complete());
        assert!(aut.state(1).is_complete());
        assert!(aut.states().iter().all(|s| s.is_complete()));
    }

    #[test]
    fn test_shared_initial_state() {
        let alphabet = Alphabet::new(["r"], ["g"]).unwrap();
        let safe = CoBuchiAutomatonBuilder::new("safe")
            .with_state("init", false)
            .unwrap()
            .with_initial_state("init")
            .unwrap()
            .with_edge("init", Guard::tautology(), "init")
            .unwrap()
            .build()
            .unwrap();

        let aut = TurnBasedAutomatonBuilder::new(alphabet, Player::Environment)
            .with_automata([request_automaton(), safe])
            .unwrap()
            .build()
            .unwrap();

        // shared initial + 2 + 1 originals, 3 + 1 turn states
        assert_eq!(aut.len(), 4 + 4);
        assert_eq!(aut.initial(), 0);
        assert_eq!(aut.start_index_other(), 4);
        assert_eq!(aut.name(), "req&safe");
        assert_eq!(aut.n_accepting(), 1);

        // the shared initial state copies the moves of both initial states
        let mut from_shared = aut.succ(0, 1).collect::<Vec<_>>();
        from_shared.sort();
        let mut expected = aut.succ(1, 1).chain(aut.succ(3, 1)).collect::<Vec<_>>();
        expected.sort();
        assert_eq!(from_shared, expected);
        assert!(aut.state(0).incoming().is_empty());
    }

    #[test]
    fn test_build_errors() {
        let alphabet = Alphabet::new(["r"], ["g"]).unwrap();

        let err = TurnBasedAutomatonBuilder::new(alphabet.clone(), Player::System)
            .build()
            .unwrap_err();
        assert_eq!(err, AutomatonBuildError::NoAutomaton);

        let unknown = CoBuchiAutomatonBuilder::new("u")
            .with_state("init", false)
            .unwrap()
            .with_initial_state("init")
            .unwrap()
            .with_edge("init", Guard::new(vec![vec![lit("x", true)]]), "init")
            .unwrap()
            .build()
            .unwrap();
        let err = TurnBasedAutomatonBuilder::new(alphabet.clone(), Player::System)
            .with_automaton(unknown)
            .unwrap_err();
        assert_eq!(
            err,
            AutomatonBuildError::Label(LabelError::UnknownProposition("x".into()))
        );

        let other = Alphabet::new(["r", "s"], ["g"]).unwrap();
        let err = TurnBasedAutomatonBuilder::new(alphabet, Player::System)
            .with_weights(Weights::zero(&other))
            .unwrap_err();
        assert_eq!(
            err,
            AutomatonBuildError::WeightsMismatch {
                player: Player::Environment,
                expected: 2,
                found: 4
            }
        );
    }
}
