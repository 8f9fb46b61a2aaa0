//! Turn-based automata
//!
//! A [`TurnBasedAutomaton`] splits every step of a co-Büchi automaton into a
//! move of the starting player followed by a move of the other player. States
//! are owned by the player moving next; a transition label is a set of
//! disjuncts over the propositions of the owner of its source state.
//!
//! The states owned by the starting player always come first, so a counting
//! function only has to know the index [`TurnBasedAutomaton::start_index_other`]
//! to find the states relevant for a player.
//!
//! Automata are constructed with the [`builder::TurnBasedAutomatonBuilder`].

use std::fmt;

use crate::{
    Player,
    alphabet::{Alphabet, Valuation},
    label::Label,
    weights::Weights,
};

pub mod builder;

/// State of a turn-based automaton
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnBasedState {
    player: Player,
    accepting: bool,
    unbounded: bool,
    complete: bool,
    trash: bool,
    outgoing: Vec<usize>,
    incoming: Vec<usize>,
}

impl TurnBasedState {
    pub(crate) fn new(player: Player, accepting: bool, unbounded: bool) -> Self {
        Self {
            player,
            accepting,
            unbounded,
            complete: false,
            trash: false,
            outgoing: Vec::new(),
            incoming: Vec::new(),
        }
    }

    pub(crate) fn new_trash(player: Player, accepting: bool) -> Self {
        Self {
            trash: true,
            ..Self::new(player, accepting, true)
        }
    }

    /// Player moving from this state
    pub fn player(&self) -> Player {
        self.player
    }

    /// Whether the state is accepting
    pub fn is_accepting(&self) -> bool {
        self.accepting
    }

    /// Whether runs can visit the state after arbitrarily many accepting
    /// states
    pub fn is_unbounded(&self) -> bool {
        self.unbounded
    }

    /// Whether every valuation of the owner has a matching outgoing transition
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Whether the state is a trash state introduced when removing losing
    /// states
    pub fn is_trash(&self) -> bool {
        self.trash
    }

    /// Indices of the outgoing transitions
    pub fn outgoing(&self) -> &[usize] {
        &self.outgoing
    }

    /// Indices of the incoming transitions
    pub fn incoming(&self) -> &[usize] {
        &self.incoming
    }
}

/// Transition of a turn-based automaton
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    from: usize,
    to: usize,
    label: Label,
}

impl Transition {
    pub(crate) fn new(from: usize, to: usize, label: Label) -> Self {
        Self { from, to, label }
    }

    /// Source state
    pub fn from(&self) -> usize {
        self.from
    }

    /// Target state
    pub fn to(&self) -> usize {
        self.to
    }

    /// Label over the propositions of the owner of the source state
    pub fn label(&self) -> &Label {
        &self.label
    }
}

/// Turn-based universal co-Büchi automaton
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnBasedAutomaton {
    name: String,
    states: Vec<TurnBasedState>,
    transitions: Vec<Transition>,
    initial: usize,
    starting_player: Player,
    alphabet: Alphabet,
    weights: Weights,
    n_accepting: usize,
    start_index_other: usize,
}

impl TurnBasedAutomaton {
    /// Assemble an automaton from its states and transitions
    ///
    /// Fills the incoming and outgoing transition lists, computes the
    /// completeness of every state and the index of the first state of the
    /// other player. States of the starting player must precede all other
    /// states.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn assemble(
        name: String,
        mut states: Vec<TurnBasedState>,
        transitions: Vec<Transition>,
        initial: usize,
        starting_player: Player,
        alphabet: Alphabet,
        weights: Weights,
        n_accepting: usize,
    ) -> Self {
        for s in states.iter_mut() {
            s.outgoing.clear();
            s.incoming.clear();
        }
        for (i, t) in transitions.iter().enumerate() {
            states[t.from].outgoing.push(i);
            states[t.to].incoming.push(i);
        }

        for s in states.iter_mut() {
            s.complete = alphabet.valuations(s.player).all(|sigma| {
                s.outgoing
                    .iter()
                    .any(|t| transitions[*t].label.matches(sigma))
            });
        }

        let start_index_other = states
            .iter()
            .position(|s| s.player != starting_player)
            .unwrap_or(states.len());
        debug_assert!(
            states[start_index_other..]
                .iter()
                .all(|s| s.player != starting_player)
        );

        Self {
            name,
            states,
            transitions,
            initial,
            starting_player,
            alphabet,
            weights,
            n_accepting,
            start_index_other,
        }
    }

    /// Name of the automaton
    pub fn name(&self) -> &str {
        &self.name
    }

    /// States of the automaton
    pub fn states(&self) -> &[TurnBasedState] {
        &self.states
    }

    /// State with index `q`
    pub fn state(&self, q: usize) -> &TurnBasedState {
        &self.states[q]
    }

    /// Number of states
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Check whether the automaton has no state
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Transitions of the automaton
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Index of the initial state
    pub fn initial(&self) -> usize {
        self.initial
    }

    /// Player owning the initial state
    pub fn starting_player(&self) -> Player {
        self.starting_player
    }

    /// Alphabet the labels are defined over
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Weight vectors of the valuations
    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    /// Replace the weight vectors
    pub fn set_weights(&mut self, weights: Weights) {
        self.weights = weights;
    }

    /// Number of accepting states of the co-Büchi automata the automaton was
    /// built from
    pub fn n_accepting(&self) -> usize {
        self.n_accepting
    }

    /// Index of the first state owned by the player that does not start
    pub fn start_index_other(&self) -> usize {
        self.start_index_other
    }

    /// Range of the state indices owned by `player`
    pub fn player_states(&self, player: Player) -> std::ops::Range<usize> {
        if player == self.starting_player {
            0..self.start_index_other
        } else {
            self.start_index_other..self.states.len()
        }
    }

    /// Successors of `q` when its owner plays `sigma`
    ///
    /// A target is yielded once per matching transition.
    pub fn succ(&self, q: usize, sigma: Valuation) -> impl Iterator<Item = usize> + '_ {
        self.states[q]
            .outgoing
            .iter()
            .map(|t| &self.transitions[*t])
            .filter(move |t| t.label.matches(sigma))
            .map(|t| t.to)
    }

    /// Predecessors of `q` whose owner can move to `q` by playing `sigma`
    pub fn pred(&self, q: usize, sigma: Valuation) -> impl Iterator<Item = usize> + '_ {
        self.states[q]
            .incoming
            .iter()
            .map(|t| &self.transitions[*t])
            .filter(move |t| t.label.matches(sigma))
            .map(|t| t.from)
    }

    /// All successors of `q`, regardless of the label
    pub fn all_succ(&self, q: usize) -> impl Iterator<Item = usize> + '_ {
        self.states[q]
            .outgoing
            .iter()
            .map(|t| self.transitions[*t].to)
    }

    /// Number of states owned by the player that does not start
    pub fn n_turn_states(&self) -> usize {
        self.states.len() - self.start_index_other
    }

    /// Number of accepting states of the automaton itself
    pub fn n_accepting_states(&self) -> usize {
        self.states.iter().filter(|s| s.accepting).count()
    }

    /// Number of complete states
    pub fn n_complete_states(&self) -> usize {
        self.states.iter().filter(|s| s.complete).count()
    }

    /// Number of states detected as bounded
    pub fn n_bounded_states(&self) -> usize {
        self.states.iter().filter(|s| !s.unbounded).count()
    }
}

impl fmt::Display for TurnBasedAutomaton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "turn-based automaton {} ({} states, {} transitions, starting player {}) {{",
            self.name,
            self.states.len(),
            self.transitions.len(),
            self.starting_player
        )?;
        for (i, s) in self.states.iter().enumerate() {
            let mut flags = vec![s.player.to_string()];
            if i == self.initial {
                flags.push("initial".into());
            }
            if s.accepting {
                flags.push("accepting".into());
            }
            if !s.unbounded {
                flags.push("bounded".into());
            }
            if s.complete {
                flags.push("complete".into());
            }
            if s.trash {
                flags.push("trash".into());
            }
            write!(f, "    {i} [{}]:", flags.join(", "))?;
            for t in s.outgoing.iter() {
                let t = &self.transitions[*t];
                write!(f, " {}->{}", t.label, t.to)?;
            }
            writeln!(f)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        Player,
        alphabet::Alphabet,
        label::{Disjunct, Label, Literal},
        turn_based::{TurnBasedAutomaton, TurnBasedState, Transition},
        weights::Weights,
    };

    fn two_state_automaton() -> TurnBasedAutomaton {
        // 0 (P_I) --a--> 1 (P_O), 1 --T--> 0
        let alphabet = Alphabet::new(["a"], ["b"]).unwrap();
        let a = Label::from_disjuncts([Disjunct::new(vec![Literal::Positive])]);
        let weights = Weights::zero(&alphabet);

        TurnBasedAutomaton::assemble(
            "test".into(),
            vec![
                TurnBasedState::new(Player::Environment, false, true),
                TurnBasedState::new(Player::System, true, true),
            ],
            vec![
                Transition::new(0, 1, a),
                Transition::new(1, 0, Label::tautology(1)),
            ],
            0,
            Player::Environment,
            alphabet,
            weights,
            1,
        )
    }

    #[test]
    fn test_assemble_links_transitions() {
        let aut = two_state_automaton();

        assert_eq!(aut.state(0).outgoing(), &[0]);
        assert_eq!(aut.state(0).incoming(), &[1]);
        assert_eq!(aut.state(1).outgoing(), &[1]);
        assert_eq!(aut.state(1).incoming(), &[0]);
        assert_eq!(aut.start_index_other(), 1);
        assert_eq!(aut.player_states(Player::Environment), 0..1);
        assert_eq!(aut.player_states(Player::System), 1..2);
    }

    #[test]
    fn test_completeness() {
        let aut = two_state_automaton();

        assert!(!aut.state(0).is_complete());
        assert!(aut.state(1).is_complete());
        assert_eq!(aut.n_complete_states(), 1);
    }

    #[test]
    fn test_succ_and_pred() {
        let aut = two_state_automaton();

        assert_eq!(aut.succ(0, 1).collect::<Vec<_>>(), vec![1]);
        assert_eq!(aut.succ(0, 0).count(), 0);
        assert_eq!(aut.pred(1, 1).collect::<Vec<_>>(), vec![0]);
        assert_eq!(aut.pred(1, 0).count(), 0);
        assert_eq!(aut.pred(0, 0).collect::<Vec<_>>(), vec![1]);
        assert_eq!(aut.all_succ(1).collect::<Vec<_>>(), vec![0]);
    }
}
