//! Universal co-Büchi automata
//!
//! A [`CoBuchiAutomaton`] is the automaton of one specification unit as it is
//! produced by an external LTL translator: named states, an accepting subset,
//! one initial state and guarded edges. Read as a universal co-Büchi
//! automaton, a word is accepted if no run visits accepting states infinitely
//! often; the bounded approximation used for synthesis requires that no run
//! visits accepting states more than `K` times.

use std::{collections::HashMap, fmt};

use crate::label::Guard;

/// State of a co-Büchi automaton
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoBuchiState {
    name: String,
    accepting: bool,
    unbounded: bool,
}

impl CoBuchiState {
    /// Name of the state
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the state is accepting
    pub fn is_accepting(&self) -> bool {
        self.accepting
    }

    /// Whether a run can visit this state after arbitrarily many accepting
    /// states
    ///
    /// All states are unbounded until the bounded-states preprocessing
    /// proves otherwise.
    pub fn is_unbounded(&self) -> bool {
        self.unbounded
    }
}

/// Guarded edge between two states
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    from: usize,
    to: usize,
    guard: Guard,
}

impl Edge {
    /// Index of the source state
    pub fn from(&self) -> usize {
        self.from
    }

    /// Index of the target state
    pub fn to(&self) -> usize {
        self.to
    }

    /// Guard of the edge
    pub fn guard(&self) -> &Guard {
        &self.guard
    }
}

/// Universal co-Büchi automaton of a specification unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoBuchiAutomaton {
    name: String,
    states: Vec<CoBuchiState>,
    edges: Vec<Edge>,
    initial: usize,
}

impl CoBuchiAutomaton {
    /// Name of the specification unit the automaton belongs to
    pub fn name(&self) -> &str {
        &self.name
    }

    /// States of the automaton
    pub fn states(&self) -> &[CoBuchiState] {
        &self.states
    }

    /// Edges of the automaton
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Index of the initial state
    pub fn initial(&self) -> usize {
        self.initial
    }

    /// Number of accepting states
    pub fn n_accepting(&self) -> usize {
        self.states.iter().filter(|s| s.accepting).count()
    }

    /// Edges leaving state `state`
    pub fn outgoing(&self, state: usize) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.from == state)
    }

    /// Edges entering state `state`
    pub fn incoming(&self, state: usize) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.to == state)
    }

    /// Mark a state as bounded or unbounded
    pub fn set_unbounded(&mut self, state: usize, unbounded: bool) {
        self.states[state].unbounded = unbounded;
    }

    /// Number of transitions of the turn-based automaton this automaton
    /// expands to, i.e. the total number of conjunctions over all edges
    pub fn n_conjunctions(&self) -> usize {
        self.edges.iter().map(|e| e.guard.conjunctions().len()).sum()
    }
}

impl fmt::Display for CoBuchiAutomaton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "automaton {} {{", self.name)?;
        for (i, s) in self.states.iter().enumerate() {
            let mut flags = Vec::new();
            if i == self.initial {
                flags.push("initial");
            }
            if s.accepting {
                flags.push("accepting");
            }
            if !s.unbounded {
                flags.push("bounded");
            }
            writeln!(f, "    {} [{}]", s.name, flags.join(", "))?;
        }
        for e in self.edges.iter() {
            writeln!(
                f,
                "    {} -> {}: {}",
                self.states[e.from].name, self.states[e.to].name, e.guard
            )?;
        }
        write!(f, "}}")
    }
}

/// Builder for [`CoBuchiAutomaton`]
///
/// States must be declared before edges can refer to them. Edges between the
/// same pair of states are merged by disjunction of their guards.
#[derive(Debug, Clone)]
pub struct CoBuchiAutomatonBuilder {
    name: String,
    states: Vec<CoBuchiState>,
    index: HashMap<String, usize>,
    edges: Vec<Edge>,
    initial: Option<usize>,
}

impl CoBuchiAutomatonBuilder {
    /// Create a new builder for an automaton of the specification unit `name`
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            states: Vec::new(),
            index: HashMap::new(),
            edges: Vec::new(),
            initial: None,
        }
    }

    /// Add a state
    pub fn with_state<S: Into<String>>(
        mut self,
        name: S,
        accepting: bool,
    ) -> Result<Self, CoBuchiBuildError> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(CoBuchiBuildError::DuplicateState(name));
        }

        self.index.insert(name.clone(), self.states.len());
        self.states.push(CoBuchiState {
            name,
            accepting,
            unbounded: true,
        });
        Ok(self)
    }

    /// Check whether a state with the given name was already added
    pub fn has_state(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Declare the initial state
    pub fn with_initial_state(mut self, name: &str) -> Result<Self, CoBuchiBuildError> {
        let idx = self.lookup(name)?;
        if let Some(prev) = self.initial
            && prev != idx
        {
            return Err(CoBuchiBuildError::MultipleInitialStates(
                self.states[prev].name.clone(),
                name.to_string(),
            ));
        }
        self.initial = Some(idx);
        Ok(self)
    }

    /// Add an edge; the guard is merged into an existing edge between the
    /// same states
    pub fn with_edge(
        mut self,
        from: &str,
        guard: Guard,
        to: &str,
    ) -> Result<Self, CoBuchiBuildError> {
        let from = self.lookup(from)?;
        let to = self.lookup(to)?;

        if guard.is_false() {
            return Ok(self);
        }

        match self.edges.iter_mut().find(|e| e.from == from && e.to == to) {
            Some(edge) => {
                let merged = std::mem::take(&mut edge.guard).or(guard);
                edge.guard = merged;
            }
            None => self.edges.push(Edge { from, to, guard }),
        }
        Ok(self)
    }

    fn lookup(&self, name: &str) -> Result<usize, CoBuchiBuildError> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| CoBuchiBuildError::UnknownState(name.to_string()))
    }

    /// Build the automaton
    pub fn build(self) -> Result<CoBuchiAutomaton, CoBuchiBuildError> {
        let initial = self.initial.ok_or(CoBuchiBuildError::NoInitialState)?;

        Ok(CoBuchiAutomaton {
            name: self.name,
            states: self.states,
            edges: self.edges,
            initial,
        })
    }
}

/// Errors that can occur when building a co-Büchi automaton
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoBuchiBuildError {
    /// A state with the same name was added twice
    DuplicateState(String),
    /// An edge or the initial state refers to an undeclared state
    UnknownState(String),
    /// No initial state was declared
    NoInitialState,
    /// Two different states were declared initial
    MultipleInitialStates(String, String),
}

impl std::error::Error for CoBuchiBuildError {}

impl fmt::Display for CoBuchiBuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoBuchiBuildError::DuplicateState(s) => write!(f, "Duplicate state: {s}"),
            CoBuchiBuildError::UnknownState(s) => write!(f, "Unknown state: {s}"),
            CoBuchiBuildError::NoInitialState => write!(f, "Automaton has no initial state"),
            CoBuchiBuildError::MultipleInitialStates(s1, s2) => {
                write!(f, "Automaton has two initial states: {s1} and {s2}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        cobuchi::{CoBuchiAutomatonBuilder, CoBuchiBuildError},
        label::{Guard, GuardLiteral},
    };

    #[test]
    fn test_build_simple_automaton() {
        let aut = CoBuchiAutomatonBuilder::new("u0")
            .with_state("init", false)
            .unwrap()
            .with_state("s1", true)
            .unwrap()
            .with_initial_state("init")
            .unwrap()
            .with_edge("init", Guard::tautology(), "init")
            .unwrap()
            .with_edge(
                "init",
                Guard::new(vec![vec![GuardLiteral::new("a", true)]]),
                "s1",
            )
            .unwrap()
            .with_edge("s1", Guard::tautology(), "s1")
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(aut.name(), "u0");
        assert_eq!(aut.initial(), 0);
        assert_eq!(aut.n_accepting(), 1);
        assert_eq!(aut.outgoing(0).count(), 2);
        assert_eq!(aut.incoming(1).count(), 2);
        assert!(aut.states().iter().all(|s| s.is_unbounded()));
        assert_eq!(aut.n_conjunctions(), 3);
    }

    #[test]
    fn test_edges_between_same_states_are_merged() {
        let aut = CoBuchiAutomatonBuilder::new("u0")
            .with_state("init", false)
            .unwrap()
            .with_initial_state("init")
            .unwrap()
            .with_edge(
                "init",
                Guard::new(vec![vec![GuardLiteral::new("a", true)]]),
                "init",
            )
            .unwrap()
            .with_edge(
                "init",
                Guard::new(vec![vec![GuardLiteral::new("a", false)]]),
                "init",
            )
            .unwrap()
            .with_edge("init", Guard::default(), "init")
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(aut.edges().len(), 1);
        assert_eq!(aut.edges()[0].guard().conjunctions().len(), 2);
    }

    #[test]
    fn test_build_errors() {
        let err = CoBuchiAutomatonBuilder::new("u0")
            .with_state("a", false)
            .unwrap()
            .with_state("a", true)
            .unwrap_err();
        assert_eq!(err, CoBuchiBuildError::DuplicateState("a".into()));

        let err = CoBuchiAutomatonBuilder::new("u0")
            .with_state("a", false)
            .unwrap()
            .with_edge("a", Guard::tautology(), "b")
            .unwrap_err();
        assert_eq!(err, CoBuchiBuildError::UnknownState("b".into()));

        let err = CoBuchiAutomatonBuilder::new("u0")
            .with_state("a", false)
            .unwrap()
            .build()
            .unwrap_err();
        assert_eq!(err, CoBuchiBuildError::NoInitialState);

        let err = CoBuchiAutomatonBuilder::new("u0")
            .with_state("a", false)
            .unwrap()
            .with_state("b", false)
            .unwrap()
            .with_initial_state("a")
            .unwrap()
            .with_initial_state("b")
            .unwrap_err();
        assert_eq!(
            err,
            CoBuchiBuildError::MultipleInitialStates("a".into(), "b".into())
        );
    }
}
