//! Guards and transition labels
//!
//! A [`Guard`] is the propositional formula on an edge of a co-Büchi
//! automaton, kept in disjunctive normal form over proposition names. When
//! the turn-based automaton is built, every conjunction of a guard is
//! projected onto the propositions of one player, yielding a [`Disjunct`]
//! (a proposition table). A [`Label`] is a set of such disjuncts.

use std::fmt;

use crate::{
    Player,
    alphabet::{Alphabet, Valuation},
};

/// A possibly negated proposition appearing in a guard
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GuardLiteral {
    /// Name of the proposition
    pub prop: String,
    /// Whether the proposition appears without negation
    pub positive: bool,
}

impl GuardLiteral {
    /// Create a new literal
    pub fn new<S: Into<String>>(prop: S, positive: bool) -> Self {
        Self {
            prop: prop.into(),
            positive,
        }
    }
}

/// Propositional guard in disjunctive normal form
///
/// Each inner vector is a conjunction of literals; an empty conjunction is
/// `true`. A guard without any conjunction is `false`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Guard {
    conjunctions: Vec<Vec<GuardLiteral>>,
}

impl Guard {
    /// Create a guard from its conjunctions
    pub fn new(conjunctions: Vec<Vec<GuardLiteral>>) -> Self {
        Self { conjunctions }
    }

    /// The guard `true`
    pub fn tautology() -> Self {
        Self {
            conjunctions: vec![Vec::new()],
        }
    }

    /// Conjunctions of the guard
    pub fn conjunctions(&self) -> &[Vec<GuardLiteral>] {
        &self.conjunctions
    }

    /// Check whether the guard has no conjunction
    pub fn is_false(&self) -> bool {
        self.conjunctions.is_empty()
    }

    /// Disjunction of two guards
    pub fn or(mut self, other: Guard) -> Self {
        for conj in other.conjunctions {
            if !self.conjunctions.contains(&conj) {
                self.conjunctions.push(conj);
            }
        }
        self
    }

    /// Check that every proposition used in the guard belongs to `alphabet`
    pub fn check_propositions(&self, alphabet: &Alphabet) -> Result<(), LabelError> {
        self.conjunctions
            .iter()
            .flatten()
            .find(|lit| alphabet.lookup(&lit.prop).is_none())
            .map_or(Ok(()), |lit| {
                Err(LabelError::UnknownProposition(lit.prop.clone()))
            })
    }

    /// Project a single conjunction onto the propositions of `player`
    ///
    /// Literals over the propositions of the other player are ignored. If a
    /// proposition appears both negated and positive, the negation wins.
    pub fn project_conjunction(
        conjunction: &[GuardLiteral],
        alphabet: &Alphabet,
        player: Player,
    ) -> Result<Disjunct, LabelError> {
        let mut literals = vec![Literal::DontCare; alphabet.propositions(player).len()];

        for lit in conjunction {
            match alphabet.lookup(&lit.prop) {
                None => return Err(LabelError::UnknownProposition(lit.prop.clone())),
                Some((owner, idx)) if owner == player => {
                    if !lit.positive {
                        literals[idx] = Literal::Negative;
                    } else if literals[idx] == Literal::DontCare {
                        literals[idx] = Literal::Positive;
                    }
                }
                Some(_) => {}
            }
        }

        Ok(Disjunct { literals })
    }

    /// Project the whole guard onto the propositions of `player`
    pub fn project(&self, alphabet: &Alphabet, player: Player) -> Result<Label, LabelError> {
        let disjuncts = self
            .conjunctions
            .iter()
            .map(|c| Self::project_conjunction(c, alphabet, player))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Label::from_disjuncts(disjuncts))
    }
}

impl fmt::Display for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.conjunctions.is_empty() {
            return write!(f, "false");
        }

        let conjs = self
            .conjunctions
            .iter()
            .map(|c| {
                if c.is_empty() {
                    return "(1)".to_string();
                }
                let lits = c
                    .iter()
                    .map(|l| {
                        if l.positive {
                            l.prop.clone()
                        } else {
                            format!("!{}", l.prop)
                        }
                    })
                    .collect::<Vec<_>>();
                format!("({})", lits.join(" && "))
            })
            .collect::<Vec<_>>();

        write!(f, "{}", conjs.join(" || "))
    }
}

/// Constraint a disjunct puts on one proposition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Literal {
    /// The proposition is not constrained
    DontCare,
    /// The proposition must be true
    Positive,
    /// The proposition must be false
    Negative,
}

/// Conjunction of literals over the propositions of one player
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Disjunct {
    literals: Vec<Literal>,
}

impl Disjunct {
    /// Create a disjunct from its literals, one per proposition
    pub fn new(literals: Vec<Literal>) -> Self {
        Self { literals }
    }

    /// Disjunct without any constraint over `n_props` propositions
    pub fn tautology(n_props: usize) -> Self {
        Self {
            literals: vec![Literal::DontCare; n_props],
        }
    }

    /// Literals of the disjunct
    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    /// Check whether the disjunct does not constrain any proposition
    pub fn is_tautology(&self) -> bool {
        self.literals.iter().all(|l| *l == Literal::DontCare)
    }

    /// Check whether the valuation `sigma` satisfies the disjunct
    pub fn matches(&self, sigma: Valuation) -> bool {
        self.literals
            .iter()
            .enumerate()
            .all(|(j, lit)| match lit {
                Literal::DontCare => true,
                Literal::Positive => (sigma >> j) & 1 == 1,
                Literal::Negative => (sigma >> j) & 1 == 0,
            })
    }
}

impl fmt::Display for Disjunct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_tautology() {
            return write!(f, "T");
        }
        for lit in self.literals.iter() {
            match lit {
                Literal::DontCare => write!(f, "0")?,
                Literal::Positive => write!(f, "1")?,
                Literal::Negative => write!(f, "2")?,
            }
        }
        Ok(())
    }
}

/// Set of disjuncts over the propositions of one player
///
/// A label containing a tautological disjunct is reduced to that single
/// disjunct; duplicate disjuncts are removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    disjuncts: Vec<Disjunct>,
}

impl Label {
    /// Build a label from disjuncts, removing duplicates
    pub fn from_disjuncts(disjuncts: impl IntoIterator<Item = Disjunct>) -> Self {
        let mut res: Vec<Disjunct> = Vec::new();
        for d in disjuncts {
            if d.is_tautology() {
                return Self { disjuncts: vec![d] };
            }
            if !res.contains(&d) {
                res.push(d);
            }
        }
        Self { disjuncts: res }
    }

    /// The label `T` over `n_props` propositions
    pub fn tautology(n_props: usize) -> Self {
        Self {
            disjuncts: vec![Disjunct::tautology(n_props)],
        }
    }

    /// Disjuncts of the label
    pub fn disjuncts(&self) -> &[Disjunct] {
        &self.disjuncts
    }

    /// Check whether the label is `T`
    pub fn is_tautology(&self) -> bool {
        self.disjuncts.len() == 1 && self.disjuncts[0].is_tautology()
    }

    /// Check whether the valuation `sigma` satisfies some disjunct
    pub fn matches(&self, sigma: Valuation) -> bool {
        self.disjuncts.iter().any(|d| d.matches(sigma))
    }

    /// Check whether both labels consist of the same disjuncts
    pub fn same_disjuncts(&self, other: &Self) -> bool {
        self.disjuncts.len() == other.disjuncts.len()
            && self.disjuncts.iter().all(|d| other.disjuncts.contains(d))
    }

    /// Disjunction of two labels
    pub fn union(&self, other: &Self) -> Self {
        Self::from_disjuncts(
            self.disjuncts
                .iter()
                .chain(other.disjuncts.iter())
                .cloned(),
        )
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ds = self
            .disjuncts
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>();
        write!(f, "{}", ds.join("-"))
    }
}

/// Errors that can occur while converting guards into labels
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelError {
    /// A guard refers to a proposition that is neither an input nor an output
    UnknownProposition(String),
}

impl std::error::Error for LabelError {}

impl fmt::Display for LabelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelError::UnknownProposition(p) => write!(
                f,
                "Proposition '{p}' is neither an input nor an output signal: the partition does not match the formula"
            ),
        }
    }
}
