//! Errors of the synthesis procedure
//!
//! Running out of bounds is not an error: it is reported as
//! [`crate::search::Outcome::BoundExhausted`].

use std::{error, fmt};

use acacia_automaton::{turn_based::builder::AutomatonBuildError, weights::CostParameterError};

/// Errors in the problem or configuration, detected before solving starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A group order closes more groups than it opens
    TooManyRightParentheses,
    /// A group order leaves groups open
    TooManyLeftParentheses,
    /// A group order contains `()`
    EmptyGroup,
    /// The group order does not mention every specification exactly once
    LeafCountMismatch {
        /// Number of specification units
        expected: usize,
        /// Number of leaves in the group order
        found: usize,
    },
    /// The group order names a specification that does not exist
    UnknownSpecification(String),
    /// The group order names a specification twice
    DuplicateSpecification(String),
    /// No specification unit was given
    NoSpecification,
    /// Unrealizability checks need the automata of the negated specification
    MissingNegatedSpecification,
    /// The range of `K` cannot be searched
    InvalidKRange {
        /// First value of `K`
        start: usize,
        /// Largest value of `K`
        bound: usize,
        /// Increment of `K`
        step: usize,
    },
    /// The cost parameters are malformed
    Costs(CostParameterError),
    /// The turn-based automaton could not be built
    Automaton(AutomatonBuildError),
}

impl error::Error for ConfigurationError {}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationError::TooManyRightParentheses => {
                write!(f, "Parenthesizing: too many right parentheses")
            }
            ConfigurationError::TooManyLeftParentheses => {
                write!(f, "Parenthesizing: too many left parentheses")
            }
            ConfigurationError::EmptyGroup => write!(f, "Parenthesizing: empty group '()'"),
            ConfigurationError::LeafCountMismatch { expected, found } => write!(
                f,
                "Parenthesizing: expected {expected} specifications, found {found}"
            ),
            ConfigurationError::UnknownSpecification(name) => {
                write!(f, "Parenthesizing: specification not found ({name})")
            }
            ConfigurationError::DuplicateSpecification(name) => {
                write!(f, "Parenthesizing: specification appears twice ({name})")
            }
            ConfigurationError::NoSpecification => {
                write!(f, "At least one specification is required")
            }
            ConfigurationError::MissingNegatedSpecification => write!(
                f,
                "Checking unrealizability requires the automata of the negated specification"
            ),
            ConfigurationError::InvalidKRange { start, bound, step } => write!(
                f,
                "Invalid range for K: start {start}, bound {bound}, step {step} (the step must be positive and the start at most the bound)"
            ),
            ConfigurationError::Costs(err) => write!(f, "Invalid cost parameters: {err}"),
            ConfigurationError::Automaton(err) => {
                write!(f, "Failed to build the turn-based automaton: {err}")
            }
        }
    }
}

impl From<CostParameterError> for ConfigurationError {
    fn from(value: CostParameterError) -> Self {
        ConfigurationError::Costs(value)
    }
}

impl From<AutomatonBuildError> for ConfigurationError {
    fn from(value: AutomatonBuildError) -> Self {
        ConfigurationError::Automaton(value)
    }
}

/// Violated invariants of the search
///
/// These indicate a bug rather than a problem with the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalInconsistency {
    /// A solved node was expected but the node has no solution
    NodeNotSolved(String),
    /// The games of the children of a node could not be composed
    IncompatibleGames(String),
}

impl error::Error for InternalInconsistency {}

impl fmt::Display for InternalInconsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InternalInconsistency::NodeNotSolved(node) => {
                write!(f, "Node '{node}' was expected to be solved")
            }
            InternalInconsistency::IncompatibleGames(node) => write!(
                f,
                "The games of the children of '{node}' do not share a starting player"
            ),
        }
    }
}

/// Errors of [`crate::search::CompositionEngine`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisError {
    /// Invalid problem or configuration
    Configuration(ConfigurationError),
    /// Violated invariant of the search
    Internal(InternalInconsistency),
}

impl error::Error for SynthesisError {}

impl fmt::Display for SynthesisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SynthesisError::Configuration(err) => write!(f, "Configuration error: {err}"),
            SynthesisError::Internal(err) => write!(f, "Internal error: {err}"),
        }
    }
}

impl From<ConfigurationError> for SynthesisError {
    fn from(value: ConfigurationError) -> Self {
        SynthesisError::Configuration(value)
    }
}

impl From<InternalInconsistency> for SynthesisError {
    fn from(value: InternalInconsistency) -> Self {
        SynthesisError::Internal(value)
    }
}

impl From<CostParameterError> for SynthesisError {
    fn from(value: CostParameterError) -> Self {
        SynthesisError::Configuration(value.into())
    }
}

impl From<AutomatonBuildError> for SynthesisError {
    fn from(value: AutomatonBuildError) -> Self {
        SynthesisError::Configuration(value.into())
    }
}
