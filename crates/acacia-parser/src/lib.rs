//! Parsers for the input files of the synthesis tool
//!
//! This crate contains traits for parsers of specification automata and of
//! partition files, together with their implementations:
//! - [`never_claim::NeverClaimParser`] reads never-claims as produced by
//!   ltl2ba into co-Büchi automata,
//! - [`partition::PartitionParser`] reads the partition of the signals and
//!   the cost parameters.

use acacia_automaton::cobuchi::CoBuchiAutomaton;
use anyhow::Error;

// The pest derive generates errors as the doc comments are missing
#[allow(missing_docs)]
pub mod never_claim;

// The pest derive generates errors as the doc comments are missing
#[allow(missing_docs)]
pub mod partition;

pub use partition::Partition;

/// Parse the automaton of a specification unit from a string.
pub trait ParseCoBuchi {
    /// Try to parse the automaton of the specification unit `name`.
    fn parse_automaton(&self, name: &str, input: &str) -> Result<CoBuchiAutomaton, Error>;
}

/// Parse the partition of the signals and the cost parameters from a string.
pub trait ParsePartition {
    /// Try to parse a partition file.
    fn parse_partition(&self, input: &str) -> Result<Partition, Error>;
}
