//! Automata for antichain-based bounded synthesis
//!
//! This crate contains the automata the safety game solvers operate on:
//!
//! - [`alphabet::Alphabet`]: input and output propositions and their
//!   valuations,
//! - [`label::Label`]: transition labels as sets of disjuncts over the
//!   propositions of one player,
//! - [`cobuchi::CoBuchiAutomaton`]: the universal co-Büchi automaton of a
//!   specification as produced by an external LTL translator,
//! - [`turn_based::TurnBasedAutomaton`]: the turn-based automaton alternating
//!   environment and system moves that the game is played on,
//! - [`weights::Weights`]: per-valuation weight vectors for mean-payoff
//!   objectives,
//! - [`preprocessing`]: the two size heuristics (bounded states and
//!   surely-losing states).

#![warn(missing_docs)]

use std::fmt;

#[cfg(feature = "config_deserialize")]
use serde::Deserialize;

pub mod alphabet;
pub mod cobuchi;
pub mod label;
pub mod preprocessing;
pub mod turn_based;
pub mod weights;

/// Players of the synthesis game
///
/// The environment controls the inputs (P_I), the system controls the
/// outputs (P_O).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "config_deserialize", derive(Deserialize))]
pub enum Player {
    /// Player choosing the input valuations
    Environment,
    /// Player choosing the output valuations
    System,
}

impl Player {
    /// The opponent of the player
    pub fn other(self) -> Self {
        match self {
            Player::Environment => Player::System,
            Player::System => Player::Environment,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::Environment => write!(f, "P_I"),
            Player::System => write!(f, "P_O"),
        }
    }
}
