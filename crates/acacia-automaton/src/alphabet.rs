//! Input and output propositions and their valuations
//!
//! A valuation of the propositions of a player is represented by its index
//! `σ` in `0..2^n`: bit `j` of `σ` is the truth value of the `j`-th
//! proposition of that player.

use std::fmt;

use crate::Player;

/// Index of a valuation of the propositions of one player
pub type Valuation = usize;

/// Ordered input and output propositions
///
/// The environment owns the inputs, the system owns the outputs. An alphabet
/// is immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    inputs: Vec<String>,
    outputs: Vec<String>,
}

impl Alphabet {
    /// Create a new alphabet
    ///
    /// Proposition names must be lowercase and unique across both players.
    pub fn new<S: Into<String>>(
        inputs: impl IntoIterator<Item = S>,
        outputs: impl IntoIterator<Item = S>,
    ) -> Result<Self, AlphabetError> {
        let inputs = inputs.into_iter().map(|s| s.into()).collect::<Vec<_>>();
        let outputs = outputs.into_iter().map(|s| s.into()).collect::<Vec<_>>();

        let mut seen = std::collections::HashSet::new();
        for prop in inputs.iter().chain(outputs.iter()) {
            if prop.to_lowercase() != *prop {
                return Err(AlphabetError::UppercaseProposition(prop.clone()));
            }
            if !seen.insert(prop.as_str()) {
                return Err(AlphabetError::DuplicateProposition(prop.clone()));
            }
        }

        Ok(Self { inputs, outputs })
    }

    /// Input propositions
    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    /// Output propositions
    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    /// Propositions controlled by `player`
    pub fn propositions(&self, player: Player) -> &[String] {
        match player {
            Player::Environment => &self.inputs,
            Player::System => &self.outputs,
        }
    }

    /// Number of valuations of the propositions of `player`
    pub fn sigma_size(&self, player: Player) -> usize {
        1 << self.propositions(player).len()
    }

    /// Iterate over all valuations of the propositions of `player`
    pub fn valuations(&self, player: Player) -> std::ops::Range<Valuation> {
        0..self.sigma_size(player)
    }

    /// Find the owner and position of a proposition
    pub fn lookup(&self, prop: &str) -> Option<(Player, usize)> {
        if let Some(i) = self.inputs.iter().position(|p| p == prop) {
            return Some((Player::Environment, i));
        }
        self.outputs
            .iter()
            .position(|p| p == prop)
            .map(|i| (Player::System, i))
    }

    /// Alphabet with the roles of inputs and outputs exchanged
    ///
    /// Used to check unrealizability, where the environment becomes the
    /// player to synthesize for.
    pub fn swapped(&self) -> Self {
        Self {
            inputs: self.outputs.clone(),
            outputs: self.inputs.clone(),
        }
    }

    /// Human readable representation of a valuation, e.g. `a&!b`
    pub fn valuation_to_string(&self, player: Player, sigma: Valuation) -> String {
        let props = self.propositions(player);
        if props.is_empty() {
            return "T".into();
        }

        props
            .iter()
            .enumerate()
            .map(|(j, p)| {
                if (sigma >> j) & 1 == 1 {
                    p.clone()
                } else {
                    format!("!{p}")
                }
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "inputs: [{}], outputs: [{}]",
            self.inputs.join(", "),
            self.outputs.join(", ")
        )
    }
}

/// Errors that can occur when building an alphabet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlphabetError {
    /// Propositions must be lowercase
    UppercaseProposition(String),
    /// A proposition was declared twice
    DuplicateProposition(String),
}

impl std::error::Error for AlphabetError {}

impl fmt::Display for AlphabetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlphabetError::UppercaseProposition(p) => {
                write!(f, "Atomic signals must be lowercase, found '{p}'")
            }
            AlphabetError::DuplicateProposition(p) => {
                write!(f, "Signal '{p}' is declared more than once")
            }
        }
    }
}
