//! Configuration of the synthesis procedure
//!
//! With the feature `config_deserialize` enabled, [`SynthesisConfig`] and
//! its enums can be deserialized, fields missing in the input take their
//! default value.

use std::fmt;

use acacia_automaton::Player;
#[cfg(feature = "config_deserialize")]
use serde::Deserialize;

use crate::error::ConfigurationError;

/// Default cap on the number of safety games solved during one search
pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;

/// How several specification units are checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config_deserialize", derive(Deserialize))]
pub enum Method {
    /// All units are combined into one turn-based automaton
    #[default]
    Monolithic,
    /// Every unit gets its own automaton and the games are composed along
    /// the group order
    Compositional,
}

/// Algorithm used to solve the safety games
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config_deserialize", derive(Deserialize))]
pub enum Direction {
    /// Greatest fixpoint of the predecessor operators
    #[default]
    Backward,
    /// On-the-fly forward exploration (OTFUR), used for monolithic checks and
    /// at the root of a composition
    Forward,
}

/// Verdicts the search tries to establish
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config_deserialize", derive(Deserialize))]
pub enum ToCheck {
    /// Only look for a winning strategy of the system
    #[default]
    Realizability,
    /// Only look for a winning strategy of the environment in the negated
    /// specification
    Unrealizability,
    /// Alternate both checks for every value of `K`
    Both,
}

/// Order in which the games of several specification units are composed
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config_deserialize", derive(Deserialize))]
pub enum GroupOrder {
    /// All units are children of the root
    #[default]
    Flat,
    /// Consecutive units are paired
    Binary,
    /// Explicit parenthesization over the unit names, e.g. `((a b) c)`
    Custom(String),
}

/// Configuration of a [`crate::search::CompositionEngine`]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config_deserialize", derive(Deserialize))]
#[cfg_attr(feature = "config_deserialize", serde(default))]
pub struct SynthesisConfig {
    /// Player making the first move
    pub starting_player: Player,
    /// Monolithic or compositional checking
    pub method: Method,
    /// Solving algorithm
    pub direction: Direction,
    /// Verdicts to check
    pub to_check: ToCheck,
    /// First value of `K`
    pub k_start: usize,
    /// Largest value of `K`
    pub k_bound: usize,
    /// Increment of `K` between two attempts
    pub k_step: usize,
    /// Use the critical signals optimization in the backward solver
    pub critical: bool,
    /// Detect bounded states of the co-Büchi automata
    pub opt1: bool,
    /// Remove `K`-surely-losing states before every attempt
    pub opt2: bool,
    /// Composition order of the specification units
    pub group_order: GroupOrder,
    /// Maximal number of safety games solved in one search
    pub max_iterations: usize,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            starting_player: Player::Environment,
            method: Method::Monolithic,
            direction: Direction::Backward,
            to_check: ToCheck::Realizability,
            k_start: 0,
            k_bound: 2,
            k_step: 1,
            critical: true,
            opt1: true,
            opt2: true,
            group_order: GroupOrder::Flat,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl SynthesisConfig {
    /// Check that the range of `K` can be searched
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.k_step == 0 || self.k_start > self.k_bound {
            return Err(ConfigurationError::InvalidKRange {
                start: self.k_start,
                bound: self.k_bound,
                step: self.k_step,
            });
        }
        Ok(())
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Monolithic => write!(f, "monolithic"),
            Method::Compositional => write!(f, "compositional"),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Backward => write!(f, "backward"),
            Direction::Forward => write!(f, "forward"),
        }
    }
}

impl fmt::Display for ToCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToCheck::Realizability => write!(f, "realizability"),
            ToCheck::Unrealizability => write!(f, "unrealizability"),
            ToCheck::Both => write!(f, "realizability and unrealizability"),
        }
    }
}

impl fmt::Display for GroupOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupOrder::Flat => write!(f, "flat"),
            GroupOrder::Binary => write!(f, "binary"),
            GroupOrder::Custom(order) => write!(f, "{order}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use acacia_automaton::Player;

    use crate::{
        config::{DEFAULT_MAX_ITERATIONS, Direction, GroupOrder, Method, SynthesisConfig, ToCheck},
        error::ConfigurationError,
    };

    #[test]
    fn test_default() {
        let cfg = SynthesisConfig::default();

        assert_eq!(cfg.starting_player, Player::Environment);
        assert_eq!(cfg.method, Method::Monolithic);
        assert_eq!(cfg.direction, Direction::Backward);
        assert_eq!(cfg.to_check, ToCheck::Realizability);
        assert_eq!((cfg.k_start, cfg.k_bound, cfg.k_step), (0, 2, 1));
        assert!(cfg.critical && cfg.opt1 && cfg.opt2);
        assert_eq!(cfg.group_order, GroupOrder::Flat);
        assert_eq!(cfg.max_iterations, DEFAULT_MAX_ITERATIONS);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validate_k_range() {
        let cfg = SynthesisConfig {
            k_start: 3,
            k_bound: 2,
            ..Default::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigurationError::InvalidKRange {
                start: 3,
                bound: 2,
                step: 1
            })
        );

        let cfg = SynthesisConfig {
            k_step: 0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Method::Compositional.to_string(), "compositional");
        assert_eq!(Direction::Forward.to_string(), "forward");
        assert_eq!(
            GroupOrder::Custom("((a b) c)".into()).to_string(),
            "((a b) c)"
        );
    }

    #[cfg(feature = "config_deserialize")]
    #[test]
    fn test_deserialize() {
        let cfg: SynthesisConfig = serde_json::from_str(
            r#"{
                "starting_player": "System",
                "method": "Compositional",
                "k_bound": 5,
                "group_order": { "Custom": "((a b) c)" }
            }"#,
        )
        .unwrap();

        assert_eq!(cfg.starting_player, Player::System);
        assert_eq!(cfg.method, Method::Compositional);
        assert_eq!(cfg.k_bound, 5);
        assert_eq!(cfg.k_step, 1);
        assert_eq!(cfg.group_order, GroupOrder::Custom("((a b) c)".into()));
    }
}
