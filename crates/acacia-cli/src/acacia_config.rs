//! Module for the configuration of the synthesis procedure from files and
//! environment variables.
//!
//! Every option of the synthesis procedure can be set in a configuration file
//! or through an environment variable with the prefix `ACACIA`, e.g.
//! `ACACIA_K_BOUND=5`. Options given on the command line take precedence.

use serde::Deserialize;

use acacia_automaton::Player;
use acacia_synthesis::{Direction, GroupOrder, Method, SynthesisConfig, ToCheck};

/// Type representing configuration options for the synthesis procedure
///
/// All fields are optional, missing ones keep the defaults of
/// [`SynthesisConfig`]. This type implements `serde::Deserialize` to easily
/// parse the configuration out of structured configuration.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct AcaciaConfig {
    /// Player making the first move
    starting_player: Option<Player>,
    /// Monolithic or compositional checking
    method: Option<Method>,
    /// Algorithm solving the safety games
    direction: Option<Direction>,
    /// Verdicts to check
    to_check: Option<ToCheck>,
    /// First value of `K`
    k_start: Option<usize>,
    /// Largest value of `K`
    k_bound: Option<usize>,
    /// Increment of `K`
    k_step: Option<usize>,
    /// Critical signals optimization
    critical: Option<bool>,
    /// Bounded states optimization
    opt1: Option<bool>,
    /// Surely losing states optimization
    opt2: Option<bool>,
    /// Composition order of the specification units
    group_order: Option<GroupOrder>,
    /// Maximal number of attempts in one search
    max_iterations: Option<usize>,
}

impl AcaciaConfig {
    /// Set the starting player
    pub fn set_starting_player(&mut self, player: Player) {
        self.starting_player = Some(player);
    }

    /// Set the checking method
    pub fn set_method(&mut self, method: Method) {
        self.method = Some(method);
    }

    /// Set the solving algorithm
    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = Some(direction);
    }

    /// Set the verdicts to check
    pub fn set_to_check(&mut self, to_check: ToCheck) {
        self.to_check = Some(to_check);
    }

    /// Override the given bounds on `K`
    pub fn set_k_range(&mut self, start: Option<usize>, bound: Option<usize>, step: Option<usize>) {
        self.k_start = start.or(self.k_start);
        self.k_bound = bound.or(self.k_bound);
        self.k_step = step.or(self.k_step);
    }

    /// Turn off the critical signals optimization
    pub fn disable_critical(&mut self) {
        self.critical = Some(false);
    }

    /// Turn off the bounded states optimization
    pub fn disable_opt1(&mut self) {
        self.opt1 = Some(false);
    }

    /// Turn off the surely losing states optimization
    pub fn disable_opt2(&mut self) {
        self.opt2 = Some(false);
    }

    /// Set the group order
    pub fn set_group_order(&mut self, order: GroupOrder) {
        self.group_order = Some(order);
    }

    /// Configuration of the synthesis procedure, with defaults for every
    /// option not set
    pub fn synthesis_config(&self) -> SynthesisConfig {
        let default = SynthesisConfig::default();
        SynthesisConfig {
            starting_player: self.starting_player.unwrap_or(default.starting_player),
            method: self.method.unwrap_or(default.method),
            direction: self.direction.unwrap_or(default.direction),
            to_check: self.to_check.unwrap_or(default.to_check),
            k_start: self.k_start.unwrap_or(default.k_start),
            k_bound: self.k_bound.unwrap_or(default.k_bound),
            k_step: self.k_step.unwrap_or(default.k_step),
            critical: self.critical.unwrap_or(default.critical),
            opt1: self.opt1.unwrap_or(default.opt1),
            opt2: self.opt2.unwrap_or(default.opt2),
            group_order: self.group_order.clone().unwrap_or(default.group_order),
            max_iterations: self.max_iterations.unwrap_or(default.max_iterations),
        }
    }
}
