//! Synthesis problems
//!
//! A [`SynthesisProblem`] bundles the alphabet, the co-Büchi automata of the
//! specification units, optionally the automata of the negated
//! specification and the cost parameters. It builds the turn-based automata
//! the search runs on.

use acacia_automaton::{
    Player,
    alphabet::Alphabet,
    cobuchi::CoBuchiAutomaton,
    preprocessing::{BoundedStates, Preprocessor},
    turn_based::{
        TurnBasedAutomaton,
        builder::{AutomatonBuildError, TurnBasedAutomatonBuilder},
    },
    weights::{CostParameters, Weights},
};
use log::info;

use crate::{
    config::{Method, SynthesisConfig},
    error::ConfigurationError,
};

/// Realizability problem over a fixed alphabet
#[derive(Debug, Clone)]
pub struct SynthesisProblem {
    alphabet: Alphabet,
    costs: CostParameters,
    specifications: Vec<CoBuchiAutomaton>,
    negated: Vec<CoBuchiAutomaton>,
}

impl SynthesisProblem {
    /// Create a problem without costs from the automata of the specification
    /// units
    pub fn new(alphabet: Alphabet, specifications: Vec<CoBuchiAutomaton>) -> Self {
        Self {
            alphabet,
            costs: CostParameters::default(),
            specifications,
            negated: Vec::new(),
        }
    }

    /// Attach cost parameters
    ///
    /// Missing vectors are filled with their defaults.
    pub fn with_costs(mut self, costs: CostParameters) -> Result<Self, ConfigurationError> {
        self.costs = costs.complete(&self.alphabet)?;
        Ok(self)
    }

    /// Attach the automata of the negated specification, needed to check
    /// unrealizability
    pub fn with_negated(mut self, negated: Vec<CoBuchiAutomaton>) -> Self {
        self.negated = negated;
        self
    }

    /// Alphabet of the problem
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Cost parameters of the problem
    pub fn costs(&self) -> &CostParameters {
        &self.costs
    }

    /// Automata of the specification units
    pub fn specifications(&self) -> &[CoBuchiAutomaton] {
        &self.specifications
    }

    /// Automata of the negated specification
    pub fn negated(&self) -> &[CoBuchiAutomaton] {
        &self.negated
    }

    /// Number of cost dimensions
    pub fn dimension(&self) -> usize {
        self.costs.dimension()
    }

    /// Turn-based automata of the specification units
    ///
    /// The monolithic method yields a single automaton for all units, the
    /// compositional one an automaton per unit. Weights are only attached if
    /// `with_costs` is set.
    pub fn turn_based_automata(
        &self,
        config: &SynthesisConfig,
        method: Method,
        with_costs: bool,
    ) -> Result<Vec<TurnBasedAutomaton>, ConfigurationError> {
        if self.specifications.is_empty() {
            return Err(ConfigurationError::NoSpecification);
        }

        let weights = with_costs
            .then(|| self.costs.weights(&self.alphabet))
            .transpose()?;
        let player = config.starting_player;
        let automata = match method {
            Method::Monolithic => vec![build(
                &self.specifications,
                self.alphabet.clone(),
                player,
                weights,
                config.opt1,
            )?],
            Method::Compositional => self
                .specifications
                .iter()
                .map(|spec| {
                    build(
                        std::slice::from_ref(spec),
                        self.alphabet.clone(),
                        player,
                        weights.clone(),
                        config.opt1,
                    )
                })
                .collect::<Result<Vec<_>, _>>()?,
        };
        Ok(automata)
    }

    /// Turn-based automaton of the negated specification
    ///
    /// Inputs and outputs are exchanged and the other player starts: the
    /// environment of the original problem is the player synthesized for.
    pub fn negated_automaton(
        &self,
        config: &SynthesisConfig,
    ) -> Result<TurnBasedAutomaton, ConfigurationError> {
        if self.negated.is_empty() {
            return Err(ConfigurationError::MissingNegatedSpecification);
        }

        Ok(build(
            &self.negated,
            self.alphabet.swapped(),
            config.starting_player.other(),
            None,
            config.opt1,
        )?)
    }
}

fn build(
    specifications: &[CoBuchiAutomaton],
    alphabet: Alphabet,
    starting_player: Player,
    weights: Option<Weights>,
    opt1: bool,
) -> Result<TurnBasedAutomaton, AutomatonBuildError> {
    let mut automata = specifications.to_vec();
    if opt1 {
        let preprocessor = BoundedStates::new();
        for aut in automata.iter_mut() {
            preprocessor.process(aut);
        }
    }

    let mut builder = TurnBasedAutomatonBuilder::new(alphabet, starting_player);
    if let Some(weights) = weights {
        builder = builder.with_weights(weights)?;
    }
    let tbucw = builder.with_automata(automata)?.build()?;

    info!(
        "Turn-based automaton for '{}': {} states, {} accepting, {} turn states",
        tbucw.name(),
        tbucw.len(),
        tbucw.n_accepting_states(),
        tbucw.n_turn_states()
    );
    Ok(tbucw)
}

#[cfg(test)]
mod tests {
    use acacia_automaton::{
        Player,
        alphabet::Alphabet,
        cobuchi::{CoBuchiAutomaton, CoBuchiAutomatonBuilder},
        label::Guard,
        weights::CostParameters,
    };

    use crate::{
        config::{Method, SynthesisConfig},
        error::ConfigurationError,
        problem::SynthesisProblem,
    };

    fn safe(name: &str) -> CoBuchiAutomaton {
        CoBuchiAutomatonBuilder::new(name)
            .with_state("init", false)
            .unwrap()
            .with_initial_state("init")
            .unwrap()
            .with_edge("init", Guard::tautology(), "init")
            .unwrap()
            .build()
            .unwrap()
    }

    fn problem() -> SynthesisProblem {
        SynthesisProblem::new(
            Alphabet::new(["r"], ["g"]).unwrap(),
            vec![safe("a"), safe("b")],
        )
    }

    #[test]
    fn test_monolithic_and_compositional() {
        let cfg = SynthesisConfig::default();

        let automata = problem()
            .turn_based_automata(&cfg, Method::Monolithic, false)
            .unwrap();
        assert_eq!(automata.len(), 1);
        assert_eq!(automata[0].name(), "a&b");

        let automata = problem()
            .turn_based_automata(&cfg, Method::Compositional, false)
            .unwrap();
        assert_eq!(automata.len(), 2);
        assert_eq!(automata[1].name(), "b");
        assert_eq!(automata[1].starting_player(), Player::Environment);
    }

    #[test]
    fn test_negated_automaton_swaps_players() {
        let cfg = SynthesisConfig::default();

        assert_eq!(
            problem().negated_automaton(&cfg).unwrap_err(),
            ConfigurationError::MissingNegatedSpecification
        );

        let tbucw = problem()
            .with_negated(vec![safe("not_a")])
            .negated_automaton(&cfg)
            .unwrap();
        assert_eq!(tbucw.starting_player(), Player::System);
        assert_eq!(tbucw.alphabet().inputs(), &["g".to_string()]);
        assert_eq!(tbucw.alphabet().outputs(), &["r".to_string()]);
    }

    #[test]
    fn test_costs() {
        let cfg = SynthesisConfig::default();
        let problem = problem()
            .with_costs(CostParameters {
                values_output: vec![vec![1]],
                nu: vec![(1, 2)],
                ..Default::default()
            })
            .unwrap();

        assert_eq!(problem.dimension(), 1);
        let automata = problem
            .turn_based_automata(&cfg, Method::Monolithic, true)
            .unwrap();
        assert_eq!(automata[0].weights().dimension(), 1);

        let automata = problem
            .turn_based_automata(&cfg, Method::Monolithic, false)
            .unwrap();
        assert_eq!(automata[0].weights().dimension(), 0);
    }

    #[test]
    fn test_no_specification() {
        let problem = SynthesisProblem::new(Alphabet::new(["r"], ["g"]).unwrap(), vec![]);
        assert_eq!(
            problem
                .turn_based_automata(&SynthesisConfig::default(), Method::Monolithic, false)
                .unwrap_err(),
            ConfigurationError::NoSpecification
        );
    }
}
