//! Bounded synthesis of specifications given as universal co-Büchi automata
//!
//! A [`problem::SynthesisProblem`] is checked by a
//! [`search::CompositionEngine`] for increasing values of `K`, the number of
//! visits to accepting states tolerated on every run. Specifications made of
//! several units can be checked compositionally: the games of the units are
//! solved separately and composed along a [`group_order::GroupOrderTree`].
//!
//! ```
//! use acacia_automaton::{alphabet::Alphabet, cobuchi::CoBuchiAutomatonBuilder, label::Guard};
//! use acacia_synthesis::{CompositionEngine, SynthesisConfig, SynthesisProblem};
//!
//! let aut = CoBuchiAutomatonBuilder::new("safe")
//!     .with_state("init", false)
//!     .unwrap()
//!     .with_initial_state("init")
//!     .unwrap()
//!     .with_edge("init", Guard::tautology(), "init")
//!     .unwrap()
//!     .build()
//!     .unwrap();
//! let problem = SynthesisProblem::new(Alphabet::new(["r"], ["g"]).unwrap(), vec![aut]);
//!
//! let mut engine = CompositionEngine::new(SynthesisConfig::default()).unwrap();
//! let outcome = engine.synthesize(&problem).unwrap();
//! assert!(outcome.is_realizable());
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod group_order;
pub mod problem;
pub mod search;

pub use config::{Direction, GroupOrder, Method, SynthesisConfig, ToCheck};
pub use error::{ConfigurationError, InternalInconsistency, SynthesisError};
pub use problem::SynthesisProblem;
pub use search::{CompositionEngine, CreditSchedule, Outcome, SolveReport};
