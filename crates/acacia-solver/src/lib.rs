//! Antichain-based safety game solvers
//!
//! Bounded synthesis reduces the realizability of a specification, given as
//! universal co-Büchi automata, to a safety game: a position records, for
//! every state of the automata, the maximal number of accepting states
//! visited on a run reaching it (a counting function), together with the
//! credit left for each mean-payoff dimension. The system wins if no counter
//! ever exceeds `K` and no credit runs out.
//!
//! Winning positions of the system are closed downwards, so the solvers
//! represent them by antichains of maximal [`tuple::Tuple`]s:
//!
//! - [`backward::BackwardSolver`] computes the greatest fixpoint of the
//!   controllable predecessor operators,
//! - [`forward::ForwardSolver`] explores the positions reachable from the
//!   initial one on the fly.
//!
//! Both solvers start from and return a [`safety_game::SafetyGame`].

#![warn(missing_docs)]

pub mod backward;
pub mod counting;
pub mod credit;
pub mod forward;
pub mod safety_game;
pub mod tuple;

pub use backward::{BackwardSolver, FixpointReport};
pub use counting::{CfInfo, CountingFunction};
pub use forward::{ForwardSolver, OtfurReport};
pub use safety_game::SafetyGame;
pub use tuple::Tuple;
