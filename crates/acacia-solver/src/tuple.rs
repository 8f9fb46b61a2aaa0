//! Game positions
//!
//! A [`Tuple`] pairs a counting function with a credit vector. Tuples are
//! ordered by `(f1, c1) <= (f2, c2)` iff `f1 <= f2` and `c2 <= c1`: a
//! position is smaller if fewer accepting visits were made and more credit
//! is left. Winning positions for the system are closed downwards in this
//! order, so they are represented by antichains of maximal tuples.

use std::fmt;

use acacia_antichain::{Antichain, Meet, PartialOrdCompResult, PartialOrder};
use acacia_automaton::{Player, alphabet::Valuation};

use crate::{
    counting::{CfInfo, CountingFunction},
    credit::CreditVector,
};

/// Position of the safety game
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tuple {
    cf: CountingFunction,
    credits: CreditVector,
}

impl Tuple {
    /// Create a new tuple
    pub fn new(cf: CountingFunction, credits: CreditVector) -> Self {
        Self { cf, credits }
    }

    /// Counting function of the tuple
    pub fn cf(&self) -> &CountingFunction {
        &self.cf
    }

    /// Credits of the tuple
    pub fn credits(&self) -> &CreditVector {
        &self.credits
    }

    /// Player moving next
    pub fn player(&self) -> Player {
        self.cf.player()
    }

    /// Greatest tuple of `player`: maximal counting function and no credit
    pub fn build_maximal(info: &CfInfo, player: Player, caps: &[i32]) -> Self {
        Self::new(info.build_maximal(player), CreditVector::zero(caps))
    }

    /// Initial position: initial counting function and full credit
    pub fn build_initial(info: &CfInfo, caps: &[i32]) -> Self {
        Self::new(info.build_initial(), CreditVector::full(caps))
    }

    /// Position reached when the player moving next plays `sigma`
    pub fn succ(&self, info: &CfInfo, sigma: Valuation) -> Self {
        let weight = info.weights().of(self.player(), sigma);
        Self::new(info.succ(&self.cf, sigma), self.credits.succ(weight))
    }

    /// Greatest position of the other player from which playing `sigma`
    /// leads to a position smaller or equal to `self`
    ///
    /// Returns `None` if no credit within the caps suffices.
    pub fn omega(&self, info: &CfInfo, sigma: Valuation) -> Option<Self> {
        let weight = info.weights().of(self.player().other(), sigma);
        let credits = self.credits.omega(weight)?;
        Some(Self::new(info.omega(&self.cf, sigma), credits))
    }

    /// Minimal successors over all moves of the player moving next
    pub fn min_succ(&self, info: &CfInfo) -> Antichain<Self> {
        let mut res = Antichain::new_minimal();
        res.extend(
            info.alphabet()
                .valuations(self.player())
                .map(|sigma| self.succ(info, sigma)),
        );
        res
    }

    /// Maximal successors over all moves of the player moving next
    pub fn max_succ(&self, info: &CfInfo) -> Antichain<Self> {
        info.alphabet()
            .valuations(self.player())
            .map(|sigma| self.succ(info, sigma))
            .collect()
    }

    /// Combine tuples of several games into a tuple of their composition
    pub fn compose(tuples: &[&Tuple]) -> Self {
        let cfs = tuples.iter().map(|t| &t.cf).collect::<Vec<_>>();
        let credits = tuples.iter().map(|t| &t.credits).collect::<Vec<_>>();
        Self::new(
            CountingFunction::compose(&cfs),
            CreditVector::compose(&credits),
        )
    }

    /// Same counting function, with no credit and caps `caps`
    pub fn with_credits(&self, caps: &[i32]) -> Self {
        Self::new(self.cf.clone(), CreditVector::zero(caps))
    }
}

impl PartialOrder for Tuple {
    fn part_cmp(&self, other: &Self) -> PartialOrdCompResult {
        self.cf
            .part_cmp(&other.cf)
            .combine(self.credits.part_cmp(&other.credits).reverse())
    }

    fn is_smaller_or_equal(&self, other: &Self) -> bool {
        self.cf.is_smaller_or_equal(&other.cf) && other.credits.is_smaller_or_equal(&self.credits)
    }
}

impl Meet for Tuple {
    fn meet(&self, other: &Self) -> Self {
        Self::new(self.cf.meet(&other.cf), self.credits.meet(&other.credits))
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.credits.dimension() == 0 {
            write!(f, "{}", self.cf)
        } else {
            write!(f, "{} {}", self.cf, self.credits)
        }
    }
}
