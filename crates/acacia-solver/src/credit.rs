//! Credit vectors for mean-payoff objectives
//!
//! A [`CreditVector`] holds, for every cost dimension, the credit the system
//! still has, together with the cap the credit saturates at. A credit of
//! `-1` means the credit ran out: the position is losing.

use std::{
    fmt,
    hash::{Hash, Hasher},
};

use acacia_antichain::{Meet, PartialOrdCompResult, PartialOrder};

/// Add `n` to the credit `c`, saturating at `cap`
///
/// Returns `-1` if the credit was already exhausted or would become negative.
fn oplus(c: i32, n: i32, cap: i32) -> i32 {
    if c == -1 || c + n < 0 {
        -1
    } else {
        (c + n).min(cap)
    }
}

/// Credits and their caps, one entry per cost dimension
///
/// Equality and hashing only consider the credits, not the caps.
#[derive(Debug, Clone)]
pub struct CreditVector {
    values: Vec<i32>,
    caps: Vec<i32>,
}

impl CreditVector {
    /// Create a credit vector
    pub fn new(values: Vec<i32>, caps: Vec<i32>) -> Self {
        debug_assert_eq!(values.len(), caps.len());
        Self { values, caps }
    }

    /// Credit vector with all credits set to zero
    pub fn zero(caps: &[i32]) -> Self {
        Self::new(vec![0; caps.len()], caps.to_vec())
    }

    /// Credit vector with all credits set to their cap
    pub fn full(caps: &[i32]) -> Self {
        Self::new(caps.to_vec(), caps.to_vec())
    }

    /// Credits
    pub fn values(&self) -> &[i32] {
        &self.values
    }

    /// Caps of the credits
    pub fn caps(&self) -> &[i32] {
        &self.caps
    }

    /// Number of cost dimensions
    pub fn dimension(&self) -> usize {
        self.values.len()
    }

    /// Check whether the credit of some dimension ran out
    pub fn is_exhausted(&self) -> bool {
        self.values.iter().any(|v| *v < 0)
    }

    /// Credits after a move with weight vector `weight`
    ///
    /// Dimensions missing in `weight` count as weight 0.
    pub fn succ(&self, weight: &[i32]) -> Self {
        let values = self
            .values
            .iter()
            .zip(self.caps.iter())
            .enumerate()
            .map(|(d, (c, cap))| oplus(*c, weight.get(d).copied().unwrap_or(0), *cap))
            .collect();
        Self::new(values, self.caps.clone())
    }

    /// Smallest credits that still allow a move with weight `weight` to end
    /// with credits `self`
    ///
    /// Returns `None` if the required credit exceeds the cap of some
    /// dimension.
    pub fn omega(&self, weight: &[i32]) -> Option<Self> {
        let mut values = Vec::with_capacity(self.values.len());
        for (d, (v, cap)) in self.values.iter().zip(self.caps.iter()).enumerate() {
            let w = weight.get(d).copied().unwrap_or(0);
            if w >= 0 {
                values.push((v - w).max(0));
            } else if v - w > *cap {
                return None;
            } else {
                values.push(v - w);
            }
        }
        Some(Self::new(values, self.caps.clone()))
    }

    /// Combine the credits of several games into one vector
    ///
    /// Credits and caps are combined by their component-wise maximum.
    pub fn compose(credits: &[&CreditVector]) -> Self {
        let mut iter = credits.iter();
        let Some(first) = iter.next() else {
            return Self::new(Vec::new(), Vec::new());
        };
        iter.fold((*first).clone(), |acc, c| acc.meet(c))
    }
}

impl PartialEq for CreditVector {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl Eq for CreditVector {}

impl Hash for CreditVector {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.values.hash(state);
    }
}

impl PartialOrder for CreditVector {
    fn part_cmp(&self, other: &Self) -> PartialOrdCompResult {
        self.values.part_cmp(&other.values)
    }

    fn is_smaller_or_equal(&self, other: &Self) -> bool {
        self.values
            .iter()
            .zip(other.values.iter())
            .all(|(a, b)| a <= b)
    }
}

/// The meet in the tuple order: credits are ordered reversely, so the
/// greatest lower bound takes the larger credit
impl Meet for CreditVector {
    fn meet(&self, other: &Self) -> Self {
        let values = self
            .values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| *a.max(b))
            .collect();
        let caps = self
            .caps
            .iter()
            .zip(other.caps.iter())
            .map(|(a, b)| *a.max(b))
            .collect();
        Self::new(values, caps)
    }
}

impl fmt::Display for CreditVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.values)
    }
}
