//! Partial orders and lattice meets
//!
//! Elements stored in an antichain are only partially ordered, so the standard
//! [`PartialOrd`] trait (which ties the order to `PartialEq`) does not fit:
//! two tuples can be equal in the order while differing in fields that the
//! order ignores. This module defines the [`PartialOrder`] trait used
//! throughout the solver instead, together with the [`Meet`] trait needed to
//! intersect downward closed sets.

use core::fmt;

/// Outcome of comparing an object `a` with an object `b` in a partial order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PartialOrdCompResult {
    /// Neither `a <= b` nor `b <= a`
    Incomparable,
    /// `a < b`
    Smaller,
    /// `a <= b` and `b <= a`
    Equal,
    /// `a > b`
    Greater,
}

impl PartialOrdCompResult {
    /// Combine the comparison results of two components of a product order
    ///
    /// The product of two components is smaller (greater) if one component is
    /// smaller (greater) and the other one is not greater (smaller).
    #[inline(always)]
    pub fn combine(self, other: Self) -> Self {
        use PartialOrdCompResult::*;

        match (self, other) {
            (Equal, res) | (res, Equal) => res,
            (Smaller, Smaller) => Smaller,
            (Greater, Greater) => Greater,
            _ => Incomparable,
        }
    }

    /// Result of the comparison with swapped arguments
    pub fn reverse(self) -> Self {
        match self {
            PartialOrdCompResult::Smaller => PartialOrdCompResult::Greater,
            PartialOrdCompResult::Greater => PartialOrdCompResult::Smaller,
            res => res,
        }
    }

    /// Check whether the result is `Smaller` or `Equal`
    pub fn is_le(self) -> bool {
        matches!(
            self,
            PartialOrdCompResult::Smaller | PartialOrdCompResult::Equal
        )
    }

    /// Check whether the result is `Greater` or `Equal`
    pub fn is_ge(self) -> bool {
        matches!(
            self,
            PartialOrdCompResult::Greater | PartialOrdCompResult::Equal
        )
    }
}

impl fmt::Display for PartialOrdCompResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartialOrdCompResult::Incomparable => write!(f, "≠"),
            PartialOrdCompResult::Smaller => write!(f, "<"),
            PartialOrdCompResult::Equal => write!(f, "=="),
            PartialOrdCompResult::Greater => write!(f, ">"),
        }
    }
}

/// Trait for types implementing a partial order
///
/// Implementors only need to provide [`PartialOrder::part_cmp`]. Types with a
/// cheaper test for `<=` (for example by rejecting on a cached summary first)
/// should override [`PartialOrder::is_smaller_or_equal`], which is the
/// operation antichains use most.
pub trait PartialOrder {
    /// Compare `self` with `other`
    fn part_cmp(&self, other: &Self) -> PartialOrdCompResult;

    /// Check whether `self <= other`
    fn is_smaller_or_equal(&self, other: &Self) -> bool {
        self.part_cmp(other).is_le()
    }

    /// Check whether `self >= other`
    fn is_greater_or_equal(&self, other: &Self) -> bool {
        other.is_smaller_or_equal(self)
    }
}

/// Greatest lower bound of two elements
///
/// For two elements `a` and `b`, `a.meet(b)` must be smaller or equal to both
/// and greater or equal to every other common lower bound.
pub trait Meet {
    /// Compute the greatest lower bound of `self` and `other`
    fn meet(&self, other: &Self) -> Self;
}

macro_rules! impl_total_orders {
    ( $( $ty:ty )* ) => {
        $(
            impl PartialOrder for $ty {
                #[inline]
                fn part_cmp(&self, other: &Self) -> PartialOrdCompResult {
                    match self.cmp(other) {
                        std::cmp::Ordering::Less => PartialOrdCompResult::Smaller,
                        std::cmp::Ordering::Equal => PartialOrdCompResult::Equal,
                        std::cmp::Ordering::Greater => PartialOrdCompResult::Greater,
                    }
                }

                #[inline]
                fn is_smaller_or_equal(&self, other: &Self) -> bool {
                    self <= other
                }
            }

            impl Meet for $ty {
                #[inline]
                fn meet(&self, other: &Self) -> Self {
                    *self.min(other)
                }
            }
        )*
    };
}

impl_total_orders!(usize i8 u8 i16 u16 i32 u32 i64 u64);

/// Vectors are ordered component-wise; vectors of different length are
/// incomparable.
impl<T: PartialOrder> PartialOrder for Vec<T> {
    fn part_cmp(&self, other: &Self) -> PartialOrdCompResult {
        if self.len() != other.len() {
            return PartialOrdCompResult::Incomparable;
        }

        self.iter()
            .zip(other.iter())
            .map(|(a, b)| a.part_cmp(b))
            .try_fold(PartialOrdCompResult::Equal, |acc, cmp| {
                match acc.combine(cmp) {
                    PartialOrdCompResult::Incomparable => Err(()),
                    res => Ok(res),
                }
            })
            .unwrap_or(PartialOrdCompResult::Incomparable)
    }

    fn is_smaller_or_equal(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other.iter())
                .all(|(a, b)| a.is_smaller_or_equal(b))
    }
}

impl<T: Meet> Meet for Vec<T> {
    fn meet(&self, other: &Self) -> Self {
        debug_assert_eq!(self.len(), other.len(), "Meet of vectors of different size");
        self.iter().zip(other.iter()).map(|(a, b)| a.meet(b)).collect()
    }
}
