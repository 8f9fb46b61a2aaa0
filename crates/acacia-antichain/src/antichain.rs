//! Antichains of partially ordered elements
//!
//! An [`Antichain`] is a finite set of pairwise incomparable elements. It
//! symbolically represents either the downward closure of its elements
//! (keeping maximal elements, [`Extremum::Maximal`]) or their upward closure
//! (keeping minimal elements, [`Extremum::Minimal`]).
//!
//! The set operations mirror the closure they represent: a maximal antichain
//! supports union and intersection of downward closed sets, a minimal antichain
//! is used to collect upward closed sets such as the tuples that are known to
//! be losing.

use std::fmt;

use log::trace;

use crate::partial_ord::{Meet, PartialOrder};

/// Which elements of the represented closure are kept in the antichain
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Extremum {
    /// Keep the maximal elements; the antichain represents a downward closed
    /// set
    Maximal,
    /// Keep the minimal elements; the antichain represents an upward closed
    /// set
    Minimal,
}

/// Set of pairwise incomparable elements
///
/// Inserting an element that is already covered by the antichain leaves it
/// unchanged, inserting an element covering existing elements removes exactly
/// those elements.
#[derive(Debug, Clone, PartialEq)]
pub struct Antichain<T> {
    elements: Vec<T>,
    extremum: Extremum,
}

impl<T: PartialOrder> Default for Antichain<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PartialOrder> Antichain<T> {
    /// Create a new, empty antichain of maximal elements
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
            extremum: Extremum::Maximal,
        }
    }

    /// Create a new, empty antichain of minimal elements
    pub fn new_minimal() -> Self {
        Self {
            elements: Vec::new(),
            extremum: Extremum::Minimal,
        }
    }

    /// Create an antichain of maximal elements holding exactly one element
    pub fn singleton(elem: T) -> Self {
        Self {
            elements: vec![elem],
            extremum: Extremum::Maximal,
        }
    }

    /// Which elements the antichain keeps
    pub fn extremum(&self) -> Extremum {
        self.extremum
    }

    /// Check whether `elem` is covered by `by` in the direction of the antichain
    ///
    /// For a maximal antichain this is `elem <= by`, for a minimal one it is
    /// `elem >= by`.
    #[inline]
    fn is_covered(&self, elem: &T, by: &T) -> bool {
        match self.extremum {
            Extremum::Maximal => elem.is_smaller_or_equal(by),
            Extremum::Minimal => by.is_smaller_or_equal(elem),
        }
    }

    /// Insert an element into the antichain
    ///
    /// Returns `false` and leaves the antichain unchanged if the element is
    /// covered by an element already present. Otherwise all elements covered
    /// by the new one are removed and the element is appended.
    pub fn insert(&mut self, elem: T) -> bool {
        if self.elements.iter().any(|e| self.is_covered(&elem, e)) {
            return false;
        }

        let extremum = self.extremum;
        self.elements.retain(|e| match extremum {
            Extremum::Maximal => !e.is_smaller_or_equal(&elem),
            Extremum::Minimal => !elem.is_smaller_or_equal(e),
        });
        self.elements.push(elem);

        true
    }

    /// Check whether `elem` belongs to the closure represented by the antichain
    ///
    /// For a maximal antichain this checks whether some element is greater or
    /// equal to `elem`, for a minimal antichain whether some element is smaller
    /// or equal.
    pub fn contains_element(&self, elem: &T) -> bool {
        self.elements.iter().any(|e| self.is_covered(elem, e))
    }

    /// Find an element of the antichain covering `elem`
    pub fn find_covering(&self, elem: &T) -> Option<&T> {
        self.elements.iter().find(|e| self.is_covered(elem, e))
    }

    /// Check whether every element of `self` is contained in the closure of
    /// `other`
    pub fn covered_by(&self, other: &Self) -> bool {
        self.elements.iter().all(|e| other.contains_element(e))
    }

    /// Check whether both antichains represent the same closure
    pub fn equivalent(&self, other: &Self) -> bool {
        self.covered_by(other) && other.covered_by(self)
    }

    /// Number of elements in the antichain
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Check whether the antichain has no element
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Iterate over the elements of the antichain
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.elements.iter()
    }

    /// Retain only the elements for which `f` returns true
    pub fn retain<F>(&mut self, f: F)
    where
        F: FnMut(&T) -> bool,
    {
        self.elements.retain(f);
    }

    /// Transform every element with `f` and collect the results into a new
    /// antichain of the same kind
    pub fn map<U: PartialOrder, F: FnMut(&T) -> U>(&self, f: F) -> Antichain<U> {
        let mut res = Antichain {
            elements: Vec::with_capacity(self.len()),
            extremum: self.extremum,
        };
        res.extend(self.elements.iter().map(f));
        res
    }
}

impl<T: PartialOrder + Clone> Antichain<T> {
    /// Union of the closures of two antichains
    pub fn union(&self, other: &Self) -> Self {
        let mut res = self.clone();
        res.extend(other.iter().cloned());
        res
    }

    /// Add all elements of `other` to `self`
    pub fn union_with(&mut self, other: Self) {
        self.extend(other);
    }
}

impl<T: PartialOrder + Meet + Clone> Antichain<T> {
    /// Intersection of the downward closures of two maximal antichains
    ///
    /// If one antichain is covered by the other, the result is a copy of the
    /// covered one. Otherwise, elements covered by the other antichain are
    /// taken directly and all remaining pairs are intersected using
    /// [`Meet::meet`].
    pub fn intersection(&self, other: &Self) -> Self {
        debug_assert_eq!(
            self.extremum,
            Extremum::Maximal,
            "Intersection is only defined on downward closed sets"
        );

        let self_covered = self
            .elements
            .iter()
            .map(|e| other.contains_element(e))
            .collect::<Vec<_>>();
        if self_covered.iter().all(|c| *c) {
            return self.clone();
        }

        let other_covered = other
            .elements
            .iter()
            .map(|e| self.contains_element(e))
            .collect::<Vec<_>>();
        if other_covered.iter().all(|c| *c) {
            return other.clone();
        }

        let mut res = Self::new();
        for (e, _) in self.iter().zip(&self_covered).filter(|(_, c)| **c) {
            res.insert(e.clone());
        }
        for (e, _) in other.iter().zip(&other_covered).filter(|(_, c)| **c) {
            res.insert(e.clone());
        }

        for (e1, _) in self.iter().zip(&self_covered).filter(|(_, c)| !**c) {
            for (e2, _) in other.iter().zip(&other_covered).filter(|(_, c)| !**c) {
                res.insert(e1.meet(e2));
            }
        }

        trace!(
            "Intersection of antichains of size {} and {} has size {}",
            self.len(),
            other.len(),
            res.len()
        );

        res
    }
}

impl<T: PartialOrder> Antichain<T> {
    /// Compose several antichains into one using their Cartesian product
    ///
    /// Each combination of one element per antichain is turned into a single
    /// element by `compose`. The last antichain varies fastest. If any of the
    /// antichains is empty, so is the result.
    pub fn compose<U, F>(antichains: &[&Antichain<U>], mut compose: F) -> Self
    where
        U: PartialOrder,
        F: FnMut(&[&U]) -> T,
    {
        let mut res = Self::new();
        if antichains.is_empty() || antichains.iter().any(|a| a.is_empty()) {
            return res;
        }

        let mut idx = vec![0usize; antichains.len()];
        loop {
            let combination = antichains
                .iter()
                .zip(idx.iter())
                .map(|(a, i)| &a.elements[*i])
                .collect::<Vec<_>>();
            res.insert(compose(&combination));

            // advance the mixed radix counter, last position first
            let mut pos = antichains.len();
            loop {
                if pos == 0 {
                    return res;
                }
                pos -= 1;
                idx[pos] += 1;
                if idx[pos] < antichains[pos].len() {
                    break;
                }
                idx[pos] = 0;
            }
        }
    }
}

impl<T: PartialOrder> Extend<T> for Antichain<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for elem in iter {
            self.insert(elem);
        }
    }
}

impl<T: PartialOrder> FromIterator<T> for Antichain<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut res = Self::new();
        res.extend(iter);
        res
    }
}

impl<T: PartialOrder> IntoIterator for Antichain<T> {
    type Item = T;

    type IntoIter = <Vec<T> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}

impl<'a, T: PartialOrder> IntoIterator for &'a Antichain<T> {
    type Item = &'a T;

    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl<T: fmt::Display> fmt::Display for Antichain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Antichain of size {}:", self.elements.len())?;
        for e in self.elements.iter() {
            writeln!(f, "  {e}")?;
        }
        Ok(())
    }
}
