//! Antichains over partially ordered elements
//!
//! This crate provides the [`PartialOrder`] and [`Meet`] traits and the
//! [`Antichain`] container that the safety game solvers use to represent
//! downward closed (or upward closed) sets of game positions by their maximal
//! (or minimal) elements.

#![warn(missing_docs)]

pub mod antichain;
pub mod partial_ord;

pub use antichain::{Antichain, Extremum};
pub use partial_ord::{Meet, PartialOrdCompResult, PartialOrder};
