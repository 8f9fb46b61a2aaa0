//! Composition trees
//!
//! A [`GroupOrderTree`] fixes the order in which the games of several
//! specification units are composed. Leaves are specification names, inner
//! nodes compose the games of their children. Trees are built from a
//! [`GroupOrder`]: the flat order puts every unit below the root, the binary
//! order pairs consecutive units and custom orders are parsed from a
//! parenthesized expression such as `((a b) (c d) e)`.

use std::{collections::HashSet, fmt};

use crate::{config::GroupOrder, error::ConfigurationError};

/// Tree over the names of specification units
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupOrderTree {
    /// A specification unit
    Leaf(String),
    /// Composition of the children
    Node(Vec<GroupOrderTree>),
}

impl GroupOrderTree {
    /// Build the tree of `order` over the specification units `names`
    ///
    /// A single unit always yields a leaf. Every unit must appear exactly
    /// once in the tree.
    pub fn build(order: &GroupOrder, names: &[String]) -> Result<Self, ConfigurationError> {
        if names.is_empty() {
            return Err(ConfigurationError::NoSpecification);
        }
        if names.len() == 1 {
            return Ok(GroupOrderTree::Leaf(names[0].clone()));
        }

        let tree = match order {
            GroupOrder::Flat => Self::flat(names),
            GroupOrder::Binary => Self::binary(names),
            GroupOrder::Custom(order) => Self::parse(order)?,
        };
        tree.check_leaves(names)?;
        Ok(tree)
    }

    fn flat(names: &[String]) -> Self {
        GroupOrderTree::Node(names.iter().cloned().map(GroupOrderTree::Leaf).collect()).collapse()
    }

    fn binary(names: &[String]) -> Self {
        let children = names
            .chunks(2)
            .map(|pair| match pair {
                [single] => GroupOrderTree::Leaf(single.clone()),
                _ => GroupOrderTree::Node(pair.iter().cloned().map(GroupOrderTree::Leaf).collect()),
            })
            .collect();
        GroupOrderTree::Node(children).collapse()
    }

    /// Parse a parenthesized group order
    ///
    /// Names are separated by whitespace. If the expression does not consist
    /// of a single group, it is wrapped into one. Groups with a single child
    /// are replaced by their child.
    pub fn parse(order: &str) -> Result<Self, ConfigurationError> {
        fn flush(name: &mut String, items: &mut Vec<GroupOrderTree>) {
            if !name.is_empty() {
                items.push(GroupOrderTree::Leaf(std::mem::take(name)));
            }
        }

        let mut parents: Vec<Vec<GroupOrderTree>> = Vec::new();
        let mut current: Vec<GroupOrderTree> = Vec::new();
        let mut name = String::new();

        for c in order.chars() {
            match c {
                '(' => {
                    flush(&mut name, &mut current);
                    parents.push(std::mem::take(&mut current));
                }
                ')' => {
                    flush(&mut name, &mut current);
                    let Some(parent) = parents.pop() else {
                        return Err(ConfigurationError::TooManyRightParentheses);
                    };
                    let children = std::mem::replace(&mut current, parent);
                    if children.is_empty() {
                        return Err(ConfigurationError::EmptyGroup);
                    }
                    current.push(GroupOrderTree::Node(children));
                }
                c if c.is_whitespace() => flush(&mut name, &mut current),
                c => name.push(c),
            }
        }
        flush(&mut name, &mut current);

        if !parents.is_empty() {
            return Err(ConfigurationError::TooManyLeftParentheses);
        }
        if current.is_empty() {
            return Err(ConfigurationError::EmptyGroup);
        }

        let tree = if current.len() == 1 {
            current.remove(0)
        } else {
            GroupOrderTree::Node(current)
        };
        Ok(tree.collapse())
    }

    /// Replace every node with a single child by that child
    fn collapse(self) -> Self {
        match self {
            GroupOrderTree::Leaf(_) => self,
            GroupOrderTree::Node(mut children) if children.len() == 1 => {
                children.remove(0).collapse()
            }
            GroupOrderTree::Node(children) => {
                GroupOrderTree::Node(children.into_iter().map(Self::collapse).collect())
            }
        }
    }

    /// Names of the leaves, from left to right
    pub fn leaves(&self) -> Vec<&str> {
        match self {
            GroupOrderTree::Leaf(name) => vec![name.as_str()],
            GroupOrderTree::Node(children) => children.iter().flat_map(|c| c.leaves()).collect(),
        }
    }

    /// Check whether the tree is a single specification unit
    pub fn is_leaf(&self) -> bool {
        matches!(self, GroupOrderTree::Leaf(_))
    }

    fn check_leaves(&self, names: &[String]) -> Result<(), ConfigurationError> {
        let leaves = self.leaves();
        if leaves.len() != names.len() {
            return Err(ConfigurationError::LeafCountMismatch {
                expected: names.len(),
                found: leaves.len(),
            });
        }

        let mut seen = HashSet::new();
        for leaf in leaves {
            if !names.iter().any(|n| n == leaf) {
                return Err(ConfigurationError::UnknownSpecification(leaf.to_string()));
            }
            if !seen.insert(leaf) {
                return Err(ConfigurationError::DuplicateSpecification(leaf.to_string()));
            }
        }
        Ok(())
    }
}

impl fmt::Display for GroupOrderTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupOrderTree::Leaf(name) => write!(f, "{name}"),
            GroupOrderTree::Node(children) => {
                write!(f, "(")?;
                for (i, c) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{c}")?;
                }
                write!(f, ")")
            }
        }
    }
}
