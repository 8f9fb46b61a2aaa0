//! Weight functions for mean-payoff objectives
//!
//! Each signal can be given a value vector for when it is true and one for
//! when it is false. Together with a threshold vector `ν` these induce, for
//! every valuation of a player's propositions, a weight vector of dimension
//! `D`. The system has to keep the accumulated weight above the threshold,
//! which is encoded with bounded credit vectors in the solver.

use std::fmt;

use log::debug;

use crate::{
    Player,
    alphabet::{Alphabet, Valuation},
};

/// Default for the initial credit bound of each dimension
pub const DEFAULT_C_START: i32 = 0;
/// Default for the maximal credit bound of each dimension
pub const DEFAULT_C_BOUND: i32 = 10;
/// Default for the credit bound increment of each dimension
pub const DEFAULT_C_STEP: i32 = 2;

/// Cost parameters of a synthesis problem as given in a partition file
///
/// Value vectors are given per signal, in the order of the propositions of
/// the alphabet. `nu` holds one fraction `(numerator, denominator)` per
/// dimension.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CostParameters {
    /// Values of the input signals when true
    pub values_input: Vec<Vec<i64>>,
    /// Values of the output signals when true
    pub values_output: Vec<Vec<i64>>,
    /// Values of the input signals when false
    pub values_not_input: Vec<Vec<i64>>,
    /// Values of the output signals when false
    pub values_not_output: Vec<Vec<i64>>,
    /// Threshold vector
    pub nu: Vec<(i64, i64)>,
    /// Initial credit bound per dimension
    pub c_start: Vec<i32>,
    /// Maximal credit bound per dimension
    pub c_bound: Vec<i32>,
    /// Credit bound increment per dimension
    pub c_step: Vec<i32>,
}

impl CostParameters {
    /// Number of cost dimensions
    ///
    /// The dimension is the length of the first value vector given; without
    /// any value vector the problem has no costs.
    pub fn dimension(&self) -> usize {
        [
            &self.values_input,
            &self.values_output,
            &self.values_not_input,
            &self.values_not_output,
        ]
        .iter()
        .find_map(|vs| vs.first())
        .map_or(0, |v| v.len())
    }

    /// Fill in defaults for missing vectors and check all arities
    ///
    /// Missing value lists become zero vectors, missing credit bounds default
    /// to [`DEFAULT_C_START`], [`DEFAULT_C_BOUND`] and [`DEFAULT_C_STEP`].
    /// A missing `nu` is an error as soon as the dimension is positive.
    pub fn complete(mut self, alphabet: &Alphabet) -> Result<Self, CostParameterError> {
        let dim = self.dimension();
        if dim == 0 {
            return Ok(Self::default());
        }

        let n_in = alphabet.inputs().len();
        let n_out = alphabet.outputs().len();

        for (name, values, n_signals) in [
            ("values_i", &mut self.values_input, n_in),
            ("values_o", &mut self.values_output, n_out),
            ("values_!i", &mut self.values_not_input, n_in),
            ("values_!o", &mut self.values_not_output, n_out),
        ] {
            if values.is_empty() {
                *values = vec![vec![0; dim]; n_signals];
            }
            if values.len() != n_signals {
                return Err(CostParameterError::ArityMismatch {
                    what: name.to_string(),
                    expected: n_signals,
                    found: values.len(),
                });
            }
            if let Some(v) = values.iter().find(|v| v.len() != dim) {
                return Err(CostParameterError::ArityMismatch {
                    what: format!("vector in {name}"),
                    expected: dim,
                    found: v.len(),
                });
            }
        }

        if self.nu.is_empty() {
            return Err(CostParameterError::MissingNu);
        }
        if self.nu.iter().any(|(_, den)| *den == 0) {
            return Err(CostParameterError::ZeroDenominator);
        }

        for (name, values, default) in [
            ("nu", None, 0),
            ("c_start", Some(&mut self.c_start), DEFAULT_C_START),
            ("c_bound", Some(&mut self.c_bound), DEFAULT_C_BOUND),
            ("c_step", Some(&mut self.c_step), DEFAULT_C_STEP),
        ] {
            let len = match values {
                Some(values) => {
                    if values.is_empty() {
                        *values = vec![default; dim];
                    }
                    values.len()
                }
                None => self.nu.len(),
            };
            if len != dim {
                return Err(CostParameterError::ArityMismatch {
                    what: name.to_string(),
                    expected: dim,
                    found: len,
                });
            }
        }

        if self
            .c_start
            .iter()
            .chain(self.c_bound.iter())
            .chain(self.c_step.iter())
            .any(|c| *c < 0)
        {
            return Err(CostParameterError::NegativeCreditBound);
        }
        for (start, bound) in self.c_start.iter().zip(self.c_bound.iter_mut()) {
            *bound = (*bound).max(*start);
        }

        Ok(self)
    }

    /// Compute the weight vectors of every valuation of both players
    ///
    /// Per dimension, `ν` is scaled by `500000` (half of it is charged on each
    /// move of a round) and rounded down, the values by `1000000`, and all of
    /// them are divided by the gcd of their absolute values. The weight of a
    /// valuation is the sum of the values of its true and false signals minus
    /// the scaled `ν`.
    ///
    /// Fails with [`CostParameterError::WeightOverflow`] if a scaled value or a
    /// resulting weight does not fit its integer type.
    pub fn weights(&self, alphabet: &Alphabet) -> Result<Weights, CostParameterError> {
        let dim = self.dimension();
        if dim == 0 || self.nu.len() != dim {
            return Ok(Weights::zero(alphabet));
        }

        let mut nu = vec![0i64; dim];
        let mut scaled = [
            self.values_input.clone(),
            self.values_output.clone(),
            self.values_not_input.clone(),
            self.values_not_output.clone(),
        ];

        for d in 0..dim {
            let overflow = || CostParameterError::WeightOverflow { dimension: d };
            let (num, den) = self.nu[d];
            nu[d] = num
                .checked_mul(500_000)
                .and_then(|n| div_floor(n, den))
                .ok_or_else(overflow)?;

            for values in scaled.iter_mut() {
                for v in values.iter_mut() {
                    v[d] = v[d].checked_mul(1_000_000).ok_or_else(overflow)?;
                }
            }

            let divisor = scaled
                .iter()
                .flat_map(|values| values.iter().map(|v| v[d]))
                .fold(nu[d].abs(), |acc, x| gcd(acc, x.abs()));

            if divisor != 0 {
                nu[d] /= divisor;
                for values in scaled.iter_mut() {
                    for v in values.iter_mut() {
                        v[d] /= divisor;
                    }
                }
            }
        }

        let [val_in, val_out, val_not_in, val_not_out] = scaled;
        let compute = |player: Player, values: &[Vec<i64>], values_not: &[Vec<i64>]| {
            alphabet
                .valuations(player)
                .map(|sigma| {
                    (0..dim)
                        .map(|d| {
                            let sum = (0..values.len())
                                .map(|j| {
                                    if (sigma >> j) & 1 == 1 {
                                        values[j][d]
                                    } else {
                                        values_not[j][d]
                                    }
                                })
                                .try_fold(0i64, i64::checked_add);
                            sum.and_then(|sum| sum.checked_sub(nu[d]))
                                .and_then(|w| i32::try_from(w).ok())
                                .ok_or(CostParameterError::WeightOverflow { dimension: d })
                        })
                        .collect::<Result<Vec<_>, _>>()
                })
                .collect::<Result<Vec<_>, _>>()
        };

        let weights = Weights {
            dimension: dim,
            input: compute(Player::Environment, &val_in, &val_not_in)?,
            output: compute(Player::System, &val_out, &val_not_out)?,
        };
        debug!("Weight functions: {weights}");
        Ok(weights)
    }
}

/// Division of `a` by `b` rounded towards negative infinity, `None` on
/// overflow or division by zero
fn div_floor(a: i64, b: i64) -> Option<i64> {
    let q = a.checked_div(b)?;
    if a % b != 0 && (a < 0) != (b < 0) {
        Some(q - 1)
    } else {
        Some(q)
    }
}

fn gcd(a: i64, b: i64) -> i64 {
    if b == 0 { a } else { gcd(b, a % b) }
}

/// Weight vectors of every valuation of both players
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Weights {
    dimension: usize,
    input: Vec<Vec<i32>>,
    output: Vec<Vec<i32>>,
}

impl Weights {
    /// Weights of dimension 0
    pub fn zero(alphabet: &Alphabet) -> Self {
        Self {
            dimension: 0,
            input: vec![Vec::new(); alphabet.sigma_size(Player::Environment)],
            output: vec![Vec::new(); alphabet.sigma_size(Player::System)],
        }
    }

    /// Create weights from explicit vectors, indexed by valuation
    pub fn new(dimension: usize, input: Vec<Vec<i32>>, output: Vec<Vec<i32>>) -> Self {
        debug_assert!(input.iter().chain(output.iter()).all(|v| v.len() == dimension));
        Self {
            dimension,
            input,
            output,
        }
    }

    /// Number of cost dimensions
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Weight vector of valuation `sigma` of `player`
    pub fn of(&self, player: Player, sigma: Valuation) -> &[i32] {
        match player {
            Player::Environment => &self.input[sigma],
            Player::System => &self.output[sigma],
        }
    }

    /// Number of valuations weights are given for
    pub fn n_valuations(&self, player: Player) -> usize {
        match player {
            Player::Environment => self.input.len(),
            Player::System => self.output.len(),
        }
    }

    /// Weights with the roles of the players exchanged
    pub fn swapped(&self) -> Self {
        Self {
            dimension: self.dimension,
            input: self.output.clone(),
            output: self.input.clone(),
        }
    }
}

impl fmt::Display for Weights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v_I = {:?}, v_O = {:?}", self.input, self.output)
    }
}

/// Errors in the cost parameters of a partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CostParameterError {
    /// A vector or list has the wrong length
    ArityMismatch {
        /// Which parameter is malformed
        what: String,
        /// Expected length
        expected: usize,
        /// Length found
        found: usize,
    },
    /// Values are given but no threshold vector
    MissingNu,
    /// A fraction of the threshold vector has denominator 0
    ZeroDenominator,
    /// `c_start`, `c_bound` or `c_step` has a negative entry
    NegativeCreditBound,
    /// Scaling the values or the threshold of a dimension overflows
    WeightOverflow {
        /// Index of the dimension
        dimension: usize,
    },
}

impl std::error::Error for CostParameterError {}

impl fmt::Display for CostParameterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CostParameterError::ArityMismatch {
                what,
                expected,
                found,
            } => write!(
                f,
                "Wrong dimension of {what}: expected {expected} entries, found {found}"
            ),
            CostParameterError::MissingNu => write!(f, "You must specify a nu vector"),
            CostParameterError::ZeroDenominator => {
                write!(f, "The nu vector contains a fraction with denominator 0")
            }
            CostParameterError::NegativeCreditBound => write!(
                f,
                "c_start, c_bound and c_step must be vectors of non-negative integers"
            ),
            CostParameterError::WeightOverflow { dimension } => write!(
                f,
                "The values and nu of dimension {dimension} are too large to compute integer weights"
            ),
        }
    }
}
