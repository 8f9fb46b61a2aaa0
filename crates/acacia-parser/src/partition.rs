//! Parser for partition files
//!
//! A partition file splits the atomic signals into inputs (controlled by the
//! environment) and outputs (controlled by the system), and optionally
//! defines the cost parameters of a mean-payoff objective. The grammar is
//! defined in `partition_format.pest`.

use anyhow::{Context, Error, anyhow};
use log::debug;
use pest::{Parser, iterators::Pair};
use pest_derive::Parser;

use acacia_automaton::{alphabet::Alphabet, weights::CostParameters};

use crate::ParsePartition;

// Location of the grammar file and generation of parser
#[allow(missing_docs)]
#[derive(Parser)]
#[grammar = "./partition_format.pest"]
struct PestPartitionParser;

/// Signals and cost parameters of a synthesis problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    /// Input and output signals
    pub alphabet: Alphabet,
    /// Cost parameters, completed with their defaults
    pub costs: CostParameters,
}

/// Parser for partition files
///
/// # Example
///
/// ```
/// use acacia_parser::{ParsePartition, partition::PartitionParser};
///
/// let input = ".inputs r\n.outputs g\n.values_o (-1)\n.nu (0.5)\n";
/// let partition = PartitionParser::new().parse_partition(input).unwrap();
///
/// assert_eq!(partition.alphabet.inputs(), &["r".to_string()]);
/// assert_eq!(partition.costs.dimension(), 1);
/// assert_eq!(partition.costs.nu, vec![(5, 10)]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PartitionParser;

impl PartitionParser {
    /// Create a new parser
    pub fn new() -> Self {
        PartitionParser {}
    }
}

impl ParsePartition for PartitionParser {
    fn parse_partition(&self, input: &str) -> Result<Partition, Error> {
        let mut pairs = PestPartitionParser::parse(Rule::partition, input)?;
        let pair = pairs.next().expect("Missing: partition");

        let mut inputs = Vec::new();
        let mut outputs = Vec::new();
        let mut costs = CostParameters::default();

        for directive in pair.into_inner() {
            match directive.as_rule() {
                Rule::inputs => inputs = parse_identifiers(directive),
                Rule::outputs => outputs = parse_identifiers(directive),
                Rule::values_i => costs.values_input = parse_int_tuples(directive)?,
                Rule::values_o => costs.values_output = parse_int_tuples(directive)?,
                Rule::values_not_i => costs.values_not_input = parse_int_tuples(directive)?,
                Rule::values_not_o => costs.values_not_output = parse_int_tuples(directive)?,
                Rule::nu => {
                    let tuple = directive.into_inner().next().expect("Missing: tuple of nu");
                    costs.nu = tuple
                        .into_inner()
                        .map(|d| parse_decimal(d.as_str()))
                        .collect::<Result<Vec<_>, _>>()?;
                }
                Rule::c_start => costs.c_start = parse_credit_tuple(directive)?,
                Rule::c_bound => costs.c_bound = parse_credit_tuple(directive)?,
                Rule::c_step => costs.c_step = parse_credit_tuple(directive)?,
                Rule::EOI => (),
                _ => unreachable!("Unknown directive {:?}", directive.as_rule()),
            }
        }

        let alphabet =
            Alphabet::new(inputs, outputs).with_context(|| "Failed to parse partition: ")?;
        let costs = costs
            .complete(&alphabet)
            .with_context(|| "Failed to parse cost parameters: ")?;

        debug!(
            "Parsed partition: {} inputs, {} outputs, {} cost dimensions",
            alphabet.inputs().len(),
            alphabet.outputs().len(),
            costs.dimension()
        );
        Ok(Partition { alphabet, costs })
    }
}

fn parse_identifiers(pair: Pair<'_, Rule>) -> Vec<String> {
    pair.into_inner().map(|p| p.as_str().to_string()).collect()
}

fn parse_int_tuples(pair: Pair<'_, Rule>) -> Result<Vec<Vec<i64>>, Error> {
    pair.into_inner()
        .map(|tuple| {
            tuple
                .into_inner()
                .map(|i| {
                    i.as_str()
                        .parse::<i64>()
                        .with_context(|| format!("Invalid integer '{}'", i.as_str()))
                })
                .collect()
        })
        .collect()
}

fn parse_credit_tuple(pair: Pair<'_, Rule>) -> Result<Vec<i32>, Error> {
    let tuple = pair.into_inner().next().expect("Missing: credit tuple");
    tuple
        .into_inner()
        .map(|i| {
            i.as_str()
                .parse::<i32>()
                .with_context(|| format!("Invalid credit bound '{}'", i.as_str()))
        })
        .collect()
}

/// Convert a decimal such as `-0.25` into the fraction `(-25, 100)`
fn parse_decimal(s: &str) -> Result<(i64, i64), Error> {
    let (int, frac) = s.split_once('.').unwrap_or((s, ""));
    let den = u32::try_from(frac.len())
        .ok()
        .and_then(|exp| 10i64.checked_pow(exp))
        .ok_or_else(|| anyhow!("Too many decimals in '{s}'"))?;
    let num = format!("{int}{frac}")
        .parse::<i64>()
        .with_context(|| format!("Invalid decimal '{s}'"))?;
    Ok((num, den))
}
