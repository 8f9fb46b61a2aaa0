//! Parser for never-claims as produced by ltl2ba
//!
//! The parser uses the [pest](https://pest.rs/) parser generator, with the
//! grammar defined in `never_claim_format.pest`. A never-claim describes the
//! Büchi automaton of the negation of a formula; read as a universal
//! co-Büchi automaton it accepts the formula itself. States whose name
//! starts with `accept` are accepting, the state whose name ends with `init`
//! is initial.

use anyhow::{Context, Error};
use log::debug;
use pest::{
    Parser,
    iterators::{Pair, Pairs},
    pratt_parser::{Assoc, PrattParser},
};
use pest_derive::Parser;

use acacia_automaton::{
    cobuchi::{CoBuchiAutomaton, CoBuchiAutomatonBuilder},
    label::{Guard, GuardLiteral},
};

use crate::ParseCoBuchi;

// Location of the grammar file and generation of parser
#[allow(missing_docs)]
#[derive(Parser)]
#[grammar = "./never_claim_format.pest"]
struct PestNeverClaimParser;

// Precedence is defined lowest to highest: `||`, `&&`, `!`
lazy_static::lazy_static! {
    static ref PRATT_PARSER: PrattParser<Rule> = {
        use pest::pratt_parser::Op;

        PrattParser::new()
            .op(Op::infix(Rule::or, Assoc::Left))
            .op(Op::infix(Rule::and, Assoc::Left))
            .op(Op::prefix(Rule::not))
    };
}

/// Boolean expression of a guard before it is brought into DNF
#[derive(Debug, Clone, PartialEq, Eq)]
enum GuardExpression {
    Const(bool),
    Prop(String),
    Not(Box<GuardExpression>),
    And(Box<GuardExpression>, Box<GuardExpression>),
    Or(Box<GuardExpression>, Box<GuardExpression>),
}

impl GuardExpression {
    /// Disjunctive normal form, with negations pushed to the propositions if
    /// `negated` is set
    ///
    /// Contradictory conjunctions are dropped.
    fn to_dnf(&self, negated: bool) -> Vec<Vec<GuardLiteral>> {
        match self {
            GuardExpression::Const(b) if *b != negated => vec![Vec::new()],
            GuardExpression::Const(_) => Vec::new(),
            GuardExpression::Prop(p) => vec![vec![GuardLiteral::new(p.clone(), !negated)]],
            GuardExpression::Not(e) => e.to_dnf(!negated),
            GuardExpression::And(l, r) if !negated => conjoin(l.to_dnf(false), r.to_dnf(false)),
            GuardExpression::Or(l, r) if negated => conjoin(l.to_dnf(true), r.to_dnf(true)),
            GuardExpression::And(l, r) | GuardExpression::Or(l, r) => {
                let mut dnf = l.to_dnf(negated);
                for conj in r.to_dnf(negated) {
                    if !dnf.contains(&conj) {
                        dnf.push(conj);
                    }
                }
                dnf
            }
        }
    }
}

fn conjoin(lhs: Vec<Vec<GuardLiteral>>, rhs: Vec<Vec<GuardLiteral>>) -> Vec<Vec<GuardLiteral>> {
    let mut dnf: Vec<Vec<GuardLiteral>> = Vec::new();
    for l in lhs.iter() {
        'rhs: for r in rhs.iter() {
            let mut conj = l.clone();
            for lit in r {
                if conj
                    .iter()
                    .any(|c| c.prop == lit.prop && c.positive != lit.positive)
                {
                    continue 'rhs;
                }
                if !conj.contains(lit) {
                    conj.push(lit.clone());
                }
            }
            if !dnf.contains(&conj) {
                dnf.push(conj);
            }
        }
    }
    dnf
}

/// Parser for never-claims in the output format of ltl2ba
///
/// # Example
///
/// ```
/// use acacia_parser::{ParseCoBuchi, never_claim::NeverClaimParser};
///
/// let claim = "never {
///     T0_init:
///         if
///         :: (r && !g) -> goto accept_S1
///         :: (1) -> goto T0_init
///         fi;
///     accept_S1:
///         if
///         :: (!g) -> goto accept_S1
///         fi;
/// }";
/// let aut = NeverClaimParser::new().parse_automaton("spec", claim).unwrap();
/// assert_eq!(aut.states().len(), 2);
/// assert_eq!(aut.n_accepting(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct NeverClaimParser;

impl NeverClaimParser {
    /// Create a new parser
    pub fn new() -> Self {
        NeverClaimParser {}
    }

    /// Parse a guard such as `(!a && b) || (c)` into DNF
    pub fn parse_guard(&self, input: &str) -> Result<Guard, Error> {
        let mut pairs = PestNeverClaimParser::parse(Rule::guard, input)?;
        let pair = pairs.next().expect("Missing: guard");
        Ok(Guard::new(parse_guard_expression(pair.into_inner()).to_dnf(false)))
    }
}

impl ParseCoBuchi for NeverClaimParser {
    fn parse_automaton(&self, name: &str, input: &str) -> Result<CoBuchiAutomaton, Error> {
        let mut pairs = PestNeverClaimParser::parse(Rule::never_claim, input)?;
        let pair = pairs.next().expect("Missing: never claim");

        let states = pair
            .into_inner()
            .filter(|p| p.as_rule() == Rule::state)
            .collect::<Vec<_>>();

        let mut builder = CoBuchiAutomatonBuilder::new(name);
        for state in states.iter() {
            let state_name = parse_state_name(state);
            builder = builder
                .with_state(state_name, state_name.starts_with("accept"))
                .with_context(|| format!("Failed to parse never claim '{name}'"))?;
            if state_name.ends_with("init") {
                builder = builder
                    .with_initial_state(state_name)
                    .with_context(|| format!("Failed to parse never claim '{name}'"))?;
            }
        }

        for state in states {
            let from = parse_state_name(&state).to_string();
            let body = state
                .into_inner()
                .nth(1)
                .expect("Missing: body of state");

            builder = match body.as_rule() {
                Rule::skip => builder.with_edge(&from, Guard::tautology(), &from),
                Rule::no_transitions => Ok(builder),
                Rule::if_block => {
                    let mut builder = builder;
                    for transition in body.into_inner() {
                        let (guard, to) = parse_transition(transition);
                        builder = builder.with_edge(&from, guard, &to)?;
                    }
                    Ok(builder)
                }
                _ => unreachable!("Unknown rule in state body {:?}", body.as_rule()),
            }
            .with_context(|| format!("Failed to parse transitions of state '{from}'"))?;
        }

        let aut = builder
            .build()
            .with_context(|| format!("Failed to parse never claim '{name}'"))?;
        debug!(
            "Parsed never claim '{}': {} states, {} accepting, {} edges",
            aut.name(),
            aut.states().len(),
            aut.n_accepting(),
            aut.edges().len()
        );
        Ok(aut)
    }
}

fn parse_state_name<'a>(state: &Pair<'a, Rule>) -> &'a str {
    state
        .clone()
        .into_inner()
        .next()
        .expect("Missing: name of state")
        .as_str()
}

fn parse_transition(pair: Pair<'_, Rule>) -> (Guard, String) {
    let mut inner = pair.into_inner();
    let guard = inner.next().expect("Missing: guard of transition");
    let target = inner.next().expect("Missing: target of transition");

    let guard = Guard::new(parse_guard_expression(guard.into_inner()).to_dnf(false));
    (guard, target.as_str().to_string())
}

fn parse_guard_expression(pairs: Pairs<'_, Rule>) -> GuardExpression {
    PRATT_PARSER
        .map_primary(|primary| match primary.as_rule() {
            Rule::true_lit => GuardExpression::Const(true),
            Rule::false_lit => GuardExpression::Const(false),
            Rule::identifier => GuardExpression::Prop(primary.as_str().to_string()),
            Rule::guard => parse_guard_expression(primary.into_inner()),
            _ => unreachable!("Unknown rule in guard {:?}", primary.as_rule()),
        })
        .map_prefix(|op, rhs| match op.as_rule() {
            Rule::not => GuardExpression::Not(Box::new(rhs)),
            _ => unreachable!("Unknown prefix operator {:?}", op.as_rule()),
        })
        .map_infix(|lhs, op, rhs| match op.as_rule() {
            Rule::and => GuardExpression::And(Box::new(lhs), Box::new(rhs)),
            Rule::or => GuardExpression::Or(Box::new(lhs), Box::new(rhs)),
            _ => unreachable!("Unknown infix operator {:?}", op.as_rule()),
        })
        .parse(pairs)
}
