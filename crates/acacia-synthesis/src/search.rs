//! Incremental search for `K` and the credit bounds
//!
//! The [`CompositionEngine`] checks a [`SynthesisProblem`] for increasing
//! values of `K` (and of the credit caps `C` if the problem has costs). With
//! the compositional method, the safety games of the specification units are
//! solved in the leaves of a [`GroupOrderTree`] and composed bottom-up. If
//! the game of a node is losing, the search restarts below it with larger
//! bounds: every leaf resumes from the bounds of its last solution.

use std::{
    collections::HashMap,
    fmt,
    rc::Rc,
    time::{Duration, Instant},
};

use acacia_automaton::{
    preprocessing::SurelyLosingStates,
    turn_based::TurnBasedAutomaton,
    weights::{CostParameters, DEFAULT_C_BOUND, DEFAULT_C_START},
};
use acacia_solver::{BackwardSolver, CfInfo, ForwardSolver, SafetyGame};
use log::{debug, info, warn};

use crate::{
    config::{Direction, Method, SynthesisConfig, ToCheck},
    error::{ConfigurationError, InternalInconsistency, SynthesisError},
    group_order::GroupOrderTree,
    problem::SynthesisProblem,
};

/// Result of a search
#[derive(Debug, Clone)]
pub enum Outcome {
    /// The system has a winning strategy
    Realizable {
        /// Winning positions of the (composed) game
        game: SafetyGame,
        /// Value of `K` the strategy was found for
        k: usize,
        /// Credit caps the strategy was found for, empty without costs
        c: Vec<i32>,
    },
    /// The environment wins the game of the negated specification
    Unrealizable {
        /// Value of `K` the environment strategy was found for
        k: usize,
    },
    /// No verdict for the configured bounds
    BoundExhausted,
}

impl Outcome {
    /// Check whether the outcome is [`Outcome::Realizable`]
    pub fn is_realizable(&self) -> bool {
        matches!(self, Outcome::Realizable { .. })
    }

    /// Check whether the outcome is [`Outcome::Unrealizable`]
    pub fn is_unrealizable(&self) -> bool {
        matches!(self, Outcome::Unrealizable { .. })
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Realizable { k, c, .. } if c.is_empty() => {
                write!(f, "realizable (k = {k})")
            }
            Outcome::Realizable { k, c, .. } => write!(f, "realizable (k = {k}, c = {c:?})"),
            Outcome::Unrealizable { k } => write!(f, "unrealizable (k = {k})"),
            Outcome::BoundExhausted => write!(f, "unknown (bounds exhausted)"),
        }
    }
}

/// Statistics of a search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolveReport {
    /// Number of safety games solved
    pub games_solved: usize,
    /// Sum of the fixpoint iterations of the backward solver
    pub fixpoint_iterations: usize,
    /// Largest antichain met by the backward solver
    pub max_antichain_size: usize,
    /// Largest critical set met by the backward solver
    pub max_critical: Option<usize>,
    /// Sum of the positions explored by the forward solver
    pub forward_passed: usize,
    /// Number of states removed as surely losing
    pub removed_states: usize,
    /// Whether the search was stopped by the cap on attempts
    pub iteration_cap_reached: bool,
    /// Time spent in the search
    pub elapsed: Duration,
}

/// Credit caps tried during the search, one entry per cost dimension
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreditSchedule {
    /// First caps
    pub start: Vec<i32>,
    /// Largest caps
    pub bound: Vec<i32>,
    /// Increment of the caps between two attempts
    pub step: Vec<i32>,
}

impl CreditSchedule {
    /// Schedule of the (completed) cost parameters `costs`
    ///
    /// A zero step is replaced so that the bound of a dimension is reached
    /// together with the bound of `K`, or right away if `K` is fixed.
    pub fn new(costs: &CostParameters, config: &SynthesisConfig) -> Self {
        let dim = costs.dimension();
        let start = (0..dim)
            .map(|d| costs.c_start.get(d).copied().unwrap_or(DEFAULT_C_START))
            .collect::<Vec<_>>();
        let bound = (0..dim)
            .map(|d| costs.c_bound.get(d).copied().unwrap_or(DEFAULT_C_BOUND))
            .zip(&start)
            .map(|(b, s)| b.max(*s))
            .collect::<Vec<_>>();
        let step = (0..dim)
            .map(|d| {
                let step = costs.c_step.get(d).copied().unwrap_or_default();
                let (s, b) = (start[d], bound[d]);
                if step != 0 || s == b {
                    return step;
                }
                if config.k_bound == config.k_start {
                    return b;
                }
                let attempts = (config.k_bound - config.k_start).div_ceil(config.k_step);
                ((b - s) as usize).div_ceil(attempts) as i32
            })
            .collect();
        Self { start, bound, step }
    }

    /// Number of cost dimensions
    pub fn dimension(&self) -> usize {
        self.start.len()
    }
}

/// Search state of a node of the composition tree
#[derive(Debug, Clone)]
enum NodeStatus {
    Unsolved,
    Solving,
    Solved {
        k: usize,
        c: Vec<i32>,
        game: SafetyGame,
    },
    Failed,
}

#[derive(Debug)]
enum NodeKind {
    Leaf {
        automaton: Rc<TurnBasedAutomaton>,
        opt2: bool,
    },
    Composition(Vec<SearchNode>),
}

/// Node of the composition tree together with its search state
#[derive(Debug)]
struct SearchNode {
    name: String,
    kind: NodeKind,
    status: NodeStatus,
}

impl SearchNode {
    fn new(
        tree: &GroupOrderTree,
        automata: &HashMap<String, Rc<TurnBasedAutomaton>>,
    ) -> Result<Self, ConfigurationError> {
        let kind = match tree {
            GroupOrderTree::Leaf(name) => {
                let automaton = automata
                    .get(name)
                    .ok_or_else(|| ConfigurationError::UnknownSpecification(name.clone()))?;
                NodeKind::Leaf {
                    automaton: automaton.clone(),
                    opt2: true,
                }
            }
            GroupOrderTree::Node(children) => NodeKind::Composition(
                children
                    .iter()
                    .map(|c| Self::new(c, automata))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
        };
        Ok(Self {
            name: tree.to_string(),
            kind,
            status: NodeStatus::Unsolved,
        })
    }

    fn solution(&self) -> Result<(usize, &[i32], &SafetyGame), InternalInconsistency> {
        match &self.status {
            NodeStatus::Solved { k, c, game } => Ok((*k, c, game)),
            _ => Err(InternalInconsistency::NodeNotSolved(self.name.clone())),
        }
    }
}

/// Settings shared by all nodes during one pass of the search
#[derive(Debug, Clone, Copy)]
struct Phase {
    costs: bool,
    direction: Direction,
    method: Method,
}

/// Drives the incremental search over `K` and the credit caps
#[derive(Debug)]
pub struct CompositionEngine {
    config: SynthesisConfig,
    report: SolveReport,
    attempts: usize,
}

impl CompositionEngine {
    /// Create an engine for `config`
    pub fn new(config: SynthesisConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        Ok(Self {
            config,
            report: SolveReport::default(),
            attempts: 0,
        })
    }

    /// Configuration of the engine
    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    /// Statistics of the last search
    pub fn report(&self) -> &SolveReport {
        &self.report
    }

    /// Search for a verdict on `problem`
    pub fn synthesize(&mut self, problem: &SynthesisProblem) -> Result<Outcome, SynthesisError> {
        let start_time = Instant::now();
        self.report = SolveReport::default();
        self.attempts = 0;

        let mut schedule = CreditSchedule::new(problem.costs(), &self.config);
        if self.config.to_check != ToCheck::Realizability && schedule.dimension() > 0 {
            warn!("Costs are ignored when checking unrealizability");
            schedule = CreditSchedule::default();
        }

        info!(
            "Checking {} of '{}' ({} starts, {} method, {} algorithm, k from {} to {} by {})",
            self.config.to_check,
            problem
                .specifications()
                .iter()
                .map(|s| s.name())
                .collect::<Vec<_>>()
                .join(", "),
            self.config.starting_player,
            self.config.method,
            self.config.direction,
            self.config.k_start,
            self.config.k_bound,
            self.config.k_step
        );

        let outcome = match self.config.to_check {
            ToCheck::Realizability => self.check_realizability(problem, &schedule)?,
            ToCheck::Unrealizability | ToCheck::Both => self.check_unrealizability(problem)?,
        };

        self.report.elapsed = start_time.elapsed();
        info!(
            "Result: {outcome} after {} safety games in {:.3}s",
            self.report.games_solved,
            self.report.elapsed.as_secs_f64()
        );
        Ok(outcome)
    }

    fn check_realizability(
        &mut self,
        problem: &SynthesisProblem,
        schedule: &CreditSchedule,
    ) -> Result<Outcome, SynthesisError> {
        let with_costs = schedule.dimension() > 0;
        let method = if problem.specifications().len() == 1 {
            Method::Monolithic
        } else {
            self.config.method
        };

        let automata = problem.turn_based_automata(&self.config, method, with_costs)?;
        let names = automata
            .iter()
            .map(|a| a.name().to_string())
            .collect::<Vec<_>>();
        let tree = GroupOrderTree::build(&self.config.group_order, &names)?;
        if !tree.is_leaf() {
            info!("Parenthesizing: {tree}");
        }
        let automata = automata
            .into_iter()
            .map(|a| (a.name().to_string(), Rc::new(a)))
            .collect::<HashMap<_, _>>();
        let mut root = SearchNode::new(&tree, &automata)?;

        if !with_costs {
            let phase = Phase {
                costs: false,
                direction: self.config.direction,
                method,
            };
            return self.search_root(&mut root, phase, schedule);
        }

        info!("Checking realizability without costs first");
        let phase = Phase {
            costs: false,
            direction: Direction::Backward,
            method,
        };
        if !self.solve_node(&mut root, true, phase, schedule)? {
            return Ok(Outcome::BoundExhausted);
        }

        let (k, c, game) = root.solution()?;
        let (k, c) = (k, c.to_vec());
        info!("Realizable without costs for k = {k}, adding credits c = {c:?}");
        let start = game.add_credits(&c);
        if let Some(game) = self.solve_game(&start, self.config.direction, &c) {
            return Ok(Outcome::Realizable { game, k, c });
        }

        info!("No solution with costs for k = {k} and c = {c:?}, starting over with larger bounds");
        let phase = Phase {
            costs: true,
            direction: self.config.direction,
            method,
        };
        self.search_root(&mut root, phase, schedule)
    }

    fn search_root(
        &mut self,
        root: &mut SearchNode,
        phase: Phase,
        schedule: &CreditSchedule,
    ) -> Result<Outcome, SynthesisError> {
        if !self.solve_node(root, true, phase, schedule)? {
            return Ok(Outcome::BoundExhausted);
        }
        let (k, c, game) = root.solution()?;
        Ok(Outcome::Realizable {
            game: game.clone(),
            k,
            c: c.to_vec(),
        })
    }

    /// Alternate realizability of the specification and of its negation
    /// for increasing `K`
    fn check_unrealizability(
        &mut self,
        problem: &SynthesisProblem,
    ) -> Result<Outcome, SynthesisError> {
        let realizability = if self.config.to_check == ToCheck::Both {
            let mut automata =
                problem.turn_based_automata(&self.config, Method::Monolithic, false)?;
            Some(Rc::new(automata.remove(0)))
        } else {
            None
        };
        let negated = Rc::new(problem.negated_automaton(&self.config)?);

        let phase = Phase {
            costs: false,
            direction: self.config.direction,
            method: Method::Monolithic,
        };
        let (mut opt2_real, mut opt2_unreal) = (true, true);
        let (step, bound) = (self.config.k_step as i64, self.config.k_bound as i64);
        let mut k = self.config.k_start as i64 - step;
        loop {
            if k == bound {
                info!("Bound on k reached without verdict");
                return Ok(Outcome::BoundExhausted);
            }
            k = (k + step).min(bound);
            let k_u = k as usize;

            if let Some(aut) = &realizability
                && let Some(game) = self.test_realizability(aut, &mut opt2_real, k_u, &[], phase)
            {
                return Ok(Outcome::Realizable {
                    game,
                    k: k_u,
                    c: Vec::new(),
                });
            }

            if self
                .test_realizability(&negated, &mut opt2_unreal, k_u, &[], phase)
                .is_some()
            {
                return Ok(Outcome::Unrealizable { k: k_u });
            }
        }
    }

    /// Solve `node` for the next bounds, returns whether a winning game was
    /// found
    fn solve_node(
        &mut self,
        node: &mut SearchNode,
        is_root: bool,
        phase: Phase,
        schedule: &CreditSchedule,
    ) -> Result<bool, SynthesisError> {
        let SearchNode { name, kind, status } = node;
        match kind {
            NodeKind::Leaf { automaton, opt2 } => {
                let (k_step, k_bound) = (self.config.k_step as i64, self.config.k_bound as i64);
                let (mut k, mut c) = match status {
                    NodeStatus::Solved { k, c, .. } => (*k as i64, c.clone()),
                    _ => (
                        self.config.k_start as i64 - k_step,
                        schedule
                            .start
                            .iter()
                            .zip(&schedule.step)
                            .map(|(s, d)| s - d)
                            .collect(),
                    ),
                };

                loop {
                    if k == k_bound && c == schedule.bound {
                        info!("Bounds on k and c reached for '{name}'");
                        *status = NodeStatus::Failed;
                        return Ok(false);
                    }
                    if !self.next_attempt() {
                        *status = NodeStatus::Failed;
                        return Ok(false);
                    }

                    k = (k + k_step).min(k_bound);
                    for (d, cd) in c.iter_mut().enumerate() {
                        *cd = (*cd + schedule.step[d]).min(schedule.bound[d]);
                    }

                    *status = NodeStatus::Solving;
                    let caps = if phase.costs { c.as_slice() } else { &[] };
                    if let Some(game) =
                        self.test_realizability(automaton, opt2, k as usize, caps, phase)
                    {
                        *status = NodeStatus::Solved {
                            k: k as usize,
                            c,
                            game,
                        };
                        return Ok(true);
                    }
                }
            }
            NodeKind::Composition(children) => loop {
                for child in children.iter_mut() {
                    if !self.solve_node(child, false, phase, schedule)? {
                        *status = NodeStatus::Failed;
                        return Ok(false);
                    }
                }
                if !self.next_attempt() {
                    *status = NodeStatus::Failed;
                    return Ok(false);
                }
                *status = NodeStatus::Solving;

                let solutions = children
                    .iter()
                    .map(|c| c.solution())
                    .collect::<Result<Vec<_>, _>>()?;
                let k = solutions.iter().map(|(k, _, _)| *k).max().unwrap_or(0);
                let c = (0..schedule.dimension())
                    .map(|d| {
                        solutions
                            .iter()
                            .filter_map(|(_, c, _)| c.get(d).copied())
                            .max()
                            .unwrap_or(0)
                    })
                    .collect::<Vec<_>>();
                let games = solutions.iter().map(|(_, _, g)| *g).collect::<Vec<_>>();

                info!("Composing the games of {name}");
                let start = SafetyGame::compose(&games)
                    .ok_or_else(|| InternalInconsistency::IncompatibleGames(name.clone()))?;

                let direction = if phase.direction == Direction::Forward && is_root {
                    Direction::Forward
                } else {
                    Direction::Backward
                };
                let caps = if phase.costs { c.clone() } else { Vec::new() };
                if let Some(game) = self.solve_game(&start, direction, &caps) {
                    info!("Solution found for {name} (k = {k})");
                    *status = NodeStatus::Solved { k, c, game };
                    return Ok(true);
                }
                debug!("No solution for {name}, starting over from the leaves");
            },
        }
    }

    /// Solve the game of a single turn-based automaton for `k` and the
    /// credit caps `caps`
    fn test_realizability(
        &mut self,
        automaton: &Rc<TurnBasedAutomaton>,
        opt2: &mut bool,
        k: usize,
        caps: &[i32],
        phase: Phase,
    ) -> Option<SafetyGame> {
        let name = automaton.name();
        if caps.is_empty() {
            info!("Realizability checking for '{name}', k = {k}");
        } else {
            info!("Realizability checking for '{name}', k = {k}, c = {caps:?}");
        }

        let automaton = if self.config.opt2 && *opt2 {
            let mut reduced = automaton.as_ref().clone();
            let removed = SurelyLosingStates::new(k).remove_losing_states(&mut reduced);
            self.report.removed_states += removed;
            if removed == 0 {
                info!("Removal of surely losing states turned off for '{name}'");
                *opt2 = false;
                automaton.clone()
            } else {
                debug!("{removed} surely losing states removed for k = {k}");
                Rc::new(reduced)
            }
        } else {
            automaton.clone()
        };

        let info = Rc::new(CfInfo::new(automaton, k));
        let start = SafetyGame::start(info, caps);
        let direction =
            if phase.method == Method::Monolithic && phase.direction == Direction::Forward {
                Direction::Forward
            } else {
                Direction::Backward
            };

        let game = self.solve_game(&start, direction, caps);
        if game.is_some() {
            info!("Solution found for '{name}', k = {k}");
        } else {
            info!("No solution found for '{name}', k = {k}");
        }
        game
    }

    /// Solve the game starting from `start`, returns the game if the system
    /// wins it
    fn solve_game(
        &mut self,
        start: &SafetyGame,
        direction: Direction,
        caps: &[i32],
    ) -> Option<SafetyGame> {
        let info = start.info().clone();
        let game = match direction {
            Direction::Forward => {
                let (game, report) = ForwardSolver::new(info, caps).solve(start);
                self.report.forward_passed += report.passed;
                game
            }
            Direction::Backward => {
                let (game, report) = BackwardSolver::new(info)
                    .with_critical_signals(self.config.critical)
                    .solve(start);
                self.report.fixpoint_iterations += report.iterations;
                self.report.max_antichain_size = self
                    .report
                    .max_antichain_size
                    .max(report.max_size_starting)
                    .max(report.max_size_other);
                self.report.max_critical = self.report.max_critical.max(report.max_critical);
                game
            }
        };
        self.report.games_solved += 1;
        game.has_winning_strategy().then_some(game)
    }

    /// Count an attempt, returns `false` once the cap on attempts is
    /// exceeded
    fn next_attempt(&mut self) -> bool {
        self.attempts += 1;
        if self.attempts > self.config.max_iterations {
            if !self.report.iteration_cap_reached {
                warn!(
                    "Giving up after {} attempts without verdict",
                    self.config.max_iterations
                );
            }
            self.report.iteration_cap_reached = true;
            return false;
        }
        true
    }
}
