//! Backward fixpoint computation
//!
//! The [`BackwardSolver`] computes the greatest fixpoint of the controllable
//! predecessor operators of both players, starting from the maximal tuples.
//! Antichains of the starting player and of the other player are computed
//! alternately until two consecutive antichains of the starting player cover
//! each other.
//!
//! When the critical signals optimization is enabled, the predecessor
//! operator of the environment only considers a set of inputs that suffices
//! to witness that some tuple is losing in one step.

use std::{
    collections::HashMap,
    rc::Rc,
    time::{Duration, Instant},
};

use acacia_antichain::Antichain;
use acacia_automaton::{Player, alphabet::Valuation};
use log::{debug, info, trace};

use crate::{counting::CfInfo, safety_game::SafetyGame, tuple::Tuple};

/// Statistics of a fixpoint computation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixpointReport {
    /// Number of iterations until the fixpoint was reached
    pub iterations: usize,
    /// Largest antichain of the starting player
    pub max_size_starting: usize,
    /// Largest antichain of the other player
    pub max_size_other: usize,
    /// Largest critical set, `None` if no critical set was computed
    pub max_critical: Option<usize>,
    /// Time spent in the computation
    pub elapsed: Duration,
}

/// Backward solver for the safety game of one counting information
///
/// The solver caches the predecessors and successors it computes; caches
/// live as long as the solver.
#[derive(Debug)]
pub struct BackwardSolver {
    info: Rc<CfInfo>,
    critical: bool,
    pre_o_cache: HashMap<Tuple, Antichain<Tuple>>,
    omega_cache: HashMap<(Tuple, Valuation), Option<Tuple>>,
    min_succ_cache: HashMap<Tuple, Antichain<Tuple>>,
    succ_cache: HashMap<(Tuple, Valuation), Tuple>,
}

impl BackwardSolver {
    /// Create a solver for games over `info`
    pub fn new(info: Rc<CfInfo>) -> Self {
        Self {
            info,
            critical: false,
            pre_o_cache: HashMap::new(),
            omega_cache: HashMap::new(),
            min_succ_cache: HashMap::new(),
            succ_cache: HashMap::new(),
        }
    }

    /// Enable or disable the critical signals optimization
    pub fn with_critical_signals(mut self, critical: bool) -> Self {
        self.critical = critical;
        self
    }

    /// Controllable predecessors for `player`
    ///
    /// `a` holds positions of the opponent of `player`, `prev` the last
    /// antichain computed for `player`.
    pub fn pre(
        &mut self,
        a: &Antichain<Tuple>,
        prev: &Antichain<Tuple>,
        player: Player,
    ) -> Antichain<Tuple> {
        match player {
            Player::System => self.pre_o(a, prev),
            Player::Environment => self.pre_i(a),
        }
    }

    /// Positions from which the system can move into `a`, intersected with
    /// `prev`
    pub fn pre_o(&mut self, a: &Antichain<Tuple>, prev: &Antichain<Tuple>) -> Antichain<Tuple> {
        if a.is_empty() {
            return a.clone();
        }

        let mut pre = Antichain::new();
        for t in a.iter() {
            if !self.pre_o_cache.contains_key(t) {
                let omegas = self
                    .info
                    .alphabet()
                    .valuations(Player::System)
                    .filter_map(|sigma| t.omega(&self.info, sigma))
                    .collect::<Antichain<_>>();
                self.pre_o_cache.insert(t.clone(), omegas);
            }
            if let Some(omegas) = self.pre_o_cache.get(t) {
                pre.extend(omegas.iter().cloned());
            }
        }

        pre.intersection(prev)
    }

    /// Positions from which every input leads into `a`
    pub fn pre_i(&mut self, a: &Antichain<Tuple>) -> Antichain<Tuple> {
        if a.is_empty() {
            return a.clone();
        }

        let inputs = self
            .info
            .alphabet()
            .valuations(Player::Environment)
            .collect::<Vec<_>>();
        self.pre_on_inputs(a, &inputs)
    }

    /// Predecessors of the environment restricted to the inputs in `critical`
    ///
    /// Returns `prev` if there is no critical input or `a` is empty.
    pub fn pre_crit(
        &mut self,
        a: &Antichain<Tuple>,
        prev: &Antichain<Tuple>,
        critical: &[Valuation],
    ) -> Antichain<Tuple> {
        if critical.is_empty() || a.is_empty() {
            return prev.clone();
        }
        self.pre_on_inputs(a, critical)
    }

    fn pre_on_inputs(&mut self, a: &Antichain<Tuple>, inputs: &[Valuation]) -> Antichain<Tuple> {
        // antichains of the single inputs, ordered by size, none covering
        // another one
        let mut per_input: Vec<Antichain<Tuple>> = Vec::new();
        for sigma in inputs.iter() {
            let mut current = Antichain::new();
            for t in a.iter() {
                let key = (t.clone(), *sigma);
                let omega = match self.omega_cache.get(&key) {
                    Some(o) => o.clone(),
                    None => {
                        let o = t.omega(&self.info, *sigma);
                        self.omega_cache.insert(key, o.clone());
                        o
                    }
                };
                if let Some(o) = omega {
                    current.insert(o);
                }
            }

            if per_input.iter().any(|p| p.covered_by(&current) && !current.covered_by(p)) {
                continue;
            }
            per_input.retain(|p| !current.covered_by(p));
            let pos = per_input
                .iter()
                .position(|p| p.len() >= current.len())
                .unwrap_or(per_input.len());
            per_input.insert(pos, current);
        }

        let mut iter = per_input.into_iter();
        let Some(first) = iter.next() else {
            return Antichain::new();
        };
        iter.fold(first, |acc, p| acc.intersection(&p))
    }

    fn cached_succ(&mut self, t: &Tuple, sigma: Valuation) -> Tuple {
        let key = (t.clone(), sigma);
        if let Some(s) = self.succ_cache.get(&key) {
            return s.clone();
        }
        let s = t.succ(&self.info, sigma);
        self.succ_cache.insert(key, s.clone());
        s
    }

    /// Critical inputs for the system positions `a`
    ///
    /// Looks for a tuple of `a` that is losing in one step: for each of its
    /// minimal successors some input leads outside of `a`. Inputs found for
    /// earlier successors are tried first. The inputs found for the first
    /// such tuple are returned; if there is none, the result is empty.
    pub fn critical_set(&mut self, a: &Antichain<Tuple>) -> Vec<Valuation> {
        let n_inputs = self.info.alphabet().sigma_size(Player::Environment);

        for t in a.iter() {
            if !self.min_succ_cache.contains_key(t) {
                let min_succ = t.min_succ(&self.info);
                self.min_succ_cache.insert(t.clone(), min_succ);
            }
            let min_succ = self
                .min_succ_cache
                .get(t)
                .map(|m| m.iter().cloned().collect::<Vec<_>>())
                .unwrap_or_default();

            let mut current: Vec<Valuation> = Vec::new();
            let mut one_step_losing = true;
            for s in min_succ.iter() {
                let mut covered = false;
                for i in current.iter() {
                    if !a.contains_element(&self.cached_succ(s, *i)) {
                        covered = true;
                        break;
                    }
                }
                if covered {
                    continue;
                }

                let mut found = false;
                for i in 0..n_inputs {
                    if current.contains(&i) {
                        continue;
                    }
                    if !a.contains_element(&self.cached_succ(s, i)) {
                        current.push(i);
                        found = true;
                        break;
                    }
                }
                if !found {
                    one_step_losing = false;
                    break;
                }
            }

            if one_step_losing {
                return current;
            }
        }

        Vec::new()
    }

    /// Predecessor of `player`, using the critical signals for the
    /// environment if enabled
    ///
    /// Returns the new antichain and the size of the critical set, if one was
    /// computed.
    fn compute_pre(
        &mut self,
        a: &Antichain<Tuple>,
        prev: &Antichain<Tuple>,
        player: Player,
    ) -> (Antichain<Tuple>, Option<usize>) {
        let (pre, n_critical) = if self.critical && player == Player::Environment {
            let critical = self.critical_set(a);
            debug!("Number of critical signals: {}", critical.len());
            (self.pre_crit(a, prev, &critical), Some(critical.len()))
        } else {
            (self.pre(a, prev, player), None)
        };

        debug!("Antichain size ({player}): {}", pre.len());
        trace!("{pre}");
        (pre, n_critical)
    }

    /// Compute the fixpoint starting from the antichains of `start`
    pub fn solve(&mut self, start: &SafetyGame) -> (SafetyGame, FixpointReport) {
        let start_time = Instant::now();
        let starting = start.starting_player();
        let other = starting.other();

        let mut a1 = start.positions(starting).clone();
        let (mut a2, crit) = self.compute_pre(&a1, start.positions(other), other);
        let mut max_critical = crit;
        let (mut a3, crit) = self.compute_pre(&a2, &a1, starting);
        max_critical = max_critical.max(crit);

        let mut report = FixpointReport {
            max_size_starting: a1.len().max(a3.len()),
            max_size_other: a2.len(),
            ..Default::default()
        };

        while !a1.covered_by(&a3) {
            report.iterations += 1;

            a1 = a3;
            let (next, crit) = self.compute_pre(&a1, &a2, other);
            a2 = next;
            max_critical = max_critical.max(crit);

            // without critical inputs the environment antichain did not
            // change, so neither will the next system antichain
            if starting == Player::System && crit == Some(0) {
                break;
            }

            let (next, crit) = self.compute_pre(&a2, &a1, starting);
            a3 = next;
            max_critical = max_critical.max(crit);

            report.max_size_other = report.max_size_other.max(a2.len());
            report.max_size_starting = report.max_size_starting.max(a3.len());
        }

        report.max_critical = max_critical;
        report.elapsed = start_time.elapsed();

        info!(
            "Backward algorithm: {} iterations, maximal antichain sizes ({}, {}), fixpoint sizes ({}, {}), {:.3}s",
            report.iterations,
            report.max_size_starting,
            report.max_size_other,
            a1.len(),
            a2.len(),
            report.elapsed.as_secs_f64()
        );
        if let Some(c) = report.max_critical {
            info!("Maximal size of critical set: {c}");
        }

        let (positions_o, positions_i) = match starting {
            Player::System => (a1, a2),
            Player::Environment => (a2, a1),
        };
        let game = SafetyGame::new(positions_o, positions_i, starting, self.info.clone());
        (game, report)
    }
}
