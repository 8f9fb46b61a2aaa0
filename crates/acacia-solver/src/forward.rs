//! On-the-fly forward solver (OTFUR)
//!
//! Instead of iterating predecessor operators, the [`ForwardSolver`] explores
//! the positions reachable from the initial tuple depth-first. Edges are kept
//! on a stack; a position is declared losing when the system has no safe
//! successor left or the environment has a losing one, and the positions
//! depending on it are reevaluated. Losing positions are collected in
//! antichains of minimal elements, so everything above a losing position is
//! losing as well.
//!
//! Only positions inside the start antichains are explored, so the forward
//! solver usually visits far fewer positions than the backward fixpoint.

use std::{
    collections::{HashMap, HashSet},
    rc::Rc,
    time::{Duration, Instant},
};

use acacia_antichain::{Antichain, PartialOrder};
use acacia_automaton::Player;
use log::{debug, info};

use crate::{counting::CfInfo, safety_game::SafetyGame, tuple::Tuple};

/// Statistics of a forward exploration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OtfurReport {
    /// Number of edges taken from the waiting stack
    pub iterations: usize,
    /// Number of positions explored
    pub passed: usize,
    /// Time spent exploring
    pub exploration: Duration,
    /// Time spent extracting the winning positions
    pub extraction: Duration,
}

/// Edge between two interned positions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Edge {
    from: usize,
    to: usize,
}

/// Forward solver for the safety game of one counting information
#[derive(Debug)]
pub struct ForwardSolver {
    info: Rc<CfInfo>,
    caps: Vec<i32>,
}

impl ForwardSolver {
    /// Create a forward solver exploring from the initial tuple with credit
    /// caps `caps`
    pub fn new(info: Rc<CfInfo>, caps: &[i32]) -> Self {
        Self {
            info,
            caps: caps.to_vec(),
        }
    }

    /// Explore the game restricted to the positions of `start`
    ///
    /// The resulting game holds the positions reachable from the initial
    /// tuple when the system follows a winning strategy. Both antichains are
    /// empty if the initial tuple is losing.
    pub fn solve(&self, start: &SafetyGame) -> (SafetyGame, OtfurReport) {
        let start_time = Instant::now();
        let mut exploration = Exploration::new(&self.info, start);

        let s_ini = exploration.intern(Tuple::build_initial(&self.info, &self.caps));
        let s_ini_tuple = exploration.tuples[s_ini].clone();
        if !exploration.is_safe(&s_ini_tuple)
            || (s_ini_tuple.player() == Player::System
                && !exploration.has_safe_successor(&s_ini_tuple, false))
        {
            exploration.add_to_losing(s_ini);
        } else {
            exploration.add_to_waiting(s_ini);
            exploration.passed.insert(s_ini);
        }

        let mut report = OtfurReport {
            passed: 1,
            ..Default::default()
        };
        while !exploration.is_losing(s_ini) {
            let Some(edge) = exploration.waiting.pop() else {
                break;
            };
            report.iterations += 1;
            report.passed += exploration.process(edge);
        }
        report.exploration = start_time.elapsed();

        let start_time = Instant::now();
        let game =
            exploration.winning_positions(s_ini, start.starting_player(), self.info.clone());
        report.extraction = start_time.elapsed();

        info!(
            "Forward algorithm: {} iterations, {} positions explored, exploration {:.3}s, extraction {:.3}s",
            report.iterations,
            report.passed,
            report.exploration.as_secs_f64(),
            report.extraction.as_secs_f64()
        );
        debug!(
            "Winning positions (System, Environment): ({}, {})",
            game.positions_o().len(),
            game.positions_i().len()
        );

        (game, report)
    }
}

/// State of one forward exploration
struct Exploration<'a> {
    info: &'a CfInfo,
    start: &'a SafetyGame,
    tuples: Vec<Tuple>,
    ids: HashMap<Tuple, usize>,
    passed: HashSet<usize>,
    depend: HashMap<usize, Vec<Edge>>,
    succ_to_visit: HashMap<usize, Vec<Edge>>,
    losing_o: Antichain<Tuple>,
    losing_i: Antichain<Tuple>,
    waiting: Vec<Edge>,
}

impl<'a> Exploration<'a> {
    fn new(info: &'a CfInfo, start: &'a SafetyGame) -> Self {
        Self {
            info,
            start,
            tuples: Vec::new(),
            ids: HashMap::new(),
            passed: HashSet::new(),
            depend: HashMap::new(),
            succ_to_visit: HashMap::new(),
            losing_o: Antichain::new_minimal(),
            losing_i: Antichain::new_minimal(),
            waiting: Vec::new(),
        }
    }

    fn intern(&mut self, t: Tuple) -> usize {
        if let Some(id) = self.ids.get(&t) {
            return *id;
        }
        let id = self.tuples.len();
        self.ids.insert(t.clone(), id);
        self.tuples.push(t);
        id
    }

    /// Check whether `t` lies in the start antichain of its player, i.e.
    /// no counter exceeds `K` and no credit ran out
    fn is_safe(&self, t: &Tuple) -> bool {
        self.start.positions(t.player()).contains_element(t)
    }

    fn losing(&self, player: Player) -> &Antichain<Tuple> {
        match player {
            Player::System => &self.losing_o,
            Player::Environment => &self.losing_i,
        }
    }

    fn is_losing_tuple(&self, t: &Tuple) -> bool {
        self.losing(t.player()).contains_element(t)
    }

    fn is_losing(&self, id: usize) -> bool {
        self.is_losing_tuple(&self.tuples[id])
    }

    fn add_to_losing(&mut self, id: usize) {
        let t = self.tuples[id].clone();
        match t.player() {
            Player::System => self.losing_o.insert(t),
            Player::Environment => self.losing_i.insert(t),
        };
    }

    /// Record that `edge.from` has to be reevaluated once `to` turns out to
    /// be losing
    fn add_to_depend(&mut self, to: usize, edge: Edge) {
        let deps = self.depend.entry(to).or_default();
        if !deps.iter().any(|d| d.from == edge.from) {
            deps.push(edge);
        }
    }

    fn take_dependencies(&mut self, id: usize) -> Vec<Edge> {
        self.depend
            .get_mut(&id)
            .map(std::mem::take)
            .unwrap_or_default()
    }

    /// Check whether the system position `t` has a successor in the safe
    /// environment positions, optionally one that is not known to be losing
    fn has_safe_successor(&self, t: &Tuple, non_losing: bool) -> bool {
        self.info
            .alphabet()
            .valuations(Player::System)
            .map(|sigma| t.succ(self.info, sigma))
            .any(|s| self.is_safe(&s) && (!non_losing || !self.is_losing_tuple(&s)))
    }

    /// Check whether the environment position `t` has a losing successor
    fn has_losing_successor(&self, t: &Tuple) -> bool {
        self.info
            .alphabet()
            .valuations(Player::Environment)
            .any(|sigma| self.is_losing_tuple(&t.succ(self.info, sigma)))
    }

    /// Push the edges to the successors of `id` that are worth exploring
    ///
    /// For a system position these are its minimal safe successors not known
    /// to be losing; they are stored by increasing sum of counters and only
    /// the first one is pushed. For an environment position the maximal
    /// successors are pushed so that the one with the largest counters is
    /// explored first.
    fn add_to_waiting(&mut self, id: usize) {
        let t = self.tuples[id].clone();
        let player = t.player();

        let mut succs: Vec<Edge> = Vec::new();
        for sigma in self.info.alphabet().valuations(player) {
            let s = t.succ(self.info, sigma);
            let keep_minimal = player == Player::System;
            if keep_minimal && (!self.is_safe(&s) || self.is_losing_tuple(&s)) {
                continue;
            }

            let covered = |a: &Tuple, b: &Tuple| {
                if keep_minimal {
                    b.is_smaller_or_equal(a)
                } else {
                    a.is_smaller_or_equal(b)
                }
            };
            if succs.iter().any(|e| covered(&s, &self.tuples[e.to])) {
                continue;
            }
            succs.retain(|e| !covered(&self.tuples[e.to], &s));
            let to = self.intern(s);
            succs.push(Edge { from: id, to });
        }

        let mut sorted: Vec<Edge> = Vec::with_capacity(succs.len());
        for e in succs {
            let sum = self.tuples[e.to].cf().sum();
            let pos = sorted
                .iter()
                .position(|o| self.tuples[o.to].cf().sum() >= sum)
                .unwrap_or(sorted.len());
            sorted.insert(pos, e);
        }

        if player == Player::System {
            self.succ_to_visit.insert(id, sorted);
            if let Some(e) = self.next_successor_to_visit(id) {
                self.waiting.push(e);
            }
        } else {
            self.waiting.extend(sorted);
        }
    }

    fn has_successor_to_visit(&self, id: usize) -> bool {
        self.succ_to_visit
            .get(&id)
            .is_some_and(|l| l.iter().any(|e| !self.is_losing(e.to)))
    }

    /// Remove and return the first remaining successor edge of the system
    /// position `id` leading to an explored position that is not losing, or
    /// the first remaining edge if there is none
    fn next_successor_to_visit(&mut self, id: usize) -> Option<Edge> {
        let list = self.succ_to_visit.get(&id)?;
        if list.is_empty() {
            return None;
        }
        let pos = list
            .iter()
            .position(|e| self.passed.contains(&e.to) && !self.is_losing(e.to))
            .unwrap_or(0);
        self.succ_to_visit.get_mut(&id).map(|l| l.remove(pos))
    }

    /// Process one edge of the waiting stack
    ///
    /// Returns the number of newly explored positions.
    fn process(&mut self, edge: Edge) -> usize {
        let Edge { from, to } = edge;

        if self.is_losing(from) {
            let deps = self.take_dependencies(from);
            self.waiting.extend(deps);
            return 0;
        }

        if !self.passed.contains(&to) {
            self.passed.insert(to);
            let to_tuple = self.tuples[to].clone();
            if self.is_losing(to) {
                self.waiting.push(edge);
            } else if !self.is_safe(&to_tuple)
                || (to_tuple.player() == Player::System
                    && !self.has_safe_successor(&to_tuple, true))
            {
                self.waiting.push(edge);
                self.add_to_losing(to);
            } else {
                self.add_to_depend(to, edge);
                self.add_to_waiting(to);
            }
            return 1;
        }

        if self.tuples[from].player() == Player::System {
            if !self.is_losing(to) {
                self.add_to_depend(to, edge);
            } else if !self.has_successor_to_visit(from) {
                self.add_to_losing(from);
                let deps = self.take_dependencies(from);
                self.waiting.extend(deps);
            } else if let Some(e) = self.next_successor_to_visit(from) {
                self.waiting.push(e);
            }
        } else {
            let from_tuple = self.tuples[from].clone();
            if self.is_losing(to) || self.has_losing_successor(&from_tuple) {
                self.add_to_losing(from);
                let deps = self.take_dependencies(from);
                self.waiting.extend(deps);
            }
            if !self.is_losing(to) {
                self.add_to_depend(to, edge);
            }
        }
        0
    }

    /// Collect the positions reachable from `s_ini` when the system always
    /// moves to an explored position that is not losing
    ///
    /// Environment positions are represented by the maximal successors
    /// covering them.
    fn winning_positions(
        &self,
        s_ini: usize,
        starting_player: Player,
        info: Rc<CfInfo>,
    ) -> SafetyGame {
        let mut positions_o = Antichain::new();
        let mut positions_i = Antichain::new();

        if !self.is_losing(s_ini) {
            let mut visited: HashSet<Tuple> = HashSet::new();
            let mut stack = vec![self.tuples[s_ini].clone()];

            while let Some(t) = stack.pop() {
                if !visited.insert(t.clone()) {
                    continue;
                }

                if t.player() == Player::System {
                    let mut next = None;
                    for sigma in self.info.alphabet().valuations(Player::System) {
                        let s = t.succ(self.info, sigma);
                        let explored =
                            self.ids.get(&s).is_some_and(|id| self.passed.contains(id));
                        if self.is_losing_tuple(&s) || !explored {
                            continue;
                        }
                        if visited.contains(&s) {
                            next = None;
                            break;
                        }
                        next = Some(s);
                    }
                    positions_o.insert(t);
                    stack.extend(next);
                } else {
                    let max_succ = t.max_succ(self.info);
                    let mut children = Vec::new();
                    for sigma in self.info.alphabet().valuations(Player::Environment) {
                        let s = t.succ(self.info, sigma);
                        if let Some(m) = max_succ.find_covering(&s)
                            && !visited.contains(m)
                            && !children.contains(m)
                        {
                            children.push(m.clone());
                        }
                    }
                    positions_i.insert(t);
                    stack.extend(children.into_iter().rev());
                }
            }
        }

        SafetyGame::new(positions_o, positions_i, starting_player, info)
    }
}
