//! Counting functions
//!
//! A [`CountingFunction`] assigns to every state of a turn-based automaton
//! owned by one player the maximal number of accepting states visited by a
//! run ending in that state, bounded by `K + 1`. The value `-1` marks states
//! no run ends in. States owned by the other player always map to `-1`.
//!
//! The automata, their bounds and the layout of the composed counter vector
//! are kept in a [`CfInfo`], shared by all counting functions of one game.

use std::{
    cmp::{max, min},
    fmt,
    hash::{Hash, Hasher},
    rc::Rc,
};

use acacia_antichain::{Meet, PartialOrdCompResult, PartialOrder};
use acacia_automaton::{
    Player,
    alphabet::{Alphabet, Valuation},
    turn_based::TurnBasedAutomaton,
    weights::Weights,
};

/// One automaton contributing to a (composed) counting function
#[derive(Debug, Clone)]
pub struct CfComponent {
    automaton: Rc<TurnBasedAutomaton>,
    k: i32,
    offset: usize,
}

impl CfComponent {
    /// Automaton of the component
    pub fn automaton(&self) -> &TurnBasedAutomaton {
        &self.automaton
    }

    /// Bound on the number of visits to accepting states
    pub fn k(&self) -> i32 {
        self.k
    }

    /// Index of the first counter of this component in the composed vector
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of counters of this component
    pub fn size(&self) -> usize {
        self.automaton.len()
    }

    /// Global indices of the counters relevant for a function of `player`
    fn relevant(&self, player: Player) -> std::ops::Range<usize> {
        let r = self.automaton.player_states(player);
        r.start + self.offset..r.end + self.offset
    }
}

/// Information shared by all counting functions of a game
#[derive(Debug, Clone)]
pub struct CfInfo {
    components: Vec<CfComponent>,
    starting_player: Player,
    size: usize,
}

impl CfInfo {
    /// Information for the counting functions of a single automaton with
    /// bound `k`
    pub fn new(automaton: Rc<TurnBasedAutomaton>, k: usize) -> Self {
        let starting_player = automaton.starting_player();
        let size = automaton.len();
        Self {
            components: vec![CfComponent {
                automaton,
                k: k as i32,
                offset: 0,
            }],
            starting_player,
            size,
        }
    }

    /// Concatenate the components of several infos
    ///
    /// The starting player is taken from the first info. Returns `None` if
    /// `infos` is empty.
    pub fn compose(infos: &[&CfInfo]) -> Option<Self> {
        let starting_player = infos.first()?.starting_player;

        let mut components = Vec::new();
        let mut size = 0;
        for c in infos.iter().flat_map(|i| i.components.iter()) {
            components.push(CfComponent {
                automaton: c.automaton.clone(),
                k: c.k,
                offset: size,
            });
            size += c.size();
        }

        Some(Self {
            components,
            starting_player,
            size,
        })
    }

    /// Components of the composed counter vector
    pub fn components(&self) -> &[CfComponent] {
        &self.components
    }

    /// Player owning the initial states
    pub fn starting_player(&self) -> Player {
        self.starting_player
    }

    /// Total number of counters
    pub fn size(&self) -> usize {
        self.size
    }

    /// Alphabet of the game
    pub fn alphabet(&self) -> &Alphabet {
        self.components[0].automaton.alphabet()
    }

    /// Weight vectors of the game, taken from the first component
    pub fn weights(&self) -> &Weights {
        self.components[0].automaton.weights()
    }

    /// Greatest counting function of `player`
    ///
    /// Unbounded states map to `K` (or to `-1` if `K = 0` and the state is
    /// accepting), bounded states to `0`. Trash states map to `-1`.
    pub fn build_maximal(&self, player: Player) -> CountingFunction {
        let mut mapping = vec![-1; self.size];
        for c in self.components.iter() {
            let aut = &c.automaton;
            for q in aut.player_states(player) {
                let state = aut.state(q);
                if state.is_trash() {
                    continue;
                }
                mapping[c.offset + q] = if !state.is_unbounded() {
                    0
                } else if c.k == 0 && state.is_accepting() {
                    -1
                } else {
                    c.k
                };
            }
        }
        CountingFunction::new(player, mapping)
    }

    /// Counting function of the initial position
    pub fn build_initial(&self) -> CountingFunction {
        let mut mapping = vec![-1; self.size];
        for c in self.components.iter() {
            let init = c.automaton.initial();
            mapping[c.offset + init] = c.automaton.state(init).is_accepting() as i32;
        }
        CountingFunction::new(self.starting_player, mapping)
    }

    /// Counting function reached from `cf` when its owner plays `sigma`
    ///
    /// Entering an accepting state increments the counter, saturating at
    /// `K + 1`.
    pub fn succ(&self, cf: &CountingFunction, sigma: Valuation) -> CountingFunction {
        let mut mapping = vec![-1; self.size];
        for c in self.components.iter() {
            let aut = &c.automaton;
            for i in c.relevant(cf.player) {
                let v = cf.mapping[i];
                if v < 0 {
                    continue;
                }
                for s in aut.succ(i - c.offset, sigma) {
                    let val = if aut.state(s).is_accepting() {
                        min(c.k + 1, v + 1)
                    } else {
                        v
                    };
                    let target = &mut mapping[c.offset + s];
                    *target = max(*target, val);
                }
            }
        }
        CountingFunction::new(cf.player.other(), mapping)
    }

    /// Greatest counting function of the other player from which playing
    /// `sigma` leads to a function smaller or equal to `cf`
    pub fn omega(&self, cf: &CountingFunction, sigma: Valuation) -> CountingFunction {
        let mut res = self.build_maximal(cf.player.other());
        for c in self.components.iter() {
            let aut = &c.automaton;
            for i in c.relevant(cf.player) {
                let val = if aut.state(i - c.offset).is_accepting() {
                    max(-1, cf.mapping[i] - 1)
                } else {
                    cf.mapping[i]
                };
                for p in aut.pred(i - c.offset, sigma) {
                    let target = &mut res.mapping[c.offset + p];
                    if aut.state(p).is_accepting() && val == 0 {
                        *target = -1;
                    } else {
                        *target = min(*target, val);
                    }
                }
            }
        }
        res.update_summary();
        res
    }
}

/// Counter vector of one player
///
/// Comparison first rejects on the cached sum and maximum of the counters,
/// then compares component-wise. Functions of different players are
/// incomparable.
#[derive(Debug, Clone)]
pub struct CountingFunction {
    player: Player,
    mapping: Vec<i32>,
    sum: i64,
    max: i32,
}

impl CountingFunction {
    /// Create a counting function of `player` from its counters
    pub fn new(player: Player, mapping: Vec<i32>) -> Self {
        let mut cf = Self {
            player,
            mapping,
            sum: 0,
            max: -1,
        };
        cf.update_summary();
        cf
    }

    fn update_summary(&mut self) {
        self.sum = self.mapping.iter().map(|v| *v as i64).sum();
        self.max = self.mapping.iter().copied().max().unwrap_or(-1).max(-1);
    }

    /// Player moving next from positions with this function
    pub fn player(&self) -> Player {
        self.player
    }

    /// Counters, `-1` for states not reached
    pub fn mapping(&self) -> &[i32] {
        &self.mapping
    }

    /// Sum of the counters
    pub fn sum(&self) -> i64 {
        self.sum
    }

    /// Largest counter, `-1` if no state is reached
    pub fn max_counter(&self) -> i32 {
        self.max
    }

    /// Check whether no state is reached
    pub fn is_empty(&self) -> bool {
        self.mapping.iter().all(|v| *v == -1)
    }

    /// Concatenate the counters of several functions
    ///
    /// The player is taken from the first function.
    pub fn compose(cfs: &[&CountingFunction]) -> Self {
        let player = cfs.first().map(|cf| cf.player).unwrap_or(Player::Environment);
        let mapping = cfs
            .iter()
            .flat_map(|cf| cf.mapping.iter().copied())
            .collect();
        Self::new(player, mapping)
    }
}

impl PartialEq for CountingFunction {
    fn eq(&self, other: &Self) -> bool {
        self.player == other.player && self.mapping == other.mapping
    }
}

impl Eq for CountingFunction {}

impl Hash for CountingFunction {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.player.hash(state);
        self.mapping.hash(state);
    }
}

impl PartialOrder for CountingFunction {
    fn part_cmp(&self, other: &Self) -> PartialOrdCompResult {
        if self.player != other.player || self.mapping.len() != other.mapping.len() {
            return PartialOrdCompResult::Incomparable;
        }
        self.mapping.part_cmp(&other.mapping)
    }

    fn is_smaller_or_equal(&self, other: &Self) -> bool {
        if self.player != other.player
            || self.mapping.len() != other.mapping.len()
            || self.sum > other.sum
            || self.max > other.max
        {
            return false;
        }
        self.mapping
            .iter()
            .zip(other.mapping.iter())
            .all(|(a, b)| a <= b)
    }
}

impl Meet for CountingFunction {
    fn meet(&self, other: &Self) -> Self {
        debug_assert_eq!(self.player, other.player);
        let mapping = self
            .mapping
            .iter()
            .zip(other.mapping.iter())
            .map(|(a, b)| min(*a, *b))
            .collect();
        Self::new(self.player, mapping)
    }
}

impl fmt::Display for CountingFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: (", self.player)?;
        let mut first = true;
        for v in self.mapping.iter() {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{v}")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use acacia_antichain::{Meet, PartialOrder};
    use acacia_automaton::{
        Player,
        alphabet::Alphabet,
        cobuchi::CoBuchiAutomatonBuilder,
        label::{Guard, GuardLiteral},
        turn_based::{TurnBasedAutomaton, builder::TurnBasedAutomatonBuilder},
    };

    use crate::counting::{CfInfo, CountingFunction};

    /// `init --r--> bad --T--> bad`, `init --!r--> init`, `bad` accepting
    fn request_automaton() -> TurnBasedAutomaton {
        let cobuchi = CoBuchiAutomatonBuilder::new("u")
            .with_state("init", false)
            .unwrap()
            .with_state("bad", true)
            .unwrap()
            .with_initial_state("init")
            .unwrap()
            .with_edge(
                "init",
                Guard::new(vec![vec![GuardLiteral::new("r", true)]]),
                "bad",
            )
            .unwrap()
            .with_edge(
                "init",
                Guard::new(vec![vec![GuardLiteral::new("r", false)]]),
                "init",
            )
            .unwrap()
            .with_edge("bad", Guard::tautology(), "bad")
            .unwrap()
            .build()
            .unwrap();

        TurnBasedAutomatonBuilder::new(Alphabet::new(["r"], ["g"]).unwrap(), Player::Environment)
            .with_automaton(cobuchi)
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn test_build_maximal_and_initial() {
        let aut = Rc::new(request_automaton());
        let n_start = aut.start_index_other();
        let info = CfInfo::new(aut.clone(), 2);

        let max_i = info.build_maximal(Player::Environment);
        assert!(max_i.mapping()[..n_start].iter().all(|v| *v == 2));
        assert!(max_i.mapping()[n_start..].iter().all(|v| *v == -1));

        let init = info.build_initial();
        assert_eq!(init.player(), Player::Environment);
        assert_eq!(init.mapping()[0], 0);
        assert_eq!(init.max_counter(), 0);
        assert!(init.is_smaller_or_equal(&max_i));
    }

    #[test]
    fn test_maximal_with_k_zero_excludes_accepting_states() {
        let aut = Rc::new(request_automaton());
        let info = CfInfo::new(aut.clone(), 0);

        let max_o = info.build_maximal(Player::System);
        for q in aut.player_states(Player::System) {
            let expected = if aut.state(q).is_accepting() { -1 } else { 0 };
            assert_eq!(max_o.mapping()[q], expected);
        }
    }

    #[test]
    fn test_succ_counts_accepting_visits() {
        let aut = Rc::new(request_automaton());
        let info = CfInfo::new(aut.clone(), 1);

        // environment plays r: the turn state of the edge to `bad` is reached
        let cf = info.succ(&info.build_initial(), 1);
        assert_eq!(cf.player(), Player::System);
        let reached = cf
            .mapping()
            .iter()
            .enumerate()
            .filter(|(_, v)| **v >= 0)
            .map(|(q, _)| q)
            .collect::<Vec<_>>();
        assert_eq!(reached.len(), 1);
        assert!(!aut.state(reached[0]).is_accepting());

        // system moves to `bad`, then `bad` moves to its accepting turn state
        let cf = info.succ(&cf, 0);
        assert_eq!(cf.mapping()[1], 0);
        let cf = info.succ(&info.succ(&cf, 0), 0);
        assert_eq!(cf.max_counter(), 1);
        let cf = info.succ(&info.succ(&cf, 0), 0);
        assert_eq!(cf.max_counter(), 2);
        let cf = info.succ(&info.succ(&cf, 0), 0);
        assert_eq!(cf.max_counter(), 2);
    }

    #[test]
    fn test_omega_of_maximal_is_below_maximal() {
        let aut = Rc::new(request_automaton());
        let info = CfInfo::new(aut, 1);

        for player in [Player::Environment, Player::System] {
            let max = info.build_maximal(player);
            for sigma in info.alphabet().valuations(player.other()) {
                let pre = info.omega(&max, sigma);
                assert_eq!(pre.player(), player.other());
                assert!(pre.is_smaller_or_equal(&info.build_maximal(player.other())));
            }
        }
    }

    #[test]
    fn test_order_and_meet() {
        let a = CountingFunction::new(Player::System, vec![0, 1, -1]);
        let b = CountingFunction::new(Player::System, vec![1, 0, -1]);
        let c = CountingFunction::new(Player::System, vec![1, 1, -1]);
        let d = CountingFunction::new(Player::Environment, vec![1, 1, -1]);

        assert!(!a.is_smaller_or_equal(&b));
        assert!(!b.is_smaller_or_equal(&a));
        assert!(a.is_smaller_or_equal(&c));
        assert!(!c.is_smaller_or_equal(&d));

        let m = a.meet(&b);
        assert_eq!(m.mapping(), &[0, 0, -1]);
        assert_eq!(m.sum(), -1);
        assert!(m.is_smaller_or_equal(&a) && m.is_smaller_or_equal(&b));
    }

    #[test]
    fn test_compose() {
        let aut = Rc::new(request_automaton());
        let info1 = CfInfo::new(aut.clone(), 1);
        let info2 = CfInfo::new(aut.clone(), 2);
        let info = CfInfo::compose(&[&info1, &info2]).unwrap();

        assert_eq!(info.size(), 2 * aut.len());
        assert_eq!(info.components()[1].offset(), aut.len());

        let cf = CountingFunction::compose(&[&info1.build_initial(), &info2.build_initial()]);
        assert_eq!(cf, info.build_initial());
        assert!(!cf.is_empty());
        assert!(CountingFunction::new(Player::System, vec![-1, -1]).is_empty());
    }
}
