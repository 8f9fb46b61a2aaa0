//! Solved safety games
//!
//! A [`SafetyGame`] holds the antichains of winning positions of both
//! players together with the counting information they refer to. Solvers
//! take a game holding the start antichains and return the game at the
//! fixpoint.

use std::{fmt, rc::Rc};

use acacia_antichain::Antichain;
use acacia_automaton::Player;
use log::trace;

use crate::{counting::CfInfo, tuple::Tuple};

/// Winning positions of both players
#[derive(Debug, Clone)]
pub struct SafetyGame {
    positions_o: Antichain<Tuple>,
    positions_i: Antichain<Tuple>,
    starting_player: Player,
    info: Rc<CfInfo>,
}

impl SafetyGame {
    /// Create a game from the antichains of both players
    pub fn new(
        positions_o: Antichain<Tuple>,
        positions_i: Antichain<Tuple>,
        starting_player: Player,
        info: Rc<CfInfo>,
    ) -> Self {
        Self {
            positions_o,
            positions_i,
            starting_player,
            info,
        }
    }

    /// Start antichains of a game: the maximal tuple of each player with
    /// credit caps `caps`
    pub fn start(info: Rc<CfInfo>, caps: &[i32]) -> Self {
        let positions_o = Antichain::singleton(Tuple::build_maximal(&info, Player::System, caps));
        let positions_i =
            Antichain::singleton(Tuple::build_maximal(&info, Player::Environment, caps));
        let starting_player = info.starting_player();
        Self::new(positions_o, positions_i, starting_player, info)
    }

    /// Winning positions of the system
    pub fn positions_o(&self) -> &Antichain<Tuple> {
        &self.positions_o
    }

    /// Winning positions of the environment moves
    pub fn positions_i(&self) -> &Antichain<Tuple> {
        &self.positions_i
    }

    /// Positions where `player` moves next
    pub fn positions(&self, player: Player) -> &Antichain<Tuple> {
        match player {
            Player::System => &self.positions_o,
            Player::Environment => &self.positions_i,
        }
    }

    /// Player moving first
    pub fn starting_player(&self) -> Player {
        self.starting_player
    }

    /// Counting information of the positions
    pub fn info(&self) -> &Rc<CfInfo> {
        &self.info
    }

    /// Check whether the system wins from the initial position
    ///
    /// The credit caps of the initial tuple are taken from the first winning
    /// position of the system. If the environment starts, every input must
    /// lead into the winning positions of the system; otherwise the initial
    /// tuple itself must be winning.
    pub fn has_winning_strategy(&self) -> bool {
        let Some(first) = self.positions_o.iter().next() else {
            return false;
        };

        let p0 = Tuple::build_initial(&self.info, first.credits().caps());
        trace!("Initial tuple: {p0}");
        match self.starting_player {
            Player::Environment => self
                .info
                .alphabet()
                .valuations(Player::Environment)
                .all(|sigma| self.positions_o.contains_element(&p0.succ(&self.info, sigma))),
            Player::System => self.positions_o.contains_element(&p0),
        }
    }

    /// Replace the credits of every position by zero credits with caps
    /// `caps`
    ///
    /// Used to solve a game with costs, starting from the fixpoint of the
    /// same game without costs.
    pub fn add_credits(&self, caps: &[i32]) -> Self {
        Self::new(
            self.positions_o.map(|t| t.with_credits(caps)),
            self.positions_i.map(|t| t.with_credits(caps)),
            self.starting_player,
            self.info.clone(),
        )
    }

    /// Compose the games of several specifications into the game of their
    /// conjunction
    ///
    /// Returns `None` if `games` is empty or the games do not agree on the
    /// starting player.
    pub fn compose(games: &[&SafetyGame]) -> Option<Self> {
        let starting_player = games.first()?.starting_player;
        if games.iter().any(|g| g.starting_player != starting_player) {
            return None;
        }

        let infos = games.iter().map(|g| g.info.as_ref()).collect::<Vec<_>>();
        let info = CfInfo::compose(&infos)?;

        let positions_o = games.iter().map(|g| &g.positions_o).collect::<Vec<_>>();
        let positions_i = games.iter().map(|g| &g.positions_i).collect::<Vec<_>>();

        Some(Self::new(
            Antichain::compose(&positions_o, Tuple::compose),
            Antichain::compose(&positions_i, Tuple::compose),
            starting_player,
            Rc::new(info),
        ))
    }
}

impl fmt::Display for SafetyGame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Safety game (starting player {})", self.starting_player)?;
        write!(f, "System positions: {}", self.positions_o)?;
        write!(f, "Environment positions: {}", self.positions_i)
    }
}
