//! Bracket matches addressed by `(round, position)`.
//!
//! The winner of round `r` position `i` always feeds round `r + 1` position
//! `i / 2`, landing in player slot 1 for even `i` and slot 2 for odd `i`.

use std::collections::{BTreeMap, HashMap};

use crate::domain::{Round, TournamentMatch, UserId};
use crate::errors::{EngineError, EngineResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MatchAddress {
    pub round: u32,
    pub position: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Player1,
    Player2,
}

impl MatchAddress {
    pub fn new(round: u32, position: usize) -> Self {
        Self { round, position }
    }

    /// The match this one feeds and the slot its winner takes there
    pub fn next(&self) -> (MatchAddress, Slot) {
        let slot = if self.position % 2 == 0 { Slot::Player1 } else { Slot::Player2 };
        (MatchAddress::new(self.round + 1, self.position / 2), slot)
    }
}

#[derive(Debug, Clone, Default)]
pub struct BracketArena {
    nodes: BTreeMap<MatchAddress, TournamentMatch>,
    by_id: HashMap<String, MatchAddress>,
}

impl BracketArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rounds(rounds: Vec<Round>) -> Self {
        let mut arena = Self::new();
        for round in rounds {
            for node in round.matches {
                arena.insert(node);
            }
        }
        arena
    }

    pub fn insert(&mut self, node: TournamentMatch) {
        let address = MatchAddress::new(node.round, node.position);
        self.by_id.insert(node.id.clone(), address);
        self.nodes.insert(address, node);
    }

    pub fn locate(&self, match_id: &str) -> Option<MatchAddress> {
        self.by_id.get(match_id).copied()
    }

    pub fn node(&self, address: MatchAddress) -> Option<&TournamentMatch> {
        self.nodes.get(&address)
    }

    pub fn node_mut(&mut self, address: MatchAddress) -> Option<&mut TournamentMatch> {
        self.nodes.get_mut(&address)
    }

    pub fn round_count(&self) -> u32 {
        self.nodes.keys().map(|a| a.round).max().unwrap_or(0)
    }

    pub fn is_final(&self, address: MatchAddress) -> bool {
        address.round == self.round_count()
    }

    /// Write `winner_id` into the slot fed by `from`.
    ///
    /// The target slot must still be empty; finding it filled means two
    /// matches were wired to the same slot and the bracket is corrupt.
    pub fn advance(&mut self, from: MatchAddress, winner_id: &UserId) -> EngineResult<MatchAddress> {
        let (target, slot) = from.next();
        let node = self.nodes.get_mut(&target).ok_or_else(|| {
            EngineError::InvariantViolation(format!(
                "no round {} match at position {} to receive a winner",
                target.round, target.position
            ))
        })?;

        let seat = match slot {
            Slot::Player1 => &mut node.player1_id,
            Slot::Player2 => &mut node.player2_id,
        };
        if let Some(existing) = seat.as_ref() {
            return Err(EngineError::InvariantViolation(format!(
                "slot {:?} of match '{}' already holds '{}'",
                slot, node.id, existing
            )));
        }
        *seat = Some(winner_id.clone());

        Ok(target)
    }

    pub fn into_rounds(self) -> Vec<Round> {
        let mut rounds: Vec<Round> = Vec::new();
        for (address, node) in self.nodes {
            match rounds.last_mut() {
                Some(round) if round.round_number == address.round => round.matches.push(node),
                _ => rounds.push(Round {
                    round_number: address.round,
                    matches: vec![node],
                }),
            }
        }
        rounds
    }
}
