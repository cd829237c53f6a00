use super::arena::{BracketArena, MatchAddress};
use crate::domain::{Tournament, TournamentStatus, UserId};
use crate::errors::{EngineError, EngineResult};
use crate::store::RecordKind;

/// What recording a winner did to the bracket
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// Winner moved into the given next-round match
    Advanced(MatchAddress),
    /// The final was decided
    Champion(UserId),
}

/// Record `winner_id` for `match_id` and push it one round forward.
///
/// Operates on an in-memory copy; callers persist the tournament afterwards
/// inside the same transaction that read it.
pub fn record_winner(tournament: &mut Tournament, match_id: &str, winner_id: &str) -> EngineResult<Progress> {
    let mut arena = BracketArena::from_rounds(std::mem::take(&mut tournament.rounds));
    let result = apply(&mut arena, tournament, match_id, winner_id);
    tournament.rounds = arena.into_rounds();
    result
}

fn apply(
    arena: &mut BracketArena,
    tournament: &mut Tournament,
    match_id: &str,
    winner_id: &str,
) -> EngineResult<Progress> {
    let address = arena
        .locate(match_id)
        .ok_or_else(|| EngineError::not_found(RecordKind::TournamentMatch, match_id))?;
    let is_final = arena.is_final(address);

    let node = arena
        .node_mut(address)
        .ok_or_else(|| EngineError::not_found(RecordKind::TournamentMatch, match_id))?;

    if node.is_decided() || tournament.is_complete() {
        return Err(EngineError::AlreadyDecided { match_id: match_id.to_string() });
    }
    if !node.has_player(winner_id) {
        return Err(EngineError::InvalidWinner {
            match_id: match_id.to_string(),
            winner_id: winner_id.to_string(),
        });
    }
    if !node.is_ready() {
        return Err(EngineError::invalid_input(format!(
            "match '{}' is still waiting for an opponent",
            match_id
        )));
    }

    let winner = winner_id.to_string();
    let progress = if is_final {
        Progress::Champion(winner.clone())
    } else {
        Progress::Advanced(arena.advance(address, &winner)?)
    };

    if let Some(node) = arena.node_mut(address) {
        node.winner_id = Some(winner.clone());
    }

    match &progress {
        Progress::Champion(_) => {
            tournament.status = TournamentStatus::Complete;
            tournament.champion_id = Some(winner);
        }
        Progress::Advanced(_) if tournament.status == TournamentStatus::Pending => {
            tournament.status = TournamentStatus::Ongoing;
        }
        Progress::Advanced(_) => {}
    }
    Ok(progress)
}
