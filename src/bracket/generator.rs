use std::collections::{HashSet, VecDeque};

use log::info;
use rand::seq::SliceRandom;
use rand::{thread_rng, Rng};

use super::arena::{BracketArena, MatchAddress};
use crate::domain::{Round, TournamentMatch, UserId};
use crate::errors::{EngineError, EngineResult};

/// Shape of a single-elimination bracket for a given field size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BracketLayout {
    pub participant_count: usize,
    pub bracket_size: usize,
    pub bye_count: usize,
    pub first_round_match_count: usize,
    pub total_rounds: u32,
}

impl BracketLayout {
    pub fn for_participants(participant_count: usize) -> Self {
        let bracket_size = participant_count.max(1).next_power_of_two();
        let bye_count = bracket_size - participant_count.max(1);

        Self {
            participant_count,
            bracket_size,
            bye_count,
            first_round_match_count: (participant_count.saturating_sub(bye_count)) / 2,
            total_rounds: bracket_size.trailing_zeros(),
        }
    }

    /// Number of match slots in round `round` (1-based)
    pub fn matches_in_round(&self, round: u32) -> usize {
        self.bracket_size >> round
    }
}

/// Seed a bracket from `participants` using a thread-local shuffle
pub fn generate_bracket(participants: &[UserId]) -> EngineResult<Vec<Round>> {
    generate_bracket_with_rng(participants, &mut thread_rng())
}

/// Seed a bracket with a caller-supplied random source.
///
/// Round 1 interleaves real matches and byes (match, bye, match, bye, ...),
/// so every round 2 match is fed by at most one bye whenever there are enough
/// real matches to go around. Bye winners are already written into round 2.
pub fn generate_bracket_with_rng<R>(participants: &[UserId], rng: &mut R) -> EngineResult<Vec<Round>>
where
    R: Rng + ?Sized,
{
    validate_participants(participants)?;

    let layout = BracketLayout::for_participants(participants.len());
    if layout.total_rounds == 0 {
        return Ok(Vec::new());
    }

    let mut shuffled = participants.to_vec();
    shuffled.shuffle(rng);

    let (bye_players, playing) = shuffled.split_at(layout.bye_count);
    let mut pairings: VecDeque<&[UserId]> = playing.chunks(2).collect();
    let mut byes: VecDeque<&UserId> = bye_players.iter().collect();

    let mut arena = BracketArena::new();
    let mut bye_addresses = Vec::with_capacity(layout.bye_count);
    let mut position = 0;

    while !pairings.is_empty() || !byes.is_empty() {
        if let Some(pair) = pairings.pop_front() {
            let mut node = TournamentMatch::placeholder(1, position);
            node.player1_id = pair.first().cloned();
            node.player2_id = pair.get(1).cloned();
            arena.insert(node);
            position += 1;
        }
        if let Some(player) = byes.pop_front() {
            let mut node = TournamentMatch::placeholder(1, position);
            node.player1_id = Some(player.clone());
            node.winner_id = Some(player.clone());
            node.is_bye = true;
            arena.insert(node);
            bye_addresses.push((MatchAddress::new(1, position), player.clone()));
            position += 1;
        }
    }

    for round in 2..=layout.total_rounds {
        for position in 0..layout.matches_in_round(round) {
            arena.insert(TournamentMatch::placeholder(round, position));
        }
    }

    for (address, player) in &bye_addresses {
        arena.advance(*address, player)?;
    }

    info!(
        "Generated bracket: {} participants, size {}, {} byes, {} rounds",
        layout.participant_count, layout.bracket_size, layout.bye_count, layout.total_rounds
    );

    Ok(arena.into_rounds())
}

fn validate_participants(participants: &[UserId]) -> EngineResult<()> {
    if participants.is_empty() {
        return Err(EngineError::invalid_input("a bracket needs at least one participant"));
    }

    let mut seen = HashSet::with_capacity(participants.len());
    for id in participants {
        if id.trim().is_empty() {
            return Err(EngineError::invalid_input("participant ids must not be empty"));
        }
        if !seen.insert(id.as_str()) {
            return Err(EngineError::invalid_input(format!("duplicate participant '{}'", id)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn players(n: usize) -> Vec<UserId> {
        (0..n).map(|i| format!("p{}", i)).collect()
    }

    fn seeded(n: usize, seed: u64) -> Vec<Round> {
        generate_bracket_with_rng(&players(n), &mut StdRng::seed_from_u64(seed)).unwrap()
    }

    fn real_matches(round: &Round) -> usize {
        round.matches.iter().filter(|m| !m.is_bye).count()
    }

    #[test]
    fn test_layout_for_five() {
        let layout = BracketLayout::for_participants(5);
        assert_eq!(layout.bracket_size, 8);
        assert_eq!(layout.bye_count, 3);
        assert_eq!(layout.first_round_match_count, 1);
        assert_eq!(layout.total_rounds, 3);
    }

    #[test]
    fn test_five_participants() {
        let rounds = seeded(5, 7);

        assert_eq!(rounds.len(), 3);
        assert_eq!(real_matches(&rounds[0]), 1);
        assert_eq!(rounds[0].matches.iter().filter(|m| m.is_bye).count(), 3);
        assert_eq!(rounds[1].matches.len(), 2);
        assert_eq!(rounds[2].matches.len(), 1);
    }

    #[test]
    fn test_power_of_two_has_no_byes() {
        let rounds = seeded(8, 11);

        assert_eq!(rounds.len(), 3);
        assert_eq!(rounds[0].matches.len(), 4);
        assert!(rounds[0].matches.iter().all(|m| !m.is_bye && m.is_ready()));
        assert!(rounds[1].matches.iter().all(|m| m.player1_id.is_none() && m.player2_id.is_none()));
    }

    #[test]
    fn test_single_participant_has_no_rounds() {
        assert!(seeded(1, 3).is_empty());
    }

    #[test]
    fn test_two_participants_is_a_single_final() {
        let rounds = seeded(2, 5);
        assert_eq!(rounds.len(), 1);
        assert_eq!(rounds[0].matches.len(), 1);
        assert!(rounds[0].matches[0].is_ready());
    }

    #[test]
    fn test_round_sizes_halve() {
        for n in 2..=33 {
            let rounds = seeded(n, n as u64);
            let layout = BracketLayout::for_participants(n);
            assert_eq!(rounds.len() as u32, layout.total_rounds);
            for round in &rounds {
                assert_eq!(round.matches.len(), layout.bracket_size >> round.round_number);
            }
        }
    }

    #[test]
    fn test_every_participant_placed_once() {
        for n in 2..=20 {
            let rounds = seeded(n, 42);
            let mut placed: Vec<&str> = rounds[0]
                .matches
                .iter()
                .flat_map(|m| [m.player1_id.as_deref(), m.player2_id.as_deref()])
                .flatten()
                .collect();
            placed.sort_unstable();
            let mut expected = players(n);
            expected.sort_unstable();
            assert_eq!(placed, expected.iter().map(String::as_str).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_byes_are_written_forward() {
        let rounds = seeded(6, 9);
        for bye in rounds[0].matches.iter().filter(|m| m.is_bye) {
            let (next, _) = MatchAddress::new(1, bye.position).next();
            let target = &rounds[1].matches[next.position];
            assert!(target.has_player(bye.winner_id.as_deref().unwrap()));
            assert!(bye.player2_id.is_none());
        }
    }

    #[test]
    fn test_rejects_empty_and_duplicates() {
        assert!(generate_bracket(&[]).is_err());
        let dupes = vec!["a".to_string(), "b".to_string(), "a".to_string()];
        assert!(matches!(generate_bracket(&dupes), Err(EngineError::InvalidInput(_))));
    }
}
