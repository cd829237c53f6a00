use std::sync::Arc;

use chrono::Utc;
use log::info;

use crate::bracket::{generate_bracket, record_winner, Progress};
use crate::config::settings::AppConfig;
use crate::domain::{Sport, Tournament, TournamentStatus, UserId};
use crate::errors::{EngineError, EngineResult};
use crate::store::{run_atomic_transaction, Record, RecordKey, Store, Write};

/// Single-elimination tournament lifecycle
pub struct TournamentService<S: Store> {
    store: Arc<S>,
    config: AppConfig,
}

impl<S: Store> TournamentService<S> {
    pub fn new(store: Arc<S>, config: AppConfig) -> Self {
        Self { store, config }
    }

    /// Seed a bracket and persist the new tournament.
    ///
    /// A lone participant has nothing to play and is stored as champion of an
    /// already complete tournament.
    pub fn create_tournament(&self, sport: Sport, participant_ids: &[UserId]) -> EngineResult<String> {
        let rounds = generate_bracket(participant_ids)?;

        let (status, champion_id) = if rounds.is_empty() {
            (TournamentStatus::Complete, participant_ids.first().cloned())
        } else {
            (TournamentStatus::Pending, None)
        };

        let tournament = Tournament {
            id: uuid::Uuid::new_v4().to_string(),
            sport,
            participant_ids: participant_ids.to_vec(),
            rounds,
            status,
            champion_id,
            created_at: Utc::now(),
        };
        let id = tournament.id.clone();

        run_atomic_transaction(self.store.as_ref(), &[], self.config.store.max_attempts, |_| {
            Ok(vec![Write::Create(Record::Tournament(tournament.clone()))])
        })?;

        info!(
            "Created {} tournament {} with {} participants ({})",
            sport,
            id,
            participant_ids.len(),
            status
        );
        Ok(id)
    }

    /// Record the winner of one bracket match and advance them.
    ///
    /// The tournament document is read and rewritten in one transaction, so
    /// sibling matches reported at the same time serialise on it and each
    /// fills only its own slot of the shared next-round match.
    pub fn report_winner(&self, tournament_id: &str, match_id: &str, winner_id: &str) -> EngineResult<Progress> {
        let key = RecordKey::tournament(tournament_id);
        let mut outcome: Option<Progress> = None;

        run_atomic_transaction(
            self.store.as_ref(),
            std::slice::from_ref(&key),
            self.config.store.max_attempts,
            |reads| {
                let mut tournament = reads.tournament(&key)?;
                let progress = record_winner(&mut tournament, match_id, winner_id)?;
                outcome = Some(progress);
                Ok(vec![Write::Put(Record::Tournament(tournament))])
            },
        )?;

        let progress = outcome.ok_or_else(|| {
            EngineError::InvariantViolation("winner transaction committed without a result".to_string())
        })?;
        match &progress {
            Progress::Champion(champion) => {
                info!("Tournament {} complete, champion {}", tournament_id, champion)
            }
            Progress::Advanced(next) => info!(
                "Tournament {}: {} advances to round {} match {}",
                tournament_id, winner_id, next.round, next.position
            ),
        }
        Ok(progress)
    }

    pub fn get_tournament(&self, tournament_id: &str) -> EngineResult<Tournament> {
        self.store.get(&RecordKey::tournament(tournament_id))?.into_tournament()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, RecordKind};

    fn service() -> TournamentService<MemoryStore> {
        TournamentService::new(Arc::new(MemoryStore::new()), AppConfig::new())
    }

    fn players(n: usize) -> Vec<UserId> {
        (0..n).map(|i| format!("p{}", i)).collect()
    }

    /// Report player 1 of the first open match until nothing is left to play
    fn play_out(service: &TournamentService<MemoryStore>, id: &str) -> usize {
        let mut reports = 0;
        loop {
            let tournament = service.get_tournament(id).unwrap();
            let Some(open) = tournament.open_matches().first().map(|m| (*m).clone()) else {
                return reports;
            };
            service
                .report_winner(id, &open.id, open.player1_id.as_deref().unwrap())
                .unwrap();
            reports += 1;
        }
    }

    #[test]
    fn test_two_player_tournament() {
        let service = service();
        let id = service.create_tournament(Sport::Tennis, &players(2)).unwrap();
        let created = service.get_tournament(&id).unwrap();
        assert_eq!(created.status, TournamentStatus::Pending);

        let final_match = &created.rounds[0].matches[0];
        let winner = final_match.player2_id.clone().unwrap();
        let progress = service.report_winner(&id, &final_match.id, &winner).unwrap();

        let done = service.get_tournament(&id).unwrap();
        assert_eq!(progress, Progress::Champion(winner.clone()));
        assert_eq!(done.status, TournamentStatus::Complete);
        assert_eq!(done.champion_id, Some(winner));
    }

    #[test]
    fn test_single_participant_is_immediately_complete() {
        let service = service();
        let id = service.create_tournament(Sport::Padel, &players(1)).unwrap();

        let tournament = service.get_tournament(&id).unwrap();
        assert!(tournament.rounds.is_empty());
        assert_eq!(tournament.status, TournamentStatus::Complete);
        assert_eq!(tournament.champion_id.as_deref(), Some("p0"));
    }

    #[test]
    fn test_any_field_size_plays_to_one_champion() {
        let service = service();
        for n in 1..=17 {
            let id = service.create_tournament(Sport::Badminton, &players(n)).unwrap();
            let reports = play_out(&service, &id);

            let tournament = service.get_tournament(&id).unwrap();
            assert_eq!(tournament.status, TournamentStatus::Complete, "n = {}", n);
            assert!(tournament.champion_id.is_some());
            assert_eq!(reports, n - 1);
        }
    }

    #[test]
    fn test_status_moves_to_ongoing() {
        let service = service();
        let id = service.create_tournament(Sport::Tennis, &players(4)).unwrap();
        let first = service.get_tournament(&id).unwrap().rounds[0].matches[0].clone();

        service
            .report_winner(&id, &first.id, first.player1_id.as_deref().unwrap())
            .unwrap();

        assert_eq!(service.get_tournament(&id).unwrap().status, TournamentStatus::Ongoing);
    }

    #[test]
    fn test_complete_tournament_rejects_reports() {
        let service = service();
        let id = service.create_tournament(Sport::Tennis, &players(2)).unwrap();
        let final_match = service.get_tournament(&id).unwrap().rounds[0].matches[0].clone();
        let p1 = final_match.player1_id.clone().unwrap();
        let p2 = final_match.player2_id.clone().unwrap();
        service.report_winner(&id, &final_match.id, &p1).unwrap();

        let err = service.report_winner(&id, &final_match.id, &p2).unwrap_err();

        assert!(matches!(err, EngineError::AlreadyDecided { .. }));
        assert_eq!(service.get_tournament(&id).unwrap().champion_id, Some(p1));
    }

    #[test]
    fn test_unknown_tournament() {
        let err = service().report_winner("nope", "m", "p0").unwrap_err();
        assert!(matches!(err, EngineError::NotFound { kind: RecordKind::Tournament, .. }));
    }

    #[test]
    fn test_rejected_report_leaves_no_trace() {
        let service = service();
        let id = service.create_tournament(Sport::Tennis, &players(4)).unwrap();
        let before = service.get_tournament(&id).unwrap();
        let first = before.rounds[0].matches[0].clone();

        let err = service.report_winner(&id, &first.id, "outsider").unwrap_err();

        assert!(matches!(err, EngineError::InvalidWinner { .. }));
        assert_eq!(service.get_tournament(&id).unwrap(), before);
    }

    #[test]
    fn test_duplicate_participants_rejected() {
        let ids = vec!["a".to_string(), "a".to_string()];
        let err = service().create_tournament(Sport::Tennis, &ids).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    #[test]
    fn test_sibling_matches_reported_concurrently() {
        let service = TournamentService::new(
            Arc::new(MemoryStore::new()),
            AppConfig {
                store: crate::config::settings::StoreSettings {
                    max_attempts: 100,
                    database_path: String::new(),
                },
                ..AppConfig::new()
            },
        );
        let id = service.create_tournament(Sport::Tennis, &players(8)).unwrap();
        let first_round = service.get_tournament(&id).unwrap().rounds[0].matches.clone();

        std::thread::scope(|scope| {
            for node in &first_round {
                let service = &service;
                let id = &id;
                scope.spawn(move || {
                    service
                        .report_winner(id, &node.id, node.player2_id.as_deref().unwrap())
                        .unwrap();
                });
            }
        });

        let tournament = service.get_tournament(&id).unwrap();
        for (position, next) in tournament.rounds[1].matches.iter().enumerate() {
            assert_eq!(next.player1_id, first_round[position * 2].player2_id);
            assert_eq!(next.player2_id, first_round[position * 2 + 1].player2_id);
        }
    }
}
