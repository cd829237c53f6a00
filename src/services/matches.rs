use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use log::info;

use crate::config::settings::AppConfig;
use crate::domain::{MatchId, MatchOutcome, MatchRecord, RankChange, Sport, Teams, TeamResult};
use crate::errors::{EngineError, EngineResult};
use crate::rating::{Outcome, RatingModel, RatingRecord};
use crate::store::{run_atomic_transaction, Record, RecordKey, Store, Write};

/// Ranked match reporting and rating lookups
pub struct MatchService<S: Store> {
    store: Arc<S>,
    config: AppConfig,
    model: RatingModel,
}

impl<S: Store> MatchService<S> {
    pub fn new(store: Arc<S>, config: AppConfig) -> Self {
        let model = RatingModel::from_settings(&config.rating);
        Self { store, config, model }
    }

    /// Record a finished match and update every participant's rating atomically.
    ///
    /// Both teams' ratings are the mean of their members; the resulting team
    /// delta is applied unchanged to each member of that team.
    pub fn report_match(&self, outcome: &MatchOutcome) -> EngineResult<MatchId> {
        validate_outcome(outcome)?;

        let match_id = uuid::Uuid::new_v4().to_string();
        let participants = outcome.participants();
        let keys: Vec<RecordKey> = participants
            .iter()
            .map(|id| RecordKey::rating(RatingRecord::key_for(id, outcome.sport)))
            .collect();

        let mut committed: Option<MatchRecord> = None;
        run_atomic_transaction(self.store.as_ref(), &keys, self.config.store.max_attempts, |reads| {
            let mut records = Vec::with_capacity(keys.len());
            for (user_id, key) in participants.iter().zip(&keys) {
                let record = reads.rating(key)?.unwrap_or_else(|| {
                    RatingRecord::new(user_id.clone(), outcome.sport, self.config.rating.default_rating)
                });
                records.push(record);
            }

            let (updated, record) = self.settle(outcome, &match_id, records);

            let mut writes: Vec<Write> = updated.into_iter().map(|r| Write::Put(Record::Rating(r))).collect();
            writes.push(Write::Create(Record::Match(record.clone())));
            committed = Some(record);
            Ok(writes)
        })?;

        if let Some(record) = &committed {
            info!(
                "Reported {} {:?} match {} ({} players, score {})",
                record.sport,
                record.match_type,
                record.id,
                record.participants.len(),
                record.score
            );
        }
        Ok(match_id)
    }

    /// Stored rating for `user_id`, or a fresh default record if none exists yet
    pub fn rating(&self, user_id: &str, sport: Sport) -> EngineResult<RatingRecord> {
        let key = RecordKey::rating(RatingRecord::key_for(user_id, sport));
        match self.store.get(&key) {
            Ok(record) => record.into_rating(),
            Err(EngineError::NotFound { .. }) => {
                Ok(RatingRecord::new(user_id, sport, self.config.rating.default_rating))
            }
            Err(e) => Err(e),
        }
    }

    pub fn get_match(&self, match_id: &str) -> EngineResult<MatchRecord> {
        self.store.get(&RecordKey::match_record(match_id))?.into_match()
    }

    /// Every match between the two users across all sports, oldest first
    pub fn head_to_head(&self, user_id: &str, opponent_id: &str) -> EngineResult<Vec<MatchRecord>> {
        let mut matches = Vec::new();

        for sport in Sport::ALL {
            let key = RecordKey::rating(RatingRecord::key_for(user_id, sport));
            let record = match self.store.get(&key) {
                Ok(record) => record.into_rating()?,
                Err(EngineError::NotFound { .. }) => continue,
                Err(e) => return Err(e),
            };

            for match_id in &record.match_history {
                let played = self.get_match(match_id)?;
                if played.involves(opponent_id) {
                    matches.push(played);
                }
            }
        }

        matches.sort_by_key(|m| m.date);
        Ok(matches)
    }

    /// Pure part of a report: new rating records plus the match record.
    /// `records` is ordered team 1 members first, matching `outcome.participants()`.
    fn settle(
        &self,
        outcome: &MatchOutcome,
        match_id: &str,
        mut records: Vec<RatingRecord>,
    ) -> (Vec<RatingRecord>, MatchRecord) {
        let team1_size = outcome.team1.player_ids.len();
        let team1_avg = team_average(&records[..team1_size]);
        let team2_avg = team_average(&records[team1_size..]);

        let team1_won = outcome.team1_won();
        let (team1_delta, team2_delta) = self
            .model
            .deltas(team1_avg, team2_avg, Outcome::from_win(team1_won));

        let mut rank_changes = Vec::with_capacity(records.len());
        for (idx, record) in records.iter_mut().enumerate() {
            let on_team1 = idx < team1_size;
            let (delta, won) = if on_team1 {
                (team1_delta, team1_won)
            } else {
                (team2_delta, !team1_won)
            };

            let before = record.value;
            let after = (before as f64 + delta).round() as i64;
            record.apply_result(
                match_id,
                won,
                after,
                outcome.date,
                self.config.rating.rating_history_limit,
            );
            rank_changes.push(RankChange {
                user_id: record.user_id.clone(),
                before,
                after,
            });
        }

        let winners = if team1_won { &outcome.team1 } else { &outcome.team2 };
        let record = MatchRecord {
            id: match_id.to_string(),
            sport: outcome.sport,
            match_type: outcome.match_type,
            participants: outcome.participants(),
            teams: Teams {
                team1: outcome.team1.player_ids.clone(),
                team2: outcome.team2.player_ids.clone(),
            },
            winner_ids: winners.player_ids.clone(),
            score: outcome.score_line(),
            rank_changes,
            date: outcome.date,
            created_at: Utc::now(),
        };

        (records, record)
    }
}

fn team_average(members: &[RatingRecord]) -> f64 {
    let total: i64 = members.iter().map(|r| r.value).sum();
    total as f64 / members.len() as f64
}

fn validate_outcome(outcome: &MatchOutcome) -> EngineResult<()> {
    let expected = outcome.match_type.team_size();
    validate_team("team 1", &outcome.team1, expected)?;
    validate_team("team 2", &outcome.team2, expected)?;

    let mut seen = HashSet::new();
    for id in outcome.team1.player_ids.iter().chain(&outcome.team2.player_ids) {
        if !seen.insert(id.as_str()) {
            return Err(EngineError::invalid_input(format!(
                "player '{}' appears more than once in the match",
                id
            )));
        }
    }
    Ok(())
}

fn validate_team(label: &str, team: &TeamResult, expected: usize) -> EngineResult<()> {
    if team.player_ids.len() != expected {
        return Err(EngineError::invalid_input(format!(
            "{} has {} players, expected {}",
            label,
            team.player_ids.len(),
            expected
        )));
    }
    if team.player_ids.iter().any(|id| id.trim().is_empty()) {
        return Err(EngineError::invalid_input(format!("{} has an empty player id", label)));
    }
    if !team.score.is_finite() || team.score < 0.0 {
        return Err(EngineError::invalid_input(format!(
            "{} score must be a non-negative number",
            label
        )));
    }
    Ok(())
}
