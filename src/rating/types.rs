use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{MatchId, Sport, UserId};

pub type RatingValue = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingPoint {
    pub date: DateTime<Utc>,
    pub value: RatingValue,
}

/// Per-user, per-sport rating state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingRecord {
    pub user_id: UserId,
    pub sport: Sport,
    pub value: RatingValue,
    pub wins: u32,
    pub losses: u32,
    /// Positive for consecutive wins, negative for consecutive losses
    pub streak: i32,
    pub match_history: Vec<MatchId>,
    pub rating_history: Vec<RatingPoint>,
}

impl RatingRecord {
    pub fn new(user_id: impl Into<UserId>, sport: Sport, value: RatingValue) -> Self {
        Self {
            user_id: user_id.into(),
            sport,
            value,
            wins: 0,
            losses: 0,
            streak: 0,
            match_history: Vec::new(),
            rating_history: Vec::new(),
        }
    }

    /// Storage id: one record per user per sport
    pub fn key_for(user_id: &str, sport: Sport) -> String {
        format!("{}:{}", user_id, sport.as_str())
    }

    pub fn key(&self) -> String {
        Self::key_for(&self.user_id, self.sport)
    }

    pub fn games_played(&self) -> u32 {
        self.wins + self.losses
    }

    /// Fold one finished match into the record
    pub fn apply_result(
        &mut self,
        match_id: &str,
        won: bool,
        new_value: RatingValue,
        date: DateTime<Utc>,
        history_limit: usize,
    ) {
        if won {
            self.wins += 1;
        } else {
            self.losses += 1;
        }
        self.streak = next_streak(self.streak, won);
        self.value = new_value;
        self.match_history.push(match_id.to_string());

        self.rating_history.push(RatingPoint { date, value: new_value });
        if self.rating_history.len() > history_limit {
            let excess = self.rating_history.len() - history_limit;
            self.rating_history.drain(..excess);
        }
    }
}

/// Extend the streak if the result matches its sign, otherwise restart at +/-1
pub fn next_streak(streak: i32, won: bool) -> i32 {
    if won {
        if streak > 0 { streak + 1 } else { 1 }
    } else if streak < 0 {
        streak - 1
    } else {
        -1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_streak_transitions() {
        assert_eq!(next_streak(0, true), 1);
        assert_eq!(next_streak(3, true), 4);
        assert_eq!(next_streak(-4, true), 1);
        assert_eq!(next_streak(0, false), -1);
        assert_eq!(next_streak(-2, false), -3);
        assert_eq!(next_streak(5, false), -1);
    }

    #[test]
    fn test_apply_result_updates_counters_and_history() {
        let mut record = RatingRecord::new("ana", Sport::Tennis, 1200);
        let now = Utc::now();

        record.apply_result("m1", true, 1216, now, 30);
        record.apply_result("m2", false, 1201, now, 30);

        assert_eq!(record.wins, 1);
        assert_eq!(record.losses, 1);
        assert_eq!(record.streak, -1);
        assert_eq!(record.value, 1201);
        assert_eq!(record.match_history, vec!["m1".to_string(), "m2".to_string()]);
        assert_eq!(record.games_played(), 2);
    }

    #[test]
    fn test_rating_history_is_trimmed_to_limit() {
        let mut record = RatingRecord::new("ana", Sport::Padel, 1200);
        let now = Utc::now();

        for i in 0..5 {
            record.apply_result(&format!("m{}", i), true, 1200 + i, now, 3);
        }

        let values: Vec<_> = record.rating_history.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![1202, 1203, 1204]);
        assert_eq!(record.match_history.len(), 5);
    }

    #[test]
    fn test_key_is_per_sport() {
        assert_eq!(RatingRecord::key_for("ana", Sport::TableTennis), "ana:Table Tennis");
    }
}
