use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type UserId = String;
pub type MatchId = String;

/// Sports a rating can be tracked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sport {
    Tennis,
    Padel,
    Badminton,
    #[serde(rename = "Table Tennis")]
    TableTennis,
    Pickleball,
}

impl Sport {
    pub const ALL: [Sport; 5] = [
        Sport::Tennis,
        Sport::Padel,
        Sport::Badminton,
        Sport::TableTennis,
        Sport::Pickleball,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sport::Tennis => "Tennis",
            Sport::Padel => "Padel",
            Sport::Badminton => "Badminton",
            Sport::TableTennis => "Table Tennis",
            Sport::Pickleball => "Pickleball",
        }
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();

        Sport::ALL
            .into_iter()
            .find(|sport| sport.as_str().replace(' ', "").to_lowercase() == normalized)
            .ok_or_else(|| format!("Unknown sport: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchType {
    Singles,
    Doubles,
}

impl MatchType {
    /// Number of players each team must field
    pub fn team_size(&self) -> usize {
        match self {
            MatchType::Singles => 1,
            MatchType::Doubles => 2,
        }
    }
}

/// One side of a reported match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamResult {
    pub player_ids: Vec<UserId>,
    pub score: f64,
}

impl TeamResult {
    pub fn new<I, S>(player_ids: I, score: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<UserId>,
    {
        Self {
            player_ids: player_ids.into_iter().map(Into::into).collect(),
            score,
        }
    }
}

/// Transient input to a match report
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutcome {
    pub sport: Sport,
    pub match_type: MatchType,
    pub team1: TeamResult,
    pub team2: TeamResult,
    pub date: DateTime<Utc>,
}

impl MatchOutcome {
    pub fn new(sport: Sport, match_type: MatchType, team1: TeamResult, team2: TeamResult) -> Self {
        Self {
            sport,
            match_type,
            team1,
            team2,
            date: Utc::now(),
        }
    }

    pub fn played_at(mut self, date: DateTime<Utc>) -> Self {
        self.date = date;
        self
    }

    /// Team 1 wins only on a strictly higher score; a tie counts as a team 1 loss
    pub fn team1_won(&self) -> bool {
        self.team1.score > self.team2.score
    }

    pub fn participants(&self) -> Vec<UserId> {
        self.team1
            .player_ids
            .iter()
            .chain(self.team2.player_ids.iter())
            .cloned()
            .collect()
    }

    pub fn score_line(&self) -> String {
        format!("{}-{}", self.team1.score, self.team2.score)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankChange {
    pub user_id: UserId,
    pub before: i64,
    pub after: i64,
}

impl RankChange {
    pub fn delta(&self) -> i64 {
        self.after - self.before
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Teams {
    pub team1: Vec<UserId>,
    pub team2: Vec<UserId>,
}

/// Persisted, immutable result of a ranked match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: MatchId,
    pub sport: Sport,
    pub match_type: MatchType,
    pub participants: Vec<UserId>,
    pub teams: Teams,
    pub winner_ids: Vec<UserId>,
    pub score: String,
    pub rank_changes: Vec<RankChange>,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl MatchRecord {
    pub fn involves(&self, user_id: &str) -> bool {
        self.participants.iter().any(|p| p == user_id)
    }

    pub fn won_by(&self, user_id: &str) -> bool {
        self.winner_ids.iter().any(|w| w == user_id)
    }

    pub fn delta_for(&self, user_id: &str) -> Option<i64> {
        self.rank_changes
            .iter()
            .find(|change| change.user_id == user_id)
            .map(RankChange::delta)
    }
}
