use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::models::{Sport, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TournamentStatus {
    Pending,
    Ongoing,
    Complete,
}

impl fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TournamentStatus::Pending => "pending",
            TournamentStatus::Ongoing => "ongoing",
            TournamentStatus::Complete => "complete",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentMatch {
    pub id: String,
    pub round: u32,
    /// Zero-based index within the round
    pub position: usize,
    pub player1_id: Option<UserId>,
    pub player2_id: Option<UserId>,
    pub winner_id: Option<UserId>,
    pub is_bye: bool,
}

impl TournamentMatch {
    pub fn placeholder(round: u32, position: usize) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            round,
            position,
            player1_id: None,
            player2_id: None,
            winner_id: None,
            is_bye: false,
        }
    }

    pub fn has_player(&self, user_id: &str) -> bool {
        self.player1_id.as_deref() == Some(user_id) || self.player2_id.as_deref() == Some(user_id)
    }

    pub fn is_ready(&self) -> bool {
        self.player1_id.is_some() && self.player2_id.is_some()
    }

    pub fn is_decided(&self) -> bool {
        self.winner_id.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub round_number: u32,
    pub matches: Vec<TournamentMatch>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: String,
    pub sport: Sport,
    pub participant_ids: Vec<UserId>,
    pub rounds: Vec<Round>,
    pub status: TournamentStatus,
    pub champion_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

impl Tournament {
    pub fn is_complete(&self) -> bool {
        self.status == TournamentStatus::Complete
    }

    /// Matches that have both players and no winner yet
    pub fn open_matches(&self) -> Vec<&TournamentMatch> {
        self.rounds
            .iter()
            .flat_map(|round| round.matches.iter())
            .filter(|m| m.is_ready() && !m.is_decided())
            .collect()
    }
}
