//! Head-to-head milestones, recomputed from match history on every call.

pub mod catalog;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::MatchRecord;
use catalog::CATALOG;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub earned_at: DateTime<Utc>,
}

/// Milestones `current_user_id` has earned in `matches` against one opponent.
///
/// Matches are ordered by date before checking, so callers may pass them in
/// any order. An empty history earns nothing.
pub fn compute_achievements(
    matches: &[MatchRecord],
    current_user_id: &str,
    opponent_name: &str,
) -> Vec<Achievement> {
    let mut ordered: Vec<&MatchRecord> = matches.iter().collect();
    ordered.sort_by_key(|m| m.date);

    CATALOG
        .iter()
        .filter_map(|def| {
            (def.check)(&ordered, current_user_id).map(|earned_at| Achievement {
                id: def.id.to_string(),
                name: def.name.to_string(),
                description: (def.describe)(opponent_name),
                icon: def.icon.to_string(),
                earned_at,
            })
        })
        .collect()
}
