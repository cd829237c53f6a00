use chrono::{DateTime, Utc};

use crate::domain::MatchRecord;

pub type Checker = fn(&[&MatchRecord], &str) -> Option<DateTime<Utc>>;

/// A milestone and the predicate that earns it.
///
/// Checkers receive matches oldest first and return the date of the match
/// on which the milestone was first satisfied.
pub struct AchievementDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub describe: fn(&str) -> String,
    pub check: Checker,
}

pub const CATALOG: [AchievementDefinition; 5] = [
    AchievementDefinition {
        id: "first_blood",
        name: "First Blood",
        icon: "Swords",
        describe: |opponent| format!("Earn your first victory against {}.", opponent),
        check: first_win,
    },
    AchievementDefinition {
        id: "win_streak_3",
        name: "On a Roll",
        icon: "Flame",
        describe: |opponent| format!("Win 3 consecutive matches against {}.", opponent),
        check: three_in_a_row,
    },
    AchievementDefinition {
        id: "dominator",
        name: "Dominator",
        icon: "Trophy",
        describe: |opponent| format!("Win a total of 5 matches against {}.", opponent),
        check: five_wins,
    },
    AchievementDefinition {
        id: "rivalry",
        name: "Established Rivalry",
        icon: "Users",
        describe: |opponent| format!("Play 10 matches against {}.", opponent),
        check: ten_played,
    },
    AchievementDefinition {
        id: "comeback_kid",
        name: "Comeback Kid",
        icon: "Undo2",
        describe: |opponent| format!("Win a match against {} after losing at least 2 in a row.", opponent),
        check: comeback,
    },
];

fn first_win(matches: &[&MatchRecord], user_id: &str) -> Option<DateTime<Utc>> {
    nth_win(matches, user_id, 1)
}

fn five_wins(matches: &[&MatchRecord], user_id: &str) -> Option<DateTime<Utc>> {
    nth_win(matches, user_id, 5)
}

fn nth_win(matches: &[&MatchRecord], user_id: &str, n: usize) -> Option<DateTime<Utc>> {
    matches
        .iter()
        .filter(|m| m.won_by(user_id))
        .nth(n - 1)
        .map(|m| m.date)
}

fn three_in_a_row(matches: &[&MatchRecord], user_id: &str) -> Option<DateTime<Utc>> {
    let mut streak = 0;
    for m in matches {
        if m.won_by(user_id) {
            streak += 1;
            if streak == 3 {
                return Some(m.date);
            }
        } else {
            streak = 0;
        }
    }
    None
}

fn ten_played(matches: &[&MatchRecord], _user_id: &str) -> Option<DateTime<Utc>> {
    matches.get(9).map(|m| m.date)
}

fn comeback(matches: &[&MatchRecord], user_id: &str) -> Option<DateTime<Utc>> {
    let mut losses = 0;
    for m in matches {
        if m.won_by(user_id) {
            if losses >= 2 {
                return Some(m.date);
            }
            losses = 0;
        } else {
            losses += 1;
        }
    }
    None
}
