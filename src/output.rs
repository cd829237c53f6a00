use colored::Colorize;

use crate::achievements::Achievement;
use crate::domain::{MatchRecord, Tournament, TournamentMatch, TournamentStatus};
use crate::rating::RatingRecord;

pub fn print_match(record: &MatchRecord) {
    println!("{} {}", "Match".bold(), record.id);
    println!("  {} {:?}, score {}", record.sport, record.match_type, record.score);
    for change in &record.rank_changes {
        let delta = change.delta();
        let delta_text = format!("{:+}", delta);
        let delta_text = if delta >= 0 { delta_text.green() } else { delta_text.red() };
        println!(
            "  {:<24} {:>6} -> {:>6} ({})",
            change.user_id, change.before, change.after, delta_text
        );
    }
}

pub fn print_rating(record: &RatingRecord) {
    println!("{} {} ({})", "Rating".bold(), record.user_id, record.sport);
    println!("  RacktRank: {}", record.value.to_string().bold());
    println!("  Record:    {}W / {}L", record.wins, record.losses);
    println!("  Streak:    {}", format_streak(record.streak));
    println!("  Matches:   {}", record.match_history.len());
}

pub fn print_tournament(tournament: &Tournament) {
    let status = match tournament.status {
        TournamentStatus::Complete => tournament.status.to_string().green(),
        TournamentStatus::Ongoing => tournament.status.to_string().yellow(),
        TournamentStatus::Pending => tournament.status.to_string().normal(),
    };
    println!("{} {} [{}] {}", "Tournament".bold(), tournament.id, tournament.sport, status);

    for round in &tournament.rounds {
        println!("  Round {}", round.round_number);
        for node in &round.matches {
            println!("    {}", format_match(node));
        }
    }

    if let Some(champion) = &tournament.champion_id {
        println!("  Champion: {}", champion.green().bold());
    }
}

pub fn print_achievements(achievements: &[Achievement], matches_played: usize) {
    println!("{} ({} matches)", "Achievements".bold(), matches_played);
    if achievements.is_empty() {
        println!("  none yet");
        return;
    }
    for achievement in achievements {
        println!(
            "  {:<20} {} ({})",
            achievement.name.yellow(),
            achievement.description,
            achievement.earned_at.format("%Y-%m-%d")
        );
    }
}

fn format_match(node: &TournamentMatch) -> String {
    let seat = |player: &Option<String>| player.clone().unwrap_or_else(|| "TBD".to_string());

    if node.is_bye {
        return format!("{} [bye] {}", node.position, seat(&node.player1_id));
    }

    let winner = node
        .winner_id
        .as_ref()
        .map(|w| format!(" -> {}", w))
        .unwrap_or_default();
    format!(
        "{} {} vs {}{}  ({})",
        node.position,
        seat(&node.player1_id),
        seat(&node.player2_id),
        winner,
        node.id
    )
}

fn format_streak(streak: i32) -> String {
    match streak {
        s if s > 0 => format!("W{}", s).green().to_string(),
        s if s < 0 => format!("L{}", -s).red().to_string(),
        _ => "-".to_string(),
    }
}
