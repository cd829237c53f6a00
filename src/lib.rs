pub mod achievements;
pub mod bracket;
pub mod cli;
pub mod config;
pub mod database;
pub mod domain;
pub mod errors;
pub mod output;
pub mod rating;
pub mod services;
pub mod store;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;

use crate::cli::{Command, ReportArgs, TournamentCommand};
use crate::config::settings::AppConfig;
use crate::database::SqliteStore;
use crate::domain::{MatchOutcome, MatchType, Sport, TeamResult};
use crate::services::{MatchService, TournamentService};

pub use achievements::{compute_achievements, Achievement};
pub use bracket::{generate_bracket, record_winner};
pub use errors::{EngineError, EngineResult};
pub use store::{MemoryStore, Store};

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

pub fn handle_init() -> Result<()> {
    let config = AppConfig::new();
    let pool = database::create_pool(&config.store.database_path)?;
    let mut conn = database::get_connection(&pool)?;
    database::setup::reset_database(&mut conn)
}

pub fn handle_report(args: &ReportArgs) -> Result<()> {
    let (config, store) = open_store()?;
    let sport = parse_sport(&args.sport)?;
    let match_type = if args.team1.len() > 1 || args.team2.len() > 1 {
        MatchType::Doubles
    } else {
        MatchType::Singles
    };

    let outcome = MatchOutcome::new(
        sport,
        match_type,
        TeamResult::new(args.team1.clone(), args.score1),
        TeamResult::new(args.team2.clone(), args.score2),
    );

    let service = MatchService::new(store, config);
    let match_id = service.report_match(&outcome)?;
    let record = service.get_match(&match_id)?;
    output::print_match(&record);
    Ok(())
}

pub fn handle_rating(user: &str, sport: &str) -> Result<()> {
    let (config, store) = open_store()?;
    let service = MatchService::new(store, config);
    let record = service.rating(user, parse_sport(sport)?)?;
    output::print_rating(&record);
    Ok(())
}

pub fn handle_tournament(command: &TournamentCommand) -> Result<()> {
    let (config, store) = open_store()?;
    let service = TournamentService::new(store, config);

    match command {
        TournamentCommand::Create { sport, participants } => {
            let id = service.create_tournament(parse_sport(sport)?, participants)?;
            output::print_tournament(&service.get_tournament(&id)?);
        }
        TournamentCommand::Show { id } => {
            output::print_tournament(&service.get_tournament(id)?);
        }
        TournamentCommand::Winner { id, match_id, winner } => {
            service.report_winner(id, match_id, winner)?;
            output::print_tournament(&service.get_tournament(id)?);
        }
    }
    Ok(())
}

pub fn handle_achievements(user: &str, opponent: &str, opponent_name: Option<&str>) -> Result<()> {
    let (config, store) = open_store()?;
    let service = MatchService::new(store, config);
    let matches = service.head_to_head(user, opponent)?;
    let earned = compute_achievements(&matches, user, opponent_name.unwrap_or(opponent));
    output::print_achievements(&earned, matches.len());
    Ok(())
}

fn open_store() -> Result<(AppConfig, Arc<SqliteStore>)> {
    let config = AppConfig::new();
    let store = SqliteStore::open(&config.store.database_path)
        .with_context(|| format!("Failed to open database at {}", config.store.database_path))?;
    Ok((config, Arc::new(store)))
}

fn parse_sport(value: &str) -> Result<Sport> {
    value.parse::<Sport>().map_err(anyhow::Error::msg)
}
