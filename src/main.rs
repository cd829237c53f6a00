use anyhow::Result;

use rackt_rank::cli::Command;
use rackt_rank::{
    handle_achievements, handle_init, handle_rating, handle_report, handle_tournament, interpret,
};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let command = interpret();
    execute_command(&command)
}

fn execute_command(command: &Command) -> Result<()> {
    match command {
        Command::Init => handle_init(),
        Command::Report(args) => handle_report(args),
        Command::Rating { user, sport } => handle_rating(user, sport),
        Command::Tournament(sub) => handle_tournament(sub),
        Command::Achievements {
            user,
            opponent,
            opponent_name,
        } => handle_achievements(user, opponent, opponent_name.as_deref()),
    }
}
