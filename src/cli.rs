use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about = "RacktRank rating and tournament engine")]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum Command {
    /// Reset the database schema
    Init,
    /// Report a ranked match and update ratings
    Report(ReportArgs),
    /// Show a player's rating for a sport
    Rating {
        #[arg(short, long)]
        user: String,
        #[arg(short, long)]
        sport: String,
    },
    /// Manage single-elimination tournaments
    #[command(subcommand)]
    Tournament(TournamentCommand),
    /// List head-to-head achievements against an opponent
    Achievements {
        #[arg(short, long)]
        user: String,
        #[arg(short, long)]
        opponent: String,
        /// Name used in achievement descriptions (defaults to the opponent id)
        #[arg(long)]
        opponent_name: Option<String>,
    },
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct ReportArgs {
    #[arg(short, long)]
    pub sport: String,
    /// Comma-separated player ids; two players make it a doubles match
    #[arg(long, value_delimiter = ',')]
    pub team1: Vec<String>,
    #[arg(long)]
    pub score1: f64,
    #[arg(long, value_delimiter = ',')]
    pub team2: Vec<String>,
    #[arg(long)]
    pub score2: f64,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum TournamentCommand {
    /// Seed a bracket for the given participants
    Create {
        #[arg(short, long)]
        sport: String,
        #[arg(short, long, value_delimiter = ',')]
        participants: Vec<String>,
    },
    /// Print the bracket
    Show {
        #[arg(long)]
        id: String,
    },
    /// Record the winner of a bracket match
    Winner {
        #[arg(long)]
        id: String,
        #[arg(long = "match")]
        match_id: String,
        #[arg(long)]
        winner: String,
    },
}
