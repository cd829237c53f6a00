pub mod matches;
pub mod tournaments;

pub use matches::MatchService;
pub use tournaments::TournamentService;
