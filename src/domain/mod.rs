pub mod models;
pub mod tournament;

pub use models::*;
pub use tournament::{Round, Tournament, TournamentMatch, TournamentStatus};
