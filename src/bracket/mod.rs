pub mod arena;
pub mod generator;
pub mod progression;

pub use arena::{BracketArena, MatchAddress, Slot};
pub use generator::{generate_bracket, generate_bracket_with_rng, BracketLayout};
pub use progression::{record_winner, Progress};
