pub mod elo;
pub mod types;

pub use elo::{expected_score, Outcome, RatingModel, RatingUpdate};
pub use types::{next_streak, RatingPoint, RatingRecord, RatingValue};
