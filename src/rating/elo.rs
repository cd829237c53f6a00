//! Elo-style rating model with asymmetric loss mitigation.
//!
//! Deltas are computed the usual Elo way, but a negative delta is scaled by
//! `loss_mitigation` before it is applied. Rating mass therefore grows a little
//! with every decisive match; there is no cap or decay.

use crate::config::settings::RatingSettings;

/// Result from the first player's point of view
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    Win,
    Loss,
    Draw,
}

impl Outcome {
    pub fn score(&self) -> f64 {
        match self {
            Outcome::Win => 1.0,
            Outcome::Loss => 0.0,
            Outcome::Draw => 0.5,
        }
    }

    pub fn from_win(won: bool) -> Self {
        if won { Outcome::Win } else { Outcome::Loss }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingModel {
    pub k_factor: f64,
    pub loss_mitigation: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingUpdate {
    pub new_rating_a: i64,
    pub new_rating_b: i64,
}

impl Default for RatingModel {
    fn default() -> Self {
        Self::from_settings(&RatingSettings::default())
    }
}

impl RatingModel {
    pub fn from_settings(settings: &RatingSettings) -> Self {
        Self {
            k_factor: settings.k_factor,
            loss_mitigation: settings.loss_mitigation,
        }
    }

    /// Raw (unrounded) deltas for both sides, loss mitigation already applied
    pub fn deltas(&self, rating_a: f64, rating_b: f64, outcome_a: Outcome) -> (f64, f64) {
        let score_a = outcome_a.score();
        let score_b = 1.0 - score_a;

        let raw_a = self.k_factor * (score_a - expected_score(rating_a, rating_b));
        let raw_b = self.k_factor * (score_b - expected_score(rating_b, rating_a));

        (self.mitigate(raw_a), self.mitigate(raw_b))
    }

    pub fn rate(&self, rating_a: f64, rating_b: f64, outcome_a: Outcome) -> RatingUpdate {
        let (delta_a, delta_b) = self.deltas(rating_a, rating_b, outcome_a);
        RatingUpdate {
            new_rating_a: (rating_a + delta_a).round() as i64,
            new_rating_b: (rating_b + delta_b).round() as i64,
        }
    }

    fn mitigate(&self, delta: f64) -> f64 {
        if delta < 0.0 {
            delta * self.loss_mitigation
        } else {
            delta
        }
    }
}

/// Expected score of A against B
pub fn expected_score(rating_a: f64, rating_b: f64) -> f64 {
    1.0 / (1.0 + 10.0_f64.powf((rating_b - rating_a) / 400.0))
}
