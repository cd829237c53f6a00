#[derive(Debug, Clone)]
pub struct RatingSettings {
    pub k_factor: f64,
    pub default_rating: i64,
    /// Multiplier applied to negative deltas only, so losers give back less than winners gain
    pub loss_mitigation: f64,
    pub rating_history_limit: usize,
}

impl Default for RatingSettings {
    fn default() -> Self {
        Self {
            k_factor: 32.0,
            default_rating: 1200,
            loss_mitigation: 0.95,
            rating_history_limit: 30,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoreSettings {
    /// Upper bound on commit attempts before a conflict becomes terminal
    pub max_attempts: u32,
    pub database_path: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "rackt_rank.db".to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub rating: RatingSettings,
    pub store: StoreSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            rating: RatingSettings::default(),
            store: StoreSettings::default(),
        }
    }
}
