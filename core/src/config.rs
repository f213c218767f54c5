use crate::{
    error::{DeskError, DeskResult},
    record::{MAX_CREDIT_SCORE, MIN_CREDIT_SCORE},
    types::CreditScore,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upper bounds that keep date arithmetic and timers in range.
pub const MAX_LOOKBACK_DAYS: u32 = 36_500;
pub const MAX_TREND_POINTS: usize = 120;
pub const MAX_FEED_INTERVAL_MS: u64 = 86_400_000;

/// Desk tuning loaded from `data/desk/desk_config.json`.
/// Missing fields fall back to the reference values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeskConfig {
    /// Records produced per generation.
    pub population_size: usize,
    /// Live feed period in milliseconds.
    pub feed_interval_ms: u64,
    pub score_floor: CreditScore,
    pub score_ceiling: CreditScore,
    /// Largest absolute score change a single feed tick may apply.
    pub max_score_delta: CreditScore,
    /// Application dates are drawn from this many days before "now".
    pub lookback_days: u32,
    /// Points in the decorative monthly trend series.
    pub trend_points: usize,
    pub name_pool: Vec<String>,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            feed_interval_ms: 5_000,
            score_floor: MIN_CREDIT_SCORE,
            score_ceiling: MAX_CREDIT_SCORE,
            max_score_delta: 5,
            lookback_days: 30,
            trend_points: 6,
            name_pool: crate::name_generator::default_name_pool(),
        }
    }
}

impl DeskConfig {
    /// Load from the data/ directory.
    /// In tests, use DeskConfig::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/desk/desk_config.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: DeskConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    /// Config with hardcoded defaults for use in unit tests.
    /// Same bounds as production, a shorter feed period.
    pub fn default_test() -> Self {
        Self {
            feed_interval_ms: 100,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> DeskResult<()> {
        if self.name_pool.is_empty() {
            return Err(DeskError::Config("name_pool must not be empty".into()));
        }
        if self.feed_interval_ms == 0 || self.feed_interval_ms > MAX_FEED_INTERVAL_MS {
            return Err(DeskError::Config(format!(
                "feed_interval_ms must be in 1..={MAX_FEED_INTERVAL_MS}, got {}",
                self.feed_interval_ms
            )));
        }
        if self.lookback_days > MAX_LOOKBACK_DAYS {
            return Err(DeskError::Config(format!(
                "lookback_days must be <= {MAX_LOOKBACK_DAYS}, got {}",
                self.lookback_days
            )));
        }
        if self.score_floor > self.score_ceiling {
            return Err(DeskError::Config(format!(
                "score_floor {} exceeds score_ceiling {}",
                self.score_floor, self.score_ceiling
            )));
        }
        if self.max_score_delta < 0 {
            return Err(DeskError::Config("max_score_delta must be >= 0".into()));
        }
        if self.trend_points == 0 || self.trend_points > MAX_TREND_POINTS {
            return Err(DeskError::Config(format!(
                "trend_points must be in 1..={MAX_TREND_POINTS}, got {}",
                self.trend_points
            )));
        }
        Ok(())
    }

    pub fn feed_interval(&self) -> Duration {
        Duration::from_millis(self.feed_interval_ms)
    }
}
