use crate::error::ConfigError;
use crate::types::{Difficulty, Priority, Task};
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = ".pace/config.toml";
pub const DEFAULT_DB_PATH: &str = ".pace/pace.db";
pub const DB_PATH_ENV: &str = "PACE_DB_PATH";
/// Ten years.
pub const MAX_WARNING_HORIZON_HOURS: i64 = 24 * 366 * 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyWeights {
    pub easy: f64,
    pub medium: f64,
    pub hard: f64,
}

impl Default for DifficultyWeights {
    fn default() -> Self {
        Self {
            easy: 1.0,
            medium: 2.0,
            hard: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityWeights {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl Default for PriorityWeights {
    fn default() -> Self {
        Self {
            low: 0.5,
            medium: 1.0,
            high: 1.5,
        }
    }
}

/// Weight tables and penalty multipliers for the scoring engine. Immutable
/// once loaded; pass a different value to score with another scheme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub difficulty: DifficultyWeights,
    pub priority: PriorityWeights,
    /// Weight used for a factor whose value is not in the known set.
    pub fallback_weight: f64,
    pub late_penalty: f64,
    pub overdue_penalty: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            difficulty: DifficultyWeights::default(),
            priority: PriorityWeights::default(),
            fallback_weight: 1.0,
            late_penalty: 0.8,
            overdue_penalty: 0.5,
        }
    }
}

impl ScoringConfig {
    pub fn difficulty_weight(&self, difficulty: &Difficulty) -> f64 {
        match difficulty {
            Difficulty::Easy => self.difficulty.easy,
            Difficulty::Medium => self.difficulty.medium,
            Difficulty::Hard => self.difficulty.hard,
            Difficulty::Unrecognized(_) => self.fallback_weight,
        }
    }

    pub fn priority_weight(&self, priority: &Priority) -> f64 {
        match priority {
            Priority::Low => self.priority.low,
            Priority::Medium => self.priority.medium,
            Priority::High => self.priority.high,
            Priority::Unrecognized(_) => self.fallback_weight,
        }
    }

    pub fn task_weight(&self, task: &Task) -> f64 {
        self.difficulty_weight(&task.difficulty) * self.priority_weight(&task.priority)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let weights = [
            ("difficulty.easy", self.difficulty.easy),
            ("difficulty.medium", self.difficulty.medium),
            ("difficulty.hard", self.difficulty.hard),
            ("priority.low", self.priority.low),
            ("priority.medium", self.priority.medium),
            ("priority.high", self.priority.high),
            ("fallback_weight", self.fallback_weight),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid {
                    message: format!("scoring.{name} must be a non-negative number"),
                });
            }
        }
        for (name, value) in [
            ("late_penalty", self.late_penalty),
            ("overdue_penalty", self.overdue_penalty),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid {
                    message: format!("scoring.{name} must be between 0 and 1"),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaceConfig {
    pub db_path: String,
    /// How far ahead of a deadline an in-progress task starts warning.
    pub warning_horizon_hours: i64,
    pub scoring: ScoringConfig,
}

impl Default for PaceConfig {
    fn default() -> Self {
        Self {
            db_path: DEFAULT_DB_PATH.to_string(),
            warning_horizon_hours: 48,
            scoring: ScoringConfig::default(),
        }
    }
}

impl PaceConfig {
    /// Clamped to `0..=MAX_WARNING_HORIZON_HOURS` for configs built in code
    /// without going through `validate`.
    pub fn warning_horizon(&self) -> TimeDelta {
        TimeDelta::hours(self.warning_horizon_hours.clamp(0, MAX_WARNING_HORIZON_HOURS))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0..=MAX_WARNING_HORIZON_HOURS).contains(&self.warning_horizon_hours) {
            return Err(ConfigError::Invalid {
                message: format!(
                    "warning_horizon_hours must be between 0 and {MAX_WARNING_HORIZON_HOURS}"
                ),
            });
        }
        if self.db_path.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "db_path must not be empty".to_string(),
            });
        }
        self.scoring.validate()
    }

    /// `PACE_DB_PATH` wins over the file.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(path) = std::env::var(DB_PATH_ENV) {
            if !path.trim().is_empty() {
                self.db_path = path;
            }
        }
        self
    }
}

pub fn parse_config(content: &str) -> Result<PaceConfig, ConfigError> {
    let config: PaceConfig = toml::from_str(content).map_err(|err| ConfigError::Parse {
        message: err.to_string(),
    })?;
    config.validate()?;
    Ok(config)
}

/// Loads the config file, falling back to defaults when it does not exist.
pub fn load_config(path: &Path) -> Result<PaceConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(PaceConfig::default());
        }
        Err(err) => {
            return Err(ConfigError::Read {
                path: path.display().to_string(),
                message: err.to_string(),
            })
        }
    };
    parse_config(&content)
}
