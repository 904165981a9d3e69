//! Serializable backtest configuration.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use foliolab_core::schedule::Frequency;
use foliolab_core::sim::TriggerConfig;

/// Unique identifier for a backtest run (content-addressable hash).
pub type RunId = String;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("start_date {start} is after end_date {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
    #[error("universe is empty")]
    EmptyUniverse,
    #[error("initial_capital must be positive, got {0}")]
    NonPositiveCapital(f64),
    #[error("trigger percentage out of range: {name} = {value}")]
    BadTrigger { name: &'static str, value: f64 },
}

/// Named candidate-selection presets. A profile bundles a score threshold
/// with a trigger setup; explicit config fields always win over the preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleProfile {
    /// Wide net, loose stop, no profit taking.
    Conservative,
    /// Moderate threshold with a take-profit cap.
    Value,
    /// High threshold, tight stops, trailing exit armed.
    Strict,
}

impl RuleProfile {
    pub fn score_threshold(self) -> f64 {
        match self {
            RuleProfile::Conservative => 0.0,
            RuleProfile::Value => 0.03,
            RuleProfile::Strict => 0.05,
        }
    }

    pub fn triggers(self) -> TriggerConfig {
        match self {
            RuleProfile::Conservative => TriggerConfig {
                stop_loss_pct: Some(0.10),
                ..TriggerConfig::default()
            },
            RuleProfile::Value => TriggerConfig {
                stop_loss_pct: Some(0.10),
                take_profit_pct: Some(0.25),
                ..TriggerConfig::default()
            },
            RuleProfile::Strict => TriggerConfig {
                stop_loss_pct: Some(0.08),
                take_profit_pct: Some(0.20),
                trailing_stop_pct: Some(0.15),
                ..TriggerConfig::default()
            },
        }
    }
}

/// Serializable configuration for a single backtest run.
///
/// Captures everything needed to reproduce the run: universe, date range,
/// rebalance frequency, selection threshold, trigger/cost parameters, and
/// starting capital.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunConfig {
    pub universe: Vec<String>,
    /// Backtest start date (inclusive).
    pub start_date: NaiveDate,
    /// Backtest end date (inclusive).
    pub end_date: NaiveDate,
    pub frequency: Frequency,
    /// Candidates must score strictly above this to be entered.
    pub score_threshold: f64,
    /// Preset this config was derived from, if any. Informational.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<RuleProfile>,
    pub triggers: TriggerConfig,
    pub initial_capital: f64,
}

impl RunConfig {
    /// Build a config from a named profile's threshold and triggers.
    pub fn from_profile(
        profile: RuleProfile,
        universe: Vec<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        frequency: Frequency,
        initial_capital: f64,
    ) -> Self {
        Self {
            universe,
            start_date,
            end_date,
            frequency,
            score_threshold: profile.score_threshold(),
            profile: Some(profile),
            triggers: profile.triggers(),
            initial_capital,
        }
    }

    /// Parse and validate a config from TOML.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.start_date > self.end_date {
            return Err(ConfigError::InvalidRange {
                start: self.start_date,
                end: self.end_date,
            });
        }
        if self.universe.is_empty() {
            return Err(ConfigError::EmptyUniverse);
        }
        if self.initial_capital <= 0.0 {
            return Err(ConfigError::NonPositiveCapital(self.initial_capital));
        }
        let named = [
            ("stop_loss_pct", self.triggers.stop_loss_pct),
            ("take_profit_pct", self.triggers.take_profit_pct),
            ("trailing_stop_pct", self.triggers.trailing_stop_pct),
            ("transaction_cost_pct", self.triggers.transaction_cost_pct),
        ];
        for (name, value) in named {
            if let Some(v) = value {
                if !v.is_finite() || v <= 0.0 || v >= 1.0 {
                    return Err(ConfigError::BadTrigger { name, value: v });
                }
            }
        }
        Ok(())
    }

    /// Computes a deterministic hash ID for this configuration.
    ///
    /// Two runs with identical configs share a RunId, so artifacts from
    /// repeated runs can be matched up (and byte-compared) by ID.
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_string(self).expect("RunConfig serialization failed");
        let hash = blake3::hash(json.as_bytes());
        hash.to_hex().to_string()
    }
}

/// Externally persisted resume point for an interrupted run.
///
/// Periods whose decision date is at or before `last_completed` are skipped
/// on restart. The caller is responsible for persisting this next to the
/// run's artifacts; the runner itself holds no resume state in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeCursor {
    pub last_completed: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_config() -> RunConfig {
        RunConfig::from_profile(
            RuleProfile::Value,
            vec!["2330".to_string(), "1101".to_string()],
            date(2020, 1, 1),
            date(2021, 12, 31),
            Frequency::Monthly,
            1_000_000.0,
        )
    }

    #[test]
    fn run_id_is_stable_and_content_addressed() {
        let a = sample_config();
        let b = sample_config();
        assert_eq!(a.run_id(), b.run_id());
        let mut c = sample_config();
        c.score_threshold = 0.04;
        assert_ne!(a.run_id(), c.run_id());
    }

    #[test]
    fn toml_roundtrip() {
        let toml_src = r#"
universe = ["2330", "1101"]
start_date = "2020-01-01"
end_date = "2021-12-31"
frequency = "monthly"
score_threshold = 0.03
initial_capital = 1000000.0

[triggers]
stop_loss_pct = 0.1
take_profit_pct = 0.25
"#;
        let config = RunConfig::from_toml_str(toml_src).unwrap();
        assert_eq!(config.frequency, Frequency::Monthly);
        assert_eq!(config.triggers.stop_loss_pct, Some(0.1));
        assert_eq!(config.triggers.trailing_stop_pct, None);
        assert!(config.profile.is_none());
    }

    #[test]
    fn inverted_range_rejected() {
        let mut config = sample_config();
        config.start_date = date(2022, 1, 1);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidRange { .. })));
    }

    #[test]
    fn out_of_range_trigger_rejected() {
        let mut config = sample_config();
        config.triggers.stop_loss_pct = Some(1.5);
        assert!(matches!(config.validate(), Err(ConfigError::BadTrigger { .. })));
    }

    #[test]
    fn profiles_tighten_monotonically() {
        assert!(RuleProfile::Conservative.score_threshold() < RuleProfile::Value.score_threshold());
        assert!(RuleProfile::Value.score_threshold() < RuleProfile::Strict.score_threshold());
        assert!(RuleProfile::Strict.triggers().trailing_stop_pct.is_some());
    }
}
