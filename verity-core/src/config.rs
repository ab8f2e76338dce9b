//! # Config — typed TOML configuration
//!
//! Every simulated subsystem gets its own section with defaults that
//! match the product's original cadence (threat alerts every 3s, posts
//! every 2s, map refresh every 5s). A fixed seed makes the whole engine
//! reproducible.

use crate::error::{VerityError, VerityResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WatchConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub threat_feed: ThreatFeedConfig,
    #[serde(default)]
    pub social_stream: SocialStreamConfig,
    #[serde(default)]
    pub threat_map: ThreatMapConfig,
    #[serde(default)]
    pub aggregator: AggregatorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    pub log_level: String,
    /// Seed for all generator RNGs. None means a fresh seed per run.
    pub seed: Option<u64>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub queue_capacity: usize,
    /// Simulated processing delay bounds.
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 5,
            min_delay_ms: 1_500,
            max_delay_ms: 3_500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreatFeedConfig {
    pub interval_ms: u64,
    pub emit_probability: f64,
    pub capacity: usize,
}

impl Default for ThreatFeedConfig {
    fn default() -> Self {
        Self {
            interval_ms: 3_000,
            emit_probability: 0.3,
            capacity: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialStreamConfig {
    pub interval_ms: u64,
    pub emit_probability: f64,
    pub capacity: usize,
    /// Connectivity check cadence (slower than post generation).
    pub status_interval_ms: u64,
    pub disconnect_probability: f64,
    pub reconnect_delay_ms: u64,
}

impl Default for SocialStreamConfig {
    fn default() -> Self {
        Self {
            interval_ms: 2_000,
            emit_probability: 0.4,
            capacity: 10,
            status_interval_ms: 10_000,
            disconnect_probability: 0.05,
            reconnect_delay_ms: 2_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreatMapConfig {
    pub interval_ms: u64,
    pub severity_resample_probability: f64,
}

impl Default for ThreatMapConfig {
    fn default() -> Self {
        Self {
            interval_ms: 5_000,
            severity_resample_probability: 0.1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatorConfig {
    pub interval_ms: u64,
    pub score_floor: f64,
    pub score_ceiling: f64,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            interval_ms: 3_000,
            score_floor: 60.0,
            score_ceiling: 85.0,
        }
    }
}

impl WatchConfig {
    /// Load from a TOML file and validate it.
    pub fn load<P: AsRef<Path>>(path: P) -> VerityResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: WatchConfig = toml::from_str(&raw)?;
        config.validate()?;
        info!(path = %path.as_ref().display(), "Configuration loaded");
        Ok(config)
    }

    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> VerityResult<()> {
        if self.analysis.queue_capacity == 0 {
            return Err(VerityError::Config(
                "analysis.queue_capacity must be at least 1".into(),
            ));
        }
        if self.analysis.min_delay_ms > self.analysis.max_delay_ms {
            return Err(VerityError::Config(format!(
                "analysis delay bounds inverted: min {} > max {}",
                self.analysis.min_delay_ms, self.analysis.max_delay_ms
            )));
        }
        let probabilities = [
            ("threat_feed.emit_probability", self.threat_feed.emit_probability),
            ("social_stream.emit_probability", self.social_stream.emit_probability),
            (
                "social_stream.disconnect_probability",
                self.social_stream.disconnect_probability,
            ),
            (
                "threat_map.severity_resample_probability",
                self.threat_map.severity_resample_probability,
            ),
        ];
        for (name, p) in probabilities {
            if !(0.0..=1.0).contains(&p) {
                return Err(VerityError::Config(format!(
                    "{} must be within [0, 1], got {}",
                    name, p
                )));
            }
        }
        if self.aggregator.score_floor > self.aggregator.score_ceiling {
            return Err(VerityError::Config(format!(
                "aggregator score band inverted: floor {} > ceiling {}",
                self.aggregator.score_floor, self.aggregator.score_ceiling
            )));
        }
        Ok(())
    }

    /// Write the config (typically defaults) to a TOML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> VerityResult<()> {
        let raw = toml::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), raw)?;
        Ok(())
    }
}
