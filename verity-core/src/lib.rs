//! # Verity Core
//!
//! Core engine for the Verity Watch synthetic-media monitoring console.
//! Everything here is a high-fidelity simulation: a metadata-driven
//! reality-score heuristic, a bounded analysis queue with delayed
//! verdicts, mock threat/social/map generators on independent timers, a
//! dashboard aggregator, and an event bus tying them together.
//!
//! ## Components
//!
//! - [`engine::MonitorEngine`] — composition root, lifecycle, submission
//! - [`score`] — the reality-score heuristic
//! - [`analysis::AnalysisQueue`] — bounded most-recent-first queue
//! - [`threat_feed::ThreatFeedGenerator`] — probabilistic alert feed
//! - [`social_stream::SocialStreamGenerator`] — flagged posts + connectivity
//! - [`threat_map::ThreatMap`] — geographic hot spots
//! - [`aggregator::DashboardAggregator`] — stat tiles
//! - [`bus::EventBus`] — filtered pub/sub for every subsystem
//!
//! All randomness flows through injected [`rand::rngs::StdRng`] handles,
//! so a seeded engine replays the same simulation run for run.

pub mod aggregator;
pub mod analysis;
pub mod bus;
pub mod config;
pub mod emergency;
pub mod engine;
pub mod error;
pub mod score;
pub mod social_stream;
pub mod threat_feed;
pub mod threat_map;
pub mod types;

pub use aggregator::{DashboardAggregator, DashboardStats};
pub use analysis::{AnalysisQueue, AnalysisRecord, AnalysisStatus};
pub use bus::{EventBus, EventCategory, MonitorEvent, SubscriberFn};
pub use config::WatchConfig;
pub use emergency::EmergencyControls;
pub use engine::MonitorEngine;
pub use error::{VerityError, VerityResult};
pub use score::AnalysisVerdict;
pub use social_stream::{SocialPost, SocialStreamGenerator, StreamStatus};
pub use threat_feed::{ThreatEvent, ThreatFeedGenerator};
pub use threat_map::{ThreatMap, ThreatMapPoint};
pub use types::{score_verdict, FileDescriptor, MediaKind, RiskLevel, Severity, ThreatCategory};

/// Library version, from the crate manifest.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
