//! # Threat feed — synthesized platform threat alerts
//!
//! Each tick rolls an emission probability and, on success, fabricates a
//! `ThreatEvent` from fixed category/platform/description vocabularies.
//! Alerts are immutable once created and live in a bounded
//! most-recent-first list.

use crate::bus::{EventBus, EventCategory};
use crate::types::{Severity, ThreatCategory};
use parking_lot::RwLock;
use rand::rngs::StdRng;
use rand::Rng;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Monitored platform names the feed attributes alerts to.
const PLATFORMS: [&str; 6] = [
    "Twitter/X",
    "TikTok",
    "YouTube",
    "Facebook",
    "Instagram",
    "Telegram",
];

const DESCRIPTIONS: [&str; 5] = [
    "Synthetic face detected in viral video",
    "Coordinated bot network spreading false claims",
    "AI-generated voice mimicking public figure",
    "Deepfake video of political candidate",
    "Manipulated audio in news broadcast",
];

/// A synthesized threat alert. Immutable once created.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ThreatEvent {
    pub id: u64,
    pub category: ThreatCategory,
    pub severity: Severity,
    /// Source platform name.
    pub source: String,
    pub description: String,
    pub reality_score: u8,
    pub timestamp_ms: i64,
}

pub struct ThreatFeedGenerator {
    alerts: RwLock<Vec<ThreatEvent>>,
    capacity: usize,
    emit_probability: f64,
    next_id: AtomicU64,
    ticks: AtomicU64,
    total_emitted: AtomicU64,
    running: Arc<AtomicBool>,
}

impl ThreatFeedGenerator {
    pub fn new(capacity: usize, emit_probability: f64) -> Self {
        Self {
            alerts: RwLock::new(Vec::with_capacity(capacity.max(1))),
            capacity: capacity.max(1),
            emit_probability: emit_probability.clamp(0.0, 1.0),
            next_id: AtomicU64::new(1),
            ticks: AtomicU64::new(0),
            total_emitted: AtomicU64::new(0),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// One generation cycle. Returns the new alert when the emission roll
    /// succeeds. Callable directly so tests never need a timer.
    pub fn tick(&self, rng: &mut StdRng) -> Option<ThreatEvent> {
        self.ticks.fetch_add(1, Ordering::Relaxed);
        if !rng.gen_bool(self.emit_probability) {
            return None;
        }

        let event = ThreatEvent {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            category: ThreatCategory::ALL[rng.gen_range(0..ThreatCategory::ALL.len())],
            severity: Severity::THREAT_LEVELS[rng.gen_range(0..Severity::THREAT_LEVELS.len())],
            source: PLATFORMS[rng.gen_range(0..PLATFORMS.len())].to_string(),
            description: DESCRIPTIONS[rng.gen_range(0..DESCRIPTIONS.len())].to_string(),
            reality_score: rng.gen_range(10..50),
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
        };

        let mut alerts = self.alerts.write();
        alerts.insert(0, event.clone());
        alerts.truncate(self.capacity);
        drop(alerts);

        self.total_emitted.fetch_add(1, Ordering::Relaxed);
        Some(event)
    }

    /// Start the generation loop. Each emitted alert is published on the
    /// bus as a ThreatAlert event carrying its own severity.
    pub fn start_periodic(self: &Arc<Self>, interval: Duration, mut rng: StdRng, bus: Arc<EventBus>) {
        self.running.store(true, Ordering::Relaxed);
        let feed = self.clone();
        let running = self.running.clone();

        info!(interval_ms = interval.as_millis() as u64, "Threat feed started");

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            while running.load(Ordering::Relaxed) {
                ticker.tick().await;
                if !running.load(Ordering::Relaxed) {
                    break;
                }
                if let Some(event) = feed.tick(&mut rng) {
                    let mut details = HashMap::new();
                    details.insert("platform".into(), event.source.clone());
                    details.insert("category".into(), format!("{:?}", event.category));
                    details.insert("reality_score".into(), event.reality_score.to_string());
                    bus.emit(
                        "threat_feed",
                        EventCategory::ThreatAlert,
                        event.severity,
                        &event.description,
                        details,
                        vec!["feed".into()],
                    );
                }
            }
            info!("Threat feed stopped");
        });
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    /// Snapshot of recent alerts, most-recent-first.
    pub fn alerts(&self) -> Vec<ThreatEvent> {
        self.alerts.read().clone()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }
    pub fn total_emitted(&self) -> u64 {
        self.total_emitted.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn list_bounded_and_most_recent_first() {
        let feed = ThreatFeedGenerator::new(5, 1.0);
        let mut rng = StdRng::seed_from_u64(1);
        let mut last_id = 0;
        for _ in 0..20 {
            let event = feed.tick(&mut rng).expect("probability 1.0 always emits");
            last_id = event.id;
        }
        let alerts = feed.alerts();
        assert_eq!(alerts.len(), 5);
        assert_eq!(alerts[0].id, last_id);
        // Strictly descending ids: most-recent-first, oldest evicted.
        for pair in alerts.windows(2) {
            assert!(pair[0].id > pair[1].id);
        }
    }

    #[test]
    fn emission_rate_tracks_probability() {
        let feed = ThreatFeedGenerator::new(5, 0.3);
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..1000 {
            feed.tick(&mut rng);
        }
        let emitted = feed.total_emitted();
        // Binomial(1000, 0.3): mean 300, σ ≈ 14.5.
        assert!(
            (240..=360).contains(&emitted),
            "emitted {} outside statistical tolerance",
            emitted
        );
        assert_eq!(feed.ticks(), 1000);
    }

    #[test]
    fn reality_scores_in_synthesized_band() {
        let feed = ThreatFeedGenerator::new(5, 1.0);
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..200 {
            let event = feed.tick(&mut rng).unwrap();
            assert!((10..50).contains(&event.reality_score));
        }
    }

    #[test]
    fn zero_probability_never_emits() {
        let feed = ThreatFeedGenerator::new(5, 0.0);
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..100 {
            assert!(feed.tick(&mut rng).is_none());
        }
        assert!(feed.alerts().is_empty());
    }
}
