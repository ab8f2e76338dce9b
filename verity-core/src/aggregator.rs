//! # Dashboard aggregator — process-wide stat tiles
//!
//! Maintains the global reality score (a bounded random walk), the
//! monotonically growing processed-content counter, and the active-threat
//! counter fed by high-severity alerts. Explicit lifecycle, no ambient
//! state, nothing persisted: restart means defaults.

use crate::bus::{EventBus, EventCategory};
use crate::threat_feed::ThreatEvent;
use crate::types::Severity;
use parking_lot::RwLock;
use rand::rngs::StdRng;
use rand::Rng;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

const INITIAL_GLOBAL_SCORE: f64 = 73.0;
const INITIAL_ACTIVE_THREATS: u64 = 156;
const INITIAL_PROCESSED: u64 = 47_230_891;

/// Snapshot of the aggregate counters for the stat tiles.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DashboardStats {
    pub global_reality_score: f64,
    pub active_threats: u64,
    pub processed_total: u64,
    pub ticks: u64,
}

pub struct DashboardAggregator {
    global_score: RwLock<f64>,
    score_floor: f64,
    score_ceiling: f64,
    active_threats: AtomicU64,
    processed_total: AtomicU64,
    ticks: AtomicU64,
    running: Arc<AtomicBool>,
}

impl DashboardAggregator {
    pub fn new(score_floor: f64, score_ceiling: f64) -> Self {
        Self {
            global_score: RwLock::new(INITIAL_GLOBAL_SCORE),
            score_floor,
            score_ceiling: score_ceiling.max(score_floor),
            active_threats: AtomicU64::new(INITIAL_ACTIVE_THREATS),
            processed_total: AtomicU64::new(INITIAL_PROCESSED),
            ticks: AtomicU64::new(0),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// One aggregation cycle: walk the global score and grow the
    /// processed counter.
    pub fn tick(&self, rng: &mut StdRng) {
        self.ticks.fetch_add(1, Ordering::Relaxed);

        let step: f64 = rng.gen_range(-1.0..1.0);
        let mut score = self.global_score.write();
        *score = (*score + step).clamp(self.score_floor, self.score_ceiling);
        drop(score);

        self.processed_total
            .fetch_add(rng.gen_range(0..1_000), Ordering::Relaxed);
    }

    /// Count an alert against the active-threat tile. Only High and
    /// Critical alerts count; the counter never decreases.
    pub fn observe_alert(&self, severity: Severity) {
        if severity >= Severity::High {
            self.active_threats.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn observe_threat(&self, event: &ThreatEvent) {
        self.observe_alert(event.severity);
    }

    pub fn start_periodic(self: &Arc<Self>, interval: Duration, mut rng: StdRng, bus: Arc<EventBus>) {
        self.running.store(true, Ordering::Relaxed);
        let aggregator = self.clone();
        let running = self.running.clone();

        info!(interval_ms = interval.as_millis() as u64, "Aggregator started");

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            while running.load(Ordering::Relaxed) {
                ticker.tick().await;
                if !running.load(Ordering::Relaxed) {
                    break;
                }
                aggregator.tick(&mut rng);
                let stats = aggregator.stats();
                let mut details = std::collections::HashMap::new();
                details.insert(
                    "global_reality_score".into(),
                    format!("{:.1}", stats.global_reality_score),
                );
                details.insert("active_threats".into(), stats.active_threats.to_string());
                details.insert("processed_total".into(), stats.processed_total.to_string());
                bus.emit(
                    "aggregator",
                    EventCategory::Health,
                    Severity::Info,
                    "Stats updated",
                    details,
                    vec!["stats".into()],
                );
            }
            info!("Aggregator stopped");
        });
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    pub fn stats(&self) -> DashboardStats {
        DashboardStats {
            global_reality_score: *self.global_score.read(),
            active_threats: self.active_threats.load(Ordering::Relaxed),
            processed_total: self.processed_total.load(Ordering::Relaxed),
            ticks: self.ticks.load(Ordering::Relaxed),
        }
    }

    pub fn global_reality_score(&self) -> f64 {
        *self.global_score.read()
    }
    pub fn active_threats(&self) -> u64 {
        self.active_threats.load(Ordering::Relaxed)
    }
    pub fn processed_total(&self) -> u64 {
        self.processed_total.load(Ordering::Relaxed)
    }
}
