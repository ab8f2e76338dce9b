//! # Monitor engine — composition root
//!
//! Owns the bus, the analysis queue, the three generators, the
//! aggregator, and the emergency controls. `start` spawns every periodic
//! loop; `shutdown` stops them all and suppresses any in-flight analysis
//! completion so nothing mutates state after teardown.
//!
//! Each loop gets its own RNG derived from the configured seed, so a
//! seeded engine replays the same simulation.

use crate::aggregator::{DashboardAggregator, DashboardStats};
use crate::analysis::{AnalysisQueue, AnalysisRecord};
use crate::bus::{EventBus, EventCategory};
use crate::config::WatchConfig;
use crate::emergency::EmergencyControls;
use crate::error::{VerityError, VerityResult};
use crate::score;
use crate::social_stream::{SocialPost, SocialStreamGenerator, StreamStatus};
use crate::threat_feed::{ThreatEvent, ThreatFeedGenerator};
use crate::threat_map::{ThreatMap, ThreatMapPoint};
use crate::types::{FileDescriptor, Severity};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub struct MonitorEngine {
    config: WatchConfig,
    bus: Arc<EventBus>,
    queue: Arc<AnalysisQueue>,
    threat_feed: Arc<ThreatFeedGenerator>,
    social_stream: Arc<SocialStreamGenerator>,
    threat_map: Arc<ThreatMap>,
    aggregator: Arc<DashboardAggregator>,
    emergency: Arc<EmergencyControls>,
    running: Arc<AtomicBool>,
    started_at_ms: i64,
}

impl MonitorEngine {
    pub fn new(config: WatchConfig) -> Self {
        let queue = Arc::new(AnalysisQueue::new(config.analysis.queue_capacity));
        let threat_feed = Arc::new(ThreatFeedGenerator::new(
            config.threat_feed.capacity,
            config.threat_feed.emit_probability,
        ));
        let social_stream = Arc::new(SocialStreamGenerator::new(
            config.social_stream.capacity,
            config.social_stream.emit_probability,
            config.social_stream.disconnect_probability,
        ));
        let threat_map = Arc::new(ThreatMap::new(
            config.threat_map.severity_resample_probability,
        ));
        let aggregator = Arc::new(DashboardAggregator::new(
            config.aggregator.score_floor,
            config.aggregator.score_ceiling,
        ));

        Self {
            config,
            bus: Arc::new(EventBus::new()),
            queue,
            threat_feed,
            social_stream,
            threat_map,
            aggregator,
            emergency: Arc::new(EmergencyControls::new()),
            running: Arc::new(AtomicBool::new(false)),
            started_at_ms: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Derive an independent RNG for one loop or submission. Seeded runs
    /// replay deterministically; unseeded runs draw from OS entropy.
    fn rng(&self, stream: u64) -> StdRng {
        match self.config.general.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(stream)),
            None => StdRng::from_entropy(),
        }
    }

    /// Spawn all periodic loops and wire the aggregator to the threat
    /// alert stream.
    pub fn start(&self) {
        self.running.store(true, Ordering::Relaxed);

        // Active-threat tile counts High/Critical alerts as they happen.
        let aggregator = self.aggregator.clone();
        self.bus.subscribe(
            "aggregator_active_threats",
            Some(EventCategory::ThreatAlert),
            None,
            vec![],
            Arc::new(move |event| aggregator.observe_alert(event.severity)),
        );

        self.threat_feed.start_periodic(
            Duration::from_millis(self.config.threat_feed.interval_ms),
            self.rng(1),
            self.bus.clone(),
        );
        self.social_stream.start_periodic(
            Duration::from_millis(self.config.social_stream.interval_ms),
            Duration::from_millis(self.config.social_stream.status_interval_ms),
            Duration::from_millis(self.config.social_stream.reconnect_delay_ms),
            self.rng(2),
            self.rng(3),
            self.bus.clone(),
        );
        self.threat_map.start_periodic(
            Duration::from_millis(self.config.threat_map.interval_ms),
            self.rng(4),
            self.bus.clone(),
        );
        self.aggregator.start_periodic(
            Duration::from_millis(self.config.aggregator.interval_ms),
            self.rng(5),
            self.bus.clone(),
        );

        self.bus.emit(
            "engine",
            EventCategory::Health,
            Severity::Info,
            "Monitor engine started",
            HashMap::new(),
            vec!["engine".into()],
        );
        info!("Monitor engine started");
    }

    /// Submit a file for analysis. Returns the record id immediately; the
    /// verdict lands after a simulated processing delay.
    pub fn submit(&self, file: FileDescriptor) -> VerityResult<u64> {
        if !self.running.load(Ordering::Relaxed) {
            return Err(VerityError::EngineStopped);
        }

        let id = self.queue.submit(&file);

        let mut details = HashMap::new();
        details.insert("file".into(), file.name.clone());
        details.insert("kind".into(), format!("{:?}", file.media_kind));
        self.bus.emit(
            "analysis_queue",
            EventCategory::Analysis,
            Severity::Info,
            "Analysis queued",
            details,
            vec!["analysis".into()],
        );

        let queue = self.queue.clone();
        let bus = self.bus.clone();
        let running = self.running.clone();
        let mut rng = self.rng(0x100 + id);
        let min = self.config.analysis.min_delay_ms;
        let max = self.config.analysis.max_delay_ms.max(min + 1);

        tokio::spawn(async move {
            let delay = rng.gen_range(min..max);
            tokio::time::sleep(Duration::from_millis(delay)).await;

            // Teardown cancellation: never touch the queue after shutdown.
            if !running.load(Ordering::Relaxed) {
                return;
            }

            let verdict = score::evaluate(&file, &mut rng);
            let reality_score = verdict.reality_score;
            if queue.complete(id, verdict) {
                let severity = if reality_score < 40 {
                    Severity::High
                } else if reality_score < 60 {
                    Severity::Medium
                } else {
                    Severity::Info
                };
                let mut details = HashMap::new();
                details.insert("file".into(), file.name.clone());
                details.insert("reality_score".into(), reality_score.to_string());
                bus.emit(
                    "analysis_queue",
                    EventCategory::Analysis,
                    severity,
                    "Analysis complete",
                    details,
                    vec!["analysis".into()],
                );
            }
        });

        Ok(id)
    }

    /// Mark a submission as failed (e.g. unreadable input). Terminal;
    /// errors when the record was evicted or already has a verdict.
    pub fn fail_analysis(&self, id: u64, reason: &str) -> VerityResult<()> {
        if !self.queue.fail(id, reason) {
            return Err(VerityError::AnalysisFailed {
                id,
                reason: "record evicted or already terminal".into(),
            });
        }
        let mut details = HashMap::new();
        details.insert("reason".into(), reason.to_string());
        self.bus.emit(
            "analysis_queue",
            EventCategory::Analysis,
            Severity::Medium,
            "Analysis failed",
            details,
            vec!["analysis".into()],
        );
        Ok(())
    }

    /// Stop every loop and suppress pending analysis completions.
    pub fn shutdown(&self) {
        self.running.store(false, Ordering::Relaxed);
        self.threat_feed.stop();
        self.social_stream.stop();
        self.threat_map.stop();
        self.aggregator.stop();
        info!(
            alerts = self.threat_feed.total_emitted(),
            posts = self.social_stream.total_emitted(),
            analyses = self.queue.total_completed(),
            "Monitor engine stopped"
        );
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    // ── Subscription surface ─────────────────────────────────────────────

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }
    pub fn queue(&self) -> &Arc<AnalysisQueue> {
        &self.queue
    }
    pub fn emergency(&self) -> &Arc<EmergencyControls> {
        &self.emergency
    }

    pub fn threats(&self) -> Vec<ThreatEvent> {
        self.threat_feed.alerts()
    }
    pub fn posts(&self) -> Vec<SocialPost> {
        self.social_stream.posts()
    }
    pub fn stream_status(&self) -> StreamStatus {
        self.social_stream.status()
    }
    pub fn map_points(&self) -> Vec<ThreatMapPoint> {
        self.threat_map.points()
    }
    pub fn analyses(&self) -> Vec<AnalysisRecord> {
        self.queue.records()
    }
    pub fn stats(&self) -> DashboardStats {
        self.aggregator.stats()
    }
    pub fn started_at_ms(&self) -> i64 {
        self.started_at_ms
    }
}
