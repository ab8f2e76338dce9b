//! # Social stream — simulated live feed of flagged posts
//!
//! Fabricates social posts from fixed platform/author/content
//! vocabularies, derives a risk level from each post's reality score, and
//! keeps a bounded most-recent-first list. A connectivity flag flips to
//! disconnected with small probability on a slower cadence and
//! auto-recovers shortly after.

use crate::bus::{EventBus, EventCategory};
use crate::types::{RiskLevel, Severity};
use parking_lot::RwLock;
use rand::rngs::StdRng;
use rand::Rng;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const PLATFORMS: [&str; 6] = [
    "Twitter/X",
    "TikTok",
    "Instagram",
    "YouTube",
    "Facebook",
    "Telegram",
];

const AUTHORS: [&str; 5] = [
    "@newsaccount",
    "@politicaltalk",
    "@breakingnews",
    "@viral_content",
    "@celebrity_news",
];

const CONTENTS: [&str; 6] = [
    "BREAKING: New footage emerges from recent political event...",
    "Celebrity spotted in compromising situation - watch full video",
    "Government official makes shocking statement about economy",
    "VIRAL: Amazing rescue caught on camera goes worldwide",
    "EXCLUSIVE: Leaked audio reveals shocking conversation",
    "URGENT: Emergency services respond to developing situation",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamStatus {
    Connected,
    Disconnected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PostMetrics {
    pub likes: u32,
    pub shares: u32,
    pub comments: u32,
}

/// A synthesized social post. Immutable once created.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SocialPost {
    pub id: u64,
    pub platform: String,
    pub author: String,
    pub content: String,
    pub engagement: u32,
    pub reality_score: u8,
    /// 0–100 prediction of how far the post will spread.
    pub viral_prediction: u8,
    pub risk_level: RiskLevel,
    pub metrics: PostMetrics,
    pub timestamp_ms: i64,
}

pub struct SocialStreamGenerator {
    posts: RwLock<Vec<SocialPost>>,
    status: RwLock<StreamStatus>,
    capacity: usize,
    emit_probability: f64,
    disconnect_probability: f64,
    next_id: AtomicU64,
    ticks: AtomicU64,
    total_emitted: AtomicU64,
    total_disconnects: AtomicU64,
    running: Arc<AtomicBool>,
}

impl SocialStreamGenerator {
    pub fn new(capacity: usize, emit_probability: f64, disconnect_probability: f64) -> Self {
        Self {
            posts: RwLock::new(Vec::with_capacity(capacity.max(1))),
            status: RwLock::new(StreamStatus::Connected),
            capacity: capacity.max(1),
            emit_probability: emit_probability.clamp(0.0, 1.0),
            disconnect_probability: disconnect_probability.clamp(0.0, 1.0),
            next_id: AtomicU64::new(1),
            ticks: AtomicU64::new(0),
            total_emitted: AtomicU64::new(0),
            total_disconnects: AtomicU64::new(0),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// One post-generation cycle. Returns the new post when the emission
    /// roll succeeds.
    pub fn tick(&self, rng: &mut StdRng) -> Option<SocialPost> {
        self.ticks.fetch_add(1, Ordering::Relaxed);
        if !rng.gen_bool(self.emit_probability) {
            return None;
        }

        let reality_score: u8 = rng.gen_range(20..100);
        let post = SocialPost {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            platform: PLATFORMS[rng.gen_range(0..PLATFORMS.len())].to_string(),
            author: AUTHORS[rng.gen_range(0..AUTHORS.len())].to_string(),
            content: CONTENTS[rng.gen_range(0..CONTENTS.len())].to_string(),
            engagement: rng.gen_range(1_000..11_000),
            reality_score,
            viral_prediction: rng.gen_range(0..100),
            risk_level: RiskLevel::from_reality_score(reality_score),
            metrics: PostMetrics {
                likes: rng.gen_range(100..5_100),
                shares: rng.gen_range(50..1_050),
                comments: rng.gen_range(25..525),
            },
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
        };

        let mut posts = self.posts.write();
        posts.insert(0, post.clone());
        posts.truncate(self.capacity);
        drop(posts);

        self.total_emitted.fetch_add(1, Ordering::Relaxed);
        Some(post)
    }

    /// One connectivity cycle. Returns true when this roll disconnected
    /// the stream; the periodic loop handles the delayed recovery.
    pub fn tick_status(&self, rng: &mut StdRng) -> bool {
        if *self.status.read() == StreamStatus::Disconnected {
            return false;
        }
        if rng.gen_bool(self.disconnect_probability) {
            *self.status.write() = StreamStatus::Disconnected;
            self.total_disconnects.fetch_add(1, Ordering::Relaxed);
            return true;
        }
        false
    }

    pub fn reconnect(&self) {
        *self.status.write() = StreamStatus::Connected;
    }

    pub fn status(&self) -> StreamStatus {
        *self.status.read()
    }

    /// Start the post loop and the slower connectivity loop.
    pub fn start_periodic(
        self: &Arc<Self>,
        post_interval: Duration,
        status_interval: Duration,
        reconnect_delay: Duration,
        mut rng: StdRng,
        mut status_rng: StdRng,
        bus: Arc<EventBus>,
    ) {
        self.running.store(true, Ordering::Relaxed);

        info!(
            post_interval_ms = post_interval.as_millis() as u64,
            status_interval_ms = status_interval.as_millis() as u64,
            "Social stream started"
        );

        let stream = self.clone();
        let running = self.running.clone();
        let post_bus = bus.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(post_interval);
            while running.load(Ordering::Relaxed) {
                ticker.tick().await;
                if !running.load(Ordering::Relaxed) {
                    break;
                }
                if let Some(post) = stream.tick(&mut rng) {
                    let mut details = HashMap::new();
                    details.insert("platform".into(), post.platform.clone());
                    details.insert("author".into(), post.author.clone());
                    details.insert("reality_score".into(), post.reality_score.to_string());
                    details.insert("viral_prediction".into(), post.viral_prediction.to_string());
                    let severity = match post.risk_level {
                        RiskLevel::Critical => Severity::Critical,
                        RiskLevel::High => Severity::High,
                        RiskLevel::Medium => Severity::Medium,
                        RiskLevel::Low => Severity::Low,
                    };
                    post_bus.emit(
                        "social_stream",
                        EventCategory::SocialPost,
                        severity,
                        &post.content,
                        details,
                        vec!["stream".into()],
                    );
                }
            }
            info!("Social stream stopped");
        });

        let stream = self.clone();
        let running = self.running.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(status_interval);
            while running.load(Ordering::Relaxed) {
                ticker.tick().await;
                if !running.load(Ordering::Relaxed) {
                    break;
                }
                if stream.tick_status(&mut status_rng) {
                    warn!("Social stream disconnected, reconnecting shortly");
                    bus.emit(
                        "social_stream",
                        EventCategory::StreamStatus,
                        Severity::Medium,
                        "Stream disconnected",
                        HashMap::new(),
                        vec!["stream".into()],
                    );
                    tokio::time::sleep(reconnect_delay).await;
                    if !running.load(Ordering::Relaxed) {
                        break;
                    }
                    stream.reconnect();
                    bus.emit(
                        "social_stream",
                        EventCategory::StreamStatus,
                        Severity::Info,
                        "Stream reconnected",
                        HashMap::new(),
                        vec!["stream".into()],
                    );
                }
            }
        });
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    /// Snapshot of recent posts, most-recent-first.
    pub fn posts(&self) -> Vec<SocialPost> {
        self.posts.read().clone()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }
    pub fn total_emitted(&self) -> u64 {
        self.total_emitted.load(Ordering::Relaxed)
    }
    pub fn total_disconnects(&self) -> u64 {
        self.total_disconnects.load(Ordering::Relaxed)
    }
}
