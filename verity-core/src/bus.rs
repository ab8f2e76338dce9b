//! # Event bus — the engine's subscription surface
//!
//! Typed publish/subscribe routing between the simulation components and
//! whatever renders them. The UI layer subscribes here; the core never
//! depends on any rendering technology.

use crate::types::Severity;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Maximum events held in the log before oldest are pruned.
const MAX_EVENT_LOG: usize = 10_000;
/// Maximum concurrent subscribers.
const MAX_SUBSCRIBERS: usize = 64;

/// The kind of simulated activity an event describes — determines routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum EventCategory {
    /// Analysis queue activity (submission, completion, failure)
    Analysis,
    /// A synthesized threat alert
    ThreatAlert,
    /// A synthesized social post
    SocialPost,
    /// Threat-map point refresh
    MapUpdate,
    /// Social stream connectivity change
    StreamStatus,
    /// Engine housekeeping (startup, shutdown, emergency controls)
    Health,
}

/// A monitoring event flowing through the bus.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MonitorEvent {
    /// Unique event ID (monotonic)
    pub id: u64,
    /// Unix timestamp (millis)
    pub timestamp_ms: i64,
    /// Which component emitted this event
    pub source: String,
    pub category: EventCategory,
    pub severity: Severity,
    /// Short title
    pub title: String,
    /// Structured detail payload
    pub details: HashMap<String, String>,
    /// Tags for filtering (e.g. "feed", "analysis", "map")
    pub tags: Vec<String>,
}

/// Subscriber callback. Registered callbacks must be Send + Sync because
/// generator loops publish from spawned tasks.
pub type SubscriberFn = Arc<dyn Fn(&MonitorEvent) + Send + Sync>;

struct Subscription {
    id: u64,
    name: String,
    filter_category: Option<EventCategory>,
    filter_severity_min: Option<Severity>,
    filter_tags: Vec<String>,
    callback: SubscriberFn,
}

/// The central bus connecting generators, queue, and aggregator to the
/// presentation layer.
pub struct EventBus {
    subscriptions: RwLock<Vec<Subscription>>,
    /// Recent event log (ring buffer semantics via pruning)
    event_log: RwLock<Vec<MonitorEvent>>,
    next_event_id: AtomicU64,
    next_sub_id: AtomicU64,
    total_published: AtomicU64,
    total_delivered: AtomicU64,
    total_dropped: AtomicU64,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            subscriptions: RwLock::new(Vec::new()),
            event_log: RwLock::new(Vec::with_capacity(256)),
            next_event_id: AtomicU64::new(1),
            next_sub_id: AtomicU64::new(1),
            total_published: AtomicU64::new(0),
            total_delivered: AtomicU64::new(0),
            total_dropped: AtomicU64::new(0),
        }
    }

    // ── Publishing ───────────────────────────────────────────────────────

    /// Publish an event. Returns the assigned event ID.
    pub fn publish(&self, mut event: MonitorEvent) -> u64 {
        let id = self.next_event_id.fetch_add(1, Ordering::Relaxed);
        event.id = id;
        if event.timestamp_ms == 0 {
            event.timestamp_ms = chrono::Utc::now().timestamp_millis();
        }
        self.total_published.fetch_add(1, Ordering::Relaxed);

        debug!(
            id = id,
            src = %event.source,
            cat = ?event.category,
            sev = ?event.severity,
            title = %event.title,
            "Event published"
        );

        let subs = self.subscriptions.read();
        for sub in subs.iter() {
            if Self::matches_filter(sub, &event) {
                (sub.callback)(&event);
                self.total_delivered.fetch_add(1, Ordering::Relaxed);
            }
        }
        drop(subs);

        let mut log = self.event_log.write();
        if log.len() >= MAX_EVENT_LOG {
            let drain_count = MAX_EVENT_LOG / 10; // drop oldest 10%
            log.drain(..drain_count);
            self.total_dropped.fetch_add(drain_count as u64, Ordering::Relaxed);
        }
        log.push(event);

        id
    }

    /// Convenience: publish an event from a named component.
    pub fn emit(
        &self,
        source: &str,
        category: EventCategory,
        severity: Severity,
        title: &str,
        details: HashMap<String, String>,
        tags: Vec<String>,
    ) -> u64 {
        self.publish(MonitorEvent {
            id: 0,
            timestamp_ms: 0,
            source: source.into(),
            category,
            severity,
            title: title.into(),
            details,
            tags,
        })
    }

    // ── Subscribing ──────────────────────────────────────────────────────

    /// Subscribe to events. Returns a subscription ID for later unsubscribe.
    pub fn subscribe(
        &self,
        name: &str,
        filter_category: Option<EventCategory>,
        filter_severity_min: Option<Severity>,
        filter_tags: Vec<String>,
        callback: SubscriberFn,
    ) -> u64 {
        let id = self.next_sub_id.fetch_add(1, Ordering::Relaxed);
        let mut subs = self.subscriptions.write();
        if subs.len() >= MAX_SUBSCRIBERS {
            warn!(name = %name, "Max subscribers reached, dropping oldest");
            subs.remove(0);
        }
        subs.push(Subscription {
            id,
            name: name.into(),
            filter_category,
            filter_severity_min,
            filter_tags,
            callback,
        });
        id
    }

    /// Remove a subscription by ID.
    pub fn unsubscribe(&self, sub_id: u64) -> bool {
        let mut subs = self.subscriptions.write();
        let before = subs.len();
        subs.retain(|s| s.id != sub_id);
        subs.len() < before
    }

    // ── Querying ─────────────────────────────────────────────────────────

    /// Get recent events (up to `limit`, most-recent-first), optionally
    /// filtered by category.
    pub fn recent_events(&self, limit: usize, category: Option<EventCategory>) -> Vec<MonitorEvent> {
        let log = self.event_log.read();
        log.iter()
            .rev()
            .filter(|e| category.map_or(true, |c| e.category == c))
            .take(limit)
            .cloned()
            .collect()
    }

    // ── Stats ────────────────────────────────────────────────────────────

    pub fn total_published(&self) -> u64 {
        self.total_published.load(Ordering::Relaxed)
    }
    pub fn total_delivered(&self) -> u64 {
        self.total_delivered.load(Ordering::Relaxed)
    }
    pub fn total_dropped(&self) -> u64 {
        self.total_dropped.load(Ordering::Relaxed)
    }
    pub fn event_log_size(&self) -> usize {
        self.event_log.read().len()
    }
    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.read().len()
    }

    fn matches_filter(sub: &Subscription, event: &MonitorEvent) -> bool {
        if let Some(cat) = sub.filter_category {
            if event.category != cat {
                return false;
            }
        }
        if let Some(min_sev) = sub.filter_severity_min {
            if event.severity < min_sev {
                return false;
            }
        }
        if !sub.filter_tags.is_empty() && !sub.filter_tags.iter().any(|ft| event.tags.contains(ft))
        {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU64 as TestCounter;

    #[test]
    fn publish_and_subscribe() {
        let bus = EventBus::new();
        let counter = Arc::new(TestCounter::new(0));
        let c = counter.clone();

        bus.subscribe(
            "test_sub",
            Some(EventCategory::ThreatAlert),
            None,
            vec![],
            Arc::new(move |_event| {
                c.fetch_add(1, Ordering::Relaxed);
            }),
        );

        let id = bus.emit(
            "threat_feed",
            EventCategory::ThreatAlert,
            Severity::High,
            "Deepfake video of political candidate",
            HashMap::new(),
            vec!["feed".into()],
        );

        assert!(id > 0);
        assert_eq!(counter.load(Ordering::Relaxed), 1);
        assert_eq!(bus.total_published(), 1);
        assert_eq!(bus.total_delivered(), 1);
    }

    #[test]
    fn category_filter() {
        let bus = EventBus::new();
        let counter = Arc::new(TestCounter::new(0));
        let c = counter.clone();

        bus.subscribe(
            "analysis_only",
            Some(EventCategory::Analysis),
            None,
            vec![],
            Arc::new(move |_| {
                c.fetch_add(1, Ordering::Relaxed);
            }),
        );

        bus.emit(
            "social_stream",
            EventCategory::SocialPost,
            Severity::Low,
            "post",
            HashMap::new(),
            vec![],
        );
        assert_eq!(counter.load(Ordering::Relaxed), 0);

        bus.emit(
            "analysis_queue",
            EventCategory::Analysis,
            Severity::Info,
            "submitted",
            HashMap::new(),
            vec![],
        );
        assert_eq!(counter.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn severity_floor_filter() {
        let bus = EventBus::new();
        let counter = Arc::new(TestCounter::new(0));
        let c = counter.clone();

        bus.subscribe(
            "high_only",
            None,
            Some(Severity::High),
            vec![],
            Arc::new(move |_| {
                c.fetch_add(1, Ordering::Relaxed);
            }),
        );

        bus.emit(
            "threat_feed",
            EventCategory::ThreatAlert,
            Severity::Low,
            "low",
            HashMap::new(),
            vec![],
        );
        assert_eq!(counter.load(Ordering::Relaxed), 0);

        bus.emit(
            "threat_feed",
            EventCategory::ThreatAlert,
            Severity::Critical,
            "crit",
            HashMap::new(),
            vec![],
        );
        assert_eq!(counter.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn tag_filter() {
        let bus = EventBus::new();
        let counter = Arc::new(TestCounter::new(0));
        let c = counter.clone();

        bus.subscribe(
            "map_only",
            None,
            None,
            vec!["map".into()],
            Arc::new(move |_| {
                c.fetch_add(1, Ordering::Relaxed);
            }),
        );

        bus.emit(
            "threat_feed",
            EventCategory::ThreatAlert,
            Severity::High,
            "feed event",
            HashMap::new(),
            vec!["feed".into()],
        );
        assert_eq!(counter.load(Ordering::Relaxed), 0);

        bus.emit(
            "threat_map",
            EventCategory::MapUpdate,
            Severity::Info,
            "map refresh",
            HashMap::new(),
            vec!["map".into()],
        );
        assert_eq!(counter.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn event_log_pruning() {
        let bus = EventBus::new();
        for i in 0..12_000 {
            bus.emit(
                "threat_feed",
                EventCategory::ThreatAlert,
                Severity::Info,
                &format!("event-{}", i),
                HashMap::new(),
                vec![],
            );
        }
        assert!(bus.event_log_size() <= MAX_EVENT_LOG);
        assert_eq!(bus.total_published(), 12_000);
        assert!(bus.total_dropped() > 0);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let bus = EventBus::new();
        let counter = Arc::new(TestCounter::new(0));
        let c = counter.clone();

        let sub_id = bus.subscribe(
            "temp",
            None,
            None,
            vec![],
            Arc::new(move |_| {
                c.fetch_add(1, Ordering::Relaxed);
            }),
        );
        bus.emit(
            "aggregator",
            EventCategory::Health,
            Severity::Info,
            "e1",
            HashMap::new(),
            vec![],
        );
        assert_eq!(counter.load(Ordering::Relaxed), 1);

        assert!(bus.unsubscribe(sub_id));
        bus.emit(
            "aggregator",
            EventCategory::Health,
            Severity::Info,
            "e2",
            HashMap::new(),
            vec![],
        );
        assert_eq!(counter.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn recent_events_most_recent_first() {
        let bus = EventBus::new();
        for title in ["a", "b", "c"] {
            bus.emit(
                "threat_feed",
                EventCategory::ThreatAlert,
                Severity::Low,
                title,
                HashMap::new(),
                vec![],
            );
        }
        let recent = bus.recent_events(2, None);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].title, "c");
        assert_eq!(recent[1].title, "b");
    }
}
