//! End-to-end integration tests for Verity Watch
//!
//! These tests exercise real multi-component scenarios:
//! - Submission → delayed verdict → event bus flow
//! - Bounded queue eviction under sustained submission
//! - Event bus routing with severity and category filters
//! - Risk classification boundaries
//! - Generator emission rates under a fixed seed
//! - Deterministic replay of seeded simulations

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use verity_core::score;
use verity_core::{
    AnalysisQueue, AnalysisStatus, EventBus, EventCategory, FileDescriptor, MediaKind,
    MonitorEngine, RiskLevel, Severity, SocialStreamGenerator, StreamStatus, ThreatFeedGenerator,
    ThreatMap, WatchConfig,
};

fn fast_config(seed: u64) -> WatchConfig {
    let mut config = WatchConfig::default();
    config.general.seed = Some(seed);
    config.analysis.min_delay_ms = 10;
    config.analysis.max_delay_ms = 30;
    config
}

fn media_file(name: &str, size_mb: u64, kind: MediaKind) -> FileDescriptor {
    FileDescriptor {
        name: name.to_string(),
        size_bytes: size_mb * 1024 * 1024,
        media_kind: kind,
    }
}

// ── Scenario 1: Submission → verdict → event bus ─────────────────────────

#[tokio::test]
async fn test_submission_to_verdict_flow() {
    let engine = MonitorEngine::new(fast_config(11));
    engine.start();

    let completions = Arc::new(AtomicU64::new(0));
    let seen = completions.clone();
    engine.bus().subscribe(
        "test_completions",
        Some(EventCategory::Analysis),
        None,
        vec![],
        Arc::new(move |event| {
            if event.title == "Analysis complete" {
                seen.fetch_add(1, Ordering::Relaxed);
            }
        }),
    );

    let id = engine
        .submit(media_file("interview_clip.mp4", 12, MediaKind::Video))
        .unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;

    let record = engine.queue().get(id).unwrap();
    assert_eq!(record.status, AnalysisStatus::Complete);
    let score = record.reality_score.unwrap();
    assert!(score <= 100);
    let confidence = record.confidence.unwrap();
    // Confidence tracks the score at roughly 80% plus a random bump.
    assert!(confidence <= 100);
    assert!(u32::from(confidence) + 20 > u32::from(score) * 8 / 10);
    assert_eq!(completions.load(Ordering::Relaxed), 1);

    engine.shutdown();
}

// ── Scenario 2: Bounded queue under sustained submission ─────────────────

#[tokio::test]
async fn test_queue_eviction_under_sustained_submission() {
    let engine = MonitorEngine::new(fast_config(13));
    engine.start();

    let mut ids = Vec::new();
    for i in 0..8 {
        let id = engine
            .submit(media_file(&format!("clip_{i}.mp4"), 5, MediaKind::Video))
            .unwrap();
        ids.push(id);
    }

    let records = engine.analyses();
    assert_eq!(records.len(), 5);
    // Most recent first; the three oldest submissions were evicted.
    assert_eq!(records[0].id, ids[7]);
    assert_eq!(records[4].id, ids[3]);

    tokio::time::sleep(Duration::from_millis(200)).await;

    // Verdicts for evicted submissions are dropped silently.
    for record in engine.analyses() {
        assert_eq!(record.status, AnalysisStatus::Complete);
    }
    for id in &ids[..3] {
        assert!(engine.queue().get(*id).is_none());
    }

    engine.shutdown();
}

// ── Scenario 3: Event bus severity/category routing ──────────────────────

#[test]
fn test_bus_severity_and_category_filters() {
    let bus = EventBus::new();

    let high_alerts = Arc::new(AtomicU64::new(0));
    let all_analysis = Arc::new(AtomicU64::new(0));

    let counter = high_alerts.clone();
    bus.subscribe(
        "high_threats",
        Some(EventCategory::ThreatAlert),
        Some(Severity::High),
        vec![],
        Arc::new(move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
        }),
    );
    let counter = all_analysis.clone();
    bus.subscribe(
        "all_analysis",
        Some(EventCategory::Analysis),
        None,
        vec![],
        Arc::new(move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
        }),
    );

    bus.emit(
        "threat_feed",
        EventCategory::ThreatAlert,
        Severity::Critical,
        "Coordinated bot network amplifying fake content",
        HashMap::new(),
        vec!["feed".into()],
    );
    bus.emit(
        "threat_feed",
        EventCategory::ThreatAlert,
        Severity::Low,
        "AI-generated profile pictures in bot network",
        HashMap::new(),
        vec!["feed".into()],
    );
    bus.emit(
        "analysis_queue",
        EventCategory::Analysis,
        Severity::Info,
        "Analysis queued",
        HashMap::new(),
        vec!["analysis".into()],
    );

    assert_eq!(high_alerts.load(Ordering::Relaxed), 1);
    assert_eq!(all_analysis.load(Ordering::Relaxed), 1);
    assert_eq!(bus.total_published(), 3);
}

// ── Scenario 4: Risk classification boundaries ───────────────────────────

#[test]
fn test_risk_level_boundaries() {
    assert_eq!(RiskLevel::from_reality_score(0), RiskLevel::Critical);
    assert_eq!(RiskLevel::from_reality_score(39), RiskLevel::Critical);
    assert_eq!(RiskLevel::from_reality_score(40), RiskLevel::High);
    assert_eq!(RiskLevel::from_reality_score(59), RiskLevel::High);
    assert_eq!(RiskLevel::from_reality_score(60), RiskLevel::Medium);
    assert_eq!(RiskLevel::from_reality_score(74), RiskLevel::Medium);
    assert_eq!(RiskLevel::from_reality_score(75), RiskLevel::Low);
    assert_eq!(RiskLevel::from_reality_score(100), RiskLevel::Low);
}

// ── Scenario 5: Heuristic penalties on suspicious metadata ───────────────

#[test]
fn test_heuristic_penalizes_suspicious_metadata() {
    let mut rng = StdRng::seed_from_u64(17);
    let clean = media_file("family_picnic.jpg", 2, MediaKind::Image);
    let tainted = media_file("ai_generated_fake_speech.mp4", 80, MediaKind::Video);

    let mut clean_total = 0u32;
    let mut tainted_total = 0u32;
    for _ in 0..200 {
        clean_total += u32::from(score::evaluate(&clean, &mut rng).reality_score);
        tainted_total += u32::from(score::evaluate(&tainted, &mut rng).reality_score);
    }

    // Name and size penalties alone are worth 40 points.
    assert!(clean_total > tainted_total + 200 * 30);
}

// ── Scenario 6: Generator emission rates under a fixed seed ──────────────

#[test]
fn test_generator_emission_rates() {
    let feed = ThreatFeedGenerator::new(5, 0.3);
    let mut rng = StdRng::seed_from_u64(23);
    let mut emitted = 0;
    for _ in 0..1_000 {
        if feed.tick(&mut rng).is_some() {
            emitted += 1;
        }
    }
    assert!((240..=360).contains(&emitted), "emitted {emitted}");
    assert_eq!(feed.alerts().len(), 5);

    let stream = SocialStreamGenerator::new(10, 0.4, 0.05);
    let mut rng = StdRng::seed_from_u64(29);
    let mut posted = 0;
    for _ in 0..1_000 {
        if stream.tick(&mut rng).is_some() {
            posted += 1;
        }
    }
    assert!((330..=470).contains(&posted), "posted {posted}");
    assert_eq!(stream.posts().len(), 10);
    assert_eq!(stream.status(), StreamStatus::Connected);
}

// ── Scenario 7: Deterministic replay of seeded simulations ───────────────

#[test]
fn test_seeded_replay_is_deterministic() {
    let run = |seed: u64| {
        let feed = ThreatFeedGenerator::new(5, 0.3);
        let map = ThreatMap::new(0.1);
        let mut feed_rng = StdRng::seed_from_u64(seed);
        let mut map_rng = StdRng::seed_from_u64(seed.wrapping_add(1));
        for _ in 0..100 {
            feed.tick(&mut feed_rng);
            map.tick(&mut map_rng);
        }
        let alerts: Vec<String> = feed
            .alerts()
            .iter()
            .map(|a| format!("{}:{}:{}", a.source, a.description, a.reality_score))
            .collect();
        (alerts, map.total_incidents())
    };

    let (alerts_a, incidents_a) = run(42);
    let (alerts_b, incidents_b) = run(42);
    assert_eq!(alerts_a, alerts_b);
    assert_eq!(incidents_a, incidents_b);

    let (alerts_c, _) = run(43);
    assert_ne!(alerts_a, alerts_c);
}

// ── Scenario 8: Failed analyses are terminal ─────────────────────────────

#[test]
fn test_failed_analysis_is_terminal() {
    let queue = AnalysisQueue::new(5);
    let id = queue.submit(&media_file("unreadable.mov", 1, MediaKind::Video));
    assert!(queue.fail(id, "Analysis failed - file may be corrupted"));

    let record = queue.get(id).unwrap();
    assert_eq!(record.status, AnalysisStatus::Failed);
    assert!(record.reality_score.is_none());

    // Neither completion nor a second failure can overwrite the verdict.
    let mut rng = StdRng::seed_from_u64(3);
    let verdict = score::evaluate(&media_file("unreadable.mov", 1, MediaKind::Video), &mut rng);
    assert!(!queue.complete(id, verdict));
    assert!(!queue.fail(id, "again"));
    assert_eq!(queue.get(id).unwrap().status, AnalysisStatus::Failed);
}
