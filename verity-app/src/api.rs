//! JSON API for the monitoring console. Read-only snapshots of every
//! subsystem plus submission and emergency-control endpoints.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use verity_core::{score_verdict, FileDescriptor, MediaKind, MonitorEngine, RiskLevel};

pub async fn start_api(engine: Arc<MonitorEngine>, bind: &str) -> anyhow::Result<()> {
    let app = Router::new()
        .route("/api/status", get(api_status))
        .route("/api/threats", get(api_threats))
        .route("/api/posts", get(api_posts))
        .route("/api/map", get(api_map))
        .route("/api/analyses", get(api_analyses))
        .route("/api/events", get(api_events))
        .route("/api/health", get(api_health))
        .route("/api/analyze", post(api_analyze))
        .route("/api/emergency", post(api_emergency))
        .with_state(engine);

    let listener = tokio::net::TcpListener::bind(bind).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn api_status(State(engine): State<Arc<MonitorEngine>>) -> Json<serde_json::Value> {
    let stats = engine.stats();
    Json(json!({
        "running": engine.is_running(),
        "started_at_ms": engine.started_at_ms(),
        "global_reality_score": stats.global_reality_score,
        "risk_level": RiskLevel::from_reality_score(stats.global_reality_score as u8),
        "verdict": score_verdict(stats.global_reality_score as u8),
        "active_threats": stats.active_threats,
        "processed_total": stats.processed_total,
        "stream_status": engine.stream_status(),
        "emergency_mode": engine.emergency().emergency_mode(),
        "lockdown_active": engine.emergency().lockdown_active(),
        "counter_active": engine.emergency().counter_active(),
    }))
}

async fn api_threats(State(engine): State<Arc<MonitorEngine>>) -> Json<serde_json::Value> {
    let threats = engine.threats();
    Json(json!({ "total": threats.len(), "threats": threats }))
}

async fn api_posts(State(engine): State<Arc<MonitorEngine>>) -> Json<serde_json::Value> {
    let posts = engine.posts();
    Json(json!({
        "total": posts.len(),
        "stream_status": engine.stream_status(),
        "posts": posts,
    }))
}

async fn api_map(State(engine): State<Arc<MonitorEngine>>) -> Json<serde_json::Value> {
    let points = engine.map_points();
    let total: u64 = points.iter().map(|p| p.count).sum();
    Json(json!({ "total_incidents": total, "points": points }))
}

async fn api_analyses(State(engine): State<Arc<MonitorEngine>>) -> Json<serde_json::Value> {
    let records = engine.analyses();
    // Flatten each record and attach its verdict band once a score exists.
    let analyses: Vec<serde_json::Value> = records
        .iter()
        .map(|r| {
            json!({
                "id": r.id,
                "file_name": r.file_name,
                "media_kind": r.media_kind,
                "status": r.status,
                "reality_score": r.reality_score,
                "confidence": r.confidence,
                "detections": r.detections,
                "created_at": r.created_at,
                "verdict": r.reality_score.map(score_verdict),
            })
        })
        .collect();
    Json(json!({
        "capacity": engine.queue().capacity(),
        "total": analyses.len(),
        "analyses": analyses,
    }))
}

async fn api_events(State(engine): State<Arc<MonitorEngine>>) -> Json<serde_json::Value> {
    let events = engine.bus().recent_events(100, None);
    Json(json!({
        "total_published": engine.bus().total_published(),
        "events": events,
    }))
}

async fn api_health(State(engine): State<Arc<MonitorEngine>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": if engine.is_running() { "ok" } else { "stopped" },
        "version": verity_core::VERSION,
        "subscribers": engine.bus().subscriber_count(),
    }))
}

#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    name: String,
    size_bytes: u64,
    /// MIME type; the media kind falls back to the filename extension.
    mime: Option<String>,
}

async fn api_analyze(
    State(engine): State<Arc<MonitorEngine>>,
    Json(req): Json<AnalyzeRequest>,
) -> Json<serde_json::Value> {
    let media_kind = match req.mime.as_deref() {
        Some(mime) => MediaKind::from_mime(mime),
        None => {
            let ext = req.name.rsplit('.').next().unwrap_or("");
            MediaKind::from_extension(ext)
        }
    };
    let file = FileDescriptor {
        name: req.name,
        size_bytes: req.size_bytes,
        media_kind,
    };
    match engine.submit(file) {
        Ok(id) => Json(json!({ "accepted": true, "id": id })),
        Err(e) => Json(json!({ "accepted": false, "error": e.to_string() })),
    }
}

#[derive(Debug, Deserialize)]
struct EmergencyRequest {
    /// One of "emergency", "lockdown", "counter".
    control: String,
}

async fn api_emergency(
    State(engine): State<Arc<MonitorEngine>>,
    Json(req): Json<EmergencyRequest>,
) -> Json<serde_json::Value> {
    let controls = engine.emergency();
    let bus = engine.bus();
    let applied = match req.control.as_str() {
        "emergency" => {
            controls.toggle_emergency(bus);
            true
        }
        "lockdown" => controls.toggle_lockdown(bus),
        "counter" => controls.toggle_counter(bus),
        _ => false,
    };
    Json(json!({
        "applied": applied,
        "emergency_mode": controls.emergency_mode(),
        "lockdown_active": controls.lockdown_active(),
        "counter_active": controls.counter_active(),
    }))
}
