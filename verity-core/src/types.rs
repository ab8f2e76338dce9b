//! # Shared domain types
//!
//! Severity/category/risk enums used across the generators, the analysis
//! queue, and the event bus, plus score helpers. All public types are
//! serde-serializable so the observation API can expose them directly.

use serde::{Deserialize, Serialize};

/// Alert severity. Totally ordered so subscribers can filter on a floor.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// The four levels a synthesized threat can carry (Info is reserved
    /// for housekeeping events).
    pub const THREAT_LEVELS: [Severity; 4] = [
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];
}

/// What kind of disinformation a threat alert describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreatCategory {
    Deepfake,
    Synthetic,
    Coordinated,
    Manipulation,
}

impl ThreatCategory {
    pub const ALL: [ThreatCategory; 4] = [
        ThreatCategory::Deepfake,
        ThreatCategory::Synthetic,
        ThreatCategory::Coordinated,
        ThreatCategory::Manipulation,
    ];
}

/// Media classification for submitted files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Audio,
    Image,
}

impl MediaKind {
    /// Classify from a MIME-like type string. Anything unrecognized is
    /// treated as an image.
    pub fn from_mime(mime: &str) -> Self {
        if mime.starts_with("video/") {
            MediaKind::Video
        } else if mime.starts_with("audio/") {
            MediaKind::Audio
        } else {
            MediaKind::Image
        }
    }

    /// Classify from a file extension (used by the CLI submission path).
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "mp4" | "mov" | "avi" | "mkv" | "webm" => MediaKind::Video,
            "mp3" | "wav" | "ogg" | "flac" | "m4a" => MediaKind::Audio,
            _ => MediaKind::Image,
        }
    }
}

/// Risk level of a social post, derived from its reality score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Fixed thresholds: <40 critical, <60 high, <75 medium, else low.
    pub fn from_reality_score(score: u8) -> Self {
        if score < 40 {
            RiskLevel::Critical
        } else if score < 60 {
            RiskLevel::High
        } else if score < 75 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

/// A submitted file: only metadata, never content (no real inspection
/// happens anywhere in this system).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub name: String,
    pub size_bytes: u64,
    pub media_kind: MediaKind,
}

/// Clamp a working score into [0,100] and floor to an integer.
pub fn clamp_score(raw: f64) -> u8 {
    raw.clamp(0.0, 100.0).floor() as u8
}

/// Human-readable verdict band for a reality score.
pub fn score_verdict(score: u8) -> &'static str {
    if score >= 80 {
        "Authentic"
    } else if score >= 60 {
        "Likely Real"
    } else if score >= 40 {
        "Suspicious"
    } else {
        "Likely Fake"
    }
}
