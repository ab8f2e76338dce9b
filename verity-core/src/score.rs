//! # Score heuristic — the mock "deepfake detection" model
//!
//! Produces a reality score, confidence, and detection labels from file
//! metadata alone. Deterministic penalties (size, filename indicators)
//! stack with media-kind-dependent random penalties and a final jitter.
//! Pure given its random source; any input is accepted.

use crate::types::{clamp_score, FileDescriptor, MediaKind};
use rand::Rng;

/// Every evaluation starts from this score and only gets worse.
const BASELINE_SCORE: f64 = 85.0;
/// Files above this size draw a flat penalty.
const LARGE_FILE_BYTES: u64 = 50 * 1024 * 1024;

/// Filename fragments that mark a submission as suspicious outright.
const SUSPICIOUS_NAME_FRAGMENTS: &[&str] = &["generated", "fake", "ai"];

// Detection label vocabulary, matching the product copy verbatim.
pub const LABEL_LARGE_FILE: &str = "Unusually large file size for content type";
pub const LABEL_SUSPICIOUS_NAME: &str = "Suspicious filename indicators";
pub const LABEL_FRAME_INCONSISTENCY: &str = "Potential frame inconsistencies";
pub const LABEL_COMPRESSION: &str = "Suspicious compression patterns";
pub const LABEL_VOICE_SYNTHESIS: &str = "Voice synthesis indicators";
pub const LABEL_MANIPULATION_ARTIFACTS: &str = "Digital manipulation artifacts";
pub const LABEL_HIGH_AI_PROBABILITY: &str = "High probability of AI generation";
pub const LABEL_MULTIPLE_INDICATORS: &str = "Multiple manipulation indicators";
pub const LABEL_MODERATE_RISK: &str = "Moderate manipulation risk";
pub const LABEL_MINOR_CONCERNS: &str = "Minor quality concerns";
pub const LABEL_NO_ISSUES: &str = "No significant issues detected";

/// Result of evaluating one file.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AnalysisVerdict {
    /// 0–100; higher means more likely authentic.
    pub reality_score: u8,
    /// 0–100; tracks the score with a random uplift.
    pub confidence: u8,
    /// Non-empty: at minimum the no-issues label.
    pub detections: Vec<String>,
}

/// Evaluate a file's metadata. The caller supplies the random source so
/// results are reproducible under a fixed seed.
pub fn evaluate(file: &FileDescriptor, rng: &mut impl Rng) -> AnalysisVerdict {
    let mut score = BASELINE_SCORE;
    let mut detections: Vec<String> = Vec::new();

    // Deterministic penalties first.
    if file.size_bytes > LARGE_FILE_BYTES {
        score -= 10.0;
        detections.push(LABEL_LARGE_FILE.into());
    }
    let lower_name = file.name.to_lowercase();
    if SUSPICIOUS_NAME_FRAGMENTS.iter().any(|f| lower_name.contains(f)) {
        score -= 30.0;
        detections.push(LABEL_SUSPICIOUS_NAME.into());
    }

    // Media-kind penalty plus per-kind detection draws. Video is the most
    // suspicious class and gets two independent draws.
    match file.media_kind {
        MediaKind::Video => {
            score -= rng.gen_range(0.0..20.0);
            if rng.gen_bool(0.3) {
                detections.push(LABEL_FRAME_INCONSISTENCY.into());
            }
            if rng.gen_bool(0.2) {
                detections.push(LABEL_COMPRESSION.into());
            }
        }
        MediaKind::Audio => {
            score -= rng.gen_range(0.0..15.0);
            if rng.gen_bool(0.25) {
                detections.push(LABEL_VOICE_SYNTHESIS.into());
            }
        }
        MediaKind::Image => {
            score -= rng.gen_range(0.0..10.0);
            if rng.gen_bool(0.2) {
                detections.push(LABEL_MANIPULATION_ARTIFACTS.into());
            }
        }
    }

    // Symmetric jitter, then clamp and floor.
    score += rng.gen_range(-10.0..10.0);
    let reality_score = clamp_score(score);

    // Score-band labels.
    if reality_score < 40 {
        detections.push(LABEL_HIGH_AI_PROBABILITY.into());
        detections.push(LABEL_MULTIPLE_INDICATORS.into());
    } else if reality_score < 60 {
        detections.push(LABEL_MODERATE_RISK.into());
    } else if reality_score < 80 {
        detections.push(LABEL_MINOR_CONCERNS.into());
    }

    if detections.is_empty() {
        detections.push(LABEL_NO_ISSUES.into());
    }

    let confidence = (reality_score as f64 * 0.8 + rng.gen_range(0.0..20.0)).floor() as u8;

    AnalysisVerdict {
        reality_score,
        confidence,
        detections,
    }
}
