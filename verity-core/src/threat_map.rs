//! # Threat map — world map incident points
//!
//! A fixed set of geographic hot spots whose incident counts drift upward
//! on a timer. Coordinates are normalized to a 0–100 grid so the renderer
//! can place markers on any projection. Counts grow monotonically except
//! for explicit resets; severities are occasionally resampled.

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

/// A hot spot on the map. `count` is mutated in place by periodic ticks.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ThreatMapPoint {
    pub id: u64,
    pub country: String,
    /// Normalized map coordinate, 0–100.
    pub x: f32,
    pub y: f32,
    pub severity: Severity,
    pub category: ThreatCategory,
    /// Running incident count, monotonic between resets.
    pub count: u64,
}

fn seed_points() -> Vec<ThreatMapPoint> {
    let spots: [(&str, f32, f32, Severity, ThreatCategory, u64); 7] = [
        ("United States", 25.0, 35.0, Severity::High, ThreatCategory::Deepfake, 23),
        ("China", 75.0, 40.0, Severity::Critical, ThreatCategory::Coordinated, 45),
        ("Russia", 65.0, 25.0, Severity::Critical, ThreatCategory::Synthetic, 67),
        ("Brazil", 35.0, 70.0, Severity::Medium, ThreatCategory::Manipulation, 12),
        ("India", 72.0, 45.0, Severity::High, ThreatCategory::Deepfake, 34),
        ("Germany", 52.0, 30.0, Severity::Medium, ThreatCategory::Synthetic, 8),
        ("Australia", 82.0, 75.0, Severity::Low, ThreatCategory::Manipulation, 5),
    ];
    spots
        .iter()
        .enumerate()
        .map(|(i, (country, x, y, severity, category, count))| ThreatMapPoint {
            id: i as u64 + 1,
            country: country.to_string(),
            x: *x,
            y: *y,
            severity: *severity,
            category: *category,
            count: *count,
        })
        .collect()
}

pub struct ThreatMap {
    points: RwLock<Vec<ThreatMapPoint>>,
    severity_resample_probability: f64,
    ticks: AtomicU64,
    running: Arc<AtomicBool>,
}

impl ThreatMap {
    pub fn new(severity_resample_probability: f64) -> Self {
        Self {
            points: RwLock::new(seed_points()),
            severity_resample_probability: severity_resample_probability.clamp(0.0, 1.0),
            ticks: AtomicU64::new(0),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// One refresh cycle: every point's count grows by a small random
    /// increment and its severity may be resampled.
    pub fn tick(&self, rng: &mut StdRng) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
        let mut points = self.points.write();
        for point in points.iter_mut() {
            point.count += rng.gen_range(0..3);
            if rng.gen_bool(self.severity_resample_probability) {
                point.severity =
                    Severity::THREAT_LEVELS[rng.gen_range(0..Severity::THREAT_LEVELS.len())];
            }
        }
    }

    /// Restore the seeded hot spots. The only path that lowers counts.
    pub fn reset(&self) {
        *self.points.write() = seed_points();
    }

    pub fn start_periodic(self: &Arc<Self>, interval: Duration, mut rng: StdRng, bus: Arc<EventBus>) {
        self.running.store(true, Ordering::Relaxed);
        let map = self.clone();
        let running = self.running.clone();

        info!(interval_ms = interval.as_millis() as u64, "Threat map updater started");

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            while running.load(Ordering::Relaxed) {
                ticker.tick().await;
                if !running.load(Ordering::Relaxed) {
                    break;
                }
                map.tick(&mut rng);
                let mut details = HashMap::new();
                details.insert("total_incidents".into(), map.total_incidents().to_string());
                bus.emit(
                    "threat_map",
                    EventCategory::MapUpdate,
                    Severity::Info,
                    "Map points refreshed",
                    details,
                    vec!["map".into()],
                );
            }
            info!("Threat map updater stopped");
        });
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    pub fn points(&self) -> Vec<ThreatMapPoint> {
        self.points.read().clone()
    }

    pub fn total_incidents(&self) -> u64 {
        self.points.read().iter().map(|p| p.count).sum()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn seeded_with_seven_hot_spots() {
        let map = ThreatMap::new(0.1);
        let points = map.points();
        assert_eq!(points.len(), 7);
        assert!(points.iter().any(|p| p.country == "United States"));
        for p in &points {
            assert!((0.0..=100.0).contains(&p.x));
            assert!((0.0..=100.0).contains(&p.y));
        }
    }

    #[test]
    fn counts_are_monotonic_across_ticks() {
        let map = ThreatMap::new(0.1);
        let mut rng = StdRng::seed_from_u64(6);
        let before: Vec<u64> = map.points().iter().map(|p| p.count).collect();
        for _ in 0..50 {
            map.tick(&mut rng);
        }
        let after: Vec<u64> = map.points().iter().map(|p| p.count).collect();
        for (b, a) in before.iter().zip(after.iter()) {
            assert!(a >= b);
        }
        assert_eq!(map.ticks(), 50);
    }

    #[test]
    fn reset_restores_seeded_counts() {
        let map = ThreatMap::new(0.0);
        let mut rng = StdRng::seed_from_u64(12);
        let seeded_total = map.total_incidents();
        for _ in 0..100 {
            map.tick(&mut rng);
        }
        map.reset();
        assert_eq!(map.total_incidents(), seeded_total);
    }

    #[test]
    fn zero_resample_probability_keeps_severities() {
        let map = ThreatMap::new(0.0);
        let mut rng = StdRng::seed_from_u64(15);
        let before: Vec<Severity> = map.points().iter().map(|p| p.severity).collect();
        for _ in 0..50 {
            map.tick(&mut rng);
        }
        let after: Vec<Severity> = map.points().iter().map(|p| p.severity).collect();
        assert_eq!(before, after);
    }
}
