//! # Emergency response controls
//!
//! Models the emergency-mode state the dashboard exposes: a master
//! toggle plus content-lockdown and counter-narrative switches that are
//! only operable while emergency mode is active. Toggles emit Health
//! events so operators see every transition.

use crate::bus::{EventBus, EventCategory};
use crate::types::Severity;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::warn;

#[derive(Default)]
pub struct EmergencyControls {
    emergency_mode: AtomicBool,
    lockdown_active: AtomicBool,
    counter_active: AtomicBool,
    activations: AtomicU64,
}

impl EmergencyControls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip emergency mode. Leaving emergency mode releases both
    /// sub-controls. Returns the new state.
    pub fn toggle_emergency(&self, bus: &EventBus) -> bool {
        let now_active = !self.emergency_mode.load(Ordering::Relaxed);
        self.emergency_mode.store(now_active, Ordering::Relaxed);

        if now_active {
            self.activations.fetch_add(1, Ordering::Relaxed);
            warn!("Emergency mode activated");
        } else {
            self.lockdown_active.store(false, Ordering::Relaxed);
            self.counter_active.store(false, Ordering::Relaxed);
        }

        let mut details = HashMap::new();
        details.insert("active".into(), now_active.to_string());
        bus.emit(
            "emergency_controls",
            EventCategory::Health,
            if now_active { Severity::High } else { Severity::Info },
            if now_active { "Emergency mode activated" } else { "Emergency mode deactivated" },
            details,
            vec!["emergency".into()],
        );
        now_active
    }

    /// Toggle content lockdown. Refused outside emergency mode.
    pub fn toggle_lockdown(&self, bus: &EventBus) -> bool {
        if !self.emergency_mode.load(Ordering::Relaxed) {
            return false;
        }
        let active = !self.lockdown_active.load(Ordering::Relaxed);
        self.lockdown_active.store(active, Ordering::Relaxed);
        bus.emit(
            "emergency_controls",
            EventCategory::Health,
            Severity::Medium,
            if active { "Content lockdown engaged" } else { "Content lockdown released" },
            HashMap::new(),
            vec!["emergency".into()],
        );
        true
    }

    /// Toggle counter-narrative deployment. Refused outside emergency mode.
    pub fn toggle_counter(&self, bus: &EventBus) -> bool {
        if !self.emergency_mode.load(Ordering::Relaxed) {
            return false;
        }
        let active = !self.counter_active.load(Ordering::Relaxed);
        self.counter_active.store(active, Ordering::Relaxed);
        bus.emit(
            "emergency_controls",
            EventCategory::Health,
            Severity::Medium,
            if active { "Counter-narrative deployed" } else { "Counter-narrative withdrawn" },
            HashMap::new(),
            vec!["emergency".into()],
        );
        true
    }

    pub fn emergency_mode(&self) -> bool {
        self.emergency_mode.load(Ordering::Relaxed)
    }
    pub fn lockdown_active(&self) -> bool {
        self.lockdown_active.load(Ordering::Relaxed)
    }
    pub fn counter_active(&self) -> bool {
        self.counter_active.load(Ordering::Relaxed)
    }
    pub fn activations(&self) -> u64 {
        self.activations.load(Ordering::Relaxed)
    }
}
