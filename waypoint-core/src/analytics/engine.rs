//! Analytics engine
//!
//! Thin stateful wrapper over the pure functions in this module. It owns the
//! configured thresholds and the clock, so request handlers only pass a
//! snapshot.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use waypoint_core::analytics::AnalyticsEngine;
//!
//! let engine = AnalyticsEngine::new(config.analytics.clone());
//! let metrics = engine.compute_progress(&snapshot);
//! let events = engine.detect_triggers(&snapshot, Some(ExternalEvent::ActionCompleted));
//! ```

use super::progress::{ProgressMetrics, ProgressReport};
use crate::clock::{Clock, SystemClock};
use crate::config::AnalyticsConfig;
use crate::types::{EventKind, ExternalEvent, UserSnapshot};
use chrono::NaiveDate;
use std::sync::Arc;

/// Engine that computes progress metrics and detects triggers.
pub struct AnalyticsEngine {
    config: AnalyticsConfig,
    clock: Arc<dyn Clock>,
}

impl AnalyticsEngine {
    /// Create an engine reading the wall clock.
    pub fn new(config: AnalyticsConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create an engine with an injected clock.
    pub fn with_clock(config: AnalyticsConfig, clock: Arc<dyn Clock>) -> Self {
        Self { config, clock }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Today according to the engine's clock.
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Core metrics for a snapshot.
    pub fn compute_progress(&self, snapshot: &UserSnapshot) -> ProgressMetrics {
        super::progress::compute_progress(snapshot, self.today())
    }

    /// Metrics plus counts, streak history, recommendations and narratives.
    pub fn report(&self, snapshot: &UserSnapshot) -> ProgressReport {
        ProgressReport::build(snapshot, self.today(), &self.config)
    }

    /// Events that should each produce a motivational message.
    pub fn detect_triggers(
        &self,
        snapshot: &UserSnapshot,
        external: Option<ExternalEvent>,
    ) -> Vec<EventKind> {
        super::triggers::detect_triggers(
            snapshot,
            external,
            self.today(),
            self.config.weekly_review_days,
        )
    }
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self::new(AnalyticsConfig::default())
    }
}
