//! Analytics module for waypoint
//!
//! Deterministic, explainable metrics over a user's activity history:
//! - Consecutive-day streaks
//! - Goal completion rate and activity velocity
//! - A bounded composite score
//! - Rule-based recommendations
//! - Trigger detection for event-driven motivation
//!
//! Everything here is a pure function of the snapshot and "today". Malformed
//! action dates are skipped with a warning rather than failing the request.

pub mod engine;
pub mod progress;
pub mod recommendations;
pub mod streak;
pub mod triggers;

pub use engine::AnalyticsEngine;
pub use progress::{
    activity_velocity, completion_rate, composite_score, compute_progress, ProgressMetrics,
    ProgressReport,
};
pub use recommendations::{recommend, Recommendation, RecommendationInputs};
pub use streak::{compute_streak, StreakStats};
pub use triggers::detect_triggers;
