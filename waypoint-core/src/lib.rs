//! # waypoint-core
//!
//! Core library for waypoint - a goal companion that measures progress and
//! keeps users moving.
//!
//! This library provides:
//! - Domain types for goals, daily actions, cards and events
//! - Streak and progress analytics with rule-based recommendations
//! - A text-generation fallback engine over several providers
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Architecture
//!
//! Two independent subsystems meet in [`advisor::Advisor`]:
//! - **Analytics:** pure functions of a [`UserSnapshot`] and a calendar date
//! - **Companion:** ordered provider attempts with static fallback content
//!
//! Persistence stays outside: snapshots come from a [`SnapshotSource`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use waypoint_core::{Config, CompanionEngine, EventKind};
//!
//! // Load configuration
//! let config = Config::load().expect("failed to load config");
//!
//! // Build the engine and ask for a message
//! let engine = CompanionEngine::from_config(&config).expect("failed to build engine");
//! println!("{}", engine.resolve_motivation(&EventKind::FirstGoal));
//! ```

// Re-export commonly used items at the crate root
pub use advisor::Advisor;
pub use analytics::AnalyticsEngine;
pub use clock::{Clock, FixedClock, SystemClock};
pub use companion::CompanionEngine;
pub use config::Config;
pub use error::{Error, Result};
pub use snapshot::{JsonFileSnapshotSource, SnapshotSource};
pub use types::*;

// Public modules
pub mod advisor;
pub mod analytics;
pub mod clock;
pub mod companion;
pub mod config;
pub mod error;
pub mod logging;
pub mod snapshot;
pub mod types;
