//! Core domain types for waypoint
//!
//! These types mirror the records the goal-tracking backend stores. The core
//! only ever reads them: a [`UserSnapshot`] is handed in by the caller and
//! everything derived from it is computed fresh.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Goal** | A stated objective with a category label and a completion flag |
//! | **DailyAction** | A mark that the user did their tracked activity on a calendar day |
//! | **Card** | A generic task/habit/note unit with status and priority |
//! | **Streak** | Consecutive days with a DailyAction, counted back from today |
//! | **Event** | A symbolic name (`7_days_streak`, `first_goal`, ...) that selects a motivation |

use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================
// User
// ============================================

/// Account the snapshot belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    /// Unique identifier
    pub id: String,
    /// Chat identifier of the bot front door (optional)
    #[serde(default)]
    pub telegram_id: Option<i64>,
    /// Display handle (optional)
    #[serde(default)]
    pub username: Option<String>,
    /// Registration timestamp
    pub created_at: DateTime<Utc>,
}

// ============================================
// Goal
// ============================================

/// A user's stated objective.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub user_id: String,
    /// Category label (free-form, e.g. "health", "career")
    pub goal_type: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Goal {
    /// Best human-readable label: description, then title, then category.
    pub fn label(&self) -> &str {
        self.description
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or(self.title.as_deref().filter(|s| !s.trim().is_empty()))
            .unwrap_or(&self.goal_type)
    }
}

// ============================================
// Daily actions
// ============================================

/// Record that a user performed their tracked activity on a given day.
///
/// `action_date` is kept as the raw stored string. Upstream rows have been
/// seen both as `YYYY-MM-DD` and as full ISO timestamps, and a malformed
/// value must only drop that one record, not the whole computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyAction {
    pub id: String,
    pub user_id: String,
    pub action_date: String,
    pub created_at: DateTime<Utc>,
}

impl DailyAction {
    /// Parse `action_date` into a calendar date.
    pub fn date(&self) -> Result<NaiveDate> {
        parse_calendar_date(&self.action_date)
    }
}

/// Parse a calendar date from `YYYY-MM-DD`, an RFC 3339 timestamp, or a
/// naive ISO datetime. Time-of-day is discarded.
pub fn parse_calendar_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(ts) = chrono::NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(ts.date());
        }
    }
    Err(Error::InvalidDate(raw.to_string()))
}

// ============================================
// Cards
// ============================================

/// Kind of card. The set is open; unknown tags map to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardType {
    Goal,
    Habit,
    Task,
    Note,
    Milestone,
    #[serde(other)]
    Other,
}

impl CardType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardType::Goal => "goal",
            CardType::Habit => "habit",
            CardType::Task => "task",
            CardType::Note => "note",
            CardType::Milestone => "milestone",
            CardType::Other => "other",
        }
    }
}

/// Lifecycle status of a card. `Deleted` is a soft-delete marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardStatus {
    #[default]
    Active,
    Completed,
    Archived,
    Deleted,
}

impl CardStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardStatus::Active => "active",
            CardStatus::Completed => "completed",
            CardStatus::Archived => "archived",
            CardStatus::Deleted => "deleted",
        }
    }
}

impl std::str::FromStr for CardStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "active" => Ok(CardStatus::Active),
            "completed" => Ok(CardStatus::Completed),
            "archived" => Ok(CardStatus::Archived),
            "deleted" => Ok(CardStatus::Deleted),
            _ => Err(format!("unknown card status: {}", s)),
        }
    }
}

fn default_priority() -> u8 {
    1
}

/// A generic task/habit/note unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub card_type: CardType,
    #[serde(default)]
    pub status: CardStatus,
    /// Priority 1 (lowest) to 5 (highest)
    #[serde(default = "default_priority")]
    pub priority: u8,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Card {
    pub fn is_active(&self) -> bool {
        self.status == CardStatus::Active
    }
}

// ============================================
// Snapshot
// ============================================

/// Everything the core knows about one user, materialized in memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSnapshot {
    pub user: UserProfile,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub daily_actions: Vec<DailyAction>,
    #[serde(default)]
    pub cards: Vec<Card>,
}

impl UserSnapshot {
    /// Goals that are not yet completed.
    pub fn active_goals(&self) -> impl Iterator<Item = &Goal> {
        self.goals.iter().filter(|g| !g.is_completed)
    }

    /// Goals marked completed.
    pub fn completed_goals(&self) -> impl Iterator<Item = &Goal> {
        self.goals.iter().filter(|g| g.is_completed)
    }

    /// Cards with status `active`.
    pub fn active_cards(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter().filter(|c| c.is_active())
    }

    /// Calendar dates of all parseable daily actions.
    ///
    /// Malformed dates are logged and skipped. Duplicates are kept; callers
    /// that need a set collapse them.
    pub fn action_dates(&self) -> Vec<NaiveDate> {
        self.daily_actions
            .iter()
            .filter_map(|action| match action.date() {
                Ok(date) => Some(date),
                Err(e) => {
                    tracing::warn!(
                        action_id = %action.id,
                        user_id = %action.user_id,
                        error = %e,
                        "Skipping daily action with unparseable date"
                    );
                    None
                }
            })
            .collect()
    }
}

// ============================================
// Events
// ============================================

/// Symbolic event that selects a motivational message.
///
/// Unrecognized names are kept as `Custom` so they still get the generic
/// prompt and the generic fallback catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventKind {
    /// Exactly seven consecutive days ending today
    SevenDayStreak,
    /// The user just created their first goal
    FirstGoal,
    /// Goal count reached a positive multiple of five
    MilestoneReached,
    /// A goal was just completed
    GoalCompleted,
    /// The user asked for encouragement
    MotivationNeeded,
    /// A week or more has passed since the last recorded action
    WeeklyReview,
    /// Any other event name
    Custom(String),
}

impl EventKind {
    /// All named events, in catalog order.
    pub const KNOWN: [EventKind; 6] = [
        EventKind::SevenDayStreak,
        EventKind::FirstGoal,
        EventKind::MilestoneReached,
        EventKind::GoalCompleted,
        EventKind::MotivationNeeded,
        EventKind::WeeklyReview,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            EventKind::SevenDayStreak => "7_days_streak",
            EventKind::FirstGoal => "first_goal",
            EventKind::MilestoneReached => "milestone_reached",
            EventKind::GoalCompleted => "goal_completed",
            EventKind::MotivationNeeded => "motivation_needed",
            EventKind::WeeklyReview => "weekly_review",
            EventKind::Custom(name) => name,
        }
    }
}

impl From<&str> for EventKind {
    fn from(s: &str) -> Self {
        match s {
            "7_days_streak" => EventKind::SevenDayStreak,
            "first_goal" => EventKind::FirstGoal,
            "milestone_reached" => EventKind::MilestoneReached,
            "goal_completed" => EventKind::GoalCompleted,
            "motivation_needed" => EventKind::MotivationNeeded,
            "weekly_review" => EventKind::WeeklyReview,
            other => EventKind::Custom(other.to_string()),
        }
    }
}

impl From<String> for EventKind {
    fn from(s: String) -> Self {
        EventKind::from(s.as_str())
    }
}

impl From<EventKind> for String {
    fn from(kind: EventKind) -> Self {
        kind.as_str().to_string()
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signal supplied by the request handler alongside a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExternalEvent {
    ActionCompleted,
    GoalCreated,
    GoalCompleted,
}

impl ExternalEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExternalEvent::ActionCompleted => "action_completed",
            ExternalEvent::GoalCreated => "goal_created",
            ExternalEvent::GoalCompleted => "goal_completed",
        }
    }
}

impl std::str::FromStr for ExternalEvent {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "action_completed" => Ok(ExternalEvent::ActionCompleted),
            "goal_created" => Ok(ExternalEvent::GoalCreated),
            "goal_completed" => Ok(ExternalEvent::GoalCompleted),
            _ => Err(format!("unknown external event: {}", s)),
        }
    }
}
