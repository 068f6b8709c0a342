//! Event triggers for motivational messages.
//!
//! Each rule looks at the current snapshot (and the optional signal that
//! caused the request) independently. Several events can fire at once; they
//! are returned in evaluation order.

use super::streak::compute_streak;
use crate::types::{EventKind, ExternalEvent, UserSnapshot};
use chrono::NaiveDate;

/// Streak length that earns `7_days_streak`.
pub const WEEK_STREAK: u32 = 7;

/// Goal count step that earns `milestone_reached`.
pub const MILESTONE_STEP: usize = 5;

/// Detect events for `snapshot` as of `today`.
///
/// `weekly_review_days` is the gap since the last recorded action that
/// triggers `weekly_review`.
pub fn detect_triggers(
    snapshot: &UserSnapshot,
    external: Option<ExternalEvent>,
    today: NaiveDate,
    weekly_review_days: i64,
) -> Vec<EventKind> {
    let mut events = Vec::new();
    let dates = snapshot.action_dates();

    if compute_streak(&dates, today) == WEEK_STREAK {
        events.push(EventKind::SevenDayStreak);
    }

    let goal_count = snapshot.goals.len();
    if external == Some(ExternalEvent::GoalCreated) && goal_count == 1 {
        events.push(EventKind::FirstGoal);
    }

    if goal_count > 0 && goal_count % MILESTONE_STEP == 0 {
        events.push(EventKind::MilestoneReached);
    }

    if external == Some(ExternalEvent::GoalCompleted) {
        events.push(EventKind::GoalCompleted);
    }

    let last_action = dates.iter().copied().filter(|d| *d <= today).max();
    if let Some(last) = last_action {
        if (today - last).num_days() >= weekly_review_days {
            events.push(EventKind::WeeklyReview);
        }
    }

    if !events.is_empty() {
        tracing::debug!(
            user_id = %snapshot.user.id,
            external = ?external,
            events = ?events.iter().map(|e| e.as_str()).collect::<Vec<_>>(),
            "Triggers fired"
        );
    }

    events
}
