//! Progress metrics derived from a user snapshot.

use super::recommendations::{recommend, Recommendation, RecommendationInputs};
use super::streak::StreakStats;
use crate::config::AnalyticsConfig;
use crate::types::UserSnapshot;
use chrono::NaiveDate;
use serde::Serialize;

/// Metrics computed fresh on every request. Never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressMetrics {
    /// Consecutive days with an action, ending today
    pub streak: u32,
    /// Whole days since registration (0 on the registration day)
    pub days_since_start: i64,
    /// Number of daily action records
    pub total_actions: usize,
    /// Average actions per 7-day period since registration
    pub avg_actions_per_week: f64,
    /// Completed goals as a percentage of all goals (0-100)
    pub goal_completion_rate: f64,
    /// Bounded composite score (0-100)
    pub composite_score: u8,
}

/// Completed goals as a percentage; 0 when there are no goals at all.
pub fn completion_rate(completed: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        completed as f64 / total as f64 * 100.0
    }
}

/// Average actions per 7-day period. The divisor never drops below one
/// week, so a same-day registration reports the raw action count.
pub fn activity_velocity(total_actions: usize, days_since_start: i64) -> f64 {
    let weeks = days_since_start.max(0) as f64 / 7.0;
    total_actions as f64 / weeks.max(1.0)
}

/// Weighted score capped at 100.
///
/// Completed goals weigh 15 each, streak days 3 each, raw activity is worth
/// up to 30 (one point per two actions) and the completion rate up to 20.
/// Monotonic in every input and 0 for a brand-new user.
pub fn composite_score(
    completed_goals: usize,
    streak: u32,
    total_actions: usize,
    goal_completion_rate: f64,
) -> u8 {
    let goals = 15.0 * completed_goals as f64;
    let streak = 3.0 * streak as f64;
    let activity = ((total_actions / 2) as f64).min(30.0);
    let ratio = (goal_completion_rate.max(0.0) / 5.0).min(20.0);
    (goals + streak + activity + ratio).min(100.0) as u8
}

/// Round to one decimal place for reporting.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Compute [`ProgressMetrics`] from a snapshot.
pub fn compute_progress(snapshot: &UserSnapshot, today: NaiveDate) -> ProgressMetrics {
    let dates = snapshot.action_dates();
    let streak = super::streak::compute_streak(&dates, today);
    metrics_for(snapshot, streak, today)
}

fn metrics_for(snapshot: &UserSnapshot, streak: u32, today: NaiveDate) -> ProgressMetrics {
    let completed = snapshot.completed_goals().count();
    let total_goals = snapshot.goals.len();
    let total_actions = snapshot.daily_actions.len();
    let days_since_start = (today - snapshot.user.created_at.date_naive())
        .num_days()
        .max(0);
    let rate = completion_rate(completed, total_goals);

    ProgressMetrics {
        streak,
        days_since_start,
        total_actions,
        avg_actions_per_week: activity_velocity(total_actions, days_since_start),
        goal_completion_rate: rate,
        composite_score: composite_score(completed, streak, total_actions, rate),
    }
}

/// Full analytics report: metrics plus the counts and narratives that
/// feed the progress analysis.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressReport {
    pub metrics: ProgressMetrics,
    pub streaks: StreakStats,
    pub total_goals: usize,
    pub active_goals: usize,
    pub completed_goals: usize,
    pub total_cards: usize,
    pub active_cards: usize,
    pub completed_cards: usize,
    pub high_priority_active_cards: usize,
    pub recommendations: Vec<Recommendation>,
    /// Fallback narrative of what is going well
    pub strength: String,
    /// Fallback narrative of what to improve
    pub weaknesses: String,
}

impl ProgressReport {
    /// Build the report for `snapshot` as of `today`.
    pub fn build(snapshot: &UserSnapshot, today: NaiveDate, config: &AnalyticsConfig) -> Self {
        let dates = snapshot.action_dates();
        let streaks = StreakStats::from_dates(&dates, today);
        let metrics = metrics_for(snapshot, streaks.current_streak_days, today);

        let active_goals = snapshot.active_goals().count();
        let completed_goals = snapshot.completed_goals().count();
        let active_cards = snapshot.active_cards().count();
        let completed_cards = snapshot
            .cards
            .iter()
            .filter(|c| c.status == crate::types::CardStatus::Completed)
            .count();
        let high_priority_active_cards = snapshot
            .active_cards()
            .filter(|c| c.priority >= config.high_priority_threshold)
            .count();

        let recommendations = recommend(
            &RecommendationInputs {
                total_goals: snapshot.goals.len(),
                active_goals,
                streak: metrics.streak,
                goal_completion_rate: metrics.goal_completion_rate,
                high_priority_active_cards,
            },
            config.high_priority_limit,
            config.max_recommendations,
        );

        let strength = if metrics.streak > 0 && metrics.total_actions > 0 {
            format!(
                "You have {} completed goals, a {}-day streak and {} completed actions",
                completed_goals, metrics.streak, metrics.total_actions
            )
        } else {
            format!(
                "You have {} completed goals and {} completed actions",
                completed_goals, metrics.total_actions
            )
        };
        let weaknesses = if metrics.streak < 7 {
            "Keep doing your daily actions to hold the streak".to_string()
        } else {
            "Excellent work! Keep it up".to_string()
        };

        tracing::debug!(
            user_id = %snapshot.user.id,
            streak = metrics.streak,
            score = metrics.composite_score,
            recommendations = recommendations.len(),
            "Built progress report"
        );

        Self {
            metrics,
            streaks,
            total_goals: snapshot.goals.len(),
            active_goals,
            completed_goals,
            total_cards: snapshot.cards.len(),
            active_cards,
            completed_cards,
            high_priority_active_cards,
            recommendations,
            strength,
            weaknesses,
        }
    }

    /// Recommendation texts, in the order the rules fired.
    pub fn recommendation_messages(&self) -> Vec<String> {
        self.recommendations.iter().map(|r| r.message()).collect()
    }

    /// Multi-line statistics block used as provider context.
    pub fn summary(&self) -> String {
        let m = &self.metrics;
        format!(
            "User statistics:\n\
             - Days since registration: {}\n\
             - Goals: {} (completed: {}, active: {})\n\
             - Goal completion rate: {:.1}%\n\
             - Daily actions: {}\n\
             - Streak: {} days\n\
             - Average activity: {:.1} actions/week\n\
             - Cards: {} (active: {}, completed: {})\n\
             - High-priority active cards: {}\n",
            m.days_since_start,
            self.total_goals,
            self.completed_goals,
            self.active_goals,
            m.goal_completion_rate,
            m.total_actions,
            m.streak,
            m.avg_actions_per_week,
            self.total_cards,
            self.active_cards,
            self.completed_cards,
            self.high_priority_active_cards,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_rate_handles_zero_goals() {
        assert_eq!(completion_rate(0, 0), 0.0);
        assert_eq!(completion_rate(2, 4), 50.0);
        assert_eq!(completion_rate(3, 3), 100.0);
    }

    #[test]
    fn velocity_floors_divisor_at_one_week() {
        assert_eq!(activity_velocity(0, 0), 0.0);
        assert_eq!(activity_velocity(5, 0), 5.0);
        assert_eq!(activity_velocity(5, 3), 5.0);
        assert_eq!(activity_velocity(10, 14), 5.0);
        assert_eq!(activity_velocity(4, -2), 4.0);
    }

    #[test]
    fn score_is_zero_for_new_user() {
        assert_eq!(composite_score(0, 0, 0, 0.0), 0);
    }

    #[test]
    fn score_weights_match_formula() {
        // 15*1 + 3*2 + min(30, 9/2=4) + min(20, 50/5=10) = 35
        assert_eq!(composite_score(1, 2, 9, 50.0), 35);
        // activity and ratio saturate
        assert_eq!(composite_score(0, 0, 500, 100.0), 50);
    }

    #[test]
    fn score_is_bounded_and_monotonic() {
        let base = (1usize, 2u32, 10usize, 40.0f64);
        let s0 = composite_score(base.0, base.1, base.2, base.3);
        for step in 0..50 {
            let goals = composite_score(base.0 + step, base.1, base.2, base.3);
            let streak = composite_score(base.0, base.1 + step as u32, base.2, base.3);
            let actions = composite_score(base.0, base.1, base.2 + step, base.3);
            let rate = composite_score(base.0, base.1, base.2, base.3 + step as f64);
            for s in [goals, streak, actions, rate] {
                assert!(s >= s0);
                assert!(s <= 100);
            }
        }
        assert_eq!(composite_score(100, 100, 1000, 100.0), 100);
    }

    #[test]
    fn round1_rounds_half_up() {
        assert_eq!(round1(33.333), 33.3);
        assert_eq!(round1(66.666), 66.7);
    }
}
