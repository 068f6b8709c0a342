//! Request-level glue between analytics and the companion.
//!
//! Each operation loads a snapshot, computes what analytics knows about it
//! and hands the companion the context it needs. Only the snapshot source can
//! fail; text generation always degrades to static content.

use crate::analytics::progress::round1;
use crate::analytics::{AnalyticsEngine, ProgressReport};
use crate::companion::{
    AdviceRequest, CompanionEngine, GoalBreakdown, GoalBreakdownRequest, MotivationContext,
    NavigationAdvice, NavigationContext, PersonalAdvice, ProgressAnalysis, ProgressContext,
};
use crate::snapshot::SnapshotSource;
use crate::types::{EventKind, ExternalEvent, Goal, UserSnapshot};
use crate::Result;
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::collections::BTreeSet;

/// Days counted as "recent" for navigation.
const RECENT_WINDOW_DAYS: i64 = 7;

/// Computed report plus the narrative built around it.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressOutcome {
    pub report: ProgressReport,
    pub analysis: ProgressAnalysis,
}

/// One fired event and the message produced for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventMessage {
    pub event: EventKind,
    pub message: String,
}

pub struct Advisor {
    source: Box<dyn SnapshotSource>,
    analytics: AnalyticsEngine,
    companion: CompanionEngine,
}

impl Advisor {
    pub fn new(
        source: Box<dyn SnapshotSource>,
        analytics: AnalyticsEngine,
        companion: CompanionEngine,
    ) -> Self {
        Self {
            source,
            analytics,
            companion,
        }
    }

    pub fn analytics(&self) -> &AnalyticsEngine {
        &self.analytics
    }

    pub fn companion(&self) -> &CompanionEngine {
        &self.companion
    }

    pub fn analyze_progress(&self, user_id: &str) -> Result<ProgressOutcome> {
        let snapshot = self.source.load_snapshot(user_id)?;
        Ok(self.analyze_snapshot(&snapshot))
    }

    pub fn analyze_snapshot(&self, snapshot: &UserSnapshot) -> ProgressOutcome {
        let report = self.analytics.report(snapshot);
        let context = progress_context(snapshot, &report);
        let analysis = self.companion.progress_narrative(&context);
        ProgressOutcome { report, analysis }
    }

    /// Detect triggers and produce one motivational message per event.
    pub fn handle_event(
        &self,
        user_id: &str,
        external: Option<ExternalEvent>,
    ) -> Result<Vec<EventMessage>> {
        let snapshot = self.source.load_snapshot(user_id)?;
        Ok(self.handle_snapshot_event(&snapshot, external))
    }

    pub fn handle_snapshot_event(
        &self,
        snapshot: &UserSnapshot,
        external: Option<ExternalEvent>,
    ) -> Vec<EventMessage> {
        self.analytics
            .detect_triggers(snapshot, external)
            .into_iter()
            .map(|event| {
                let message = self.companion.resolve_motivation(&event);
                EventMessage { event, message }
            })
            .collect()
    }

    /// Motivation seeded by the user's goals rather than by an event.
    pub fn motivate(&self, user_id: &str) -> Result<String> {
        let snapshot = self.source.load_snapshot(user_id)?;
        Ok(self
            .companion
            .resolve_motivation_with_context(&motivation_context(&snapshot)))
    }

    pub fn break_goal_into_steps(&self, request: &GoalBreakdownRequest) -> GoalBreakdown {
        self.companion.goal_breakdown(request)
    }

    pub fn navigate(&self, user_id: &str) -> Result<NavigationAdvice> {
        let snapshot = self.source.load_snapshot(user_id)?;
        Ok(self.navigate_snapshot(&snapshot))
    }

    pub fn navigate_snapshot(&self, snapshot: &UserSnapshot) -> NavigationAdvice {
        let context = navigation_context(snapshot, self.analytics.today());
        self.companion.navigation(&context)
    }

    /// Answer a question, with the user's goals as background when known.
    pub fn advise(&self, question: &str, user_id: Option<&str>) -> Result<PersonalAdvice> {
        let snapshot = user_id
            .map(|id| self.source.load_snapshot(id))
            .transpose()?;
        Ok(self.advise_with(question, snapshot.as_ref()))
    }

    pub fn advise_with(&self, question: &str, snapshot: Option<&UserSnapshot>) -> PersonalAdvice {
        let mut request = AdviceRequest::new(question);
        if let Some(snapshot) = snapshot {
            request.active_goals = active_goal_labels(snapshot);
            request.streak = Some(self.analytics.compute_progress(snapshot).streak);
        }
        self.companion.personal_advice(&request)
    }
}

fn labels<'a>(goals: impl Iterator<Item = &'a Goal>) -> Vec<String> {
    let mut goals: Vec<&Goal> = goals.collect();
    goals.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    goals.into_iter().map(|g| g.label().to_string()).collect()
}

/// Active goal labels, most recent first.
pub fn active_goal_labels(snapshot: &UserSnapshot) -> Vec<String> {
    labels(snapshot.active_goals())
}

/// Computed analysis used as the progress fallback document. Rates are
/// rounded to one decimal place.
pub fn baseline_analysis(report: &ProgressReport) -> ProgressAnalysis {
    let m = &report.metrics;
    ProgressAnalysis {
        strength: report.strength.clone(),
        weaknesses: report.weaknesses.clone(),
        recommendations: report.recommendation_messages(),
        score: m.composite_score,
        streak: m.streak,
        days_since_start: m.days_since_start,
        total_actions: m.total_actions,
        avg_actions_per_week: round1(m.avg_actions_per_week),
        goal_completion_rate: round1(m.goal_completion_rate),
    }
}

pub fn progress_context(snapshot: &UserSnapshot, report: &ProgressReport) -> ProgressContext {
    ProgressContext {
        summary: report.summary(),
        active_goals: active_goal_labels(snapshot),
        completed_goals: labels(snapshot.completed_goals()),
        baseline: baseline_analysis(report),
    }
}

pub fn motivation_context(snapshot: &UserSnapshot) -> MotivationContext {
    MotivationContext {
        active_goals: active_goal_labels(snapshot),
        completed_goals: labels(snapshot.completed_goals()),
        total_actions: snapshot.daily_actions.len(),
    }
}

/// Navigation context as of `today`. `recent_actions` counts distinct
/// action days in the last week, today included.
pub fn navigation_context(snapshot: &UserSnapshot, today: NaiveDate) -> NavigationContext {
    let dates = snapshot.action_dates();
    let window_start = today - Duration::days(RECENT_WINDOW_DAYS - 1);
    let recent: BTreeSet<NaiveDate> = dates
        .iter()
        .copied()
        .filter(|d| *d >= window_start && *d <= today)
        .collect();

    NavigationContext {
        active_goals: active_goal_labels(snapshot),
        active_cards: snapshot.active_cards().count(),
        recent_actions: recent.len(),
        streak: crate::analytics::compute_streak(&dates, today),
    }
}
