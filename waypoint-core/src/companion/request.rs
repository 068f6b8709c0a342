//! Request kinds and the caller context each one carries.

use super::documents::ProgressAnalysis;
use serde::Serialize;

/// Every kind of text the companion can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Motivation,
    ContextualMotivation,
    GoalBreakdown,
    Navigation,
    PersonalAdvice,
    ProgressNarrative,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Motivation => "motivation",
            RequestKind::ContextualMotivation => "contextual_motivation",
            RequestKind::GoalBreakdown => "goal_breakdown",
            RequestKind::Navigation => "navigation",
            RequestKind::PersonalAdvice => "personal_advice",
            RequestKind::ProgressNarrative => "progress_narrative",
        }
    }

    /// Output budget sent to providers.
    pub fn max_tokens(&self) -> u32 {
        match self {
            RequestKind::Motivation => 150,
            RequestKind::ContextualMotivation => 200,
            RequestKind::GoalBreakdown => 800,
            RequestKind::Navigation => 600,
            RequestKind::PersonalAdvice => 500,
            RequestKind::ProgressNarrative => 700,
        }
    }

    /// Whether the answer must be a JSON document.
    pub fn is_structured(&self) -> bool {
        !matches!(
            self,
            RequestKind::Motivation | RequestKind::ContextualMotivation
        )
    }
}

impl std::fmt::Display for RequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A goal to be split into steps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoalBreakdownRequest {
    pub title: String,
    pub description: Option<String>,
    pub goal_type: Option<String>,
}

impl GoalBreakdownRequest {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// What the user has on their plate right now.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavigationContext {
    /// Labels of active goals, most recent first
    pub active_goals: Vec<String>,
    /// Number of active cards
    pub active_cards: usize,
    /// Distinct action days within the last week
    pub recent_actions: usize,
    /// Current streak in days
    pub streak: u32,
}

/// A free-form question plus optional background.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdviceRequest {
    pub question: String,
    pub active_goals: Vec<String>,
    pub streak: Option<u32>,
}

impl AdviceRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ..Self::default()
        }
    }
}

/// Input for the progress narrative.
///
/// `baseline` is the fully computed analysis used as the fallback document;
/// its metric fields are kept even when a provider answers.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressContext {
    /// Human-readable statistics block
    pub summary: String,
    pub active_goals: Vec<String>,
    pub completed_goals: Vec<String>,
    pub baseline: ProgressAnalysis,
}

/// Goal summary used to seed a free-form motivational message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MotivationContext {
    pub active_goals: Vec<String>,
    pub completed_goals: Vec<String>,
    pub total_actions: usize,
}

/// A request for one of the structured document kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum StructuredRequest {
    GoalBreakdown(GoalBreakdownRequest),
    Navigation(NavigationContext),
    PersonalAdvice(AdviceRequest),
    ProgressNarrative(ProgressContext),
}

impl StructuredRequest {
    pub fn kind(&self) -> RequestKind {
        match self {
            StructuredRequest::GoalBreakdown(_) => RequestKind::GoalBreakdown,
            StructuredRequest::Navigation(_) => RequestKind::Navigation,
            StructuredRequest::PersonalAdvice(_) => RequestKind::PersonalAdvice,
            StructuredRequest::ProgressNarrative(_) => RequestKind::ProgressNarrative,
        }
    }
}
