//! Structured documents returned by the companion.
//!
//! Every document kind has a deterministic static fallback so a caller
//! always receives a well-formed value, whatever the providers did.

use super::request::{AdviceRequest, GoalBreakdownRequest, NavigationContext};
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Extract the first `{` .. last `}` span of a provider answer.
pub fn extract_json_object(raw: &str) -> Result<&str> {
    let start = raw
        .find('{')
        .ok_or_else(|| Error::MalformedOutput("answer did not contain JSON object".to_string()))?;
    let end = raw
        .rfind('}')
        .ok_or_else(|| Error::MalformedOutput("answer did not contain JSON object".to_string()))?;
    if end <= start {
        return Err(Error::MalformedOutput(
            "answer JSON bounds are invalid".to_string(),
        ));
    }
    Ok(&raw[start..=end])
}

/// Parse a provider answer into a typed document.
pub fn parse_document<T: DeserializeOwned>(raw: &str) -> Result<T> {
    let json = extract_json_object(raw)?;
    serde_json::from_str(json)
        .map_err(|e| Error::MalformedOutput(format!("answer JSON did not match document: {e}")))
}

// ============================================
// Goal breakdown
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownStep {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub estimated_days: Option<u32>,
    #[serde(default)]
    pub priority: Option<u8>,
}

impl BreakdownStep {
    fn planned(title: String, description: String, days: u32, priority: u8) -> Self {
        Self {
            title,
            description,
            estimated_days: Some(days),
            priority: Some(priority),
        }
    }
}

/// A goal split into ordered steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalBreakdown {
    pub steps: Vec<BreakdownStep>,
    #[serde(default)]
    pub advice: String,
}

impl GoalBreakdown {
    /// Four-stage plan: learn, plan, practice, review.
    pub fn fallback(request: &GoalBreakdownRequest) -> Self {
        let title = request.title.trim();
        Self {
            steps: vec![
                BreakdownStep::planned(
                    format!("Study the basics of {title}"),
                    format!("Learn what {title} involves and gather the essentials"),
                    7,
                    3,
                ),
                BreakdownStep::planned(
                    format!("Draw up an action plan for {title}"),
                    "Break the work into weekly checkpoints".to_string(),
                    3,
                    4,
                ),
                BreakdownStep::planned(
                    format!("Start practical implementation of {title}"),
                    "Do a little every day and track each action".to_string(),
                    14,
                    5,
                ),
                BreakdownStep::planned(
                    format!("Evaluate progress in {title}"),
                    "Look back at what worked and adjust the route".to_string(),
                    2,
                    2,
                ),
            ],
            advice: format!(
                "The road to {title} is walked one stage at a time. Finish each step before looking at the next."
            ),
        }
    }

    /// Sum of estimated days across steps that carry an estimate.
    pub fn total_days(&self) -> u32 {
        self.steps.iter().filter_map(|s| s.estimated_days).sum()
    }
}

// ============================================
// Navigation
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextAction {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Option<u8>,
}

impl NextAction {
    fn new(title: &str, description: &str, priority: u8) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            priority: Some(priority),
        }
    }
}

/// What to do next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationAdvice {
    pub next_actions: Vec<NextAction>,
    #[serde(default)]
    pub focus: String,
    #[serde(default)]
    pub warnings: Vec<String>,
    /// Set when the user has no active goals yet
    #[serde(default)]
    pub no_goals: bool,
}

/// Navigation never suggests more than this many actions in its fallback.
pub const MAX_FALLBACK_ACTIONS: usize = 3;

/// Active card count above which the fallback suggests reprioritizing.
pub const CROWDED_CARD_COUNT: usize = 5;

impl NavigationAdvice {
    /// Answer for a user without active goals.
    pub fn no_goals() -> Self {
        Self {
            next_actions: vec![NextAction::new(
                "Set your first goal",
                "Pick one destination you care about and write it down",
                5,
            )],
            focus: "Choosing a destination".to_string(),
            warnings: vec![
                "Personalized advice needs at least one active goal".to_string(),
            ],
            no_goals: true,
        }
    }

    /// Static advice for a user with active goals.
    pub fn fallback(context: &NavigationContext) -> Self {
        let mut next_actions = Vec::new();

        if context.recent_actions < 3 {
            next_actions.push(NextAction::new(
                "Take one step today",
                "Record a small action toward any active goal",
                5,
            ));
        } else {
            next_actions.push(NextAction::new(
                "Keep your daily rhythm",
                "You are moving steadily; keep logging daily actions",
                4,
            ));
        }

        if context.active_cards > CROWDED_CARD_COUNT {
            next_actions.push(NextAction::new(
                "Reprioritize",
                "Too many open cards; choose the few that matter this week",
                3,
            ));
        }

        next_actions.truncate(MAX_FALLBACK_ACTIONS);

        Self {
            next_actions,
            focus: "Steady progress on your current goals".to_string(),
            warnings: Vec::new(),
            no_goals: false,
        }
    }
}

// ============================================
// Personal advice
// ============================================

/// Answer to a free-form question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalAdvice {
    pub advice: String,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub motivation: String,
}

impl PersonalAdvice {
    pub fn fallback(_request: &AdviceRequest) -> Self {
        Self {
            advice: "Long journeys are made of short stretches. Decide on the next stretch and walk only that one.".to_string(),
            steps: vec![
                "Name the single most important thing for this week".to_string(),
                "Split it into actions that fit in one day".to_string(),
                "Do the first action today and record it".to_string(),
            ],
            motivation: "Every step you log moves the map forward.".to_string(),
        }
    }
}

// ============================================
// Progress narrative
// ============================================

/// Narrative part of a progress analysis as written by a provider.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProgressNarrative {
    pub strength: String,
    #[serde(default)]
    pub weaknesses: String,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default, deserialize_with = "lenient_score")]
    pub score: Option<f64>,
}

/// Accept a score as a number or a numeric string such as `"85"` or `"85%"`.
/// Anything else reads as no score rather than failing the whole narrative.
fn lenient_score<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawScore {
        Number(f64),
        Text(String),
        Other(serde_json::Value),
    }

    Ok(match Option::<RawScore>::deserialize(deserializer)? {
        Some(RawScore::Number(n)) => Some(n),
        Some(RawScore::Text(text)) => text.trim().trim_end_matches('%').trim().parse().ok(),
        Some(RawScore::Other(_)) | None => None,
    })
}

/// Computed metrics with a narrative around them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressAnalysis {
    pub strength: String,
    pub weaknesses: String,
    pub recommendations: Vec<String>,
    pub score: u8,
    pub streak: u32,
    pub days_since_start: i64,
    pub total_actions: usize,
    pub avg_actions_per_week: f64,
    pub goal_completion_rate: f64,
}

impl ProgressAnalysis {
    /// Merge a provider narrative into this computed analysis.
    ///
    /// Metric fields always come from `self`. The provider's score is kept
    /// when present; blank narrative fields keep the computed text.
    pub fn with_narrative(&self, narrative: ProgressNarrative) -> Self {
        let mut merged = self.clone();
        if !narrative.strength.trim().is_empty() {
            merged.strength = narrative.strength;
        }
        if !narrative.weaknesses.trim().is_empty() {
            merged.weaknesses = narrative.weaknesses;
        }
        let recommendations: Vec<String> = narrative
            .recommendations
            .into_iter()
            .filter(|r| !r.trim().is_empty())
            .collect();
        if !recommendations.is_empty() {
            merged.recommendations = recommendations;
        }
        if let Some(score) = narrative.score.filter(|s| s.is_finite()) {
            merged.score = score.round().clamp(0.0, 100.0) as u8;
        }
        merged
    }
}

/// Any structured document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StructuredDocument {
    GoalBreakdown(GoalBreakdown),
    Navigation(NavigationAdvice),
    PersonalAdvice(PersonalAdvice),
    ProgressNarrative(ProgressAnalysis),
}
