//! Rule table mapping progress metrics to canned advice.
//!
//! Rules are evaluated in a fixed order and every rule that holds fires;
//! the caller keeps the first few. When nothing fires, a default triad of
//! generic encouragements is returned instead.

use serde::Serialize;

/// Inputs the rule table looks at.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecommendationInputs {
    pub total_goals: usize,
    pub active_goals: usize,
    pub streak: u32,
    pub goal_completion_rate: f64,
    pub high_priority_active_cards: usize,
}

/// A single piece of canned advice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    CreateFirstGoal,
    CreateNewGoal,
    StartToday,
    MaintainStreak(u32),
    FocusOnExistingGoals,
    Reprioritize,
    KeepGoing,
    ReviewProgress,
    SetNextGoals,
}

impl Recommendation {
    /// User-facing text.
    pub fn message(&self) -> String {
        match self {
            Recommendation::CreateFirstGoal => {
                "Create your first goal to start the journey toward your dream".to_string()
            }
            Recommendation::CreateNewGoal => {
                "Create a new goal - you have no active goals right now".to_string()
            }
            Recommendation::StartToday => {
                "Start a daily streak - complete an action today".to_string()
            }
            Recommendation::MaintainStreak(days) => {
                format!("Keep your {}-day streak going - don't skip a day", days)
            }
            Recommendation::FocusOnExistingGoals => {
                "Focus on finishing the goals you already have".to_string()
            }
            Recommendation::Reprioritize => {
                "You have a lot of high-priority tasks - set clear priorities".to_string()
            }
            Recommendation::KeepGoing => "Keep up the good work".to_string(),
            Recommendation::ReviewProgress => "Review your progress regularly".to_string(),
            Recommendation::SetNextGoals => {
                "Set new goals once the current ones are done".to_string()
            }
        }
    }
}

const DEFAULT_TRIAD: [Recommendation; 3] = [
    Recommendation::KeepGoing,
    Recommendation::ReviewProgress,
    Recommendation::SetNextGoals,
];

/// Evaluate the rule table.
///
/// `high_priority_limit` is the card count that must be exceeded for the
/// reprioritize rule; at most `max` recommendations are returned.
pub fn recommend(
    inputs: &RecommendationInputs,
    high_priority_limit: usize,
    max: usize,
) -> Vec<Recommendation> {
    let mut fired = Vec::new();

    if inputs.total_goals == 0 {
        fired.push(Recommendation::CreateFirstGoal);
    } else if inputs.active_goals == 0 {
        fired.push(Recommendation::CreateNewGoal);
    }

    match inputs.streak {
        0 => fired.push(Recommendation::StartToday),
        1..=6 => fired.push(Recommendation::MaintainStreak(inputs.streak)),
        _ => {}
    }

    if inputs.total_goals > 0 && inputs.goal_completion_rate < 50.0 {
        fired.push(Recommendation::FocusOnExistingGoals);
    }

    if inputs.high_priority_active_cards > high_priority_limit {
        fired.push(Recommendation::Reprioritize);
    }

    if fired.is_empty() {
        fired.extend(DEFAULT_TRIAD);
    }

    fired.truncate(max);
    fired
}
