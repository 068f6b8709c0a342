//! Prompt templates.
//!
//! The system part is a fixed persona plus a language instruction. The user
//! part is a kind-specific template filled with caller context. Structured
//! kinds spell out the exact JSON shape expected back.

use super::request::{
    AdviceRequest, GoalBreakdownRequest, MotivationContext, NavigationContext, ProgressContext,
};
use crate::types::EventKind;

const MOTIVATOR_PERSONA: &str = "You are a warm, motivating travel companion who helps people reach their goals. \
Speak about progress using journey and travel metaphors. \
Answer in 2-3 sentences, be sincere and specific, never preachy.";

const PLANNER_PERSONA: &str = "You are an experienced personal goal coach who plans routes to goals the way a guide plans an expedition. \
You give practical, concrete and realistic advice. \
When asked for JSON you answer with a single JSON object and nothing else.";

/// Goal labels shown in a prompt.
const MAX_GOALS_IN_PROMPT: usize = 3;

fn with_language(persona: &str, language: &str) -> String {
    format!("{persona} Always reply in {language}.")
}

/// Persona for free-form motivational messages.
pub fn motivator_system(language: &str) -> String {
    with_language(MOTIVATOR_PERSONA, language)
}

/// Persona for structured documents.
pub fn planner_system(language: &str) -> String {
    with_language(PLANNER_PERSONA, language)
}

fn goal_list(goals: &[String]) -> String {
    if goals.is_empty() {
        return "none".to_string();
    }
    goals
        .iter()
        .take(MAX_GOALS_IN_PROMPT)
        .map(|g| format!("- {g}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Instruction for one motivational event.
pub fn motivation(event: &EventKind) -> String {
    match event {
        EventKind::SevenDayStreak => {
            "The user has kept a 7-day streak of daily actions. Congratulate them and encourage them to keep the pace.".to_string()
        }
        EventKind::FirstGoal => {
            "The user has just created their very first goal. Welcome them to the journey and inspire the first step.".to_string()
        }
        EventKind::MilestoneReached => {
            "The user has reached a milestone in their goals. Celebrate the landmark and point toward the next one.".to_string()
        }
        EventKind::GoalCompleted => {
            "The user has completed a goal. Celebrate the arrival and invite them to choose the next destination.".to_string()
        }
        EventKind::MotivationNeeded => {
            "The user is losing momentum and needs support. Encourage them gently without pressure.".to_string()
        }
        EventKind::WeeklyReview => {
            "A week has passed since the user's last recorded action. Invite them to review their route and plan the coming week.".to_string()
        }
        EventKind::Custom(name) => format!(
            "Write a short motivational message for the user about this event: {name}."
        ),
    }
}

/// Instruction for goal-seeded motivation.
pub fn contextual_motivation(context: &MotivationContext) -> String {
    format!(
        "Write a personal motivational message for the user.\n\
Completed goals:\n{}\n\
Active goals:\n{}\n\
Recorded daily actions: {}",
        goal_list(&context.completed_goals),
        goal_list(&context.active_goals),
        context.total_actions,
    )
}

pub fn goal_breakdown(request: &GoalBreakdownRequest) -> String {
    format!(
        "Break this goal into 3-6 concrete steps.\n\
Goal: {}\n\
Description: {}\n\
Type: {}\n\n\
Answer with JSON of exactly this shape:\n\
{{\"steps\": [{{\"title\": \"...\", \"description\": \"...\", \"estimated_days\": 7, \"priority\": 3}}], \"advice\": \"...\"}}\n\
priority is 1 (low) to 5 (high).",
        request.title,
        request.description.as_deref().unwrap_or("not given"),
        request.goal_type.as_deref().unwrap_or("general"),
    )
}

pub fn navigation(context: &NavigationContext) -> String {
    format!(
        "Suggest what the user should do next.\n\
Active goals:\n{}\n\
Active cards: {}\n\
Days with actions in the last week: {}\n\
Current streak: {} days\n\n\
Answer with JSON of exactly this shape:\n\
{{\"next_actions\": [{{\"title\": \"...\", \"description\": \"...\", \"priority\": 5}}], \"focus\": \"...\", \"warnings\": [\"...\"]}}\n\
Suggest at most 3 actions.",
        goal_list(&context.active_goals),
        context.active_cards,
        context.recent_actions,
        context.streak,
    )
}

pub fn personal_advice(request: &AdviceRequest) -> String {
    let background = if request.active_goals.is_empty() && request.streak.is_none() {
        String::new()
    } else {
        format!(
            "\nActive goals:\n{}\nCurrent streak: {} days",
            goal_list(&request.active_goals),
            request.streak.unwrap_or(0),
        )
    };
    format!(
        "The user asks: {}{}\n\n\
Answer with JSON of exactly this shape:\n\
{{\"advice\": \"...\", \"steps\": [\"...\", \"...\", \"...\"], \"motivation\": \"...\"}}",
        request.question, background,
    )
}

pub fn progress_narrative(context: &ProgressContext) -> String {
    format!(
        "Analyse the user's progress.\n\
{}\n\
Active goals:\n{}\n\
Completed goals:\n{}\n\n\
Answer with JSON of exactly this shape:\n\
{{\"strength\": \"...\", \"weaknesses\": \"...\", \"recommendations\": [\"...\"], \"score\": 0}}\n\
score is 0-100.",
        context.summary,
        goal_list(&context.active_goals),
        goal_list(&context.completed_goals),
    )
}
