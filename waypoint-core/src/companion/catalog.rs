//! Static motivational messages used when no provider answers.

use crate::types::EventKind;
use rand::seq::SliceRandom;

const SEVEN_DAY_STREAK: &[&str] = &[
    "Seven days on the road without a single stop. That is how long journeys get finished.",
    "A full week of steps! Your route is turning into a habit.",
    "Seven days in a row. Look back at the distance you have already covered.",
    "One week of steady travel. Keep the pace and the horizon keeps getting closer.",
];

const FIRST_GOAL: &[&str] = &[
    "You have picked your first destination. Every great journey starts with a point on the map.",
    "Your first goal is set. The hardest part, deciding where to go, is behind you.",
    "A new route is on the map. Let's take the first step together.",
    "The first goal is the start of your expedition. Pack light and begin today.",
];

const MILESTONE_REACHED: &[&str] = &[
    "Another milestone on your map! Take a moment to enjoy the view.",
    "You reached a new landmark. The path behind you proves you can go further.",
    "Milestone reached. Travellers who mark their progress arrive more often.",
    "A new milestone! Your map is filling up with places you have been.",
];

const GOAL_COMPLETED: &[&str] = &[
    "Destination reached! Celebrate, then choose where the road leads next.",
    "Goal completed. You have proven the route was walkable all along.",
    "You made it to the finish. Every step on this trip was worth it.",
    "One more destination conquered. Your travel log is getting impressive.",
];

const MOTIVATION_NEEDED: &[&str] = &[
    "Even the longest road is walked one step at a time. Take just one today.",
    "Resting is part of every journey. When you are ready, the path is still here.",
    "Mountains look steep from below. One small step changes the view.",
    "You do not have to run. Walking slowly still moves you forward.",
];

const WEEKLY_REVIEW: &[&str] = &[
    "Time to check the map. Where are you now, and where do you want to go this week?",
    "A week has passed. Look at your route and pick the next waypoint.",
    "Travellers stop to check their bearings. Review your goals and set a course.",
    "A quiet week is a good moment to plan the next stage of the trip.",
];

const DEFAULT: &[&str] = &[
    "Keep moving toward your goals. Every step counts on this journey.",
    "Your route is yours to walk. Take the next step when you are ready.",
    "Small steps add up to long distances. Keep going.",
    "The journey continues. Today is a good day for one more step.",
];

const CONTEXTUAL: &[&str] = &[
    "Every step you log brings the destination closer. Keep walking.",
    "Your journey is already under way. Choose today's step and take it.",
    "Progress is built from small, steady steps. You are on the right road.",
];

/// Messages for an event. Unknown events use the default catalog.
pub fn motivation_variants(event: &EventKind) -> &'static [&'static str] {
    match event {
        EventKind::SevenDayStreak => SEVEN_DAY_STREAK,
        EventKind::FirstGoal => FIRST_GOAL,
        EventKind::MilestoneReached => MILESTONE_REACHED,
        EventKind::GoalCompleted => GOAL_COMPLETED,
        EventKind::MotivationNeeded => MOTIVATION_NEEDED,
        EventKind::WeeklyReview => WEEKLY_REVIEW,
        EventKind::Custom(_) => DEFAULT,
    }
}

/// Messages for goal-seeded motivation.
pub fn contextual_variants() -> &'static [&'static str] {
    CONTEXTUAL
}

/// Pick one variant uniformly at random.
pub fn pick(variants: &[&str]) -> String {
    variants
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("Keep going.")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_known_event_has_several_variants() {
        for event in EventKind::KNOWN.iter() {
            assert!(motivation_variants(event).len() >= 2, "{event}");
        }
    }

    #[test]
    fn unknown_event_uses_default_catalog() {
        let event = EventKind::from("birthday");
        assert_eq!(motivation_variants(&event), DEFAULT);
    }

    #[test]
    fn pick_returns_catalog_member() {
        let variants = motivation_variants(&EventKind::GoalCompleted);
        for _ in 0..20 {
            let message = pick(variants);
            assert!(variants.contains(&message.as_str()));
        }
    }
}
