//! Integration tests for waypoint analytics and the companion fallback chain
//!
//! Snapshots are built in code relative to a pinned "today" so every
//! scenario is deterministic. Providers are scripted; no network is used.

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use std::sync::Arc;
use waypoint_core::analytics::{compute_streak, composite_score, AnalyticsEngine};
use waypoint_core::companion::mock::{MockResponse, ScriptedProvider};
use waypoint_core::companion::{
    catalog, GoalBreakdownRequest, SelectionPolicy, StructuredDocument, StructuredRequest,
    TextProvider,
};
use waypoint_core::config::AnalyticsConfig;
use waypoint_core::snapshot::InMemorySnapshotSource;
use waypoint_core::{
    Advisor, Card, CardStatus, CardType, CompanionEngine, DailyAction, Error, EventKind,
    ExternalEvent, FixedClock, Goal, UserProfile, UserSnapshot,
};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

fn user() -> UserProfile {
    UserProfile {
        id: "u1".to_string(),
        telegram_id: Some(42),
        username: Some("traveller".to_string()),
        created_at: Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
    }
}

fn goal(id: usize, completed: bool) -> Goal {
    let created = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap() + Duration::days(id as i64);
    Goal {
        id: format!("g{id}"),
        user_id: "u1".to_string(),
        goal_type: "health".to_string(),
        title: Some(format!("Goal {id}")),
        description: None,
        is_completed: completed,
        created_at: created,
        updated_at: created,
    }
}

fn action(date: &str) -> DailyAction {
    DailyAction {
        id: format!("a-{date}"),
        user_id: "u1".to_string(),
        action_date: date.to_string(),
        created_at: Utc::now(),
    }
}

fn card(id: usize, priority: u8) -> Card {
    Card {
        id: format!("c{id}"),
        user_id: "u1".to_string(),
        title: format!("Card {id}"),
        description: None,
        card_type: CardType::Task,
        status: CardStatus::Active,
        priority,
        due_date: None,
        tags: Vec::new(),
        metadata: Default::default(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Actions on each of the `days` days ending today.
fn run_ending_today(days: i64) -> Vec<DailyAction> {
    (0..days)
        .map(|i| action(&(today() - Duration::days(i)).format("%Y-%m-%d").to_string()))
        .collect()
}

fn snapshot(goals: Vec<Goal>, daily_actions: Vec<DailyAction>) -> UserSnapshot {
    UserSnapshot {
        user: user(),
        goals,
        daily_actions,
        cards: Vec::new(),
    }
}

fn analytics() -> AnalyticsEngine {
    AnalyticsEngine::with_clock(AnalyticsConfig::default(), Arc::new(FixedClock(today())))
}

fn engine_with(providers: Vec<Arc<ScriptedProvider>>) -> CompanionEngine {
    let providers: Vec<Arc<dyn TextProvider>> = providers
        .into_iter()
        .map(|p| p as Arc<dyn TextProvider>)
        .collect();
    CompanionEngine::new(providers, SelectionPolicy::Fixed)
}

// ============================================
// Streak properties
// ============================================

#[test]
fn test_streak_is_zero_without_today() {
    let dates: Vec<NaiveDate> = (1..10).map(|i| today() - Duration::days(i)).collect();
    assert_eq!(compute_streak(&dates, today()), 0);
}

#[test]
fn test_streak_is_largest_contiguous_run() {
    // today, -1, -2, gap, -4, -5
    let offsets = [0, 1, 2, 4, 5, 2, 0];
    let dates: Vec<NaiveDate> = offsets
        .iter()
        .map(|&i| today() - Duration::days(i))
        .collect();
    let streak = compute_streak(&dates, today());
    assert_eq!(streak, 3);
    assert!(streak as usize <= dates.len());
}

#[test]
fn test_malformed_dates_are_skipped() {
    let mut actions = run_ending_today(3);
    actions.push(action("not-a-date"));
    let metrics = analytics().compute_progress(&snapshot(vec![goal(1, false)], actions));
    assert_eq!(metrics.streak, 3);
    // raw record count, malformed row included
    assert_eq!(metrics.total_actions, 4);
}

// ============================================
// Progress metrics
// ============================================

#[test]
fn test_empty_user_has_zero_progress() {
    let engine = analytics();
    let empty = snapshot(vec![], vec![]);
    let metrics = engine.compute_progress(&empty);
    assert_eq!(metrics.streak, 0);
    assert_eq!(metrics.composite_score, 0);
    assert_eq!(metrics.goal_completion_rate, 0.0);
    assert!(engine.detect_triggers(&empty, None).is_empty());
}

#[test]
fn test_progress_for_active_user() {
    let goals = vec![goal(1, true), goal(2, true), goal(3, false), goal(4, false)];
    let metrics = analytics().compute_progress(&snapshot(goals, run_ending_today(4)));

    assert_eq!(metrics.goal_completion_rate, 50.0);
    assert_eq!(metrics.streak, 4);
    assert_eq!(metrics.days_since_start, 14);
    assert_eq!(metrics.total_actions, 4);
    assert_eq!(metrics.avg_actions_per_week, 2.0);
    // 15*2 + 3*4 + min(30, 2) + min(20, 10)
    assert_eq!(metrics.composite_score, 54);
}

#[test]
fn test_composite_score_monotonic_and_bounded() {
    let base = (2usize, 3u32, 10usize, 40.0f64);
    let score = |c, s, a, r| composite_score(c, s, a, r);
    let s0 = score(base.0, base.1, base.2, base.3);
    assert!(score(base.0 + 1, base.1, base.2, base.3) >= s0);
    assert!(score(base.0, base.1 + 1, base.2, base.3) >= s0);
    assert!(score(base.0, base.1, base.2 + 1, base.3) >= s0);
    assert!(score(base.0, base.1, base.2, base.3 + 10.0) >= s0);
    assert_eq!(score(50, 400, 1000, 100.0), 100);
}

#[test]
fn test_report_recommends_first_goal_for_new_user() {
    let report = analytics().report(&snapshot(vec![], vec![]));
    let messages = report.recommendation_messages();
    assert!(!messages.is_empty());
    assert!(messages.len() <= AnalyticsConfig::default().max_recommendations);
    assert!(messages[0].to_lowercase().contains("goal"));
}

#[test]
fn test_report_flags_crowded_high_priority_cards() {
    let mut snap = snapshot(vec![goal(1, false)], run_ending_today(2));
    snap.cards = (0..6).map(|i| card(i, 5)).collect();
    let report = analytics().report(&snap);
    assert_eq!(report.high_priority_active_cards, 6);
    assert!(report
        .recommendations
        .iter()
        .any(|r| matches!(r, waypoint_core::analytics::Recommendation::Reprioritize)));
}

// ============================================
// Triggers
// ============================================

#[test]
fn test_seven_day_streak_triggers() {
    let snap = snapshot(vec![goal(1, false)], run_ending_today(7));
    let events = analytics().detect_triggers(&snap, Some(ExternalEvent::ActionCompleted));
    assert!(events.contains(&EventKind::SevenDayStreak));
}

#[test]
fn test_eight_day_streak_does_not_retrigger() {
    let snap = snapshot(vec![goal(1, false)], run_ending_today(8));
    let events = analytics().detect_triggers(&snap, Some(ExternalEvent::ActionCompleted));
    assert!(!events.contains(&EventKind::SevenDayStreak));
}

#[test]
fn test_five_goals_reach_milestone() {
    let goals = (1..=5).map(|i| goal(i, i % 2 == 0)).collect();
    let events = analytics().detect_triggers(&snapshot(goals, vec![]), None);
    assert_eq!(events, vec![EventKind::MilestoneReached]);
}

#[test]
fn test_first_goal_requires_creation_signal() {
    let snap = snapshot(vec![goal(1, false)], vec![]);
    assert!(analytics().detect_triggers(&snap, None).is_empty());
    assert_eq!(
        analytics().detect_triggers(&snap, Some(ExternalEvent::GoalCreated)),
        vec![EventKind::FirstGoal]
    );
}

#[test]
fn test_goal_completed_and_weekly_review() {
    let stale = (today() - Duration::days(9)).format("%Y-%m-%d").to_string();
    let snap = snapshot(vec![goal(1, true), goal(2, false)], vec![action(&stale)]);
    let events = analytics().detect_triggers(&snap, Some(ExternalEvent::GoalCompleted));
    assert_eq!(events, vec![EventKind::GoalCompleted, EventKind::WeeklyReview]);
}

// ============================================
// Fallback engine
// ============================================

#[test]
fn test_no_providers_returns_catalog_entry() {
    let engine = engine_with(vec![]);
    let message = engine.resolve_motivation(&EventKind::MilestoneReached);
    assert!(catalog::motivation_variants(&EventKind::MilestoneReached).contains(&message.as_str()));

    let stats = engine.get_provider_stats();
    assert_eq!(stats.fallback_used, 1);
    assert_eq!(stats.attempts(), 0);
}

#[test]
fn test_timing_out_provider_falls_back() {
    let provider = Arc::new(ScriptedProvider::new("groq", vec![MockResponse::Timeout]));
    let engine = engine_with(vec![provider.clone()]);

    let message = engine.resolve_motivation(&EventKind::GoalCompleted);
    assert!(!message.is_empty());

    let stats = engine.get_provider_stats();
    let groq = stats.provider("groq").unwrap();
    assert_eq!(groq.failure, 1);
    assert_eq!(groq.success, 0);
    assert_eq!(stats.fallback_used, 1);
    assert_eq!(provider.call_count(), 1);
}

#[test]
fn test_hanging_provider_does_not_block_resolution() {
    let hanging = Arc::new(
        ScriptedProvider::new(
            "groq",
            vec![MockResponse::delayed(
                std::time::Duration::from_millis(1500),
                MockResponse::text("late"),
            )],
        )
        .with_timeout(std::time::Duration::from_millis(50)),
    );
    let engine = engine_with(vec![hanging]);

    let started = std::time::Instant::now();
    let message = engine.resolve_motivation(&EventKind::WeeklyReview);
    assert!(started.elapsed() < std::time::Duration::from_millis(500));
    assert!(catalog::motivation_variants(&EventKind::WeeklyReview).contains(&message.as_str()));

    let stats = engine.get_provider_stats();
    assert_eq!(stats.provider("groq").unwrap().failure, 1);
    assert_eq!(stats.fallback_used, 1);
}

#[test]
fn test_shared_engine_loses_no_counter_updates() {
    const THREADS: u64 = 8;
    const PER_THREAD: u64 = 25;

    let engine = engine_with(vec![Arc::new(ScriptedProvider::text("groq", "Keep going"))]);
    std::thread::scope(|scope| {
        for _ in 0..THREADS {
            scope.spawn(|| {
                for _ in 0..PER_THREAD {
                    assert_eq!(engine.resolve_motivation(&EventKind::GoalCompleted), "Keep going");
                }
            });
        }
    });

    let stats = engine.get_provider_stats();
    assert_eq!(stats.provider("groq").unwrap().success, THREADS * PER_THREAD);
    assert_eq!(stats.provider("groq").unwrap().failure, 0);
    assert_eq!(stats.total_requests, THREADS * PER_THREAD);
    assert_eq!(stats.fallback_used, 0);
}

#[test]
fn test_shared_engine_counts_every_fallback() {
    const THREADS: u64 = 8;
    const PER_THREAD: u64 = 25;

    let engine = engine_with(vec![
        Arc::new(ScriptedProvider::failing("groq")),
        Arc::new(ScriptedProvider::failing("cohere")),
    ]);
    std::thread::scope(|scope| {
        for _ in 0..THREADS {
            scope.spawn(|| {
                for _ in 0..PER_THREAD {
                    engine.resolve_motivation(&EventKind::MotivationNeeded);
                }
            });
        }
    });

    let stats = engine.get_provider_stats();
    let total = THREADS * PER_THREAD;
    assert_eq!(stats.provider("groq").unwrap().failure, total);
    assert_eq!(stats.provider("cohere").unwrap().failure, total);
    assert_eq!(stats.attempts(), 2 * total);
    assert_eq!(stats.total_requests, total);
    assert_eq!(stats.fallback_used, total);
}

#[test]
fn test_valid_text_is_returned_trimmed() {
    let engine = engine_with(vec![Arc::new(ScriptedProvider::text(
        "groq",
        "\n  The road is long, and you are on it.  \n",
    ))]);
    assert_eq!(
        engine.resolve_motivation(&EventKind::SevenDayStreak),
        "The road is long, and you are on it."
    );
    let stats = engine.get_provider_stats();
    assert_eq!(stats.provider("groq").unwrap().success, 1);
    assert_eq!(stats.provider("groq").unwrap().failure, 0);
    assert_eq!(stats.fallback_used, 0);
}

#[test]
fn test_structured_answer_wrapped_in_prose() {
    let engine = engine_with(vec![Arc::new(ScriptedProvider::text(
        "groq",
        r#"Here you go: {"steps":[{"title":"A"}],"advice":"x"} thanks"#,
    ))]);
    let request = StructuredRequest::GoalBreakdown(GoalBreakdownRequest::new("Write a book"));
    match engine.resolve_structured(&request) {
        StructuredDocument::GoalBreakdown(doc) => {
            assert_eq!(doc.steps.len(), 1);
            assert_eq!(doc.steps[0].title, "A");
        }
        other => panic!("unexpected document: {other:?}"),
    }
}

#[test]
fn test_unconfigured_config_builds_static_engine() {
    // Credentials come only from the file here, so none are configured
    let config: waypoint_core::Config = toml::from_str("[companion]\npolicy = \"fixed\"").unwrap();
    let resolved = config.resolve_providers(|_| None);
    assert!(resolved.is_empty());
}

// ============================================
// Advisor
// ============================================

fn advisor(providers: Vec<Arc<ScriptedProvider>>, snap: UserSnapshot) -> Advisor {
    let mut source = InMemorySnapshotSource::new();
    source.insert(snap);
    Advisor::new(Box::new(source), analytics(), engine_with(providers))
}

#[test]
fn test_handle_event_produces_one_message_per_trigger() {
    let goals = (1..=5).map(|i| goal(i, false)).collect();
    let advisor = advisor(vec![], snapshot(goals, run_ending_today(7)));
    let messages = advisor
        .handle_event("u1", Some(ExternalEvent::ActionCompleted))
        .unwrap();

    let events: Vec<_> = messages.iter().map(|m| m.event.clone()).collect();
    assert_eq!(events, vec![EventKind::SevenDayStreak, EventKind::MilestoneReached]);
    assert!(messages.iter().all(|m| !m.message.is_empty()));
    assert_eq!(advisor.companion().get_provider_stats().fallback_used, 2);
}

#[test]
fn test_unknown_user_is_snapshot_error() {
    let advisor = advisor(vec![], snapshot(vec![], vec![]));
    assert!(matches!(advisor.navigate("nobody"), Err(Error::Snapshot(_))));
}

#[test]
fn test_progress_analysis_merges_provider_narrative() {
    let provider = Arc::new(ScriptedProvider::text(
        "groq",
        r#"{"strength":"Steady walker","weaknesses":"Rest days","recommendations":["Plan Sunday"],"score":91}"#,
    ));
    let goals = vec![goal(1, true), goal(2, false)];
    let advisor = advisor(vec![provider.clone()], snapshot(goals, run_ending_today(3)));

    let outcome = advisor.analyze_progress("u1").unwrap();
    assert_eq!(outcome.analysis.strength, "Steady walker");
    assert_eq!(outcome.analysis.score, 91);
    assert_eq!(outcome.analysis.streak, outcome.report.metrics.streak);
    assert_eq!(outcome.analysis.total_actions, 3);

    let request = provider.last_request().unwrap();
    assert!(request.user.contains("Streak: 3 days"));
}

#[test]
fn test_progress_analysis_without_providers_uses_metrics() {
    let goals = vec![goal(1, true), goal(2, false)];
    let advisor = advisor(vec![], snapshot(goals, run_ending_today(3)));
    let outcome = advisor.analyze_progress("u1").unwrap();
    assert_eq!(outcome.analysis.score, outcome.report.metrics.composite_score);
    assert_eq!(
        outcome.analysis.recommendations,
        outcome.report.recommendation_messages()
    );
}

#[test]
fn test_navigate_without_active_goals_skips_providers() {
    let provider = Arc::new(ScriptedProvider::text("groq", "{}"));
    let advisor = advisor(vec![provider.clone()], snapshot(vec![goal(1, true)], vec![]));
    let advice = advisor.navigate("u1").unwrap();
    assert!(advice.no_goals);
    assert_eq!(provider.call_count(), 0);
}

#[test]
fn test_navigate_fallback_counts_recent_days() {
    let mut snap = snapshot(vec![goal(1, false)], run_ending_today(1));
    snap.cards = (0..7).map(|i| card(i, 2)).collect();
    let advisor = advisor(vec![Arc::new(ScriptedProvider::failing("groq"))], snap);

    let advice = advisor.navigate("u1").unwrap();
    assert!(!advice.no_goals);
    assert_eq!(advice.next_actions[0].title, "Take one step today");
    assert_eq!(advice.next_actions.last().unwrap().title, "Reprioritize");
}

#[test]
fn test_advise_includes_user_goals() {
    let provider = Arc::new(ScriptedProvider::text(
        "groq",
        r#"{"advice":"Start small","steps":["a","b","c"],"motivation":"Go"}"#,
    ));
    let advisor = advisor(vec![provider.clone()], snapshot(vec![goal(1, false)], vec![]));

    let advice = advisor.advise("Where do I start?", Some("u1")).unwrap();
    assert_eq!(advice.advice, "Start small");
    assert_eq!(advice.steps.len(), 3);
    assert!(provider.last_request().unwrap().user.contains("Goal 1"));
}
