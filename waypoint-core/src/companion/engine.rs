//! Fallback engine
//!
//! Resolves a request by trying configured providers one at a time and
//! falling back to static content when none produces usable text. Every
//! resolution returns a value; provider failures only show up in the
//! statistics and the logs.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use waypoint_core::companion::CompanionEngine;
//! use waypoint_core::EventKind;
//!
//! let engine = CompanionEngine::from_config(&config)?;
//! let message = engine.resolve_motivation(&EventKind::GoalCompleted);
//! let stats = engine.get_provider_stats();
//! ```

use super::catalog;
use super::documents::{
    parse_document, GoalBreakdown, NavigationAdvice, PersonalAdvice, ProgressAnalysis,
    ProgressNarrative, StructuredDocument,
};
use super::policy::SelectionPolicy;
use super::prompts;
use super::provider::{configured_providers, GenerationRequest, TextProvider};
use super::request::{
    AdviceRequest, GoalBreakdownRequest, MotivationContext, NavigationContext, ProgressContext,
    RequestKind, StructuredRequest,
};
use super::stats::{ProviderStats, StatsSnapshot};
use crate::config::Config;
use crate::types::EventKind;
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Instant;

/// Result of a single provider attempt, for telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderOutcome {
    Success,
    /// Network failure, non-success status or timeout
    Unavailable,
    /// Reachable, but the answer was empty or unusable
    MalformedOutput,
}

impl ProviderOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderOutcome::Success => "success",
            ProviderOutcome::Unavailable => "unavailable",
            ProviderOutcome::MalformedOutput => "malformed_output",
        }
    }

    fn of(err: &Error) -> Self {
        if err.is_unavailable() {
            ProviderOutcome::Unavailable
        } else {
            ProviderOutcome::MalformedOutput
        }
    }
}

/// Text-generation engine with ordered provider fallback.
pub struct CompanionEngine {
    providers: Vec<Arc<dyn TextProvider>>,
    stats: ProviderStats,
    policy: SelectionPolicy,
    temperature: f32,
    language: String,
}

impl CompanionEngine {
    /// Create an engine over `providers`, given in priority order.
    pub fn new(providers: Vec<Arc<dyn TextProvider>>, policy: SelectionPolicy) -> Self {
        let stats = ProviderStats::new(providers.iter().map(|p| p.name().to_string()));
        let defaults = crate::config::CompanionConfig::default();
        Self {
            providers,
            stats,
            policy,
            temperature: defaults.temperature,
            language: defaults.language,
        }
    }

    /// Create an engine with HTTP providers for every configured credential.
    pub fn from_config(config: &Config) -> Result<Self> {
        let providers = configured_providers(config)?;
        if providers.is_empty() {
            tracing::info!("No text providers configured, using static content only");
        }
        Ok(Self::new(providers, SelectionPolicy::from_config(&config.companion))
            .with_temperature(config.companion.temperature)
            .with_language(&config.companion.language))
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.language = language.to_string();
        self
    }

    pub fn policy(&self) -> &SelectionPolicy {
        &self.policy
    }

    /// Provider names in priority order.
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Provider names in the order the next resolution would try them.
    pub fn candidate_order(&self) -> Vec<&str> {
        let names = self.provider_names();
        self.policy
            .order(&names, &self.stats)
            .into_iter()
            .map(|i| names[i])
            .collect()
    }

    /// Motivational message for an event. Unknown events use a generic
    /// prompt and the default catalog.
    pub fn resolve_motivation(&self, event: &EventKind) -> String {
        let user = prompts::motivation(event);
        self.attempt_chain(RequestKind::Motivation, user)
            .unwrap_or_else(|| catalog::pick(catalog::motivation_variants(event)))
    }

    /// Motivational message seeded by the user's goals.
    pub fn resolve_motivation_with_context(&self, context: &MotivationContext) -> String {
        let user = prompts::contextual_motivation(context);
        self.attempt_chain(RequestKind::ContextualMotivation, user)
            .unwrap_or_else(|| catalog::pick(catalog::contextual_variants()))
    }

    /// Structured document for any structured request kind.
    pub fn resolve_structured(&self, request: &StructuredRequest) -> StructuredDocument {
        tracing::debug!(kind = request.kind().as_str(), "Resolving structured request");
        match request {
            StructuredRequest::GoalBreakdown(req) => {
                StructuredDocument::GoalBreakdown(self.goal_breakdown(req))
            }
            StructuredRequest::Navigation(ctx) => {
                StructuredDocument::Navigation(self.navigation(ctx))
            }
            StructuredRequest::PersonalAdvice(req) => {
                StructuredDocument::PersonalAdvice(self.personal_advice(req))
            }
            StructuredRequest::ProgressNarrative(ctx) => {
                StructuredDocument::ProgressNarrative(self.progress_narrative(ctx))
            }
        }
    }

    pub fn goal_breakdown(&self, request: &GoalBreakdownRequest) -> GoalBreakdown {
        self.resolve_document(RequestKind::GoalBreakdown, prompts::goal_breakdown(request))
            .unwrap_or_else(|| GoalBreakdown::fallback(request))
    }

    /// Next-step advice. Without active goals no provider is consulted.
    pub fn navigation(&self, context: &NavigationContext) -> NavigationAdvice {
        if context.active_goals.is_empty() {
            tracing::debug!("No active goals, returning first-goal navigation");
            return NavigationAdvice::no_goals();
        }
        self.resolve_document(RequestKind::Navigation, prompts::navigation(context))
            .unwrap_or_else(|| NavigationAdvice::fallback(context))
    }

    pub fn personal_advice(&self, request: &AdviceRequest) -> PersonalAdvice {
        self.resolve_document(RequestKind::PersonalAdvice, prompts::personal_advice(request))
            .unwrap_or_else(|| PersonalAdvice::fallback(request))
    }

    /// Progress analysis. Metric fields always come from `context.baseline`.
    pub fn progress_narrative(&self, context: &ProgressContext) -> ProgressAnalysis {
        match self.resolve_document::<ProgressNarrative>(
            RequestKind::ProgressNarrative,
            prompts::progress_narrative(context),
        ) {
            Some(narrative) => context.baseline.with_narrative(narrative),
            None => context.baseline.clone(),
        }
    }

    pub fn get_provider_stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn reset_provider_stats(&self) {
        self.stats.reset();
        tracing::info!("Provider statistics reset");
    }

    fn resolve_document<T: DeserializeOwned>(&self, kind: RequestKind, user: String) -> Option<T> {
        let raw = self.attempt_chain(kind, user)?;
        match parse_document::<T>(&raw) {
            Ok(doc) => Some(doc),
            Err(e) => {
                tracing::warn!(
                    kind = kind.as_str(),
                    outcome = ProviderOutcome::MalformedOutput.as_str(),
                    error = %e,
                    "Provider answer could not be parsed, using static document"
                );
                None
            }
        }
    }

    /// Try candidates in policy order. Returns trimmed text from the first
    /// provider that answers, or `None` after recording a fallback.
    fn attempt_chain(&self, kind: RequestKind, user: String) -> Option<String> {
        self.stats.record_request();
        let system = if kind.is_structured() {
            prompts::planner_system(&self.language)
        } else {
            prompts::motivator_system(&self.language)
        };
        let request = GenerationRequest {
            system,
            user,
            max_tokens: kind.max_tokens(),
            temperature: self.temperature,
        };

        let names = self.provider_names();
        for index in self.policy.order(&names, &self.stats) {
            let provider = &self.providers[index];
            let started = Instant::now();
            let result = generate_within_timeout(provider, &request).and_then(|text| {
                let text = text.trim();
                if text.is_empty() {
                    return Err(Error::MalformedOutput("empty answer".to_string()));
                }
                Ok(text.to_string())
            });
            let duration_ms = started.elapsed().as_millis() as u64;

            match result {
                Ok(text) => {
                    self.stats.record_success(index);
                    tracing::info!(
                        kind = kind.as_str(),
                        provider = provider.name(),
                        outcome = ProviderOutcome::Success.as_str(),
                        duration_ms,
                        "Provider answered"
                    );
                    return Some(text);
                }
                Err(e) => {
                    self.stats.record_failure(index);
                    tracing::warn!(
                        kind = kind.as_str(),
                        provider = provider.name(),
                        outcome = ProviderOutcome::of(&e).as_str(),
                        duration_ms,
                        error = %e,
                        "Provider attempt failed"
                    );
                }
            }
        }

        self.stats.record_fallback();
        tracing::info!(
            kind = kind.as_str(),
            attempted = self.providers.len(),
            "All providers failed, using static content"
        );
        None
    }
}

/// Run one attempt on a worker thread and wait at most `provider.timeout()`.
/// A worker that overruns keeps running detached; its answer is discarded.
fn generate_within_timeout(
    provider: &Arc<dyn TextProvider>,
    request: &GenerationRequest,
) -> Result<String> {
    let (tx, rx) = mpsc::channel();
    let worker = Arc::clone(provider);
    let request = request.clone();
    thread::Builder::new()
        .name(format!("provider-{}", provider.name()))
        .spawn(move || {
            // Receiver is gone once the attempt timed out
            let _ = tx.send(worker.generate(&request));
        })
        .map_err(|e| Error::ProviderUnavailable {
            provider: provider.name().to_string(),
            message: format!("failed to start attempt: {e}"),
        })?;

    match rx.recv_timeout(provider.timeout()) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => Err(Error::ProviderTimeout {
            provider: provider.name().to_string(),
            timeout_secs: provider.timeout().as_secs(),
        }),
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(Error::ProviderUnavailable {
            provider: provider.name().to_string(),
            message: "attempt ended without an answer".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::companion::mock::{MockResponse, ScriptedProvider};
    use std::time::Duration;

    fn engine(providers: Vec<Arc<ScriptedProvider>>, policy: SelectionPolicy) -> CompanionEngine {
        let providers: Vec<Arc<dyn TextProvider>> = providers
            .into_iter()
            .map(|p| p as Arc<dyn TextProvider>)
            .collect();
        CompanionEngine::new(providers, policy)
    }

    #[test]
    fn no_providers_uses_catalog() {
        let engine = engine(vec![], SelectionPolicy::Fixed);
        let message = engine.resolve_motivation(&EventKind::SevenDayStreak);
        assert!(catalog::motivation_variants(&EventKind::SevenDayStreak)
            .contains(&message.as_str()));

        let stats = engine.get_provider_stats();
        assert_eq!(stats.fallback_used, 1);
        assert_eq!(stats.total_requests, 1);
        assert_eq!(stats.attempts(), 0);
    }

    #[test]
    fn first_success_stops_the_chain() {
        let a = Arc::new(ScriptedProvider::failing("a"));
        let b = Arc::new(ScriptedProvider::text("b", "  Onward!  "));
        let c = Arc::new(ScriptedProvider::text("c", "never"));
        let engine = engine(vec![a.clone(), b.clone(), c.clone()], SelectionPolicy::Fixed);

        assert_eq!(engine.resolve_motivation(&EventKind::GoalCompleted), "Onward!");
        assert_eq!(c.call_count(), 0);

        let stats = engine.get_provider_stats();
        assert_eq!(stats.provider("a").unwrap().failure, 1);
        assert_eq!(stats.provider("b").unwrap().success, 1);
        assert_eq!(stats.provider("c").unwrap().success + stats.provider("c").unwrap().failure, 0);
        assert_eq!(stats.fallback_used, 0);
    }

    #[test]
    fn whitespace_answer_is_a_failure() {
        let a = Arc::new(ScriptedProvider::text("a", "   \n"));
        let engine = engine(vec![a], SelectionPolicy::Fixed);
        engine.resolve_motivation(&EventKind::WeeklyReview);

        let stats = engine.get_provider_stats();
        assert_eq!(stats.provider("a").unwrap().failure, 1);
        assert_eq!(stats.fallback_used, 1);
    }

    #[test]
    fn late_answer_counts_as_timeout() {
        let slow = Arc::new(
            ScriptedProvider::new(
                "slow",
                vec![MockResponse::delayed(
                    Duration::from_millis(60),
                    MockResponse::text("too late"),
                )],
            )
            .with_timeout(Duration::from_millis(10)),
        );
        let fast = Arc::new(ScriptedProvider::text("fast", "in time"));
        let engine = engine(vec![slow, fast], SelectionPolicy::Fixed);

        assert_eq!(engine.resolve_motivation(&EventKind::FirstGoal), "in time");
        assert_eq!(engine.get_provider_stats().provider("slow").unwrap().failure, 1);
    }

    #[test]
    fn hanging_provider_is_abandoned_at_its_timeout() {
        let hanging = Arc::new(
            ScriptedProvider::new(
                "hanging",
                vec![MockResponse::delayed(
                    Duration::from_millis(1500),
                    MockResponse::text("late"),
                )],
            )
            .with_timeout(Duration::from_millis(50)),
        );
        let fast = Arc::new(ScriptedProvider::text("fast", "in time"));
        let engine = engine(vec![hanging.clone(), fast], SelectionPolicy::Fixed);

        let started = Instant::now();
        let message = engine.resolve_motivation(&EventKind::GoalCompleted);
        let elapsed = started.elapsed();

        assert_eq!(message, "in time");
        assert!(elapsed < Duration::from_millis(500), "took {elapsed:?}");
        assert_eq!(hanging.call_count(), 1);

        let stats = engine.get_provider_stats();
        assert_eq!(stats.provider("hanging").unwrap().failure, 1);
        assert_eq!(stats.provider("fast").unwrap().success, 1);
        assert_eq!(stats.fallback_used, 0);
    }

    #[test]
    fn motivation_and_documents_use_their_own_persona() {
        let a = Arc::new(ScriptedProvider::text("a", r#"{"advice":"rest","steps":[]}"#));
        let engine = engine(vec![a.clone()], SelectionPolicy::Fixed);

        engine.resolve_motivation(&EventKind::GoalCompleted);
        assert_eq!(
            a.last_request().unwrap().system,
            prompts::motivator_system("English")
        );

        engine.personal_advice(&AdviceRequest::new("What now?"));
        assert_eq!(
            a.last_request().unwrap().system,
            prompts::planner_system("English")
        );
    }

    #[test]
    fn malformed_document_keeps_success_count() {
        let a = Arc::new(ScriptedProvider::text("a", "I'd rather not answer in JSON"));
        let engine = engine(vec![a], SelectionPolicy::Fixed);
        let request = GoalBreakdownRequest::new("Learn Rust");

        let doc = engine.goal_breakdown(&request);
        assert_eq!(doc, GoalBreakdown::fallback(&request));

        let stats = engine.get_provider_stats();
        assert_eq!(stats.provider("a").unwrap().success, 1);
        assert_eq!(stats.provider("a").unwrap().failure, 0);
        assert_eq!(stats.fallback_used, 0);
    }

    #[test]
    fn navigation_without_goals_skips_providers() {
        let a = Arc::new(ScriptedProvider::text("a", r#"{"next_actions":[]}"#));
        let engine = engine(vec![a.clone()], SelectionPolicy::Fixed);

        let doc = engine.navigation(&NavigationContext::default());
        assert!(doc.no_goals);
        assert_eq!(a.call_count(), 0);
        assert_eq!(engine.get_provider_stats().total_requests, 0);
    }

    #[test]
    fn request_carries_kind_budget_and_language() {
        let a = Arc::new(ScriptedProvider::text("a", r#"{"advice":"rest","steps":[]}"#));
        let engine = engine(vec![a.clone()], SelectionPolicy::Fixed)
            .with_language("Russian")
            .with_temperature(0.3);

        let doc = engine.personal_advice(&AdviceRequest::new("How do I stay on track?"));
        assert_eq!(doc.advice, "rest");

        let request = a.last_request().unwrap();
        assert_eq!(request.max_tokens, RequestKind::PersonalAdvice.max_tokens());
        assert_eq!(request.temperature, 0.3);
        assert!(request.system.contains("Russian"));
        assert!(request.user.contains("How do I stay on track?"));
    }

    #[test]
    fn success_rate_policy_reorders_after_failures() {
        let a = Arc::new(ScriptedProvider::failing("a"));
        let b = Arc::new(ScriptedProvider::text("b", "hello"));
        let engine = engine(vec![a.clone(), b.clone()], SelectionPolicy::SuccessRate);

        engine.resolve_motivation(&EventKind::MotivationNeeded);
        assert_eq!(engine.candidate_order(), vec!["b", "a"]);

        engine.resolve_motivation(&EventKind::MotivationNeeded);
        assert_eq!(a.call_count(), 1);
        assert_eq!(b.call_count(), 2);
    }

    #[test]
    fn reset_zeroes_counters() {
        let a = Arc::new(ScriptedProvider::failing("a"));
        let engine = engine(vec![a], SelectionPolicy::Fixed);
        engine.resolve_motivation(&EventKind::GoalCompleted);
        engine.reset_provider_stats();

        let stats = engine.get_provider_stats();
        assert_eq!(stats.attempts(), 0);
        assert_eq!(stats.fallback_used, 0);
        assert_eq!(stats.total_requests, 0);
    }

    #[test]
    fn outcome_classifies_errors() {
        let timeout = Error::ProviderTimeout {
            provider: "a".to_string(),
            timeout_secs: 30,
        };
        assert_eq!(ProviderOutcome::of(&timeout), ProviderOutcome::Unavailable);
        let malformed = Error::MalformedOutput("x".to_string());
        assert_eq!(ProviderOutcome::of(&malformed), ProviderOutcome::MalformedOutput);
    }
}
