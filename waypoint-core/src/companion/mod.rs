//! Companion: motivational and planning text with provider fallback
//!
//! Providers are tried one at a time in policy order. The first usable answer
//! wins; when none answers, static catalogs and templated documents are used
//! instead, so every call returns something the caller can show.
//!
//! - [`provider`]: the [`TextProvider`] trait and the HTTP implementation
//! - [`engine`]: [`CompanionEngine`], the fallback chain itself
//! - [`documents`]: typed structured answers and their static fallbacks
//! - [`stats`]: per-provider counters

pub mod catalog;
pub mod documents;
pub mod engine;
pub mod mock;
pub mod policy;
pub mod prompts;
pub mod provider;
pub mod request;
pub mod stats;

pub use documents::{
    BreakdownStep, GoalBreakdown, NavigationAdvice, NextAction, PersonalAdvice,
    ProgressAnalysis, StructuredDocument,
};
pub use engine::{CompanionEngine, ProviderOutcome};
pub use policy::SelectionPolicy;
pub use provider::{configured_providers, GenerationRequest, HttpTextProvider, TextProvider};
pub use request::{
    AdviceRequest, GoalBreakdownRequest, MotivationContext, NavigationContext, ProgressContext,
    RequestKind, StructuredRequest,
};
pub use stats::{ProviderCount, StatsSnapshot};
