//! Per-provider success/failure counters.
//!
//! Counters are plain atomics so a shared engine can record attempts from
//! several request handlers without a lock. Each counter is monotonically
//! non-decreasing between resets.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Success rate assumed for a provider that has never been attempted.
pub const DEFAULT_SUCCESS_RATE: f64 = 0.5;

#[derive(Debug)]
struct ProviderCounters {
    name: String,
    success: AtomicU64,
    failure: AtomicU64,
}

/// Live counters for one engine. Indexes match the engine's provider list.
#[derive(Debug)]
pub struct ProviderStats {
    providers: Vec<ProviderCounters>,
    fallback_used: AtomicU64,
    total_requests: AtomicU64,
}

impl ProviderStats {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            providers: names
                .into_iter()
                .map(|name| ProviderCounters {
                    name: name.into(),
                    success: AtomicU64::new(0),
                    failure: AtomicU64::new(0),
                })
                .collect(),
            fallback_used: AtomicU64::new(0),
            total_requests: AtomicU64::new(0),
        }
    }

    pub fn record_request(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_success(&self, index: usize) {
        if let Some(counters) = self.providers.get(index) {
            counters.success.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_failure(&self, index: usize) {
        if let Some(counters) = self.providers.get(index) {
            counters.failure.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_fallback(&self) {
        self.fallback_used.fetch_add(1, Ordering::Relaxed);
    }

    /// `success / (success + failure)`, or [`DEFAULT_SUCCESS_RATE`] before any attempt.
    pub fn success_rate(&self, index: usize) -> f64 {
        let Some(counters) = self.providers.get(index) else {
            return 0.0;
        };
        let success = counters.success.load(Ordering::Relaxed);
        let failure = counters.failure.load(Ordering::Relaxed);
        let attempts = success + failure;
        if attempts == 0 {
            DEFAULT_SUCCESS_RATE
        } else {
            success as f64 / attempts as f64
        }
    }

    /// Zero every counter.
    pub fn reset(&self) {
        for counters in &self.providers {
            counters.success.store(0, Ordering::Relaxed);
            counters.failure.store(0, Ordering::Relaxed);
        }
        self.fallback_used.store(0, Ordering::Relaxed);
        self.total_requests.store(0, Ordering::Relaxed);
    }

    /// Point-in-time copy suitable for display or serialization.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            providers: self
                .providers
                .iter()
                .enumerate()
                .map(|(index, counters)| ProviderCount {
                    name: counters.name.clone(),
                    success: counters.success.load(Ordering::Relaxed),
                    failure: counters.failure.load(Ordering::Relaxed),
                    success_rate: self.success_rate(index),
                })
                .collect(),
            fallback_used: self.fallback_used.load(Ordering::Relaxed),
            total_requests: self.total_requests.load(Ordering::Relaxed),
        }
    }
}

/// Counters for one provider at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderCount {
    pub name: String,
    pub success: u64,
    pub failure: u64,
    pub success_rate: f64,
}

/// Copy of all counters at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub providers: Vec<ProviderCount>,
    pub fallback_used: u64,
    pub total_requests: u64,
}

impl StatsSnapshot {
    pub fn provider(&self, name: &str) -> Option<&ProviderCount> {
        self.providers.iter().find(|p| p.name == name)
    }

    /// Total attempts across providers.
    pub fn attempts(&self) -> u64 {
        self.providers.iter().map(|p| p.success + p.failure).sum()
    }
}
