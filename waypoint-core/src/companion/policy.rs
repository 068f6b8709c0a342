//! Candidate ordering.

use super::stats::ProviderStats;
use crate::config::{CompanionConfig, PolicyName};
use std::cmp::Ordering;

/// How the engine orders configured providers before each resolution.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SelectionPolicy {
    /// Configured priority order
    #[default]
    Fixed,
    /// Highest historical success rate first; ties keep priority order
    SuccessRate,
    /// The named provider first, the rest in priority order
    Preferred(String),
}

impl SelectionPolicy {
    pub fn from_config(config: &CompanionConfig) -> Self {
        match (config.policy, config.preferred) {
            (PolicyName::Fixed, _) => SelectionPolicy::Fixed,
            (PolicyName::SuccessRate, _) => SelectionPolicy::SuccessRate,
            (PolicyName::Preferred, Some(kind)) => {
                SelectionPolicy::Preferred(kind.as_str().to_string())
            }
            (PolicyName::Preferred, None) => {
                tracing::warn!("Preferred policy without a provider, using fixed order");
                SelectionPolicy::Fixed
            }
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SelectionPolicy::Fixed => "fixed",
            SelectionPolicy::SuccessRate => "success_rate",
            SelectionPolicy::Preferred(_) => "preferred",
        }
    }

    /// Indexes into `names` in the order they should be attempted.
    pub fn order(&self, names: &[&str], stats: &ProviderStats) -> Vec<usize> {
        let mut order: Vec<usize> = (0..names.len()).collect();
        match self {
            SelectionPolicy::Fixed => {}
            SelectionPolicy::SuccessRate => {
                let rates: Vec<f64> = order.iter().map(|&i| stats.success_rate(i)).collect();
                // sort_by is stable, so equal rates keep priority order
                order.sort_by(|&a, &b| {
                    rates[b].partial_cmp(&rates[a]).unwrap_or(Ordering::Equal)
                });
            }
            SelectionPolicy::Preferred(preferred) => {
                if let Some(pos) = names.iter().position(|name| *name == preferred.as_str()) {
                    let index = order.remove(pos);
                    order.insert(0, index);
                }
            }
        }
        order
    }
}
