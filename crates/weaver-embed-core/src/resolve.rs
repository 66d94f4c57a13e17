//! URL resolution against the enabled providers.

use std::sync::Arc;

use crate::registry::{DispatchTable, EmbedProvider};

/// The registry filtered down to the providers enabled for this deployment.
#[derive(Debug, Clone)]
pub struct ActiveProviderSet {
    table: Arc<DispatchTable>,
    /// Indexed by provider position in the table's registry.
    enabled: Vec<bool>,
}

/// Result of resolving one URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionOutcome<'u> {
    Matched {
        provider: &'static EmbedProvider,
        /// Capture group 1, borrowed from the URL. `None` when the pattern has
        /// no group.
        id: Option<&'u str>,
    },
    Unmatched,
}

impl<'u> ResolutionOutcome<'u> {
    pub fn provider_name(&self) -> Option<&'static str> {
        match self {
            ResolutionOutcome::Matched { provider, .. } => Some(provider.name),
            ResolutionOutcome::Unmatched => None,
        }
    }
}

impl ActiveProviderSet {
    pub(crate) fn new(table: Arc<DispatchTable>, enabled: Vec<bool>) -> Self {
        Self { table, enabled }
    }

    /// Names of the active providers, in registry order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.table
            .providers()
            .iter()
            .zip(&self.enabled)
            .filter(|(_, enabled)| **enabled)
            .map(|(provider, _)| provider.name)
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.names().any(|n| n == name)
    }

    pub fn is_empty(&self) -> bool {
        !self.enabled.iter().any(|e| *e)
    }

    /// Find the first enabled rule matching `url`.
    ///
    /// Rules are walked in table order (registry order, then declaration
    /// order) and the walk stops at the first hit.
    pub fn resolve<'u>(&self, url: &'u str) -> ResolutionOutcome<'u> {
        for rule in self.table.rules() {
            if !self.enabled[rule.provider_index] {
                continue;
            }
            if let Some(captures) = rule.pattern.captures(url) {
                let id = captures.get(1).map(|m| m.as_str());
                tracing::trace!(provider = rule.provider.name, url, ?id, "resolved embed");
                return ResolutionOutcome::Matched {
                    provider: rule.provider,
                    id,
                };
            }
        }
        ResolutionOutcome::Unmatched
    }
}
