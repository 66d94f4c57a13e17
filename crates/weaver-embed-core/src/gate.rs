//! The one-shot enablement gate.
//!
//! The gate is a small state machine:
//!
//! ```text
//! Uninitialized --begin--> Pending --succeed--> Ready(ActiveProviderSet)
//!                             |
//!                             +--fail--> Pending (for the rest of the session)
//! ```
//!
//! A failed fetch is not retried and is not surfaced to the user: the gate
//! stays `Pending`, nothing is ever scanned, and the content keeps its plain
//! links. It fails closed.

use std::sync::Arc;

use crate::config::PlatformConfig;
use crate::error::EmbedError;
use crate::registry::DispatchTable;
use crate::resolve::ActiveProviderSet;

/// Observable phase of the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatePhase {
    Uninitialized,
    Pending,
    Ready,
}

#[derive(Debug)]
enum GateState {
    Uninitialized,
    Pending,
    Ready(ActiveProviderSet),
}

#[derive(Debug)]
pub struct EnablementGate {
    table: Arc<DispatchTable>,
    state: GateState,
}

impl EnablementGate {
    pub fn new(table: Arc<DispatchTable>) -> Self {
        Self {
            table,
            state: GateState::Uninitialized,
        }
    }

    pub fn phase(&self) -> GatePhase {
        match self.state {
            GateState::Uninitialized => GatePhase::Uninitialized,
            GateState::Pending => GatePhase::Pending,
            GateState::Ready(_) => GatePhase::Ready,
        }
    }

    /// Claim the single fetch. Returns `false` if a fetch was already started.
    pub fn begin(&mut self) -> bool {
        match self.state {
            GateState::Uninitialized => {
                self.state = GateState::Pending;
                true
            }
            _ => false,
        }
    }

    /// Apply the fetch result.
    ///
    /// Success moves a pending gate to `Ready`. Failure leaves it pending.
    /// Results arriving in any other phase are ignored.
    pub fn complete(
        &mut self,
        result: Result<Vec<PlatformConfig>, EmbedError>,
    ) -> Option<&ActiveProviderSet> {
        if !matches!(self.state, GateState::Pending) {
            tracing::debug!(phase = ?self.phase(), "ignoring embed config result");
            return None;
        }
        match result {
            Ok(configs) => {
                let active = self.table.activate(&configs);
                tracing::debug!(
                    active = ?active.names().collect::<Vec<_>>(),
                    "embed platforms loaded"
                );
                self.state = GateState::Ready(active);
                self.active()
            }
            Err(err) => {
                tracing::warn!(error = %err, "embed config unavailable, embeds disabled");
                None
            }
        }
    }

    pub fn active(&self) -> Option<&ActiveProviderSet> {
        match &self.state {
            GateState::Ready(active) => Some(active),
            _ => None,
        }
    }
}
