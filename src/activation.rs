//! Buffer-then-replay handshake between fragment producers and the registry.
//!
//! Producers call [`FragmentSink::submit`] without knowing whether the
//! registry exists yet. Until the page signals readiness, contributions queue
//! up in submission order; [`Activation::activate`] builds the registry,
//! replays the queue into it, and from then on every submission is forwarded
//! directly. The transition happens once; later triggers are no-ops.
//!
//! All access goes through `&mut self`, so a submission can never land in the
//! middle of a replay.

use crate::descriptor::Contribution;
use crate::query::QueryView;
use crate::registry::Registry;
use tracing::{debug, info, trace};

/// Producer-side handle: hand over a contribution and forget about it.
pub trait FragmentSink {
    fn submit(&mut self, contribution: Contribution);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationState {
    /// Registry not available yet; contributions wait in submission order.
    Buffering { pending: Vec<Contribution> },
    /// Registry live; contributions are registered as they arrive.
    Direct { registry: Registry },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationOutcome {
    /// First trigger: the buffer was replayed into a fresh registry.
    Activated { replayed: usize },
    /// The protocol was already direct; nothing happened.
    AlreadyActive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    state: ActivationState,
}

impl Default for Activation {
    fn default() -> Self {
        Self::new()
    }
}

impl Activation {
    pub fn new() -> Self {
        Self {
            state: ActivationState::Buffering {
                pending: Vec::new(),
            },
        }
    }

    pub fn state(&self) -> &ActivationState {
        &self.state
    }

    pub fn is_direct(&self) -> bool {
        matches!(self.state, ActivationState::Direct { .. })
    }

    /// Contributions still waiting for the registry.
    pub fn pending_len(&self) -> usize {
        match &self.state {
            ActivationState::Buffering { pending } => pending.len(),
            ActivationState::Direct { .. } => 0,
        }
    }

    /// Page-ready signal with a default registry.
    pub fn activate(&mut self) -> ActivationOutcome {
        self.activate_with(Registry::new)
    }

    /// Page-ready signal. `factory` is only invoked on the first trigger.
    pub fn activate_with<F>(&mut self, factory: F) -> ActivationOutcome
    where
        F: FnOnce() -> Registry,
    {
        let pending = match &mut self.state {
            ActivationState::Direct { .. } => {
                debug!("activation triggered again; already forwarding directly");
                return ActivationOutcome::AlreadyActive;
            }
            ActivationState::Buffering { pending } => std::mem::take(pending),
        };

        let mut registry = factory();
        let replayed = pending.len();
        for contribution in pending {
            registry.register(contribution.library, contribution.descriptors);
        }
        self.state = ActivationState::Direct { registry };
        info!(replayed, "registry activated");
        ActivationOutcome::Activated { replayed }
    }

    pub fn query(&self) -> QueryView<'_> {
        match &self.state {
            ActivationState::Direct { registry } => QueryView::new(Some(registry)),
            ActivationState::Buffering { .. } => QueryView::new(None),
        }
    }
}

impl FragmentSink for Activation {
    fn submit(&mut self, contribution: Contribution) {
        match &mut self.state {
            ActivationState::Buffering { pending } => {
                debug!(
                    library = %contribution.library,
                    queued = pending.len() + 1,
                    "registry not ready; buffering contribution"
                );
                pending.push(contribution);
            }
            ActivationState::Direct { registry } => {
                trace!(library = %contribution.library, "forwarding contribution");
                registry.register(contribution.library, contribution.descriptors);
            }
        }
    }
}
