//! Per-listener isolated dispatch.
//!
//! Every listener call is wrapped on its own. A listener that returns an error
//! or panics is recorded in the [`DispatchReport`] and the walk continues with
//! the next listener; nothing is propagated to the producer.

use std::panic::{self, AssertUnwindSafe};

use statekeeper_core::{GameState, ListenerId, StateUpdate};

use crate::error::ListenerError;
use crate::listener::{Registration, StateListener};

/// What happened to one listener during a dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Delivered,
    Failed(ListenerError),
    /// The listener panicked; the payload message is kept when it was a string.
    Panicked(String),
}

impl DispatchOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DispatchOutcome::Delivered)
    }
}

/// Result of one listener invocation, tagged with the listener's identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerOutcome {
    pub listener_id: ListenerId,
    pub listener_name: String,
    pub outcome: DispatchOutcome,
}

/// Aggregated outcome of notifying all listeners for one change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    outcomes: Vec<ListenerOutcome>,
}

impl DispatchReport {
    /// Outcomes in dispatch (registration) order.
    pub fn outcomes(&self) -> &[ListenerOutcome] {
        &self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn delivered(&self) -> usize {
        self.outcomes.iter().filter(|o| o.outcome.is_delivered()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ListenerOutcome> {
        self.outcomes.iter().filter(|o| !o.outcome.is_delivered())
    }

    /// True when every listener accepted the change.
    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }
}

/// Notify each listener in order, isolating failures per listener.
pub fn dispatch(listeners: &[Registration], state: &GameState, update: &StateUpdate) -> DispatchReport {
    let outcomes = listeners
        .iter()
        .map(|registration| {
            let listener = registration.listener();
            let outcome = invoke(listener, state, update);
            ListenerOutcome {
                listener_id: registration.id(),
                listener_name: listener.name().to_string(),
                outcome,
            }
        })
        .collect();

    DispatchReport { outcomes }
}

pub(crate) fn invoke(
    listener: &dyn StateListener,
    state: &GameState,
    update: &StateUpdate,
) -> DispatchOutcome {
    match panic::catch_unwind(AssertUnwindSafe(|| listener.on_state_changed(state, update))) {
        Ok(Ok(())) => DispatchOutcome::Delivered,
        Ok(Err(err)) => DispatchOutcome::Failed(err),
        Err(payload) => DispatchOutcome::Panicked(panic_message(payload.as_ref())),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
