//! State listener contract and registry.
//!
//! A listener is a consumer that wants to know when the canonical state has
//! changed: a persistence sink writing the snapshot to a key-value store, a
//! logger recording `{timestamp, state, update}`, a UI bridge, and so on.
//!
//! ## Identity
//!
//! Listeners are identified by the [`ListenerId`] handed out at registration,
//! not by value. Two closures with identical behavior registered twice are two
//! listeners, and each can be removed independently.
//!
//! ## Ordering
//!
//! The registry keeps registration order; dispatch walks it front to back.

use std::sync::Arc;

use statekeeper_core::{GameState, ListenerId, StateUpdate};

use crate::error::ListenerError;

/// Consumer notified after a state-changing update.
///
/// Implementations receive the fully applied state by reference and must not
/// keep it beyond the call; clone what needs to outlive it. Returning an error
/// never affects the engine or other listeners.
///
/// ## Thread Safety
///
/// The trait requires `Send + Sync` so an engine can be shared across threads.
/// Calls for a single engine never overlap.
pub trait StateListener: Send + Sync {
    /// Short name used in logs and dispatch reports.
    fn name(&self) -> &str {
        "anonymous"
    }

    fn on_state_changed(&self, state: &GameState, update: &StateUpdate) -> Result<(), ListenerError>;
}

impl<F> StateListener for F
where
    F: Fn(&GameState, &StateUpdate) -> Result<(), ListenerError> + Send + Sync,
{
    fn on_state_changed(&self, state: &GameState, update: &StateUpdate) -> Result<(), ListenerError> {
        self(state, update)
    }
}

/// A closure listener with a name for logs.
pub struct NamedListener<F> {
    name: String,
    f: F,
}

impl<F> NamedListener<F>
where
    F: Fn(&GameState, &StateUpdate) -> Result<(), ListenerError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self { name: name.into(), f }
    }
}

impl<F> core::fmt::Debug for NamedListener<F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NamedListener").field("name", &self.name).finish()
    }
}

impl<F> StateListener for NamedListener<F>
where
    F: Fn(&GameState, &StateUpdate) -> Result<(), ListenerError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn on_state_changed(&self, state: &GameState, update: &StateUpdate) -> Result<(), ListenerError> {
        (self.f)(state, update)
    }
}

/// A registered listener together with its id.
#[derive(Clone)]
pub struct Registration {
    id: ListenerId,
    listener: Arc<dyn StateListener>,
}

impl Registration {
    pub fn id(&self) -> ListenerId {
        self.id
    }

    pub fn listener(&self) -> &dyn StateListener {
        self.listener.as_ref()
    }
}

impl core::fmt::Debug for Registration {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Registration")
            .field("id", &self.id)
            .field("name", &self.listener.name())
            .finish()
    }
}

/// Ordered set of listeners owned by one engine instance.
#[derive(Debug, Default, Clone)]
pub struct ListenerRegistry {
    entries: Vec<Registration>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a listener and return its id.
    pub fn register(&mut self, listener: Arc<dyn StateListener>) -> ListenerId {
        let id = ListenerId::new();
        self.entries.push(Registration { id, listener });
        id
    }

    /// Remove a listener by id. Returns `false` if it was not registered.
    pub fn unregister(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|r| r.id != id);
        self.entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> Vec<ListenerId> {
        self.entries.iter().map(|r| r.id).collect()
    }

    /// Cheap copy of the current registrations, in registration order.
    pub fn snapshot(&self) -> Vec<Registration> {
        self.entries.clone()
    }
}
