//! State synchronization engine.
//!
//! The engine owns the canonical [`GameState`], applies incoming updates in
//! call order, and notifies registered listeners whenever an update changed
//! the state.
//!
//! ## Processing cycle
//!
//! ```text
//! producer → process_update(update)
//!              ├─ merge (GameState::apply_update)
//!              ├─ unchanged → return false
//!              └─ changed   → stamp last_changed_at
//!                             → dispatch to listeners (isolated, in order)
//!                             → return true
//! ```
//!
//! ## Concurrency
//!
//! The engine is safe to share between threads. The state lock is held for
//! the whole merge-plus-dispatch, so concurrent producers are serialized and
//! every listener sees a fully applied state. Listeners must not call back
//! into the engine that is notifying them; doing so deadlocks.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use statekeeper_core::{GameState, ListenerId, StateUpdate, UpdateKind};

use crate::dispatch::{DispatchOutcome, DispatchReport, dispatch};
use crate::listener::{ListenerRegistry, StateListener};
use crate::summary::StateSummary;

/// Result of processing one update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutcome {
    pub changed: bool,
    /// Present only when the state changed and listeners were notified.
    pub report: Option<DispatchReport>,
}

impl ProcessOutcome {
    fn unchanged() -> Self {
        Self {
            changed: false,
            report: None,
        }
    }
}

#[derive(Debug)]
struct Tracked {
    state: GameState,
    last_changed_at: Option<DateTime<Utc>>,
}

impl Tracked {
    /// Stamp a change, never moving backwards even if the wall clock does.
    fn stamp(&mut self, now: DateTime<Utc>) -> DateTime<Utc> {
        let stamped = match self.last_changed_at {
            Some(previous) if previous > now => previous,
            _ => now,
        };
        self.last_changed_at = Some(stamped);
        stamped
    }
}

/// Owner of the canonical game state.
pub struct SyncEngine {
    tracked: Mutex<Tracked>,
    listeners: RwLock<ListenerRegistry>,
}

impl Default for SyncEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("state", &self.lock_tracked().state)
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl SyncEngine {
    /// Engine starting from the zero state (`"Unknown"`, empty inventory)
    /// with no listeners.
    pub fn new() -> Self {
        Self::with_initial_state(GameState::default())
    }

    /// Engine starting from a restored state.
    pub fn with_initial_state(state: GameState) -> Self {
        info!(
            location = state.location(),
            item_count = state.inventory().len(),
            "sync engine initialized"
        );
        Self {
            tracked: Mutex::new(Tracked {
                state,
                last_changed_at: None,
            }),
            listeners: RwLock::new(ListenerRegistry::new()),
        }
    }

    /// Register a listener; it is notified after every state-changing update.
    pub fn add_listener(&self, listener: impl StateListener + 'static) -> ListenerId {
        self.add_shared_listener(Arc::new(listener))
    }

    pub fn add_shared_listener(&self, listener: Arc<dyn StateListener>) -> ListenerId {
        let name = listener.name().to_string();
        let id = self
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .register(listener);
        debug!(listener = %name, listener_id = %id, "listener registered");
        id
    }

    /// Remove a listener. Returns `false` if the id is unknown.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let removed = self
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .unregister(id);
        if removed {
            debug!(listener_id = %id, "listener removed");
        }
        removed
    }

    pub fn listener_count(&self) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Apply one update and report whether the state changed.
    ///
    /// Never fails: listener errors are logged and isolated.
    pub fn process_update(&self, update: StateUpdate) -> bool {
        self.process_update_with_report(update).changed
    }

    /// Like [`SyncEngine::process_update`], also returning per-listener results.
    pub fn process_update_with_report(&self, update: StateUpdate) -> ProcessOutcome {
        if update.kind() == UpdateKind::Noop {
            debug!(reasoning = update.reasoning(), "noop update");
            return ProcessOutcome::unchanged();
        }

        let mut tracked = self.lock_tracked();
        if !tracked.state.apply_update(&update) {
            debug!(
                kind = %update.kind(),
                reasoning = update.reasoning(),
                "update left state unchanged"
            );
            return ProcessOutcome::unchanged();
        }

        let changed_at = tracked.stamp(Utc::now());
        info!(
            kind = %update.kind(),
            reasoning = update.reasoning(),
            location = update.new_location(),
            item_count = update.inventory_items().map(<[_]>::len),
            changed_at = %changed_at,
            "state updated"
        );

        let listeners = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot();
        let report = dispatch(&listeners, &tracked.state, &update);
        drop(tracked);

        log_failures(&report);

        ProcessOutcome {
            changed: true,
            report: Some(report),
        }
    }

    /// Owned copy of the current state; later updates are not visible through it.
    pub fn current_state(&self) -> GameState {
        self.lock_tracked().state.clone()
    }

    /// When the state last changed, if it ever did during this process.
    pub fn last_changed_at(&self) -> Option<DateTime<Utc>> {
        self.lock_tracked().last_changed_at
    }

    pub fn summary(&self) -> StateSummary {
        let tracked = self.lock_tracked();
        StateSummary::project(&tracked.state, tracked.last_changed_at)
    }

    // Listener panics are caught in dispatch, so poisoning only follows a bug
    // in the engine itself; the state is still a consistent snapshot then.
    fn lock_tracked(&self) -> MutexGuard<'_, Tracked> {
        self.tracked.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn log_failures(report: &DispatchReport) {
    for failure in report.failures() {
        match &failure.outcome {
            DispatchOutcome::Failed(err) => warn!(
                listener = %failure.listener_name,
                listener_id = %failure.listener_id,
                error = %err,
                "listener failed"
            ),
            DispatchOutcome::Panicked(message) => error!(
                listener = %failure.listener_name,
                listener_id = %failure.listener_id,
                panic = %message,
                "listener panicked"
            ),
            DispatchOutcome::Delivered => {}
        }
    }
}
