//! Queued listener dispatch on a background thread.
//!
//! A slow listener (typically a blocking persistence write) runs inside the
//! producer's cycle when registered directly. Wrapping it in a
//! [`QueuedListener`] moves the work to a dedicated thread fed by a bounded
//! queue:
//!
//! - delivery order equals update order (single FIFO consumer)
//! - a full queue blocks the producer instead of dropping changes
//! - failures of the wrapped listener are logged by the worker, never
//!   surfaced to the engine

use std::sync::mpsc::{self, Receiver, SyncSender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use tracing::{debug, error, warn};

use statekeeper_core::{GameState, StateUpdate};

use crate::dispatch::{DispatchOutcome, invoke};
use crate::error::ListenerError;
use crate::listener::StateListener;

enum Message {
    Deliver(Box<(GameState, StateUpdate)>),
    Shutdown,
}

/// Send side shared by the listener and its handle.
///
/// The flag and the send happen under one lock, so once `Shutdown` is queued
/// no `Deliver` can be accepted behind it.
#[derive(Debug)]
struct Gate {
    closed: Mutex<bool>,
}

impl Gate {
    fn send(&self, sender: &SyncSender<Message>, message: Message) -> Result<(), ListenerError> {
        let closed = self.closed.lock().unwrap_or_else(PoisonError::into_inner);
        if *closed {
            return Err(ListenerError::QueueClosed);
        }
        sender.send(message).map_err(|_| ListenerError::QueueClosed)
    }

    fn close(&self, sender: &SyncSender<Message>) {
        let mut closed = self.closed.lock().unwrap_or_else(PoisonError::into_inner);
        if !*closed {
            *closed = true;
            let _ = sender.send(Message::Shutdown);
        }
    }
}

/// Listener that forwards changes to a worker thread.
pub struct QueuedListener {
    name: String,
    sender: SyncSender<Message>,
    gate: Arc<Gate>,
}

impl core::fmt::Debug for QueuedListener {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("QueuedListener").field("name", &self.name).finish()
    }
}

/// Handle to stop and join the worker behind a [`QueuedListener`].
#[derive(Debug)]
pub struct QueueHandle {
    name: String,
    sender: SyncSender<Message>,
    gate: Arc<Gate>,
    join: Option<thread::JoinHandle<usize>>,
}

impl QueueHandle {
    /// Deliver everything already queued, stop the worker, and wait for it.
    ///
    /// Returns how many changes the worker delivered. Sends through the
    /// listener from this point on fail with [`ListenerError::QueueClosed`].
    pub fn shutdown(mut self) -> usize {
        self.gate.close(&self.sender);
        let delivered = match self.join.take().map(thread::JoinHandle::join) {
            Some(Ok(delivered)) => delivered,
            Some(Err(_)) => {
                error!(worker = %self.name, "queued listener worker died");
                0
            }
            None => 0,
        };
        debug!(worker = %self.name, delivered, "queued listener stopped");
        delivered
    }
}

impl QueuedListener {
    /// Spawn the worker thread for `inner` with a queue of `capacity` changes.
    pub fn spawn<L>(
        name: impl Into<String>,
        capacity: usize,
        inner: L,
    ) -> std::io::Result<(QueuedListener, QueueHandle)>
    where
        L: StateListener + 'static,
    {
        let name = name.into();
        let (sender, receiver) = mpsc::sync_channel::<Message>(capacity);
        let gate = Arc::new(Gate {
            closed: Mutex::new(false),
        });

        let worker_name = name.clone();
        let join = thread::Builder::new()
            .name(format!("listener-{name}"))
            .spawn(move || worker_loop(&worker_name, receiver, &inner))?;

        let listener = QueuedListener {
            name: name.clone(),
            sender: sender.clone(),
            gate: gate.clone(),
        };
        let handle = QueueHandle {
            name,
            sender,
            gate,
            join: Some(join),
        };
        Ok((listener, handle))
    }
}

impl StateListener for QueuedListener {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_state_changed(&self, state: &GameState, update: &StateUpdate) -> Result<(), ListenerError> {
        self.gate.send(
            &self.sender,
            Message::Deliver(Box::new((state.clone(), update.clone()))),
        )
    }
}

fn worker_loop<L>(name: &str, receiver: Receiver<Message>, inner: &L) -> usize
where
    L: StateListener,
{
    let mut delivered = 0;

    for message in receiver.iter() {
        match message {
            Message::Deliver(change) => {
                if deliver(name, inner, *change) {
                    delivered += 1;
                }
            }
            Message::Shutdown => break,
        }
    }

    // The gate keeps anything from landing after `Shutdown`; deliver it anyway
    // if it does.
    for message in receiver.try_iter() {
        if let Message::Deliver(change) = message {
            warn!(worker = name, "change queued after shutdown; delivering");
            if deliver(name, inner, *change) {
                delivered += 1;
            }
        }
    }

    delivered
}

fn deliver<L>(name: &str, inner: &L, (state, update): (GameState, StateUpdate)) -> bool
where
    L: StateListener,
{
    match invoke(inner, &state, &update) {
        DispatchOutcome::Delivered => true,
        DispatchOutcome::Failed(err) => {
            warn!(worker = name, error = %err, "queued listener failed");
            false
        }
        DispatchOutcome::Panicked(reason) => {
            error!(worker = name, panic = %reason, "queued listener panicked");
            false
        }
    }
}
