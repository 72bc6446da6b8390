//! The batch aggregation façade and backend contract.

use super::listener::{CctListener, ListenerSet};
use super::session::ProfilingSession;
use crate::cct::CctNode;
use crate::utils::error::EngineError;
use log::{error, trace};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

/// Mode-specific aggregation backend.
///
/// One implementation per profiling mode (sampled CPU stacks,
/// allocations, ...). The [`CallGraphBuilder`] façade owns the backend
/// and calls the hooks in lifecycle order: `on_startup`, then
/// `prepare_batch` / `record`* / `finalize_batch` cycles, with
/// `discard` on reset and `on_shutdown` at teardown.
pub trait GraphBackend: Send {
    /// Shape of one recorded profiling event
    type Event;

    /// Called once when the session is bound
    fn on_startup(&mut self, session: &Arc<ProfilingSession>) -> Result<(), EngineError>;

    /// Called at every batch start, before any event of that batch
    fn prepare_batch(&mut self) -> Result<(), EngineError>;

    /// Fold one event into the aggregate.
    ///
    /// Returns true if the aggregate was mutated; this drives the
    /// batch dirty flag and therefore the `empty` value listeners see.
    fn record(&mut self, event: Self::Event) -> bool;

    /// Called at batch stop, before listeners are notified
    fn finalize_batch(&mut self) -> Result<(), EngineError>;

    /// Discard all accumulated state
    fn discard(&mut self) -> Result<(), EngineError>;

    /// Called once at shutdown, after the session handle is cleared
    fn on_shutdown(&mut self) -> Result<(), EngineError>;

    /// Current aggregate root, None before the first recorded event
    fn root(&self) -> Option<&CctNode>;
}

struct BatchState<B> {
    backend: B,
    session: Weak<ProfilingSession>,
    after_batch: Vec<Box<dyn FnOnce() + Send>>,
    batch_dirty: bool,
    in_batch: bool,
    shut_down: bool,
}

/// Batched call-graph builder.
///
/// Drives a [`GraphBackend`] through the batch lifecycle and notifies
/// registered [`CctListener`]s at batch completion and on reset.
///
/// Thread model: batch operations (`on_batch_start`, `record`,
/// `on_batch_stop`, `reset`, `startup`, `shutdown`) serialize on an
/// internal lock and may be called from any thread, but batches must
/// not overlap; listener registration uses a separate lock and never
/// blocks on an in-flight batch.
pub struct CallGraphBuilder<B: GraphBackend> {
    state: Mutex<BatchState<B>>,
    listeners: ListenerSet,
}

impl<B: GraphBackend> CallGraphBuilder<B> {
    pub fn new(backend: B) -> Self {
        Self {
            state: Mutex::new(BatchState {
                backend,
                session: Weak::new(),
                after_batch: Vec::new(),
                batch_dirty: false,
                in_batch: false,
                shut_down: false,
            }),
            listeners: ListenerSet::new(),
        }
    }

    /// Bind the profiling session and connect the backend.
    ///
    /// The builder keeps only a weak reference; session ownership stays
    /// with the caller. Fails with [`EngineError::SessionShutDown`]
    /// once `shutdown` has run.
    pub fn startup(&self, session: &Arc<ProfilingSession>) -> Result<(), EngineError> {
        let mut state = self.lock_state();
        if state.shut_down {
            return Err(EngineError::SessionShutDown);
        }
        state.session = Arc::downgrade(session);
        state.backend.on_startup(session)
    }

    /// The bound session, or None after shutdown or once the owner
    /// dropped it
    pub fn session(&self) -> Option<Arc<ProfilingSession>> {
        self.lock_state().session.upgrade()
    }

    /// Open a new batch: clears the deferred-command queue, resets the
    /// dirty flag and prepares the backend.
    pub fn on_batch_start(&self) -> Result<(), EngineError> {
        let mut state = self.lock_state();
        if state.in_batch {
            return Err(EngineError::BatchInProgress);
        }
        trace!("Starting batch");

        state.after_batch.clear();
        state.batch_dirty = false;
        state.backend.prepare_batch()?;
        state.in_batch = true;
        Ok(())
    }

    /// Fold one event into the current batch
    pub fn record(&self, event: B::Event) {
        let mut state = self.lock_state();
        if state.backend.record(event) {
            state.batch_dirty = true;
        }
    }

    /// Schedule a command to run strictly after this batch's completion
    /// notification, in FIFO order. The queue is cleared at every batch
    /// start and on shutdown.
    pub fn enqueue_after_batch(&self, command: impl FnOnce() + Send + 'static) {
        self.lock_state().after_batch.push(Box::new(command));
    }

    /// Close the current batch: finalizes the backend, notifies
    /// listeners with the aggregate root and the empty flag, then
    /// drains the deferred-command queue.
    ///
    /// If the backend has no root yet (nothing was ever recorded) the
    /// notification is skipped; deferred commands still run.
    pub fn on_batch_stop(&self) -> Result<(), EngineError> {
        let mut state = self.lock_state();
        state.backend.finalize_batch()?;

        let empty = !state.batch_dirty;
        state.in_batch = false;
        let commands: Vec<_> = state.after_batch.drain(..).collect();

        if let Some(root) = state.backend.root() {
            for listener in self.listeners.snapshot() {
                listener.cct_established(root, empty);
            }
        }
        drop(state);

        for command in commands {
            command();
        }

        trace!("Finishing batch");
        Ok(())
    }

    /// Discard accumulated state and notify listeners.
    ///
    /// The reset notification is unconditional and independent of the
    /// dirty flag, but only fires when the backend discard succeeds: a
    /// failed discard is logged and swallowed, and a partial reset is
    /// never announced as complete.
    pub fn reset(&self) {
        trace!("Resetting call graph builder");

        let mut state = self.lock_state();
        match state.backend.discard() {
            Ok(()) => {
                drop(state);
                for listener in self.listeners.snapshot() {
                    listener.cct_reset();
                }
            }
            Err(e) => {
                error!("Failed to discard accumulated results: {}", e);
            }
        }
    }

    /// Tear the pipeline down: clears the session handle and the
    /// deferred-command queue, then disconnects the backend. No
    /// notification is fired.
    pub fn shutdown(&self) -> Result<(), EngineError> {
        let mut state = self.lock_state();
        state.session = Weak::new();
        state.after_batch.clear();
        state.in_batch = false;
        state.shut_down = true;
        state.backend.on_shutdown()
    }

    pub fn add_listener(&self, listener: Arc<dyn CctListener>) -> bool {
        self.listeners.add(listener)
    }

    pub fn remove_listener(&self, listener: &Arc<dyn CctListener>) -> bool {
        self.listeners.remove(listener)
    }

    pub fn remove_all_listeners(&self) {
        self.listeners.clear();
    }

    /// Run a closure against the backend, for inspection after replay
    pub fn with_backend<R>(&self, f: impl FnOnce(&B) -> R) -> R {
        f(&self.lock_state().backend)
    }

    fn lock_state(&self) -> MutexGuard<'_, BatchState<B>> {
        // Poisoning can only come from a panicking listener or backend;
        // the state fields themselves stay consistent.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
