//! Ordered bring-up of a backend.
//!
//! A worker instance passes through
//! `Uninitialized -> ModuleReady -> PoolReady` at most once, and drops into
//! `Failed` as soon as a step is rejected. `Failed` is terminal: the backend
//! is never called again.

use std::num::NonZeroUsize;

use crate::{
    WorkerError,
    backend::Backend,
    observer::{Event, Observer},
};

/// Bring-up progress of one worker instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::IsVariant)]
pub enum BootstrapState {
    /// Nothing has been loaded yet.
    #[display("uninitialized")]
    Uninitialized,
    /// The backend module is loaded; solve may run single-threaded.
    #[display("module-ready")]
    ModuleReady,
    /// The parallel runtime is running as well.
    #[display("pool-ready")]
    PoolReady,
    /// A step was rejected. Terminal.
    #[display("failed")]
    Failed,
}

impl BootstrapState {
    /// Returns `true` if the state satisfies `target`.
    ///
    /// `Failed` satisfies nothing, and nothing satisfies `Failed`.
    #[must_use]
    pub fn reaches(self, target: Self) -> bool {
        match (self, target) {
            (Self::Failed, _) | (_, Self::Failed) => false,
            (Self::PoolReady, _)
            | (Self::ModuleReady, Self::ModuleReady | Self::Uninitialized)
            | (Self::Uninitialized, Self::Uninitialized) => true,
            (Self::ModuleReady, Self::PoolReady) | (Self::Uninitialized, _) => false,
        }
    }
}

/// A bring-up step, used to report out-of-order calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum BootstrapStep {
    /// Loading the backend module.
    #[display("module initialization")]
    Module,
    /// Starting the parallel runtime.
    #[display("parallel runtime initialization")]
    Pool,
}

/// Drives a [`Backend`] through its initialization steps.
///
/// Each step suspends until the backend's future settles; no step starts
/// before the previous one has completed.
#[derive(Debug)]
pub struct BootstrapSequencer<B, O> {
    backend: B,
    observer: O,
    state: BootstrapState,
    pool_threads: Option<NonZeroUsize>,
}

impl<B, O> BootstrapSequencer<B, O>
where
    B: Backend,
    O: Observer,
{
    /// Creates a sequencer for a fresh backend.
    pub fn new(backend: B, observer: O) -> Self {
        Self {
            backend,
            observer,
            state: BootstrapState::Uninitialized,
            pool_threads: None,
        }
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> BootstrapState {
        self.state
    }

    /// Returns the backend once it has reached `target`.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::BootstrapFailed`] after a failed step, and
    /// [`WorkerError::NotReady`] if `target` has not been reached yet.
    pub fn backend(&self, target: BootstrapState) -> Result<&B, WorkerError> {
        if self.state.is_failed() {
            return Err(WorkerError::BootstrapFailed);
        }
        if !self.state.reaches(target) {
            return Err(WorkerError::NotReady {
                state: self.state,
                target,
            });
        }
        Ok(&self.backend)
    }

    /// Loads the backend module.
    ///
    /// Completes immediately if the module is already loaded.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::Initialization`] if the backend rejects the
    /// image, and [`WorkerError::BootstrapFailed`] if an earlier step failed.
    pub async fn ensure_module_ready(&mut self, module: &[u8]) -> Result<(), WorkerError> {
        match self.state {
            BootstrapState::Failed => return Err(WorkerError::BootstrapFailed),
            BootstrapState::ModuleReady | BootstrapState::PoolReady => return Ok(()),
            BootstrapState::Uninitialized => {}
        }

        match self.backend.initialize(module).await {
            Ok(()) => {
                self.transition(BootstrapState::ModuleReady);
                Ok(())
            }
            Err(source) => {
                self.transition(BootstrapState::Failed);
                Err(WorkerError::Initialization { source })
            }
        }
    }

    /// Starts the backend's parallel runtime with `threads` contexts.
    ///
    /// Completes immediately if the runtime already runs with the same size.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::PoolInitialization`] if the backend cannot start
    /// the runtime, [`WorkerError::OutOfOrder`] if the module is not loaded or
    /// the runtime already runs with another size, and
    /// [`WorkerError::BootstrapFailed`] if an earlier step failed.
    pub async fn ensure_pool_ready(&mut self, threads: NonZeroUsize) -> Result<(), WorkerError> {
        match self.state {
            BootstrapState::Failed => return Err(WorkerError::BootstrapFailed),
            BootstrapState::PoolReady if self.pool_threads == Some(threads) => return Ok(()),
            BootstrapState::Uninitialized | BootstrapState::PoolReady => {
                let state = self.state;
                self.transition(BootstrapState::Failed);
                return Err(WorkerError::OutOfOrder {
                    step: BootstrapStep::Pool,
                    state,
                });
            }
            BootstrapState::ModuleReady => {}
        }

        match self.backend.initialize_parallel_runtime(threads).await {
            Ok(()) => {
                self.pool_threads = Some(threads);
                self.transition(BootstrapState::PoolReady);
                Ok(())
            }
            Err(source) => {
                self.transition(BootstrapState::Failed);
                Err(WorkerError::PoolInitialization { threads, source })
            }
        }
    }

    fn transition(&mut self, to: BootstrapState) {
        let from = self.state;
        self.state = to;
        self.observer.observe(&Event::StateChanged { from, to });
    }
}
