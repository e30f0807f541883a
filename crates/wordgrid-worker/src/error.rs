use std::num::NonZeroUsize;

use crate::{
    backend::BackendError,
    bootstrap::{BootstrapState, BootstrapStep},
    protocol::RequestError,
};

/// Fatal failure of a worker instance.
///
/// A worker that fails never sends a response; the error travels on the
/// execution context's fatal channel instead.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum WorkerError {
    /// The request broke the message contract.
    #[display("invalid request: {_0}")]
    InvalidRequest(RequestError),
    /// The backend module could not be loaded.
    #[display("backend initialization failed: {source}")]
    Initialization {
        /// Backend rejection.
        source: BackendError,
    },
    /// The parallel runtime could not be started.
    #[display("parallel runtime initialization with {threads} threads failed: {source}")]
    PoolInitialization {
        /// Requested runtime size.
        threads: NonZeroUsize,
        /// Backend rejection.
        source: BackendError,
    },
    /// The backend failed while solving.
    #[display("solve failed: {source}")]
    Solve {
        /// Backend failure.
        source: BackendError,
    },
    /// A bring-up step was attempted in a state that does not allow it.
    #[display("{step} is not allowed in state {state}")]
    OutOfOrder {
        /// The attempted step.
        step: BootstrapStep,
        /// State at the time of the attempt.
        state: BootstrapState,
    },
    /// The backend was requested before reaching the required state.
    #[display("backend is {state}, {target} required")]
    NotReady {
        /// Current state.
        state: BootstrapState,
        /// Required state.
        target: BootstrapState,
    },
    /// An earlier bring-up step already failed.
    #[display("bootstrap already failed")]
    BootstrapFailed,
    /// The response could not be handed to the host.
    #[display("response delivery failed: {reason}")]
    Delivery {
        /// Why delivery failed.
        reason: String,
    },
}

impl From<RequestError> for WorkerError {
    fn from(err: RequestError) -> Self {
        Self::InvalidRequest(err)
    }
}

/// Failure observed by a host waiting on a worker instance.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum HostError {
    /// The execution context could not be started.
    #[display("failed to start worker: {reason}")]
    SpawnFailed {
        /// Why the context could not be started.
        reason: String,
    },
    /// The worker reported a fatal error.
    #[display("worker failed: {_0}")]
    WorkerFailed(WorkerError),
    /// The worker went away without a response or an error.
    #[display("worker closed without a response")]
    WorkerClosed,
}
