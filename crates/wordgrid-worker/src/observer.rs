//! Structured diagnostics emitted while a worker instance runs.
//!
//! The sequencer and dispatcher never log on their own; they report
//! [`Event`]s to the [`Observer`] they were built with. [`LogObserver`]
//! forwards events to the `log` facade.

use std::{io, num::NonZeroUsize};

use log::Level;

use crate::{WorkerError, bootstrap::BootstrapState, protocol::TaskId};

/// Something that happened inside a worker instance.
#[derive(Debug, Clone, Copy, derive_more::Display)]
pub enum Event<'a> {
    /// The request was accepted.
    #[display("request {} accepted: {words} words, threads {threads:?}", DisplayId(*id))]
    RequestAccepted {
        /// Host identifier, if any.
        id: Option<&'a TaskId>,
        /// Number of candidate words.
        words: usize,
        /// Requested thread count, if any.
        threads: Option<NonZeroUsize>,
    },
    /// The bootstrap state changed.
    #[display("bootstrap {from} -> {to}")]
    StateChanged {
        /// Previous state.
        from: BootstrapState,
        /// New state.
        to: BootstrapState,
    },
    /// The default thread count could not be determined.
    #[display("hardware concurrency unavailable, solving sequentially: {_0}")]
    ConcurrencyUnavailable(&'a io::Error),
    /// The request runs without a parallel runtime.
    #[display("parallel runtime not requested")]
    PoolSkipped,
    /// The backend solve call started.
    #[display("solve started")]
    SolveStarted,
    /// The backend solve call returned a result.
    #[display("solve finished")]
    SolveFinished,
    /// The response was handed to the host channel.
    #[display("response sent")]
    ResponseSent,
    /// The instance failed; no response will be sent.
    #[display("worker failed: {_0}")]
    Failed(&'a WorkerError),
}

impl Event<'_> {
    /// Returns the log level the event is reported at.
    #[must_use]
    pub fn level(&self) -> Level {
        match self {
            Event::RequestAccepted { .. } | Event::ResponseSent => Level::Info,
            Event::ConcurrencyUnavailable(_) => Level::Warn,
            Event::StateChanged { .. } | Event::PoolSkipped => Level::Debug,
            Event::SolveStarted | Event::SolveFinished => Level::Trace,
            Event::Failed(_) => Level::Error,
        }
    }
}

struct DisplayId<'a>(Option<&'a TaskId>);

impl std::fmt::Display for DisplayId<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(id) => write!(f, "{id}"),
            None => f.write_str("<anonymous>"),
        }
    }
}

/// Receives [`Event`]s from a worker instance.
pub trait Observer {
    /// Handles one event.
    fn observe(&self, event: &Event<'_>);
}

impl<T: Observer + ?Sized> Observer for &T {
    fn observe(&self, event: &Event<'_>) {
        (**self).observe(event);
    }
}

/// Observer that writes events to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl Observer for LogObserver {
    fn observe(&self, event: &Event<'_>) {
        log::log!(target: "wordgrid_worker", event.level(), "{event}");
    }
}
