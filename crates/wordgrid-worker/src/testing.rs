//! Test doubles shared by the unit tests.

use std::{
    future::Future,
    num::NonZeroUsize,
    pin::Pin,
    sync::{Arc, Mutex, PoisonError},
    task::{Context, Poll},
};

use crate::{
    WorkerError,
    backend::{Backend, BackendError},
    dispatcher::Responder,
    observer::{Event, Observer},
};

/// A backend or responder call, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Initialize(Vec<u8>),
    PoolStarted(usize),
    PoolReady(usize),
    Solve { words: Vec<String>, grid: String },
    Respond(String),
}

type CallLog = Arc<Mutex<Vec<Call>>>;

fn record(log: &CallLog, call: Call) {
    log.lock().unwrap_or_else(PoisonError::into_inner).push(call);
}

/// Backend whose behaviour is scripted per test.
///
/// Clones share the call log, so a test can keep one clone and hand the
/// other to the code under test.
#[derive(Debug, Clone, Default)]
pub(crate) struct ScriptedBackend {
    calls: CallLog,
    fail_initialize: bool,
    fail_pool: bool,
    fail_solve: bool,
    panic_on_solve: bool,
    pool_delay: usize,
}

impl ScriptedBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fail_initialize(mut self) -> Self {
        self.fail_initialize = true;
        self
    }

    pub(crate) fn fail_pool(mut self) -> Self {
        self.fail_pool = true;
        self
    }

    pub(crate) fn fail_solve(mut self) -> Self {
        self.fail_solve = true;
        self
    }

    pub(crate) fn panic_on_solve(mut self) -> Self {
        self.panic_on_solve = true;
        self
    }

    /// Makes the runtime future return `Pending` `polls` times before settling.
    pub(crate) fn with_pool_delay(mut self, polls: usize) -> Self {
        self.pool_delay = polls;
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Backend for ScriptedBackend {
    type Grid = &'static str;
    type Output = String;

    async fn initialize(&mut self, module: &[u8]) -> Result<(), BackendError> {
        record(&self.calls, Call::Initialize(module.to_vec()));
        if self.fail_initialize {
            return Err(BackendError::ModuleRejected {
                reason: "scripted".to_owned(),
            });
        }
        Ok(())
    }

    async fn initialize_parallel_runtime(
        &mut self,
        threads: NonZeroUsize,
    ) -> Result<(), BackendError> {
        record(&self.calls, Call::PoolStarted(threads.get()));
        YieldNow(self.pool_delay).await;
        if self.fail_pool {
            return Err(BackendError::RuntimeUnavailable {
                reason: "scripted".to_owned(),
            });
        }
        record(&self.calls, Call::PoolReady(threads.get()));
        Ok(())
    }

    fn solve(&self, wordlist: &[String], grid: &Self::Grid) -> Result<Self::Output, BackendError> {
        record(
            &self.calls,
            Call::Solve {
                words: wordlist.to_vec(),
                grid: (*grid).to_owned(),
            },
        );
        assert!(!self.panic_on_solve, "scripted solve panic");
        if self.fail_solve {
            return Err(BackendError::InvalidInput {
                reason: "scripted".to_owned(),
            });
        }
        Ok(format!("solved {grid}"))
    }
}

/// Returns `Pending` a fixed number of times, waking itself each time.
struct YieldNow(usize);

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.0 == 0 {
            return Poll::Ready(());
        }
        self.0 -= 1;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}

/// Responder that appends to a [`ScriptedBackend`]'s call log.
#[derive(Debug)]
pub(crate) struct RecordingResponder {
    calls: CallLog,
}

impl RecordingResponder {
    pub(crate) fn new(backend: &ScriptedBackend) -> Self {
        Self {
            calls: Arc::clone(&backend.calls),
        }
    }
}

impl Responder<String> for RecordingResponder {
    fn respond(self, output: String) -> Result<(), WorkerError> {
        record(&self.calls, Call::Respond(output));
        Ok(())
    }
}

/// Observer that keeps the rendered events.
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingObserver {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingObserver {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Observer for RecordingObserver {
    fn observe(&self, event: &Event<'_>) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.to_string());
    }
}
