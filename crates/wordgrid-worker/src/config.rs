//! Dispatcher configuration and per-request execution plans.

use std::{io, num::NonZeroUsize, thread};

use serde::{Deserialize, Serialize};

use crate::{
    bootstrap::BootstrapState,
    observer::{Event, Observer},
};

/// Thread count used when a request does not carry `numThreads`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DefaultThreads {
    /// Solve on the worker thread only.
    #[default]
    Sequential,
    /// Use the available hardware concurrency.
    HardwareConcurrency,
    /// Use a fixed number of threads.
    Fixed(NonZeroUsize),
}

impl DefaultThreads {
    fn resolve(self) -> io::Result<NonZeroUsize> {
        match self {
            Self::Sequential => Ok(NonZeroUsize::MIN),
            Self::HardwareConcurrency => thread::available_parallelism(),
            Self::Fixed(n) => Ok(n),
        }
    }
}

/// Settings shared by every request a dispatcher handles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DispatcherConfig {
    /// Thread count for requests without `numThreads`.
    pub default_threads: DefaultThreads,
}

/// How one request will run, decided once before bring-up starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionPlan {
    threads: NonZeroUsize,
}

impl ExecutionPlan {
    /// Resolves the plan for a request.
    ///
    /// An explicit thread count always wins; otherwise the configured default
    /// applies. If the hardware concurrency cannot be determined the request
    /// runs single-threaded and `observer` is told why.
    #[must_use]
    pub fn resolve<O>(
        requested: Option<NonZeroUsize>,
        config: &DispatcherConfig,
        observer: &O,
    ) -> Self
    where
        O: Observer + ?Sized,
    {
        let threads = requested.unwrap_or_else(|| {
            config.default_threads.resolve().unwrap_or_else(|err| {
                observer.observe(&Event::ConcurrencyUnavailable(&err));
                NonZeroUsize::MIN
            })
        });
        Self { threads }
    }

    /// Returns `true` if the backend's parallel runtime must be started.
    #[must_use]
    pub fn use_parallel_runtime(&self) -> bool {
        self.threads.get() > 1
    }

    /// Returns the runtime size, or `None` for a single-threaded solve.
    #[must_use]
    pub fn pool_threads(&self) -> Option<NonZeroUsize> {
        self.use_parallel_runtime().then_some(self.threads)
    }

    /// Returns the state the backend must reach before solving.
    #[must_use]
    pub fn target_state(&self) -> BootstrapState {
        if self.use_parallel_runtime() {
            BootstrapState::PoolReady
        } else {
            BootstrapState::ModuleReady
        }
    }
}
