//! Native worker instances backed by a dedicated thread.
//!
//! The thread blocks on the request channel, then drives the dispatcher to
//! completion with a local executor. A failed dispatch is reported on a
//! separate fatal channel, so the host can tell a worker error from a worker
//! that simply went away.

use std::{
    fmt,
    future::Future,
    pin::Pin,
    sync::atomic::{AtomicUsize, Ordering},
    task::{Context, Poll},
    thread,
};

use futures_channel::oneshot;
use futures_executor::block_on;

use crate::{
    HostError, WorkerError,
    backend::Backend,
    config::DispatcherConfig,
    dispatcher::TaskDispatcher,
    observer::Observer,
    protocol::Request,
};

static NEXT_INSTANCE: AtomicUsize = AtomicUsize::new(0);

/// A started worker instance waiting for its request.
///
/// Dropping the handle without posting lets the worker thread exit on its
/// own; [`close`](Self::close) also waits for it.
pub struct WorkerHandle<G, T> {
    instance: usize,
    request_tx: oneshot::Sender<Request<G>>,
    response_rx: oneshot::Receiver<T>,
    fatal_rx: oneshot::Receiver<WorkerError>,
    thread: thread::JoinHandle<()>,
}

impl<G, T> fmt::Debug for WorkerHandle<G, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerHandle")
            .field("instance", &self.instance)
            .finish_non_exhaustive()
    }
}

impl<G, T> WorkerHandle<G, T> {
    /// Returns the process-unique number of this instance.
    #[must_use]
    pub fn instance(&self) -> usize {
        self.instance
    }

    /// Sends the instance its only request.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::WorkerClosed`] if the worker thread is gone.
    pub fn post(self, request: Request<G>) -> Result<PendingResponse<T>, HostError> {
        self.request_tx
            .send(request)
            .map_err(|_| HostError::WorkerClosed)?;
        Ok(PendingResponse {
            instance: self.instance,
            response_rx: self.response_rx,
            fatal_rx: self.fatal_rx,
        })
    }

    /// Shuts the instance down without a request and waits for its thread.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::WorkerClosed`] if the worker thread panicked.
    pub fn close(self) -> Result<(), HostError> {
        let Self {
            instance,
            request_tx,
            thread,
            ..
        } = self;
        drop(request_tx);
        thread.join().map_err(|_| {
            log::warn!("worker {instance} panicked while shutting down");
            HostError::WorkerClosed
        })
    }
}

/// Resolves to the worker's response, or to the reason there is none.
pub struct PendingResponse<T> {
    instance: usize,
    response_rx: oneshot::Receiver<T>,
    fatal_rx: oneshot::Receiver<WorkerError>,
}

impl<T> fmt::Debug for PendingResponse<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingResponse")
            .field("instance", &self.instance)
            .finish_non_exhaustive()
    }
}

impl<T> PendingResponse<T> {
    /// Blocks the current thread until the worker settles.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::WorkerFailed`] if the worker reported a fatal
    /// error, and [`HostError::WorkerClosed`] if it exited without either a
    /// response or an error.
    pub fn wait(self) -> Result<T, HostError> {
        block_on(self)
    }
}

impl<T> Future for PendingResponse<T> {
    type Output = Result<T, HostError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = &mut *self;

        if let Poll::Ready(Ok(output)) = Pin::new(&mut this.response_rx).poll(cx) {
            return Poll::Ready(Ok(output));
        }
        match Pin::new(&mut this.fatal_rx).poll(cx) {
            Poll::Ready(Ok(err)) => Poll::Ready(Err(HostError::WorkerFailed(err))),
            // The response may have landed between the two polls.
            Poll::Ready(Err(oneshot::Canceled)) => match Pin::new(&mut this.response_rx).poll(cx) {
                Poll::Ready(Ok(output)) => Poll::Ready(Ok(output)),
                Poll::Ready(Err(oneshot::Canceled)) => Poll::Ready(Err(HostError::WorkerClosed)),
                Poll::Pending => Poll::Pending,
            },
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Starts a worker instance on a new thread.
///
/// The backend is moved onto the thread and is never shared with another
/// instance.
///
/// # Errors
///
/// Returns [`HostError::SpawnFailed`] if the thread cannot be created.
pub fn spawn<B, O>(
    backend: B,
    config: DispatcherConfig,
    observer: O,
) -> Result<WorkerHandle<B::Grid, B::Output>, HostError>
where
    B: Backend + Send + 'static,
    B::Grid: Send + 'static,
    B::Output: Send + 'static,
    O: Observer + Clone + Send + 'static,
{
    let instance = NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed);
    let (request_tx, request_rx) = oneshot::channel::<Request<B::Grid>>();
    let (response_tx, response_rx) = oneshot::channel();
    let (fatal_tx, fatal_rx) = oneshot::channel();

    let thread = thread::Builder::new()
        .name(format!("wordgrid-worker-{instance}"))
        .spawn(move || {
            let Ok(request) = block_on(request_rx) else {
                log::debug!("worker {instance} dropped before receiving a request");
                return;
            };
            let dispatcher = TaskDispatcher::new(backend, response_tx, observer, config);
            if let Err(err) = block_on(dispatcher.on_request(request)) {
                // Nobody is listening if the host already gave up.
                let _ = fatal_tx.send(err);
            }
        })
        .map_err(|err| HostError::SpawnFailed {
            reason: err.to_string(),
        })?;

    Ok(WorkerHandle {
        instance,
        request_tx,
        response_rx,
        fatal_rx,
        thread,
    })
}

#[cfg(test)]
mod tests {
    use wordgrid_solver::{GridSpec, Solution};

    use super::*;
    use crate::{
        backend::{BackendError, CrosswordBackend, MODULE_HEADER},
        observer::LogObserver,
        testing::{Call, RecordingObserver, ScriptedBackend},
    };

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|&w| w.to_owned()).collect()
    }

    fn square() -> GridSpec {
        GridSpec::new(vec![vec![0, 1], vec![2, 3], vec![0, 2], vec![1, 3]])
    }

    fn cross() -> GridSpec {
        GridSpec::new(vec![vec![0, 1, 2], vec![2, 3, 4]])
    }

    fn run(request: Request<GridSpec>) -> Result<Option<Solution>, HostError> {
        spawn(CrosswordBackend::new(), DispatcherConfig::default(), LogObserver)?
            .post(request)?
            .wait()
    }

    #[test]
    fn test_cat_dog_square_with_four_threads_gets_one_response() {
        let request = Request::new(MODULE_HEADER.as_slice(), words(&["cat", "dog"]), square())
            .with_num_threads(4);

        // No two-letter words: the backend's answer is "no solution", which is
        // still a regular response.
        assert_eq!(run(request), Ok(None));
    }

    #[test]
    fn test_solves_sequentially_and_in_parallel() {
        let sequential = run(Request::new(
            MODULE_HEADER.as_slice(),
            words(&["cat", "tea"]),
            cross(),
        ))
        .unwrap()
        .unwrap();
        assert_eq!(sequential.letters(), ['c', 'a', 't', 'e', 'a']);

        let parallel = run(
            Request::new(MODULE_HEADER.as_slice(), words(&["cat", "tea"]), cross())
                .with_num_threads(3)
                .with_id("parallel"),
        )
        .unwrap();
        assert_eq!(parallel, Some(sequential));
    }

    #[test]
    fn test_rejected_module_is_fatal() {
        let request = Request::new(b"\x7fELF".as_slice(), words(&["cat"]), cross());

        assert_eq!(
            run(request),
            Err(HostError::WorkerFailed(WorkerError::Initialization {
                source: BackendError::ModuleRejected {
                    reason: "image is 4 bytes, shorter than the header".to_owned(),
                },
            }))
        );
    }

    #[test]
    fn test_invalid_grid_is_fatal() {
        let request = Request::new(MODULE_HEADER.as_slice(), words(&["cat"]), GridSpec::default());

        assert!(matches!(
            run(request),
            Err(HostError::WorkerFailed(WorkerError::Solve {
                source: BackendError::InvalidInput { .. }
            }))
        ));
    }

    #[test]
    fn test_instances_are_independent() {
        let handles = (0..2)
            .map(|_| spawn(CrosswordBackend::new(), DispatcherConfig::default(), LogObserver))
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_ne!(handles[0].instance(), handles[1].instance());

        let pending = handles
            .into_iter()
            .map(|handle| {
                let request =
                    Request::new(MODULE_HEADER.as_slice(), words(&["cat", "tea"]), cross())
                        .with_num_threads(2);
                handle.post(request).unwrap()
            })
            .collect::<Vec<_>>();

        let results = pending
            .into_iter()
            .map(PendingResponse::wait)
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert!(results[0].is_some());
        assert_eq!(results[0], results[1]);
    }

    #[test]
    fn test_solve_panic_closes_worker() {
        let backend = ScriptedBackend::new().panic_on_solve();
        let handle = spawn(backend.clone(), DispatcherConfig::default(), RecordingObserver::new())
            .unwrap();

        let result = handle
            .post(Request::new(b"module".as_slice(), words(&["cat"]), "2x2"))
            .unwrap()
            .wait();
        assert_eq!(result, Err(HostError::WorkerClosed));
        assert!(!backend.calls().iter().any(|call| matches!(call, Call::Respond(_))));
    }

    #[test]
    fn test_worker_error_reaches_host_with_observer_trace() {
        let observer = RecordingObserver::new();
        let handle = spawn(
            ScriptedBackend::new().fail_pool(),
            DispatcherConfig::default(),
            observer.clone(),
        )
        .unwrap();

        let result = handle
            .post(Request::new(b"module".as_slice(), words(&["cat"]), "2x2").with_num_threads(2))
            .unwrap()
            .wait();
        assert!(matches!(
            result,
            Err(HostError::WorkerFailed(WorkerError::PoolInitialization { .. }))
        ));
        assert!(
            observer
                .messages()
                .last()
                .is_some_and(|m| m.starts_with("worker failed: parallel runtime"))
        );
    }

    #[test]
    fn test_closing_unposted_worker_never_touches_backend() {
        let backend = ScriptedBackend::new();
        let observer = RecordingObserver::new();
        let handle = spawn(backend.clone(), DispatcherConfig::default(), observer.clone()).unwrap();

        assert_eq!(handle.close(), Ok(()));
        assert!(backend.calls().is_empty());
        assert!(observer.messages().is_empty());
    }

    #[test]
    fn test_malformed_grid_is_a_solve_failure() {
        for slot in [usize::MAX, 1 << 50] {
            let request = Request::new(
                MODULE_HEADER.as_slice(),
                words(&["cat"]),
                GridSpec::new(vec![vec![slot]]),
            )
            .with_num_threads(2);

            assert_eq!(
                run(request),
                Err(HostError::WorkerFailed(WorkerError::Solve {
                    source: BackendError::InvalidInput {
                        reason: format!("word 0 uses slot {slot}, but slot indices must be below 1"),
                    },
                })),
            );
        }
    }
}
