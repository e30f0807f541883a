//! One-shot request handling for a worker instance.
//!
//! [`TaskDispatcher::on_request`] is a single continuation chain:
//! module bring-up, optional runtime bring-up, solve, respond. Each phase
//! starts only after the previous one has settled, so a response can never
//! overtake the solve that produced it.

use futures_channel::oneshot;

use crate::{
    WorkerError,
    backend::Backend,
    bootstrap::BootstrapSequencer,
    config::{DispatcherConfig, ExecutionPlan},
    observer::{Event, Observer},
    protocol::Request,
};

/// The channel a worker uses to send its one response.
///
/// `respond` consumes the responder, so at most one response can be sent.
pub trait Responder<T> {
    /// Sends the response to the host.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::Delivery`] if the host can no longer be
    /// reached or the payload cannot be encoded.
    fn respond(self, output: T) -> Result<(), WorkerError>;
}

impl<T> Responder<T> for oneshot::Sender<T> {
    fn respond(self, output: T) -> Result<(), WorkerError> {
        self.send(output).map_err(|_| WorkerError::Delivery {
            reason: "host dropped the response channel".to_owned(),
        })
    }
}

/// Owns the request/response exchange of one worker instance.
#[derive(Debug)]
pub struct TaskDispatcher<B, O, R> {
    sequencer: BootstrapSequencer<B, O>,
    observer: O,
    responder: R,
    config: DispatcherConfig,
}

impl<B, O, R> TaskDispatcher<B, O, R>
where
    B: Backend,
    O: Observer + Clone,
    R: Responder<B::Output>,
{
    /// Creates a dispatcher for a fresh backend.
    pub fn new(backend: B, responder: R, observer: O, config: DispatcherConfig) -> Self {
        Self {
            sequencer: BootstrapSequencer::new(backend, observer.clone()),
            observer,
            responder,
            config,
        }
    }

    /// Handles the instance's only request.
    ///
    /// On success exactly one response has been sent when this returns. On
    /// failure no response is sent and the error is returned for the
    /// execution context to report on its fatal channel.
    ///
    /// # Errors
    ///
    /// Returns the [`WorkerError`] of the first phase that failed.
    pub async fn on_request(self, request: Request<B::Grid>) -> Result<(), WorkerError> {
        let observer = self.observer.clone();
        let result = self.run(request).await;
        if let Err(err) = &result {
            observer.observe(&Event::Failed(err));
        }
        result
    }

    async fn run(mut self, request: Request<B::Grid>) -> Result<(), WorkerError> {
        let requested = request.validate()?;
        self.observer.observe(&Event::RequestAccepted {
            id: request.id.as_ref(),
            words: request.wordlist.len(),
            threads: requested,
        });
        let plan = ExecutionPlan::resolve(requested, &self.config, &self.observer);

        self.sequencer
            .ensure_module_ready(request.module.as_bytes())
            .await?;
        match plan.pool_threads() {
            Some(threads) => self.sequencer.ensure_pool_ready(threads).await?,
            None => self.observer.observe(&Event::PoolSkipped),
        }

        let backend = self.sequencer.backend(plan.target_state())?;
        self.observer.observe(&Event::SolveStarted);
        let output = backend
            .solve(&request.wordlist, &request.grid)
            .map_err(|source| WorkerError::Solve { source })?;
        self.observer.observe(&Event::SolveFinished);

        self.responder.respond(output)?;
        self.observer.observe(&Event::ResponseSent);
        Ok(())
    }
}
