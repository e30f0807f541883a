//! Worker bootstrap and dispatch for the word grid solver.
//!
//! A worker instance is an isolated execution context that answers exactly
//! one [`Request`]. On arrival it loads the backend module, starts the
//! parallel runtime if more than one thread was asked for, solves, and posts
//! the backend's result back to the host. Any failure along the way is fatal
//! to the instance: no response is sent and the error is raised on the
//! context's error channel instead.
//!
//! The moving parts are:
//!
//! - [`BootstrapSequencer`]: ordered bring-up of a [`Backend`].
//! - [`TaskDispatcher`]: the request/response exchange.
//! - [`platform`]: the execution context, a thread natively and a dedicated
//!   web worker on `wasm32`.
//!
//! # Examples
//!
//! ```
//! # #[cfg(not(target_arch = "wasm32"))]
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use wordgrid_solver::GridSpec;
//! use wordgrid_worker::{
//!     CrosswordBackend, DispatcherConfig, LogObserver, MODULE_HEADER, Request, platform,
//! };
//!
//! let worker = platform::spawn(CrosswordBackend::new(), DispatcherConfig::default(), LogObserver)?;
//! let grid: GridSpec = "0 1 2\n2 3 4".parse()?;
//! let request = Request::new(
//!     MODULE_HEADER.as_slice(),
//!     vec!["cat".to_owned(), "tea".to_owned()],
//!     grid,
//! )
//! .with_num_threads(2);
//!
//! let solution = worker.post(request)?.wait()?.expect("grid should be solvable");
//! assert_eq!(solution.letters(), ['c', 'a', 't', 'e', 'a']);
//! # Ok(())
//! # }
//! # #[cfg(target_arch = "wasm32")]
//! # fn main() {}
//! ```

pub use self::{
    backend::{
        Backend, BackendError, CrosswordBackend, MODULE_HEADER, PARALLEL_RUNTIME_SUPPORTED,
    },
    bootstrap::{BootstrapSequencer, BootstrapState, BootstrapStep},
    config::{DefaultThreads, DispatcherConfig, ExecutionPlan},
    dispatcher::{Responder, TaskDispatcher},
    error::{HostError, WorkerError},
    observer::{Event, LogObserver, Observer},
    protocol::{ModuleImage, Request, RequestError, TaskId},
};

pub mod backend;
pub mod bootstrap;
pub mod config;
pub mod dispatcher;
mod error;
pub mod observer;
pub mod platform;
pub mod protocol;

#[cfg(test)]
mod testing;
