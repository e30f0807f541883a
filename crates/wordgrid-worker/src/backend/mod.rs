//! The computational backend a worker instance drives.
//!
//! The dispatcher only ever talks to a backend through [`Backend`]: it loads
//! the module, optionally starts the parallel runtime, and calls the blocking
//! solve entry point. Everything behind those three calls is opaque to it.

use std::{future::Future, num::NonZeroUsize};

pub use self::crossword::{CrosswordBackend, MODULE_HEADER, PARALLEL_RUNTIME_SUPPORTED};

mod crossword;

/// A computational engine that must be brought up before it can solve.
///
/// Implementations are driven by one worker instance at a time and are never
/// shared between instances.
pub trait Backend {
    /// Puzzle shape passed through from the request.
    type Grid;
    /// Result forwarded verbatim to the host.
    type Output;

    /// Loads the backend module from its compiled image.
    fn initialize(&mut self, module: &[u8]) -> impl Future<Output = Result<(), BackendError>>;

    /// Starts the parallel runtime with `threads` execution contexts.
    ///
    /// Only called after [`initialize`](Self::initialize) succeeded.
    fn initialize_parallel_runtime(
        &mut self,
        threads: NonZeroUsize,
    ) -> impl Future<Output = Result<(), BackendError>>;

    /// Solves the puzzle, blocking the calling thread until done.
    fn solve(&self, wordlist: &[String], grid: &Self::Grid) -> Result<Self::Output, BackendError>;
}

/// Errors reported by a [`Backend`].
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum BackendError {
    /// The module image was malformed or incompatible.
    #[display("module rejected: {reason}")]
    ModuleRejected {
        /// Why the image was rejected.
        reason: String,
    },
    /// The parallel runtime could not be started.
    #[display("parallel runtime unavailable: {reason}")]
    RuntimeUnavailable {
        /// Why the runtime failed to start.
        reason: String,
    },
    /// The wordlist or grid could not be used.
    #[display("invalid input: {reason}")]
    InvalidInput {
        /// What was wrong with the input.
        reason: String,
    },
    /// A call was made before the module was loaded.
    #[display("module is not initialized")]
    NotInitialized,
}
