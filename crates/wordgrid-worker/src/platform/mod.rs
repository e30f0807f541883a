//! Execution contexts that host one worker instance each.
//!
//! Natively an instance is a dedicated thread; on `wasm32` it is the dedicated
//! web worker the module was loaded into.

#[cfg(not(target_arch = "wasm32"))]
mod native;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(not(target_arch = "wasm32"))]
pub use native::{PendingResponse, WorkerHandle, spawn};
#[cfg(target_arch = "wasm32")]
pub use wasm::{ConsoleLogger, start};
