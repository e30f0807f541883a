//! Wordgrid web worker entry point.
//!
//! This binary is built only for WASM targets. Each worker instance answers
//! one solve request.

#[cfg(target_arch = "wasm32")]
mod wasm32 {
    use wasm_bindgen::prelude::*;
    use wordgrid_worker::{
        DispatcherConfig,
        platform::{self, ConsoleLogger},
    };

    /// Installs logging and the request handler.
    #[wasm_bindgen(start)]
    pub(crate) fn start() {
        ConsoleLogger::init();
        platform::start(DispatcherConfig::default());
    }
}

fn main() {}
