//! Dedicated web worker entry point.
//!
//! The worker accepts the first message it receives as its request and
//! ignores the rest. The response is posted back as the plain backend result.
//! A failure is thrown as an uncaught exception, which the host observes on
//! the worker's `onerror` handler.

use std::{cell::Cell, rc::Rc};

use log::{Level, LevelFilter, Log, Metadata, Record};
use serde::Serialize;
use wasm_bindgen::{JsCast, JsValue, closure::Closure, throw_str};
use web_sys::{DedicatedWorkerGlobalScope, MessageEvent};
use wordgrid_solver::GridSpec;

use crate::{
    WorkerError,
    backend::CrosswordBackend,
    config::DispatcherConfig,
    dispatcher::{Responder, TaskDispatcher},
    observer::LogObserver,
    protocol::Request,
};

struct PostMessage {
    scope: DedicatedWorkerGlobalScope,
}

impl<T: Serialize> Responder<T> for PostMessage {
    fn respond(self, output: T) -> Result<(), WorkerError> {
        // `None` must reach the host as `null`, not `undefined`.
        let serializer = serde_wasm_bindgen::Serializer::json_compatible();
        let value = output
            .serialize(&serializer)
            .map_err(|err| WorkerError::Delivery {
                reason: err.to_string(),
            })?;
        self.scope
            .post_message(&value)
            .map_err(|err| WorkerError::Delivery {
                reason: format!("postMessage failed: {err:?}"),
            })
    }
}

/// Installs the request handler on the current worker scope.
pub fn start(config: DispatcherConfig) {
    let scope = js_sys::global().unchecked_into::<DedicatedWorkerGlobalScope>();
    let scope_for_callback = scope.clone();
    let accepted = Rc::new(Cell::new(false));

    let onmessage = Closure::wrap(Box::new(move |event: MessageEvent| {
        if accepted.replace(true) {
            log::warn!("worker already has a request, dropping message");
            return;
        }
        let request = match serde_wasm_bindgen::from_value::<Request<GridSpec>>(event.data()) {
            Ok(request) => request,
            Err(err) => throw_str(&format!("malformed request: {err}")),
        };
        let responder = PostMessage {
            scope: scope_for_callback.clone(),
        };
        wasm_bindgen_futures::spawn_local(async move {
            let dispatcher =
                TaskDispatcher::new(CrosswordBackend::new(), responder, LogObserver, config);
            if let Err(err) = dispatcher.on_request(request).await {
                throw_str(&err.to_string());
            }
        });
    }) as Box<dyn FnMut(MessageEvent)>);

    scope.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
    onmessage.forget();
}

/// `log` backend writing to the browser console.
#[derive(Debug)]
pub struct ConsoleLogger {
    level: LevelFilter,
}

static LOGGER: ConsoleLogger = ConsoleLogger {
    level: LevelFilter::Info,
};

impl ConsoleLogger {
    /// Installs the console logger as the global `log` backend.
    ///
    /// Does nothing if a logger is already installed.
    pub fn init() {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(LOGGER.level);
        }
    }
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let message = JsValue::from_str(&format!("[{}] {}", record.target(), record.args()));
        match record.level() {
            Level::Error => web_sys::console::error_1(&message),
            Level::Warn => web_sys::console::warn_1(&message),
            Level::Info => web_sys::console::info_1(&message),
            Level::Debug | Level::Trace => web_sys::console::debug_1(&message),
        }
    }

    fn flush(&self) {}
}
