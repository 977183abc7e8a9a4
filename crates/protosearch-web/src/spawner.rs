//! Page side of the browser worker.

use std::{cell::RefCell, rc::Rc};

use protosearch_channel::{
    ChannelError, EventSink, Request, WorkerCommand, WorkerHandle, WorkerInit, WorkerMessage,
    WorkerSpawner,
};
use serde::Serialize;
use tracing::{debug, warn};
use wasm_bindgen::{JsCast, prelude::*};
use web_sys::{ErrorEvent, Event, MessageEvent, Worker, WorkerOptions, WorkerType};

type Notify = Rc<RefCell<Option<Box<dyn Fn()>>>>;

/// Starts the search worker as a dedicated module Web Worker.
///
/// Messages from the worker are forwarded into the channel; the callback set
/// with [`WebWorkerSpawner::on_message`] runs after each one so the page can
/// pump the UI. A worker that fails to start or throws is reported as
/// unavailable.
#[derive(Default, Clone)]
pub struct WebWorkerSpawner {
    notify: Notify,
}

impl WebWorkerSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `callback` after every forwarded worker message.
    pub fn on_message(&self, callback: impl Fn() + 'static) {
        *self.notify.borrow_mut() = Some(Box::new(callback));
    }
}

impl std::fmt::Debug for WebWorkerSpawner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebWorkerSpawner")
            .field("notify", &self.notify.borrow().is_some())
            .finish()
    }
}

impl WorkerSpawner for WebWorkerSpawner {
    fn spawn(
        &self,
        init: WorkerInit,
        events: EventSink,
    ) -> protosearch_channel::Result<Box<dyn WorkerHandle>> {
        let options = WorkerOptions::new();
        options.set_type(WorkerType::Module);
        let worker = Worker::new_with_options(init.url.as_str(), &options)
            .map_err(|e| ChannelError::spawn(describe(&e)))?;

        let outbox = Rc::new(RefCell::new(Outbox::default()));
        let deliver = {
            let notify = Rc::clone(&self.notify);
            Rc::new(move |message: WorkerMessage| {
                if events.send(message).is_err() {
                    return;
                }
                if let Some(callback) = notify.borrow().as_ref() {
                    callback();
                }
            })
        };

        let onmessage = {
            let worker = worker.clone();
            let outbox = Rc::clone(&outbox);
            let deliver = Rc::clone(&deliver);
            Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
                match serde_wasm_bindgen::from_value::<WorkerMessage>(event.data()) {
                    Ok(WorkerMessage::Started) => {
                        let queued = outbox.borrow_mut().start();
                        debug!(queued = queued.len(), "Web worker started");
                        for command in &queued {
                            if let Err(e) = post_command(&worker, command) {
                                warn!(error = %e, "Failed to flush command to worker");
                            }
                        }
                    }
                    Ok(message) => deliver(message),
                    Err(e) => warn!(error = %e, "Ignoring malformed worker message"),
                }
            })
        };
        worker.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));

        let onerror = {
            let deliver = Rc::clone(&deliver);
            Closure::<dyn FnMut(Event)>::new(move |event: Event| {
                let reason = match event.dyn_ref::<ErrorEvent>() {
                    Some(error) if !error.message().is_empty() => error.message(),
                    _ => format!("search worker failed ({})", event.type_()),
                };
                warn!(%reason, "Web worker error");
                deliver(WorkerMessage::Unavailable { reason });
            })
        };
        worker.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        worker.set_onmessageerror(Some(onerror.as_ref().unchecked_ref()));

        let mut handle = WebWorker {
            worker: Some(worker),
            outbox,
            _onmessage: onmessage,
            _onerror: onerror,
        };
        handle.command(WorkerCommand::Start { warmup: init.warmup })?;
        debug!(url = %init.url, "Spawned web worker");

        Ok(Box::new(handle))
    }
}

/// Commands posted before the worker reported [`WorkerMessage::Started`].
///
/// Messages sent to a worker before its script installs a handler are lost,
/// so nothing is posted until the worker says it is listening.
#[derive(Debug, Default)]
pub(crate) struct Outbox {
    started: bool,
    queued: Vec<WorkerCommand>,
}

impl Outbox {
    /// Returns the command if it can be posted now; queues it otherwise.
    pub(crate) fn submit(&mut self, command: WorkerCommand) -> Option<WorkerCommand> {
        if self.started {
            Some(command)
        } else {
            self.queued.push(command);
            None
        }
    }

    /// Mark the worker as listening and return the queued commands in order.
    pub(crate) fn start(&mut self) -> Vec<WorkerCommand> {
        self.started = true;
        std::mem::take(&mut self.queued)
    }
}

struct WebWorker {
    worker: Option<Worker>,
    outbox: Rc<RefCell<Outbox>>,
    _onmessage: Closure<dyn FnMut(MessageEvent)>,
    _onerror: Closure<dyn FnMut(Event)>,
}

impl WebWorker {
    fn command(&mut self, command: WorkerCommand) -> protosearch_channel::Result<()> {
        let worker = self.worker.as_ref().ok_or(ChannelError::Disposed)?;
        let Some(command) = self.outbox.borrow_mut().submit(command) else {
            return Ok(());
        };
        post_command(worker, &command)
    }
}

impl WorkerHandle for WebWorker {
    fn post(&mut self, request: Request) -> protosearch_channel::Result<()> {
        self.command(WorkerCommand::Search(request))
    }

    fn terminate(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.set_onmessage(None);
            worker.set_onerror(None);
            worker.set_onmessageerror(None);
            worker.terminate();
        }
    }
}

impl Drop for WebWorker {
    fn drop(&mut self) {
        self.terminate();
    }
}

fn post_command(worker: &Worker, command: &WorkerCommand) -> protosearch_channel::Result<()> {
    let value = to_js(command).map_err(|e| ChannelError::spawn(describe(&e)))?;
    worker
        .post_message(&value)
        .map_err(|_| ChannelError::WorkerGone)
}

/// Serialize to plain JS objects rather than `Map`s.
pub(crate) fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(JsValue::from)
}

pub(crate) fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}
