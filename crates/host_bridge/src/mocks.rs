//! In-memory host transport for tests and headless builds.
//!
//! [`MockTransport`] records every invocation, answers through a configurable handler, keeps
//! registered callbacks so tests can push payloads into them, and can emulate the event plugin
//! so `listen`/`emit` round trips work without a host.

use std::{
    cell::{Cell, RefCell},
    collections::{BTreeMap, BTreeSet, VecDeque},
    fmt,
};

use serde_json::{json, Value};

use crate::{
    core::{file_src_url, FileSrcStyle},
    error::{HostError, HostResult},
    event::EventId,
    transport::{
        CallbackId, HostCallback, HostFuture, HostMetadata, HostTransport, InvokeOptions,
    },
};

/// Answers one invocation: `Ok` resolves, `Err` rejects with the given payload.
pub type MockHandler = Box<dyn FnMut(&str, &Value) -> Result<Value, Value>>;

/// One invocation seen by a [`MockTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// Command string.
    pub command: String,
    /// Serialized arguments.
    pub args: Value,
    /// Per-call options, if any.
    pub options: Option<InvokeOptions>,
}

struct RegisteredCallback {
    callback: HostCallback,
    once: bool,
}

#[derive(Debug, Clone)]
struct MockListener {
    event: String,
    target: Value,
    handler: CallbackId,
}

/// Scriptable [`HostTransport`] that never leaves the process.
pub struct MockTransport {
    handler: RefCell<Option<MockHandler>>,
    calls: RefCell<Vec<RecordedCall>>,
    callbacks: RefCell<BTreeMap<CallbackId, RegisteredCallback>>,
    dispatching: RefCell<BTreeSet<CallbackId>>,
    next_callback_id: Cell<CallbackId>,
    metadata: RefCell<HostMetadata>,
    windows: RefCell<Vec<String>>,
    constants: RefCell<BTreeMap<(String, String), Value>>,
    file_src_style: Cell<FileSrcStyle>,
    tasks: RefCell<VecDeque<HostFuture<'static, ()>>>,
    emulate_events: Cell<bool>,
    listeners: RefCell<BTreeMap<EventId, MockListener>>,
    next_event_id: Cell<EventId>,
}

impl fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockTransport")
            .field("calls", &self.calls.borrow().len())
            .field("callbacks", &self.callbacks.borrow().len())
            .field("metadata", &self.metadata.borrow())
            .field("emulate_events", &self.emulate_events.get())
            .finish_non_exhaustive()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    /// Transport that resolves every command with `null`, current window `main`.
    pub fn new() -> Self {
        Self {
            handler: RefCell::new(None),
            calls: RefCell::new(Vec::new()),
            callbacks: RefCell::new(BTreeMap::new()),
            dispatching: RefCell::new(BTreeSet::new()),
            next_callback_id: Cell::new(1),
            metadata: RefCell::new(HostMetadata::for_window("main")),
            windows: RefCell::new(Vec::new()),
            constants: RefCell::new(BTreeMap::new()),
            file_src_style: Cell::new(FileSrcStyle::CustomScheme),
            tasks: RefCell::new(VecDeque::new()),
            emulate_events: Cell::new(false),
            listeners: RefCell::new(BTreeMap::new()),
            next_event_id: Cell::new(1),
        }
    }

    /// Transport answering through `handler`.
    pub fn with_handler(
        handler: impl FnMut(&str, &Value) -> Result<Value, Value> + 'static,
    ) -> Self {
        let mock = Self::new();
        mock.set_handler(handler);
        mock
    }

    /// Handles `plugin:event|*` commands in memory instead of forwarding them to the handler.
    pub fn with_event_emulation(self) -> Self {
        self.emulate_events.set(true);
        self
    }

    /// Replaces the invocation handler.
    pub fn set_handler(&self, handler: impl FnMut(&str, &Value) -> Result<Value, Value> + 'static) {
        *self.handler.borrow_mut() = Some(Box::new(handler));
    }

    /// Sets the current window label and the list answered for `plugin:window|get_all_windows`.
    pub fn mock_windows(&self, current: &str, additional: &[&str]) {
        *self.metadata.borrow_mut() = HostMetadata::for_window(current);
        let mut windows = vec![current.to_string()];
        windows.extend(additional.iter().map(|label| label.to_string()));
        *self.windows.borrow_mut() = windows;
    }

    /// Publishes a plugin constant.
    pub fn set_plugin_constant(&self, plugin: &str, key: &str, value: Value) {
        self.constants
            .borrow_mut()
            .insert((plugin.to_string(), key.to_string()), value);
    }

    /// Selects the URL layout used by `convert_file_src`.
    pub fn set_file_src_style(&self, style: FileSrcStyle) {
        self.file_src_style.set(style);
    }

    /// All invocations so far, oldest first.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }

    /// Drains the recorded invocations.
    pub fn take_calls(&self) -> Vec<RecordedCall> {
        std::mem::take(&mut *self.calls.borrow_mut())
    }

    /// Returns whether `id` is still registered.
    pub fn has_callback(&self, id: CallbackId) -> bool {
        self.callbacks.borrow().contains_key(&id) || self.dispatching.borrow().contains(&id)
    }

    /// Number of live callback registrations.
    pub fn callback_count(&self) -> usize {
        self.callbacks.borrow().len()
    }

    /// Delivers `payload` to callback `id` the way the host would.
    ///
    /// Returns `false` when nothing is registered under `id`.
    pub fn deliver(&self, id: CallbackId, payload: Value) -> bool {
        let Some(mut entry) = self.callbacks.borrow_mut().remove(&id) else {
            return false;
        };
        self.dispatching.borrow_mut().insert(id);
        (entry.callback)(payload);
        let still_registered = self.dispatching.borrow_mut().remove(&id);
        if still_registered && !entry.once {
            self.callbacks.borrow_mut().insert(id, entry);
        }
        true
    }

    /// Emits `event` to every emulated listener registered for it.
    ///
    /// Returns the number of listeners reached.
    pub fn emit_event(&self, event: &str, payload: Value) -> usize {
        self.dispatch_event(event, &payload, None)
    }

    /// Number of tasks queued through `spawn_local`.
    pub fn pending_tasks(&self) -> usize {
        self.tasks.borrow().len()
    }

    /// Runs queued tasks, including any they queue in turn, until none remain.
    pub async fn run_pending_tasks(&self) {
        loop {
            let next = self.tasks.borrow_mut().pop_front();
            let Some(task) = next else {
                break;
            };
            task.await;
        }
    }

    fn answer(&self, command: &str, args: &Value) -> Result<Value, Value> {
        if self.emulate_events.get() {
            if let Some(answer) = self.answer_event_command(command, args) {
                return answer;
            }
        }
        if command == "plugin:window|get_all_windows" && !self.windows.borrow().is_empty() {
            return Ok(Value::from(self.windows.borrow().clone()));
        }
        match self.handler.borrow_mut().as_mut() {
            Some(handler) => handler(command, args),
            None => Ok(Value::Null),
        }
    }

    fn answer_event_command(&self, command: &str, args: &Value) -> Option<Result<Value, Value>> {
        let event = args.get("event").and_then(Value::as_str).unwrap_or_default();
        match command {
            "plugin:event|listen" => {
                let Some(handler) = args
                    .get("handler")
                    .and_then(Value::as_u64)
                    .and_then(|id| CallbackId::try_from(id).ok())
                else {
                    return Some(Err(json!("listen requires a numeric handler id")));
                };
                let id = self.next_event_id.get();
                self.next_event_id.set(id + 1);
                self.listeners.borrow_mut().insert(
                    id,
                    MockListener {
                        event: event.to_string(),
                        target: args.get("target").cloned().unwrap_or(Value::Null),
                        handler,
                    },
                );
                Some(Ok(json!(id)))
            }
            "plugin:event|unlisten" => {
                if let Some(id) = args
                    .get("eventId")
                    .and_then(Value::as_u64)
                    .and_then(|id| EventId::try_from(id).ok())
                {
                    self.listeners.borrow_mut().remove(&id);
                }
                Some(Ok(Value::Null))
            }
            "plugin:event|emit" => {
                let payload = args.get("payload").cloned().unwrap_or(Value::Null);
                self.dispatch_event(event, &payload, None);
                Some(Ok(Value::Null))
            }
            "plugin:event|emit_to" => {
                let payload = args.get("payload").cloned().unwrap_or(Value::Null);
                self.dispatch_event(event, &payload, args.get("target"));
                Some(Ok(Value::Null))
            }
            _ => None,
        }
    }

    fn dispatch_event(&self, event: &str, payload: &Value, target: Option<&Value>) -> usize {
        let matching: Vec<(EventId, CallbackId)> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(_, listener)| listener.event == event)
            .filter(|(_, listener)| target.map_or(true, |t| targets_overlap(&listener.target, t)))
            .map(|(id, listener)| (*id, listener.handler))
            .collect();

        matching
            .into_iter()
            .filter(|(id, handler)| {
                self.deliver(
                    *handler,
                    json!({ "event": event, "id": id, "payload": payload }),
                )
            })
            .count()
    }
}

fn targets_overlap(listener: &Value, emitted: &Value) -> bool {
    let kind = |v: &Value| v.get("kind").and_then(Value::as_str).map(str::to_string);
    if matches!(kind(listener).as_deref(), None | Some("Any")) {
        return true;
    }
    let listener_label = listener.get("label");
    listener_label.is_some() && listener_label == emitted.get("label")
}

impl HostTransport for MockTransport {
    fn invoke<'a>(
        &'a self,
        command: &'a str,
        args: Value,
        options: Option<&'a InvokeOptions>,
    ) -> HostFuture<'a, HostResult<Value>> {
        self.calls.borrow_mut().push(RecordedCall {
            command: command.to_string(),
            args: args.clone(),
            options: options.cloned(),
        });
        let answer = self.answer(command, &args);
        Box::pin(async move {
            answer.map_err(|payload| HostError::Rejected {
                command: command.to_string(),
                payload,
            })
        })
    }

    fn transform_callback(&self, callback: HostCallback, once: bool) -> CallbackId {
        let id = self.next_callback_id.get();
        self.next_callback_id.set(id + 1);
        self.callbacks
            .borrow_mut()
            .insert(id, RegisteredCallback { callback, once });
        id
    }

    fn unregister_callback(&self, id: CallbackId) {
        self.callbacks.borrow_mut().remove(&id);
        self.dispatching.borrow_mut().remove(&id);
    }

    fn convert_file_src(&self, path: &str, protocol: &str) -> String {
        file_src_url(path, protocol, self.file_src_style.get())
    }

    fn metadata(&self) -> HostMetadata {
        self.metadata.borrow().clone()
    }

    fn plugin_constant(&self, plugin: &str, key: &str) -> Option<Value> {
        self.constants
            .borrow()
            .get(&(plugin.to_string(), key.to_string()))
            .cloned()
    }

    fn spawn_local(&self, task: HostFuture<'static, ()>) {
        self.tasks.borrow_mut().push_back(task);
    }
}
