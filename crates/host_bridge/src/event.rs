//! Named event subscription and publishing through the host event plugin.

use std::fmt;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    client::HostClient,
    error::{HostError, HostResult},
    transport::{CallbackId, HostCallback},
};

/// Host-assigned identifier of one event listener.
pub type EventId = u32;

/// Well-known events emitted by the host runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TauriEvent {
    /// A window was resized.
    WindowResized,
    /// A window was moved.
    WindowMoved,
    /// A window close was requested.
    WindowCloseRequested,
    /// A window was destroyed.
    WindowDestroyed,
    /// A window gained focus.
    WindowFocus,
    /// A window lost focus.
    WindowBlur,
    /// A window's scale factor changed.
    WindowScaleFactorChanged,
    /// The system theme changed.
    WindowThemeChanged,
    /// A window was created.
    WindowCreated,
    /// A webview was created.
    WebviewCreated,
    /// A drag entered a webview.
    DragEnter,
    /// A drag moved over a webview.
    DragOver,
    /// A drag was dropped on a webview.
    DragDrop,
    /// A drag left a webview.
    DragLeave,
}

impl TauriEvent {
    /// Wire name of the event.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WindowResized => "tauri://resize",
            Self::WindowMoved => "tauri://move",
            Self::WindowCloseRequested => "tauri://close-requested",
            Self::WindowDestroyed => "tauri://destroyed",
            Self::WindowFocus => "tauri://focus",
            Self::WindowBlur => "tauri://blur",
            Self::WindowScaleFactorChanged => "tauri://scale-change",
            Self::WindowThemeChanged => "tauri://theme-changed",
            Self::WindowCreated => "tauri://window-created",
            Self::WebviewCreated => "tauri://webview-created",
            Self::DragEnter => "tauri://drag-enter",
            Self::DragOver => "tauri://drag-over",
            Self::DragDrop => "tauri://drag-drop",
            Self::DragLeave => "tauri://drag-leave",
        }
    }
}

impl fmt::Display for TauriEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recipient filter for emitted or listened events.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum EventTarget {
    /// Every target.
    #[default]
    Any,
    /// Any window, webview or webview window with this label.
    AnyLabel {
        /// Target label.
        label: String,
    },
    /// The application itself.
    App,
    /// A window.
    Window {
        /// Window label.
        label: String,
    },
    /// A webview.
    Webview {
        /// Webview label.
        label: String,
    },
    /// A webview window.
    WebviewWindow {
        /// Webview window label.
        label: String,
    },
}

impl From<&str> for EventTarget {
    fn from(label: &str) -> Self {
        Self::AnyLabel {
            label: label.to_string(),
        }
    }
}

impl From<String> for EventTarget {
    fn from(label: String) -> Self {
        Self::AnyLabel { label }
    }
}

/// Event delivered to a listener.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event<T> {
    /// Event name.
    pub event: String,
    /// Id of the listener the event was delivered to.
    pub id: EventId,
    /// Event payload.
    pub payload: T,
}

/// Options for [`listen`] and [`once`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListenOptions {
    /// Restricts deliveries to one target. Defaults to [`EventTarget::Any`].
    pub target: Option<EventTarget>,
}

impl ListenOptions {
    /// Options targeting `target`.
    pub fn target(target: impl Into<EventTarget>) -> Self {
        Self {
            target: Some(target.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Registration {
    event: String,
    event_id: EventId,
    handler: CallbackId,
}

/// Handle returned by [`listen`]; drop it to keep listening, call [`EventListener::unlisten`]
/// to stop.
#[derive(Debug, Clone)]
pub struct EventListener {
    client: HostClient,
    registrations: Vec<Registration>,
}

impl EventListener {
    /// Ids the host assigned to the underlying registrations.
    pub fn event_ids(&self) -> Vec<EventId> {
        self.registrations.iter().map(|r| r.event_id).collect()
    }

    /// Stops deliveries immediately and removes every registration from the host.
    ///
    /// # Errors
    ///
    /// Returns the first host rejection; remaining registrations are still removed.
    pub async fn unlisten(self) -> HostResult<()> {
        for registration in &self.registrations {
            self.client.unregister_callback(registration.handler);
        }
        let mut first_error = None;
        for registration in &self.registrations {
            let result = unlisten_remote(&self.client, &registration.event, registration.event_id)
                .await;
            if let Err(err) = result {
                log::warn!("unlisten {} failed: {err}", registration.event);
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    pub(crate) fn merge(mut self, other: EventListener) -> Self {
        self.registrations.extend(other.registrations);
        self
    }
}

async fn unlisten_remote(client: &HostClient, event: &str, event_id: EventId) -> HostResult<()> {
    client
        .invoke(
            "plugin:event|unlisten",
            json!({ "event": event, "eventId": event_id }),
        )
        .await
}

fn decoding_callback<T: DeserializeOwned + 'static>(
    event: &str,
    mut handler: impl FnMut(Event<T>) + 'static,
) -> HostCallback {
    let event = event.to_string();
    Box::new(move |raw: Value| match serde_json::from_value::<Event<T>>(raw) {
        Ok(decoded) => handler(decoded),
        Err(err) => log::warn!("event {event} payload decode failed: {err}"),
    })
}

async fn register(
    client: &HostClient,
    event: &str,
    callback: HostCallback,
    once: bool,
    options: ListenOptions,
) -> HostResult<EventListener> {
    let target = options.target.unwrap_or_default();
    let handler = client.transform_callback(callback, once);
    let registered: HostResult<EventId> = client
        .invoke(
            "plugin:event|listen",
            json!({ "event": event, "target": target, "handler": handler }),
        )
        .await;
    match registered {
        Ok(event_id) => Ok(EventListener {
            client: client.clone(),
            registrations: vec![Registration {
                event: event.to_string(),
                event_id,
                handler,
            }],
        }),
        Err(err) => {
            client.unregister_callback(handler);
            Err(err)
        }
    }
}

/// Subscribes `handler` to `event`.
///
/// # Errors
///
/// Propagates the host rejection.
pub async fn listen<T: DeserializeOwned + 'static>(
    client: &HostClient,
    event: &str,
    handler: impl FnMut(Event<T>) + 'static,
    options: ListenOptions,
) -> HostResult<EventListener> {
    register(client, event, decoding_callback(event, handler), false, options).await
}

/// Subscribes `handler` to the next occurrence of `event` only.
///
/// The listener removes itself from the host after the first delivery.
///
/// # Errors
///
/// Propagates the host rejection.
pub async fn once<T: DeserializeOwned + 'static>(
    client: &HostClient,
    event: &str,
    handler: impl FnOnce(Event<T>) + 'static,
    options: ListenOptions,
) -> HostResult<EventListener> {
    let weak_client = client.downgrade();
    let event_name = event.to_string();
    let mut handler = Some(handler);
    let callback = decoding_callback(event, move |decoded: Event<T>| {
        let Some(handler) = handler.take() else {
            return;
        };
        if let Some(client) = weak_client.upgrade() {
            let event = event_name.clone();
            let event_id = decoded.id;
            let task_client = client.clone();
            client.spawn_local(async move {
                if let Err(err) = unlisten_remote(&task_client, &event, event_id).await {
                    log::warn!("once listener cleanup for {event} failed: {err}");
                }
            });
        }
        handler(decoded);
    });
    register(client, event, callback, true, options).await
}

/// Emits `event` with `payload` to every target.
///
/// # Errors
///
/// Propagates the host rejection.
pub async fn emit(client: &HostClient, event: &str, payload: impl Serialize) -> HostResult<()> {
    let payload = serde_json::to_value(payload)
        .map_err(|e| HostError::encode("plugin:event|emit", e))?;
    client
        .invoke(
            "plugin:event|emit",
            json!({ "event": event, "payload": payload }),
        )
        .await
}

/// Emits `event` with `payload` to `target` only.
///
/// # Errors
///
/// Propagates the host rejection.
pub async fn emit_to(
    client: &HostClient,
    target: impl Into<EventTarget>,
    event: &str,
    payload: impl Serialize,
) -> HostResult<()> {
    let payload = serde_json::to_value(payload)
        .map_err(|e| HostError::encode("plugin:event|emit_to", e))?;
    client
        .invoke(
            "plugin:event|emit_to",
            json!({ "target": target.into(), "event": event, "payload": payload }),
        )
        .await
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use futures::executor::block_on;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::mocks::MockTransport;

    fn emulated() -> (Rc<MockTransport>, HostClient) {
        let mock = Rc::new(MockTransport::new().with_event_emulation());
        (Rc::clone(&mock), HostClient::from_rc(mock))
    }

    #[test]
    fn event_target_serializes_with_kind_tag() {
        assert_eq!(
            serde_json::to_value(EventTarget::Any).expect("any"),
            json!({"kind": "Any"})
        );
        assert_eq!(
            serde_json::to_value(EventTarget::from("main")).expect("label"),
            json!({"kind": "AnyLabel", "label": "main"})
        );
        assert_eq!(
            serde_json::to_value(EventTarget::WebviewWindow {
                label: "w".to_string()
            })
            .expect("webview window"),
            json!({"kind": "WebviewWindow", "label": "w"})
        );
    }

    #[test]
    fn listen_sends_event_target_and_handler() {
        let mock = Rc::new(MockTransport::with_handler(|_, _| Ok(json!(7))));
        let client = HostClient::from_rc(Rc::clone(&mock));

        let listener = block_on(listen::<Value>(
            &client,
            "file-changed",
            |_| {},
            ListenOptions::default(),
        ))
        .expect("listen");

        let call = &mock.calls()[0];
        assert_eq!(call.command, "plugin:event|listen");
        assert_eq!(call.args["event"], json!("file-changed"));
        assert_eq!(call.args["target"], json!({"kind": "Any"}));
        assert!(call.args["handler"].is_u64());
        assert_eq!(listener.event_ids(), vec![7]);
    }

    #[test]
    fn emitted_events_reach_listener_until_unlisten() {
        let (mock, client) = emulated();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);

        let listener = block_on(listen(
            &client,
            "progress",
            move |event: Event<u32>| sink.borrow_mut().push(event.payload),
            ListenOptions::default(),
        ))
        .expect("listen");

        block_on(emit(&client, "progress", 1)).expect("emit");
        block_on(emit(&client, "progress", 2)).expect("emit");
        block_on(listener.unlisten()).expect("unlisten");
        block_on(emit(&client, "progress", 3)).expect("emit");

        assert_eq!(*seen.borrow(), vec![1, 2]);
        let unlisten = mock
            .calls()
            .into_iter()
            .find(|c| c.command == "plugin:event|unlisten")
            .expect("unlisten call");
        assert_eq!(unlisten.args, json!({"event": "progress", "eventId": 1}));
    }

    #[test]
    fn once_fires_a_single_time_and_cleans_up() {
        let (mock, client) = emulated();
        let hits = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&hits);

        block_on(once(
            &client,
            "ready",
            move |_: Event<Value>| *counter.borrow_mut() += 1,
            ListenOptions::default(),
        ))
        .expect("once");

        assert_eq!(mock.emit_event("ready", Value::Null), 1);
        assert_eq!(mock.emit_event("ready", Value::Null), 0);
        assert_eq!(mock.pending_tasks(), 1);
        block_on(mock.run_pending_tasks());

        assert_eq!(*hits.borrow(), 1);
        assert!(mock
            .calls()
            .iter()
            .any(|c| c.command == "plugin:event|unlisten"));
    }

    #[test]
    fn emit_to_wraps_string_targets_as_any_label() {
        let (mock, client) = emulated();

        block_on(emit_to(&client, "settings", "sync", json!({"ok": true}))).expect("emit_to");

        assert_eq!(mock.calls()[0].command, "plugin:event|emit_to");
        assert_eq!(
            mock.calls()[0].args,
            json!({
                "target": {"kind": "AnyLabel", "label": "settings"},
                "event": "sync",
                "payload": {"ok": true}
            })
        );
    }

    #[test]
    fn emit_to_only_reaches_matching_targets() {
        let (_mock, client) = emulated();
        let seen = Rc::new(RefCell::new(Vec::new()));
        for label in ["main", "settings"] {
            let sink = Rc::clone(&seen);
            block_on(listen(
                &client,
                "sync",
                move |_: Event<Value>| sink.borrow_mut().push(label),
                ListenOptions::target(EventTarget::Window {
                    label: label.to_string(),
                }),
            ))
            .expect("listen");
        }

        block_on(emit_to(&client, "settings", "sync", ())).expect("emit_to");

        assert_eq!(*seen.borrow(), vec!["settings"]);
    }

    #[test]
    fn failed_registration_releases_the_callback() {
        let mock = Rc::new(MockTransport::with_handler(|_, _| Err(json!("denied"))));
        let client = HostClient::from_rc(Rc::clone(&mock));

        let err = block_on(listen::<Value>(&client, "x", |_| {}, ListenOptions::default()))
            .expect_err("rejected");

        assert_eq!(err.rejection(), Some(&json!("denied")));
        assert_eq!(mock.callback_count(), 0);
    }
}
