//! Core binding primitives: channels, resource handles, plugin listeners and permissions.

use std::{cell::RefCell, collections::BTreeMap, fmt, rc::Rc};

use serde::{de::DeserializeOwned, Deserialize, Serialize, Serializer};
use serde_json::{json, Value};

use crate::{
    client::{HostClient, WeakHostClient},
    error::HostResult,
    transport::CallbackId,
};

/// Prefix the host recognizes when a channel is passed as an argument.
pub const CHANNEL_PREFIX: &str = "__CHANNEL__:";

/// Host-side identifier of a resource.
pub type ResourceId = u32;

type MessageHandler<T> = Rc<RefCell<Option<Box<dyn FnMut(T)>>>>;

#[derive(Debug, Default)]
struct ChannelOrdering {
    next_index: u64,
    pending: BTreeMap<u64, Value>,
    end_index: Option<u64>,
    closed: bool,
}

impl ChannelOrdering {
    /// Accepts one raw host frame and returns the messages now deliverable in order, plus
    /// whether the stream just finished.
    fn accept(&mut self, frame: Value) -> (Vec<Value>, bool) {
        if self.closed {
            return (Vec::new(), false);
        }
        let Some(index) = frame.get("index").and_then(Value::as_u64) else {
            // Frames without an index come from hosts that do not sequence channel messages.
            return (vec![frame], false);
        };

        if frame.get("end").is_some() {
            if index == self.next_index {
                self.closed = true;
                return (Vec::new(), true);
            }
            self.end_index = Some(index);
            return (Vec::new(), false);
        }

        if index < self.next_index {
            log::debug!("dropping stale channel frame {index}");
            return (Vec::new(), false);
        }
        let message = frame.get("message").cloned().unwrap_or(Value::Null);
        if index != self.next_index {
            self.pending.insert(index, message);
            return (Vec::new(), false);
        }

        let mut ready = vec![message];
        self.next_index += 1;
        while let Some(next) = self.pending.remove(&self.next_index) {
            ready.push(next);
            self.next_index += 1;
        }
        if self.end_index == Some(self.next_index) {
            self.closed = true;
            return (ready, true);
        }
        (ready, false)
    }
}

/// Host-to-client message stream addressed by a callback id.
///
/// The registration is not cancelled when the value is dropped; call [`Channel::unregister`]
/// to stop deliveries.
pub struct Channel<T> {
    id: CallbackId,
    client: HostClient,
    handler: MessageHandler<T>,
    ordering: Rc<RefCell<ChannelOrdering>>,
}

impl<T> Clone for Channel<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            client: self.client.clone(),
            handler: Rc::clone(&self.handler),
            ordering: Rc::clone(&self.ordering),
        }
    }
}

impl<T> fmt::Debug for Channel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel").field("id", &self.id).finish()
    }
}

impl<T: DeserializeOwned + 'static> Channel<T> {
    /// Registers a channel with a no-op handler.
    pub fn new(client: &HostClient) -> Self {
        Self::with_handler(client, |_| {})
    }

    /// Registers a channel whose messages go to `handler`.
    pub fn with_handler(client: &HostClient, handler: impl FnMut(T) + 'static) -> Self {
        let handler: MessageHandler<T> = Rc::new(RefCell::new(Some(Box::new(handler))));
        let ordering = Rc::new(RefCell::new(ChannelOrdering::default()));

        let delivery_handler = Rc::clone(&handler);
        let delivery_ordering = Rc::clone(&ordering);
        let weak_client = client.downgrade();
        let id_slot: Rc<RefCell<Option<CallbackId>>> = Rc::new(RefCell::new(None));
        let delivery_id = Rc::clone(&id_slot);

        let id = client.transform_callback(
            Box::new(move |frame| {
                let (ready, finished) = delivery_ordering.borrow_mut().accept(frame);
                for raw in ready {
                    match serde_json::from_value::<T>(raw) {
                        Ok(message) => deliver(&delivery_handler, message),
                        Err(err) => log::warn!("channel message decode failed: {err}"),
                    }
                }
                if finished {
                    release(&weak_client, *delivery_id.borrow());
                }
            }),
            false,
        );
        *id_slot.borrow_mut() = Some(id);

        Self {
            id,
            client: client.clone(),
            handler,
            ordering,
        }
    }

    /// Replaces the message handler.
    pub fn set_on_message(&self, handler: impl FnMut(T) + 'static) {
        *self.handler.borrow_mut() = Some(Box::new(handler));
    }
}

impl<T> Channel<T> {
    /// Callback id the host addresses this channel by.
    pub fn id(&self) -> CallbackId {
        self.id
    }

    /// Returns `true` once the stream ended or the channel was unregistered.
    pub fn is_closed(&self) -> bool {
        self.ordering.borrow().closed
    }

    /// Stops deliveries and releases the host registration.
    pub fn unregister(&self) {
        self.ordering.borrow_mut().closed = true;
        self.client.unregister_callback(self.id);
    }

    /// Wire representation passed inside command arguments.
    pub fn to_ipc(&self) -> String {
        format!("{CHANNEL_PREFIX}{}", self.id)
    }
}

impl<T> Serialize for Channel<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_ipc())
    }
}

/// Runs the handler with no borrow held; a replacement installed during the call wins.
fn deliver<T>(handler: &MessageHandler<T>, message: T) {
    let current = handler.borrow_mut().take();
    let Some(mut current) = current else {
        return;
    };
    current(message);
    let mut slot = handler.borrow_mut();
    if slot.is_none() {
        *slot = Some(current);
    }
}

fn release(client: &WeakHostClient, id: Option<CallbackId>) {
    if let (Some(client), Some(id)) = (client.upgrade(), id) {
        client.unregister_callback(id);
    }
}

/// Opaque handle to host-owned state.
///
/// Host state is released only by [`Resource::close`]; dropping the handle keeps it alive.
#[derive(Debug, Clone)]
pub struct Resource {
    rid: ResourceId,
    client: HostClient,
}

impl Resource {
    /// Wraps an existing host resource id.
    pub fn new(client: &HostClient, rid: ResourceId) -> Self {
        Self {
            rid,
            client: client.clone(),
        }
    }

    /// Host resource id.
    pub fn rid(&self) -> ResourceId {
        self.rid
    }

    /// Client the resource was created through.
    pub fn client(&self) -> &HostClient {
        &self.client
    }

    /// Releases the host-side state.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn close(&self) -> HostResult<()> {
        self.client
            .invoke("plugin:resources|close", json!({ "rid": self.rid }))
            .await
    }
}

/// Registration of a channel-backed plugin event listener.
#[derive(Debug)]
pub struct PluginListener {
    plugin: String,
    event: String,
    channel_id: CallbackId,
    client: HostClient,
}

impl PluginListener {
    /// Plugin name.
    pub fn plugin(&self) -> &str {
        &self.plugin
    }

    /// Plugin event name.
    pub fn event(&self) -> &str {
        &self.event
    }

    /// Id of the channel carrying the events.
    pub fn channel_id(&self) -> CallbackId {
        self.channel_id
    }

    /// Stops deliveries locally and asks the plugin to drop the listener.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn unregister(&self) -> HostResult<()> {
        self.client.unregister_callback(self.channel_id);
        self.client
            .invoke(
                &format!("plugin:{}|remove_listener", self.plugin),
                json!({ "event": self.event, "channelId": self.channel_id }),
            )
            .await
    }
}

/// Subscribes `handler` to `event` emitted by `plugin`.
///
/// # Errors
///
/// Propagates the host rejection; the channel is released in that case.
pub async fn add_plugin_listener<T: DeserializeOwned + 'static>(
    client: &HostClient,
    plugin: &str,
    event: &str,
    handler: impl FnMut(T) + 'static,
) -> HostResult<PluginListener> {
    let channel = Channel::with_handler(client, handler);
    let registered: HostResult<()> = client
        .invoke(
            &format!("plugin:{plugin}|registerListener"),
            json!({ "event": event, "handler": channel }),
        )
        .await;
    if let Err(err) = registered {
        channel.unregister();
        return Err(err);
    }
    Ok(PluginListener {
        plugin: plugin.to_string(),
        event: event.to_string(),
        channel_id: channel.id(),
        client: client.clone(),
    })
}

/// Permission state reported by a plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PermissionState {
    /// Permission granted.
    Granted,
    /// Permission denied.
    Denied,
    /// The user will be prompted.
    Prompt,
    /// The user will be prompted with a rationale.
    PromptWithRationale,
}

/// Queries a plugin's permission state.
///
/// # Errors
///
/// Propagates the host rejection or a decode failure.
pub async fn check_permissions<T: DeserializeOwned>(
    client: &HostClient,
    plugin: &str,
) -> HostResult<T> {
    client
        .invoke(&format!("plugin:{plugin}|check_permissions"), ())
        .await
}

/// Requests a plugin's permissions from the user.
///
/// # Errors
///
/// Propagates the host rejection or a decode failure.
pub async fn request_permissions<T: DeserializeOwned>(
    client: &HostClient,
    plugin: &str,
) -> HostResult<T> {
    client
        .invoke(&format!("plugin:{plugin}|request_permissions"), ())
        .await
}

/// URL layout used for file sources when the host does not convert them natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileSrcStyle {
    /// `<protocol>://localhost/<path>`
    #[default]
    CustomScheme,
    /// `http://<protocol>.localhost/<path>`
    HttpSubdomain,
}

/// Formats `path` as a file source URL, percent-encoding it as one segment.
pub fn file_src_url(path: &str, protocol: &str, style: FileSrcStyle) -> String {
    let base = match style {
        FileSrcStyle::CustomScheme => format!("{protocol}://localhost/"),
        FileSrcStyle::HttpSubdomain => format!("http://{protocol}.localhost/"),
    };
    match url::Url::parse(&base) {
        Ok(mut url) => {
            if let Ok(mut segments) = url.path_segments_mut() {
                segments.pop_if_empty().push(path);
            }
            url.to_string()
        }
        Err(err) => {
            log::warn!("file source base `{base}` rejected: {err}");
            format!("{base}{path}")
        }
    }
}
