//! Typed request/response client over a [`HostTransport`].

use std::{
    fmt,
    rc::{Rc, Weak},
};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

use crate::{
    error::{HostError, HostResult},
    transport::{CallbackId, HostCallback, HostFuture, HostMetadata, HostTransport, InvokeOptions},
};

/// Protocol used by [`HostClient::convert_file_src`] when none is given.
pub const DEFAULT_FILE_PROTOCOL: &str = "asset";

/// Cheap-clone handle every binding uses to reach the host.
#[derive(Clone)]
pub struct HostClient {
    transport: Rc<dyn HostTransport>,
}

impl fmt::Debug for HostClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostClient").finish_non_exhaustive()
    }
}

impl HostClient {
    /// Wraps an owned transport.
    pub fn new(transport: impl HostTransport + 'static) -> Self {
        Self {
            transport: Rc::new(transport),
        }
    }

    /// Wraps a shared transport, keeping the caller's handle usable.
    pub fn from_rc<T: HostTransport + 'static>(transport: Rc<T>) -> Self {
        Self { transport }
    }

    /// Returns the underlying transport.
    pub fn transport(&self) -> &dyn HostTransport {
        self.transport.as_ref()
    }

    /// Returns a handle that does not keep the transport alive.
    pub fn downgrade(&self) -> WeakHostClient {
        WeakHostClient {
            transport: Rc::downgrade(&self.transport),
        }
    }

    /// Invokes `command` once and decodes the answer into `T`.
    ///
    /// Unit or `null` arguments are sent as an empty object.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Encode`] when `args` cannot be serialized, the host rejection
    /// unchanged, or [`HostError::Decode`] when the answer does not fit `T`.
    pub async fn invoke<T: DeserializeOwned>(
        &self,
        command: &str,
        args: impl Serialize,
    ) -> HostResult<T> {
        self.invoke_inner(command, args, None).await
    }

    /// [`Self::invoke`] with per-call [`InvokeOptions`].
    ///
    /// # Errors
    ///
    /// Same as [`Self::invoke`].
    pub async fn invoke_with_options<T: DeserializeOwned>(
        &self,
        command: &str,
        args: impl Serialize,
        options: &InvokeOptions,
    ) -> HostResult<T> {
        self.invoke_inner(command, args, Some(options)).await
    }

    async fn invoke_inner<T: DeserializeOwned>(
        &self,
        command: &str,
        args: impl Serialize,
        options: Option<&InvokeOptions>,
    ) -> HostResult<T> {
        let args = match serde_json::to_value(args).map_err(|e| HostError::encode(command, e))? {
            Value::Null => Value::Object(Map::new()),
            value => value,
        };
        log::debug!("invoke {command}");
        let raw = self.transport.invoke(command, args, options).await?;
        serde_json::from_value(raw).map_err(|e| HostError::decode(command, e))
    }

    /// Registers a raw callback with the host.
    pub fn transform_callback(&self, callback: HostCallback, once: bool) -> CallbackId {
        self.transport.transform_callback(callback, once)
    }

    /// Releases a callback registration.
    pub fn unregister_callback(&self, id: CallbackId) {
        self.transport.unregister_callback(id);
    }

    /// Converts a filesystem path into a loadable URL. `protocol` defaults to `asset`.
    pub fn convert_file_src(&self, path: &str, protocol: Option<&str>) -> String {
        self.transport
            .convert_file_src(path, protocol.unwrap_or(DEFAULT_FILE_PROTOCOL))
    }

    /// Returns host metadata.
    pub fn metadata(&self) -> HostMetadata {
        self.transport.metadata()
    }

    /// Returns a static plugin constant.
    pub fn plugin_constant(&self, plugin: &str, key: &str) -> Option<Value> {
        self.transport.plugin_constant(plugin, key)
    }

    /// Runs a fire-and-forget task on the transport's event loop.
    pub fn spawn_local(&self, task: impl std::future::Future<Output = ()> + 'static) {
        let task: HostFuture<'static, ()> = Box::pin(task);
        self.transport.spawn_local(task);
    }
}

/// Non-owning [`HostClient`] handle for callbacks stored inside the transport.
#[derive(Clone)]
pub struct WeakHostClient {
    transport: Weak<dyn HostTransport>,
}

impl fmt::Debug for WeakHostClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakHostClient").finish_non_exhaustive()
    }
}

impl WeakHostClient {
    /// Returns the client while the transport is still alive.
    pub fn upgrade(&self) -> Option<HostClient> {
        self.transport
            .upgrade()
            .map(|transport| HostClient { transport })
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::mocks::MockTransport;

    #[test]
    fn unit_args_are_sent_as_empty_object() {
        let mock = Rc::new(MockTransport::new());
        let client = HostClient::from_rc(Rc::clone(&mock));

        block_on(client.invoke::<()>("plugin:app|app_show", ())).expect("invoke");

        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].command, "plugin:app|app_show");
        assert_eq!(calls[0].args, json!({}));
    }

    #[test]
    fn rejection_is_propagated_unchanged() {
        let mock = Rc::new(MockTransport::with_handler(|_, _| {
            Err(json!("permission denied"))
        }));
        let client = HostClient::from_rc(mock);

        let err = block_on(client.invoke::<String>("plugin:app|name", ())).expect_err("rejected");
        assert_eq!(
            err,
            HostError::Rejected {
                command: "plugin:app|name".to_string(),
                payload: json!("permission denied"),
            }
        );
    }

    #[test]
    fn mismatched_answer_is_a_decode_error() {
        let mock = Rc::new(MockTransport::with_handler(|_, _| Ok(json!({"not": "a string"}))));
        let client = HostClient::from_rc(mock);

        let err = block_on(client.invoke::<String>("plugin:app|name", ())).expect_err("decode");
        assert!(matches!(err, HostError::Decode { ref command, .. } if command == "plugin:app|name"));
    }

    #[test]
    fn invoke_options_reach_the_transport() {
        let mock = Rc::new(MockTransport::new());
        let client = HostClient::from_rc(Rc::clone(&mock));
        let options = InvokeOptions::default().with_header("x-request", "1");

        block_on(client.invoke_with_options::<()>("custom_command", json!({"a": 1}), &options))
            .expect("invoke");

        assert_eq!(mock.calls()[0].options, Some(options));
    }

    #[test]
    fn weak_handle_does_not_keep_transport_alive() {
        let client = HostClient::new(MockTransport::new());
        let weak = client.downgrade();
        assert!(weak.upgrade().is_some());
        drop(client);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn convert_file_src_defaults_to_asset_protocol() {
        let client = HostClient::new(MockTransport::new());
        assert_eq!(
            client.convert_file_src("/tmp/a b.png", None),
            "asset://localhost/%2Ftmp%2Fa%20b.png"
        );
    }
}
