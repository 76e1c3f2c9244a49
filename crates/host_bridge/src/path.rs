//! Host path resolution and manipulation.
//!
//! Nothing here touches the filesystem from the client: every helper asks the host's path
//! plugin, so results follow the host platform's separators and conventions.

use serde::{Serialize, Serializer};
use serde_json::{json, Value};

use crate::{
    client::HostClient,
    error::{HostError, HostResult},
};

/// Well-known base directories, sent to the host as their numeric id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum BaseDirectory {
    Audio = 1,
    Cache = 2,
    Config = 3,
    Data = 4,
    LocalData = 5,
    Document = 6,
    Download = 7,
    Picture = 8,
    Public = 9,
    Video = 10,
    Resource = 11,
    Temp = 12,
    AppConfig = 13,
    AppData = 14,
    AppLocalData = 15,
    AppCache = 16,
    AppLog = 17,
    Desktop = 18,
    Executable = 19,
    Font = 20,
    Home = 21,
    Runtime = 22,
    Template = 23,
}

impl Serialize for BaseDirectory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

/// Resolves `directory`, optionally joined with `path`.
///
/// # Errors
///
/// Propagates the host rejection, e.g. when the directory does not exist on this platform.
pub async fn resolve_directory(
    client: &HostClient,
    directory: BaseDirectory,
    path: Option<&str>,
) -> HostResult<String> {
    let args = match path {
        Some(path) => json!({ "directory": directory, "path": path }),
        None => json!({ "directory": directory }),
    };
    client.invoke("plugin:path|resolve_directory", args).await
}

macro_rules! directory_helpers {
    ($($(#[$doc:meta])* $name:ident => $directory:ident;)*) => {
        $(
            $(#[$doc])*
            ///
            /// # Errors
            ///
            /// Propagates the host rejection.
            pub async fn $name(client: &HostClient) -> HostResult<String> {
                resolve_directory(client, BaseDirectory::$directory, None).await
            }
        )*
    };
}

directory_helpers! {
    /// Per-app configuration directory.
    app_config_dir => AppConfig;
    /// Per-app data directory.
    app_data_dir => AppData;
    /// Per-app local data directory.
    app_local_data_dir => AppLocalData;
    /// Per-app cache directory.
    app_cache_dir => AppCache;
    /// Per-app log directory.
    app_log_dir => AppLog;
    /// User audio directory.
    audio_dir => Audio;
    /// User cache directory.
    cache_dir => Cache;
    /// User configuration directory.
    config_dir => Config;
    /// User data directory.
    data_dir => Data;
    /// User desktop directory.
    desktop_dir => Desktop;
    /// User document directory.
    document_dir => Document;
    /// User download directory.
    download_dir => Download;
    /// Executable directory.
    executable_dir => Executable;
    /// Font directory.
    font_dir => Font;
    /// User home directory.
    home_dir => Home;
    /// User local data directory.
    local_data_dir => LocalData;
    /// User picture directory.
    picture_dir => Picture;
    /// User public directory.
    public_dir => Public;
    /// Bundled resource directory.
    resource_dir => Resource;
    /// Runtime directory.
    runtime_dir => Runtime;
    /// Template directory.
    template_dir => Template;
    /// User video directory.
    video_dir => Video;
    /// Temporary directory.
    temp_dir => Temp;
}

/// Absolute path of the bundled resource `resource_path`.
///
/// # Errors
///
/// Propagates the host rejection.
pub async fn resolve_resource(client: &HostClient, resource_path: &str) -> HostResult<String> {
    resolve_directory(client, BaseDirectory::Resource, Some(resource_path)).await
}

fn path_constant(client: &HostClient, key: &str) -> HostResult<String> {
    match client.plugin_constant("path", key) {
        Some(Value::String(value)) => Ok(value),
        Some(other) => Err(HostError::decode(
            "plugin:path",
            format!("constant `{key}` is not a string: {other}"),
        )),
        None => Err(HostError::Unavailable(format!(
            "path plugin constant `{key}` is not published"
        ))),
    }
}

/// Platform path segment separator (`\` on Windows, `/` elsewhere).
///
/// # Errors
///
/// Returns [`HostError::Unavailable`] when the host did not publish the constant.
pub fn sep(client: &HostClient) -> HostResult<String> {
    path_constant(client, "sep")
}

/// Platform path list delimiter (`;` on Windows, `:` elsewhere).
///
/// # Errors
///
/// Returns [`HostError::Unavailable`] when the host did not publish the constant.
pub fn delimiter(client: &HostClient) -> HostResult<String> {
    path_constant(client, "delimiter")
}

/// Resolves `paths` right to left into an absolute path.
///
/// # Errors
///
/// Propagates the host rejection.
pub async fn resolve(client: &HostClient, paths: &[&str]) -> HostResult<String> {
    client
        .invoke("plugin:path|resolve", json!({ "paths": paths }))
        .await
}

/// Collapses `.` and `..` segments.
///
/// # Errors
///
/// Propagates the host rejection.
pub async fn normalize(client: &HostClient, path: &str) -> HostResult<String> {
    client
        .invoke("plugin:path|normalize", json!({ "path": path }))
        .await
}

/// Joins `paths` with the platform separator and normalizes the result.
///
/// # Errors
///
/// Propagates the host rejection.
pub async fn join(client: &HostClient, paths: &[&str]) -> HostResult<String> {
    client
        .invoke("plugin:path|join", json!({ "paths": paths }))
        .await
}

/// Parent directory of `path`.
///
/// # Errors
///
/// Propagates the host rejection.
pub async fn dirname(client: &HostClient, path: &str) -> HostResult<String> {
    client
        .invoke("plugin:path|dirname", json!({ "path": path }))
        .await
}

/// Extension of `path`, without the dot.
///
/// # Errors
///
/// Propagates the host rejection.
pub async fn extname(client: &HostClient, path: &str) -> HostResult<String> {
    client
        .invoke("plugin:path|extname", json!({ "path": path }))
        .await
}

/// Last segment of `path`, with `ext` stripped when it matches.
///
/// # Errors
///
/// Propagates the host rejection.
pub async fn basename(client: &HostClient, path: &str, ext: Option<&str>) -> HostResult<String> {
    client
        .invoke("plugin:path|basename", json!({ "path": path, "ext": ext }))
        .await
}

/// Whether `path` is absolute on the host platform.
///
/// # Errors
///
/// Propagates the host rejection.
pub async fn is_absolute(client: &HostClient, path: &str) -> HostResult<bool> {
    client
        .invoke("plugin:path|is_absolute", json!({ "path": path }))
        .await
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use futures::executor::block_on;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::mocks::MockTransport;

    fn path_host() -> (Rc<MockTransport>, HostClient) {
        let mock = Rc::new(MockTransport::with_handler(|command, args| match command {
            "plugin:path|resolve_directory" => Ok(json!(format!(
                "/dir/{}/{}",
                args["directory"],
                args["path"].as_str().unwrap_or_default()
            ))),
            "plugin:path|is_absolute" => Ok(json!(args["path"]
                .as_str()
                .is_some_and(|p| p.starts_with('/')))),
            _ => Ok(json!("/joined")),
        }));
        let client = HostClient::from_rc(Rc::clone(&mock));
        (mock, client)
    }

    #[test]
    fn base_directories_use_numeric_wire_values() {
        assert_eq!(serde_json::to_value(BaseDirectory::Audio).expect("audio"), json!(1));
        assert_eq!(
            serde_json::to_value(BaseDirectory::Resource).expect("resource"),
            json!(11)
        );
        assert_eq!(serde_json::to_value(BaseDirectory::AppLog).expect("log"), json!(17));
        assert_eq!(
            serde_json::to_value(BaseDirectory::Template).expect("template"),
            json!(23)
        );
    }

    #[test]
    fn directory_helpers_resolve_through_one_command() {
        let (mock, client) = path_host();

        assert_eq!(block_on(app_config_dir(&client)).expect("config"), "/dir/13/");
        assert_eq!(block_on(temp_dir(&client)).expect("temp"), "/dir/12/");
        assert_eq!(
            block_on(resolve_resource(&client, "assets/logo.svg")).expect("resource"),
            "/dir/11/assets/logo.svg"
        );

        let calls = mock.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0].args, json!({"directory": 13}));
        assert_eq!(calls[2].args, json!({"directory": 11, "path": "assets/logo.svg"}));
    }

    #[test]
    fn path_operations_send_documented_arguments() {
        let (mock, client) = path_host();

        block_on(join(&client, &["a", "b", "../c"])).expect("join");
        block_on(basename(&client, "/tmp/notes.md", Some(".md"))).expect("basename");
        assert!(block_on(is_absolute(&client, "/tmp")).expect("absolute"));
        assert!(!block_on(is_absolute(&client, "tmp")).expect("relative"));

        let calls = mock.calls();
        assert_eq!(calls[0].command, "plugin:path|join");
        assert_eq!(calls[0].args, json!({"paths": ["a", "b", "../c"]}));
        assert_eq!(calls[1].args, json!({"path": "/tmp/notes.md", "ext": ".md"}));
    }

    #[test]
    fn separators_come_from_plugin_constants() {
        let (mock, client) = path_host();
        assert!(matches!(sep(&client), Err(HostError::Unavailable(_))));

        mock.set_plugin_constant("path", "sep", json!("/"));
        mock.set_plugin_constant("path", "delimiter", json!(":"));

        assert_eq!(sep(&client).expect("sep"), "/");
        assert_eq!(delimiter(&client).expect("delimiter"), ":");
        assert!(mock.calls().is_empty());
    }
}
