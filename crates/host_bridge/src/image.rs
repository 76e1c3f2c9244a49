//! Host-side image resources and the icon argument shape.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    client::HostClient,
    core::{Resource, ResourceId},
    error::HostResult,
};

/// Pixel dimensions of an [`Image`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImageSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// RGBA image owned by the host.
#[derive(Debug, Clone)]
pub struct Image {
    resource: Resource,
}

impl Image {
    /// Wraps an existing image resource.
    pub fn from_rid(client: &HostClient, rid: ResourceId) -> Self {
        Self {
            resource: Resource::new(client, rid),
        }
    }

    /// Creates an image from raw RGBA pixels.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn new(client: &HostClient, rgba: &[u8], width: u32, height: u32) -> HostResult<Self> {
        let rid = client
            .invoke(
                "plugin:image|new",
                json!({ "rgba": rgba, "width": width, "height": height }),
            )
            .await?;
        Ok(Self::from_rid(client, rid))
    }

    /// Creates an image from encoded bytes (PNG, ICO, ...).
    ///
    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn from_bytes(client: &HostClient, bytes: &[u8]) -> HostResult<Self> {
        let rid = client
            .invoke("plugin:image|from_bytes", json!({ "bytes": bytes }))
            .await?;
        Ok(Self::from_rid(client, rid))
    }

    /// Creates an image from a file the host can read.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn from_path(client: &HostClient, path: &str) -> HostResult<Self> {
        let rid = client
            .invoke("plugin:image|from_path", json!({ "path": path }))
            .await?;
        Ok(Self::from_rid(client, rid))
    }

    /// Host resource id.
    pub fn rid(&self) -> ResourceId {
        self.resource.rid()
    }

    /// Returns the RGBA pixels.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection or a decode failure.
    pub async fn rgba(&self) -> HostResult<Vec<u8>> {
        self.resource
            .client()
            .invoke("plugin:image|rgba", json!({ "rid": self.rid() }))
            .await
    }

    /// Returns the pixel dimensions.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection or a decode failure.
    pub async fn size(&self) -> HostResult<ImageSize> {
        self.resource
            .client()
            .invoke("plugin:image|size", json!({ "rid": self.rid() }))
            .await
    }

    /// Releases the host-side image.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn close(&self) -> HostResult<()> {
        self.resource.close().await
    }
}

/// Icon argument accepted by window, menu and tray setters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ImageSource {
    /// An existing [`Image`] resource, sent as its id.
    Resource(ResourceId),
    /// A file path the host loads.
    Path(String),
    /// Encoded image bytes.
    Bytes(Vec<u8>),
}

impl From<&Image> for ImageSource {
    fn from(image: &Image) -> Self {
        Self::Resource(image.rid())
    }
}

impl From<&str> for ImageSource {
    fn from(path: &str) -> Self {
        Self::Path(path.to_string())
    }
}

impl From<Vec<u8>> for ImageSource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}
