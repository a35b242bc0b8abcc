//! Background artwork loading

use crate::error::ArtworkError;
use async_trait::async_trait;
use encore_playback::{ArtworkFetch, CoverImage};
use reqwest::Client;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Loads cover art from a locator
#[async_trait]
pub trait ArtworkLoader: Send + Sync {
    async fn load(&self, locator: &Url) -> Result<CoverImage, ArtworkError>;
}

/// Loader for `http(s)://` and `file://` locators
pub struct HttpArtworkLoader {
    http: Client,
}

impl HttpArtworkLoader {
    /// Create a loader with its own HTTP client
    pub fn new() -> Result<Self, ArtworkError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("Encore/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http })
    }

    /// Create a loader sharing an existing HTTP client
    pub fn with_client(http: Client) -> Self {
        Self { http }
    }

    async fn load_http(&self, locator: &Url) -> Result<CoverImage, ArtworkError> {
        debug!(url = %locator, "Fetching artwork");

        let response = self.http.get(locator.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ArtworkError::Status(status.as_u16()));
        }

        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?;

        image_from_bytes(bytes.to_vec(), mime_type)
    }

    async fn load_file(&self, locator: &Url) -> Result<CoverImage, ArtworkError> {
        let path = locator
            .to_file_path()
            .map_err(|()| ArtworkError::UnsupportedScheme(locator.to_string()))?;
        debug!(path = %path.display(), "Reading artwork");

        let bytes = tokio::fs::read(&path).await?;
        image_from_bytes(bytes, mime_from_extension(&path))
    }
}

#[async_trait]
impl ArtworkLoader for HttpArtworkLoader {
    async fn load(&self, locator: &Url) -> Result<CoverImage, ArtworkError> {
        match locator.scheme() {
            "http" | "https" => self.load_http(locator).await,
            "file" => self.load_file(locator).await,
            other => Err(ArtworkError::UnsupportedScheme(other.to_string())),
        }
    }
}

fn image_from_bytes(bytes: Vec<u8>, mime_type: Option<String>) -> Result<CoverImage, ArtworkError> {
    if bytes.is_empty() {
        return Err(ArtworkError::Empty);
    }

    let image = CoverImage::new(bytes);
    Ok(match mime_type {
        Some(mime_type) => image.with_mime_type(mime_type),
        None => image,
    })
}

fn mime_from_extension(path: &Path) -> Option<String> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => return None,
    };
    Some(mime.to_string())
}

/// Run one fetch off the control task; the result goes back through the reply
pub(crate) fn spawn_fetch(loader: Arc<dyn ArtworkLoader>, fetch: ArtworkFetch) {
    tokio::spawn(async move {
        match loader.load(&fetch.locator).await {
            Ok(image) => {
                debug!(index = fetch.index, bytes = image.len(), "Artwork loaded");
                fetch.reply.send(Some(image));
            }
            Err(e) => {
                warn!("Failed to load artwork for item {}: {}", fetch.index, e);
                fetch.reply.send(None);
            }
        }
    });
}
