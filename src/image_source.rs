//! Where replacement images come from.
use crate::error::{DeckError, Result};
use crate::ooxml::pptx::EmbeddableImage;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::debug;

/// A reference to replacement image content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// `http://` or `https://` URL
    Remote(String),
    /// File on local disk
    Local(PathBuf),
    /// Content already in memory
    Bytes(Vec<u8>),
}

impl ImageSource {
    /// Interpret a caller-supplied reference: URLs are remote, anything else
    /// is a local path.
    pub fn from_reference(reference: &str) -> Self {
        let lower = reference.trim_start().to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Remote(reference.trim().to_string())
        } else {
            Self::Local(PathBuf::from(reference))
        }
    }

    /// Human-readable origin, for errors and logs.
    pub fn describe(&self) -> String {
        match self {
            Self::Remote(url) => url.clone(),
            Self::Local(path) => path.display().to_string(),
            Self::Bytes(bytes) => format!("<{} bytes>", bytes.len()),
        }
    }
}

/// Fetches and decodes replacement images.
#[derive(Debug, Clone)]
pub struct ImageFetcher {
    timeout: Duration,
    #[cfg(feature = "remote")]
    http_client: reqwest::Client,
}

impl ImageFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            #[cfg(feature = "remote")]
            http_client: reqwest::Client::builder()
                .timeout(timeout)
                .user_agent(concat!("deckwright/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Acquire the bytes behind `source` and decode them.
    ///
    /// Acquisition failures are [`DeckError::FetchFailed`]; bytes that are not
    /// a decodable raster are [`DeckError::InvalidImage`].
    pub async fn fetch(&self, source: &ImageSource) -> Result<EmbeddableImage> {
        let started = Instant::now();
        let bytes = match tokio::time::timeout(self.timeout, self.read(source)).await {
            Ok(bytes) => bytes?,
            Err(_) => {
                return Err(DeckError::FetchFailed {
                    source_ref: source.describe(),
                    reason: format!("timed out after {:?}", self.timeout),
                });
            },
        };
        debug!(
            source = %source.describe(),
            bytes = bytes.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "fetched image"
        );

        let image = tokio::task::spawn_blocking(move || EmbeddableImage::from_bytes(bytes))
            .await
            .map_err(|e| DeckError::InvalidImage(e.to_string()))??;
        Ok(image)
    }

    async fn read(&self, source: &ImageSource) -> Result<Vec<u8>> {
        let failed = |reason: String| DeckError::FetchFailed {
            source_ref: source.describe(),
            reason,
        };

        match source {
            ImageSource::Bytes(bytes) => Ok(bytes.clone()),
            ImageSource::Local(path) => tokio::fs::read(path)
                .await
                .map_err(|e| failed(e.to_string())),
            ImageSource::Remote(url) => self.get(url).await.map_err(failed),
        }
    }

    #[cfg(feature = "remote")]
    async fn get(&self, url: &str) -> std::result::Result<Vec<u8>, String> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        let status = response.status();
        if !status.is_success() {
            return Err(format!("HTTP {}", status));
        }
        let body = response.bytes().await.map_err(|e| e.to_string())?;
        Ok(body.to_vec())
    }

    #[cfg(not(feature = "remote"))]
    async fn get(&self, _url: &str) -> std::result::Result<Vec<u8>, String> {
        Err("remote images are disabled in this build".to_string())
    }
}
