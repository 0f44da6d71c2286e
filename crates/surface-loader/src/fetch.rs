//! Fetching raw blobs from HTTP(S) URLs and local files.

use crate::error::{LoadError, LoadResult};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, instrument};

/// Content type of a PNG float container.
pub const PNG_CONTENT_TYPE: &str = "image/png";

/// Content type reported for files that are not PNGs.
pub const BINARY_CONTENT_TYPE: &str = "application/octet-stream";

/// A fetched body and its declared content type.
#[derive(Debug, Clone)]
pub struct FetchedBlob {
    pub bytes: Bytes,
    pub content_type: Option<String>,
}

impl FetchedBlob {
    pub fn new(bytes: impl Into<Bytes>, content_type: Option<&str>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: content_type.map(str::to_string),
        }
    }

    /// True if the content type selects the PNG decode path.
    pub fn is_png(&self) -> bool {
        self.content_type.as_deref().is_some_and(is_png_content_type)
    }
}

/// Match `image/png`, ignoring case and parameters.
pub fn is_png_content_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(PNG_CONTENT_TYPE))
}

/// Trait for anything that can resolve a URL to bytes.
#[async_trait]
pub trait BlobFetcher: Send + Sync {
    /// Fetch the body behind `url`.
    async fn fetch(&self, url: &str) -> LoadResult<FetchedBlob>;
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Whole-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Connection timeout in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 120,
            connect_timeout_secs: 30,
        }
    }
}

impl FetchConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("SURFACE_FETCH_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                config.request_timeout_secs = secs;
            }
        }

        if let Ok(val) = std::env::var("SURFACE_CONNECT_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                config.connect_timeout_secs = secs;
            }
        }

        config
    }
}

/// Fetches `http://` and `https://` URLs.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> LoadResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .pool_max_idle_per_host(4)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| LoadError::Request {
                url: String::new(),
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client })
    }

    /// Wrap an existing client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BlobFetcher for HttpFetcher {
    #[instrument(skip(self), fields(url = %url))]
    async fn fetch(&self, url: &str) -> LoadResult<FetchedBlob> {
        let request_error = |e: reqwest::Error| LoadError::Request {
            url: url.to_string(),
            message: e.to_string(),
        };

        let response = self.client.get(url).send().await.map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response.bytes().await.map_err(request_error)?;
        debug!(size = bytes.len(), content_type = ?content_type, "Fetched blob");

        Ok(FetchedBlob {
            bytes,
            content_type,
        })
    }
}

/// Reads `file://` URLs and plain paths from disk.
///
/// Files ending in `.png` are reported as `image/png`.
#[derive(Debug, Clone, Default)]
pub struct FileFetcher {
    base_dir: Option<PathBuf>,
}

impl FileFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative paths against `base_dir`.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    fn resolve(&self, url: &str) -> PathBuf {
        let path = Path::new(url.strip_prefix("file://").unwrap_or(url));
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

#[async_trait]
impl BlobFetcher for FileFetcher {
    #[instrument(skip(self), fields(url = %url))]
    async fn fetch(&self, url: &str) -> LoadResult<FetchedBlob> {
        let path = self.resolve(url);
        let bytes = tokio::fs::read(&path).await.map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let is_png = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("png"));
        let content_type = if is_png {
            PNG_CONTENT_TYPE
        } else {
            BINARY_CONTENT_TYPE
        };

        debug!(size = bytes.len(), path = %path.display(), "Read blob from file");
        Ok(FetchedBlob::new(bytes, Some(content_type)))
    }
}

/// Routes URLs to the HTTP or file fetcher by scheme.
#[derive(Debug, Clone)]
pub struct DefaultFetcher {
    http: HttpFetcher,
    file: FileFetcher,
}

impl DefaultFetcher {
    pub fn new(config: &FetchConfig) -> LoadResult<Self> {
        Ok(Self {
            http: HttpFetcher::new(config)?,
            file: FileFetcher::new(),
        })
    }

    pub fn from_parts(http: HttpFetcher, file: FileFetcher) -> Self {
        Self { http, file }
    }
}

/// How a URL is fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlKind {
    Http,
    File,
}

/// Classify a URL by its scheme. URLs without a scheme are file paths.
pub fn classify_url(url: &str) -> LoadResult<UrlKind> {
    let lower = url.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return Ok(UrlKind::Http);
    }
    if lower.starts_with("file://") {
        return Ok(UrlKind::File);
    }
    match url.split_once("://") {
        Some((scheme, _)) => Err(LoadError::UnsupportedScheme(scheme.to_string())),
        None => Ok(UrlKind::File),
    }
}

#[async_trait]
impl BlobFetcher for DefaultFetcher {
    async fn fetch(&self, url: &str) -> LoadResult<FetchedBlob> {
        match classify_url(url)? {
            UrlKind::Http => self.http.fetch(url).await,
            UrlKind::File => self.file.fetch(url).await,
        }
    }
}
