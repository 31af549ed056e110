use crate::errors::GenaiError;
use crate::http::common::{ApiVersion, DEFAULT_BASE_URL, DEFAULT_LIVE_BASE_URL, live_url};
use crate::http::files::{FileMetadata, ListFilesResponse};
use crate::http::{ApiContext, caches, files, models};
use crate::live::{Connector, LiveSession, WebSocketConnector};
use crate::pagination::paginate;
use crate::types::{
    Blob, CachedContent, CachedContentUpdate, CountTokensRequest, CountTokensResponse,
    CreateCachedContentRequest, EmbedContentRequest, EmbedContentResponse,
    GenerateContentRequest, GenerateContentResponse, ListCachedContentsResponse,
    ListModelsResponse, LiveSetup, Model,
};
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use reqwest::Client as ReqwestClient;
use std::path::Path;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Environment variable read by [`Client::from_env`].
pub const API_KEY_ENV_VAR: &str = "GEMINI_API_KEY";

/// The main client for the Generative Language API.
///
/// Cloning is cheap: the underlying HTTP connection pool is shared.
#[derive(Debug, Clone)]
pub struct Client {
    pub(crate) ctx: ApiContext,
    live_base_url: String,
}

/// Builder for `Client` instances.
///
/// # Example
///
/// ```
/// use genai_net::{ApiVersion, Client};
/// use std::time::Duration;
///
/// let client = Client::builder("api_key")
///     .timeout(Duration::from_secs(120))
///     .connect_timeout(Duration::from_secs(10))
///     .api_version(ApiVersion::V1Alpha)
///     .build()
///     .unwrap();
/// assert_eq!(client.api_version(), ApiVersion::V1Alpha);
/// ```
#[derive(Debug)]
pub struct ClientBuilder {
    api_key: String,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    base_url: Option<String>,
    live_base_url: Option<String>,
    api_version: ApiVersion,
}

impl ClientBuilder {
    /// Sets the total request timeout for REST calls.
    ///
    /// Generation requests can take a long time; consider 120-300 seconds.
    /// If not set, uses reqwest's default (no timeout). Live sessions are not
    /// affected; use cancellation tokens there.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout for REST calls.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Overrides the REST base URL (default
    /// `https://generativelanguage.googleapis.com`).
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Overrides the Live WebSocket base URL (default
    /// `wss://generativelanguage.googleapis.com`).
    #[must_use]
    pub fn live_base_url(mut self, live_base_url: impl Into<String>) -> Self {
        self.live_base_url = Some(live_base_url.into());
        self
    }

    #[must_use]
    pub const fn api_version(mut self, version: ApiVersion) -> Self {
        self.api_version = version;
        self
    }

    /// Builds the `Client`.
    ///
    /// # Errors
    ///
    /// Returns [`GenaiError::ClientBuild`] if the HTTP client cannot be
    /// initialized (for example, TLS backend failure).
    pub fn build(self) -> Result<Client, GenaiError> {
        let mut builder = ReqwestClient::builder();

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(connect_timeout) = self.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }

        let http_client = builder
            .build()
            .map_err(|e| GenaiError::ClientBuild(e.to_string()))?;

        Ok(Client {
            ctx: ApiContext {
                http_client,
                api_key: self.api_key,
                base_url: self
                    .base_url
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                version: self.api_version,
            },
            live_base_url: self
                .live_base_url
                .unwrap_or_else(|| DEFAULT_LIVE_BASE_URL.to_string()),
        })
    }
}

impl Client {
    /// Creates a new builder for `Client` instances.
    #[must_use]
    pub fn builder(api_key: impl Into<String>) -> ClientBuilder {
        ClientBuilder {
            api_key: api_key.into(),
            timeout: None,
            connect_timeout: None,
            base_url: None,
            live_base_url: None,
            api_version: ApiVersion::default(),
        }
    }

    /// Creates a client with default settings.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            ctx: ApiContext {
                http_client: ReqwestClient::new(),
                api_key: api_key.into(),
                base_url: DEFAULT_BASE_URL.to_string(),
                version: ApiVersion::default(),
            },
            live_base_url: DEFAULT_LIVE_BASE_URL.to_string(),
        }
    }

    /// Creates a client from the `GEMINI_API_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`GenaiError::InvalidInput`] if the variable is unset or empty.
    pub fn from_env() -> Result<Self, GenaiError> {
        match std::env::var(API_KEY_ENV_VAR) {
            Ok(key) if !key.is_empty() => Ok(Self::new(key)),
            _ => Err(GenaiError::InvalidInput(format!(
                "{API_KEY_ENV_VAR} environment variable is not set"
            ))),
        }
    }

    #[must_use]
    pub fn api_version(&self) -> ApiVersion {
        self.ctx.version
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.ctx.base_url
    }

    #[must_use]
    pub fn live_base_url(&self) -> &str {
        &self.live_base_url
    }

    // --- Models ---

    /// Gets metadata for one model. Accepts `gemini-2.0-flash` or
    /// `models/gemini-2.0-flash`.
    pub async fn get_model(&self, name: &str) -> Result<Model, GenaiError> {
        models::get_model(&self.ctx, name).await
    }

    pub async fn list_models(
        &self,
        page_size: Option<u32>,
        page_token: Option<&str>,
    ) -> Result<ListModelsResponse, GenaiError> {
        models::list_models(&self.ctx, page_size, page_token).await
    }

    /// Every available model, fetched page by page as the stream is polled.
    pub fn list_all_models(&self) -> BoxStream<'_, Result<Model, GenaiError>> {
        let ctx = &self.ctx;
        paginate(move |token: Option<String>| async move {
            models::list_models(ctx, None, token.as_deref()).await
        })
        .boxed()
    }

    /// Generates a response.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use genai_net::{Client, Content, GenerateContentRequest, model_names};
    ///
    /// # async fn run() -> Result<(), genai_net::GenaiError> {
    /// let client = Client::from_env()?;
    /// let request = GenerateContentRequest::new(
    ///     model_names::GEMINI_2_0_FLASH,
    ///     vec![Content::user("Why is the sky blue?")],
    /// );
    /// let response = client.generate_content(&request).await?;
    /// println!("{}", response.text().unwrap_or_default());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GenaiError> {
        models::generate_content(&self.ctx, request).await
    }

    /// Generates a response as a stream of partial responses.
    pub fn stream_generate_content(
        &self,
        request: GenerateContentRequest,
    ) -> BoxStream<'_, Result<GenerateContentResponse, GenaiError>> {
        models::stream_generate_content(&self.ctx, request)
            .inspect(|chunk| {
                if let Ok(chunk) = chunk {
                    debug!("Received stream chunk: {:?}", chunk.usage_metadata);
                }
            })
            .boxed()
    }

    pub async fn count_tokens(
        &self,
        request: &CountTokensRequest,
    ) -> Result<CountTokensResponse, GenaiError> {
        models::count_tokens(&self.ctx, request).await
    }

    /// Embeds one or more contents.
    pub async fn embed_content(
        &self,
        request: &EmbedContentRequest,
    ) -> Result<EmbedContentResponse, GenaiError> {
        models::embed_content(&self.ctx, request).await
    }

    // --- Files ---

    /// Uploads a file from disk. The MIME type is detected from the
    /// extension when `mime_type` is `None`.
    pub async fn upload_file(
        &self,
        path: impl AsRef<Path>,
        mime_type: Option<&str>,
        display_name: Option<&str>,
    ) -> Result<FileMetadata, GenaiError> {
        files::upload_file(&self.ctx, path.as_ref(), mime_type, display_name).await
    }

    pub async fn upload_file_bytes(
        &self,
        bytes: Vec<u8>,
        mime_type: &str,
        display_name: Option<&str>,
    ) -> Result<FileMetadata, GenaiError> {
        files::upload_file_bytes(&self.ctx, bytes, mime_type, display_name).await
    }

    pub async fn upload_blob(
        &self,
        blob: &Blob,
        display_name: Option<&str>,
    ) -> Result<FileMetadata, GenaiError> {
        files::upload_blob(&self.ctx, blob, display_name).await
    }

    pub async fn get_file(&self, name: &str) -> Result<FileMetadata, GenaiError> {
        files::get_file(&self.ctx, name).await
    }

    pub async fn list_files(
        &self,
        page_size: Option<u32>,
        page_token: Option<&str>,
    ) -> Result<ListFilesResponse, GenaiError> {
        files::list_files(&self.ctx, page_size, page_token).await
    }

    pub fn list_all_files(&self) -> BoxStream<'_, Result<FileMetadata, GenaiError>> {
        let ctx = &self.ctx;
        paginate(move |token: Option<String>| async move {
            files::list_files(ctx, None, token.as_deref()).await
        })
        .boxed()
    }

    pub async fn delete_file(&self, name: &str) -> Result<(), GenaiError> {
        files::delete_file(&self.ctx, name).await
    }

    // --- Caches ---

    pub async fn create_cached_content(
        &self,
        request: &CreateCachedContentRequest,
    ) -> Result<CachedContent, GenaiError> {
        caches::create_cached_content(&self.ctx, request).await
    }

    pub async fn list_cached_contents(
        &self,
        page_size: Option<u32>,
        page_token: Option<&str>,
    ) -> Result<ListCachedContentsResponse, GenaiError> {
        caches::list_cached_contents(&self.ctx, page_size, page_token).await
    }

    pub fn list_all_cached_contents(&self) -> BoxStream<'_, Result<CachedContent, GenaiError>> {
        let ctx = &self.ctx;
        paginate(move |token: Option<String>| async move {
            caches::list_cached_contents(ctx, None, token.as_deref()).await
        })
        .boxed()
    }

    pub async fn get_cached_content(&self, name: &str) -> Result<CachedContent, GenaiError> {
        caches::get_cached_content(&self.ctx, name).await
    }

    /// Updates the expiration of a cache. See
    /// [`CachedContentUpdate`] for the mutable fields.
    pub async fn update_cached_content(
        &self,
        name: &str,
        update: &CachedContentUpdate,
        update_mask: Option<&str>,
    ) -> Result<CachedContent, GenaiError> {
        caches::update_cached_content(&self.ctx, name, update, update_mask).await
    }

    pub async fn delete_cached_content(&self, name: &str) -> Result<(), GenaiError> {
        caches::delete_cached_content(&self.ctx, name).await
    }

    // --- Live ---

    /// URL of the Live endpoint for this client, including the API key.
    #[must_use]
    pub fn live_url(&self) -> String {
        live_url(&self.live_base_url, self.ctx.version, &self.ctx.api_key)
    }

    /// Opens a Live session and sends `setup` as its first frame.
    ///
    /// # Errors
    ///
    /// [`GenaiError::Connection`] if the WebSocket cannot be opened or the
    /// setup frame cannot be sent.
    pub async fn connect_live(&self, setup: LiveSetup) -> Result<LiveSession, GenaiError> {
        LiveSession::connect(&self.live_url(), setup).await
    }

    /// Like [`connect_live`](Self::connect_live), abandoned with
    /// [`GenaiError::Cancelled`] if `cancel` fires first.
    pub async fn connect_live_with_cancellation(
        &self,
        setup: LiveSetup,
        cancel: &CancellationToken,
    ) -> Result<LiveSession, GenaiError> {
        self.connect_live_with(&WebSocketConnector, setup, Some(cancel))
            .await
    }

    /// Opens a Live session through a custom transport.
    pub async fn connect_live_with(
        &self,
        connector: &dyn Connector,
        setup: LiveSetup,
        cancel: Option<&CancellationToken>,
    ) -> Result<LiveSession, GenaiError> {
        LiveSession::connect_with(connector, &self.live_url(), setup, cancel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builder_defaults() {
        let client = Client::builder("test_key").build().unwrap();
        assert_eq!(client.ctx.api_key, "test_key");
        assert_eq!(client.api_version(), ApiVersion::V1Beta);
        assert_eq!(client.base_url(), "https://generativelanguage.googleapis.com");
        assert_eq!(client.live_base_url(), "wss://generativelanguage.googleapis.com");
    }

    #[test]
    fn test_client_builder_with_timeouts() {
        let client = Client::builder("test_key")
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap();
        assert_eq!(client.ctx.api_key, "test_key");
    }

    #[test]
    fn test_client_builder_overrides() {
        let client = Client::builder("k")
            .base_url("http://127.0.0.1:8080")
            .live_base_url("ws://127.0.0.1:9090/")
            .api_version(ApiVersion::V1Alpha)
            .build()
            .unwrap();

        assert_eq!(client.base_url(), "http://127.0.0.1:8080");
        assert_eq!(
            client.live_url(),
            "ws://127.0.0.1:9090/ws/google.ai.generativelanguage.v1alpha.GenerativeService.BidiGenerateContent?key=k"
        );
    }

    #[test]
    fn test_new_uses_defaults() {
        let client = Client::new("abc");
        assert_eq!(client.api_version(), ApiVersion::V1Beta);
        assert!(client.live_url().ends_with("v1beta.GenerativeService.BidiGenerateContent?key=abc"));
    }
}
