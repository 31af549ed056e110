/// Represents the API version to target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ApiVersion {
    /// V1 Beta API version (default)
    #[default]
    V1Beta,
    /// V1 Alpha, for preview features such as ephemeral Live options
    V1Alpha,
}

impl ApiVersion {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::V1Beta => "v1beta",
            Self::V1Alpha => "v1alpha",
        }
    }
}

// --- URL Construction ---
pub(crate) const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub(crate) const DEFAULT_LIVE_BASE_URL: &str = "wss://generativelanguage.googleapis.com";

/// Header name for API key authentication on REST calls.
///
/// The Live endpoint is the exception: it takes the key as a `key` query
/// parameter, see [`live_url`].
pub const API_KEY_HEADER: &str = "X-Goog-Api-Key";

/// REST endpoints of the Generative Language API.
///
/// Resource names (`models/...`, `files/...`, `cachedContents/...`) are
/// expected in their full form; see [`model_resource_name`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint<'a> {
    GetModel { name: &'a str },
    ListModels { page_size: Option<u32>, page_token: Option<&'a str> },
    GenerateContent { model: &'a str, stream: bool },
    CountTokens { model: &'a str },
    EmbedContent { model: &'a str },
    BatchEmbedContents { model: &'a str },
    /// Starts a resumable upload. Lives under the `/upload` prefix.
    UploadFile,
    GetFile { name: &'a str },
    ListFiles { page_size: Option<u32>, page_token: Option<&'a str> },
    DeleteFile { name: &'a str },
    CreateCachedContent,
    ListCachedContents { page_size: Option<u32>, page_token: Option<&'a str> },
    GetCachedContent { name: &'a str },
    UpdateCachedContent { name: &'a str, update_mask: Option<&'a str> },
    DeleteCachedContent { name: &'a str },
}

impl Endpoint<'_> {
    /// Constructs the URL path for this endpoint
    fn to_path(&self, version: ApiVersion) -> String {
        let v = version.as_str();
        match self {
            Self::GetModel { name }
            | Self::GetFile { name }
            | Self::DeleteFile { name }
            | Self::GetCachedContent { name }
            | Self::UpdateCachedContent { name, .. }
            | Self::DeleteCachedContent { name } => format!("/{v}/{name}"),
            Self::ListModels { .. } => format!("/{v}/models"),
            Self::GenerateContent { model, stream: false } => {
                format!("/{v}/{model}:generateContent")
            }
            Self::GenerateContent { model, stream: true } => {
                format!("/{v}/{model}:streamGenerateContent")
            }
            Self::CountTokens { model } => format!("/{v}/{model}:countTokens"),
            Self::EmbedContent { model } => format!("/{v}/{model}:embedContent"),
            Self::BatchEmbedContents { model } => format!("/{v}/{model}:batchEmbedContents"),
            Self::UploadFile => format!("/upload/{v}/files"),
            Self::ListFiles { .. } => format!("/{v}/files"),
            Self::CreateCachedContent | Self::ListCachedContents { .. } => {
                format!("/{v}/cachedContents")
            }
        }
    }

    /// Returns the query parameters for this endpoint, already encoded.
    fn query_params(&self) -> Vec<String> {
        let mut params = Vec::new();
        match self {
            Self::GenerateContent { stream: true, .. } => params.push("alt=sse".to_string()),
            Self::ListModels {
                page_size,
                page_token,
            }
            | Self::ListFiles {
                page_size,
                page_token,
            }
            | Self::ListCachedContents {
                page_size,
                page_token,
            } => {
                if let Some(size) = page_size {
                    params.push(format!("pageSize={size}"));
                }
                if let Some(token) = page_token {
                    params.push(format!("pageToken={}", urlencoding::encode(token)));
                }
            }
            Self::UpdateCachedContent {
                update_mask: Some(mask),
                ..
            } => params.push(format!("updateMask={}", urlencoding::encode(mask))),
            _ => {}
        }
        params
    }
}

/// Constructs the full URL for an endpoint.
///
/// `base_url` is the scheme and host (no trailing slash required). API key
/// authentication is handled via the [`API_KEY_HEADER`] header, not the URL.
#[must_use]
pub fn construct_endpoint_url(base_url: &str, version: ApiVersion, endpoint: Endpoint) -> String {
    let base = base_url.trim_end_matches('/');
    let path = endpoint.to_path(version);
    let query_parts = endpoint.query_params();

    let query_string = if query_parts.is_empty() {
        String::new()
    } else {
        format!("?{}", query_parts.join("&"))
    };

    format!("{base}{path}{query_string}")
}

/// Constructs the Live `BidiGenerateContent` WebSocket URL.
///
/// The WebSocket handshake cannot carry the API key header, so the key is
/// passed as a query parameter here.
#[must_use]
pub fn live_url(live_base_url: &str, version: ApiVersion, api_key: &str) -> String {
    format!(
        "{}/ws/google.ai.generativelanguage.{}.GenerativeService.BidiGenerateContent?key={}",
        live_base_url.trim_end_matches('/'),
        version.as_str(),
        urlencoding::encode(api_key)
    )
}

/// Qualifies a bare model id (`gemini-2.0-flash`) as a resource name
/// (`models/gemini-2.0-flash`). Names that already contain a `/` are kept.
#[must_use]
pub fn model_resource_name(model: &str) -> String {
    if model.contains('/') {
        model.to_string()
    } else {
        format!("models/{model}")
    }
}
