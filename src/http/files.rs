//! Files API: upload media once and reference it by URI in later requests.
//!
//! Files are stored for 48 hours. Uploads use Google's resumable protocol,
//! completed in a single `upload, finalize` request: a start request returns
//! an upload URL, then the bytes are posted to it.
//!
//! # Limits
//!
//! - Maximum file size: 2 GB
//! - Storage capacity: 20 GB per project

use super::ApiContext;
use super::common::{API_KEY_HEADER, Endpoint};
use super::error_helpers::{check_response, deserialize_with_context};
use super::loud_wire;
use crate::errors::GenaiError;
use crate::types::Blob;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

/// Represents an uploaded file in the Files API.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    /// The resource name of the file (e.g., "files/abc123")
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(default)]
    pub mime_type: String,

    /// Size in bytes. The API encodes int64 values as strings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_time: Option<DateTime<Utc>>,

    /// When the file will be automatically deleted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_time: Option<DateTime<Utc>>,

    /// Base64-encoded SHA256 hash of the contents
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256_hash: Option<String>,

    /// URI to reference this file in API calls
    #[serde(default)]
    pub uri: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_uri: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<FileState>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<FileSource>,

    /// Error information if processing failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FileError>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_metadata: Option<VideoMetadata>,
}

impl FileMetadata {
    #[must_use]
    pub fn is_processing(&self) -> bool {
        matches!(self.state, Some(FileState::Processing))
    }

    /// Returns true if the file is ready to use.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self.state, Some(FileState::Active))
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self.state, Some(FileState::Failed))
    }

    /// Parses the `size_bytes` field as a u64, if present and valid.
    #[must_use]
    pub fn size_bytes_as_u64(&self) -> Option<u64> {
        self.size_bytes.as_ref().and_then(|s| s.parse().ok())
    }
}

/// Processing state of an uploaded file.
///
/// Unrecognized states are preserved in `Unknown` unless the
/// `strict-unknown` feature is enabled, in which case they fail to
/// deserialize.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum FileState {
    Unspecified,
    Processing,
    Active,
    Failed,
    Unknown {
        /// The unrecognized state string from the API
        state_type: String,
        /// The raw JSON value, preserved for debugging
        data: serde_json::Value,
    },
}

impl FileState {
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown { .. })
    }

    /// Returns the state type name if this is an unknown state.
    #[must_use]
    pub fn unknown_state_type(&self) -> Option<&str> {
        match self {
            Self::Unknown { state_type, .. } => Some(state_type),
            _ => None,
        }
    }
}

impl Serialize for FileState {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::Unspecified => serializer.serialize_str("STATE_UNSPECIFIED"),
            Self::Processing => serializer.serialize_str("PROCESSING"),
            Self::Active => serializer.serialize_str("ACTIVE"),
            Self::Failed => serializer.serialize_str("FAILED"),
            Self::Unknown { state_type, .. } => serializer.serialize_str(state_type),
        }
    }
}

impl<'de> Deserialize<'de> for FileState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;

        match value.as_str() {
            Some("STATE_UNSPECIFIED") => Ok(Self::Unspecified),
            Some("PROCESSING") => Ok(Self::Processing),
            Some("ACTIVE") => Ok(Self::Active),
            Some("FAILED") => Ok(Self::Failed),
            other => {
                let state_type = match other {
                    Some(s) => s.to_string(),
                    None => format!("<non-string: {}>", value),
                };
                warn!(
                    "Encountered unknown FileState '{}'. \
                     This may indicate a new API feature.",
                    state_type
                );

                #[cfg(feature = "strict-unknown")]
                {
                    use serde::de::Error as _;
                    Err(D::Error::custom(format!(
                        "Unknown FileState '{}'. \
                         Strict mode is enabled via the 'strict-unknown' feature flag.",
                        state_type
                    )))
                }

                #[cfg(not(feature = "strict-unknown"))]
                {
                    Ok(Self::Unknown {
                        state_type,
                        data: value,
                    })
                }
            }
        }
    }
}

/// Where a file came from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum FileSource {
    Uploaded,
    Generated,
    #[serde(rename = "SOURCE_UNSPECIFIED")]
    #[serde(other)]
    #[default]
    Unspecified,
}

/// Error information for failed file processing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FileError {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl std::fmt::Display for FileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.code, &self.message) {
            (Some(code), Some(msg)) => write!(f, "error {}: {}", code, msg),
            (Some(code), None) => write!(f, "error {}", code),
            (None, Some(msg)) => write!(f, "{}", msg),
            (None, None) => write!(f, "unknown error"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoMetadata {
    /// Protobuf duration string, e.g. `"12.5s"`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_duration: Option<String>,
}

/// One page of files.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFilesResponse {
    #[serde(default)]
    pub files: Vec<FileMetadata>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

/// Wrapper for file upload response.
#[derive(Clone, Debug, Deserialize)]
struct FileUploadResponse {
    file: FileMetadata,
}

/// Maximum upload size accepted by the API (2 GB).
const MAX_FILE_SIZE: u64 = 2_147_483_648;

/// Read buffer size when streaming a file from disk.
const STREAM_CHUNK_SIZE: usize = 8 * 1024 * 1024;

/// Detects MIME type from file extension.
///
/// Returns `None` for unsupported or missing extensions.
///
/// ```
/// use std::path::Path;
/// use genai_net::detect_mime_type;
///
/// assert_eq!(detect_mime_type(Path::new("photo.jpg")), Some("image/jpeg"));
/// assert_eq!(detect_mime_type(Path::new("speech.WAV")), Some("audio/wav"));
/// assert_eq!(detect_mime_type(Path::new("unknown.xyz")), None);
/// ```
#[must_use]
pub fn detect_mime_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        // Images
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "heic" | "heif" => Some("image/heic"),
        // Audio
        "mp3" => Some("audio/mp3"),
        "wav" => Some("audio/wav"),
        "ogg" => Some("audio/ogg"),
        "flac" => Some("audio/flac"),
        "aac" => Some("audio/aac"),
        "m4a" => Some("audio/m4a"),
        "pcm" => Some("audio/pcm"),
        // Video
        "mp4" => Some("video/mp4"),
        "webm" => Some("video/webm"),
        "mov" => Some("video/quicktime"),
        "avi" => Some("video/x-msvideo"),
        "mkv" => Some("video/x-matroska"),
        // Documents
        "pdf" => Some("application/pdf"),
        "txt" => Some("text/plain"),
        "md" => Some("text/markdown"),
        "html" | "htm" => Some("text/html"),
        "csv" => Some("text/csv"),
        "json" => Some("application/json"),
        _ => None,
    }
}

fn validate_size(size: u64) -> Result<(), GenaiError> {
    if size == 0 {
        return Err(GenaiError::InvalidInput(
            "Cannot upload empty file".to_string(),
        ));
    }
    if size > MAX_FILE_SIZE {
        return Err(GenaiError::InvalidInput(format!(
            "File size {} bytes exceeds maximum allowed size of {} bytes (2 GB)",
            size, MAX_FILE_SIZE
        )));
    }
    Ok(())
}

/// Step 1 of the resumable protocol: announce the upload and get its URL.
async fn start_resumable_upload(
    ctx: &ApiContext,
    size: u64,
    mime_type: &str,
    display_name: Option<&str>,
) -> Result<String, GenaiError> {
    let metadata = match display_name {
        Some(name) => serde_json::json!({ "file": { "displayName": name } }),
        None => serde_json::json!({ "file": {} }),
    };

    let start_response = ctx
        .http_client
        .post(ctx.url(Endpoint::UploadFile))
        .header(API_KEY_HEADER, &ctx.api_key)
        .header("X-Goog-Upload-Protocol", "resumable")
        .header("X-Goog-Upload-Command", "start")
        .header("X-Goog-Upload-Header-Content-Length", size.to_string())
        .header("X-Goog-Upload-Header-Content-Type", mime_type)
        .json(&metadata)
        .send()
        .await?;

    let start_response = check_response(start_response).await?;

    let upload_url = start_response
        .headers()
        .get("x-goog-upload-url")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            GenaiError::MalformedResponse("Missing upload URL in response headers".to_string())
        })?
        .to_string();

    debug!("Got upload URL, uploading file data...");
    Ok(upload_url)
}

/// Step 2: send all bytes with `upload, finalize` and parse the file metadata.
async fn finalize_upload(
    ctx: &ApiContext,
    upload_url: &str,
    size: u64,
    body: reqwest::Body,
    request_id: usize,
) -> Result<FileMetadata, GenaiError> {
    let upload_response = ctx
        .http_client
        .post(upload_url)
        .header("X-Goog-Upload-Offset", "0")
        .header("X-Goog-Upload-Command", "upload, finalize")
        .header("Content-Length", size.to_string())
        .body(body)
        .send()
        .await?;

    loud_wire::log_response_status(request_id, upload_response.status().as_u16());
    let upload_response = check_response(upload_response).await?;

    let upload_status = upload_response
        .headers()
        .get("x-goog-upload-status")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    if let Some(status) = upload_status
        && status != "final"
    {
        return Err(GenaiError::MalformedResponse(format!(
            "Upload status is '{status}', expected 'final'"
        )));
    }

    let response_text = upload_response.text().await.map_err(GenaiError::Http)?;
    loud_wire::log_response_body(request_id, &response_text);

    let file_response: FileUploadResponse =
        deserialize_with_context(&response_text, "FileUploadResponse")?;

    debug!(
        "File uploaded successfully: name={}, uri={}",
        file_response.file.name, file_response.file.uri
    );
    loud_wire::log_upload_complete(request_id, &file_response.file.uri);

    Ok(file_response.file)
}

/// Uploads a file from disk, streaming it without loading it into memory.
///
/// When `mime_type` is `None` it is detected from the file extension; when
/// `display_name` is `None` the file name is used.
///
/// # Errors
///
/// Returns [`GenaiError::InvalidInput`] if the file is empty, too large,
/// unreadable, or its MIME type cannot be detected.
pub async fn upload_file(
    ctx: &ApiContext,
    path: &Path,
    mime_type: Option<&str>,
    display_name: Option<&str>,
) -> Result<FileMetadata, GenaiError> {
    let mime_type = match mime_type.or_else(|| detect_mime_type(path)) {
        Some(mime) => mime,
        None => {
            return Err(GenaiError::InvalidInput(format!(
                "Cannot detect MIME type for '{}'. Pass it explicitly.",
                path.display()
            )));
        }
    };

    let metadata = tokio::fs::metadata(path).await.map_err(|e| {
        warn!("Failed to get file metadata for '{}': {}", path.display(), e);
        GenaiError::InvalidInput(format!("Failed to access file '{}': {}", path.display(), e))
    })?;
    let file_size = metadata.len();
    validate_size(file_size)?;

    debug!(
        "Streaming upload: path={}, size={} bytes, mime_type={}",
        path.display(),
        file_size,
        mime_type
    );

    let display_name = display_name
        .map(str::to_owned)
        .or_else(|| path.file_name().map(|n| n.to_string_lossy().into_owned()));

    let request_id = loud_wire::next_request_id();
    loud_wire::log_upload_start(
        request_id,
        display_name.as_deref().unwrap_or("(unnamed)"),
        mime_type,
        file_size,
    );

    let upload_url =
        start_resumable_upload(ctx, file_size, mime_type, display_name.as_deref()).await?;

    let file = tokio::fs::File::open(path).await.map_err(|e| {
        warn!("Failed to open file '{}': {}", path.display(), e);
        GenaiError::InvalidInput(format!("Failed to open file '{}': {}", path.display(), e))
    })?;
    let body = reqwest::Body::wrap_stream(ReaderStream::with_capacity(file, STREAM_CHUNK_SIZE));

    finalize_upload(ctx, &upload_url, file_size, body, request_id).await
}

/// Uploads in-memory bytes.
pub async fn upload_file_bytes(
    ctx: &ApiContext,
    bytes: Vec<u8>,
    mime_type: &str,
    display_name: Option<&str>,
) -> Result<FileMetadata, GenaiError> {
    let file_size = bytes.len() as u64;
    validate_size(file_size)?;

    debug!(
        "Uploading bytes: size={} bytes, mime_type={}, display_name={:?}",
        file_size, mime_type, display_name
    );

    let request_id = loud_wire::next_request_id();
    loud_wire::log_upload_start(
        request_id,
        display_name.unwrap_or("(unnamed)"),
        mime_type,
        file_size,
    );

    let upload_url = start_resumable_upload(ctx, file_size, mime_type, display_name).await?;
    finalize_upload(ctx, &upload_url, file_size, bytes.into(), request_id).await
}

/// Uploads the decoded contents of a base64 [`Blob`], using its MIME type.
pub async fn upload_blob(
    ctx: &ApiContext,
    blob: &Blob,
    display_name: Option<&str>,
) -> Result<FileMetadata, GenaiError> {
    let bytes = blob.decode()?;
    upload_file_bytes(ctx, bytes, &blob.mime_type, display_name).await
}

/// Gets metadata for a specific file (e.g. `files/abc123`).
pub async fn get_file(ctx: &ApiContext, name: &str) -> Result<FileMetadata, GenaiError> {
    debug!("Getting file metadata: {}", name);

    let file: FileMetadata = ctx
        .execute::<(), _>(Method::GET, Endpoint::GetFile { name }, None, "FileMetadata")
        .await?;

    debug!("Got file: state={:?}", file.state);
    Ok(file)
}

/// Lists one page of uploaded files.
pub async fn list_files(
    ctx: &ApiContext,
    page_size: Option<u32>,
    page_token: Option<&str>,
) -> Result<ListFilesResponse, GenaiError> {
    debug!(
        "Listing files: page_size={:?}, page_token={:?}",
        page_size, page_token
    );

    let list_response: ListFilesResponse = ctx
        .execute::<(), _>(
            Method::GET,
            Endpoint::ListFiles {
                page_size,
                page_token,
            },
            None,
            "ListFilesResponse",
        )
        .await?;

    debug!("Listed {} files", list_response.files.len());
    Ok(list_response)
}

/// Deletes an uploaded file.
pub async fn delete_file(ctx: &ApiContext, name: &str) -> Result<(), GenaiError> {
    debug!("Deleting file: {}", name);
    ctx.execute_empty(Method::DELETE, Endpoint::DeleteFile { name })
        .await?;
    debug!("File deleted successfully");
    Ok(())
}
