//! # genai-net
//!
//! A Rust client for Google's Generative Language (Gemini) API.
//!
//! - REST: content generation (whole or streamed over SSE), token counting,
//!   embeddings, model metadata, the Files API and context caching.
//! - Live: a persistent bidirectional WebSocket session for real-time text
//!   and audio, see [`LiveSession`].
//!
//! ## Quick start
//!
//! ```no_run
//! use genai_net::{Client, Content, GenerateContentRequest, model_names};
//!
//! # async fn run() -> Result<(), genai_net::GenaiError> {
//! let client = Client::from_env()?;
//! let request = GenerateContentRequest::new(
//!     model_names::GEMINI_2_0_FLASH,
//!     vec![Content::user("Write a haiku about Rust.")],
//! );
//! let response = client.generate_content(&request).await?;
//! println!("{}", response.text().unwrap_or_default());
//! # Ok(())
//! # }
//! ```
//!
//! ## Debugging
//!
//! Set `LOUD_WIRE=1` to print every HTTP request, response and Live frame to
//! stderr. Library diagnostics go through `tracing`.
//!
//! ## Feature flags
//!
//! - `strict-unknown`: fail deserialization on unknown file states instead of
//!   keeping them as `Unknown`.

mod client;
mod errors;
pub(crate) mod http;
pub mod live;
pub mod model_names;
mod pagination;
mod response_ext;
pub mod types;

pub use client::{API_KEY_ENV_VAR, Client, ClientBuilder};
pub use errors::GenaiError;
pub use http::common::ApiVersion;
pub use http::files::{
    FileError, FileMetadata, FileSource, FileState, ListFilesResponse, VideoMetadata,
    detect_mime_type,
};
pub use live::{LiveSession, SessionState};
pub use types::*;
