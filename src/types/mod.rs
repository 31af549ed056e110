//! Serde models for every request and response the client sends or receives.

pub mod caching;
pub mod content;
pub mod embeddings;
pub mod generation;
pub mod live;
pub mod models;

pub use caching::*;
pub use content::*;
pub use embeddings::{ContentEmbedding, EmbedContentRequest, EmbedContentResponse, TaskType};
pub use generation::*;
pub use live::*;
pub use models::*;
