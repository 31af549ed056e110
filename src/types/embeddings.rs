use super::content::Content;
use serde::{Deserialize, Serialize};

/// A request to embed one or more contents with the same settings.
///
/// One content is sent to `:embedContent`; several are sent as one
/// `:batchEmbedContents` call. The response shape is the same either way.
#[derive(Clone, Debug, PartialEq)]
pub struct EmbedContentRequest {
    pub model: String,
    pub contents: Vec<Content>,
    pub task_type: Option<TaskType>,
    /// Only meaningful with [`TaskType::RetrievalDocument`].
    pub title: Option<String>,
    pub output_dimensionality: Option<u32>,
}

impl EmbedContentRequest {
    #[must_use]
    pub fn new(model: impl Into<String>, contents: Vec<Content>) -> Self {
        Self {
            model: model.into(),
            contents,
            task_type: None,
            title: None,
            output_dimensionality: None,
        }
    }

    #[must_use]
    pub fn with_task_type(mut self, task_type: TaskType) -> Self {
        self.task_type = Some(task_type);
        self
    }

    #[must_use]
    pub fn with_output_dimensionality(mut self, dimensions: u32) -> Self {
        self.output_dimensionality = Some(dimensions);
        self
    }

    /// Wire bodies for each content, in order.
    pub(crate) fn single_requests(&self) -> Vec<SingleEmbedRequest<'_>> {
        self.contents
            .iter()
            .map(|content| SingleEmbedRequest {
                model: None,
                content,
                task_type: self.task_type,
                title: self.title.as_deref(),
                output_dimensionality: self.output_dimensionality,
            })
            .collect()
    }
}

/// Body of `:embedContent`, and one entry of `:batchEmbedContents`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SingleEmbedRequest<'a> {
    /// Required per entry in batch calls.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<&'a str>,
    pub content: &'a Content,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_type: Option<TaskType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dimensionality: Option<u32>,
}

#[derive(Debug, Serialize)]
pub(crate) struct BatchEmbedRequest<'a> {
    pub requests: Vec<SingleEmbedRequest<'a>>,
}

/// Raw response of either endpoint before normalization.
#[derive(Debug, Deserialize)]
pub(crate) struct RawEmbedResponse {
    #[serde(default)]
    pub embedding: Option<ContentEmbedding>,
    #[serde(default)]
    pub embeddings: Option<Vec<ContentEmbedding>>,
}

impl RawEmbedResponse {
    pub(crate) fn into_response(self) -> EmbedContentResponse {
        let embeddings = match (self.embeddings, self.embedding) {
            (Some(many), _) => many,
            (None, Some(one)) => vec![one],
            (None, None) => Vec::new(),
        };
        EmbedContentResponse { embeddings }
    }
}

/// Embeddings in the same order as the request contents.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbedContentResponse {
    pub embeddings: Vec<ContentEmbedding>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentEmbedding {
    #[serde(default)]
    pub values: Vec<f32>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum TaskType {
    RetrievalQuery,
    RetrievalDocument,
    SemanticSimilarity,
    Classification,
    Clustering,
    QuestionAnswering,
    FactVerification,
    CodeRetrievalQuery,
    #[serde(rename = "TASK_TYPE_UNSPECIFIED")]
    #[serde(other)]
    #[default]
    Unspecified,
}
