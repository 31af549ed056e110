//! Model metadata, content generation, token counting, and embeddings.

use super::ApiContext;
use super::common::{API_KEY_HEADER, Endpoint, model_resource_name};
use super::error_helpers::check_response;
use super::loud_wire;
use super::sse_parser::parse_sse_stream;
use crate::errors::GenaiError;
use crate::types::embeddings::{BatchEmbedRequest, RawEmbedResponse};
use crate::types::{
    CountTokensRequest, CountTokensResponse, EmbedContentRequest, EmbedContentResponse,
    GenerateContentRequest, GenerateContentResponse, ListModelsResponse, Model,
};
use async_stream::try_stream;
use futures_util::{Stream, StreamExt};
use reqwest::Method;
use tracing::debug;

/// Gets metadata for one model. Bare ids are qualified with `models/`.
pub async fn get_model(ctx: &ApiContext, name: &str) -> Result<Model, GenaiError> {
    let name = model_resource_name(name);
    debug!("Getting model: {}", name);

    ctx.execute::<(), _>(Method::GET, Endpoint::GetModel { name: &name }, None, "Model")
        .await
}

/// Lists one page of models.
pub async fn list_models(
    ctx: &ApiContext,
    page_size: Option<u32>,
    page_token: Option<&str>,
) -> Result<ListModelsResponse, GenaiError> {
    debug!(
        "Listing models: page_size={:?}, page_token={:?}",
        page_size, page_token
    );

    let response: ListModelsResponse = ctx
        .execute::<(), _>(
            Method::GET,
            Endpoint::ListModels {
                page_size,
                page_token,
            },
            None,
            "ListModelsResponse",
        )
        .await?;

    debug!("Listed {} models", response.models.len());
    Ok(response)
}

/// Generates a complete response for `request`.
///
/// # Errors
///
/// Returns an error if:
/// - The HTTP request fails
/// - The API returns a non-success status
/// - The response cannot be parsed
pub async fn generate_content(
    ctx: &ApiContext,
    request: &GenerateContentRequest,
) -> Result<GenerateContentResponse, GenaiError> {
    let model = model_resource_name(&request.model);
    debug!("Generating content: model={}", model);

    let response: GenerateContentResponse = ctx
        .execute(
            Method::POST,
            Endpoint::GenerateContent {
                model: &model,
                stream: false,
            },
            Some(request),
            "GenerateContentResponse",
        )
        .await?;

    debug!(
        "Generated content: candidates={}",
        response.candidates.as_ref().map_or(0, Vec::len)
    );
    Ok(response)
}

/// Streams partial responses for `request` over SSE.
///
/// Each item is a `GenerateContentResponse` chunk; concatenating their text
/// gives the full answer.
pub fn stream_generate_content<'a>(
    ctx: &'a ApiContext,
    request: GenerateContentRequest,
) -> impl Stream<Item = Result<GenerateContentResponse, GenaiError>> + Send + 'a {
    let model = model_resource_name(&request.model);
    let url = ctx.url(Endpoint::GenerateContent {
        model: &model,
        stream: true,
    });

    // LOUD_WIRE: Log outgoing request (before try_stream! to capture request_id)
    let request_id = loud_wire::next_request_id();
    let request_body = match serde_json::to_string(&request) {
        Ok(body) => Some(body),
        Err(e) => {
            tracing::warn!("LOUD_WIRE: Failed to serialize request body: {}", e);
            None
        }
    };
    loud_wire::log_request(request_id, "POST (stream)", &url, request_body.as_deref());

    try_stream! {
        debug!("Streaming content: model={}", model);

        let response = ctx
            .http_client
            .post(&url)
            .header(API_KEY_HEADER, &ctx.api_key)
            .json(&request)
            .send()
            .await?;

        // LOUD_WIRE: Log response status
        loud_wire::log_response_status(request_id, response.status().as_u16());

        let response = check_response(response).await?;
        let parsed_stream =
            parse_sse_stream::<GenerateContentResponse>(response.bytes_stream(), request_id);
        futures_util::pin_mut!(parsed_stream);

        let mut chunks = 0usize;
        while let Some(result) = parsed_stream.next().await {
            let chunk = result?;
            chunks += 1;
            yield chunk;
        }

        debug!("Content stream finished after {} chunks", chunks);
    }
}

/// Counts the tokens `request` would consume.
pub async fn count_tokens(
    ctx: &ApiContext,
    request: &CountTokensRequest,
) -> Result<CountTokensResponse, GenaiError> {
    let model = model_resource_name(&request.model);
    debug!("Counting tokens: model={}", model);

    ctx.execute(
        Method::POST,
        Endpoint::CountTokens { model: &model },
        Some(request),
        "CountTokensResponse",
    )
    .await
}

/// Embeds every content in `request`.
///
/// A single content goes to `:embedContent`; several go to
/// `:batchEmbedContents`. Both are returned as a list of embeddings in
/// request order.
///
/// # Errors
///
/// Returns [`GenaiError::InvalidInput`] if `request.contents` is empty.
pub async fn embed_content(
    ctx: &ApiContext,
    request: &EmbedContentRequest,
) -> Result<EmbedContentResponse, GenaiError> {
    if request.contents.is_empty() {
        return Err(GenaiError::InvalidInput(
            "Embedding request must contain at least one content".to_string(),
        ));
    }

    let model = model_resource_name(&request.model);
    let mut bodies = request.single_requests();
    debug!("Embedding {} contents: model={}", bodies.len(), model);

    let raw: RawEmbedResponse = if bodies.len() == 1 {
        ctx.execute(
            Method::POST,
            Endpoint::EmbedContent { model: &model },
            Some(&bodies[0]),
            "EmbedContentResponse",
        )
        .await?
    } else {
        for body in &mut bodies {
            body.model = Some(&model);
        }
        ctx.execute(
            Method::POST,
            Endpoint::BatchEmbedContents { model: &model },
            Some(&BatchEmbedRequest { requests: bodies }),
            "BatchEmbedContentsResponse",
        )
        .await?
    };

    Ok(raw.into_response())
}
