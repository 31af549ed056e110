//! Context caching: store a large prompt prefix once and reference it from
//! later `generateContent` calls via `cached_content`.

use super::ApiContext;
use super::common::{Endpoint, model_resource_name};
use crate::errors::GenaiError;
use crate::types::{
    CachedContent, CachedContentUpdate, CreateCachedContentRequest, ListCachedContentsResponse,
};
use reqwest::Method;
use std::borrow::Cow;
use tracing::debug;

/// Creates a cache. A bare model id in the request is qualified with `models/`.
pub async fn create_cached_content(
    ctx: &ApiContext,
    request: &CreateCachedContentRequest,
) -> Result<CachedContent, GenaiError> {
    let model = model_resource_name(&request.model);
    let request = if model == request.model {
        Cow::Borrowed(request)
    } else {
        let mut owned = request.clone();
        owned.model = model;
        Cow::Owned(owned)
    };
    debug!("Creating cached content: model={}", request.model);

    let cache: CachedContent = ctx
        .execute(
            Method::POST,
            Endpoint::CreateCachedContent,
            Some(request.as_ref()),
            "CachedContent",
        )
        .await?;

    debug!("Created cached content: name={:?}", cache.name);
    Ok(cache)
}

pub async fn list_cached_contents(
    ctx: &ApiContext,
    page_size: Option<u32>,
    page_token: Option<&str>,
) -> Result<ListCachedContentsResponse, GenaiError> {
    debug!(
        "Listing cached contents: page_size={:?}, page_token={:?}",
        page_size, page_token
    );

    ctx.execute::<(), _>(
        Method::GET,
        Endpoint::ListCachedContents {
            page_size,
            page_token,
        },
        None,
        "ListCachedContentsResponse",
    )
    .await
}

pub async fn get_cached_content(ctx: &ApiContext, name: &str) -> Result<CachedContent, GenaiError> {
    debug!("Getting cached content: {}", name);
    ctx.execute::<(), _>(
        Method::GET,
        Endpoint::GetCachedContent { name },
        None,
        "CachedContent",
    )
    .await
}

/// Changes the expiration of a cache.
///
/// `update_mask` names the fields to apply (e.g. `"ttl"`); when `None` the
/// server applies every field present in `update`.
pub async fn update_cached_content(
    ctx: &ApiContext,
    name: &str,
    update: &CachedContentUpdate,
    update_mask: Option<&str>,
) -> Result<CachedContent, GenaiError> {
    debug!(
        "Updating cached content: {} (update_mask={:?})",
        name, update_mask
    );
    ctx.execute(
        Method::PATCH,
        Endpoint::UpdateCachedContent { name, update_mask },
        Some(update),
        "CachedContent",
    )
    .await
}

pub async fn delete_cached_content(ctx: &ApiContext, name: &str) -> Result<(), GenaiError> {
    debug!("Deleting cached content: {}", name);
    ctx.execute_empty(Method::DELETE, Endpoint::DeleteCachedContent { name })
        .await
}
