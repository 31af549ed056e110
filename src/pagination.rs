//! Lazy iteration over paged list endpoints.

use crate::errors::GenaiError;
use crate::http::files::{FileMetadata, ListFilesResponse};
use crate::types::{CachedContent, ListCachedContentsResponse, ListModelsResponse, Model};
use async_stream::try_stream;
use futures_util::Stream;
use std::future::Future;

/// One page of a list response.
pub(crate) trait Page {
    type Item;

    /// Splits the page into its items and the token of the next page.
    fn into_parts(self) -> (Vec<Self::Item>, Option<String>);
}

impl Page for ListModelsResponse {
    type Item = Model;

    fn into_parts(self) -> (Vec<Model>, Option<String>) {
        (self.models, self.next_page_token)
    }
}

impl Page for ListFilesResponse {
    type Item = FileMetadata;

    fn into_parts(self) -> (Vec<FileMetadata>, Option<String>) {
        (self.files, self.next_page_token)
    }
}

impl Page for ListCachedContentsResponse {
    type Item = CachedContent;

    fn into_parts(self) -> (Vec<CachedContent>, Option<String>) {
        (self.cached_contents, self.next_page_token)
    }
}

/// Streams every item of every page, requesting pages only as needed.
///
/// `fetch` is called with `None` for the first page and with each
/// `nextPageToken` after that, until the token is absent or empty. An error
/// on any page is yielded once and ends the stream.
pub(crate) fn paginate<'a, P, F, Fut>(
    fetch: F,
) -> impl Stream<Item = Result<P::Item, GenaiError>> + Send + 'a
where
    P: Page + Send + 'a,
    P::Item: Send + 'a,
    F: Fn(Option<String>) -> Fut + Send + 'a,
    Fut: Future<Output = Result<P, GenaiError>> + Send + 'a,
{
    try_stream! {
        let mut page_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = fetch(page_token.take()).await?;
            pages += 1;
            let (items, next) = page.into_parts();
            for item in items {
                yield item;
            }

            match next {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        tracing::debug!("Pagination finished after {} pages", pages);
    }
}
