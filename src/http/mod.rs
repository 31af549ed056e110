//! Internal HTTP layer for Gemini API communication.
//!
//! This module is `pub(crate)` - it contains implementation details
//! not exposed to library users.

pub(crate) mod caches;
pub(crate) mod common;
pub(crate) mod error_helpers;
pub(crate) mod files;
pub(crate) mod loud_wire;
pub(crate) mod models;
pub(crate) mod sse_parser;

use common::{API_KEY_HEADER, ApiVersion, Endpoint, construct_endpoint_url};
use error_helpers::{check_response, deserialize_with_context};
use reqwest::{Client as ReqwestClient, Method};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::errors::GenaiError;

/// Everything a REST call needs besides its own arguments.
#[derive(Debug, Clone)]
pub(crate) struct ApiContext {
    pub http_client: ReqwestClient,
    pub api_key: String,
    pub base_url: String,
    pub version: ApiVersion,
}

impl ApiContext {
    pub fn url(&self, endpoint: Endpoint) -> String {
        construct_endpoint_url(&self.base_url, self.version, endpoint)
    }

    /// Sends an authenticated request and parses the JSON response as `T`.
    ///
    /// Every step is mirrored to LOUD_WIRE under one request id.
    pub async fn execute<B, T>(
        &self,
        method: Method,
        endpoint: Endpoint<'_>,
        body: Option<&B>,
        type_name: &str,
    ) -> Result<T, GenaiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response_text = self.execute_raw(method, endpoint, body).await?;
        deserialize_with_context(&response_text, type_name)
    }

    /// Like [`execute`](Self::execute), but discards the response body.
    pub async fn execute_empty(
        &self,
        method: Method,
        endpoint: Endpoint<'_>,
    ) -> Result<(), GenaiError> {
        self.execute_raw::<()>(method, endpoint, None).await?;
        Ok(())
    }

    async fn execute_raw<B>(
        &self,
        method: Method,
        endpoint: Endpoint<'_>,
        body: Option<&B>,
    ) -> Result<String, GenaiError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.url(endpoint);

        // LOUD_WIRE: Log outgoing request
        let request_id = loud_wire::next_request_id();
        let request_body = match body.map(serde_json::to_string).transpose() {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Failed to serialize request body: {}", e);
                return Err(GenaiError::InvalidInput(format!(
                    "Request body could not be serialized: {e}"
                )));
            }
        };
        loud_wire::log_request(request_id, method.as_str(), &url, request_body.as_deref());

        let mut builder = self
            .http_client
            .request(method, &url)
            .header(API_KEY_HEADER, &self.api_key);
        if let Some(json) = request_body {
            builder = builder
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(json);
        }

        let response = builder.send().await?;

        // LOUD_WIRE: Log response status
        loud_wire::log_response_status(request_id, response.status().as_u16());

        let response = check_response(response).await?;
        let response_text = response.text().await.map_err(GenaiError::Http)?;

        // LOUD_WIRE: Log response body
        loud_wire::log_response_body(request_id, &response_text);

        Ok(response_text)
    }
}
