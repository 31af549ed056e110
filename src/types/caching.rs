//! Context caching resources.
//!
//! Expiration is expressed either as an absolute `expire_time` (RFC 3339) or a
//! relative `ttl` such as `"300s"`. Set one or the other.

use super::content::{Content, Tool, ToolConfig};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A cached prefix of content that later requests can reference by name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedContent {
    /// Server-assigned, e.g. `cachedContents/abc123`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contents: Option<Vec<Content>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Tool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_config: Option<ToolConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_metadata: Option<CachingUsageMetadata>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachingUsageMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_token_count: Option<u32>,
}

/// Body of `POST cachedContents`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCachedContentRequest {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contents: Option<Vec<Content>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Tool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_config: Option<ToolConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,
}

impl CreateCachedContentRequest {
    #[must_use]
    pub fn new(model: impl Into<String>, contents: Vec<Content>) -> Self {
        Self {
            model: model.into(),
            display_name: None,
            contents: Some(contents),
            tools: None,
            system_instruction: None,
            tool_config: None,
            expire_time: None,
            ttl: None,
        }
    }

    #[must_use]
    pub fn with_ttl(mut self, ttl: impl Into<String>) -> Self {
        self.ttl = Some(ttl.into());
        self
    }

    #[must_use]
    pub fn with_system_instruction(mut self, instruction: impl Into<Content>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

/// Fields that may change on an existing cache. Only expiration is mutable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedContentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCachedContentsResponse {
    #[serde(default)]
    pub cached_contents: Vec<CachedContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_request_shape() {
        let request = CreateCachedContentRequest::new(
            "models/gemini-1.5-flash-001",
            vec![Content::user("A long transcript...")],
        )
        .with_ttl("300s")
        .with_system_instruction("Answer from the transcript only.");

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "models/gemini-1.5-flash-001");
        assert_eq!(value["ttl"], "300s");
        assert_eq!(
            value["systemInstruction"],
            json!({"parts": [{"text": "Answer from the transcript only."}]})
        );
        assert!(value.get("expireTime").is_none());
    }

    #[test]
    fn test_cached_content_parses_timestamps() {
        let cached: CachedContent = serde_json::from_value(json!({
            "name": "cachedContents/abc",
            "model": "models/gemini-1.5-flash-001",
            "createTime": "2026-01-01T00:00:00Z",
            "expireTime": "2026-01-01T00:05:00.123456Z",
            "usageMetadata": {"totalTokenCount": 40000}
        }))
        .unwrap();
        assert_eq!(cached.name.as_deref(), Some("cachedContents/abc"));
        assert!(cached.expire_time.unwrap() > cached.create_time.unwrap());
        assert_eq!(cached.usage_metadata.unwrap().total_token_count, Some(40000));
    }

    #[test]
    fn test_update_serializes_only_set_fields() {
        let update = CachedContentUpdate {
            ttl: Some("600s".to_string()),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({"ttl": "600s"}));
    }
}
