//! Content, part, and tool types shared by generation, caching, token
//! counting, embeddings, and Live sessions.

use crate::errors::GenaiError;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A message in a conversation: a role plus one or more parts.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
    /// `"user"` or `"model"`. Omitted for system instructions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl Content {
    /// Text content without a role (used for system instructions).
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![Part::text(text)],
            role: None,
        }
    }

    /// Text content authored by the user.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            parts: vec![Part::text(text)],
            role: Some("user".to_string()),
        }
    }

    /// Text content authored by the model.
    #[must_use]
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            parts: vec![Part::text(text)],
            role: Some("model".to_string()),
        }
    }

    /// Content with an explicit role and parts.
    #[must_use]
    pub fn with_parts(role: impl Into<String>, parts: Vec<Part>) -> Self {
        Self {
            parts,
            role: Some(role.into()),
        }
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Content::text(text)
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Content::text(text)
    }
}

/// One piece of a [`Content`]. At most one data field is expected to be set.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    /// Marks the part as a thought summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thought: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<Blob>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_response: Option<FunctionResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_data: Option<FileData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executable_code: Option<ExecutableCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_execution_result: Option<CodeExecutionResult>,
}

impl Part {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn inline_data(blob: Blob) -> Self {
        Self {
            inline_data: Some(blob),
            ..Default::default()
        }
    }

    /// A reference to a file uploaded through the Files API.
    #[must_use]
    pub fn file_data(file_uri: impl Into<String>, mime_type: Option<String>) -> Self {
        Self {
            file_data: Some(FileData {
                mime_type,
                file_uri: file_uri.into(),
            }),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn function_response(response: FunctionResponse) -> Self {
        Self {
            function_response: Some(response),
            ..Default::default()
        }
    }
}

/// Raw media bytes, base64-encoded on the wire.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    pub mime_type: String,
    /// Base64-encoded bytes.
    pub data: String,
}

impl Blob {
    /// Base64-encodes `bytes` into a new blob.
    #[must_use]
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
        }
    }

    /// Decodes the base64 payload.
    ///
    /// # Errors
    ///
    /// Returns [`GenaiError::InvalidInput`] if the data is not valid base64.
    pub fn decode(&self) -> Result<Vec<u8>, GenaiError> {
        base64::engine::general_purpose::STANDARD
            .decode(&self.data)
            .map_err(|e| GenaiError::InvalidInput(format!("Invalid base64 blob data: {}", e)))
    }
}

/// A function call requested by the model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionCall {
    /// Correlation id; echoed back in the matching [`FunctionResponse`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<serde_json::Value>,
}

/// The result of executing a [`FunctionCall`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<serde_json::Value>,
}

impl FunctionResponse {
    #[must_use]
    pub fn new(
        id: Option<String>,
        name: impl Into<String>,
        response: serde_json::Value,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            response: Some(response),
        }
    }
}

/// URI-based data, usually a file from the Files API.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    pub file_uri: String,
}

/// Code generated by the model for the code execution tool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutableCode {
    pub language: ExecutableCodeLanguage,
    pub code: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ExecutableCodeLanguage {
    Python,
    #[serde(rename = "LANGUAGE_UNSPECIFIED")]
    #[serde(other)]
    #[default]
    Unspecified,
}

/// Result of running an [`ExecutableCode`] part.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeExecutionResult {
    pub outcome: CodeExecutionOutcome,
    /// stdout on success, stderr or another description otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum CodeExecutionOutcome {
    #[serde(rename = "OUTCOME_OK")]
    Ok,
    #[serde(rename = "OUTCOME_FAILED")]
    Failed,
    #[serde(rename = "OUTCOME_DEADLINE_EXCEEDED")]
    DeadlineExceeded,
    /// Unrecognized outcome for forward compatibility
    #[serde(rename = "OUTCOME_UNSPECIFIED")]
    #[serde(other)]
    #[default]
    Unspecified,
}

impl CodeExecutionOutcome {
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

/// A tool the model may use. Populate exactly one field per tool.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_declarations: Option<Vec<FunctionDeclaration>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_search_retrieval: Option<GoogleSearchRetrieval>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_execution: Option<CodeExecution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_search: Option<GoogleSearch>,
}

impl Tool {
    #[must_use]
    pub fn functions(declarations: Vec<FunctionDeclaration>) -> Self {
        Self {
            function_declarations: Some(declarations),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn code_execution() -> Self {
        Self {
            code_execution: Some(CodeExecution {}),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn google_search() -> Self {
        Self {
            google_search: Some(GoogleSearch {}),
            ..Default::default()
        }
    }
}

/// Marker for the code execution tool. Serializes as `{}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeExecution {}

/// Marker for the Google Search tool. Serializes as `{}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoogleSearch {}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleSearchRetrieval {
    pub dynamic_retrieval_config: DynamicRetrievalConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicRetrievalConfig {
    pub mode: DynamicRetrievalMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dynamic_threshold: Option<f64>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum DynamicRetrievalMode {
    #[serde(rename = "MODE_DYNAMIC")]
    Dynamic,
    #[serde(rename = "MODE_UNSPECIFIED")]
    #[serde(other)]
    #[default]
    Unspecified,
}

/// A function the model may call. The parameter schema is caller-supplied.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDeclaration {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Schema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<Schema>,
}

/// Subset of OpenAPI 3.0 schema understood by the API.
///
/// Integer bounds such as `maxItems` are int64 values the API transports as
/// strings, so they are kept as strings here.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "type")]
    pub data_type: DataType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_properties: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_properties: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub any_of: Option<Vec<Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_ordering: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
}

impl Schema {
    /// A schema node of the given type with every other field unset.
    #[must_use]
    pub fn of(data_type: DataType) -> Self {
        Self {
            data_type,
            ..Default::default()
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum DataType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    Null,
    #[serde(rename = "TYPE_UNSPECIFIED")]
    #[serde(other)]
    #[default]
    Unspecified,
}

/// Tool configuration shared by all tools in a request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_calling_config: Option<FunctionCallingConfig>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionCallingConfig {
    pub mode: FunctionCallingMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_function_names: Option<Vec<String>>,
}

/// Modes for function calling behavior.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum FunctionCallingMode {
    Auto,
    Any,
    None,
    Validated,
    #[serde(rename = "MODE_UNSPECIFIED")]
    #[serde(other)]
    #[default]
    Unspecified,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_content_omits_unset_fields() {
        let content = Content::user("Hello");
        let value = serde_json::to_value(&content).unwrap();
        assert_eq!(value, json!({"parts": [{"text": "Hello"}], "role": "user"}));
    }

    #[test]
    fn test_system_instruction_has_no_role() {
        let value = serde_json::to_value(Content::from("Be terse.")).unwrap();
        assert_eq!(value, json!({"parts": [{"text": "Be terse."}]}));
    }

    #[test]
    fn test_part_deserializes_camel_case_fields() {
        let part: Part = serde_json::from_value(json!({
            "functionCall": {"id": "call-1", "name": "get_weather", "args": {"city": "Paris"}}
        }))
        .unwrap();
        let call = part.function_call.expect("function call");
        assert_eq!(call.id.as_deref(), Some("call-1"));
        assert_eq!(call.name, "get_weather");
        assert_eq!(call.args, Some(json!({"city": "Paris"})));
        assert!(part.text.is_none());
    }

    #[test]
    fn test_blob_base64_helpers() {
        let blob = Blob::from_bytes("audio/pcm;rate=16000", &[0, 1, 2, 255]);
        assert_eq!(blob.data, "AAEC/w==");
        assert_eq!(blob.decode().unwrap(), vec![0, 1, 2, 255]);
    }

    #[test]
    fn test_blob_decode_rejects_invalid_base64() {
        let blob = Blob {
            mime_type: "image/png".to_string(),
            data: "not base64!!".to_string(),
        };
        assert!(matches!(blob.decode(), Err(GenaiError::InvalidInput(_))));
    }

    #[test]
    fn test_tool_markers_serialize_as_empty_objects() {
        let value = serde_json::to_value(Tool::code_execution()).unwrap();
        assert_eq!(value, json!({"codeExecution": {}}));
        let value = serde_json::to_value(Tool::google_search()).unwrap();
        assert_eq!(value, json!({"googleSearch": {}}));
    }

    #[test]
    fn test_function_declaration_with_schema() {
        let mut properties = BTreeMap::new();
        properties.insert("city".to_string(), Schema::of(DataType::String));
        let declaration = FunctionDeclaration {
            name: "get_weather".to_string(),
            description: "Current weather".to_string(),
            parameters: Some(Schema {
                data_type: DataType::Object,
                properties: Some(properties),
                required: Some(vec!["city".to_string()]),
                ..Default::default()
            }),
            response: None,
        };

        let value = serde_json::to_value(Tool::functions(vec![declaration])).unwrap();
        assert_eq!(
            value,
            json!({"functionDeclarations": [{
                "name": "get_weather",
                "description": "Current weather",
                "parameters": {
                    "type": "OBJECT",
                    "properties": {"city": {"type": "STRING"}},
                    "required": ["city"]
                }
            }]})
        );
    }

    #[test]
    fn test_unknown_enum_values_fall_back_to_unspecified() {
        let outcome: CodeExecutionOutcome = serde_json::from_str("\"OUTCOME_NEW\"").unwrap();
        assert_eq!(outcome, CodeExecutionOutcome::Unspecified);
        let mode: FunctionCallingMode = serde_json::from_str("\"SOMETHING\"").unwrap();
        assert_eq!(mode, FunctionCallingMode::Unspecified);
    }

    #[test]
    fn test_code_execution_result_outcome() {
        let result: CodeExecutionResult =
            serde_json::from_value(json!({"outcome": "OUTCOME_OK", "output": "42\n"})).unwrap();
        assert!(result.outcome.is_success());
        assert_eq!(result.output.as_deref(), Some("42\n"));
    }
}
