use serde::{Deserialize, Serialize};

/// Metadata about a generative model.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Resource name, e.g. `models/gemini-2.0-flash`.
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_model_id: Option<String>,
    #[serde(default)]
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_token_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_token_limit: Option<u32>,
    #[serde(default)]
    pub supported_generation_methods: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
}

impl Model {
    /// Returns true if the model lists `method` (e.g. `"bidiGenerateContent"`)
    /// among its supported generation methods.
    #[must_use]
    pub fn supports(&self, method: &str) -> bool {
        self.supported_generation_methods.iter().any(|m| m == method)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListModelsResponse {
    #[serde(default)]
    pub models: Vec<Model>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_deserializes_and_reports_methods() {
        let model: Model = serde_json::from_str(
            r#"{
                "name": "models/gemini-2.0-flash-live-001",
                "version": "001",
                "displayName": "Gemini 2.0 Flash Live",
                "inputTokenLimit": 131072,
                "supportedGenerationMethods": ["bidiGenerateContent", "countTokens"]
            }"#,
        )
        .unwrap();
        assert_eq!(model.input_token_limit, Some(131072));
        assert!(model.supports("bidiGenerateContent"));
        assert!(!model.supports("embedContent"));
    }

    #[test]
    fn test_list_models_response_without_models_field() {
        let response: ListModelsResponse = serde_json::from_str("{}").unwrap();
        assert!(response.models.is_empty());
        assert!(response.next_page_token.is_none());
    }
}
