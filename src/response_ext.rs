//! Convenience accessors on [`GenerateContentResponse`].
//!
//! All accessors read the first candidate only, except [`all_text`], which
//! joins the text of every candidate.
//!
//! [`all_text`]: GenerateContentResponse::all_text

use crate::types::{
    Blob, Candidate, CodeExecutionResult, ExecutableCode, FinishReason, FunctionCall,
    GenerateContentResponse, Part,
};

impl GenerateContentResponse {
    fn first_candidate(&self) -> Option<&Candidate> {
        self.candidates.as_ref()?.first()
    }

    fn first_parts(&self) -> impl Iterator<Item = &Part> {
        self.first_candidate()
            .and_then(|c| c.content.as_ref())
            .into_iter()
            .flat_map(|content| content.parts.iter())
    }

    /// Text of the first candidate, thought parts excluded.
    ///
    /// Returns `None` if there is no candidate or it has no text parts.
    ///
    /// ```
    /// use genai_net::GenerateContentResponse;
    ///
    /// let response: GenerateContentResponse = serde_json::from_str(r#"{
    ///     "candidates": [{"content": {"role": "model", "parts": [
    ///         {"text": "Hello, "}, {"text": "world"}
    ///     ]}}]
    /// }"#).unwrap();
    /// assert_eq!(response.text().as_deref(), Some("Hello, world"));
    /// ```
    #[must_use]
    pub fn text(&self) -> Option<String> {
        let texts: Vec<&str> = self
            .first_parts()
            .filter(|p| p.thought != Some(true))
            .filter_map(|p| p.text.as_deref())
            .collect();
        if texts.is_empty() {
            None
        } else {
            Some(texts.concat())
        }
    }

    /// Text of every candidate, one per line.
    #[must_use]
    pub fn all_text(&self) -> String {
        self.candidates
            .iter()
            .flatten()
            .filter_map(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter(|p| p.thought != Some(true))
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Inline media of the first candidate.
    #[must_use]
    pub fn inline_data(&self) -> Vec<&Blob> {
        self.first_parts()
            .filter_map(|p| p.inline_data.as_ref())
            .collect()
    }

    /// Function calls requested by the first candidate, in order.
    #[must_use]
    pub fn function_calls(&self) -> Vec<&FunctionCall> {
        self.first_parts()
            .filter_map(|p| p.function_call.as_ref())
            .collect()
    }

    #[must_use]
    pub fn has_function_calls(&self) -> bool {
        self.first_parts().any(|p| p.function_call.is_some())
    }

    #[must_use]
    pub fn executable_code(&self) -> Option<&ExecutableCode> {
        self.first_parts().find_map(|p| p.executable_code.as_ref())
    }

    #[must_use]
    pub fn code_execution_result(&self) -> Option<&CodeExecutionResult> {
        self.first_parts()
            .find_map(|p| p.code_execution_result.as_ref())
    }

    #[must_use]
    pub fn finish_reason(&self) -> Option<FinishReason> {
        self.first_candidate()?.finish_reason
    }
}
