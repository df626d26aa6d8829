//! Gemini `generateContent` request and response shapes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn text(role: Option<&str>, text: impl Into<String>) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part {
                text: Some(text.into()),
            }],
        }
    }

    /// Concatenates every text part.
    pub fn joined_text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect::<String>()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SafetySetting {
    pub category: String,
    pub threshold: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub system_instruction: Content,
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub safety_settings: Vec<SafetySetting>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_uses_camel_case_field_names() {
        let request = GenerateContentRequest {
            system_instruction: Content::text(None, "be helpful"),
            contents: vec![Content::text(Some("user"), "hi")],
            generation_config: GenerationConfig {
                temperature: 0.4,
                top_p: 0.9,
                max_output_tokens: 4096,
            },
            safety_settings: Vec::new(),
        };
        let value = serde_json::to_value(&request).expect("serialize");
        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "be helpful");
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 4096);
        assert!(value.get("safetySettings").is_none());
        assert!(value["systemInstruction"].get("role").is_none());
    }

    #[test]
    fn response_tolerates_missing_content() {
        let raw = r#"{"candidates":[{"finishReason":"SAFETY"}]}"#;
        let response: GenerateContentResponse = serde_json::from_str(raw).expect("parse");
        assert_eq!(response.candidates.len(), 1);
        assert!(response.candidates[0].content.is_none());
        assert_eq!(
            response.candidates[0].finish_reason.as_deref(),
            Some("SAFETY")
        );
    }
}
