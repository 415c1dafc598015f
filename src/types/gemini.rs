use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Finish reasons returned by generateContent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum FinishReason {
    FINISH_REASON_UNSPECIFIED,
    STOP,
    MAX_TOKENS,
    SAFETY,
    RECITATION,
    LANGUAGE,
    OTHER,
    BLOCKLIST,
    PROHIBITED_CONTENT,
    SPII,
    MALFORMED_FUNCTION_CALL,
    IMAGE_SAFETY,
}

/// Chat content payload, used for both the prompt and candidates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub role: String,
    #[serde(default)]
    pub parts: Vec<Value>,
}

/// Single-turn generateContent request body.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Chat>,
}

impl GenerateContentRequest {
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self {
            contents: vec![Chat {
                role: "user".to_string(),
                parts: vec![serde_json::json!({ "text": prompt.into() })],
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[allow(non_snake_case)]
pub struct Candidate {
    pub content: Option<Chat>,
    pub finishReason: Option<FinishReason>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[allow(non_snake_case)]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub usageMetadata: Option<Value>,
    #[serde(default)]
    pub modelVersion: Option<String>,
    #[serde(default)]
    pub promptFeedback: Option<Value>,
}

impl GeminiResponse {
    /// Concatenated text parts of the first candidate, if there is any text.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
            .collect();
        (!text.is_empty()).then_some(text)
    }

    /// Why no text came back, for logging and the error value.
    pub fn block_reason(&self) -> String {
        if let Some(reason) = self
            .promptFeedback
            .as_ref()
            .and_then(|f| f.get("blockReason"))
            .and_then(|r| r.as_str())
        {
            return format!("prompt blocked: {reason}");
        }
        match self.candidates.first().and_then(|c| c.finishReason.as_ref()) {
            Some(reason) => format!("finish reason {reason:?}"),
            None => "no candidates".to_string(),
        }
    }
}
