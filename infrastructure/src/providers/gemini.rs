//! Google Gemini adapter (`generateContent`)

use super::http::{build_client, error_from_response, join_url, map_transport_error, resolve_api_key};
use super::{ProviderAdapter, ProviderKind};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use ensemble_application::{GatewayError, GenerationRequest};
use ensemble_domain::{GeminiProviderConfig, Model};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Harm categories relaxed to `BLOCK_NONE`; exam content trips them easily
const SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

pub struct GeminiAdapter {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    api_key_env: String,
}

impl GeminiAdapter {
    pub fn new(config: &GeminiProviderConfig, timeout: Duration) -> Result<Self, GatewayError> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: config.base_url.clone(),
            api_key: resolve_api_key(config.api_key.as_deref(), &config.api_key_env),
            api_key_env: config.api_key_env.clone(),
        })
    }

    fn endpoint(&self, model: &Model) -> String {
        join_url(
            &self.base_url,
            &format!("v1beta/models/{}:generateContent", model.as_str()),
        )
    }

    fn build_body(request: &GenerationRequest) -> GenerateContentRequest {
        let mut parts = vec![Part::Text {
            text: request.prompt.as_str().to_string(),
        }];
        if let Some(image) = &request.image {
            parts.push(Part::InlineData {
                inline_data: InlineData {
                    mime_type: image.mime_type().to_string(),
                    data: BASE64.encode(image.data()),
                },
            });
        }

        GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts,
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_output_tokens,
            },
            safety_settings: SAFETY_CATEGORIES
                .iter()
                .map(|&category| SafetySetting {
                    category,
                    threshold: "BLOCK_NONE",
                })
                .collect(),
        }
    }
}

// ==================== Wire types ====================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
    safety_settings: Vec<SafetySetting>,
}

#[derive(Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct GenerateContentResponse {
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct CandidateContent {
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Normalize the response to text, or classify why there is none
    fn into_text(self) -> Result<String, GatewayError> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(GatewayError::SafetyBlocked(reason));
        }

        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or(GatewayError::EmptyResponse)?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return match candidate.finish_reason.as_deref() {
                Some(reason @ ("SAFETY" | "PROHIBITED_CONTENT" | "BLOCKLIST")) => {
                    Err(GatewayError::SafetyBlocked(reason.to_string()))
                }
                _ => Err(GatewayError::EmptyResponse),
            };
        }
        Ok(text)
    }
}

#[async_trait]
impl ProviderAdapter for GeminiAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    fn supports_model(&self, model: &Model) -> bool {
        model.is_gemini()
    }

    async fn generate(
        &self,
        model: &Model,
        request: &GenerationRequest,
    ) -> Result<String, GatewayError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| GatewayError::MissingCredential(self.api_key_env.clone()))?;

        debug!(
            "Gemini request: model={}, image={}",
            model,
            request.image.is_some()
        );

        let response = self
            .client
            .post(self.endpoint(model))
            .header(API_KEY_HEADER, api_key)
            .json(&Self::build_body(request))
            .send()
            .await
            .map_err(map_transport_error)?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let parsed: GenerateContentResponse =
            response.json().await.map_err(map_transport_error)?;
        parsed.into_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ensemble_domain::{PromptTemplate, Question, QuestionImage};
    use serde_json::json;

    fn request(question: &Question) -> GenerationRequest {
        GenerationRequest {
            prompt: PromptTemplate::render(question),
            image: question.image().cloned(),
            temperature: 0.4,
            max_output_tokens: 8192,
        }
    }

    #[test]
    fn test_body_shape() {
        let question = Question::new("Capital of France?").with_option("A", "Paris");
        let body = serde_json::to_value(GeminiAdapter::build_body(&request(&question))).unwrap();

        assert_eq!(body["contents"][0]["role"], "user");
        assert!(body["contents"][0]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .contains("Capital of France?"));
        assert_eq!(body["contents"][0]["parts"].as_array().unwrap().len(), 1);
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 8192);
        assert_eq!(body["safetySettings"].as_array().unwrap().len(), 4);
        assert_eq!(body["safetySettings"][0]["threshold"], "BLOCK_NONE");
    }

    #[test]
    fn test_body_inlines_image() {
        let question = Question::new("What is shown?")
            .with_image(QuestionImage::new(vec![1u8, 2, 3], "image/png"));
        let body = serde_json::to_value(GeminiAdapter::build_body(&request(&question))).unwrap();

        let image = &body["contents"][0]["parts"][1]["inline_data"];
        assert_eq!(image["mime_type"], "image/png");
        assert_eq!(image["data"], "AQID");
    }

    #[test]
    fn test_response_text_joins_parts() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {"parts": [{"text": "{\"answer\": "}, {"text": "\"B\"}"}]},
                "finishReason": "STOP"
            }]
        }))
        .unwrap();
        assert_eq!(response.into_text().unwrap(), "{\"answer\": \"B\"}");
    }

    #[test]
    fn test_response_block_reason() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        }))
        .unwrap();
        assert_eq!(
            response.into_text(),
            Err(GatewayError::SafetyBlocked("SAFETY".to_string()))
        );
    }

    #[test]
    fn test_response_safety_finish_without_text() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"finishReason": "SAFETY"}]
        }))
        .unwrap();
        assert!(matches!(response.into_text(), Err(GatewayError::SafetyBlocked(_))));
    }

    #[test]
    fn test_response_without_candidates_is_empty() {
        let response: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(response.into_text(), Err(GatewayError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_io() {
        let config = GeminiProviderConfig {
            api_key_env: "EXAM_ENSEMBLE_TEST_UNSET_GEMINI_KEY".to_string(),
            api_key: None,
            // Unroutable: any I/O attempt would surface as a network error
            base_url: "http://127.0.0.1:9".to_string(),
        };
        let adapter = GeminiAdapter::new(&config, Duration::from_secs(1)).unwrap();
        let question = Question::new("2 + 2 = 4?");

        let err = adapter
            .generate(&Model::Gemini25Flash, &request(&question))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            GatewayError::MissingCredential("EXAM_ENSEMBLE_TEST_UNSET_GEMINI_KEY".to_string())
        );
    }
}
