//! OpenAI-compatible chat completions adapter

use super::http::{build_client, error_from_response, join_url, map_transport_error, resolve_api_key};
use super::{ProviderAdapter, ProviderKind};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use ensemble_application::{GatewayError, GenerationRequest};
use ensemble_domain::{Model, OpenAiProviderConfig};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub struct OpenAiAdapter {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    api_key_env: String,
}

impl OpenAiAdapter {
    pub fn new(config: &OpenAiProviderConfig, timeout: Duration) -> Result<Self, GatewayError> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: config.base_url.clone(),
            api_key: resolve_api_key(config.api_key.as_deref(), &config.api_key_env),
            api_key_env: config.api_key_env.clone(),
        })
    }

    fn endpoint(&self) -> String {
        join_url(&self.base_url, "v1/chat/completions")
    }

    fn build_body<'a>(model: &'a Model, request: &GenerationRequest) -> ChatRequest<'a> {
        let mut content = vec![ContentPart::Text {
            text: request.prompt.as_str().to_string(),
        }];
        if let Some(image) = &request.image {
            content.push(ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: format!(
                        "data:{};base64,{}",
                        image.mime_type(),
                        BASE64.encode(image.data())
                    ),
                },
            });
        }

        ChatRequest {
            model: model.as_str(),
            messages: vec![ChatMessage {
                role: "user",
                content,
            }],
            temperature: request.temperature,
            max_tokens: request.max_output_tokens,
        }
    }
}

// ==================== Wire types ====================

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: Vec<ContentPart>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Choice {
    message: Option<ChoiceMessage>,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ChoiceMessage {
    content: Option<String>,
    refusal: Option<String>,
}

impl ChatResponse {
    fn into_text(self) -> Result<String, GatewayError> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or(GatewayError::EmptyResponse)?;

        if choice.finish_reason.as_deref() == Some("content_filter") {
            return Err(GatewayError::SafetyBlocked("content_filter".to_string()));
        }

        let message = choice.message.unwrap_or_default();
        if let Some(refusal) = message.refusal.filter(|r| !r.trim().is_empty()) {
            return Err(GatewayError::SafetyBlocked(refusal));
        }

        match message.content {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(GatewayError::EmptyResponse),
        }
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    fn supports_model(&self, model: &Model) -> bool {
        model.is_gpt()
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
            "OpenAI request: model={}, image={}",
            model,
            request.image.is_some()
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&Self::build_body(model, request))
            .send()
            .await
            .map_err(map_transport_error)?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let parsed: ChatResponse = response.json().await.map_err(map_transport_error)?;
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
    fn test_body_shape_with_image() {
        let model = Model::Gpt4o;
        let question =
            Question::new("Which graph?").with_image(QuestionImage::new(vec![1u8, 2, 3], "image/jpeg"));
        let body = serde_json::to_value(OpenAiAdapter::build_body(&model, &request(&question))).unwrap();

        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["max_tokens"], 8192);
        let content = &body["messages"][0]["content"];
        assert_eq!(content[0]["type"], "text");
        assert_eq!(content[1]["type"], "image_url");
        assert_eq!(content[1]["image_url"]["url"], "data:image/jpeg;base64,AQID");
    }

    #[test]
    fn test_response_content() {
        let response: ChatResponse = serde_json::from_value(json!({
            "choices": [{"message": {"content": "{\"answer\": \"C\"}"}, "finish_reason": "stop"}]
        }))
        .unwrap();
        assert_eq!(response.into_text().unwrap(), "{\"answer\": \"C\"}");
    }

    #[test]
    fn test_response_content_filter() {
        let response: ChatResponse = serde_json::from_value(json!({
            "choices": [{"message": {"content": null}, "finish_reason": "content_filter"}]
        }))
        .unwrap();
        assert_eq!(
            response.into_text(),
            Err(GatewayError::SafetyBlocked("content_filter".to_string()))
        );
    }

    #[test]
    fn test_response_refusal() {
        let response: ChatResponse = serde_json::from_value(json!({
            "choices": [{"message": {"content": null, "refusal": "I can't help with that."}}]
        }))
        .unwrap();
        assert!(matches!(response.into_text(), Err(GatewayError::SafetyBlocked(_))));
    }

    #[test]
    fn test_response_blank_content_is_empty() {
        let response: ChatResponse = serde_json::from_value(json!({
            "choices": [{"message": {"content": "  "}}]
        }))
        .unwrap();
        assert_eq!(response.into_text(), Err(GatewayError::EmptyResponse));
    }
}
