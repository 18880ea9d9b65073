//! Google Generative Language API backend.

use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use linguist_core::error::GeneratorError;
use linguist_core::model::ExerciseSeed;
use linguist_core::payload::parse_exercise_payload;
use linguist_core::traits::{
    ContentGenerator, TutorRole, TutorTurn, EXERCISE_PROMPT, TUTOR_SYSTEM_PROMPT,
};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Gemini API backend.
pub struct GeminiBackend {
    api_key: String,
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiBackend {
    pub fn new(api_key: &str, base_url: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("failed to build HTTP client");

        Self {
            api_key: api_key.to_string(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: DEFAULT_MODEL.to_string(),
            client,
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    /// Send one generateContent request and return the first candidate's
    /// text. All error-status mapping lives here so both operations surface
    /// identical failures.
    async fn generate_content(&self, body: GeminiRequest) -> Result<String, GeneratorError> {
        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, self.model
            ))
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    GeneratorError::Timeout(DEFAULT_TIMEOUT_SECS)
                } else {
                    GeneratorError::NetworkError(err.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse::<u64>().ok())
                .unwrap_or(5)
                * 1000;
            return Err(GeneratorError::RateLimited {
                retry_after_ms: retry_after,
            });
        }
        if status == 401 || status == 403 {
            let body = response.text().await.unwrap_or_default();
            return Err(GeneratorError::AuthenticationFailed(body));
        }
        if status == 404 {
            return Err(GeneratorError::ModelNotFound(self.model.clone()));
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiErrorEnvelope>(&body)
                .map(|envelope| envelope.error.message)
                .unwrap_or(body);
            return Err(GeneratorError::ApiError { status, message });
        }

        let api_response: GeminiResponse =
            response.json().await.map_err(|err| GeneratorError::ApiError {
                status: 0,
                message: format!("failed to parse response: {err}"),
            })?;

        tracing::debug!(
            prompt_tokens = api_response.usage.prompt_token_count,
            output_tokens = api_response.usage.candidates_token_count,
            "generateContent usage"
        );

        let text = api_response
            .candidates
            .into_iter()
            .next()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .into_iter()
                    .map(|part| part.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(GeneratorError::EmptyPayload);
        }
        Ok(text)
    }
}

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiSystemInstruction>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiSystemInstruction {
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f64,
    #[serde(rename = "topK")]
    top_k: u32,
    #[serde(rename = "topP")]
    top_p: f64,
    #[serde(rename = "responseMimeType", skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(rename = "usageMetadata", default)]
    usage: GeminiUsage,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiCandidateContent,
}

#[derive(Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize, Default)]
struct GeminiUsage {
    #[serde(rename = "promptTokenCount", default)]
    prompt_token_count: u32,
    #[serde(rename = "candidatesTokenCount", default)]
    candidates_token_count: u32,
}

#[derive(Deserialize)]
struct GeminiErrorEnvelope {
    error: GeminiErrorBody,
}

#[derive(Deserialize)]
struct GeminiErrorBody {
    message: String,
}

fn user_turn(text: String) -> GeminiContent {
    GeminiContent {
        role: "user".to_string(),
        parts: vec![GeminiPart { text }],
    }
}

#[async_trait]
impl ContentGenerator for GeminiBackend {
    fn name(&self) -> &str {
        "gemini"
    }

    #[instrument(skip(self, source_text), fields(model = %self.model))]
    async fn generate_exercises(&self, source_text: &str) -> anyhow::Result<Vec<ExerciseSeed>> {
        let start = Instant::now();

        let prompt = format!("{EXERCISE_PROMPT}\n\nSource text:\n{source_text}");
        let body = GeminiRequest {
            contents: vec![user_turn(prompt)],
            system_instruction: None,
            generation_config: GenerationConfig {
                temperature: 0.2,
                top_k: 40,
                top_p: 0.95,
                response_mime_type: Some("application/json".to_string()),
            },
        };

        let text = self.generate_content(body).await?;
        let seeds = parse_exercise_payload(&text)?;

        tracing::debug!(
            count = seeds.len(),
            latency_ms = start.elapsed().as_millis() as u64,
            "exercise generation complete"
        );
        Ok(seeds)
    }

    #[instrument(skip(self, message, history), fields(model = %self.model, turns = history.len()))]
    async fn tutor_reply(&self, message: &str, history: &[TutorTurn]) -> anyhow::Result<String> {
        let mut contents: Vec<GeminiContent> = history
            .iter()
            .map(|turn| GeminiContent {
                role: match turn.role {
                    TutorRole::User => "user".to_string(),
                    TutorRole::Model => "model".to_string(),
                },
                parts: vec![GeminiPart {
                    text: turn.text.clone(),
                }],
            })
            .collect();
        contents.push(user_turn(message.to_string()));

        let body = GeminiRequest {
            contents,
            system_instruction: Some(GeminiSystemInstruction {
                parts: vec![GeminiPart {
                    text: TUTOR_SYSTEM_PROMPT.to_string(),
                }],
            }),
            generation_config: GenerationConfig {
                temperature: 0.7,
                top_k: 40,
                top_p: 0.95,
                response_mime_type: None,
            },
        };

        let reply = self.generate_content(body).await?;
        Ok(reply)
    }
}
