use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, instrument, warn};

use super::contract::{self, HistoryEntry};
use super::{AnalysisError, AnalysisResult, CapturedImage, NutritionModel, TaskSuggestion};
use crate::config::GeminiConfig;
use crate::meals::repo_types::Meal;
use crate::profile::UserProfile;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
enum Part {
    InlineData(InlineData),
    Text(String),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Deserialize, Debug)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize, Debug)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    fn into_text(self) -> Option<String> {
        let parts = self.candidates.into_iter().next()?.content?.parts;
        let text: String = parts.into_iter().filter_map(|p| p.text).collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

/// Gemini `generateContent` client with JSON-schema constrained output.
#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self::with_http(config, http))
    }

    pub fn with_http(config: &GeminiConfig, http: Client) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        }
    }

    async fn generate(&self, parts: Vec<Part>, schema: Value) -> Result<String, AnalysisError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = GenerateRequest {
            contents: vec![Content { parts }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: schema,
            },
        };

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!(%status, model = %self.model, "model call rejected");
            return Err(AnalysisError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateResponse = response.json().await?;
        let text = parsed.into_text().ok_or(AnalysisError::EmptyResponse)?;
        debug!(model = %self.model, bytes = text.len(), "model answered");
        Ok(text)
    }
}

#[async_trait]
impl NutritionModel for GeminiClient {
    #[instrument(skip(self, image), fields(mime = %image.mime_type))]
    async fn analyze_meal_image(
        &self,
        image: &CapturedImage,
    ) -> Result<AnalysisResult, AnalysisError> {
        let parts = vec![
            Part::InlineData(InlineData {
                mime_type: image.mime_type.clone(),
                data: image.data_b64.clone(),
            }),
            Part::Text(contract::ANALYSIS_INSTRUCTION.into()),
        ];
        let text = self.generate(parts, contract::analysis_schema()).await?;
        contract::parse_analysis(&text)
    }

    #[instrument(skip(self, history, profile), fields(meals = history.len()))]
    async fn suggest_weekly_tasks(
        &self,
        history: &[Meal],
        profile: &UserProfile,
    ) -> Result<Vec<TaskSuggestion>, AnalysisError> {
        let entries: Vec<HistoryEntry<'_>> = history.iter().map(HistoryEntry::from).collect();
        let profile_json = serde_json::to_string(profile)
            .map_err(|e| AnalysisError::InvalidPayload(e.to_string()))?;
        let prompt = contract::suggestion_prompt(&entries, &profile_json);

        let text = match self
            .generate(vec![Part::Text(prompt)], contract::suggestion_schema())
            .await
        {
            Ok(text) => text,
            Err(AnalysisError::EmptyResponse) => {
                warn!("model returned no suggestions");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };
        Ok(contract::parse_task_suggestions(&text))
    }
}
