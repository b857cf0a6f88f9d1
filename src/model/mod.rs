//! Contract with the remote vision-language model.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::meals::repo_types::{Meal, NutrientInfo};
use crate::profile::UserProfile;
use crate::tasks::repo_types::TaskCategory;

pub mod contract;
pub mod gemini;

pub use gemini::GeminiClient;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("model request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("model returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("model returned no content")]
    EmptyResponse,

    #[error("model payload does not match the contract: {0}")]
    InvalidPayload(String),
}

/// Photo as sent to the model: base64 body plus its MIME type.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedImage {
    pub mime_type: String,
    pub data_b64: String,
}

impl CapturedImage {
    #[cfg(test)]
    pub fn jpeg(data_b64: impl Into<String>) -> Self {
        Self {
            mime_type: "image/jpeg".into(),
            data_b64: data_b64.into(),
        }
    }

    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data_b64)
    }
}

/// Food identity and macro estimate for one photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub food_name: String,
    pub nutrients: NutrientInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSuggestion {
    pub title: String,
    pub target_value: f64,
    pub unit: String,
    pub category: TaskCategory,
}

#[async_trait]
pub trait NutritionModel: Send + Sync {
    async fn analyze_meal_image(&self, image: &CapturedImage)
        -> Result<AnalysisResult, AnalysisError>;

    /// Up to three goals for next week. Unparseable answers yield an empty list.
    async fn suggest_weekly_tasks(
        &self,
        history: &[Meal],
        profile: &UserProfile,
    ) -> Result<Vec<TaskSuggestion>, AnalysisError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_url_keeps_mime_type() {
        let img = CapturedImage {
            mime_type: "image/png".into(),
            data_b64: "iVBORw0KGgo=".into(),
        };
        assert_eq!(img.data_url(), "data:image/png;base64,iVBORw0KGgo=");
        assert_eq!(CapturedImage::jpeg("AAAA").mime_type, "image/jpeg");
    }
}
