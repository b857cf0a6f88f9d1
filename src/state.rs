use crate::config::AppConfig;
use crate::model::{GeminiClient, NutritionModel};
use crate::session::services::Session;
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub session: Arc<Mutex<Session>>,
    pub model: Arc<dyn NutritionModel>,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let model = Arc::new(GeminiClient::new(&config.gemini)?) as Arc<dyn NutritionModel>;
        Ok(Self::from_parts(config, model))
    }

    pub fn from_parts(config: Arc<AppConfig>, model: Arc<dyn NutritionModel>) -> Self {
        let session = Session::new(config.profile.clone(), OffsetDateTime::now_utc());
        Self {
            config,
            session: Arc::new(Mutex::new(session)),
            model,
        }
    }
}

#[cfg(test)]
pub use fake::FakeModel;

#[cfg(test)]
mod fake {
    use super::*;
    use crate::config::GeminiConfig;
    use crate::meals::repo_types::{Meal, NutrientInfo};
    use crate::model::{AnalysisError, AnalysisResult, CapturedImage, TaskSuggestion};
    use crate::profile::UserProfile;
    use async_trait::async_trait;
    use std::time::Duration;
    use time::UtcOffset;

    /// Scripted model for tests.
    #[derive(Clone, Default)]
    pub struct FakeModel {
        analysis: Option<AnalysisResult>,
        suggestions: Vec<TaskSuggestion>,
        delay: Option<Duration>,
        history_seen: Arc<std::sync::Mutex<Vec<Meal>>>,
    }

    impl FakeModel {
        pub fn answering(result: AnalysisResult) -> Self {
            Self {
                analysis: Some(result),
                ..Self::default()
            }
        }

        pub fn failing() -> Self {
            Self::default()
        }

        pub fn suggesting(suggestions: Vec<TaskSuggestion>) -> Self {
            Self {
                suggestions,
                ..Self::default()
            }
        }

        pub fn delayed(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        /// History passed to the last suggestion request.
        pub fn history_seen(&self) -> Vec<Meal> {
            self.history_seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl NutritionModel for FakeModel {
        async fn analyze_meal_image(
            &self,
            _image: &CapturedImage,
        ) -> Result<AnalysisResult, AnalysisError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.analysis
                .clone()
                .ok_or_else(|| AnalysisError::InvalidPayload("expected value at line 1".into()))
        }

        async fn suggest_weekly_tasks(
            &self,
            history: &[Meal],
            _profile: &UserProfile,
        ) -> Result<Vec<TaskSuggestion>, AnalysisError> {
            *self.history_seen.lock().unwrap() = history.to_vec();
            Ok(self.suggestions.clone())
        }
    }

    impl AppState {
        pub fn fake() -> Self {
            Self::fake_with(Arc::new(FakeModel::answering(AnalysisResult {
                food_name: "fake food".into(),
                nutrients: NutrientInfo {
                    calories: 100.0,
                    protein: 10.0,
                    fat: 5.0,
                    carbs: 12.0,
                    weight: 120.0,
                },
            })))
        }

        pub fn fake_with(model: Arc<dyn NutritionModel>) -> Self {
            let config = Arc::new(AppConfig {
                gemini: GeminiConfig {
                    api_key: "test".into(),
                    model: "test".into(),
                    base_url: "http://fake.local".into(),
                    timeout_secs: 5,
                },
                local_offset: UtcOffset::UTC,
                profile: UserProfile::default(),
            });
            Self::from_parts(config, model)
        }
    }
}
