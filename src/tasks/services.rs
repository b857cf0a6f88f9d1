use time::{Duration, OffsetDateTime};
use tracing::info;

use crate::meals::repo_types::Meal;
use crate::model::{AnalysisError, TaskSuggestion};
use crate::state::AppState;

/// How far back the suggestion request looks.
pub const HISTORY_WINDOW: Duration = Duration::days(7);

/// Asks the model for next week's goals. Suggestions are returned, never applied.
pub async fn suggest_tasks(state: &AppState) -> Result<Vec<TaskSuggestion>, AnalysisError> {
    let cutoff = OffsetDateTime::now_utc() - HISTORY_WINDOW;
    let (history, profile) = {
        let session = state.session.lock().await;
        // owned snapshot so the lock is released before the model call
        let history: Vec<Meal> = session
            .meals
            .since(cutoff)
            .into_iter()
            .map(Meal::without_image)
            .collect();
        (history, session.profile.clone())
    };

    let suggestions = state.model.suggest_weekly_tasks(&history, &profile).await?;
    info!(
        history = history.len(),
        suggestions = suggestions.len(),
        "task suggestions generated"
    );
    Ok(suggestions)
}
