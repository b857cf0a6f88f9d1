use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, instrument};

use crate::{
    state::AppState,
    tasks::{
        dto::{SuggestionsResponse, TaskProgress},
        services::suggest_tasks,
    },
};

pub fn read_routes() -> Router<AppState> {
    Router::new().route("/tasks", get(list_tasks))
}

pub fn suggest_routes() -> Router<AppState> {
    Router::new().route("/tasks/suggestions", post(generate_suggestions))
}

#[instrument(skip(state))]
pub async fn list_tasks(State(state): State<AppState>) -> Json<Vec<TaskProgress>> {
    let session = state.session.lock().await;
    Json(session.tasks.list().iter().map(TaskProgress::from).collect())
}

#[instrument(skip(state))]
pub async fn generate_suggestions(
    State(state): State<AppState>,
) -> Result<Json<SuggestionsResponse>, (StatusCode, String)> {
    let suggestions = suggest_tasks(&state).await.map_err(|e| {
        error!(error = %e, "task suggestion failed");
        (StatusCode::BAD_GATEWAY, e.to_string())
    })?;
    Ok(Json(SuggestionsResponse { suggestions }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::FakeModel;
    use std::sync::Arc;

    #[tokio::test]
    async fn list_reports_display_progress() {
        let state = AppState::fake();
        let Json(tasks) = list_tasks(State(state)).await;
        assert_eq!(tasks.len(), 3);
        let protein = &tasks[1];
        assert_eq!(protein.task.current_value, 45.0);
        assert_eq!(protein.percent_label, 56);

        let json = serde_json::to_value(protein).unwrap();
        assert_eq!(json["category"], "protein");
        assert_eq!(json["type"], "weekly");
        assert_eq!(json["percent_label"], 56);
    }

    #[tokio::test]
    async fn empty_suggestions_are_ok() {
        let state = AppState::fake_with(Arc::new(FakeModel::suggesting(Vec::new())));
        let Json(body) = generate_suggestions(State(state)).await.unwrap();
        assert!(body.suggestions.is_empty());
    }
}
