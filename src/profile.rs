use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::state::AppState;

/// Static profile for the running session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub weight: f64, // kg
    pub height: f64, // cm
    pub goal: String,
    pub daily_calorie_target: f64, // kcal
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: "Li".into(),
            weight: 68.0,
            height: 175.0,
            goal: "fat loss and toning".into(),
            daily_calorie_target: 1800.0,
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/profile", get(get_profile))
}

#[instrument(skip(state))]
pub async fn get_profile(State(state): State<AppState>) -> Json<UserProfile> {
    let session = state.session.lock().await;
    Json(session.profile.clone())
}
