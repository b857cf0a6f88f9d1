use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::meals::repo_types::{Meal, MealType};
use crate::model::AnalysisResult;
use crate::session::view::{AppTab, CapturePhase, ViewState};
use crate::tasks::dto::TaskProgress;

#[derive(Debug, Serialize)]
pub struct CaptureView {
    pub open: bool,
    pub capture_id: Option<Uuid>,
    pub phase: CapturePhase,
    pub analysis: Option<AnalysisResult>,
    pub last_error: Option<String>,
    pub can_commit: bool,
}

#[derive(Debug, Serialize)]
pub struct ViewResponse {
    pub tab: AppTab,
    pub capture: CaptureView,
}

impl From<&ViewState> for ViewResponse {
    fn from(view: &ViewState) -> Self {
        let capture = view.capture();
        Self {
            tab: view.tab(),
            capture: CaptureView {
                open: capture.is_open(),
                capture_id: capture.capture_id(),
                phase: capture.phase(),
                analysis: capture.analysis().cloned(),
                last_error: capture.last_error().map(str::to_string),
                can_commit: capture.can_commit(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SelectTabRequest {
    pub tab: AppTab,
}

/// `image` is bare base64 or a `data:image/...;base64,` URL.
#[derive(Debug, Deserialize)]
pub struct PhotoBase64Request {
    pub image: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CommitMealRequest {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub meal_type: Option<MealType>,
}

#[derive(Debug, Serialize)]
pub struct CommittedMealResponse {
    pub meal: Meal,
    pub tasks: Vec<TaskProgress>,
}
