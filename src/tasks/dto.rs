use serde::Serialize;

use crate::model::TaskSuggestion;
use crate::tasks::repo_types::NutritionTask;

/// Task plus its display progress.
#[derive(Debug, Serialize)]
pub struct TaskProgress {
    #[serde(flatten)]
    pub task: NutritionTask,
    pub progress_percent: f64, // bar width, clamped
    pub percent_label: i64,    // may exceed 100
}

impl From<&NutritionTask> for TaskProgress {
    fn from(task: &NutritionTask) -> Self {
        Self {
            progress_percent: task.progress_percent(),
            percent_label: task.percent_label(),
            task: task.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<TaskSuggestion>,
}
