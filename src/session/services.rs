use std::sync::Arc;

use thiserror::Error;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::meals::repo::MealStore;
use crate::meals::repo_types::{Meal, MealType, NewMeal};
use crate::model::{AnalysisError, AnalysisResult, CapturedImage};
use crate::profile::UserProfile;
use crate::session::view::{CaptureError, ViewState};
use crate::state::AppState;
use crate::tasks::repo::TaskTracker;

/// Everything the user sees during one run of the app.
#[derive(Debug)]
pub struct Session {
    pub meals: MealStore,
    pub tasks: TaskTracker,
    pub profile: UserProfile,
    pub view: ViewState,
}

/// User annotations attached when committing a capture.
#[derive(Debug, Clone, Default)]
pub struct CommitMeal {
    pub meal_type: MealType,
    pub description: Option<String>,
}

impl Session {
    pub fn new(profile: UserProfile, now: OffsetDateTime) -> Self {
        Self {
            meals: MealStore::new(),
            tasks: TaskTracker::seeded(now),
            profile,
            view: ViewState::new(),
        }
    }

    /// Records the reviewed capture as a meal, then advances tasks, then closes the capture.
    pub fn commit_meal(
        &mut self,
        commit: CommitMeal,
        now: OffsetDateTime,
    ) -> Result<Meal, CaptureError> {
        let (image, result) = self.view.reviewed()?;
        let description = commit
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        let meal = Meal::create(
            NewMeal {
                meal_type: commit.meal_type,
                food_name: result.food_name.clone(),
                nutrients: result.nutrients,
                image: Some(image.data_url()),
                description,
            },
            now,
        );

        self.meals.record(meal.clone());
        self.tasks.apply_meal(&meal);
        self.view.close_capture();
        info!(meal_id = %meal.id, food = %meal.food_name, calories = meal.nutrients.calories, "meal committed");
        Ok(meal)
    }
}

#[derive(Debug, Error)]
pub enum PhotoError {
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error("analysis incomplete: {0}")]
    Analysis(#[from] AnalysisError),
}

/// Held while a request waits on the model. Dropping it before `finish` hands the
/// capture back to `AwaitingPhoto`, so a disconnected client cannot wedge it.
struct PendingAnalysis {
    session: Arc<Mutex<Session>>,
    capture_id: Uuid,
    finished: bool,
}

impl PendingAnalysis {
    fn finish(mut self) {
        self.finished = true;
    }
}

impl Drop for PendingAnalysis {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let capture_id = self.capture_id;
        warn!(%capture_id, "analysis request dropped before completion");
        match self.session.try_lock() {
            Ok(mut session) => {
                session.view.abandon_analysis(capture_id);
            }
            Err(_) => {
                // lock is busy; release it from a task instead of blocking the drop
                if let Ok(handle) = tokio::runtime::Handle::try_current() {
                    let session = Arc::clone(&self.session);
                    handle.spawn(async move {
                        session.lock().await.view.abandon_analysis(capture_id);
                    });
                }
            }
        }
    }
}

/// Runs the analysis for the open capture. The session lock is not held while the
/// model is working; cancelling the capture resolves this with `CaptureError::Stale`.
pub async fn submit_photo(
    state: &AppState,
    image: CapturedImage,
) -> Result<AnalysisResult, PhotoError> {
    let (capture_id, cancel) = {
        let mut session = state.session.lock().await;
        session.view.begin_analysis(image.clone())?
    };
    let pending = PendingAnalysis {
        session: Arc::clone(&state.session),
        capture_id,
        finished: false,
    };
    info!(%capture_id, mime = %image.mime_type, "analysing meal photo");

    let outcome = tokio::select! {
        res = state.model.analyze_meal_image(&image) => Some(res),
        _ = cancel.cancelled() => None,
    };
    let Some(outcome) = outcome else {
        pending.finish();
        warn!(%capture_id, "capture cancelled while analysing; result dropped");
        return Err(CaptureError::Stale.into());
    };

    if let Err(e) = &outcome {
        error!(%capture_id, error = %e, "meal analysis failed");
    }

    let mut session = state.session.lock().await;
    let recorded = match &outcome {
        Ok(result) => Ok(result.clone()),
        Err(e) => Err(e.to_string()),
    };
    let applied = session.view.finish_analysis(capture_id, recorded);
    drop(session);
    pending.finish();
    applied?;
    outcome.map_err(PhotoError::from)
}
