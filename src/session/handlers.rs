use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use bytes::Bytes;
use time::OffsetDateTime;
use tracing::{error, info, instrument, warn};

use crate::{
    session::{
        dto::{
            CommitMealRequest, CommittedMealResponse, PhotoBase64Request, SelectTabRequest,
            ViewResponse,
        },
        images::{image_from_base64, image_from_bytes, ImageError},
        services::{submit_photo, CommitMeal, PhotoError},
        view::CaptureError,
    },
    model::CapturedImage,
    state::AppState,
    tasks::dto::TaskProgress,
};

type ApiError = (StatusCode, String);

pub fn view_routes() -> Router<AppState> {
    Router::new()
        .route("/view", get(get_view))
        .route("/view/tab", put(select_tab))
}

pub fn capture_routes() -> Router<AppState> {
    Router::new()
        .route("/capture", post(open_capture).delete(cancel_capture))
        .route("/capture/photo", post(upload_photo))
        .route("/capture/photo/base64", post(upload_photo_base64))
        .route("/capture/commit", post(commit_meal))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // 20MB
}

#[instrument(skip(state))]
pub async fn get_view(State(state): State<AppState>) -> Json<ViewResponse> {
    let session = state.session.lock().await;
    Json(ViewResponse::from(&session.view))
}

#[instrument(skip(state))]
pub async fn select_tab(
    State(state): State<AppState>,
    Json(body): Json<SelectTabRequest>,
) -> Json<ViewResponse> {
    let mut session = state.session.lock().await;
    session.view.select_tab(body.tab);
    Json(ViewResponse::from(&session.view))
}

#[instrument(skip(state))]
pub async fn open_capture(State(state): State<AppState>) -> Json<ViewResponse> {
    let mut session = state.session.lock().await;
    let capture_id = session.view.open_capture();
    info!(%capture_id, "capture open");
    Json(ViewResponse::from(&session.view))
}

#[instrument(skip(state))]
pub async fn cancel_capture(State(state): State<AppState>) -> Json<ViewResponse> {
    let mut session = state.session.lock().await;
    if session.view.cancel_capture() {
        info!("capture cancelled");
    }
    Json(ViewResponse::from(&session.view))
}

/// POST /capture/photo with the raw image as body
#[instrument(skip(state, headers, body), fields(bytes = body.len()))]
pub async fn upload_photo(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ViewResponse>, ApiError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    let image = image_from_bytes(content_type, body).map_err(bad_image)?;
    analyse(&state, image).await
}

/// POST /capture/photo/base64 { image: "..." }
#[instrument(skip(state, body))]
pub async fn upload_photo_base64(
    State(state): State<AppState>,
    Json(body): Json<PhotoBase64Request>,
) -> Result<Json<ViewResponse>, ApiError> {
    let image = image_from_base64(&body.image).map_err(bad_image)?;
    analyse(&state, image).await
}

async fn analyse(state: &AppState, image: CapturedImage) -> Result<Json<ViewResponse>, ApiError> {
    match submit_photo(state, image).await {
        Ok(_) => {
            let session = state.session.lock().await;
            Ok(Json(ViewResponse::from(&session.view)))
        }
        Err(PhotoError::Capture(e)) => Err(capture_error(e)),
        Err(e @ PhotoError::Analysis(_)) => Err((StatusCode::BAD_GATEWAY, e.to_string())),
    }
}

/// Body is optional; an empty one commits with defaults.
#[instrument(skip(state, body), fields(bytes = body.len()))]
pub async fn commit_meal(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, HeaderMap, Json<CommittedMealResponse>), ApiError> {
    let body = commit_request(&body)?;
    let commit = CommitMeal {
        meal_type: body.meal_type.unwrap_or_default(),
        description: body.description,
    };

    let mut session = state.session.lock().await;
    let meal = session
        .commit_meal(commit, OffsetDateTime::now_utc())
        .map_err(capture_error)?;
    let tasks = session.tasks.list().iter().map(TaskProgress::from).collect();
    drop(session);

    let mut headers = HeaderMap::new();
    let location = HeaderValue::from_str(&format!("/api/v1/meals/{}", meal.id)).map_err(|e| {
        error!(error = %e, "location header");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    headers.insert(header::LOCATION, location);

    Ok((
        StatusCode::CREATED,
        headers,
        Json(CommittedMealResponse { meal, tasks }),
    ))
}

fn commit_request(body: &[u8]) -> Result<CommitMealRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(CommitMealRequest::default());
    }
    serde_json::from_slice(body).map_err(|e| {
        warn!(error = %e, "rejected commit body");
        (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
    })
}

fn capture_error(e: CaptureError) -> ApiError {
    let status = match e {
        CaptureError::Stale => StatusCode::GONE,
        CaptureError::NotOpen | CaptureError::AnalysisPending | CaptureError::AnalysisIncomplete => {
            StatusCode::CONFLICT
        }
    };
    warn!(error = %e, %status, "capture request rejected");
    (status, e.to_string())
}

fn bad_image(e: ImageError) -> ApiError {
    let status = match e {
        ImageError::UnsupportedType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        ImageError::Empty | ImageError::InvalidBase64 => StatusCode::BAD_REQUEST,
    };
    warn!(error = %e, "rejected photo upload");
    (status, e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meals::repo_types::MealType;
    use crate::session::view::{AppTab, CapturePhase};
    use crate::state::FakeModel;
    use std::sync::Arc;

    #[tokio::test]
    async fn full_capture_flow_over_handlers() {
        let state = AppState::fake();

        let Json(view) = get_view(State(state.clone())).await;
        assert_eq!(view.tab, AppTab::Dashboard);
        assert!(!view.capture.open);

        let Json(view) = select_tab(
            State(state.clone()),
            Json(SelectTabRequest { tab: AppTab::Meals }),
        )
        .await;
        assert_eq!(view.tab, AppTab::Meals);

        let Json(view) = open_capture(State(state.clone())).await;
        assert!(view.capture.open);
        assert!(!view.capture.can_commit);

        let Json(view) = upload_photo_base64(
            State(state.clone()),
            Json(PhotoBase64Request {
                image: "data:image/jpeg;base64,QUJD".into(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(view.capture.phase, CapturePhase::Reviewing);
        assert!(view.capture.can_commit);
        assert_eq!(
            view.capture.analysis.as_ref().map(|a| a.food_name.as_str()),
            Some("fake food")
        );

        let (status, headers, Json(committed)) = commit_meal(
            State(state.clone()),
            Bytes::from_static(br#"{"description":"half portion","meal_type":"snack"}"#),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(
            headers.get(header::LOCATION).unwrap(),
            &format!("/api/v1/meals/{}", committed.meal.id)
        );
        assert_eq!(committed.meal.meal_type, MealType::Snack);
        assert_eq!(committed.tasks.len(), 3);

        let Json(view) = get_view(State(state.clone())).await;
        assert!(!view.capture.open);
        assert_eq!(view.tab, AppTab::Meals);
    }

    #[tokio::test]
    async fn commit_defaults_to_lunch() {
        let state = AppState::fake();
        open_capture(State(state.clone())).await;
        upload_photo(
            State(state.clone()),
            HeaderMap::new(),
            Bytes::from_static(b"jpeg bytes"),
        )
        .await
        .unwrap();
        let (_, _, Json(committed)) = commit_meal(State(state.clone()), Bytes::new()).await.unwrap();
        assert_eq!(committed.meal.meal_type, MealType::Lunch);
        assert!(committed.meal.description.is_none());
    }

    #[tokio::test]
    async fn unreadable_commit_body_keeps_the_review_open() {
        let state = AppState::fake();
        open_capture(State(state.clone())).await;
        upload_photo(State(state.clone()), HeaderMap::new(), Bytes::from_static(b"jpeg bytes"))
            .await
            .unwrap();

        for body in [
            &br#"{"description":"big salad","meal_type":"brunch"}"#[..],
            &b"{not json"[..],
        ] {
            let (status, _) = commit_meal(State(state.clone()), Bytes::from_static(body))
                .await
                .unwrap_err();
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        }

        let Json(view) = get_view(State(state.clone())).await;
        assert_eq!(view.capture.phase, CapturePhase::Reviewing);
        assert!(view.capture.can_commit);
        assert!(state.session.lock().await.meals.is_empty());

        let (status, _, Json(committed)) = commit_meal(
            State(state.clone()),
            Bytes::from_static(br#"{"description":"big salad","meal_type":"dinner"}"#),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(committed.meal.meal_type, MealType::Dinner);
        assert_eq!(committed.meal.description.as_deref(), Some("big salad"));
    }

    #[tokio::test]
    async fn failed_analysis_is_bad_gateway_and_commit_stays_disabled() {
        let state = AppState::fake_with(Arc::new(FakeModel::failing()));
        open_capture(State(state.clone())).await;

        let (status, message) = upload_photo_base64(
            State(state.clone()),
            Json(PhotoBase64Request {
                image: "QUJD".into(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(message.contains("analysis incomplete"));

        let Json(view) = get_view(State(state.clone())).await;
        assert!(view.capture.open);
        assert!(view.capture.analysis.is_none());
        assert!(!view.capture.can_commit);
        assert!(view.capture.last_error.is_some());

        let (status, _) = commit_meal(State(state.clone()), Bytes::new()).await.unwrap_err();
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(state.session.lock().await.meals.is_empty());
    }

    #[tokio::test]
    async fn photo_without_open_capture_conflicts() {
        let state = AppState::fake();
        let (status, _) = upload_photo_base64(
            State(state),
            Json(PhotoBase64Request {
                image: "QUJD".into(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn bad_uploads_are_rejected() {
        let state = AppState::fake();
        open_capture(State(state.clone())).await;

        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        let (status, _) = upload_photo(State(state.clone()), headers, Bytes::from_static(b"hi"))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);

        let (status, _) = upload_photo_base64(
            State(state.clone()),
            Json(PhotoBase64Request {
                image: "***".into(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn cancel_discards_result() {
        let state = AppState::fake();
        open_capture(State(state.clone())).await;
        upload_photo_base64(
            State(state.clone()),
            Json(PhotoBase64Request {
                image: "QUJD".into(),
            }),
        )
        .await
        .unwrap();

        let Json(view) = cancel_capture(State(state.clone())).await;
        assert!(!view.capture.open);
        assert!(view.capture.analysis.is_none());

        let (status, _) = commit_meal(State(state.clone()), Bytes::new()).await.unwrap_err();
        assert_eq!(status, StatusCode::CONFLICT);
    }
}
