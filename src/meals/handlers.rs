use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use time::{OffsetDateTime, UtcOffset};
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::{
    meals::{
        dto::{DashboardResponse, MacroSlice, MealListItem, Pagination, TodayMealsResponse},
        repo_types::Meal,
        services::totals,
    },
    state::AppState,
    tasks::dto::TaskProgress,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/meals", get(list_meals))
        .route("/meals/today", get(today_meals))
        .route("/meals/:id", get(get_meal))
}

pub fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(dashboard))
}

fn local_today(offset: UtcOffset) -> String {
    OffsetDateTime::now_utc().to_offset(offset).date().to_string()
}

#[instrument(skip(state))]
pub async fn list_meals(
    State(state): State<AppState>,
    Query(p): Query<Pagination>,
) -> Json<Vec<MealListItem>> {
    let session = state.session.lock().await;
    let items = session
        .meals
        .list()
        .skip(p.offset)
        .take(p.limit)
        .map(MealListItem::from)
        .collect();
    Json(items)
}

#[instrument(skip(state))]
pub async fn today_meals(State(state): State<AppState>) -> Json<TodayMealsResponse> {
    let offset = state.config.local_offset;
    let session = state.session.lock().await;
    let today = session.meals.today_list(offset);
    Json(TodayMealsResponse {
        date: local_today(offset),
        totals: totals(today.iter().copied()),
        meals: today.into_iter().map(MealListItem::from).collect(),
    })
}

#[instrument(skip(state))]
pub async fn get_meal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Meal>, (StatusCode, String)> {
    let session = state.session.lock().await;
    match session.meals.get(id) {
        Some(meal) => Ok(Json(meal.clone())),
        None => {
            warn!(%id, "meal not found");
            Err((StatusCode::NOT_FOUND, "Meal not found".into()))
        }
    }
}

#[instrument(skip(state))]
pub async fn dashboard(State(state): State<AppState>) -> Json<DashboardResponse> {
    let offset = state.config.local_offset;
    let session = state.session.lock().await;
    let sums = totals(session.meals.today_list(offset));
    let target = session.profile.daily_calorie_target;

    Json(DashboardResponse {
        date: local_today(offset),
        totals: sums,
        daily_calorie_target: target,
        remaining_calories: target - sums.calories,
        macros: vec![
            MacroSlice { name: "protein", grams: sums.protein },
            MacroSlice { name: "fat", grams: sums.fat },
            MacroSlice { name: "carbs", grams: sums.carbs },
        ],
        featured_task: session.tasks.featured().map(TaskProgress::from),
    })
}
