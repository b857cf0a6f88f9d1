use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::meals::repo_types::{Meal, MealType, NutrientInfo};
use crate::meals::services::MacroTotals;
use crate::tasks::dto::TaskProgress;

/// List row; the photo is only served by `GET /meals/:id`.
#[derive(Debug, Serialize)]
pub struct MealListItem {
    pub id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    #[serde(rename = "type")]
    pub meal_type: MealType,
    pub food_name: String,
    pub nutrients: NutrientInfo,
    pub description: Option<String>,
    pub has_image: bool,
}

impl From<&Meal> for MealListItem {
    fn from(m: &Meal) -> Self {
        Self {
            id: m.id,
            timestamp: m.timestamp,
            meal_type: m.meal_type,
            food_name: m.food_name.clone(),
            nutrients: m.nutrients,
            description: m.description.clone(),
            has_image: m.image.is_some(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TodayMealsResponse {
    pub date: String,
    pub meals: Vec<MealListItem>,
    pub totals: MacroTotals,
}

#[derive(Debug, Serialize)]
pub struct MacroSlice {
    pub name: &'static str,
    pub grams: f64,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub date: String,
    pub totals: MacroTotals,
    pub daily_calorie_target: f64,
    pub remaining_calories: f64, // negative once the target is exceeded
    pub macros: Vec<MacroSlice>,
    pub featured_task: Option<TaskProgress>,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}
fn default_limit() -> usize { 20 }
