//! Wire shapes the model must answer with, and their validation.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use super::{AnalysisError, AnalysisResult, TaskSuggestion};
use crate::meals::repo_types::{Meal, MealType, NutrientInfo};
use crate::tasks::repo_types::TaskCategory;

pub const MAX_SUGGESTIONS: usize = 3;

pub const ANALYSIS_INSTRUCTION: &str = "Identify the food in this photo, estimate its volume and \
weight, and give a nutrition breakdown. Answer in JSON with the fields: foodName (name of the \
food), calories (kcal), protein (g), fat (g), carbs (g), weight (estimated weight in g).";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisPayload {
    food_name: String,
    calories: f64,
    protein: f64,
    fat: f64,
    carbs: f64,
    weight: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SuggestionPayload {
    title: String,
    target_value: f64,
    unit: String,
    category: TaskCategory,
}

/// Meal as described to the model for task suggestions; photo data is left out.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry<'a> {
    pub food_name: &'a str,
    #[serde(rename = "type")]
    pub meal_type: MealType,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: time::OffsetDateTime,
    pub nutrients: &'a NutrientInfo,
}

impl<'a> From<&'a Meal> for HistoryEntry<'a> {
    fn from(m: &'a Meal) -> Self {
        Self {
            food_name: &m.food_name,
            meal_type: m.meal_type,
            timestamp: m.timestamp,
            nutrients: &m.nutrients,
        }
    }
}

pub fn analysis_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "foodName": { "type": "STRING" },
            "calories": { "type": "NUMBER" },
            "protein": { "type": "NUMBER" },
            "fat": { "type": "NUMBER" },
            "carbs": { "type": "NUMBER" },
            "weight": { "type": "NUMBER" }
        },
        "required": ["foodName", "calories", "protein", "fat", "carbs", "weight"]
    })
}

pub fn suggestion_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "title": { "type": "STRING" },
                "targetValue": { "type": "NUMBER" },
                "unit": { "type": "STRING" },
                "category": {
                    "type": "STRING",
                    "enum": TaskCategory::ALL
                }
            },
            "required": ["title", "targetValue", "unit", "category"]
        }
    })
}

pub fn suggestion_prompt(history: &[HistoryEntry<'_>], profile_json: &str) -> String {
    let history_json = serde_json::to_string(history).unwrap_or_else(|_| "[]".into());
    format!(
        "Here is the user's eating history for the past week: {history_json}. \
         Their personal goals: {profile_json}. \
         Create {MAX_SUGGESTIONS} healthy-eating tasks for next week."
    )
}

/// Strict: every field present, numbers finite and non-negative.
pub fn parse_analysis(text: &str) -> Result<AnalysisResult, AnalysisError> {
    let payload: AnalysisPayload = serde_json::from_str(text.trim())
        .map_err(|e| AnalysisError::InvalidPayload(e.to_string()))?;

    let fields = [
        ("calories", payload.calories),
        ("protein", payload.protein),
        ("fat", payload.fat),
        ("carbs", payload.carbs),
        ("weight", payload.weight),
    ];
    if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite() || *v < 0.0) {
        return Err(AnalysisError::InvalidPayload(format!(
            "{name} must be a non-negative number, got {value}"
        )));
    }
    if payload.food_name.trim().is_empty() {
        return Err(AnalysisError::InvalidPayload("foodName is empty".into()));
    }

    Ok(AnalysisResult {
        food_name: payload.food_name,
        nutrients: NutrientInfo {
            calories: payload.calories,
            protein: payload.protein,
            fat: payload.fat,
            carbs: payload.carbs,
            weight: payload.weight,
        },
    })
}

/// Lenient: anything unparseable becomes an empty list.
pub fn parse_task_suggestions(text: &str) -> Vec<TaskSuggestion> {
    match serde_json::from_str::<Vec<SuggestionPayload>>(text.trim()) {
        Ok(items) => items
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .map(|p| TaskSuggestion {
                title: p.title,
                target_value: p.target_value,
                unit: p.unit,
                category: p.category,
            })
            .collect(),
        Err(e) => {
            warn!(error = %e, "task suggestions did not parse; using none");
            Vec::new()
        }
    }
}
