use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::meals::repo_types::NutrientInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskCategory {
    Calories,
    Protein,
    Veg,
    Water,
    Sugar,
}

type Projection = fn(&NutrientInfo) -> f64;

fn calories(n: &NutrientInfo) -> f64 {
    n.calories
}

fn protein(n: &NutrientInfo) -> f64 {
    n.protein
}

fn no_contribution(_: &NutrientInfo) -> f64 {
    0.0
}

/// How much a logged meal advances a task of each category.
/// Veg, water and sugar are not carried by `NutrientInfo`, so they project to zero.
const PROJECTIONS: [(TaskCategory, Projection); 5] = [
    (TaskCategory::Calories, calories),
    (TaskCategory::Protein, protein),
    (TaskCategory::Veg, no_contribution),
    (TaskCategory::Water, no_contribution),
    (TaskCategory::Sugar, no_contribution),
];

impl TaskCategory {
    pub const ALL: [TaskCategory; 5] = [
        TaskCategory::Calories,
        TaskCategory::Protein,
        TaskCategory::Veg,
        TaskCategory::Water,
        TaskCategory::Sugar,
    ];

    pub fn contribution(self, nutrients: &NutrientInfo) -> f64 {
        PROJECTIONS
            .iter()
            .find(|(category, _)| *category == self)
            .map_or(0.0, |(_, project)| project(nutrients))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPeriod {
    Weekly,
    Monthly,
}

/// A goal counter. `current_value` may exceed `target_value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionTask {
    pub id: Uuid,
    pub title: String,
    pub target_value: f64,
    pub current_value: f64,
    pub unit: String,
    #[serde(with = "time::serde::rfc3339")]
    pub deadline: OffsetDateTime,
    #[serde(rename = "type")]
    pub period: TaskPeriod,
    pub category: TaskCategory,
}

impl NutritionTask {
    /// Bar width in percent, clamped to 0..=100. Storage is never clamped.
    pub fn progress_percent(&self) -> f64 {
        self.raw_ratio().clamp(0.0, 1.0) * 100.0
    }

    /// Rounded percentage shown next to the bar; may exceed 100.
    pub fn percent_label(&self) -> i64 {
        (self.raw_ratio() * 100.0).round() as i64
    }

    fn raw_ratio(&self) -> f64 {
        if self.target_value > 0.0 {
            self.current_value / self.target_value
        } else {
            0.0
        }
    }
}
