use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Estimated nutrient content of one meal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutrientInfo {
    pub calories: f64, // kcal
    pub protein: f64,  // g
    pub fat: f64,      // g
    pub carbs: f64,    // g
    pub weight: f64,   // g, estimated portion weight
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    #[default]
    Lunch,
    Dinner,
    Snack,
}

/// A logged meal. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    pub id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    #[serde(rename = "type")]
    pub meal_type: MealType,
    pub image: Option<String>, // data URL of the captured photo
    pub food_name: String,
    pub nutrients: NutrientInfo,
    pub description: Option<String>,
}

/// Everything a meal needs except its identity and timestamp.
#[derive(Debug, Clone)]
pub struct NewMeal {
    pub meal_type: MealType,
    pub food_name: String,
    pub nutrients: NutrientInfo,
    pub image: Option<String>,
    pub description: Option<String>,
}

impl Meal {
    pub fn create(new: NewMeal, timestamp: OffsetDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            meal_type: new.meal_type,
            image: new.image,
            food_name: new.food_name,
            nutrients: new.nutrients,
            description: new.description,
        }
    }

    /// Copy of the meal without its photo data.
    pub fn without_image(&self) -> Self {
        Self {
            image: None,
            food_name: self.food_name.clone(),
            description: self.description.clone(),
            ..*self
        }
    }
}
