use std::collections::VecDeque;

use time::{OffsetDateTime, UtcOffset};
use tracing::debug;
use uuid::Uuid;

use crate::meals::repo_types::Meal;

/// In-memory meal log for the session, newest first.
#[derive(Debug, Default)]
pub struct MealStore {
    meals: VecDeque<Meal>,
}

impl MealStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend a meal. Always succeeds.
    pub fn record(&mut self, meal: Meal) -> Uuid {
        let id = meal.id;
        self.meals.push_front(meal);
        debug!(meal_id = %id, total = self.len(), "meal recorded");
        id
    }

    pub fn list(&self) -> impl Iterator<Item = &Meal> + '_ {
        self.meals.iter()
    }

    pub fn len(&self) -> usize {
        self.meals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meals.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&Meal> {
        self.meals.iter().find(|m| m.id == id)
    }

    /// Meals whose calendar date, seen at `offset`, is today.
    pub fn today_list(&self, offset: UtcOffset) -> Vec<&Meal> {
        self.today_list_at(OffsetDateTime::now_utc().to_offset(offset))
    }

    /// Meals on the same calendar date as `now`, in `now`'s offset.
    pub fn today_list_at(&self, now: OffsetDateTime) -> Vec<&Meal> {
        let today = now.date();
        self.meals
            .iter()
            .filter(|m| m.timestamp.to_offset(now.offset()).date() == today)
            .collect()
    }

    /// Meals logged at or after `cutoff`, newest first.
    pub fn since(&self, cutoff: OffsetDateTime) -> Vec<&Meal> {
        self.meals
            .iter()
            .filter(|m| m.timestamp >= cutoff)
            .collect()
    }
}
