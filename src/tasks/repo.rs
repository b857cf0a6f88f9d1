use time::{Duration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::meals::repo_types::Meal;
use crate::tasks::repo_types::{NutritionTask, TaskCategory, TaskPeriod};

/// Goal records for the session. Tasks are only ever updated in place.
#[derive(Debug, Default)]
pub struct TaskTracker {
    tasks: Vec<NutritionTask>,
}

impl TaskTracker {
    pub fn new(tasks: Vec<NutritionTask>) -> Self {
        Self { tasks }
    }

    /// Default weekly goals a new session starts with.
    pub fn seeded(now: OffsetDateTime) -> Self {
        let task = |title: &str, target: f64, current: f64, due_in: Duration, category| {
            NutritionTask {
                id: Uuid::new_v4(),
                title: title.into(),
                target_value: target,
                current_value: current,
                unit: "g".into(),
                deadline: now + due_in,
                period: TaskPeriod::Weekly,
                category,
            }
        };
        Self::new(vec![
            task(
                "Weekly vegetables",
                3500.0,
                1200.0,
                Duration::days(3),
                TaskCategory::Veg,
            ),
            task(
                "Daily protein",
                80.0,
                45.0,
                Duration::hours(12),
                TaskCategory::Protein,
            ),
            task(
                "Limit sugar intake",
                200.0,
                180.0,
                Duration::days(5),
                TaskCategory::Sugar,
            ),
        ])
    }

    pub fn list(&self) -> &[NutritionTask] {
        &self.tasks
    }

    /// The task highlighted on the dashboard.
    pub fn featured(&self) -> Option<&NutritionTask> {
        self.tasks.first()
    }

    /// Advance every task by the meal's contribution to its category.
    pub fn apply_meal(&mut self, meal: &Meal) -> &[NutritionTask] {
        for task in &mut self.tasks {
            let delta = task.category.contribution(&meal.nutrients);
            if delta != 0.0 {
                task.current_value += delta;
                debug!(
                    task_id = %task.id,
                    category = ?task.category,
                    delta,
                    current = task.current_value,
                    "task progressed"
                );
            }
        }
        &self.tasks
    }
}
