use std::iter::Sum;
use std::ops::Add;

use serde::Serialize;

use crate::meals::repo_types::{Meal, NutrientInfo};

/// Field-wise macro sums. Portion weight is not aggregated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MacroTotals {
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
}

impl Add<&NutrientInfo> for MacroTotals {
    type Output = MacroTotals;

    fn add(self, n: &NutrientInfo) -> MacroTotals {
        MacroTotals {
            calories: self.calories + n.calories,
            protein: self.protein + n.protein,
            fat: self.fat + n.fat,
            carbs: self.carbs + n.carbs,
        }
    }
}

impl<'a> Sum<&'a NutrientInfo> for MacroTotals {
    fn sum<I: Iterator<Item = &'a NutrientInfo>>(iter: I) -> Self {
        iter.fold(MacroTotals::default(), |acc, n| acc + n)
    }
}

pub fn totals<'a, I>(meals: I) -> MacroTotals
where
    I: IntoIterator<Item = &'a Meal>,
{
    meals.into_iter().map(|m| &m.nutrients).sum()
}
