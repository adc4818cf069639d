//! crates/valdo_core/src/aggregate.rs
//!
//! Stateless computation deriving display statistics from the meal list.
//! Every function here is total over its documented input shape: malformed
//! numeric input is coerced to 0 before it reaches this module, and the
//! divide-by-zero cases are defined results, not errors.

use std::collections::BTreeSet;

use crate::domain::MealEntry;

/// Kilocalories estimated per step.
const KCAL_PER_STEP: f64 = 0.04;

/// The dashboard meal goal: three logged meals per day.
pub const DAILY_MEAL_GOAL: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MealField {
    Calories,
    Carbs,
    Protein,
    Fat,
    Sugar,
}

/// Filters the log down to entries whose date string equals `today`.
/// `today` is a wall-clock read taken by the caller at call time.
pub fn todays_meals<'a>(meals: &'a [MealEntry], today: &str) -> Vec<&'a MealEntry> {
    meals.iter().filter(|meal| meal.date == today).collect()
}

/// Arithmetic sum of one field across the given entries.
pub fn sum_field<'a, I>(meals: I, field: MealField) -> u32
where
    I: IntoIterator<Item = &'a MealEntry>,
{
    meals
        .into_iter()
        .map(|meal| match field {
            MealField::Calories => meal.calories,
            MealField::Carbs => meal.carbs_g,
            MealField::Protein => meal.protein_g,
            MealField::Fat => meal.fat_g,
            MealField::Sugar => meal.sugar_g,
        })
        .sum()
}

/// Number of distinct calendar days with at least one entry.
pub fn distinct_days(meals: &[MealEntry]) -> usize {
    meals
        .iter()
        .map(|meal| meal.date.as_str())
        .collect::<BTreeSet<_>>()
        .len()
}

/// Rounded per-day average; defined as 0 when no days have been logged.
pub fn average_per_day(total: u32, distinct_day_count: usize) -> u32 {
    if distinct_day_count == 0 {
        return 0;
    }
    ((total as f64) / (distinct_day_count as f64)).round() as u32
}

/// Percentage of the meal goal reached, clamped to [0, 100].
pub fn progress_to_goal(logged_count: u32, goal_count: u32) -> u32 {
    if goal_count == 0 {
        return 0;
    }
    ((logged_count * 100) / goal_count).min(100)
}

/// Estimated kilocalories burnt from a step count.
pub fn estimated_calories_burnt(steps: u32) -> u32 {
    (steps as f64 * KCAL_PER_STEP).round() as u32
}

//=========================================================================================
// BMI
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BmiClass {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiClass {
    pub fn label(&self) -> &'static str {
        match self {
            BmiClass::Underweight => "underweight",
            BmiClass::Normal => "normal",
            BmiClass::Overweight => "overweight",
            BmiClass::Obese => "obese",
        }
    }

    pub fn from_bmi(bmi: f64) -> BmiClass {
        if bmi < 18.5 {
            BmiClass::Underweight
        } else if bmi < 25.0 {
            BmiClass::Normal
        } else if bmi < 30.0 {
            BmiClass::Overweight
        } else {
            BmiClass::Obese
        }
    }
}

/// Body mass index, weight over squared height, rounded to one decimal.
pub fn bmi(weight_kg: f64, height_cm: f64) -> f64 {
    if height_cm <= 0.0 {
        return 0.0;
    }
    let height_m = height_cm / 100.0;
    let raw = weight_kg / (height_m * height_m);
    (raw * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MealType;

    fn meal(date: &str, calories: u32, sugar: u32) -> MealEntry {
        MealEntry {
            meal_type: MealType::Lunch,
            description: "test meal".to_string(),
            calories,
            carbs_g: 10,
            protein_g: 5,
            fat_g: 2,
            sugar_g: sugar,
            time: "12:00".to_string(),
            date: date.to_string(),
        }
    }

    #[test]
    fn sum_over_empty_list_is_zero() {
        assert_eq!(sum_field(&[], MealField::Calories), 0);
        assert_eq!(sum_field(&[], MealField::Sugar), 0);
    }

    #[test]
    fn todays_meals_filters_by_exact_date_string() {
        let meals = vec![meal("2024-01-01", 400, 10), meal("2024-01-02", 600, 20)];
        let today = todays_meals(&meals, "2024-01-02");
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].calories, 600);
    }

    #[test]
    fn field_sums_accumulate() {
        let meals = vec![meal("2024-01-01", 400, 12), meal("2024-01-01", 350, 8)];
        assert_eq!(sum_field(&meals, MealField::Calories), 750);
        assert_eq!(sum_field(&meals, MealField::Sugar), 20);
        assert_eq!(sum_field(&meals, MealField::Carbs), 20);
    }

    #[test]
    fn progress_is_clamped_to_one_hundred() {
        assert_eq!(progress_to_goal(0, 3), 0);
        assert_eq!(progress_to_goal(1, 3), 33);
        assert_eq!(progress_to_goal(3, 3), 100);
        assert_eq!(progress_to_goal(5, 3), 100);
        assert_eq!(progress_to_goal(5, 0), 0);
    }

    #[test]
    fn average_per_day_guards_division_by_zero() {
        assert_eq!(average_per_day(0, 0), 0);
        assert_eq!(average_per_day(900, 0), 0);
        assert_eq!(average_per_day(900, 2), 450);
        assert_eq!(average_per_day(1000, 3), 333);
    }

    #[test]
    fn distinct_days_counts_unique_dates() {
        let meals = vec![
            meal("2024-01-01", 1, 0),
            meal("2024-01-01", 2, 0),
            meal("2024-01-03", 3, 0),
        ];
        assert_eq!(distinct_days(&meals), 2);
        assert_eq!(distinct_days(&[]), 0);
    }

    #[test]
    fn steps_convert_at_the_fixed_rate() {
        assert_eq!(estimated_calories_burnt(0), 0);
        assert_eq!(estimated_calories_burnt(8543), 342);
        assert_eq!(estimated_calories_burnt(10_000), 400);
    }

    #[test]
    fn bmi_rounds_to_one_decimal_and_classifies() {
        let value = bmi(70.0, 175.0);
        assert!((value - 22.9).abs() < f64::EPSILON);
        assert_eq!(BmiClass::from_bmi(value), BmiClass::Normal);
    }

    #[test]
    fn bmi_band_edges() {
        assert_eq!(BmiClass::from_bmi(18.4), BmiClass::Underweight);
        assert_eq!(BmiClass::from_bmi(18.5), BmiClass::Normal);
        assert_eq!(BmiClass::from_bmi(24.9), BmiClass::Normal);
        assert_eq!(BmiClass::from_bmi(25.0), BmiClass::Overweight);
        assert_eq!(BmiClass::from_bmi(29.9), BmiClass::Overweight);
        assert_eq!(BmiClass::from_bmi(30.0), BmiClass::Obese);
    }
}
