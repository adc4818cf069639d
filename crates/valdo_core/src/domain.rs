//! crates/valdo_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any storage backend or transport;
//! serde derives exist only to honor the store's JSON round-trip contract.

use chrono::Local;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Option<Gender> {
        match value.to_lowercase().as_str() {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            "other" => Some(Gender::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    ManagingCondition,
    Recovering,
    ImprovingFitness,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::ManagingCondition => "managing_condition",
            HealthStatus::Recovering => "recovering",
            HealthStatus::ImprovingFitness => "improving_fitness",
        }
    }

    pub fn parse(value: &str) -> Option<HealthStatus> {
        match value.to_lowercase().as_str() {
            "healthy" => Some(HealthStatus::Healthy),
            "managing_condition" => Some(HealthStatus::ManagingCondition),
            "recovering" => Some(HealthStatus::Recovering),
            "improving_fitness" => Some(HealthStatus::ImprovingFitness),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    HealthyLifestyle,
    LoseWeight,
    GainMuscle,
    ManageCondition,
}

impl Goal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Goal::HealthyLifestyle => "healthy_lifestyle",
            Goal::LoseWeight => "lose_weight",
            Goal::GainMuscle => "gain_muscle",
            Goal::ManageCondition => "manage_condition",
        }
    }

    pub fn parse(value: &str) -> Option<Goal> {
        match value.to_lowercase().as_str() {
            "healthy_lifestyle" => Some(Goal::HealthyLifestyle),
            "lose_weight" => Some(Goal::LoseWeight),
            "gain_muscle" => Some(Goal::GainMuscle),
            "manage_condition" => Some(Goal::ManageCondition),
            _ => None,
        }
    }
}

/// The user's persisted demographic and health attributes.
///
/// A profile is either fully present or entirely absent; there is no partial
/// profile state anywhere in the application.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub name: String,
    pub email: String,
    pub age: u32,
    pub gender: Gender,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub health_status: HealthStatus,
    pub goal: Goal,
}

impl Profile {
    /// The demo profile fabricated when someone signs in with an email the
    /// store has never seen. The name is the capitalized local part of the
    /// address; the rest are fixed starter values.
    pub fn demo_for_email(email: &str) -> Profile {
        let local_part = email.split('@').next().unwrap_or(email);
        let mut chars = local_part.chars();
        let name = match chars.next() {
            Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            None => "Guest".to_string(),
        };

        Profile {
            name,
            email: email.to_string(),
            age: 30,
            gender: Gender::Male,
            height_cm: 175.0,
            weight_kg: 75.0,
            health_status: HealthStatus::Healthy,
            goal: Goal::HealthyLifestyle,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }

    pub fn parse(value: &str) -> Option<MealType> {
        match value.to_lowercase().as_str() {
            "breakfast" => Some(MealType::Breakfast),
            "lunch" => Some(MealType::Lunch),
            "dinner" => Some(MealType::Dinner),
            "snack" => Some(MealType::Snack),
            _ => None,
        }
    }
}

/// One logged food event. Immutable once created; entries are appended to an
/// ordered list and never edited or deleted in-app.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MealEntry {
    #[serde(rename = "type")]
    pub meal_type: MealType,
    pub description: String,
    #[serde(default)]
    pub calories: u32,
    #[serde(default)]
    pub carbs_g: u32,
    #[serde(default)]
    pub protein_g: u32,
    #[serde(default)]
    pub fat_g: u32,
    #[serde(default)]
    pub sugar_g: u32,
    /// Clock string, "HH:MM".
    pub time: String,
    /// Calendar-day string, "YYYY-MM-DD". The partition key for "today".
    pub date: String,
}

/// The fields of a meal a user fills in; the session stamps time and date
/// when the entry is created.
#[derive(Debug, Clone)]
pub struct MealDraft {
    pub meal_type: MealType,
    pub description: String,
    pub calories: u32,
    pub carbs_g: u32,
    pub protein_g: u32,
    pub fat_g: u32,
    pub sugar_g: u32,
}

/// Structured results of a nutrition-label scan, as reported by the scanner
/// service. Every field is nullable; the label may not carry all values.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NutritionFacts {
    pub calories: Option<f64>,
    pub fat: Option<f64>,
    pub carbohydrates: Option<f64>,
    pub sugar: Option<f64>,
    pub protein: Option<f64>,
    pub serving_size: Option<String>,
}

impl NutritionFacts {
    /// Converts confirmed scan results into a meal draft. Absent numeric
    /// fields coerce to 0 per the input-boundary policy; a scanned entry is
    /// always logged as a snack.
    pub fn into_meal_draft(self) -> MealDraft {
        let description = match &self.serving_size {
            Some(serving) => format!("Scanned food item ({serving})"),
            None => "Scanned food item".to_string(),
        };

        MealDraft {
            meal_type: MealType::Snack,
            description,
            calories: coerce(self.calories),
            carbs_g: coerce(self.carbohydrates),
            protein_g: coerce(self.protein),
            fat_g: coerce(self.fat),
            sugar_g: coerce(self.sugar),
        }
    }
}

fn coerce(value: Option<f64>) -> u32 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v.round() as u32,
        _ => 0,
    }
}

/// Today's calendar-day string in client local time, read from the wall
/// clock at call time. A call chain spanning local midnight can observe two
/// different "today"s; that is the documented behavior.
pub fn local_date_string() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// The current clock string in client local time, "HH:MM".
pub fn local_time_string() -> String {
    Local::now().format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_profile_capitalizes_local_part() {
        let profile = Profile::demo_for_email("maria.j@example.com");
        assert_eq!(profile.name, "Maria.j");
        assert_eq!(profile.email, "maria.j@example.com");
        assert_eq!(profile.age, 30);
        assert_eq!(profile.goal, Goal::HealthyLifestyle);
    }

    #[test]
    fn enums_round_trip_through_their_names() {
        for gender in [Gender::Male, Gender::Female, Gender::Other] {
            assert_eq!(Gender::parse(gender.as_str()), Some(gender));
        }
        for meal_type in [
            MealType::Breakfast,
            MealType::Lunch,
            MealType::Dinner,
            MealType::Snack,
        ] {
            assert_eq!(MealType::parse(meal_type.as_str()), Some(meal_type));
        }
        assert_eq!(Goal::parse("not_a_goal"), None);
    }

    #[test]
    fn meal_entry_defaults_missing_numeric_fields_to_zero() {
        let json = r#"{"type":"lunch","description":"soup","calories":120,
                       "time":"12:30","date":"2024-01-02"}"#;
        let entry: MealEntry = serde_json::from_str(json).expect("entry should parse");
        assert_eq!(entry.carbs_g, 0);
        assert_eq!(entry.sugar_g, 0);
        assert_eq!(entry.calories, 120);
    }

    #[test]
    fn scan_results_coerce_null_fields_to_zero() {
        let facts = NutritionFacts {
            calories: Some(250.0),
            fat: None,
            carbohydrates: Some(33.4),
            sugar: Some(-2.0),
            protein: None,
            serving_size: Some("2 cookies".to_string()),
        };

        let draft = facts.into_meal_draft();
        assert_eq!(draft.meal_type, MealType::Snack);
        assert_eq!(draft.description, "Scanned food item (2 cookies)");
        assert_eq!(draft.calories, 250);
        assert_eq!(draft.carbs_g, 33);
        assert_eq!(draft.fat_g, 0);
        assert_eq!(draft.sugar_g, 0);
    }
}
