//! crates/valdo_core/src/session.rs
//!
//! The session: the in-memory, per-run mirror of the persistent store. It is
//! hydrated once at startup and written back key-by-key, synchronously,
//! immediately after every mutation — there is no batching and no cross-key
//! transaction. UI handlers receive the session by reference; it is the one
//! owner of profile, meal log, flags and step counter.

use crate::aggregate::{
    self, average_per_day, bmi, distinct_days, estimated_calories_burnt, progress_to_goal,
    sum_field, BmiClass, MealField, DAILY_MEAL_GOAL,
};
use crate::domain::{local_time_string, MealDraft, MealEntry, Profile};
use crate::ports::{KeyValueStore, PortResult};
use crate::screens::Screen;
use crate::store::{self, keys};

#[derive(Debug, Default)]
pub struct Session {
    profile: Option<Profile>,
    meals: Vec<MealEntry>,
    first_time_user: bool,
    steps: u32,
    steps_date: Option<String>,
    last_weight_prompt_date: Option<String>,
}

impl Session {
    /// Hydrates the session from the store. Absent keys resolve to their
    /// defaults; nothing here can fail.
    pub fn load(store: &dyn KeyValueStore) -> Session {
        Session {
            profile: store::get_json(store, keys::PROFILE),
            meals: store::get_json(store, keys::MEALS).unwrap_or_default(),
            first_time_user: store::get_flag(store, keys::FIRST_TIME_USER),
            steps: store::get_counter(store, keys::STEPS),
            steps_date: store::get_string(store, keys::STEPS_DATE),
            last_weight_prompt_date: store::get_string(store, keys::LAST_WEIGHT_PROMPT_DATE),
        }
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn meals(&self) -> &[MealEntry] {
        &self.meals
    }

    pub fn is_first_time_user(&self) -> bool {
        self.first_time_user
    }

    /// The screen shown at startup: the dashboard when a profile exists,
    /// otherwise the first stage of the welcome sequence.
    pub fn initial_screen(&self) -> Screen {
        if self.profile.is_some() {
            Screen::Dashboard
        } else {
            Screen::Welcome1
        }
    }

    //=====================================================================================
    // Sign-in / sign-up / tutorial
    //=====================================================================================

    /// Demo sign-in. Adopts the stored profile when the email matches it;
    /// otherwise fabricates the demo profile for the address and marks the
    /// user as first-time. The meal log is left untouched either way.
    pub fn sign_in(&mut self, store: &dyn KeyValueStore, email: &str) -> PortResult<Screen> {
        let matches = self
            .profile
            .as_ref()
            .map(|p| p.email == email)
            .unwrap_or(false);

        if !matches {
            self.profile = Some(Profile::demo_for_email(email));
            self.first_time_user = true;
            self.persist_profile(store)?;
            self.persist_flag(store)?;
        }

        Ok(Screen::Dashboard)
    }

    /// Sign-up with a fully filled profile. Always a first-time user; routes
    /// into the tutorial.
    pub fn sign_up(&mut self, store: &dyn KeyValueStore, profile: Profile) -> PortResult<Screen> {
        self.profile = Some(profile);
        self.first_time_user = true;
        self.persist_profile(store)?;
        self.persist_flag(store)?;
        Ok(Screen::Tutorial)
    }

    /// The once-per-profile-lifetime true→false transition.
    pub fn complete_tutorial(&mut self, store: &dyn KeyValueStore) -> PortResult<Screen> {
        self.first_time_user = false;
        self.persist_flag(store)?;
        Ok(Screen::Dashboard)
    }

    //=====================================================================================
    // Meal logging
    //=====================================================================================

    /// Appends a meal stamped with the given date and the current clock, and
    /// persists the log. The first meal ever logged by a first-time user
    /// routes to the celebration screen, exactly once; everything else goes
    /// back to the dashboard.
    pub fn log_meal(
        &mut self,
        store: &dyn KeyValueStore,
        draft: MealDraft,
        today: &str,
    ) -> PortResult<Screen> {
        let entry = MealEntry {
            meal_type: draft.meal_type,
            description: draft.description,
            calories: draft.calories,
            carbs_g: draft.carbs_g,
            protein_g: draft.protein_g,
            fat_g: draft.fat_g,
            sugar_g: draft.sugar_g,
            time: local_time_string(),
            date: today.to_string(),
        };

        self.meals.push(entry);
        self.persist_meals(store)?;

        if self.first_time_user && self.meals.len() == 1 {
            Ok(Screen::Celebration)
        } else {
            Ok(Screen::Dashboard)
        }
    }

    //=====================================================================================
    // Weight prompt
    //=====================================================================================

    /// Whether the once-per-day morning weight prompt should show.
    pub fn weight_prompt_due(&self, today: &str) -> bool {
        self.profile.is_some() && self.last_weight_prompt_date.as_deref() != Some(today)
    }

    /// Records a morning weight (and optionally height) entry. Either field
    /// may be absent; non-positive values are ignored at this boundary. The
    /// prompt date is stamped so the modal stays quiet until tomorrow.
    pub fn record_weight(
        &mut self,
        store: &dyn KeyValueStore,
        weight_kg: Option<f64>,
        height_cm: Option<f64>,
        today: &str,
    ) -> PortResult<()> {
        if let Some(profile) = self.profile.as_mut() {
            if let Some(weight) = weight_kg.filter(|w| *w > 0.0) {
                profile.weight_kg = weight;
            }
            if let Some(height) = height_cm.filter(|h| *h > 0.0) {
                profile.height_cm = height;
            }
            self.persist_profile(store)?;
        }
        self.stamp_weight_prompt(store, today)
    }

    /// Dismissing the prompt also stamps the date; skip means "not today".
    pub fn skip_weight_prompt(
        &mut self,
        store: &dyn KeyValueStore,
        today: &str,
    ) -> PortResult<()> {
        self.stamp_weight_prompt(store, today)
    }

    fn stamp_weight_prompt(&mut self, store: &dyn KeyValueStore, today: &str) -> PortResult<()> {
        self.last_weight_prompt_date = Some(today.to_string());
        store.set(keys::LAST_WEIGHT_PROMPT_DATE, today)
    }

    //=====================================================================================
    // Steps
    //=====================================================================================

    /// Steps recorded for `today`; a counter carried over from a previous
    /// day reads as 0 until the rollover is applied by the next update.
    pub fn steps_today(&self, today: &str) -> u32 {
        if self.steps_date.as_deref() == Some(today) {
            self.steps
        } else {
            0
        }
    }

    /// Adds steps, resetting the counter first when the calendar day has
    /// rolled over. The counter never decreases within a day.
    pub fn add_steps(&mut self, store: &dyn KeyValueStore, count: u32, today: &str) -> PortResult<()> {
        if self.steps_date.as_deref() != Some(today) {
            self.steps = 0;
            self.steps_date = Some(today.to_string());
        }
        self.steps = self.steps.saturating_add(count);
        self.persist_steps(store)
    }

    //=====================================================================================
    // Logout
    //=====================================================================================

    /// Removes every store key and resets the in-memory state to defaults.
    /// Only called after the user confirms logout.
    pub fn clear(&mut self, store: &dyn KeyValueStore) -> PortResult<()> {
        for key in store::ALL_KEYS {
            store.remove(key)?;
        }
        *self = Session::default();
        Ok(())
    }

    //=====================================================================================
    // Derived views
    //=====================================================================================

    /// Everything the dashboard displays, recomputed from current state.
    pub fn dashboard_summary(&self, today: &str) -> DashboardSummary {
        let todays: Vec<&MealEntry> = aggregate::todays_meals(&self.meals, today);
        let logged = todays.len() as u32;
        let steps = self.steps_today(today);

        DashboardSummary {
            first_name: self
                .profile
                .as_ref()
                .and_then(|p| p.name.split_whitespace().next())
                .unwrap_or("")
                .to_string(),
            meals_logged_today: logged,
            calories_gained: sum_field(todays.iter().copied(), MealField::Calories),
            carbs_g: sum_field(todays.iter().copied(), MealField::Carbs),
            protein_g: sum_field(todays.iter().copied(), MealField::Protein),
            fat_g: sum_field(todays.iter().copied(), MealField::Fat),
            sugar_g: sum_field(todays.iter().copied(), MealField::Sugar),
            progress_percent: progress_to_goal(logged, DAILY_MEAL_GOAL),
            steps,
            calories_burnt: estimated_calories_burnt(steps),
        }
    }

    /// Everything the metrics screen displays: multi-day averages plus the
    /// BMI read off the profile.
    pub fn metrics_summary(&self, today: &str) -> MetricsSummary {
        let days = distinct_days(&self.meals);
        let total_calories = sum_field(&self.meals, MealField::Calories);
        let total_sugar = sum_field(&self.meals, MealField::Sugar);

        let body = self.profile.as_ref().map(|profile| {
            let value = bmi(profile.weight_kg, profile.height_cm);
            BodyMetrics {
                weight_kg: profile.weight_kg,
                height_cm: profile.height_cm,
                bmi: value,
                bmi_class: BmiClass::from_bmi(value),
            }
        });

        MetricsSummary {
            distinct_days: days,
            avg_calories_per_day: average_per_day(total_calories, days),
            avg_sugar_per_day: average_per_day(total_sugar, days),
            meals_today: aggregate::todays_meals(&self.meals, today).len() as u32,
            body,
        }
    }

    fn persist_profile(&self, store: &dyn KeyValueStore) -> PortResult<()> {
        match &self.profile {
            Some(profile) => store::put_json(store, keys::PROFILE, profile),
            None => store.remove(keys::PROFILE),
        }
    }

    fn persist_meals(&self, store: &dyn KeyValueStore) -> PortResult<()> {
        store::put_json(store, keys::MEALS, &self.meals)
    }

    fn persist_flag(&self, store: &dyn KeyValueStore) -> PortResult<()> {
        store.set(
            keys::FIRST_TIME_USER,
            if self.first_time_user { "true" } else { "false" },
        )
    }

    fn persist_steps(&self, store: &dyn KeyValueStore) -> PortResult<()> {
        store.set(keys::STEPS, &self.steps.to_string())?;
        match &self.steps_date {
            Some(date) => store.set(keys::STEPS_DATE, date),
            None => store.remove(keys::STEPS_DATE),
        }
    }
}

/// Derived display values for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSummary {
    pub first_name: String,
    pub meals_logged_today: u32,
    pub calories_gained: u32,
    pub carbs_g: u32,
    pub protein_g: u32,
    pub fat_g: u32,
    pub sugar_g: u32,
    pub progress_percent: u32,
    pub steps: u32,
    pub calories_burnt: u32,
}

/// Derived display values for the metrics screen.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSummary {
    pub distinct_days: usize,
    pub avg_calories_per_day: u32,
    pub avg_sugar_per_day: u32,
    pub meals_today: u32,
    pub body: Option<BodyMetrics>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BodyMetrics {
    pub weight_kg: f64,
    pub height_cm: f64,
    pub bmi: f64,
    pub bmi_class: BmiClass,
}
