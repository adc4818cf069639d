//! apps/valdo/src/render.rs
//!
//! The thin rendering layer: turns the active screen plus current session
//! state into terminal text. Nothing in here mutates state; the derived
//! values all come from the core's summaries.

use rand::seq::SliceRandom;
use valdo_core::aggregate::DAILY_MEAL_GOAL;
use valdo_core::domain::NutritionFacts;
use valdo_core::screens::Screen;
use valdo_core::session::Session;

const EMPOWERING_MESSAGES: [&str; 5] = [
    "You're doing amazing! Keep up the great work!",
    "Every step counts towards a healthier you!",
    "You're making great progress today!",
    "Stay strong, you've got this!",
    "Your health journey is inspiring!",
];

pub fn render_screen(
    screen: Screen,
    session: &Session,
    today: &str,
    pending_scan: Option<&NutritionFacts>,
) -> String {
    match screen {
        Screen::Welcome1 => "=== Valdo ===\nYour personal health companion.".to_string(),
        Screen::Welcome2 => "Track your meals, steps and progress in one place.".to_string(),
        Screen::Welcome3 => "Chat with your AI coach and scan nutrition labels.".to_string(),
        Screen::WelcomeFinal => {
            "Ready when you are.\nCommands: signin <email>  |  go signup".to_string()
        }
        Screen::SignIn => "-- Sign in --\nUse: signin <email>".to_string(),
        Screen::SignUp => {
            "-- Sign up --\nUse: signup <email> <age> <gender> <height_cm> <weight_kg> <health_status> <goal> <name...>\n\
             gender: male|female|other   health_status: healthy|managing_condition|recovering|improving_fitness\n\
             goal: healthy_lifestyle|lose_weight|gain_muscle|manage_condition"
                .to_string()
        }
        Screen::Tutorial => {
            "-- Tutorial --\nLog meals with `meal`, check stats under `go metrics`, scan labels under `go cameraScan`.\n\
             Type `continue` when you're done."
                .to_string()
        }
        Screen::Dashboard => render_dashboard(session, today),
        Screen::MealLog => render_meal_log(session, today),
        Screen::CameraScan => render_camera(pending_scan),
        Screen::Metrics => render_metrics(session, today),
        Screen::Profile => render_profile(session),
        Screen::Celebration => {
            "*** First meal logged! ***\nThat's the hardest step. Type `continue` to head back to your dashboard."
                .to_string()
        }
    }
}

fn render_dashboard(session: &Session, today: &str) -> String {
    let Some(profile) = session.profile() else {
        return "No profile yet. Use: signin <email>, or go signup".to_string();
    };
    let summary = session.dashboard_summary(today);
    let empowering = EMPOWERING_MESSAGES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(EMPOWERING_MESSAGES[0]);

    let mut out = format!(
        "== Dashboard ==\nWelcome back, {}!\n{}\n\nSteps today: {}  (~{} kcal burnt)\nCalories gained today: {}\nMacros today: {}g carbs | {}g protein | {}g fat | {}g sugar\nProgress: {}/{} meals logged ({}%)\n",
        if summary.first_name.is_empty() {
            profile.name.as_str()
        } else {
            summary.first_name.as_str()
        },
        empowering,
        summary.steps,
        summary.calories_burnt,
        summary.calories_gained,
        summary.carbs_g,
        summary.protein_g,
        summary.fat_g,
        summary.sugar_g,
        summary.meals_logged_today,
        DAILY_MEAL_GOAL,
        summary.progress_percent,
    );

    let todays = valdo_core::aggregate::todays_meals(session.meals(), today);
    if todays.is_empty() {
        out.push_str("\nNo meals logged yet today.\n");
        out.push_str("Start logging your meals to get personalized feedback!\n");
    } else {
        out.push('\n');
        for meal in &todays {
            out.push_str(&format!(
                "  {} {} - {} ({} kcal)\n",
                meal.time,
                meal.meal_type.as_str(),
                meal.description,
                meal.calories
            ));
        }
        if let Some(last) = todays.last() {
            out.push_str(&format!(
                "Great job logging your {}! Your {} calorie meal is well-balanced. Keep up the consistent tracking!\n",
                last.meal_type.as_str(),
                last.calories
            ));
        }
    }

    if session.weight_prompt_due(today) {
        out.push_str(
            "\nMorning check-in: record today's weight with `weight <kg> [height_cm]`, or `skip`.\n",
        );
    }

    out.push_str("\nCommands: meal | chat <msg> | steps <n> | go mealLog|cameraScan|metrics|profile | logout | quit");
    out
}

fn render_meal_log(session: &Session, today: &str) -> String {
    let mut out = String::from(
        "-- Log a meal --\nUse: meal <type> <calories> <carbs> <protein> <fat> <sugar> <description...>\n     type: breakfast|lunch|dinner|snack\n",
    );
    let todays = valdo_core::aggregate::todays_meals(session.meals(), today);
    if !todays.is_empty() {
        out.push_str("\nLogged today:\n");
        for meal in todays {
            out.push_str(&format!(
                "  {} {} - {} ({} kcal)\n",
                meal.time,
                meal.meal_type.as_str(),
                meal.description,
                meal.calories
            ));
        }
    }
    out
}

fn render_camera(pending_scan: Option<&NutritionFacts>) -> String {
    match pending_scan {
        Some(facts) => {
            let mut out = String::from("-- Scan results --\n");
            let rows = [
                ("Calories", facts.calories),
                ("Fat", facts.fat),
                ("Carbohydrates", facts.carbohydrates),
                ("Sugar", facts.sugar),
                ("Protein", facts.protein),
            ];
            for (label, value) in rows {
                if let Some(v) = value {
                    out.push_str(&format!("  {label}: {v}\n"));
                }
            }
            if let Some(serving) = &facts.serving_size {
                out.push_str(&format!("  Serving size: {serving}\n"));
            }
            out.push_str("Type `confirm` to log this as a snack, or `retry` to scan again.");
            out
        }
        None => "-- Camera --\nDrop a JPEG of a nutrition label into the camera directory, then type `capture`.\nLeave with `go mainDashboard`."
            .to_string(),
    }
}

fn render_metrics(session: &Session, today: &str) -> String {
    let summary = session.metrics_summary(today);
    let mut out = format!(
        "== Metrics ==\nDays tracked: {}\nAverage calories/day: {}\nAverage sugar/day: {}g\nMeals today: {}\n",
        summary.distinct_days,
        summary.avg_calories_per_day,
        summary.avg_sugar_per_day,
        summary.meals_today,
    );
    match summary.body {
        Some(body) => out.push_str(&format!(
            "Weight: {} kg | Height: {} cm\nBMI: {:.1} ({})\n",
            body.weight_kg,
            body.height_cm,
            body.bmi,
            body.bmi_class.label()
        )),
        None => out.push_str("Sign in to see your BMI.\n"),
    }
    out
}

fn render_profile(session: &Session) -> String {
    match session.profile() {
        Some(profile) => format!(
            "== Profile ==\nName: {}\nEmail: {}\nAge: {}\nGender: {}\nHeight: {} cm\nWeight: {} kg\nHealth status: {}\nGoal: {}\n",
            profile.name,
            profile.email,
            profile.age,
            profile.gender.as_str(),
            profile.height_cm,
            profile.weight_kg,
            profile.health_status.as_str(),
            profile.goal.as_str(),
        ),
        None => "No profile. Use: signin <email>, or go signup".to_string(),
    }
}
