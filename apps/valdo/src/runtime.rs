//! apps/valdo/src/runtime.rs
//!
//! The event loop that ties everything together: one task owns the session
//! and the screen controller, and every mutation happens on a discrete loop
//! iteration, either a stdin command or a due welcome-sequence transition.
//! The select arm for the timer is rebuilt each iteration from the
//! controller's pending schedule, so a manual navigation (which clears that
//! schedule) also cancels the wakeup.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use valdo_core::domain::{
    local_date_string, Gender, Goal, HealthStatus, MealDraft, MealType, NutritionFacts, Profile,
};
use valdo_core::ports::{
    CaptureDevice, CoachService, KeyValueStore, NutritionScanService, PortError,
};
use valdo_core::screens::{Screen, ScreenController, ScreenEffect};
use valdo_core::session::Session;

use crate::error::AppError;
use crate::remote::{COACH_FALLBACK_REPLY, SCAN_NETWORK_ERROR};
use crate::render::render_screen;

//=========================================================================================
// Commands
//=========================================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Quit,
    Go(String),
    SignIn(String),
    SignUp(Box<Profile>),
    Continue,
    Meal(MealDraftArgs),
    Capture,
    Confirm,
    Retry,
    Weight {
        weight_kg: Option<f64>,
        height_cm: Option<f64>,
    },
    SkipWeight,
    Steps(u32),
    Chat(String),
    Logout,
    Yes,
    No,
    Empty,
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MealDraftArgs {
    pub meal_type: MealType,
    pub calories: u32,
    pub carbs_g: u32,
    pub protein_g: u32,
    pub fat_g: u32,
    pub sugar_g: u32,
    pub description: String,
}

impl From<MealDraftArgs> for MealDraft {
    fn from(args: MealDraftArgs) -> Self {
        MealDraft {
            meal_type: args.meal_type,
            description: args.description,
            calories: args.calories,
            carbs_g: args.carbs_g,
            protein_g: args.protein_g,
            fat_g: args.fat_g,
            sugar_g: args.sugar_g,
        }
    }
}

/// Malformed numeric input is coerced to 0 here, at the input boundary;
/// nothing downstream ever rejects a number.
fn parse_u32(token: Option<&str>) -> u32 {
    token.and_then(|t| t.parse::<u32>().ok()).unwrap_or(0)
}

fn parse_f64(token: Option<&str>) -> Option<f64> {
    token.and_then(|t| t.parse::<f64>().ok()).filter(|v| *v > 0.0)
}

pub fn parse_command(input: &str) -> Command {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Command::Empty;
    }

    let mut parts = trimmed.split_whitespace();
    let verb = parts.next().unwrap_or_default().to_lowercase();
    let rest: Vec<&str> = parts.collect();

    match verb.as_str() {
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        "go" => match rest.first() {
            Some(name) => Command::Go((*name).to_string()),
            None => Command::Unknown("go needs a screen name".to_string()),
        },
        "signin" => match rest.first() {
            Some(email) => Command::SignIn((*email).to_string()),
            None => Command::Unknown("signin needs an email".to_string()),
        },
        "signup" => parse_signup(&rest),
        "continue" => Command::Continue,
        "meal" => parse_meal(&rest),
        "capture" => Command::Capture,
        "confirm" => Command::Confirm,
        "retry" => Command::Retry,
        "weight" => Command::Weight {
            weight_kg: parse_f64(rest.first().copied()),
            height_cm: parse_f64(rest.get(1).copied()),
        },
        "skip" => Command::SkipWeight,
        "steps" => Command::Steps(parse_u32(rest.first().copied())),
        "chat" => {
            let message = rest.join(" ");
            if message.is_empty() {
                Command::Unknown("chat needs a message".to_string())
            } else {
                Command::Chat(message)
            }
        }
        "logout" => Command::Logout,
        "yes" => Command::Yes,
        "no" => Command::No,
        other => Command::Unknown(format!("unknown command '{other}', try `help`")),
    }
}

/// signup <email> <age> <gender> <height_cm> <weight_kg> <health_status> <goal> <name...>
fn parse_signup(rest: &[&str]) -> Command {
    let Some(email) = rest.first() else {
        return Command::Unknown("signup needs at least an email and a name".to_string());
    };
    let name = if rest.len() > 7 {
        rest[7..].join(" ")
    } else {
        return Command::Unknown(
            "use: signup <email> <age> <gender> <height_cm> <weight_kg> <health_status> <goal> <name...>"
                .to_string(),
        );
    };

    let profile = Profile {
        name,
        email: (*email).to_string(),
        age: parse_u32(rest.get(1).copied()),
        gender: rest
            .get(2)
            .and_then(|g| Gender::parse(g))
            .unwrap_or(Gender::Other),
        height_cm: parse_f64(rest.get(3).copied()).unwrap_or(0.0),
        weight_kg: parse_f64(rest.get(4).copied()).unwrap_or(0.0),
        health_status: rest
            .get(5)
            .and_then(|s| HealthStatus::parse(s))
            .unwrap_or(HealthStatus::Healthy),
        goal: rest
            .get(6)
            .and_then(|g| Goal::parse(g))
            .unwrap_or(Goal::HealthyLifestyle),
    };
    Command::SignUp(Box::new(profile))
}

/// meal <type> <calories> <carbs> <protein> <fat> <sugar> <description...>
fn parse_meal(rest: &[&str]) -> Command {
    if rest.is_empty() {
        return Command::Unknown(
            "use: meal <type> <calories> <carbs> <protein> <fat> <sugar> <description...>"
                .to_string(),
        );
    }

    let meal_type = rest
        .first()
        .and_then(|t| MealType::parse(t))
        .unwrap_or(MealType::Snack);
    let description = if rest.len() > 6 {
        rest[6..].join(" ")
    } else {
        "(no description)".to_string()
    };

    Command::Meal(MealDraftArgs {
        meal_type,
        calories: parse_u32(rest.get(1).copied()),
        carbs_g: parse_u32(rest.get(2).copied()),
        protein_g: parse_u32(rest.get(3).copied()),
        fat_g: parse_u32(rest.get(4).copied()),
        sugar_g: parse_u32(rest.get(5).copied()),
        description,
    })
}

//=========================================================================================
// The App
//=========================================================================================

pub struct App {
    pub session: Session,
    pub controller: ScreenController,
    store: Box<dyn KeyValueStore>,
    coach: Arc<dyn CoachService>,
    scanner: Arc<dyn NutritionScanService>,
    capture: Box<dyn CaptureDevice>,
    pending_scan: Option<NutritionFacts>,
    awaiting_logout_confirm: bool,
}

impl App {
    pub fn new(
        store: Box<dyn KeyValueStore>,
        coach: Arc<dyn CoachService>,
        scanner: Arc<dyn NutritionScanService>,
        capture: Box<dyn CaptureDevice>,
    ) -> Self {
        let session = Session::load(store.as_ref());
        let controller = match session.initial_screen() {
            Screen::Dashboard => ScreenController::new(Screen::Dashboard),
            _ => ScreenController::with_welcome_sequence(Utc::now()),
        };

        Self {
            session,
            controller,
            store,
            coach,
            scanner,
            capture,
            pending_scan: None,
            awaiting_logout_confirm: false,
        }
    }

    pub fn render(&self) {
        let today = local_date_string();
        println!(
            "\n{}",
            render_screen(
                self.controller.active(),
                &self.session,
                &today,
                self.pending_scan.as_ref()
            )
        );
    }

    fn apply_effects(&mut self, effects: Vec<ScreenEffect>) {
        let mut queue = effects;
        while !queue.is_empty() {
            let mut followups = Vec::new();
            for effect in queue {
                match effect {
                    ScreenEffect::StartCapture => {
                        if let Err(err) = self.capture.start() {
                            println!("Could not start the camera: {err}");
                            // Leaving the screen releases the device again.
                            followups.extend(self.controller.navigate(Screen::Dashboard));
                        }
                    }
                    ScreenEffect::StopCapture => {
                        self.capture.stop();
                        self.pending_scan = None;
                    }
                    // The refresh effects have no work to do here: rendering
                    // recomputes every derived value from the session.
                    ScreenEffect::RefreshDashboard
                    | ScreenEffect::RefreshMealLog
                    | ScreenEffect::RefreshMetrics => {}
                }
            }
            queue = followups;
        }
    }

    fn navigate(&mut self, screen: Screen) {
        let effects = self.controller.navigate(screen);
        self.apply_effects(effects);
    }

    /// Handles one input line. Returns `false` when the app should exit.
    pub async fn handle_line(&mut self, input: &str) -> Result<bool, AppError> {
        let command = parse_command(input);
        debug!(?command, "handling command");

        // A pending logout confirmation swallows the next yes/no.
        if self.awaiting_logout_confirm {
            match command {
                Command::Yes => {
                    self.awaiting_logout_confirm = false;
                    self.session.clear(self.store.as_ref())?;
                    self.navigate(Screen::Welcome1);
                    self.controller.schedule_welcome(Utc::now());
                    self.render();
                    return Ok(true);
                }
                _ => {
                    self.awaiting_logout_confirm = false;
                    println!("Logout cancelled.");
                    return Ok(true);
                }
            }
        }

        let today = local_date_string();
        match command {
            Command::Help => print_help(),
            Command::Quit => return Ok(false),
            Command::Empty => {}
            Command::Unknown(hint) => println!("{hint}"),
            Command::Go(name) => {
                // Unknown names fall through silently.
                let effects = self.controller.navigate_named(&name);
                self.apply_effects(effects);
                self.render();
            }
            Command::SignIn(email) => {
                let screen = self.session.sign_in(self.store.as_ref(), &email)?;
                self.navigate(screen);
                self.render();
            }
            Command::SignUp(profile) => {
                let screen = self.session.sign_up(self.store.as_ref(), *profile)?;
                self.navigate(screen);
                self.render();
            }
            Command::Continue => match self.controller.active() {
                Screen::Tutorial => {
                    let screen = self.session.complete_tutorial(self.store.as_ref())?;
                    self.navigate(screen);
                    self.render();
                }
                Screen::Celebration => {
                    self.navigate(Screen::Dashboard);
                    self.render();
                }
                _ => println!("Nothing to continue from here."),
            },
            Command::Meal(args) => {
                if self.session.profile().is_none() {
                    println!("Sign in before logging meals.");
                } else {
                    let screen =
                        self.session
                            .log_meal(self.store.as_ref(), args.into(), &today)?;
                    self.navigate(screen);
                    self.render();
                }
            }
            Command::Capture => self.run_capture().await,
            Command::Confirm => match self.pending_scan.take() {
                Some(facts) => {
                    let screen = self.session.log_meal(
                        self.store.as_ref(),
                        facts.into_meal_draft(),
                        &today,
                    )?;
                    println!("Meal logged successfully from scan!");
                    self.navigate(screen);
                    self.render();
                }
                None => println!("No scan results to confirm."),
            },
            Command::Retry => {
                self.pending_scan = None;
                self.render();
            }
            Command::Weight {
                weight_kg,
                height_cm,
            } => {
                self.session
                    .record_weight(self.store.as_ref(), weight_kg, height_cm, &today)?;
                self.render();
            }
            Command::SkipWeight => {
                self.session.skip_weight_prompt(self.store.as_ref(), &today)?;
                self.render();
            }
            Command::Steps(count) => {
                self.session.add_steps(self.store.as_ref(), count, &today)?;
                self.render();
            }
            Command::Chat(message) => {
                println!("(coach is thinking...)");
                match self.coach.reply(&message).await {
                    Ok(reply) => println!("Coach: {reply}"),
                    Err(err) => {
                        debug!(error = %err, "coach call failed");
                        println!("Coach: {COACH_FALLBACK_REPLY}");
                    }
                }
            }
            Command::Logout => {
                self.awaiting_logout_confirm = true;
                println!("Are you sure you want to log out? (yes/no)");
            }
            Command::Yes | Command::No => println!("Nothing to confirm."),
        }

        Ok(true)
    }

    /// Captures a frame and sends it to the scanner. Scan failures are shown
    /// and leave the capture session running for another try.
    async fn run_capture(&mut self) {
        if self.controller.active() != Screen::CameraScan {
            println!("Open the camera first: go cameraScan");
            return;
        }

        let frame = match self.capture.capture_frame() {
            Ok(frame) => frame,
            Err(err) => {
                println!("Capture failed: {err}");
                return;
            }
        };

        println!("(scanning label...)");
        match self.scanner.scan_label(&frame).await {
            Ok(facts) => {
                self.pending_scan = Some(facts);
                self.render();
            }
            Err(PortError::Service(reason)) => println!("Scan failed: {reason}"),
            Err(err) => {
                debug!(error = %err, "scan call failed");
                println!("Scan failed: {SCAN_NETWORK_ERROR}");
            }
        }
    }
}

fn print_help() {
    println!(
        "Commands:\n  signin <email>\n  signup <email> <age> <gender> <height_cm> <weight_kg> <health_status> <goal> <name...>\n  continue                     finish the tutorial / celebration\n  meal <type> <calories> <carbs> <protein> <fat> <sugar> <description...>\n  capture | confirm | retry    scan a nutrition label (on the camera screen)\n  weight <kg> [height_cm] | skip\n  steps <n>\n  chat <message...>\n  go <screen>                  e.g. go mealLog, go metrics, go cameraScan\n  logout | quit"
    );
}

//=========================================================================================
// The Event Loop
//=========================================================================================

pub async fn run(mut app: App) -> Result<(), AppError> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    app.render();

    loop {
        let next_fire = app.controller.next_fire_at();

        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(input) => {
                        if !app.handle_line(&input).await? {
                            break;
                        }
                    }
                    None => break,
                }
            }
            _ = sleep_until(next_fire), if next_fire.is_some() => {
                let effects = app.controller.apply_due(Utc::now());
                app.apply_effects(effects);
                app.render();
            }
        }
    }

    Ok(())
}

async fn sleep_until(fire_at: Option<chrono::DateTime<Utc>>) {
    let delay = fire_at
        .and_then(|at| (at - Utc::now()).to_std().ok())
        .unwrap_or(Duration::ZERO);
    tokio::time::sleep(delay).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use valdo_core::ports::PortResult;
    use valdo_core::store::MemoryStore;

    struct StubCoach;

    #[async_trait]
    impl CoachService for StubCoach {
        async fn reply(&self, _message: &str) -> PortResult<String> {
            Ok("stay hydrated".to_string())
        }
    }

    struct StubScanner;

    #[async_trait]
    impl NutritionScanService for StubScanner {
        async fn scan_label(&self, _image_base64: &str) -> PortResult<NutritionFacts> {
            Ok(NutritionFacts {
                calories: Some(210.0),
                sugar: Some(14.0),
                ..Default::default()
            })
        }
    }

    struct StubCapture {
        active: bool,
    }

    impl CaptureDevice for StubCapture {
        fn start(&mut self) -> PortResult<()> {
            self.active = true;
            Ok(())
        }
        fn capture_frame(&mut self) -> PortResult<String> {
            if self.active {
                Ok("ZmFrZQ==".to_string())
            } else {
                Err(PortError::Unexpected("not active".to_string()))
            }
        }
        fn stop(&mut self) {
            self.active = false;
        }
    }

    fn test_app() -> App {
        App::new(
            Box::new(MemoryStore::new()),
            Arc::new(StubCoach),
            Arc::new(StubScanner),
            Box::new(StubCapture { active: false }),
        )
    }

    #[test]
    fn meal_command_coerces_malformed_numbers_to_zero() {
        let command = parse_command("meal lunch abc 30 x 4 2 leftover pasta");
        match command {
            Command::Meal(args) => {
                assert_eq!(args.meal_type, MealType::Lunch);
                assert_eq!(args.calories, 0);
                assert_eq!(args.carbs_g, 30);
                assert_eq!(args.protein_g, 0);
                assert_eq!(args.description, "leftover pasta");
            }
            other => panic!("expected a meal command, got {other:?}"),
        }
    }

    #[test]
    fn signup_command_builds_a_full_profile() {
        let command =
            parse_command("signup jo@example.com 31 female 170 64.5 healthy lose_weight Jo Smith");
        match command {
            Command::SignUp(profile) => {
                assert_eq!(profile.name, "Jo Smith");
                assert_eq!(profile.gender, Gender::Female);
                assert_eq!(profile.goal, Goal::LoseWeight);
                assert!((profile.weight_kg - 64.5).abs() < f64::EPSILON);
            }
            other => panic!("expected a signup command, got {other:?}"),
        }
    }

    #[test]
    fn unparsed_input_becomes_a_hint_not_an_error() {
        assert!(matches!(parse_command("dance"), Command::Unknown(_)));
        assert_eq!(parse_command("   "), Command::Empty);
    }

    #[tokio::test]
    async fn scan_confirm_logs_the_meal_and_celebrates_the_first_one() {
        let mut app = test_app();
        app.handle_line("signin new@example.com").await.unwrap();
        app.handle_line("go cameraScan").await.unwrap();
        app.handle_line("capture").await.unwrap();
        app.handle_line("confirm").await.unwrap();

        assert_eq!(app.controller.active(), Screen::Celebration);
        assert_eq!(app.session.meals().len(), 1);
        assert_eq!(app.session.meals()[0].calories, 210);
        assert_eq!(app.session.meals()[0].meal_type, MealType::Snack);
    }

    #[tokio::test]
    async fn leaving_the_camera_screen_drops_pending_scan_results() {
        let mut app = test_app();
        app.handle_line("signin new@example.com").await.unwrap();
        app.handle_line("go cameraScan").await.unwrap();
        app.handle_line("capture").await.unwrap();
        app.handle_line("go mainDashboard").await.unwrap();
        app.handle_line("confirm").await.unwrap();

        assert!(app.session.meals().is_empty());
    }

    #[tokio::test]
    async fn logout_requires_confirmation_and_clears_state() {
        let mut app = test_app();
        app.handle_line("signin new@example.com").await.unwrap();

        app.handle_line("logout").await.unwrap();
        app.handle_line("no thanks").await.unwrap();
        assert!(app.session.profile().is_some());

        app.handle_line("logout").await.unwrap();
        app.handle_line("yes").await.unwrap();
        assert!(app.session.profile().is_none());
        assert_eq!(app.controller.active(), Screen::Welcome1);
        assert!(app.controller.has_pending());
    }

    #[tokio::test]
    async fn unknown_screen_names_navigate_nowhere() {
        let mut app = test_app();
        app.handle_line("signin new@example.com").await.unwrap();
        assert_eq!(app.controller.active(), Screen::Dashboard);
        app.handle_line("go settingsPanel").await.unwrap();
        assert_eq!(app.controller.active(), Screen::Dashboard);
    }
}
