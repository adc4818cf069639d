//! crates/valdo_core/src/screens.rs
//!
//! The screen controller: a fixed set of named UI panels, exactly one active
//! at a time. Transitions return their side effects as data so the rendering
//! layer stays thin, and the timed welcome sequence is held as cancellable
//! pending transitions instead of free-running timers.

use chrono::{DateTime, Duration, Utc};

//=========================================================================================
// Screens
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Welcome1,
    Welcome2,
    Welcome3,
    WelcomeFinal,
    SignIn,
    SignUp,
    Tutorial,
    Dashboard,
    MealLog,
    CameraScan,
    Metrics,
    Profile,
    Celebration,
}

impl Screen {
    /// The screen's wire/display name, accepted by [`Screen::from_name`].
    pub fn name(&self) -> &'static str {
        match self {
            Screen::Welcome1 => "welcome1",
            Screen::Welcome2 => "welcome2",
            Screen::Welcome3 => "welcome3",
            Screen::WelcomeFinal => "welcomeFinal",
            Screen::SignIn => "signin",
            Screen::SignUp => "signup",
            Screen::Tutorial => "tutorial",
            Screen::Dashboard => "mainDashboard",
            Screen::MealLog => "mealLog",
            Screen::CameraScan => "cameraScan",
            Screen::Metrics => "metrics",
            Screen::Profile => "profile",
            Screen::Celebration => "celebration",
        }
    }

    pub fn from_name(name: &str) -> Option<Screen> {
        match name {
            "welcome1" => Some(Screen::Welcome1),
            "welcome2" => Some(Screen::Welcome2),
            "welcome3" => Some(Screen::Welcome3),
            "welcomeFinal" => Some(Screen::WelcomeFinal),
            "signin" => Some(Screen::SignIn),
            "signup" => Some(Screen::SignUp),
            "tutorial" => Some(Screen::Tutorial),
            "mainDashboard" => Some(Screen::Dashboard),
            "mealLog" => Some(Screen::MealLog),
            "cameraScan" => Some(Screen::CameraScan),
            "metrics" => Some(Screen::Metrics),
            "profile" => Some(Screen::Profile),
            "celebration" => Some(Screen::Celebration),
            _ => None,
        }
    }
}

/// A side effect the rendering layer must execute after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenEffect {
    /// Entering the camera screen: acquire the capture device.
    StartCapture,
    /// Leaving the camera screen, on every path: release the capture device.
    StopCapture,
    RefreshDashboard,
    RefreshMealLog,
    RefreshMetrics,
}

fn transition_effects(from: Screen, to: Screen) -> Vec<ScreenEffect> {
    let mut effects = Vec::new();
    if from == Screen::CameraScan && to != Screen::CameraScan {
        effects.push(ScreenEffect::StopCapture);
    }
    match to {
        Screen::CameraScan if from != Screen::CameraScan => {
            effects.push(ScreenEffect::StartCapture)
        }
        Screen::Dashboard => effects.push(ScreenEffect::RefreshDashboard),
        Screen::MealLog => effects.push(ScreenEffect::RefreshMealLog),
        Screen::Metrics => effects.push(ScreenEffect::RefreshMetrics),
        _ => {}
    }
    effects
}

//=========================================================================================
// Scheduled Transitions
//=========================================================================================

/// A screen change scheduled for a future instant. Pending transitions are
/// cancelled wholesale by any manual navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledTransition {
    pub fire_at: DateTime<Utc>,
    pub target: Screen,
}

/// The welcome sequence offsets, in seconds from its start.
const WELCOME_STEPS: [(i64, Screen); 3] = [
    (3, Screen::Welcome2),
    (6, Screen::Welcome3),
    (9, Screen::WelcomeFinal),
];

//=========================================================================================
// Controller
//=========================================================================================

/// Tracks the single active screen and the pending scheduled transitions.
#[derive(Debug)]
pub struct ScreenController {
    active: Screen,
    pending: Vec<ScheduledTransition>,
}

impl ScreenController {
    pub fn new(initial: Screen) -> Self {
        Self {
            active: initial,
            pending: Vec::new(),
        }
    }

    /// Starts the four-stage welcome sequence: `Welcome1` immediately, the
    /// later stages pending at +3 s, +6 s and +9 s.
    pub fn with_welcome_sequence(now: DateTime<Utc>) -> Self {
        let mut controller = Self::new(Screen::Welcome1);
        controller.schedule_welcome(now);
        controller
    }

    /// Re-arms the welcome sequence, e.g. after logout.
    pub fn schedule_welcome(&mut self, now: DateTime<Utc>) {
        self.active = Screen::Welcome1;
        self.pending = WELCOME_STEPS
            .iter()
            .map(|(offset, target)| ScheduledTransition {
                fire_at: now + Duration::seconds(*offset),
                target: *target,
            })
            .collect();
    }

    pub fn active(&self) -> Screen {
        self.active
    }

    /// Manual navigation. Cancels every pending scheduled transition so a
    /// stale welcome timer can never overwrite a screen the user chose, and
    /// returns the side effects of the change.
    pub fn navigate(&mut self, target: Screen) -> Vec<ScreenEffect> {
        self.pending.clear();
        let from = self.active;
        self.active = target;
        transition_effects(from, target)
    }

    /// Navigation by wire name. An unknown name is a silent no-op.
    pub fn navigate_named(&mut self, name: &str) -> Vec<ScreenEffect> {
        match Screen::from_name(name) {
            Some(target) => self.navigate(target),
            None => Vec::new(),
        }
    }

    /// Applies every scheduled transition that is due at `now`, in order.
    /// Later transitions overwrite earlier ones (last write wins within the
    /// sequence itself); the accumulated effects are returned.
    pub fn apply_due(&mut self, now: DateTime<Utc>) -> Vec<ScreenEffect> {
        let mut effects = Vec::new();
        while let Some(next) = self.pending.first().copied() {
            if next.fire_at > now {
                break;
            }
            self.pending.remove(0);
            let from = self.active;
            self.active = next.target;
            effects.extend(transition_effects(from, next.target));
        }
        effects
    }

    /// The instant the driver should wake up next, if anything is pending.
    pub fn next_fire_at(&self) -> Option<DateTime<Utc>> {
        self.pending.first().map(|t| t.fire_at)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-06-01T08:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn welcome_sequence_fires_at_three_second_intervals() {
        let start = t0();
        let mut controller = ScreenController::with_welcome_sequence(start);
        assert_eq!(controller.active(), Screen::Welcome1);
        assert_eq!(controller.next_fire_at(), Some(start + Duration::seconds(3)));

        assert!(controller.apply_due(start + Duration::seconds(2)).is_empty());
        assert_eq!(controller.active(), Screen::Welcome1);

        controller.apply_due(start + Duration::seconds(3));
        assert_eq!(controller.active(), Screen::Welcome2);

        controller.apply_due(start + Duration::seconds(6));
        assert_eq!(controller.active(), Screen::Welcome3);

        controller.apply_due(start + Duration::seconds(9));
        assert_eq!(controller.active(), Screen::WelcomeFinal);
        assert!(!controller.has_pending());
    }

    #[test]
    fn late_driver_applies_all_due_transitions_in_order() {
        let start = t0();
        let mut controller = ScreenController::with_welcome_sequence(start);
        controller.apply_due(start + Duration::seconds(30));
        assert_eq!(controller.active(), Screen::WelcomeFinal);
        assert!(!controller.has_pending());
    }

    #[test]
    fn manual_navigation_cancels_pending_transitions() {
        let start = t0();
        let mut controller = ScreenController::with_welcome_sequence(start);
        controller.navigate(Screen::SignIn);
        assert!(!controller.has_pending());

        // A timer firing after the navigation must not move the screen.
        assert!(controller.apply_due(start + Duration::seconds(10)).is_empty());
        assert_eq!(controller.active(), Screen::SignIn);
    }

    #[test]
    fn unknown_screen_name_is_a_silent_no_op() {
        let mut controller = ScreenController::new(Screen::Dashboard);
        let effects = controller.navigate_named("settingsPanel");
        assert!(effects.is_empty());
        assert_eq!(controller.active(), Screen::Dashboard);
    }

    #[test]
    fn camera_screen_owns_the_capture_device() {
        let mut controller = ScreenController::new(Screen::Dashboard);
        let effects = controller.navigate(Screen::CameraScan);
        assert_eq!(effects, vec![ScreenEffect::StartCapture]);

        // Every path out of the camera screen releases the device.
        let effects = controller.navigate(Screen::Metrics);
        assert_eq!(
            effects,
            vec![ScreenEffect::StopCapture, ScreenEffect::RefreshMetrics]
        );
    }

    #[test]
    fn entering_dashboard_requests_a_refresh() {
        let mut controller = ScreenController::new(Screen::Tutorial);
        let effects = controller.navigate(Screen::Dashboard);
        assert_eq!(effects, vec![ScreenEffect::RefreshDashboard]);
    }

    #[test]
    fn screen_names_round_trip() {
        for screen in [
            Screen::Welcome1,
            Screen::WelcomeFinal,
            Screen::SignIn,
            Screen::Dashboard,
            Screen::CameraScan,
            Screen::Celebration,
        ] {
            assert_eq!(Screen::from_name(screen.name()), Some(screen));
        }
        assert_eq!(Screen::from_name("maindashboard"), None);
    }
}
