pub mod aggregate;
pub mod domain;
pub mod ports;
pub mod screens;
pub mod session;
pub mod store;

pub use domain::{
    Gender, Goal, HealthStatus, MealDraft, MealEntry, MealType, NutritionFacts, Profile,
};
pub use ports::{
    CaptureDevice, CoachService, KeyValueStore, NutritionScanService, PortError, PortResult,
};
pub use screens::{Screen, ScreenController, ScreenEffect};
pub use session::{DashboardSummary, MetricsSummary, Session};
