//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use std::sync::Arc;
use valdo_core::ports::{CoachService, NutritionScanService};

/// The shared application state, created once at startup and passed to all
/// handlers. Either adapter may be absent when its provider token is not
/// configured; the handlers degrade instead of failing.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub coach: Option<Arc<dyn CoachService>>,
    pub scanner: Option<Arc<dyn NutritionScanService>>,
}
