//! crates/valdo_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of specific external implementations like the file
//! store, the coach service, or a real camera.

use async_trait::async_trait;

use crate::domain::NutritionFacts;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services
/// (e.g., filesystem, network, LLM provider).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// The collaborator answered, but reported a failure of its own
    /// (e.g. the scanner could not read the label).
    #[error("Service reported failure: {0}")]
    Service(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The persistent store: a durable, synchronous, string-keyed/string-valued
/// map surviving restarts. Values are JSON-encoded by the callers; an absent
/// key is not an error, it resolves to the documented default upstream.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> PortResult<()>;
    fn remove(&self, key: &str) -> PortResult<()>;
}

/// One-shot chat with the AI coach. Fire-and-forget from the core's
/// perspective: implementations map every failure mode to a `PortError` and
/// the UI degrades to a fixed fallback message. No retries, no shared state,
/// no ordering guarantee across concurrent calls.
#[async_trait]
pub trait CoachService: Send + Sync {
    async fn reply(&self, message: &str) -> PortResult<String>;
}

/// One-shot nutrition-label extraction from a base64-encoded image.
#[async_trait]
pub trait NutritionScanService: Send + Sync {
    async fn scan_label(&self, image_base64: &str) -> PortResult<NutritionFacts>;
}

/// The capture device behind the camera screen. Exclusively owned by that
/// screen while it is active; `stop` must be called on every path that
/// leaves the screen, including error paths, so device access never leaks.
pub trait CaptureDevice: Send {
    fn start(&mut self) -> PortResult<()>;
    /// Captures one frame as a base64-encoded image.
    fn capture_frame(&mut self) -> PortResult<String>;
    fn stop(&mut self);
}
