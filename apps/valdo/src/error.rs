//! apps/valdo/src/error.rs
//!
//! Defines the primary error type for the terminal client.

use valdo_core::ports::PortError;

/// The primary error type for the `valdo` client.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents a standard Input/Output error (e.g., reading stdin).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
