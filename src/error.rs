//! Error types for the alert coordination core
//!
//! `AlreadyClaimed`, `NotClaimed` and `ClaimPending` are expected concurrency
//! outcomes, not faults: callers reconcile their local view and move on.
//! Everything else is a genuine rejection or infrastructure failure.

use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by repository, coordinator and location operations
#[derive(Debug, Error)]
pub enum SosError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Alert {alert_id} is no longer open")]
    AlreadyClaimed { alert_id: String },

    #[error("Alert {alert_id} is not in a claimed state")]
    NotClaimed { alert_id: String },

    #[error("Alert not found: {0}")]
    NotFound(String),

    #[error("{action} requires a {required} role")]
    Unauthorized { action: String, required: String },

    #[error("A claim attempt for alert {alert_id} is already in flight")]
    ClaimPending { alert_id: String },

    #[error("Location unavailable: {0}")]
    LocationUnavailable(String),

    #[error("Location acquisition timed out after {0:?}")]
    LocationTimeout(Duration),

    #[error("Store channel closed")]
    StoreClosed,
}

impl SosError {
    /// Build an `InvalidInput` error from anything printable
    pub fn invalid(reason: impl Into<String>) -> Self {
        SosError::InvalidInput(reason.into())
    }

    /// Check whether this is an expected outcome of racing transitions
    ///
    /// Losing a claim race or resolving twice is ordinary operation; callers
    /// should refresh their view rather than treat it as a failure.
    pub fn is_expected_race(&self) -> bool {
        matches!(
            self,
            SosError::AlreadyClaimed { .. } | SosError::NotClaimed { .. } | SosError::ClaimPending { .. }
        )
    }

    /// Check whether the call was rejected before any write happened
    pub fn is_rejected_input(&self) -> bool {
        matches!(self, SosError::InvalidInput(_) | SosError::Unauthorized { .. })
    }
}

/// Result alias used throughout the crate
pub type SosResult<T> = Result<T, SosError>;
