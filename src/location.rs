//! Location acquisition
//!
//! Wraps a position source with timeout and accuracy policy. Resolution is
//! exactly-once: the timeout races the single source future, and whichever
//! finishes first wins while the loser is dropped. A fix worse than the
//! accuracy threshold is flagged low-accuracy, never rejected; in an
//! emergency availability beats precision.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::LocationConfig;
use crate::domain::GeoPoint;
use crate::error::{SosError, SosResult};

/// A raw coordinate reading from the underlying positioning capability
#[derive(Debug, Clone, PartialEq)]
pub struct RawFix {
    pub lat: f64,
    pub lng: f64,
    pub accuracy_m: Option<f64>,
}

/// A best-effort positioning capability
///
/// Implemented by the embedding application over whatever geolocation it
/// has; called once per acquisition attempt.
#[async_trait]
pub trait PositionSource: Send + Sync {
    /// Produce one position reading, honoring the high-accuracy hint
    async fn current_position(&self, high_accuracy: bool) -> SosResult<RawFix>;
}

/// Acquire a single coordinate with timeout and accuracy classification
pub async fn acquire(source: &dyn PositionSource, config: &LocationConfig) -> SosResult<GeoPoint> {
    debug!(timeout_ms = config.timeout_ms, high_accuracy = config.high_accuracy, "acquire: called");

    let fix = match tokio::time::timeout(config.timeout(), source.current_position(config.high_accuracy)).await {
        Ok(Ok(fix)) => fix,
        Ok(Err(e)) => {
            warn!(error = %e, "acquire: source failed");
            return Err(e);
        }
        Err(_) => {
            warn!(timeout_ms = config.timeout_ms, "acquire: timed out");
            return Err(SosError::LocationTimeout(config.timeout()));
        }
    };

    if !fix.lat.is_finite() || !fix.lng.is_finite() {
        return Err(SosError::LocationUnavailable("source returned non-finite coordinates".to_string()));
    }

    let low_accuracy = fix.accuracy_m.map(|a| a > config.max_accuracy_m).unwrap_or(false);
    if low_accuracy {
        debug!(accuracy_m = ?fix.accuracy_m, "acquire: low-accuracy fix accepted");
    }

    Ok(GeoPoint {
        lat: fix.lat,
        lng: fix.lng,
        accuracy_m: fix.accuracy_m,
        low_accuracy,
    })
}
