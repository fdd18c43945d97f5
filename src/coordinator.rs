//! Claim coordinator
//!
//! Front door for the two lifecycle transitions. The at-most-one-claimant
//! guarantee comes from the store actor's atomic conditional update; this
//! component adds the policy gate (responder role required) and serializes
//! a session's claim attempts per alert so a second attempt is never issued
//! while the first is still in flight.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use crate::domain::{Alert, PartyRef, Principal};
use crate::error::{SosError, SosResult};
use crate::lifecycle;
use crate::store::AlertStore;

/// Coordinates claim and resolve calls for one session
#[derive(Clone)]
pub struct ClaimCoordinator {
    store: AlertStore,
    in_flight: Arc<Mutex<HashSet<String>>>,
}

/// Removes the alert id from the in-flight set when dropped, so the guard
/// releases even if the claim future is dropped at an await point.
struct InFlightGuard {
    set: Arc<Mutex<HashSet<String>>>,
    alert_id: String,
}

impl InFlightGuard {
    fn acquire(set: &Arc<Mutex<HashSet<String>>>, alert_id: &str) -> SosResult<Self> {
        let mut pending = set.lock().unwrap_or_else(|e| e.into_inner());
        if !pending.insert(alert_id.to_string()) {
            debug!(%alert_id, "claim: attempt already in flight");
            return Err(SosError::ClaimPending {
                alert_id: alert_id.to_string(),
            });
        }
        Ok(Self {
            set: Arc::clone(set),
            alert_id: alert_id.to_string(),
        })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut pending = self.set.lock().unwrap_or_else(|e| e.into_inner());
        pending.remove(&self.alert_id);
    }
}

impl ClaimCoordinator {
    pub fn new(store: AlertStore) -> Self {
        Self {
            store,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Attempt to claim an open alert for a responder
    ///
    /// `AlreadyClaimed` means another responder won the race and the caller
    /// should refresh its view; `ClaimPending` means this session already
    /// has an attempt in flight for the same alert.
    pub async fn claim(&self, alert_id: &str, responder: &Principal) -> SosResult<Alert> {
        lifecycle::authorize_responder("claim", responder)?;

        let _guard = InFlightGuard::acquire(&self.in_flight, alert_id)?;
        let result = self.store.claim_alert(alert_id, PartyRef::from(responder)).await;

        match &result {
            Ok(_) => info!(%alert_id, responder_id = %responder.id, "claim succeeded"),
            Err(e) if e.is_expected_race() => debug!(%alert_id, error = %e, "claim lost race"),
            Err(e) => debug!(%alert_id, error = %e, "claim failed"),
        }
        result
    }

    /// Resolve a claimed alert
    ///
    /// Any responder may resolve, not only the original claimant.
    pub async fn resolve(&self, alert_id: &str, resolver: &Principal, notes: Option<String>) -> SosResult<Alert> {
        lifecycle::authorize_responder("resolve", resolver)?;
        let result = self.store.resolve_alert(alert_id, PartyRef::from(resolver), notes).await;
        if result.is_ok() {
            info!(%alert_id, resolver_id = %resolver.id, "resolve succeeded");
        }
        result
    }
}
