//! Alert lifecycle state machine
//!
//! Pure transition rules: open → claimed → resolved, strictly forward, no
//! skips, no reversals. The store actor is the only caller of the `apply_*`
//! functions, so the status check and field writes always commit together
//! inside its serialized mutation loop.

use chrono::{DateTime, Utc};

use crate::domain::{Alert, AlertStatus, PartyRef, Principal};
use crate::error::{SosError, SosResult};

/// Require a responder role (volunteer, ngo, police) for a transition
///
/// Policy gate in front of the pure state machine; every claim/resolve
/// call path goes through it.
pub fn authorize_responder(action: &str, principal: &Principal) -> SosResult<()> {
    if principal.is_responder() {
        Ok(())
    } else {
        Err(SosError::Unauthorized {
            action: action.to_string(),
            required: "responder".to_string(),
        })
    }
}

/// Require a citizen identity for alert creation
pub fn authorize_citizen(action: &str, principal: &Principal) -> SosResult<()> {
    if principal.id.trim().is_empty() {
        return Err(SosError::invalid("citizen identity required"));
    }
    match principal.role {
        Some(role) if role.is_responder() => Err(SosError::Unauthorized {
            action: action.to_string(),
            required: "citizen".to_string(),
        }),
        _ => Ok(()),
    }
}

/// Transition an alert from open to claimed
///
/// Legal only while the alert is still open at commit time; anything else
/// is `AlreadyClaimed`. Sets claimant and claimed_at exactly once.
pub fn apply_claim(alert: &mut Alert, responder: PartyRef, now: DateTime<Utc>) -> SosResult<()> {
    if alert.status != AlertStatus::Open {
        return Err(SosError::AlreadyClaimed {
            alert_id: alert.id.clone(),
        });
    }
    alert.status = AlertStatus::Claimed;
    alert.claimant = Some(responder);
    alert.claimed_at = Some(now);
    Ok(())
}

/// Transition an alert from claimed to resolved
///
/// Legal only from claimed; an open or already-resolved alert yields
/// `NotClaimed`, so a second resolve after success can never double-apply.
pub fn apply_resolve(
    alert: &mut Alert,
    resolver: PartyRef,
    notes: Option<String>,
    now: DateTime<Utc>,
) -> SosResult<()> {
    if alert.status != AlertStatus::Claimed {
        return Err(SosError::NotClaimed {
            alert_id: alert.id.clone(),
        });
    }
    alert.status = AlertStatus::Resolved;
    alert.resolver = Some(resolver);
    alert.resolution_notes = notes;
    alert.resolved_at = Some(now);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AlertKind, GeoPoint, Role};

    fn open_alert() -> Alert {
        let citizen = PartyRef::from(&Principal::new("u-cit", "Asha", Role::Citizen));
        Alert::new(citizen, GeoPoint::new(12.9, 77.6), AlertKind::General, "")
    }

    fn responder_stamp(id: &str) -> PartyRef {
        PartyRef::from(&Principal::new(id, "Responder", Role::Volunteer))
    }

    #[test]
    fn test_claim_from_open_succeeds() {
        let mut alert = open_alert();
        let now = Utc::now();
        apply_claim(&mut alert, responder_stamp("u-r1"), now).unwrap();

        assert_eq!(alert.status, AlertStatus::Claimed);
        assert!(alert.is_claimed_by("u-r1"));
        assert_eq!(alert.claimed_at, Some(now));
        assert!(alert.resolver.is_none());
    }

    #[test]
    fn test_claim_from_claimed_fails() {
        let mut alert = open_alert();
        apply_claim(&mut alert, responder_stamp("u-r1"), Utc::now()).unwrap();

        let err = apply_claim(&mut alert, responder_stamp("u-r2"), Utc::now()).unwrap_err();
        assert!(matches!(err, SosError::AlreadyClaimed { .. }));
        // Losing claimant must not overwrite the winner
        assert!(alert.is_claimed_by("u-r1"));
    }

    #[test]
    fn test_claim_from_resolved_fails() {
        let mut alert = open_alert();
        apply_claim(&mut alert, responder_stamp("u-r1"), Utc::now()).unwrap();
        apply_resolve(&mut alert, responder_stamp("u-r1"), None, Utc::now()).unwrap();

        let err = apply_claim(&mut alert, responder_stamp("u-r2"), Utc::now()).unwrap_err();
        assert!(matches!(err, SosError::AlreadyClaimed { .. }));
    }

    #[test]
    fn test_resolve_from_claimed_succeeds() {
        let mut alert = open_alert();
        apply_claim(&mut alert, responder_stamp("u-r1"), Utc::now()).unwrap();

        let now = Utc::now();
        apply_resolve(&mut alert, responder_stamp("u-r1"), Some("stabilized".to_string()), now).unwrap();

        assert_eq!(alert.status, AlertStatus::Resolved);
        assert_eq!(alert.resolution_notes.as_deref(), Some("stabilized"));
        assert_eq!(alert.resolved_at, Some(now));
        assert!(alert.resolver.is_some());
    }

    #[test]
    fn test_resolve_from_open_fails() {
        let mut alert = open_alert();
        let err = apply_resolve(&mut alert, responder_stamp("u-r1"), None, Utc::now()).unwrap_err();
        assert!(matches!(err, SosError::NotClaimed { .. }));
        assert_eq!(alert.status, AlertStatus::Open);
        assert!(alert.resolved_at.is_none());
    }

    #[test]
    fn test_second_resolve_fails_without_double_apply() {
        let mut alert = open_alert();
        apply_claim(&mut alert, responder_stamp("u-r1"), Utc::now()).unwrap();
        let first = Utc::now();
        apply_resolve(&mut alert, responder_stamp("u-r1"), Some("done".to_string()), first).unwrap();

        let err = apply_resolve(&mut alert, responder_stamp("u-r2"), Some("again".to_string()), Utc::now()).unwrap_err();
        assert!(matches!(err, SosError::NotClaimed { .. }));
        assert_eq!(alert.resolved_at, Some(first));
        assert_eq!(alert.resolution_notes.as_deref(), Some("done"));
        assert!(alert.is_claimed_by("u-r1"));
    }

    #[test]
    fn test_authorize_responder() {
        let volunteer = Principal::new("u-1", "V", Role::Volunteer);
        let police = Principal::new("u-2", "P", Role::Police);
        let ngo = Principal::new("u-3", "N", Role::Ngo);
        let citizen = Principal::new("u-4", "C", Role::Citizen);

        assert!(authorize_responder("claim", &volunteer).is_ok());
        assert!(authorize_responder("claim", &police).is_ok());
        assert!(authorize_responder("resolve", &ngo).is_ok());

        let err = authorize_responder("claim", &citizen).unwrap_err();
        assert!(matches!(err, SosError::Unauthorized { .. }));

        let no_role = Principal {
            id: "u-5".to_string(),
            name: "X".to_string(),
            email: None,
            role: None,
        };
        assert!(authorize_responder("claim", &no_role).is_err());
    }

    #[test]
    fn test_authorize_citizen() {
        let citizen = Principal::new("u-1", "C", Role::Citizen);
        assert!(authorize_citizen("create_alert", &citizen).is_ok());

        // Unset role may still create an alert
        let no_role = Principal {
            id: "u-2".to_string(),
            name: "X".to_string(),
            email: None,
            role: None,
        };
        assert!(authorize_citizen("create_alert", &no_role).is_ok());

        let empty_id = Principal {
            id: "  ".to_string(),
            name: "X".to_string(),
            email: None,
            role: Some(Role::Citizen),
        };
        assert!(matches!(
            authorize_citizen("create_alert", &empty_id).unwrap_err(),
            SosError::InvalidInput(_)
        ));

        let responder = Principal::new("u-3", "R", Role::Police);
        assert!(matches!(
            authorize_citizen("create_alert", &responder).unwrap_err(),
            SosError::Unauthorized { .. }
        ));
    }
}
