//! Alert record
//!
//! The central entity. An alert is created by a citizen with a captured
//! location, moves strictly forward through open → claimed → resolved, and
//! is never deleted. All mutation happens inside the store actor through
//! the transition functions in [`crate::lifecycle`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id;
use super::identity::PartyRef;

/// Alert category selected by the citizen at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    #[default]
    General,
    Medical,
    Fire,
    Flood,
    Earthquake,
    Accident,
    Other,
}

impl std::fmt::Display for AlertKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertKind::General => write!(f, "general"),
            AlertKind::Medical => write!(f, "medical"),
            AlertKind::Fire => write!(f, "fire"),
            AlertKind::Flood => write!(f, "flood"),
            AlertKind::Earthquake => write!(f, "earthquake"),
            AlertKind::Accident => write!(f, "accident"),
            AlertKind::Other => write!(f, "other"),
        }
    }
}

/// Lifecycle status of an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    #[default]
    Open,
    Claimed,
    Resolved,
}

impl std::fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertStatus::Open => write!(f, "open"),
            AlertStatus::Claimed => write!(f, "claimed"),
            AlertStatus::Resolved => write!(f, "resolved"),
        }
    }
}

/// A captured coordinate, immutable once set on an alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,

    /// Reported accuracy radius in meters, if the source gave one
    pub accuracy_m: Option<f64>,

    /// True when accuracy was worse than the configured threshold at capture
    pub low_accuracy: bool,
}

impl GeoPoint {
    /// Create a point with no accuracy information
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat,
            lng,
            accuracy_m: None,
            low_accuracy: false,
        }
    }

    /// Check that both coordinates are finite numbers in range
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite() && self.lat.abs() <= 90.0 && self.lng.abs() <= 180.0
    }
}

/// An emergency alert record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Unique identifier, assigned at creation
    pub id: String,

    /// The citizen who raised the alert
    pub citizen: PartyRef,

    /// Category
    pub kind: AlertKind,

    /// Optional free text supplied at creation
    pub note: String,

    /// Capture location, set once and never mutated
    pub location: GeoPoint,

    /// Current lifecycle status
    pub status: AlertStatus,

    /// Responder that claimed the alert; set exactly once during open → claimed
    pub claimant: Option<PartyRef>,

    /// Responder that resolved the alert; set exactly once during claimed → resolved
    pub resolver: Option<PartyRef>,

    /// Notes supplied at resolution
    pub resolution_notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,

    /// Reserved anti-abuse score; round-tripped, never computed here
    #[serde(default)]
    pub trust_score: i64,

    /// Reserved verification payload; opaque pass-through
    #[serde(default)]
    pub verification: serde_json::Value,
}

impl Alert {
    /// Create a new open alert with a generated ID
    pub fn new(citizen: PartyRef, location: GeoPoint, kind: AlertKind, note: impl Into<String>) -> Self {
        Self {
            id: id::alert_id(),
            citizen,
            kind,
            note: note.into(),
            location,
            status: AlertStatus::Open,
            claimant: None,
            resolver: None,
            resolution_notes: None,
            created_at: Utc::now(),
            claimed_at: None,
            resolved_at: None,
            trust_score: 0,
            verification: serde_json::Value::Null,
        }
    }

    /// Attach an opaque verification payload
    pub fn with_verification(mut self, verification: serde_json::Value) -> Self {
        self.verification = verification;
        self
    }

    pub fn is_open(&self) -> bool {
        self.status == AlertStatus::Open
    }

    pub fn is_resolved(&self) -> bool {
        self.status == AlertStatus::Resolved
    }

    /// Check whether the given responder id holds the claim
    pub fn is_claimed_by(&self, responder_id: &str) -> bool {
        self.claimant.as_ref().map(|c| c.id == responder_id).unwrap_or(false)
    }
}

/// Sort alerts newest first, ties broken by id so the order is total
pub fn sort_newest_first(alerts: &mut [Alert]) {
    alerts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
}
