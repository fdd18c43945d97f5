//! Principals and authorship stamps
//!
//! The identity provider hands us an authenticated principal; this module
//! defines its shape and the denormalized `PartyRef` stamp written into
//! alert and message records.

use serde::{Deserialize, Serialize};

/// Role held by a principal, fetched once at session start
///
/// Absent role records are represented as `None` on the principal, not as
/// a variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Citizen,
    Volunteer,
    Ngo,
    Police,
}

impl Role {
    /// Check whether this role may claim and resolve alerts
    pub fn is_responder(&self) -> bool {
        matches!(self, Role::Volunteer | Role::Ngo | Role::Police)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Citizen => write!(f, "citizen"),
            Role::Volunteer => write!(f, "volunteer"),
            Role::Ngo => write!(f, "ngo"),
            Role::Police => write!(f, "police"),
        }
    }
}

/// An authenticated principal as supplied by the identity provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Principal {
    /// Stable user id
    pub id: String,

    /// Display name
    pub name: String,

    /// Contact email, if the provider has one
    pub email: Option<String>,

    /// Role, `None` when no role record exists yet
    pub role: Option<Role>,
}

impl Principal {
    /// Create a principal with the given role
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: None,
            role: Some(role),
        }
    }

    /// Set the contact email
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Check whether this principal holds a responder role
    pub fn is_responder(&self) -> bool {
        self.role.map(|r| r.is_responder()).unwrap_or(false)
    }
}

/// Denormalized authorship stamp persisted on alerts and messages
///
/// Copied from the principal at write time for read convenience; never
/// refreshed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyRef {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub role: Option<Role>,
}

impl From<&Principal> for PartyRef {
    fn from(p: &Principal) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            email: p.email.clone(),
            role: p.role,
        }
    }
}
