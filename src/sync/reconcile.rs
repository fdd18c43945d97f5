//! Client-side reconciliation of live snapshots
//!
//! Two small reducers keep a session's visible lists stable:
//!
//! - [`OptimisticList`] hides an alert the instant a claim attempt is
//!   issued and reconciles the tentative hide against the next
//!   authoritative snapshot, so a failed claim restores the alert exactly
//!   if it is still genuinely open server-side.
//! - [`ResponderBoard`] combines a responder's open-alerts and own-claims
//!   snapshots and subtracts claim membership from the open list, so the
//!   same alert never shows in both during the claim transition window.

use std::collections::HashSet;

use crate::domain::Alert;

/// Open-alerts list with reversible optimistic hides
#[derive(Debug, Default)]
pub struct OptimisticList {
    authoritative: Vec<Alert>,
    hidden: HashSet<String>,
}

impl OptimisticList {
    /// Create from an initial authoritative snapshot
    pub fn new(snapshot: Vec<Alert>) -> Self {
        Self {
            authoritative: snapshot,
            hidden: HashSet::new(),
        }
    }

    /// Tentatively hide an alert (claim attempt issued)
    pub fn hide(&mut self, alert_id: &str) {
        self.hidden.insert(alert_id.to_string());
    }

    /// Drop a tentative hide (claim attempt failed)
    ///
    /// The alert reappears only if the authoritative snapshot still
    /// contains it, which is exactly "still genuinely open server-side".
    pub fn restore(&mut self, alert_id: &str) {
        self.hidden.remove(alert_id);
    }

    /// Replace the authoritative snapshot
    ///
    /// Hides whose alert no longer appears server-side are confirmed and
    /// discarded; hides for alerts still present stay tentative (the claim
    /// outcome has not landed yet).
    pub fn apply_snapshot(&mut self, snapshot: Vec<Alert>) {
        self.authoritative = snapshot;
        let present: HashSet<&str> = self.authoritative.iter().map(|a| a.id.as_str()).collect();
        self.hidden.retain(|id| present.contains(id.as_str()));
    }

    /// The client-visible list: authoritative minus tentative hides
    pub fn visible(&self) -> Vec<&Alert> {
        self.authoritative
            .iter()
            .filter(|a| !self.hidden.contains(&a.id))
            .collect()
    }

    /// Number of tentative hides outstanding
    pub fn pending_hides(&self) -> usize {
        self.hidden.len()
    }
}

/// Per-responder reconciliation of the open and own-claims feeds
#[derive(Debug, Default)]
pub struct ResponderBoard {
    open: OptimisticList,
    claim_ids: HashSet<String>,
    claims: Vec<Alert>,
}

impl ResponderBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed in the latest open-alerts snapshot
    pub fn apply_open_snapshot(&mut self, snapshot: Vec<Alert>) {
        self.open.apply_snapshot(snapshot);
    }

    /// Feed in the latest own-claims snapshot
    pub fn apply_claims_snapshot(&mut self, snapshot: Vec<Alert>) {
        self.claim_ids = snapshot.iter().map(|a| a.id.clone()).collect();
        self.claims = snapshot;
    }

    /// Record a claim attempt being issued (optimistic hide)
    pub fn claim_attempted(&mut self, alert_id: &str) {
        self.open.hide(alert_id);
    }

    /// Record a failed claim attempt (reversal)
    pub fn claim_failed(&mut self, alert_id: &str) {
        self.open.restore(alert_id);
    }

    /// The open list a responder should see: open feed minus optimistic
    /// hides minus anything already in their claims feed
    pub fn open_visible(&self) -> Vec<&Alert> {
        self.open
            .visible()
            .into_iter()
            .filter(|a| !self.claim_ids.contains(&a.id))
            .collect()
    }

    /// The responder's active claims
    pub fn claims(&self) -> &[Alert] {
        &self.claims
    }
}
