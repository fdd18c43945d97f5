//! Alert repository
//!
//! Validated read/write surface over the store actor. All reads are live:
//! they return a [`LiveQuery`] carrying an initial snapshot plus pushed
//! full-set updates. Invalid input is rejected here, before any write
//! reaches the store.

use serde_json::Value;
use tracing::debug;

use crate::config::CoreConfig;
use crate::domain::{Alert, AlertKind, ChatMessage, GeoPoint, PartyRef, Principal};
use crate::error::{SosError, SosResult};
use crate::lifecycle;
use crate::store::AlertStore;
use crate::sync::live::{AlertQuery, LiveQuery, MessageQuery, spawn_feed};

/// Repository over the authoritative alert store
#[derive(Clone)]
pub struct AlertRepository {
    store: AlertStore,
    config: CoreConfig,
}

impl AlertRepository {
    pub fn new(store: AlertStore, config: CoreConfig) -> Self {
        Self { store, config }
    }

    /// The underlying store handle
    pub fn store(&self) -> &AlertStore {
        &self.store
    }

    /// Create a new open alert for a citizen
    ///
    /// Rejects with `InvalidInput` before any write when the coordinates are
    /// not finite in-range numbers or the citizen identity is absent. The
    /// `verification` payload is persisted opaquely and round-trips unchanged.
    pub async fn create_alert(
        &self,
        citizen: &Principal,
        location: GeoPoint,
        kind: AlertKind,
        note: &str,
        verification: Value,
    ) -> SosResult<String> {
        lifecycle::authorize_citizen("create_alert", citizen)?;
        if !location.is_valid() {
            return Err(SosError::invalid("valid coordinates required"));
        }

        let alert = Alert::new(PartyRef::from(citizen), location, kind, note).with_verification(verification);
        debug!(alert_id = %alert.id, kind = %kind, "create_alert: validated");
        self.store.create_alert(alert).await
    }

    /// Fetch one alert by id
    pub async fn get_alert(&self, id: &str) -> SosResult<Option<Alert>> {
        self.store.get_alert(id).await
    }

    /// Live feed of open alerts, newest first
    pub async fn open_alerts(&self) -> SosResult<LiveQuery<Alert>> {
        spawn_feed(
            &self.store,
            AlertQuery::Open {
                limit: self.config.open_alerts_limit,
            },
            self.config.feed_buffer,
        )
        .await
    }

    /// Live feed of a citizen's own alerts, newest first
    pub async fn alerts_by_citizen(&self, citizen_id: &str) -> SosResult<LiveQuery<Alert>> {
        if citizen_id.trim().is_empty() {
            return Err(SosError::invalid("citizen id required"));
        }
        spawn_feed(
            &self.store,
            AlertQuery::ByCitizen {
                citizen_id: citizen_id.to_string(),
                limit: self.config.own_alerts_limit,
            },
            self.config.feed_buffer,
        )
        .await
    }

    /// Live feed of a responder's active claims
    pub async fn alerts_claimed_by(&self, responder_id: &str) -> SosResult<LiveQuery<Alert>> {
        if responder_id.trim().is_empty() {
            return Err(SosError::invalid("responder id required"));
        }
        spawn_feed(
            &self.store,
            AlertQuery::ClaimedBy {
                responder_id: responder_id.to_string(),
                limit: self.config.claims_limit,
            },
            self.config.feed_buffer,
        )
        .await
    }

    /// Append a chat message to an alert
    ///
    /// Text is trimmed before storage and must be non-empty afterwards.
    /// Either party may send once the alert exists, in any status.
    pub async fn append_message(
        &self,
        alert_id: &str,
        sender: &Principal,
        text: &str,
        is_voice: bool,
    ) -> SosResult<String> {
        if sender.id.trim().is_empty() {
            return Err(SosError::invalid("sender identity required"));
        }
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(SosError::invalid("message text required"));
        }

        let message = ChatMessage::new(alert_id, PartyRef::from(sender), trimmed, is_voice);
        self.store.append_message(message).await
    }

    /// Live feed of an alert's messages, oldest first
    pub async fn messages(&self, alert_id: &str) -> SosResult<LiveQuery<ChatMessage>> {
        spawn_feed(
            &self.store,
            MessageQuery {
                alert_id: alert_id.to_string(),
                limit: self.config.messages_limit,
            },
            self.config.feed_buffer,
        )
        .await
    }
}
