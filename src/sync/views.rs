//! Per-session view bundle
//!
//! A session holds up to four live subscriptions: the open-alerts feed,
//! the citizen's own-alerts feed, the responder's own-claims feed, and one
//! message feed per open chat. `SessionViews` constructs them against a
//! repository; snapshot reconciliation happens in
//! [`super::reconcile::ResponderBoard`].

use crate::domain::{Alert, ChatMessage, Principal};
use crate::error::{SosError, SosResult};
use crate::repository::AlertRepository;

use super::live::LiveQuery;

/// Factory for a session's live views
#[derive(Clone)]
pub struct SessionViews {
    repo: AlertRepository,
}

impl SessionViews {
    pub fn new(repo: AlertRepository) -> Self {
        Self { repo }
    }

    /// All open alerts, for responder dashboards
    pub async fn open_alerts(&self) -> SosResult<LiveQuery<Alert>> {
        self.repo.open_alerts().await
    }

    /// The citizen's own alerts, all statuses
    pub async fn own_alerts(&self, citizen: &Principal) -> SosResult<LiveQuery<Alert>> {
        self.repo.alerts_by_citizen(&citizen.id).await
    }

    /// The responder's active claims
    pub async fn own_claims(&self, responder: &Principal) -> SosResult<LiveQuery<Alert>> {
        if !responder.is_responder() {
            return Err(SosError::Unauthorized {
                action: "own_claims".to_string(),
                required: "responder".to_string(),
            });
        }
        self.repo.alerts_claimed_by(&responder.id).await
    }

    /// Messages for one alert's chat
    pub async fn messages(&self, alert_id: &str) -> SosResult<LiveQuery<ChatMessage>> {
        self.repo.messages(alert_id).await
    }
}
