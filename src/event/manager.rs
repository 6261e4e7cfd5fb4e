use chrono::Duration;

use crate::campaign::CampaignId;
use crate::clock::Clock;
use crate::database::Database;
use crate::error::Error;

use super::{Event, EventId, EventType, DEDUP_WINDOW_SECONDS};

/// Records an interaction event. Tracking is always best-effort: the visitor
/// must reach the landing and awareness pages even if the event write fails,
/// so errors are logged and swallowed here.
#[tracing::instrument(skip(db, clock))]
pub async fn record_event(
    db: &dyn Database,
    clock: &dyn Clock,
    campaign_id: CampaignId,
    event_type: EventType,
    ip_address: &str,
    user_agent: &str,
) {
    if let Err(err) =
        try_record_event(db, clock, campaign_id, event_type, ip_address, user_agent).await
    {
        tracing::warn!(
            "failed to record {} event for {}: {}",
            event_type.as_str(),
            campaign_id,
            err
        );
    }
}

async fn try_record_event(
    db: &dyn Database,
    clock: &dyn Clock,
    campaign_id: CampaignId,
    event_type: EventType,
    ip_address: &str,
    user_agent: &str,
) -> Result<(), Error> {
    let now = clock.now();

    // Only the landing step dedups; form submissions and awareness views are
    // rare enough not to double-fire.
    if let EventType::LinkOpened = event_type {
        let since = now - Duration::seconds(DEDUP_WINDOW_SECONDS);
        let recent = db
            .events()
            .count_recent_events(campaign_id, event_type, ip_address, since)
            .await?;
        if recent > 0 {
            tracing::debug!("suppressing duplicate link_opened from {}", ip_address);
            return Ok(());
        }
    }

    let event = Event {
        id: EventId::new(),
        campaign_id,
        event_type,
        ip_address: ip_address.to_string(),
        user_agent: user_agent.to_string(),
        created_at: now,
    };

    db.events().insert_event(&event).await
}
