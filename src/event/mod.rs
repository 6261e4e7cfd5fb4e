use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::campaign::CampaignId;
use crate::typedid::{TypedId, TypedIdMarker};

pub mod db;
pub mod manager;

pub type EventId = TypedId<Event>;

/// A timestamped record of anonymous interaction with a campaign's
/// simulation flow. Append-only.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Event {
    #[serde(rename = "_id")]
    pub id: EventId,
    pub campaign_id: CampaignId,
    pub event_type: EventType,
    pub ip_address: String,
    pub user_agent: String,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl TypedIdMarker for Event {
    fn tag() -> &'static str {
        "EVT"
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    // An early schema wrote "clicked" for the landing step; stored documents
    // with that tag decode as LinkOpened.
    #[serde(alias = "clicked")]
    LinkOpened,
    FormSubmitted,
    AwarenessViewed,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::LinkOpened => "link_opened",
            EventType::FormSubmitted => "form_submitted",
            EventType::AwarenessViewed => "awareness_viewed",
        }
    }

    /// The single source of truth for what counts as a click. Every query
    /// that tallies clicks matches against this set, so the legacy alias is
    /// handled in exactly one place.
    pub const CLICK_TYPES: [&'static str; 2] = ["link_opened", "clicked"];
}

/// How long a repeated link_opened from the same source is collapsed to one
/// event. Guards against duplicate client-side firing of the landing effect.
pub const DEDUP_WINDOW_SECONDS: i64 = 5;

/// One bucket of the 30-day event timeline, as produced by the store's
/// group-by-day aggregation.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct DailyCount {
    #[serde(rename = "_id")]
    pub date: String,
    pub count: i64,
}
