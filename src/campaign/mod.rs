use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::typedid::{TypedId, TypedIdMarker};
use crate::user::UserId;

pub mod db;
pub mod endpoints;
pub mod manager;

pub type CampaignId = TypedId<Campaign>;

/// A user-authored simulated-phishing exercise awaiting or holding an admin
/// disposition.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Campaign {
    #[serde(rename = "_id")]
    pub id: CampaignId,
    pub user_id: UserId,
    pub title: String,
    pub description: String,
    pub email_text: String,
    pub landing_page_url: String,
    pub tracking_token: String,
    pub status: CampaignStatus,
    // Kept as a raw bson datetime because the chrono serde helper has no
    // Option counterpart; convert with to_chrono/from_chrono at the edges.
    #[serde(default)]
    pub expiry_date: Option<mongodb::bson::DateTime>,
    pub admin_comment: Option<String>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl TypedIdMarker for Campaign {
    fn tag() -> &'static str {
        "CPN"
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Pending,
    Approved,
    Rejected,
}

impl CampaignStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignStatus::Pending => "pending",
            CampaignStatus::Approved => "approved",
            CampaignStatus::Rejected => "rejected",
        }
    }

    /// The only legal edges are pending -> approved and pending -> rejected.
    /// Terminal states have no outgoing edges, so an already-decided campaign
    /// cannot be re-approved or flipped.
    pub fn can_transition_to(&self, next: CampaignStatus) -> bool {
        matches!(self, CampaignStatus::Pending) && !matches!(next, CampaignStatus::Pending)
    }
}

/// Owner-editable content fields. Status and tracking token are deliberately
/// absent.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CampaignContent {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub email_text: String,
    #[serde(default)]
    pub landing_page_url: String,
    #[serde(default)]
    pub expiry_date: Option<DateTime<Utc>>,
}

/// One bucket of the admin status-distribution histogram, as produced by the
/// store's group-by-status aggregation.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct StatusCount {
    #[serde(rename = "_id")]
    pub status: CampaignStatus,
    pub count: i64,
}

/// 256 bits of randomness, hex encoded. Uniqueness is enforced by the store
/// index; callers regenerate on collision.
pub fn generate_tracking_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracking_token_is_64_hex_chars() {
        let token = generate_tracking_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn consecutive_tokens_differ() {
        assert_ne!(generate_tracking_token(), generate_tracking_token());
    }

    #[test]
    fn pending_can_only_reach_approved_or_rejected() {
        use CampaignStatus::*;
        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Rejected));
        assert!(!Pending.can_transition_to(Pending));
        assert!(!Approved.can_transition_to(Rejected));
        assert!(!Approved.can_transition_to(Approved));
        assert!(!Rejected.can_transition_to(Approved));
    }
}
