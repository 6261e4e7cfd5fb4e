use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::typedid::{TypedId, TypedIdMarker};
use crate::user::UserId;

pub mod db;
pub mod endpoints;
pub mod manager;

pub type AuditLogId = TypedId<AuditLog>;

/// Append-only record of an admin action. Written best-effort as a side
/// effect of every status transition and destructive user action.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AuditLog {
    #[serde(rename = "_id")]
    pub id: AuditLogId,
    pub admin_id: UserId,
    pub action: AuditAction,
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub details: String,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl TypedIdMarker for AuditLog {
    fn tag() -> &'static str {
        "ADT"
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    ApproveCampaign,
    RejectCampaign,
    DeleteUser,
}
