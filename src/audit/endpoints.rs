use actix_web::get;
use actix_web::web::{Data, Json};
use chrono::{DateTime, Utc};
use futures::{stream, StreamExt, TryStreamExt};
use serde::Serialize;

use crate::database::{Database, MongoDatabase};
use crate::error::Error;
use crate::identity::Identity;
use crate::user::UserId;

use super::{manager, AuditAction, AuditLog, AuditLogId};

#[derive(Clone, Debug, Serialize)]
pub struct AuditLogBody {
    pub id: AuditLogId,
    pub admin_id: UserId,
    pub admin_email: Option<String>,
    pub action: AuditAction,
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub details: String,
    pub created_at: DateTime<Utc>,
}

impl AuditLogBody {
    pub async fn render(db: &MongoDatabase, entry: AuditLog) -> Result<AuditLogBody, Error> {
        // The acting admin may have been deleted since; the entry still shows.
        let admin = db.users().fetch_user_by_id(entry.admin_id).await?;

        Ok(AuditLogBody {
            id: entry.id,
            admin_id: entry.admin_id,
            admin_email: admin.map(|admin| admin.email),
            action: entry.action,
            resource_type: entry.resource_type,
            resource_id: entry.resource_id,
            details: entry.details,
            created_at: entry.created_at,
        })
    }
}

#[get("/api/admin/audit-logs")]
#[tracing::instrument(skip(db))]
async fn get_audit_logs(
    db: Data<MongoDatabase>,
    identity: Identity,
) -> Result<Json<Vec<AuditLogBody>>, Error> {
    let entries = manager::get_audit_logs(db.get_ref(), identity).await?;

    let body = stream::iter(entries)
        .then(|entry| AuditLogBody::render(&db, entry))
        .try_collect()
        .await?;

    Ok(Json(body))
}
