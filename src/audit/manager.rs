use crate::clock::Clock;
use crate::database::Database;
use crate::error::Error;
use crate::identity::Identity;
use crate::user::UserId;

use super::{AuditAction, AuditLog, AuditLogId};

pub const AUDIT_LOG_LIMIT: i64 = 100;

/// Appends an audit entry. Best-effort: the admin action it describes has
/// already committed, so a failed write is logged and swallowed rather than
/// failing the request after the fact.
#[tracing::instrument(skip(db, clock))]
pub async fn record(
    db: &dyn Database,
    clock: &dyn Clock,
    admin_id: UserId,
    action: AuditAction,
    resource_type: &str,
    resource_id: Option<String>,
    details: String,
) {
    let entry = AuditLog {
        id: AuditLogId::new(),
        admin_id,
        action,
        resource_type: resource_type.to_string(),
        resource_id,
        details,
        created_at: clock.now(),
    };

    if let Err(err) = db.audit_logs().insert_audit_log(&entry).await {
        tracing::warn!("failed to record audit entry: {}", err);
    }
}

#[tracing::instrument(skip(db))]
pub async fn get_audit_logs(db: &dyn Database, actor: Identity) -> Result<Vec<AuditLog>, Error> {
    actor.require_admin()?;

    db.audit_logs().fetch_audit_logs(AUDIT_LOG_LIMIT).await
}
