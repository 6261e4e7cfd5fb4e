use crate::audit;
use crate::audit::AuditAction;
use crate::clock::Clock;
use crate::database::Database;
use crate::error::Error;
use crate::identity::Identity;

use super::{User, UserId};

#[tracing::instrument(skip(db))]
pub async fn get_users(db: &dyn Database, actor: Identity) -> Result<Vec<User>, Error> {
    actor.require_admin()?;

    db.users().fetch_users().await
}

/// Removes an account and everything it owns: campaigns, their events, then
/// the user itself. Admins cannot remove themselves, so the platform always
/// keeps at least the acting admin.
#[tracing::instrument(skip(db, clock))]
pub async fn delete_user(
    db: &dyn Database,
    clock: &dyn Clock,
    actor: Identity,
    user_id: UserId,
) -> Result<(), Error> {
    actor.require_admin()?;

    if actor.user_id == user_id {
        return Err(Error::CannotDeleteSelf);
    }

    let user = db
        .users()
        .fetch_user_by_id(user_id)
        .await?
        .ok_or(Error::UserDoesNotExist { user_id })?;

    let campaign_ids = db.campaigns().fetch_campaign_ids_by_owner(user_id).await?;
    if !campaign_ids.is_empty() {
        db.events()
            .delete_events_by_campaigns(&campaign_ids)
            .await?;
    }
    db.campaigns().delete_campaigns_by_owner(user_id).await?;
    db.users().delete_user(user_id).await?;

    audit::manager::record(
        db,
        clock,
        actor.user_id,
        AuditAction::DeleteUser,
        "user",
        Some(user_id.to_string()),
        serde_json::json!({ "email": user.email }).to_string(),
    )
    .await;

    Ok(())
}
