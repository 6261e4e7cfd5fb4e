use std::sync::Arc;

use crate::audit;
use crate::audit::AuditAction;
use crate::clock::Clock;
use crate::database::Database;
use crate::error::Error;
use crate::identity::Identity;
use crate::notifier::{self, Notifier};
use crate::user::UserId;

use super::{
    generate_tracking_token, Campaign, CampaignContent, CampaignId, CampaignStatus,
};

/// How many times a colliding tracking token is regenerated before giving up.
/// With 256-bit tokens a single collision already means something is wrong.
const MAX_TOKEN_ATTEMPTS: u32 = 3;

#[tracing::instrument(skip(db, clock, content))]
pub async fn create_campaign(
    db: &dyn Database,
    clock: &dyn Clock,
    owner: UserId,
    content: CampaignContent,
) -> Result<Campaign, Error> {
    validate_content(&content)?;

    let now = clock.now();
    let mut attempts = 0;
    loop {
        let campaign = Campaign {
            id: CampaignId::new(),
            user_id: owner,
            title: content.title.clone(),
            description: content.description.clone(),
            email_text: content.email_text.clone(),
            landing_page_url: content.landing_page_url.clone(),
            tracking_token: generate_tracking_token(),
            status: CampaignStatus::Pending,
            expiry_date: content.expiry_date.map(mongodb::bson::DateTime::from_chrono),
            admin_comment: None,
            created_at: now,
            updated_at: now,
        };

        match db.campaigns().insert_campaign(&campaign).await {
            Ok(()) => return Ok(campaign),
            Err(Error::TrackingTokenCollision) => {
                attempts += 1;
                if attempts >= MAX_TOKEN_ATTEMPTS {
                    return Err(Error::TrackingTokenCollision);
                }
                tracing::warn!("tracking token collision, regenerating");
            }
            Err(err) => return Err(err),
        }
    }
}

#[tracing::instrument(skip(db))]
pub async fn get_campaigns(db: &dyn Database, owner: UserId) -> Result<Vec<Campaign>, Error> {
    db.campaigns().fetch_campaigns_by_owner(owner).await
}

/// Owner-scoped fetch. A campaign belonging to someone else is reported as
/// absent rather than forbidden, so ids cannot be probed.
#[tracing::instrument(skip(db))]
pub async fn get_campaign_by_id(
    db: &dyn Database,
    owner: UserId,
    campaign_id: CampaignId,
) -> Result<Campaign, Error> {
    let campaign = db
        .campaigns()
        .fetch_campaign_by_id(campaign_id)
        .await?
        .ok_or(Error::CampaignDoesNotExist { campaign_id })?;

    if campaign.user_id != owner {
        return Err(Error::CampaignDoesNotExist { campaign_id });
    }

    Ok(campaign)
}

#[tracing::instrument(skip(db, clock, content))]
pub async fn update_campaign(
    db: &dyn Database,
    clock: &dyn Clock,
    owner: UserId,
    campaign_id: CampaignId,
    content: CampaignContent,
) -> Result<Campaign, Error> {
    validate_content(&content)?;

    let campaign = db
        .campaigns()
        .fetch_campaign_by_id(campaign_id)
        .await?
        .ok_or(Error::CampaignDoesNotExist { campaign_id })?;

    if campaign.user_id != owner {
        return Err(Error::NotCampaignOwner { campaign_id });
    }

    db.campaigns()
        .update_campaign_content(campaign, content, clock.now())
        .await
}

#[tracing::instrument(skip(db))]
pub async fn delete_campaign(
    db: &dyn Database,
    owner: UserId,
    campaign_id: CampaignId,
) -> Result<(), Error> {
    let campaign = db
        .campaigns()
        .fetch_campaign_by_id(campaign_id)
        .await?
        .ok_or(Error::CampaignDoesNotExist { campaign_id })?;

    if campaign.user_id != owner {
        return Err(Error::NotCampaignOwner { campaign_id });
    }

    // Events first; a campaign without events is recoverable noise, orphaned
    // events are not.
    db.events()
        .delete_events_by_campaigns(&[campaign_id])
        .await?;
    db.campaigns().delete_campaign(campaign_id).await?;

    Ok(())
}

#[tracing::instrument(skip(db))]
pub async fn list_all_campaigns(
    db: &dyn Database,
    actor: Identity,
) -> Result<Vec<Campaign>, Error> {
    actor.require_admin()?;

    db.campaigns().fetch_all_campaigns().await
}

/// Applies an admin decision to a pending campaign, records the audit entry,
/// and notifies the owner by email in the background.
#[tracing::instrument(skip(db, clock, notifier, base_url))]
pub async fn transition_campaign(
    db: &dyn Database,
    clock: &dyn Clock,
    notifier: Arc<dyn Notifier>,
    base_url: &str,
    actor: Identity,
    campaign_id: CampaignId,
    decision: CampaignStatus,
    comment: String,
) -> Result<Campaign, Error> {
    actor.require_admin()?;

    if decision == CampaignStatus::Rejected && comment.trim().is_empty() {
        return Err(Error::RejectionCommentRequired { campaign_id });
    }

    let campaign = db
        .campaigns()
        .fetch_campaign_by_id(campaign_id)
        .await?
        .ok_or(Error::CampaignDoesNotExist { campaign_id })?;

    if !campaign.status.can_transition_to(decision) {
        return Err(Error::InvalidStatusTransition {
            campaign_id,
            from: campaign.status,
            to: decision,
        });
    }

    let campaign = db
        .campaigns()
        .update_campaign_status(campaign, decision, comment.clone(), clock.now())
        .await?;

    let action = match decision {
        CampaignStatus::Approved => AuditAction::ApproveCampaign,
        _ => AuditAction::RejectCampaign,
    };
    audit::manager::record(
        db,
        clock,
        actor.user_id,
        action,
        "campaign",
        Some(campaign_id.to_string()),
        serde_json::json!({ "comment": comment }).to_string(),
    )
    .await;

    if let Some(owner) = db.users().fetch_user_by_id(campaign.user_id).await? {
        let simulation_link = match decision {
            CampaignStatus::Approved => Some(format!(
                "{}/simulate/{}",
                base_url, campaign.tracking_token
            )),
            _ => None,
        };
        let (subject, html) = notifier::decision_email(
            &campaign.title,
            decision,
            campaign.admin_comment.as_deref().unwrap_or(""),
            simulation_link.as_deref(),
        );
        notifier::dispatch(notifier, owner.email, subject, html);
    }

    Ok(campaign)
}

/// Emails a simulation invitation for an approved campaign the caller owns.
/// The send is given a short budget; only an immediate failure is reported.
#[tracing::instrument(skip(db, notifier, base_url))]
pub async fn share_campaign(
    db: &dyn Database,
    notifier: Arc<dyn Notifier>,
    base_url: &str,
    owner: UserId,
    campaign_id: CampaignId,
    recipient: String,
) -> Result<(), Error> {
    let recipient = recipient.trim().to_string();
    if recipient.is_empty() {
        return Err(Error::ShareEmailRequired);
    }
    if !recipient.contains('@') {
        return Err(Error::InvalidShareEmail { email: recipient });
    }

    let campaign = get_campaign_by_id(db, owner, campaign_id).await?;

    if campaign.status != CampaignStatus::Approved {
        return Err(Error::ShareRequiresApprovedCampaign { campaign_id });
    }

    if !notifier.is_configured() {
        return Err(Error::EmailServiceNotConfigured);
    }

    let link = format!("{}/simulate/{}", base_url, campaign.tracking_token);
    let (subject, html) = notifier::share_email(&campaign.title, &link);

    notifier::dispatch_bounded(notifier, recipient, subject, html).await
}

fn validate_content(content: &CampaignContent) -> Result<(), Error> {
    if content.title.trim().is_empty() || content.email_text.trim().is_empty() {
        return Err(Error::CampaignContentRequired);
    }

    Ok(())
}
