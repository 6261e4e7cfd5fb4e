use crate::campaign::{Campaign, CampaignStatus};
use crate::clock::Clock;
use crate::database::Database;
use crate::error::Error;
use crate::event;
use crate::event::EventType;

use super::{AwarenessContent, AwarenessPage, LandingPage, SubmitOutcome};

/// Resolves a tracking token to a campaign the public may interact with.
/// Pending and rejected campaigns read as absent-adjacent errors so a token
/// leaked before approval gives nothing away.
async fn resolve_approved_campaign(
    db: &dyn Database,
    clock: &dyn Clock,
    token: &str,
) -> Result<Campaign, Error> {
    let campaign = db
        .campaigns()
        .fetch_campaign_by_token(token)
        .await?
        .ok_or(Error::SimulationDoesNotExist)?;

    if campaign.status != CampaignStatus::Approved {
        return Err(Error::SimulationNotApproved);
    }

    if let Some(expiry_date) = campaign.expiry_date {
        if expiry_date.to_chrono() < clock.now() {
            return Err(Error::SimulationExpired);
        }
    }

    Ok(campaign)
}

#[tracing::instrument(skip(db, clock, user_agent))]
pub async fn resolve_landing(
    db: &dyn Database,
    clock: &dyn Clock,
    token: &str,
    ip_address: &str,
    user_agent: &str,
) -> Result<LandingPage, Error> {
    let campaign = resolve_approved_campaign(db, clock, token).await?;

    event::manager::record_event(
        db,
        clock,
        campaign.id,
        EventType::LinkOpened,
        ip_address,
        user_agent,
    )
    .await;

    Ok(LandingPage {
        campaign_id: campaign.id,
        title: campaign.title,
        landing_url: campaign.landing_page_url,
        token: token.to_string(),
    })
}

#[tracing::instrument(skip(db, clock, user_agent))]
pub async fn resolve_submit(
    db: &dyn Database,
    clock: &dyn Clock,
    token: &str,
    ip_address: &str,
    user_agent: &str,
) -> Result<SubmitOutcome, Error> {
    let campaign = resolve_approved_campaign(db, clock, token).await?;

    event::manager::record_event(
        db,
        clock,
        campaign.id,
        EventType::FormSubmitted,
        ip_address,
        user_agent,
    )
    .await;

    Ok(SubmitOutcome {
        redirect: format!("/api/awareness/{}", token),
        message: "Form submitted (simulated)".to_string(),
    })
}

#[tracing::instrument(skip(db, clock, user_agent))]
pub async fn resolve_awareness(
    db: &dyn Database,
    clock: &dyn Clock,
    token: &str,
    ip_address: &str,
    user_agent: &str,
) -> Result<AwarenessPage, Error> {
    let campaign = resolve_approved_campaign(db, clock, token).await?;

    event::manager::record_event(
        db,
        clock,
        campaign.id,
        EventType::AwarenessViewed,
        ip_address,
        user_agent,
    )
    .await;

    Ok(AwarenessPage {
        campaign_id: campaign.id,
        message: "You've Been Phished! (Simulated)".to_string(),
        content: AwarenessContent::standard(),
    })
}
