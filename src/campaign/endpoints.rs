use actix_web::web::{Data, Json, Path};
use actix_web::{delete, get, post, put};
use chrono::{DateTime, Utc};
use futures::{stream, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};

use crate::clock::SystemClock;
use crate::config::Config;
use crate::database::{Database, MongoDatabase};
use crate::error::Error;
use crate::identity::Identity;
use crate::notifier::Notifier;

use super::{manager, Campaign, CampaignContent, CampaignId, CampaignStatus};

#[derive(Clone, Debug, Serialize)]
pub struct CampaignBody {
    pub id: CampaignId,
    pub title: String,
    pub description: String,
    pub email_text: String,
    pub landing_page_url: String,
    pub tracking_token: String,
    pub status: CampaignStatus,
    pub expiry_date: Option<DateTime<Utc>>,
    pub admin_comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CampaignBody {
    pub fn render(campaign: Campaign) -> CampaignBody {
        CampaignBody {
            id: campaign.id,
            title: campaign.title,
            description: campaign.description,
            email_text: campaign.email_text,
            landing_page_url: campaign.landing_page_url,
            tracking_token: campaign.tracking_token,
            status: campaign.status,
            expiry_date: campaign.expiry_date.map(|date| date.to_chrono()),
            admin_comment: campaign.admin_comment,
            created_at: campaign.created_at,
            updated_at: campaign.updated_at,
        }
    }
}

/// The admin review queue also shows who submitted each campaign.
#[derive(Clone, Debug, Serialize)]
pub struct CampaignWithOwnerBody {
    pub owner_email: Option<String>,
    #[serde(flatten)]
    pub campaign: CampaignBody,
}

impl CampaignWithOwnerBody {
    pub async fn render(
        db: &MongoDatabase,
        campaign: Campaign,
    ) -> Result<CampaignWithOwnerBody, Error> {
        let owner = db.users().fetch_user_by_id(campaign.user_id).await?;

        Ok(CampaignWithOwnerBody {
            owner_email: owner.map(|owner| owner.email),
            campaign: CampaignBody::render(campaign),
        })
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct CampaignDecisionBody {
    #[serde(default)]
    pub comment: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ShareBody {
    #[serde(default)]
    pub email: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct MessageBody {
    pub message: &'static str,
}

#[post("/api/user/campaigns")]
#[tracing::instrument(skip(db, clock, body))]
async fn create_campaign(
    db: Data<MongoDatabase>,
    clock: Data<SystemClock>,
    identity: Identity,
    body: Json<CampaignContent>,
) -> Result<Json<CampaignBody>, Error> {
    let campaign = manager::create_campaign(
        db.get_ref(),
        clock.get_ref(),
        identity.user_id,
        body.into_inner(),
    )
    .await?;

    Ok(Json(CampaignBody::render(campaign)))
}

#[get("/api/user/campaigns")]
#[tracing::instrument(skip(db))]
async fn get_campaigns(
    db: Data<MongoDatabase>,
    identity: Identity,
) -> Result<Json<Vec<CampaignBody>>, Error> {
    let campaigns = manager::get_campaigns(db.get_ref(), identity.user_id).await?;

    Ok(Json(campaigns.into_iter().map(CampaignBody::render).collect()))
}

#[get("/api/user/campaigns/{campaign_id}")]
#[tracing::instrument(skip(db))]
async fn get_campaign_by_id(
    db: Data<MongoDatabase>,
    identity: Identity,
    params: Path<CampaignId>,
) -> Result<Json<CampaignBody>, Error> {
    let campaign =
        manager::get_campaign_by_id(db.get_ref(), identity.user_id, params.into_inner()).await?;

    Ok(Json(CampaignBody::render(campaign)))
}

#[put("/api/user/campaigns/{campaign_id}")]
#[tracing::instrument(skip(db, clock, body))]
async fn update_campaign(
    db: Data<MongoDatabase>,
    clock: Data<SystemClock>,
    identity: Identity,
    params: Path<CampaignId>,
    body: Json<CampaignContent>,
) -> Result<Json<CampaignBody>, Error> {
    let campaign = manager::update_campaign(
        db.get_ref(),
        clock.get_ref(),
        identity.user_id,
        params.into_inner(),
        body.into_inner(),
    )
    .await?;

    Ok(Json(CampaignBody::render(campaign)))
}

#[delete("/api/user/campaigns/{campaign_id}")]
#[tracing::instrument(skip(db))]
async fn delete_campaign(
    db: Data<MongoDatabase>,
    identity: Identity,
    params: Path<CampaignId>,
) -> Result<Json<MessageBody>, Error> {
    manager::delete_campaign(db.get_ref(), identity.user_id, params.into_inner()).await?;

    Ok(Json(MessageBody {
        message: "Campaign deleted",
    }))
}

#[post("/api/user/campaigns/{campaign_id}/share")]
#[tracing::instrument(skip(db, notifier, config, body))]
async fn share_campaign(
    db: Data<MongoDatabase>,
    notifier: Data<dyn Notifier>,
    config: Data<Config>,
    identity: Identity,
    params: Path<CampaignId>,
    body: Json<ShareBody>,
) -> Result<Json<MessageBody>, Error> {
    manager::share_campaign(
        db.get_ref(),
        notifier.into_inner(),
        &config.app_base_url,
        identity.user_id,
        params.into_inner(),
        body.into_inner().email,
    )
    .await?;

    Ok(Json(MessageBody {
        message: "Simulation link sent",
    }))
}

#[get("/api/admin/campaigns")]
#[tracing::instrument(skip(db))]
async fn list_all_campaigns(
    db: Data<MongoDatabase>,
    identity: Identity,
) -> Result<Json<Vec<CampaignWithOwnerBody>>, Error> {
    let campaigns = manager::list_all_campaigns(db.get_ref(), identity).await?;

    let body = stream::iter(campaigns)
        .then(|campaign| CampaignWithOwnerBody::render(&db, campaign))
        .try_collect()
        .await?;

    Ok(Json(body))
}

#[post("/api/admin/campaigns/{campaign_id}/approve")]
#[tracing::instrument(skip(db, clock, notifier, config, body))]
async fn approve_campaign(
    db: Data<MongoDatabase>,
    clock: Data<SystemClock>,
    notifier: Data<dyn Notifier>,
    config: Data<Config>,
    identity: Identity,
    params: Path<CampaignId>,
    body: Option<Json<CampaignDecisionBody>>,
) -> Result<Json<CampaignBody>, Error> {
    let comment = body.map(|body| body.into_inner().comment).unwrap_or_default();

    let campaign = manager::transition_campaign(
        db.get_ref(),
        clock.get_ref(),
        notifier.into_inner(),
        &config.app_base_url,
        identity,
        params.into_inner(),
        CampaignStatus::Approved,
        comment,
    )
    .await?;

    Ok(Json(CampaignBody::render(campaign)))
}

#[post("/api/admin/campaigns/{campaign_id}/reject")]
#[tracing::instrument(skip(db, clock, notifier, config, body))]
async fn reject_campaign(
    db: Data<MongoDatabase>,
    clock: Data<SystemClock>,
    notifier: Data<dyn Notifier>,
    config: Data<Config>,
    identity: Identity,
    params: Path<CampaignId>,
    body: Option<Json<CampaignDecisionBody>>,
) -> Result<Json<CampaignBody>, Error> {
    let comment = body.map(|body| body.into_inner().comment).unwrap_or_default();

    let campaign = manager::transition_campaign(
        db.get_ref(),
        clock.get_ref(),
        notifier.into_inner(),
        &config.app_base_url,
        identity,
        params.into_inner(),
        CampaignStatus::Rejected,
        comment,
    )
    .await?;

    Ok(Json(CampaignBody::render(campaign)))
}
