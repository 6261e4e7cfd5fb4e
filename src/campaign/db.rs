use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::options::FindOptions;
use mongodb::{bson, Database};

use crate::database::MongoCampaignStore;
use crate::error::Error;
use crate::user::UserId;

use super::{Campaign, CampaignContent, CampaignId, CampaignStatus, StatusCount};

const CAMPAIGNS: &str = "campaigns";

pub async fn initialize(db: &Database) -> Result<(), Error> {
    db.run_command(
        bson::doc! {
            "createIndexes": CAMPAIGNS,
            "indexes": [
                { "key": { "tracking_token": 1 }, "name": "by_tracking_token", "unique": true },
                { "key": { "user_id": 1, "created_at": -1 }, "name": "by_user_id" },
            ]
        },
        None,
    )
    .await?;

    Ok(())
}

#[async_trait]
pub trait CampaignStore: Send + Sync {
    async fn insert_campaign(&self, campaign: &Campaign) -> Result<(), Error>;

    async fn fetch_campaigns_by_owner(&self, owner: UserId) -> Result<Vec<Campaign>, Error>;

    async fn fetch_all_campaigns(&self) -> Result<Vec<Campaign>, Error>;

    async fn fetch_campaign_by_id(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Option<Campaign>, Error>;

    async fn fetch_campaign_by_token(&self, token: &str) -> Result<Option<Campaign>, Error>;

    async fn fetch_campaign_ids_by_owner(&self, owner: UserId) -> Result<Vec<CampaignId>, Error>;

    async fn update_campaign_content(
        &self,
        campaign: Campaign,
        content: CampaignContent,
        now: DateTime<Utc>,
    ) -> Result<Campaign, Error>;

    async fn update_campaign_status(
        &self,
        campaign: Campaign,
        status: CampaignStatus,
        comment: String,
        now: DateTime<Utc>,
    ) -> Result<Campaign, Error>;

    async fn delete_campaign(&self, campaign_id: CampaignId) -> Result<(), Error>;

    async fn delete_campaigns_by_owner(&self, owner: UserId) -> Result<(), Error>;

    async fn count_campaigns_by_owner(
        &self,
        owner: UserId,
        status: Option<CampaignStatus>,
    ) -> Result<u64, Error>;

    async fn count_campaigns(&self, status: Option<CampaignStatus>) -> Result<u64, Error>;

    async fn aggregate_status_distribution(&self) -> Result<Vec<StatusCount>, Error>;
}

#[async_trait]
impl CampaignStore for MongoCampaignStore {
    #[tracing::instrument(skip(self))]
    async fn insert_campaign(&self, campaign: &Campaign) -> Result<(), Error> {
        match self.insert_one(campaign, None).await {
            Ok(_) => Ok(()),
            // The unique tracking_token index turned down the write; the
            // manager regenerates and retries.
            Err(err) if is_duplicate_key_error(&err) => Err(Error::TrackingTokenCollision),
            Err(err) => Err(err.into()),
        }
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_campaigns_by_owner(&self, owner: UserId) -> Result<Vec<Campaign>, Error> {
        let options = FindOptions::builder()
            .sort(bson::doc! { "created_at": -1 })
            .build();

        let campaigns: Vec<Campaign> = self
            .find(bson::doc! { "user_id": owner }, options)
            .await?
            .try_collect()
            .await?;

        Ok(campaigns)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_all_campaigns(&self) -> Result<Vec<Campaign>, Error> {
        let options = FindOptions::builder()
            .sort(bson::doc! { "created_at": -1 })
            .build();

        let campaigns: Vec<Campaign> = self
            .find(bson::doc! {}, options)
            .await?
            .try_collect()
            .await?;

        Ok(campaigns)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_campaign_by_id(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Option<Campaign>, Error> {
        let campaign: Option<Campaign> =
            self.find_one(bson::doc! { "_id": campaign_id }, None).await?;

        Ok(campaign)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_campaign_by_token(&self, token: &str) -> Result<Option<Campaign>, Error> {
        let campaign: Option<Campaign> = self
            .find_one(bson::doc! { "tracking_token": token }, None)
            .await?;

        Ok(campaign)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_campaign_ids_by_owner(&self, owner: UserId) -> Result<Vec<CampaignId>, Error> {
        let ids = self
            .distinct("_id", bson::doc! { "user_id": owner }, None)
            .await?;

        Ok(ids
            .iter()
            .filter_map(|id| id.as_str())
            .filter_map(|id| id.parse().ok())
            .collect())
    }

    #[tracing::instrument(skip(self))]
    async fn update_campaign_content(
        &self,
        mut campaign: Campaign,
        content: CampaignContent,
        now: DateTime<Utc>,
    ) -> Result<Campaign, Error> {
        let old_updated_at = bson::DateTime::from_chrono(campaign.updated_at);
        let new_updated_at = bson::DateTime::from_chrono(now);
        let new_expiry_date = content.expiry_date.map(bson::DateTime::from_chrono);

        let mut set = bson::doc! {
            "title": &content.title,
            "description": &content.description,
            "email_text": &content.email_text,
            "landing_page_url": &content.landing_page_url,
            "updated_at": new_updated_at,
        };

        // An omitted expiry date clears the field rather than keeping a
        // stale deadline around.
        let update = match new_expiry_date {
            Some(expiry_date) => {
                set.insert("expiry_date", expiry_date);
                bson::doc! { "$set": set }
            }
            None => bson::doc! { "$set": set, "$unset": { "expiry_date": "" } },
        };

        let result = self
            .update_one(
                bson::doc! { "_id": campaign.id, "updated_at": old_updated_at },
                update,
                None,
            )
            .await?;

        if result.matched_count == 0 {
            return Err(Error::ConcurrentModificationDetected);
        }

        campaign.title = content.title;
        campaign.description = content.description;
        campaign.email_text = content.email_text;
        campaign.landing_page_url = content.landing_page_url;
        campaign.expiry_date = new_expiry_date;
        campaign.updated_at = now;

        Ok(campaign)
    }

    #[tracing::instrument(skip(self))]
    async fn update_campaign_status(
        &self,
        mut campaign: Campaign,
        status: CampaignStatus,
        comment: String,
        now: DateTime<Utc>,
    ) -> Result<Campaign, Error> {
        let new_updated_at = bson::DateTime::from_chrono(now);

        // Compare-and-swap on the prior status so concurrent admin decisions
        // cannot both land.
        let result = self
            .update_one(
                bson::doc! { "_id": campaign.id, "status": campaign.status.as_str() },
                bson::doc! { "$set": {
                    "status": status.as_str(),
                    "admin_comment": &comment,
                    "updated_at": new_updated_at,
                } },
                None,
            )
            .await?;

        if result.matched_count == 0 {
            return Err(Error::ConcurrentModificationDetected);
        }

        campaign.status = status;
        campaign.admin_comment = Some(comment);
        campaign.updated_at = now;

        Ok(campaign)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_campaign(&self, campaign_id: CampaignId) -> Result<(), Error> {
        self.delete_one(bson::doc! { "_id": campaign_id }, None)
            .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn delete_campaigns_by_owner(&self, owner: UserId) -> Result<(), Error> {
        self.delete_many(bson::doc! { "user_id": owner }, None)
            .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn count_campaigns_by_owner(
        &self,
        owner: UserId,
        status: Option<CampaignStatus>,
    ) -> Result<u64, Error> {
        let mut filter = bson::doc! { "user_id": owner };
        if let Some(status) = status {
            filter.insert("status", status.as_str());
        }

        Ok(self.count_documents(filter, None).await?)
    }

    #[tracing::instrument(skip(self))]
    async fn count_campaigns(&self, status: Option<CampaignStatus>) -> Result<u64, Error> {
        let mut filter = bson::doc! {};
        if let Some(status) = status {
            filter.insert("status", status.as_str());
        }

        Ok(self.count_documents(filter, None).await?)
    }

    #[tracing::instrument(skip(self))]
    async fn aggregate_status_distribution(&self) -> Result<Vec<StatusCount>, Error> {
        let pipeline = vec![bson::doc! {
            "$group": { "_id": "$status", "count": { "$sum": 1 } }
        }];

        let mut cursor = self.aggregate(pipeline, None).await?;
        let mut distribution = Vec::new();
        while let Some(document) = cursor.try_next().await? {
            distribution.push(bson::from_document(document)?);
        }

        Ok(distribution)
    }
}

fn is_duplicate_key_error(err: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};

    matches!(
        &*err.kind,
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == 11000
    )
}
