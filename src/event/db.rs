use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{bson, Database};

use crate::campaign::CampaignId;
use crate::database::MongoEventStore;
use crate::error::Error;

use super::{DailyCount, Event, EventType};

const EVENTS: &str = "events";

pub async fn initialize(db: &Database) -> Result<(), Error> {
    db.run_command(
        bson::doc! {
            "createIndexes": EVENTS,
            "indexes": [
                { "key": { "campaign_id": 1, "created_at": -1 }, "name": "by_campaign_id" },
                // Serves the dedup lookup on (campaign, type, source ip).
                {
                    "key": { "campaign_id": 1, "event_type": 1, "ip_address": 1, "created_at": -1 },
                    "name": "by_dedup_key"
                },
                { "key": { "created_at": -1 }, "name": "by_created_at" },
            ]
        },
        None,
    )
    .await?;

    Ok(())
}

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn insert_event(&self, event: &Event) -> Result<(), Error>;

    async fn count_recent_events(
        &self,
        campaign_id: CampaignId,
        event_type: EventType,
        ip_address: &str,
        since: DateTime<Utc>,
    ) -> Result<u64, Error>;

    async fn count_events_by_campaigns(
        &self,
        campaign_ids: &[CampaignId],
        event_types: &[&str],
    ) -> Result<u64, Error>;

    async fn count_events_by_types(&self, event_types: &[&str]) -> Result<u64, Error>;

    async fn count_all_events(&self) -> Result<u64, Error>;

    async fn aggregate_daily_counts(
        &self,
        campaign_ids: Option<&[CampaignId]>,
        since: DateTime<Utc>,
    ) -> Result<Vec<DailyCount>, Error>;

    async fn delete_events_by_campaigns(&self, campaign_ids: &[CampaignId]) -> Result<(), Error>;
}

#[async_trait]
impl EventStore for MongoEventStore {
    #[tracing::instrument(skip(self))]
    async fn insert_event(&self, event: &Event) -> Result<(), Error> {
        self.insert_one(event, None).await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn count_recent_events(
        &self,
        campaign_id: CampaignId,
        event_type: EventType,
        ip_address: &str,
        since: DateTime<Utc>,
    ) -> Result<u64, Error> {
        let count = self
            .count_documents(
                bson::doc! {
                    "campaign_id": campaign_id,
                    "event_type": event_type.as_str(),
                    "ip_address": ip_address,
                    "created_at": { "$gte": bson::DateTime::from_chrono(since) },
                },
                None,
            )
            .await?;

        Ok(count)
    }

    #[tracing::instrument(skip(self))]
    async fn count_events_by_campaigns(
        &self,
        campaign_ids: &[CampaignId],
        event_types: &[&str],
    ) -> Result<u64, Error> {
        let count = self
            .count_documents(
                bson::doc! {
                    "campaign_id": { "$in": to_bson_ids(campaign_ids) },
                    "event_type": { "$in": to_bson_strings(event_types) },
                },
                None,
            )
            .await?;

        Ok(count)
    }

    #[tracing::instrument(skip(self))]
    async fn count_events_by_types(&self, event_types: &[&str]) -> Result<u64, Error> {
        let count = self
            .count_documents(
                bson::doc! { "event_type": { "$in": to_bson_strings(event_types) } },
                None,
            )
            .await?;

        Ok(count)
    }

    #[tracing::instrument(skip(self))]
    async fn count_all_events(&self) -> Result<u64, Error> {
        Ok(self.count_documents(bson::doc! {}, None).await?)
    }

    #[tracing::instrument(skip(self))]
    async fn aggregate_daily_counts(
        &self,
        campaign_ids: Option<&[CampaignId]>,
        since: DateTime<Utc>,
    ) -> Result<Vec<DailyCount>, Error> {
        let mut match_filter = bson::doc! {
            "created_at": { "$gte": bson::DateTime::from_chrono(since) },
        };
        if let Some(campaign_ids) = campaign_ids {
            match_filter.insert("campaign_id", bson::doc! { "$in": to_bson_ids(campaign_ids) });
        }

        let pipeline = vec![
            bson::doc! { "$match": match_filter },
            bson::doc! { "$group": {
                "_id": { "$dateToString": { "format": "%Y-%m-%d", "date": "$created_at" } },
                "count": { "$sum": 1 },
            } },
            bson::doc! { "$sort": { "_id": -1 } },
        ];

        let mut cursor = self.aggregate(pipeline, None).await?;
        let mut timeline = Vec::new();
        while let Some(document) = cursor.try_next().await? {
            timeline.push(bson::from_document(document)?);
        }

        Ok(timeline)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_events_by_campaigns(&self, campaign_ids: &[CampaignId]) -> Result<(), Error> {
        self.delete_many(
            bson::doc! { "campaign_id": { "$in": to_bson_ids(campaign_ids) } },
            None,
        )
        .await?;

        Ok(())
    }
}

fn to_bson_ids(campaign_ids: &[CampaignId]) -> Vec<bson::Bson> {
    campaign_ids.iter().map(|id| bson::Bson::from(*id)).collect()
}

fn to_bson_strings(values: &[&str]) -> Vec<bson::Bson> {
    values.iter().map(|value| bson::Bson::from(*value)).collect()
}
