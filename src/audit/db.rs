use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::options::FindOptions;
use mongodb::{bson, Database};

use crate::database::MongoAuditLogStore;
use crate::error::Error;

use super::AuditLog;

const AUDIT_LOGS: &str = "audit_logs";

pub async fn initialize(db: &Database) -> Result<(), Error> {
    db.run_command(
        bson::doc! {
            "createIndexes": AUDIT_LOGS,
            "indexes": [
                { "key": { "created_at": -1 }, "name": "by_created_at" },
            ]
        },
        None,
    )
    .await?;

    Ok(())
}

#[async_trait]
pub trait AuditLogStore: Send + Sync {
    async fn insert_audit_log(&self, entry: &AuditLog) -> Result<(), Error>;

    async fn fetch_audit_logs(&self, limit: i64) -> Result<Vec<AuditLog>, Error>;
}

#[async_trait]
impl AuditLogStore for MongoAuditLogStore {
    #[tracing::instrument(skip(self))]
    async fn insert_audit_log(&self, entry: &AuditLog) -> Result<(), Error> {
        self.insert_one(entry, None).await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_audit_logs(&self, limit: i64) -> Result<Vec<AuditLog>, Error> {
        let options = FindOptions::builder()
            .sort(bson::doc! { "created_at": -1 })
            .limit(limit)
            .build();

        let logs: Vec<AuditLog> = self
            .find(bson::doc! {}, options)
            .await?
            .try_collect()
            .await?;

        Ok(logs)
    }
}
