use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::options::FindOptions;
use mongodb::{bson, Database};

use crate::database::MongoUserStore;
use crate::error::Error;

use super::{Role, User, UserId};

const USERS: &str = "users";

pub async fn initialize(db: &Database) -> Result<(), Error> {
    db.run_command(
        bson::doc! {
            "createIndexes": USERS,
            "indexes": [
                { "key": { "email": 1 }, "name": "by_email", "unique": true },
            ]
        },
        None,
    )
    .await?;

    Ok(())
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn fetch_users(&self) -> Result<Vec<User>, Error>;

    async fn fetch_users_by_role(&self, role: Role) -> Result<Vec<User>, Error>;

    async fn fetch_user_by_id(&self, user_id: UserId) -> Result<Option<User>, Error>;

    async fn count_users_by_role(&self, role: Role) -> Result<u64, Error>;

    async fn delete_user(&self, user_id: UserId) -> Result<(), Error>;
}

#[async_trait]
impl UserStore for MongoUserStore {
    #[tracing::instrument(skip(self))]
    async fn fetch_users(&self) -> Result<Vec<User>, Error> {
        let options = FindOptions::builder()
            .sort(bson::doc! { "created_at": -1 })
            .build();

        let users: Vec<User> = self
            .find(bson::doc! {}, options)
            .await?
            .try_collect()
            .await?;

        Ok(users)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_users_by_role(&self, role: Role) -> Result<Vec<User>, Error> {
        let users: Vec<User> = self
            .find(bson::doc! { "role": role.as_str() }, None)
            .await?
            .try_collect()
            .await?;

        Ok(users)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_user_by_id(&self, user_id: UserId) -> Result<Option<User>, Error> {
        let user: Option<User> = self.find_one(bson::doc! { "_id": user_id }, None).await?;

        Ok(user)
    }

    #[tracing::instrument(skip(self))]
    async fn count_users_by_role(&self, role: Role) -> Result<u64, Error> {
        Ok(self
            .count_documents(bson::doc! { "role": role.as_str() }, None)
            .await?)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_user(&self, user_id: UserId) -> Result<(), Error> {
        self.delete_one(bson::doc! { "_id": user_id }, None).await?;

        Ok(())
    }
}
