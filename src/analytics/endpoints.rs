use actix_web::get;
use actix_web::web::{Data, Json};

use crate::clock::SystemClock;
use crate::database::MongoDatabase;
use crate::error::Error;
use crate::identity::Identity;

use super::{manager, AdminAnalytics, UserAnalytics};

#[get("/api/user/analytics")]
#[tracing::instrument(skip(db, clock))]
async fn get_user_analytics(
    db: Data<MongoDatabase>,
    clock: Data<SystemClock>,
    identity: Identity,
) -> Result<Json<UserAnalytics>, Error> {
    let analytics =
        manager::user_analytics(db.get_ref(), clock.get_ref(), identity.user_id).await?;

    Ok(Json(analytics))
}

#[get("/api/admin/analytics")]
#[tracing::instrument(skip(db, clock))]
async fn get_admin_analytics(
    db: Data<MongoDatabase>,
    clock: Data<SystemClock>,
    identity: Identity,
) -> Result<Json<AdminAnalytics>, Error> {
    let analytics = manager::admin_analytics(db.get_ref(), clock.get_ref(), identity).await?;

    Ok(Json(analytics))
}
