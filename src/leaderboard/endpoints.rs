use actix_web::get;
use actix_web::web::{Data, Json};

use crate::database::MongoDatabase;
use crate::error::Error;
use crate::identity::Identity;

use super::{manager, LeaderboardEntry};

#[get("/api/admin/leaderboard")]
#[tracing::instrument(skip(db))]
async fn get_leaderboard(
    db: Data<MongoDatabase>,
    identity: Identity,
) -> Result<Json<Vec<LeaderboardEntry>>, Error> {
    let board = manager::get_leaderboard(db.get_ref(), identity).await?;

    Ok(Json(board))
}
