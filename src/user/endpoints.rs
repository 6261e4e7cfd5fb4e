use actix_web::web::{Data, Json, Path};
use actix_web::{delete, get};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::clock::SystemClock;
use crate::database::MongoDatabase;
use crate::error::Error;
use crate::identity::Identity;

use super::{manager, Role, User, UserId};

#[derive(Clone, Debug, Serialize)]
pub struct UserBody {
    pub id: UserId,
    pub email: String,
    pub role: Role,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl UserBody {
    pub fn render(user: User) -> UserBody {
        UserBody {
            id: user.id,
            email: user.email,
            role: user.role,
            email_verified: user.email_verified,
            created_at: user.created_at,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct MessageBody {
    pub message: &'static str,
}

#[get("/api/admin/users")]
#[tracing::instrument(skip(db))]
async fn get_users(
    db: Data<MongoDatabase>,
    identity: Identity,
) -> Result<Json<Vec<UserBody>>, Error> {
    let users = manager::get_users(db.get_ref(), identity).await?;

    Ok(Json(users.into_iter().map(UserBody::render).collect()))
}

#[delete("/api/admin/users/{user_id}")]
#[tracing::instrument(skip(db, clock))]
async fn delete_user(
    db: Data<MongoDatabase>,
    clock: Data<SystemClock>,
    identity: Identity,
    params: Path<UserId>,
) -> Result<Json<MessageBody>, Error> {
    manager::delete_user(db.get_ref(), clock.get_ref(), identity, params.into_inner()).await?;

    Ok(Json(MessageBody {
        message: "User deleted",
    }))
}
