use actix_web::http::header;
use actix_web::web::{Data, Json, Path};
use actix_web::{get, post, HttpRequest};

use crate::clock::SystemClock;
use crate::database::MongoDatabase;
use crate::error::Error;

use super::{manager, AwarenessPage, LandingPage, SubmitOutcome};

/// Best-effort source attribution for anonymous visitors. Missing headers
/// degrade to placeholders rather than failing the request.
fn visitor_of(req: &HttpRequest) -> (String, String) {
    let ip_address = req
        .connection_info()
        .realip_remote_addr()
        .unwrap_or("unknown")
        .to_string();
    let user_agent = req
        .headers()
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    (ip_address, user_agent)
}

#[get("/api/simulate/{token}")]
#[tracing::instrument(skip(db, clock, req))]
async fn get_simulation(
    db: Data<MongoDatabase>,
    clock: Data<SystemClock>,
    params: Path<String>,
    req: HttpRequest,
) -> Result<Json<LandingPage>, Error> {
    let token = params.into_inner();
    let (ip_address, user_agent) = visitor_of(&req);

    let page =
        manager::resolve_landing(db.get_ref(), clock.get_ref(), &token, &ip_address, &user_agent)
            .await?;

    Ok(Json(page))
}

#[post("/api/simulate/{token}/submit")]
#[tracing::instrument(skip(db, clock, req))]
async fn submit_simulation(
    db: Data<MongoDatabase>,
    clock: Data<SystemClock>,
    params: Path<String>,
    req: HttpRequest,
) -> Result<Json<SubmitOutcome>, Error> {
    let token = params.into_inner();
    let (ip_address, user_agent) = visitor_of(&req);

    let outcome =
        manager::resolve_submit(db.get_ref(), clock.get_ref(), &token, &ip_address, &user_agent)
            .await?;

    Ok(Json(outcome))
}

#[get("/api/awareness/{token}")]
#[tracing::instrument(skip(db, clock, req))]
async fn get_awareness(
    db: Data<MongoDatabase>,
    clock: Data<SystemClock>,
    params: Path<String>,
    req: HttpRequest,
) -> Result<Json<AwarenessPage>, Error> {
    let token = params.into_inner();
    let (ip_address, user_agent) = visitor_of(&req);

    let page = manager::resolve_awareness(
        db.get_ref(),
        clock.get_ref(),
        &token,
        &ip_address,
        &user_agent,
    )
    .await?;

    Ok(Json(page))
}
