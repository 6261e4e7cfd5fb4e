use std::sync::Arc;

use actix_web::web::{self, Data, Json, JsonConfig, PathConfig, QueryConfig};
use actix_web::{get, App, HttpServer, ResponseError};
use mongodb::Client;
use serde::Serialize;
use tracing::{info, warn, Level};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::fmt::format::FmtSpan;

mod analytics;
mod audit;
mod campaign;
mod clock;
mod config;
mod database;
mod error;
mod event;
mod identity;
mod leaderboard;
mod notifier;
mod simulation;
mod typedid;
mod user;

use crate::clock::SystemClock;
use crate::config::Config;
use crate::database::MongoDatabase;
use crate::error::Error;
use crate::identity::IdentityProvider;
use crate::notifier::{DisabledNotifier, Notifier, ResendNotifier};

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
}

#[get("/api/health")]
async fn health() -> Json<HealthBody> {
    Json(HealthBody { status: "healthy" })
}

#[actix_web::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_span_events(FmtSpan::NEW)
        .compact()
        .init();

    let config = Config::from_env()?;

    info!("connecting to db: {}", config.mongodb_url);
    let db = Client::with_uri_str(&config.mongodb_url)
        .await?
        .database(&config.database_name);
    let db = MongoDatabase::initialize(db).await?;

    let notifier: Arc<dyn Notifier> = match &config.resend {
        Some(resend) => Arc::new(ResendNotifier::new(
            resend.api_key.clone(),
            resend.from_email.clone(),
        )),
        None => {
            warn!("RESEND_API_KEY not set, email delivery is disabled");
            Arc::new(DisabledNotifier)
        }
    };

    let identity_provider = IdentityProvider::new(&config.jwt_secret);

    let port = config.port;
    let db = Data::new(db);
    let clock = Data::new(SystemClock);
    let notifier = Data::from(notifier);
    let identity_provider = Data::new(identity_provider);
    let config = Data::new(config);

    info!("listening on port {}", port);
    HttpServer::new(move || {
        App::new()
            .app_data(JsonConfig::default().error_handler(|err, _req| {
                // format json errors with custom format
                Error::InvalidJson(err).into()
            }))
            .app_data(PathConfig::default().error_handler(|err, _req| {
                // format path errors with custom format
                Error::InvalidPath(err).into()
            }))
            .app_data(QueryConfig::default().error_handler(|err, _req| {
                // format query errors with custom format
                Error::InvalidQuery(err).into()
            }))
            .app_data(db.clone())
            .app_data(clock.clone())
            .app_data(notifier.clone())
            .app_data(identity_provider.clone())
            .app_data(config.clone())
            .wrap(TracingLogger::default())
            .service(health)
            .service(campaign::endpoints::create_campaign)
            .service(campaign::endpoints::get_campaigns)
            .service(campaign::endpoints::get_campaign_by_id)
            .service(campaign::endpoints::update_campaign)
            .service(campaign::endpoints::delete_campaign)
            .service(campaign::endpoints::share_campaign)
            .service(campaign::endpoints::list_all_campaigns)
            .service(campaign::endpoints::approve_campaign)
            .service(campaign::endpoints::reject_campaign)
            .service(simulation::endpoints::get_simulation)
            .service(simulation::endpoints::submit_simulation)
            .service(simulation::endpoints::get_awareness)
            .service(analytics::endpoints::get_user_analytics)
            .service(analytics::endpoints::get_admin_analytics)
            .service(leaderboard::endpoints::get_leaderboard)
            .service(user::endpoints::get_users)
            .service(user::endpoints::delete_user)
            .service(audit::endpoints::get_audit_logs)
            .default_service(web::route().to(|| async { Error::PathDoesNotExist.error_response() }))
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await?;

    Ok(())
}
