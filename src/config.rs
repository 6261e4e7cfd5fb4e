use std::env;

use crate::error::Error;

/// Runtime configuration, read once at startup from the environment (with a
/// `.env` file honored in development).
pub struct Config {
    pub port: u16,
    pub mongodb_url: String,
    pub database_name: String,
    /// Base URL of the frontend, used when composing simulation links.
    pub app_base_url: String,
    pub jwt_secret: String,
    pub resend: Option<ResendConfig>,
}

pub struct ResendConfig {
    pub api_key: String,
    pub from_email: String,
}

impl Config {
    pub fn from_env() -> Result<Config, Error> {
        dotenvy::dotenv().ok();

        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(8080);
        let mongodb_url = env::var("MONGODB_URL")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let database_name = env::var("DATABASE_NAME").unwrap_or_else(|_| "seap".to_string());
        let app_base_url = env::var("APP_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .trim_end_matches('/')
            .to_string();
        let jwt_secret =
            env::var("JWT_SECRET").map_err(|_| Error::MissingConfiguration { name: "JWT_SECRET" })?;

        let resend = env::var("RESEND_API_KEY").ok().map(|api_key| ResendConfig {
            api_key,
            from_email: env::var("RESEND_FROM_EMAIL")
                .unwrap_or_else(|_| "onboarding@resend.dev".to_string()),
        });

        Ok(Config {
            port,
            mongodb_url,
            database_name,
            app_base_url,
            jwt_secret,
            resend,
        })
    }
}
