use std::path::Path;

use anyhow::{Context, bail};
use tracing::{info, warn};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://records.db";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";
const DEV_JWT_SECRET: &str = "student-records-development-secret";

pub fn is_production() -> bool {
    dotenvy::var("ROCKET_PROFILE").unwrap_or("development".to_string()) == "production"
}

pub fn load_environment() -> anyhow::Result<()> {
    let env_files = if is_production() {
        vec!["config/common.env", "config/prod.env", ".env"]
    } else {
        vec!["config/common.env", "config/dev.env", ".env"]
    };

    for env_file in env_files {
        load_env_file(env_file)?;
    }

    Ok(())
}

fn load_env_file(path: &str) -> anyhow::Result<()> {
    if !Path::new(path).exists() {
        warn!("Warning: Environment file {} not found, skipping", path);
        return Ok(());
    }

    dotenvy::from_filename_override(path)
        .with_context(|| format!("Failed to load environment file {}", path))?;
    info!("Loaded environment from: {}", path);
    Ok(())
}

/// Runtime settings resolved once at startup and handed to Rocket as managed state.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub jwt_secret: String,
    pub cors_origin: String,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = non_empty_var("DATABASE_URL").unwrap_or(DEFAULT_DATABASE_URL.to_string());
        let cors_origin =
            non_empty_var("CORS_ALLOWED_ORIGIN").unwrap_or(DEFAULT_CORS_ORIGIN.to_string());

        let jwt_secret = match non_empty_var("JWT_SECRET_KEY") {
            Some(secret) => secret,
            None if is_production() => bail!("JWT_SECRET_KEY must be set in production"),
            None => {
                warn!("JWT_SECRET_KEY not set, using the development secret");
                DEV_JWT_SECRET.to_string()
            }
        };

        Ok(Settings {
            database_url,
            jwt_secret,
            cors_origin,
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    dotenvy::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
