#[macro_use]
extern crate rocket;

mod api;
mod auth;
mod cors;
mod db;
mod env;
mod error;
mod models;
mod operations;
mod telemetry;
#[cfg(test)]
mod test;
mod validation;

use std::str::FromStr;

use anyhow::Context;
use auth::{TokenKeys, default_catcher, unauthorized_api};
use cors::Cors;
use env::{Settings, load_environment};
use rocket::fairing::AdHoc;
use rocket::{Build, Rocket};
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteConnectOptions;
use telemetry::{TelemetryFairing, init_tracing, shutdown_telemetry};
use tracing::info;

#[launch]
async fn rocket() -> _ {
    if let Err(err) = load_environment() {
        eprintln!("Failed to load environment files: {:#}", err);
    }
    init_tracing();

    match prepare().await {
        Ok((pool, settings)) => init_rocket(pool, &settings),
        Err(err) => {
            tracing::error!("Startup failed: {:#}", err);
            std::process::exit(1);
        }
    }
}

async fn prepare() -> anyhow::Result<(SqlitePool, Settings)> {
    let settings = Settings::from_env()?;

    let options = SqliteConnectOptions::from_str(&settings.database_url)
        .with_context(|| format!("Invalid DATABASE_URL {}", settings.database_url))?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePool::connect_with(options)
        .await
        .context("Failed to connect to SQLite database")?;

    info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Database migration failed")?;
    info!("Migrations completed successfully");

    Ok((pool, settings))
}

pub fn init_rocket(pool: SqlitePool, settings: &Settings) -> Rocket<Build> {
    info!("Starting student records service");

    rocket::build()
        .manage(pool)
        .manage(TokenKeys::new(&settings.jwt_secret))
        .mount("/api", api::routes())
        .register("/api", catchers![unauthorized_api, default_catcher])
        .attach(TelemetryFairing)
        .attach(Cors::new(settings.cors_origin.clone()))
        .attach(AdHoc::on_shutdown("Telemetry shutdown", |_| {
            Box::pin(async move {
                shutdown_telemetry();
            })
        }))
}
