use sqlx::{Pool, Sqlite};
use tracing::{info, instrument};

use crate::auth::{DbUser, UserProfile};
use crate::error::AppError;

#[instrument(skip(pool))]
pub async fn email_exists(pool: &Pool<Sqlite>, email: &str) -> Result<bool, AppError> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    Ok(row.is_some())
}

#[instrument(skip(pool))]
pub async fn find_user_by_email(
    pool: &Pool<Sqlite>,
    email: &str,
) -> Result<Option<DbUser>, AppError> {
    info!("Getting user by email");
    let user = sqlx::query_as::<_, DbUser>(
        "SELECT id, email, password_hash, first_name, last_name, profile_image_url
         FROM users WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

#[instrument(skip(pool, password_hash))]
pub async fn create_user(
    pool: &Pool<Sqlite>,
    email: &str,
    password_hash: &str,
    first_name: &str,
    last_name: &str,
) -> Result<i64, AppError> {
    info!("Creating new user");
    let res = sqlx::query(
        "INSERT INTO users (email, password_hash, first_name, last_name) VALUES (?, ?, ?, ?)",
    )
    .bind(email)
    .bind(password_hash)
    .bind(first_name)
    .bind(last_name)
    .execute(pool)
    .await
    .map_err(|e| AppError::from_write(e, "Email already registered", "Invalid user reference"))?;

    Ok(res.last_insert_rowid())
}

#[instrument(skip(pool))]
pub async fn get_profile(
    pool: &Pool<Sqlite>,
    email: &str,
) -> Result<Option<UserProfile>, AppError> {
    let profile = sqlx::query_as::<_, UserProfile>(
        "SELECT email, first_name, last_name, profile_image_url FROM users WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(profile)
}

#[instrument(skip(pool))]
pub async fn update_profile_image(
    pool: &Pool<Sqlite>,
    email: &str,
    profile_image_url: &str,
) -> Result<(), AppError> {
    info!("Updating user profile image");
    let result = sqlx::query("UPDATE users SET profile_image_url = ? WHERE email = ?")
        .bind(profile_image_url)
        .bind(email)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    Ok(())
}
