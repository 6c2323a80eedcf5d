use serde::{Deserialize, Serialize};
use sqlx::{Pool, Sqlite};
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::auth::{
    AuthenticatedUser, TokenKeys, UserProfile, hash_password, verify_password,
    verify_unknown_account,
};
use crate::db;
use crate::error::AppError;
use crate::validation::{present, validate_in_order};

pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Deserialize, Default)]
pub struct SignupRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub confirm_password: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ProfileImageRequest {
    #[serde(default)]
    pub profile_image_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub user: String,
}

#[derive(Validate)]
struct NewAccount {
    #[validate(email(message = "Invalid email format"))]
    email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    password: String,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Passwords are compared exactly as sent; only blank input counts as missing.
fn raw_present(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.trim().is_empty()).cloned()
}

#[instrument(skip_all)]
pub async fn signup(pool: &Pool<Sqlite>, request: SignupRequest) -> Result<(), AppError> {
    let (Some(email), Some(password), Some(confirm)) = (
        present(&request.email),
        raw_present(&request.password),
        raw_present(&request.confirm_password),
    ) else {
        return Err(AppError::Validation("All fields are required".to_string()));
    };

    let (Some(first_name), Some(last_name)) =
        (present(&request.first_name), present(&request.last_name))
    else {
        return Err(AppError::Validation(
            "First name and last name are required".to_string(),
        ));
    };

    if password != confirm {
        return Err(AppError::Validation("Passwords do not match".to_string()));
    }

    let account = NewAccount {
        email: normalize_email(&email),
        password,
    };
    validate_in_order(&account, &["email", "password"])?;

    if db::email_exists(pool, &account.email).await? {
        warn!(email = %account.email, "Signup with an already registered email");
        return Err(AppError::Validation("Email already registered".to_string()));
    }

    let password_hash = hash_password(&account.password)?;
    let user_id =
        db::create_user(pool, &account.email, &password_hash, &first_name, &last_name).await?;
    info!(user_id = user_id, "User signed up");

    Ok(())
}

/// Unknown email and wrong password fail with the same error.
#[instrument(skip_all)]
pub async fn login(
    pool: &Pool<Sqlite>,
    keys: &TokenKeys,
    request: LoginRequest,
) -> Result<LoginResponse, AppError> {
    let (Some(email), Some(password)) = (present(&request.email), raw_present(&request.password))
    else {
        return Err(AppError::Validation(
            "Email and password are required".to_string(),
        ));
    };
    let email = normalize_email(&email);

    let verified = match db::find_user_by_email(pool, &email).await? {
        Some(user) => verify_password(&password, &user.password_hash).then_some(user),
        None => {
            verify_unknown_account(&password);
            None
        }
    };
    let Some(user) = verified else {
        warn!(email = %email, "Failed login attempt");
        return Err(AppError::Authentication(INVALID_CREDENTIALS.to_string()));
    };

    let access_token = keys.issue_token(&user.email)?;
    info!(user_id = user.id, "User logged in");

    Ok(LoginResponse {
        access_token,
        user: user.email,
    })
}

#[instrument(skip(pool))]
pub async fn profile(pool: &Pool<Sqlite>, user: &AuthenticatedUser) -> Result<UserProfile, AppError> {
    db::get_profile(pool, &user.email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

#[instrument(skip(pool))]
pub async fn update_profile_image(
    pool: &Pool<Sqlite>,
    user: &AuthenticatedUser,
    request: ProfileImageRequest,
) -> Result<(), AppError> {
    let Some(url) = present(&request.profile_image_url) else {
        return Err(AppError::Validation("Image URL is required".to_string()));
    };

    db::update_profile_image(pool, &user.email, &url).await
}
