use rocket::State;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use serde::{Deserialize, Serialize};
use sqlx::{Pool, Sqlite};

use super::MessageResponse;
use crate::auth::{AuthenticatedUser, TokenKeys, UserProfile};
use crate::error::AppError;
use crate::operations::auth::{
    self, LoginRequest, LoginResponse, ProfileImageRequest, SignupRequest,
};

#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub user: String,
}

#[post("/auth/signup", data = "<request>")]
pub async fn api_signup(
    request: Json<SignupRequest>,
    db: &State<Pool<Sqlite>>,
) -> Result<Custom<Json<MessageResponse>>, AppError> {
    auth::signup(db, request.into_inner()).await?;
    Ok(Custom(
        Status::Created,
        MessageResponse::new("Signup successful"),
    ))
}

#[post("/auth/login", data = "<request>")]
pub async fn api_login(
    request: Json<LoginRequest>,
    db: &State<Pool<Sqlite>>,
    keys: &State<TokenKeys>,
) -> Result<Json<LoginResponse>, AppError> {
    Ok(Json(auth::login(db, keys, request.into_inner()).await?))
}

#[get("/auth/verify")]
pub fn api_verify(user: AuthenticatedUser) -> Json<VerifyResponse> {
    Json(VerifyResponse { user: user.email })
}

#[get("/auth/profile")]
pub async fn api_profile(
    user: AuthenticatedUser,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<UserProfile>, AppError> {
    Ok(Json(auth::profile(db, &user).await?))
}

#[put("/auth/profile-image", data = "<request>")]
pub async fn api_update_profile_image(
    user: AuthenticatedUser,
    request: Json<ProfileImageRequest>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<MessageResponse>, AppError> {
    auth::update_profile_image(db, &user, request.into_inner()).await?;
    Ok(MessageResponse::new("Profile image updated successfully"))
}
