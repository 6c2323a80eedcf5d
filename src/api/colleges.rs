use rocket::State;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use sqlx::{Pool, Sqlite};

use super::MessageResponse;
use crate::db::ListParams;
use crate::error::AppError;
use crate::models::College;
use crate::operations::colleges::{self, CollegeKey, CollegeRequest};

#[get("/colleges?<params..>")]
pub async fn api_get_colleges(
    params: ListParams,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<College>>, AppError> {
    Ok(Json(colleges::list_colleges(db, &params).await?))
}

#[get("/colleges/<code>")]
pub async fn api_get_college(code: &str, db: &State<Pool<Sqlite>>) -> Result<Json<College>, AppError> {
    Ok(Json(colleges::get_college(db, code).await?))
}

#[post("/colleges", data = "<request>")]
pub async fn api_create_college(
    request: Json<CollegeRequest>,
    db: &State<Pool<Sqlite>>,
) -> Result<Custom<Json<College>>, AppError> {
    let college = colleges::create_college(db, request.into_inner()).await?;
    Ok(Custom(Status::Created, Json(college)))
}

#[put("/colleges", data = "<request>")]
pub async fn api_update_college(
    request: Json<CollegeRequest>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<College>, AppError> {
    Ok(Json(
        colleges::update_college_by_body(db, request.into_inner()).await?,
    ))
}

#[put("/colleges/<code>", data = "<request>")]
pub async fn api_update_college_by_code(
    code: &str,
    request: Json<CollegeRequest>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<College>, AppError> {
    Ok(Json(
        colleges::update_college(db, code, request.into_inner()).await?,
    ))
}

#[delete("/colleges", data = "<key>")]
pub async fn api_delete_college(
    key: Json<CollegeKey>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<MessageResponse>, AppError> {
    colleges::delete_college_by_body(db, key.into_inner()).await?;
    Ok(MessageResponse::new(
        "College deleted and programs reassigned to N/A",
    ))
}

#[delete("/colleges/<code>")]
pub async fn api_delete_college_by_code(
    code: &str,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<MessageResponse>, AppError> {
    colleges::delete_college(db, code).await?;
    Ok(MessageResponse::new(
        "College deleted and programs reassigned to N/A",
    ))
}
