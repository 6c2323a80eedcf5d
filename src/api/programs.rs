use rocket::{FromForm, State};
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use sqlx::{Pool, Sqlite};

use super::MessageResponse;
use crate::db::ListParams;
use crate::error::AppError;
use crate::models::Program;
use crate::operations::programs::{self, ProgramKey, ProgramRequest};

#[derive(Debug, FromForm)]
pub struct ProgramQueryParams {
    sort: Option<String>,
    sort_by: Option<String>,
    search: Option<String>,
    search_field: Option<String>,
    colleges: Option<String>,
}

impl ProgramQueryParams {
    fn list_params(&self) -> ListParams {
        ListParams {
            sort: self.sort.clone(),
            sort_by: self.sort_by.clone(),
            search: self.search.clone(),
            search_field: self.search_field.clone(),
        }
    }
}

#[get("/programs?<params..>")]
pub async fn api_get_programs(
    params: ProgramQueryParams,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<Program>>, AppError> {
    let programs =
        programs::list_programs(db, &params.list_params(), params.colleges.as_deref()).await?;
    Ok(Json(programs))
}

#[get("/programs/<code>")]
pub async fn api_get_program(code: &str, db: &State<Pool<Sqlite>>) -> Result<Json<Program>, AppError> {
    Ok(Json(programs::get_program(db, code).await?))
}

#[post("/programs", data = "<request>")]
pub async fn api_create_program(
    request: Json<ProgramRequest>,
    db: &State<Pool<Sqlite>>,
) -> Result<Custom<Json<Program>>, AppError> {
    let program = programs::create_program(db, request.into_inner()).await?;
    Ok(Custom(Status::Created, Json(program)))
}

#[put("/programs", data = "<request>")]
pub async fn api_update_program(
    request: Json<ProgramRequest>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Program>, AppError> {
    Ok(Json(
        programs::update_program_by_body(db, request.into_inner()).await?,
    ))
}

#[put("/programs/<code>", data = "<request>")]
pub async fn api_update_program_by_code(
    code: &str,
    request: Json<ProgramRequest>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Program>, AppError> {
    Ok(Json(
        programs::update_program(db, code, request.into_inner()).await?,
    ))
}

#[delete("/programs", data = "<key>")]
pub async fn api_delete_program(
    key: Json<ProgramKey>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<MessageResponse>, AppError> {
    programs::delete_program_by_body(db, key.into_inner()).await?;
    Ok(MessageResponse::new(
        "Program deleted and students reassigned to N/A",
    ))
}

#[delete("/programs/<code>")]
pub async fn api_delete_program_by_code(
    code: &str,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<MessageResponse>, AppError> {
    programs::delete_program(db, code).await?;
    Ok(MessageResponse::new(
        "Program deleted and students reassigned to N/A",
    ))
}
