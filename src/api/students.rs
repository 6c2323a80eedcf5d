use rocket::{FromForm, State};
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use sqlx::{Pool, Sqlite};

use super::MessageResponse;
use crate::db::ListParams;
use crate::error::AppError;
use crate::models::Student;
use crate::operations::students::{self, StudentFilterParams, StudentKey, StudentRequest};

#[derive(Debug, FromForm)]
pub struct StudentQueryParams {
    sort: Option<String>,
    sort_by: Option<String>,
    search: Option<String>,
    search_field: Option<String>,
    programs: Option<String>,
    genders: Option<String>,
    year_levels: Option<String>,
}

impl StudentQueryParams {
    fn list_params(&self) -> ListParams {
        ListParams {
            sort: self.sort.clone(),
            sort_by: self.sort_by.clone(),
            search: self.search.clone(),
            search_field: self.search_field.clone(),
        }
    }

    fn filters(&self) -> StudentFilterParams<'_> {
        StudentFilterParams {
            programs: self.programs.as_deref(),
            genders: self.genders.as_deref(),
            year_levels: self.year_levels.as_deref(),
        }
    }
}

#[get("/students?<params..>")]
pub async fn api_get_students(
    params: StudentQueryParams,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<Student>>, AppError> {
    let students = students::list_students(db, &params.list_params(), params.filters()).await?;
    Ok(Json(students))
}

#[get("/students/<id>")]
pub async fn api_get_student(id: &str, db: &State<Pool<Sqlite>>) -> Result<Json<Student>, AppError> {
    Ok(Json(students::get_student(db, id).await?))
}

#[post("/students", data = "<request>")]
pub async fn api_create_student(
    request: Json<StudentRequest>,
    db: &State<Pool<Sqlite>>,
) -> Result<Custom<Json<Student>>, AppError> {
    let student = students::create_student(db, request.into_inner()).await?;
    Ok(Custom(Status::Created, Json(student)))
}

#[put("/students", data = "<request>")]
pub async fn api_update_student(
    request: Json<StudentRequest>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Student>, AppError> {
    Ok(Json(
        students::update_student_by_body(db, request.into_inner()).await?,
    ))
}

#[put("/students/<id>", data = "<request>")]
pub async fn api_update_student_by_id(
    id: &str,
    request: Json<StudentRequest>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Student>, AppError> {
    Ok(Json(
        students::update_student(db, id, request.into_inner()).await?,
    ))
}

#[delete("/students", data = "<key>")]
pub async fn api_delete_student(
    key: Json<StudentKey>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<MessageResponse>, AppError> {
    students::delete_student_by_body(db, key.into_inner()).await?;
    Ok(MessageResponse::new("Student deleted successfully"))
}

#[delete("/students/<id>")]
pub async fn api_delete_student_by_id(
    id: &str,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<MessageResponse>, AppError> {
    students::delete_student(db, id).await?;
    Ok(MessageResponse::new("Student deleted successfully"))
}
