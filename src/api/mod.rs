use rocket::Route;
use rocket::serde::json::Json;
use serde::{Deserialize, Serialize};

pub mod auth;
pub mod colleges;
pub mod programs;
pub mod students;

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

#[get("/health")]
pub fn health() -> &'static str {
    "OK"
}

/// Every handler mounted under `/api`.
pub fn routes() -> Vec<Route> {
    routes![
        health,
        colleges::api_get_colleges,
        colleges::api_get_college,
        colleges::api_create_college,
        colleges::api_update_college,
        colleges::api_update_college_by_code,
        colleges::api_delete_college,
        colleges::api_delete_college_by_code,
        programs::api_get_programs,
        programs::api_get_program,
        programs::api_create_program,
        programs::api_update_program,
        programs::api_update_program_by_code,
        programs::api_delete_program,
        programs::api_delete_program_by_code,
        students::api_get_students,
        students::api_get_student,
        students::api_create_student,
        students::api_update_student,
        students::api_update_student_by_id,
        students::api_delete_student,
        students::api_delete_student_by_id,
        auth::api_signup,
        auth::api_login,
        auth::api_verify,
        auth::api_profile,
        auth::api_update_profile_image,
        crate::cors::preflight,
    ]
}
