use serde::Deserialize;
use serde_json::Value;
use sqlx::{Pool, Sqlite};
use tracing::instrument;

use super::normalize_code;
use crate::db::listing::{split_filter, split_int_filter};
use crate::db::{self, ListParams, StudentFilters};
use crate::error::AppError;
use crate::models::{NewStudent, Student};
use crate::validation::{parse_year_level, present, require_all, validate_in_order};

#[derive(Debug, Default, Clone, Deserialize)]
pub struct StudentRequest {
    #[serde(default)]
    pub old_id: Option<String>,
    #[serde(default)]
    pub student_id: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub program_code: Option<String>,
    #[serde(default)]
    pub year_level: Option<Value>,
    #[serde(default)]
    pub profile_image_url: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct StudentKey {
    #[serde(default)]
    pub student_id: Option<String>,
}

/// Raw comma-separated filter values as they arrive on the query string.
#[derive(Debug, Default, Clone)]
pub struct StudentFilterParams<'a> {
    pub programs: Option<&'a str>,
    pub genders: Option<&'a str>,
    pub year_levels: Option<&'a str>,
}

/// Accepts any casing of M, F or Others and returns the stored spelling.
pub fn normalize_gender(gender: &str) -> String {
    let trimmed = gender.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "m" | "male" => "M".to_string(),
        "f" | "female" => "F".to_string(),
        "others" | "other" => "Others".to_string(),
        _ => trimmed.to_string(),
    }
}

#[instrument(skip(pool))]
pub async fn list_students(
    pool: &Pool<Sqlite>,
    params: &ListParams,
    filters: StudentFilterParams<'_>,
) -> Result<Vec<Student>, AppError> {
    let filters = StudentFilters {
        programs: split_filter(filters.programs)
            .iter()
            .map(|p| normalize_code(p))
            .collect(),
        genders: split_filter(filters.genders)
            .iter()
            .map(|g| normalize_gender(g))
            .collect(),
        year_levels: split_int_filter(filters.year_levels, "year_levels")?,
    };

    db::get_all_students(pool, params, filters).await
}

#[instrument(skip(pool))]
pub async fn get_student(pool: &Pool<Sqlite>, student_id: &str) -> Result<Student, AppError> {
    db::get_student(pool, student_id.trim())
        .await?
        .ok_or_else(|| AppError::NotFound("Student not found".to_string()))
}

async fn ensure_program(pool: &Pool<Sqlite>, program_code: &str) -> Result<(), AppError> {
    if !db::program_exists(pool, program_code).await? {
        return Err(AppError::Reference(format!(
            "Program code '{}' does not exist",
            program_code
        )));
    }
    Ok(())
}

/// Presence and format checks shared by create and update. `student_id` is
/// `Some` when the caller already resolved the ID to write.
fn build_student(
    request: &StudentRequest,
    student_id: Option<String>,
    profile_image_url: Option<String>,
) -> Result<NewStudent, AppError> {
    let year_level = parse_year_level(&request.year_level);

    let fields = (
        student_id.or_else(|| present(&request.student_id)),
        present(&request.first_name),
        present(&request.last_name),
        present(&request.gender),
        present(&request.program_code),
    );

    let (student_id, first_name, last_name, gender, program_code) = match fields {
        (Some(id), Some(first), Some(last), Some(gender), Some(program))
            if !matches!(year_level, Ok(None)) =>
        {
            (id, first, last, gender, program)
        }
        (id, first, last, gender, program) => {
            let missing: Vec<&str> = [
                ("student_id", id.is_none()),
                ("first_name", first.is_none()),
                ("last_name", last.is_none()),
                ("gender", gender.is_none()),
                ("program_code", program.is_none()),
                ("year_level", matches!(year_level, Ok(None))),
            ]
            .into_iter()
            .filter(|(_, absent)| *absent)
            .map(|(name, _)| name)
            .collect();

            return Err(AppError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }
    };

    let student = NewStudent {
        student_id,
        first_name,
        last_name,
        gender: normalize_gender(&gender),
        program_code: normalize_code(&program_code),
        // Unparseable input falls through to the range rule in field order.
        year_level: year_level.ok().flatten().unwrap_or_default(),
        profile_image_url,
    };
    validate_in_order(&student, &NewStudent::FIELD_ORDER)?;
    Ok(student)
}

#[instrument(skip(pool))]
pub async fn create_student(
    pool: &Pool<Sqlite>,
    request: StudentRequest,
) -> Result<Student, AppError> {
    let student = build_student(&request, None, present(&request.profile_image_url))?;

    if db::student_exists(pool, &student.student_id).await? {
        return Err(AppError::Conflict("Student ID already exists".to_string()));
    }
    ensure_program(pool, &student.program_code).await?;

    db::create_student(pool, &student).await?;
    get_student(pool, &student.student_id).await
}

pub async fn update_student_by_body(
    pool: &Pool<Sqlite>,
    request: StudentRequest,
) -> Result<Student, AppError> {
    let [old_id] = require_all([("old_id", &request.old_id)])?;
    update_student(pool, &old_id, request).await
}

/// A missing `student_id` keeps the current ID; a missing `profile_image_url`
/// keeps the stored image while an empty one clears it.
#[instrument(skip(pool))]
pub async fn update_student(
    pool: &Pool<Sqlite>,
    old_id: &str,
    request: StudentRequest,
) -> Result<Student, AppError> {
    let old_id = old_id.trim().to_string();
    let new_id = present(&request.student_id).unwrap_or_else(|| old_id.clone());
    let requested_image = request
        .profile_image_url
        .as_ref()
        .map(|_| present(&request.profile_image_url));
    let mut student = build_student(&request, Some(new_id), None)?;

    let existing = db::get_student(pool, &old_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Student not found".to_string()))?;

    if student.student_id != old_id && db::student_exists(pool, &student.student_id).await? {
        return Err(AppError::Conflict("New student ID already exists".to_string()));
    }
    ensure_program(pool, &student.program_code).await?;

    student.profile_image_url = requested_image.unwrap_or(existing.profile_image_url);

    db::update_student(pool, &old_id, &student).await?;
    get_student(pool, &student.student_id).await
}

#[instrument(skip(pool))]
pub async fn delete_student(pool: &Pool<Sqlite>, student_id: &str) -> Result<(), AppError> {
    let id = student_id.trim();
    if id.is_empty() {
        return Err(AppError::Validation("Student ID is required".to_string()));
    }

    db::delete_student(pool, id).await
}

pub async fn delete_student_by_body(
    pool: &Pool<Sqlite>,
    key: StudentKey,
) -> Result<(), AppError> {
    let [id] = require_all([("student_id", &key.student_id)])?;
    delete_student(pool, &id).await
}
