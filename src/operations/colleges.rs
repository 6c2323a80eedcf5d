use serde::Deserialize;
use sqlx::{Pool, Sqlite};
use tracing::instrument;

use super::{normalize_code, reject_sentinel};
use crate::db::{self, ListParams};
use crate::error::AppError;
use crate::models::{College, NewCollege};
use crate::validation::{present, require_all, validate_in_order};

#[derive(Debug, Default, Clone, Deserialize)]
pub struct CollegeRequest {
    #[serde(default)]
    pub old_code: Option<String>,
    #[serde(default)]
    pub college_code: Option<String>,
    #[serde(default)]
    pub college_name: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct CollegeKey {
    #[serde(default)]
    pub college_code: Option<String>,
}

#[instrument(skip(pool))]
pub async fn list_colleges(
    pool: &Pool<Sqlite>,
    params: &ListParams,
) -> Result<Vec<College>, AppError> {
    db::get_all_colleges(pool, params).await
}

#[instrument(skip(pool))]
pub async fn get_college(pool: &Pool<Sqlite>, college_code: &str) -> Result<College, AppError> {
    db::get_college(pool, &normalize_code(college_code))
        .await?
        .ok_or_else(|| AppError::NotFound("College not found".to_string()))
}

#[instrument(skip(pool))]
pub async fn create_college(
    pool: &Pool<Sqlite>,
    request: CollegeRequest,
) -> Result<College, AppError> {
    let [code, name] = require_all([
        ("college_code", &request.college_code),
        ("college_name", &request.college_name),
    ])?;

    let college = NewCollege {
        college_code: normalize_code(&code),
        college_name: name,
    };
    validate_in_order(&college, &NewCollege::FIELD_ORDER)?;
    reject_sentinel(&college.college_code, "college")?;

    if db::college_exists(pool, &college.college_code).await? {
        return Err(AppError::Conflict("College code already exists".to_string()));
    }

    db::create_college(pool, &college.college_code, &college.college_name).await?;
    get_college(pool, &college.college_code).await
}

/// Body-keyed form: the current code travels as `old_code`.
pub async fn update_college_by_body(
    pool: &Pool<Sqlite>,
    request: CollegeRequest,
) -> Result<College, AppError> {
    let [old_code] = require_all([("old_code", &request.old_code)])?;
    update_college(pool, &old_code, request).await
}

/// A missing `college_code` keeps the current code.
#[instrument(skip(pool))]
pub async fn update_college(
    pool: &Pool<Sqlite>,
    old_code: &str,
    request: CollegeRequest,
) -> Result<College, AppError> {
    let old_code = normalize_code(old_code);
    let [name] = require_all([("college_name", &request.college_name)])?;
    let new_code = present(&request.college_code)
        .map(|c| normalize_code(&c))
        .unwrap_or_else(|| old_code.clone());

    let college = NewCollege {
        college_code: new_code,
        college_name: name,
    };
    validate_in_order(&college, &NewCollege::FIELD_ORDER)?;
    reject_sentinel(&old_code, "college")?;
    reject_sentinel(&college.college_code, "college")?;

    if !db::college_exists(pool, &old_code).await? {
        return Err(AppError::NotFound("College not found".to_string()));
    }

    if college.college_code != old_code && db::college_exists(pool, &college.college_code).await? {
        return Err(AppError::Conflict("New college code already exists".to_string()));
    }

    db::update_college(pool, &old_code, &college.college_code, &college.college_name).await?;
    get_college(pool, &college.college_code).await
}

/// Returns how many programs were handed to the sentinel college.
#[instrument(skip(pool))]
pub async fn delete_college(pool: &Pool<Sqlite>, college_code: &str) -> Result<u64, AppError> {
    let code = normalize_code(college_code);
    if code.is_empty() {
        return Err(AppError::Validation("College code is required".to_string()));
    }
    reject_sentinel(&code, "college")?;

    db::delete_college(pool, &code).await
}

pub async fn delete_college_by_body(
    pool: &Pool<Sqlite>,
    key: CollegeKey,
) -> Result<u64, AppError> {
    let [code] = require_all([("college_code", &key.college_code)])?;
    delete_college(pool, &code).await
}
