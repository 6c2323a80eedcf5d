use serde::Deserialize;
use sqlx::{Pool, Sqlite};
use tracing::instrument;

use super::{normalize_code, reject_sentinel};
use crate::db::listing::split_filter;
use crate::db::{self, ListParams, ProgramFilters};
use crate::error::AppError;
use crate::models::{NewProgram, Program};
use crate::validation::{present, require_all, validate_in_order};

#[derive(Debug, Default, Clone, Deserialize)]
pub struct ProgramRequest {
    #[serde(default)]
    pub old_code: Option<String>,
    #[serde(default)]
    pub program_code: Option<String>,
    #[serde(default)]
    pub program_name: Option<String>,
    #[serde(default)]
    pub college_code: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct ProgramKey {
    #[serde(default)]
    pub program_code: Option<String>,
}

/// `colleges` is a comma-separated list of college codes; rows under any of them match.
#[instrument(skip(pool))]
pub async fn list_programs(
    pool: &Pool<Sqlite>,
    params: &ListParams,
    colleges: Option<&str>,
) -> Result<Vec<Program>, AppError> {
    let filters = ProgramFilters {
        colleges: split_filter(colleges)
            .iter()
            .map(|c| normalize_code(c))
            .collect(),
    };

    db::get_all_programs(pool, params, filters).await
}

#[instrument(skip(pool))]
pub async fn get_program(pool: &Pool<Sqlite>, program_code: &str) -> Result<Program, AppError> {
    db::get_program(pool, &normalize_code(program_code))
        .await?
        .ok_or_else(|| AppError::NotFound("Program not found".to_string()))
}

async fn ensure_college(pool: &Pool<Sqlite>, college_code: &str) -> Result<(), AppError> {
    if !db::college_exists(pool, college_code).await? {
        return Err(AppError::Reference(format!(
            "College code '{}' does not exist",
            college_code
        )));
    }
    Ok(())
}

#[instrument(skip(pool))]
pub async fn create_program(
    pool: &Pool<Sqlite>,
    request: ProgramRequest,
) -> Result<Program, AppError> {
    let [code, name, college] = require_all([
        ("program_code", &request.program_code),
        ("program_name", &request.program_name),
        ("college_code", &request.college_code),
    ])?;

    let program = NewProgram {
        program_code: normalize_code(&code),
        program_name: name,
        college_code: normalize_code(&college),
    };
    validate_in_order(&program, &NewProgram::FIELD_ORDER)?;
    reject_sentinel(&program.program_code, "program")?;

    if db::program_exists(pool, &program.program_code).await? {
        return Err(AppError::Conflict("Program code already exists".to_string()));
    }
    ensure_college(pool, &program.college_code).await?;

    db::create_program(
        pool,
        &program.program_code,
        &program.program_name,
        &program.college_code,
    )
    .await?;
    get_program(pool, &program.program_code).await
}

pub async fn update_program_by_body(
    pool: &Pool<Sqlite>,
    request: ProgramRequest,
) -> Result<Program, AppError> {
    let [old_code] = require_all([("old_code", &request.old_code)])?;
    update_program(pool, &old_code, request).await
}

/// A missing `program_code` keeps the current code.
#[instrument(skip(pool))]
pub async fn update_program(
    pool: &Pool<Sqlite>,
    old_code: &str,
    request: ProgramRequest,
) -> Result<Program, AppError> {
    let old_code = normalize_code(old_code);
    let [name, college] = require_all([
        ("program_name", &request.program_name),
        ("college_code", &request.college_code),
    ])?;
    let new_code = present(&request.program_code)
        .map(|c| normalize_code(&c))
        .unwrap_or_else(|| old_code.clone());

    let program = NewProgram {
        program_code: new_code,
        program_name: name,
        college_code: normalize_code(&college),
    };
    validate_in_order(&program, &NewProgram::FIELD_ORDER)?;
    reject_sentinel(&old_code, "program")?;
    reject_sentinel(&program.program_code, "program")?;

    if !db::program_exists(pool, &old_code).await? {
        return Err(AppError::NotFound("Program not found".to_string()));
    }

    if program.program_code != old_code && db::program_exists(pool, &program.program_code).await? {
        return Err(AppError::Conflict("New program code already exists".to_string()));
    }
    ensure_college(pool, &program.college_code).await?;

    db::update_program(
        pool,
        &old_code,
        &program.program_code,
        &program.program_name,
        &program.college_code,
    )
    .await?;
    get_program(pool, &program.program_code).await
}

/// Returns how many students were handed to the sentinel program.
#[instrument(skip(pool))]
pub async fn delete_program(pool: &Pool<Sqlite>, program_code: &str) -> Result<u64, AppError> {
    let code = normalize_code(program_code);
    if code.is_empty() {
        return Err(AppError::Validation("Program code is required".to_string()));
    }
    reject_sentinel(&code, "program")?;

    db::delete_program(pool, &code).await
}

pub async fn delete_program_by_body(
    pool: &Pool<Sqlite>,
    key: ProgramKey,
) -> Result<u64, AppError> {
    let [code] = require_all([("program_code", &key.program_code)])?;
    delete_program(pool, &code).await
}
