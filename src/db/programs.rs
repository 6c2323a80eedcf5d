use sqlx::{Pool, Sqlite, SqliteConnection, SqliteExecutor};
use tracing::{info, instrument};

use super::colleges::ensure_sentinel_college;
use super::listing::{ListParams, Listing, push_in_filter};
use super::{SENTINEL_CODE, SENTINEL_PROGRAM_NAME};
use crate::error::AppError;
use crate::models::Program;

pub static PROGRAM_LISTING: Listing = Listing {
    select: "SELECT p.program_code, p.program_name, p.college_code, c.college_name
             FROM programs p
             LEFT JOIN colleges c ON c.college_code = p.college_code",
    key_column: "p.program_code",
    sortable: &[
        ("program_code", "p.program_code"),
        ("code", "p.program_code"),
        ("program_name", "p.program_name"),
        ("name", "p.program_name"),
        ("college_code", "p.college_code"),
        ("college", "p.college_code"),
    ],
    searchable: &[
        ("program_code", &["p.program_code"]),
        ("code", &["p.program_code"]),
        ("program_name", &["p.program_name"]),
        ("name", &["p.program_name"]),
        ("college_code", &["p.college_code"]),
        ("college", &["p.college_code"]),
    ],
    text_columns: &["p.program_code", "p.program_name", "p.college_code"],
    numeric_columns: &[],
};

const PROGRAM_SELECT: &str = "SELECT p.program_code, p.program_name, p.college_code, c.college_name
     FROM programs p
     LEFT JOIN colleges c ON c.college_code = p.college_code
     WHERE p.program_code = ?";

#[derive(Debug, Default, Clone)]
pub struct ProgramFilters {
    pub colleges: Vec<String>,
}

#[instrument(skip(executor))]
pub async fn program_exists<'e, E: SqliteExecutor<'e>>(
    executor: E,
    program_code: &str,
) -> Result<bool, AppError> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM programs WHERE program_code = ?")
        .bind(program_code)
        .fetch_optional(executor)
        .await?;

    Ok(row.is_some())
}

#[instrument(skip(executor))]
pub async fn get_program<'e, E: SqliteExecutor<'e>>(
    executor: E,
    program_code: &str,
) -> Result<Option<Program>, AppError> {
    let program = sqlx::query_as::<_, Program>(PROGRAM_SELECT)
        .bind(program_code)
        .fetch_optional(executor)
        .await?;

    Ok(program)
}

#[instrument(skip(pool))]
pub async fn get_all_programs(
    pool: &Pool<Sqlite>,
    params: &ListParams,
    filters: ProgramFilters,
) -> Result<Vec<Program>, AppError> {
    info!("Listing programs");
    let mut query = PROGRAM_LISTING.query();
    query.push(" AND p.program_code <> ");
    query.push_bind(SENTINEL_CODE);
    PROGRAM_LISTING.push_search(&mut query, params);
    push_in_filter(&mut query, "p.college_code", filters.colleges);
    PROGRAM_LISTING.push_order(&mut query, params);

    let programs = query.build_query_as::<Program>().fetch_all(pool).await?;
    Ok(programs)
}

#[instrument(skip(executor))]
pub async fn create_program<'e, E: SqliteExecutor<'e>>(
    executor: E,
    program_code: &str,
    program_name: &str,
    college_code: &str,
) -> Result<(), AppError> {
    info!("Creating program");
    sqlx::query("INSERT INTO programs (program_code, program_name, college_code) VALUES (?, ?, ?)")
        .bind(program_code)
        .bind(program_name)
        .bind(college_code)
        .execute(executor)
        .await
        .map_err(|e| {
            AppError::from_write(e, "Program code already exists", "College code does not exist")
        })?;

    Ok(())
}

/// Updates a program in place, or moves it to a new code and re-points its students.
#[instrument(skip(pool))]
pub async fn update_program(
    pool: &Pool<Sqlite>,
    old_code: &str,
    new_code: &str,
    program_name: &str,
    college_code: &str,
) -> Result<(), AppError> {
    if old_code == new_code {
        info!("Updating program");
        let result = sqlx::query(
            "UPDATE programs SET program_name = ?, college_code = ? WHERE program_code = ?",
        )
        .bind(program_name)
        .bind(college_code)
        .bind(old_code)
        .execute(pool)
        .await
        .map_err(|e| {
            AppError::from_write(e, "Program code already exists", "College code does not exist")
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Program not found".to_string()));
        }
        return Ok(());
    }

    info!("Renaming program code");
    let mut tx = pool.begin().await?;

    if program_exists(&mut *tx, new_code).await? {
        return Err(AppError::Conflict(format!(
            "Program code '{}' already exists",
            new_code
        )));
    }

    create_program(&mut *tx, new_code, program_name, college_code).await?;

    let moved = sqlx::query("UPDATE students SET program_code = ? WHERE program_code = ?")
        .bind(new_code)
        .bind(old_code)
        .execute(&mut *tx)
        .await?;

    let removed = sqlx::query("DELETE FROM programs WHERE program_code = ?")
        .bind(old_code)
        .execute(&mut *tx)
        .await?;

    if removed.rows_affected() == 0 {
        return Err(AppError::NotFound("Program not found".to_string()));
    }

    tx.commit().await?;
    info!(
        students_moved = moved.rows_affected(),
        "Program code cascaded from {} to {}", old_code, new_code
    );

    Ok(())
}

/// The sentinel program hangs off the sentinel college, so both are ensured.
pub(crate) async fn ensure_sentinel_program(conn: &mut SqliteConnection) -> Result<(), AppError> {
    ensure_sentinel_college(&mut *conn).await?;

    sqlx::query(
        "INSERT INTO programs (program_code, program_name, college_code) VALUES (?, ?, ?)
         ON CONFLICT (program_code) DO NOTHING",
    )
    .bind(SENTINEL_CODE)
    .bind(SENTINEL_PROGRAM_NAME)
    .bind(SENTINEL_CODE)
    .execute(conn)
    .await?;

    Ok(())
}

/// Deletes a program after handing its students to the sentinel program.
/// Returns the number of students that were reassigned.
#[instrument(skip(pool))]
pub async fn delete_program(pool: &Pool<Sqlite>, program_code: &str) -> Result<u64, AppError> {
    info!("Deleting program");
    let mut tx = pool.begin().await?;

    ensure_sentinel_program(&mut tx).await?;

    let reassigned = sqlx::query("UPDATE students SET program_code = ? WHERE program_code = ?")
        .bind(SENTINEL_CODE)
        .bind(program_code)
        .execute(&mut *tx)
        .await?;

    let removed = sqlx::query("DELETE FROM programs WHERE program_code = ?")
        .bind(program_code)
        .execute(&mut *tx)
        .await?;

    if removed.rows_affected() == 0 {
        return Err(AppError::NotFound("Program not found".to_string()));
    }

    tx.commit().await?;
    info!(
        students_reassigned = reassigned.rows_affected(),
        "Program deleted"
    );

    Ok(reassigned.rows_affected())
}
