use sqlx::{Pool, Sqlite, SqliteConnection, SqliteExecutor};
use tracing::{info, instrument};

use super::listing::{ListParams, Listing};
use super::{SENTINEL_CODE, SENTINEL_COLLEGE_NAME};
use crate::error::AppError;
use crate::models::College;

pub static COLLEGE_LISTING: Listing = Listing {
    select: "SELECT college_code, college_name FROM colleges",
    key_column: "college_code",
    sortable: &[
        ("college_code", "college_code"),
        ("code", "college_code"),
        ("college_name", "college_name"),
        ("name", "college_name"),
    ],
    searchable: &[
        ("college_code", &["college_code"]),
        ("code", &["college_code"]),
        ("college_name", &["college_name"]),
        ("name", &["college_name"]),
    ],
    text_columns: &["college_code", "college_name"],
    numeric_columns: &[],
};

#[instrument(skip(executor))]
pub async fn college_exists<'e, E: SqliteExecutor<'e>>(
    executor: E,
    college_code: &str,
) -> Result<bool, AppError> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM colleges WHERE college_code = ?")
        .bind(college_code)
        .fetch_optional(executor)
        .await?;

    Ok(row.is_some())
}

#[instrument(skip(executor))]
pub async fn get_college<'e, E: SqliteExecutor<'e>>(
    executor: E,
    college_code: &str,
) -> Result<Option<College>, AppError> {
    let college = sqlx::query_as::<_, College>(
        "SELECT college_code, college_name FROM colleges WHERE college_code = ?",
    )
    .bind(college_code)
    .fetch_optional(executor)
    .await?;

    Ok(college)
}

#[instrument(skip(pool))]
pub async fn get_all_colleges(
    pool: &Pool<Sqlite>,
    params: &ListParams,
) -> Result<Vec<College>, AppError> {
    info!("Listing colleges");
    let mut query = COLLEGE_LISTING.query();
    query.push(" AND college_code <> ");
    query.push_bind(SENTINEL_CODE);
    COLLEGE_LISTING.push_search(&mut query, params);
    COLLEGE_LISTING.push_order(&mut query, params);

    let colleges = query.build_query_as::<College>().fetch_all(pool).await?;
    Ok(colleges)
}

#[instrument(skip(executor))]
pub async fn create_college<'e, E: SqliteExecutor<'e>>(
    executor: E,
    college_code: &str,
    college_name: &str,
) -> Result<(), AppError> {
    info!("Creating college");
    sqlx::query("INSERT INTO colleges (college_code, college_name) VALUES (?, ?)")
        .bind(college_code)
        .bind(college_name)
        .execute(executor)
        .await
        .map_err(|e| {
            AppError::from_write(e, "College code already exists", "College reference is invalid")
        })?;

    Ok(())
}

/// Updates a college in place, or moves it to a new code and re-points its programs.
#[instrument(skip(pool))]
pub async fn update_college(
    pool: &Pool<Sqlite>,
    old_code: &str,
    new_code: &str,
    college_name: &str,
) -> Result<(), AppError> {
    if old_code == new_code {
        info!("Updating college name");
        let result = sqlx::query("UPDATE colleges SET college_name = ? WHERE college_code = ?")
            .bind(college_name)
            .bind(old_code)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("College not found".to_string()));
        }
        return Ok(());
    }

    info!("Renaming college code");
    let mut tx = pool.begin().await?;

    if college_exists(&mut *tx, new_code).await? {
        return Err(AppError::Conflict(format!(
            "College code '{}' already exists",
            new_code
        )));
    }

    create_college(&mut *tx, new_code, college_name).await?;

    let moved = sqlx::query("UPDATE programs SET college_code = ? WHERE college_code = ?")
        .bind(new_code)
        .bind(old_code)
        .execute(&mut *tx)
        .await?;

    let removed = sqlx::query("DELETE FROM colleges WHERE college_code = ?")
        .bind(old_code)
        .execute(&mut *tx)
        .await?;

    if removed.rows_affected() == 0 {
        return Err(AppError::NotFound("College not found".to_string()));
    }

    tx.commit().await?;
    info!(
        programs_moved = moved.rows_affected(),
        "College code cascaded from {} to {}", old_code, new_code
    );

    Ok(())
}

pub(crate) async fn ensure_sentinel_college(conn: &mut SqliteConnection) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO colleges (college_code, college_name) VALUES (?, ?)
         ON CONFLICT (college_code) DO NOTHING",
    )
    .bind(SENTINEL_CODE)
    .bind(SENTINEL_COLLEGE_NAME)
    .execute(conn)
    .await?;

    Ok(())
}

/// Deletes a college after handing its programs to the sentinel college.
/// Returns the number of programs that were reassigned.
#[instrument(skip(pool))]
pub async fn delete_college(pool: &Pool<Sqlite>, college_code: &str) -> Result<u64, AppError> {
    info!("Deleting college");
    let mut tx = pool.begin().await?;

    ensure_sentinel_college(&mut tx).await?;

    let reassigned = sqlx::query("UPDATE programs SET college_code = ? WHERE college_code = ?")
        .bind(SENTINEL_CODE)
        .bind(college_code)
        .execute(&mut *tx)
        .await?;

    let removed = sqlx::query("DELETE FROM colleges WHERE college_code = ?")
        .bind(college_code)
        .execute(&mut *tx)
        .await?;

    if removed.rows_affected() == 0 {
        return Err(AppError::NotFound("College not found".to_string()));
    }

    tx.commit().await?;
    info!(
        programs_reassigned = reassigned.rows_affected(),
        "College deleted"
    );

    Ok(reassigned.rows_affected())
}
