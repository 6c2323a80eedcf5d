use sqlx::{Pool, Sqlite, SqliteExecutor};
use tracing::{info, instrument};

use super::listing::{ListParams, Listing, push_in_filter};
use crate::error::AppError;
use crate::models::{NewStudent, Student};

pub static STUDENT_LISTING: Listing = Listing {
    select: "SELECT s.student_id, s.first_name, s.last_name, s.gender, s.program_code,
                    s.year_level, s.profile_image_url, p.program_name
             FROM students s
             LEFT JOIN programs p ON p.program_code = s.program_code",
    key_column: "s.student_id",
    sortable: &[
        ("student_id", "s.student_id"),
        ("id", "s.student_id"),
        ("first_name", "s.first_name"),
        ("firstName", "s.first_name"),
        ("name", "s.first_name"),
        ("last_name", "s.last_name"),
        ("lastName", "s.last_name"),
        ("gender", "s.gender"),
        ("program_code", "s.program_code"),
        ("course", "s.program_code"),
        ("year_level", "s.year_level"),
        ("yearLevel", "s.year_level"),
    ],
    searchable: &[
        ("student_id", &["s.student_id"]),
        ("id", &["s.student_id"]),
        ("name", &["s.first_name", "s.last_name"]),
        ("first_name", &["s.first_name"]),
        ("last_name", &["s.last_name"]),
        ("gender", &["s.gender"]),
        ("program_code", &["s.program_code"]),
        ("course", &["s.program_code"]),
        ("year_level", &["CAST(s.year_level AS TEXT)"]),
    ],
    text_columns: &[
        "s.student_id",
        "s.first_name",
        "s.last_name",
        "s.gender",
        "s.program_code",
    ],
    numeric_columns: &["s.year_level"],
};

const STUDENT_SELECT: &str = "SELECT s.student_id, s.first_name, s.last_name, s.gender, s.program_code,
            s.year_level, s.profile_image_url, p.program_name
     FROM students s
     LEFT JOIN programs p ON p.program_code = s.program_code
     WHERE s.student_id = ?";

#[derive(Debug, Default, Clone)]
pub struct StudentFilters {
    pub programs: Vec<String>,
    pub genders: Vec<String>,
    pub year_levels: Vec<i64>,
}

#[instrument(skip(executor))]
pub async fn student_exists<'e, E: SqliteExecutor<'e>>(
    executor: E,
    student_id: &str,
) -> Result<bool, AppError> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM students WHERE student_id = ?")
        .bind(student_id)
        .fetch_optional(executor)
        .await?;

    Ok(row.is_some())
}

#[instrument(skip(executor))]
pub async fn get_student<'e, E: SqliteExecutor<'e>>(
    executor: E,
    student_id: &str,
) -> Result<Option<Student>, AppError> {
    let student = sqlx::query_as::<_, Student>(STUDENT_SELECT)
        .bind(student_id)
        .fetch_optional(executor)
        .await?;

    Ok(student)
}

#[instrument(skip(pool))]
pub async fn get_all_students(
    pool: &Pool<Sqlite>,
    params: &ListParams,
    filters: StudentFilters,
) -> Result<Vec<Student>, AppError> {
    info!("Listing students");
    let mut query = STUDENT_LISTING.query();
    STUDENT_LISTING.push_search(&mut query, params);
    push_in_filter(&mut query, "s.program_code", filters.programs);
    push_in_filter(&mut query, "s.gender", filters.genders);
    push_in_filter(&mut query, "s.year_level", filters.year_levels);
    STUDENT_LISTING.push_order(&mut query, params);

    let students = query.build_query_as::<Student>().fetch_all(pool).await?;
    Ok(students)
}

#[instrument(skip(executor))]
pub async fn create_student<'e, E: SqliteExecutor<'e>>(
    executor: E,
    student: &NewStudent,
) -> Result<(), AppError> {
    info!("Creating student");
    sqlx::query(
        "INSERT INTO students
         (student_id, first_name, last_name, gender, program_code, year_level, profile_image_url)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&student.student_id)
    .bind(&student.first_name)
    .bind(&student.last_name)
    .bind(&student.gender)
    .bind(&student.program_code)
    .bind(student.year_level)
    .bind(&student.profile_image_url)
    .execute(executor)
    .await
    .map_err(|e| AppError::from_write(e, "Student ID already exists", "Program code does not exist"))?;

    Ok(())
}

/// Students have no dependents, so a changed ID is rewritten in place.
#[instrument(skip(pool))]
pub async fn update_student(
    pool: &Pool<Sqlite>,
    old_id: &str,
    student: &NewStudent,
) -> Result<(), AppError> {
    info!("Updating student");
    let result = sqlx::query(
        "UPDATE students
         SET student_id = ?, first_name = ?, last_name = ?, gender = ?,
             program_code = ?, year_level = ?, profile_image_url = ?
         WHERE student_id = ?",
    )
    .bind(&student.student_id)
    .bind(&student.first_name)
    .bind(&student.last_name)
    .bind(&student.gender)
    .bind(&student.program_code)
    .bind(student.year_level)
    .bind(&student.profile_image_url)
    .bind(old_id)
    .execute(pool)
    .await
    .map_err(|e| AppError::from_write(e, "Student ID already exists", "Program code does not exist"))?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Student not found".to_string()));
    }

    Ok(())
}

#[instrument(skip(pool))]
pub async fn delete_student(pool: &Pool<Sqlite>, student_id: &str) -> Result<(), AppError> {
    info!("Deleting student");
    let result = sqlx::query("DELETE FROM students WHERE student_id = ?")
        .bind(student_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Student not found".to_string()));
    }

    Ok(())
}
